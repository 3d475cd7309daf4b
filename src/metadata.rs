//! Serde model of the JSON documents a converted experiment is made of.
//!
//! An experiment directory holds one `experiment.json` naming a manifest per
//! image set, one manifest per set naming a tileset document per field of view,
//! and one tileset document per field of view listing its tiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tile::{Coordinates, TileFormat, TileIdentifier, TileShape};

/// Version written into every document of a converted experiment.
pub const FORMAT_VERSION: &str = "5.0.0";

/// Version of the placeholder codebook written when none is supplied.
pub const CODEBOOK_VERSION: &str = "0.0.0";

/// Top-level `experiment.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub version: String,
    /// Image set name to manifest filename.
    pub images: BTreeMap<String, String>,
    /// Codebook filename.
    pub codebook: String,
    #[serde(default)]
    pub extras: Option<serde_json::Value>,
}

impl ExperimentMetadata {
    pub fn new(images: BTreeMap<String, String>, codebook: impl Into<String>) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            images,
            codebook: codebook.into(),
            extras: None,
        }
    }
}

/// Manifest for one image set: field of view name to tileset filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub version: String,
    pub contents: BTreeMap<String, String>,
    #[serde(default)]
    pub extras: Option<serde_json::Value>,
}

impl ManifestMetadata {
    pub fn new(contents: BTreeMap<String, String>) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            contents,
            extras: None,
        }
    }
}

/// Index extent of a tileset along the round, channel and zplane axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetShape {
    pub r: u32,
    pub c: u32,
    pub z: u32,
}

/// Index of one tile within its tileset. The field of view is implied by the
/// document the tile is listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileIndices {
    pub r: u32,
    pub c: u32,
    pub z: u32,
}

impl From<TileIdentifier> for TileIndices {
    fn from(value: TileIdentifier) -> Self {
        Self {
            r: value.round,
            c: value.ch,
            z: value.zplane,
        }
    }
}

/// One tile entry in a tileset document.
///
/// `tile_shape` and `tile_format` are only written when they differ from the
/// tileset defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMetadata {
    pub coordinates: Coordinates,
    pub indices: TileIndices,
    pub file: String,
    /// Lowercase hex SHA-256 of the tile file contents.
    pub sha256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_shape: Option<TileShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_format: Option<TileFormat>,
}

/// Tileset document for one field of view of one image set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSetMetadata {
    pub version: String,
    pub dimensions: Vec<String>,
    pub shape: SetShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_tile_shape: Option<TileShape>,
    pub default_tile_format: TileFormat,
    pub tiles: Vec<TileMetadata>,
    #[serde(default)]
    pub extras: Option<serde_json::Value>,
}

impl TileSetMetadata {
    pub fn new(shape: SetShape, default_tile_format: TileFormat) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            dimensions: default_dimensions(),
            shape,
            default_tile_shape: None,
            default_tile_format,
            tiles: Vec::new(),
            extras: None,
        }
    }
}

fn default_dimensions() -> Vec<String> {
    ["x", "y", "c", "z", "r", "xc", "yc", "zc"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Placeholder codebook for experiments converted without one.
pub fn empty_codebook() -> serde_json::Value {
    serde_json::json!({
        "version": CODEBOOK_VERSION,
        "mappings": [],
    })
}
