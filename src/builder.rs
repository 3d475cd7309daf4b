//! Drives the conversion: pulls every tile of an experiment through the
//! fetchers and writes the tile files and JSON documents to an output
//! directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::fetcher::TileFetcher;
use crate::metadata::{
    ExperimentMetadata, ManifestMetadata, SetShape, TileMetadata, TileSetMetadata, empty_codebook,
};
use crate::naming;
use crate::tile::{PixelFormat, TileFormat, TileIdentifier, TileShape};

/// Filename of the experiment's codebook document.
pub const CODEBOOK_JSON: &str = "codebook.json";

/// Filename of the top-level experiment document.
pub const EXPERIMENT_JSON: &str = "experiment.json";

/// Declared extent of an image set along its index axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSetSpec {
    pub rounds: u32,
    pub channels: u32,
    pub zplanes: u32,
    pub tile_format: TileFormat,
}

struct ImageSet {
    name: String,
    spec: TileSetSpec,
    fetcher: Box<dyn TileFetcher>,
}

/// Assembles a converted experiment from user-supplied fetchers.
///
/// Register the primary image set and any auxiliary sets (nuclei, dots) with
/// [ExperimentBuilder::add_image_set], then [ExperimentBuilder::write] the
/// whole experiment in one pass.
pub struct ExperimentBuilder {
    fovs: u32,
    sets: Vec<ImageSet>,
    codebook: Option<serde_json::Value>,
}

impl ExperimentBuilder {
    pub fn new(fovs: u32) -> Self {
        Self {
            fovs,
            sets: Vec::new(),
            codebook: None,
        }
    }

    /// Register an image set. Tiles are pulled from `fetcher` for every
    /// (fov, round, ch, zplane) combination `spec` declares.
    pub fn add_image_set(
        &mut self,
        name: impl Into<String>,
        spec: TileSetSpec,
        fetcher: impl TileFetcher + 'static,
    ) -> &mut Self {
        self.sets.push(ImageSet {
            name: name.into(),
            spec,
            fetcher: Box::new(fetcher),
        });
        self
    }

    /// Use an existing codebook document instead of the empty placeholder.
    pub fn set_codebook(&mut self, codebook: serde_json::Value) -> &mut Self {
        self.codebook = Some(codebook);
        self
    }

    /// Write the experiment into `out_dir`, creating it if needed.
    ///
    /// A fetcher failure aborts the write; documents written so far are left
    /// in place.
    pub fn write(&self, out_dir: &Path) -> crate::Result<()> {
        if self.fovs == 0 {
            return Err(crate::Error::general("experiment has no fields of view"));
        }
        if self.sets.is_empty() {
            return Err(crate::Error::general("experiment has no image sets"));
        }
        let mut names = BTreeSet::new();
        for set in &self.sets {
            let spec = &set.spec;
            if spec.rounds == 0 || spec.channels == 0 || spec.zplanes == 0 {
                return Err(crate::Error::general(format!(
                    "image set {} has an empty axis",
                    set.name
                )));
            }
            if !names.insert(set.name.as_str()) {
                return Err(crate::Error::general(format!(
                    "duplicate image set name: {}",
                    set.name
                )));
            }
        }

        fs::create_dir_all(out_dir)?;

        let mut images = BTreeMap::new();
        for set in &self.sets {
            info!(
                "writing image set {} ({} fovs, {}r x {}c x {}z)",
                set.name, self.fovs, set.spec.rounds, set.spec.channels, set.spec.zplanes
            );
            let mut contents = BTreeMap::new();
            for fov in 0..self.fovs {
                let tileset = self.write_tileset(out_dir, set, fov)?;
                let filename = naming::tileset_filename(&set.name, fov);
                write_json(&out_dir.join(&filename), &tileset)?;
                contents.insert(naming::fov_name(fov), filename);
            }
            let manifest_name = naming::manifest_filename(&set.name);
            write_json(&out_dir.join(&manifest_name), &ManifestMetadata::new(contents))?;
            images.insert(set.name.clone(), manifest_name);
        }

        match &self.codebook {
            Some(codebook) => write_json(&out_dir.join(CODEBOOK_JSON), codebook)?,
            None => write_json(&out_dir.join(CODEBOOK_JSON), &empty_codebook())?,
        }

        let experiment = ExperimentMetadata::new(images, CODEBOOK_JSON);
        write_json(&out_dir.join(EXPERIMENT_JSON), &experiment)?;
        info!("wrote {EXPERIMENT_JSON} to {}", out_dir.display());
        Ok(())
    }

    fn write_tileset(
        &self,
        out_dir: &Path,
        set: &ImageSet,
        fov: u32,
    ) -> crate::Result<TileSetMetadata> {
        let spec = &set.spec;
        let mut meta = TileSetMetadata::new(
            SetShape {
                r: spec.rounds,
                c: spec.channels,
                z: spec.zplanes,
            },
            spec.tile_format,
        );
        let mut set_shape: Option<TileShape> = None;
        let mut set_pixel: Option<PixelFormat> = None;

        for round in 0..spec.rounds {
            for ch in 0..spec.channels {
                for zplane in 0..spec.zplanes {
                    let id = TileIdentifier::new(fov, round, ch, zplane);
                    let tile = set.fetcher.get_tile(&id)?;

                    if tile.format() != spec.tile_format {
                        return Err(crate::Error::general(format!(
                            "image set {}: fetched {:?} tile for a set declared {:?}",
                            set.name,
                            tile.format(),
                            spec.tile_format
                        )));
                    }
                    let pixel = tile.pixel_format();
                    match set_pixel {
                        None => set_pixel = Some(pixel),
                        Some(p) if p != pixel => {
                            return Err(crate::Error::general(format!(
                                "image set {}: pixel format changed from {p} to {pixel} at {id}",
                                set.name
                            )));
                        }
                        Some(_) => {}
                    }
                    let shape = tile.shape();
                    if set_shape.is_none() {
                        set_shape = Some(shape);
                    }

                    let data = tile.data()?;
                    let mut hasher = Sha256::new();
                    hasher.update(&data);
                    let sha256 = format!("{:x}", hasher.finalize());

                    let filename = naming::tile_filename(&set.name, &id, spec.tile_format);
                    fs::write(out_dir.join(&filename), &data)?;
                    debug!("wrote {filename} ({} bytes)", data.len());

                    meta.tiles.push(TileMetadata {
                        coordinates: tile.coordinates(),
                        indices: id.into(),
                        file: filename,
                        sha256,
                        tile_shape: (set_shape != Some(shape)).then_some(shape),
                        tile_format: None,
                    });
                }
            }
        }
        meta.default_tile_shape = set_shape;
        Ok(meta)
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> crate::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
