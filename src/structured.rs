//! Conversion of directories that follow the structured naming convention.
//!
//! A structured directory holds tile files named as in [crate::naming], plus an
//! optional `coordinates.csv` sidecar ([crate::coords]). [scan] discovers the
//! image sets present and their index extents; [StructuredFetcher] serves tiles
//! out of such a directory.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;

use crate::builder::TileSetSpec;
use crate::coords::CoordinateTable;
use crate::fetcher::{FetchedTile, TileFetcher};
use crate::naming;
use crate::tile::{Coordinates, PixelFormat, TileFormat, TileIdentifier, TileShape};

/// Name of the optional physical-coordinate sidecar.
pub const COORDINATES_CSV: &str = "coordinates.csv";

/// One image set discovered by [scan].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedSet {
    pub spec: TileSetSpec,
    /// Number of fields of view the set's filenames span.
    pub fovs: u32,
}

/// Discover the image sets in a structured directory.
///
/// Extents are taken as one past the largest index seen on each axis; gaps in
/// the grid surface later as missing tiles. Files that do not parse as
/// structured tile names are skipped.
pub fn scan(dir: &Path) -> crate::Result<BTreeMap<String, ScannedSet>> {
    let mut sets: BTreeMap<String, ScannedSet> = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let (set, tile, format) = match naming::parse_tile_filename(name) {
            Ok(parsed) => parsed,
            Err(_) => {
                debug!("skipping non-tile file {name}");
                continue;
            }
        };
        match sets.entry(set) {
            Entry::Vacant(entry) => {
                entry.insert(ScannedSet {
                    spec: TileSetSpec {
                        rounds: tile.round + 1,
                        channels: tile.ch + 1,
                        zplanes: tile.zplane + 1,
                        tile_format: format,
                    },
                    fovs: tile.fov + 1,
                });
            }
            Entry::Occupied(mut entry) => {
                if entry.get().spec.tile_format != format {
                    return Err(crate::Error::general(format!(
                        "image set {} mixes tile formats ({:?} and {:?})",
                        entry.key(),
                        entry.get().spec.tile_format,
                        format
                    )));
                }
                let scanned = entry.get_mut();
                scanned.spec.rounds = scanned.spec.rounds.max(tile.round + 1);
                scanned.spec.channels = scanned.spec.channels.max(tile.ch + 1);
                scanned.spec.zplanes = scanned.spec.zplanes.max(tile.zplane + 1);
                scanned.fovs = scanned.fovs.max(tile.fov + 1);
            }
        }
    }
    Ok(sets)
}

/// [TileFetcher] over a structured directory.
///
/// Tile shape and pixel format cannot be derived without decoding the files,
/// which this crate never does, so the caller states them up front.
pub struct StructuredFetcher {
    dir: PathBuf,
    set: String,
    format: TileFormat,
    shape: TileShape,
    pixel_format: PixelFormat,
    coordinates: CoordinateTable,
}

impl StructuredFetcher {
    /// Create a fetcher for one image set of a structured directory, loading
    /// `coordinates.csv` if present.
    pub fn new(
        dir: impl Into<PathBuf>,
        set: impl Into<String>,
        format: TileFormat,
        shape: TileShape,
        pixel_format: PixelFormat,
    ) -> crate::Result<Self> {
        let dir = dir.into();
        let csv_path = dir.join(COORDINATES_CSV);
        let coordinates = if csv_path.is_file() {
            CoordinateTable::from_path(&csv_path)?
        } else {
            CoordinateTable::default()
        };
        Ok(Self {
            dir,
            set: set.into(),
            format,
            shape,
            pixel_format,
            coordinates,
        })
    }
}

impl TileFetcher for StructuredFetcher {
    fn get_tile(&self, tile: &TileIdentifier) -> crate::Result<Box<dyn FetchedTile>> {
        let path = self
            .dir
            .join(naming::tile_filename(&self.set, tile, self.format));
        if !path.is_file() {
            return Err(crate::Error::MissingTile(*tile));
        }
        let coordinates = self
            .coordinates
            .lookup(tile)
            .unwrap_or_else(Coordinates::fabricated);
        Ok(Box::new(DiskTile {
            path,
            format: self.format,
            shape: self.shape,
            pixel_format: self.pixel_format,
            coordinates,
        }))
    }
}

#[derive(Debug)]
struct DiskTile {
    path: PathBuf,
    format: TileFormat,
    shape: TileShape,
    pixel_format: PixelFormat,
    coordinates: Coordinates,
}

impl FetchedTile for DiskTile {
    fn shape(&self) -> TileShape {
        self.shape
    }

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn format(&self) -> TileFormat {
        self.format
    }

    fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    fn data(&self) -> crate::Result<Bytes> {
        let data = fs::read(&self.path)?;
        Ok(Bytes::from_owner(data))
    }
}
