//! Physical tile coordinates from a `coordinates.csv` sidecar.
//!
//! Each row gives the physical extent of either one tile (all of `round`, `ch`
//! and `zplane` filled in) or a whole field of view (those columns blank). The
//! z columns are optional for flat datasets.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::tile::{CoordinateRange, Coordinates, TileIdentifier};

#[derive(Debug, Deserialize)]
struct Row {
    fov: u32,
    #[serde(default)]
    round: Option<u32>,
    #[serde(default)]
    ch: Option<u32>,
    #[serde(default)]
    zplane: Option<u32>,
    xc_min: f64,
    xc_max: f64,
    yc_min: f64,
    yc_max: f64,
    #[serde(default)]
    zc_min: Option<f64>,
    #[serde(default)]
    zc_max: Option<f64>,
}

impl Row {
    fn coordinates(&self) -> crate::Result<Coordinates> {
        let z = match (self.zc_min, self.zc_max) {
            (Some(min), Some(max)) => Some(CoordinateRange(min, max)),
            (None, None) => None,
            _ => {
                return Err(crate::Error::general(format!(
                    "fov {}: zc_min and zc_max must be given together",
                    self.fov
                )));
            }
        };
        Ok(Coordinates::new(
            CoordinateRange(self.xc_min, self.xc_max),
            CoordinateRange(self.yc_min, self.yc_max),
            z,
        ))
    }
}

/// Lookup table for tile coordinates.
///
/// Exact per-tile rows take precedence over per-fov rows.
#[derive(Debug, Default)]
pub struct CoordinateTable {
    per_tile: HashMap<TileIdentifier, Coordinates>,
    per_fov: HashMap<u32, Coordinates>,
}

impl CoordinateTable {
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader(reader: impl Read) -> crate::Result<Self> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> crate::Result<Self> {
        let mut out = Self::default();
        for record in reader.deserialize() {
            let row: Row = record?;
            let coords = row.coordinates()?;
            match (row.round, row.ch, row.zplane) {
                (Some(round), Some(ch), Some(zplane)) => {
                    out.per_tile
                        .insert(TileIdentifier::new(row.fov, round, ch, zplane), coords);
                }
                (None, None, None) => {
                    out.per_fov.insert(row.fov, coords);
                }
                _ => {
                    return Err(crate::Error::general(format!(
                        "fov {}: round, ch and zplane must all be given or all blank",
                        row.fov
                    )));
                }
            }
        }
        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.per_tile.is_empty() && self.per_fov.is_empty()
    }

    /// Coordinates for a tile, if the table has a row covering it.
    pub fn lookup(&self, tile: &TileIdentifier) -> Option<Coordinates> {
        self.per_tile
            .get(tile)
            .or_else(|| self.per_fov.get(&tile.fov))
            .copied()
    }
}
