use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a single 2D image plane within an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIdentifier {
    pub fov: u32,
    pub round: u32,
    pub ch: u32,
    pub zplane: u32,
}

impl TileIdentifier {
    pub fn new(fov: u32, round: u32, ch: u32, zplane: u32) -> Self {
        Self {
            fov,
            round,
            ch,
            zplane,
        }
    }
}

impl fmt::Display for TileIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fov {} round {} ch {} zplane {}",
            self.fov, self.round, self.ch, self.zplane
        )
    }
}

/// Pixel extent of a tile. Serialized as `{"y": ..., "x": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileShape {
    pub y: u32,
    pub x: u32,
}

impl TileShape {
    pub fn new(y: u32, x: u32) -> Self {
        Self { y, x }
    }
}

/// Element type of a tile's pixel data.
///
/// Tiles are copied through the converter without decoding; the pixel format is
/// only used to check that all tiles of an image set agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl PixelFormat {
    pub fn from_name(name: &str) -> crate::Result<Self> {
        let out = match name {
            "uint8" => Self::UInt8,
            "int8" => Self::Int8,
            "uint16" => Self::UInt16,
            "int16" => Self::Int16,
            "uint32" => Self::UInt32,
            "int32" => Self::Int32,
            "uint64" => Self::UInt64,
            "int64" => Self::Int64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            s => {
                return Err(crate::Error::general(format!(
                    "unsupported pixel format: {s}"
                )));
            }
        };
        Ok(out)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UInt8 => "uint8",
            Self::Int8 => "int8",
            Self::UInt16 => "uint16",
            Self::Int16 => "int16",
            Self::UInt32 => "uint32",
            Self::Int32 => "int32",
            Self::UInt64 => "uint64",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk encoding of a tile file.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileFormat {
    Tiff,
    Png,
    Npy,
}

impl TileFormat {
    /// Lowercase filename extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Tiff => "tiff",
            Self::Png => "png",
            Self::Npy => "npy",
        }
    }

    pub fn from_extension(ext: &str) -> crate::Result<Self> {
        let out = match ext {
            "tiff" | "tif" => Self::Tiff,
            "png" => Self::Png,
            "npy" => Self::Npy,
            s => {
                return Err(crate::Error::general(format!(
                    "unsupported tile extension: {s}"
                )));
            }
        };
        Ok(out)
    }
}

/// Closed interval of physical positions. Serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRange(pub f64, pub f64);

impl CoordinateRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }
}

/// Physical extent of a tile, in the experiment's coordinate space.
///
/// The z range is optional; flat datasets record only x and y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "xc")]
    pub x: CoordinateRange,
    #[serde(rename = "yc")]
    pub y: CoordinateRange,
    #[serde(rename = "zc", default, skip_serializing_if = "Option::is_none")]
    pub z: Option<CoordinateRange>,
}

impl Coordinates {
    pub fn new(x: CoordinateRange, y: CoordinateRange, z: Option<CoordinateRange>) -> Self {
        Self { x, y, z }
    }

    /// Placeholder coordinates for datasets with no physical position data:
    /// the unit square, with a thin z slab.
    pub fn fabricated() -> Self {
        Self {
            x: CoordinateRange(0.0, 1.0),
            y: CoordinateRange(0.0, 1.0),
            z: Some(CoordinateRange(0.0, 0.001)),
        }
    }
}
