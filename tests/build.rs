use std::fs;
use std::path::Path;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use spacetx_convert::builder::{CODEBOOK_JSON, EXPERIMENT_JSON, ExperimentBuilder, TileSetSpec};
use spacetx_convert::fetcher::{FetchedTile, TileFetcher};
use spacetx_convert::metadata::{
    ExperimentMetadata, FORMAT_VERSION, ManifestMetadata, TileSetMetadata,
};
use spacetx_convert::tile::{
    CoordinateRange, Coordinates, PixelFormat, TileFormat, TileIdentifier, TileShape,
};

fn out_dir() -> TempDir {
    env_logger::try_init().ok();
    tempfile::tempdir().expect("should create tempdir")
}

fn tile_bytes(id: &TileIdentifier) -> Vec<u8> {
    vec![id.fov as u8, id.round as u8, id.ch as u8, id.zplane as u8, 0xff]
}

#[derive(Debug)]
struct SyntheticTile {
    id: TileIdentifier,
}

impl FetchedTile for SyntheticTile {
    fn shape(&self) -> TileShape {
        TileShape::new(4, 4)
    }

    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::UInt16
    }

    fn format(&self) -> TileFormat {
        TileFormat::Tiff
    }

    fn coordinates(&self) -> Coordinates {
        let fov = self.id.fov as f64;
        Coordinates::new(
            CoordinateRange(fov * 0.1, (fov + 1.0) * 0.1),
            CoordinateRange(0.0, 0.1),
            Some(CoordinateRange(0.0, 0.001)),
        )
    }

    fn data(&self) -> spacetx_convert::Result<Bytes> {
        Ok(Bytes::from_owner(tile_bytes(&self.id)))
    }
}

struct SyntheticFetcher;

impl TileFetcher for SyntheticFetcher {
    fn get_tile(&self, tile: &TileIdentifier) -> spacetx_convert::Result<Box<dyn FetchedTile>> {
        Ok(Box::new(SyntheticTile { id: *tile }))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let text = fs::read_to_string(path).expect("document should exist");
    serde_json::from_str(&text).expect("document should parse")
}

fn spec(rounds: u32, channels: u32, zplanes: u32) -> TileSetSpec {
    TileSetSpec {
        rounds,
        channels,
        zplanes,
        tile_format: TileFormat::Tiff,
    }
}

#[test]
fn writes_complete_experiment() {
    let dir = out_dir();
    let out = dir.path();

    let mut builder = ExperimentBuilder::new(2);
    builder.add_image_set("primary", spec(2, 3, 1), SyntheticFetcher);
    builder.add_image_set("nuclei", spec(1, 1, 1), SyntheticFetcher);
    builder.write(out).expect("write should succeed");

    let experiment: ExperimentMetadata = read_json(&out.join(EXPERIMENT_JSON));
    assert_eq!(experiment.version, FORMAT_VERSION);
    assert_eq!(experiment.codebook, CODEBOOK_JSON);
    assert_eq!(
        experiment.images.keys().map(String::as_str).collect::<Vec<_>>(),
        ["nuclei", "primary"]
    );

    let codebook: serde_json::Value = read_json(&out.join(CODEBOOK_JSON));
    assert_eq!(codebook["mappings"], serde_json::json!([]));

    let manifest: ManifestMetadata = read_json(&out.join(&experiment.images["primary"]));
    assert_eq!(
        manifest.contents.keys().map(String::as_str).collect::<Vec<_>>(),
        ["fov_000", "fov_001"]
    );

    let tileset: TileSetMetadata = read_json(&out.join(&manifest.contents["fov_001"]));
    assert_eq!(tileset.shape.r, 2);
    assert_eq!(tileset.shape.c, 3);
    assert_eq!(tileset.shape.z, 1);
    assert_eq!(tileset.tiles.len(), 6);
    assert_eq!(tileset.default_tile_shape, Some(TileShape::new(4, 4)));
    assert_eq!(tileset.default_tile_format, TileFormat::Tiff);

    for tile in &tileset.tiles {
        let data = fs::read(out.join(&tile.file)).expect("tile file should exist");
        let mut hasher = Sha256::new();
        hasher.update(&data);
        assert_eq!(tile.sha256, format!("{:x}", hasher.finalize()));
        // uniform tiles should not repeat the set defaults
        assert!(tile.tile_shape.is_none());
        assert!(tile.tile_format.is_none());
    }

    let first = &tileset.tiles[0];
    assert_eq!(first.file, "primary-f1-r0-c0-z0.tiff");
    assert_eq!(
        fs::read(out.join(&first.file)).expect("tile file should exist"),
        tile_bytes(&TileIdentifier::new(1, 0, 0, 0))
    );
    assert_eq!(first.coordinates.x, CoordinateRange(0.1, 0.2));
}

#[test]
fn keeps_supplied_codebook() {
    let dir = out_dir();
    let out = dir.path();

    let mut builder = ExperimentBuilder::new(1);
    builder.add_image_set("primary", spec(1, 1, 1), SyntheticFetcher);
    builder.set_codebook(serde_json::json!({
        "version": "0.0.0",
        "mappings": [{"codeword": [], "target": "ACTB"}],
    }));
    builder.write(out).expect("write should succeed");

    let codebook: serde_json::Value = read_json(&out.join(CODEBOOK_JSON));
    assert_eq!(codebook["mappings"][0]["target"], "ACTB");
}

struct MissingFetcher;

impl TileFetcher for MissingFetcher {
    fn get_tile(&self, tile: &TileIdentifier) -> spacetx_convert::Result<Box<dyn FetchedTile>> {
        if tile.round > 0 {
            Err(spacetx_convert::Error::MissingTile(*tile))
        } else {
            Ok(Box::new(SyntheticTile { id: *tile }))
        }
    }
}

#[test]
fn missing_tile_aborts_write() {
    let dir = out_dir();

    let mut builder = ExperimentBuilder::new(1);
    builder.add_image_set("primary", spec(2, 1, 1), MissingFetcher);
    let err = builder.write(dir.path()).expect_err("write should fail");
    assert!(matches!(err, spacetx_convert::Error::MissingTile(_)));
}

struct DriftingPixelFetcher;

impl TileFetcher for DriftingPixelFetcher {
    fn get_tile(&self, tile: &TileIdentifier) -> spacetx_convert::Result<Box<dyn FetchedTile>> {
        #[derive(Debug)]
        struct Tile {
            inner: SyntheticTile,
            pixel: PixelFormat,
        }
        impl FetchedTile for Tile {
            fn shape(&self) -> TileShape {
                self.inner.shape()
            }
            fn pixel_format(&self) -> PixelFormat {
                self.pixel
            }
            fn format(&self) -> TileFormat {
                self.inner.format()
            }
            fn coordinates(&self) -> Coordinates {
                self.inner.coordinates()
            }
            fn data(&self) -> spacetx_convert::Result<Bytes> {
                self.inner.data()
            }
        }
        let pixel = if tile.ch == 0 {
            PixelFormat::UInt16
        } else {
            PixelFormat::Float32
        };
        Ok(Box::new(Tile {
            inner: SyntheticTile { id: *tile },
            pixel,
        }))
    }
}

#[test]
fn pixel_format_must_be_uniform() {
    let dir = out_dir();

    let mut builder = ExperimentBuilder::new(1);
    builder.add_image_set("primary", spec(1, 2, 1), DriftingPixelFetcher);
    let err = builder.write(dir.path()).expect_err("write should fail");
    assert!(matches!(err, spacetx_convert::Error::General(_)));
}

#[test]
fn rejects_empty_experiments() {
    let dir = out_dir();

    let err = ExperimentBuilder::new(1)
        .write(dir.path())
        .expect_err("no image sets");
    assert!(matches!(err, spacetx_convert::Error::General(_)));

    let mut builder = ExperimentBuilder::new(0);
    builder.add_image_set("primary", spec(1, 1, 1), SyntheticFetcher);
    assert!(builder.write(dir.path()).is_err());

    let mut builder = ExperimentBuilder::new(1);
    builder.add_image_set("primary", spec(1, 0, 1), SyntheticFetcher);
    assert!(builder.write(dir.path()).is_err());

    let mut builder = ExperimentBuilder::new(1);
    builder.add_image_set("primary", spec(1, 1, 1), SyntheticFetcher);
    builder.add_image_set("primary", spec(1, 1, 1), SyntheticFetcher);
    assert!(builder.write(dir.path()).is_err());
}
