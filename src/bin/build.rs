//! Build a SpaceTx experiment from a structured directory of tile files.

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use spacetx_convert::builder::ExperimentBuilder;
use spacetx_convert::structured::{self, StructuredFetcher};
use spacetx_convert::tile::{PixelFormat, TileShape};

#[derive(Parser)]
#[command(name = "spacetx-build", version, about)]
struct Args {
    /// Directory of structured tile files, with an optional coordinates.csv.
    input_dir: PathBuf,
    /// Directory to write the experiment into.
    output_dir: PathBuf,
    /// Number of fields of view in the dataset.
    fov_count: u32,
    /// Pixel extent of every tile, as <y>x<x>.
    #[arg(long, value_parser = parse_tile_shape, default_value = "2048x2048")]
    tile_shape: TileShape,
    /// Element type of the tile pixel data.
    #[arg(long, value_parser = parse_pixel_format, default_value = "uint16")]
    pixel_format: PixelFormat,
    /// Existing codebook JSON to include instead of the empty placeholder.
    #[arg(long)]
    codebook: Option<PathBuf>,
}

fn parse_tile_shape(s: &str) -> Result<TileShape, String> {
    let (y, x) = s
        .split_once('x')
        .ok_or_else(|| format!("expected <y>x<x>, got {s}"))?;
    let y = y.parse().map_err(|_| format!("bad y extent in {s}"))?;
    let x = x.parse().map_err(|_| format!("bad x extent in {s}"))?;
    Ok(TileShape::new(y, x))
}

fn parse_pixel_format(s: &str) -> Result<PixelFormat, String> {
    PixelFormat::from_name(s).map_err(|e| e.to_string())
}

fn main() -> spacetx_convert::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let sets = structured::scan(&args.input_dir)?;
    if sets.is_empty() {
        return Err(spacetx_convert::Error::general(format!(
            "no structured tile files found in {}",
            args.input_dir.display()
        )));
    }

    let mut builder = ExperimentBuilder::new(args.fov_count);
    for (name, scanned) in sets {
        if scanned.fovs != args.fov_count {
            return Err(spacetx_convert::Error::general(format!(
                "image set {name} spans {} fields of view, expected {}",
                scanned.fovs, args.fov_count
            )));
        }
        info!(
            "found image set {name}: {}r x {}c x {}z per fov",
            scanned.spec.rounds, scanned.spec.channels, scanned.spec.zplanes
        );
        let fetcher = StructuredFetcher::new(
            &args.input_dir,
            name.clone(),
            scanned.spec.tile_format,
            args.tile_shape,
            args.pixel_format,
        )?;
        builder.add_image_set(name, scanned.spec, fetcher);
    }

    if let Some(path) = &args.codebook {
        let codebook = serde_json::from_reader(File::open(path)?)?;
        builder.set_codebook(codebook);
    }

    builder.write(&args.output_dir)
}
