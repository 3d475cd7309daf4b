//! Structured file naming for converted experiments.
//!
//! Tile files are named `<set>-f<fov>-r<round>-c<ch>-z<zplane>.<ext>`, e.g.
//! `primary-f0-r2-c1-z0.tiff`. Metadata documents derive their names from the
//! image set and the zero-padded field of view.

use crate::tile::{TileFormat, TileIdentifier};

/// Filename for one tile of an image set.
pub fn tile_filename(set: &str, tile: &TileIdentifier, format: TileFormat) -> String {
    format!(
        "{set}-f{}-r{}-c{}-z{}.{}",
        tile.fov,
        tile.round,
        tile.ch,
        tile.zplane,
        format.extension()
    )
}

/// Zero-padded field of view name, e.g. `fov_007`.
pub fn fov_name(fov: u32) -> String {
    format!("fov_{fov:03}")
}

/// Filename of the tileset document for one field of view of an image set.
pub fn tileset_filename(set: &str, fov: u32) -> String {
    format!("{set}-{}.json", fov_name(fov))
}

/// Filename of the manifest document for an image set.
pub fn manifest_filename(set: &str) -> String {
    format!("{set}.json")
}

fn parse_index(part: &str, axis: char, name: &str) -> crate::Result<u32> {
    let rest = part.strip_prefix(axis).ok_or_else(|| {
        crate::Error::general(format!("expected {axis}<n> component in tile name {name}"))
    })?;
    rest.parse()
        .map_err(|_| crate::Error::general(format!("bad {axis} index in tile name {name}")))
}

/// Parse a structured tile filename back into its parts.
///
/// Returns the image set name, the tile position, and the tile format.
pub fn parse_tile_filename(name: &str) -> crate::Result<(String, TileIdentifier, TileFormat)> {
    let (stem, ext) = name
        .rsplit_once('.')
        .ok_or_else(|| crate::Error::general(format!("tile name has no extension: {name}")))?;
    let format = TileFormat::from_extension(ext)?;

    let mut parts: Vec<&str> = stem.split('-').collect();
    if parts.len() < 5 {
        return Err(crate::Error::general(format!(
            "tile name is not structured: {name}"
        )));
    }
    let z = parts.pop().expect("checked length");
    let c = parts.pop().expect("checked length");
    let r = parts.pop().expect("checked length");
    let f = parts.pop().expect("checked length");
    // set names may themselves contain dashes
    let set = parts.join("-");

    let tile = TileIdentifier {
        fov: parse_index(f, 'f', name)?,
        round: parse_index(r, 'r', name)?,
        ch: parse_index(c, 'c', name)?,
        zplane: parse_index(z, 'z', name)?,
    };
    Ok((set, tile, format))
}
