use bytes::Bytes;

use crate::tile::{Coordinates, PixelFormat, TileFormat, TileIdentifier, TileShape};

#[cfg(feature = "async")]
pub mod asynch;

/// A single located tile, ready to be copied into an experiment.
///
/// Implementations describe where one image plane lives and how to read its
/// encoded bytes. The converter never decodes pixel data; [FetchedTile::data]
/// returns the file contents as stored.
pub trait FetchedTile: std::fmt::Debug {
    /// Pixel extent of the plane.
    fn shape(&self) -> TileShape;

    /// Element type of the pixel data.
    fn pixel_format(&self) -> PixelFormat;

    /// On-disk encoding of the tile bytes.
    fn format(&self) -> TileFormat;

    /// Physical extent of the plane.
    fn coordinates(&self) -> Coordinates;

    /// Encoded tile bytes.
    fn data(&self) -> crate::Result<Bytes>;
}

/// Locates tiles by their position within the experiment.
///
/// Users supply one fetcher per image set; the builder calls [TileFetcher::get_tile]
/// once for every (fov, round, ch, zplane) combination the set declares. A fetcher
/// that cannot locate a tile should return [crate::Error::MissingTile].
pub trait TileFetcher {
    fn get_tile(&self, tile: &TileIdentifier) -> crate::Result<Box<dyn FetchedTile>>;
}
