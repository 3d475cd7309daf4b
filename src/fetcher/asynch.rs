use super::{FetchedTile, TileFetcher};
use crate::tile::TileIdentifier;

/// Async counterpart of [TileFetcher], for tiles behind network or object storage.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AsyncTileFetcher: Send + Sync {
    async fn get_tile(&self, tile: &TileIdentifier) -> crate::Result<Box<dyn FetchedTile>>;
}

/// Every blocking fetcher is trivially an async fetcher.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl<F: TileFetcher + Send + Sync> AsyncTileFetcher for F {
    async fn get_tile(&self, tile: &TileIdentifier) -> crate::Result<Box<dyn FetchedTile>> {
        TileFetcher::get_tile(self, tile)
    }
}
