pub mod builder;
pub mod coords;
mod error;
pub mod fetcher;
pub mod metadata;
pub mod naming;
pub mod structured;
pub mod tile;

pub use error::{Error, Result};
