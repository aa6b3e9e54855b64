//! Shared model and playback logic for the shuffle player.
//!
//! This crate is used by the backend (catalog aggregation), the WASM frontend
//! and the CLI (rotation engine). Build it with `default-features = false` to
//! leave the `sqlx` row derives out of browser builds.

pub mod aggregate;
pub mod error;
pub mod rotation;
pub mod types;
pub mod video;

pub use aggregate::{aggregate, aggregate_fetched};
pub use error::{CatalogError, RotationError};
pub use rotation::{EngineState, RotationEngine};
pub use types::{Artist, ArtistId, CatalogRow, Song, SongId};
