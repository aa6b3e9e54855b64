use thiserror::Error;

use crate::types::SongId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog read never completed; nothing was loaded.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationError {
    #[error("no song available: the catalog is empty")]
    EmptyCatalog,

    #[error("song {0} is not in the loaded catalog")]
    SongNotFound(SongId),
}
