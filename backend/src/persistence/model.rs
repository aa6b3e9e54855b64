use shuffle_core::types::{ArtistId, SongId};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("an artist named {0:?} already exists")]
    DuplicateArtistName(String),

    /// A song write referenced an artist id with no row behind it.
    #[error("artist {0} does not exist")]
    UnknownArtist(ArtistId),

    #[error("artist {0} not found")]
    ArtistNotFound(ArtistId),

    #[error("song {0} not found")]
    SongNotFound(SongId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}
