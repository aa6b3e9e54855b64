use std::sync::Arc;

use shuffle_core::{
    aggregate_fetched,
    types::{Artist, ArtistId, ArtistInput, CatalogRow, Song, SongId, SongInput},
    CatalogError,
};

use self::model::{StoreResult, UserRecord};

pub mod model;
pub mod sqlite;

///Trait abstracting the catalog storage the service needs.
///
/// Song writes replace the whole association set in one transaction, and
/// song deletion removes associations before the song row.
#[rocket::async_trait]
pub trait CatalogStore {
    async fn create_tables(&self) -> StoreResult<()>;

    /// Flat songs ⟕ artists join, ordered by song id then association order.
    async fn catalog_rows(&self) -> StoreResult<Vec<CatalogRow>>;
    async fn list_artists(&self) -> StoreResult<Vec<Artist>>;

    async fn create_artist(&self, artist: &ArtistInput) -> StoreResult<ArtistId>;
    async fn update_artist(&self, id: ArtistId, artist: &ArtistInput) -> StoreResult<u64>;
    async fn delete_artist(&self, id: ArtistId) -> StoreResult<u64>;

    async fn create_song(&self, song: &SongInput) -> StoreResult<SongId>;
    async fn update_song(&self, id: SongId, song: &SongInput) -> StoreResult<u64>;
    async fn delete_song(&self, id: SongId) -> StoreResult<u64>;

    async fn find_user(&self, username: &str) -> StoreResult<Option<UserRecord>>;
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<()>;

    /// The aggregated catalog; any read failure surfaces as `CatalogUnavailable`.
    async fn list_songs(&self) -> Result<Vec<Song>, CatalogError> {
        aggregate_fetched(self.catalog_rows().await)
    }
}

///Literally an Arc<dyn CatalogStore + Send + Sync>
/// Using this type allows the database implementation to be
/// swapped at runtime
pub type Store = Arc<dyn CatalogStore + Send + Sync>;
