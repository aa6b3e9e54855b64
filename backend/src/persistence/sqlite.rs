use std::{str::FromStr, sync::Arc};

use shuffle_core::types::{Artist, ArtistId, ArtistInput, CatalogRow, SongId, SongInput};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite, SqliteConnection,
};
use tracing::{debug, info};

use super::{
    model::{StoreError, StoreResult, UserRecord},
    CatalogStore, Store,
};

macro_rules! create_table {
    ($query:expr, $executor:expr) => {{
        let res = sqlx::query($query).execute($executor).await;
        if let Err(e) = &res {
            tracing::error!("failed to run {}: {}", stringify!($query), e);
        } else {
            tracing::debug!("successfully ran {}", stringify!($query));
        }
        res
    }};
}

pub struct SqliteCatalog {
    pool: Pool<Sqlite>,
}

impl SqliteCatalog {
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `sqlite::memory:` opens its own database, so an
        // in-memory store has to live on a single connection that never expires.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        info!("opened catalog database at {}", database_url);

        Ok(Self { pool })
    }

    pub async fn connect(database_url: &str) -> StoreResult<Store> {
        let db = Self::new(database_url).await?;
        Ok(Arc::new(db))
    }
}

/// Swaps in a new association set for `song_id`. Runs inside the caller's
/// transaction so a failure leaves the previous set in place.
async fn replace_associations(
    conn: &mut SqliteConnection,
    song_id: SongId,
    artists: &[ArtistId],
) -> StoreResult<()> {
    for &artist_id in artists {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM artists WHERE id = ?")
            .bind(artist_id)
            .fetch_optional(&mut *conn)
            .await?;
        if exists.is_none() {
            return Err(StoreError::UnknownArtist(artist_id));
        }
    }

    sqlx::query("DELETE FROM song_artists WHERE song_id = ?")
        .bind(song_id)
        .execute(&mut *conn)
        .await?;

    for &artist_id in artists {
        sqlx::query("INSERT OR IGNORE INTO song_artists (song_id, artist_id) VALUES (?, ?)")
            .bind(song_id)
            .bind(artist_id)
            .execute(&mut *conn)
            .await?;
    }

    debug!("song {} now credits {} artist(s)", song_id, artists.len());
    Ok(())
}

fn artist_write_error(err: sqlx::Error, name: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateArtistName(name.to_owned())
        }
        _ => err.into(),
    }
}

#[rocket::async_trait]
impl CatalogStore for SqliteCatalog {
    async fn create_tables(&self) -> StoreResult<()> {
        create_table!(queries::CREATE_USERS_TABLE, &self.pool)?;
        create_table!(queries::CREATE_ARTISTS_TABLE, &self.pool)?;
        create_table!(queries::CREATE_SONGS_TABLE, &self.pool)?;
        create_table!(queries::CREATE_SONG_ARTISTS_TABLE, &self.pool)?;

        Ok(())
    }

    async fn catalog_rows(&self) -> StoreResult<Vec<CatalogRow>> {
        const QUERY: &str = "
            SELECT
                songs.id                AS song_id,
                songs.title             AS title,
                songs.url               AS url,
                artists.id              AS artist_id,
                artists.name            AS artist_name,
                artists.affiliation     AS artist_affiliation
            FROM songs
            LEFT JOIN song_artists ON song_artists.song_id = songs.id
            LEFT JOIN artists ON artists.id = song_artists.artist_id
            ORDER BY songs.id, song_artists.rowid;";

        let rows = sqlx::query_as::<_, CatalogRow>(QUERY)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_artists(&self) -> StoreResult<Vec<Artist>> {
        let artists = sqlx::query_as::<_, Artist>(
            "SELECT id, name, affiliation FROM artists ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(artists)
    }

    async fn create_artist(&self, artist: &ArtistInput) -> StoreResult<ArtistId> {
        let result = sqlx::query("INSERT INTO artists (name, affiliation) VALUES (?, ?)")
            .bind(&artist.name)
            .bind(&artist.affiliation)
            .execute(&self.pool)
            .await
            .map_err(|err| artist_write_error(err, &artist.name))?;

        Ok(result.last_insert_rowid())
    }

    async fn update_artist(&self, id: ArtistId, artist: &ArtistInput) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE artists SET name = ?, affiliation = ? WHERE id = ?")
            .bind(&artist.name)
            .bind(&artist.affiliation)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| artist_write_error(err, &artist.name))?;

        match result.rows_affected() {
            0 => Err(StoreError::ArtistNotFound(id)),
            changes => Ok(changes),
        }
    }

    async fn delete_artist(&self, id: ArtistId) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM song_artists WHERE artist_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let changes = sqlx::query("DELETE FROM artists WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if changes == 0 {
            return Err(StoreError::ArtistNotFound(id));
        }

        tx.commit().await?;
        Ok(changes)
    }

    async fn create_song(&self, song: &SongInput) -> StoreResult<SongId> {
        let mut tx = self.pool.begin().await?;

        let song_id = sqlx::query("INSERT INTO songs (title, url) VALUES (?, ?)")
            .bind(&song.title)
            .bind(&song.url)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        replace_associations(&mut tx, song_id, &song.artists).await?;

        tx.commit().await?;
        Ok(song_id)
    }

    async fn update_song(&self, id: SongId, song: &SongInput) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let changes = sqlx::query("UPDATE songs SET title = ?, url = ? WHERE id = ?")
            .bind(&song.title)
            .bind(&song.url)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if changes == 0 {
            return Err(StoreError::SongNotFound(id));
        }

        replace_associations(&mut tx, id, &song.artists).await?;

        tx.commit().await?;
        Ok(changes)
    }

    async fn delete_song(&self, id: SongId) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM song_artists WHERE song_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let changes = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if changes == 0 {
            return Err(StoreError::SongNotFound(id));
        }

        tx.commit().await?;
        Ok(changes)
    }

    async fn find_user(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

mod queries {
    pub const CREATE_USERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    );
";

    pub const CREATE_ARTISTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS artists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        affiliation TEXT
    );
";

    pub const CREATE_SONGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS songs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT NOT NULL
    );
";

    pub const CREATE_SONG_ARTISTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS song_artists (
        song_id INTEGER NOT NULL REFERENCES songs (id),
        artist_id INTEGER NOT NULL REFERENCES artists (id),
        PRIMARY KEY(song_id, artist_id)
    );
";
}

#[cfg(test)]
mod tests {
    use shuffle_core::{RotationEngine, Song};

    use super::*;

    async fn setup_db() -> SqliteCatalog {
        let db = SqliteCatalog::new("sqlite::memory:").await.unwrap();
        db.create_tables().await.unwrap();
        db
    }

    fn artist(name: &str, affiliation: Option<&str>) -> ArtistInput {
        ArtistInput {
            name: name.to_owned(),
            affiliation: affiliation.map(str::to_owned),
        }
    }

    fn song(title: &str, artists: Vec<ArtistId>) -> SongInput {
        SongInput {
            title: title.to_owned(),
            url: format!("https://www.youtube.com/watch?v={title}"),
            artists,
        }
    }

    async fn songs(db: &SqliteCatalog) -> Vec<Song> {
        db.list_songs().await.unwrap()
    }

    fn credited(song: &Song) -> Vec<ArtistId> {
        song.artists.iter().map(|a| a.id).collect()
    }

    #[tokio::test]
    async fn test_create_and_list_artists() -> StoreResult<()> {
        let db = setup_db().await;

        let suisei = db.create_artist(&artist("Suisei", Some("hololive"))).await?;
        let kaf = db.create_artist(&artist("KAF", None)).await?;

        let artists = db.list_artists().await?;
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].id, suisei);
        assert_eq!(artists[0].affiliation.as_deref(), Some("hololive"));
        assert_eq!(artists[1].id, kaf);
        assert_eq!(artists[1].affiliation, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_artist_name_is_rejected() -> StoreResult<()> {
        let db = setup_db().await;
        db.create_artist(&artist("Suisei", None)).await?;
        let other = db.create_artist(&artist("Mori", None)).await?;

        let created = db.create_artist(&artist("Suisei", Some("x"))).await;
        assert!(matches!(created, Err(StoreError::DuplicateArtistName(name)) if name == "Suisei"));

        let renamed = db.update_artist(other, &artist("Suisei", None)).await;
        assert!(matches!(renamed, Err(StoreError::DuplicateArtistName(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_song_keeps_association_order() -> StoreResult<()> {
        let db = setup_db().await;
        let a = db.create_artist(&artist("A", None)).await?;
        let b = db.create_artist(&artist("B", None)).await?;

        db.create_song(&song("first", vec![b, a])).await?;
        db.create_song(&song("second", vec![a, b])).await?;

        let catalog = songs(&db).await;
        assert_eq!(catalog.len(), 2);
        assert_eq!(credited(&catalog[0]), vec![b, a]);
        assert_eq!(credited(&catalog[1]), vec![a, b]);

        Ok(())
    }

    #[tokio::test]
    async fn test_song_without_artists_is_listed() -> StoreResult<()> {
        let db = setup_db().await;

        let id = db.create_song(&song("solo", Vec::new())).await?;

        let catalog = songs(&db).await;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, id);
        assert!(catalog[0].artists.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_song_with_unknown_artist_writes_nothing() -> StoreResult<()> {
        let db = setup_db().await;
        let a = db.create_artist(&artist("A", None)).await?;

        let created = db.create_song(&song("broken", vec![a, 99])).await;

        assert!(matches!(created, Err(StoreError::UnknownArtist(99))));
        assert!(songs(&db).await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_song_replaces_association_set() -> StoreResult<()> {
        let db = setup_db().await;
        let a = db.create_artist(&artist("A", None)).await?;
        let b = db.create_artist(&artist("B", None)).await?;
        let c = db.create_artist(&artist("C", None)).await?;
        let id = db.create_song(&song("track", vec![a, b])).await?;

        let changes = db.update_song(id, &song("renamed", vec![c, a])).await?;

        assert_eq!(changes, 1);
        let catalog = songs(&db).await;
        assert_eq!(catalog[0].title, "renamed");
        assert_eq!(credited(&catalog[0]), vec![c, a]);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_song() -> StoreResult<()> {
        let db = setup_db().await;
        let a = db.create_artist(&artist("A", None)).await?;
        let id = db.create_song(&song("track", vec![a])).await?;

        let updated = db.update_song(id, &song("renamed", vec![404])).await;

        assert!(matches!(updated, Err(StoreError::UnknownArtist(404))));
        let catalog = songs(&db).await;
        assert_eq!(catalog[0].title, "track");
        assert_eq!(credited(&catalog[0]), vec![a]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_song() -> StoreResult<()> {
        let db = setup_db().await;

        let updated = db.update_song(5, &song("ghost", Vec::new())).await;

        assert!(matches!(updated, Err(StoreError::SongNotFound(5))));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_song_removes_associations() -> StoreResult<()> {
        let db = setup_db().await;
        let a = db.create_artist(&artist("A", None)).await?;
        let keep = db.create_song(&song("keep", vec![a])).await?;
        let gone = db.create_song(&song("gone", vec![a])).await?;

        assert_eq!(db.delete_song(gone).await?, 1);

        let rows = db.catalog_rows().await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].song_id, keep);
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM song_artists WHERE song_id = ?")
            .bind(gone)
            .fetch_one(&db.pool)
            .await?;
        assert_eq!(orphans, 0);

        assert!(matches!(db.delete_song(gone).await, Err(StoreError::SongNotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_artist_unlinks_songs() -> StoreResult<()> {
        let db = setup_db().await;
        let a = db.create_artist(&artist("A", None)).await?;
        let b = db.create_artist(&artist("B", None)).await?;
        db.create_song(&song("duet", vec![a, b])).await?;

        assert_eq!(db.delete_artist(a).await?, 1);

        let catalog = songs(&db).await;
        assert_eq!(credited(&catalog[0]), vec![b]);
        assert!(matches!(db.delete_artist(a).await, Err(StoreError::ArtistNotFound(_))));
        assert!(matches!(
            db.update_artist(a, &artist("A", None)).await,
            Err(StoreError::ArtistNotFound(_))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_running_rotation_keeps_deleted_song() -> StoreResult<()> {
        let db = setup_db().await;
        let a = db.create_artist(&artist("A", None)).await?;
        for title in ["s1", "s2"] {
            db.create_song(&song(title, vec![a])).await?;
        }
        let s3 = db.create_song(&song("s3", vec![a])).await?;

        let mut engine = RotationEngine::initialize(songs(&db).await);
        db.delete_song(s3).await?;

        assert!(songs(&db).await.iter().all(|s| s.id != s3));
        assert_eq!(engine.catalog().len(), 3);
        let reopened = engine.select_by_id(s3).unwrap();
        assert_eq!(reopened.title, "s3");
        assert_eq!(reopened.artists.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_users() -> StoreResult<()> {
        let db = setup_db().await;

        assert!(db.find_user("admin").await?.is_none());
        db.create_user("admin", "hash-1").await?;
        db.create_user("admin", "hash-2").await?;

        let user = db.find_user("admin").await?.unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.password_hash, "hash-1");

        Ok(())
    }
}
