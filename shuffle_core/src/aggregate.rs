use std::collections::HashMap;
use std::fmt::Display;

use crate::{
    error::CatalogError,
    types::{Artist, CatalogRow, Song, SongId},
};

/// Folds flat join rows into one `Song` per distinct song id.
///
/// Songs come out in the order their id is first seen. Each song's artists
/// keep the row order and are not deduplicated: two rows naming the same
/// artist produce two entries.
pub fn aggregate<I>(rows: I) -> Vec<Song>
where
    I: IntoIterator<Item = CatalogRow>,
{
    let mut songs: Vec<Song> = Vec::new();
    let mut index: HashMap<SongId, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.song_id).or_insert_with(|| {
            songs.push(Song {
                id: row.song_id,
                title: row.title.clone(),
                url: row.url.clone(),
                artists: Vec::new(),
            });
            songs.len() - 1
        });

        if let (Some(id), Some(name)) = (row.artist_id, row.artist_name) {
            songs[slot].artists.push(Artist {
                id,
                name,
                affiliation: row.artist_affiliation,
            });
        }
    }

    songs
}

/// Aggregates the outcome of a catalog query, all or nothing.
pub fn aggregate_fetched<E: Display>(
    fetched: Result<Vec<CatalogRow>, E>,
) -> Result<Vec<Song>, CatalogError> {
    match fetched {
        Ok(rows) => Ok(aggregate(rows)),
        Err(err) => {
            tracing::warn!("catalog query failed: {}", err);
            Err(CatalogError::CatalogUnavailable(err.to_string()))
        }
    }
}
