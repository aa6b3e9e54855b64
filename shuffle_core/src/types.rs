use serde::{Deserialize, Serialize};

pub type ArtistId = i64;
pub type SongId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub affiliation: Option<String>,
}

impl Artist {
    /// `Name (Affiliation)`, or just the name when there is no affiliation.
    pub fn credit(&self) -> String {
        match self.affiliation.as_deref() {
            Some(affiliation) if !affiliation.is_empty() => {
                format!("{} ({})", self.name, affiliation)
            }
            _ => self.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

impl Song {
    /// The single-artist projection: the first credited artist, if any.
    pub fn primary_artist(&self) -> Option<&Artist> {
        self.artists.first()
    }

    pub fn credit_line(&self) -> String {
        if self.artists.is_empty() {
            return "Unknown artist".to_owned();
        }
        self.artists
            .iter()
            .map(Artist::credit)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn now_playing(&self) -> String {
        format!("{} by {}", self.title, self.credit_line())
    }
}

/// One row of the songs ⟕ song_artists ⟕ artists join.
///
/// Artist-less songs come back as a single row with every `artist_*` column null.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CatalogRow {
    pub song_id: SongId,
    pub title: String,
    pub url: String,
    pub artist_id: Option<ArtistId>,
    pub artist_name: Option<String>,
    pub artist_affiliation: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ArtistInput {
    pub name: String,
    #[serde(default)]
    pub affiliation: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SongInput {
    pub title: String,
    pub url: String,
    /// Replaces the song's whole association set, in this order.
    #[serde(default)]
    pub artists: Vec<ArtistId>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Changes {
    pub changes: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Success {
    pub success: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(id: ArtistId, name: &str, affiliation: Option<&str>) -> Artist {
        Artist {
            id,
            name: name.to_owned(),
            affiliation: affiliation.map(str::to_owned),
        }
    }

    #[test]
    fn credit_line_joins_every_artist() {
        let song = Song {
            id: 1,
            title: "Duet".to_owned(),
            url: "https://www.youtube.com/watch?v=abc".to_owned(),
            artists: vec![
                artist(1, "Suisei", Some("hololive")),
                artist(2, "Mori", None),
            ],
        };

        assert_eq!(song.credit_line(), "Suisei (hololive), Mori");
        assert_eq!(song.now_playing(), "Duet by Suisei (hololive), Mori");
        assert_eq!(song.primary_artist().map(|a| a.id), Some(1));
    }

    #[test]
    fn song_without_artists_has_placeholder_credit() {
        let song: Song =
            serde_json::from_str(r#"{"id": 4, "title": "Lonely", "url": "x"}"#).unwrap();

        assert!(song.artists.is_empty());
        assert!(song.primary_artist().is_none());
        assert_eq!(song.now_playing(), "Lonely by Unknown artist");
    }

    #[test]
    fn empty_affiliation_is_not_rendered() {
        assert_eq!(artist(3, "Kiara", Some("")).credit(), "Kiara");
    }
}
