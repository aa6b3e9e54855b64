use rocket::{
    fs::NamedFile,
    http::{Cookie, CookieJar},
    serde::json::Json,
    State,
};
use shuffle_core::types::{
    Artist, ArtistId, ArtistInput, Changes, Created, Credentials, ErrorBody, Song, SongId,
    SongInput, Success,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    authentication::{verify_password, AdminSession, SessionRegistry, SESSION_COOKIE},
    config::AppConfig,
    error::{ApiError, ApiResult},
    persistence::Store,
};

/// The player page. Its wasm bundle is mounted separately under `/pkg`.
#[get("/")]
pub async fn index(config: &State<AppConfig>) -> Option<NamedFile> {
    NamedFile::open(config.static_dir.join("index.html")).await.ok()
}

#[get("/songs")]
pub async fn list_songs(store: &State<Store>) -> ApiResult<Json<Vec<Song>>> {
    let songs = store.list_songs().await?;
    Ok(Json(songs))
}

#[get("/artists")]
pub async fn list_artists(store: &State<Store>) -> ApiResult<Json<Vec<Artist>>> {
    let artists = store.list_artists().await?;
    Ok(Json(artists))
}

#[post("/login", data = "<credentials>")]
pub async fn login(
    store: &State<Store>,
    sessions: &State<SessionRegistry>,
    cookies: &CookieJar<'_>,
    credentials: Json<Credentials>,
) -> ApiResult<Json<Success>> {
    let user = store
        .find_user(&credentials.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&credentials.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = sessions.open(&user.username).await;
    cookies.add_private(Cookie::new(SESSION_COOKIE, token.to_string()));
    info!("admin {} (user {}) logged in", user.username, user.id);

    Ok(Json(Success { success: true }))
}

#[post("/logout")]
pub async fn logout(sessions: &State<SessionRegistry>, cookies: &CookieJar<'_>) -> Json<Success> {
    let token = cookies
        .get_private(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

    if let Some(token) = token {
        sessions.close(&token).await;
    }
    cookies.remove_private(SESSION_COOKIE);

    Json(Success { success: true })
}

fn validate_artist(artist: &ArtistInput) -> ApiResult<()> {
    if artist.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("artist name must not be empty".to_owned()));
    }
    Ok(())
}

fn validate_song(song: &SongInput) -> ApiResult<()> {
    if song.title.trim().is_empty() || song.url.trim().is_empty() {
        return Err(ApiError::InvalidInput("song title and url are required".to_owned()));
    }
    Ok(())
}

#[post("/artists", data = "<artist>")]
pub async fn create_artist(
    admin: AdminSession,
    store: &State<Store>,
    artist: Json<ArtistInput>,
) -> ApiResult<Json<Created>> {
    validate_artist(&artist)?;
    let id = store.create_artist(&artist).await?;
    info!("{} created artist {} ({})", admin.username, id, artist.name);
    Ok(Json(Created { id }))
}

#[put("/artists/<id>", data = "<artist>")]
pub async fn update_artist(
    admin: AdminSession,
    store: &State<Store>,
    id: ArtistId,
    artist: Json<ArtistInput>,
) -> ApiResult<Json<Changes>> {
    validate_artist(&artist)?;
    let changes = store.update_artist(id, &artist).await?;
    info!("{} updated artist {}", admin.username, id);
    Ok(Json(Changes { changes }))
}

#[delete("/artists/<id>")]
pub async fn delete_artist(
    admin: AdminSession,
    store: &State<Store>,
    id: ArtistId,
) -> ApiResult<Json<Changes>> {
    let changes = store.delete_artist(id).await?;
    info!("{} deleted artist {}", admin.username, id);
    Ok(Json(Changes { changes }))
}

#[post("/songs", data = "<song>")]
pub async fn create_song(
    admin: AdminSession,
    store: &State<Store>,
    song: Json<SongInput>,
) -> ApiResult<Json<Created>> {
    validate_song(&song)?;
    let id = store.create_song(&song).await?;
    info!("{} created song {} ({})", admin.username, id, song.title);
    Ok(Json(Created { id }))
}

#[put("/songs/<id>", data = "<song>")]
pub async fn update_song(
    admin: AdminSession,
    store: &State<Store>,
    id: SongId,
    song: Json<SongInput>,
) -> ApiResult<Json<Changes>> {
    validate_song(&song)?;
    let changes = store.update_song(id, &song).await?;
    info!("{} updated song {}", admin.username, id);
    Ok(Json(Changes { changes }))
}

#[delete("/songs/<id>")]
pub async fn delete_song(
    admin: AdminSession,
    store: &State<Store>,
    id: SongId,
) -> ApiResult<Json<Changes>> {
    let changes = store.delete_song(id).await?;
    info!("{} deleted song {}", admin.username, id);
    Ok(Json(Changes { changes }))
}

fn error_body(message: &str) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.to_owned(),
    })
}

#[catch(401)]
pub fn unauthorized() -> Json<ErrorBody> {
    error_body("Unauthorized")
}

#[catch(404)]
pub fn not_found() -> Json<ErrorBody> {
    error_body("Not found")
}

#[catch(422)]
pub fn unprocessable() -> Json<ErrorBody> {
    error_body("Malformed request body")
}

#[catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    error_body("Internal server error")
}
