use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    tokio::sync::RwLock,
    Request,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::persistence::Store;

pub const SESSION_COOKIE: &str = "shuffle_session";

pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

struct Session {
    username: String,
    opened: Instant,
}

/// Logged-in admin sessions, keyed by the token stored in the private cookie.
/// A session lapses `ttl` after login; lapsed entries are dropped on the next login.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn open(&self, username: &str) -> Uuid {
        let token = Uuid::new_v4();
        let mut writable = self.sessions.write().await;
        let before = writable.len();
        writable.retain(|_, session| session.opened.elapsed() < self.ttl);
        if writable.len() < before {
            debug!("dropped {} lapsed sessions", before - writable.len());
        }
        writable.insert(
            token,
            Session {
                username: username.to_owned(),
                opened: Instant::now(),
            },
        );
        token
    }

    pub async fn username(&self, token: &Uuid) -> Option<String> {
        let readable = self.sessions.read().await;
        readable
            .get(token)
            .filter(|session| session.opened.elapsed() < self.ttl)
            .map(|session| session.username.clone())
    }

    pub async fn close(&self, token: &Uuid) {
        let mut writable = self.sessions.write().await;
        writable.remove(token);
    }
}

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("{}", err))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, target_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Creates the configured admin account unless it already exists.
pub async fn seed_admin(store: &Store, username: &str, password: &str) -> Result<()> {
    if store.find_user(username).await?.is_some() {
        debug!("admin user {} already present", username);
        return Ok(());
    }

    let hash = hash_password(password)?;
    store.create_user(username, &hash).await?;
    info!("created admin user {}", username);
    Ok(())
}

/// Request guard for the admin surface. Fails with 401 unless the request
/// carries a private session cookie that maps to a live session.
pub struct AdminSession {
    pub username: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminSession {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(sessions) = request.rocket().state::<SessionRegistry>() else {
            return Outcome::Error((
                Status::InternalServerError,
                anyhow::Error::msg("failed to find the session registry"),
            ));
        };

        let token = request
            .cookies()
            .get_private(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
        let Some(token) = token else {
            return Outcome::Error((Status::Unauthorized, anyhow::Error::msg("not logged in")));
        };

        match sessions.username(&token).await {
            Some(username) => Outcome::Success(AdminSession { username }),
            None => Outcome::Error((
                Status::Unauthorized,
                anyhow::Error::msg("session expired"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("admin123").unwrap();

        assert!(verify_password("admin123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("admin123", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn sessions_open_and_close() {
        let registry = SessionRegistry::default();
        let token = registry.open("admin").await;

        assert_eq!(registry.username(&token).await.as_deref(), Some("admin"));
        registry.close(&token).await;
        assert_eq!(registry.username(&token).await, None);
    }

    #[tokio::test]
    async fn lapsed_sessions_are_rejected_and_pruned() {
        let registry = SessionRegistry::with_ttl(Duration::ZERO);
        let first = registry.open("admin").await;

        assert_eq!(registry.username(&first).await, None);

        registry.open("admin").await;
        assert_eq!(registry.sessions.read().await.len(), 1);
    }
}
