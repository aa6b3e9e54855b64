use std::path::PathBuf;

use anyhow::{bail, Result};
use rocket::{figment::Figment, Config};
use serde::Deserialize;

/// Service settings, read from `Rocket.toml` and `SHUFFLE_*` environment variables.
///
/// Outside the debug profile Rocket's own `secret_key` must also be set
/// (`SHUFFLE_SECRET_KEY` or `ROCKET_SECRET_KEY`); it signs the admin session cookie.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    /// Holds `index.html` and the wasm-pack `pkg/` output. Only those are served.
    pub static_dir: PathBuf,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://shuffle.db".to_owned(),
            static_dir: PathBuf::from("frontend"),
            admin_username: "admin".to_owned(),
            admin_password: "admin123".to_owned(),
        }
    }
}

/// Rocket refuses to ignite a non-debug profile without a secret key. Checking
/// first lets startup name the variables that provide one.
pub fn check_secret_key(figment: &Figment) -> Result<()> {
    if *figment.profile() == Config::DEBUG_PROFILE || figment.contains("secret_key") {
        return Ok(());
    }
    bail!(
        "profile {} needs a secret key for session cookies: set SHUFFLE_SECRET_KEY or ROCKET_SECRET_KEY",
        figment.profile()
    )
}
