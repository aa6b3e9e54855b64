use anyhow::{Context, Result};
use rocket::{
    fairing::{self, AdHoc},
    figment::{providers::Env, Figment},
    fs::FileServer,
    Build, Rocket,
};
use tracing::{error, info, warn};

use crate::{
    authentication::SessionRegistry,
    config::AppConfig,
    persistence::{sqlite::SqliteCatalog, Store},
};

#[macro_use]
extern crate rocket;

mod authentication;
mod config;
mod error;
mod persistence;
mod routes;
mod telemetry;

#[launch]
fn rocket() -> _ {
    telemetry::init();
    build(rocket::Config::figment().merge(Env::prefixed("SHUFFLE_").global()))
}

pub fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(AdHoc::try_on_ignite("Catalog store", init_store))
        .attach(AdHoc::on_ignite("Frontend files", mount_frontend))
        .manage(SessionRegistry::default())
        .mount("/", routes![routes::login, routes::logout])
        .mount(
            "/api",
            routes![
                routes::list_songs,
                routes::list_artists,
                routes::create_artist,
                routes::update_artist,
                routes::delete_artist,
                routes::create_song,
                routes::update_song,
                routes::delete_song,
            ],
        )
        .register(
            "/",
            catchers![
                routes::unauthorized,
                routes::not_found,
                routes::unprocessable,
                routes::internal_error,
            ],
        )
}

async fn open_store(config: &AppConfig) -> Result<Store> {
    let store = SqliteCatalog::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;
    store
        .create_tables()
        .await
        .context("failed to create catalog tables")?;
    authentication::seed_admin(&store, &config.admin_username, &config.admin_password).await?;
    Ok(store)
}

async fn init_store(rocket: Rocket<Build>) -> fairing::Result {
    if let Err(err) = config::check_secret_key(rocket.figment()) {
        error!("{:#}", err);
        return Err(rocket);
    }

    let config: AppConfig = match rocket.figment().extract() {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration: {}", err);
            return Err(rocket);
        }
    };

    match open_store(&config).await {
        Ok(store) => {
            info!("catalog store ready");
            Ok(rocket.manage(store).manage(config))
        }
        Err(err) => {
            error!("catalog store unavailable: {:#}", err);
            Err(rocket)
        }
    }
}

async fn mount_frontend(rocket: Rocket<Build>) -> Rocket<Build> {
    let Some(dir) = rocket
        .state::<AppConfig>()
        .map(|config| config.static_dir.clone())
    else {
        return rocket;
    };

    if !dir.is_dir() {
        warn!("frontend directory {} not found, serving the API only", dir.display());
        return rocket;
    }

    info!("serving frontend from {}", dir.display());
    let rocket = rocket.mount("/", routes![routes::index]);
    let bundle = dir.join("pkg");
    if bundle.is_dir() {
        rocket.mount("/pkg", FileServer::from(bundle))
    } else {
        warn!("no wasm bundle at {}, build the frontend with wasm-pack", bundle.display());
        rocket
    }
}
