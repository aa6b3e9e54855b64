use anyhow::{Context, Result};
use clap::clap_derive::*;
use clap::Parser;
use client::ShuffleClient;
use shuffle_core::{
    types::{ArtistInput, SongInput},
    CatalogError, RotationEngine,
};
use tracing_subscriber::EnvFilter;

mod client;
mod player;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct TopLevel {
    #[clap(long, env = "SHUFFLE_ADDRESS", default_value = "localhost:3000", value_parser)]
    /// host:port of the shuffle backend
    address: String,

    #[clap(short, long, env = "SHUFFLE_USERNAME", default_value = "admin", value_parser)]
    /// admin account used for catalog changes
    username: String,

    #[clap(short, long, env = "SHUFFLE_PASSWORD", value_parser)]
    password: Option<String>,

    #[clap(subcommand)]
    command: Subcommands,
}

#[derive(Subcommand, Debug)]
enum Subcommands {
    /// List the catalog with every credited artist
    Songs,

    Artists,

    AddArtist {
        #[clap(short, long, value_parser)]
        name: String,
        #[clap(short, long, value_parser)]
        affiliation: Option<String>,
    },

    UpdateArtist {
        #[clap(long, value_parser)]
        id: i64,
        #[clap(short, long, value_parser)]
        name: String,
        #[clap(short, long, value_parser)]
        affiliation: Option<String>,
    },

    DeleteArtist {
        #[clap(long, value_parser)]
        id: i64,
    },

    AddSong {
        #[clap(short, long, value_parser)]
        title: String,
        #[clap(long, value_parser)]
        url: String,
        #[clap(short, long = "artist", value_parser)]
        /// artist id, repeat for duets; order is kept
        artists: Vec<i64>,
    },

    /// Replace a song's title, url and its whole artist list
    UpdateSong {
        #[clap(long, value_parser)]
        id: i64,
        #[clap(short, long, value_parser)]
        title: String,
        #[clap(long, value_parser)]
        url: String,
        #[clap(short, long = "artist", value_parser)]
        artists: Vec<i64>,
    },

    DeleteSong {
        #[clap(long, value_parser)]
        id: i64,
    },

    /// Shuffle through the catalog in the terminal
    Play,
}

impl Subcommands {
    fn needs_admin(&self) -> bool {
        !matches!(
            self,
            Subcommands::Songs | Subcommands::Artists | Subcommands::Play
        )
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = TopLevel::parse();
    let client = ShuffleClient::new(&args.address)?;

    if args.command.needs_admin() {
        let password = args
            .password
            .as_deref()
            .context("catalog changes need --password or SHUFFLE_PASSWORD")?;
        client.login(&args.username, password)?;
    }

    match args.command {
        Subcommands::Songs => {
            for song in client.songs()? {
                println!("{:>4}  {}", song.id, song.now_playing());
                println!("      {}", song.url);
            }
        }
        Subcommands::Artists => {
            for artist in client.artists()? {
                println!("{:>4}  {}", artist.id, artist.credit());
            }
        }
        Subcommands::AddArtist { name, affiliation } => {
            let created = client.create_artist(&ArtistInput { name, affiliation })?;
            println!("created artist {}", created.id);
        }
        Subcommands::UpdateArtist {
            id,
            name,
            affiliation,
        } => {
            let res = client.update_artist(id, &ArtistInput { name, affiliation })?;
            println!("updated {} artist(s)", res.changes);
        }
        Subcommands::DeleteArtist { id } => {
            let res = client.delete_artist(id)?;
            println!("deleted {} artist(s)", res.changes);
        }
        Subcommands::AddSong {
            title,
            url,
            artists,
        } => {
            let created = client.create_song(&SongInput {
                title,
                url,
                artists,
            })?;
            println!("created song {}", created.id);
        }
        Subcommands::UpdateSong {
            id,
            title,
            url,
            artists,
        } => {
            let res = client.update_song(
                id,
                &SongInput {
                    title,
                    url,
                    artists,
                },
            )?;
            println!("updated {} song(s)", res.changes);
        }
        Subcommands::DeleteSong { id } => {
            let res = client.delete_song(id)?;
            println!("deleted {} song(s)", res.changes);
        }
        Subcommands::Play => {
            let songs = client
                .songs()
                .map_err(|err| CatalogError::CatalogUnavailable(err.to_string()))?;
            let mut engine = RotationEngine::initialize(songs);
            let stdin = std::io::stdin();
            player::run_session(&mut engine, stdin.lock(), &mut std::io::stdout())?;
        }
    }

    Ok(())
}
