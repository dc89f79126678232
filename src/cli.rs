use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;
use spotr::clients::deezer::DEFAULT_BASE_URL;
use spotr::clients::errors::Result;
use spotr::config::{Settings, default_token_cache_path};
use spotr::syncer;

#[derive(Parser)]
#[command(name = "spotr")]
#[command(version, about = "Move tracks from a Spotify playlist into a list of Deezer links", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the playlist, append new links and remove resolved tracks
    Sync(SyncArgs),
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// Spotify user owning the playlist
    #[arg(long, env = "SPOTR_USERNAME")]
    username: String,

    #[arg(long, env = "RSPOTIFY_CLIENT_ID")]
    client_id: String,

    #[arg(long, env = "RSPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    #[arg(long, env = "RSPOTIFY_REDIRECT_URI", default_value = "http://localhost")]
    redirect_uri: String,

    /// Exact name of the playlist to drain
    #[arg(long, env = "SPOTR_PLAYLIST")]
    playlist: String,

    /// File the Deezer links are appended to
    #[arg(long, env = "SPOTR_OUTPUT", default_value = "links.txt")]
    output: PathBuf,

    #[arg(long, env = "SPOTR_CATALOG_URL", default_value = DEFAULT_BASE_URL)]
    catalog_url: String,

    /// Where the Spotify token is cached between runs
    #[arg(long, env = "SPOTR_TOKEN_CACHE")]
    token_cache: Option<PathBuf>,
}

impl From<SyncArgs> for Settings {
    fn from(args: SyncArgs) -> Self {
        Settings {
            username: args.username,
            client_id: args.client_id,
            client_secret: args.client_secret,
            redirect_uri: args.redirect_uri,
            playlist: args.playlist,
            output_file: args.output,
            catalog_url: args.catalog_url,
            token_cache_path: args.token_cache.unwrap_or_else(default_token_cache_path),
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync(args) => {
            sync_tracks(Settings::from(args).validate()?).await?;
        }
    }
    Ok(())
}

async fn sync_tracks(settings: Settings) -> Result<()> {
    info!("Building config ...");
    let config = syncer::Config::from_settings(&settings);
    let syncer = syncer::Syncer::new(config);
    syncer.sync().await?;
    Ok(())
}
