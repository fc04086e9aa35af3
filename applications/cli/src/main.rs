//! Setlist - playlist management against a remote playlist service
mod config;
mod output;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use crate::config::CliConfig;
use setlist_client::PlaylistClient;
use setlist_store::{PlaylistStore, Song, SyncScope};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "setlist")]
#[command(about = "Manage and sync playlists on a playlist server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server URL (overrides the configuration)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Access token (overrides the configuration)
    #[arg(long, env = "SETLIST_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List playlists
    List {
        /// Include each playlist's songs
        #[arg(long)]
        detailed: bool,
    },
    /// Show one playlist with its songs
    Show { id: i64 },
    /// Create a playlist
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename or re-describe a playlist
    Update {
        id: i64,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a playlist
    Delete { id: i64 },
    /// Add a catalog track to a playlist
    AddSong {
        playlist_id: i64,
        /// Track id in the external catalog
        #[arg(long)]
        track_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        #[arg(long)]
        album: String,
        #[arg(long)]
        cover_url: Option<String>,
    },
    /// Remove a song from a playlist
    RemoveSong { playlist_id: i64, song_id: i64 },
    /// Set the song order of a playlist
    Reorder {
        playlist_id: i64,
        /// Song ids in their new order
        #[arg(required = true)]
        song_ids: Vec<i64>,
    },
    /// Re-read a song from the external catalog
    RefreshSong {
        song_id: i64,
        /// Load this playlist first so it is reloaded afterwards
        #[arg(long)]
        playlist: Option<i64>,
    },
    /// Sync the account with the external provider
    Sync {
        #[arg(long, default_value = "playlists", value_parser = parse_scope)]
        scope: SyncScope,
    },
    /// Sync one linked playlist
    SyncPlaylist { id: i64 },
    /// Search the external catalog
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

fn parse_scope(value: &str) -> std::result::Result<SyncScope, String> {
    SyncScope::parse(value)
        .ok_or_else(|| format!("unknown scope '{value}' (expected playlists, tracks or mixes)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.server.url = url;
    }
    if let Some(token) = cli.token {
        config.auth.token = Some(token);
    }
    config.validate()?;

    tracing::debug!(url = %config.server.url, "Using playlist server");
    let client = PlaylistClient::new(config.client_config())?;
    let store = PlaylistStore::new(client);

    execute(&store, cli.command).await
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_filter =
        format!("setlist_cli={level},setlist_store={level},setlist_client={level}");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute(store: &PlaylistStore<PlaylistClient>, command: Commands) -> Result<()> {
    match command {
        Commands::List { detailed } => {
            if detailed {
                store.fetch_playlists_detailed().await;
            } else {
                store.fetch_playlists().await;
            }
            check(store)?;
            output::print_playlists(&store.playlists());
        }
        Commands::Show { id } => {
            store.fetch_playlist(id).await;
            check(store)?;
            if let Some(playlist) = store.current_playlist() {
                output::print_playlist(&playlist);
            }
        }
        Commands::Create { name, description } => {
            let created = store
                .create_playlist(&name, description.as_deref())
                .await?;
            println!("Created playlist {} - {}", created.id, created.name);
        }
        Commands::Update {
            id,
            name,
            description,
        } => {
            let updated = store
                .update_playlist(id, &name, description.as_deref())
                .await?;
            println!("Updated playlist {} - {}", updated.id, updated.name);
        }
        Commands::Delete { id } => {
            store.delete_playlist(id).await;
            check(store)?;
            println!("Deleted playlist {id}");
        }
        Commands::AddSong {
            playlist_id,
            track_id,
            title,
            artist,
            album,
            cover_url,
        } => {
            let mut song = Song::new(track_id, title, artist, album);
            if let Some(cover_url) = cover_url {
                song = song.with_cover(cover_url);
            }
            let added = store.add_song(playlist_id, song).await?;
            match added.id {
                Some(id) => println!("Added song {id} to playlist {playlist_id}"),
                None => println!("Added song to playlist {playlist_id}"),
            }
        }
        Commands::RemoveSong {
            playlist_id,
            song_id,
        } => {
            store.remove_song(playlist_id, song_id).await?;
            println!("Removed song {song_id} from playlist {playlist_id}");
        }
        Commands::Reorder {
            playlist_id,
            song_ids,
        } => {
            store.reorder_songs(playlist_id, &song_ids).await?;
            println!("Reordered {} songs in playlist {playlist_id}", song_ids.len());
        }
        Commands::RefreshSong { song_id, playlist } => {
            if let Some(playlist_id) = playlist {
                store.fetch_playlist(playlist_id).await;
                check(store)?;
            }
            store.refresh_song(song_id).await?;
            println!("Refreshed song {song_id}");
            if let Some(current) = store.current_playlist() {
                output::print_playlist(&current);
            }
        }
        Commands::Sync { scope } => {
            let report = store.sync_data(scope).await?;
            output::print_report(&report);
            output::print_playlists(&store.playlists());
        }
        Commands::SyncPlaylist { id } => {
            store.sync_playlist(id).await?;
            if let Some(playlist) = store.current_playlist() {
                output::print_playlist(&playlist);
            }
        }
        Commands::Search { query, limit } => {
            let songs = store.search_songs(&query, limit).await?;
            output::print_songs(&songs);
        }
    }

    Ok(())
}

/// Fetches and deletes only record their failures; surface them as errors.
fn check(store: &PlaylistStore<PlaylistClient>) -> Result<()> {
    match store.error() {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}
