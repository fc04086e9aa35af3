//! Setlist Client
//!
//! Data model and HTTP client for the remote playlist service.
//!
//! # Features
//!
//! - **Playlists**: list (flat or with songs), get, create, update, delete
//! - **Songs**: add, remove, reorder, refresh from the catalog, search
//! - **Sync**: account-wide sync by scope, single-playlist sync
//!
//! The [`PlaylistService`] trait is the seam the store is written against;
//! [`PlaylistClient`] implements it over HTTP.
//!
//! # Example
//!
//! ```ignore
//! use setlist_client::{ClientConfig, PlaylistClient, PlaylistDraft, PlaylistService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::with_token("https://playlists.example.com", "token");
//!     let client = PlaylistClient::new(config)?;
//!
//!     let created = client
//!         .create_playlist(&PlaylistDraft::new("Road Trip", None))
//!         .await?;
//!     println!("Created playlist {}", created.id);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod service;
mod timestamp;
mod types;

pub use client::PlaylistClient;
pub use error::{ClientError, Result};
pub use service::PlaylistService;
pub use types::{
    ApiError, ClientConfig, Playlist, PlaylistDraft, Song, SyncReport, SyncScope,
    DEFAULT_API_PREFIX,
};
