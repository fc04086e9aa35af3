//! The remote playlist service as seen by the store.

use crate::error::Result;
use crate::types::{Playlist, PlaylistDraft, Song, SyncReport, SyncScope};
use async_trait::async_trait;

/// Request/response operations of the remote playlist service.
///
/// `PlaylistClient` implements this over HTTP. The store only depends on
/// the trait, so it can run against any backend.
#[async_trait]
pub trait PlaylistService: Send + Sync {
    /// List the user's playlists without songs.
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;

    /// List the user's playlists with their songs.
    async fn list_playlists_detailed(&self) -> Result<Vec<Playlist>>;

    /// Get one playlist with its songs.
    async fn get_playlist(&self, id: i64) -> Result<Playlist>;

    async fn create_playlist(&self, draft: &PlaylistDraft) -> Result<Playlist>;

    async fn update_playlist(&self, id: i64, draft: &PlaylistDraft) -> Result<Playlist>;

    async fn delete_playlist(&self, id: i64) -> Result<()>;

    /// Add a song; the returned song carries the id the service assigned.
    async fn add_song(&self, playlist_id: i64, song: &Song) -> Result<Song>;

    async fn remove_song(&self, playlist_id: i64, song_id: i64) -> Result<()>;

    /// Persist a new song order. The new order is not echoed back.
    async fn reorder_songs(&self, playlist_id: i64, song_ids: &[i64]) -> Result<()>;

    /// Re-read a song's metadata from the external catalog.
    async fn refresh_song(&self, song_id: i64) -> Result<()>;

    /// Search the external catalog.
    async fn search_songs(&self, query: &str, limit: Option<u32>) -> Result<Vec<Song>>;

    /// Trigger an account-wide sync with the external provider.
    async fn sync(&self, scope: SyncScope) -> Result<SyncReport>;

    /// Trigger a sync of a single linked playlist.
    async fn sync_playlist(&self, playlist_id: i64) -> Result<()>;
}
