//! Playlist store: mutation operations over the entity cache.

use crate::cache::EntityCache;
use crate::error::{RemoteResultExt, Result};
use crate::operation::Operation;
use setlist_client::{Playlist, PlaylistDraft, PlaylistService, Song};
use std::future::Future;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Client-side state of the user's playlists, kept in step with the
/// remote playlist service.
///
/// Every operation follows the same protocol: mark the store busy and clear
/// the last error, call the service, reconcile the cache on success, record
/// the failure message otherwise. Fetches and deletes only record their
/// failures; all other operations also return them.
///
/// Operations take `&self` and may overlap. Their reconciliations apply in
/// completion order, and the busy flag is shared between them.
///
/// # Example
///
/// ```ignore
/// use setlist_client::{ClientConfig, PlaylistClient};
/// use setlist_store::PlaylistStore;
///
/// let client = PlaylistClient::new(ClientConfig::with_token(url, token))?;
/// let store = PlaylistStore::new(client);
///
/// store.fetch_playlists().await;
/// if let Some(message) = store.error() {
///     eprintln!("{message}");
/// }
///
/// let created = store.create_playlist("Road Trip", None).await?;
/// store.fetch_playlist(created.id).await;
/// ```
pub struct PlaylistStore<S> {
    service: S,
    cache: RwLock<EntityCache>,
}

/// A consistent copy of the store's state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub playlists: Vec<Playlist>,
    pub current_playlist: Option<Playlist>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<S: PlaylistService> PlaylistStore<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            cache: RwLock::new(EntityCache::new()),
        }
    }

    /// The remote service this store talks to.
    pub fn service(&self) -> &S {
        &self.service
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    pub fn playlists(&self) -> Vec<Playlist> {
        self.read().playlists().to_vec()
    }

    pub fn playlist(&self, id: i64) -> Option<Playlist> {
        self.read().playlist(id).cloned()
    }

    pub fn current_playlist(&self) -> Option<Playlist> {
        self.read().current().cloned()
    }

    /// Whether an operation is in flight.
    ///
    /// This is one flag shared by all operations: when two overlap, it goes
    /// false as soon as the first finishes.
    pub fn is_loading(&self) -> bool {
        self.read().is_loading()
    }

    /// Message of the most recently attempted operation's failure.
    pub fn error(&self) -> Option<String> {
        self.read().error().map(str::to_string)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let cache = self.read();
        StoreSnapshot {
            playlists: cache.playlists().to_vec(),
            current_playlist: cache.current().cloned(),
            loading: cache.is_loading(),
            error: cache.error().map(str::to_string),
        }
    }

    /// Forget all cached state, e.g. after the session ends.
    pub fn clear(&self) {
        self.write().clear();
    }

    // =========================================================================
    // Fetches (failures recorded only)
    // =========================================================================

    /// Replace the collection with the service's playlist list (no songs).
    pub async fn fetch_playlists(&self) {
        let _ = self
            .run(Operation::FetchPlaylists, self.load_playlists())
            .await;
    }

    /// Replace the collection with the detailed list (with songs).
    pub async fn fetch_playlists_detailed(&self) {
        let _ = self
            .run(
                Operation::FetchPlaylistsDetailed,
                self.load_playlists_detailed(),
            )
            .await;
    }

    /// Load one playlist with its songs as the current playlist.
    pub async fn fetch_playlist(&self, id: i64) {
        let _ = self
            .run(Operation::FetchPlaylist, self.load_playlist(id))
            .await;
    }

    // =========================================================================
    // Playlist mutations
    // =========================================================================

    /// Create a playlist. It enters the collection once the service confirms it.
    pub async fn create_playlist(&self, name: &str, description: Option<&str>) -> Result<Playlist> {
        let draft = PlaylistDraft::new(name, description);
        self.run(Operation::CreatePlaylist, async {
            let created = self
                .service
                .create_playlist(&draft)
                .await
                .during(Operation::CreatePlaylist)?;

            self.write().insert_created(created.clone());
            debug!(playlist_id = created.id, "Created playlist cached");
            Ok(created)
        })
        .await
    }

    /// Rename or re-describe a playlist.
    pub async fn update_playlist(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let draft = PlaylistDraft::new(name, description);
        self.run(Operation::UpdatePlaylist, async {
            let updated = self
                .service
                .update_playlist(id, &draft)
                .await
                .during(Operation::UpdatePlaylist)?;

            self.write().apply_update(updated.clone());
            Ok(updated)
        })
        .await
    }

    /// Delete a playlist. Poll [`error`](Self::error) to detect failure.
    pub async fn delete_playlist(&self, id: i64) {
        let _ = self.run(Operation::DeletePlaylist, async {
            self.service
                .delete_playlist(id)
                .await
                .during(Operation::DeletePlaylist)?;

            self.write().remove_playlist(id);
            debug!(playlist_id = id, "Deleted playlist evicted");
            Ok(())
        })
        .await;
    }

    // =========================================================================
    // Song mutations
    // =========================================================================

    /// Add a song; returns it with the id the service assigned.
    pub async fn add_song(&self, playlist_id: i64, song: Song) -> Result<Song> {
        self.run(Operation::AddSong, async {
            let added = self
                .service
                .add_song(playlist_id, &song)
                .await
                .during(Operation::AddSong)?;

            self.write().append_song(playlist_id, &added);
            Ok(added)
        })
        .await
    }

    pub async fn remove_song(&self, playlist_id: i64, song_id: i64) -> Result<()> {
        self.run(Operation::RemoveSong, async {
            self.service
                .remove_song(playlist_id, song_id)
                .await
                .during(Operation::RemoveSong)?;

            self.write().remove_song(playlist_id, song_id);
            Ok(())
        })
        .await
    }

    /// Persist a new song order.
    ///
    /// The cache is left as it was: the service does not echo the new
    /// order, so callers reflect it locally or re-fetch the playlist.
    pub async fn reorder_songs(&self, playlist_id: i64, song_ids: &[i64]) -> Result<()> {
        self.run(Operation::ReorderSongs, async {
            self.service
                .reorder_songs(playlist_id, song_ids)
                .await
                .during(Operation::ReorderSongs)?;

            debug!(playlist_id, songs = song_ids.len(), "Songs reordered remotely");
            Ok(())
        })
        .await
    }

    /// Re-read a song from the external catalog, then reload the current
    /// playlist if it has songs loaded.
    pub async fn refresh_song(&self, song_id: i64) -> Result<()> {
        self.run(Operation::RefreshSong, async {
            self.service
                .refresh_song(song_id)
                .await
                .during(Operation::RefreshSong)?;

            let reload = self.read().current().and_then(|p| {
                p.songs
                    .as_ref()
                    .filter(|songs| !songs.is_empty())
                    .map(|_| p.id)
            });
            if let Some(playlist_id) = reload {
                self.load_playlist(playlist_id).await?;
            }
            Ok(())
        })
        .await
    }

    /// Search the external catalog. Nothing is cached.
    pub async fn search_songs(&self, query: &str, limit: Option<u32>) -> Result<Vec<Song>> {
        self.run(Operation::SearchSongs, async {
            self.service
                .search_songs(query, limit)
                .await
                .during(Operation::SearchSongs)
        })
        .await
    }

    // =========================================================================
    // Steps shared with the sync coordinator
    // =========================================================================

    /// Run one operation under the shared protocol.
    pub(crate) async fn run<T, F>(&self, operation: Operation, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _busy = BusyGuard::begin(&self.cache);

        let result = work.await;
        if let Err(err) = &result {
            warn!(
                operation = %operation,
                failed_step = %err.operation(),
                returned = operation.rethrows(),
                error = %err.client_error(),
                "{}",
                err.message()
            );
            self.write().record_error(err.message());
        }
        result
    }

    pub(crate) async fn load_playlists(&self) -> Result<()> {
        let ticket = ReadTicket::open(&self.cache);
        let playlists = self
            .service
            .list_playlists()
            .await
            .during(Operation::FetchPlaylists)?;

        debug!(count = playlists.len(), "Replacing playlist collection");
        self.write().replace_collection(playlists, ticket.issued_at);
        Ok(())
    }

    pub(crate) async fn load_playlists_detailed(&self) -> Result<()> {
        let ticket = ReadTicket::open(&self.cache);
        let playlists = self
            .service
            .list_playlists_detailed()
            .await
            .during(Operation::FetchPlaylistsDetailed)?;

        debug!(count = playlists.len(), "Replacing playlist collection (detailed)");
        self.write().replace_collection(playlists, ticket.issued_at);
        Ok(())
    }

    pub(crate) async fn load_playlist(&self, id: i64) -> Result<()> {
        let ticket = ReadTicket::open(&self.cache);
        let playlist = self
            .service
            .get_playlist(id)
            .await
            .during(Operation::FetchPlaylist)?;

        self.write().replace_current(playlist, ticket.issued_at);
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, EntityCache> {
        read_cache(&self.cache)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntityCache> {
        write_cache(&self.cache)
    }
}

// The cache is only ever updated by whole assignments, so a panic while
// holding the lock cannot leave it half-written.
fn read_cache(cache: &RwLock<EntityCache>) -> RwLockReadGuard<'_, EntityCache> {
    cache.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_cache(cache: &RwLock<EntityCache>) -> RwLockWriteGuard<'_, EntityCache> {
    cache.write().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the busy flag for one operation and releases it on drop, so a
/// failed or abandoned operation still resets it.
struct BusyGuard<'a> {
    cache: &'a RwLock<EntityCache>,
}

impl<'a> BusyGuard<'a> {
    fn begin(cache: &'a RwLock<EntityCache>) -> Self {
        write_cache(cache).begin_operation();
        Self { cache }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        write_cache(self.cache).finish_operation();
    }
}

/// An outstanding read request, registered with the cache until dropped.
struct ReadTicket<'a> {
    cache: &'a RwLock<EntityCache>,
    issued_at: u64,
}

impl<'a> ReadTicket<'a> {
    fn open(cache: &'a RwLock<EntityCache>) -> Self {
        let issued_at = write_cache(cache).open_read();
        Self { cache, issued_at }
    }
}

impl Drop for ReadTicket<'_> {
    fn drop(&mut self) {
        write_cache(self.cache).close_read(self.issued_at);
    }
}
