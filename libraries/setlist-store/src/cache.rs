//! Entity cache: the in-memory mirror of the user's playlists.
//!
//! Holds the flat collection, the optional current playlist, the shared
//! loading flag and the last-error slot. Only the store mutates it; every
//! mutator here is crate-private.
//!
//! Reconciliations apply in completion order. The one ordering guard is on
//! collection membership: each read request records the revision it was
//! issued at, and when its response lands, creates and deletes confirmed
//! after that revision win over the (stale) response.

use setlist_client::{Playlist, Song};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// A create or delete confirmed while reads were in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MembershipChange {
    Created { id: i64, revision: u64 },
    Deleted { id: i64, revision: u64 },
}

impl MembershipChange {
    fn revision(&self) -> u64 {
        match self {
            MembershipChange::Created { revision, .. }
            | MembershipChange::Deleted { revision, .. } => *revision,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct EntityCache {
    playlists: Vec<Playlist>,
    current: Option<Playlist>,
    loading: bool,
    error: Option<String>,

    revision: u64,
    /// Revision of the last `clear`; reads issued before it are discarded
    cleared_at: u64,
    journal: Vec<MembershipChange>,
    /// Issue revision -> number of reads still waiting on a response
    open_reads: BTreeMap<u64, usize>,
}

impl EntityCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub(crate) fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub(crate) fn playlist(&self, id: i64) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub(crate) fn current(&self) -> Option<&Playlist> {
        self.current.as_ref()
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // =========================================================================
    // Operation bookkeeping
    // =========================================================================

    /// Start of any operation: busy, and the previous error is forgotten.
    pub(crate) fn begin_operation(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// The flag is shared, so this also clears it for any sibling still running.
    pub(crate) fn finish_operation(&mut self) {
        self.loading = false;
    }

    pub(crate) fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Register a read request and return the revision it was issued at.
    pub(crate) fn open_read(&mut self) -> u64 {
        *self.open_reads.entry(self.revision).or_insert(0) += 1;
        self.revision
    }

    pub(crate) fn close_read(&mut self, issued_at: u64) {
        if let Some(count) = self.open_reads.get_mut(&issued_at) {
            *count -= 1;
            if *count == 0 {
                self.open_reads.remove(&issued_at);
            }
        }

        match self.open_reads.keys().next().copied() {
            Some(oldest) => self.journal.retain(|change| change.revision() > oldest),
            None => self.journal.clear(),
        }
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn log_change(&mut self, change: MembershipChange) {
        if !self.open_reads.is_empty() {
            self.journal.push(change);
        }
    }

    fn issued_before_clear(&self, issued_at: u64) -> bool {
        issued_at < self.cleared_at
    }

    fn deleted_since(&self, issued_at: u64, id: i64) -> bool {
        self.journal.iter().any(|change| {
            matches!(change, MembershipChange::Deleted { id: deleted, revision }
                if *deleted == id && *revision > issued_at)
        })
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Replace the whole collection with a list response.
    ///
    /// Playlists deleted after `issued_at` are dropped from the response and
    /// playlists created after it are carried over. Duplicate ids in the
    /// response keep their first occurrence. A response to a read issued
    /// before the last `clear` is dropped.
    pub(crate) fn replace_collection(&mut self, fresh: Vec<Playlist>, issued_at: u64) {
        if self.issued_before_clear(issued_at) {
            debug!(received = fresh.len(), "Dropped playlist list issued before clear");
            return;
        }

        let received = fresh.len();
        let mut seen = HashSet::new();
        let mut next: Vec<Playlist> = fresh
            .into_iter()
            .filter(|p| !self.deleted_since(issued_at, p.id))
            .filter(|p| seen.insert(p.id))
            .collect();

        let created: Vec<i64> = self
            .journal
            .iter()
            .filter_map(|change| match change {
                MembershipChange::Created { id, revision } if *revision > issued_at => Some(*id),
                _ => None,
            })
            .collect();
        for id in created {
            if seen.contains(&id) {
                continue;
            }
            if let Some(kept) = self.playlist(id).cloned() {
                seen.insert(id);
                next.push(kept);
            }
        }

        if next.len() != received {
            debug!(
                received,
                kept = next.len(),
                "Adjusted stale playlist list for newer creates and deletes"
            );
        }

        self.playlists = next;
        self.bump();
    }

    /// Replace the current playlist with a detail response.
    ///
    /// Returns `false` if the playlist was deleted, or the cache cleared,
    /// after the request was issued; the response is dropped in that case.
    pub(crate) fn replace_current(&mut self, playlist: Playlist, issued_at: u64) -> bool {
        if self.issued_before_clear(issued_at) {
            debug!(playlist_id = playlist.id, "Dropped detail response issued before clear");
            return false;
        }
        if self.deleted_since(issued_at, playlist.id) {
            debug!(playlist_id = playlist.id, "Dropped detail response for deleted playlist");
            return false;
        }

        self.current = Some(playlist);
        self.bump();
        true
    }

    /// Add a playlist the service just created.
    ///
    /// An id that is already cached replaces its entry, and the current
    /// playlist with that id gets the response overlaid.
    pub(crate) fn insert_created(&mut self, playlist: Playlist) {
        let id = playlist.id;
        if let Some(current) = self.current.as_mut().filter(|c| c.id == id) {
            current.overlay(playlist.clone());
        }
        match self.playlists.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = playlist,
            None => self.playlists.push(playlist),
        }

        let revision = self.bump();
        self.log_change(MembershipChange::Created { id, revision });
    }

    /// Apply an update response: the collection entry is replaced and the
    /// current playlist, if it is the same one, gets the response overlaid.
    pub(crate) fn apply_update(&mut self, updated: Playlist) {
        if let Some(current) = self.current.as_mut().filter(|c| c.id == updated.id) {
            current.overlay(updated.clone());
        }
        if let Some(entry) = self.playlists.iter_mut().find(|p| p.id == updated.id) {
            *entry = updated;
        }
        self.bump();
    }

    pub(crate) fn remove_playlist(&mut self, id: i64) {
        self.playlists.retain(|p| p.id != id);
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }

        let revision = self.bump();
        self.log_change(MembershipChange::Deleted { id, revision });
    }

    /// Append a confirmed song to both representations of the playlist.
    ///
    /// A song whose id is already present is not added again. Playlists
    /// whose songs were never loaded stay that way.
    pub(crate) fn append_song(&mut self, playlist_id: i64, song: &Song) {
        let entry = self.playlists.iter_mut().find(|p| p.id == playlist_id);
        let current = self.current.as_mut().filter(|c| c.id == playlist_id);

        for playlist in entry.into_iter().chain(current) {
            if let Some(songs) = playlist.songs.as_mut() {
                push_unique(songs, song);
            }
        }
        self.bump();
    }

    pub(crate) fn remove_song(&mut self, playlist_id: i64, song_id: i64) {
        let entry = self.playlists.iter_mut().find(|p| p.id == playlist_id);
        let current = self.current.as_mut().filter(|c| c.id == playlist_id);

        for playlist in entry.into_iter().chain(current) {
            if let Some(songs) = playlist.songs.as_mut() {
                songs.retain(|s| s.id != Some(song_id));
            }
        }
        self.bump();
    }

    /// Forget all cached entities, e.g. when the session ends.
    pub(crate) fn clear(&mut self) {
        self.playlists.clear();
        self.current = None;
        self.error = None;
        self.cleared_at = self.bump();
    }
}

fn push_unique(songs: &mut Vec<Song>, song: &Song) {
    let duplicate = song
        .id
        .is_some_and(|id| songs.iter().any(|s| s.id == Some(id)));
    if !duplicate {
        songs.push(song.clone());
    }
}
