//! The operations a store performs against the remote service.

use std::fmt;

/// One store operation.
///
/// Each operation has a fixed fallback message used when the remote
/// failure carries no `detail`, and a fixed policy on whether the failure
/// is returned to the caller or only recorded in the error slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchPlaylists,
    FetchPlaylistsDetailed,
    FetchPlaylist,
    CreatePlaylist,
    UpdatePlaylist,
    DeletePlaylist,
    AddSong,
    RemoveSong,
    ReorderSongs,
    RefreshSong,
    SearchSongs,
    SyncData,
    SyncPlaylist,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FetchPlaylists => "fetch_playlists",
            Operation::FetchPlaylistsDetailed => "fetch_playlists_detailed",
            Operation::FetchPlaylist => "fetch_playlist",
            Operation::CreatePlaylist => "create_playlist",
            Operation::UpdatePlaylist => "update_playlist",
            Operation::DeletePlaylist => "delete_playlist",
            Operation::AddSong => "add_song",
            Operation::RemoveSong => "remove_song",
            Operation::ReorderSongs => "reorder_songs",
            Operation::RefreshSong => "refresh_song",
            Operation::SearchSongs => "search_songs",
            Operation::SyncData => "sync_data",
            Operation::SyncPlaylist => "sync_playlist",
        }
    }

    /// Message recorded when the service gives no `detail`.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::FetchPlaylists => "Failed to fetch playlists",
            Operation::FetchPlaylistsDetailed => "Failed to fetch detailed playlists",
            Operation::FetchPlaylist => "Failed to fetch playlist",
            Operation::CreatePlaylist => "Failed to create playlist",
            Operation::UpdatePlaylist => "Failed to update playlist",
            Operation::DeletePlaylist => "Failed to delete playlist",
            Operation::AddSong => "Failed to add song",
            Operation::RemoveSong => "Failed to remove song",
            Operation::ReorderSongs => "Failed to reorder songs",
            Operation::RefreshSong => "Failed to refresh song",
            Operation::SearchSongs => "Failed to search songs",
            Operation::SyncData => "Failed to sync data",
            Operation::SyncPlaylist => "Failed to sync playlist",
        }
    }

    /// Whether a failure is returned to the caller.
    ///
    /// Fetches and deletes only record the failure; callers poll
    /// [`PlaylistStore::error`](crate::PlaylistStore::error).
    pub fn rethrows(&self) -> bool {
        !matches!(
            self,
            Operation::FetchPlaylists
                | Operation::FetchPlaylistsDetailed
                | Operation::FetchPlaylist
                | Operation::DeletePlaylist
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
