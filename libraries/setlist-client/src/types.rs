//! Types for Setlist API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default path prefix of the versioned API.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Configuration for connecting to the playlist service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service (e.g., "https://playlists.example.com")
    pub url: String,
    /// Path prefix prepended to every endpoint
    pub api_prefix: String,
    /// Bearer token supplied by the session (if logged in)
    pub access_token: Option<String>,
}

impl ClientConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            access_token: None,
        }
    }

    /// Create a config with an existing session token.
    pub fn with_token(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::new(url)
        }
    }

    /// Replace the API prefix.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }
}

// =============================================================================
// Playlist Types
// =============================================================================

/// A playlist as returned by the service.
///
/// `songs` is only present on detail responses. List responses leave it as
/// `None`, which is different from an empty playlist (`Some(vec![])`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Playlist {
    pub id: i64,
    pub user_id: i64,
    /// Identifier in the external provider, once linked
    #[serde(default, alias = "tidal_id", skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<Song>>,
}

impl Playlist {
    /// Overlay a partial representation returned by an update.
    ///
    /// Scalar fields are taken from `update`. Optional fields the update
    /// did not carry (`remote_id`, `last_synced_at`, `songs`) are kept.
    /// Both sides must describe the same playlist.
    pub fn overlay(&mut self, update: Playlist) {
        debug_assert_eq!(self.id, update.id, "overlay across different playlists");
        self.user_id = update.user_id;
        self.name = update.name;
        self.description = update.description;
        self.created_at = update.created_at;
        self.updated_at = update.updated_at;
        if update.remote_id.is_some() {
            self.remote_id = update.remote_id;
        }
        if update.last_synced_at.is_some() {
            self.last_synced_at = update.last_synced_at;
        }
        if update.songs.is_some() {
            self.songs = update.songs;
        }
    }

    /// Whether the playlist is linked to the external provider.
    pub fn is_linked(&self) -> bool {
        self.remote_id.is_some()
    }
}

/// Request body for creating or updating a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: Option<String>,
}

impl PlaylistDraft {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
        }
    }
}

// =============================================================================
// Song Types
// =============================================================================

/// A song inside a playlist, or a catalog search hit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Song {
    /// Assigned by the service; absent on songs not yet added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Identifier in the external catalog
    #[serde(alias = "tidal_id")]
    pub remote_track_id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl Song {
    /// A catalog track that has not been added to any playlist yet.
    pub fn new(
        remote_track_id: i64,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            remote_track_id,
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            cover_url: None,
            is_available: None,
        }
    }

    pub fn with_cover(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }
}

// =============================================================================
// Sync Types
// =============================================================================

/// Which category of remote data an account-wide sync covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncScope {
    Playlists,
    Tracks,
    Mixes,
}

impl SyncScope {
    /// Value of the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncScope::Playlists => "playlists",
            SyncScope::Tracks => "tracks",
            SyncScope::Mixes => "mixes",
        }
    }

    /// Parse from the query-parameter form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "playlists" => Some(SyncScope::Playlists),
            "tracks" => Some(SyncScope::Tracks),
            "mixes" => Some(SyncScope::Mixes),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyncScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result payload of an account-wide sync.
///
/// The store does not interpret it. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SyncReport {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub playlists_count: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// Error Types
// =============================================================================

/// Error body returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Usually a message, but validation failures send a list of problems
    pub detail: Option<serde_json::Value>,
}
