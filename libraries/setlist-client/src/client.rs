//! HTTP implementation of the playlist service.

use crate::error::{ClientError, Result};
use crate::service::PlaylistService;
use crate::types::{ClientConfig, Playlist, PlaylistDraft, Song, SyncReport, SyncScope};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Client for the remote playlist service.
///
/// The bearer token comes from the session layer through [`set_token`]
/// and is attached to every request while present. Without a token,
/// requests go out unauthenticated and the service rejects them.
///
/// # Example
///
/// ```ignore
/// use setlist_client::{ClientConfig, PlaylistClient, PlaylistService};
///
/// let client = PlaylistClient::new(ClientConfig::new("https://playlists.example.com"))?;
/// client.set_token("session-token").await;
///
/// let playlists = client.list_playlists().await?;
/// println!("Found {} playlists", playlists.len());
/// ```
///
/// [`set_token`]: PlaylistClient::set_token
#[derive(Clone)]
pub struct PlaylistClient {
    http: Client,
    config: Arc<RwLock<ClientConfig>>,
}

impl PlaylistClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let normalized_config = ClientConfig {
            url,
            api_prefix: normalize_prefix(&config.api_prefix),
            access_token: config.access_token,
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Setlist/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the service URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Base URL including the API prefix.
    pub async fn api_base(&self) -> String {
        let config = self.config.read().await;
        format!("{}{}", config.url, config.api_prefix)
    }

    /// Check if the client has a session token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Set the session token.
    pub async fn set_token(&self, access_token: impl Into<String>) {
        self.config.write().await.access_token = Some(access_token.into());
    }

    /// Drop the session token (logout).
    pub async fn clear_token(&self) {
        self.config.write().await.access_token = None;
        info!("Session token cleared");
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let config = self.config.read().await;
        let url = format!("{}{}{}", config.url, config.api_prefix, path);
        debug!(method = %method, url = %url, "Sending request");

        let builder = self.http.request(method, &url);
        match &config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ClientError::ServerUnreachable(e.to_string())
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %error_text, "Request failed");
            Err(ClientError::from_response(status.as_u16(), error_text))
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse {what}: {e}")))
    }
}

#[async_trait]
impl PlaylistService for PlaylistClient {
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let builder = self.request(Method::GET, "/playlists/").await;
        let response = self.execute(builder).await?;
        let playlists: Vec<Playlist> = Self::parse(response, "playlists").await?;

        debug!(count = playlists.len(), "Fetched playlists");
        Ok(playlists)
    }

    async fn list_playlists_detailed(&self) -> Result<Vec<Playlist>> {
        let builder = self.request(Method::GET, "/playlists/detailed").await;
        let response = self.execute(builder).await?;
        let playlists: Vec<Playlist> = Self::parse(response, "detailed playlists").await?;

        debug!(count = playlists.len(), "Fetched detailed playlists");
        Ok(playlists)
    }

    async fn get_playlist(&self, id: i64) -> Result<Playlist> {
        let builder = self.request(Method::GET, &format!("/playlists/{id}")).await;
        let response = self.execute(builder).await?;
        let playlist: Playlist = Self::parse(response, "playlist").await?;

        debug!(
            playlist_id = playlist.id,
            songs = playlist.songs.as_ref().map(Vec::len),
            "Fetched playlist"
        );
        Ok(playlist)
    }

    async fn create_playlist(&self, draft: &PlaylistDraft) -> Result<Playlist> {
        let builder = self.request(Method::POST, "/playlists/").await.json(draft);
        let response = self.execute(builder).await?;
        let playlist: Playlist = Self::parse(response, "created playlist").await?;

        info!(playlist_id = playlist.id, name = %playlist.name, "Playlist created");
        Ok(playlist)
    }

    async fn update_playlist(&self, id: i64, draft: &PlaylistDraft) -> Result<Playlist> {
        let builder = self
            .request(Method::PUT, &format!("/playlists/{id}"))
            .await
            .json(draft);
        let response = self.execute(builder).await?;
        Self::parse(response, "updated playlist").await
    }

    async fn delete_playlist(&self, id: i64) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/playlists/{id}")).await;
        self.execute(builder).await?;

        debug!(playlist_id = id, "Playlist deleted");
        Ok(())
    }

    async fn add_song(&self, playlist_id: i64, song: &Song) -> Result<Song> {
        let builder = self
            .request(Method::POST, &format!("/playlists/{playlist_id}/songs"))
            .await
            .json(song);
        let response = self.execute(builder).await?;
        let added: Song = Self::parse(response, "added song").await?;

        debug!(playlist_id, song_id = ?added.id, "Song added");
        Ok(added)
    }

    async fn remove_song(&self, playlist_id: i64, song_id: i64) -> Result<()> {
        let builder = self
            .request(
                Method::DELETE,
                &format!("/playlists/{playlist_id}/songs/{song_id}"),
            )
            .await;
        self.execute(builder).await?;
        Ok(())
    }

    async fn reorder_songs(&self, playlist_id: i64, song_ids: &[i64]) -> Result<()> {
        let builder = self
            .request(
                Method::PUT,
                &format!("/playlists/{playlist_id}/songs/reorder"),
            )
            .await
            .json(song_ids);
        self.execute(builder).await?;
        Ok(())
    }

    async fn refresh_song(&self, song_id: i64) -> Result<()> {
        let builder = self
            .request(Method::POST, &format!("/songs/{song_id}/refresh"))
            .await;
        self.execute(builder).await?;
        Ok(())
    }

    async fn search_songs(&self, query: &str, limit: Option<u32>) -> Result<Vec<Song>> {
        let mut builder = self
            .request(Method::GET, "/songs/search")
            .await
            .query(&[("query", query)]);
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }

        let response = self.execute(builder).await?;
        let songs: Vec<Song> = Self::parse(response, "search results").await?;

        debug!(results = songs.len(), "Search complete");
        Ok(songs)
    }

    async fn sync(&self, scope: SyncScope) -> Result<SyncReport> {
        let builder = self
            .request(Method::POST, "/sync/")
            .await
            .query(&[("type", scope.as_str())]);
        let response = self.execute(builder).await?;
        let report: SyncReport = Self::parse(response, "sync report").await?;

        info!(scope = %scope, playlists = ?report.playlists_count, "Sync triggered");
        Ok(report)
    }

    async fn sync_playlist(&self, playlist_id: i64) -> Result<()> {
        let builder = self
            .request(Method::POST, &format!("/playlists/{playlist_id}/sync"))
            .await;
        self.execute(builder).await?;

        info!(playlist_id, "Playlist sync triggered");
        Ok(())
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
