//! Test helpers for store integration tests
//!
//! `FakeService` is an in-memory playlist service. Failures can be queued
//! per endpoint, and a call can be held at a gate until the test releases
//! it, which fixes the order in which overlapping operations complete.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use setlist_client::{
    ClientError, Playlist, PlaylistDraft, PlaylistService, Result, Song, SyncReport, SyncScope,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;

static INIT: Once = Once::new();

/// Install a test subscriber once so store logs show up on failure
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    List,
    ListDetailed,
    Get,
    Create,
    Update,
    Delete,
    AddSong,
    RemoveSong,
    Reorder,
    RefreshSong,
    Search,
    Sync,
    SyncPlaylist,
}

/// A remote failure carrying an optional `detail`
pub fn remote_error(status: u16, detail: Option<&str>) -> ClientError {
    ClientError::Remote {
        status,
        detail: detail.map(str::to_string),
        body: detail
            .map(|d| serde_json::json!({ "detail": d }).to_string())
            .unwrap_or_default(),
    }
}

pub fn playlist(id: i64, name: &str) -> Playlist {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    Playlist {
        id,
        user_id: 1,
        remote_id: None,
        name: name.to_string(),
        description: None,
        created_at: at,
        updated_at: at,
        last_synced_at: None,
        songs: None,
    }
}

struct Backend {
    playlists: BTreeMap<i64, Playlist>,
    /// Playlists that appear once an account sync runs
    remote_only: Vec<Playlist>,
    catalog: Vec<Song>,
    next_playlist_id: i64,
    next_song_id: i64,
}

pub struct FakeService {
    backend: Mutex<Backend>,
    failures: Mutex<HashMap<Endpoint, VecDeque<ClientError>>>,
    gates: Mutex<HashMap<Endpoint, Arc<Notify>>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl FakeService {
    pub fn new() -> Self {
        init_tracing();
        Self {
            backend: Mutex::new(Backend {
                playlists: BTreeMap::new(),
                remote_only: Vec::new(),
                catalog: Vec::new(),
                next_playlist_id: 1,
                next_song_id: 1,
            }),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// Add a playlist on the remote side
    pub fn seed(&self, id: i64, name: &str) {
        let mut backend = self.backend.lock().unwrap();
        let mut p = playlist(id, name);
        p.songs = Some(Vec::new());
        backend.playlists.insert(id, p);
        backend.next_playlist_id = backend.next_playlist_id.max(id + 1);
    }

    /// Add a song to a remote playlist and return its id
    pub fn seed_song(&self, playlist_id: i64, remote_track_id: i64, title: &str) -> i64 {
        let mut backend = self.backend.lock().unwrap();
        let id = backend.next_song_id;
        backend.next_song_id += 1;

        let mut song = Song::new(remote_track_id, title, "Artist", "Album");
        song.id = Some(id);
        backend
            .playlists
            .get_mut(&playlist_id)
            .and_then(|p| p.songs.as_mut())
            .expect("seeded playlist")
            .push(song);
        id
    }

    pub fn set_next_playlist_id(&self, id: i64) {
        self.backend.lock().unwrap().next_playlist_id = id;
    }

    pub fn set_next_song_id(&self, id: i64) {
        self.backend.lock().unwrap().next_song_id = id;
    }

    /// A playlist that only shows up after an account sync
    pub fn stage_remote_playlist(&self, id: i64, name: &str) {
        let mut p = playlist(id, name);
        p.remote_id = Some(format!("remote-{id}"));
        p.songs = Some(Vec::new());
        self.backend.lock().unwrap().remote_only.push(p);
    }

    pub fn add_to_catalog(&self, song: Song) {
        self.backend.lock().unwrap().catalog.push(song);
    }

    /// Make the next call to `endpoint` fail with `error`
    pub fn fail_next(&self, endpoint: Endpoint, error: ClientError) {
        self.failures
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(error);
    }

    /// Hold the next call to `endpoint` after it has captured its response,
    /// until the returned handle is notified
    pub fn hold(&self, endpoint: Endpoint) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(endpoint, notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remote_playlist(&self, id: i64) -> Option<Playlist> {
        self.backend.lock().unwrap().playlists.get(&id).cloned()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn enter(&self, endpoint: Endpoint) -> Result<()> {
        self.calls.lock().unwrap().push(endpoint);
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn pass_gate(&self, endpoint: Endpoint) {
        let gate = self.gates.lock().unwrap().remove(&endpoint);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn with_backend<T>(&self, f: impl FnOnce(&mut Backend) -> Result<T>) -> Result<T> {
        f(&mut self.backend.lock().unwrap())
    }

    fn not_found() -> ClientError {
        remote_error(404, Some("Playlist not found"))
    }
}

fn without_songs(p: &Playlist) -> Playlist {
    Playlist {
        songs: None,
        ..p.clone()
    }
}

#[async_trait]
impl PlaylistService for FakeService {
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let result = self
            .enter(Endpoint::List)
            .and_then(|()| {
                self.with_backend(|b| Ok(b.playlists.values().map(without_songs).collect()))
            });
        self.pass_gate(Endpoint::List).await;
        result
    }

    async fn list_playlists_detailed(&self) -> Result<Vec<Playlist>> {
        let result = self
            .enter(Endpoint::ListDetailed)
            .and_then(|()| self.with_backend(|b| Ok(b.playlists.values().cloned().collect())));
        self.pass_gate(Endpoint::ListDetailed).await;
        result
    }

    async fn get_playlist(&self, id: i64) -> Result<Playlist> {
        let result = self.enter(Endpoint::Get).and_then(|()| {
            self.with_backend(|b| b.playlists.get(&id).cloned().ok_or_else(Self::not_found))
        });
        self.pass_gate(Endpoint::Get).await;
        result
    }

    async fn create_playlist(&self, draft: &PlaylistDraft) -> Result<Playlist> {
        let result = self.enter(Endpoint::Create).and_then(|()| {
            self.with_backend(|b| {
                let id = b.next_playlist_id;
                b.next_playlist_id += 1;

                let mut created = playlist(id, &draft.name);
                created.description = draft.description.clone();
                created.songs = Some(Vec::new());
                b.playlists.insert(id, created.clone());
                Ok(without_songs(&created))
            })
        });
        self.pass_gate(Endpoint::Create).await;
        result
    }

    async fn update_playlist(&self, id: i64, draft: &PlaylistDraft) -> Result<Playlist> {
        let result = self.enter(Endpoint::Update).and_then(|()| {
            self.with_backend(|b| {
                let p = b.playlists.get_mut(&id).ok_or_else(Self::not_found)?;
                p.name = draft.name.clone();
                p.description = draft.description.clone();
                p.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
                Ok(without_songs(p))
            })
        });
        self.pass_gate(Endpoint::Update).await;
        result
    }

    async fn delete_playlist(&self, id: i64) -> Result<()> {
        let result = self.enter(Endpoint::Delete).and_then(|()| {
            self.with_backend(|b| b.playlists.remove(&id).map(|_| ()).ok_or_else(Self::not_found))
        });
        self.pass_gate(Endpoint::Delete).await;
        result
    }

    async fn add_song(&self, playlist_id: i64, song: &Song) -> Result<Song> {
        let result = self.enter(Endpoint::AddSong).and_then(|()| {
            self.with_backend(|b| {
                let next_id = b.next_song_id;
                let songs = b
                    .playlists
                    .get_mut(&playlist_id)
                    .and_then(|p| p.songs.as_mut())
                    .ok_or_else(Self::not_found)?;

                // Same catalog track is linked once per playlist
                if let Some(existing) = songs
                    .iter()
                    .find(|s| s.remote_track_id == song.remote_track_id)
                {
                    return Ok(existing.clone());
                }

                let mut added = song.clone();
                added.id = Some(next_id);
                songs.push(added.clone());
                b.next_song_id += 1;
                Ok(added)
            })
        });
        self.pass_gate(Endpoint::AddSong).await;
        result
    }

    async fn remove_song(&self, playlist_id: i64, song_id: i64) -> Result<()> {
        let result = self.enter(Endpoint::RemoveSong).and_then(|()| {
            self.with_backend(|b| {
                let songs = b
                    .playlists
                    .get_mut(&playlist_id)
                    .and_then(|p| p.songs.as_mut())
                    .ok_or_else(Self::not_found)?;
                songs.retain(|s| s.id != Some(song_id));
                Ok(())
            })
        });
        self.pass_gate(Endpoint::RemoveSong).await;
        result
    }

    async fn reorder_songs(&self, playlist_id: i64, song_ids: &[i64]) -> Result<()> {
        let order = song_ids.to_vec();
        let result = self.enter(Endpoint::Reorder).and_then(|()| {
            self.with_backend(|b| {
                let songs = b
                    .playlists
                    .get_mut(&playlist_id)
                    .and_then(|p| p.songs.as_mut())
                    .ok_or_else(Self::not_found)?;
                songs.sort_by_key(|s| {
                    s.id.and_then(|id| order.iter().position(|o| *o == id))
                        .unwrap_or(usize::MAX)
                });
                Ok(())
            })
        });
        self.pass_gate(Endpoint::Reorder).await;
        result
    }

    async fn refresh_song(&self, song_id: i64) -> Result<()> {
        let result = self.enter(Endpoint::RefreshSong).and_then(|()| {
            self.with_backend(|b| {
                let mut found = false;
                for songs in b.playlists.values_mut().filter_map(|p| p.songs.as_mut()) {
                    for s in songs.iter_mut().filter(|s| s.id == Some(song_id)) {
                        s.is_available = Some(true);
                        s.title = format!("{} (Remastered)", s.title);
                        found = true;
                    }
                }
                if found {
                    Ok(())
                } else {
                    Err(remote_error(404, Some("Song not found")))
                }
            })
        });
        self.pass_gate(Endpoint::RefreshSong).await;
        result
    }

    async fn search_songs(&self, query: &str, limit: Option<u32>) -> Result<Vec<Song>> {
        let needle = query.to_lowercase();
        let result = self.enter(Endpoint::Search).and_then(|()| {
            self.with_backend(|b| {
                let hits = b
                    .catalog
                    .iter()
                    .filter(|s| s.title.to_lowercase().contains(&needle))
                    .take(limit.map_or(usize::MAX, |l| l as usize))
                    .cloned()
                    .collect();
                Ok(hits)
            })
        });
        self.pass_gate(Endpoint::Search).await;
        result
    }

    async fn sync(&self, scope: SyncScope) -> Result<SyncReport> {
        let result = self.enter(Endpoint::Sync).and_then(|()| {
            self.with_backend(|b| {
                let imported = std::mem::take(&mut b.remote_only);
                let count = imported.len() as u64;
                for p in imported {
                    b.playlists.insert(p.id, p);
                }

                let mut report = SyncReport {
                    message: Some("Data synchronized successfully".into()),
                    playlists_count: Some(count),
                    ..SyncReport::default()
                };
                report
                    .extra
                    .insert("scope".into(), serde_json::json!(scope.as_str()));
                Ok(report)
            })
        });
        self.pass_gate(Endpoint::Sync).await;
        result
    }

    async fn sync_playlist(&self, playlist_id: i64) -> Result<()> {
        let result = self.enter(Endpoint::SyncPlaylist).and_then(|()| {
            self.with_backend(|b| {
                let p = b.playlists.get_mut(&playlist_id).ok_or_else(Self::not_found)?;
                p.last_synced_at = Some(Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap());
                Ok(())
            })
        });
        self.pass_gate(Endpoint::SyncPlaylist).await;
        result
    }
}
