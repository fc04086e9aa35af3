//! Sync coordinator.
//!
//! A sync trigger returns no playlist data, so each trigger is followed by
//! the re-fetches that bring its effect into the cache. The steps are not
//! atomic: once a trigger has succeeded it stays done even if a re-fetch
//! fails, and the re-fetch's failure becomes the operation's error.

use crate::error::{RemoteResultExt, Result};
use crate::operation::Operation;
use crate::store::PlaylistStore;
use setlist_client::{PlaylistService, SyncReport, SyncScope};
use tracing::info;

impl<S: PlaylistService> PlaylistStore<S> {
    /// Sync the whole account for one scope, then reload the collection.
    pub async fn sync_data(&self, scope: SyncScope) -> Result<SyncReport> {
        self.run(Operation::SyncData, async {
            let report = self
                .service()
                .sync(scope)
                .await
                .during(Operation::SyncData)?;

            self.load_playlists().await?;

            info!(
                scope = %scope,
                playlists = self.playlists().len(),
                "Account sync complete"
            );
            Ok(report)
        })
        .await
    }

    /// Sync one linked playlist, then reload it and the detailed collection.
    pub async fn sync_playlist(&self, playlist_id: i64) -> Result<()> {
        self.run(Operation::SyncPlaylist, async {
            self.service()
                .sync_playlist(playlist_id)
                .await
                .during(Operation::SyncPlaylist)?;

            self.load_playlist(playlist_id).await?;
            self.load_playlists_detailed().await?;

            info!(playlist_id, "Playlist sync complete");
            Ok(())
        })
        .await
    }
}
