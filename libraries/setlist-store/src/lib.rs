//! Setlist Store
//!
//! Client-side state layer mirroring the playlists held by the remote
//! playlist service.
//!
//! # Features
//!
//! - **Entity cache**: the playlist collection plus one "current" playlist,
//!   with a shared busy flag and a last-error slot
//! - **Mutations**: create, update, delete, add/remove/reorder songs,
//!   refresh songs; the cache changes only after the service confirms
//! - **Sync**: account-wide and single-playlist sync followed by the
//!   re-fetches that reflect it
//!
//! Consumers only get read-only copies of the cached state; all mutation
//! goes through [`PlaylistStore`]'s operations.

mod cache;
mod error;
mod operation;
mod store;
mod sync;

pub use error::{Result, StoreError};
pub use operation::Operation;
pub use store::{PlaylistStore, StoreSnapshot};

// Re-export the data model so callers need only this crate
pub use setlist_client::{Playlist, PlaylistService, Song, SyncReport, SyncScope};
