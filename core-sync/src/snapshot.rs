//! Metadata Snapshot
//!
//! Captures the user-visible state of remote assets about to be deleted —
//! favorite flag and album membership — so it can be reattached to the
//! replacement assets after re-ingestion. The remote store does not tie
//! that state to content identity, so it would otherwise be lost.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use bridge_traits::store::MediaStore;

/// Asset id → ids of albums containing it, built once per run by
/// enumerating all albums. Treated as a read-only snapshot; albums seldom
/// change mid-run, so staleness is an accepted limitation.
pub type AlbumIndex = HashMap<String, Vec<String>>;

/// Per-group snapshot of the state to restore after replacement
#[derive(Debug, Default)]
pub struct SnapshotState {
    /// Old asset ids that carried the favorite flag
    pub favorite_ids: HashSet<String>,

    /// First non-empty album-id list observed among the group's old assets
    pub album_ids: Vec<String>,
}

impl SnapshotState {
    /// Once a snapshot holds albums or a favorite, further per-asset fetches
    /// for the group are skipped: the first discovered source wins, later
    /// disagreement among old assets is lost by design.
    pub fn is_settled(&self) -> bool {
        !self.album_ids.is_empty() || !self.favorite_ids.is_empty()
    }
}

/// Fetch one old asset and fold its favorite/album state into the group
/// snapshot. Failures are non-fatal: the group proceeds with whatever was
/// captured so far.
pub async fn capture_asset_state(
    store: &dyn MediaStore,
    album_index: &AlbumIndex,
    asset_id: &str,
    state: &mut SnapshotState,
) {
    let asset = match store.get_asset(asset_id).await {
        Ok(Some(asset)) => asset,
        Ok(None) => {
            debug!(asset_id, "Old asset no longer resolvable, nothing to snapshot");
            return;
        }
        Err(e) => {
            warn!(asset_id, "Snapshot fetch failed: {}", e);
            return;
        }
    };

    if asset.is_favorite {
        debug!(asset_id, "Snapshot: favorite flag captured");
        state.favorite_ids.insert(asset.id);
    }

    if state.album_ids.is_empty() {
        if let Some(albums) = album_index.get(asset_id) {
            if !albums.is_empty() {
                debug!(asset_id, count = albums.len(), "Snapshot: album membership captured");
                state.album_ids = albums.clone();
            }
        }
    }
}
