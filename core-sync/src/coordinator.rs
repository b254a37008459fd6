//! # Replace Coordinator
//!
//! Orchestrates the replacement reconciliation run.
//!
//! ## Overview
//!
//! The `ReplaceCoordinator` drives the whole run against its injected
//! collaborators:
//! - Scan the local tree into asset groups (`indexer`)
//! - Build the album index and the run-wide duplicate pre-check
//! - Per group: resolve → snapshot → delete → verify-clear → ingest →
//!   settle → relink → restore → checkpoint
//! - Count group failures without stopping the loop
//!
//! ## Workflow per group
//!
//! 1. Recompute each file's digest and resolve which remote assets the
//!    group replaces (pre-check results keyed by checksum)
//! 2. Snapshot favorite/album state of the old assets (first source wins)
//! 3. Bulk-delete the old assets (force) and empty the trash, best-effort
//! 4. Poll the duplicate index until the deleted checksums clear; give up
//!    after the retry budget and skip the group without uploading
//! 5. Invoke the external upload command (edited photo, original photo,
//!    edited video, original video order)
//! 6. Wait out the indexing grace period, then poll a name search for the
//!    new identities (edited first, photos preferred as primary)
//! 7. Stack the original under the edited asset when both exist
//! 8. Restore favorites and album membership onto the new identities
//! 9. Persist the checkpoint mark
//!
//! Groups are processed strictly one at a time, end-to-end. The remote
//! store's duplicate and name-search indexes are eventually consistent
//! after delete/upload; overlapping two groups would make verify-clear and
//! settle results ambiguous.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use bridge_traits::ingest::IngestRunner;
use bridge_traits::store::{CheckAction, MediaStore, RemoteAssetSummary};
use core_runtime::ResyncConfig;

use crate::checkpoint::CheckpointStore;
use crate::digest;
use crate::error::{Result, SyncError};
use crate::indexer::{self, LocalAssetGroup};
use crate::retry::{poll_until, RetryPolicy};
use crate::snapshot::{self, AlbumIndex, SnapshotState};

/// Timing and retry budgets for the eventually-consistent waits
#[derive(Debug, Clone, Copy)]
pub struct SyncTuning {
    /// Grace period between delete and empty-trash
    pub delete_grace: Duration,

    /// Attempts polling the duplicate index after deletion
    pub verify_attempts: u32,
    pub verify_interval: Duration,

    /// Grace period after upload before the first name search
    pub settle_grace: Duration,

    /// Attempts polling the name search for a new asset
    pub search_attempts: u32,
    pub search_interval: Duration,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            delete_grace: Duration::from_secs(2),
            verify_attempts: 10,
            verify_interval: Duration::from_secs(2),
            settle_grace: Duration::from_secs(3),
            search_attempts: 12,
            search_interval: Duration::from_millis(2500),
        }
    }
}

/// Outcome of one finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Groups discovered by the scan
    pub groups: usize,

    /// Groups processed to completion this run
    pub processed: usize,

    /// Groups skipped because of the checkpoint mark
    pub skipped: usize,

    /// Groups that failed verify-clear, ingest or settle
    pub failures: usize,
}

/// A remote asset the pre-check resolved for a local checksum
#[derive(Debug, Clone)]
struct ExistingAsset {
    id: String,
}

enum GroupOutcome {
    /// Replacement completed, checkpoint may advance
    Replaced,
    /// Dry-run reached the simulated ingest; checkpoint must not advance
    Simulated,
    /// Group-fatal condition; counted, loop continues
    Failed,
}

/// Replacement run orchestrator
pub struct ReplaceCoordinator {
    config: ResyncConfig,
    tuning: SyncTuning,
    store: Arc<dyn MediaStore>,
    ingest: Arc<dyn IngestRunner>,
    checkpoint: CheckpointStore,
}

impl ReplaceCoordinator {
    /// Create a coordinator over the given collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - run configuration (root, dry-run, extension sets, checkpoint path)
    /// * `store` - remote media store client
    /// * `ingest` - external upload command runner
    pub fn new(
        config: ResyncConfig,
        store: Arc<dyn MediaStore>,
        ingest: Arc<dyn IngestRunner>,
    ) -> Self {
        let checkpoint = CheckpointStore::new(config.checkpoint_file.clone());
        Self {
            config,
            tuning: SyncTuning::default(),
            store,
            ingest,
            checkpoint,
        }
    }

    /// Override the polling budgets (mainly for tests)
    pub fn with_tuning(mut self, tuning: SyncTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Execute one full run
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ServerUnreachable`] when the initial liveness
    /// check fails; nothing has been mutated at that point. Per-group
    /// failures never surface as errors — they are counted in the summary.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunSummary> {
        self.store
            .ping()
            .await
            .map_err(|e| SyncError::ServerUnreachable(e.to_string()))?;
        info!("Remote store reachable");

        let groups = indexer::scan(
            &self.config.root,
            &self.config.photo_exts,
            &self.config.video_exts,
        );
        info!("Discovered {} asset groups to process", groups.len());
        if groups.is_empty() {
            return Ok(RunSummary::default());
        }

        let resume_index = self.checkpoint.load();
        if resume_index > 0 {
            info!("Resuming from group index {}", resume_index + 1);
        }

        // Both run-wide snapshots are rebuilt even on resume: they are cheap
        // relative to re-ingestion and must reflect current remote state.
        info!("Building album asset index...");
        let album_index = self.build_album_index().await;
        info!("Album index built for {} assets", album_index.len());

        info!("Checking for existing assets by hash...");
        let existing = self.precheck_existing(&groups).await;
        info!("Found {} existing assets to be replaced", existing.len());

        let mut summary = RunSummary {
            groups: groups.len(),
            ..Default::default()
        };

        for (i, group) in groups.iter().enumerate() {
            if i < resume_index {
                summary.skipped += 1;
                continue;
            }
            info!("--- Group {}/{}: {} ---", i + 1, groups.len(), group.base_name);

            match self.process_group(group, &existing, &album_index).await {
                GroupOutcome::Replaced => {
                    summary.processed += 1;
                    self.checkpoint.store(i + 1);
                }
                GroupOutcome::Simulated => {
                    summary.processed += 1;
                }
                GroupOutcome::Failed => {
                    summary.failures += 1;
                }
            }
        }

        if summary.failures > 0 {
            warn!("Done with {} errors", summary.failures);
        } else {
            info!("All done");
        }
        Ok(summary)
    }

    /// Enumerate all albums once into an asset → albums index
    async fn build_album_index(&self) -> AlbumIndex {
        let albums = match self.store.list_albums().await {
            Ok(albums) => albums,
            Err(e) => {
                warn!("Album listing failed: {}", e);
                return AlbumIndex::new();
            }
        };

        let mut index = AlbumIndex::new();
        for album in albums {
            let detail = match self.store.get_album(&album.id).await {
                Ok(detail) => detail,
                Err(e) => {
                    warn!(album_id = %album.id, "Album fetch failed: {}", e);
                    continue;
                }
            };
            for asset in detail.assets {
                index.entry(asset.id).or_default().push(detail.id.clone());
            }
        }
        index
    }

    /// Digest every group file and resolve which checksums already exist
    /// remotely, keyed by checksum
    async fn precheck_existing(
        &self,
        groups: &[LocalAssetGroup],
    ) -> HashMap<String, ExistingAsset> {
        let mut items: Vec<(String, String)> = Vec::new();
        let mut checksum_by_key: HashMap<String, String> = HashMap::new();

        for group in groups {
            for path in group.files_in_priority_order() {
                match digest::sha1_base64(path) {
                    Ok(checksum) => {
                        let key = path.to_string_lossy().into_owned();
                        checksum_by_key.insert(key.clone(), checksum.clone());
                        items.push((key, checksum));
                    }
                    // The owning group fails at resolve time when the digest
                    // is recomputed; here the file is only left out of the
                    // pre-check set.
                    Err(e) => error!("{}", e),
                }
            }
        }

        let results = match self.store.bulk_duplicate_check(&items).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Duplicate pre-check failed: {}", e);
                Vec::new()
            }
        };

        let mut existing = HashMap::new();
        for result in results {
            if !result.is_duplicate() {
                continue;
            }
            if let (Some(checksum), Some(asset_id)) = (
                checksum_by_key.get(&result.client_key),
                result.remote_asset_id,
            ) {
                existing.insert(checksum.clone(), ExistingAsset { id: asset_id });
            }
        }
        existing
    }

    #[instrument(skip_all, fields(group = %group.base_name))]
    async fn process_group(
        &self,
        group: &LocalAssetGroup,
        existing: &HashMap<String, ExistingAsset>,
        album_index: &AlbumIndex,
    ) -> GroupOutcome {
        let files: Vec<PathBuf> = group
            .files_in_priority_order()
            .into_iter()
            .cloned()
            .collect();
        if files.is_empty() {
            return GroupOutcome::Replaced;
        }

        // Resolve + Snapshot. Digests are recomputed here: remote identity
        // must reflect the file's current bytes, not the pre-check's.
        let mut ids_to_delete: Vec<String> = Vec::new();
        let mut old_asset_by_file: HashMap<PathBuf, String> = HashMap::new();
        let mut snapshot_state = SnapshotState::default();

        for file in &files {
            let checksum = match digest::sha1_base64(file) {
                Ok(checksum) => checksum,
                Err(e) => {
                    error!("{}", e);
                    return GroupOutcome::Failed;
                }
            };
            let Some(old) = existing.get(&checksum) else {
                continue;
            };

            ids_to_delete.push(old.id.clone());
            old_asset_by_file.insert(file.clone(), old.id.clone());

            if !snapshot_state.is_settled() {
                snapshot::capture_asset_state(
                    self.store.as_ref(),
                    album_index,
                    &old.id,
                    &mut snapshot_state,
                )
                .await;
            }
        }

        let unique_ids = dedup_preserving_order(&ids_to_delete);
        if !unique_ids.is_empty()
            && !self
                .delete_and_verify(group, &files, &unique_ids, &old_asset_by_file)
                .await
        {
            return GroupOutcome::Failed;
        }

        // Ingest
        info!("Uploading {} file(s)...", files.len());
        let exit_code = match self.ingest.upload(&files, self.config.dry_run).await {
            Ok(code) => code,
            Err(e) => {
                error!("Upload command could not run for {}: {}", group.base_name, e);
                return GroupOutcome::Failed;
            }
        };
        if exit_code != 0 {
            error!(
                "Upload command failed with code {} for {}",
                exit_code, group.base_name
            );
            return GroupOutcome::Failed;
        }

        if self.config.dry_run {
            info!("[dry-run] Skipping settle/relink/restore for this group");
            return GroupOutcome::Simulated;
        }

        // Settle
        info!("Waiting for indexing ({:?})...", self.tuning.settle_grace);
        sleep(self.tuning.settle_grace).await;

        let (edited_file, original_file) = group.primary_pair();
        let new_edited = match edited_file {
            Some(file) => self.wait_for_asset(file).await,
            None => None,
        };
        let new_original = match original_file {
            Some(file) => self.wait_for_asset(file).await,
            None => None,
        };

        if let Some(asset) = &new_edited {
            debug!(id = %asset.id, "Found new edited asset");
        }
        if let Some(asset) = &new_original {
            debug!(id = %asset.id, "Found new original asset");
        }

        let Some(main_id) = new_edited
            .as_ref()
            .or(new_original.as_ref())
            .map(|a| a.id.clone())
        else {
            error!(
                "Uploaded primary asset not found for {}; saved state may be lost",
                group.base_name
            );
            return GroupOutcome::Failed;
        };

        // Relink: the edited version is the cover, original is an alternate
        // in the same stack
        if let Some(original) = &new_original {
            if new_edited.is_some() && original.id != main_id {
                self.relink(&main_id, &original.id).await;
            }
        }

        // Restore
        self.restore_favorites(
            &snapshot_state,
            &old_asset_by_file,
            new_edited.as_ref().zip(edited_file),
            new_original.as_ref().zip(original_file),
        )
        .await;
        self.restore_albums(
            &snapshot_state,
            &ids_to_delete,
            new_edited.as_ref(),
            new_original.as_ref(),
        )
        .await;

        GroupOutcome::Replaced
    }

    /// Delete the old assets, empty the trash, and poll the duplicate index
    /// until it no longer reports the group's checksums. Returns false when
    /// the verify budget is exhausted — the group must not be uploaded into
    /// a still-conflicted index.
    async fn delete_and_verify(
        &self,
        group: &LocalAssetGroup,
        files: &[PathBuf],
        unique_ids: &[String],
        old_asset_by_file: &HashMap<PathBuf, String>,
    ) -> bool {
        info!("Old asset hashes (for recovery lookup):");
        for file in files {
            if let Some(old_id) = old_asset_by_file.get(file) {
                if let Ok(checksum) = digest::sha1_base64(file) {
                    info!("    {} -> {} (old id: {})", file.display(), checksum, old_id);
                }
            }
        }
        info!(
            "Deleting {} old asset(s) for {}",
            unique_ids.len(),
            group.base_name
        );

        if self.config.dry_run {
            info!("[dry-run] DELETE {} assets (force)", unique_ids.len());
            info!("[dry-run] POST trash/empty");
            // Nothing was deleted, so the index cannot clear; the
            // verification poll is skipped along with the mutations.
            return true;
        }

        if let Err(e) = self.store.delete_assets(unique_ids, true).await {
            warn!("Asset deletion reported failure: {}", e);
        }
        sleep(self.tuning.delete_grace).await;
        if let Err(e) = self.store.empty_trash().await {
            warn!("Trash emptying reported failure: {}", e);
        }

        info!("Verifying duplicate index cleanup...");
        let mut hashes: Vec<(String, String)> = Vec::with_capacity(files.len());
        for file in files {
            match digest::sha1_base64(file) {
                Ok(checksum) => hashes.push((file.to_string_lossy().into_owned(), checksum)),
                Err(e) => {
                    error!("{}", e);
                    return false;
                }
            }
        }

        let policy = RetryPolicy {
            max_attempts: self.tuning.verify_attempts,
            interval: self.tuning.verify_interval,
        };
        let cleared = poll_until(policy, |attempt| {
            let store = self.store.clone();
            let hashes = hashes.clone();
            let max_attempts = policy.max_attempts;
            async move {
                match store.bulk_duplicate_check(&hashes).await {
                    Ok(results)
                        if results.len() == hashes.len()
                            && results.iter().all(|r| r.action == CheckAction::Accept) =>
                    {
                        Some(())
                    }
                    Ok(_) => {
                        info!(
                            "    Index not cleared yet (collision risk), waiting... ({}/{})",
                            attempt + 1,
                            max_attempts
                        );
                        None
                    }
                    Err(e) => {
                        warn!("Duplicate check failed during verification: {}", e);
                        None
                    }
                }
            }
        })
        .await
        .is_some();

        if !cleared {
            error!(
                "Duplicate index still reports hashes for {}; skipping upload to avoid \
                 ambiguous duplicate state",
                group.base_name
            );
        }
        cleared
    }

    /// Poll the name search until an asset with exactly this filename shows
    /// up, or the settle budget runs out
    async fn wait_for_asset(&self, file: &Path) -> Option<RemoteAssetSummary> {
        let file_name = file.file_name()?.to_str()?.to_string();
        debug!(name = %file_name, "Searching for newly ingested asset");

        let policy = RetryPolicy {
            max_attempts: self.tuning.search_attempts,
            interval: self.tuning.search_interval,
        };
        poll_until(policy, |attempt| {
            let store = self.store.clone();
            let file_name = file_name.clone();
            let max_attempts = policy.max_attempts;
            async move {
                match store.search_by_filename(&file_name).await {
                    Ok(candidates) => {
                        // Exact match only: the search may return imprecise
                        // hits and a wrong pick would relink the wrong asset
                        let found = candidates
                            .into_iter()
                            .find(|a| a.original_file_name == file_name);
                        if found.is_none() {
                            info!(
                                "    ...waiting for asset {} ({}/{})",
                                file_name,
                                attempt + 1,
                                max_attempts
                            );
                        }
                        found
                    }
                    Err(e) => {
                        warn!("Search failed for {}: {}", file_name, e);
                        None
                    }
                }
            }
        })
        .await
    }

    /// Stack the original under the primary asset unless it is already
    /// stacked elsewhere
    async fn relink(&self, main_id: &str, original_id: &str) {
        match self.store.get_asset(original_id).await {
            Ok(Some(refreshed)) if refreshed.stack_parent_id.is_none() => {
                info!("Stacking {} -> {}", original_id, main_id);
                if let Err(e) = self
                    .store
                    .create_stack(main_id, &[original_id.to_string()])
                    .await
                {
                    warn!("Stack creation reported failure: {}", e);
                }
            }
            Ok(_) => debug!(original_id, "Original already stacked, leaving as-is"),
            Err(e) => warn!("Refresh of {} before stacking failed: {}", original_id, e),
        }
    }

    /// Re-set the favorite flag on every new identity whose old identity
    /// carried it
    async fn restore_favorites(
        &self,
        snapshot_state: &SnapshotState,
        old_asset_by_file: &HashMap<PathBuf, String>,
        new_edited: Option<(&RemoteAssetSummary, &PathBuf)>,
        new_original: Option<(&RemoteAssetSummary, &PathBuf)>,
    ) {
        let mut favorite_new_ids: HashSet<String> = HashSet::new();
        for (new_asset, file) in [new_edited, new_original].into_iter().flatten() {
            if let Some(old_id) = old_asset_by_file.get(file) {
                if snapshot_state.favorite_ids.contains(old_id) {
                    favorite_new_ids.insert(new_asset.id.clone());
                }
            }
        }

        for asset_id in &favorite_new_ids {
            info!("Restoring favorite for {}", asset_id);
            if let Err(e) = self.store.set_favorite(asset_id, true).await {
                warn!("Favorite restore reported failure: {}", e);
            }
        }
    }

    /// Add every new identity to the snapshot's albums, batched per album
    async fn restore_albums(
        &self,
        snapshot_state: &SnapshotState,
        ids_to_delete: &[String],
        new_edited: Option<&RemoteAssetSummary>,
        new_original: Option<&RemoteAssetSummary>,
    ) {
        let new_ids: Vec<String> = [new_edited, new_original]
            .into_iter()
            .flatten()
            .map(|a| a.id.clone())
            .collect();

        if snapshot_state.album_ids.is_empty() || new_ids.is_empty() {
            if !ids_to_delete.is_empty() {
                debug!("No albums to restore from snapshot");
            }
            return;
        }

        info!("Restoring to {} albums...", snapshot_state.album_ids.len());
        let consolidated = dedup_preserving_order(&new_ids);
        for album_id in &snapshot_state.album_ids {
            if let Err(e) = self
                .store
                .add_assets_to_album(album_id, &consolidated)
                .await
            {
                warn!("Album restore reported failure for {}: {}", album_id, e);
            }
        }
    }
}

fn dedup_preserving_order(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserving_order() {
        let ids = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "a".to_string(),
        ];
        assert_eq!(dedup_preserving_order(&ids), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_default_tuning_matches_budgets() {
        let tuning = SyncTuning::default();
        assert_eq!(tuning.verify_attempts, 10);
        assert_eq!(tuning.verify_interval, Duration::from_secs(2));
        assert_eq!(tuning.search_attempts, 12);
        assert_eq!(tuning.search_interval, Duration::from_millis(2500));
    }
}
