//! Remote Media Store Abstraction
//!
//! The capability contract the replacement engine needs from a remote media
//! store: liveness, checksum-based duplicate lookup, deletion, name search,
//! asset/album reads, and the social-metadata mutations (favorite, stack,
//! album membership). `provider-immich` is the concrete implementation.

use async_trait::async_trait;

use crate::error::Result;

/// A stored remote asset, identified by an opaque id independent of filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAssetSummary {
    /// Opaque asset id
    pub id: String,

    /// Original filename as recorded at ingest time
    pub original_file_name: String,

    /// User favorite flag
    pub is_favorite: bool,

    /// Parent asset id when this asset is stacked under another
    pub stack_parent_id: Option<String>,

    /// Content checksum as the store reports it (may be absent in search results)
    pub checksum: Option<String>,
}

/// Verdict of a duplicate check for one client-supplied file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckAction {
    /// The store would accept an upload of this content
    Accept,
    /// The store rejects the upload (e.g. the content already exists)
    Reject,
}

/// One entry of a bulk duplicate-check response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCheck {
    /// The caller's key for this file (echoed back by the store)
    pub client_key: String,

    /// Accept or reject verdict
    pub action: CheckAction,

    /// Rejection reason, e.g. "duplicate"
    pub reason: Option<String>,

    /// Id of the existing remote asset when the reason is a duplicate
    pub remote_asset_id: Option<String>,
}

impl DuplicateCheck {
    /// True when the store rejected this file because its content already exists
    pub fn is_duplicate(&self) -> bool {
        self.action == CheckAction::Reject && self.reason.as_deref() == Some("duplicate")
    }
}

/// Album as returned by the album listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
}

/// Full album including its member assets
#[derive(Debug, Clone)]
pub struct AlbumDetail {
    pub id: String,
    pub assets: Vec<RemoteAssetSummary>,
}

/// Remote media store trait
///
/// Every call carries an explicit timeout inside the implementation and is
/// issued exactly once; transport failures surface as
/// [`BridgeError::CallFailed`](crate::error::BridgeError::CallFailed) rather
/// than raw transport errors. The engine decides per call site whether a
/// failure is fatal, group-fatal, or a logged no-op.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Liveness check; run-fatal on failure
    async fn ping(&self) -> Result<()>;

    /// Check many `(client_key, checksum)` pairs against the duplicate index
    ///
    /// Implementations chunk the input to respect request-size limits; a
    /// failed chunk must not discard results already gathered from other
    /// chunks.
    async fn bulk_duplicate_check(
        &self,
        items: &[(String, String)],
    ) -> Result<Vec<DuplicateCheck>>;

    /// Permanently delete assets (bypassing the trash when `force` is set)
    async fn delete_assets(&self, asset_ids: &[String], force: bool) -> Result<()>;

    /// Ask the store to empty its trash
    async fn empty_trash(&self) -> Result<()>;

    /// Search assets by filename; may return imprecise matches, the caller
    /// must filter for exact `original_file_name` equality
    async fn search_by_filename(&self, file_name: &str) -> Result<Vec<RemoteAssetSummary>>;

    /// Fetch one asset; `None` when the id does not resolve
    async fn get_asset(&self, asset_id: &str) -> Result<Option<RemoteAssetSummary>>;

    /// List all albums
    async fn list_albums(&self) -> Result<Vec<AlbumSummary>>;

    /// Fetch one album including its member assets
    async fn get_album(&self, album_id: &str) -> Result<AlbumDetail>;

    /// Create a stack with `parent_id` as the cover and `child_ids` beneath it
    async fn create_stack(&self, parent_id: &str, child_ids: &[String]) -> Result<()>;

    /// Add assets to an album
    async fn add_assets_to_album(&self, album_id: &str, asset_ids: &[String]) -> Result<()>;

    /// Set or clear the favorite flag on an asset
    async fn set_favorite(&self, asset_id: &str, favorite: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_duplicate() {
        let dup = DuplicateCheck {
            client_key: "/photos/a.jpg".to_string(),
            action: CheckAction::Reject,
            reason: Some("duplicate".to_string()),
            remote_asset_id: Some("asset-1".to_string()),
        };
        assert!(dup.is_duplicate());

        let accepted = DuplicateCheck {
            client_key: "/photos/b.jpg".to_string(),
            action: CheckAction::Accept,
            reason: None,
            remote_asset_id: None,
        };
        assert!(!accepted.is_duplicate());

        let rejected_other = DuplicateCheck {
            client_key: "/photos/c.jpg".to_string(),
            action: CheckAction::Reject,
            reason: Some("unsupported-format".to_string()),
            remote_asset_id: None,
        };
        assert!(!rejected_other.is_duplicate());
    }
}
