//! Immich API request and response types
//!
//! Data structures for the subset of the Immich REST API the replacement
//! engine drives.

use bridge_traits::store::{AlbumSummary, CheckAction, DuplicateCheck, RemoteAssetSummary};
use serde::{Deserialize, Serialize};

/// One entry of a bulk-upload-check request
#[derive(Debug, Clone, Serialize)]
pub struct BulkCheckItem {
    /// Caller-chosen key, echoed back in the result (we use the local path)
    pub id: String,

    /// Base64-encoded SHA-1 of the file content
    pub checksum: String,
}

/// `POST /api/assets/bulk-upload-check` request body
#[derive(Debug, Clone, Serialize)]
pub struct BulkUploadCheckRequest {
    pub assets: Vec<BulkCheckItem>,
}

/// One entry of a bulk-upload-check response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCheckResult {
    /// The caller's key for this file
    pub id: String,

    /// "accept" or "reject"
    pub action: String,

    /// Rejection reason, e.g. "duplicate"
    #[serde(default)]
    pub reason: Option<String>,

    /// Existing asset id when the file is a duplicate
    #[serde(default)]
    pub asset_id: Option<String>,
}

/// `POST /api/assets/bulk-upload-check` response body
#[derive(Debug, Deserialize)]
pub struct BulkUploadCheckResponse {
    #[serde(default)]
    pub results: Vec<BulkCheckResult>,
}

impl From<BulkCheckResult> for DuplicateCheck {
    fn from(result: BulkCheckResult) -> Self {
        let action = if result.action == "accept" {
            CheckAction::Accept
        } else {
            CheckAction::Reject
        };
        DuplicateCheck {
            client_key: result.id,
            action,
            reason: result.reason,
            remote_asset_id: result.asset_id,
        }
    }
}

/// `DELETE /api/assets` request body
#[derive(Debug, Clone, Serialize)]
pub struct DeleteAssetsRequest {
    pub ids: Vec<String>,
    pub force: bool,
}

/// `POST /api/search/metadata` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSearchRequest {
    pub original_file_name: String,
}

/// Asset resource as Immich returns it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    /// Asset id
    pub id: String,

    /// Filename recorded at ingest time
    #[serde(default)]
    pub original_file_name: String,

    /// Favorite flag
    #[serde(default)]
    pub is_favorite: bool,

    /// Parent asset when stacked
    #[serde(default)]
    pub stack_parent_id: Option<String>,

    /// Base64-encoded SHA-1 content checksum
    #[serde(default)]
    pub checksum: Option<String>,
}

impl From<AssetResponse> for RemoteAssetSummary {
    fn from(asset: AssetResponse) -> Self {
        RemoteAssetSummary {
            id: asset.id,
            original_file_name: asset.original_file_name,
            is_favorite: asset.is_favorite,
            stack_parent_id: asset.stack_parent_id,
            checksum: asset.checksum,
        }
    }
}

/// Inner page of a metadata search response
#[derive(Debug, Deserialize)]
pub struct SearchAssetPage {
    #[serde(default)]
    pub items: Vec<AssetResponse>,
}

/// `POST /api/search/metadata` response body
#[derive(Debug, Deserialize)]
pub struct MetadataSearchResponse {
    pub assets: SearchAssetPage,
}

/// Album resource as returned by `GET /api/albums`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponse {
    pub id: String,

    #[serde(default)]
    pub album_name: String,
}

impl From<AlbumResponse> for AlbumSummary {
    fn from(album: AlbumResponse) -> Self {
        AlbumSummary {
            id: album.id,
            name: album.album_name,
        }
    }
}

/// Album with members as returned by `GET /api/albums/{id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumWithAssetsResponse {
    pub id: String,

    #[serde(default)]
    pub assets: Vec<AssetResponse>,
}

/// `POST /api/stacks` request body; the primary asset (stack cover) goes
/// first in the list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStackRequest {
    pub asset_ids: Vec<String>,
}

/// `PUT /api/albums/{id}/assets` request body
#[derive(Debug, Clone, Serialize)]
pub struct AlbumAddAssetsRequest {
    pub ids: Vec<String>,
}

/// `PUT /api/assets/{id}` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    pub is_favorite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_bulk_check_response() {
        let json = r#"{
            "results": [
                {
                    "id": "/photos/IMG_1.jpg",
                    "action": "reject",
                    "reason": "duplicate",
                    "assetId": "asset-123"
                },
                {
                    "id": "/photos/IMG_2.jpg",
                    "action": "accept"
                }
            ]
        }"#;

        let response: BulkUploadCheckResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);

        let dup: DuplicateCheck = response.results[0].clone().into();
        assert_eq!(dup.client_key, "/photos/IMG_1.jpg");
        assert!(dup.is_duplicate());
        assert_eq!(dup.remote_asset_id, Some("asset-123".to_string()));

        let accepted: DuplicateCheck = response.results[1].clone().into();
        assert_eq!(accepted.action, CheckAction::Accept);
        assert_eq!(accepted.remote_asset_id, None);
    }

    #[test]
    fn test_deserialize_asset_response() {
        let json = r#"{
            "id": "asset-1",
            "originalFileName": "IMG_1.jpg",
            "isFavorite": true,
            "stackParentId": null,
            "checksum": "qZk+NkcGgWq6PiVxeFDCbJzQ2J0="
        }"#;

        let asset: AssetResponse = serde_json::from_str(json).unwrap();
        let summary: RemoteAssetSummary = asset.into();

        assert_eq!(summary.id, "asset-1");
        assert_eq!(summary.original_file_name, "IMG_1.jpg");
        assert!(summary.is_favorite);
        assert_eq!(summary.stack_parent_id, None);
        assert!(summary.checksum.is_some());
    }

    #[test]
    fn test_deserialize_search_response_tolerates_missing_fields() {
        let json = r#"{
            "assets": {
                "items": [
                    { "id": "asset-2", "originalFileName": "IMG_2.jpg" }
                ]
            }
        }"#;

        let response: MetadataSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.assets.items.len(), 1);
        assert!(!response.assets.items[0].is_favorite);
    }

    #[test]
    fn test_deserialize_album_with_assets() {
        let json = r#"{
            "id": "album-1",
            "albumName": "Holidays",
            "assets": [
                { "id": "asset-1", "originalFileName": "IMG_1.jpg" },
                { "id": "asset-2", "originalFileName": "IMG_2.jpg" }
            ]
        }"#;

        let album: AlbumWithAssetsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(album.id, "album-1");
        assert_eq!(album.assets.len(), 2);
    }

    #[test]
    fn test_serialize_stack_request_parent_first() {
        let request = CreateStackRequest {
            asset_ids: vec!["parent".to_string(), "child".to_string()],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"assetIds":["parent","child"]}"#);
    }

    #[test]
    fn test_serialize_update_asset_request() {
        let request = UpdateAssetRequest { is_favorite: true };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"isFavorite":true}"#);
    }
}
