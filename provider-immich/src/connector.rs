//! Immich API connector implementation
//!
//! Implements the `MediaStore` trait over the Immich REST API.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::store::{
    AlbumDetail, AlbumSummary, DuplicateCheck, MediaStore, RemoteAssetSummary,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::ImmichError;
use crate::types::{
    AlbumAddAssetsRequest, AlbumResponse, AlbumWithAssetsResponse, AssetResponse, BulkCheckItem,
    BulkUploadCheckRequest, BulkUploadCheckResponse, CreateStackRequest, DeleteAssetsRequest,
    MetadataSearchRequest, MetadataSearchResponse, UpdateAssetRequest,
};

/// Default number of assets per bulk-upload-check request
pub const DEFAULT_CHECK_CHUNK: usize = 600;

/// Immich API connector
///
/// Implements [`MediaStore`] for the Immich server API.
///
/// Every call carries an explicit timeout and is issued exactly once; the
/// engine's polling loops own all repetition. Transport and API failures
/// surface as `BridgeError::CallFailed` with the logical endpoint name, so
/// the engine never sees raw transport errors.
///
/// # Example
///
/// ```ignore
/// use provider_immich::ImmichConnector;
/// use bridge_traits::store::MediaStore;
///
/// let connector = ImmichConnector::new(http_client, base_url, api_key);
/// connector.ping().await?;
/// ```
pub struct ImmichConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Server base URL without trailing `/api`
    base_url: String,

    /// API credential sent as `x-api-key`
    api_key: String,

    /// Bulk duplicate-check batch size
    chunk_size: usize,
}

impl ImmichConnector {
    /// Create a new Immich connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - server base URL, without a trailing `/api`
    /// * `api_key` - API key for the `x-api-key` header
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            chunk_size: DEFAULT_CHECK_CHUNK,
        }
    }

    /// Override the bulk duplicate-check batch size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Execute one request, converting transport failures into
    /// `ImmichError::CallFailed` tagged with the logical endpoint name.
    async fn send(&self, endpoint: &'static str, request: HttpRequest) -> Result<HttpResponse> {
        let request = request.api_key(self.api_key.as_str());
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| ImmichError::CallFailed {
                endpoint: endpoint.to_string(),
                cause: e.to_string(),
            })?;
        debug!(endpoint, status = response.status, "Immich API response");
        Ok(response)
    }

    /// Like `send`, but any non-2xx status is an error too
    async fn send_expect_success(
        &self,
        endpoint: &'static str,
        request: HttpRequest,
    ) -> Result<HttpResponse> {
        let response = self.send(endpoint, request).await?;
        if !response.is_success() {
            return Err(ImmichError::ApiError {
                endpoint: endpoint.to_string(),
                status_code: response.status,
                message: response.text().unwrap_or_default(),
            }
            .into());
        }
        Ok(response)
    }

    fn parse<T: serde::de::DeserializeOwned>(
        endpoint: &'static str,
        response: &HttpResponse,
    ) -> Result<T> {
        response.json().map_err(|e| {
            ImmichError::ParseError {
                endpoint: endpoint.to_string(),
                cause: e.to_string(),
            }
            .into()
        })
    }

    fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        timeout: Duration,
    ) -> Result<HttpRequest> {
        Ok(HttpRequest::new(HttpMethod::Post, self.api_url(path))
            .json(body)?
            .timeout(timeout))
    }

    /// Issue one bulk-upload-check request for a single chunk
    async fn check_chunk(&self, chunk: &[(String, String)]) -> Result<Vec<DuplicateCheck>> {
        let body = BulkUploadCheckRequest {
            assets: chunk
                .iter()
                .map(|(id, checksum)| BulkCheckItem {
                    id: id.clone(),
                    checksum: checksum.clone(),
                })
                .collect(),
        };
        let request =
            self.post_json("assets/bulk-upload-check", &body, Duration::from_secs(300))?;
        let response = self
            .send_expect_success("bulkUploadCheck", request)
            .await?;
        let parsed: BulkUploadCheckResponse = Self::parse("bulkUploadCheck", &response)?;
        Ok(parsed.results.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl MediaStore for ImmichConnector {
    #[instrument(skip(self))]
    async fn ping(&self) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Get, self.api_url("server/ping"))
            .timeout(Duration::from_secs(10));
        self.send_expect_success("ping", request).await?;
        Ok(())
    }

    #[instrument(skip(self, items), fields(total = items.len()))]
    async fn bulk_duplicate_check(
        &self,
        items: &[(String, String)],
    ) -> Result<Vec<DuplicateCheck>> {
        let mut results = Vec::with_capacity(items.len());

        // Each chunk is an independent unit of work: a failed chunk logs a
        // warning and contributes nothing, results from other chunks stand.
        for chunk in items.chunks(self.chunk_size) {
            match self.check_chunk(chunk).await {
                Ok(mut chunk_results) => results.append(&mut chunk_results),
                Err(e) => {
                    warn!(chunk_len = chunk.len(), error = %e, "Duplicate-check chunk failed");
                }
            }
        }

        Ok(results)
    }

    #[instrument(skip(self, asset_ids), fields(count = asset_ids.len()))]
    async fn delete_assets(&self, asset_ids: &[String], force: bool) -> Result<()> {
        if asset_ids.is_empty() {
            return Ok(());
        }
        let body = DeleteAssetsRequest {
            ids: asset_ids.to_vec(),
            force,
        };
        let request = HttpRequest::new(HttpMethod::Delete, self.api_url("assets"))
            .json(&body)?
            .timeout(Duration::from_secs(300));
        let response = self.send("deleteAssets", request).await?;
        // Immich answers 200 or 204 depending on version
        if response.status != 200 && response.status != 204 {
            return Err(ImmichError::ApiError {
                endpoint: "deleteAssets".to_string(),
                status_code: response.status,
                message: response.text().unwrap_or_default(),
            }
            .into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn empty_trash(&self) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Post, self.api_url("trash/empty"))
            .timeout(Duration::from_secs(120));
        self.send_expect_success("emptyTrash", request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn search_by_filename(&self, file_name: &str) -> Result<Vec<RemoteAssetSummary>> {
        let body = MetadataSearchRequest {
            original_file_name: file_name.to_string(),
        };
        let request = self.post_json("search/metadata", &body, Duration::from_secs(60))?;
        let response = self.send_expect_success("searchMetadata", request).await?;
        let parsed: MetadataSearchResponse = Self::parse("searchMetadata", &response)?;
        Ok(parsed.assets.items.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn get_asset(&self, asset_id: &str) -> Result<Option<RemoteAssetSummary>> {
        let request = HttpRequest::new(
            HttpMethod::Get,
            self.api_url(&format!("assets/{}", asset_id)),
        )
        .timeout(Duration::from_secs(60));
        let response = self.send("getAsset", request).await?;

        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ImmichError::ApiError {
                endpoint: "getAsset".to_string(),
                status_code: response.status,
                message: response.text().unwrap_or_default(),
            }
            .into());
        }

        let asset: AssetResponse = Self::parse("getAsset", &response)?;
        Ok(Some(asset.into()))
    }

    #[instrument(skip(self))]
    async fn list_albums(&self) -> Result<Vec<AlbumSummary>> {
        let request = HttpRequest::new(HttpMethod::Get, self.api_url("albums"))
            .timeout(Duration::from_secs(60));
        let response = self.send_expect_success("listAlbums", request).await?;
        let albums: Vec<AlbumResponse> = Self::parse("listAlbums", &response)?;
        Ok(albums.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn get_album(&self, album_id: &str) -> Result<AlbumDetail> {
        let request = HttpRequest::new(
            HttpMethod::Get,
            self.api_url(&format!("albums/{}", album_id)),
        )
        .timeout(Duration::from_secs(120));
        let response = self.send_expect_success("getAlbum", request).await?;
        let album: AlbumWithAssetsResponse = Self::parse("getAlbum", &response)?;
        Ok(AlbumDetail {
            id: album.id,
            assets: album.assets.into_iter().map(Into::into).collect(),
        })
    }

    #[instrument(skip(self, child_ids))]
    async fn create_stack(&self, parent_id: &str, child_ids: &[String]) -> Result<()> {
        if child_ids.is_empty() {
            return Ok(());
        }
        // The primary asset (stack cover) goes first in the list
        let mut asset_ids = Vec::with_capacity(child_ids.len() + 1);
        asset_ids.push(parent_id.to_string());
        asset_ids.extend(child_ids.iter().cloned());

        let body = CreateStackRequest { asset_ids };
        let request = self.post_json("stacks", &body, Duration::from_secs(60))?;
        self.send_expect_success("createStack", request).await?;
        Ok(())
    }

    #[instrument(skip(self, asset_ids), fields(count = asset_ids.len()))]
    async fn add_assets_to_album(&self, album_id: &str, asset_ids: &[String]) -> Result<()> {
        if asset_ids.is_empty() {
            return Ok(());
        }
        let body = AlbumAddAssetsRequest {
            ids: asset_ids.to_vec(),
        };
        let request = HttpRequest::new(
            HttpMethod::Put,
            self.api_url(&format!("albums/{}/assets", album_id)),
        )
        .json(&body)?
        .timeout(Duration::from_secs(60));
        self.send_expect_success("addToAlbum", request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_favorite(&self, asset_id: &str, favorite: bool) -> Result<()> {
        let body = UpdateAssetRequest {
            is_favorite: favorite,
        };
        let request = HttpRequest::new(
            HttpMethod::Put,
            self.api_url(&format!("assets/{}", asset_id)),
        )
        .json(&body)?
        .timeout(Duration::from_secs(60));
        self.send_expect_success("setFavorite", request).await?;
        Ok(())
    }
}
