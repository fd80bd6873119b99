//! Instagram archive import: presigned upload, then server-side processing.

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use tracing::info;
use uuid::Uuid;

use super::types::{ImportResult, ProcessImport, UploadUrl};
use super::{ApiClient, ApiError, Auth};

const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn instagram_upload_url(&self) -> Result<UploadUrl, ApiError> {
        self.get("/api/import/instagram/upload-url").await
    }

    /// PUT `bytes` straight to a presigned storage URL. No bearer token is
    /// attached; the URL carries its own authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    pub async fn upload_to_storage(&self, upload_url: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        let size = bytes.len();
        let request = self
            .http
            .put(upload_url)
            .header(CONTENT_TYPE, ARCHIVE_CONTENT_TYPE)
            .body(bytes);
        self.send(request, &Method::PUT, "<presigned>").await?;
        info!(bytes = size, "archive uploaded to storage");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn process_instagram_import(&self, body: &ProcessImport) -> Result<ImportResult, ApiError> {
        self.request(Method::POST, "/api/import/instagram/process", Some(body), Auth::Bearer)
            .await
    }

    /// Upload an Instagram export archive and start processing it.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn import_instagram_archive(
        &self,
        archive: Vec<u8>,
        project_id: Option<Uuid>,
    ) -> Result<ImportResult, ApiError> {
        let target = self.instagram_upload_url().await?;
        self.upload_to_storage(&target.upload_url, archive)
            .await?;
        self.process_instagram_import(&ProcessImport { key: target.key, project_id })
            .await
    }
}
