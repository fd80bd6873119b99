//! `/api/social` endpoints.

use reqwest::Method;
use uuid::Uuid;

use super::types::{ConnectUrl, SocialConnection, SocialPlatform};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_connections(&self) -> Result<Vec<SocialConnection>, ApiError> {
        self.get("/api/social/connections").await
    }

    /// OAuth authorization URL the user must be sent to for `platform`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the platform is not configured.
    pub async fn connect_url(&self, platform: SocialPlatform) -> Result<String, ApiError> {
        let response: ConnectUrl = self
            .get(&format!("/api/social/connect/{}", platform.as_str()))
            .await?;
        Ok(response.auth_url)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn disconnect(&self, connection_id: Uuid) -> Result<(), ApiError> {
        let path = format!("/api/social/connections/{connection_id}");
        self.request_unit::<()>(Method::DELETE, &path, None, Auth::Bearer)
            .await
    }
}
