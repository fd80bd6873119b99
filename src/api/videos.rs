//! Video render endpoints.

use reqwest::Method;
use tracing::info;
use uuid::Uuid;

use super::types::{RenderJob, RenderRequest};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// Queue a render job for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn render_video(&self, project_id: Uuid, request: &RenderRequest) -> Result<RenderJob, ApiError> {
        let path = format!("/api/projects/{project_id}/videos/render");
        let job: RenderJob = self
            .request(Method::POST, &path, Some(request), Auth::Bearer)
            .await?;
        info!(%project_id, video_id = %job.id, resolution = request.resolution.as_str(), "render requested");
        Ok(job)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_videos(&self, project_id: Uuid) -> Result<Vec<RenderJob>, ApiError> {
        self.get(&format!("/api/projects/{project_id}/videos"))
            .await
    }

    /// Current status of one render job.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_video(&self, project_id: Uuid, video_id: Uuid) -> Result<RenderJob, ApiError> {
        self.get(&format!("/api/projects/{project_id}/videos/{video_id}"))
            .await
    }
}
