//! Project, content and narrative endpoints.

use reqwest::Method;
use uuid::Uuid;

use super::types::{ContentInclusion, ContentItem, CreateProject, Narrative, Project, UpdateProject, latest_narrative};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get("/api/projects").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the body.
    pub async fn create_project(&self, body: &CreateProject) -> Result<Project, ApiError> {
        self.request(Method::POST, "/api/projects", Some(body), Auth::Bearer)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the project does not exist.
    pub async fn get_project(&self, project_id: Uuid) -> Result<Project, ApiError> {
        self.get(&format!("/api/projects/{project_id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the update.
    pub async fn update_project(&self, project_id: Uuid, update: &UpdateProject) -> Result<Project, ApiError> {
        let path = format!("/api/projects/{project_id}");
        self.request(Method::PATCH, &path, Some(update), Auth::Bearer)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_content(&self, project_id: Uuid) -> Result<Vec<ContentItem>, ApiError> {
        self.get(&format!("/api/projects/{project_id}/content"))
            .await
    }

    /// Mark one content item as included in (or excluded from) the narrative.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn set_content_included(&self, project_id: Uuid, item_id: Uuid, included: bool) -> Result<(), ApiError> {
        let path = format!("/api/projects/{project_id}/content/{item_id}");
        let body = ContentInclusion { included_in_narrative: included };
        self.request_unit(Method::PATCH, &path, Some(&body), Auth::Bearer)
            .await
    }

    /// Ask the backend to generate a fresh narrative from the included content.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn regenerate_narrative(&self, project_id: Uuid) -> Result<Narrative, ApiError> {
        let path = format!("/api/projects/{project_id}/narratives/regenerate");
        self.request::<Narrative, ()>(Method::POST, &path, None, Auth::Bearer)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_narratives(&self, project_id: Uuid) -> Result<Vec<Narrative>, ApiError> {
        self.get(&format!("/api/projects/{project_id}/narratives"))
            .await
    }

    /// Most recent narrative for a project, if one has been generated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn latest_narrative(&self, project_id: Uuid) -> Result<Option<Narrative>, ApiError> {
        Ok(latest_narrative(self.list_narratives(project_id).await?))
    }
}
