//! HTTP binding layer for the memorial backend.
//!
//! DESIGN
//! ======
//! `ApiClient` is a thin wrapper over `reqwest`: it joins paths onto the
//! configured base URL, attaches the session's bearer token, serializes
//! JSON bodies and turns non-2xx statuses into [`ApiError::Http`]. Endpoint
//! groups live in sibling modules as `impl ApiClient` blocks.
//!
//! The flow controllers never see `ApiClient` directly; they depend on the
//! [`Backend`] trait so they can be driven by a recording mock in tests.
//!
//! ERROR HANDLING
//! ==============
//! No retries and no circuit breaking here. Callers decide what to do with
//! a failure; the render poller is the only caller that retries.

mod auth;
pub mod error;
mod import;
mod projects;
mod social;
pub mod types;
mod videos;
mod voice;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

pub use error::ApiError;
use types::{
    AudioSample, ContentItem, Narrative, Project, RenderJob, RenderRequest, UpdateProject, VoiceProfile,
};

use crate::config::ClientConfig;
use crate::session::Session;

// =============================================================================
// BACKEND SEAM
// =============================================================================

/// Backend operations used by the flow controllers and the render poller.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn get_project(&self, project_id: Uuid) -> Result<Project, ApiError>;

    async fn update_project(&self, project_id: Uuid, update: &UpdateProject) -> Result<Project, ApiError>;

    async fn list_content(&self, project_id: Uuid) -> Result<Vec<ContentItem>, ApiError>;

    async fn set_content_included(&self, project_id: Uuid, item_id: Uuid, included: bool) -> Result<(), ApiError>;

    async fn regenerate_narrative(&self, project_id: Uuid) -> Result<Narrative, ApiError>;

    async fn list_narratives(&self, project_id: Uuid) -> Result<Vec<Narrative>, ApiError>;

    async fn list_voice_profiles(&self) -> Result<Vec<VoiceProfile>, ApiError>;

    async fn get_voice_profile(&self, profile_id: Uuid) -> Result<VoiceProfile, ApiError>;

    async fn create_voice_profile(&self, name: &str, samples: &[AudioSample]) -> Result<VoiceProfile, ApiError>;

    async fn render_video(&self, project_id: Uuid, request: &RenderRequest) -> Result<RenderJob, ApiError>;

    async fn get_video(&self, project_id: Uuid, video_id: Uuid) -> Result<RenderJob, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Bearer,
    Skip,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Build a client for `config.base_url` that authenticates with `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), session })
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn builder(&self, method: Method, path: &str, auth: Auth) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match (auth, self.session.token()) {
            (Auth::Bearer, Some(token)) => request.bearer_auth(token),
            _ => request,
        }
    }

    /// Send a request and fail on any status outside 2xx.
    async fn send(&self, request: RequestBuilder, method: &Method, path: &str) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(response);
        }

        let status_text = status.canonical_reason().unwrap_or_default().to_owned();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Http { status: status.as_u16(), status_text, detail: error::parse_error_detail(&body) })
    }

    /// Issue a request with an optional JSON body. `204` yields `None`.
    async fn request_optional<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.builder(method.clone(), path, auth);
        let request = if let Some(body) = body { request.json(body) } else { request };
        let response = self.send(request, &method, path).await?;
        decode_optional(response).await
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>, auth: Auth) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_optional(method, path, body, auth)
            .await?
            .ok_or(ApiError::EmptyBody)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None, Auth::Bearer)
            .await
    }

    /// Issue a request whose response body, if any, is ignored.
    async fn request_unit<B>(&self, method: Method, path: &str, body: Option<&B>, auth: Auth) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.builder(method.clone(), path, auth);
        let request = if let Some(body) = body { request.json(body) } else { request };
        self.send(request, &method, path).await?;
        Ok(())
    }
}

async fn decode_optional<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl Backend for ApiClient {
    async fn get_project(&self, project_id: Uuid) -> Result<Project, ApiError> {
        ApiClient::get_project(self, project_id).await
    }

    async fn update_project(&self, project_id: Uuid, update: &UpdateProject) -> Result<Project, ApiError> {
        ApiClient::update_project(self, project_id, update).await
    }

    async fn list_content(&self, project_id: Uuid) -> Result<Vec<ContentItem>, ApiError> {
        ApiClient::list_content(self, project_id).await
    }

    async fn set_content_included(&self, project_id: Uuid, item_id: Uuid, included: bool) -> Result<(), ApiError> {
        ApiClient::set_content_included(self, project_id, item_id, included).await
    }

    async fn regenerate_narrative(&self, project_id: Uuid) -> Result<Narrative, ApiError> {
        ApiClient::regenerate_narrative(self, project_id).await
    }

    async fn list_narratives(&self, project_id: Uuid) -> Result<Vec<Narrative>, ApiError> {
        ApiClient::list_narratives(self, project_id).await
    }

    async fn list_voice_profiles(&self) -> Result<Vec<VoiceProfile>, ApiError> {
        ApiClient::list_voice_profiles(self).await
    }

    async fn get_voice_profile(&self, profile_id: Uuid) -> Result<VoiceProfile, ApiError> {
        ApiClient::get_voice_profile(self, profile_id).await
    }

    async fn create_voice_profile(&self, name: &str, samples: &[AudioSample]) -> Result<VoiceProfile, ApiError> {
        ApiClient::create_voice_profile(self, name, samples).await
    }

    async fn render_video(&self, project_id: Uuid, request: &RenderRequest) -> Result<RenderJob, ApiError> {
        ApiClient::render_video(self, project_id, request).await
    }

    async fn get_video(&self, project_id: Uuid, video_id: Uuid) -> Result<RenderJob, ApiError> {
        ApiClient::get_video(self, project_id, video_id).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
