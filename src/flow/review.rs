//! Review step: show the narrative and voice, then render the video.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use super::{FlowError, ensure_live};
use crate::api::Backend;
use crate::api::types::{Narrative, Project, RenderRequest, Resolution, VoiceProfile, latest_narrative};
use crate::config::PollPolicy;
use crate::render::{RenderError, RenderPhase, RenderPoller, RenderView};

pub struct ReviewFlow<B: ?Sized> {
    backend: Arc<B>,
    project_id: Uuid,
    project: Option<Project>,
    narrative: Option<Narrative>,
    voice: Option<VoiceProfile>,
    poller: RenderPoller<B>,
    last_request: Option<RenderRequest>,
    retryable: bool,
}

impl<B: Backend + ?Sized> ReviewFlow<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, project_id: Uuid, policy: PollPolicy) -> Self {
        let poller = RenderPoller::new(Arc::clone(&backend), policy);
        Self {
            backend,
            project_id,
            project: None,
            narrative: None,
            voice: None,
            poller,
            last_request: None,
            retryable: false,
        }
    }

    /// Fetch the project, its latest narrative and its attached voice.
    ///
    /// # Errors
    ///
    /// Backend failures or [`FlowError::Cancelled`].
    pub async fn load(&mut self, cancel: &CancellationToken) -> Result<(), FlowError> {
        let (backend, project_id) = (&self.backend, self.project_id);
        let (project, narratives) = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FlowError::Cancelled),
            result = async {
                tokio::try_join!(backend.get_project(project_id), backend.list_narratives(project_id))
            } => result?,
        };
        let voice = match project.voice_profile_id {
            Some(profile_id) => tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(FlowError::Cancelled),
                result = backend.get_voice_profile(profile_id) => Some(result?),
            },
            None => None,
        };
        ensure_live(cancel)?;

        self.narrative = latest_narrative(narratives);
        self.voice = voice;
        self.project = Some(project);
        info!(
            %project_id,
            narrative = self.narrative.as_ref().map(|n| n.version),
            voice = self.voice.as_ref().map(|v| v.name.as_str()),
            "review loaded"
        );
        Ok(())
    }

    #[must_use]
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    #[must_use]
    pub fn narrative(&self) -> Option<&Narrative> {
        self.narrative.as_ref()
    }

    #[must_use]
    pub fn voice(&self) -> Option<&VoiceProfile> {
        self.voice.as_ref()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<&RenderRequest> {
        self.last_request.as_ref()
    }

    #[must_use]
    pub fn render_view(&self) -> RenderView {
        self.poller.view()
    }

    /// Progress updates for the render in flight.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RenderView> {
        self.poller.subscribe()
    }

    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.retryable && self.last_request.is_some()
    }

    /// Request a render of the loaded narrative in the loaded voice and follow
    /// it to a terminal phase. A `failed` render is an `Ok` view carrying the
    /// server's message; [`Self::retry_render`] may then re-issue it.
    ///
    /// # Errors
    ///
    /// [`FlowError::Validation`] without a narrative or voice, otherwise the
    /// poller's errors.
    pub async fn generate_video(
        &mut self,
        resolution: Resolution,
        cancel: &CancellationToken,
    ) -> Result<RenderView, FlowError> {
        let narrative = self
            .narrative
            .as_ref()
            .ok_or_else(|| FlowError::validation("generate a narrative first"))?;
        let voice = self.voice.as_ref().ok_or_else(|| FlowError::validation("select a voice first"))?;

        let request = RenderRequest { narrative_id: narrative.id, voice_profile_id: voice.id, resolution };
        self.last_request = Some(request);
        self.render(request, cancel).await
    }

    /// Re-issue the last render request unchanged after it failed.
    ///
    /// # Errors
    ///
    /// [`RenderError::NothingToRetry`] unless the last render failed,
    /// otherwise the poller's errors.
    pub async fn retry_render(&mut self, cancel: &CancellationToken) -> Result<RenderView, FlowError> {
        let request = match self.last_request {
            Some(request) if self.retryable => request,
            _ => return Err(RenderError::NothingToRetry.into()),
        };
        info!(project_id = %self.project_id, resolution = request.resolution.as_str(), "retrying render");
        self.render(request, cancel).await
    }

    /// Resume tracking a render started elsewhere.
    ///
    /// # Errors
    ///
    /// The poller's errors.
    pub async fn follow(&mut self, video_id: Uuid, cancel: &CancellationToken) -> Result<RenderView, FlowError> {
        let outcome = self.poller.follow(self.project_id, video_id, cancel).await;
        self.settle(outcome)
    }

    async fn render(&mut self, request: RenderRequest, cancel: &CancellationToken) -> Result<RenderView, FlowError> {
        ensure_live(cancel)?;
        self.retryable = false;
        let outcome = self.poller.run(self.project_id, &request, cancel).await;
        self.settle(outcome)
    }

    fn settle(&mut self, outcome: Result<RenderView, RenderError>) -> Result<RenderView, FlowError> {
        match outcome {
            Ok(view) => {
                self.retryable = view.phase == RenderPhase::Failed;
                Ok(view)
            }
            Err(RenderError::Cancelled) => Err(FlowError::Cancelled),
            Err(error) => {
                self.retryable = matches!(error, RenderError::Start(_));
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "review_test.rs"]
mod tests;
