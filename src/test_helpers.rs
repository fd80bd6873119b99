//! Shared fixtures for unit tests: a recording `Backend` mock and payload
//! builders.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use uuid::Uuid;

use crate::api::types::{
    AudioSample, ContentItem, ContentKind, Narrative, NarrativeStatus, Project, ProjectStatus, RenderJob,
    RenderRequest, RenderStatus, UpdateProject, VoiceProfile, VoiceProfileStatus,
};
use crate::api::{ApiError, Backend};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetProject(Uuid),
    UpdateProject(Uuid, UpdateProject),
    ListContent(Uuid),
    SetIncluded { item_id: Uuid, included: bool },
    Regenerate(Uuid),
    ListNarratives(Uuid),
    ListVoiceProfiles,
    GetVoiceProfile(Uuid),
    CreateVoiceProfile { name: String, samples: usize },
    Render(Uuid, RenderRequest),
    GetVideo(Uuid, Uuid),
}

pub struct MockBackend {
    pub project: Mutex<Project>,
    pub content: Mutex<Vec<ContentItem>>,
    pub narratives: Mutex<Vec<Narrative>>,
    pub voice_profiles: Mutex<Vec<VoiceProfile>>,
    pub render_responses: Mutex<VecDeque<Result<RenderJob, ApiError>>>,
    pub poll_responses: Mutex<VecDeque<Result<RenderJob, ApiError>>>,
    pub calls: Mutex<Vec<Call>>,
    /// Simulated latency for content PATCH and regenerate calls.
    pub latency: Duration,
}

impl MockBackend {
    pub fn new(project: Project) -> Self {
        Self {
            project: Mutex::new(project),
            content: Mutex::new(Vec::new()),
            narratives: Mutex::new(Vec::new()),
            voice_profiles: Mutex::new(Vec::new()),
            render_responses: Mutex::new(VecDeque::new()),
            poll_responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn with_content(self, items: Vec<ContentItem>) -> Self {
        *self.content.lock().unwrap() = items;
        self
    }

    pub fn with_narratives(self, narratives: Vec<Narrative>) -> Self {
        *self.narratives.lock().unwrap() = narratives;
        self
    }

    pub fn with_voice_profiles(self, profiles: Vec<VoiceProfile>) -> Self {
        *self.voice_profiles.lock().unwrap() = profiles;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_render(&self, response: Result<RenderJob, ApiError>) {
        self.render_responses.lock().unwrap().push_back(response);
    }

    pub fn push_poll(&self, response: Result<RenderJob, ApiError>) {
        self.poll_responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn get_project(&self, project_id: Uuid) -> Result<Project, ApiError> {
        self.record(Call::GetProject(project_id));
        Ok(self.project.lock().unwrap().clone())
    }

    async fn update_project(&self, project_id: Uuid, update: &UpdateProject) -> Result<Project, ApiError> {
        self.record(Call::UpdateProject(project_id, update.clone()));
        let mut project = self.project.lock().unwrap();
        if let Some(voice) = update.voice_profile_id {
            project.voice_profile_id = Some(voice);
        }
        Ok(project.clone())
    }

    async fn list_content(&self, project_id: Uuid) -> Result<Vec<ContentItem>, ApiError> {
        self.record(Call::ListContent(project_id));
        Ok(self.content.lock().unwrap().clone())
    }

    async fn set_content_included(&self, _project_id: Uuid, item_id: Uuid, included: bool) -> Result<(), ApiError> {
        self.record(Call::SetIncluded { item_id, included });
        self.delay().await;
        Ok(())
    }

    async fn regenerate_narrative(&self, project_id: Uuid) -> Result<Narrative, ApiError> {
        self.record(Call::Regenerate(project_id));
        self.delay().await;
        let version = u32::try_from(self.narratives.lock().unwrap().len()).unwrap() + 1;
        let generated = narrative(version, "Generated narrative");
        self.narratives.lock().unwrap().push(generated.clone());
        Ok(generated)
    }

    async fn list_narratives(&self, project_id: Uuid) -> Result<Vec<Narrative>, ApiError> {
        self.record(Call::ListNarratives(project_id));
        Ok(self.narratives.lock().unwrap().clone())
    }

    async fn list_voice_profiles(&self) -> Result<Vec<VoiceProfile>, ApiError> {
        self.record(Call::ListVoiceProfiles);
        Ok(self.voice_profiles.lock().unwrap().clone())
    }

    async fn get_voice_profile(&self, profile_id: Uuid) -> Result<VoiceProfile, ApiError> {
        self.record(Call::GetVoiceProfile(profile_id));
        self.voice_profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == profile_id)
            .cloned()
            .ok_or_else(|| http_error(404))
    }

    async fn create_voice_profile(&self, name: &str, samples: &[AudioSample]) -> Result<VoiceProfile, ApiError> {
        self.record(Call::CreateVoiceProfile { name: name.to_owned(), samples: samples.len() });
        let profile = voice_profile(VoiceProfileStatus::Processing);
        let profile = VoiceProfile { name: name.to_owned(), ..profile };
        self.voice_profiles.lock().unwrap().push(profile.clone());
        Ok(profile)
    }

    async fn render_video(&self, project_id: Uuid, request: &RenderRequest) -> Result<RenderJob, ApiError> {
        self.record(Call::Render(project_id, *request));
        self.render_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(job(Uuid::new_v4(), RenderStatus::Queued, 0)))
    }

    async fn get_video(&self, project_id: Uuid, video_id: Uuid) -> Result<RenderJob, ApiError> {
        self.record(Call::GetVideo(project_id, video_id));
        self.poll_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(http_error(404)))
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

pub fn project() -> Project {
    Project {
        id: Uuid::new_v4(),
        title: "2024 - A Different Dream".to_owned(),
        status: ProjectStatus::Draft,
        description: None,
        memorial_type: None,
        timeframe_start: Some("2024-01-01".to_owned()),
        timeframe_end: Some("2024-12-31".to_owned()),
        voice_profile_id: None,
    }
}

pub fn content_items(count: usize) -> Vec<ContentItem> {
    (0..count)
        .map(|index| ContentItem {
            id: Uuid::new_v4(),
            kind: if index % 3 == 0 { ContentKind::Video } else { ContentKind::Photo },
            thumbnail_url: None,
            original_url: Some(format!("https://cdn.example.test/{index}")),
            original_caption: None,
            taken_at: None,
            included_in_narrative: false,
        })
        .collect()
}

pub fn narrative(version: u32, text: &str) -> Narrative {
    Narrative {
        id: Uuid::new_v4(),
        version,
        status: NarrativeStatus::Review,
        script_text: text.to_owned(),
        word_count: None,
        estimated_duration_seconds: Some(90),
        scenes: Vec::new(),
    }
}

pub fn voice_profile(status: VoiceProfileStatus) -> VoiceProfile {
    VoiceProfile {
        id: Uuid::new_v4(),
        name: "My Voice".to_owned(),
        status,
        sample_duration_seconds: Some(95.0),
        created_at: None,
    }
}

pub fn job(id: Uuid, status: RenderStatus, progress: u8) -> RenderJob {
    RenderJob {
        id,
        status,
        progress,
        resolution: None,
        narrative_id: None,
        download_url: (status == RenderStatus::Completed).then(|| format!("https://cdn.example.test/{id}.mp4")),
        error_message: None,
        duration_seconds: None,
    }
}

pub fn failed_job(id: Uuid, message: &str) -> RenderJob {
    RenderJob { error_message: Some(message.to_owned()), ..job(id, RenderStatus::Failed, 0) }
}

pub fn http_error(status: u16) -> ApiError {
    ApiError::Http { status, status_text: String::new(), detail: None }
}
