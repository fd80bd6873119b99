//! Wire types for the memorial backend.
//!
//! DESIGN
//! ======
//! One canonical shape per entity. Content items expose public URLs
//! (`thumbnail_url`, `original_url`); storage keys are a backend detail and
//! are not modeled. Status enums carry an `Other` catch-all where the
//! backend has historically added values, so a new status never breaks
//! deserialization of an otherwise valid payload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// First word of the display name, as used in greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("Guest")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// PROJECTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Processing,
    Completed,
    Archived,
    #[serde(other)]
    Other,
}

/// Kind of memorial a project produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorialKind {
    Milestone,
    Family,
    Tribute,
    Celebration,
}

impl MemorialKind {
    pub const ALL: [Self; 4] = [Self::Milestone, Self::Family, Self::Tribute, Self::Celebration];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Milestone => "milestone",
            Self::Family => "family",
            Self::Tribute => "tribute",
            Self::Celebration => "celebration",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Milestone => "Mile Stone",
            Self::Family => "Family Memorial",
            Self::Tribute => "Tribute",
            Self::Celebration => "Celebration",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Milestone => "A yearly reflection on life's journey",
            Self::Family => "Celebrate family moments and gatherings",
            Self::Tribute => "Honor and remember a loved one",
            Self::Celebration => "Mark a special occasion or achievement",
        }
    }

    /// Sample title shown as a placeholder.
    #[must_use]
    pub fn example_title(self) -> &'static str {
        match self {
            Self::Milestone => "2024 - Year of Growth",
            Self::Family => "Christmas 2024",
            Self::Tribute => "In Memory of Grandpa",
            Self::Celebration => "Graduation Day",
        }
    }
}

impl std::str::FromStr for MemorialKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| format!("unknown memorial type '{raw}' (expected milestone, family, tribute or celebration)"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub memorial_type: Option<MemorialKind>,
    #[serde(default)]
    pub timeframe_start: Option<String>,
    #[serde(default)]
    pub timeframe_end: Option<String>,
    #[serde(default)]
    pub voice_profile_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateProject {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memorial_type: Option<MemorialKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe_end: Option<String>,
}

/// Partial project update; unset fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_profile_id: Option<Uuid>,
}

// =============================================================================
// CONTENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Photo,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub original_caption: Option<String>,
    #[serde(default)]
    pub taken_at: Option<String>,
    #[serde(default)]
    pub included_in_narrative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentInclusion {
    pub included_in_narrative: bool,
}

// =============================================================================
// NARRATIVES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeStatus {
    Generating,
    Review,
    Approved,
    Rejected,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub order: u32,
    pub text: String,
    #[serde(default)]
    pub content_ids: Vec<Uuid>,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub transition: Option<String>,
}

/// Generated narrative script. Regeneration replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub id: Uuid,
    #[serde(default)]
    pub version: u32,
    pub status: NarrativeStatus,
    pub script_text: String,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub estimated_duration_seconds: Option<u32>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl Narrative {
    /// Word count reported by the backend, or counted locally when absent.
    #[must_use]
    pub fn words(&self) -> u32 {
        self.word_count
            .unwrap_or_else(|| u32::try_from(self.script_text.split_whitespace().count()).unwrap_or(u32::MAX))
    }
}

/// Latest narrative wins: highest version, later list position on ties.
#[must_use]
pub fn latest_narrative(narratives: Vec<Narrative>) -> Option<Narrative> {
    narratives
        .into_iter()
        .enumerate()
        .max_by_key(|(index, narrative)| (narrative.version, *index))
        .map(|(_, narrative)| narrative)
}

// =============================================================================
// VOICE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceProfileStatus {
    Processing,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub id: Uuid,
    pub name: String,
    pub status: VoiceProfileStatus,
    #[serde(default)]
    pub sample_duration_seconds: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One recorded audio sample destined for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSample {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl AudioSample {
    /// A `audio/webm` sample named `recording_{step}.webm`.
    #[must_use]
    pub fn webm(step: usize, bytes: Vec<u8>) -> Self {
        Self { file_name: format!("recording_{step}.webm"), mime: "audio/webm".to_owned(), bytes }
    }
}

// =============================================================================
// VIDEOS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "4k")]
    Uhd4k,
}

impl Resolution {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hd720 => "720p",
            Self::Hd1080 => "1080p",
            Self::Uhd4k => "4k",
        }
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "720p" => Ok(Self::Hd720),
            "1080p" => Ok(Self::Hd1080),
            "4k" => Ok(Self::Uhd4k),
            other => Err(format!("unknown resolution '{other}' (expected 720p, 1080p or 4k)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Queued,
    Rendering,
    Completed,
    Failed,
}

impl RenderStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Parameters of a render request. Retrying re-sends these unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    pub narrative_id: Uuid,
    pub voice_profile_id: Uuid,
    pub resolution: Resolution,
}

/// Server-side render job snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    pub id: Uuid,
    pub status: RenderStatus,
    #[serde(rename = "render_progress", alias = "progress", default)]
    pub progress: u8,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub narrative_id: Option<Uuid>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

// =============================================================================
// SOCIAL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Tiktok,
}

impl SocialPlatform {
    pub const ALL: [Self; 3] = [Self::Instagram, Self::Facebook, Self::Tiktok];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Tiktok => "tiktok",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Tiktok => "TikTok",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Instagram => "Import photos and reels from your Instagram account",
            Self::Facebook => "Import photos and videos from your Facebook timeline",
            Self::Tiktok => "Import your TikTok videos and memories",
        }
    }
}

impl std::str::FromStr for SocialPlatform {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| format!("unknown platform '{raw}' (expected instagram, facebook or tiktok)"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialConnection {
    pub id: Uuid,
    pub platform: SocialPlatform,
    #[serde(default)]
    pub platform_username: Option<String>,
    #[serde(default)]
    pub connected_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectUrl {
    pub auth_url: String,
}

// =============================================================================
// IMPORT
// =============================================================================

/// Presigned storage target for an Instagram archive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadUrl {
    pub upload_url: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessImport {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items_imported: Option<u32>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
