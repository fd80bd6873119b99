//! `/api/voice` endpoints.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::info;
use uuid::Uuid;

use super::types::{AudioSample, VoiceProfile};
use super::{ApiClient, ApiError, Auth};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_voice_profiles(&self) -> Result<Vec<VoiceProfile>, ApiError> {
        self.get("/api/voice/profiles").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the profile does not exist.
    pub async fn get_voice_profile(&self, profile_id: Uuid) -> Result<VoiceProfile, ApiError> {
        self.get(&format!("/api/voice/profiles/{profile_id}"))
            .await
    }

    /// Create a voice profile from recorded samples in a single multipart
    /// POST: one `name` field plus one `samples` part per recording.
    ///
    /// # Errors
    ///
    /// Returns an error if a part cannot be built or the request fails.
    pub async fn create_voice_profile(&self, name: &str, samples: &[AudioSample]) -> Result<VoiceProfile, ApiError> {
        let form = voice_profile_form(name, samples)?;
        let path = "/api/voice/profiles";
        let request = self
            .builder(Method::POST, path, Auth::Bearer)
            .multipart(form);
        let response = self.send(request, &Method::POST, path).await?;
        let profile: VoiceProfile = super::decode_optional(response)
            .await?
            .ok_or(ApiError::EmptyBody)?;
        info!(profile_id = %profile.id, samples = samples.len(), "voice profile submitted");
        Ok(profile)
    }
}

pub(crate) fn voice_profile_form(name: &str, samples: &[AudioSample]) -> Result<Form, ApiError> {
    samples
        .iter()
        .try_fold(Form::new().text("name", name.to_owned()), |form, sample| {
            let part = Part::bytes(sample.bytes.clone())
                .file_name(sample.file_name.clone())
                .mime_str(&sample.mime)
                .map_err(|e| ApiError::Multipart(e.to_string()))?;
            Ok(form.part("samples", part))
        })
}
