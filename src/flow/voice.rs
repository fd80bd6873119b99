//! Voice step: record three scripted samples into a new profile, or attach
//! an existing ready profile to the project.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use super::guard::SingleFlight;
use super::{FlowError, ensure_live};
use crate::api::Backend;
use crate::api::types::{AudioSample, Project, UpdateProject, VoiceProfile, VoiceProfileStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingPrompt {
    pub title: &'static str,
    pub description: &'static str,
    pub script: &'static str,
}

pub const RECORDING_PROMPTS: [RecordingPrompt; 3] = [
    RecordingPrompt {
        title: "Read a short passage",
        description: "We'll use this to capture your voice characteristics",
        script: "In the future when your descendants ask their parents, 'What do these stones mean?' \
                 tell them, 'Israel crossed the Jordan on dry ground.' For the Lord your God dried up \
                 the Jordan before you until you had crossed over.",
    },
    RecordingPrompt {
        title: "Share a memory",
        description: "Tell us about a meaningful moment in your life",
        script: "Speak naturally for 30-60 seconds about a favorite memory, a lesson you've learned, \
                 or something you're grateful for.",
    },
    RecordingPrompt {
        title: "Express emotions",
        description: "Help us capture your emotional range",
        script: "Read these phrases with feeling: 'I'm so proud of you.' 'This was the happiest day of \
                 my life.' 'I'll always remember this moment.' 'Thank you for everything.'",
    },
];

const STEPS: usize = RECORDING_PROMPTS.len();

pub struct VoiceRecorder<B: ?Sized> {
    backend: Arc<B>,
    step: usize,
    recordings: [Option<Vec<u8>>; STEPS],
    submitting: SingleFlight,
}

impl<B: Backend + ?Sized> VoiceRecorder<B> {
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend, step: 0, recordings: Default::default(), submitting: SingleFlight::new() }
    }

    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    #[must_use]
    pub fn prompt(&self) -> &'static RecordingPrompt {
        &RECORDING_PROMPTS[self.step]
    }

    /// Store (or replace) the sample for the current step.
    pub fn record(&mut self, audio: Vec<u8>) {
        self.recordings[self.step] = Some(audio);
    }

    #[must_use]
    pub fn has_recording(&self, step: usize) -> bool {
        self.recordings.get(step).is_some_and(Option::is_some)
    }

    /// Advance to the next prompt. Returns `false` on the last prompt.
    ///
    /// # Errors
    ///
    /// [`FlowError::Validation`] when the current prompt has no sample yet.
    pub fn advance(&mut self) -> Result<bool, FlowError> {
        if !self.has_recording(self.step) {
            return Err(FlowError::validation(format!("record \"{}\" first", self.prompt().title)));
        }
        if self.step + 1 < STEPS {
            self.step += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn back(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.recordings.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn samples(&self) -> Vec<AudioSample> {
        self.recordings
            .iter()
            .enumerate()
            .filter_map(|(step, audio)| audio.as_ref().map(|bytes| AudioSample::webm(step, bytes.clone())))
            .collect()
    }

    /// Upload all samples as one new voice profile.
    ///
    /// # Errors
    ///
    /// [`FlowError::Validation`] for a blank name or a missing sample,
    /// [`FlowError::InFlight`] while an upload is running, backend failures
    /// otherwise.
    pub async fn submit(&self, name: &str, cancel: &CancellationToken) -> Result<VoiceProfile, FlowError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FlowError::validation("voice profile name is required"));
        }
        if !self.is_complete() {
            return Err(FlowError::validation(format!("all {STEPS} recordings are required")));
        }
        let _permit = self.submitting.try_acquire().ok_or(FlowError::InFlight)?;
        ensure_live(cancel)?;

        let samples = self.samples();
        let profile = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FlowError::Cancelled),
            result = self.backend.create_voice_profile(name, &samples) => result?,
        };
        info!(profile_id = %profile.id, samples = samples.len(), "voice profile created");
        Ok(profile)
    }

    /// Existing profiles to choose from instead of recording.
    ///
    /// # Errors
    ///
    /// Backend failures or [`FlowError::Cancelled`].
    pub async fn existing(&self, cancel: &CancellationToken) -> Result<Vec<VoiceProfile>, FlowError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FlowError::Cancelled),
            result = self.backend.list_voice_profiles() => Ok(result?),
        }
    }

    /// Attach a ready profile to the project.
    ///
    /// # Errors
    ///
    /// [`FlowError::Validation`] when the profile is still processing or
    /// failed; backend failures otherwise.
    pub async fn select_existing(
        &self,
        project_id: Uuid,
        profile_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Project, FlowError> {
        let profile = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FlowError::Cancelled),
            result = self.backend.get_voice_profile(profile_id) => result?,
        };
        if profile.status != VoiceProfileStatus::Ready {
            return Err(FlowError::validation(format!("voice profile \"{}\" is not ready", profile.name)));
        }
        ensure_live(cancel)?;

        let update = UpdateProject { voice_profile_id: Some(profile_id), ..UpdateProject::default() };
        let project = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FlowError::Cancelled),
            result = self.backend.update_project(project_id, &update) => result?,
        };
        info!(%project_id, %profile_id, "voice profile attached");
        Ok(project)
    }
}

#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;
