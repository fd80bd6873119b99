//! Pure render-job state machine.
//!
//! `idle -> queued -> rendering -> {completed | failed}`. The tracker only
//! folds backend snapshots into a view; it never performs I/O, so every
//! transition rule is testable without a runtime.

use serde::Serialize;
use uuid::Uuid;

use crate::api::types::{RenderJob, RenderStatus};

const FAILED_FALLBACK_MESSAGE: &str = "Render failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPhase {
    #[default]
    Idle,
    Queued,
    Rendering,
    Completed,
    Failed,
}

impl RenderPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Queued => "queued",
            Self::Rendering => "rendering",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Queued => 1,
            Self::Rendering => 2,
            Self::Completed | Self::Failed => 3,
        }
    }
}

/// Client-side cached copy of a render job, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RenderView {
    pub phase: RenderPhase,
    pub video_id: Option<Uuid>,
    pub progress: u8,
    pub download_url: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderTracker {
    view: RenderView,
}

impl RenderTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn view(&self) -> &RenderView {
        &self.view
    }

    /// A render request was issued: reset to `queued` at 0%.
    pub fn begin(&mut self) {
        self.view = RenderView { phase: RenderPhase::Queued, ..RenderView::default() };
    }

    /// Fold a backend snapshot into the view. Returns whether the view changed.
    ///
    /// Once terminal the view is frozen. While non-terminal, progress never
    /// decreases and the phase never moves back from `rendering` to `queued`.
    /// Snapshots for a different job than the one being tracked are ignored.
    pub fn observe(&mut self, job: &RenderJob) -> bool {
        if self.view.phase.is_terminal() {
            return false;
        }
        match self.view.video_id {
            Some(id) if id != job.id => return false,
            _ => {}
        }

        let before = self.view.clone();
        self.view.video_id = Some(job.id);
        match job.status {
            RenderStatus::Queued | RenderStatus::Rendering => {
                let phase = if job.status == RenderStatus::Rendering {
                    RenderPhase::Rendering
                } else {
                    RenderPhase::Queued
                };
                if phase.rank() > self.view.phase.rank() {
                    self.view.phase = phase;
                }
                self.view.progress = self.view.progress.max(job.progress.min(100));
            }
            RenderStatus::Completed => {
                self.view.phase = RenderPhase::Completed;
                self.view.progress = 100;
                self.view.download_url.clone_from(&job.download_url);
            }
            RenderStatus::Failed => {
                self.view.phase = RenderPhase::Failed;
                self.view.error_message = Some(
                    job.error_message
                        .clone()
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| FAILED_FALLBACK_MESSAGE.to_owned()),
                );
            }
        }
        self.view != before
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
