//! Render-status poller.
//!
//! DESIGN
//! ======
//! One async task per render: issue the request, then poll the job's
//! status on a fixed interval until it reaches a terminal status. Every
//! view change is published on a `watch` channel so a progress display can
//! follow along without owning the task.
//!
//! ERROR HANDLING
//! ==============
//! Only a terminal status stops polling successfully. Transient failures
//! (transport errors, 408/429/5xx) back off exponentially and are retried
//! up to `retry_limit` times in a row; a successful poll resets the count.
//! Anything else, or exhausting `max_attempts`, ends the task with an
//! error while the server-side job keeps running, so `follow` can resume it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::RenderError;
use super::tracker::{RenderTracker, RenderView};
use crate::api::Backend;
use crate::api::types::{RenderJob, RenderRequest};
use crate::config::PollPolicy;

pub struct RenderPoller<B: ?Sized> {
    backend: Arc<B>,
    policy: PollPolicy,
    updates: watch::Sender<RenderView>,
}

impl<B: Backend + ?Sized> RenderPoller<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, policy: PollPolicy) -> Self {
        let (updates, _) = watch::channel(RenderView::default());
        Self { backend, policy, updates }
    }

    /// Receiver that sees every published view, starting with the current one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RenderView> {
        self.updates.subscribe()
    }

    #[must_use]
    pub fn view(&self) -> RenderView {
        self.updates.borrow().clone()
    }

    /// Issue `request` and poll the resulting job until it is terminal.
    ///
    /// A `failed` job is a successful return: the view carries the server's
    /// error message.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Start`] if the render request fails, and the
    /// errors of [`Self::follow`] afterwards.
    pub async fn run(
        &self,
        project_id: Uuid,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> Result<RenderView, RenderError> {
        let mut tracker = RenderTracker::new();
        tracker.begin();
        self.publish(&tracker);

        let job = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RenderError::Cancelled),
            result = self.backend.render_video(project_id, request) => result.map_err(RenderError::Start)?,
        };
        self.track(project_id, job.id, Some(job), tracker, cancel).await
    }

    /// Poll an already-started job until it is terminal.
    ///
    /// The first status fetch is poll 1 and goes through the same transient
    /// retry policy as the rest.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Cancelled`] when `cancel` fires,
    /// [`RenderError::Poll`] on a non-transient failure or too many transient
    /// ones in a row, and [`RenderError::TimedOut`] once `max_attempts`
    /// polls have been spent.
    pub async fn follow(
        &self,
        project_id: Uuid,
        video_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<RenderView, RenderError> {
        let mut tracker = RenderTracker::new();
        tracker.begin();
        self.publish(&tracker);
        self.track(project_id, video_id, None, tracker, cancel).await
    }

    /// Drive `video_id` to a terminal status. With no `started` snapshot the
    /// first poll runs immediately.
    async fn track(
        &self,
        project_id: Uuid,
        video_id: Uuid,
        started: Option<RenderJob>,
        mut tracker: RenderTracker,
        cancel: &CancellationToken,
    ) -> Result<RenderView, RenderError> {
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        let mut delay = Duration::ZERO;
        if let Some(job) = started {
            self.apply(&mut tracker, &job);
            if tracker.view().phase.is_terminal() {
                return Ok(tracker.view().clone());
            }
            delay = self.policy.interval;
        }

        let mut polls: u32 = 0;
        let mut failures: u32 = 0;
        loop {
            if polls >= self.policy.max_attempts {
                warn!(%video_id, polls, "render poll budget exhausted");
                return Err(RenderError::TimedOut { polls });
            }
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RenderError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
            polls += 1;

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RenderError::Cancelled),
                result = self.backend.get_video(project_id, video_id) => result,
            };
            match result {
                Ok(snapshot) => {
                    failures = 0;
                    delay = self.policy.interval;
                    if cancel.is_cancelled() {
                        return Err(RenderError::Cancelled);
                    }
                    self.apply(&mut tracker, &snapshot);
                    if tracker.view().phase.is_terminal() {
                        return Ok(tracker.view().clone());
                    }
                }
                Err(error) if error.is_transient() && failures < self.policy.retry_limit => {
                    failures += 1;
                    delay = self.policy.backoff(failures);
                    warn!(%video_id, failures, ?delay, error = %error, "render poll failed; backing off");
                }
                Err(source) => {
                    warn!(%video_id, polls, error = %source, "render poll aborted");
                    return Err(RenderError::Poll { attempts: polls, source });
                }
            }
        }
    }

    fn apply(&self, tracker: &mut RenderTracker, job: &RenderJob) {
        let previous = tracker.view().phase;
        if !tracker.observe(job) {
            return;
        }
        let view = tracker.view();
        if view.phase == previous {
            debug!(video_id = %job.id, progress = view.progress, "render progress");
        } else {
            info!(video_id = %job.id, from = previous.label(), to = view.phase.label(), progress = view.progress, "render phase changed");
        }
        self.publish(tracker);
    }

    fn publish(&self, tracker: &RenderTracker) {
        self.updates.send_replace(tracker.view().clone());
    }
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod tests;
