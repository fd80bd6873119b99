use super::*;
use crate::api::types::{RenderStatus, Resolution};
use crate::render::RenderPhase;
use crate::test_helpers::{self, Call, MockBackend, failed_job, http_error, job};
use std::time::Duration;

fn request() -> RenderRequest {
    RenderRequest {
        narrative_id: Uuid::new_v4(),
        voice_profile_id: Uuid::new_v4(),
        resolution: Resolution::Hd1080,
    }
}

fn policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_secs(3),
        max_attempts: 50,
        retry_limit: 3,
        backoff_base: Duration::from_secs(1),
        backoff_max: Duration::from_secs(8),
    }
}

fn setup() -> (Arc<MockBackend>, RenderPoller<MockBackend>, Uuid) {
    let project = test_helpers::project();
    let project_id = project.id;
    let backend = Arc::new(MockBackend::new(project));
    let poller = RenderPoller::new(backend.clone(), policy());
    (backend, poller, project_id)
}

fn polls(backend: &MockBackend) -> usize {
    backend.count(|c| matches!(c, Call::GetVideo(..)))
}

// =============================================================
// Happy path
// =============================================================

#[tokio::test(start_paused = true)]
async fn polls_until_completed_then_stops() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    backend.push_poll(Ok(job(video, RenderStatus::Rendering, 30)));
    backend.push_poll(Ok(job(video, RenderStatus::Rendering, 70)));
    backend.push_poll(Ok(job(video, RenderStatus::Completed, 100)));
    // Anything past the terminal poll would be a bug.
    backend.push_poll(Ok(job(video, RenderStatus::Failed, 0)));

    let view = poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(view.phase, RenderPhase::Completed);
    assert_eq!(view.video_id, Some(video));
    assert!(view.download_url.is_some());
    assert_eq!(polls(&backend), 3);
    assert_eq!(poller.view(), view);
}

#[tokio::test(start_paused = true)]
async fn polls_on_fixed_interval() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    backend.push_poll(Ok(job(video, RenderStatus::Rendering, 50)));
    backend.push_poll(Ok(job(video, RenderStatus::Completed, 100)));

    let started = tokio::time::Instant::now();
    poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn terminal_render_response_issues_no_polls() {
    let (backend, poller, project_id) = setup();
    backend.push_render(Ok(failed_job(Uuid::new_v4(), "out of memory")));

    let view = poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(view.phase, RenderPhase::Failed);
    assert_eq!(view.error_message.as_deref(), Some("out of memory"));
    assert_eq!(polls(&backend), 0);
}

#[tokio::test(start_paused = true)]
async fn published_progress_never_decreases() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    for progress in [20, 10, 45, 30, 80] {
        backend.push_poll(Ok(job(video, RenderStatus::Rendering, progress)));
    }
    backend.push_poll(Ok(job(video, RenderStatus::Completed, 100)));

    let mut rx = poller.subscribe();
    let seen = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let view = rx.borrow_and_update().clone();
            let terminal = view.phase.is_terminal();
            seen.push(view.progress);
            if terminal {
                break;
            }
        }
        seen
    });

    poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap();
    let seen = seen.await.unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
    assert_eq!(seen.last(), Some(&100));
}

// =============================================================
// Failure handling
// =============================================================

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_with_backoff() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    backend.push_poll(Err(http_error(503)));
    backend.push_poll(Err(http_error(502)));
    backend.push_poll(Ok(job(video, RenderStatus::Completed, 100)));

    let started = tokio::time::Instant::now();
    let view = poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(view.phase, RenderPhase::Completed);
    assert_eq!(polls(&backend), 3);
    // 3s interval, then 1s and 2s backoff.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn success_resets_transient_failure_budget() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    for _ in 0..3 {
        backend.push_poll(Err(http_error(500)));
    }
    backend.push_poll(Ok(job(video, RenderStatus::Rendering, 10)));
    for _ in 0..3 {
        backend.push_poll(Err(http_error(500)));
    }
    backend.push_poll(Ok(job(video, RenderStatus::Completed, 100)));

    let view = poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(view.phase, RenderPhase::Completed);
}

#[tokio::test(start_paused = true)]
async fn too_many_transient_failures_abort() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    for _ in 0..4 {
        backend.push_poll(Err(http_error(503)));
    }

    let err = poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Poll { attempts: 4, .. }), "got {err:?}");
    assert_eq!(polls(&backend), 4);
}

#[tokio::test(start_paused = true)]
async fn definitive_failure_aborts_immediately() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    backend.push_poll(Err(http_error(404)));

    let err = poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Poll { attempts: 1, .. }));
    assert_eq!(polls(&backend), 1);
}

#[tokio::test(start_paused = true)]
async fn start_failure_is_reported() {
    let (backend, poller, project_id) = setup();
    backend.push_render(Err(http_error(422)));

    let err = poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Start(_)));
    assert_eq!(polls(&backend), 0);
}

#[tokio::test(start_paused = true)]
async fn poll_budget_is_bounded() {
    let project = test_helpers::project();
    let project_id = project.id;
    let backend = Arc::new(MockBackend::new(project));
    let poller = RenderPoller::new(backend.clone(), PollPolicy { max_attempts: 3, ..policy() });
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    for _ in 0..5 {
        backend.push_poll(Ok(job(video, RenderStatus::Rendering, 10)));
    }

    let started = tokio::time::Instant::now();
    let err = poller
        .run(project_id, &request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::TimedOut { polls: 3 }));
    assert_eq!(polls(&backend), 3);
    // Gives up right after the third poll instead of sleeping once more.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(9) && elapsed < Duration::from_secs(10), "{elapsed:?}");
}

// =============================================================
// Cancellation
// =============================================================

#[tokio::test(start_paused = true)]
async fn cancellation_stops_polling() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_render(Ok(job(video, RenderStatus::Queued, 0)));
    for _ in 0..10 {
        backend.push_poll(Ok(job(video, RenderStatus::Rendering, 10)));
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(7500)).await;
        trigger.cancel();
    });

    let err = poller
        .run(project_id, &request(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Cancelled));
    assert_eq!(polls(&backend), 2);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_issues_nothing() {
    let (backend, poller, project_id) = setup();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = poller
        .run(project_id, &request(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Cancelled));
    assert!(backend.calls().is_empty());
}

// =============================================================
// Follow
// =============================================================

#[tokio::test(start_paused = true)]
async fn follow_resumes_existing_job() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_poll(Ok(job(video, RenderStatus::Rendering, 60)));
    backend.push_poll(Ok(job(video, RenderStatus::Completed, 100)));

    let view = poller
        .follow(project_id, video, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(view.phase, RenderPhase::Completed);
    assert_eq!(polls(&backend), 2);
    assert!(backend.count(|c| matches!(c, Call::Render(..))) == 0);
}

#[tokio::test(start_paused = true)]
async fn follow_retries_transient_first_fetch() {
    let (backend, poller, project_id) = setup();
    let video = Uuid::new_v4();
    backend.push_poll(Err(http_error(503)));
    backend.push_poll(Ok(job(video, RenderStatus::Rendering, 60)));
    backend.push_poll(Ok(job(video, RenderStatus::Completed, 100)));

    let view = poller
        .follow(project_id, video, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(view.phase, RenderPhase::Completed);
    assert_eq!(polls(&backend), 3);
}

#[tokio::test(start_paused = true)]
async fn follow_counts_first_fetch_against_budget() {
    let project = test_helpers::project();
    let project_id = project.id;
    let backend = Arc::new(MockBackend::new(project));
    let poller = RenderPoller::new(backend.clone(), PollPolicy { max_attempts: 2, ..policy() });
    let video = Uuid::new_v4();
    for _ in 0..4 {
        backend.push_poll(Ok(job(video, RenderStatus::Rendering, 10)));
    }

    let err = poller
        .follow(project_id, video, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::TimedOut { polls: 2 }), "got {err:?}");
    assert_eq!(polls(&backend), 2);
}
