//! Render-job tracking: a pure state machine plus the async poller that
//! feeds it.

pub mod poller;
pub mod tracker;

pub use poller::RenderPoller;
pub use tracker::{RenderPhase, RenderTracker, RenderView};

use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render request failed: {0}")]
    Start(#[source] ApiError),

    #[error("lost contact with render job after {attempts} status checks: {source}")]
    Poll {
        attempts: u32,
        #[source]
        source: ApiError,
    },

    #[error("render still running after {polls} status checks")]
    TimedOut { polls: u32 },

    #[error("render tracking cancelled")]
    Cancelled,

    #[error("no failed render to retry")]
    NothingToRetry,
}
