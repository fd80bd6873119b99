//! Page-level flow controllers.
//!
//! DESIGN
//! ======
//! Each controller owns the working state one page of the web client kept
//! in component state (a selection set, a step index, the last render
//! request) and drives the backend through the [`Backend`] trait. Nothing
//! here persists: every `load` re-fetches what it shows.
//!
//! Async operations take a `CancellationToken` and check it before any
//! state mutation, so a caller that walked away never has its controller
//! updated behind its back.
//!
//! ERROR HANDLING
//! ==============
//! Input problems are [`FlowError::Validation`] and are raised before any
//! network call. Backend failures pass through as [`FlowError::Api`]; the
//! controller is left in a state from which the same action can be retried.
//!
//! [`Backend`]: crate::api::Backend

pub mod auth;
pub mod connections;
pub mod content;
pub mod guard;
pub mod memorial;
pub mod review;
pub mod selection;
pub mod voice;

pub use content::ContentFlow;
pub use guard::{SingleFlight, SingleFlightPermit};
pub use review::ReviewFlow;
pub use selection::ContentSelection;
pub use voice::VoiceRecorder;

use tokio_util::sync::CancellationToken;

use crate::api::ApiError;
use crate::render::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{0}")]
    Validation(String),

    #[error("request already in progress")]
    InFlight,

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl FlowError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub(crate) fn ensure_live(cancel: &CancellationToken) -> Result<(), FlowError> {
    if cancel.is_cancelled() { Err(FlowError::Cancelled) } else { Ok(()) }
}
