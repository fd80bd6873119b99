//! New-memorial form.

use super::FlowError;
use crate::api::types::{CreateProject, MemorialKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMemorial {
    pub kind: MemorialKind,
    pub title: String,
    pub description: Option<String>,
    pub timeframe_start: Option<String>,
    pub timeframe_end: Option<String>,
}

impl NewMemorial {
    #[must_use]
    pub fn new(kind: MemorialKind, title: impl Into<String>) -> Self {
        Self { kind, title: title.into(), description: None, timeframe_start: None, timeframe_end: None }
    }

    /// Check the form and build the create request. Blank optional fields
    /// are dropped.
    ///
    /// # Errors
    ///
    /// [`FlowError::Validation`] for a blank title.
    pub fn validate(&self) -> Result<CreateProject, FlowError> {
        let title = self.title.trim();
        if title.is_empty() {
            let example = self.kind.example_title();
            return Err(FlowError::validation(format!("title is required, e.g. \"{example}\"")));
        }
        Ok(CreateProject {
            title: title.to_owned(),
            description: non_blank(self.description.as_deref()),
            memorial_type: Some(self.kind),
            timeframe_start: non_blank(self.timeframe_start.as_deref()),
            timeframe_end: non_blank(self.timeframe_end.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

#[cfg(test)]
#[path = "memorial_test.rs"]
mod tests;
