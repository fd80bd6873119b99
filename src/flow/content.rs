//! Content step: choose which items feed the narrative, then generate it.

use std::sync::Arc;

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use super::guard::SingleFlight;
use super::selection::ContentSelection;
use super::{FlowError, ensure_live};
use crate::api::Backend;
use crate::api::types::{ContentItem, Narrative, Project};

pub struct ContentFlow<B: ?Sized> {
    backend: Arc<B>,
    project_id: Uuid,
    project: Option<Project>,
    items: Vec<ContentItem>,
    selection: ContentSelection,
    generating: SingleFlight,
}

impl<B: Backend + ?Sized> ContentFlow<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, project_id: Uuid) -> Self {
        Self {
            backend,
            project_id,
            project: None,
            items: Vec::new(),
            selection: ContentSelection::default(),
            generating: SingleFlight::new(),
        }
    }

    /// Fetch the project and its content together; everything starts selected.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure, or [`FlowError::Cancelled`].
    pub async fn load(&mut self, cancel: &CancellationToken) -> Result<(), FlowError> {
        let (backend, project_id) = (&self.backend, self.project_id);
        let (project, items) = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FlowError::Cancelled),
            result = async {
                tokio::try_join!(backend.get_project(project_id), backend.list_content(project_id))
            } => result?,
        };
        ensure_live(cancel)?;

        info!(project_id = %self.project_id, items = items.len(), "content loaded");
        self.selection = ContentSelection::from_items(&items);
        self.items = items;
        self.project = Some(project);
        Ok(())
    }

    #[must_use]
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    #[must_use]
    pub fn selection(&self) -> &ContentSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut ContentSelection {
        &mut self.selection
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generating.is_busy()
    }

    /// Persist every item's inclusion flag, then request one narrative.
    ///
    /// # Errors
    ///
    /// [`FlowError::Validation`] for an empty selection (no calls are made),
    /// [`FlowError::InFlight`] while a previous submit is still running,
    /// [`FlowError::Cancelled`] and backend failures otherwise.
    pub async fn submit(&self, cancel: &CancellationToken) -> Result<Narrative, FlowError> {
        if self.selection.is_empty() {
            return Err(FlowError::validation("select at least one item"));
        }
        let _permit = self.generating.try_acquire().ok_or(FlowError::InFlight)?;
        ensure_live(cancel)?;

        let updates = self.selection.inclusion_updates(&self.items);
        let patches = updates
            .iter()
            .map(|&(item_id, included)| self.backend.set_content_included(self.project_id, item_id, included));
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FlowError::Cancelled),
            result = try_join_all(patches) => { result?; }
        }
        ensure_live(cancel)?;

        let narrative = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FlowError::Cancelled),
            result = self.backend.regenerate_narrative(self.project_id) => result?,
        };
        info!(
            project_id = %self.project_id,
            included = self.selection.len(),
            excluded = updates.len().saturating_sub(self.selection.len()),
            version = narrative.version,
            "narrative generated"
        );
        Ok(narrative)
    }
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
