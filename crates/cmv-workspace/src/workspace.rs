//! The workspace store: dataset, color tags and every live view.

use cmv_core::{ColorTag, Dataset, MainData, ViewId};
use cmv_views::{ViewInstance, create_view, next_free_id};
use serde_json::Value;

use crate::backend::{BackendMessage, ComputeBackend};
use crate::config::WorkspaceConfig;
use crate::coordinator::{RequestTicket, ResultOutcome, UpdateCoordinator};
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::wrapper::{RenderPayload, ViewWrapper};

#[derive(Debug)]
pub struct Workspace {
    config: WorkspaceConfig,
    dataset: Dataset,
    color_tags: Vec<ColorTag>,
    views: Vec<ViewWrapper>,
    coordinator: UpdateCoordinator,
}

impl Workspace {
    pub fn new(config: WorkspaceConfig, main: MainData) -> Self {
        Self {
            config,
            dataset: Dataset::new(main),
            color_tags: Vec::new(),
            views: Vec::new(),
            coordinator: UpdateCoordinator::new(),
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn color_tags(&self) -> &[ColorTag] {
        &self.color_tags
    }

    pub fn coordinator(&self) -> &UpdateCoordinator {
        &self.coordinator
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewWrapper> {
        self.views.iter()
    }

    pub fn view(&self, id: ViewId) -> Option<&ViewWrapper> {
        self.views.iter().find(|v| v.id() == id)
    }

    fn view_mut(&mut self, id: ViewId) -> WorkspaceResult<&mut ViewWrapper> {
        self.views
            .iter_mut()
            .find(|v| v.id() == id)
            .ok_or(WorkspaceError::ViewNotFound(id))
    }

    /// Create a view of the catalog type `type_tag` and return its id.
    pub fn add_view(&mut self, type_tag: &str) -> WorkspaceResult<ViewId> {
        let id = next_free_id(self.views.iter().map(ViewWrapper::id), self.config.start_id)?;
        let view = create_view(type_tag, id)?;
        tracing::info!(view_id = %id, view_type = %view.view_type, "view added");
        self.views.push(ViewWrapper::new(view));
        Ok(id)
    }

    /// Remove a view together with its computed slot and pending request.
    pub fn remove_view(&mut self, id: ViewId) -> WorkspaceResult<ViewInstance> {
        let index = self
            .views
            .iter()
            .position(|v| v.id() == id)
            .ok_or(WorkspaceError::ViewNotFound(id))?;
        let wrapper = self.views.remove(index);
        self.dataset.clear_slot(id);
        self.coordinator.forget(id);
        tracing::info!(view_id = %id, "view removed");
        Ok(wrapper.view().clone())
    }

    /// Submit settings form values for a view and dispatch the request.
    ///
    /// All or nothing: incomplete settings or a backend that refuses the
    /// request leave the view's settings, data and pending request as they
    /// were, and the error is returned.
    pub fn submit_settings(
        &mut self,
        id: ViewId,
        values: &Value,
        backend: &mut dyn ComputeBackend,
    ) -> WorkspaceResult<RequestTicket> {
        let wrapper = self
            .views
            .iter_mut()
            .find(|v| v.id() == id)
            .ok_or(WorkspaceError::ViewNotFound(id))?;
        let request = match wrapper.prepare(values, &self.dataset, &self.color_tags) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(view_id = %id, error = %e, "settings not submitted");
                return Err(e.into());
            }
        };
        let settings = request.settings.clone();
        let ticket = self.coordinator.send_update(request, backend)?;
        wrapper.commit(settings);
        Ok(ticket)
    }

    /// Route a backend result through the coordinator.
    pub fn apply_message(&mut self, message: BackendMessage) -> ResultOutcome {
        let (ticket, result) = message.into_result();
        self.coordinator.on_result(ticket, result, &mut self.dataset)
    }

    /// Swap in a new main table. A table with an unusable schema is refused
    /// and the current one kept.
    pub fn replace_dataset(&mut self, main: MainData) -> WorkspaceResult<()> {
        main.validate()?;
        tracing::info!(
            rows = main.row_count(),
            columns = main.schema.fields.len(),
            "dataset replaced"
        );
        self.dataset.replace_main(main);
        Ok(())
    }

    pub fn set_color_tags(&mut self, tags: Vec<ColorTag>) {
        self.color_tags = tags;
    }

    pub fn render(&mut self, id: ViewId) -> WorkspaceResult<Option<RenderPayload>> {
        let wrapper = self
            .views
            .iter_mut()
            .find(|v| v.id() == id)
            .ok_or(WorkspaceError::ViewNotFound(id))?;
        Ok(wrapper.render(&self.dataset))
    }

    pub fn select(&mut self, id: ViewId, indices: Vec<usize>) -> WorkspaceResult<()> {
        self.view_mut(id)?.select(indices);
        Ok(())
    }

    pub fn clear_selection(&mut self, id: ViewId) -> WorkspaceResult<()> {
        self.view_mut(id)?.clear_selection();
        Ok(())
    }
}
