//! One live view: its settings form, submissions and change-gated renders.

use std::collections::BTreeSet;

use cmv_core::{ColorTag, Dataset, ViewId};
use cmv_views::{
    MappedData, RenderRequest, Settings, SettingsForm, ValidationError, ViewInstance, ViewType,
    map_data, transform,
};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// What a chart needs to draw one view.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPayload {
    pub view_id: ViewId,
    pub view_type: ViewType,
    pub settings: Settings,
    pub data: MappedData,
    pub selected_indices: Vec<usize>,
}

/// Inputs of the last render; an unchanged key means nothing to redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChangeKey {
    settings: String,
    dataset_version: u64,
    slot_revision: u64,
    selection_revision: u64,
    reset: bool,
}

#[derive(Debug, Clone)]
pub struct ViewWrapper {
    view: ViewInstance,
    selection_revision: u64,
    last_rendered: Option<ChangeKey>,
}

impl ViewWrapper {
    pub fn new(view: ViewInstance) -> Self {
        Self {
            view,
            selection_revision: 0,
            last_rendered: None,
        }
    }

    pub fn id(&self) -> ViewId {
        self.view.id
    }

    pub fn view(&self) -> &ViewInstance {
        &self.view
    }

    pub fn settings(&self) -> &Settings {
        &self.view.settings
    }

    pub fn form(&self) -> SettingsForm {
        SettingsForm::for_type(self.view.view_type)
    }

    /// Form values to open the settings dialog with.
    pub fn initial_values(&self) -> Value {
        let mut settings = self.view.settings.clone();
        settings.ensure_defaults();
        settings.to_values()
    }

    /// Validate submitted form values and build the backend request.
    ///
    /// The view is not touched; [`ViewWrapper::commit`] adopts the request's
    /// settings once it has been dispatched.
    pub fn prepare(
        &self,
        values: &Value,
        dataset: &Dataset,
        color_tags: &[ColorTag],
    ) -> Result<RenderRequest, ValidationError> {
        let form = self.form();
        let values = form.coerce(values);
        form.validate(&values)?;
        let settings = Settings::from_values(self.view.view_type, values)?;
        transform(self.view.id, &settings, dataset, color_tags)
    }

    /// Replace the view's settings wholesale.
    pub fn commit(&mut self, settings: Settings) {
        self.view.settings = settings;
    }

    /// [`ViewWrapper::prepare`] followed by [`ViewWrapper::commit`].
    pub fn submit(
        &mut self,
        values: &Value,
        dataset: &Dataset,
        color_tags: &[ColorTag],
    ) -> Result<RenderRequest, ValidationError> {
        let request = self.prepare(values, dataset, color_tags)?;
        self.commit(request.settings.clone());
        Ok(request)
    }

    /// The payload to draw, or `None` when nothing changed since the last call.
    pub fn render(&mut self, dataset: &Dataset) -> Option<RenderPayload> {
        let data = map_data(self.view.id, &self.view.settings, dataset);
        let key = ChangeKey {
            settings: settings_hash(&self.view.settings),
            dataset_version: dataset.version().get(),
            slot_revision: dataset.slot_revision(self.view.id),
            selection_revision: self.selection_revision,
            reset: data.is_reset(),
        };
        if self.last_rendered.as_ref() == Some(&key) {
            return None;
        }
        self.last_rendered = Some(key);

        Some(RenderPayload {
            view_id: self.view.id,
            view_type: self.view.view_type,
            settings: self.view.settings.clone(),
            data,
            selected_indices: self.selected_indices(),
        })
    }

    pub fn select<I>(&mut self, indices: I)
    where
        I: IntoIterator<Item = usize>,
    {
        let selected: BTreeSet<usize> = indices.into_iter().collect();
        if selected != self.view.state.selected_indices {
            self.view.state.selected_indices = selected;
            self.selection_revision += 1;
        }
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.view.state.selected_indices.iter().copied().collect()
    }

    pub fn clear_selection(&mut self) {
        self.select(std::iter::empty());
    }
}

fn settings_hash(settings: &Settings) -> String {
    let mut hasher = Sha256::new();
    let json = serde_json::to_string(settings).unwrap_or_default();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}
