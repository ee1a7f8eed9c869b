//! Dataset-to-view mapper: decides whether a view's computed slot still
//! applies to the loaded main table.

use cmv_core::{ComputedData, Dataset, ViewId, ViewSlot};

use crate::settings::Settings;
use crate::views;

/// What a view should render next.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedData {
    /// Nothing computed for this view yet.
    Empty,
    /// Computed data that matches the current dataset, unchanged.
    Data(ComputedData),
    /// The view's data no longer fits the dataset; clear the chart.
    Reset,
}

impl MappedData {
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }
}

/// The column a view's configuration primarily depends on: the target
/// column, else the first axis title, else the first feature column.
pub fn anchor_column(settings: &Settings) -> Option<&str> {
    views::anchor_column(settings)
}

/// Map the view's slot against the current schema.
///
/// A view type that reads no columns always passes its slot through. For
/// all others the anchor column must be in `dataset.main.schema`; a view
/// with no anchor configured has nothing to match and resets too.
pub fn map_data(view_id: ViewId, settings: &Settings, dataset: &Dataset) -> MappedData {
    let Some(slot) = dataset.slot(view_id) else {
        return MappedData::Empty;
    };
    let computed = match slot {
        ViewSlot::ResetRequest => return MappedData::Reset,
        ViewSlot::Computed(data) => data,
    };

    if !views::has_anchor(settings.view_type()) {
        return MappedData::Data(computed.clone());
    }
    match anchor_column(settings) {
        Some(column) if dataset.main.schema.has_field(column) => MappedData::Data(computed.clone()),
        _ => MappedData::Reset,
    }
}
