//! View factory and id allocation.

use std::collections::BTreeSet;

use cmv_core::ViewId;
use serde::Serialize;

use crate::catalog;
use crate::error::{ViewError, ViewResult};
use crate::settings::Settings;
use crate::view_type::ViewType;

/// Per-view UI state kept alongside the settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub selected_indices: BTreeSet<usize>,
}

/// One configured view in the workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewInstance {
    pub id: ViewId,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    pub settings: Settings,
    pub state: ViewState,
}

/// Create a view of the catalog type `type_tag` with default settings.
pub fn create_view(type_tag: &str, id: ViewId) -> ViewResult<ViewInstance> {
    let descriptor = catalog::find_by_tag(type_tag).ok_or_else(|| ViewError::UnknownType {
        type_tag: type_tag.to_string(),
    })?;
    let mut settings = Settings::defaults(descriptor.view_type);
    settings.ensure_defaults();
    Ok(ViewInstance {
        id,
        view_type: descriptor.view_type,
        settings,
        state: ViewState::default(),
    })
}

/// An id not used by any of `existing`.
///
/// `start_id` for an empty workspace, otherwise one past the highest id in
/// use (never below `start_id`). Once the highest id is `u32::MAX`, the
/// lowest free id at or above `start_id` is taken instead.
pub fn next_id(existing: &[ViewInstance], start_id: ViewId) -> ViewResult<ViewId> {
    next_free_id(existing.iter().map(|v| v.id), start_id)
}

/// [`next_id`] over bare ids.
pub fn next_free_id<I>(existing: I, start_id: ViewId) -> ViewResult<ViewId>
where
    I: IntoIterator<Item = ViewId>,
{
    let used: BTreeSet<ViewId> = existing.into_iter().collect();
    match used.last() {
        None => Ok(start_id),
        Some(&max) if max < start_id => Ok(start_id),
        Some(&max) if max.get() < u32::MAX => Ok(max.next()),
        Some(_) => (start_id.get()..=u32::MAX)
            .map(ViewId::new)
            .find(|id| !used.contains(id))
            .ok_or(ViewError::IdsExhausted { start_id }),
    }
}
