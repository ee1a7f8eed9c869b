//! Per-view-type behavior, one module per type.
//!
//! Each module owns its settings record, its form declaration, its
//! transform and its anchor column. The functions below are the dispatch
//! table over [`ViewType`].

pub mod onehot;
pub mod periodic_table;
pub mod regression;
pub mod scatter;
pub mod scatter3d;
pub mod xenonpy;

use cmv_core::MainData;

use crate::error::ValidationError;
use crate::form::{Condition, FieldKind, FormField, SettingsForm};
use crate::settings::Settings;
use crate::transform::RequestData;
use crate::view_type::ViewType;

pub(crate) const EXTENT_FIELDS: [FormField; 2] = [
    FormField::new("options.extent.width", "Width", FieldKind::Number),
    FormField::new("options.extent.height", "Height", FieldKind::Number),
];

pub(crate) const FEATURE_COLUMNS: FormField =
    FormField::new("featureColumns", "Feature columns", FieldKind::Columns)
        .required(Condition::Always);

pub(crate) fn form(view_type: ViewType) -> SettingsForm {
    let (fields, default_method) = match view_type {
        ViewType::Scatter => (&scatter::FORM[..], None),
        ViewType::Scatter3D => (
            &scatter3d::FORM[..],
            Some(scatter3d::Scatter3DMethod::Manual.as_str()),
        ),
        ViewType::PeriodicTable => (&periodic_table::FORM[..], None),
        ViewType::Regression => (
            &regression::FORM[..],
            Some(regression::RegressionMethod::Linear.as_str()),
        ),
        ViewType::OneHot => (&onehot::FORM[..], None),
        ViewType::Xenonpy => (&xenonpy::FORM[..], Some(xenonpy::XenonpyMethod::Average.as_str())),
    };
    SettingsForm {
        view_type,
        fields,
        default_method,
    }
}

pub(crate) fn transform(
    settings: &mut Settings,
    main: &MainData,
) -> Result<RequestData, ValidationError> {
    match settings {
        Settings::Scatter(s) => s.transform(main),
        Settings::Scatter3D(s) => s.transform(main),
        Settings::PeriodicTable(s) => Ok(s.transform()),
        Settings::Regression(s) => s.transform(main),
        Settings::OneHot(s) => s.transform(main),
        Settings::Xenonpy(s) => s.transform(main),
    }
}

/// Whether views of this type depend on any dataset column at all.
pub(crate) fn has_anchor(view_type: ViewType) -> bool {
    !matches!(view_type, ViewType::PeriodicTable)
}

pub(crate) fn anchor_column(settings: &Settings) -> Option<&str> {
    match settings {
        Settings::Scatter(s) => s.anchor_column(),
        Settings::Scatter3D(s) => s.anchor_column(),
        Settings::PeriodicTable(_) => None,
        Settings::Regression(s) => s.anchor_column(),
        Settings::OneHot(s) => s.anchor_column(),
        Settings::Xenonpy(s) => s.anchor_column(),
    }
}

/// First non-blank entry of a column list.
pub(crate) fn first_column(columns: &[String]) -> Option<&str> {
    columns
        .first()
        .map(String::as_str)
        .filter(|c| !c.trim().is_empty())
}
