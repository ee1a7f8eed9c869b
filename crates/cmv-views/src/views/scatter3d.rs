//! 3-D scatter plot. Either three manually chosen axis columns, or a PCA
//! projection computed by the backend from the feature columns.

use cmv_core::{ColorTagId, MainData};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldErrors, ValidationError};
use crate::form::{Condition, FieldKind, FormField};
use crate::settings::{Extent, Mappings, PlotOptions, non_blank};
use crate::transform::{RequestData, all_columns, numeric_column, ordered_rows, require_column};
use crate::view_type::ViewType;

use super::scatter::{Channels, fill_marker};
use super::{EXTENT_FIELDS, first_column};

const DEFAULT_EXTENT: Extent = Extent::new(500.0, 500.0);

/// Axis titles of a PCA projection.
pub const PCA_AXIS_TITLES: [&str; 3] = ["PC 1", "PC 2", "PC 3"];

const MANUAL: &[&str] = &["Manual"];
const PCA: &[&str] = &["PCA"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scatter3DMethod {
    #[default]
    Manual,
    #[serde(rename = "PCA")]
    Pca,
}

impl Scatter3DMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Pca => "PCA",
        }
    }
}

pub(crate) static FORM: [FormField; 14] = [
    FormField::new("filter", "Filter", FieldKind::ColorTags),
    FormField::new("method", "Method", FieldKind::Choice(&["Manual", "PCA"])),
    FormField::new("featureColumns", "Feature columns", FieldKind::Columns)
        .required(Condition::MethodIn(PCA))
        .visible(Condition::MethodIn(PCA)),
    FormField::new("targetColumn", "Target column", FieldKind::Column)
        .required(Condition::MethodIn(PCA))
        .visible(Condition::MethodIn(PCA)),
    FormField::new("options.axisTitles.0", "X-axis", FieldKind::Column)
        .required(Condition::MethodIn(MANUAL))
        .visible(Condition::MethodIn(MANUAL)),
    FormField::new("options.axisTitles.1", "Y-axis", FieldKind::Column)
        .required(Condition::MethodIn(MANUAL))
        .visible(Condition::MethodIn(MANUAL)),
    FormField::new("options.axisTitles.2", "Z-axis", FieldKind::Column)
        .required(Condition::MethodIn(MANUAL))
        .visible(Condition::MethodIn(MANUAL)),
    FormField::new("colorAssignmentEnabled", "Color assignment", FieldKind::Toggle),
    FormField::new("mappings.color", "Color column", FieldKind::Column)
        .visible(Condition::Enabled("colorAssignmentEnabled")),
    FormField::new("sizeAssignmentEnabled", "Size assignment", FieldKind::Toggle),
    FormField::new("mappings.size", "Size column", FieldKind::Column)
        .visible(Condition::Enabled("sizeAssignmentEnabled")),
    FormField::new("options.marker.size", "Marker size", FieldKind::Number),
    EXTENT_FIELDS[0],
    EXTENT_FIELDS[1],
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scatter3DSettings {
    #[serde(default)]
    pub method: Scatter3DMethod,
    #[serde(default)]
    pub filter: Vec<ColorTagId>,
    #[serde(default)]
    pub feature_columns: Vec<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub target_column: Option<String>,
    #[serde(default)]
    pub color_assignment_enabled: bool,
    #[serde(default)]
    pub size_assignment_enabled: bool,
    #[serde(default)]
    pub mappings: Mappings,
    #[serde(default)]
    pub options: PlotOptions,
}

impl Scatter3DSettings {
    pub(crate) fn ensure_defaults(&mut self) {
        self.options.extent.fill_from(DEFAULT_EXTENT);
        fill_marker(&mut self.options);
    }

    pub(crate) fn anchor_column(&self) -> Option<&str> {
        self.target_column
            .as_deref()
            .or_else(|| self.options.axis_title(0))
    }

    pub(crate) fn transform(&mut self, main: &MainData) -> Result<RequestData, ValidationError> {
        let mut errors = FieldErrors::new(ViewType::Scatter3D);
        match self.method {
            Scatter3DMethod::Pca => {
                errors.require("featureColumns", first_column(&self.feature_columns).is_some());
                for column in &self.feature_columns {
                    if !main.schema.has_field(column) {
                        errors.push(FieldError::invalid(
                            "featureColumns",
                            format!("Unknown column '{column}'"),
                        ));
                    }
                }
                require_column(&mut errors, main, "targetColumn", self.target_column.as_deref());
            }
            Scatter3DMethod::Manual => {
                for i in 0..3 {
                    let field = format!("options.axisTitles.{i}");
                    require_column(&mut errors, main, &field, self.options.axis_title(i));
                }
            }
        }
        let channels = Channels::resolve(
            &mut errors,
            main,
            self.color_assignment_enabled,
            self.size_assignment_enabled,
            &self.mappings,
        );
        errors.finish()?;

        let rows = ordered_rows(main, channels.color);
        let mut data = match self.method {
            // The backend projects; it needs every column, not three.
            Scatter3DMethod::Pca => all_columns(main, &rows),
            Scatter3DMethod::Manual => {
                let mut data = RequestData::new();
                for (axis, key) in ["x", "y", "z"].into_iter().enumerate() {
                    if let Some(column) = self.options.axis_title(axis) {
                        data.insert(key, numeric_column(&rows, column));
                    }
                }
                data
            }
        };
        let many_sizes = channels.apply(&rows, &mut data);

        if self.method == Scatter3DMethod::Pca {
            self.options.axis_titles = PCA_AXIS_TITLES.iter().map(|t| t.to_string()).collect();
        }
        self.options.marker.many_sizes = many_sizes;
        Ok(data)
    }
}
