//! 2-D scatter plot: two manually chosen axis columns plus optional color
//! and size channels.

use cmv_core::{ColorTagId, MainData, Row, lenient_f64};
use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, ValidationError};
use crate::form::{Condition, FieldKind, FormField};
use crate::settings::{Extent, Mappings, PlotOptions};
use crate::transform::{RequestData, marker_sizes, numeric_column, ordered_rows, require_column};
use crate::view_type::ViewType;

use super::EXTENT_FIELDS;

pub(crate) const DEFAULT_EXTENT: Extent = Extent::new(400.0, 400.0);
const DEFAULT_MARKER_SIZE: f64 = 6.0;

pub(crate) static FORM: [FormField; 10] = [
    FormField::new("filter", "Filter", FieldKind::ColorTags),
    FormField::new("options.axisTitles.0", "X-axis", FieldKind::Column).required(Condition::Always),
    FormField::new("options.axisTitles.1", "Y-axis", FieldKind::Column).required(Condition::Always),
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
pub struct ScatterSettings {
    #[serde(default)]
    pub filter: Vec<ColorTagId>,
    #[serde(default)]
    pub color_assignment_enabled: bool,
    #[serde(default)]
    pub size_assignment_enabled: bool,
    #[serde(default)]
    pub mappings: Mappings,
    #[serde(default)]
    pub options: PlotOptions,
}

impl ScatterSettings {
    pub(crate) fn ensure_defaults(&mut self) {
        self.options.extent.fill_from(DEFAULT_EXTENT);
        fill_marker(&mut self.options);
    }

    pub(crate) fn anchor_column(&self) -> Option<&str> {
        self.options.axis_title(0)
    }

    pub(crate) fn transform(&mut self, main: &MainData) -> Result<RequestData, ValidationError> {
        let mut errors = FieldErrors::new(ViewType::Scatter);
        for (i, field) in ["options.axisTitles.0", "options.axisTitles.1"].into_iter().enumerate() {
            require_column(&mut errors, main, field, self.options.axis_title(i));
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
        let mut data = RequestData::new();
        for (axis, key) in ["x", "y"].into_iter().enumerate() {
            if let Some(column) = self.options.axis_title(axis) {
                data.insert(key, numeric_column(&rows, column));
            }
        }
        self.options.marker.many_sizes = channels.apply(&rows, &mut data);
        Ok(data)
    }
}

pub(crate) fn fill_marker(options: &mut PlotOptions) {
    if options.marker.size <= 0.0 {
        options.marker.size = DEFAULT_MARKER_SIZE;
    }
}

/// Color and size channel bindings in effect for one transform.
pub(crate) struct Channels<'s> {
    pub(crate) color: Option<&'s str>,
    pub(crate) size: Option<&'s str>,
}

impl<'s> Channels<'s> {
    /// A channel is on when enabled and mapped; a mapped column must exist.
    pub(crate) fn resolve(
        errors: &mut FieldErrors,
        main: &MainData,
        color_enabled: bool,
        size_enabled: bool,
        mappings: &'s Mappings,
    ) -> Self {
        let color = color_enabled.then_some(mappings.color.as_deref()).flatten();
        let size = size_enabled.then_some(mappings.size.as_deref()).flatten();
        if color.is_some() {
            require_column(errors, main, "mappings.color", color);
        }
        if size.is_some() {
            require_column(errors, main, "mappings.size", size);
        }
        Self { color, size }
    }

    /// Emit `gr` for the color channel and return the derived marker sizes
    /// (empty without a size mapping).
    pub(crate) fn apply(&self, rows: &[Row], data: &mut RequestData) -> Vec<u32> {
        if let Some(color) = self.color {
            data.insert("gr", cmv_core::column_of(rows, color));
        }
        match self.size {
            Some(size) => {
                let values: Vec<f64> = rows.iter().map(|r| lenient_f64(r.get(size))).collect();
                marker_sizes(&values)
            }
            None => Vec::new(),
        }
    }
}
