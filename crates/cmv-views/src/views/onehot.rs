//! One-hot encoding view: the backend expands categorical feature columns
//! into indicator columns and the view shows the resulting table.

use cmv_core::MainData;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldErrors, ValidationError};
use crate::form::{FieldKind, FormField};
use crate::settings::{BasicOptions, Extent};
use crate::transform::{RequestData, all_columns, ordered_rows};
use crate::view_type::ViewType;

use super::{EXTENT_FIELDS, FEATURE_COLUMNS, first_column};

const DEFAULT_EXTENT: Extent = Extent::new(800.0, 400.0);

pub(crate) static FORM: [FormField; 4] = [
    FEATURE_COLUMNS,
    FormField::new("dropFirst", "Drop first category", FieldKind::Toggle),
    EXTENT_FIELDS[0],
    EXTENT_FIELDS[1],
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneHotSettings {
    #[serde(default)]
    pub feature_columns: Vec<String>,
    #[serde(default)]
    pub drop_first: bool,
    #[serde(default)]
    pub options: BasicOptions,
}

impl OneHotSettings {
    pub(crate) fn ensure_defaults(&mut self) {
        self.options.extent.fill_from(DEFAULT_EXTENT);
    }

    pub(crate) fn anchor_column(&self) -> Option<&str> {
        first_column(&self.feature_columns)
    }

    pub(crate) fn transform(&mut self, main: &MainData) -> Result<RequestData, ValidationError> {
        let mut errors = FieldErrors::new(ViewType::OneHot);
        errors.require("featureColumns", first_column(&self.feature_columns).is_some());
        for column in &self.feature_columns {
            if !main.schema.has_field(column) {
                errors.push(FieldError::invalid(
                    "featureColumns",
                    format!("Unknown column '{column}'"),
                ));
            }
        }
        errors.finish()?;

        // Unselected columns pass through the encoding unchanged.
        Ok(all_columns(main, &ordered_rows(main, None)))
    }
}
