//! Regression view: fits the target column from the feature columns with
//! cross-validation on the backend, then plots predicted against actual.

use cmv_core::MainData;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldErrors, ValidationError};
use crate::form::{Condition, FieldKind, FormField};
use crate::settings::{BasicOptions, Extent, lenient_count, non_blank};
use crate::transform::{RequestData, ordered_rows, require_column, selected_columns};
use crate::view_type::ViewType;

use super::{EXTENT_FIELDS, FEATURE_COLUMNS, first_column};

const DEFAULT_EXTENT: Extent = Extent::new(400.0, 400.0);
pub const DEFAULT_FOLDS: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegressionMethod {
    #[default]
    Linear,
    Lasso,
    #[serde(rename = "SVR")]
    Svr,
    RandomForest,
}

impl RegressionMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Lasso => "Lasso",
            Self::Svr => "SVR",
            Self::RandomForest => "RandomForest",
        }
    }
}

pub(crate) static FORM: [FormField; 6] = [
    FormField::new(
        "method",
        "Method",
        FieldKind::Choice(&["Linear", "Lasso", "SVR", "RandomForest"]),
    ),
    FEATURE_COLUMNS,
    FormField::new("targetColumn", "Target column", FieldKind::Column).required(Condition::Always),
    FormField::new("folds", "Number of folds", FieldKind::Number),
    EXTENT_FIELDS[0],
    EXTENT_FIELDS[1],
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionSettings {
    #[serde(default)]
    pub method: RegressionMethod,
    #[serde(default)]
    pub feature_columns: Vec<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub target_column: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub folds: u32,
    #[serde(default)]
    pub options: BasicOptions,
}

impl RegressionSettings {
    pub(crate) fn ensure_defaults(&mut self) {
        self.options.extent.fill_from(DEFAULT_EXTENT);
        if self.folds == 0 {
            self.folds = DEFAULT_FOLDS;
        }
    }

    pub(crate) fn anchor_column(&self) -> Option<&str> {
        self.target_column
            .as_deref()
            .or_else(|| first_column(&self.feature_columns))
    }

    pub(crate) fn transform(&mut self, main: &MainData) -> Result<RequestData, ValidationError> {
        let mut errors = FieldErrors::new(ViewType::Regression);
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
        errors.finish()?;

        let rows = ordered_rows(main, None);
        let names = self
            .feature_columns
            .iter()
            .map(String::as_str)
            .chain(self.target_column.as_deref());
        Ok(selected_columns(&rows, names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmv_core::Schema;
    use serde_json::json;

    fn main() -> MainData {
        let rows = [json!({"a": 1, "b": 2, "y": 3, "other": 9})]
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        MainData::new(rows, Schema::from_names(["a", "b", "y", "other"]))
    }

    #[test]
    fn forwards_features_then_target_only() {
        let mut s = RegressionSettings {
            feature_columns: vec!["b".into(), "a".into()],
            target_column: Some("y".into()),
            ..RegressionSettings::default()
        };
        let data = s.transform(&main()).unwrap();
        assert_eq!(data.names().collect::<Vec<_>>(), vec!["b", "a", "y"]);
    }

    #[test]
    fn empty_feature_list_is_missing() {
        let mut s = RegressionSettings {
            target_column: Some("y".into()),
            ..RegressionSettings::default()
        };
        let err = s.transform(&main()).unwrap_err();
        assert_eq!(err.fields, vec![FieldError::required("featureColumns")]);
    }

    #[test]
    fn folds_default_when_unset() {
        let mut s = RegressionSettings::default();
        s.ensure_defaults();
        assert_eq!(s.folds, DEFAULT_FOLDS);
        s.folds = 3;
        s.ensure_defaults();
        assert_eq!(s.folds, 3);
    }
}
