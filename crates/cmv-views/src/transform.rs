//! Settings transformation pipeline: validated settings plus the live
//! dataset become a [`RenderRequest`] for the compute backend.
//!
//! The per-type transforms live next to their settings in [`crate::views`];
//! this module holds the request types and the channel helpers they share.

use std::borrow::Cow;

use cmv_core::{ColorTag, Dataset, MainData, Real, Row, ViewId, column_of, lenient_f64, value_cmp};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{FieldError, FieldErrors, ValidationError};
use crate::settings::Settings;
use crate::view_type::ViewType;
use crate::views;

/// Column-major payload of a request, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestData {
    columns: Vec<(String, Vec<Value>)>,
}

impl RequestData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Value>) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// A column read as numbers (lenient).
    pub fn numbers(&self, name: &str) -> Option<Vec<Real>> {
        self.get(name)
            .map(|values| values.iter().map(|v| lenient_f64(Some(v))).collect())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Rebuild row records from the columns (shortest column wins).
    pub fn rows(&self) -> Vec<Row> {
        let n = self.columns.iter().map(|(_, v)| v.len()).min().unwrap_or(0);
        (0..n)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|(name, values)| (name.clone(), values[i].clone()))
                    .collect()
            })
            .collect()
    }
}

impl Serialize for RequestData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, values) in &self.columns {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Normalized payload for the compute backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub view_id: ViewId,
    pub view_type: ViewType,
    pub settings: Settings,
    pub data: RequestData,
}

/// Turn settings into a render request, or report what is missing.
///
/// Pure: neither the settings nor the dataset are touched. Stale color-tag
/// ids are dropped from the normalized settings without error.
pub fn transform(
    view_id: ViewId,
    settings: &Settings,
    dataset: &Dataset,
    color_tags: &[ColorTag],
) -> Result<RenderRequest, ValidationError> {
    let mut normalized = settings.clone();
    normalized.ensure_defaults();
    normalized.prune_color_tags(color_tags);

    let data = views::transform(&mut normalized, &dataset.main)?;
    Ok(RenderRequest {
        view_id,
        view_type: normalized.view_type(),
        settings: normalized,
        data,
    })
}

/// Rows in extraction order: sorted ascending by `color_column` when set,
/// so categorical color groups end up contiguous. The sort is stable.
pub(crate) fn ordered_rows<'a>(main: &'a MainData, color_column: Option<&str>) -> Cow<'a, [Row]> {
    match color_column {
        Some(column) => {
            let mut rows = main.data.clone();
            rows.sort_by(|a, b| value_cmp(a.get(column), b.get(column)));
            Cow::Owned(rows)
        }
        None => Cow::Borrowed(&main.data),
    }
}

/// A column as a flat numeric array; missing or unparsable cells are zero.
pub(crate) fn numeric_column(rows: &[Row], name: &str) -> Vec<Value> {
    rows.iter()
        .map(|row| Value::from(lenient_f64(row.get(name))))
        .collect()
}

/// Every schema column of `rows`, in schema order.
pub(crate) fn all_columns(main: &MainData, rows: &[Row]) -> RequestData {
    let mut data = RequestData::new();
    for name in main.schema.field_names() {
        data.insert(name, column_of(rows, name));
    }
    data
}

/// The named columns of `rows`, raw values, in the given order.
pub(crate) fn selected_columns<'n>(
    rows: &[Row],
    names: impl IntoIterator<Item = &'n str>,
) -> RequestData {
    let mut data = RequestData::new();
    for name in names {
        data.insert(name, column_of(rows, name));
    }
    data
}

/// Marker sizes: each value divided by `max / 10`, rounded, then doubled.
///
/// Non-positive or non-finite results clamp to zero.
pub(crate) fn marker_sizes(values: &[Real]) -> Vec<u32> {
    let max = values.iter().copied().fold(Real::NEG_INFINITY, Real::max);
    let ratio = max / 10.0;
    if !ratio.is_finite() || ratio <= 0.0 {
        return vec![0; values.len()];
    }
    values
        .iter()
        .map(|v| {
            // Half rounds up, matching the marker scale the charts expect.
            let size = (v / ratio + 0.5).floor() * 2.0;
            if size.is_finite() && size > 0.0 {
                size as u32
            } else {
                0
            }
        })
        .collect()
}

/// Record a required column reference: absent, or naming no schema column.
pub(crate) fn require_column(
    errors: &mut FieldErrors,
    main: &MainData,
    field: &str,
    column: Option<&str>,
) {
    match column {
        None => errors.push(FieldError::required(field)),
        Some(name) if !main.schema.has_field(name) => {
            errors.push(FieldError::invalid(field, format!("Unknown column '{name}'")));
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmv_core::Schema;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn marker_sizes_follow_the_scale_rule() {
        // 20 / 10 = 2: 5 -> round(2.5) * 2, 10 -> 5 * 2, 20 -> 10 * 2
        assert_eq!(marker_sizes(&[5.0, 10.0, 20.0]), vec![6, 10, 20]);
        assert_eq!(marker_sizes(&[1.0, 2.0, 4.0]), vec![6, 10, 20]);
        assert_eq!(marker_sizes(&[0.0, 0.0]), vec![0, 0]);
        assert_eq!(marker_sizes(&[]), Vec::<u32>::new());
        assert_eq!(marker_sizes(&[-3.0, 10.0]), vec![0, 20]);
    }

    #[test]
    fn ordered_rows_sort_stably_by_color() {
        let rows: Vec<Row> = [
            json!({"g": 2, "i": 0}),
            json!({"g": 1, "i": 1}),
            json!({"g": 2, "i": 2}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        let main = MainData::new(rows, Schema::from_names(["g", "i"]));
        let sorted = ordered_rows(&main, Some("g"));
        let order: Vec<_> = sorted.iter().map(|r| r["i"].clone()).collect();
        assert_eq!(order, vec![json!(1), json!(0), json!(2)]);
        assert!(matches!(ordered_rows(&main, None), Cow::Borrowed(_)));
    }

    #[test]
    fn request_data_keeps_insertion_order_on_the_wire() {
        let mut data = RequestData::new();
        data.insert("z", vec![json!(1)]);
        data.insert("a", vec![json!(2)]);
        data.insert("z", vec![json!(3)]);
        assert_eq!(data.names().collect::<Vec<_>>(), vec!["z", "a"]);
        let text = serde_json::to_string(&data).unwrap();
        assert_eq!(text, r#"{"z":[3],"a":[2]}"#);
        assert_eq!(data.rows().len(), 1);
    }

    proptest! {
        #[test]
        fn marker_sizes_scale_against_the_maximum(
            values in prop::collection::vec(-100.0f64..1000.0, 0..30)
        ) {
            let sizes = marker_sizes(&values);
            prop_assert_eq!(sizes.len(), values.len());

            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let ratio = max / 10.0;
            for (value, size) in values.iter().zip(&sizes) {
                let expected = if ratio > 0.0 {
                    ((value / ratio + 0.5).floor() * 2.0).max(0.0) as u32
                } else {
                    0
                };
                prop_assert_eq!(*size, expected);
                prop_assert!(*size <= 22);
            }
            if ratio > 0.0 {
                prop_assert_eq!(sizes.iter().copied().max(), Some(20));
            }
        }
    }
}
