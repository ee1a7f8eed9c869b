//! Composition strings for the descriptor view.
//!
//! Each row becomes a formula like `PtAu` or `Pt0.5Au2`, appended to the
//! row as a `composition` column.

use cmv_core::{ComputedData, Real, Row, display};
use cmv_views::RequestData;
use cmv_views::views::xenonpy::{NO_METAL, XenonpyMethod, XenonpySettings};
use serde_json::Value;

use crate::error::{ComputeError, ComputeResult};

pub const COMPOSITION_COLUMN: &str = "composition";

pub fn compositions(data: &RequestData, settings: &XenonpySettings) -> ComputeResult<ComputedData> {
    let rows = data.rows();
    let formulas: Vec<String> = match settings.method {
        XenonpyMethod::Average => rows
            .iter()
            .map(|row| symbols(row, &settings.feature_columns).concat())
            .collect(),
        XenonpyMethod::WeightedAverage => {
            let coefficients: Vec<Real> = settings
                .coefficients()
                .into_iter()
                .filter(|c| *c != 0.0)
                .collect();
            if coefficients.len() != settings.feature_columns.len() {
                return Err(ComputeError::CoefficientMismatch {
                    features: settings.feature_columns.len(),
                    coefficients: coefficients.len(),
                });
            }
            let weights: Vec<String> = coefficients.iter().map(|c| format_weight(*c)).collect();
            rows.iter()
                .map(|row| interleave(&symbols(row, &settings.feature_columns), &weights))
                .collect()
        }
        XenonpyMethod::WeightedFromColumn => {
            let metals: Vec<String> = settings
                .metals()
                .into_iter()
                .filter(|m| *m != NO_METAL)
                .map(str::to_string)
                .collect();
            rows.iter()
                .map(|row| {
                    let weights: Vec<String> = settings
                        .feature_columns
                        .iter()
                        .filter_map(|name| row.get(name))
                        .map(display)
                        .collect();
                    interleave(&metals, &weights)
                })
                .collect()
        }
    };
    tracing::debug!(rows = formulas.len(), method = settings.method.as_str(), "built compositions");

    let mut columns: Vec<Value> = data.names().map(Value::from).collect();
    columns.push(Value::from(COMPOSITION_COLUMN));
    let records = rows
        .into_iter()
        .zip(formulas)
        .map(|(mut row, formula)| {
            row.insert(COMPOSITION_COLUMN.to_string(), Value::String(formula));
            Value::Object(row)
        })
        .collect();

    let mut out = ComputedData::new();
    out.insert("columns", Value::Array(columns));
    out.insert("data", Value::Array(records));
    Ok(out)
}

/// Element symbols of a row, skipping empty slots.
fn symbols(row: &Row, features: &[String]) -> Vec<String> {
    features
        .iter()
        .filter_map(|name| row.get(name))
        .map(display)
        .filter(|s| !s.eq_ignore_ascii_case(NO_METAL) && !s.is_empty())
        .collect()
}

/// `["Pt", "Au"]` and `["1", "2"]` become `Pt1Au2`; extras on either side are dropped.
fn interleave(symbols: &[String], weights: &[String]) -> String {
    symbols
        .iter()
        .zip(weights)
        .map(|(s, w)| format!("{s}{w}"))
        .collect()
}

fn format_weight(value: Real) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> RequestData {
        let mut data = RequestData::new();
        data.insert("m1", vec![json!("Pt"), json!("Au")]);
        data.insert("m2", vec![json!("Au"), json!("None")]);
        data
    }

    fn settings(method: XenonpyMethod) -> XenonpySettings {
        XenonpySettings {
            method,
            feature_columns: vec!["m1".into(), "m2".into()],
            ..XenonpySettings::default()
        }
    }

    fn formulas(out: &ComputedData) -> Vec<String> {
        out.get("data")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .filter_map(|r| r[COMPOSITION_COLUMN].as_str())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn average_joins_symbols() {
        let out = compositions(&data(), &settings(XenonpyMethod::Average)).unwrap();
        assert_eq!(formulas(&out), ["PtAu", "Au"]);
        assert_eq!(out.get("columns"), Some(&json!(["m1", "m2", "composition"])));
    }

    #[test]
    fn weighted_average_interleaves_coefficients() {
        let mut s = settings(XenonpyMethod::WeightedAverage);
        s.coefficient1 = 0.5;
        s.coefficient2 = 2.0;
        let out = compositions(&data(), &s).unwrap();
        assert_eq!(formulas(&out), ["Pt0.5Au2", "Au0.5"]);
    }

    #[test]
    fn coefficient_count_must_match_features() {
        let mut s = settings(XenonpyMethod::WeightedAverage);
        s.coefficient1 = 1.0;
        let err = compositions(&data(), &s).unwrap_err();
        assert_eq!(err, ComputeError::CoefficientMismatch { features: 2, coefficients: 1 });
    }

    #[test]
    fn weights_from_columns() {
        let mut data = RequestData::new();
        data.insert("w1", vec![json!(0.25)]);
        data.insert("w2", vec![json!(3)]);
        let mut s = settings(XenonpyMethod::WeightedFromColumn);
        s.feature_columns = vec!["w1".into(), "w2".into()];
        s.metal1 = "Pt".into();
        s.metal2 = "Au".into();
        let out = compositions(&data, &s).unwrap();
        assert_eq!(formulas(&out), ["Pt0.25Au3"]);
    }
}
