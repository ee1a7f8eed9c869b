//! cmv-compute: local reference implementation of the compute backend.
//!
//! Takes a [`RenderRequest`] and produces the render-ready data the charts
//! consume: PCA projections, one-hot encoded tables, cross-validated
//! regression fits and composition strings. Manual scatter requests are
//! echoed back unchanged.

pub mod composition;
pub mod error;
pub mod onehot;
pub mod pca;
pub mod regression;

use cmv_core::{ComputedData, Real, lenient_f64};
use cmv_views::{RenderRequest, RequestData, Settings};
use cmv_views::views::regression::RegressionMethod;
use cmv_views::views::scatter3d::Scatter3DMethod;
use serde_json::Value;

pub use error::{ComputeError, ComputeResult};

/// Compute the render data for one request.
pub fn compute(request: &RenderRequest) -> ComputeResult<ComputedData> {
    tracing::debug!(
        view_id = %request.view_id,
        view_type = %request.view_type,
        columns = request.data.len(),
        "computing view data"
    );
    match &request.settings {
        Settings::Scatter(_) => Ok(echo(&request.data)),
        Settings::Scatter3D(s) => match s.method {
            Scatter3DMethod::Manual => Ok(echo(&request.data)),
            Scatter3DMethod::Pca => pca::project(&request.data, &s.feature_columns),
        },
        Settings::PeriodicTable(_) => Ok(ComputedData::new()),
        Settings::Regression(s) => match s.method {
            RegressionMethod::Linear => regression::cross_validate(
                &request.data,
                &s.feature_columns,
                s.target_column.as_deref().unwrap_or_default(),
                s.folds,
            ),
            other => Err(ComputeError::UnsupportedMethod {
                view_type: request.view_type.tag(),
                method: other.as_str(),
            }),
        },
        Settings::OneHot(s) => Ok(onehot::encode(&request.data, &s.feature_columns, s.drop_first)),
        Settings::Xenonpy(s) => composition::compositions(&request.data, s),
    }
}

fn echo(data: &RequestData) -> ComputedData {
    let mut out = ComputedData::new();
    for name in data.names() {
        if let Some(values) = data.get(name) {
            out.insert(name, Value::Array(values.to_vec()));
        }
    }
    out
}

/// A request column as numbers.
pub(crate) fn numeric(data: &RequestData, name: &str) -> ComputeResult<Vec<Real>> {
    data.get(name)
        .map(|values| values.iter().map(|v| lenient_f64(Some(v))).collect())
        .ok_or_else(|| ComputeError::MissingColumn {
            name: name.to_string(),
        })
}

pub(crate) fn to_json_array(values: &[Real]) -> Value {
    Value::Array(values.iter().map(|v| Value::from(*v)).collect())
}
