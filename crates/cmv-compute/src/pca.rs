//! Principal component projection onto the first three components.

use cmv_core::{ComputedData, Real};
use cmv_views::RequestData;
use nalgebra::{DMatrix, SymmetricEigen};
use serde_json::Value;

use crate::error::{ComputeError, ComputeResult};
use crate::{numeric, to_json_array};

const COMPONENTS: usize = 3;

/// Project the rows onto the top principal components of `features`.
///
/// Returns `x`, `y`, `z` scores (zeros for components beyond the feature
/// count), the `explainedVariance` ratio of each, and `gr` when the
/// request carried a color channel.
pub fn project(data: &RequestData, features: &[String]) -> ComputeResult<ComputedData> {
    if features.is_empty() {
        return Err(ComputeError::InsufficientData {
            what: "PCA needs at least one feature column".to_string(),
        });
    }
    let columns = features
        .iter()
        .map(|f| numeric(data, f))
        .collect::<ComputeResult<Vec<_>>>()?;
    let n = columns[0].len();
    if n < 2 {
        return Err(ComputeError::InsufficientData {
            what: format!("PCA needs at least two rows, got {n}"),
        });
    }

    let p = columns.len();
    let mut x = DMatrix::<Real>::from_fn(n, p, |i, j| columns[j][i]);
    for j in 0..p {
        let mean = x.column(j).mean();
        x.column_mut(j).add_scalar_mut(-mean);
    }
    let covariance = (x.transpose() * &x) / (n as Real - 1.0);
    let eigen = SymmetricEigen::new(covariance);

    let mut order: Vec<usize> = (0..p).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(core::cmp::Ordering::Equal)
    });

    let total: Real = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();
    let mut out = ComputedData::new();
    let mut explained = Vec::with_capacity(COMPONENTS);
    for (k, key) in ["x", "y", "z"].into_iter().enumerate() {
        let Some(&idx) = order.get(k) else {
            out.insert(key, to_json_array(&vec![0.0; n]));
            explained.push(0.0);
            continue;
        };
        let mut axis = eigen.eigenvectors.column(idx).clone_owned();
        // Fix the sign so the largest loading is positive.
        let pivot = axis.iter().copied().fold(0.0, |acc: Real, v| {
            if v.abs() > acc.abs() {
                v
            } else {
                acc
            }
        });
        if pivot < 0.0 {
            axis.neg_mut();
        }
        let scores = &x * axis;
        out.insert(key, to_json_array(scores.as_slice()));
        explained.push(if total > 0.0 {
            eigen.eigenvalues[idx].max(0.0) / total
        } else {
            0.0
        });
    }
    out.insert("explainedVariance", to_json_array(&explained));
    if let Some(gr) = data.get("gr") {
        out.insert("gr", Value::Array(gr.to_vec()));
    }
    Ok(out)
}
