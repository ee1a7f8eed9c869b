//! Ordinary least squares fit with k-fold cross-validation.

use cmv_core::{ComputedData, Real};
use cmv_views::RequestData;
use nalgebra::{DMatrix, DVector};
use serde_json::Value;

use crate::error::{ComputeError, ComputeResult};
use crate::{numeric, to_json_array};

const MIN_FOLDS: u32 = 2;
const SVD_EPS: Real = 1e-12;

/// Fit `target` from `features` and report out-of-fold predictions.
///
/// Rows are split into `folds` contiguous blocks; each block is predicted by
/// a model fitted on the others. The result holds `actual`, `predicted`,
/// the cross-validated `r2`, and `coefficients` (intercept first) of a fit
/// on every row.
pub fn cross_validate(
    data: &RequestData,
    features: &[String],
    target: &str,
    folds: u32,
) -> ComputeResult<ComputedData> {
    let y = numeric(data, target)?;
    let columns = features
        .iter()
        .map(|f| numeric(data, f))
        .collect::<ComputeResult<Vec<_>>>()?;
    let n = y.len();
    let k = folds.max(MIN_FOLDS) as usize;
    if n < k {
        return Err(ComputeError::InsufficientData {
            what: format!("{k}-fold cross-validation needs at least {k} rows, got {n}"),
        });
    }

    let design = DMatrix::<Real>::from_fn(n, columns.len() + 1, |i, j| {
        if j == 0 { 1.0 } else { columns[j - 1][i] }
    });
    let response = DVector::from_vec(y.clone());

    let mut predicted = vec![0.0; n];
    for fold in 0..k {
        let (start, end) = (fold * n / k, (fold + 1) * n / k);
        let train: Vec<usize> = (0..n).filter(|i| *i < start || *i >= end).collect();
        let beta = fit(&design.select_rows(&train), &response.select_rows(&train))?;
        for i in start..end {
            predicted[i] = design.row(i).transpose().dot(&beta);
        }
    }

    let beta = fit(&design, &response)?;
    let mean = y.iter().sum::<Real>() / n as Real;
    let ss_tot: Real = y.iter().map(|v| (v - mean).powi(2)).sum();
    let ss_res: Real = y.iter().zip(&predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let mut out = ComputedData::new();
    out.insert("actual", to_json_array(&y));
    out.insert("predicted", to_json_array(&predicted));
    out.insert("r2", Value::from(r2));
    out.insert("coefficients", to_json_array(beta.as_slice()));
    Ok(out)
}

fn fit(x: &DMatrix<Real>, y: &DVector<Real>) -> ComputeResult<DVector<Real>> {
    x.clone()
        .svd(true, true)
        .solve(y, SVD_EPS)
        .map_err(|e| ComputeError::Numeric {
            what: format!("least squares solve failed: {e}"),
        })
}
