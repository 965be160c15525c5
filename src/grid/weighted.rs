//! Parallel weighted reductions
//!
//! Values and weights arrive already broadcast to the same shape. Points whose
//! value or weight is not finite are skipped, and their weight is left out of
//! the normalization too.

use crate::errors::{GridCalcError, Result};
use ndarray::{ArrayD, Axis, Zip};

/// Supported weighted reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightedOperation {
    /// Σ(v·w) / Σ(w)
    Mean,
    /// Σ(v·w)
    Sum,
}

/// Weighted reduction of `values` over the array axes in `axes`.
///
/// A mean with no valid points yields NaN; a sum with no valid points yields 0.
///
/// # Errors
///
/// Returns an error if the shapes differ or an axis is out of bounds.
pub fn weighted_reduce(
    values: &ArrayD<f64>,
    weights: &ArrayD<f64>,
    axes: &[usize],
    operation: WeightedOperation,
) -> Result<ArrayD<f64>> {
    if values.shape() != weights.shape() {
        return Err(GridCalcError::ShapeMismatch {
            message: format!(
                "values {:?} and weights {:?} differ in shape",
                values.shape(),
                weights.shape()
            ),
        });
    }
    if let Some(&bad) = axes.iter().find(|&&a| a >= values.ndim()) {
        return Err(GridCalcError::ShapeMismatch {
            message: format!(
                "axis {bad} is out of bounds for array with {} dimensions",
                values.ndim()
            ),
        });
    }

    let mut numerator = ArrayD::<f64>::zeros(values.raw_dim());
    let mut denominator = ArrayD::<f64>::zeros(values.raw_dim());
    Zip::from(&mut numerator)
        .and(&mut denominator)
        .and(values)
        .and(weights)
        .par_for_each(|n, d, &v, &w| {
            if v.is_finite() && w.is_finite() {
                *n = v * w;
                *d = w;
            }
        });

    let mut sorted = axes.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();
    for axis in sorted {
        numerator = numerator.sum_axis(Axis(axis));
        if operation == WeightedOperation::Mean {
            denominator = denominator.sum_axis(Axis(axis));
        }
    }

    match operation {
        WeightedOperation::Sum => Ok(numerator),
        WeightedOperation::Mean => Ok(Zip::from(&numerator)
            .and(&denominator)
            .par_map_collect(|&n, &d| if d != 0.0 { n / d } else { f64::NAN })),
    }
}
