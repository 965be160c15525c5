//! Midpoint interpolation between staggered positions
//!
//! Moving between centers and faces along one axis is a two-point average.
//! Going to a longer dimension pads both ends by repeating the edge value
//! first, so edge points copy their nearest neighbour.

use crate::errors::{GridCalcError, Result};
use ndarray::{concatenate, ArrayD, Axis, Slice};

/// Average neighbouring points along `axis`: length n becomes n - 1.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the axis has fewer than two points.
pub fn midpoints(values: &ArrayD<f64>, axis: usize) -> Result<ArrayD<f64>> {
    let n = axis_len(values, axis)?;
    if n < 2 {
        return Err(GridCalcError::ShapeMismatch {
            message: format!("need at least 2 points along axis {axis} to interpolate, got {n}"),
        });
    }

    let lower = values.slice_axis(Axis(axis), Slice::from(..n - 1));
    let upper = values.slice_axis(Axis(axis), Slice::from(1..));
    Ok((&lower + &upper) * 0.5)
}

/// Average neighbouring points after extending both edges: length n becomes n + 1.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the axis is empty.
pub fn extended_midpoints(values: &ArrayD<f64>, axis: usize) -> Result<ArrayD<f64>> {
    let n = axis_len(values, axis)?;
    if n == 0 {
        return Err(GridCalcError::ShapeMismatch {
            message: format!("cannot interpolate along empty axis {axis}"),
        });
    }

    let first = values.slice_axis(Axis(axis), Slice::from(..1));
    let last = values.slice_axis(Axis(axis), Slice::from(n - 1..));
    let padded = concatenate(Axis(axis), &[first, values.view(), last])?;
    midpoints(&padded, axis)
}

fn axis_len(values: &ArrayD<f64>, axis: usize) -> Result<usize> {
    if axis >= values.ndim() {
        return Err(GridCalcError::ShapeMismatch {
            message: format!(
                "axis {axis} is out of bounds for array with {} dimensions",
                values.ndim()
            ),
        });
    }
    Ok(values.len_of(Axis(axis)))
}
