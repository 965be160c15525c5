//! Grid-aware means and sums with metadata
//!
//! [`gridmean`] and [`gridsum`] validate the axis specifier, work out the
//! metadata record for the result, hand the reduction to the grid and finally
//! place the result on the requested staggered position.
//!
//! The two calls below give the same result up to rounding:
//!
//! ```text
//! gridmean(&u, &grid, &AxisSpec::parse("Y,X")?, ..)
//! Σ(u·dy_u·dx_u) / Σ(dy_u·dx_u)   over (eta_rho, xi_u)
//! ```

use crate::axes::AxisSpec;
use crate::errors::Result;
use crate::field::Field;
use crate::grid::{Grid, GridRef, HPosition, Regrid, SPosition};
use crate::metadata::MetadataPolicy;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Supported grid reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridOperation {
    /// Cell-size weighted mean
    Mean,
    /// Cell-size weighted sum
    Sum,
}

impl GridOperation {
    /// Get the string representation of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
        }
    }
}

/// Optional arguments shared by both reductions
#[derive(Debug, Clone, Default)]
pub struct ReduceOptions {
    pub metadata: MetadataPolicy,
    pub target_h_position: Option<HPosition>,
    pub target_s_position: Option<SPosition>,
}

/// Weighted mean of `field` over `axes`, accounting for variable cell sizes.
///
/// # Errors
///
/// Errors raised by the grid's reduction or regridding are returned unchanged.
pub fn gridmean<G>(
    field: &Field,
    grid: &Arc<G>,
    axes: &AxisSpec,
    metadata: MetadataPolicy,
    target_h_position: Option<HPosition>,
    target_s_position: Option<SPosition>,
) -> Result<Field>
where
    G: Grid + Regrid + 'static,
{
    reduce(
        field,
        grid,
        axes,
        GridOperation::Mean,
        ReduceOptions {
            metadata,
            target_h_position,
            target_s_position,
        },
    )
}

/// Weighted sum of `field` over `axes`, accounting for variable cell sizes.
///
/// # Errors
///
/// Errors raised by the grid's integration or regridding are returned unchanged.
pub fn gridsum<G>(
    field: &Field,
    grid: &Arc<G>,
    axes: &AxisSpec,
    metadata: MetadataPolicy,
    target_h_position: Option<HPosition>,
    target_s_position: Option<SPosition>,
) -> Result<Field>
where
    G: Grid + Regrid + 'static,
{
    reduce(
        field,
        grid,
        axes,
        GridOperation::Sum,
        ReduceOptions {
            metadata,
            target_h_position,
            target_s_position,
        },
    )
}

/// [`gridmean`] with a dynamically typed axis specifier.
///
/// # Errors
///
/// Returns `InvalidArgument` unless `axes` is a string or an array of strings.
pub fn gridmean_value<G>(
    field: &Field,
    grid: &Arc<G>,
    axes: &JsonValue,
    options: ReduceOptions,
) -> Result<Field>
where
    G: Grid + Regrid + 'static,
{
    let axes = AxisSpec::from_value(axes)?;
    reduce(field, grid, &axes, GridOperation::Mean, options)
}

/// [`gridsum`] with a dynamically typed axis specifier.
///
/// # Errors
///
/// Returns `InvalidArgument` unless `axes` is a string or an array of strings.
pub fn gridsum_value<G>(
    field: &Field,
    grid: &Arc<G>,
    axes: &JsonValue,
    options: ReduceOptions,
) -> Result<Field>
where
    G: Grid + Regrid + 'static,
{
    let axes = AxisSpec::from_value(axes)?;
    reduce(field, grid, &axes, GridOperation::Sum, options)
}

fn reduce<G>(
    field: &Field,
    grid: &Arc<G>,
    axes: &AxisSpec,
    operation: GridOperation,
    options: ReduceOptions,
) -> Result<Field>
where
    G: Grid + Regrid + 'static,
{
    axes.validate()?;
    let handle: GridRef = grid.clone();
    let attrs = options.metadata.resolve(field, &handle, operation, axes);

    let reduced = match operation {
        GridOperation::Mean => grid.average(field, axes)?,
        GridOperation::Sum => grid.integrate(field, axes)?,
    };

    grid.to_grid(
        reduced,
        options.target_h_position,
        options.target_s_position,
        attrs,
    )
}

/// A grid bundled with the two reductions
#[derive(Debug)]
pub struct GridReducer<G> {
    grid: Arc<G>,
}

impl<G> Clone for GridReducer<G> {
    fn clone(&self) -> Self {
        Self {
            grid: Arc::clone(&self.grid),
        }
    }
}

impl<G> GridReducer<G>
where
    G: Grid + Regrid + 'static,
{
    pub fn new(grid: Arc<G>) -> Self {
        Self { grid }
    }

    #[must_use]
    pub fn grid(&self) -> &Arc<G> {
        &self.grid
    }

    /// See [`gridmean`].
    ///
    /// # Errors
    ///
    /// Errors from the grid are returned unchanged.
    pub fn mean(&self, field: &Field, axes: &AxisSpec, options: ReduceOptions) -> Result<Field> {
        reduce(field, &self.grid, axes, GridOperation::Mean, options)
    }

    /// See [`gridsum`].
    ///
    /// # Errors
    ///
    /// Errors from the grid are returned unchanged.
    pub fn sum(&self, field: &Field, axes: &AxisSpec, options: ReduceOptions) -> Result<Field> {
        reduce(field, &self.grid, axes, GridOperation::Sum, options)
    }
}
