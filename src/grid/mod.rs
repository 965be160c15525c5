//! Grid capabilities and the ROMS C-grid backend
//!
//! The reducers only need two things from a grid: a weighted reduction
//! ([`Grid`]) and a way to place a result on a staggered position
//! ([`Regrid`]). [`RomsGrid`] provides both for ROMS output.
//!
//! # Organization
//!
//! - [`position`]: staggered positions and their dimension names
//! - [`interp`]: midpoint interpolation kernels between positions
//! - [`weighted`]: parallel weighted sum/mean kernels
//! - [`roms`]: the `RomsGrid` backend

pub mod interp;
pub mod position;
pub mod roms;
pub mod weighted;

pub use position::{axis_dim, AxisPosition, HPosition, SPosition};
pub use roms::RomsGrid;

use crate::axes::AxisSpec;
use crate::errors::Result;
use crate::field::Field;
use crate::metadata::Metadata;
use std::fmt;
use std::sync::Arc;

/// Weighted reductions over logical grid axes
pub trait Grid: fmt::Debug + Send + Sync {
    /// Cell-size weighted mean of `field` over `axes`
    ///
    /// # Errors
    ///
    /// Returns an error if an axis has no dimension on the field or the field
    /// does not fit the grid.
    fn average(&self, field: &Field, axes: &AxisSpec) -> Result<Field>;

    /// Cell-size weighted sum of `field` over `axes`
    ///
    /// # Errors
    ///
    /// Returns an error if an axis has no dimension on the field or the field
    /// does not fit the grid.
    fn integrate(&self, field: &Field, axes: &AxisSpec) -> Result<Field>;
}

/// Shared handle to a grid, as stored in metadata records
pub type GridRef = Arc<dyn Grid>;

/// Placement of a field onto a target staggered position
pub trait Regrid {
    /// Move `field` to the requested horizontal and vertical positions and
    /// attach `metadata`. `None` positions leave that direction untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if interpolation along an axis fails.
    fn to_grid(
        &self,
        field: Field,
        target_h_position: Option<HPosition>,
        target_s_position: Option<SPosition>,
        metadata: Option<Metadata>,
    ) -> Result<Field>;
}
