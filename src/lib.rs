//! roms_gridcalc: grid-aware means and sums of ROMS ocean model output
//!
//! ROMS stores its fields on a staggered Arakawa C-grid with terrain-following
//! vertical levels, so cells differ in width and thickness. A plain mean over
//! `xi_u` or `s_rho` is therefore wrong; the cell sizes have to weight it.
//! This crate computes those weighted means and sums along the logical axes
//! `X`, `Y` and `Z` and attaches a metadata record describing the result.
//!
//! ## Module Organization
//!
//! - [`reducer`]: `gridmean`, `gridsum` and the `GridReducer` wrapper
//! - [`grid`]: the `Grid`/`Regrid` capabilities and the `RomsGrid` backend
//! - [`field`]: labeled multi-dimensional fields
//! - [`axes`]: logical axis specifiers
//! - [`metadata`]: metadata records and how they are derived
//! - [`netcdf_io`]: reading fields and grids, writing results
//! - [`parallel`]: parallel processing configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use roms_gridcalc::prelude::*;
//! use std::sync::Arc;
//!
//! let file = netcdf::open("ocean_his.nc").unwrap();
//! let grid = Arc::new(roms_gridcalc::read_grid(&file).unwrap());
//! let u = roms_gridcalc::read_field(&file, "u").unwrap();
//!
//! let axes: AxisSpec = "Y,X".parse().unwrap();
//! let mean = gridmean(&u, &grid, &axes, MetadataPolicy::Derive, None, None).unwrap();
//! println!("{:?}", mean.attrs().and_then(|a| a.long_name.as_deref()));
//! ```

pub mod axes;
pub mod errors;
pub mod field;
pub mod grid;
pub mod metadata;
pub mod netcdf_io;
pub mod parallel;
pub mod reducer;

// Direct re-exports for the public API
pub use axes::*;
pub use errors::*;
pub use field::*;
pub use metadata::*;
pub use netcdf_io::*;
pub use parallel::*;
pub use reducer::*;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::axes::{AxisSpec, GridAxis};
    pub use crate::errors::{GridCalcError, Result};
    pub use crate::field::Field;
    pub use crate::grid::{Grid, GridRef, HPosition, Regrid, RomsGrid, SPosition};
    pub use crate::metadata::{Metadata, MetadataPolicy};
    pub use crate::netcdf_io::GridResultWriter;
    pub use crate::parallel::ParallelConfig;
    pub use crate::reducer::{gridmean, gridsum, GridOperation, GridReducer, ReduceOptions};
}
