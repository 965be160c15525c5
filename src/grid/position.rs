//! Staggered grid positions of the ROMS Arakawa C-grid
//!
//! Horizontally, `rho` points sit at cell centers, `u` points on the xi faces,
//! `v` points on the eta faces and `psi` points on the corners. Vertically,
//! `s_rho` levels sit at layer centers and `s_w` levels on layer interfaces.

use crate::axes::GridAxis;
use crate::errors::{GridCalcError, Result};
use crate::field::Field;
use std::fmt;
use std::str::FromStr;

pub const XI_RHO: &str = "xi_rho";
pub const XI_U: &str = "xi_u";
pub const ETA_RHO: &str = "eta_rho";
pub const ETA_V: &str = "eta_v";
pub const S_RHO: &str = "s_rho";
pub const S_W: &str = "s_w";

/// Position of a field along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisPosition {
    /// Cell centers (`xi_rho`, `eta_rho`, `s_rho`)
    Center,
    /// Cell faces (`xi_u`, `eta_v`, `s_w`)
    Staggered,
}

/// Dimension name for an axis at a position
#[must_use]
pub const fn axis_dim(axis: GridAxis, position: AxisPosition) -> &'static str {
    match (axis, position) {
        (GridAxis::X, AxisPosition::Center) => XI_RHO,
        (GridAxis::X, AxisPosition::Staggered) => XI_U,
        (GridAxis::Y, AxisPosition::Center) => ETA_RHO,
        (GridAxis::Y, AxisPosition::Staggered) => ETA_V,
        (GridAxis::Z, AxisPosition::Center) => S_RHO,
        (GridAxis::Z, AxisPosition::Staggered) => S_W,
    }
}

/// Where a field sits along `axis`, or `None` if it has no dimension for it.
#[must_use]
pub fn field_position(field: &Field, axis: GridAxis) -> Option<AxisPosition> {
    [AxisPosition::Center, AxisPosition::Staggered]
        .into_iter()
        .find(|&pos| field.has_dim(axis_dim(axis, pos)))
}

/// Dimension of `field` belonging to `axis`.
///
/// # Errors
///
/// Returns `AxisNotFound` if the field has no dimension for the axis.
pub fn find_axis_dim(field: &Field, axis: GridAxis) -> Result<&'static str> {
    field_position(field, axis)
        .map(|pos| axis_dim(axis, pos))
        .ok_or_else(|| GridCalcError::AxisNotFound {
            axis: axis.to_string(),
            dims: field.dims().to_vec(),
        })
}

/// Horizontal staggered position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HPosition {
    Rho,
    U,
    V,
    Psi,
}

impl HPosition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rho => "rho",
            Self::U => "u",
            Self::V => "v",
            Self::Psi => "psi",
        }
    }

    #[must_use]
    pub const fn x(self) -> AxisPosition {
        match self {
            Self::Rho | Self::V => AxisPosition::Center,
            Self::U | Self::Psi => AxisPosition::Staggered,
        }
    }

    #[must_use]
    pub const fn y(self) -> AxisPosition {
        match self {
            Self::Rho | Self::U => AxisPosition::Center,
            Self::V | Self::Psi => AxisPosition::Staggered,
        }
    }

    /// Position made of an x and a y placement
    #[must_use]
    pub const fn from_axes(x: AxisPosition, y: AxisPosition) -> Self {
        match (x, y) {
            (AxisPosition::Center, AxisPosition::Center) => Self::Rho,
            (AxisPosition::Staggered, AxisPosition::Center) => Self::U,
            (AxisPosition::Center, AxisPosition::Staggered) => Self::V,
            (AxisPosition::Staggered, AxisPosition::Staggered) => Self::Psi,
        }
    }

    /// Dimension names in storage order (eta, xi)
    #[must_use]
    pub const fn dims(self) -> [&'static str; 2] {
        [axis_dim(GridAxis::Y, self.y()), axis_dim(GridAxis::X, self.x())]
    }

    /// Horizontal position of a field; axes it lacks count as centered.
    #[must_use]
    pub fn of(field: &Field) -> Self {
        Self::from_axes(
            field_position(field, GridAxis::X).unwrap_or(AxisPosition::Center),
            field_position(field, GridAxis::Y).unwrap_or(AxisPosition::Center),
        )
    }
}

impl fmt::Display for HPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HPosition {
    type Err = GridCalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rho" => Ok(Self::Rho),
            "u" => Ok(Self::U),
            "v" => Ok(Self::V),
            "psi" => Ok(Self::Psi),
            other => Err(GridCalcError::InvalidArgument(format!(
                "unknown horizontal position '{other}', expected one of rho, u, v, psi"
            ))),
        }
    }
}

/// Vertical staggered position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SPosition {
    Rho,
    W,
}

impl SPosition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rho => S_RHO,
            Self::W => S_W,
        }
    }

    #[must_use]
    pub const fn z(self) -> AxisPosition {
        match self {
            Self::Rho => AxisPosition::Center,
            Self::W => AxisPosition::Staggered,
        }
    }

    #[must_use]
    pub const fn from_axis(z: AxisPosition) -> Self {
        match z {
            AxisPosition::Center => Self::Rho,
            AxisPosition::Staggered => Self::W,
        }
    }

    /// Vertical position of a field; a field without a vertical dim counts as `s_rho`.
    #[must_use]
    pub fn of(field: &Field) -> Self {
        Self::from_axis(field_position(field, GridAxis::Z).unwrap_or(AxisPosition::Center))
    }
}

impl fmt::Display for SPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SPosition {
    type Err = GridCalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s_rho" | "rho" => Ok(Self::Rho),
            "s_w" | "w" => Ok(Self::W),
            other => Err(GridCalcError::InvalidArgument(format!(
                "unknown vertical position '{other}', expected s_rho or s_w"
            ))),
        }
    }
}
