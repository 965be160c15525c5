//! ROMS Arakawa C-grid with terrain-following vertical levels
//!
//! The grid keeps cell widths `dx`, `dy` and layer thicknesses `dz` at every
//! staggered position. Only the rho-point values are supplied; the others are
//! interpolated from them once at construction.

use super::interp::{extended_midpoints, midpoints};
use super::position::{
    axis_dim, field_position, find_axis_dim, AxisPosition, HPosition, SPosition, ETA_RHO, ETA_V,
    S_RHO, S_W, XI_RHO, XI_U,
};
use super::weighted::{weighted_reduce, WeightedOperation};
use super::{Grid, Regrid};
use crate::axes::{AxisSpec, GridAxis};
use crate::errors::{GridCalcError, Result};
use crate::field::Field;
use crate::metadata::Metadata;
use ndarray::{Array1, Array2, Array3, ArrayD};
use std::fmt;

/// One metric at the four horizontal positions
#[derive(Clone)]
struct HorizontalMetric {
    rho: Field,
    u: Field,
    v: Field,
    psi: Field,
}

impl HorizontalMetric {
    fn from_rho(rho: Field) -> Result<Self> {
        let u = shift(&rho, GridAxis::X, AxisPosition::Staggered)?;
        let v = shift(&rho, GridAxis::Y, AxisPosition::Staggered)?;
        let psi = shift(&u, GridAxis::Y, AxisPosition::Staggered)?;
        Ok(Self { rho, u, v, psi })
    }

    fn at(&self, position: HPosition) -> &Field {
        match position {
            HPosition::Rho => &self.rho,
            HPosition::U => &self.u,
            HPosition::V => &self.v,
            HPosition::Psi => &self.psi,
        }
    }

    fn map(&self, f: impl Fn(&Field) -> Result<Field>) -> Result<Self> {
        Ok(Self {
            rho: f(&self.rho)?,
            u: f(&self.u)?,
            v: f(&self.v)?,
            psi: f(&self.psi)?,
        })
    }
}

/// ROMS curvilinear grid metrics
#[derive(Clone)]
pub struct RomsGrid {
    nz: usize,
    ny: usize,
    nx: usize,
    dx: HorizontalMetric,
    dy: HorizontalMetric,
    dz_rho: HorizontalMetric,
    dz_w: HorizontalMetric,
}

impl RomsGrid {
    /// Build a grid from rho-point metrics.
    ///
    /// `dx` and `dy` are shaped `(eta_rho, xi_rho)`, `dz` is shaped
    /// `(s_rho, eta_rho, xi_rho)`.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the shapes disagree or the grid has fewer
    /// than two points in either horizontal direction or no vertical level.
    pub fn new(dx: Array2<f64>, dy: Array2<f64>, dz: Array3<f64>) -> Result<Self> {
        let (ny, nx) = dx.dim();
        let (nz, dz_ny, dz_nx) = dz.dim();
        if dy.dim() != (ny, nx) || (dz_ny, dz_nx) != (ny, nx) {
            return Err(GridCalcError::ShapeMismatch {
                message: format!(
                    "dx {:?}, dy {:?} and dz {:?} do not describe the same horizontal grid",
                    dx.dim(),
                    dy.dim(),
                    dz.dim()
                ),
            });
        }
        if ny < 2 || nx < 2 || nz < 1 {
            return Err(GridCalcError::ShapeMismatch {
                message: format!("grid of {nz} x {ny} x {nx} points is too small"),
            });
        }

        let dx = HorizontalMetric::from_rho(Field::new(dx.into_dyn(), vec![ETA_RHO, XI_RHO])?)?;
        let dy = HorizontalMetric::from_rho(Field::new(dy.into_dyn(), vec![ETA_RHO, XI_RHO])?)?;
        let dz_rho =
            HorizontalMetric::from_rho(Field::new(dz.into_dyn(), vec![S_RHO, ETA_RHO, XI_RHO])?)?;
        let dz_w = dz_rho.map(|f| shift(f, GridAxis::Z, AxisPosition::Staggered))?;

        Ok(Self {
            nz,
            ny,
            nx,
            dx,
            dy,
            dz_rho,
            dz_w,
        })
    }

    /// Grid with constant spacing in every direction
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` for grids too small to stagger.
    pub fn uniform(nz: usize, ny: usize, nx: usize, dx: f64, dy: f64, dz: f64) -> Result<Self> {
        Self::new(
            Array2::from_elem((ny, nx), dx),
            Array2::from_elem((ny, nx), dy),
            Array3::from_elem((nz, ny, nx), dz),
        )
    }

    /// Build a grid whose layer thicknesses come from the ROMS vertical
    /// transform at rest (zero free surface).
    ///
    /// `h` is the bathymetry at rho points, `s_w` and `cs_w` the s-coordinate
    /// and stretching curve at w levels (bottom first), `hc` the critical depth.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown transform, inconsistent
    /// s-coordinate vectors or a non-positive `hc + h` under Vtransform 2,
    /// and `ShapeMismatch` if `h` does not match `dx`.
    pub fn from_depths(
        dx: Array2<f64>,
        dy: Array2<f64>,
        h: &Array2<f64>,
        s_w: &Array1<f64>,
        cs_w: &Array1<f64>,
        hc: f64,
        vtransform: u8,
    ) -> Result<Self> {
        if s_w.len() != cs_w.len() || s_w.len() < 2 {
            return Err(GridCalcError::InvalidArgument(format!(
                "s_w ({}) and Cs_w ({}) must have the same length of at least 2",
                s_w.len(),
                cs_w.len()
            )));
        }
        if h.dim() != dx.dim() {
            return Err(GridCalcError::ShapeMismatch {
                message: format!("h {:?} does not match dx {:?}", h.dim(), dx.dim()),
            });
        }

        let depth: fn(f64, f64, f64, f64) -> f64 = match vtransform {
            1 => |s, cs, h, hc| hc * s + (h - hc) * cs,
            2 => |s, cs, h, hc| h * (hc * s + h * cs) / (hc + h),
            other => {
                return Err(GridCalcError::InvalidArgument(format!(
                    "unsupported Vtransform {other}, expected 1 or 2"
                )))
            }
        };

        if vtransform == 2 && h.iter().any(|&depth_j_i| hc + depth_j_i <= 0.0) {
            return Err(GridCalcError::InvalidArgument(format!(
                "Vtransform 2 needs hc + h > 0 everywhere (hc = {hc})"
            )));
        }

        let nz = s_w.len() - 1;
        let (ny, nx) = h.dim();
        let dz = Array3::from_shape_fn((nz, ny, nx), |(k, j, i)| {
            let depth_j_i = h[[j, i]];
            depth(s_w[k + 1], cs_w[k + 1], depth_j_i, hc) - depth(s_w[k], cs_w[k], depth_j_i, hc)
        });

        Self::new(dx, dy, dz)
    }

    /// `(nz, ny, nx)` counted at rho points
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nz, self.ny, self.nx)
    }

    /// Cell width along xi at a horizontal position
    #[must_use]
    pub fn dx(&self, position: HPosition) -> &Field {
        self.dx.at(position)
    }

    /// Cell width along eta at a horizontal position
    #[must_use]
    pub fn dy(&self, position: HPosition) -> &Field {
        self.dy.at(position)
    }

    /// Layer thickness at a vertical and horizontal position
    #[must_use]
    pub fn dz(&self, vertical: SPosition, position: HPosition) -> &Field {
        match vertical {
            SPosition::Rho => self.dz_rho.at(position),
            SPosition::W => self.dz_w.at(position),
        }
    }

    /// Metric of `axis` at the position of `field`.
    ///
    /// Metric dimensions the field lacks (because it was already reduced over
    /// them) are collapsed by their mean.
    ///
    /// # Errors
    ///
    /// Returns an error if collapsing fails.
    pub fn metric(&self, axis: GridAxis, field: &Field) -> Result<Field> {
        let position = HPosition::of(field);
        let metric = match axis {
            GridAxis::X => self.dx(position),
            GridAxis::Y => self.dy(position),
            GridAxis::Z => self.dz(SPosition::of(field), position),
        };

        let absent: Vec<&str> = metric
            .dims()
            .iter()
            .map(String::as_str)
            .filter(|d| !field.has_dim(d))
            .collect();
        if absent.is_empty() {
            Ok(metric.clone())
        } else {
            metric.mean_over(&absent)
        }
    }

    /// Move `field` to `target` along `axis`. Fields without a dimension for
    /// the axis are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the field does not fit this grid.
    pub fn interp(&self, field: &Field, axis: GridAxis, target: AxisPosition) -> Result<Field> {
        self.check_fits(field)?;
        shift(field, axis, target)
    }

    fn expected_len(&self, dim: &str) -> Option<usize> {
        match dim {
            XI_RHO => Some(self.nx),
            XI_U => Some(self.nx - 1),
            ETA_RHO => Some(self.ny),
            ETA_V => Some(self.ny - 1),
            S_RHO => Some(self.nz),
            S_W => Some(self.nz + 1),
            _ => None,
        }
    }

    fn check_fits(&self, field: &Field) -> Result<()> {
        for (dim, &len) in field.dims().iter().zip(field.shape()) {
            if let Some(expected) = self.expected_len(dim) {
                if expected != len {
                    return Err(GridCalcError::ShapeMismatch {
                        message: format!(
                            "dimension '{dim}' has length {len}, grid expects {expected}"
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn reduce(&self, field: &Field, axes: &AxisSpec, operation: WeightedOperation) -> Result<Field> {
        axes.validate()?;
        self.check_fits(field)?;

        let dims = field.dims().to_vec();
        let shape = field.shape().to_vec();
        let mut reduced_axes = Vec::new();
        let mut weights = ArrayD::<f64>::ones(field.values().raw_dim());

        for axis in axes.axes() {
            let dim = find_axis_dim(field, axis)?;
            let index = field
                .axis_of(dim)
                .ok_or_else(|| GridCalcError::AxisNotFound {
                    axis: axis.to_string(),
                    dims: dims.clone(),
                })?;
            reduced_axes.push(index);

            let metric = self.metric(axis, field)?;
            weights *= &metric.broadcast_values(&dims, &shape)?;
        }

        let values = weighted_reduce(field.values(), &weights, &reduced_axes, operation)?;
        let kept: Vec<String> = dims
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !reduced_axes.contains(i))
            .map(|(_, d)| d)
            .collect();

        let mut result = Field::new(values, kept)?;
        result.set_name(field.name().map(str::to_string));
        Ok(result)
    }
}

impl Grid for RomsGrid {
    fn average(&self, field: &Field, axes: &AxisSpec) -> Result<Field> {
        self.reduce(field, axes, WeightedOperation::Mean)
    }

    fn integrate(&self, field: &Field, axes: &AxisSpec) -> Result<Field> {
        self.reduce(field, axes, WeightedOperation::Sum)
    }
}

impl Regrid for RomsGrid {
    fn to_grid(
        &self,
        field: Field,
        target_h_position: Option<HPosition>,
        target_s_position: Option<SPosition>,
        metadata: Option<Metadata>,
    ) -> Result<Field> {
        let mut field = field;
        if let Some(h) = target_h_position {
            field = self.interp(&field, GridAxis::X, h.x())?;
            field = self.interp(&field, GridAxis::Y, h.y())?;
        }
        if let Some(s) = target_s_position {
            field = self.interp(&field, GridAxis::Z, s.z())?;
        }
        if let Some(record) = metadata {
            if let Some(name) = &record.name {
                field.set_name(Some(name.clone()));
            }
            field.set_attrs(Some(record));
        }
        Ok(field)
    }
}

impl fmt::Debug for RomsGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RomsGrid")
            .field("nz", &self.nz)
            .field("ny", &self.ny)
            .field("nx", &self.nx)
            .finish_non_exhaustive()
    }
}

/// Move a field between center and face dims of one axis.
///
/// Horizontally the faces are the inner points (n - 1), vertically the outer
/// points (n + 1).
fn shift(field: &Field, axis: GridAxis, target: AxisPosition) -> Result<Field> {
    let current = match field_position(field, axis) {
        Some(position) if position != target => position,
        _ => return Ok(field.clone()),
    };

    let from = axis_dim(axis, current);
    let index = field
        .axis_of(from)
        .ok_or_else(|| GridCalcError::AxisNotFound {
            axis: axis.to_string(),
            dims: field.dims().to_vec(),
        })?;

    let grows = (axis == GridAxis::Z) == (target == AxisPosition::Staggered);
    let values = if grows {
        extended_midpoints(field.values(), index)?
    } else {
        midpoints(field.values(), index)?
    };

    let mut dims = field.dims().to_vec();
    dims[index] = axis_dim(axis, target).to_string();
    field.replace_values(values, dims)
}
