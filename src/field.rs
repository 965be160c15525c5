//! Labeled multi-dimensional fields
//!
//! A [`Field`] pairs an `ndarray` array with one dimension name per axis and an
//! optional [`Metadata`] record. Arithmetic between fields aligns axes by name
//! rather than by position, the way model output variables are combined.

use crate::errors::{GridCalcError, Result};
use crate::metadata::Metadata;
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};

/// A labeled multi-dimensional numeric array
#[derive(Debug, Clone)]
pub struct Field {
    values: ArrayD<f64>,
    dims: Vec<String>,
    name: Option<String>,
    attrs: Option<Metadata>,
}

impl Field {
    /// Create a field from values and one dimension name per axis
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the number of names differs from the array
    /// rank or a name repeats.
    pub fn new<S: Into<String>>(values: ArrayD<f64>, dims: Vec<S>) -> Result<Self> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != values.ndim() {
            return Err(GridCalcError::ShapeMismatch {
                message: format!(
                    "{} dimension names given for an array with {} dimensions",
                    dims.len(),
                    values.ndim()
                ),
            });
        }
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].contains(dim) {
                return Err(GridCalcError::ShapeMismatch {
                    message: format!("dimension '{dim}' appears more than once"),
                });
            }
        }
        Ok(Self {
            values,
            dims,
            name: None,
            attrs: None,
        })
    }

    #[must_use]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_attrs(mut self, attrs: Metadata) -> Self {
        self.attrs = Some(attrs);
        self
    }

    pub fn set_attrs(&mut self, attrs: Option<Metadata>) {
        self.attrs = attrs;
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    #[must_use]
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> ArrayD<f64> {
        self.values
    }

    #[must_use]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.values.ndim()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn attrs(&self) -> Option<&Metadata> {
        self.attrs.as_ref()
    }

    /// Array axis index of a named dimension
    #[must_use]
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    #[must_use]
    pub fn has_dim(&self, dim: &str) -> bool {
        self.axis_of(dim).is_some()
    }

    #[must_use]
    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.axis_of(dim).map(|axis| self.values.len_of(Axis(axis)))
    }

    /// Replace values and dims together, keeping name and attributes.
    pub(crate) fn replace_values(&self, values: ArrayD<f64>, dims: Vec<String>) -> Result<Self> {
        let mut field = Self::new(values, dims)?;
        field.name = self.name.clone();
        field.attrs = self.attrs.clone();
        Ok(field)
    }

    /// Lay the values out over `dims`/`shape`, broadcasting along dimensions
    /// this field does not have.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if one of this field's dimensions is missing
    /// from `dims` or has a different length there.
    pub fn broadcast_values(&self, dims: &[String], shape: &[usize]) -> Result<ArrayD<f64>> {
        let order: Vec<usize> = dims.iter().filter_map(|d| self.axis_of(d)).collect();
        if order.len() != self.dims.len() {
            let missing: Vec<&str> = self
                .dims
                .iter()
                .filter(|d| !dims.contains(*d))
                .map(String::as_str)
                .collect();
            return Err(GridCalcError::ShapeMismatch {
                message: format!(
                    "cannot broadcast over [{}]: missing [{}]",
                    dims.join(", "),
                    missing.join(", ")
                ),
            });
        }

        let mut view: ArrayViewD<'_, f64> = self.values.view().permuted_axes(IxDyn(&order));
        for (pos, dim) in dims.iter().enumerate() {
            if !self.has_dim(dim) {
                view = view.insert_axis(Axis(pos));
            }
        }

        let broadcast = view.broadcast(IxDyn(shape)).map(|v| v.to_owned());
        broadcast.ok_or_else(|| GridCalcError::ShapeMismatch {
            message: format!(
                "dims [{}] with shape {:?} do not fit shape {:?} of [{}]",
                self.dims.join(", "),
                self.shape(),
                shape,
                dims.join(", ")
            ),
        })
    }

    /// Elementwise product aligned by dimension name.
    ///
    /// The result carries this field's dims followed by any dims only `other`
    /// has. Name and attributes are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if a shared dimension has different lengths.
    pub fn multiply(&self, other: &Field) -> Result<Field> {
        let mut dims = self.dims.clone();
        let mut shape = self.shape().to_vec();
        for (dim, &len) in other.dims.iter().zip(other.shape()) {
            if !dims.contains(dim) {
                dims.push(dim.clone());
                shape.push(len);
            }
        }

        let lhs = self.broadcast_values(&dims, &shape)?;
        let rhs = other.broadcast_values(&dims, &shape)?;
        let mut product = lhs;
        Zip::from(&mut product).and(&rhs).par_for_each(|a, &b| *a *= b);
        Field::new(product, dims)
    }

    /// Plain sum over named dimensions. Name is kept, attributes are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if a dimension is not present.
    pub fn sum_over<S: AsRef<str>>(&self, dims: &[S]) -> Result<Field> {
        self.collapse(dims, |values, axis| values.sum_axis(axis))
    }

    /// Plain mean over named dimensions. Name is kept, attributes are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if a dimension is not present or empty.
    pub fn mean_over<S: AsRef<str>>(&self, dims: &[S]) -> Result<Field> {
        for dim in dims {
            if self.dim_len(dim.as_ref()) == Some(0) {
                return Err(GridCalcError::ShapeMismatch {
                    message: format!("cannot average over empty dimension '{}'", dim.as_ref()),
                });
            }
        }
        self.collapse(dims, |values, axis| {
            let n = values.len_of(axis) as f64;
            values.sum_axis(axis) / n
        })
    }

    fn collapse<S, F>(&self, dims: &[S], reduce: F) -> Result<Field>
    where
        S: AsRef<str>,
        F: Fn(&ArrayD<f64>, Axis) -> ArrayD<f64>,
    {
        let mut axes = dims
            .iter()
            .map(|d| {
                self.axis_of(d.as_ref())
                    .ok_or_else(|| GridCalcError::ShapeMismatch {
                        message: format!(
                            "dimension '{}' not in [{}]",
                            d.as_ref(),
                            self.dims.join(", ")
                        ),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;
        // Highest axis first so the remaining indices stay valid
        axes.sort_unstable_by(|a, b| b.cmp(a));
        axes.dedup();

        let mut values = self.values.clone();
        let mut kept = self.dims.clone();
        for axis in axes {
            values = reduce(&values, Axis(axis));
            kept.remove(axis);
        }

        let mut field = Field::new(values, kept)?;
        field.name = self.name.clone();
        Ok(field)
    }
}
