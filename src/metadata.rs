//! Descriptive metadata attached to reduced fields
//!
//! Every reduction result can carry a [`Metadata`] record with a name, units, a
//! human-readable long name and a handle to the grid it was computed on. How
//! that record is produced is chosen by the caller through [`MetadataPolicy`].

use crate::axes::AxisSpec;
use crate::field::Field;
use crate::grid::GridRef;
use crate::reducer::GridOperation;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name used when a field has none
pub const DEFAULT_NAME: &str = "var";
/// Units used when a field has none
pub const DEFAULT_UNITS: &str = "units";

/// Metadata record for a field
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub name: Option<String>,
    pub units: Option<String>,
    pub long_name: Option<String>,
    pub grid: Option<GridRef>,
    /// Any other attributes, e.g. copied from a NetCDF variable
    pub extra: BTreeMap<String, JsonValue>,
}

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_units<S: Into<String>>(mut self, units: S) -> Self {
        self.units = Some(units.into());
        self
    }

    #[must_use]
    pub fn with_long_name<S: Into<String>>(mut self, long_name: S) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    #[must_use]
    pub fn with_grid(mut self, grid: GridRef) -> Self {
        self.grid = Some(grid);
        self
    }

    #[must_use]
    pub fn with_extra<S: Into<String>>(mut self, key: S, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// True if this record refers to exactly this grid instance
    #[must_use]
    pub fn refers_to(&self, grid: &GridRef) -> bool {
        self.grid.as_ref().is_some_and(|g| Arc::ptr_eq(g, grid))
    }

    /// Textual attributes in the order they are written out: name, units,
    /// long_name, then the extra entries. The grid handle is not included.
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, JsonValue)> {
        let mut attrs = Vec::with_capacity(3 + self.extra.len());
        let named = [
            ("name", &self.name),
            ("units", &self.units),
            ("long_name", &self.long_name),
        ];
        for (key, value) in named {
            if let Some(v) = value {
                attrs.push((key.to_string(), JsonValue::String(v.clone())));
            }
        }
        for (key, value) in &self.extra {
            attrs.push((key.clone(), value.clone()));
        }
        attrs
    }
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        let same_grid = match (&self.grid, &other.grid) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_grid
            && self.name == other.name
            && self.units == other.units
            && self.long_name == other.long_name
            && self.extra == other.extra
    }
}

/// How the metadata of a reduction result is obtained
#[derive(Debug, Clone, Default)]
pub enum MetadataPolicy {
    /// Attach this record verbatim
    Explicit(Metadata),
    /// Build a record from the input field's own metadata
    #[default]
    Derive,
    /// Attach nothing
    None,
}

impl MetadataPolicy {
    /// Resolve the policy into the record to attach, if any.
    #[must_use]
    pub fn resolve(
        self,
        field: &Field,
        grid: &GridRef,
        operation: GridOperation,
        axes: &AxisSpec,
    ) -> Option<Metadata> {
        match self {
            Self::Explicit(record) => Some(record),
            Self::Derive => Some(derive_metadata(field.attrs(), grid, operation, axes)),
            Self::None => None,
        }
    }
}

/// Derive the record for a reduction from the input's record.
///
/// The input record is cloned. `name` and `units` are defaulted only if absent,
/// `long_name` is always extended with a description of the reduction and
/// `grid` is always replaced.
#[must_use]
pub fn derive_metadata(
    source: Option<&Metadata>,
    grid: &GridRef,
    operation: GridOperation,
    axes: &AxisSpec,
) -> Metadata {
    let mut record = source.cloned().unwrap_or_default();
    record.name.get_or_insert_with(|| DEFAULT_NAME.to_string());
    record.units.get_or_insert_with(|| DEFAULT_UNITS.to_string());
    let base = record.long_name.as_deref().unwrap_or(DEFAULT_NAME);
    record.long_name = Some(format!(
        "{base}, grid {} over dim {axes}",
        operation.as_str()
    ));
    record.grid = Some(Arc::clone(grid));
    record
}
