//! Logical grid axes and axis specifiers
//!
//! Reductions are requested over the logical axes `X`, `Y` and `Z` rather than
//! over physical dimension names, so the same request works for fields on any
//! staggered position.

use crate::errors::{GridCalcError, Result};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

const ACCEPTED_SHAPES: &str =
    "axes must be a string, or a list or tuple of strings, containing \"X\", \"Y\", and/or \"Z\"";

/// A logical grid axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridAxis {
    X,
    Y,
    Z,
}

impl GridAxis {
    /// Get the token for this axis
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }
}

impl fmt::Display for GridAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridAxis {
    type Err = GridCalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "X" => Ok(Self::X),
            "Y" => Ok(Self::Y),
            "Z" => Ok(Self::Z),
            other => Err(GridCalcError::InvalidArgument(format!(
                "unknown axis '{other}'; {ACCEPTED_SHAPES}"
            ))),
        }
    }
}

/// One axis or an ordered collection of axes to reduce over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisSpec {
    Single(GridAxis),
    Many(Vec<GridAxis>),
}

impl AxisSpec {
    /// Parse a text token: either a single axis (`"X"`) or a comma list (`"Y,X"`).
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for unknown, empty or repeated axes.
    pub fn parse(s: &str) -> Result<Self> {
        if s.contains(',') {
            let tokens: Vec<&str> = s.split(',').collect();
            Self::from_tokens(&tokens)
        } else {
            Ok(Self::Single(s.parse()?))
        }
    }

    /// Build a list specifier from text tokens.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for unknown, empty or repeated axes.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let axes = tokens
            .iter()
            .map(|t| t.as_ref().parse())
            .collect::<Result<Vec<GridAxis>>>()?;
        Self::from_axes(axes)
    }

    /// Build a list specifier from already typed axes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the list is empty or repeats an axis.
    pub fn from_axes(axes: Vec<GridAxis>) -> Result<Self> {
        let spec = Self::Many(axes);
        spec.validate()?;
        Ok(spec)
    }

    /// Check that the specifier names at least one axis and none twice.
    /// Specifiers built from the variants directly skip the constructors'
    /// checks, so reductions call this first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the list is empty or repeats an axis.
    pub fn validate(&self) -> Result<()> {
        let axes = match self {
            Self::Single(_) => return Ok(()),
            Self::Many(axes) => axes,
        };
        if axes.is_empty() {
            return Err(GridCalcError::InvalidArgument(format!(
                "empty axis list; {ACCEPTED_SHAPES}"
            )));
        }
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].contains(axis) {
                return Err(GridCalcError::InvalidArgument(format!(
                    "axis '{axis}' given more than once"
                )));
            }
        }
        Ok(())
    }

    /// Accept a dynamically typed specifier: a string or an array of strings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for any other JSON shape.
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::String(s) => Self::parse(s),
            JsonValue::Array(items) => {
                let tokens = items
                    .iter()
                    .map(|item| match item {
                        JsonValue::String(s) => Ok(s.as_str()),
                        _ => Err(GridCalcError::InvalidArgument(ACCEPTED_SHAPES.to_string())),
                    })
                    .collect::<Result<Vec<&str>>>()?;
                Self::from_tokens(&tokens)
            }
            _ => Err(GridCalcError::InvalidArgument(ACCEPTED_SHAPES.to_string())),
        }
    }

    /// Axes in the order given
    #[must_use]
    pub fn axes(&self) -> Vec<GridAxis> {
        match self {
            Self::Single(axis) => vec![*axis],
            Self::Many(axes) => axes.clone(),
        }
    }

    #[must_use]
    pub fn contains(&self, axis: GridAxis) -> bool {
        match self {
            Self::Single(a) => *a == axis,
            Self::Many(axes) => axes.contains(&axis),
        }
    }
}

impl From<GridAxis> for AxisSpec {
    fn from(axis: GridAxis) -> Self {
        Self::Single(axis)
    }
}

impl FromStr for AxisSpec {
    type Err = GridCalcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AxisSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(axis) => write!(f, "{axis}"),
            Self::Many(axes) => {
                let names: Vec<&str> = axes.iter().map(|a| a.as_str()).collect();
                write!(f, "{}", names.join(", "))
            }
        }
    }
}
