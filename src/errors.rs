//! Centralized error handling for roms_gridcalc
//!
//! This module provides a single structured error type shared by the reducers,
//! the grid backend and the NetCDF layer.

use std::fmt;

/// Main error type for roms_gridcalc operations
#[derive(Debug)]
pub enum GridCalcError {
    /// A caller-supplied argument has the wrong shape or value
    InvalidArgument(String),

    /// A logical grid axis has no matching dimension on the field
    AxisNotFound { axis: String, dims: Vec<String> },

    /// Array shapes or dimension labels do not line up
    ShapeMismatch { message: String },

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Anything else
    Generic(String),
}

impl fmt::Display for GridCalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridCalcError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            GridCalcError::AxisNotFound { axis, dims } => write!(
                f,
                "No dimension for grid axis '{}' among [{}]",
                axis,
                dims.join(", ")
            ),
            GridCalcError::ShapeMismatch { message } => write!(f, "Shape mismatch: {}", message),
            GridCalcError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            GridCalcError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            GridCalcError::IoError(e) => write!(f, "I/O error: {}", e),
            GridCalcError::ArrayError(e) => write!(f, "Array error: {}", e),
            GridCalcError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            GridCalcError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GridCalcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridCalcError::NetCDFError(e) => Some(e),
            GridCalcError::IoError(e) => Some(e),
            GridCalcError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for GridCalcError {
    fn from(error: netcdf::Error) -> Self {
        GridCalcError::NetCDFError(error)
    }
}

impl From<std::io::Error> for GridCalcError {
    fn from(error: std::io::Error) -> Self {
        GridCalcError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for GridCalcError {
    fn from(error: ndarray::ShapeError) -> Self {
        GridCalcError::ArrayError(error)
    }
}

impl From<String> for GridCalcError {
    fn from(error: String) -> Self {
        GridCalcError::Generic(error)
    }
}

impl From<&str> for GridCalcError {
    fn from(error: &str) -> Self {
        GridCalcError::Generic(error.to_string())
    }
}

/// Result type alias for roms_gridcalc operations
pub type Result<T> = std::result::Result<T, GridCalcError>;
