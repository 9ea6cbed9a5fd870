//! Error taxonomy for the network model.

use thiserror::Error;

/// Errors raised while building or resampling a network model.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A construction argument failed validation (shape, range, simplex).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A distribution was asked to draw with parameters outside its support.
    #[error("domain error: {0}")]
    Domain(String),

    /// Observed data does not match the population size.
    #[error("{what} has shape {found:?}, expected {expected:?}")]
    Shape {
        /// Name of the offending array
        what: &'static str,
        /// Expected dimensions
        expected: Vec<usize>,
        /// Dimensions that were passed in
        found: Vec<usize>,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;

macro_rules! invalid {
    ($($arg:tt)*) => {
        $crate::error::NetworkError::InvalidParameter(format!($($arg)*))
    };
}

macro_rules! domain {
    ($($arg:tt)*) => {
        $crate::error::NetworkError::Domain(format!($($arg)*))
    };
}

pub(crate) use domain;
pub(crate) use invalid;
