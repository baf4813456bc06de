use thiserror::Error;

use crate::{sgp4::PropagationError, tle_reader::ParseTleError};

#[derive(Error, Debug, PartialEq)]
pub enum OrbitEnvError {
    #[error("Propagation failed: {0}")]
    Propagation(#[from] PropagationError),

    #[error("Malformed element set: {0}")]
    MalformedRecord(#[from] ParseTleError),

    #[error("Propagator used before a successful initialization")]
    NotInitialized,

    #[error("Orbital period of {period_minutes:.2} min requires the unsupported deep-space model")]
    DeepSpaceUnsupported { period_minutes: f64 },

    #[error("Geodetic conversion did not converge after {iterations} iterations")]
    GeodeticNotConverged { iterations: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid geomagnetic coefficient file: {0}")]
    InvalidCoefficientFile(String),
}
