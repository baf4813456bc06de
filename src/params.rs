//! # Environment configuration
//!
//! [`EnvParams`] gathers the tunables of the propagation and environment models. It is built
//! either with [`EnvParams::default`] or through the validating [`EnvParamsBuilder`]:
//!
//! ```rust
//! use orbit_env::params::EnvParams;
//! use orbit_env::sgp4::gravity::GravityModel;
//! use orbit_env::sun::SunPrecision;
//!
//! let params = EnvParams::builder()
//!     .gravity_model(GravityModel::Wgs72)
//!     .sun_precision(SunPrecision::High)
//!     .geodetic_max_iterations(20)
//!     .build()
//!     .unwrap();
//! assert_eq!(params.geodetic_max_iterations, 20);
//! ```
//!
//! Default values:
//!
//! | field | default |
//! |---|---|
//! | `gravity_model` | `Wgs84` |
//! | `sun_precision` | `Low` |
//! | `geodetic_max_iterations` | 100 |
//! | `magnetic_validity_years` | 5.0 |
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geomag::DEFAULT_VALIDITY_YEARS;
use crate::orbit_env_errors::OrbitEnvError;
use crate::ref_system::DEFAULT_GEODETIC_MAX_ITERATIONS;
use crate::sgp4::gravity::GravityModel;
use crate::sun::SunPrecision;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvParams {
    /// Gravity constants of the propagator
    pub gravity_model: GravityModel,
    /// Sun model used for the Sun direction and the eclipse test
    pub sun_precision: SunPrecision,
    /// Cap on the Newton steps of the ECEF to geodetic conversion
    pub geodetic_max_iterations: usize,
    /// Years after the geomagnetic model epoch before a validity warning is logged
    pub magnetic_validity_years: f64,
}

impl EnvParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EnvParamsBuilder {
        EnvParamsBuilder::new()
    }
}

impl Default for EnvParams {
    fn default() -> Self {
        EnvParams {
            gravity_model: GravityModel::Wgs84,
            sun_precision: SunPrecision::Low,
            geodetic_max_iterations: DEFAULT_GEODETIC_MAX_ITERATIONS,
            magnetic_validity_years: DEFAULT_VALIDITY_YEARS,
        }
    }
}

/// Builder for [`EnvParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct EnvParamsBuilder {
    params: EnvParams,
}

impl EnvParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: EnvParams::default(),
        }
    }

    pub fn gravity_model(mut self, v: GravityModel) -> Self {
        self.params.gravity_model = v;
        self
    }
    pub fn sun_precision(mut self, v: SunPrecision) -> Self {
        self.params.sun_precision = v;
        self
    }
    pub fn geodetic_max_iterations(mut self, v: usize) -> Self {
        self.params.geodetic_max_iterations = v;
        self
    }
    pub fn magnetic_validity_years(mut self, v: f64) -> Self {
        self.params.magnetic_validity_years = v;
        self
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ------
    /// * [`OrbitEnvError::InvalidParameter`] when `geodetic_max_iterations` is zero or
    ///   `magnetic_validity_years` is not a positive finite number
    pub fn build(self) -> Result<EnvParams, OrbitEnvError> {
        let p = &self.params;

        if p.geodetic_max_iterations == 0 {
            return Err(OrbitEnvError::InvalidParameter(
                "geodetic_max_iterations must be >= 1".into(),
            ));
        }
        if !(p.magnetic_validity_years.is_finite() && p.magnetic_validity_years > 0.0) {
            return Err(OrbitEnvError::InvalidParameter(
                "magnetic_validity_years must be > 0".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for EnvParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Environment Parameters")?;
            writeln!(f, "----------------------")?;
            writeln!(f, "  gravity_model           = {:?}", self.gravity_model)?;
            writeln!(f, "  sun_precision           = {:?}", self.sun_precision)?;
            writeln!(
                f,
                "  geodetic_max_iterations = {}",
                self.geodetic_max_iterations
            )?;
            write!(
                f,
                "  magnetic_validity_years = {:.1} yr",
                self.magnetic_validity_years
            )
        } else {
            write!(
                f,
                "EnvParams(gravity={:?}, sun={:?}, geodetic_it={}, mag_validity={:.1}yr)",
                self.gravity_model,
                self.sun_precision,
                self.geodetic_max_iterations,
                self.magnetic_validity_years
            )
        }
    }
}
