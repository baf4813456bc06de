//! # Orbit environment
//!
//! [`OrbitEnvironment`] ties the models together for one satellite. Each call to
//! [`OrbitEnvironment::snapshot`] is one periodic tick:
//!
//! ```text
//!  jd ──▶ SGP4 ──▶ ECI state (m, m/s) ──┬──▶ geomagnetic model ──▶ field vector (ECI, nT)
//!                                       ├──▶ Sun model ──▶ Sun direction, eclipse state
//!                                       └──▶ geodetic sub-point
//! ```
//!
//! ## Example
//!
//! ```rust
//! use orbit_env::orbit_env::OrbitEnvironment;
//! use orbit_env::params::EnvParams;
//!
//! let line1 = "1 25544U 98067A   21014.31054398  .00001697  00000-0  38545-4 0  9993";
//! let line2 = "2 25544  51.6457  23.8259 0000410 224.6534 316.4858 15.49291243264748";
//!
//! let mut env = OrbitEnvironment::from_tle(line1, line2, EnvParams::default()).unwrap();
//! let epoch = env.epoch_jd().unwrap();
//! let snapshot = env.snapshot(epoch + 0.01).unwrap();
//! assert!(snapshot.magnetic_field.norm() > 10_000.0);
//! ```
use serde::{Deserialize, Serialize};

use crate::{
    constants::JulianDate,
    geomag::GeomagneticModel,
    mean_elements::MeanElementRecord,
    orbit_env_errors::OrbitEnvError,
    params::EnvParams,
    ref_system::{eci_to_geodetic, EciVector, GeodeticPosition},
    sgp4::{CartesianState, Sgp4Propagator},
    sun::{EclipseState, SunModel},
    tle_reader::parse_tle,
};

/// Everything the attitude and orbit determination loop needs at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub jd: JulianDate,
    /// Position and velocity in ECI, meters and meters per second
    pub state: CartesianState,
    /// Geomagnetic field in ECI, nanotesla
    pub magnetic_field: EciVector,
    /// Unit vector from the satellite to the Sun, ECI
    pub sun_direction: EciVector,
    pub eclipse_state: EclipseState,
    pub eclipsed: bool,
    /// Sub-satellite point, height in meters
    pub sub_point: GeodeticPosition,
}

#[derive(Debug, Clone)]
pub struct OrbitEnvironment {
    params: EnvParams,
    propagator: Sgp4Propagator,
    magnetic_model: GeomagneticModel,
    sun_model: SunModel,
}

impl OrbitEnvironment {
    /// Environment for an already decoded element set.
    pub fn new(record: &MeanElementRecord, params: EnvParams) -> Result<Self, OrbitEnvError> {
        let propagator = Sgp4Propagator::from_record(record, params.gravity_model)?;
        let magnetic_model = GeomagneticModel::wmm2020()
            .with_validity_years(params.magnetic_validity_years)
            .with_geodetic_max_iterations(params.geodetic_max_iterations);
        let sun_model = SunModel::new(params.sun_precision);

        Ok(OrbitEnvironment {
            params,
            propagator,
            magnetic_model,
            sun_model,
        })
    }

    /// Parse a two-line element set and initialize the propagator.
    pub fn from_tle(line1: &str, line2: &str, params: EnvParams) -> Result<Self, OrbitEnvError> {
        let record = parse_tle(line1, line2)?;
        OrbitEnvironment::new(&record, params)
    }

    /// Replace the geomagnetic model, e.g. one loaded with
    /// [`GeomagneticModel::from_cof_str`].
    pub fn with_magnetic_model(mut self, model: GeomagneticModel) -> Self {
        self.magnetic_model = model
            .with_validity_years(self.params.magnetic_validity_years)
            .with_geodetic_max_iterations(self.params.geodetic_max_iterations);
        self
    }

    pub fn params(&self) -> &EnvParams {
        &self.params
    }

    pub fn propagator(&self) -> &Sgp4Propagator {
        &self.propagator
    }

    pub fn epoch_jd(&self) -> Result<JulianDate, OrbitEnvError> {
        self.propagator.epoch_jd()
    }

    /// Compute the satellite state and its environment at a Julian Date.
    ///
    /// Arguments
    /// ---------
    /// * `jd`: Julian Date of the tick
    ///
    /// Return
    /// ------
    /// * the [`EnvironmentSnapshot`], or the first error raised along the chain (propagation
    ///   failure, geodetic non-convergence)
    pub fn snapshot(&mut self, jd: JulianDate) -> Result<EnvironmentSnapshot, OrbitEnvError> {
        let state = self.propagator.propagate_to_jd(jd)?;
        let position = state.position;

        let sub_point = eci_to_geodetic(&position, jd, self.params.geodetic_max_iterations)?;
        let magnetic_field = self
            .magnetic_model
            .calculate_magnetic_vector_at(&sub_point, jd);
        let sun_direction = self.sun_model.sun_vector_eci(jd, &position);
        let eclipse_state = self.sun_model.eclipse_state(jd, &position);

        Ok(EnvironmentSnapshot {
            jd,
            state,
            magnetic_field,
            sun_direction,
            eclipse_state,
            eclipsed: eclipse_state.is_eclipsed(),
            sub_point,
        })
    }
}

#[cfg(test)]
mod orbit_env_test {
    use super::*;
    use crate::constants::RADEG;
    use crate::sgp4::gravity::GravityModel;
    use crate::sun::SunPrecision;
    use approx::assert_relative_eq;

    const ISS_LINE1: &str =
        "1 25544U 98067A   21014.31054398  .00001697  00000-0  38545-4 0  9993";
    const ISS_LINE2: &str =
        "2 25544  51.6457  23.8259 0000410 224.6534 316.4858 15.49291243264748";

    #[test]
    fn test_snapshot_at_epoch() {
        let mut env = OrbitEnvironment::from_tle(ISS_LINE1, ISS_LINE2, EnvParams::default()).unwrap();
        let epoch = env.epoch_jd().unwrap();
        let snap = env.snapshot(epoch).unwrap();

        assert_relative_eq!(snap.state.position.x(), -6_180_110.796_739_977, epsilon = 1e-3);
        assert_relative_eq!(snap.sun_direction.norm(), 1.0, epsilon = 1e-12);
        assert_eq!(snap.eclipsed, snap.eclipse_state.is_eclipsed());
        assert!((300_000.0..500_000.0).contains(&snap.sub_point.height));
        assert!(snap.sub_point.latitude.abs() <= 51.7 * RADEG);
        assert!((15_000.0..60_000.0).contains(&snap.magnetic_field.norm()));
    }

    #[test]
    fn test_eclipse_over_one_orbit() {
        let params = EnvParams::builder()
            .sun_precision(SunPrecision::High)
            .build()
            .unwrap();
        let mut env = OrbitEnvironment::from_tle(ISS_LINE1, ISS_LINE2, params).unwrap();
        let epoch = env.epoch_jd().unwrap();

        let eclipsed = (0..93)
            .map(|minute| env.snapshot(epoch + minute as f64 / 1440.0).unwrap().eclipsed)
            .filter(|e| *e)
            .count();
        // a low orbit spends roughly a third of each revolution in the shadow
        assert!((15..50).contains(&eclipsed), "{eclipsed} minutes in shadow");
    }

    #[test]
    fn test_params_forwarded() {
        let params = EnvParams::builder()
            .gravity_model(GravityModel::Wgs72)
            .build()
            .unwrap();
        let env = OrbitEnvironment::from_tle(ISS_LINE1, ISS_LINE2, params.clone()).unwrap();
        assert_eq!(env.params(), &params);
        assert_eq!(env.propagator().gravity_model(), GravityModel::Wgs72);
    }

    #[test]
    fn test_snapshot_field_matches_direct_evaluation() {
        let mut env = OrbitEnvironment::from_tle(ISS_LINE1, ISS_LINE2, EnvParams::default()).unwrap();
        let jd = env.epoch_jd().unwrap() + 0.3;
        let snap = env.snapshot(jd).unwrap();

        let sub_point = eci_to_geodetic(
            &snap.state.position,
            jd,
            EnvParams::default().geodetic_max_iterations,
        )
        .unwrap();
        assert_eq!(snap.sub_point, sub_point);

        let field = GeomagneticModel::wmm2020()
            .calculate_magnetic_vector(&snap.state.position, jd)
            .unwrap();
        assert_eq!(snap.magnetic_field, field);
    }

    #[test]
    fn test_malformed_tle() {
        let err = OrbitEnvironment::from_tle(&ISS_LINE1[..40], ISS_LINE2, EnvParams::default())
            .unwrap_err();
        assert!(matches!(err, OrbitEnvError::MalformedRecord(_)));
    }
}
