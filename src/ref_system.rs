//! # Reference systems and frame transformations
//!
//! Distinct value types for the four frames used on board and the pure functions converting
//! between them:
//!
//! - [`EciVector`]: Earth-Centered Inertial (true equator, mean equinox of date approximation)
//! - [`EcefVector`]: Earth-Centered Earth-Fixed
//! - [`GeodeticPosition`]: latitude / longitude / height over the WGS-84 ellipsoid
//! - [`LocalCartesian`]: topocentric North / East / Down vector attached to a geodetic origin
//!
//! ## Overview
//!
//! ```text
//!  LocalCartesian ──local_to_ecef──▶ EcefVector ──ecef_to_eci──▶ EciVector
//!                                       │  ▲                          │
//!                          ecef_to_geodetic  eci_to_ecef ◀────────────┘
//!                                       ▼
//!                                GeodeticPosition
//! ```
//!
//! ECI and ECEF share their origin and Z axis, the only difference is a rotation about Z by
//! the Greenwich mean sidereal angle ([`crate::time::gmst`]).
//!
//! All lengths are in meters unless stated otherwise; the conversions are linear so they can
//! also be applied to kilometers or to direction vectors (velocities, field vectors).
//!
//! ## See also
//! * [`crate::time::gmst`] – sidereal angle used by the ECI ⇄ ECEF rotation
//! * [`rotmt`] – elementary axis rotations
use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{
    JulianDate, Meter, Radian, DAYS_PER_JULIAN_CENTURY, DPI, EARTH_MAJOR_AXIS, JD2000, RADSEC,
    WGS84_E2,
};
use crate::orbit_env_errors::OrbitEnvError;
use crate::time::gmst;

/// Default cap on the Toms fixed-point iteration of [`ecef_to_geodetic`].
pub const DEFAULT_GEODETIC_MAX_ITERATIONS: usize = 100;

/// Principal axes for [`rotmt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes.
///
/// The matrix represents an **active rotation** of a vector by `alpha` in the direct
/// (counter-clockwise) sense, so the rotated vector is `x' = R · x`.
/// Rotating a vector by `-alpha` is the same as expressing it in a frame rotated by `alpha`.
///
/// # Arguments
///
/// * `alpha` - Rotation angle in **radians**
/// * `axis` - Axis of rotation
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Mean obliquity of the ecliptic (IAU 1980, Meeus eq. 22.2) for a Julian Date.
///
/// Arguments
/// ---------
/// * `jd`: Julian Date (TT ≈ UTC for this purpose)
///
/// Return
/// ------
/// * the obliquity in radians
pub fn mean_obliquity(jd: JulianDate) -> Radian {
    let ob0 = (23.0 * 3600.0 + 26.0 * 60.0 + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.00059 * RADSEC;
    let ob3 = 0.001813 * RADSEC;

    let t = (jd - JD2000) / DAYS_PER_JULIAN_CENTURY;

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

macro_rules! frame_vector {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub Vector3<f64>);

        impl $name {
            pub fn new(x: f64, y: f64, z: f64) -> Self {
                $name(Vector3::new(x, y, z))
            }

            pub fn zeros() -> Self {
                $name(Vector3::zeros())
            }

            pub fn x(&self) -> f64 {
                self.0.x
            }

            pub fn y(&self) -> f64 {
                self.0.y
            }

            pub fn z(&self) -> f64 {
                self.0.z
            }

            pub fn norm(&self) -> f64 {
                self.0.norm()
            }

            pub fn as_vector(&self) -> &Vector3<f64> {
                &self.0
            }

            /// Same vector multiplied by a scalar (unit changes).
            pub fn scaled(&self, factor: f64) -> Self {
                $name(self.0 * factor)
            }
        }

        impl From<Vector3<f64>> for $name {
            fn from(v: Vector3<f64>) -> Self {
                $name(v)
            }
        }
    };
}

frame_vector!(
    /// Vector in the Earth-Centered Inertial frame.
    EciVector
);
frame_vector!(
    /// Vector in the Earth-Centered Earth-Fixed frame.
    EcefVector
);

/// Geodetic coordinates on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Geodetic latitude in radians, `[-π/2, π/2]`
    pub latitude: Radian,
    /// Longitude in radians, `(-π, π]`
    pub longitude: Radian,
    /// Height above the ellipsoid in meters
    pub height: Meter,
}

impl GeodeticPosition {
    pub fn new(latitude: Radian, longitude: Radian, height: Meter) -> Self {
        GeodeticPosition {
            latitude,
            longitude,
            height,
        }
    }
}

/// Topocentric vector expressed along local North (`x`), East (`y`) and Down (`z`),
/// attached to the geodetic `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalCartesian {
    pub origin: GeodeticPosition,
    pub ned: Vector3<f64>,
}

impl LocalCartesian {
    pub fn new(origin: GeodeticPosition, north: f64, east: f64, down: f64) -> Self {
        LocalCartesian {
            origin,
            ned: Vector3::new(north, east, down),
        }
    }
}

/// Convert a local North/East/Down vector into ECEF coordinates.
///
/// The vector is first reordered into the East/North/Up axes of the classical topocentric
/// frame, then rotated with the origin latitude and longitude.
///
/// Arguments
/// ---------
/// * `local`: the local vector and its geodetic origin
/// * `orientation_only`: when `true` the vector is treated as a direction (field vector,
///   velocity) and the origin translation is skipped
///
/// Return
/// ------
/// * the ECEF vector, in the unit of the input
pub fn local_to_ecef(local: &LocalCartesian, orientation_only: bool) -> EcefVector {
    let lat = local.origin.latitude;
    let mut lon = local.origin.longitude;
    if lon > std::f64::consts::PI {
        lon -= DPI;
    }
    let height = local.origin.height;

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    let origin = if orientation_only {
        Vector3::zeros()
    } else {
        let n0 = EARTH_MAJOR_AXIS / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let val = (n0 + height) * cos_lat;
        Vector3::new(
            val * cos_lon,
            val * sin_lon,
            (n0 * (1.0 - WGS84_E2) + height) * sin_lat,
        )
    };

    // NED → ENU
    let east = local.ned.y;
    let north = local.ned.x;
    let up = -local.ned.z;

    let sin_lat_n = sin_lat * north;
    let cos_lat_u = cos_lat * up;

    EcefVector(
        Vector3::new(
            -sin_lon * east - sin_lat_n * cos_lon + cos_lat_u * cos_lon,
            cos_lon * east - sin_lat_n * sin_lon + cos_lat_u * sin_lon,
            cos_lat * north + sin_lat * up,
        ) + origin,
    )
}

/// Convert ECEF coordinates (meters) to geodetic coordinates on the WGS-84 ellipsoid.
///
/// Uses the fixed-point formulation of R. Toms, *An Improved Algorithm for Geocentric to
/// Geodetic Coordinate Conversion* (1996): Newton steps on the cotangent of the latitude are
/// taken as long as the residual keeps decreasing in magnitude.
///
/// Arguments
/// ---------
/// * `ecef`: position in meters
/// * `max_iterations`: cap on the number of Newton steps
///
/// Return
/// ------
/// * the geodetic position, or [`OrbitEnvError::GeodeticNotConverged`] when the residual is
///   still decreasing after `max_iterations` steps
pub fn ecef_to_geodetic(
    ecef: &EcefVector,
    max_iterations: usize,
) -> Result<GeodeticPosition, OrbitEnvError> {
    let (x, y, z) = (ecef.x(), ecef.y(), ecef.z());

    let e1 = 1.0 - WGS84_E2;
    let e2a = WGS84_E2 * EARTH_MAJOR_AXIS;
    let rho = x.hypot(y);

    let (c, s, latitude) = if z == 0.0 {
        (1.0, 0.0, 0.0)
    } else {
        let zabs = z.abs();

        let mut new_ct = rho / zabs;
        let mut new_f = f64::MAX;
        let mut ct;
        let mut iterations = 0;

        loop {
            if iterations == max_iterations {
                log::warn!("Toms geodetic iteration reached its cap of {max_iterations} steps");
                return Err(OrbitEnvError::GeodeticNotConverged {
                    iterations: max_iterations,
                });
            }
            iterations += 1;

            ct = new_ct;
            let f = new_f;

            let e2 = (e1 + ct * ct).sqrt();
            new_f = rho - zabs * ct - e2a * ct / e2;
            if new_f == 0.0 {
                break;
            }

            let df_dct = -zabs - (e2a * e1) / (e2 * e2 * e2);
            new_ct = (ct - new_f / df_dct).max(0.0);

            if new_f.abs() >= f.abs() {
                break;
            }
        }

        let s = 1.0 / (1.0 + ct * ct).sqrt();
        let c = ct * s;
        let lat = (1.0 / ct).atan();

        if z < 0.0 {
            (c, -s, -lat)
        } else {
            (c, s, lat)
        }
    };

    let height = rho * c + z * s - EARTH_MAJOR_AXIS * (1.0 - WGS84_E2 * s * s).sqrt();

    Ok(GeodeticPosition {
        latitude,
        longitude: y.atan2(x),
        height,
    })
}

/// Convert geodetic coordinates to an ECEF position in meters.
pub fn geodetic_to_ecef(geodetic: &GeodeticPosition) -> EcefVector {
    let (sin_lat, cos_lat) = geodetic.latitude.sin_cos();
    let (sin_lon, cos_lon) = geodetic.longitude.sin_cos();
    let n = EARTH_MAJOR_AXIS / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    EcefVector::new(
        (n + geodetic.height) * cos_lat * cos_lon,
        (n + geodetic.height) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + geodetic.height) * sin_lat,
    )
}

/// Rotate an ECI vector into the Earth-fixed frame at the given Julian Date.
pub fn eci_to_ecef(eci: &EciVector, jd: JulianDate) -> EcefVector {
    EcefVector(rotmt(-gmst(jd), Axis::Z) * eci.0)
}

/// Rotate an ECEF vector into the inertial frame at the given Julian Date.
pub fn ecef_to_eci(ecef: &EcefVector, jd: JulianDate) -> EciVector {
    EciVector(rotmt(gmst(jd), Axis::Z) * ecef.0)
}

/// Geodetic sub-point of an ECI position (meters) at the given Julian Date.
pub fn eci_to_geodetic(
    eci: &EciVector,
    jd: JulianDate,
    max_iterations: usize,
) -> Result<GeodeticPosition, OrbitEnvError> {
    ecef_to_geodetic(&eci_to_ecef(eci, jd), max_iterations)
}

/// Local North/East/Down vector promoted to ECI at the given Julian Date.
///
/// See [`local_to_ecef`] for the meaning of `orientation_only`.
pub fn local_to_eci(local: &LocalCartesian, jd: JulianDate, orientation_only: bool) -> EciVector {
    ecef_to_eci(&local_to_ecef(local, orientation_only), jd)
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use crate::constants::RADEG;
    use approx::assert_relative_eq;

    fn assert_vec_eq(a: &Vector3<f64>, b: &Vector3<f64>, tol: f64) {
        for i in 0..3 {
            assert_relative_eq!(a[i], b[i], epsilon = tol);
        }
    }

    #[test]
    fn test_rotmt_z() {
        let r = rotmt(std::f64::consts::FRAC_PI_2, Axis::Z);
        assert_vec_eq(&(r * Vector3::x()), &Vector3::y(), 1e-15);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_mean_obliquity() {
        assert_relative_eq!(
            mean_obliquity(JD2000),
            (23.0 + 26.0 / 60.0 + 21.448 / 3600.0) * RADEG,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_eci_to_ecef_matches_explicit_rotation() {
        let jd = 2_459_228.810_543_98;
        let theta = gmst(jd);
        let eci = EciVector::new(6_778_000.0, -1_200_000.0, 350_000.0);
        let ecef = eci_to_ecef(&eci, jd);

        assert_relative_eq!(
            ecef.x(),
            eci.x() * theta.cos() + eci.y() * theta.sin(),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            ecef.y(),
            -eci.x() * theta.sin() + eci.y() * theta.cos(),
            epsilon = 1e-6
        );
        assert_eq!(ecef.z(), eci.z());
    }

    #[test]
    fn test_eci_ecef_round_trip() {
        let jd = 2_459_228.810_543_98;
        let eci = EciVector::new(-4_512_000.0, 3_210_500.0, 4_020_000.0);
        let back = ecef_to_eci(&eci_to_ecef(&eci, jd), jd);
        assert_vec_eq(&back.0, &eci.0, 1e-6);

        let ecef = EcefVector::new(1.0, 2.0, 3.0);
        let back = eci_to_ecef(&ecef_to_eci(&ecef, jd), jd);
        assert_vec_eq(&back.0, &ecef.0, 1e-14);
    }

    #[test]
    fn test_ecef_to_geodetic_equator() {
        let geo = ecef_to_geodetic(
            &EcefVector::new(EARTH_MAJOR_AXIS + 400_000.0, 0.0, 0.0),
            DEFAULT_GEODETIC_MAX_ITERATIONS,
        )
        .unwrap();
        assert_eq!(geo.latitude, 0.0);
        assert_eq!(geo.longitude, 0.0);
        assert_relative_eq!(geo.height, 400_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ecef_to_geodetic_pole() {
        let polar_radius = EARTH_MAJOR_AXIS * (1.0 - crate::constants::WGS84_FLATTENING);
        let geo = ecef_to_geodetic(
            &EcefVector::new(0.0, 0.0, -(polar_radius + 1_000.0)),
            DEFAULT_GEODETIC_MAX_ITERATIONS,
        )
        .unwrap();
        assert_relative_eq!(geo.latitude, -std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(geo.height, 1_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_geodetic_round_trip() {
        for (lat, lon, h) in [
            (48.78, 9.93, 0.0),
            (-33.9, 151.2, 1_500.0),
            (51.6, -120.0, 420_000.0),
            (-80.0, 45.0, 550_000.0),
        ] {
            let geo = GeodeticPosition::new(lat * RADEG, lon * RADEG, h);
            let back =
                ecef_to_geodetic(&geodetic_to_ecef(&geo), DEFAULT_GEODETIC_MAX_ITERATIONS).unwrap();
            assert_relative_eq!(back.latitude, geo.latitude, epsilon = 1e-9);
            assert_relative_eq!(back.longitude, geo.longitude, epsilon = 1e-12);
            assert_relative_eq!(back.height, geo.height, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_geodetic_iteration_cap() {
        let result = ecef_to_geodetic(&EcefVector::new(4_000_000.0, 1_000.0, 4_500_000.0), 1);
        assert_eq!(
            result,
            Err(OrbitEnvError::GeodeticNotConverged { iterations: 1 })
        );
    }

    #[test]
    fn test_local_to_ecef_directions() {
        // at (0°, 0°): north → +Z, east → +Y, down → -X
        let origin = GeodeticPosition::new(0.0, 0.0, 0.0);
        let north = local_to_ecef(&LocalCartesian::new(origin, 1.0, 0.0, 0.0), true);
        let east = local_to_ecef(&LocalCartesian::new(origin, 0.0, 1.0, 0.0), true);
        let down = local_to_ecef(&LocalCartesian::new(origin, 0.0, 0.0, 1.0), true);
        assert_vec_eq(&north.0, &Vector3::z(), 1e-15);
        assert_vec_eq(&east.0, &Vector3::y(), 1e-15);
        assert_vec_eq(&down.0, &-Vector3::x(), 1e-15);
    }

    #[test]
    fn test_local_to_ecef_origin_translation() {
        let origin = GeodeticPosition::new(35.0 * RADEG, 200.0 * RADEG, 120.0);
        let at_origin = local_to_ecef(&LocalCartesian::new(origin, 0.0, 0.0, 0.0), false);
        assert_vec_eq(&at_origin.0, &geodetic_to_ecef(&origin).0, 1e-6);

        // one meter down lowers the height by one meter
        let below = local_to_ecef(&LocalCartesian::new(origin, 0.0, 0.0, 1.0), false);
        let geo = ecef_to_geodetic(&below, DEFAULT_GEODETIC_MAX_ITERATIONS).unwrap();
        assert_relative_eq!(geo.height, 119.0, epsilon = 1e-6);
    }

    #[test]
    fn test_local_to_eci_preserves_norm() {
        let origin = GeodeticPosition::new(-12.0 * RADEG, 77.0 * RADEG, 500_000.0);
        let local = LocalCartesian::new(origin, 21_000.0, -3_000.0, 40_000.0);
        let eci = local_to_eci(&local, 2_459_300.25, true);
        assert_relative_eq!(eci.norm(), local.ned.norm(), epsilon = 1e-8);
    }
}
