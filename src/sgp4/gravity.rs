//! Earth gravity constant sets for SGP4.
use serde::{Deserialize, Serialize};

/// Geopotential model used by the propagator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GravityModel {
    /// WGS-84 / EGM-96 constants
    #[default]
    Wgs84,
    /// WGS-72 constants, the set most element-set producers fit against
    Wgs72,
}

/// Constants in the normalized units of SGP4 (Earth radii, minutes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityConstants {
    /// Gravitational parameter, km³/s²
    pub mu: f64,
    /// Equatorial radius, km
    pub radius_earth_km: f64,
    /// sqrt(GM) in Earth radii^1.5 / minute
    pub xke: f64,
    /// Minutes per time unit
    pub tumin: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j3oj2: f64,
}

impl GravityConstants {
    fn from_raw(mu: f64, radius_earth_km: f64, j2: f64, j3: f64, j4: f64) -> Self {
        let xke = 60.0 / (radius_earth_km.powi(3) / mu).sqrt();
        GravityConstants {
            mu,
            radius_earth_km,
            xke,
            tumin: 1.0 / xke,
            j2,
            j3,
            j4,
            j3oj2: j3 / j2,
        }
    }

    /// Velocity unit of the normalized state, km/s.
    pub fn vkmpersec(&self) -> f64 {
        self.radius_earth_km * self.xke / 60.0
    }
}

impl GravityModel {
    pub fn constants(&self) -> GravityConstants {
        match self {
            GravityModel::Wgs84 => GravityConstants::from_raw(
                398_600.5,
                6378.137,
                0.001_082_629_989_05,
                -0.000_002_532_153_06,
                -0.000_001_610_987_61,
            ),
            GravityModel::Wgs72 => GravityConstants::from_raw(
                398_600.8,
                6378.135,
                0.001_082_616,
                -0.000_002_538_81,
                -0.000_001_655_97,
            ),
        }
    }
}
