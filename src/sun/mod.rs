//! # Solar position and eclipse
//!
//! Two interchangeable geocentric Sun models sharing one entry point, [`SunModel::sun_position`]:
//!
//! * [`SunPrecision::Low`]: Vallado's almanac formula (mean longitude, mean anomaly, ecliptic
//!   longitude), about 0.01° over 1950–2050.
//! * [`SunPrecision::High`]: the truncated VSOP87 Earth series of Meeus, rotated from the
//!   heliocentric ecliptic to the geocentric equator with the mean obliquity of date.
//!
//! Each model keeps its own last `(jd, position)` pair, so alternating between the two modes at
//! the same date does not recompute either one.
//!
//! Positions are returned in meters. The eclipse test works in kilometers internally.
pub mod vsop_series;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::constants::{
    JulianDate, AU, DAYS_PER_JULIAN_CENTURY, DAYS_PER_JULIAN_MILLENNIUM, DPI, EARTH_RADIUS_KM,
    JD2000, KM_TO_M, M_TO_KM, RADEG, SUN_RADIUS_KM,
};
use crate::ref_system::{mean_obliquity, EciVector};

use vsop_series::{evaluate_series, EARTH_LATITUDE, EARTH_LONGITUDE, EARTH_RADIUS_VECTOR};

/// Which Sun model answers [`SunModel::sun_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SunPrecision {
    #[default]
    Low,
    High,
}

/// Illumination of a satellite by the Sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EclipseState {
    Sunlit,
    /// Sun partially hidden by the Earth
    Penumbra,
    /// Sun fully hidden by the Earth
    Umbra,
}

impl EclipseState {
    /// `true` in umbra and penumbra.
    pub fn is_eclipsed(&self) -> bool {
        !matches!(self, EclipseState::Sunlit)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SunModel {
    precision: SunPrecision,
    low_cache: Option<(JulianDate, EciVector)>,
    high_cache: Option<(JulianDate, EciVector)>,
}

impl SunModel {
    pub fn new(precision: SunPrecision) -> Self {
        SunModel {
            precision,
            ..Default::default()
        }
    }

    pub fn set_precision(&mut self, precision: SunPrecision) {
        self.precision = precision;
    }

    pub fn precision(&self) -> SunPrecision {
        self.precision
    }

    /// Geocentric position of the Sun in ECI, meters, with the selected model.
    pub fn sun_position(&mut self, jd: JulianDate) -> EciVector {
        match self.precision {
            SunPrecision::Low => self.sun_position_low(jd),
            SunPrecision::High => self.sun_position_high(jd),
        }
    }

    /// Low precision Sun position (Vallado 2013, algorithm 29), meters.
    pub fn sun_position_low(&mut self, jd: JulianDate) -> EciVector {
        if let Some((cached_jd, position)) = self.low_cache {
            if cached_jd == jd {
                trace!("low precision sun position reused at jd {jd}");
                return position;
            }
        }

        let t = (jd - JD2000) / DAYS_PER_JULIAN_CENTURY;

        // degrees
        let mean_longitude = (280.460 + 36_000.77 * t) % 360.0;
        let mean_anomaly = ((357.527_723_3 + 35_999.050_34 * t) * RADEG).rem_euclid(DPI);
        let ecliptic_longitude = (mean_longitude
            + 1.914_666_471 * mean_anomaly.sin()
            + 0.019_994_643 * (2.0 * mean_anomaly).sin())
            * RADEG;
        let obliquity = (23.439_291 - 0.013_004_2 * t) * RADEG;

        let distance_km = (1.000_140_612
            - 0.016_708_617 * mean_anomaly.cos()
            - 0.000_139_589 * (2.0 * mean_anomaly).cos())
            * AU;

        let (sin_l, cos_l) = ecliptic_longitude.sin_cos();
        let position = EciVector::new(
            distance_km * cos_l,
            distance_km * obliquity.cos() * sin_l,
            distance_km * obliquity.sin() * sin_l,
        )
        .scaled(KM_TO_M);

        self.low_cache = Some((jd, position));
        position
    }

    /// High precision Sun position (Meeus, *Astronomical Algorithms*, ch. 25 and 32), meters.
    pub fn sun_position_high(&mut self, jd: JulianDate) -> EciVector {
        if let Some((cached_jd, position)) = self.high_cache {
            if cached_jd == jd {
                trace!("high precision sun position reused at jd {jd}");
                return position;
            }
        }

        let tau = (jd - JD2000) / DAYS_PER_JULIAN_MILLENNIUM;

        let longitude = evaluate_series(&EARTH_LONGITUDE, tau);
        let latitude = evaluate_series(&EARTH_LATITUDE, tau);
        let distance_km = evaluate_series(&EARTH_RADIUS_VECTOR, tau) * AU;

        // heliocentric Earth -> geocentric Sun
        let phi = longitude + std::f64::consts::PI;
        let beta = -latitude;
        let epsilon = mean_obliquity(jd);

        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_beta, cos_beta) = beta.sin_cos();
        let (sin_eps, cos_eps) = epsilon.sin_cos();
        let position = EciVector::new(
            distance_km * cos_beta * cos_phi,
            distance_km * (cos_beta * sin_phi * cos_eps - sin_beta * sin_eps),
            distance_km * (cos_beta * sin_phi * sin_eps + sin_beta * cos_eps),
        )
        .scaled(KM_TO_M);

        self.high_cache = Some((jd, position));
        position
    }

    /// Conical shadow test of the Earth seen from the satellite.
    ///
    /// The angle between the satellite→Sun and satellite→Earth directions is compared with the
    /// apparent radii of both bodies. Atmospheric refraction is ignored.
    ///
    /// Arguments
    /// ---------
    /// * `jd`: Julian Date
    /// * `satellite`: satellite ECI position, meters
    ///
    /// Return
    /// ------
    /// * the [`EclipseState`] of the satellite
    pub fn eclipse_state(&mut self, jd: JulianDate, satellite: &EciVector) -> EclipseState {
        let sun_km = self.sun_position(jd).scaled(M_TO_KM).0;
        let sat_km = satellite.scaled(M_TO_KM).0;

        let sat_to_sun = sun_km - sat_km;
        let sat_to_earth = -sat_km;
        let angle = sat_to_sun.angle(&sat_to_earth);

        let sun_radius = (SUN_RADIUS_KM / sat_to_sun.norm()).asin();
        let earth_radius = (EARTH_RADIUS_KM / sat_to_earth.norm()).min(1.0).asin();

        if angle - earth_radius + sun_radius < 0.0 {
            EclipseState::Umbra
        } else if angle - earth_radius - sun_radius < 0.0 {
            EclipseState::Penumbra
        } else {
            EclipseState::Sunlit
        }
    }

    /// Unit vector from the satellite toward the Sun, ECI.
    pub fn sun_vector_eci(&mut self, jd: JulianDate, satellite: &EciVector) -> EciVector {
        EciVector((self.sun_position(jd).0 - satellite.0).normalize())
    }
}
