//! # Mean element record
//!
//! [`MeanElementRecord`] is the immutable snapshot of one orbital state as published in a
//! two-line element set, with every quantity already normalized to the units consumed by the
//! SGP4 propagator:
//!
//! | Field | Unit |
//! |---|---|
//! | angles (`inclination`, `raan`, `arg_perigee`, `mean_anomaly`) | radians |
//! | `mean_motion` | radians / minute (Kozai mean motion) |
//! | `ndot` | radians / minute² |
//! | `nddot` | radians / minute³ |
//! | `bstar` | 1 / Earth radii |
//! | `epoch_jd` | Julian Date |
//!
//! Records are produced by [`crate::tle_reader::parse_tle`] or assembled directly with
//! [`MeanElementRecord::new`] for synthetic orbits.
use serde::{Deserialize, Serialize};

use crate::constants::{JulianDate, Minutes, Radian, DPI, MINUTES_PER_DAY};

/// Mean orbital elements of one satellite at one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanElementRecord {
    /// NORAD catalog number
    pub catalog_number: u32,
    /// Security classification character (`U`, `C`, `S`)
    pub classification: char,
    /// International designator (launch year, launch number, piece)
    pub international_designator: String,
    /// Four-digit epoch year
    pub epoch_year: i32,
    /// Fractional day of the year of the epoch (1 January 00:00 is `1.0`)
    pub epoch_day_of_year: f64,
    /// Epoch as a Julian Date
    pub epoch_jd: JulianDate,
    /// First time derivative of the mean motion divided by two
    pub ndot: f64,
    /// Second time derivative of the mean motion divided by six
    pub nddot: f64,
    /// Drag term
    pub bstar: f64,
    pub inclination: Radian,
    /// Right ascension of the ascending node
    pub raan: Radian,
    pub eccentricity: f64,
    pub arg_perigee: Radian,
    pub mean_anomaly: Radian,
    /// Kozai mean motion
    pub mean_motion: f64,
    pub element_number: u32,
    pub revolution_number: u32,
}

impl MeanElementRecord {
    /// Build a record from already normalized elements.
    ///
    /// Arguments
    /// ---------
    /// * `catalog_number`: satellite number
    /// * `epoch_jd`: epoch of the elements
    /// * `eccentricity`: `[0, 1)`
    /// * `inclination`, `raan`, `arg_perigee`, `mean_anomaly`: radians
    /// * `mean_motion`: Kozai mean motion in radians per minute
    /// * `bstar`: drag term
    ///
    /// Return
    /// ------
    /// * a record with zero mean-motion derivatives and an empty designator
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog_number: u32,
        epoch_jd: JulianDate,
        eccentricity: f64,
        inclination: Radian,
        raan: Radian,
        arg_perigee: Radian,
        mean_anomaly: Radian,
        mean_motion: f64,
        bstar: f64,
    ) -> Self {
        let (epoch_year, epoch_day_of_year) = crate::time::jd_to_year_day(epoch_jd);
        MeanElementRecord {
            catalog_number,
            classification: 'U',
            international_designator: String::new(),
            epoch_year,
            epoch_day_of_year,
            epoch_jd,
            ndot: 0.0,
            nddot: 0.0,
            bstar,
            inclination,
            raan,
            eccentricity,
            arg_perigee,
            mean_anomaly,
            mean_motion,
            element_number: 0,
            revolution_number: 0,
        }
    }

    /// Mean motion in revolutions per day, as printed in an element set.
    pub fn revolutions_per_day(&self) -> f64 {
        self.mean_motion * MINUTES_PER_DAY / DPI
    }

    /// Orbital period from the Kozai mean motion.
    pub fn period_minutes(&self) -> Minutes {
        DPI / self.mean_motion
    }

    /// Convert a mean motion in revolutions per day into radians per minute.
    pub fn rev_per_day_to_rad_per_min(revolutions_per_day: f64) -> f64 {
        revolutions_per_day * DPI / MINUTES_PER_DAY
    }
}
