//! # Time conversions
//!
//! Pure conversions between the **Julian Date** used as the universal time argument of the
//! crate and the calendar, day-of-year, decimal-year and sidereal representations needed by
//! the individual models.
//!
//! Calendar arithmetic goes through [`hifitime::Epoch`] in the UTC time scale, so the full
//! Gregorian leap-year rule applies. Julian Dates are UTC Julian days without leap seconds,
//! which is the convention of the element sets.
use hifitime::{Epoch, TimeScale, Unit};

use crate::{
    constants::{JulianDate, Radian, DAYS_PER_JULIAN_CENTURY, DPI, JD2000, RADEG},
    orbit_env_errors::OrbitEnvError,
};

/// Broken-down calendar instant (UTC, no leap seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        CalendarDate {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Julian Date of this instant, see [`date_to_jd`].
    pub fn to_jd(&self) -> Result<JulianDate, OrbitEnvError> {
        Ok(self.to_epoch()?.to_jde_utc_days())
    }

    fn to_epoch(&self) -> Result<Epoch, OrbitEnvError> {
        let invalid = || {
            OrbitEnvError::InvalidParameter(format!(
                "invalid calendar date {}-{:02}-{:02} {:02}:{:02}:{}",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            ))
        };
        let field = |value: u32| u8::try_from(value).map_err(|_| invalid());

        if !self.second.is_finite() {
            return Err(invalid());
        }

        let start_of_minute = Epoch::maybe_from_gregorian(
            self.year,
            field(self.month)?,
            field(self.day)?,
            field(self.hour)?,
            field(self.minute)?,
            0,
            0,
            TimeScale::UTC,
        )
        .map_err(|_| invalid())?;

        Ok(start_of_minute + self.second * Unit::Second)
    }

    fn from_epoch(epoch: &Epoch) -> Self {
        let (year, month, day, hour, minute, second, nanos) = epoch.to_gregorian_utc();
        CalendarDate {
            year,
            month: month.into(),
            day: day.into(),
            hour: hour.into(),
            minute: minute.into(),
            second: f64::from(second) + f64::from(nanos) * 1e-9,
        }
    }
}

/// Julian Date from a calendar date and time of day.
///
/// Arguments
/// ---------
/// * `year`: Gregorian year
/// * `month`: 1 ..= 12
/// * `day`: 1 ..= length of the month
/// * `hour`, `minute`: time of day
/// * `second`: seconds of the minute, fractional; values past 60 carry into the next minutes
///
/// Return
/// ------
/// * the Julian Date, including the day fraction, or `InvalidParameter` for a date that does
///   not exist
pub fn date_to_jd(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
) -> Result<JulianDate, OrbitEnvError> {
    CalendarDate::new(year, month, day, hour, minute, second).to_jd()
}

/// Convert a day of the year (1-based, fractional) to month, day, hour, minute and second.
///
/// Arguments
/// ---------
/// * `year`: calendar year
/// * `days`: day of the year including the fraction of the day, `1.0 ..= 366.999…`
pub fn days_to_mdhms(year: i32, days: f64) -> CalendarDate {
    CalendarDate::from_epoch(&Epoch::from_day_of_year(year, days, TimeScale::UTC))
}

/// Julian Date of a fractional day of the year, as written in an element set epoch.
pub fn day_of_year_to_jd(year: i32, days: f64) -> JulianDate {
    Epoch::from_day_of_year(year, days, TimeScale::UTC).to_jde_utc_days()
}

/// Fractional day of the year of a calendar date (1 January 00:00 is `1.0`).
pub fn find_days(date: &CalendarDate) -> Result<f64, OrbitEnvError> {
    Ok(date.to_epoch()?.day_of_year())
}

/// Calendar date of a Julian Date (inverse of [`date_to_jd`]).
pub fn jd_to_date(jd: JulianDate) -> CalendarDate {
    CalendarDate::from_epoch(&Epoch::from_jde_utc(jd))
}

/// Year and fractional day of the year of a Julian Date.
pub fn jd_to_year_day(jd: JulianDate) -> (i32, f64) {
    Epoch::from_jde_utc(jd).year_days_of_year()
}

fn days_in_year(year: i32) -> f64 {
    let start = Epoch::from_day_of_year(year, 1.0, TimeScale::UTC);
    let next = Epoch::from_day_of_year(year + 1, 1.0, TimeScale::UTC);
    (next - start).to_unit(Unit::Day)
}

/// Decimal year of a Julian Date (e.g. `2020.5`), as consumed by the geomagnetic model.
///
/// 1 January 00:00 maps onto the integer year.
pub fn jd_to_year(jd: JulianDate) -> f64 {
    let (year, day_of_year) = jd_to_year_day(jd);
    year as f64 + (day_of_year - 1.0) / days_in_year(year)
}

/// Compute the Greenwich Mean Sidereal Time (IAU-82) in radians for a Julian Date (UT1).
///
/// # Arguments
/// * `jd` - Julian Date, UT1 time scale
///
/// # Returns
/// * GMST angle in radians, normalized to the interval [0, 2π).
///
/// # Details
/// The polynomial gives the sidereal time in seconds of time; one second of time is
/// 1/240 degree.
pub fn gmst(jd: JulianDate) -> Radian {
    let tut1 = (jd - JD2000) / DAYS_PER_JULIAN_CENTURY;

    let seconds = -6.2e-6 * tut1 * tut1 * tut1
        + 0.093104 * tut1 * tut1
        + (876_600.0 * 3600.0 + 8_640_184.812866) * tut1
        + 67_310.54841;

    (seconds * RADEG / 240.0).rem_euclid(DPI)
}

/// Days elapsed since J2000.0.
pub fn jd_to_j2000(jd: JulianDate) -> f64 {
    jd - JD2000
}

/// Julian Date from days elapsed since J2000.0.
pub fn j2000_to_jd(days: f64) -> JulianDate {
    days + JD2000
}

/// Julian Date of a spacecraft clock reading in nanoseconds since J2000.0.
pub fn clock_ns_to_jd(nanoseconds: i64) -> JulianDate {
    nanoseconds as f64 / (86_400.0 * 1e9) + JD2000
}

/// Julian Date (UTC) of a [`hifitime::Epoch`].
pub fn jd_from_epoch(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_utc_days()
}

/// [`hifitime::Epoch`] of a Julian Date interpreted in UTC.
pub fn epoch_from_jd(jd: JulianDate) -> Epoch {
    Epoch::from_jde_utc(jd)
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_date_to_jd() {
        assert_relative_eq!(date_to_jd(2000, 1, 1, 12, 0, 0.0).unwrap(), 2_451_545.0, epsilon = 1e-9);
        assert_relative_eq!(date_to_jd(2000, 1, 1, 0, 0, 0.0).unwrap(), 2_451_544.5, epsilon = 1e-9);
        assert_relative_eq!(date_to_jd(2021, 1, 1, 0, 0, 0.0).unwrap(), 2_459_215.5, epsilon = 1e-9);
    }

    #[test]
    fn test_date_to_jd_outside_twentieth_and_twenty_first_centuries() {
        // 2100 and 1900 are not leap years, 2000 is
        assert_relative_eq!(date_to_jd(2100, 3, 1, 0, 0, 0.0).unwrap(), 2_488_128.5, epsilon = 1e-9);
        assert_relative_eq!(date_to_jd(1900, 3, 1, 0, 0, 0.0).unwrap(), 2_415_079.5, epsilon = 1e-9);
        assert_relative_eq!(
            date_to_jd(2100, 3, 1, 0, 0, 0.0).unwrap() - date_to_jd(2100, 2, 28, 0, 0, 0.0).unwrap(),
            1.0,
            epsilon = 1e-9
        );

        let date = jd_to_date(2_488_128.5);
        assert_eq!((date.year, date.month, date.day, date.hour), (2100, 3, 1, 0));

        let date = jd_to_date(2_488_127.75);
        assert_eq!((date.year, date.month, date.day, date.hour), (2100, 2, 28, 6));

        assert_relative_eq!(
            jd_to_year(date_to_jd(2100, 12, 31, 12, 0, 0.0).unwrap()),
            2100.0 + 364.5 / 365.0,
            epsilon = 1e-9
        );

        // 1 March is day 60 outside leap years
        let date = days_to_mdhms(2100, 60.25);
        assert_eq!((date.month, date.day, date.hour), (3, 1, 6));
    }

    #[test]
    fn test_invalid_dates() {
        assert!(matches!(
            date_to_jd(2100, 2, 29, 0, 0, 0.0),
            Err(OrbitEnvError::InvalidParameter(_))
        ));
        assert!(date_to_jd(2021, 13, 1, 0, 0, 0.0).is_err());
        assert!(date_to_jd(2021, 1, 1, 300, 0, 0.0).is_err());
        assert!(date_to_jd(2021, 1, 1, 0, 0, f64::NAN).is_err());
        assert!(find_days(&CalendarDate::new(2021, 4, 31, 0, 0, 0.0)).is_err());
    }

    #[test]
    fn test_jd_to_date() {
        let date = jd_to_date(2_451_545.0);
        assert_eq!((date.year, date.month, date.day), (2000, 1, 1));
        assert_eq!((date.hour, date.minute), (12, 0));
        assert_relative_eq!(date.second, 0.0, epsilon = 1e-6);

        let date = jd_to_date(2_451_544.25);
        assert_eq!((date.year, date.month, date.day), (1999, 12, 31));
        assert_eq!(date.hour, 18);
    }

    #[test]
    fn test_jd_date_round_trip() {
        let date = CalendarDate::new(2021, 7, 19, 5, 43, 12.5);
        let back = jd_to_date(date.to_jd().unwrap());
        assert_eq!(
            (back.year, back.month, back.day, back.hour, back.minute),
            (2021, 7, 19, 5, 43)
        );
        assert_relative_eq!(back.second, 12.5, epsilon = 1e-4);
    }

    #[test]
    fn test_days_to_mdhms() {
        let date = days_to_mdhms(2021, 14.31054398);
        assert_eq!((date.month, date.day, date.hour, date.minute), (1, 14, 7, 27));

        // 1 March in a leap year is day 61
        let date = days_to_mdhms(2020, 61.5);
        assert_eq!((date.month, date.day, date.hour), (3, 1, 12));

        let date = days_to_mdhms(2021, 365.0);
        assert_eq!((date.month, date.day), (12, 31));
    }

    #[test]
    fn test_find_days() {
        let date = CalendarDate::new(2020, 3, 1, 12, 0, 0.0);
        assert_relative_eq!(find_days(&date).unwrap(), 61.5, epsilon = 1e-9);

        let date = CalendarDate::new(2021, 1, 14, 7, 27, 11.0);
        let (year, days) = jd_to_year_day(date.to_jd().unwrap());
        assert_eq!(year, 2021);
        assert_relative_eq!(days, find_days(&date).unwrap(), epsilon = 1e-8);
    }

    #[test]
    fn test_jd_to_year() {
        assert_relative_eq!(jd_to_year(date_to_jd(2020, 1, 1, 0, 0, 0.0).unwrap()), 2020.0, epsilon = 1e-9);
        // 2020 is a leap year: 1 July is day 183
        assert_relative_eq!(
            jd_to_year(date_to_jd(2020, 7, 1, 0, 0, 0.0).unwrap()),
            2020.0 + 182.0 / 366.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_gmst() {
        assert_relative_eq!(gmst(JD2000), 280.46061837_f64.to_radians(), epsilon = 1e-10);

        // Vallado, example 3-5
        let jd = date_to_jd(1992, 8, 20, 12, 14, 0.0).unwrap();
        assert_relative_eq!(gmst(jd), 152.578787886_f64.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn test_gmst_range() {
        for k in 0..100 {
            let theta = gmst(JD2000 + k as f64 * 0.37);
            assert!((0.0..DPI).contains(&theta));
        }
    }

    #[test]
    fn test_clock_ns_to_jd() {
        assert_eq!(clock_ns_to_jd(0), JD2000);
        assert_eq!(clock_ns_to_jd(86_400_000_000_000), JD2000 + 1.0);
        assert_relative_eq!(jd_to_j2000(j2000_to_jd(12.25)), 12.25);
    }

    #[test]
    fn test_epoch_round_trip() {
        let epoch = Epoch::from_gregorian_utc(2021, 1, 14, 7, 27, 11, 0);
        let jd = jd_from_epoch(&epoch);
        assert_relative_eq!(jd, date_to_jd(2021, 1, 14, 7, 27, 11.0).unwrap(), epsilon = 1e-8);
        assert_relative_eq!(jd_from_epoch(&epoch_from_jd(jd)), jd, epsilon = 1e-9);
    }
}
