//! # Constants and type definitions for orbit-env
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the crate: the propagator, the geomagnetic field model, the Sun
//! model and the coordinate-frame utilities all read their reference values from here.
//!
//! ## Overview
//!
//! - Angular and time-unit conversions (degrees ↔ radians, days ↔ minutes)
//! - Julian Date reference epochs
//! - WGS-84 reference ellipsoid
//! - Solar-system radii used by the eclipse test
//! - Unit type aliases (documentation only, they are plain `f64`)

// -------------------------------------------------------------------------------------------------
// Mathematical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Number of minutes in a Julian day
pub const MINUTES_PER_DAY: f64 = 1_440.0;

/// Kilometers → meters
pub const KM_TO_M: f64 = 1_000.0;

/// Meters → kilometers
pub const M_TO_KM: f64 = 1.0 / KM_TO_M;

// -------------------------------------------------------------------------------------------------
// Time reference epochs
// -------------------------------------------------------------------------------------------------

/// Julian Date of J2000.0 (2000-01-01 12:00:00)
pub const JD2000: f64 = 2_451_545.0;

/// Days in a Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Days in a Julian millennium
pub const DAYS_PER_JULIAN_MILLENNIUM: f64 = 365_250.0;

// -------------------------------------------------------------------------------------------------
// Earth and Sun
// -------------------------------------------------------------------------------------------------

/// Earth equatorial radius in meters (WGS-84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Inverse flattening of the WGS-84 ellipsoid
pub const WGS84_INV_FLATTENING: f64 = 298.257_223_563;

/// Flattening of the WGS-84 ellipsoid
pub const WGS84_FLATTENING: f64 = 1.0 / WGS84_INV_FLATTENING;

/// First eccentricity squared of the WGS-84 ellipsoid
pub const WGS84_E2: f64 = 2.0 * WGS84_FLATTENING - WGS84_FLATTENING * WGS84_FLATTENING;

/// Earth equatorial radius in kilometers, used by the eclipse geometry
pub const EARTH_RADIUS_KM: f64 = 6_378.137;

/// Photospheric radius of the Sun in kilometers
pub const SUN_RADIUS_KM: f64 = 696_342.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Julian Date (days since noon, 1 January 4713 BC)
pub type JulianDate = f64;
/// Magnetic flux density in nanotesla
pub type NanoTesla = f64;
/// Time offset in minutes
pub type Minutes = f64;
