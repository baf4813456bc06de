//! # SGP4 near-Earth orbit propagator
//!
//! Analytical propagation of a [`MeanElementRecord`] with the SGP4 theory (Hoots & Roehrich,
//! Spacetrack Report #3, in the revised form of Vallado et al., AIAA 2006-6753).
//!
//! ## Overview
//!
//! A [`Sgp4Propagator`] is a small state machine:
//!
//! ```text
//!  new() ──▶ Uninitialized ──initialize(record)──▶ Initialized ──propagate(Δt)──▶ CartesianState
//!                                   ▲                    │
//!                                   └── initialize() ────┘   (re-initialization resets everything)
//! ```
//!
//! * [`Sgp4Propagator::initialize`] un-Kozais the mean motion and derives the secular
//!   gravity and drag coefficients once. Orbits with a perigee below 220 km use the
//!   *simplified drag* branch, where the cubic-and-higher drag terms are dropped.
//! * [`Sgp4Propagator::propagate`] applies the secular and long-period updates, solves the
//!   Kepler equation for the eccentric longitude ([`solve_kepler_equation`]) and adds the
//!   short-period J2 corrections.
//!
//! Internally everything is expressed in Earth radii, minutes and radians; positions and
//! velocities are converted to kilometers (or meters) only on the way out.
//!
//! Only the near-Earth regime (period < 225 min) is supported. Deep-space element sets are
//! rejected at initialization with [`OrbitEnvError::DeepSpaceUnsupported`].
//!
//! ## See also
//! * [`crate::tle_reader::parse_tle`] – produces the [`MeanElementRecord`]
//! * [`gravity::GravityModel`] – selects the constant set
pub mod gravity;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{JulianDate, Minutes, DPI, KM_TO_M, MINUTES_PER_DAY},
    mean_elements::MeanElementRecord,
    orbit_env_errors::OrbitEnvError,
    ref_system::EciVector,
};

use self::gravity::{GravityConstants, GravityModel};

/// Orbital periods at or above this limit need the deep-space theory.
pub const DEEP_SPACE_PERIOD_MINUTES: Minutes = 225.0;

/// Divisor used instead of `1 + cos(i)` for inclinations within 1.5e-12 of 180°.
const INCLINATION_180_GUARD: f64 = 1.5e-12;

/// Failure kinds of a single propagation. No state is produced when one is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PropagationError {
    #[error("mean motion {mean_motion} rad/min is not positive at t = {minutes} min")]
    InvalidMeanMotion { mean_motion: f64, minutes: Minutes },
    #[error("eccentricity {eccentricity} left the interval [-0.001, 1) at t = {minutes} min")]
    InvalidEccentricity { eccentricity: f64, minutes: Minutes },
    #[error("semi-latus rectum {semi_latus_rectum} is negative at t = {minutes} min")]
    InvalidSemiLatusRectum {
        semi_latus_rectum: f64,
        minutes: Minutes,
    },
    #[error("satellite decayed, radius {radius} Earth radii at t = {minutes} min")]
    Decayed { radius: f64, minutes: Minutes },
}

/// Length unit of a [`CartesianState`]; the time unit is always the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    Kilometer,
    Meter,
}

/// Position and velocity in the ECI frame of the propagator (TEME).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianState {
    pub position: EciVector,
    pub velocity: EciVector,
    pub unit: LengthUnit,
}

impl CartesianState {
    /// Same state expressed in meters and meters per second.
    pub fn to_meters(&self) -> CartesianState {
        match self.unit {
            LengthUnit::Meter => *self,
            LengthUnit::Kilometer => CartesianState {
                position: self.position.scaled(KM_TO_M),
                velocity: self.velocity.scaled(KM_TO_M),
                unit: LengthUnit::Meter,
            },
        }
    }

    /// Same state expressed in kilometers and kilometers per second.
    pub fn to_kilometers(&self) -> CartesianState {
        match self.unit {
            LengthUnit::Kilometer => *self,
            LengthUnit::Meter => CartesianState {
                position: self.position.scaled(1.0 / KM_TO_M),
                velocity: self.velocity.scaled(1.0 / KM_TO_M),
                unit: LengthUnit::Kilometer,
            },
        }
    }
}

/// Solve the Kepler equation written for the eccentric longitude `E`:
///
/// `u = E - axnl · sin(E) + aynl · cos(E)`
///
/// Newton iterations start at `E = u`; each correction is clamped to ±0.95 rad and the loop
/// stops when the correction falls below 1e-12 or after 10 iterations.
///
/// Arguments
/// ---------
/// * `u`: mean longitude minus the node, radians
/// * `axnl`: `e · cos(ω)` (long-period corrected)
/// * `aynl`: `e · sin(ω)` (long-period corrected)
///
/// Return
/// ------
/// * the eccentric longitude in radians and the number of iterations performed
pub fn solve_kepler_equation(u: f64, axnl: f64, aynl: f64) -> (f64, usize) {
    let mut eo1 = u;
    let mut tem5: f64 = 9999.9;
    let mut iterations = 0;

    while tem5.abs() >= 1.0e-12 && iterations < 10 {
        let (sineo1, coseo1) = eo1.sin_cos();
        tem5 = (u - aynl * coseo1 + axnl * sineo1 - eo1) / (1.0 - coseo1 * axnl - sineo1 * aynl);
        tem5 = tem5.clamp(-0.95, 0.95);
        eo1 += tem5;
        iterations += 1;
    }

    (eo1, iterations)
}

/// Quantities derived once at initialization (the `PropagatorState` coefficients).
#[derive(Debug, Clone, PartialEq)]
struct Sgp4Coefficients {
    /// un-Kozai'd mean motion, rad/min
    no: f64,
    is_simplified_drag: bool,
    aycof: f64,
    con41: f64,
    cc1: f64,
    cc4: f64,
    cc5: f64,
    d2: f64,
    d3: f64,
    d4: f64,
    delmo: f64,
    eta: f64,
    argpdot: f64,
    omgcof: f64,
    sinmao: f64,
    t2cof: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,
    x1mth2: f64,
    x7thm1: f64,
    mdot: f64,
    nodedot: f64,
    xlcof: f64,
    xmcof: f64,
    nodecf: f64,
}

impl Sgp4Coefficients {
    fn derive(record: &MeanElementRecord, gravity: &GravityConstants) -> Self {
        let radius = gravity.radius_earth_km;
        let (j2, j4, j3oj2, xke) = (gravity.j2, gravity.j4, gravity.j3oj2, gravity.xke);
        let x2o3 = 2.0 / 3.0;

        let ss = 78.0 / radius + 1.0;
        let qzms2t = ((120.0 - 78.0) / radius).powi(4);

        let ecco = record.eccentricity;
        let bstar = record.bstar;

        // auxiliary epoch quantities
        let eccsq = ecco * ecco;
        let omeosq = 1.0 - eccsq;
        let rteosq = omeosq.sqrt();
        let (sinio, cosio) = record.inclination.sin_cos();
        let cosio2 = cosio * cosio;

        // un-Kozai the mean motion
        let ak = (xke / record.mean_motion).powf(x2o3);
        let d1 = 0.75 * j2 * (3.0 * cosio2 - 1.0) / (rteosq * omeosq);
        let mut del = d1 / (ak * ak);
        let adel = ak * (1.0 - del * del - del * (1.0 / 3.0 + 134.0 * del * del / 81.0));
        del = d1 / (adel * adel);
        let no = record.mean_motion / (1.0 + del);

        let ao = (xke / no).powf(x2o3);
        let po = ao * omeosq;
        let con42 = 1.0 - 5.0 * cosio2;
        let con41 = -con42 - cosio2 - cosio2;
        let posq = po * po;
        let rp = ao * (1.0 - ecco);

        let is_simplified_drag = rp < 220.0 / radius + 1.0;

        // perigees below 156 km alter s and qoms2t
        let mut sfour = ss;
        let mut qzms24 = qzms2t;
        let perige = (rp - 1.0) * radius;
        if perige < 156.0 {
            sfour = if perige < 98.0 { 20.0 } else { perige - 78.0 };
            qzms24 = ((120.0 - sfour) / radius).powi(4);
            sfour = sfour / radius + 1.0;
        }

        let pinvsq = 1.0 / posq;
        let tsi = 1.0 / (ao - sfour);
        let eta = ao * ecco * tsi;
        let etasq = eta * eta;
        let eeta = ecco * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qzms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);

        let cc2 = coef1
            * no
            * (ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.375 * j2 * tsi / psisq * con41 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let cc1 = bstar * cc2;
        let cc3 = if ecco > 1.0e-4 {
            -2.0 * coef * tsi * j3oj2 * no * sinio / ecco
        } else {
            0.0
        };
        let x1mth2 = 1.0 - cosio2;
        let cc4 = 2.0
            * no
            * coef1
            * ao
            * omeosq
            * (eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
                - j2 * tsi / (ao * psisq)
                    * (-3.0 * con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75
                            * x1mth2
                            * (2.0 * etasq - eeta * (1.0 + etasq))
                            * (2.0 * record.arg_perigee).cos()));
        let cc5 = 2.0 * coef1 * ao * omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

        let cosio4 = cosio2 * cosio2;
        let temp1 = 1.5 * j2 * pinvsq * no;
        let temp2 = 0.5 * temp1 * j2 * pinvsq;
        let temp3 = -0.46875 * j4 * pinvsq * pinvsq * no;

        let mdot = no
            + 0.5 * temp1 * rteosq * con41
            + 0.0625 * temp2 * rteosq * (13.0 - 78.0 * cosio2 + 137.0 * cosio4);
        let argpdot = -0.5 * temp1 * con42
            + 0.0625 * temp2 * (7.0 - 114.0 * cosio2 + 395.0 * cosio4)
            + temp3 * (3.0 - 36.0 * cosio2 + 49.0 * cosio4);
        let xhdot1 = -temp1 * cosio;
        let nodedot = xhdot1
            + (0.5 * temp2 * (4.0 - 19.0 * cosio2) + 2.0 * temp3 * (3.0 - 7.0 * cosio2)) * cosio;

        let omgcof = bstar * cc3 * record.arg_perigee.cos();
        let xmcof = if ecco > 1.0e-4 {
            -x2o3 * coef * bstar / eeta
        } else {
            0.0
        };
        let nodecf = 3.5 * omeosq * xhdot1 * cc1;
        let t2cof = 1.5 * cc1;

        let xlcof_divisor = if (cosio + 1.0).abs() > INCLINATION_180_GUARD {
            1.0 + cosio
        } else {
            INCLINATION_180_GUARD
        };
        let xlcof = -0.25 * j3oj2 * sinio * (3.0 + 5.0 * cosio) / xlcof_divisor;
        let aycof = -0.5 * j3oj2 * sinio;
        let delmo = (1.0 + eta * record.mean_anomaly.cos()).powi(3);
        let sinmao = record.mean_anomaly.sin();
        let x7thm1 = 7.0 * cosio2 - 1.0;

        let (mut d2, mut d3, mut d4) = (0.0, 0.0, 0.0);
        let (mut t3cof, mut t4cof, mut t5cof) = (0.0, 0.0, 0.0);
        if !is_simplified_drag {
            let cc1sq = cc1 * cc1;
            d2 = 4.0 * ao * tsi * cc1sq;
            let temp = d2 * tsi * cc1 / 3.0;
            d3 = (17.0 * ao + sfour) * temp;
            d4 = 0.5 * temp * ao * tsi * (221.0 * ao + 31.0 * sfour) * cc1;
            t3cof = d2 + 2.0 * cc1sq;
            t4cof = 0.25 * (3.0 * d3 + cc1 * (12.0 * d2 + 10.0 * cc1sq));
            t5cof = 0.2
                * (3.0 * d4 + 12.0 * cc1 * d3 + 6.0 * d2 * d2 + 15.0 * cc1sq * (2.0 * d2 + cc1sq));
        }

        Sgp4Coefficients {
            no,
            is_simplified_drag,
            aycof,
            con41,
            cc1,
            cc4,
            cc5,
            d2,
            d3,
            d4,
            delmo,
            eta,
            argpdot,
            omgcof,
            sinmao,
            t2cof,
            t3cof,
            t4cof,
            t5cof,
            x1mth2,
            x7thm1,
            mdot,
            nodedot,
            xlcof,
            xmcof,
            nodecf,
        }
    }
}

/// Element record and derived coefficients of an initialized propagator.
#[derive(Debug, Clone, PartialEq)]
struct PropagatorState {
    record: MeanElementRecord,
    coefficients: Sgp4Coefficients,
}

/// SGP4 propagator for one satellite.
#[derive(Debug, Clone)]
pub struct Sgp4Propagator {
    gravity_model: GravityModel,
    gravity: GravityConstants,
    state: Option<PropagatorState>,
    elapsed_minutes: Minutes,
    last_error: Option<PropagationError>,
}

impl Default for Sgp4Propagator {
    fn default() -> Self {
        Sgp4Propagator::new(GravityModel::default())
    }
}

impl Sgp4Propagator {
    /// Create an uninitialized propagator using the given gravity constants.
    pub fn new(gravity_model: GravityModel) -> Self {
        Sgp4Propagator {
            gravity_model,
            gravity: gravity_model.constants(),
            state: None,
            elapsed_minutes: 0.0,
            last_error: None,
        }
    }

    /// Create a propagator and initialize it with `record`.
    pub fn from_record(
        record: &MeanElementRecord,
        gravity_model: GravityModel,
    ) -> Result<Self, OrbitEnvError> {
        let mut propagator = Sgp4Propagator::new(gravity_model);
        propagator.initialize(record)?;
        Ok(propagator)
    }

    /// Derive every secular coefficient from `record` and validate them with a propagation to
    /// the epoch.
    ///
    /// Arguments
    /// ---------
    /// * `record`: mean elements, see [`MeanElementRecord`] for units
    ///
    /// Return
    /// ------
    /// * `Ok(())` when the propagator is ready. On error the propagator is left uninitialized:
    ///     - [`OrbitEnvError::InvalidParameter`] for an eccentricity outside `[0, 1)` or a
    ///       non-positive mean motion,
    ///     - [`OrbitEnvError::DeepSpaceUnsupported`] for a period of 225 min or more,
    ///     - [`OrbitEnvError::Propagation`] when the epoch state itself cannot be computed.
    pub fn initialize(&mut self, record: &MeanElementRecord) -> Result<(), OrbitEnvError> {
        self.state = None;
        self.last_error = None;
        self.elapsed_minutes = 0.0;

        if !(0.0..1.0).contains(&record.eccentricity) {
            return Err(OrbitEnvError::InvalidParameter(format!(
                "eccentricity must be in [0, 1), got {}",
                record.eccentricity
            )));
        }
        if !(record.mean_motion > 0.0 && record.mean_motion.is_finite()) {
            return Err(OrbitEnvError::InvalidParameter(format!(
                "mean motion must be positive, got {}",
                record.mean_motion
            )));
        }

        let coefficients = Sgp4Coefficients::derive(record, &self.gravity);

        let period_minutes = DPI / coefficients.no;
        if period_minutes >= DEEP_SPACE_PERIOD_MINUTES {
            return Err(OrbitEnvError::DeepSpaceUnsupported { period_minutes });
        }

        let is_simplified_drag = coefficients.is_simplified_drag;
        self.state = Some(PropagatorState {
            record: record.clone(),
            coefficients,
        });

        if let Err(err) = self.propagate_km(0.0) {
            self.state = None;
            return Err(err);
        }

        log::info!(
            "SGP4 initialized for catalog {} ({:?}): period {:.3} min, simplified drag {}",
            record.catalog_number,
            self.gravity_model,
            period_minutes,
            is_simplified_drag
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn gravity_model(&self) -> GravityModel {
        self.gravity_model
    }

    /// Element record the propagator was initialized with.
    pub fn record(&self) -> Option<&MeanElementRecord> {
        self.state.as_ref().map(|s| &s.record)
    }

    /// Kind of the most recent propagation failure, `None` after a success.
    pub fn last_error(&self) -> Option<PropagationError> {
        self.last_error
    }

    /// Time offset of the most recent propagation, in minutes from the epoch.
    pub fn elapsed_minutes(&self) -> Minutes {
        self.elapsed_minutes
    }

    /// `true` for perigees below 220 km, where the higher-order drag terms are dropped.
    pub fn is_simplified_drag(&self) -> Result<bool, OrbitEnvError> {
        Ok(self.state()?.coefficients.is_simplified_drag)
    }

    /// Orbital period computed from the un-Kozai'd mean motion.
    pub fn period_minutes(&self) -> Result<Minutes, OrbitEnvError> {
        Ok(DPI / self.state()?.coefficients.no)
    }

    pub fn epoch_jd(&self) -> Result<JulianDate, OrbitEnvError> {
        Ok(self.state()?.record.epoch_jd)
    }

    fn state(&self) -> Result<&PropagatorState, OrbitEnvError> {
        self.state.as_ref().ok_or(OrbitEnvError::NotInitialized)
    }

    /// Position (m) and velocity (m/s) at `minutes` after the epoch.
    pub fn propagate(&mut self, minutes: Minutes) -> Result<CartesianState, OrbitEnvError> {
        Ok(self.propagate_km(minutes)?.to_meters())
    }

    /// Position and velocity at the given Julian Date, in meters and meters per second.
    pub fn propagate_to_jd(&mut self, jd: JulianDate) -> Result<CartesianState, OrbitEnvError> {
        let minutes = (jd - self.epoch_jd()?) * MINUTES_PER_DAY;
        self.propagate(minutes)
    }

    /// Position and velocity `days` after the epoch, in meters and meters per second.
    pub fn propagate_days(&mut self, days: f64) -> Result<CartesianState, OrbitEnvError> {
        self.propagate(days * MINUTES_PER_DAY)
    }

    /// Position (km) and velocity (km/s) at `minutes` after the epoch.
    ///
    /// The last used offset and the failure kind, if any, are recorded on the propagator.
    pub fn propagate_km(&mut self, minutes: Minutes) -> Result<CartesianState, OrbitEnvError> {
        let state = self.state.as_ref().ok_or(OrbitEnvError::NotInitialized)?;
        let result = sgp4(state, &self.gravity, minutes);

        self.elapsed_minutes = minutes;
        match result {
            Ok(cartesian) => {
                self.last_error = None;
                Ok(cartesian)
            }
            Err(err) => {
                log::warn!(
                    "SGP4 propagation of catalog {} failed: {err}",
                    state.record.catalog_number
                );
                self.last_error = Some(err);
                Err(err.into())
            }
        }
    }
}

/// One evaluation of the SGP4 theory at `tsince` minutes from the epoch.
fn sgp4(
    state: &PropagatorState,
    gravity: &GravityConstants,
    tsince: Minutes,
) -> Result<CartesianState, PropagationError> {
    let rec = &state.record;
    let c = &state.coefficients;
    let (xke, j2) = (gravity.xke, gravity.j2);
    let x2o3 = 2.0 / 3.0;

    // secular gravity and atmospheric drag
    let xmdf = rec.mean_anomaly + c.mdot * tsince;
    let argpdf = rec.arg_perigee + c.argpdot * tsince;
    let nodedf = rec.raan + c.nodedot * tsince;
    let mut argpm = argpdf;
    let mut mm = xmdf;
    let t2 = tsince * tsince;
    let mut nodem = nodedf + c.nodecf * t2;
    let mut tempa = 1.0 - c.cc1 * tsince;
    let mut tempe = rec.bstar * c.cc4 * tsince;
    let mut templ = c.t2cof * t2;

    if !c.is_simplified_drag {
        let delomg = c.omgcof * tsince;
        let delm = c.xmcof * ((1.0 + c.eta * xmdf.cos()).powi(3) - c.delmo);
        let temp = delomg + delm;
        mm = xmdf + temp;
        argpm = argpdf - temp;
        let t3 = t2 * tsince;
        let t4 = t3 * tsince;
        tempa = tempa - c.d2 * t2 - c.d3 * t3 - c.d4 * t4;
        tempe += rec.bstar * c.cc5 * (mm.sin() - c.sinmao);
        templ += c.t3cof * t3 + t4 * (c.t4cof + tsince * c.t5cof);
    }

    let mut nm = c.no;
    let mut em = rec.eccentricity;
    let inclm = rec.inclination;
    if nm <= 0.0 {
        return Err(PropagationError::InvalidMeanMotion {
            mean_motion: nm,
            minutes: tsince,
        });
    }

    let am = (xke / nm).powf(x2o3) * tempa * tempa;
    nm = xke / am.powf(1.5);
    em -= tempe;

    if !(-0.001..1.0).contains(&em) {
        return Err(PropagationError::InvalidEccentricity {
            eccentricity: em,
            minutes: tsince,
        });
    }
    em = em.max(1.0e-6);

    mm += c.no * templ;
    let mut xlm = mm + argpm + nodem;
    nodem %= DPI;
    argpm %= DPI;
    xlm %= DPI;
    mm = (xlm - argpm - nodem) % DPI;

    let (sinip, cosip) = inclm.sin_cos();

    // long-period periodics
    let axnl = em * argpm.cos();
    let temp = 1.0 / (am * (1.0 - em * em));
    let aynl = em * argpm.sin() + temp * c.aycof;
    let xl = mm + argpm + nodem + temp * c.xlcof * axnl;

    let u = (xl - nodem) % DPI;
    let (eo1, _) = solve_kepler_equation(u, axnl, aynl);
    let (sineo1, coseo1) = eo1.sin_cos();

    // short-period preliminary quantities
    let ecose = axnl * coseo1 + aynl * sineo1;
    let esine = axnl * sineo1 - aynl * coseo1;
    let el2 = axnl * axnl + aynl * aynl;
    let pl = am * (1.0 - el2);
    if pl < 0.0 {
        return Err(PropagationError::InvalidSemiLatusRectum {
            semi_latus_rectum: pl,
            minutes: tsince,
        });
    }

    let rl = am * (1.0 - ecose);
    let rdotl = am.sqrt() * esine / rl;
    let rvdotl = pl.sqrt() / rl;
    let betal = (1.0 - el2).sqrt();
    let temp = esine / (1.0 + betal);
    let sinu = am / rl * (sineo1 - aynl - axnl * temp);
    let cosu = am / rl * (coseo1 - axnl + aynl * temp);
    let mut su = sinu.atan2(cosu);
    let sin2u = (cosu + cosu) * sinu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;
    let temp = 1.0 / pl;
    let temp1 = 0.5 * j2 * temp;
    let temp2 = temp1 * temp;

    // short-period periodics
    let mrt = rl * (1.0 - 1.5 * temp2 * betal * c.con41) + 0.5 * temp1 * c.x1mth2 * cos2u;
    su -= 0.25 * temp2 * c.x7thm1 * sin2u;
    let xnode = nodem + 1.5 * temp2 * cosip * sin2u;
    let xinc = inclm + 1.5 * temp2 * cosip * sinip * cos2u;
    let mvt = rdotl - nm * temp1 * c.x1mth2 * sin2u / xke;
    let rvdot = rvdotl + nm * temp1 * (c.x1mth2 * cos2u + 1.5 * c.con41) / xke;

    if mrt < 1.0 {
        return Err(PropagationError::Decayed {
            radius: mrt,
            minutes: tsince,
        });
    }

    // orientation vectors
    let (sinsu, cossu) = su.sin_cos();
    let (snod, cnod) = xnode.sin_cos();
    let (sini, cosi) = xinc.sin_cos();
    let xmx = -snod * cosi;
    let xmy = cnod * cosi;
    let u_vec = Vector3::new(xmx * sinsu + cnod * cossu, xmy * sinsu + snod * cossu, sini * sinsu);
    let v_vec = Vector3::new(xmx * cossu - cnod * sinsu, xmy * cossu - snod * sinsu, sini * cossu);

    Ok(CartesianState {
        position: EciVector(u_vec * (mrt * gravity.radius_earth_km)),
        velocity: EciVector((u_vec * mvt + v_vec * rvdot) * gravity.vkmpersec()),
        unit: LengthUnit::Kilometer,
    })
}
