//! # Geomagnetic field model
//!
//! Spherical-harmonic evaluation of a World Magnetic Model style main field.
//!
//! The Gauss coefficients are Schmidt semi-normalized once, when the model is built. Each
//! evaluation then:
//!
//! 1. converts the geodetic position to spherical coordinates on the WGS-84 ellipsoid,
//! 2. runs the associated Legendre recursion and its latitude derivative up to the model degree,
//! 3. applies the secular variation `coefficient(t) = base + (t - epoch) × rate`,
//! 4. sums the radial, colatitudinal and azimuthal components over every `(n, m)` term,
//! 5. rotates the sum back onto the local geodetic North/East/Down axes.
//!
//! At the geographic poles the azimuthal term is a `0/0` limit; a dedicated recurrence on the
//! `m = 1` terms replaces the division there.
//!
//! ## Memoization
//!
//! The model owns a [`FieldEvaluationCache`]. Its three tables are keyed by the subset of inputs
//! they depend on and rebuilt only when that subset changes:
//!
//! | table | key |
//! |---|---|
//! | spherical coordinates, Legendre functions | altitude, latitude |
//! | `sin(mλ)`, `cos(mλ)` | longitude |
//! | time-adjusted coefficients | decimal year |
//!
//! Results are bit-identical whether a table comes from the cache or is rebuilt.
//!
//! ## Example
//!
//! ```rust
//! use orbit_env::geomag::GeomagneticModel;
//!
//! let mut model = GeomagneticModel::wmm2020();
//! let field = model.evaluate(0.0, 80.0, 0.0, 2020.0);
//! assert!((field.declination - -1.28).abs() < 0.01);
//! ```
pub mod wmm_coefficients;

use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, JulianDate, Kilometer, NanoTesla, M_TO_KM, RADEG};
use crate::orbit_env_errors::OrbitEnvError;
use crate::ref_system::{
    eci_to_geodetic, local_to_eci, EciVector, GeodeticPosition, LocalCartesian,
    DEFAULT_GEODETIC_MAX_ITERATIONS,
};
use crate::time::jd_to_year;

use wmm_coefficients::{GaussRow, WMM2020_COEFFICIENTS, WMM2020_EPOCH, WMM2020_NAME, WMM_MAX_DEGREE};

const TABLE_SIZE: usize = WMM_MAX_DEGREE + 1;

type Table = [[f64; TABLE_SIZE]; TABLE_SIZE];

/// WGS-84 semi-major axis, km
const ELLIPSOID_A: Kilometer = 6378.137;
/// WGS-84 semi-minor axis, km
const ELLIPSOID_B: Kilometer = 6356.752_314_2;
/// Geomagnetic reference radius, km
const REFERENCE_RADIUS: Kilometer = 6371.2;

/// Latitude above which the grid variation is reported, degrees.
const GRID_VARIATION_LATITUDE: Degree = 55.0;

/// Default span after the model epoch in which the coefficients are trusted, years.
pub const DEFAULT_VALIDITY_YEARS: f64 = 5.0;

/// Output of one field evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagneticFieldReading {
    /// Angle from true north to the horizontal field, degrees, positive east
    pub declination: Degree,
    /// Dip angle below the horizontal plane, degrees, positive down
    pub inclination: Degree,
    pub total_intensity: NanoTesla,
    pub horizontal: NanoTesla,
    pub north: NanoTesla,
    pub east: NanoTesla,
    pub down: NanoTesla,
    /// Declination referred to grid north, only above 55° of latitude
    pub grid_variation: Option<Degree>,
}

#[derive(Debug, Clone)]
struct SphericalTerms {
    key: Option<(Kilometer, Degree)>,
    /// cosine and sine of the geocentric colatitude
    ct: f64,
    st: f64,
    /// rotation from geocentric to geodetic latitude
    ca: f64,
    sa: f64,
    /// geocentric radius, km
    r: f64,
    p: Table,
    dp: Table,
}

#[derive(Debug, Clone)]
struct LongitudeTerms {
    key: Option<Degree>,
    sp: [f64; TABLE_SIZE],
    cp: [f64; TABLE_SIZE],
}

#[derive(Debug, Clone)]
struct SecularTerms {
    key: Option<f64>,
    tc: Table,
}

/// Tables reused between evaluations, each keyed by the inputs it was built from.
#[derive(Debug, Clone)]
pub struct FieldEvaluationCache {
    spherical: SphericalTerms,
    longitude: LongitudeTerms,
    secular: SecularTerms,
}

impl Default for FieldEvaluationCache {
    fn default() -> Self {
        let mut p = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        p[0][0] = 1.0;
        FieldEvaluationCache {
            spherical: SphericalTerms {
                key: None,
                ct: 0.0,
                st: 0.0,
                ca: 0.0,
                sa: 0.0,
                r: 0.0,
                p,
                dp: [[0.0; TABLE_SIZE]; TABLE_SIZE],
            },
            longitude: LongitudeTerms {
                key: None,
                sp: [0.0; TABLE_SIZE],
                cp: [0.0; TABLE_SIZE],
            },
            secular: SecularTerms {
                key: None,
                tc: [[0.0; TABLE_SIZE]; TABLE_SIZE],
            },
        }
    }
}

impl FieldEvaluationCache {
    /// Drop every cached table.
    pub fn invalidate(&mut self) {
        *self = FieldEvaluationCache::default();
    }

    fn refresh_spherical(&mut self, alt: Kilometer, lat: Degree, model: &GeomagneticModel) {
        if self.spherical.key == Some((alt, lat)) {
            return;
        }
        let terms = &mut self.spherical;

        let a2 = ELLIPSOID_A * ELLIPSOID_A;
        let b2 = ELLIPSOID_B * ELLIPSOID_B;
        let c2 = a2 - b2;
        let a4 = a2 * a2;
        let c4 = a4 - b2 * b2;

        let (srlat, crlat) = (lat * RADEG).sin_cos();
        let srlat2 = srlat * srlat;
        let crlat2 = crlat * crlat;

        let q = (a2 - c2 * srlat2).sqrt();
        let q1 = alt * q;
        let q2 = ((q1 + a2) / (q1 + b2)).powi(2);
        terms.ct = srlat / (q2 * crlat2 + srlat2).sqrt();
        terms.st = (1.0 - terms.ct * terms.ct).sqrt();
        let r2 = alt * alt + 2.0 * q1 + (a4 - c4 * srlat2) / (q * q);
        terms.r = r2.sqrt();
        let d = (a2 * crlat2 + b2 * srlat2).sqrt();
        terms.ca = (alt + d) / terms.r;
        terms.sa = c2 * crlat * srlat / (terms.r * d);

        let (ct, st) = (terms.ct, terms.st);
        let (p, dp) = (&mut terms.p, &mut terms.dp);
        for n in 1..=model.max_degree {
            for m in 0..=n {
                if n == m {
                    p[m][n] = st * p[m - 1][n - 1];
                    dp[m][n] = st * dp[m - 1][n - 1] + ct * p[m - 1][n - 1];
                } else if n == 1 {
                    p[m][n] = ct * p[m][n - 1];
                    dp[m][n] = ct * dp[m][n - 1] - st * p[m][n - 1];
                } else {
                    if m + 2 > n {
                        p[m][n - 2] = 0.0;
                        dp[m][n - 2] = 0.0;
                    }
                    let k = model.k[m][n];
                    p[m][n] = ct * p[m][n - 1] - k * p[m][n - 2];
                    dp[m][n] = ct * dp[m][n - 1] - st * p[m][n - 1] - k * dp[m][n - 2];
                }
            }
        }
        terms.key = Some((alt, lat));
    }

    fn refresh_longitude(&mut self, lon: Degree, max_degree: usize) {
        if self.longitude.key == Some(lon) {
            return;
        }
        let LongitudeTerms { key, sp, cp } = &mut self.longitude;
        let (s, c) = (lon * RADEG).sin_cos();
        sp[0] = 0.0;
        cp[0] = 1.0;
        sp[1] = s;
        cp[1] = c;
        for m in 2..=max_degree {
            sp[m] = s * cp[m - 1] + c * sp[m - 1];
            cp[m] = c * cp[m - 1] - s * sp[m - 1];
        }
        *key = Some(lon);
    }

    fn refresh_secular(&mut self, dt: f64, model: &GeomagneticModel) {
        if self.secular.key == Some(dt) {
            return;
        }
        let tc = &mut self.secular.tc;
        for n in 1..=model.max_degree {
            for m in 0..=n {
                tc[m][n] = model.c[m][n] + dt * model.cd[m][n];
                if m != 0 {
                    tc[n][m - 1] = model.c[n][m - 1] + dt * model.cd[n][m - 1];
                }
            }
        }
        self.secular.key = Some(dt);
    }
}

/// Main-field model with normalized coefficients and its evaluation cache.
///
/// `c[m][n]` holds `g(n, m)` and `c[n][m - 1]` holds `h(n, m)`; `cd` is laid out the same way
/// for the secular variation.
#[derive(Debug, Clone)]
pub struct GeomagneticModel {
    name: String,
    epoch: f64,
    max_degree: usize,
    c: Table,
    cd: Table,
    /// Legendre recursion factors
    k: Table,
    /// `n + 1`, radial term factor
    degree_factor: [f64; TABLE_SIZE],
    /// `m`, azimuthal term factor
    order_factor: [f64; TABLE_SIZE],
    validity_years: f64,
    validity_warned: bool,
    geodetic_max_iterations: usize,
    cache: FieldEvaluationCache,
}

impl Default for GeomagneticModel {
    fn default() -> Self {
        GeomagneticModel::wmm2020()
    }
}

impl GeomagneticModel {
    /// The World Magnetic Model 2020.
    pub fn wmm2020() -> Self {
        let mut c = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        let mut cd = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        for row in WMM2020_COEFFICIENTS.iter() {
            store_row(&mut c, &mut cd, row);
        }
        GeomagneticModel::normalized(WMM2020_NAME, WMM2020_EPOCH, WMM_MAX_DEGREE, c, cd)
    }

    /// Load a model from the text of a WMM `.COF` file.
    ///
    /// The first line carries the epoch (decimal year) and the model name. Each following line
    /// is `n m g h ġ ḣ`; a line starting with `9999` ends the table.
    ///
    /// Arguments
    /// ---------
    /// * `content`: the file content
    ///
    /// Return
    /// ------
    /// * the model, or [`OrbitEnvError::InvalidCoefficientFile`] when the header is missing, a
    ///   row is malformed, or a degree exceeds 12
    pub fn from_cof_str(content: &str) -> Result<Self, OrbitEnvError> {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| OrbitEnvError::InvalidCoefficientFile("empty content".into()))?;
        let mut header_fields = header.split_whitespace();
        let epoch = header_fields
            .next()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| {
                OrbitEnvError::InvalidCoefficientFile(format!("no epoch in header '{header}'"))
            })?;
        let name = header_fields.next().unwrap_or("unnamed");

        let mut c = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        let mut cd = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        let mut max_degree = 0;

        for line in lines {
            if line.trim_start().starts_with("9999") {
                break;
            }
            let row = parse_row(line)?;
            max_degree = max_degree.max(row.0);
            store_row(&mut c, &mut cd, &row);
        }

        if max_degree == 0 {
            return Err(OrbitEnvError::InvalidCoefficientFile(
                "no coefficient rows".into(),
            ));
        }

        Ok(GeomagneticModel::normalized(
            name, epoch, max_degree, c, cd,
        ))
    }

    /// Schmidt semi-normalization of the raw Gauss coefficients.
    fn normalized(name: &str, epoch: f64, max_degree: usize, mut c: Table, mut cd: Table) -> Self {
        let mut snorm = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        let mut k = [[0.0; TABLE_SIZE]; TABLE_SIZE];
        let mut degree_factor = [0.0; TABLE_SIZE];
        let mut order_factor = [0.0; TABLE_SIZE];

        snorm[0][0] = 1.0;
        for n in 1..=max_degree {
            let nf = n as f64;
            snorm[0][n] = snorm[0][n - 1] * (2.0 * nf - 1.0) / nf;
            let mut j = 2.0;
            for m in 0..=n {
                let mf = m as f64;
                k[m][n] = ((nf - 1.0).powi(2) - mf * mf) / ((2.0 * nf - 1.0) * (2.0 * nf - 3.0));
                if m > 0 {
                    let flnmj = ((nf - mf + 1.0) * j) / (nf + mf);
                    snorm[m][n] = snorm[m - 1][n] * flnmj.sqrt();
                    j = 1.0;
                    c[n][m - 1] *= snorm[m][n];
                    cd[n][m - 1] *= snorm[m][n];
                }
                c[m][n] *= snorm[m][n];
                cd[m][n] *= snorm[m][n];
            }
            degree_factor[n] = nf + 1.0;
            order_factor[n] = nf;
        }
        k[1][1] = 0.0;

        GeomagneticModel {
            name: name.to_string(),
            epoch,
            max_degree,
            c,
            cd,
            k,
            degree_factor,
            order_factor,
            validity_years: DEFAULT_VALIDITY_YEARS,
            validity_warned: false,
            geodetic_max_iterations: DEFAULT_GEODETIC_MAX_ITERATIONS,
            cache: FieldEvaluationCache::default(),
        }
    }

    pub fn with_validity_years(mut self, years: f64) -> Self {
        self.validity_years = years;
        self
    }

    pub fn with_geodetic_max_iterations(mut self, max_iterations: usize) -> Self {
        self.geodetic_max_iterations = max_iterations;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference epoch, decimal year.
    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn cache_mut(&mut self) -> &mut FieldEvaluationCache {
        &mut self.cache
    }

    /// Evaluate the main field at a geodetic position and date.
    ///
    /// Arguments
    /// ---------
    /// * `altitude`: height above the WGS-84 ellipsoid, km
    /// * `latitude`: geodetic latitude, degrees
    /// * `longitude`: degrees, any turn
    /// * `decimal_year`: date of evaluation, e.g. `2021.5`
    ///
    /// Return
    /// ------
    /// * declination, inclination, intensities and North/East/Down components
    pub fn evaluate(
        &mut self,
        altitude: Kilometer,
        latitude: Degree,
        longitude: Degree,
        decimal_year: f64,
    ) -> MagneticFieldReading {
        let dt = decimal_year - self.epoch;
        if (dt < 0.0 || dt > self.validity_years) && !self.validity_warned {
            warn!(
                "{} evaluated at {decimal_year:.3}, outside its validity window {:.1}..{:.1}",
                self.name,
                self.epoch,
                self.epoch + self.validity_years
            );
            self.validity_warned = true;
        }

        let mut cache = std::mem::take(&mut self.cache);
        cache.refresh_spherical(altitude, latitude, self);
        cache.refresh_longitude(longitude, self.max_degree);
        cache.refresh_secular(dt, self);
        let reading = self.sum_terms(&cache, latitude, longitude);
        self.cache = cache;
        reading
    }

    fn sum_terms(
        &self,
        cache: &FieldEvaluationCache,
        latitude: Degree,
        longitude: Degree,
    ) -> MagneticFieldReading {
        let SphericalTerms {
            ct,
            st,
            ca,
            sa,
            r,
            ref p,
            ref dp,
            ..
        } = cache.spherical;
        let LongitudeTerms { ref sp, ref cp, .. } = cache.longitude;
        let tc = &cache.secular.tc;

        let mut pp = [0.0; TABLE_SIZE];
        pp[0] = 1.0;

        let aor = REFERENCE_RADIUS / r;
        let mut ar = aor * aor;
        let (mut br, mut bt, mut bp, mut bpp) = (0.0, 0.0, 0.0, 0.0);

        for n in 1..=self.max_degree {
            ar *= aor;
            for m in 0..=n {
                let par = ar * p[m][n];
                let (temp1, temp2) = if m == 0 {
                    (tc[m][n] * cp[m], tc[m][n] * sp[m])
                } else {
                    (
                        tc[m][n] * cp[m] + tc[n][m - 1] * sp[m],
                        tc[m][n] * sp[m] - tc[n][m - 1] * cp[m],
                    )
                };
                bt -= ar * temp1 * dp[m][n];
                bp += self.order_factor[m] * temp2 * par;
                br += self.degree_factor[n] * temp1 * par;

                // pole: azimuthal term from the m = 1 recurrence
                if st == 0.0 && m == 1 {
                    pp[n] = if n == 1 {
                        pp[n - 1]
                    } else {
                        ct * pp[n - 1] - self.k[m][n] * pp[n - 2]
                    };
                    bpp += self.order_factor[m] * temp2 * ar * pp[n];
                }
            }
        }

        bp = if st == 0.0 { bpp } else { bp / st };

        let north = -bt * ca - br * sa;
        let east = bp;
        let down = bt * sa - br * ca;

        let horizontal = north.hypot(east);
        let total_intensity = horizontal.hypot(down);
        let declination = east.atan2(north) / RADEG;
        let inclination = down.atan2(horizontal) / RADEG;

        let grid_variation = (latitude.abs() >= GRID_VARIATION_LATITUDE).then(|| {
            let gv = if latitude > 0.0 {
                declination - longitude
            } else {
                declination + longitude
            };
            wrap_degrees(gv)
        });

        MagneticFieldReading {
            declination,
            inclination,
            total_intensity,
            horizontal,
            north,
            east,
            down,
            grid_variation,
        }
    }

    /// Magnetic field vector at an inertial position.
    ///
    /// The position is reduced to its geodetic sub-point, the field evaluated there, and the
    /// local North/East/Down field vector rotated into ECI.
    ///
    /// Arguments
    /// ---------
    /// * `position`: ECI position in meters
    /// * `jd`: Julian Date of the position
    ///
    /// Return
    /// ------
    /// * the field vector in ECI, nT
    pub fn calculate_magnetic_vector(
        &mut self,
        position: &EciVector,
        jd: JulianDate,
    ) -> Result<EciVector, OrbitEnvError> {
        let geodetic = eci_to_geodetic(position, jd, self.geodetic_max_iterations)?;
        Ok(self.calculate_magnetic_vector_at(&geodetic, jd))
    }

    /// Magnetic field vector in ECI, nT, at an already converted geodetic position.
    pub fn calculate_magnetic_vector_at(
        &mut self,
        geodetic: &GeodeticPosition,
        jd: JulianDate,
    ) -> EciVector {
        let reading = self.evaluate(
            geodetic.height * M_TO_KM,
            geodetic.latitude / RADEG,
            geodetic.longitude / RADEG,
            jd_to_year(jd),
        );

        let dec = reading.declination * RADEG;
        let dip = reading.inclination * RADEG;
        let ti = reading.total_intensity;
        let local = LocalCartesian::new(
            *geodetic,
            ti * dec.cos() * dip.cos(),
            ti * dip.cos() * dec.sin(),
            ti * dip.sin(),
        );
        local_to_eci(&local, jd, true)
    }
}

fn store_row(c: &mut Table, cd: &mut Table, &(n, m, g, h, gdot, hdot): &GaussRow) {
    c[m][n] = g;
    cd[m][n] = gdot;
    if m != 0 {
        c[n][m - 1] = h;
        cd[n][m - 1] = hdot;
    }
}

fn parse_row(line: &str) -> Result<GaussRow, OrbitEnvError> {
    let invalid = || OrbitEnvError::InvalidCoefficientFile(format!("malformed row '{line}'"));

    let (n, m, g, h, gdot, hdot) = line
        .split_whitespace()
        .collect_tuple::<(_, _, _, _, _, _)>()
        .ok_or_else(invalid)?;
    let n: usize = n.parse().map_err(|_| invalid())?;
    let m: usize = m.parse().map_err(|_| invalid())?;
    if n == 0 || n > WMM_MAX_DEGREE || m > n {
        return Err(OrbitEnvError::InvalidCoefficientFile(format!(
            "degree/order ({n}, {m}) outside 1..={WMM_MAX_DEGREE}"
        )));
    }

    let mut values = [g, h, gdot, hdot].into_iter().map(|v| v.parse::<f64>());
    let mut next = || values.next().and_then(|v| v.ok()).ok_or_else(invalid);
    Ok((n, m, next()?, next()?, next()?, next()?))
}

fn wrap_degrees(angle: Degree) -> Degree {
    if angle > 180.0 {
        angle - 360.0
    } else if angle < -180.0 {
        angle + 360.0
    } else {
        angle
    }
}
