//! # Two-line element set reader
//!
//! Table-driven decoder for the fixed-width NORAD two-line element format. Every field is
//! described once by a [`Column`] (byte range + decoding rule), so the format knowledge lives
//! in the constant tables at the top of this file and not in ad-hoc string scanning.
//!
//! ```text
//! 1 25544U 98067A   21014.31054398  .00001697  00000-0  38545-4 0  9993
//! 2 25544  51.6457  23.8259 0000410 224.6534 316.4858 15.49291243264748
//! ```
//!
//! Conventional blanks are filled the usual way: implied decimal points for the eccentricity,
//! the second derivative of the mean motion and the drag term, implied `0` for blank digits
//! and exponents. Output units are described in [`crate::mean_elements`].
use std::ops::Range;

use thiserror::Error;

use crate::{
    constants::{DPI, MINUTES_PER_DAY, RADEG},
    mean_elements::MeanElementRecord,
    time::day_of_year_to_jd,
};

/// Minimum number of significant columns of each line.
pub const TLE_LINE_LENGTH: usize = 69;

#[derive(Error, Debug, PartialEq)]
pub enum ParseTleError {
    #[error("Line {line} is too short: {len} columns, expected {TLE_LINE_LENGTH}")]
    TooShortLine { line: u8, len: usize },
    #[error("Line {line} starts with {found:?}")]
    WrongLineNumber { line: u8, found: char },
    #[error("Catalog number differs between the lines: {first} / {second}")]
    CatalogMismatch { first: u32, second: u32 },
    #[error("Invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy)]
enum Decoding {
    /// plain number, surrounding blanks ignored
    Number,
    /// digits with an implied leading `0.`
    ImpliedPoint,
    /// signed mantissa with an implied leading `0.` followed by a signed exponent digit
    ImpliedExponent,
}

/// Byte range and decoding rule of one field.
struct Column {
    name: &'static str,
    range: Range<usize>,
    decoding: Decoding,
}

impl Column {
    const fn new(name: &'static str, range: Range<usize>, decoding: Decoding) -> Self {
        Column {
            name,
            range,
            decoding,
        }
    }

    fn raw<'a>(&self, line: &'a str) -> &'a str {
        &line[self.range.clone()]
    }

    fn invalid(&self, line: &str) -> ParseTleError {
        ParseTleError::InvalidField {
            field: self.name,
            value: self.raw(line).to_string(),
        }
    }

    fn decode(&self, line: &str) -> Result<f64, ParseTleError> {
        let text = self.raw(line);
        let blank_to_zero = |s: &str| -> String {
            s.chars().map(|c| if c == ' ' { '0' } else { c }).collect()
        };

        let value = match self.decoding {
            Decoding::Number => text.trim().parse::<f64>().ok(),
            Decoding::ImpliedPoint => format!("0.{}", blank_to_zero(text)).parse::<f64>().ok(),
            Decoding::ImpliedExponent => {
                let (mantissa, exponent) = text.split_at(text.len() - 2);
                let (sign, digits) = match mantissa.chars().next() {
                    Some('-') => (-1.0, &mantissa[1..]),
                    Some('+') | Some(' ') => (1.0, &mantissa[1..]),
                    _ => (1.0, mantissa),
                };
                let mantissa = format!("0.{}", blank_to_zero(digits)).parse::<f64>().ok();
                let exponent = blank_to_zero(exponent).parse::<i32>().ok();
                mantissa
                    .zip(exponent)
                    .map(|(m, e)| sign * m * 10f64.powi(e))
            }
        };

        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(line))
    }

    fn decode_integer(&self, line: &str) -> Result<u32, ParseTleError> {
        let text = self.raw(line).trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse::<u32>().map_err(|_| self.invalid(line))
    }
}

// line 1
const CATALOG_NUMBER_1: Column = Column::new("catalog number", 2..7, Decoding::Number);
const INTERNATIONAL_DESIGNATOR: Column =
    Column::new("international designator", 9..17, Decoding::Number);
const EPOCH_YEAR: Column = Column::new("epoch year", 18..20, Decoding::Number);
const EPOCH_DAY: Column = Column::new("epoch day", 20..32, Decoding::Number);
const NDOT: Column = Column::new("first derivative of mean motion", 33..43, Decoding::Number);
const NDDOT: Column = Column::new(
    "second derivative of mean motion",
    44..52,
    Decoding::ImpliedExponent,
);
const BSTAR: Column = Column::new("drag term", 53..61, Decoding::ImpliedExponent);
const ELEMENT_NUMBER: Column = Column::new("element number", 64..68, Decoding::Number);

// line 2
const CATALOG_NUMBER_2: Column = Column::new("catalog number", 2..7, Decoding::Number);
const INCLINATION: Column = Column::new("inclination", 8..16, Decoding::Number);
const RAAN: Column = Column::new("right ascension of the node", 17..25, Decoding::Number);
const ECCENTRICITY: Column = Column::new("eccentricity", 26..33, Decoding::ImpliedPoint);
const ARG_PERIGEE: Column = Column::new("argument of perigee", 34..42, Decoding::Number);
const MEAN_ANOMALY: Column = Column::new("mean anomaly", 43..51, Decoding::Number);
const MEAN_MOTION: Column = Column::new("mean motion", 52..63, Decoding::Number);
const REVOLUTION_NUMBER: Column = Column::new("revolution number", 63..68, Decoding::Number);

/// Modulo-10 checksum of the first 68 columns (digits count their value, `-` counts one).
pub fn checksum(line: &str) -> u32 {
    line.chars()
        .take(TLE_LINE_LENGTH - 1)
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}

fn check_line(line: &str, number: u8) -> Result<&str, ParseTleError> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.len() < TLE_LINE_LENGTH {
        return Err(ParseTleError::TooShortLine {
            line: number,
            len: line.len(),
        });
    }
    if !line.is_ascii() {
        return Err(ParseTleError::InvalidField {
            field: "line",
            value: line.to_string(),
        });
    }

    let found = line.chars().next().unwrap_or(' ');
    if found.to_digit(10) != Some(number as u32) || line.as_bytes()[1] != b' ' {
        return Err(ParseTleError::WrongLineNumber {
            line: number,
            found,
        });
    }

    let expected = line.as_bytes()[TLE_LINE_LENGTH - 1];
    if expected.is_ascii_digit() && checksum(line) != (expected - b'0') as u32 {
        log::warn!(
            "Checksum mismatch on line {number}: computed {}, found {}",
            checksum(line),
            expected as char
        );
    }

    Ok(line)
}

/// Decode a two-line element set into a [`MeanElementRecord`].
///
/// Arguments
/// ---------
/// * `line1`: first line, starting with `1 `
/// * `line2`: second line, starting with `2 `
///
/// Return
/// ------
/// * the normalized record, or the first [`ParseTleError`] encountered. No partially populated
///   record is ever returned.
pub fn parse_tle(line1: &str, line2: &str) -> Result<MeanElementRecord, ParseTleError> {
    let l1 = check_line(line1, 1)?;
    let l2 = check_line(line2, 2)?;

    let first = CATALOG_NUMBER_1.decode_integer(l1)?;
    let second = CATALOG_NUMBER_2.decode_integer(l2)?;
    if first != second {
        return Err(ParseTleError::CatalogMismatch { first, second });
    }

    // revolutions per day to radians per minute
    let xpdotp = MINUTES_PER_DAY / DPI;

    let two_digit_year = EPOCH_YEAR.decode_integer(l1)? as i32;
    let epoch_year = if two_digit_year < 57 {
        two_digit_year + 2000
    } else {
        two_digit_year + 1900
    };
    let epoch_day_of_year = EPOCH_DAY.decode(l1)?;
    if !(1.0..367.0).contains(&epoch_day_of_year) {
        return Err(EPOCH_DAY.invalid(l1));
    }

    let classification = match l1.as_bytes()[7] {
        b' ' => 'U',
        c => c as char,
    };

    Ok(MeanElementRecord {
        catalog_number: first,
        classification,
        international_designator: INTERNATIONAL_DESIGNATOR.raw(l1).trim().to_string(),
        epoch_year,
        epoch_day_of_year,
        epoch_jd: day_of_year_to_jd(epoch_year, epoch_day_of_year),
        ndot: NDOT.decode(l1)? / (xpdotp * MINUTES_PER_DAY),
        nddot: NDDOT.decode(l1)? / (xpdotp * MINUTES_PER_DAY * MINUTES_PER_DAY),
        bstar: BSTAR.decode(l1)?,
        inclination: INCLINATION.decode(l2)? * RADEG,
        raan: RAAN.decode(l2)? * RADEG,
        eccentricity: ECCENTRICITY.decode(l2)?,
        arg_perigee: ARG_PERIGEE.decode(l2)? * RADEG,
        mean_anomaly: MEAN_ANOMALY.decode(l2)? * RADEG,
        mean_motion: MEAN_MOTION.decode(l2)? / xpdotp,
        element_number: ELEMENT_NUMBER.decode_integer(l1)?,
        revolution_number: REVOLUTION_NUMBER.decode_integer(l2)?,
    })
}

/// Decode every element set of a text in two-line or three-line (name + two lines) format.
///
/// Blank lines are skipped; a line that starts neither with `1 ` nor `2 ` is taken as the name
/// of the following element set.
///
/// Return
/// ------
/// * the optional satellite name and the record of each element set, in file order
pub fn parse_tle_batch(
    content: &str,
) -> Result<Vec<(Option<String>, MeanElementRecord)>, ParseTleError> {
    let mut records = Vec::new();
    let mut name = None;
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    while let Some(line) = lines.next() {
        if !line.starts_with("1 ") {
            name = Some(line.trim().to_string());
            continue;
        }
        let line2 = lines.next().ok_or(ParseTleError::TooShortLine { line: 2, len: 0 })?;
        records.push((name.take(), parse_tle(line, line2)?));
    }

    Ok(records)
}

#[cfg(test)]
mod tle_reader_test {
    use super::*;
    use approx::assert_relative_eq;

    const ISS_LINE1: &str =
        "1 25544U 98067A   21014.31054398  .00001697  00000-0  38545-4 0  9993";
    const ISS_LINE2: &str =
        "2 25544  51.6457  23.8259 0000410 224.6534 316.4858 15.49291243264748";

    #[test]
    fn test_parse_iss() {
        let record = parse_tle(ISS_LINE1, ISS_LINE2).unwrap();
        let xpdotp = 1440.0 / DPI;

        assert_eq!(record.catalog_number, 25544);
        assert_eq!(record.classification, 'U');
        assert_eq!(record.international_designator, "98067A");
        assert_eq!(record.epoch_year, 2021);
        assert_relative_eq!(record.epoch_day_of_year, 14.31054398);
        assert_relative_eq!(record.epoch_jd, 2_459_228.810_543_98, epsilon = 1e-8);
        assert_relative_eq!(record.ndot, 0.00001697 / (xpdotp * 1440.0));
        assert_eq!(record.nddot, 0.0);
        assert_relative_eq!(record.bstar, 0.38545e-4, epsilon = 1e-15);
        assert_relative_eq!(record.inclination, 51.6457_f64.to_radians(), epsilon = 1e-14);
        assert_relative_eq!(record.raan, 23.8259_f64.to_radians(), epsilon = 1e-14);
        assert_relative_eq!(record.eccentricity, 0.0000410);
        assert_relative_eq!(record.arg_perigee, 224.6534_f64.to_radians(), epsilon = 1e-14);
        assert_relative_eq!(record.mean_anomaly, 316.4858_f64.to_radians(), epsilon = 1e-14);
        assert_relative_eq!(record.mean_motion, 15.49291243 / xpdotp, epsilon = 1e-15);
        assert_eq!(record.element_number, 999);
        assert_eq!(record.revolution_number, 26474);
    }

    #[test]
    fn test_epoch_day_after_february() {
        // day 60.5: 1 March at noon in 2021, 29 February at noon in 2052
        let line1 = "1 25544U 98067A   21060.50000000  .00001697  00000-0  38545-4 0  9999";
        let record = parse_tle(line1, ISS_LINE2).unwrap();
        assert_relative_eq!(record.epoch_jd, 2_459_275.0, epsilon = 1e-8);

        let line1 = "1 25544U 98067A   52060.50000000  .00001697  00000-0  38545-4 0  9999";
        let record = parse_tle(line1, ISS_LINE2).unwrap();
        assert_eq!(record.epoch_year, 2052);
        assert_relative_eq!(record.epoch_jd, 2_470_597.0, epsilon = 1e-8);
    }

    #[test]
    fn test_implied_exponent_fields() {
        let line1 = "1 88888U          80275.98708465  .00073094  13844-3  66816-4 0    87";
        let line2 = "2 88888  72.8435 115.9689 0086731  52.6988 110.5714 16.05824518  1058";
        let record = parse_tle(line1, line2).unwrap();
        let xpdotp = 1440.0 / DPI;

        assert_eq!(record.epoch_year, 1980);
        assert_relative_eq!(
            record.nddot,
            0.13844e-3 / (xpdotp * 1440.0 * 1440.0),
            epsilon = 1e-20
        );
        assert_relative_eq!(record.bstar, 0.66816e-4, epsilon = 1e-15);
        assert_relative_eq!(record.eccentricity, 0.0086731);
        assert_eq!(record.revolution_number, 105);
    }

    #[test]
    fn test_negative_drag_term() {
        let line1 = "1 25544U 98067A   21014.31054398 -.00001697  00000-0 -38545-4 0  9993";
        let record = parse_tle(line1, ISS_LINE2).unwrap();
        assert_relative_eq!(record.bstar, -0.38545e-4, epsilon = 1e-15);
        assert!(record.ndot < 0.0);
    }

    #[test]
    fn test_too_short_line() {
        assert_eq!(
            parse_tle(&ISS_LINE1[..60], ISS_LINE2),
            Err(ParseTleError::TooShortLine { line: 1, len: 60 })
        );
        assert_eq!(
            parse_tle(ISS_LINE1, &ISS_LINE2[..68]),
            Err(ParseTleError::TooShortLine { line: 2, len: 68 })
        );
    }

    #[test]
    fn test_wrong_line_number() {
        assert_eq!(
            parse_tle(ISS_LINE2, ISS_LINE1),
            Err(ParseTleError::WrongLineNumber {
                line: 1,
                found: '2'
            })
        );
    }

    #[test]
    fn test_catalog_mismatch() {
        let line2 = ISS_LINE2.replacen("25544", "25545", 1);
        assert_eq!(
            parse_tle(ISS_LINE1, &line2),
            Err(ParseTleError::CatalogMismatch {
                first: 25544,
                second: 25545
            })
        );
    }

    #[test]
    fn test_invalid_field() {
        let line2 = ISS_LINE2.replacen("51.6457", "51.6x57", 1);
        assert_eq!(
            parse_tle(ISS_LINE1, &line2),
            Err(ParseTleError::InvalidField {
                field: "inclination",
                value: " 51.6x57".to_string()
            })
        );
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(ISS_LINE1), 3);
        assert_eq!(checksum(ISS_LINE2), 8);
    }

    #[test]
    fn test_parse_batch() {
        let content = format!("ISS (ZARYA)\n{ISS_LINE1}\n{ISS_LINE2}\n\n{ISS_LINE1}\r\n{ISS_LINE2}\r\n");
        let records = parse_tle_batch(&content).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0.as_deref(), Some("ISS (ZARYA)"));
        assert_eq!(records[1].0, None);
        assert_eq!(records[0].1, records[1].1);
    }
}
