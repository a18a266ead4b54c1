//! Two-line element sets
use hifitime::{Epoch, Unit};
use std::f64::consts::TAU;

use crate::Error;

/// Epoch years below this pivot belong to the 21st century
const CENTURY_PIVOT: u16 = 57;

/// Unparsed catalog entry: the satellite name and its
/// two fixed-width TLE lines (69 columns each, checksum included).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TleRecord {
    /// Satellite name (name line of the 3-line block)
    pub name: String,
    /// Line 1: epoch and drag terms
    pub line1: String,
    /// Line 2: classical orbital elements
    pub line2: String,
}

impl TleRecord {
    /// Builds new [TleRecord]. Surrounding whitespace is stripped.
    pub fn new(name: &str, line1: &str, line2: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            line1: line1.trim().to_string(),
            line2: line2.trim().to_string(),
        }
    }
    /// Splits classic 3-line text (name, line 1, line 2) into records.
    /// Blank lines are ignored, a trailing incomplete block is dropped.
    pub fn parse_blocks(content: &str) -> Vec<Self> {
        let lines = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        lines
            .chunks_exact(3)
            .map(|block| Self::new(block[0], block[1], block[2]))
            .collect()
    }
    /// Parses [OrbitalElements] out of both lines.
    pub fn elements(&self) -> Result<OrbitalElements, Error> {
        OrbitalElements::parse(&self.line1, &self.line2)
    }
    /// True when both lines carry a valid modulo-10 checksum.
    /// Catalog data is never rejected on this basis.
    pub fn checksums_ok(&self) -> bool {
        [&self.line1, &self.line2].iter().all(|line| {
            let expected = line.get(68..69).and_then(|c| c.parse::<u8>().ok());
            match (expected, line.get(..68)) {
                (Some(expected), Some(body)) => checksum(body) == expected,
                _ => false,
            }
        })
    }
}

/// Modulo-10 TLE checksum: digits count their value, minus signs count one.
pub fn checksum(body: &str) -> u8 {
    let sum = body
        .chars()
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>();
    (sum % 10) as u8
}

/// Classical orbital elements extracted from a [TleRecord].
/// Angles are expressed in radians within [0, 2π).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitalElements {
    /// Reference instant of these elements
    pub epoch: Epoch,
    /// Inclination (rad)
    pub inclination: f64,
    /// Right ascension of the ascending node (rad)
    pub raan: f64,
    /// Eccentricity (n.a), within [0, 1)
    pub eccentricity: f64,
    /// Argument of perigee (rad)
    pub argp: f64,
    /// Mean anomaly at epoch (rad)
    pub mean_anomaly: f64,
    /// Mean motion (rev/day)
    pub mean_motion: f64,
}

/// Extracts the [start, end) byte range of given TLE line
fn field<'a>(
    content: &'a str,
    line: u8,
    start: usize,
    end: usize,
    name: &'static str,
) -> Result<&'a str, Error> {
    content.get(start..end).ok_or(Error::MalformedTle {
        line,
        field: name,
        content: content.to_string(),
    })
}

/// Parses a (blank padded) numerical TLE field
fn number<T: std::str::FromStr>(
    content: &str,
    line: u8,
    start: usize,
    end: usize,
    name: &'static str,
) -> Result<T, Error> {
    field(content, line, start, end, name)?
        .trim()
        .parse::<T>()
        .map_err(|_| Error::MalformedTle {
            line,
            field: name,
            content: content.to_string(),
        })
}

/// Parses an angle field, converted to radians within [0, 2π)
fn angle(content: &str, start: usize, end: usize, name: &'static str) -> Result<f64, Error> {
    let degrees = number::<f64>(content, 2, start, end, name)?;
    Ok(degrees.to_radians().rem_euclid(TAU))
}

impl OrbitalElements {
    /// Parses [OrbitalElements] from TLE lines 1 and 2, by column offset.
    /// Checksums are not verified.
    pub fn parse(line1: &str, line2: &str) -> Result<Self, Error> {
        let yy = number::<u16>(line1, 1, 18, 20, "epoch year")?;
        let year = if yy < CENTURY_PIVOT { 2000 + yy } else { 1900 + yy };
        let day_of_year = number::<f64>(line1, 1, 20, 32, "epoch day")?;
        if !day_of_year.is_finite() {
            return Err(Error::MalformedTle {
                line: 1,
                field: "epoch day",
                content: line1.to_string(),
            });
        }

        let epoch = Epoch::from_gregorian_utc_at_midnight(year as i32, 1, 1)
            + (day_of_year - 1.0) * Unit::Day;

        let inclination = angle(line2, 8, 16, "inclination")?;
        let raan = angle(line2, 17, 25, "raan")?;

        // implicit leading decimal point, no blanks allowed
        let eccentricity = format!("0.{}", field(line2, 2, 26, 33, "eccentricity")?)
            .parse::<f64>()
            .map_err(|_| Error::MalformedTle {
                line: 2,
                field: "eccentricity",
                content: line2.to_string(),
            })?;

        let argp = angle(line2, 34, 42, "argument of perigee")?;
        let mean_anomaly = angle(line2, 43, 51, "mean anomaly")?;

        let mean_motion = number::<f64>(line2, 2, 52, 63, "mean motion")?;
        if !(mean_motion > 0.0 && mean_motion.is_finite()) {
            return Err(Error::MalformedTle {
                line: 2,
                field: "mean motion",
                content: line2.to_string(),
            });
        }

        Ok(Self {
            epoch,
            inclination,
            raan,
            eccentricity,
            argp,
            mean_anomaly,
            mean_motion,
        })
    }
}
