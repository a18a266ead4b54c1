use hifitime::Epoch;
use std::sync::Arc;

use crate::{ground::GroundPoint, tle::TleRecord, visibility::Visibility};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Satellite found within range of the observer, at a given time sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Catalog identifier
    pub(crate) id: u32,
    /// Originating catalog record
    pub(crate) tle: Arc<TleRecord>,
    /// Sampling instant
    pub(crate) epoch: Epoch,
    /// Satellite sub-point
    pub(crate) point: GroundPoint,
    /// Range and elevation
    pub(crate) visibility: Visibility,
}

impl Observation {
    pub(crate) fn new(
        id: u32,
        tle: Arc<TleRecord>,
        epoch: Epoch,
        point: GroundPoint,
        visibility: Visibility,
    ) -> Self {
        Self {
            id,
            tle,
            epoch,
            point,
            visibility,
        }
    }
    /// Catalog identifier of the satellite
    pub fn satellite_id(&self) -> u32 {
        self.id
    }
    /// Satellite name
    pub fn name(&self) -> &str {
        &self.tle.name
    }
    /// Originating [TleRecord]
    pub fn tle(&self) -> &TleRecord {
        &self.tle
    }
    /// Sampling instant
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
    /// Great circle distance to the observer [km]
    pub fn distance_km(&self) -> f64 {
        self.visibility.distance_km
    }
    /// Elevation [°]
    pub fn elevation(&self) -> f64 {
        self.visibility.elevation
    }
    /// Elevation exceeds the visibility threshold
    pub fn visible(&self) -> bool {
        self.visibility.visible
    }
    /// Sub-point latitude [°]
    pub fn latitude(&self) -> f64 {
        self.point.latitude
    }
    /// Sub-point longitude [°]
    pub fn longitude(&self) -> f64 {
        self.point.longitude
    }
    /// Converts Self to its export [ObservationRecord]
    pub fn record(&self) -> ObservationRecord {
        ObservationRecord {
            id: self.id,
            name: self.tle.name.clone(),
            distance_km: round2(self.visibility.distance_km),
            elevation_deg: round2(self.visibility.elevation),
            visible: self.visibility.visible,
            latitude: self.point.latitude,
            longitude: self.point.longitude,
            datetime_utc: isoformat(self.epoch),
            tle: TleLines {
                line1: self.tle.line1.clone(),
                line2: self.tle.line2.clone(),
            },
        }
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.1} km) - {} - {}",
            self.tle.name,
            self.visibility.distance_km,
            if self.visibility.visible {
                "Visible"
            } else {
                "Not Visible"
            },
            isoformat(self.epoch),
        )
    }
}

/// TLE lines attached to an [ObservationRecord]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TleLines {
    #[cfg_attr(feature = "serde", serde(rename = "line-1"))]
    pub line1: String,
    #[cfg_attr(feature = "serde", serde(rename = "line-2"))]
    pub line2: String,
}

/// Flat export form of an [Observation]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ObservationRecord {
    pub id: u32,
    pub name: String,
    /// Rounded to 2 decimals
    pub distance_km: f64,
    /// Rounded to 2 decimals
    pub elevation_deg: f64,
    pub visible: bool,
    pub latitude: f64,
    pub longitude: f64,
    /// ISO-8601 UTC datetime, no zone designator
    pub datetime_utc: String,
    pub tle: TleLines,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// ISO-8601 UTC representation, microseconds emitted only when non zero
pub(crate) fn isoformat(t: Epoch) -> String {
    let (y, m, d, hh, mm, ss, nanos) = t.to_gregorian_utc();
    let micros = nanos / 1_000;
    if micros == 0 {
        format!("{:04}-{:02}-{:02}T{:02}:{:02}:{:02}", y, m, d, hh, mm, ss)
    } else {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}",
            y, m, d, hh, mm, ss, micros
        )
    }
}
