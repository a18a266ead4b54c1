use hifitime::Epoch;
use std::f64::consts::{PI, TAU};

use crate::{orbit::InertialPosition, Error};

/// Sidereal day [s], Earth rotation period w.r.t the stars
pub(crate) const SIDEREAL_DAY_SECONDS: f64 = 86164.0;

/// Geocentric sub-point of a satellite.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct GroundPoint {
    /// Geocentric latitude [°]
    pub latitude: f64,
    /// Longitude [°], within (-180, 180]
    pub longitude: f64,
}

/// Approximate Greenwich sidereal angle [rad]: Earth rotation
/// accumulated since UTC midnight of `t`, with no precession nor nutation.
pub fn sidereal_angle(t: Epoch) -> f64 {
    let (y, m, d, _, _, _, _) = t.to_gregorian_utc();
    let midnight = Epoch::from_gregorian_utc_at_midnight(y, m, d);
    TAU * (t - midnight).to_seconds() / SIDEREAL_DAY_SECONDS
}

/// Wraps given angle [rad] into (-π, π]
pub(crate) fn wrap_pi(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

impl GroundPoint {
    /// Projects an ECI position onto the (spherical) Earth surface at instant `t`.
    pub fn from_inertial(position: &InertialPosition, t: Epoch) -> Result<Self, Error> {
        let r = position.norm();
        if !(r > 0.0 && r.is_finite()) {
            return Err(Error::DegeneratePosition);
        }
        let (x, y, z) = (position[0], position[1], position[2]);
        let latitude = (z / r).clamp(-1.0, 1.0).asin();
        let mut longitude = wrap_pi(y.atan2(x) - sidereal_angle(t)).to_degrees();
        // degree conversion may round onto the excluded bound
        if longitude <= -180.0 {
            longitude += 360.0;
        }
        Ok(Self {
            latitude: latitude.to_degrees(),
            longitude: longitude.min(180.0),
        })
    }
}
