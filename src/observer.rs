use crate::Error;

/// Ground observer location, on a spherical Earth.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Observer {
    /// Latitude [°]
    latitude: f64,
    /// Longitude [°]
    longitude: f64,
}

impl Observer {
    /// Builds Self from geographic coordinates in decimal degrees.
    /// Latitude must lie within [-90, 90], longitude within [-180, 180].
    pub fn from_ddeg(latitude: f64, longitude: f64) -> Result<Self, Error> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && latitude.abs() <= 90.0
            && longitude.abs() <= 180.0;
        if !valid {
            return Err(Error::InvalidObserver {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
    /// Returns (latitude, longitude) in decimal degrees
    pub fn ddeg(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
    /// Returns (latitude, longitude) in radians
    pub fn rad(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(52.52, 13.405, true)]
    #[case(-90.0, 180.0, true)]
    #[case(90.1, 0.0, false)]
    #[case(0.0, -180.5, false)]
    #[case(f64::NAN, 0.0, false)]
    #[case(0.0, f64::INFINITY, false)]
    fn coordinates_validation(#[case] lat: f64, #[case] lon: f64, #[case] valid: bool) {
        assert_eq!(Observer::from_ddeg(lat, lon).is_ok(), valid);
    }
}
