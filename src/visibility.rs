use geographiclib_rs::{Geodesic, InverseGeodesic};

use crate::{
    cfg::{Config, DistanceModel},
    ground::GroundPoint,
    observer::Observer,
};

/// Distance and elevation of a satellite sub-point, as seen from an [Observer].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Visibility {
    /// Ground distance [km], see [DistanceModel]
    pub distance_km: f64,
    /// Zenith proximity angle [°]: 90° minus the central angle
    /// between observer and sub-point. Satellite altitude is not accounted for.
    pub elevation: f64,
    /// Elevation exceeds the visibility threshold
    pub visible: bool,
}

/// Haversine central angle [rad] between two points given in radians
pub(crate) fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (dlat, dlon) = (lat2 - lat1, lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// WGS-84 geodesic distance [km] between two points given in decimal degrees
pub(crate) fn geodesic_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let s12: f64 = Geodesic::wgs84().inverse(lat1, lon1, lat2, lon2);
    s12 / 1000.0
}

impl Visibility {
    /// Evaluates [Visibility] of given sub-point. Ground distance follows
    /// the configured [DistanceModel], elevation is always evaluated on the sphere.
    pub fn evaluate(observer: &Observer, point: &GroundPoint, cfg: &Config) -> Self {
        let (lat1, lon1) = observer.rad();
        let (lat2, lon2) = (point.latitude.to_radians(), point.longitude.to_radians());
        let c = central_angle(lat1, lon1, lat2, lon2);
        let elevation = Self::elevation(c);

        let distance_km = match cfg.distance_model {
            DistanceModel::Spherical => cfg.earth_radius_km * c,
            DistanceModel::Geodesic => {
                let (lat1, lon1) = observer.ddeg();
                geodesic_km(lat1, lon1, point.latitude, point.longitude)
            },
        };

        Self {
            distance_km,
            elevation,
            visible: elevation > cfg.min_elevation,
        }
    }
    /// Elevation [°] for given central angle [rad]
    pub(crate) fn elevation(c: f64) -> f64 {
        90.0 - c.to_degrees()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-0.009151688758768407, -60.4999096156345, 6727.292560997561, 29.500089970848393)]
    #[case(29.985945322854207, -37.22613413606347, 5158.973792634637, 43.604299580087826)]
    #[case(52.688621151892214, 79.31519834072265, 9290.04768497881, 6.452711991998953)]
    #[case(-25.681854155651262, -98.18182045337615, 10826.935948007038, -7.368836691217382)]
    fn reference_values(
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] distance_km: f64,
        #[case] elevation: f64,
    ) {
        let cfg = Config::default();
        let observer = Observer::from_ddeg(0.0, 0.0).unwrap();
        let point = GroundPoint {
            latitude,
            longitude,
        };
        let vis = Visibility::evaluate(&observer, &point, &cfg);
        assert!((vis.distance_km - distance_km).abs() < 1.0E-6);
        assert!((vis.elevation - elevation).abs() < 1.0E-9);
        assert_eq!(vis.visible, elevation > 10.0);
    }

    #[test]
    fn zenith() {
        let observer = Observer::from_ddeg(48.85, 2.35).unwrap();
        let point = GroundPoint {
            latitude: 48.85,
            longitude: 2.35,
        };
        let vis = Visibility::evaluate(&observer, &point, &Config::default());
        assert_eq!(vis.distance_km, 0.0);
        assert_eq!(vis.elevation, 90.0);
        assert!(vis.visible);
    }

    #[test]
    fn antipode() {
        let observer = Observer::from_ddeg(0.0, 0.0).unwrap();
        let point = GroundPoint {
            latitude: 0.0,
            longitude: 180.0,
        };
        let vis = Visibility::evaluate(&observer, &point, &Config::default());
        assert!((vis.distance_km - std::f64::consts::PI * 6371.009).abs() < 1.0E-6);
        assert!((vis.elevation + 90.0).abs() < 1.0E-9);
        assert!(!vis.visible);
    }

    #[test]
    fn monotonic_elevation() {
        let mut past = f64::INFINITY;
        for k in 0..=10_000 {
            let c = std::f64::consts::PI * k as f64 / 10_000.0;
            let elevation = Visibility::elevation(c);
            assert!(elevation < past, "elevation not decreasing at c={}", c);
            past = elevation;
        }
    }

    #[test]
    fn visibility_threshold() {
        let observer = Observer::from_ddeg(0.0, 0.0).unwrap();
        for (latitude, visible) in [(79.0, true), (80.5, false), (85.0, false), (20.0, true)] {
            let point = GroundPoint {
                latitude,
                longitude: 0.0,
            };
            let vis = Visibility::evaluate(&observer, &point, &Config::default());
            assert_eq!(vis.visible, visible, "latitude={}", latitude);
            assert_eq!(vis.visible, vis.elevation > 10.0);
        }
    }

    #[rstest]
    // quarter of the WGS-84 equator
    #[case(0.0, 0.0, 0.0, 90.0, 10_018.754_171)]
    // quarter meridian
    #[case(0.0, 0.0, 90.0, 0.0, 10_001.965_729)]
    fn wgs84_geodesic(
        #[case] lat1: f64,
        #[case] lon1: f64,
        #[case] lat2: f64,
        #[case] lon2: f64,
        #[case] expected_km: f64,
    ) {
        let d = geodesic_km(lat1, lon1, lat2, lon2);
        assert!((d - expected_km).abs() < 1.0E-3, "{} != {}", d, expected_km);
    }

    #[test]
    fn geodesic_distance_model() {
        let observer = Observer::from_ddeg(0.0, 0.0).unwrap();
        let point = GroundPoint {
            latitude: -0.009151688758768407,
            longitude: -60.4999096156345,
        };
        let spherical = Visibility::evaluate(&observer, &point, &Config::default());
        let geodesic = Visibility::evaluate(
            &observer,
            &point,
            &Config::default().with_distance_model(DistanceModel::Geodesic),
        );
        // along the equator, the ellipsoid arc uses the equatorial radius
        let equatorial = 6378.137 * 60.4999096156345_f64.to_radians();
        assert!((geodesic.distance_km - equatorial).abs() < 0.5);
        assert!((geodesic.distance_km - spherical.distance_km - 7.5).abs() < 0.5);
        // elevation is independent of the distance model
        assert_eq!(geodesic.elevation, spherical.elevation);
        assert_eq!(geodesic.visible, spherical.visible);
    }
}
