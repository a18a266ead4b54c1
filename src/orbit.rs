use hifitime::Epoch;
use log::debug;
use nalgebra::{Rotation3, Vector3};
use std::f64::consts::TAU;

use crate::{
    cfg::{Config, FrameRotation},
    kepler::KeplerSolver,
    tle::OrbitalElements,
    Error,
};

/// Earth centered inertial position [km]
pub type InertialPosition = Vector3<f64>;

/// Two-body orbital state, resolved at a given instant
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitalState {
    /// Semi major axis [km]
    pub semi_major_axis: f64,
    /// Mean anomaly [rad], within [0, 2π)
    pub mean_anomaly: f64,
    /// Eccentric anomaly [rad]
    pub eccentric_anomaly: f64,
    /// True anomaly [rad]
    pub true_anomaly: f64,
    /// Orbital radius [km]
    pub radius: f64,
    /// ECI position [km]
    pub position: InertialPosition,
}

/// Two-body (unperturbed) propagator of [OrbitalElements]
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    solver: KeplerSolver,
    rotation: FrameRotation,
}

impl Propagator {
    /// Earth mass * Gravitational constant [km^3/s^2]
    pub const EARTH_GM_CONSTANT: f64 = 398600.4418;
    /// Seconds per solar day
    pub(crate) const DAY_SECONDS: f64 = 86400.0;

    /// Builds new [Propagator] from scanner [Config]
    pub fn new(cfg: &Config) -> Self {
        Self {
            solver: KeplerSolver::new(cfg.kepler),
            rotation: cfg.rotation,
        }
    }
    /// Resolves the [OrbitalState] `dt` seconds after (or before, when negative)
    /// the elements epoch.
    pub fn state(&self, elements: &OrbitalElements, dt: f64) -> Result<OrbitalState, Error> {
        let e = elements.eccentricity;

        let n = elements.mean_motion * TAU / Self::DAY_SECONDS;
        let a = (Self::EARTH_GM_CONSTANT / n.powi(2)).powf(1.0 / 3.0);

        let m_k = (elements.mean_anomaly + n * dt).rem_euclid(TAU);
        let e_k = self.solver.solve(m_k, e)?;

        let nu_k = 2.0
            * ((1.0 + e).sqrt() * (e_k / 2.0).sin()).atan2((1.0 - e).sqrt() * (e_k / 2.0).cos());
        let r_k = a * (1.0 - e * e_k.cos());

        let perifocal = Vector3::new(r_k * nu_k.cos(), r_k * nu_k.sin(), 0.0);

        let position = match self.rotation {
            FrameRotation::Planar => Self::planar_rotation(elements, perifocal),
            FrameRotation::Euler313 => Self::euler_rotation(elements, perifocal),
        };

        debug!(
            "propagation dt={:.3}s: M={:.6} E={:.6} v={:.6} r={:.3}km",
            dt, m_k, e_k, nu_k, r_k
        );

        Ok(OrbitalState {
            semi_major_axis: a,
            mean_anomaly: m_k,
            eccentric_anomaly: e_k,
            true_anomaly: nu_k,
            radius: r_k,
            position,
        })
    }
    /// Resolves the [InertialPosition] at given absolute instant
    pub fn position_at(
        &self,
        elements: &OrbitalElements,
        t: Epoch,
    ) -> Result<InertialPosition, Error> {
        let dt = (t - elements.epoch).to_seconds();
        Ok(self.state(elements, dt)?.position)
    }
    /// In-plane projection: only the (x, y) perifocal components contribute
    fn planar_rotation(elements: &OrbitalElements, perifocal: Vector3<f64>) -> InertialPosition {
        let (i, raan, argp) = (elements.inclination, elements.raan, elements.argp);
        let (xp_k, yp_k) = (perifocal[0], perifocal[1]);

        let (cos_o, sin_o) = (raan.cos(), raan.sin());
        let (cos_w, sin_w) = (argp.cos(), argp.sin());
        let (cos_i, sin_i) = (i.cos(), i.sin());

        let x_k = (cos_o * cos_w - sin_o * sin_w * cos_i) * xp_k
            + (-cos_o * sin_w - sin_o * cos_w * cos_i) * yp_k;
        let y_k = (sin_o * cos_w + cos_o * sin_w * cos_i) * xp_k
            + (-sin_o * sin_w + cos_o * cos_w * cos_i) * yp_k;
        let z_k = (sin_w * sin_i) * xp_k + (cos_w * sin_i) * yp_k;

        Vector3::new(x_k, y_k, z_k)
    }
    /// Full 3-1-3 Euler rotation
    fn euler_rotation(elements: &OrbitalElements, perifocal: Vector3<f64>) -> InertialPosition {
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), elements.raan)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), elements.inclination)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), elements.argp);
        rot * perifocal
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tests::{ISS, STARLINK_1007, STARLINK_1008};
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn elements(tle: (&str, &str, &str)) -> OrbitalElements {
        OrbitalElements::parse(tle.1, tle.2).unwrap()
    }

    #[test]
    fn zero_elapsed() {
        let propagator = Propagator::default();
        for tle in [STARLINK_1007, STARLINK_1008, ISS] {
            let elements = elements(tle);
            let state = propagator.state(&elements, 0.0).unwrap();
            assert_eq!(state.mean_anomaly, elements.mean_anomaly);

            let e = elements.eccentricity;
            let m = state.eccentric_anomaly - e * state.eccentric_anomaly.sin();
            assert!((m - elements.mean_anomaly).abs() < 1.0E-8);

            // true anomaly consistent with eccentric anomaly
            let cos_e = state.eccentric_anomaly.cos();
            let cos_nu = (cos_e - e) / (1.0 - e * cos_e);
            assert!((state.true_anomaly.cos() - cos_nu).abs() < 1.0E-9);

            assert!((state.position.norm() - state.radius).abs() < 1.0E-6);
        }
    }

    #[test]
    fn reference_positions() {
        let propagator = Propagator::default();
        for (tle, dt, semi_major_axis, ecef) in [
            (
                STARLINK_1007,
                0.0,
                6794.8630692169745,
                (-3396.723221641307, 5884.932899400551, -1.08532378569269),
            ),
            (
                STARLINK_1007,
                1200.0,
                6794.8630692169745,
                (-4192.489597915986, -722.1770502110905, 5297.418309221817),
            ),
            (
                STARLINK_1008,
                600.0,
                6925.375424596027,
                (3465.097926938678, -4440.732284482539, 4027.98420712025),
            ),
            (
                ISS,
                1800.0,
                6730.960676936836,
                (17.813113471572706, 6065.514782928138, -2916.7821582914466),
            ),
        ] {
            let state = propagator.state(&elements(tle), dt).unwrap();
            let err = (
                (ecef.0 - state.position[0]).abs(),
                (ecef.1 - state.position[1]).abs(),
                (ecef.2 - state.position[2]).abs(),
            );
            assert!(err.0 < 1.0E-6, "x(eci) error too large {}", err.0);
            assert!(err.1 < 1.0E-6, "y(eci) error too large {}", err.1);
            assert!(err.2 < 1.0E-6, "z(eci) error too large {}", err.2);
            assert!((state.semi_major_axis - semi_major_axis).abs() < 1.0E-6);
        }
    }

    #[test]
    fn backward_propagation() {
        let propagator = Propagator::default();
        let elements = elements(ISS);
        let n = elements.mean_motion * TAU / Propagator::DAY_SECONDS;
        let period = TAU / n;
        let now = propagator.state(&elements, 0.0).unwrap();
        let before = propagator.state(&elements, -period).unwrap();
        assert!((now.position - before.position).norm() < 1.0E-3);
    }

    #[test]
    fn rotations_agree_in_plane() {
        let mut rng = SmallRng::seed_from_u64(313);
        let planar = Propagator::default();
        let euler = Propagator::new(&Config::default().with_rotation(FrameRotation::Euler313));
        let mut elements = elements(STARLINK_1008);
        for _ in 0..1000 {
            elements.inclination = rng.random_range(0.0..std::f64::consts::PI);
            elements.raan = rng.random_range(0.0..TAU);
            elements.argp = rng.random_range(0.0..TAU);
            elements.eccentricity = rng.random_range(0.0..0.5);
            let dt = rng.random_range(-86400.0..86400.0);
            let p1 = planar.state(&elements, dt).unwrap().position;
            let p2 = euler.state(&elements, dt).unwrap().position;
            assert!((p1 - p2).norm() < 1.0E-6, "{} != {}", p1, p2);
        }
    }

    #[test]
    fn non_convergence_is_reported() {
        let propagator = Propagator::new(&Config {
            kepler: crate::cfg::KeplerConfig {
                tolerance: 0.0,
                max_iterations: 5,
            },
            ..Default::default()
        });
        let mut elements = elements(ISS);
        elements.eccentricity = 0.9;
        assert!(matches!(
            propagator.state(&elements, 10.0),
            Err(Error::NonConvergence { .. })
        ));
    }
}
