use log::debug;
use std::f64::consts::PI;

use crate::{cfg::KeplerConfig, Error};

/// Above this eccentricity, Newton iterations start from π
/// rather than from the mean anomaly itself.
const HIGH_ECCENTRICITY: f64 = 0.8;

/// Bounded Newton-Raphson solver of Kepler's equation `E - e sin(E) = M`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KeplerSolver {
    /// Absolute tolerance on the residual
    tolerance: f64,
    /// Maximal number of Newton iterations
    max_iterations: usize,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self::new(KeplerConfig::default())
    }
}

impl KeplerSolver {
    /// Builds new [KeplerSolver] from given [KeplerConfig]
    pub fn new(cfg: KeplerConfig) -> Self {
        Self {
            tolerance: cfg.tolerance,
            max_iterations: cfg.max_iterations,
        }
    }
    /// Returns the eccentric anomaly E [rad] for given mean anomaly `m` [rad]
    /// and eccentricity `e`, with |E - e sin(E) - M| below tolerance.
    pub fn solve(&self, m: f64, e: f64) -> Result<f64, Error> {
        if !(0.0..1.0).contains(&e) {
            return Err(Error::UnsupportedEccentricity(e));
        }
        if !m.is_finite() {
            return Err(Error::NonConvergence {
                mean_anomaly: m,
                eccentricity: e,
                iterations: 0,
            });
        }

        let mut e_k = if e < HIGH_ECCENTRICITY { m } else { PI };

        for iteration in 0..=self.max_iterations {
            let residual = e_k - e * e_k.sin() - m;
            if residual.abs() < self.tolerance {
                debug!("kepler: M={} e={} converged in {} iterations", m, e, iteration);
                return Ok(e_k);
            }
            if iteration == self.max_iterations {
                break;
            }
            e_k -= residual / (1.0 - e * e_k.cos());
        }

        Err(Error::NonConvergence {
            mean_anomaly: m,
            eccentricity: e,
            iterations: self.max_iterations,
        })
    }
}
