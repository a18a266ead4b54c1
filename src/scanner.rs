//! Visibility scanner
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use hifitime::{Duration, Epoch, TimeSeries};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    catalog::{Catalog, CatalogEntry},
    cfg::Config,
    ground::GroundPoint,
    observation::Observation,
    observer::Observer,
    orbit::Propagator,
    visibility::Visibility,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("malformed tle line {line}: invalid {field} in \"{content}\"")]
    MalformedTle {
        line: u8,
        field: &'static str,
        content: String,
    },
    #[error("eccentricity {0} is not an elliptical orbit")]
    UnsupportedEccentricity(f64),
    #[error("kepler solver did not converge (M={mean_anomaly}, e={eccentricity}) after {iterations} iterations")]
    NonConvergence {
        mean_anomaly: f64,
        eccentricity: f64,
        iterations: usize,
    },
    #[error("degenerate inertial position")]
    DegeneratePosition,
    #[error("invalid range {0} km")]
    InvalidRange(f64),
    #[error("invalid time window: {end} is prior to {start}")]
    InvalidTimeWindow { start: Epoch, end: Epoch },
    #[error("invalid sampling step {0}")]
    InvalidSamplingStep(Duration),
    #[error("invalid observer coordinates ({latitude}°, {longitude}°)")]
    InvalidObserver { latitude: f64, longitude: f64 },
    #[error("duplicate satellite name \"{0}\"")]
    DuplicateName(String),
    #[error("catalog entry #{id} \"{name}\": {source}")]
    CatalogEntry {
        id: u32,
        name: String,
        source: Box<Error>,
    },
    #[cfg(feature = "serde")]
    #[error("json: {0}")]
    Json(String),
}

/// Propagation failure of one satellite at one time sample.
/// That pair is skipped, the scan carries on.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFailure {
    /// Catalog identifier
    pub id: u32,
    /// Satellite name
    pub name: String,
    /// Time sample
    pub epoch: Epoch,
    /// Cause
    pub error: Error,
}

impl std::fmt::Display for SampleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?} - {} (#{}): {}", self.epoch, self.name, self.id, self.error)
    }
}

/// Scan results
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// In range satellites, ordered by time sample then catalog order
    pub observations: Vec<Observation>,
    /// Skipped (satellite, time sample) pairs
    pub failures: Vec<SampleFailure>,
    /// False when the scan was aborted: only the time samples that
    /// fully completed are then reported.
    pub complete: bool,
}

impl ScanReport {
    /// Iterates visible [Observation]s only
    pub fn visible(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(|obs| obs.visible())
    }
}

/// Stateless visibility scanner: the [Catalog] is provided on each request.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    cfg: Config,
    propagator: Propagator,
}

/// Outcome of one (satellite, time sample) evaluation
type Sample = Result<Option<Observation>, SampleFailure>;

impl Scanner {
    /// Builds new [Scanner] using given [Config]uration
    pub fn new(cfg: Config) -> Self {
        let propagator = Propagator::new(&cfg);
        Self { cfg, propagator }
    }
    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.cfg
    }
    /// Scans the [Catalog] for satellites within `max_range_km` of the [Observer],
    /// every sampling step from `start` to `end` (inclusive).
    /// A single time sample is evaluated when `end` is omitted.
    pub fn scan(
        &self,
        catalog: &Catalog,
        observer: &Observer,
        max_range_km: f64,
        start: Epoch,
        end: Option<Epoch>,
    ) -> Result<ScanReport, Error> {
        self.scan_with_abort(
            catalog,
            observer,
            max_range_km,
            start,
            end,
            &AtomicBool::new(false),
        )
    }
    /// Same as [Scanner::scan], checking `abort` in between time samples.
    pub fn scan_with_abort(
        &self,
        catalog: &Catalog,
        observer: &Observer,
        max_range_km: f64,
        start: Epoch,
        end: Option<Epoch>,
        abort: &AtomicBool,
    ) -> Result<ScanReport, Error> {
        self.scan_with_progress(
            catalog,
            observer,
            max_range_km,
            start,
            end,
            abort,
            |_, _| {},
        )
    }
    /// Same as [Scanner::scan_with_abort], `progress` is invoked with the
    /// report built so far, each time a time sample completes.
    #[allow(clippy::too_many_arguments)]
    pub fn scan_with_progress<F: FnMut(Epoch, &ScanReport)>(
        &self,
        catalog: &Catalog,
        observer: &Observer,
        max_range_km: f64,
        start: Epoch,
        end: Option<Epoch>,
        abort: &AtomicBool,
        mut progress: F,
    ) -> Result<ScanReport, Error> {
        let end = end.unwrap_or(start);
        self.validate(max_range_km, start, end)?;

        let mut report = ScanReport {
            complete: true,
            ..Default::default()
        };

        for t in TimeSeries::inclusive(start, end, self.cfg.sampling_step) {
            if abort.load(Ordering::Relaxed) {
                warn!("{:?} - scan aborted", t);
                report.complete = false;
                break;
            }
            for sample in self.sweep(catalog, observer, max_range_km, t) {
                match sample {
                    Ok(Some(obs)) => report.observations.push(obs),
                    Ok(None) => {},
                    Err(failure) => {
                        warn!("{}", failure);
                        report.failures.push(failure);
                    },
                }
            }
            debug!("{:?} - {} satellites in range so far", t, report.observations.len());
            progress(t, &report);
        }

        info!(
            "scan {:?} - {:?}: {} observations ({} visible), {} failures",
            start,
            end,
            report.observations.len(),
            report.visible().count(),
            report.failures.len()
        );
        Ok(report)
    }
    /// Rejects invalid requests before any computation
    fn validate(&self, max_range_km: f64, start: Epoch, end: Epoch) -> Result<(), Error> {
        if !(max_range_km >= 0.0 && max_range_km.is_finite()) {
            return Err(Error::InvalidRange(max_range_km));
        }
        if end < start {
            return Err(Error::InvalidTimeWindow { start, end });
        }
        if self.cfg.sampling_step <= Duration::ZERO {
            return Err(Error::InvalidSamplingStep(self.cfg.sampling_step));
        }
        Ok(())
    }
    /// Evaluates the whole catalog at instant `t`, in catalog order
    #[cfg(not(feature = "parallel"))]
    fn sweep(
        &self,
        catalog: &Catalog,
        observer: &Observer,
        max_range_km: f64,
        t: Epoch,
    ) -> Vec<Sample> {
        catalog
            .iter()
            .map(|entry| self.evaluate(entry, observer, max_range_km, t))
            .collect()
    }
    /// Evaluates the whole catalog at instant `t`. Indexed collection
    /// preserves catalog order.
    #[cfg(feature = "parallel")]
    fn sweep(
        &self,
        catalog: &Catalog,
        observer: &Observer,
        max_range_km: f64,
        t: Epoch,
    ) -> Vec<Sample> {
        catalog
            .entries()
            .par_iter()
            .map(|entry| self.evaluate(entry, observer, max_range_km, t))
            .collect()
    }
    /// Evaluates one satellite at instant `t`
    fn evaluate(
        &self,
        entry: &CatalogEntry,
        observer: &Observer,
        max_range_km: f64,
        t: Epoch,
    ) -> Sample {
        let failure = |error: Error| SampleFailure {
            id: entry.id,
            name: entry.tle.name.clone(),
            epoch: t,
            error,
        };

        let position = self
            .propagator
            .position_at(&entry.elements, t)
            .map_err(failure)?;

        let point = GroundPoint::from_inertial(&position, t).map_err(failure)?;

        let visibility = Visibility::evaluate(observer, &point, &self.cfg);

        if visibility.distance_km <= max_range_km {
            debug!(
                "{:?} - {} (#{}) in range: {:.3} km, elev {:.3}°",
                t, entry.tle.name, entry.id, visibility.distance_km, visibility.elevation
            );
            Ok(Some(Observation::new(
                entry.id,
                entry.tle.clone(),
                t,
                point,
                visibility,
            )))
        } else {
            Ok(None)
        }
    }
}
