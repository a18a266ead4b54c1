#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod cfg;
mod kepler;
mod observer;
mod scanner;
mod visibility;

mod catalog;
mod ground;
mod observation;
mod orbit;
mod tle;

// pub export
pub use scanner::Error;


// prelude
pub mod prelude {
    pub use crate::catalog::{Catalog, CatalogEntry};
    pub use crate::cfg::{Config, DistanceModel, FrameRotation, KeplerConfig};
    pub use crate::ground::{sidereal_angle, GroundPoint};
    pub use crate::kepler::KeplerSolver;
    pub use crate::observation::{Observation, ObservationRecord, TleLines};
    pub use crate::observer::Observer;
    pub use crate::orbit::{InertialPosition, OrbitalState, Propagator};
    pub use crate::scanner::{Error, SampleFailure, ScanReport, Scanner};
    pub use crate::tle::{checksum, OrbitalElements, TleRecord};
    pub use crate::visibility::Visibility;
    // re-export
    pub use hifitime::{Duration, Epoch, TimeScale, Unit};
    pub use nalgebra::Vector3;
}
