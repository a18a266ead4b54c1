use hifitime::{Duration, Unit};

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Rotation from the perifocal plane into the inertial frame.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FrameRotation {
    /// Closed form projection of the in-plane (x, y) perifocal components.
    /// This is the historical behavior all reference values are built on.
    #[default]
    Planar,
    /// Complete R3(Ω)·R1(i)·R3(ω) rotation applied to the 3D perifocal vector
    #[cfg_attr(feature = "serde", serde(rename = "euler-313", alias = "euler313"))]
    Euler313,
}

impl std::fmt::Display for FrameRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Planar => write!(f, "planar"),
            Self::Euler313 => write!(f, "euler-313"),
        }
    }
}

impl std::str::FromStr for FrameRotation {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planar" => Ok(Self::Planar),
            "euler-313" | "euler313" => Ok(Self::Euler313),
            other => Err(format!("unknown frame rotation \"{}\"", other)),
        }
    }
}

/// Ground distance evaluation between observer and sub-point
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DistanceModel {
    /// Haversine great circle on a sphere of [Config::earth_radius_km]
    #[default]
    Spherical,
    /// Geodesic on the WGS-84 ellipsoid
    Geodesic,
}

impl std::fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Spherical => write!(f, "spherical"),
            Self::Geodesic => write!(f, "geodesic"),
        }
    }
}

impl std::str::FromStr for DistanceModel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spherical" => Ok(Self::Spherical),
            "geodesic" | "wgs84" => Ok(Self::Geodesic),
            other => Err(format!("unknown distance model \"{}\"", other)),
        }
    }
}

/// Kepler equation solver settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct KeplerConfig {
    /// Absolute tolerance on the Kepler equation residual [rad]
    pub tolerance: f64,
    /// Newton-Raphson iteration cap. Exceeding it is reported
    /// as a non convergence rather than looping forever.
    pub max_iterations: usize,
}

impl Default for KeplerConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.0E-8,
            max_iterations: 100,
        }
    }
}

/// Scanner configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Config {
    /// Time series sampling period
    pub sampling_step: Duration,
    /// Elevation [°] a satellite must exceed to be declared visible
    pub min_elevation: f64,
    /// Spherical Earth radius [km] used in ground distance evaluation
    pub earth_radius_km: f64,
    /// Ground distance model
    pub distance_model: DistanceModel,
    /// Perifocal to inertial frame rotation
    pub rotation: FrameRotation,
    /// Kepler solver settings
    pub kepler: KeplerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampling_step: 10.0 * Unit::Minute,
            min_elevation: 10.0,
            earth_radius_km: 6371.009,
            distance_model: DistanceModel::default(),
            rotation: FrameRotation::default(),
            kepler: KeplerConfig::default(),
        }
    }
}

impl Config {
    /// Returns a copy of Self with given sampling period
    pub fn with_sampling_step(&self, step: Duration) -> Self {
        let mut s = self.clone();
        s.sampling_step = step;
        s
    }
    /// Returns a copy of Self using given [FrameRotation]
    pub fn with_rotation(&self, rotation: FrameRotation) -> Self {
        let mut s = self.clone();
        s.rotation = rotation;
        s
    }
    /// Returns a copy of Self using given [DistanceModel]
    pub fn with_distance_model(&self, model: DistanceModel) -> Self {
        let mut s = self.clone();
        s.distance_model = model;
        s
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn default_preset() {
        let cfg = Config::default();
        assert_eq!(cfg.sampling_step, 600.0 * Unit::Second);
        assert_eq!(cfg.min_elevation, 10.0);
        assert_eq!(cfg.kepler.max_iterations, 100);
        assert_eq!(cfg.rotation, FrameRotation::Planar);
        assert_eq!(cfg.distance_model, DistanceModel::Spherical);
    }

    #[test]
    fn rotation_names() {
        for rotation in [FrameRotation::Planar, FrameRotation::Euler313] {
            assert_eq!(FrameRotation::from_str(&rotation.to_string()), Ok(rotation));
        }
        assert!(FrameRotation::from_str("zxz").is_err());
        for model in [DistanceModel::Spherical, DistanceModel::Geodesic] {
            assert_eq!(DistanceModel::from_str(&model.to_string()), Ok(model));
        }
        assert!(DistanceModel::from_str("flat").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_config() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "min-elevation": 25.0,
                "rotation": "euler313",
                "distance-model": "geodesic",
                "kepler": { "max-iterations": 20 }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.min_elevation, 25.0);
        assert_eq!(cfg.rotation, FrameRotation::Euler313);
        assert_eq!(cfg.kepler.max_iterations, 20);
        assert_eq!(cfg.kepler.tolerance, 1.0E-8);
        assert_eq!(cfg.distance_model, DistanceModel::Geodesic);
        assert_eq!(cfg.sampling_step, Config::default().sampling_step);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_names_match_display() {
        for rotation in [FrameRotation::Planar, FrameRotation::Euler313] {
            let json = format!("{{ \"rotation\": \"{}\" }}", rotation);
            let cfg: Config = serde_json::from_str(&json).unwrap();
            assert_eq!(cfg.rotation, rotation);
        }
        for model in [DistanceModel::Spherical, DistanceModel::Geodesic] {
            let json = format!("{{ \"distance-model\": \"{}\" }}", model);
            let cfg: Config = serde_json::from_str(&json).unwrap();
            assert_eq!(cfg.distance_model, model);
        }
    }
}
