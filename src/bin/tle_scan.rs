use clap::Parser;
use log::{error, info};
use std::{fs, path::PathBuf, str::FromStr};

use orbit_scan::prelude::{
    Catalog, Config, DistanceModel, Epoch, FrameRotation, ObservationRecord, Observer, Scanner,
    Unit,
};

#[derive(Parser, Debug)]
#[command(version, about = "Lists the TLE catalog satellites passing near a ground location")]
struct Opts {
    /// TLE catalog: 3-line text blocks, or the structured JSON
    /// form when the file name ends with ".json"
    #[arg(long)]
    catalog: PathBuf,

    /// Observer latitude [°]
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Observer longitude [°]
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Maximal ground distance [km]
    #[arg(long)]
    range_km: f64,

    /// First time sample, for example "2024-02-14T12:00:00 UTC"
    #[arg(long, value_parser = parse_epoch)]
    start: Epoch,

    /// Last time sample (inclusive). Single sample scan when omitted.
    #[arg(long, value_parser = parse_epoch)]
    end: Option<Epoch>,

    /// Sampling step [min]
    #[arg(long)]
    step_min: Option<f64>,

    /// Visibility threshold [°]
    #[arg(long)]
    min_elevation: Option<f64>,

    /// Perifocal to inertial rotation: "planar" or "euler-313"
    #[arg(long)]
    rotation: Option<FrameRotation>,

    /// Ground distance model: "spherical" or "geodesic" (WGS-84)
    #[arg(long)]
    distance_model: Option<DistanceModel>,

    /// JSON scanner configuration. Command line options take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Abort on the first malformed catalog entry, instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Print one summary line per observation instead of JSON records
    #[arg(long)]
    summary: bool,
}

fn parse_epoch(s: &str) -> Result<Epoch, String> {
    Epoch::from_str(s).map_err(|e| format!("invalid epoch \"{}\": {}", s, e))
}

fn load_catalog(opts: &Opts) -> Result<Catalog, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(&opts.catalog)?;
    let json = opts
        .catalog
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let catalog = match (json, opts.strict) {
        (true, true) => Catalog::from_json(&content)?,
        (false, true) => Catalog::from_text(&content)?,
        (json, false) => {
            let (catalog, errors) = if json {
                Catalog::from_json_lossy(&content)?
            } else {
                Catalog::from_text_lossy(&content)
            };
            if !errors.is_empty() {
                error!("skipped {} catalog entries", errors.len());
            }
            catalog
        },
    };
    info!("loaded {} catalog entries", catalog.len());
    Ok(catalog)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let opts = Opts::parse();

    let mut cfg = match &opts.config {
        Some(path) => serde_json::from_str::<Config>(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(step) = opts.step_min {
        cfg.sampling_step = step * Unit::Minute;
    }
    if let Some(min_elevation) = opts.min_elevation {
        cfg.min_elevation = min_elevation;
    }
    if let Some(rotation) = opts.rotation {
        cfg.rotation = rotation;
    }
    if let Some(model) = opts.distance_model {
        cfg.distance_model = model;
    }

    let catalog = load_catalog(&opts)?;
    let observer = Observer::from_ddeg(opts.lat, opts.lon)?;

    let report = Scanner::new(cfg).scan(&catalog, &observer, opts.range_km, opts.start, opts.end)?;

    if opts.summary {
        if report.observations.is_empty() {
            println!("No satellites nearby.");
        }
        for obs in &report.observations {
            println!("{}", obs);
        }
    } else {
        let records = report
            .observations
            .iter()
            .map(|obs| obs.record())
            .collect::<Vec<ObservationRecord>>();
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    Ok(())
}
