mod gui;

use std::{collections::HashMap, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use log::error;

use waycue::audio_sink::LogSink;
use waycue::catalog::LandmarkCatalog;
use waycue::config::{GuideConfig, Preferences};
use waycue::dummy_source::DummyLocationSource;
use waycue::engine::ProximityGuidanceEngine;
use waycue::error::GuideError;
use waycue::location::{Location, LocationHub};
use waycue::selector::GuidanceProfile;
use waycue::speech::SpeechQueue;
use waycue::trace_decoder::read_trace;
use waycue::venue::VenueFile;
use gui::{engage_gui, LandmarkInfo};

/// Distance check screen: walks a simulated route through the guidance
/// engine and shows what it sees.
#[derive(Debug, Parser)]
#[clap(version, about)]
struct MonitorArgs {
    /// Venue data, as RON
    #[arg(short = 'v', long = "venue")]
    venue: PathBuf,

    /// Guide configuration, as RON
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Trace file whose samples are the route's waypoints
    #[arg(short = 'r', long = "route")]
    route: PathBuf,

    /// Walking speed, in meters per second
    #[arg(short = 's', long = "speed", default_value_t = 1.0)]
    speed: f64,

    /// Position jitter, in meters
    #[arg(short = 'n', long = "noise", default_value_t = 0.5)]
    noise: f64,
}

fn main() {
    env_logger::init();
    let args = MonitorArgs::parse();
    if let Err(e) = run(args) {
        error!("{e}");
        eprintln!("monitor: {e}");
        std::process::exit(1);
    }
}

fn run(args: MonitorArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => GuideConfig::from_path(path)?,
        None => GuideConfig {
            profile: GuidanceProfile::DistanceCheck,
            ..GuideConfig::default()
        },
    };
    let venue = Arc::new(VenueFile::from_path(&args.venue)?);
    let route: Vec<Location> = read_trace(&args.route)?.into_iter().map(|e| e.location).collect();
    if route.len() < 2 {
        return Err(GuideError::InvalidConfig("a route needs at least two waypoints".into()).into());
    }

    let mut names = LandmarkCatalog::new(config.tables.clone(), config.zones);
    names.initialize(venue.as_ref());
    let landmarks: HashMap<String, LandmarkInfo> = names
        .landmarks()
        .iter()
        .map(|l| {
            (
                l.id().to_owned(),
                LandmarkInfo {
                    title: l.title_en().unwrap_or(l.title()).to_owned(),
                    location: *l.node_location(),
                },
            )
        })
        .collect();

    let engine = ProximityGuidanceEngine::new(
        config.profile,
        LandmarkCatalog::new(config.tables.clone(), config.zones),
        venue,
        SpeechQueue::new(Arc::new(LogSink::default())),
        config.phrasebook(),
        Preferences::default(),
    )
    .with_floor_plans(config.floor_plans.clone());

    let hub = LocationHub::new();
    let handle = engine.start(&hub);
    let mut source = DummyLocationSource::start(hub, route, args.speed, Duration::from_millis(500));
    source.set_noise(args.noise)?;

    let handle = engage_gui(handle, landmarks)?;

    source.stop()?;
    handle.stop()?;
    Ok(())
}
