//! Command line front end to the guidance engine: replays recorded walks,
//! simulates new ones, answers restroom and catalog questions and runs
//! recorded marker sessions through the AR guide.

use clap::Parser;
use log::{error, info, warn};
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use waycue::{
    ar_guide::{read_marker_frames, ArGuide, FrameSize},
    args::{
        CatalogCommand, CommandTask, GuideArgs, MarkersCommand, ReplayCommand, RestroomsCommand,
        SimulateCommand,
    },
    audio_sink::LogSink,
    catalog::{restroom_title_en, Landmark, LandmarkCatalog, SectionEntry},
    config::{GuideConfig, Preferences},
    dummy_source::{DummyLocationSource, PolylineWalker},
    engine::{EngineOutput, ProximityGuidanceEngine},
    error::GuideError,
    gui::{list_selector, GuideGuiError},
    location::{Location, LocationHub},
    phrase::Language,
    speech::{SoundEffectChannel, SpeechQueue},
    trace_decoder::{read_trace, replay, write_trace, TraceEvent},
    venue::VenueFile,
};

// Example:
// cargo run --bin waycue --
//                        --venue   venue.ron
//                        --config  guide.ron replay
//                        --trace   walk.trace
//                        --speed   4

fn main() {
    env_logger::init();
    let args = GuideArgs::parse();

    if let Err(e) = run(args) {
        error!("{e}");
        eprintln!("waycue: {e}");
        std::process::exit(1);
    }
}

struct Setup {
    config: GuideConfig,
    venue: Arc<VenueFile>,
    preferences: Preferences,
}

fn load(args: &GuideArgs) -> Result<Setup, GuideError> {
    let config = match &args.config {
        Some(path) => GuideConfig::from_path(path)?,
        None => GuideConfig::default(),
    };
    let preferences = match &args.preferences {
        Some(path) => Preferences::load(path)?,
        None => Preferences::default(),
    };
    let venue = Arc::new(VenueFile::from_path(&args.venue)?);
    Ok(Setup {
        config,
        venue,
        preferences,
    })
}

fn run(args: GuideArgs) -> Result<(), GuideGuiError> {
    let setup = load(&args)?;
    match args.command {
        CommandTask::Replay(cmd) => run_replay(setup, cmd)?,
        CommandTask::Simulate(cmd) => run_simulate(setup, cmd)?,
        CommandTask::Restrooms(cmd) => run_restrooms(setup, cmd)?,
        CommandTask::Catalog(cmd) => run_catalog(setup, cmd)?,
        CommandTask::Markers(cmd) => run_markers(setup, cmd)?,
    }
    Ok(())
}

fn engine(setup: &Setup, sink: LogSink) -> ProximityGuidanceEngine {
    let catalog = LandmarkCatalog::new(setup.config.tables.clone(), setup.config.zones);
    ProximityGuidanceEngine::new(
        setup.config.profile,
        catalog,
        setup.venue.clone(),
        SpeechQueue::new(Arc::new(sink)),
        setup.config.phrasebook(),
        setup.preferences,
    )
    .with_floor_plans(setup.config.floor_plans.clone())
    .with_diagnostics_dir(setup.config.diagnostics_dir.clone())
}

fn print_output(output: &EngineOutput) {
    if let EngineOutput::Readout(readout) = output {
        for phrase in &readout.phrases {
            println!("{}\t{}", readout.location, phrase.text);
        }
    }
}

fn run_replay(setup: Setup, cmd: ReplayCommand) -> Result<(), GuideError> {
    let events = read_trace(&cmd.trace)?;
    // without pacing nobody would hear the speech anyway
    let sink = match cmd.speed {
        Some(_) => LogSink::default(),
        None => LogSink::instant(),
    };
    let hub = LocationHub::new();
    let handle = engine(&setup, sink).start(&hub);

    replay(&events, &hub, cmd.speed);
    for output in handle.outputs().try_iter() {
        print_output(&output);
    }
    for output in handle.stop()? {
        print_output(&output);
    }
    Ok(())
}

fn run_simulate(setup: Setup, cmd: SimulateCommand) -> Result<(), GuideError> {
    let route: Vec<Location> = read_trace(&cmd.route)?.into_iter().map(|e| e.location).collect();
    if route.len() < 2 {
        return Err(GuideError::InvalidConfig("a route needs at least two waypoints".into()));
    }
    if cmd.speed <= 0.0 {
        return Err(GuideError::InvalidConfig("walking speed must be positive".into()));
    }
    let walk = Duration::from_secs_f64(PolylineWalker::new(route.clone()).length() / cmd.speed);
    let tick = Duration::from_millis(cmd.interval_ms.max(1));

    let hub = LocationHub::new();
    let handle = engine(&setup, LogSink::default()).start(&hub);

    let recorded = Arc::new(Mutex::new(Vec::new()));
    let started = Instant::now();
    let recorder = Arc::clone(&recorded);
    let _recording = cmd.outfile.is_some().then(|| {
        hub.subscribe(move |event| {
            if let Ok(mut events) = recorder.lock() {
                events.push(TraceEvent {
                    t_ms: event.at.saturating_duration_since(started).as_millis() as u64,
                    location: event.location,
                });
            }
        })
    });

    let mut source = DummyLocationSource::start(hub.clone(), route, cmd.speed, tick);
    source.set_noise(cmd.noise)?;
    info!("walking for {:.1} s", walk.as_secs_f64());

    // a couple of extra samples at the end of the route
    let deadline = started + walk + tick * 2;
    while Instant::now() < deadline {
        if let Ok(output) = handle.outputs().recv_timeout(tick) {
            print_output(&output);
        }
    }
    source.stop()?;
    for output in handle.stop()? {
        print_output(&output);
    }

    if let Some(path) = &cmd.outfile {
        let events = match recorded.lock() {
            Ok(events) => events.clone(),
            Err(_) => {
                warn!("recording was interrupted");
                Vec::new()
            }
        };
        write_trace(path, &events)?;
        info!("{} samples written to {}", events.len(), path.display());
    }
    Ok(())
}

fn run_restrooms(setup: Setup, cmd: RestroomsCommand) -> Result<(), GuideGuiError> {
    let mut catalog = LandmarkCatalog::new(setup.config.tables.clone(), setup.config.zones);
    catalog.initialize(setup.venue.as_ref());
    let directory = catalog.restroom_directory();
    let current = Location::at(cmd.lat, cmd.lng).on_floor(cmd.floor);
    let english = setup.config.language == Language::En;
    let title = |s: &SectionEntry| {
        if english {
            restroom_title_en(&s.title)
        } else {
            s.title.clone()
        }
    };

    let kinds: Vec<_> = if cmd.pick {
        let titles: Vec<String> = directory.iter().map(title).collect();
        match list_selector("Restrooms", &titles)? {
            Some(i) => directory.iter().skip(i).take(1).collect(),
            None => return Ok(()),
        }
    } else {
        directory.iter().collect()
    };

    for kind in kinds {
        match catalog.find_restroom(kind, &current) {
            Some(found) => println!(
                "{}\tfloor {}\t{}",
                title(kind),
                found.floor.map_or_else(|| "?".to_owned(), |f| f.to_string()),
                found.node_id.as_deref().unwrap_or("-")
            ),
            None => println!("{}\tnot found", title(kind)),
        }
    }
    Ok(())
}

fn print_entries(heading: &str, entries: &[Landmark]) {
    println!("{heading}");
    for l in entries {
        println!(
            "  {}\t{}\t{}\tnode {}\tspot {}\t{}",
            l.id(),
            l.title(),
            l.title_en().unwrap_or("-"),
            l.node_location(),
            l.spot_location(),
            if l.is_exhibition_zone() { "exhibition" } else { "-" }
        );
    }
}

fn run_catalog(setup: Setup, cmd: CatalogCommand) -> Result<(), GuideError> {
    let mut catalog = LandmarkCatalog::new(setup.config.tables.clone(), setup.config.zones);
    catalog.initialize(setup.venue.as_ref());
    print_entries(&format!("floor {}", cmd.floor), &catalog.landmarks_for_floor(cmd.floor));
    if cmd.checkpoints {
        print_entries("checkpoints", &catalog.checkpoints_for_floor(cmd.floor));
    }
    Ok(())
}

fn run_markers(setup: Setup, cmd: MarkersCommand) -> Result<(), GuideError> {
    let frames = read_marker_frames(&cmd.observations)?;
    if setup.config.ar_markers.is_empty() {
        warn!("the configuration has no AR markers, nothing will be said");
    }
    let sink = Arc::new(LogSink::instant());
    let mut guide = ArGuide::new(
        setup.config.phrasebook(),
        SpeechQueue::new(sink.clone()),
        SoundEffectChannel::new(sink),
    );
    guide.set_frame_size(Some(FrameSize {
        width: cmd.width,
        height: cmd.height,
    }));
    guide.set_debug(cmd.debug || setup.preferences.debug_mode);

    let base = Instant::now();
    for frame in &frames {
        let at = base + Duration::from_millis(frame.t_ms);
        for phonation in guide.observe_frame(&frame.observations, |id| setup.config.ar_marker(id), at) {
            println!("{}\t{}", frame.t_ms, phonation.text);
        }
    }
    Ok(())
}
