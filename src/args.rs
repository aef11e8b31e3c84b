// Commandline argument parser using clap for WayCue

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct GuideArgs {
    #[command(subcommand)]
    /// Which task to perform
    pub command: CommandTask,

    /// Venue data: destinations and the facility directory, as RON
    #[arg(short = 'v', long = "venue")]
    pub venue: PathBuf,

    /// Guide configuration, as RON. Built-in defaults when left out
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Persisted preferences (voice guide, debug mode), as RON
    #[arg(short = 'p', long = "prefs")]
    pub preferences: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CommandTask {
    /// Feed a recorded location trace through the guidance engine
    #[command(about)]
    Replay(ReplayCommand),

    /// Walk a route with a simulated positioning system
    #[command(about)]
    Simulate(SimulateCommand),

    /// Find the nearest restroom of a kind
    #[command(about)]
    Restrooms(RestroomsCommand),

    /// List the announceable landmarks of a floor
    #[command(about)]
    Catalog(CatalogCommand),

    /// Run recorded camera marker sightings through the AR guide
    #[command(about)]
    Markers(MarkersCommand),
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct ReplayCommand {
    /// Trace file, one `+LOC:` line per sample
    #[arg(short = 't', long = "trace")]
    pub trace: PathBuf,

    /// Playback speed relative to the recording. Back to back when left out
    #[arg(short = 's', long = "speed")]
    pub speed: Option<f64>,
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct SimulateCommand {
    /// Trace file whose samples are used as the route's waypoints
    #[arg(short = 'r', long = "route")]
    pub route: PathBuf,

    /// Walking speed, in meters per second
    #[arg(short = 's', long = "speed", default_value_t = 1.0)]
    pub speed: f64,

    /// Position jitter, in meters
    #[arg(short = 'n', long = "noise", default_value_t = 0.0)]
    pub noise: f64,

    /// Time between samples, in milliseconds
    #[arg(short = 'i', long = "interval", default_value_t = 500)]
    pub interval_ms: u64,

    /// Where to record the simulated samples as a trace
    #[arg(short = 'o', long = "out")]
    pub outfile: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct RestroomsCommand {
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Ground floor as the positioning system reports it
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
    pub floor: f64,

    /// Pick the kind from a list instead of printing the directory
    #[arg(long)]
    pub pick: bool,
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct CatalogCommand {
    /// Human floor number
    #[arg(short = 'f', long = "floor", allow_hyphen_values = true)]
    pub floor: i32,

    /// Also list the checkpoint entries
    #[arg(long)]
    pub checkpoints: bool,
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct MarkersCommand {
    /// Marker session, a RON list of frames with their observations
    #[arg(short = 'o', long = "observations")]
    pub observations: PathBuf,

    /// Camera frame width, in pixels
    #[arg(long, default_value_t = 1080.0)]
    pub width: f64,

    /// Camera frame height, in pixels
    #[arg(long, default_value_t = 1920.0)]
    pub height: f64,

    /// Say guidance regardless of its trigger distance
    #[arg(short = 'd', long)]
    pub debug: bool,
}
