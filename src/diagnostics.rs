//! Side outputs for people debugging a walk: a CSV log of every phrase the
//! selector produced, and the per-update [`Readout`] for screens.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::{info, warn};

use crate::location::Location;
use crate::phrase::Phonation;
use crate::selector::PositionCandidate;

const HEADER: &str = "time,lng,lat,text,distance,angle,spot_lng,spot_lat";

/// Best-effort CSV log. Any I/O failure is logged once and turns the log
/// off for the rest of the session.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}

/// Quotes a CSV field when it has to be.
fn field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_owned()
    }
}

impl DiagnosticLog {
    /// A log that writes nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Opens a fresh log file in `dir`. Failing to create it leaves the log
    /// disabled.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let path = dir.as_ref().join(format!("guide_log_{secs}.csv"));
        Self::at_path(path)
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let opened = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| File::create(&path))
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                writeln!(writer, "{HEADER}")?;
                Ok(writer)
            });
        match opened {
            Ok(writer) => {
                info!("diagnostic log at {}", path.display());
                Self {
                    path: Some(path),
                    writer: Some(writer),
                }
            }
            Err(e) => {
                warn!("cannot open diagnostic log {}: {e}", path.display());
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// One row for a phrase emitted at `current` about `candidate`.
    pub fn record(&mut self, current: &Location, text: &str, candidate: &PositionCandidate) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let row = format!(
            "{},{},{},{},{},{},{},{}",
            timestamp(),
            current.lng,
            current.lat,
            field(text),
            candidate.distance,
            candidate.angle,
            candidate.lng,
            candidate.lat
        );
        if let Err(e) = writeln!(writer, "{row}") {
            warn!("diagnostic log write failed, disabling: {e}");
            self.writer = None;
        }
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!("diagnostic log flush failed, disabling: {e}");
                self.writer = None;
            }
        }
    }
}

/// What the engine knew after one location callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    /// The raw sample, updated on every callback.
    pub location: Location,
    /// Committed human floor, if any.
    pub floor: Option<i32>,
    /// Distance to each landmark of the floor, refreshed on evaluations.
    pub distances: Vec<(String, f64)>,
    /// Whether the sample made it through the gate.
    pub evaluated: bool,
    /// Everything enqueued for speech while handling the sample.
    pub phrases: Vec<Phonation>,
}

impl Readout {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            floor: None,
            distances: Vec::new(),
            evaluated: false,
            phrases: Vec::new(),
        }
    }
}
