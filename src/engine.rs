//! The proximity guidance engine. One value of [`ProximityGuidanceEngine`]
//! owns all guidance state (floor tracking, the checkpoint, the recently
//! announced ring) and is driven by location callbacks, one at a time.
//!
//! Per callback:
//! 1. make sure the landmark catalog is built,
//! 2. feed the floor tracker, rebuilding the floor's entries on a change,
//! 3. announce the floor if a change or a request is pending,
//! 4. unless guidance is inactive or voice guidance is off, pass the sample
//!    through the checkpoint gate and run the selector,
//! 5. speak one phrase per selected landmark, nearest first.
//!
//! [`ProximityGuidanceEngine::start`] runs an engine on its own thread, fed
//! by a [`LocationHub`] subscription.

use std::{
    fmt,
    path::PathBuf,
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread::JoinHandle,
    time::Duration,
};

use log::{debug, info, warn};

use crate::catalog::{Landmark, LandmarkCatalog};
use crate::component::{run_component, Component, ComponentError};
use crate::config::Preferences;
use crate::diagnostics::{DiagnosticLog, Readout};
use crate::error::GuideError;
use crate::floor_plan::{floor_sentence, FloorPlan};
use crate::gate::{CheckpointGate, FloorTracker, GateDecision};
use crate::location::{Location, LocationEvent, LocationHub, Subscription};
use crate::phrase::{fill, Language, Phrasebook};
use crate::selector::{distances, nearest, ConeConfig, GuidanceProfile, ProximitySelector};
use crate::speech::SpeechQueue;
use crate::venue::VenueSource;

/// Something the engine can be asked to do from another thread.
#[derive(Debug, Clone)]
pub enum EngineInput {
    Location(LocationEvent),
    SetActive(bool),
    SetPreferences(Preferences),
    AnnounceFloor,
    NearLocation(Location),
    NearLocationSpeak(Location),
}

/// The engine's answer to one [`EngineInput`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Readout(Readout),
    Near(Option<NearLandmark>),
    Applied,
}

/// The nearest landmark, ready to be shown and read out.
#[derive(Debug, Clone, PartialEq)]
pub struct NearLandmark {
    pub text: String,
    pub accessibility: String,
}

pub struct ProximityGuidanceEngine {
    profile: GuidanceProfile,
    cones: ConeConfig,
    catalog: LandmarkCatalog,
    venue: Arc<dyn VenueSource + Send + Sync>,
    speech: SpeechQueue,
    phrasebook: Phrasebook,
    preferences: Preferences,
    floor_plans: Vec<FloorPlan>,
    diagnostics_dir: Option<PathBuf>,
    diagnostics: DiagnosticLog,
    gate: CheckpointGate,
    floors: FloorTracker,
    selector: ProximitySelector,
    entries: Vec<Landmark>,
    checkpoints: Vec<Landmark>,
    /// `entries` then `checkpoints`: everything proximity is measured to.
    targets: Vec<Landmark>,
    floor_announcement_due: bool,
    last_floor_sentence: String,
    active: bool,
}

impl fmt::Display for ProximityGuidanceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.profile {
            GuidanceProfile::Custom(_) => write!(f, "ProximityGuidanceEngine(Custom)"),
            profile => write!(f, "ProximityGuidanceEngine({profile:?})"),
        }
    }
}

impl fmt::Debug for ProximityGuidanceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProximityGuidanceEngine")
            .field("profile", &self.profile)
            .field("floor", &self.floors.committed())
            .field("entries", &self.entries.len())
            .field("active", &self.active)
            .finish()
    }
}

impl ProximityGuidanceEngine {
    pub fn new(
        profile: GuidanceProfile,
        catalog: LandmarkCatalog,
        venue: Arc<dyn VenueSource + Send + Sync>,
        speech: SpeechQueue,
        phrasebook: Phrasebook,
        preferences: Preferences,
    ) -> Self {
        let cones = profile.config();
        Self {
            profile,
            cones,
            catalog,
            venue,
            speech,
            phrasebook,
            preferences,
            floor_plans: Vec::new(),
            diagnostics_dir: None,
            diagnostics: DiagnosticLog::disabled(),
            gate: CheckpointGate::new(Duration::from_secs_f64(cones.check_interval), cones.check_distance),
            floors: FloorTracker::default(),
            selector: ProximitySelector::new(cones),
            entries: Vec::new(),
            checkpoints: Vec::new(),
            targets: Vec::new(),
            floor_announcement_due: false,
            last_floor_sentence: String::new(),
            active: true,
        }
    }

    pub fn with_floor_plans(mut self, floor_plans: Vec<FloorPlan>) -> Self {
        self.floor_plans = floor_plans;
        self
    }

    /// Where to put CSV logs while debug mode is on.
    pub fn with_diagnostics_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.diagnostics_dir = dir;
        let preferences = self.preferences;
        self.set_preferences(preferences);
        self
    }

    pub fn catalog(&self) -> &LandmarkCatalog {
        &self.catalog
    }

    /// Announceable entries of the committed floor.
    pub fn entries(&self) -> &[Landmark] {
        &self.entries
    }

    pub fn checkpoints(&self) -> &[Landmark] {
        &self.checkpoints
    }

    pub fn committed_floor(&self) -> Option<i32> {
        self.floors.committed()
    }

    pub fn speech(&self) -> &SpeechQueue {
        &self.speech
    }

    pub fn selector(&self) -> &ProximitySelector {
        &self.selector
    }

    /// Turns guidance on or off. Either way, anything waiting to be said is
    /// dropped.
    pub fn set_active(&mut self, active: bool) {
        self.speech.clear();
        self.active = active;
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
        match (preferences.debug_mode, &self.diagnostics_dir) {
            (true, Some(dir)) if !self.diagnostics.is_enabled() => {
                self.diagnostics = DiagnosticLog::in_dir(dir);
            }
            (false, _) if self.diagnostics.is_enabled() => {
                self.diagnostics.flush();
                self.diagnostics = DiagnosticLog::disabled();
            }
            _ => {}
        }
    }

    /// Asks for the floor to be announced on the next callback.
    pub fn announce_floor(&mut self) {
        self.floor_announcement_due = true;
    }

    /// Switches to `floor` (human numbering) right away.
    pub fn commit_floor(&mut self, floor: i32) {
        self.entries = self.catalog.landmarks_for_floor(floor);
        self.checkpoints = self.catalog.checkpoints_for_floor(floor);
        self.targets = self.entries.iter().chain(&self.checkpoints).cloned().collect();
        self.floor_announcement_due = true;
        info!(
            "floor {floor}: {} entries, {} checkpoints",
            self.entries.len(),
            self.checkpoints.len()
        );
    }

    fn speak_floor(&mut self, current: &Location) {
        let zones = self.catalog.zones();
        let Some(sentence) = floor_sentence(
            &self.floor_plans,
            current.human_floor(),
            zones.is_exhibition_zone(current),
            zones.is_symbol_zone(current),
            &self.phrasebook,
        ) else {
            return;
        };
        if sentence.is_empty() || sentence == self.last_floor_sentence {
            return;
        }
        if self.preferences.voice_guide_on {
            self.speech.enqueue(&sentence);
        }
        self.last_floor_sentence = sentence;
    }

    /// Processes one location sample.
    pub fn handle(&mut self, event: &LocationEvent) -> Readout {
        let current = event.location;

        let was_ready = self.catalog.is_initialized();
        if self.catalog.initialize(self.venue.as_ref()) && !was_ready {
            if let Some(floor) = self.floors.committed() {
                self.commit_floor(floor);
            }
        }

        if let Some(floor) = self.floors.observe(current.human_floor()) {
            self.commit_floor(floor);
        }
        if self.floor_announcement_due {
            self.speak_floor(&current);
            self.floor_announcement_due = false;
        }

        let mut readout = Readout::new(current);
        readout.floor = self.floors.committed();

        if !self.active || !self.preferences.voice_guide_on {
            return readout;
        }

        let previous = match self.gate.offer(event) {
            GateDecision::Passed { previous, .. } => previous,
            _ => return readout,
        };

        let in_exhibition = self.catalog.zones().is_exhibition_zone(&current);
        let candidates = self
            .selector
            .select(&self.targets, &previous.location, &current, in_exhibition);
        debug!(
            "evaluated at {current}: {} of {} entries selected",
            candidates.len(),
            self.targets.len()
        );
        readout.evaluated = true;
        readout.distances = distances(&self.targets, &current);

        for candidate in &candidates {
            let Some(phrase) = candidate.phrase(&self.cones, &self.phrasebook) else {
                continue;
            };
            self.speech.enqueue(&phrase.pron);
            self.diagnostics.record(&current, &phrase.pron, candidate);
            readout.phrases.push(phrase);
        }
        readout
    }

    /// The nearest entry or checkpoint of the committed floor within the
    /// front radius.
    pub fn near_location(&self, current: &Location) -> Option<NearLandmark> {
        let (landmark, _) = nearest(&self.targets, current, self.cones.front_radius)?;
        match (self.phrasebook.language, landmark.title_en()) {
            (Language::En, Some(en)) => Some(NearLandmark {
                text: en.to_owned(),
                accessibility: en.to_owned(),
            }),
            _ => Some(NearLandmark {
                text: landmark.title().to_owned(),
                accessibility: landmark.title_pron().to_owned(),
            }),
        }
    }

    /// Says "Near X" for the nearest entry, if there is one and voice
    /// guidance is on.
    pub fn near_location_speak(&self, current: &Location) -> Option<NearLandmark> {
        let near = self.near_location(current)?;
        if self.preferences.voice_guide_on {
            self.speech.enqueue(&fill(&self.phrasebook.near, &near.accessibility));
        }
        Some(near)
    }

    /// Moves the engine onto its own thread, fed by `hub`.
    pub fn start(self, hub: &LocationHub) -> EngineHandle {
        let (input_tx, input_rx) = mpsc::channel::<EngineInput>();
        let (output_tx, output_rx) = mpsc::channel::<EngineOutput>();

        info!("{self} starting");
        let worker = run_component(Box::new(self), input_rx, output_tx);

        let feed = input_tx.clone();
        let subscription = hub.subscribe(move |event| {
            if feed.send(EngineInput::Location(*event)).is_err() {
                warn!("engine worker is gone, dropping location");
            }
        });

        EngineHandle {
            subscription: Some(subscription),
            input: Some(input_tx),
            output: output_rx,
            worker: Some(worker),
        }
    }
}

impl Component for ProximityGuidanceEngine {
    type InData = EngineInput;
    type OutData = EngineOutput;

    fn convert(&mut self, input: EngineInput) -> EngineOutput {
        match input {
            EngineInput::Location(event) => EngineOutput::Readout(self.handle(&event)),
            EngineInput::SetActive(active) => {
                self.set_active(active);
                EngineOutput::Applied
            }
            EngineInput::SetPreferences(preferences) => {
                self.set_preferences(preferences);
                EngineOutput::Applied
            }
            EngineInput::AnnounceFloor => {
                self.announce_floor();
                EngineOutput::Applied
            }
            EngineInput::NearLocation(current) => EngineOutput::Near(self.near_location(&current)),
            EngineInput::NearLocationSpeak(current) => {
                EngineOutput::Near(self.near_location_speak(&current))
            }
        }
    }

    fn finalize(&mut self) -> Result<(), ComponentError> {
        self.diagnostics.flush();
        self.speech.clear();
        Ok(())
    }
}

/// A running engine. Dropping the handle without [`EngineHandle::stop`]
/// stops it too, just without waiting.
pub struct EngineHandle {
    subscription: Option<Subscription>,
    input: Option<Sender<EngineInput>>,
    output: Receiver<EngineOutput>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Results, one per input, in order.
    pub fn outputs(&self) -> &Receiver<EngineOutput> {
        &self.output
    }

    pub fn send(&self, input: EngineInput) -> Result<(), GuideError> {
        match &self.input {
            Some(tx) => Ok(tx.send(input)?),
            None => Err(GuideError::Disconnected),
        }
    }

    pub fn set_active(&self, active: bool) -> Result<(), GuideError> {
        self.send(EngineInput::SetActive(active))
    }

    pub fn announce_floor(&self) -> Result<(), GuideError> {
        self.send(EngineInput::AnnounceFloor)
    }

    /// Unsubscribes, lets the worker drain what it already got and waits for
    /// it to finish. Returns the outputs nobody has read yet.
    pub fn stop(mut self) -> Result<Vec<EngineOutput>, GuideError> {
        self.shutdown()?;
        Ok(self.output.try_iter().collect())
    }

    fn shutdown(&mut self) -> Result<(), GuideError> {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.input = None;
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| GuideError::Disconnected),
            None => Ok(()),
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.subscription = None;
        self.input = None;
    }
}
