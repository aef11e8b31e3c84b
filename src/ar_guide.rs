//! Guidance driven by printed markers seen through the camera. Wall markers
//! sit at entrances and are found by ear: a click whose pan and pitch say
//! how far off centre the marker is. Floor markers carry directions.
//!
//! Marker detection and pose estimation happen elsewhere; this module only
//! gets the resulting [`MarkerObservation`].

use std::{
    fs,
    path::Path,
    time::{Duration, Instant},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::audio_sink::SoundEffect;
use crate::error::GuideError;
use crate::phrase::{ClockDirection, GuidanceTemplate, Phonation, Phrasebook};
use crate::speech::{SoundEffectChannel, SpeechQueue, DEFAULT_PRIORITY};

const WIDTH_BASE_RATIO: f64 = 100.0;
const WIDTH_MIN_CENTER_RATIO: f64 = 10.0;
const WIDTH_MAX_CENTER_RATIO: f64 = 25.0;
const WIDTH_MIN_MARGIN_RATIO: f64 = 20.0;
const WIDTH_MAX_MARGIN_RATIO: f64 = 40.0;
const LONG_RANGE: f64 = 10.0;

const ENTRANCE_DISTANCE: f64 = 1.2;
const FLAT_GUIDE_DISTANCE: f64 = 3.0;
const FLAT_GUIDE_OFFSET: f64 = 0.9;
const FLAT_GUIDE_INTERVAL: Duration = Duration::from_secs(5);
const GUIDE_MARKER_WINDOW: Duration = Duration::from_secs(1);
const CENTERED_SPEECH_DELAY: Duration = Duration::from_secs(1);
const CENTERED_SPEECH_BACKOFF: Duration = Duration::from_secs(10);
const MARKER_SPEECH_INTERVAL: Duration = Duration::from_secs(1);

pub const CENTER_EFFECT: &str = "SoundEffect01";
pub const SIDE_EFFECT: &str = "SoundEffect02";

fn one() -> f64 {
    1.0
}

/// A direction to take from a floor marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatGuide {
    /// Heading of the target, in the marker's frame.
    pub direction: Option<f64>,
    pub guidance: GuidanceTemplate,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArMarker {
    pub id: i32,
    pub title_pron: String,
    /// Wall marker at an entrance, found by sound. Floor markers leave it
    /// unset.
    #[serde(default)]
    pub marker_point: bool,
    /// Printed size relative to the reference marker; scales distances.
    #[serde(default = "one")]
    pub size_ratio: f64,
    #[serde(default)]
    pub guide_to_here: Option<GuidanceTemplate>,
    #[serde(default)]
    pub description: Option<GuidanceTemplate>,
    #[serde(default)]
    pub description_title: Option<GuidanceTemplate>,
    #[serde(default)]
    pub next_guide: Option<GuidanceTemplate>,
    #[serde(default)]
    pub guide_from_here: Option<GuidanceTemplate>,
    /// Present on floor markers only.
    #[serde(default)]
    pub flat_guide: Option<Vec<FlatGuide>>,
}

/// Raw pose of a detected marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerObservation {
    pub marker_id: i32,
    pub distance: f64,
    pub horizontal_distance: f64,
    /// Degrees.
    pub yaw: f64,
    /// Where the marker crosses the frame's vertical axis, in pixels.
    pub intersection_y: f64,
}

/// The markers seen in one camera frame, `t_ms` after the session started.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerFrame {
    pub t_ms: u64,
    pub observations: Vec<MarkerObservation>,
}

/// Reads a recorded marker session: a RON list of [`MarkerFrame`]s.
pub fn read_marker_frames(path: impl AsRef<Path>) -> Result<Vec<MarkerFrame>, GuideError> {
    let path = path.as_ref();
    let frames: Vec<MarkerFrame> = ron::from_str(&fs::read_to_string(path)?)?;
    info!("{} marker frames read from {}", frames.len(), path.display());
    Ok(frames)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

/// Which part of the frame the marker is in.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Band {
    Centre,
    NearCentre,
    Outer,
}

/// The bands widen with distance.
fn band(frame: FrameSize, distance: f64, y: f64) -> Band {
    let center_ratio = (WIDTH_MAX_CENTER_RATIO - WIDTH_MIN_CENTER_RATIO) / LONG_RANGE * distance
        + WIDTH_MIN_CENTER_RATIO;
    let min_center = (WIDTH_BASE_RATIO - center_ratio) / 2.0;
    let max_center = WIDTH_BASE_RATIO - min_center;

    let margin_ratio = (WIDTH_MAX_MARGIN_RATIO - WIDTH_MIN_MARGIN_RATIO) / LONG_RANGE * distance
        + WIDTH_MIN_MARGIN_RATIO;
    let min_margin = (WIDTH_BASE_RATIO - margin_ratio) / 2.0;
    let max_margin = WIDTH_BASE_RATIO - min_margin;

    let h = frame.height;
    if h * min_center / WIDTH_BASE_RATIO < y && h * max_center / WIDTH_BASE_RATIO > y {
        Band::Centre
    } else if h * min_margin / WIDTH_BASE_RATIO < y && h * max_margin / WIDTH_BASE_RATIO > y {
        Band::NearCentre
    } else {
        Band::Outer
    }
}

/// Click parameters for a marker outside the centre band. Further off centre
/// means lower pitch, wider pan and longer pauses.
fn side_effect(frame: FrameSize, distance: f64, y: f64) -> Option<SoundEffect> {
    let (rate, pan, interval) = match band(frame, distance, y) {
        Band::Centre => return None,
        Band::NearCentre => (2.0, 0.3, 0.0),
        Band::Outer => {
            let margin_ratio = (WIDTH_MAX_MARGIN_RATIO - WIDTH_MIN_MARGIN_RATIO) / LONG_RANGE * distance
                + WIDTH_MIN_MARGIN_RATIO;
            let min_margin = (WIDTH_BASE_RATIO - margin_ratio) / 2.0;
            let base_width = frame.height * min_margin / WIDTH_BASE_RATIO;
            let pan = ((y - frame.height / 2.0).abs() / base_width).clamp(0.0, 1.0);
            (2.0 - pan * 0.3, pan, pan * 0.8)
        }
    };
    let pan = if frame.height / 2.0 < y { -pan } else { pan };
    Some(SoundEffect::new(SIDE_EFFECT, f64::min(rate, 2.0), pan, f64::min(interval, 2.0)))
}

/// Marker guidance state: when the last cue sounded and whether the marker
/// is currently centred.
#[derive(Debug)]
pub struct ArGuide {
    phrasebook: Phrasebook,
    speech: SpeechQueue,
    effects: SoundEffectChannel,
    frame: Option<FrameSize>,
    debug: bool,
    marker_centered: bool,
    guide_sound_time: Option<Instant>,
    check_marker_time: Option<Instant>,
    flat_guide_time: Option<Instant>,
    spoken_time: Option<Instant>,
}

impl ArGuide {
    pub fn new(phrasebook: Phrasebook, speech: SpeechQueue, effects: SoundEffectChannel) -> Self {
        Self {
            phrasebook,
            speech,
            effects,
            frame: None,
            debug: false,
            marker_centered: false,
            guide_sound_time: None,
            check_marker_time: None,
            flat_guide_time: None,
            spoken_time: None,
        }
    }

    pub fn set_frame_size(&mut self, frame: Option<FrameSize>) {
        self.frame = frame;
    }

    /// In debug mode the guide-to-here, next and guide-from-here sentences
    /// ignore their distance ranges.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// A wall marker cue sounded within the last second.
    fn is_guide_marker(&self, now: Instant) -> bool {
        self.check_marker_time
            .is_some_and(|t| t + GUIDE_MARKER_WINDOW > now)
    }

    fn template(
        &self,
        phonation: &mut Phonation,
        template: Option<&GuidanceTemplate>,
        distance: f64,
        meters: &str,
        bypass: bool,
    ) {
        if let Some(template) = template {
            if template.is_distance(distance) || bypass {
                phonation.append(&self.phrasebook.render(template, Some(meters)), Some(&self.phrasebook.period));
            }
        }
    }

    /// What to say about `marker` given its pose.
    pub fn phonation_for(&mut self, marker: &ArMarker, observation: &MarkerObservation, now: Instant) -> Phonation {
        let distance = observation.distance * marker.size_ratio;
        let horizontal = observation.horizontal_distance * marker.size_ratio;
        let meters = self.phrasebook.meter_phrase(distance);
        let mut phonation = Phonation::default();

        self.template(&mut phonation, marker.guide_to_here.as_ref(), distance, &meters, self.debug);
        if marker.description.as_ref().is_some_and(|d| d.is_distance(distance)) {
            self.template(&mut phonation, marker.description_title.as_ref(), distance, &meters, false);
            self.template(&mut phonation, marker.description.as_ref(), distance, &meters, false);
        }
        // onward directions belong to markers that describe themselves
        if marker.description.is_some() {
            self.template(&mut phonation, marker.next_guide.as_ref(), distance, &meters, self.debug);
            self.template(&mut phonation, marker.guide_from_here.as_ref(), distance, &meters, self.debug);
        }

        if self.is_guide_marker(now) {
            return phonation;
        }
        let Some(flat_guides) = &marker.flat_guide else {
            return phonation;
        };
        if distance >= FLAT_GUIDE_DISTANCE {
            return phonation;
        }

        if horizontal > FLAT_GUIDE_OFFSET {
            let mut hint = String::new();
            if let Some(frame) = self.frame {
                let y = observation.intersection_y;
                if frame.height * 2.0 / 5.0 > y {
                    hint.push_str(&self.phrasebook.turn_right_a_little);
                    hint.push_str(&self.phrasebook.period);
                } else if frame.height * 3.0 / 5.0 < y {
                    hint.push_str(&self.phrasebook.turn_left_a_little);
                    hint.push_str(&self.phrasebook.period);
                }
                hint.push_str(&self.phrasebook.proceed_slowly);
            }
            let due = self
                .flat_guide_time
                .map_or(true, |t| t + FLAT_GUIDE_INTERVAL < now);
            if due {
                phonation.append(&Phonation::plain(hint), None);
                self.flat_guide_time = Some(now);
            }
        } else {
            for flat in flat_guides {
                let Some(target) = flat.direction else {
                    continue;
                };
                let direction = ClockDirection::relative(target, observation.yaw);
                phonation.append(&Phonation::plain(self.phrasebook.clock_phrase(direction)), None);
                phonation.append(&self.phrasebook.render(&flat.guidance, None), Some(&self.phrasebook.period));
            }
        }
        phonation
    }

    /// Cue for a wall marker: the entrance announcement up close, otherwise
    /// a click panned towards the marker, and once the marker has been
    /// held in the centre for a while, the distance to it.
    pub fn marker_sound_effect(&mut self, marker: &ArMarker, observation: &MarkerObservation, now: Instant) {
        let Some(frame) = self.frame else {
            return;
        };
        let distance = observation.distance * marker.size_ratio;

        if distance < ENTRANCE_DISTANCE {
            let text = format!("{}{}", marker.title_pron, self.phrasebook.entrance);
            self.speech.enqueue_with_priority(&text, Some(marker.id), DEFAULT_PRIORITY);
            return;
        }

        self.check_marker_time = Some(now);
        let y = observation.intersection_y;

        if band(frame, distance, y) == Band::Centre {
            if !self.marker_centered && !self.effects.is_busy() {
                self.effects.play(&SoundEffect::new(CENTER_EFFECT, 2.0, 0.0, 0.0), now);
                self.guide_sound_time = Some(now);
                self.marker_centered = true;
            } else if self
                .guide_sound_time
                .is_some_and(|t| t + CENTERED_SPEECH_DELAY < now)
                && !self.speech.is_stacked()
            {
                self.guide_sound_time = Some(now + CENTERED_SPEECH_BACKOFF);
                self.marker_centered = true;
                let text = format!(
                    "{}{}{}{}",
                    marker.title_pron,
                    self.phrasebook.period,
                    self.phrasebook.to_the_entrance,
                    self.phrasebook.meter_phrase(distance)
                );
                self.speech.enqueue_with_priority(&text, Some(marker.id), DEFAULT_PRIORITY);
            }
            return;
        }

        if let Some(effect) = side_effect(frame, distance, y) {
            if !self.effects.is_busy() {
                debug!("marker {} off centre: {:?}", marker.id, effect);
                self.effects.play(&effect, now);
                self.marker_centered = false;
                self.guide_sound_time = None;
            }
        }
    }

    /// Handles one camera frame, nearest marker first. Wall markers get
    /// their sound cue; other markers their click and, at most once a
    /// second and only while nothing waits in the speech queue, their
    /// guidance. Markers `lookup` does not know are skipped. Returns what
    /// was handed to the speech queue.
    pub fn observe_frame<'m>(
        &mut self,
        observations: &[MarkerObservation],
        lookup: impl Fn(i32) -> Option<&'m ArMarker>,
        now: Instant,
    ) -> Vec<Phonation> {
        let mut sorted = observations.to_vec();
        sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut said = Vec::new();
        for observation in &sorted {
            let Some(marker) = lookup(observation.marker_id) else {
                debug!("marker {} is not in the table", observation.marker_id);
                continue;
            };
            if marker.marker_point {
                self.marker_sound_effect(marker, observation, now);
                continue;
            }
            if self.speech.is_stacked() {
                continue;
            }
            self.flat_sound_effect(marker, observation, now);
            if self.spoken_time.is_some_and(|t| t + MARKER_SPEECH_INTERVAL > now) {
                continue;
            }
            let phonation = self.phonation_for(marker, observation, now);
            if !phonation.is_empty() {
                self.speech
                    .enqueue_with_priority(&phonation.pron, Some(marker.id), DEFAULT_PRIORITY);
                self.spoken_time = Some(now);
                said.push(phonation);
            }
        }
        said
    }

    /// Cue for a floor marker within reach: the same panned click, silent
    /// when the marker is centred.
    pub fn flat_sound_effect(&self, marker: &ArMarker, observation: &MarkerObservation, now: Instant) {
        let Some(frame) = self.frame else {
            return;
        };
        let distance = observation.distance * marker.size_ratio;
        if marker.flat_guide.is_none() || distance >= FLAT_GUIDE_DISTANCE {
            return;
        }
        if let Some(effect) = side_effect(frame, distance, observation.intersection_y) {
            if !self.effects.is_busy() {
                self.effects.play(&effect, now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_sink::recording::{Call, RecordingSink};
    use crate::audio_sink::PlaybackOutcome;
    use std::sync::Arc;

    const FRAME: FrameSize = FrameSize {
        width: 1080.0,
        height: 1000.0,
    };

    fn guide() -> (RecordingSink, ArGuide) {
        let sink = RecordingSink::new();
        let shared: Arc<RecordingSink> = Arc::new(sink.clone());
        let mut guide = ArGuide::new(
            Phrasebook::english(),
            SpeechQueue::new(shared.clone()),
            SoundEffectChannel::new(shared),
        );
        guide.set_frame_size(Some(FRAME));
        (sink, guide)
    }

    fn wall_marker() -> ArMarker {
        ArMarker {
            id: 7,
            title_pron: "Dome theater. ".into(),
            marker_point: true,
            size_ratio: 1.0,
            guide_to_here: Some(GuidanceTemplate::new("{} to the dome").within(Some(2.0), Some(6.0))),
            description: Some(GuidanceTemplate::new("A theater").within(None, Some(4.0))),
            description_title: Some(GuidanceTemplate::new("About").within(None, Some(3.0))),
            ..Default::default()
        }
    }

    fn floor_marker() -> ArMarker {
        ArMarker {
            id: 8,
            title_pron: "Crossing".into(),
            size_ratio: 1.0,
            flat_guide: Some(vec![FlatGuide {
                direction: Some(90.0),
                guidance: GuidanceTemplate::new("to the cafe"),
            }]),
            ..Default::default()
        }
    }

    fn seen(distance: f64, y: f64) -> MarkerObservation {
        seen_marker(7, distance, y)
    }

    fn seen_marker(marker_id: i32, distance: f64, y: f64) -> MarkerObservation {
        MarkerObservation {
            marker_id,
            distance,
            horizontal_distance: 0.0,
            yaw: 0.0,
            intersection_y: y,
        }
    }

    #[test]
    fn bands_widen_with_distance() {
        // at 0 m the centre band is 45%..55% of the height
        assert_eq!(band(FRAME, 0.0, 500.0), Band::Centre);
        assert_eq!(band(FRAME, 0.0, 430.0), Band::NearCentre);
        assert_eq!(band(FRAME, 0.0, 100.0), Band::Outer);
        // at 10 m it is 37.5%..62.5%
        assert_eq!(band(FRAME, 10.0, 400.0), Band::Centre);
    }

    #[test]
    fn outer_band_pans_towards_marker() {
        let top = side_effect(FRAME, 0.0, 0.0).unwrap();
        assert_eq!(top.pan, 1.0);
        assert!((top.rate - 1.7).abs() < 1e-9);
        assert!((top.interval - 0.8).abs() < 1e-9);
        let bottom = side_effect(FRAME, 0.0, 1000.0).unwrap();
        assert_eq!(bottom.pan, -1.0);
        let near = side_effect(FRAME, 0.0, 570.0).unwrap();
        assert_eq!((near.rate, near.pan, near.interval), (2.0, -0.3, 0.0));
        assert!(side_effect(FRAME, 0.0, 500.0).is_none());
    }

    #[test]
    fn templates_gated_by_distance() {
        let (_, mut guide) = guide();
        let now = Instant::now();
        let said = guide.phonation_for(&wall_marker(), &seen(2.5, 500.0), now);
        assert_eq!(said.text, "3 meters to the dome. About. A theater");

        let said = guide.phonation_for(&wall_marker(), &seen(5.0, 500.0), now);
        assert_eq!(said.text, "5 meters to the dome");

        let said = guide.phonation_for(&wall_marker(), &seen(8.0, 500.0), now);
        assert!(said.is_empty());

        guide.set_debug(true);
        let said = guide.phonation_for(&wall_marker(), &seen(8.0, 500.0), now);
        assert_eq!(said.text, "8 meters to the dome");
    }

    #[test]
    fn onward_guidance_needs_a_description() {
        let (_, mut guide) = guide();
        let now = Instant::now();
        let mut marker = ArMarker {
            id: 9,
            title_pron: "Stairs".into(),
            size_ratio: 1.0,
            next_guide: Some(GuidanceTemplate::new("then go up")),
            guide_from_here: Some(GuidanceTemplate::new("from here, left")),
            ..Default::default()
        };
        assert!(guide.phonation_for(&marker, &seen(2.0, 500.0), now).is_empty());

        // out of its own range the description is silent but still unlocks them
        marker.description = Some(GuidanceTemplate::new("The stairs").within(None, Some(1.0)));
        let said = guide.phonation_for(&marker, &seen(2.0, 500.0), now);
        assert_eq!(said.text, "then go up. from here, left");
    }

    #[test]
    fn floor_marker_gives_direction() {
        let (_, mut guide) = guide();
        let now = Instant::now();
        let said = guide.phonation_for(&floor_marker(), &seen(2.0, 500.0), now);
        assert_eq!(said.text, "straight ahead. to the cafe");
    }

    #[test]
    fn floor_marker_off_to_the_side_is_rate_limited() {
        let (_, mut guide) = guide();
        let now = Instant::now();
        let mut obs = seen(2.0, 100.0);
        obs.horizontal_distance = 1.5;
        let said = guide.phonation_for(&floor_marker(), &obs, now);
        assert_eq!(said.text, "Turn to the right a little. please proceed slowly.");
        let again = guide.phonation_for(&floor_marker(), &obs, now + Duration::from_secs(3));
        assert!(again.is_empty());
        let later = guide.phonation_for(&floor_marker(), &obs, now + Duration::from_secs(6));
        assert!(!later.is_empty());
    }

    #[test]
    fn entrance_announced_up_close() {
        let (sink, mut guide) = guide();
        guide.marker_sound_effect(&wall_marker(), &seen(1.0, 500.0), Instant::now());
        assert_eq!(sink.spoken().len(), 1);
        let said = &sink.spoken()[0];
        assert!(said.starts_with("Dome theater. It is the entrance."));
        assert!(said.ends_with("please proceed after reaching a position that guides you to the front."));
    }

    #[test]
    fn centred_marker_clicks_then_speaks() {
        let (sink, mut guide) = guide();
        let t0 = Instant::now();
        let marker = wall_marker();

        guide.marker_sound_effect(&marker, &seen(4.0, 500.0), t0);
        assert_eq!(
            sink.calls(),
            vec![Call::Effect(SoundEffect::new(CENTER_EFFECT, 2.0, 0.0, 0.0))]
        );
        sink.complete_next(PlaybackOutcome::Finished);

        // still centred half a second later: nothing new
        guide.marker_sound_effect(&marker, &seen(4.0, 500.0), t0 + Duration::from_millis(500));
        assert_eq!(sink.calls().len(), 1);

        guide.marker_sound_effect(&marker, &seen(4.0, 500.0), t0 + Duration::from_millis(1500));
        assert_eq!(sink.spoken(), vec!["Dome theater. . To the entrance, 4 meters"]);
    }

    #[test]
    fn flat_guidance_quiet_right_after_wall_cue() {
        let (_, mut guide) = guide();
        let t0 = Instant::now();
        guide.marker_sound_effect(&wall_marker(), &seen(4.0, 100.0), t0);
        let said = guide.phonation_for(&floor_marker(), &seen(2.0, 500.0), t0 + Duration::from_millis(500));
        assert!(said.is_empty());
        let said = guide.phonation_for(&floor_marker(), &seen(2.0, 500.0), t0 + Duration::from_millis(1500));
        assert!(!said.is_empty());
    }

    #[test]
    fn flat_effect_silent_when_centred_or_far() {
        let (sink, guide) = guide();
        let now = Instant::now();
        guide.flat_sound_effect(&floor_marker(), &seen(2.0, 500.0), now);
        guide.flat_sound_effect(&floor_marker(), &seen(4.0, 100.0), now);
        guide.flat_sound_effect(&wall_marker(), &seen(2.0, 100.0), now);
        assert!(sink.calls().is_empty());
        guide.flat_sound_effect(&floor_marker(), &seen(2.0, 100.0), now);
        assert_eq!(sink.calls().len(), 1);
    }

    #[test]
    fn frame_dispatch_by_marker_kind() {
        let (sink, mut guide) = guide();
        let table = [wall_marker(), floor_marker()];
        let lookup = |id: i32| table.iter().find(|m| m.id == id);
        let t0 = Instant::now();

        let frame = [seen_marker(8, 2.0, 500.0), seen_marker(99, 1.0, 500.0)];
        let said = guide.observe_frame(&frame, lookup, t0);
        assert_eq!(said.len(), 1);
        assert_eq!(said[0].text, "straight ahead. to the cafe");
        assert_eq!(sink.spoken(), vec!["straight ahead. to the cafe"]);
        sink.complete_next(PlaybackOutcome::Finished);

        // at most once a second
        assert!(guide.observe_frame(&frame, lookup, t0 + Duration::from_millis(500)).is_empty());
        assert_eq!(guide.observe_frame(&frame, lookup, t0 + Duration::from_millis(1500)).len(), 1);
        assert_eq!(sink.spoken().len(), 2);
        sink.complete_next(PlaybackOutcome::Finished);

        // a wall marker only clicks, and it hushes the floor marker behind it
        let t1 = t0 + Duration::from_secs(5);
        let frame = [seen_marker(8, 2.0, 500.0), seen_marker(7, 1.5, 500.0)];
        assert!(guide.observe_frame(&frame, lookup, t1).is_empty());
        assert_eq!(
            sink.calls().last(),
            Some(&Call::Effect(SoundEffect::new(CENTER_EFFECT, 2.0, 0.0, 0.0)))
        );
        assert_eq!(sink.spoken().len(), 2);
    }

    #[test]
    fn marker_frames_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "[(t_ms: 0, observations: [(marker_id: 8, distance: 2.0, horizontal_distance: 0.0, yaw: 0.0, intersection_y: 500.0)]), (t_ms: 500)]",
        )
        .unwrap();
        let frames = read_marker_frames(file.path()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].observations[0].marker_id, 8);
        assert!(frames[1].observations.is_empty());
        assert!(read_marker_frames(file.path().with_extension("missing")).is_err());
    }

    #[test]
    fn marker_table_from_ron() {
        let marker: ArMarker = ron::from_str(
            "(id: 3, title_pron: \"Exit\", flat_guide: Some([(direction: Some(180.0), guidance: (message_en: \"exit\"))]))",
        )
        .unwrap();
        assert_eq!(marker.size_ratio, 1.0);
        assert_eq!(marker.flat_guide.unwrap()[0].direction, Some(180.0));
    }
}
