//! Turns numbers into things worth saying: distances into "N meters",
//! bearings into "on the left", and guidance templates into sentences.
//!
//! Templates use `{}` as the placeholder for the single argument, e.g.
//! `"In front: {}"`.

use serde::{Deserialize, Serialize};

/// Display/speech language. Japanese prefers pronunciation strings, English
/// prefers the English variants when they exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    Ja,
    #[default]
    En,
}

/// All the fixed sentences the engine knows how to say, per language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phrasebook {
    pub language: Language,
    pub in_front: String,
    pub on_the_left: String,
    pub on_the_right: String,
    pub near: String,
    pub floor: String,
    pub pause: String,
    pub period: String,
    pub meters: String,
    pub one_meter: String,
    pub centimeters: String,
    pub to_the_entrance: String,
    pub entrance: String,
    pub turn_right_a_little: String,
    pub turn_left_a_little: String,
    pub proceed_slowly: String,
    pub straight_ahead: String,
    pub slightly_left: String,
    pub diagonally_left: String,
    pub left: String,
    pub rear_left: String,
    pub behind: String,
    pub rear_right: String,
    pub right: String,
    pub diagonally_right: String,
    pub slightly_right: String,
}

impl Default for Phrasebook {
    fn default() -> Self {
        Self::english()
    }
}

impl Phrasebook {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Ja => Self::japanese(),
            Language::En => Self::english(),
        }
    }

    pub fn english() -> Self {
        Self {
            language: Language::En,
            in_front: "In front: {}".into(),
            on_the_left: "On the left: {}".into(),
            on_the_right: "On the right: {}".into(),
            near: "Near {}".into(),
            floor: "Floor {}".into(),
            pause: ", ".into(),
            period: ". ".into(),
            meters: "{} meters".into(),
            one_meter: "1 meter".into(),
            centimeters: "{} centimeters".into(),
            to_the_entrance: "To the entrance, ".into(),
            entrance: "It is the entrance. Point your smartphone camera at the ground. \
                       While facing the ground, turn left and right slowly and check the following directions. \
                       When facing the ground, please proceed after reaching a position that guides you to the front."
                .into(),
            turn_right_a_little: "Turn to the right a little".into(),
            turn_left_a_little: "Turn to the left a little".into(),
            proceed_slowly: "please proceed slowly.".into(),
            straight_ahead: "straight ahead".into(),
            slightly_left: "slightly to the left".into(),
            diagonally_left: "diagonally to the left".into(),
            left: "to the left".into(),
            rear_left: "diagonally behind on the left".into(),
            behind: "behind".into(),
            rear_right: "diagonally behind on the right".into(),
            right: "to the right".into(),
            diagonally_right: "diagonally to the right".into(),
            slightly_right: "slightly to the right".into(),
        }
    }

    pub fn japanese() -> Self {
        Self {
            language: Language::Ja,
            in_front: "正面、{}".into(),
            on_the_left: "左側、{}".into(),
            on_the_right: "右側、{}".into(),
            near: "{}付近".into(),
            floor: "{}階".into(),
            pause: "、".into(),
            period: "。".into(),
            meters: "{}メートル".into(),
            one_meter: "1メートル".into(),
            centimeters: "{}センチメートル".into(),
            to_the_entrance: "入口まで".into(),
            entrance: "入口です。スマートフォンのカメラを床に向けてください。\
                       床に向けたまま、ゆっくり左右に向きを変えて、次の方向を確認してください。\
                       床に向けたまま、正面へ案内される位置まで来てから進んでください。"
                .into(),
            turn_right_a_little: "少し右を向いてください".into(),
            turn_left_a_little: "少し左を向いてください".into(),
            proceed_slowly: "ゆっくり進んでください。".into(),
            straight_ahead: "正面".into(),
            slightly_left: "やや左方向".into(),
            diagonally_left: "斜め左方向".into(),
            left: "左方向".into(),
            rear_left: "左斜め後ろ方向".into(),
            behind: "後ろ".into(),
            rear_right: "右斜め後ろ方向".into(),
            right: "右方向".into(),
            diagonally_right: "斜め右方向".into(),
            slightly_right: "やや右方向".into(),
        }
    }

    /// Spoken distance. Under 0.95 m the distance is rounded to 10 cm, biased
    /// up by 5 cm; a result of exactly 100 cm is said as one meter.
    pub fn meter_phrase(&self, distance: f64) -> String {
        if distance < 0.95 {
            let centimeters = (((distance + 0.05) * 10.0).round() * 10.0) as i64;
            if centimeters == 100 {
                self.one_meter.clone()
            } else {
                fill(&self.centimeters, &centimeters.to_string())
            }
        } else {
            let meters = distance.round() as i64;
            if meters == 1 {
                self.one_meter.clone()
            } else {
                fill(&self.meters, &meters.to_string())
            }
        }
    }

    pub fn clock_phrase(&self, direction: ClockDirection) -> &str {
        use ClockDirection as CD;
        match direction {
            CD::StraightAhead => &self.straight_ahead,
            CD::SlightlyLeft => &self.slightly_left,
            CD::DiagonallyLeft => &self.diagonally_left,
            CD::Left => &self.left,
            CD::RearLeft => &self.rear_left,
            CD::Behind => &self.behind,
            CD::RearRight => &self.rear_right,
            CD::Right => &self.right,
            CD::DiagonallyRight => &self.diagonally_right,
            CD::SlightlyRight => &self.slightly_right,
        }
    }

    /// "In front: X" style sentence for a landmark at the given side.
    pub fn side_sentence(&self, side: Side, name: &str) -> String {
        let template = match side {
            Side::Front => &self.in_front,
            Side::Left => &self.on_the_left,
            Side::Right => &self.on_the_right,
        };
        fill(template, name)
    }

    /// Picks the name to speak: the English title for English when there is
    /// one, the pronunciation otherwise.
    pub fn spoken_name<'a>(&self, pron: &'a str, en: Option<&'a str>) -> &'a str {
        match (self.language, en) {
            (Language::En, Some(en)) if !en.is_empty() => en,
            _ => pron,
        }
    }

    /// Renders a guidance template at the given distance, or `None` when the
    /// distance is outside the template's trigger range.
    pub fn compose_guidance(&self, template: &GuidanceTemplate, distance: f64) -> Option<Phonation> {
        if !template.is_distance(distance) {
            return None;
        }
        Some(self.render(template, Some(&self.meter_phrase(distance))))
    }

    /// Renders a template without gating, optionally filling in a distance
    /// phrase.
    pub fn render(&self, template: &GuidanceTemplate, distance_phrase: Option<&str>) -> Phonation {
        let param = distance_phrase.unwrap_or_default();
        match self.language {
            Language::Ja => Phonation::new(
                fill(&template.message, param),
                fill(&template.message_pron, param),
            ),
            Language::En => Phonation::plain(fill(&template.message_en, param)),
        }
    }
}

/// Substitutes the first `{}` in `template` with `arg`. A template without a
/// placeholder is returned as is.
pub fn fill(template: &str, arg: &str) -> String {
    template.replacen("{}", arg, 1)
}

/// Coarse direction for a signed bearing (negative is left).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Left,
    Right,
}

impl Side {
    /// `Front` inside the front cone, `Left`/`Right` inside the rear cone,
    /// nothing beyond it.
    pub fn classify(signed_angle: f64, front_cone: f64, rear_cone: f64) -> Option<Side> {
        let magnitude = signed_angle.abs();
        if magnitude < front_cone {
            Some(Side::Front)
        } else if magnitude < rear_cone {
            Some(if signed_angle < 0.0 { Side::Left } else { Side::Right })
        } else {
            None
        }
    }
}

/// Direction in 15 degree hour slices, counter-clockwise from the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDirection {
    StraightAhead,
    SlightlyLeft,
    DiagonallyLeft,
    Left,
    RearLeft,
    Behind,
    RearRight,
    Right,
    DiagonallyRight,
    SlightlyRight,
}

impl ClockDirection {
    const HOUR_ANGLE: f64 = 360.0 / 24.0;

    /// `angle` is in degrees, 0 straight ahead, growing counter-clockwise.
    /// Anything outside `[0, 360)` is folded back into it first.
    pub fn from_angle(angle: f64) -> ClockDirection {
        use ClockDirection as CD;
        let angle = angle.rem_euclid(360.0);
        // (k * HOUR, (k + 1) * HOUR] belongs to slice k
        let slice = (angle / Self::HOUR_ANGLE).ceil() as i64 - 1;
        match slice {
            1..=2 => CD::SlightlyLeft,
            3..=4 => CD::DiagonallyLeft,
            5..=6 => CD::Left,
            7..=10 => CD::RearLeft,
            11..=12 => CD::Behind,
            13..=16 => CD::RearRight,
            17..=18 => CD::Right,
            19..=20 => CD::DiagonallyRight,
            21..=22 => CD::SlightlyRight,
            _ => CD::StraightAhead,
        }
    }

    /// Direction of a target heading as seen from the current heading, both
    /// in degrees. The camera frame's zero is rotated 90 degrees from the
    /// marker's, hence the offset.
    pub fn relative(target: f64, current: f64) -> ClockDirection {
        Self::from_angle(target + current - 90.0)
    }
}

/// A sentence with its display text and the text handed to speech synthesis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Phonation {
    pub text: String,
    pub pron: String,
}

impl Phonation {
    pub fn new(text: impl Into<String>, pron: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pron: pron.into(),
        }
    }

    /// Same string for display and speech.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            pron: text.clone(),
            text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pron.is_empty()
    }

    /// Appends another piece, separated by `delimiter` when both sides are
    /// non-empty.
    pub fn append(&mut self, other: &Phonation, delimiter: Option<&str>) {
        if other.is_empty() {
            return;
        }
        if let Some(delim) = delimiter {
            if !self.text.is_empty() {
                self.text.push_str(delim);
            }
            if !self.pron.is_empty() {
                self.pron.push_str(delim);
            }
        }
        self.text.push_str(&other.text);
        self.pron.push_str(&other.pron);
    }
}

/// One message variant attached to a landmark or marker, with the distance
/// range in which it may be spoken.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceTemplate {
    pub message: String,
    pub message_pron: String,
    pub message_en: String,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
}

impl GuidanceTemplate {
    pub fn new(message_en: &str) -> Self {
        Self {
            message: message_en.to_owned(),
            message_pron: message_en.to_owned(),
            message_en: message_en.to_owned(),
            ..Self::default()
        }
    }

    pub fn within(mut self, min_distance: Option<f64>, max_distance: Option<f64>) -> Self {
        self.min_distance = min_distance;
        self.max_distance = max_distance;
        self
    }

    /// `min <= distance < max`, with missing bounds left open.
    pub fn is_distance(&self, distance: f64) -> bool {
        self.min_distance.map_or(true, |min| min <= distance)
            && self.max_distance.map_or(true, |max| distance < max)
    }
}
