//! Floor announcements: "Floor 3, Exhibition hall, ..." when the user
//! arrives on a floor.

use serde::{Deserialize, Serialize};

use crate::phrase::{fill, Language, Phrasebook};

/// Floors at or above this one have no symbol zone.
const SYMBOL_ZONE_TOP_FLOOR: i32 = 7;

/// What is on a floor, as announced on arrival.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorPlan {
    /// Human floor.
    pub floor: i32,
    pub title_pron: String,
    pub title_en: String,
    pub sub_title_pron: Option<String>,
    pub sub_title_en: Option<String>,
    /// The plan to announce instead when standing in the symbol zone.
    pub is_symbol_zone: bool,
}

impl FloorPlan {
    fn title(&self, language: Language) -> &str {
        match language {
            Language::Ja => &self.title_pron,
            Language::En => &self.title_en,
        }
    }

    /// Japanese falls back to the English sub-title when it has none of
    /// its own.
    fn sub_title(&self, language: Language) -> Option<&str> {
        let en = self.sub_title_en.as_deref().filter(|s| !s.is_empty());
        match language {
            Language::Ja => self.sub_title_pron.as_deref().filter(|s| !s.is_empty()).or(en),
            Language::En => en,
        }
    }
}

/// Composes the arrival sentence for human floor `floor`, or `None` when no
/// plan describes that floor.
pub fn floor_sentence(
    plans: &[FloorPlan],
    floor: i32,
    in_exhibition_zone: bool,
    in_symbol_zone: bool,
    phrasebook: &Phrasebook,
) -> Option<String> {
    let plan = plans.iter().find(|p| p.floor == floor)?;
    let language = phrasebook.language;
    let mut sentence = fill(&phrasebook.floor, &floor.to_string());

    if plan.title_pron.is_empty() || !in_exhibition_zone {
        return Some(sentence);
    }

    if plan.floor < SYMBOL_ZONE_TOP_FLOOR && in_symbol_zone {
        if let Some(symbol) = plans.iter().find(|p| p.is_symbol_zone) {
            sentence.push_str(&phrasebook.pause);
            sentence.push_str(symbol.title(language));
        }
    } else {
        sentence.push_str(&phrasebook.pause);
        sentence.push_str(plan.title(language));
        if let Some(sub) = plan.sub_title(language) {
            sentence.push_str(&phrasebook.pause);
            sentence.push_str(sub);
        }
    }
    Some(sentence)
}
