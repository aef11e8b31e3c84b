//! Static configuration and persisted user preferences, both stored as RON.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::ar_guide::ArMarker;
use crate::catalog::CatalogTables;
use crate::error::GuideError;
use crate::floor_plan::FloorPlan;
use crate::phrase::{Language, Phrasebook};
use crate::selector::GuidanceProfile;
use crate::zone::ZoneBoundaries;

/// Everything the engine needs besides the venue data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    pub language: Language,
    pub profile: GuidanceProfile,
    pub zones: ZoneBoundaries,
    /// Replaces the built-in phrasebook for `language` when set.
    pub phrasebook: Option<Phrasebook>,
    pub tables: CatalogTables,
    pub floor_plans: Vec<FloorPlan>,
    pub ar_markers: Vec<ArMarker>,
    /// Where diagnostic CSV files go when debug mode is on.
    pub diagnostics_dir: Option<PathBuf>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            profile: GuidanceProfile::default(),
            zones: ZoneBoundaries::default(),
            phrasebook: None,
            tables: CatalogTables {
                excluded_title_marker: Some("ASIMO".into()),
                ..CatalogTables::default()
            },
            floor_plans: Vec::new(),
            ar_markers: Vec::new(),
            diagnostics_dir: None,
        }
    }
}

impl GuideConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GuideError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: GuideConfig = ron::from_str(&text)?;
        config.validate()?;
        info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), GuideError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }

    /// The phrasebook to speak with.
    pub fn phrasebook(&self) -> Phrasebook {
        match &self.phrasebook {
            Some(book) => Phrasebook {
                language: self.language,
                ..book.clone()
            },
            None => Phrasebook::for_language(self.language),
        }
    }

    pub fn ar_marker(&self, id: i32) -> Option<&ArMarker> {
        self.ar_markers.iter().find(|m| m.id == id)
    }

    /// Rejects thresholds that would make the selector meaningless.
    pub fn validate(&self) -> Result<(), GuideError> {
        let cones = self.profile.config();
        let radii = [cones.front_radius, cones.side_radius, cones.rear_radius];
        if radii.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(GuideError::InvalidConfig(format!("radii must be non-negative: {radii:?}")));
        }
        let angles = [cones.front_angle, cones.side_angle, cones.rear_angle];
        if angles.iter().any(|a| !(0.0..=180.0).contains(a)) {
            return Err(GuideError::InvalidConfig(format!(
                "cone angles must lie in [0, 180]: {angles:?}"
            )));
        }
        if cones.ring_size == 0 {
            return Err(GuideError::InvalidConfig("ring size must be at least 1".into()));
        }
        if !(cones.check_interval >= 0.0 && cones.check_distance >= 0.0) {
            return Err(GuideError::InvalidConfig("check interval and distance must be non-negative".into()));
        }
        for (name, line) in [("exhibition", self.zones.exhibition), ("symbol", self.zones.symbol)] {
            if line.length() == 0.0 {
                return Err(GuideError::InvalidConfig(format!("{name} boundary has zero length")));
            }
        }
        Ok(())
    }
}

/// User preferences that survive restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub voice_guide_on: bool,
    pub debug_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            voice_guide_on: true,
            debug_mode: false,
        }
    }
}

impl Preferences {
    /// Reads preferences from `path`; a missing file means defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuideError> {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => Ok(ron::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no preferences at {}, using defaults", path.as_ref().display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GuideError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }
}
