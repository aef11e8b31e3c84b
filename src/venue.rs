//! Raw venue data as handed over by the navigation data store: the
//! destinations list and the facility directory. Nothing in here is
//! interpreted; [`crate::catalog`] does that.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::GuideError;
use crate::location::Location;

/// A latitude/longitude pair as written in data files.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_location(self) -> Location {
        Location::at(self.lat, self.lng)
    }
}

/// One entry of the destinations list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Facility id. Destinations without one are not landmarks.
    pub id: Option<String>,
    pub node_id: String,
    /// Ground floor of the routing node.
    pub node_height: f64,
    pub name: String,
    pub name_pron: String,
    #[serde(default)]
    pub name_en: Option<String>,
    /// Routing anchor.
    pub node_location: Coordinate,
    /// Where the thing itself stands.
    pub coordinates: Option<Coordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToiletType {
    #[default]
    None,
    Male,
    Female,
    Unisex,
}

/// A section of the facility directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectorySection {
    #[serde(default)]
    pub title: String,
    pub items: Vec<DirectoryItem>,
}

/// A directory entry. Entries with `content` are sub-directories, the rest
/// are leaves pointing at a routing node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryItem {
    pub node_id: Option<String>,
    pub title: String,
    pub title_pron: Option<String>,
    pub subtitle: Option<String>,
    pub subtitle_pron: Option<String>,
    pub toilet: ToiletType,
    pub content: Option<Vec<DirectorySection>>,
}

/// Where the catalog gets its raw data. Either list may be unavailable (not
/// loaded yet, network down...), in which case the catalog stays empty and
/// tries again later.
pub trait VenueSource {
    fn destinations(&self) -> Option<Vec<Destination>>;
    fn directory(&self) -> Option<Vec<DirectorySection>>;
}

/// Venue data read from a RON file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VenueFile {
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub directory: Vec<DirectorySection>,
}

impl VenueFile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GuideError> {
        let text = fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), GuideError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }
}

impl VenueSource for VenueFile {
    fn destinations(&self) -> Option<Vec<Destination>> {
        Some(self.destinations.clone())
    }

    fn directory(&self) -> Option<Vec<DirectorySection>> {
        Some(self.directory.clone())
    }
}

/// A source that has nothing to offer, like a data store that failed to load.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl VenueSource for Unavailable {
    fn destinations(&self) -> Option<Vec<Destination>> {
        None
    }

    fn directory(&self) -> Option<Vec<DirectorySection>> {
        None
    }
}
