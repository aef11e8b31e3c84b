//! The landmark catalog: every point of interest that may be announced,
//! built once from the venue data plus the hand-curated override tables.
//!
//! Building happens in two steps. [`LandmarkCatalog::initialize`] pulls the
//! destinations, merges the additional locations, backfills names from the
//! facility directory and classifies zones. After that the landmark list is
//! sealed; the only way to get a different landmark is to build a new value
//! with [`Landmark::with_titles`].

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::location::{human_floor, Location};
use crate::venue::{Coordinate, DirectorySection, ToiletType, VenueSource};
use crate::zone::ZoneBoundaries;

/// A point of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    id: String,
    node_id: String,
    ground_floor: i32,
    title: String,
    title_pron: String,
    title_en: Option<String>,
    node_location: Location,
    spot_location: Location,
    checkpoint_only: bool,
    exhibition_zone: bool,
}

fn trim_newlines(s: &str) -> String {
    s.trim_matches(|c| c == '\n' || c == '\r').to_owned()
}

impl Landmark {
    pub fn new(
        id: &str,
        node_id: &str,
        ground_floor: i32,
        title: &str,
        title_pron: &str,
        node_location: Location,
        spot_location: Location,
    ) -> Self {
        Self {
            id: id.to_owned(),
            node_id: node_id.to_owned(),
            ground_floor,
            title: trim_newlines(title),
            title_pron: trim_newlines(title_pron),
            title_en: None,
            node_location,
            spot_location,
            checkpoint_only: false,
            exhibition_zone: false,
        }
    }

    pub fn with_title_en(mut self, title_en: Option<String>) -> Self {
        self.title_en = title_en;
        self
    }

    pub fn checkpoint_only(mut self, checkpoint_only: bool) -> Self {
        self.checkpoint_only = checkpoint_only;
        self
    }

    pub fn in_exhibition_zone(mut self, exhibition_zone: bool) -> Self {
        self.exhibition_zone = exhibition_zone;
        self
    }

    /// The same landmark under a new name.
    pub fn with_titles(&self, title: &str, title_pron: &str, title_en: Option<String>) -> Self {
        Self {
            title: trim_newlines(title),
            title_pron: trim_newlines(title_pron),
            title_en,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn ground_floor(&self) -> i32 {
        self.ground_floor
    }

    /// Floor as a visitor would say it.
    pub fn floor(&self) -> i32 {
        human_floor(self.ground_floor)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_pron(&self) -> &str {
        &self.title_pron
    }

    pub fn title_en(&self) -> Option<&str> {
        self.title_en.as_deref()
    }

    /// Routing anchor; distances are measured to this.
    pub fn node_location(&self) -> &Location {
        &self.node_location
    }

    /// Where the thing stands; bearings are measured to this.
    pub fn spot_location(&self) -> &Location {
        &self.spot_location
    }

    pub fn is_checkpoint_only(&self) -> bool {
        self.checkpoint_only
    }

    pub fn is_exhibition_zone(&self) -> bool {
        self.exhibition_zone
    }
}

/// A hand-placed coordinate for a landmark, keyed by title and ground floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidePosition {
    pub title: String,
    pub floor: i32,
    pub lat: f64,
    pub lng: f64,
}

/// A landmark that only exists in our own tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalLocation {
    pub id: String,
    pub node_id: String,
    /// Ground floor.
    pub floor: i32,
    pub title: String,
    pub title_pron: String,
    #[serde(default)]
    pub title_en: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub checkpoint_only: bool,
}

/// The curated tables that patch the venue data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogTables {
    pub guide_positions: Vec<GuidePosition>,
    pub checkpoint_positions: Vec<GuidePosition>,
    pub additional_locations: Vec<AdditionalLocation>,
    /// Landmarks whose title contains this are never announced.
    pub excluded_title_marker: Option<String>,
}

/// A leaf of the facility directory that is a restroom.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionEntry {
    pub node_id: Option<String>,
    pub title: String,
    pub title_pron: Option<String>,
    pub subtitle: Option<String>,
    pub subtitle_pron: Option<String>,
    pub toilet: ToiletType,
    /// Human floor, known once a landmark with the same node was found.
    pub floor: Option<i32>,
    pub exhibition_zone: bool,
}

/// English name for a restroom whose directory title is Japanese.
pub fn restroom_title_en(title: &str) -> String {
    let known = [
        ("女性用多機能トイレ", "Multipurpose restroom for women"),
        ("男性用多機能トイレ", "Multipurpose restroom for men"),
        ("多機能トイレ", "Multipurpose restroom"),
        ("女性用トイレ", "Women's restroom"),
        ("男性用トイレ", "Men's restroom"),
        ("トイレ", "Restroom"),
    ];
    known
        .iter()
        .find(|(ja, _)| title.contains(ja))
        .map(|(_, en)| en.to_string())
        .unwrap_or_else(|| title.to_owned())
}

const TOP_FLOOR: i32 = 7;
const BOTTOM_FLOOR: i32 = -2;
const MIDDLE_FLOOR: i32 = 4;
const FLOOR_COUNT: i32 = 10;

#[derive(Debug, Clone, Default)]
pub struct LandmarkCatalog {
    tables: CatalogTables,
    zones: ZoneBoundaries,
    landmarks: Vec<Landmark>,
    sections: Vec<SectionEntry>,
    initialized: bool,
}

impl LandmarkCatalog {
    pub fn new(tables: CatalogTables, zones: ZoneBoundaries) -> Self {
        Self {
            tables,
            zones,
            ..Self::default()
        }
    }

    /// A catalog over an already built landmark list, zones untouched.
    pub fn from_landmarks(landmarks: Vec<Landmark>, tables: CatalogTables) -> Self {
        Self {
            tables,
            landmarks,
            initialized: true,
            ..Self::default()
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn zones(&self) -> &ZoneBoundaries {
        &self.zones
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Builds the catalog from `source` unless that already happened.
    /// Returns whether the catalog is ready; when the source has no data the
    /// catalog stays empty and the next call tries again.
    pub fn initialize(&mut self, source: &dyn VenueSource) -> bool {
        if self.initialized {
            return true;
        }
        let (Some(destinations), Some(directory)) = (source.destinations(), source.directory())
        else {
            debug!("venue data unavailable, catalog stays empty");
            return false;
        };

        let mut landmarks: Vec<Landmark> = destinations
            .into_iter()
            .filter_map(|d| {
                let id = d.id?;
                let spot = d.coordinates?;
                Some(
                    Landmark::new(
                        &id,
                        &d.node_id,
                        d.node_height.trunc() as i32,
                        &d.name,
                        &d.name_pron,
                        d.node_location.to_location(),
                        spot.to_location(),
                    )
                    .with_title_en(d.name_en),
                )
            })
            .collect();

        landmarks.extend(self.tables.additional_locations.iter().map(|a| {
            let at = Coordinate::new(a.lat, a.lng).to_location();
            Landmark::new(&a.id, &a.node_id, a.floor, &a.title, &a.title_pron, at, at)
                .with_title_en(a.title_en.clone())
                .checkpoint_only(a.checkpoint_only)
        }));

        let mut sections = Vec::new();
        collect_toilets(&directory, &mut sections);

        for landmark in landmarks.iter_mut() {
            landmark.exhibition_zone = self.zones.is_exhibition_zone(&landmark.node_location);
        }

        for landmark in landmarks.iter_mut().filter(|l| l.title.is_empty()) {
            let found = sections.iter_mut().find(|s| {
                s.node_id.as_deref() == Some(landmark.node_id.as_str())
                    && !s.title.is_empty()
                    && s.title_pron.is_some()
            });
            if let Some(section) = found {
                let pron = section.title_pron.clone().unwrap_or_default();
                *landmark =
                    landmark.with_titles(&section.title, &pron, Some(restroom_title_en(&section.title)));
                section.floor = Some(landmark.floor());
                section.exhibition_zone = landmark.exhibition_zone;
            }
        }

        info!(
            "catalog ready: {} landmarks, {} restroom sections",
            landmarks.len(),
            sections.len()
        );
        self.landmarks = landmarks;
        self.sections = sections;
        self.initialized = true;
        true
    }

    fn guide_position(&self, title: &str, floor: i32) -> Option<&GuidePosition> {
        self.tables
            .guide_positions
            .iter()
            .find(|g| g.title == title && human_floor(g.floor) == floor)
    }

    fn is_excluded(&self, landmark: &Landmark) -> bool {
        match &self.tables.excluded_title_marker {
            Some(marker) if !marker.is_empty() => landmark.title.contains(marker.as_str()),
            _ => false,
        }
    }

    fn push_entry(&self, entries: &mut Vec<Landmark>, entry: Landmark) {
        if !self.is_excluded(&entry) {
            entries.push(entry);
        }
    }

    /// Announceable entries for a human floor. Each named landmark appears
    /// once at its (possibly overridden) spot, and once more as "standing at
    /// the landmark" unless some entry already routes to it or it is a
    /// checkpoint-only landmark.
    pub fn landmarks_for_floor(&self, floor: i32) -> Vec<Landmark> {
        let mut entries = Vec::new();
        for landmark in self.landmarks.iter().filter(|l| l.floor() == floor && !l.title.is_empty()) {
            let location = self
                .guide_position(&landmark.title, floor)
                .map(|g| Location::at(g.lat, g.lng))
                .unwrap_or(landmark.spot_location);

            self.push_entry(
                &mut entries,
                Landmark {
                    spot_location: location,
                    ..landmark.clone()
                },
            );

            if !landmark.checkpoint_only && !entries.iter().any(|e| e.node_id == landmark.id) {
                self.push_entry(
                    &mut entries,
                    Landmark {
                        node_id: landmark.id.clone(),
                        node_location: location,
                        spot_location: location,
                        ..landmark.clone()
                    },
                );
            }
        }
        entries
    }

    /// Routing bookkeeping entries for a human floor: the checkpoint table's
    /// coordinates become the node location of the landmark with that title.
    pub fn checkpoints_for_floor(&self, floor: i32) -> Vec<Landmark> {
        let mut entries = Vec::new();
        for checkpoint in self
            .tables
            .checkpoint_positions
            .iter()
            .filter(|c| human_floor(c.floor) == floor)
        {
            let landmark = self
                .landmarks
                .iter()
                .find(|l| l.floor() == floor && l.title == checkpoint.title);
            if let Some(landmark) = landmark {
                self.push_entry(
                    &mut entries,
                    Landmark {
                        node_id: landmark.id.clone(),
                        ground_floor: checkpoint.floor,
                        node_location: Location::at(checkpoint.lat, checkpoint.lng),
                        ..landmark.clone()
                    },
                );
            }
        }
        entries
    }

    /// Restroom sections whose floor is known, one per title, by title.
    pub fn restroom_directory(&self) -> Vec<SectionEntry> {
        let mut list: Vec<SectionEntry> = Vec::new();
        for section in self.sections.iter().filter(|s| s.floor.is_some()) {
            let title = section.title.trim();
            if !list.iter().any(|s| s.title.trim() == title) {
                list.push(section.clone());
            }
        }
        list.sort_by(|a, b| a.title.trim().cmp(b.title.trim()));
        list
    }

    /// Nearest restroom of the selected kind: floors are searched outward
    /// from the current one, first within the visitor's zone, then outside.
    pub fn find_restroom(&self, selected: &SectionEntry, current: &Location) -> Option<&SectionEntry> {
        if !current.is_valid() {
            return None;
        }
        let candidates: Vec<&SectionEntry> = self
            .sections
            .iter()
            .filter(|s| s.toilet == selected.toilet && !s.title.is_empty() && s.title.contains(&selected.title))
            .collect();

        let floors = search_floors(current.human_floor());
        let zone = self.zones.is_exhibition_zone(current);

        let search = |zone: bool| {
            floors.iter().find_map(|floor| {
                candidates
                    .iter()
                    .find(|s| s.floor == Some(*floor) && s.exhibition_zone == zone)
                    .copied()
            })
        };
        search(zone).or_else(|| search(!zone))
    }
}

/// Floors in search order starting from `floor`, wrapping around the
/// building.
fn search_floors(floor: i32) -> Vec<i32> {
    let step = if floor > MIDDLE_FLOOR { -1 } else { 1 };
    (0..FLOOR_COUNT)
        .map(|i| {
            let mut f = floor + step * i;
            if f > TOP_FLOOR {
                f -= FLOOR_COUNT;
            }
            if f < BOTTOM_FLOOR {
                f += FLOOR_COUNT;
            }
            f
        })
        .collect()
}

fn collect_toilets(sections: &[DirectorySection], out: &mut Vec<SectionEntry>) {
    for section in sections {
        for item in &section.items {
            match &item.content {
                Some(content) => collect_toilets(content, out),
                None if item.toilet != ToiletType::None => out.push(SectionEntry {
                    node_id: item.node_id.clone(),
                    title: item.title.clone(),
                    title_pron: item.title_pron.clone(),
                    subtitle: item.subtitle.clone(),
                    subtitle_pron: item.subtitle_pron.clone(),
                    toilet: item.toilet,
                    floor: None,
                    exhibition_zone: false,
                }),
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::{DirectoryItem, Destination, Unavailable, VenueFile};

    fn destination(id: &str, node: &str, ground_floor: f64, name: &str, lat: f64, lng: f64) -> Destination {
        Destination {
            id: Some(id.into()),
            node_id: node.into(),
            node_height: ground_floor,
            name: name.into(),
            name_pron: format!("{name}-pron"),
            name_en: None,
            node_location: Coordinate::new(lat, lng),
            coordinates: Some(Coordinate::new(lat + 0.00001, lng)),
        }
    }

    fn toilet(node: &str, title: &str, toilet: ToiletType) -> DirectoryItem {
        DirectoryItem {
            node_id: Some(node.into()),
            title: title.into(),
            title_pron: Some(format!("{title}-pron")),
            toilet,
            ..Default::default()
        }
    }

    fn venue() -> VenueFile {
        VenueFile {
            destinations: vec![
                destination("a", "node_a", 1.0, "Alpha", 35.6192, 139.7762),
                destination("b", "node_b", 1.0, "Beta ASIMO", 35.6193, 139.7763),
                destination("c", "node_c", 2.0, "Gamma", 35.6190, 139.7770),
                destination("wc", "node_wc", 1.0, "", 35.6191, 139.7764),
                Destination {
                    id: None,
                    ..destination("x", "node_x", 1.0, "No id", 35.0, 139.0)
                },
            ],
            directory: vec![DirectorySection {
                title: "Facilities".into(),
                items: vec![
                    DirectoryItem {
                        title: "Floor 2".into(),
                        content: Some(vec![DirectorySection {
                            title: String::new(),
                            items: vec![toilet("node_wc", "女性用トイレ", ToiletType::Female)],
                        }]),
                        ..Default::default()
                    },
                    toilet("node_elsewhere", "男性用トイレ", ToiletType::Male),
                    DirectoryItem {
                        title: "Shop".into(),
                        node_id: Some("node_shop".into()),
                        ..Default::default()
                    },
                ],
            }],
        }
    }

    fn tables() -> CatalogTables {
        CatalogTables {
            guide_positions: vec![GuidePosition {
                title: "Alpha".into(),
                floor: 1,
                lat: 35.61925,
                lng: 139.77625,
            }],
            checkpoint_positions: vec![GuidePosition {
                title: "Gamma".into(),
                floor: 2,
                lat: 35.61899,
                lng: 139.77699,
            }],
            additional_locations: vec![AdditionalLocation {
                id: "extra".into(),
                node_id: "node_extra".into(),
                floor: 1,
                title: "Bench\n".into(),
                title_pron: "bench".into(),
                title_en: None,
                lat: 35.6194,
                lng: 139.7766,
                checkpoint_only: true,
            }],
            excluded_title_marker: Some("ASIMO".into()),
        }
    }

    fn catalog() -> LandmarkCatalog {
        let mut catalog = LandmarkCatalog::new(tables(), ZoneBoundaries::default());
        assert!(catalog.initialize(&venue()));
        catalog
    }

    #[test]
    fn unavailable_source_leaves_catalog_empty() {
        let mut catalog = LandmarkCatalog::new(tables(), ZoneBoundaries::default());
        assert!(!catalog.initialize(&Unavailable));
        assert!(!catalog.is_initialized());
        assert!(catalog.landmarks().is_empty());
        assert!(catalog.landmarks_for_floor(2).is_empty());
        // a later attempt with data succeeds
        assert!(catalog.initialize(&venue()));
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut catalog = catalog();
        let before = catalog.landmarks().len();
        assert!(catalog.initialize(&venue()));
        assert_eq!(catalog.landmarks().len(), before);
    }

    #[test]
    fn destinations_and_additional_locations() {
        let catalog = catalog();
        let ids: Vec<&str> = catalog.landmarks().iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "wc", "extra"]);
        let extra = &catalog.landmarks()[4];
        assert_eq!(extra.title(), "Bench");
        assert!(extra.is_checkpoint_only());
        assert_eq!(extra.floor(), 2);
    }

    #[test]
    fn restroom_name_backfilled_from_directory() {
        let catalog = catalog();
        let wc = catalog.landmarks().iter().find(|l| l.id() == "wc").unwrap();
        assert_eq!(wc.title(), "女性用トイレ");
        assert_eq!(wc.title_pron(), "女性用トイレ-pron");
        assert_eq!(wc.title_en(), Some("Women's restroom"));

        let directory = catalog.restroom_directory();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory[0].floor, Some(2));
    }

    #[test]
    fn zones_classified_from_node_location() {
        let catalog = catalog();
        let a = catalog.landmarks().iter().find(|l| l.id() == "a").unwrap();
        let c = catalog.landmarks().iter().find(|l| l.id() == "c").unwrap();
        assert!(!a.is_exhibition_zone());
        assert!(c.is_exhibition_zone());
    }

    #[test]
    fn floor_entries() {
        let catalog = catalog();
        let entries = catalog.landmarks_for_floor(2);
        let keys: Vec<(&str, &str)> = entries.iter().map(|e| (e.id(), e.node_id())).collect();
        // ASIMO excluded, Bench checkpoint-only gets no synthetic entry
        assert_eq!(
            keys,
            vec![
                ("a", "node_a"),
                ("a", "a"),
                ("wc", "node_wc"),
                ("wc", "wc"),
                ("extra", "node_extra"),
            ]
        );
        // guide position override applies to both entries of Alpha
        assert_eq!(entries[0].spot_location().lat, 35.61925);
        assert_eq!(entries[1].node_location().lat, 35.61925);
    }

    #[test]
    fn checkpoint_entries() {
        let catalog = catalog();
        let entries = catalog.checkpoints_for_floor(3);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node_id(), "c");
        assert_eq!(entries[0].node_location().lat, 35.61899);
        assert!(catalog.checkpoints_for_floor(2).is_empty());
    }

    #[test]
    fn restroom_directory_dedup_and_sort() {
        let mut catalog = LandmarkCatalog::new(CatalogTables::default(), ZoneBoundaries::default());
        let mut venue = venue();
        venue.destinations.push(destination("wc2", "node_wc2", 2.0, "", 35.6190, 139.7770));
        venue.destinations.push(destination("wc3", "node_wc3", 0.0, "", 35.6192, 139.7762));
        venue.directory[0].items.push(toilet("node_wc2", "女性用トイレ", ToiletType::Female));
        venue.directory[0].items.push(toilet("node_wc3", "多機能トイレ", ToiletType::Unisex));
        catalog.initialize(&venue);

        let titles: Vec<String> = catalog.restroom_directory().into_iter().map(|s| s.title).collect();
        let mut sorted = titles.clone();
        sorted.sort();
        assert_eq!(titles, sorted);
        assert_eq!(titles.len(), 2);
    }

    #[test]
    fn restroom_search_prefers_own_floor_and_zone() {
        let mut catalog = LandmarkCatalog::new(CatalogTables::default(), ZoneBoundaries::default());
        let mut venue = venue();
        venue.destinations.push(destination("wc2", "node_wc2", 2.0, "", 35.6190, 139.7770));
        venue.directory[0].items.push(toilet("node_wc2", "女性用トイレ", ToiletType::Female));
        catalog.initialize(&venue);

        let selected = catalog.restroom_directory()[0].clone();
        // standing on floor 3 in the exhibition zone
        let here = Location::at(35.6190, 139.7770).on_floor(2.0);
        let found = catalog.find_restroom(&selected, &here).unwrap();
        assert_eq!(found.node_id.as_deref(), Some("node_wc2"));

        // floor 2, outside the exhibition zone
        let here = Location::at(35.6192, 139.7762).on_floor(1.0);
        let found = catalog.find_restroom(&selected, &here).unwrap();
        assert_eq!(found.node_id.as_deref(), Some("node_wc"));

        assert!(catalog.find_restroom(&selected, &Location::unknown()).is_none());
    }

    #[test]
    fn floor_search_order_wraps() {
        assert_eq!(search_floors(1), vec![1, 2, 3, 4, 5, 6, 7, -2, -1, 0]);
        assert_eq!(search_floors(6), vec![6, 5, 4, 3, 2, 1, 0, -1, -2, 7]);
    }

    #[test]
    fn restroom_english_titles() {
        assert_eq!(restroom_title_en("1F 女性用多機能トイレ"), "Multipurpose restroom for women");
        assert_eq!(restroom_title_en("多機能トイレ"), "Multipurpose restroom");
        assert_eq!(restroom_title_en("Lounge"), "Lounge");
    }

    #[test]
    fn retitled_landmark_keeps_identity() {
        let l = Landmark::new("id", "node", 0, "Old", "old", Location::at(1.0, 2.0), Location::at(1.0, 2.0));
        let renamed = l.with_titles("New\n", "new", Some("New".into()));
        assert_eq!(renamed.id(), "id");
        assert_eq!(renamed.title(), "New");
        assert_eq!(l.title(), "Old");
    }
}
