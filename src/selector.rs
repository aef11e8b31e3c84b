//! Proximity selection: which landmarks are close enough and in a direction
//! worth mentioning, given where the user came from and where they are now.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::Landmark;
use crate::geometry::{LocalPlane, Line, Point};
use crate::location::Location;
use crate::phrase::{Phonation, Phrasebook, Side};

/// Thresholds for one guidance context. Radii are in meters, angles in
/// degrees, the check interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeConfig {
    pub front_radius: f64,
    pub side_radius: f64,
    pub rear_radius: f64,
    pub front_angle: f64,
    pub side_angle: f64,
    pub rear_angle: f64,
    /// How many recently announced landmarks are remembered.
    pub ring_size: usize,
    pub check_interval: f64,
    pub check_distance: f64,
}

/// Named threshold sets. The two presets come from two different screens
/// and differ on purpose; keep them apart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum GuidanceProfile {
    /// The always-on audio guide.
    #[default]
    FloorGuide,
    /// The distance check debug screen, a bit more generous.
    DistanceCheck,
    Custom(ConeConfig),
}

impl GuidanceProfile {
    pub fn config(&self) -> ConeConfig {
        match self {
            GuidanceProfile::FloorGuide => ConeConfig {
                front_radius: 8.0,
                side_radius: 7.0,
                rear_radius: 4.0,
                front_angle: 15.0,
                side_angle: 90.0,
                rear_angle: 110.0,
                ring_size: 8,
                check_interval: 1.0,
                check_distance: 1.2,
            },
            GuidanceProfile::DistanceCheck => ConeConfig {
                front_radius: 9.0,
                side_radius: 7.0,
                rear_radius: 5.0,
                front_angle: 20.0,
                side_angle: 110.0,
                rear_angle: 150.0,
                ring_size: 6,
                check_interval: 1.0,
                check_distance: 1.2,
            },
            GuidanceProfile::Custom(config) => *config,
        }
    }
}

impl ConeConfig {
    /// Whether an unsigned bearing at the given distance falls in one of
    /// the three nested cones.
    pub fn accepts(&self, angle: f64, distance: f64) -> bool {
        angle < self.front_angle
            || (angle < self.side_angle && distance < self.side_radius)
            || (angle < self.rear_angle && distance < self.rear_radius)
    }

    pub fn side(&self, signed_angle: f64) -> Option<Side> {
        Side::classify(signed_angle, self.front_angle, self.rear_angle)
    }
}

/// Fixed size memory of the last announced landmark ids.
#[derive(Debug, Clone)]
pub struct RecentRing {
    capacity: usize,
    ids: VecDeque<String>,
}

impl RecentRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ids: VecDeque::with_capacity(capacity),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    pub fn push(&mut self, id: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.ids.len() == self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(id.to_owned());
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A landmark that made it through the cones on this update.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionCandidate {
    pub id: String,
    pub title: String,
    pub title_pron: String,
    pub title_en: Option<String>,
    pub distance: f64,
    /// Degrees, negative on the left of the direction of travel.
    pub angle: f64,
    /// Spot coordinates, for the diagnostic log.
    pub lat: f64,
    pub lng: f64,
}

impl PositionCandidate {
    /// "In front: X" style phrase, or `None` when the bearing is behind the
    /// rear cone.
    pub fn phrase(&self, cones: &ConeConfig, phrasebook: &Phrasebook) -> Option<Phonation> {
        let side = cones.side(self.angle)?;
        let en = self.title_en.as_deref();
        let shown = phrasebook.spoken_name(&self.title, en);
        let said = phrasebook.spoken_name(&self.title_pron, en);
        Some(Phonation::new(
            phrasebook.side_sentence(side, shown),
            phrasebook.side_sentence(side, said),
        ))
    }
}

/// Distance from `current` to every entry's node location, for the
/// read-out. Entries are returned in the given order.
pub fn distances(entries: &[Landmark], current: &Location) -> Vec<(String, f64)> {
    if !current.is_valid() {
        return Vec::new();
    }
    entries
        .iter()
        .map(|l| (l.id().to_owned(), current.distance_to(l.node_location())))
        .collect()
}

/// Nearest entry within `radius` of `current`, measured to node locations.
pub fn nearest<'a>(entries: &'a [Landmark], current: &Location, radius: f64) -> Option<(&'a Landmark, f64)> {
    if !current.is_valid() {
        return None;
    }
    entries
        .iter()
        .map(|l| (l, current.distance_to(l.node_location())))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// The stateful part of selection: thresholds plus the recent ring.
#[derive(Debug, Clone)]
pub struct ProximitySelector {
    cones: ConeConfig,
    recent: RecentRing,
}

impl ProximitySelector {
    pub fn new(cones: ConeConfig) -> Self {
        Self {
            recent: RecentRing::new(cones.ring_size),
            cones,
        }
    }

    pub fn cones(&self) -> &ConeConfig {
        &self.cones
    }

    pub fn recent(&self) -> &RecentRing {
        &self.recent
    }

    pub fn forget(&mut self) {
        self.recent.clear();
    }

    /// Runs one selection over `entries` for a move from `previous` to
    /// `current`. Only entries in the same zone as the user are considered.
    /// Accepted candidates are remembered and returned nearest first.
    pub fn select(
        &mut self,
        entries: &[Landmark],
        previous: &Location,
        current: &Location,
        in_exhibition_zone: bool,
    ) -> Vec<PositionCandidate> {
        if !previous.is_valid() || !current.is_valid() {
            return Vec::new();
        }

        let plane = LocalPlane::new(current.lat, current.lng);
        let here = Point::default();
        let travel = Line::new(plane.project(previous.lat, previous.lng), here);

        let mut near: Vec<(&Landmark, f64)> = entries
            .iter()
            .filter(|l| l.is_exhibition_zone() == in_exhibition_zone)
            .map(|l| (l, current.distance_to(l.node_location())))
            .filter(|(_, d)| *d <= self.cones.front_radius)
            .collect();
        near.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut accepted: Vec<PositionCandidate> = Vec::new();
        for (landmark, distance) in near {
            if self.recent.contains(landmark.id()) || accepted.iter().any(|c| c.id == landmark.id()) {
                continue;
            }
            let spot = landmark.spot_location();
            if !spot.is_valid() {
                continue;
            }
            let target = plane.project(spot.lat, spot.lng);
            let Some(radians) = Line::angle(&travel, &Line::new(here, target)) else {
                continue;
            };
            let angle = radians.to_degrees();
            if !self.cones.accepts(angle, distance) {
                continue;
            }
            let signed = if travel.is_right_of(&target) { angle } else { -angle };
            accepted.push(PositionCandidate {
                id: landmark.id().to_owned(),
                title: landmark.title().to_owned(),
                title_pron: landmark.title_pron().to_owned(),
                title_en: landmark.title_en().map(str::to_owned),
                distance,
                angle: signed,
                lat: spot.lat,
                lng: spot.lng,
            });
        }

        for candidate in &accepted {
            self.recent.push(&candidate.id);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: (f64, f64) = (35.6192, 139.7762);

    /// A location `east`/`north` meters from the origin.
    fn offset(east: f64, north: f64) -> Location {
        let lat = ORIGIN.0 + (north / crate::geometry::EARTH_RADIUS).to_degrees();
        let lng = ORIGIN.1
            + (east / (crate::geometry::EARTH_RADIUS * ORIGIN.0.to_radians().cos())).to_degrees();
        Location::at(lat, lng)
    }

    fn landmark(id: &str, east: f64, north: f64) -> Landmark {
        let at = offset(east, north);
        Landmark::new(id, &format!("node_{id}"), 1, id, &format!("{id}-pron"), at, at)
    }

    fn walk_north() -> (Location, Location) {
        (offset(0.0, -5.0), offset(0.0, 0.0))
    }

    #[test]
    fn front_is_seen_far_rear_only_close() {
        let mut selector = ProximitySelector::new(GuidanceProfile::FloorGuide.config());
        let (previous, current) = walk_north();
        let entries = vec![
            landmark("ahead", 0.5, 7.5),
            landmark("side_far", 7.5, 0.5),
            landmark("side_near", 6.0, 0.5),
            landmark("behind_near", -2.0, -0.5),
            landmark("behind_far", -5.0, -3.0),
            landmark("too_far", 0.0, 9.0),
        ];
        let ids: Vec<String> = selector
            .select(&entries, &previous, &current, false)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["behind_near", "side_near", "ahead"]);
    }

    #[test]
    fn signed_angle_is_negative_on_the_left() {
        let mut selector = ProximitySelector::new(GuidanceProfile::FloorGuide.config());
        let (previous, current) = walk_north();
        let entries = vec![landmark("west", -3.0, 0.0), landmark("east", 3.5, 0.0)];
        let found = selector.select(&entries, &previous, &current, false);
        assert_eq!(found.len(), 2);
        assert!((found[0].angle + 90.0).abs() < 0.5, "{}", found[0].angle);
        assert!((found[1].angle - 90.0).abs() < 0.5, "{}", found[1].angle);

        let cones = selector.cones();
        let en = Phrasebook::english();
        assert_eq!(found[0].phrase(cones, &en).unwrap().pron, "On the left: west-pron");
        assert_eq!(found[1].phrase(cones, &en).unwrap().pron, "On the right: east-pron");
    }

    #[test]
    fn other_zone_is_ignored() {
        let mut selector = ProximitySelector::new(GuidanceProfile::FloorGuide.config());
        let (previous, current) = walk_north();
        let entries = vec![landmark("ahead", 0.0, 3.0).in_exhibition_zone(true)];
        assert!(selector.select(&entries, &previous, &current, false).is_empty());
        assert_eq!(selector.select(&entries, &previous, &current, true).len(), 1);
    }

    #[test]
    fn recent_ring_suppresses_then_forgets() {
        let mut cones = GuidanceProfile::FloorGuide.config();
        cones.ring_size = 2;
        let mut selector = ProximitySelector::new(cones);
        let (previous, current) = walk_north();

        let a = vec![landmark("a", 0.0, 2.0)];
        assert_eq!(selector.select(&a, &previous, &current, false).len(), 1);
        assert!(selector.select(&a, &previous, &current, false).is_empty());

        selector.select(&[landmark("b", 0.0, 2.0)], &previous, &current, false);
        selector.select(&[landmark("c", 0.0, 2.0)], &previous, &current, false);
        assert!(!selector.recent().contains("a"));
        assert_eq!(selector.select(&a, &previous, &current, false).len(), 1);
    }

    #[test]
    fn duplicate_ids_announced_once() {
        let mut selector = ProximitySelector::new(GuidanceProfile::FloorGuide.config());
        let (previous, current) = walk_north();
        let here = landmark("a", 0.0, 2.0);
        let synthetic = Landmark::new("a", "a", 1, "a", "a-pron", *here.node_location(), *here.spot_location());
        let found = selector.select(&[here, synthetic], &previous, &current, false);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn coincident_spot_has_no_bearing() {
        let mut selector = ProximitySelector::new(GuidanceProfile::FloorGuide.config());
        let (previous, current) = walk_north();
        let entries = vec![landmark("here", 0.0, 0.0)];
        assert!(selector.select(&entries, &previous, &current, false).is_empty());
        assert!(selector.recent().is_empty());
    }

    #[test]
    fn unknown_location_selects_nothing() {
        let mut selector = ProximitySelector::new(GuidanceProfile::FloorGuide.config());
        let entries = vec![landmark("a", 0.0, 2.0)];
        let found = selector.select(&entries, &Location::unknown(), &offset(0.0, 0.0), false);
        assert!(found.is_empty());
    }

    #[test]
    fn rear_bearing_has_no_phrase() {
        let cones = GuidanceProfile::FloorGuide.config();
        let candidate = PositionCandidate {
            id: "x".into(),
            title: "X".into(),
            title_pron: "x".into(),
            title_en: None,
            distance: 2.0,
            angle: 130.0,
            lat: 0.0,
            lng: 0.0,
        };
        assert!(candidate.phrase(&cones, &Phrasebook::english()).is_none());
    }

    #[test]
    fn nearest_within_radius() {
        let here = offset(0.0, 0.0);
        let entries = vec![landmark("a", 0.0, 6.0), landmark("b", 3.0, 0.0), landmark("c", 20.0, 0.0)];
        let (found, d) = nearest(&entries, &here, 8.0).unwrap();
        assert_eq!(found.id(), "b");
        assert!((d - 3.0).abs() < 0.01);
        assert!(nearest(&entries, &here, 1.0).is_none());
        assert_eq!(distances(&entries, &here).len(), 3);
    }

    #[test]
    fn custom_profile_round_trips_through_ron() {
        let profile = GuidanceProfile::Custom(GuidanceProfile::DistanceCheck.config());
        let text = ron::to_string(&profile).unwrap();
        let back: GuidanceProfile = ron::from_str(&text).unwrap();
        assert_eq!(back, profile);
    }
}
