//! Location samples and the hub that fans them out to subscribers.
//!
//! The positioning collaborator pushes a [`LocationEvent`] into a
//! [`LocationHub`]; anything interested registers a callback with
//! [`LocationHub::subscribe`] and keeps the returned [`Subscription`] alive
//! for as long as it wants updates.

use std::{
    collections::BTreeMap,
    fmt::Display,
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Instant,
};

use serde::{Deserialize, Serialize};

use crate::geometry::{haversine, Point};

/// A point-in-time positioning sample. Latitude and longitude are NaN while
/// the position is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    /// Ground floor number as reported by the positioning system, which
    /// may be fractional while moving between floors.
    pub floor: f64,
    pub speed: f64,
    pub accuracy: f64,
    /// Heading, in degrees.
    pub orientation: f64,
    pub orientation_accuracy: f64,
}

impl Location {
    /// A location with only coordinates set.
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            ..Self::unknown()
        }
    }

    pub fn unknown() -> Self {
        Self {
            lat: f64::NAN,
            lng: f64::NAN,
            floor: 0.0,
            speed: 0.0,
            accuracy: 0.0,
            orientation: 0.0,
            orientation_accuracy: 0.0,
        }
    }

    pub fn on_floor(self, floor: f64) -> Self {
        Self { floor, ..self }
    }

    /// Usable for geometry only when both coordinates are known.
    pub fn is_valid(&self) -> bool {
        !self.lat.is_nan() && !self.lng.is_nan()
    }

    /// Distance to `other` in meters.
    pub fn distance_to(&self, other: &Location) -> f64 {
        haversine(self.lat, self.lng, other.lat, other.lng)
    }

    /// The floor as a visitor would say it: basements keep their negative
    /// number, everything else is shifted up by one. The sign is taken
    /// before truncating, so a reading of -0.5 is floor 0.
    pub fn human_floor(&self) -> i32 {
        if self.floor < 0.0 {
            self.floor.trunc() as i32
        } else {
            (self.floor + 1.0).trunc() as i32
        }
    }

    /// (longitude, latitude) as a plane point, the frame used by the zone
    /// boundary tests.
    pub fn lng_lat(&self) -> Point {
        Point::new(self.lng, self.lat)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.7}, {:.7}] floor {}", self.lat, self.lng, self.floor)
    }
}

/// Converts a ground floor number to a human floor number.
pub fn human_floor(ground_floor: i32) -> i32 {
    if ground_floor < 0 {
        ground_floor
    } else {
        ground_floor + 1
    }
}

/// A location sample together with the moment it was received.
#[derive(Debug, Clone, Copy)]
pub struct LocationEvent {
    pub location: Location,
    pub at: Instant,
}

impl LocationEvent {
    pub fn new(location: Location, at: Instant) -> Self {
        Self { location, at }
    }

    pub fn now(location: Location) -> Self {
        Self::new(location, Instant::now())
    }
}

type Callback = Arc<dyn Fn(&LocationEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

fn lock(subscribers: &Mutex<Subscribers>) -> MutexGuard<'_, Subscribers> {
    // a panicking subscriber must not take the hub down with it
    subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fans location events out to every live subscriber, in subscription order.
#[derive(Clone, Default)]
pub struct LocationHub {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl LocationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback`. It keeps receiving events until the returned
    /// [`Subscription`] is dropped or cancelled.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LocationEvent) + Send + Sync + 'static,
    {
        let mut subs = lock(&self.subscribers);
        let id = subs.next_id;
        subs.next_id += 1;
        subs.callbacks.insert(id, Arc::new(callback));
        Subscription {
            id,
            hub: Arc::downgrade(&self.subscribers),
        }
    }

    /// Delivers `event` to every subscriber on the calling thread. The
    /// subscriber list is read once up front, so callbacks may subscribe or
    /// unsubscribe; such changes take effect from the next event.
    pub fn publish(&self, event: LocationEvent) {
        let callbacks: Vec<Callback> = lock(&self.subscribers).callbacks.values().cloned().collect();
        for callback in callbacks {
            callback(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).callbacks.len()
    }
}

/// Cancellation handle returned by [`LocationHub::subscribe`].
pub struct Subscription {
    id: u64,
    hub: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Stops delivery. Same as dropping the handle, but reads better at
    /// teardown sites.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub).callbacks.remove(&self.id);
        }
    }
}
