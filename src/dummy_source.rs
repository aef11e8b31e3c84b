//! A stand-in for the positioning system: a background thread that walks a
//! polyline at a steady pace, adds some jitter and publishes every sample to
//! a [`LocationHub`].

use log::{debug, info};
use rand::prelude::*;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::GuideError;
use crate::geometry::EARTH_RADIUS;
use crate::location::{Location, LocationEvent, LocationHub};

enum Signal {
    /// Jitter amplitude, in meters.
    Noise(f64),
    /// Walking speed, in meters per second.
    Speed(f64),
    Stop,
}

/// Positions along a route of waypoints, by distance walked.
#[derive(Debug, Clone)]
pub struct PolylineWalker {
    waypoints: Vec<Location>,
    /// Running length at the start of each segment.
    offsets: Vec<f64>,
    length: f64,
}

impl PolylineWalker {
    pub fn new(waypoints: Vec<Location>) -> Self {
        let mut offsets = Vec::with_capacity(waypoints.len());
        let mut length = 0.0;
        for pair in waypoints.windows(2) {
            offsets.push(length);
            length += pair[0].distance_to(&pair[1]);
        }
        Self {
            waypoints,
            offsets,
            length,
        }
    }

    /// Total route length in meters.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Where someone would be after walking `walked` meters. Walking past
    /// the end leaves them standing at the last waypoint.
    pub fn position(&self, walked: f64) -> Option<Location> {
        let last = *self.waypoints.last()?;
        if self.offsets.is_empty() || walked >= self.length {
            return Some(last);
        }
        let walked = walked.max(0.0);
        let segment = self
            .offsets
            .iter()
            .rposition(|start| *start <= walked)
            .unwrap_or(0);
        let (from, to) = (self.waypoints[segment], self.waypoints[segment + 1]);
        let span = from.distance_to(&to);
        let t = if span > 0.0 {
            (walked - self.offsets[segment]) / span
        } else {
            0.0
        };
        Some(Location {
            lat: from.lat + (to.lat - from.lat) * t,
            lng: from.lng + (to.lng - from.lng) * t,
            ..from
        })
    }
}

/// Moves `location` by up to `noise` meters north and east.
fn jitter(location: Location, noise: f64, rng: &mut impl Rng) -> Location {
    if noise <= 0.0 {
        return location;
    }
    let north = rng.gen_range(-noise..noise);
    let east = rng.gen_range(-noise..noise);
    let dlat = (north / EARTH_RADIUS).to_degrees();
    let dlng = (east / (EARTH_RADIUS * location.lat.to_radians().cos())).to_degrees();
    Location {
        lat: location.lat + dlat,
        lng: location.lng + dlng,
        ..location
    }
}

pub struct DummyLocationSource {
    handle: Option<thread::JoinHandle<()>>,
    tx: mpsc::Sender<Signal>,
}

impl DummyLocationSource {
    /// Starts walking `route` at `speed` m/s, publishing to `hub` every
    /// `tick`.
    pub fn start(hub: LocationHub, route: Vec<Location>, speed: f64, tick: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<Signal>();
        let walker = PolylineWalker::new(route);
        info!("simulated walk over {:.1} m", walker.length());

        let handle = thread::spawn(move || {
            let mut rng = thread_rng();
            let mut running = true;
            let mut speed = speed;
            let mut noise = 0.0;
            let mut walked = 0.0;
            while running {
                while let Ok(received) = rx.try_recv() {
                    match received {
                        Signal::Noise(new_noise) => noise = new_noise,
                        Signal::Speed(new_speed) => speed = new_speed,
                        Signal::Stop => running = false,
                    }
                }
                if !running {
                    break;
                }
                if let Some(here) = walker.position(walked) {
                    hub.publish(LocationEvent::now(jitter(here, noise, &mut rng)));
                }
                walked += speed * tick.as_secs_f64();
                thread::sleep(tick);
            }
            debug!("simulated walk stopped after {walked:.1} m");
        });

        DummyLocationSource {
            handle: Some(handle),
            tx,
        }
    }

    pub fn set_noise(&self, noise: f64) -> Result<(), GuideError> {
        Ok(self.tx.send(Signal::Noise(noise))?)
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), GuideError> {
        Ok(self.tx.send(Signal::Speed(speed))?)
    }

    pub fn stop(&mut self) -> Result<(), GuideError> {
        // the thread may already be gone, joining is what matters
        let _ = self.tx.send(Signal::Stop);
        if let Some(thread) = self.handle.take() {
            thread.join().map_err(|_| GuideError::Disconnected)?;
        }
        Ok(())
    }
}

impl Drop for DummyLocationSource {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn route() -> Vec<Location> {
        vec![
            Location::at(35.6189, 139.7760).on_floor(1.0),
            Location::at(35.6192, 139.7760).on_floor(1.0),
            Location::at(35.6192, 139.7764).on_floor(1.0),
        ]
    }

    #[test]
    fn walker_interpolates() {
        let walker = PolylineWalker::new(route());
        let first = route()[0].distance_to(&route()[1]);
        assert!((first - 33.36).abs() < 0.1);

        let start = walker.position(0.0).unwrap();
        assert_eq!(start.lat, 35.6189);

        let halfway = walker.position(first / 2.0).unwrap();
        assert!((halfway.lat - 35.61905).abs() < 1e-9);
        assert_eq!(halfway.lng, 139.7760);
        assert_eq!(halfway.floor, 1.0);

        let corner_plus = walker.position(first + 1.0).unwrap();
        assert_eq!(corner_plus.lat, 35.6192);
        assert!(corner_plus.lng > 139.7760);

        let end = walker.position(walker.length() + 50.0).unwrap();
        assert_eq!(end.lng, 139.7764);
    }

    #[test]
    fn degenerate_routes() {
        assert!(PolylineWalker::new(vec![]).position(1.0).is_none());
        let single = PolylineWalker::new(vec![Location::at(1.0, 2.0)]);
        assert_eq!(single.length(), 0.0);
        assert_eq!(single.position(5.0).unwrap().lat, 1.0);
    }

    #[test]
    fn jitter_stays_within_noise() {
        let mut rng = StdRng::seed_from_u64(7);
        let here = Location::at(35.6192, 139.7762);
        assert_eq!(jitter(here, 0.0, &mut rng), here);
        for _ in 0..100 {
            let moved = jitter(here, 2.0, &mut rng);
            assert!(here.distance_to(&moved) < 2.0 * 2f64.sqrt() + 1e-6);
        }
    }

    #[test]
    fn publishes_until_stopped() {
        let hub = LocationHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = hub.subscribe(move |e| sink.lock().unwrap().push(e.location));

        let mut source = DummyLocationSource::start(hub, route(), 10.0, Duration::from_millis(5));
        source.set_noise(0.5).unwrap();
        source.set_speed(20.0).unwrap();
        thread::sleep(Duration::from_millis(100));
        source.stop().unwrap();

        let count = seen.lock().unwrap().len();
        assert!(count > 0);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(seen.lock().unwrap().len(), count);
        assert!(source.set_speed(1.0).is_err());
    }
}
