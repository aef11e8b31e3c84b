//! Plane geometry used by the guidance engine: points, directed lines, the
//! angle between two lines and the half-plane "which side" test.
//!
//! Everything in here is pure. The zone tests feed (longitude, latitude)
//! pairs straight in, while bearings are computed in a local east/north
//! plane measured in meters (see [`LocalPlane`]).

use std::fmt::Display;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Mean earth radius, in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// A point (or a vector, depending on who is asking) in the plane.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product, treating both points as vectors.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product of the two vectors.
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn abs_dist(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Self::Output {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.7}, {:.7})", self.x, self.y)
    }
}

/// A directed line from `from` to `to`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

impl Line {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// The vector pointing from `from` to `to`.
    pub fn vector(&self) -> Point {
        self.to - self.from
    }

    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    /// Unsigned angle between the two lines' vectors in radians, in `[0, PI]`.
    ///
    /// Returns `None` when either line has zero length, since there is no
    /// meaningful direction to compare.
    pub fn angle(a: &Line, b: &Line) -> Option<f64> {
        let len_a = a.length();
        let len_b = b.length();
        if len_a == 0.0 || len_b == 0.0 || !(len_a * len_b).is_finite() {
            return None;
        }
        // rounding can push the cosine a hair outside [-1, 1]
        let cos = (a.vector().dot(&b.vector()) / (len_a * len_b)).clamp(-1.0, 1.0);
        Some(cos.acos())
    }

    /// Half-plane test. In a right-handed frame (x east, y north) this is
    /// true when `point` lies strictly to the right of the directed line.
    pub fn is_right_of(&self, point: &Point) -> bool {
        let cross = (self.from.x - self.to.x) * (point.y - self.to.y)
            - (self.from.y - self.to.y) * (point.x - self.to.x);
        cross > 0.0
    }

    /// Intersection of two lines. With `segment` set, the intersection has to
    /// fall within both segments. Parallel lines never intersect.
    pub fn intersection(a: &Line, b: &Line, segment: bool) -> Option<Point> {
        let v = b.from - a.from;
        let v1 = a.vector();
        let v2 = b.vector();
        let cp = v1.cross(&v2);
        if cp == 0.0 {
            return None;
        }

        let t1 = v.cross(&v2) / cp;
        let t2 = v.cross(&v1) / cp;

        let eps = f64::EPSILON;
        if segment && (t1 + eps < 0.0 || t1 - eps > 1.0 || t2 + eps < 0.0 || t2 - eps > 1.0) {
            return None;
        }
        Some(a.from + v1 * t1)
    }
}

/// Great-circle distance between two (lat, lng) pairs in degrees, in meters.
pub fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS * c
}

/// An equirectangular projection around an origin. Good to well under a
/// centimeter over the tens of meters the selector cares about.
#[derive(Debug, Clone, Copy)]
pub struct LocalPlane {
    origin_lat: f64,
    origin_lng: f64,
    cos_lat: f64,
}

impl LocalPlane {
    pub fn new(origin_lat: f64, origin_lng: f64) -> Self {
        Self {
            origin_lat,
            origin_lng,
            cos_lat: origin_lat.to_radians().cos(),
        }
    }

    /// Projects (lat, lng) to meters east (`x`) and north (`y`) of the origin.
    pub fn project(&self, lat: f64, lng: f64) -> Point {
        Point {
            x: (lng - self.origin_lng).to_radians() * EARTH_RADIUS * self.cos_lat,
            y: (lat - self.origin_lat).to_radians() * EARTH_RADIUS,
        }
    }
}
