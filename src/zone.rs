//! Coarse spatial partition of the venue. A point belongs to the exhibition
//! zone when it lies on the right of a fixed boundary line, and to the symbol
//! zone when it lies on the other side of a second line. Both lines are
//! given in the (longitude, latitude) plane.

use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Point};
use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBoundaries {
    pub exhibition: Line,
    pub symbol: Line,
}

impl Default for ZoneBoundaries {
    fn default() -> Self {
        Self {
            exhibition: Line::new(Point::new(139.77607, 35.61905), Point::new(139.7772, 35.61963)),
            symbol: Line::new(Point::new(139.77693, 35.619495), Point::new(139.77711, 35.61927)),
        }
    }
}

impl ZoneBoundaries {
    pub fn is_exhibition_zone(&self, location: &Location) -> bool {
        self.exhibition.is_right_of(&location.lng_lat())
    }

    pub fn is_symbol_zone(&self, location: &Location) -> bool {
        !self.symbol.is_right_of(&location.lng_lat())
    }
}
