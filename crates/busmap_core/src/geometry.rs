use busmap_model::LatLon;
use serde::{Deserialize, Serialize};

/// An axis-aligned map viewport given by its north-west and south-east corners.
///
/// No antimeridian handling: west must be numerically less than east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub north_west: LatLon,
    pub south_east: LatLon,
}

impl Rectangle {
    pub const fn new(north_west: LatLon, south_east: LatLon) -> Self {
        Self {
            north_west,
            south_east,
        }
    }

    pub fn north(&self) -> f64 {
        self.north_west.latitude
    }

    pub fn south(&self) -> f64 {
        self.south_east.latitude
    }

    pub fn west(&self) -> f64 {
        self.north_west.longitude
    }

    pub fn east(&self) -> f64 {
        self.south_east.longitude
    }

    /// True if the point is inside the rectangle or on its boundary.
    pub fn contains(&self, point: LatLon) -> bool {
        between(self.south(), self.north(), point.latitude)
            && between(self.west(), self.east(), point.longitude)
    }

    /// Bounding-box overlap test between the rectangle and the segment `src`-`dst`.
    ///
    /// This over-approximates: a segment whose bounding box overlaps the rectangle is
    /// reported even when the segment itself passes outside it.
    pub fn intersects_segment(&self, src: LatLon, dst: LatLon) -> bool {
        let segment_north = src.latitude.max(dst.latitude);
        let segment_south = src.latitude.min(dst.latitude);
        let segment_west = src.longitude.min(dst.longitude);
        let segment_east = src.longitude.max(dst.longitude);

        !(self.east() < segment_west
            || segment_east < self.west()
            || self.north() < segment_south
            || segment_north < self.south())
    }

    /// Consecutive segments of `path` that pass [`Rectangle::intersects_segment`].
    pub fn visible_segments<'a>(
        &'a self,
        path: &'a [LatLon],
    ) -> impl Iterator<Item = (LatLon, LatLon)> + 'a {
        path.windows(2)
            .map(|pair| (pair[0], pair[1]))
            .filter(move |(src, dst)| self.intersects_segment(*src, *dst))
    }
}

fn between(lower: f64, upper: f64, value: f64) -> bool {
    lower <= value && value <= upper
}
