use crate::constants::{MAX_MERCATOR_LATITUDE, TILE_SPACE_SIZE};
use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees.
///
/// Values produced by the tracker are always normalized: longitude in
/// `[-180, 180)` and latitude within the Mercator limit. The renderer may hand back
/// longitudes outside that range once the user has scrolled around the world,
/// so anything read from it goes through [`GeoPoint::normalized`] and
/// [`GeoPoint::clamped_to_mercator`] first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a new coordinate without normalizing it
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Wraps longitude into `[-180, 180)`
    pub fn wrap_lon(lon: f64) -> f64 {
        let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if wrapped >= 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        }
    }

    /// Returns the canonical form of this coordinate
    pub fn normalized(&self) -> Self {
        Self::new(Self::wrap_lon(self.lon), self.lat.clamp(-90.0, 90.0))
    }

    /// Pulls the latitude inside the square Web Mercator world, where every
    /// point has a tile row. A renderer zoomed out far enough reports the
    /// poles at the window edges.
    pub fn clamped_to_mercator(&self) -> Self {
        Self::new(
            self.lon,
            self.lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A position on the map surface, in pixels from the top left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// The visible region as last sampled from the renderer.
///
/// The bottom edge is the bottom of the drawable area, not of the whole
/// window. The three fields are only ever replaced together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBox {
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
    /// Width in degrees of longitude and height in degrees of latitude
    pub size: GeoPoint,
}

impl ViewportBox {
    /// Builds the box from two normalized corners.
    ///
    /// When the view straddles the antimeridian the right edge has a smaller
    /// longitude than the left one; the width then wraps through 360.
    pub fn from_corners(top_left: GeoPoint, bottom_right: GeoPoint) -> Self {
        let mut width = bottom_right.lon - top_left.lon;
        if width < 0.0 {
            width += 360.0;
        }

        Self {
            top_left,
            bottom_right,
            size: GeoPoint::new(width, top_left.lat - bottom_right.lat),
        }
    }

    /// Latitude halfway between the top and bottom edges
    pub fn center_lat(&self) -> f64 {
        self.top_left.lat - self.size.lat / 2.0
    }
}

/// A rectangle in tile-addressing space.
///
/// Tile space is a `TILE_SPACE_SIZE` square over the Web Mercator world with
/// `y` growing southwards, so `min_y` is the northern edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl TileBox {
    pub fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Saturates instead of overflowing on boxes outside tile space
    pub fn width(&self) -> i64 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> i64 {
        self.max_y.saturating_sub(self.min_y)
    }

    /// Width that accounts for a box crossing the antimeridian, where
    /// `max_x < min_x`
    pub fn wrapped_width(&self) -> i64 {
        let width = self.width();
        if width < 0 {
            width + TILE_SPACE_SIZE
        } else {
            width
        }
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.max_x < self.min_x
    }

    /// Checks if the box contains a tile-space point
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let in_x = if self.crosses_antimeridian() {
            x >= self.min_x || x <= self.max_x
        } else {
            x >= self.min_x && x <= self.max_x
        };
        in_x && y >= self.min_y && y <= self.max_y
    }
}

/// A tile box paired with the time window an overlay should display.
///
/// Built fresh for every dispatch pass; the time bounds are read from the
/// application's time-range state at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceTimeBox {
    pub tiles: TileBox,
    /// Inclusive start of the displayed period, in seconds
    pub min_time: i64,
    /// End of the displayed period, in seconds
    pub max_time: i64,
}

impl SpaceTimeBox {
    pub fn new(tiles: TileBox, min_time: i64, max_time: i64) -> Self {
        Self {
            tiles,
            min_time,
            max_time,
        }
    }
}
