//! Conversions between geographic degrees and tile-addressing space.
//!
//! Tile space is the integer grid the application's spatial index is keyed
//! on: a `TILE_SPACE_SIZE` square laid over the Web Mercator world, `x`
//! growing eastwards from the antimeridian and `y` growing southwards from the
//! northern Mercator limit. Every function here is pure.

use crate::{
    constants::{LON_TO_METERS_AT_EQUATOR, TILE_SPACE_SIZE},
    core::geo::{GeoPoint, TileBox, ViewportBox},
    MapError, Result,
};
use std::f64::consts::PI;

/// Converts a longitude to a tile-space column.
///
/// The longitude is wrapped into `[-180, 180)` first, so the result always
/// lies in `[0, TILE_SPACE_SIZE)`.
pub fn to_tile_x(lon: f64) -> Result<i64> {
    if !lon.is_finite() {
        return Err(MapError::InvalidCoordinates(format!(
            "longitude {lon} is not finite"
        )));
    }

    let lon = GeoPoint::wrap_lon(lon);
    let x = ((lon + 180.0) / 360.0 * TILE_SPACE_SIZE as f64).floor() as i64;

    Ok(x.min(TILE_SPACE_SIZE - 1))
}

/// Converts a latitude to a tile-space row.
///
/// The latitude must lie strictly between the poles, where the projection is
/// undefined. Latitudes beyond the Mercator limit map outside
/// `[0, TILE_SPACE_SIZE)` rather than being clamped.
pub fn to_tile_y(lat: f64) -> Result<i64> {
    check_latitude(lat)?;

    let lat_rad = lat.to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * TILE_SPACE_SIZE as f64;

    Ok(y.floor() as i64)
}

/// Converts a tile-space column back to the longitude of its western edge
pub fn from_tile_x(x: i64) -> f64 {
    x as f64 / TILE_SPACE_SIZE as f64 * 360.0 - 180.0
}

/// Converts a tile-space row back to the latitude of its northern edge
pub fn from_tile_y(y: i64) -> f64 {
    let n = PI * (1.0 - 2.0 * y as f64 / TILE_SPACE_SIZE as f64);
    n.sinh().atan().to_degrees()
}

/// Meters covered by one degree of longitude at the given latitude, using the
/// `1 / cos(lat)` scaling of the equatorial constant.
pub fn lon_to_meters_at(lat: f64) -> Result<f64> {
    check_latitude(lat)?;
    Ok(LON_TO_METERS_AT_EQUATOR / lat.to_radians().cos())
}

/// Ground distance represented by one horizontal pixel at the center of the
/// viewport.
pub fn meters_per_pixel(viewport: &ViewportBox, window_width_px: f64) -> Result<f64> {
    if !(window_width_px.is_finite() && window_width_px > 0.0) {
        return Err(MapError::InvalidCoordinates(format!(
            "window width {window_width_px} must be positive"
        )));
    }

    let meters_per_degree = lon_to_meters_at(viewport.center_lat())?;
    Ok(viewport.size.lon / window_width_px * meters_per_degree)
}

/// Converts two geographic corners into the tile box they span
pub fn tile_box_from_corners(top_left: &GeoPoint, bottom_right: &GeoPoint) -> Result<TileBox> {
    Ok(TileBox::new(
        to_tile_x(top_left.lon)?,
        to_tile_y(top_left.lat)?,
        to_tile_x(bottom_right.lon)?,
        to_tile_y(bottom_right.lat)?,
    ))
}

/// The tile box matching a viewport. Always recomputed, never stored on its own.
pub fn tile_box_for(viewport: &ViewportBox) -> Result<TileBox> {
    tile_box_from_corners(&viewport.top_left, &viewport.bottom_right)
}

fn check_latitude(lat: f64) -> Result<()> {
    if !lat.is_finite() || lat <= -90.0 || lat >= 90.0 {
        return Err(MapError::InvalidCoordinates(format!(
            "latitude {lat} must lie strictly between -90 and 90"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // One tile unit is 360 / 2^30 degrees of longitude
    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn test_longitude_round_trip() {
        let mut lon = -180.0;
        while lon < 180.0 {
            let back = from_tile_x(to_tile_x(lon).unwrap());
            assert!((back - lon).abs() < TOLERANCE, "lon {lon} came back as {back}");
            lon += 0.731;
        }
    }

    #[test]
    fn test_latitude_round_trip() {
        let mut lat = -84.99;
        while lat < 85.0 {
            let back = from_tile_y(to_tile_y(lat).unwrap());
            assert!((back - lat).abs() < TOLERANCE, "lat {lat} came back as {back}");
            lat += 0.377;
        }
    }

    #[test]
    fn test_tile_space_orientation() {
        assert_eq!(to_tile_x(-180.0).unwrap(), 0);
        assert_eq!(to_tile_x(0.0).unwrap(), TILE_SPACE_SIZE / 2);
        assert_eq!(to_tile_y(0.0).unwrap(), TILE_SPACE_SIZE / 2);
        // North is up: higher latitudes have smaller rows
        assert!(to_tile_y(45.0).unwrap() < to_tile_y(-45.0).unwrap());
        // Out of range longitudes wrap instead of failing
        assert_eq!(to_tile_x(190.0).unwrap(), to_tile_x(-170.0).unwrap());
    }

    #[test]
    fn test_polar_latitudes_rejected() {
        assert!(matches!(to_tile_y(90.0), Err(MapError::InvalidCoordinates(_))));
        assert!(matches!(to_tile_y(-90.0), Err(MapError::InvalidCoordinates(_))));
        assert!(matches!(to_tile_y(91.0), Err(MapError::InvalidCoordinates(_))));
        assert!(to_tile_y(f64::NAN).is_err());
        assert!(lon_to_meters_at(90.0).is_err());
        assert!(to_tile_x(f64::INFINITY).is_err());
    }

    #[test]
    fn test_meters_per_pixel_grows_with_latitude() {
        let equator = ViewportBox::from_corners(GeoPoint::new(-10.0, 5.0), GeoPoint::new(10.0, -5.0));
        let north = ViewportBox::from_corners(GeoPoint::new(-10.0, 65.0), GeoPoint::new(10.0, 55.0));

        let at_equator = meters_per_pixel(&equator, 800.0).unwrap();
        let at_sixty = meters_per_pixel(&north, 800.0).unwrap();

        assert!((at_equator - 20.0 / 800.0 * LON_TO_METERS_AT_EQUATOR).abs() < 1e-6);
        assert!(at_sixty > at_equator);
        assert!((at_sixty / at_equator - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_meters_per_pixel_rejects_bad_width() {
        let vp = ViewportBox::from_corners(GeoPoint::new(-10.0, 5.0), GeoPoint::new(10.0, -5.0));
        assert!(meters_per_pixel(&vp, 0.0).is_err());
    }

    #[test]
    fn test_tile_box_for_viewport() {
        let vp = ViewportBox::from_corners(GeoPoint::new(-90.0, 45.0), GeoPoint::new(90.0, -45.0));
        let tiles = tile_box_for(&vp).unwrap();

        assert_eq!(tiles.min_x, TILE_SPACE_SIZE / 4);
        assert_eq!(tiles.max_x, TILE_SPACE_SIZE / 4 * 3);
        assert!(tiles.min_y < TILE_SPACE_SIZE / 2);
        assert!(tiles.max_y > TILE_SPACE_SIZE / 2);
        // Mercator is symmetric around the equator
        assert!((tiles.min_y + tiles.max_y - TILE_SPACE_SIZE).abs() <= 1);
    }
}
