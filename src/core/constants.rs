//! Engine-wide constants. Timing defaults mirror the reference renderer
//! integration; keeping them in one place makes the magic numbers easy to tweak.

/// Width and height of the tile-addressing square, in tile units (2^30).
pub const TILE_SPACE_SIZE: i64 = 1 << 30;

/// Latitude limit of the square Web Mercator world.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Meters covered by one degree of longitude at the equator.
pub const LON_TO_METERS_AT_EQUATOR: f64 = 111_319.490_793_273_57;

/// Delay between consecutive settle checks while the map is moving.
pub const POLL_STEP_MS: u64 = 250;

/// Zoom levels added or removed by `zoom_in`/`zoom_out`.
pub const ZOOM_STEP: f64 = 1.5;

/// Ease duration of a `zoom_in`/`zoom_out` command.
pub const ZOOM_EASE_MS: u64 = 500;

/// Ease duration of a plain pan command.
pub const PAN_EASE_MS: u64 = 500;

/// Pan ease duration used when fitting a region.
pub const AUTOZOOM_PAN_EASE_MS: u64 = 1000;

/// Zoom ease duration used when fitting a region.
pub const AUTOZOOM_ZOOM_EASE_MS: u64 = 1000;
