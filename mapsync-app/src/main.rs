use mapsync::prelude::*;
use std::sync::Mutex;

/// Overlay that logs every region it is shown
struct LoggingOverlay {
    notifications: Arc<Mutex<u64>>,
}

impl OverlayObserver for LoggingOverlay {
    fn name(&self) -> &str {
        "logger"
    }

    fn notify_screen_changed(&mut self, region: &SpaceTimeBox) -> Result<()> {
        let mut count = self
            .notifications
            .lock()
            .map_err(|_| MapError::observer("logger", "counter poisoned"))?;
        *count += 1;
        log::info!(
            "Visible tiles x {}..{} y {}..{} for t {}..{}",
            region.tiles.min_x,
            region.tiles.max_x,
            region.tiles.min_y,
            region.tiles.max_y,
            region.min_time,
            region.max_time
        );
        Ok(())
    }

    fn on_tap(&mut self, position: Point) -> Result<()> {
        log::info!("Tap at ({:.0}, {:.0})", position.x, position.y);
        Ok(())
    }
}

struct ScaleBar;

impl ScaleIndicator for ScaleBar {
    fn update(&mut self, pixels_per_meter: f64) {
        log::debug!("Scale bar: 100 px = {:.0} m", 100.0 / pixels_per_meter);
    }
}

/// Headless walkthrough of the tracker against a simulated renderer
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SyncConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => SyncConfig::default(),
    };
    let window = config.window;
    log::info!("Using configuration {}", config.to_json_string()?);

    // Zurich, zoomed to city level
    let renderer = Arc::new(SimulatedRenderer::new(
        Point::new(window.width_px, window.full_height_px),
        GeoPoint::new(8.54, 47.37),
        11.0,
    ));
    let time_range = Arc::new(SharedTimeRange::new(1_700_000_000, 3_600));
    let notifications = Arc::new(Mutex::new(0));

    let mut sync = MapSyncBuilder::new()
        .with_config(config)
        .with_renderer(renderer.clone())
        .with_time_range(time_range.clone())
        .with_scale_indicator(Box::new(ScaleBar))
        .add_observer(Box::new(LoggingOverlay {
            notifications: notifications.clone(),
        }))
        .spawn()?;

    settle(&sync).await?;
    log::info!("Initial view {:?}", sync.current_tile_box());

    // A fling drags the map east over a few frames
    for _ in 0..4 {
        renderer.pan_by_pixels(Point::new(-40.0, 0.0));
        sync.handle_gesture(GestureEvent::Fling {
            position: Point::new(window.width_px / 2.0, window.drawable_height_px / 2.0),
            velocity: Point::new(-400.0, 0.0),
        })?;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    settle(&sync).await?;

    sync.handle_gesture(GestureEvent::SingleTap {
        position: Point::new(120.0, 80.0),
    })?;

    // Fit the old town
    let target = TileBox::new(
        projection::to_tile_x(8.53)?,
        projection::to_tile_y(47.38)?,
        projection::to_tile_x(8.55)?,
        projection::to_tile_y(47.36)?,
    );
    sync.fit_to_region(target)?;
    settle(&sync).await?;
    log::info!("Fitted view {:?}", sync.current_tile_box());

    sync.zoom_out()?;
    settle(&sync).await?;

    // A keyboard slides up over the bottom third of the window
    let covered = WindowGeometry::new(
        window.width_px,
        window.full_height_px,
        window.full_height_px * 2.0 / 3.0,
    );
    renderer.set_window_size(Point::new(covered.width_px, covered.full_height_px));
    sync.set_window_geometry(covered)?;
    settle(&sync).await?;
    log::info!("Drawable view {:?}", sync.current_tile_box());

    time_range.set(1_700_003_600, 7_200);
    sync.force_refresh()?;
    settle(&sync).await?;

    if let Some(meters) = sync.meters_per_pixel()? {
        log::info!("{:.1} m per pixel", meters);
    }

    let stats = sync.stats();
    log::info!(
        "{} samples, {} ticks armed, {} overlay notifications",
        stats.samples,
        stats.ticks_armed,
        notifications.lock().map(|count| *count).unwrap_or_default()
    );

    sync.shutdown().await?;
    Ok(())
}

/// Waits until the worker has stopped polling
async fn settle(sync: &MapSync) -> Result<()> {
    loop {
        sync.flush().await?;
        if !sync.stats().polling {
            return Ok(());
        }
        tokio::time::sleep(sync.timing().poll_step()).await;
    }
}
