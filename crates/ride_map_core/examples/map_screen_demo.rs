//! Drive a map screen through a typical session and print each rendered view.
//!
//! Run with: cargo run -p ride_map_core --example map_screen_demo
//! Pass a JSON config path as the first argument to override defaults.

use std::time::{Duration, Instant};

use ride_map_core::drivers::{DriverFeed, DriverListResponse};
use ride_map_core::logging::init_logging;
use ride_map_core::screen::{MapScreen, ScreenView};
use ride_map_core::stores::{LocationSnapshot, StaticSelection};
use ride_map_core::test_helpers::{oakland, sf, RecordingSurface};
use ride_map_core::MapConfig;

const DRIVERS_JSON: &str = r#"{"data": [
    {"id": 1, "first_name": "Ana", "last_name": "Ruiz", "latitude": 37.7760, "longitude": -122.4180, "car_seats": 4, "rating": "4.90"},
    {"id": 2, "first_name": "Ben", "last_name": "Okafor", "latitude": 37.7712, "longitude": -122.4251, "car_seats": 6, "rating": 4.7},
    {"id": 3, "first_name": "Chen", "last_name": "Li", "car_seats": 4}
]}"#;

fn print_view(label: &str, view: &ScreenView) {
    match view {
        ScreenView::Loading => println!("[{label}] loading"),
        ScreenView::Error(message) => println!("[{label}] error: {message}"),
        ScreenView::Map(scene) => {
            println!(
                "[{label}] region center=({:.5}, {:.5}) span=({:.4}, {:.4})",
                scene.region.center.latitude(),
                scene.region.center.longitude(),
                scene.region.latitude_delta,
                scene.region.longitude_delta
            );
            for marker in &scene.markers {
                println!(
                    "    {:<10} {:<12} pickup {:>5.1} min  price {}",
                    marker.id,
                    marker.title,
                    marker.estimate.pickup_minutes,
                    marker
                        .estimate
                        .price
                        .map(|p| format!("${p:.2}"))
                        .unwrap_or_else(|| "-".to_string())
                );
            }
            if let Some(destination) = &scene.destination {
                println!("    destination pin at {:?}", destination.position);
            }
            if let Some(route) = &scene.route {
                println!("    route with {} points", route.len());
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => MapConfig::from_path(path)?,
        None => MapConfig::default(),
    };
    init_logging(&config.log_level);

    let mut screen = MapScreen::from_config(&config)?;
    let mut surface = RecordingSurface::default();
    let start = Instant::now();
    let selection = StaticSelection::default();

    print_view("start", &screen.view());

    screen.refresh(start, &LocationSnapshot::new(Some(sf()), None), &selection);
    screen.set_driver_feed(start, DriverFeed::Loaded(DriverListResponse::from_json(DRIVERS_JSON)?));
    print_view("drivers", &screen.view());

    let with_destination = LocationSnapshot::new(Some(sf()), Some(oakland()));
    screen.refresh(start + Duration::from_millis(100), &with_destination, &selection);

    // Let the route worker finish, then run the frame loop past the fit delay.
    for step in 1..=20u64 {
        std::thread::sleep(Duration::from_millis(10));
        screen.tick(start + Duration::from_millis(100 + step * 50), &mut surface);
    }
    print_view("destination", &screen.view());

    for fit in &surface.fits {
        println!("fit to {} points: {:?}", fit.points.len(), fit.identifiers);
    }
    Ok(())
}
