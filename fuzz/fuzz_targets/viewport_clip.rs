#![no_main]
use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use busmap_core::{LatLon, Rectangle};

#[derive(Debug, Arbitrary)]
struct FuzzData {
    north: f64,
    west: f64,
    south: f64,
    east: f64,
    path: Vec<(f64, f64)>,
}

fuzz_target!(|data: FuzzData| {
    let rect = Rectangle::new(
        LatLon::new(data.north, data.west),
        LatLon::new(data.south, data.east),
    );
    let path: Vec<LatLon> = data
        .path
        .iter()
        .map(|(lat, lon)| LatLon::new(*lat, *lon))
        .collect();

    for (src, dst) in path.windows(2).map(|pair| (pair[0], pair[1])) {
        // A segment with an endpoint inside is never clipped away.
        if rect.contains(src) || rect.contains(dst) {
            assert!(rect.intersects_segment(src, dst));
        }
    }
    assert!(rect.visible_segments(&path).count() <= path.len().saturating_sub(1));
});
