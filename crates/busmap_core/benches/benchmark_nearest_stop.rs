use criterion::{black_box, criterion_group, criterion_main, Criterion};
use busmap_core::{LatLon, StopRegistry};

/// A grid of stops roughly 100 m apart around downtown Vancouver.
fn generate_registry(rows: u32, cols: u32) -> StopRegistry {
    let mut registry = StopRegistry::new();
    for row in 0..rows {
        for col in 0..cols {
            let number = 50_000 + row * cols + col;
            let location = LatLon::new(
                49.20 + f64::from(row) * 0.0009,
                -123.25 + f64::from(col) * 0.0014,
            );
            registry.get_or_create_with(number, format!("STOP {}", number), location);
        }
    }
    registry
}

fn benchmark_nearest(c: &mut Criterion) {
    // 10,000 stops, about the size of the regional network
    let registry = generate_registry(100, 100);
    let point = LatLon::new(49.2609, -123.1375);

    c.bench_function("nearest_stop_10000_stops", |b| {
        b.iter(|| registry.nearest_to_default(black_box(point)))
    });
    c.bench_function("nearest_stop_10000_stops_500m", |b| {
        b.iter(|| registry.nearest_to(black_box(point), 500.0))
    });
}

criterion_group!(benches, benchmark_nearest);
criterion_main!(benches);
