use criterion::{criterion_group, criterion_main, Criterion};
use busmap_core::{parsers, TransitNetwork};

fn generate_stops_feed(count: u32) -> String {
    let records: Vec<String> = (0..count)
        .map(|index| {
            format!(
                r#"{{"StopNo": {}, "Name": "STOP {}", "Latitude": {}, "Longitude": {}, "Routes": "{:03}, {:03}"}}"#,
                50_000 + index,
                index,
                49.20 + f64::from(index % 100) * 0.0009,
                -123.25 + f64::from(index / 100) * 0.0014,
                index % 250,
                (index + 7) % 250,
            )
        })
        .collect();
    format!("[{}]", records.join(","))
}

fn generate_route_maps_feed(routes: u32, points: u32) -> String {
    let mut feed = String::new();
    for route in 0..routes {
        feed.push_str(&format!("N{:03}-EB1;", route));
        for point in 0..points {
            feed.push_str(&format!(
                "{};{};",
                49.20 + f64::from(point) * 0.001,
                -123.25 + f64::from(route) * 0.001
            ));
        }
        feed.push('\n');
    }
    feed
}

fn benchmark_loading(c: &mut Criterion) {
    let stops = generate_stops_feed(8_000);
    c.bench_function("parse_stops_8000", |b| {
        b.iter(|| {
            let mut network = TransitNetwork::new();
            parsers::parse_stops(&mut network, &stops)
        })
    });

    let route_maps = generate_route_maps_feed(250, 400);
    c.bench_function("parse_route_maps_250x400", |b| {
        b.iter(|| {
            let mut network = TransitNetwork::new();
            parsers::parse_route_maps(&mut network, &route_maps)
        })
    });
}

criterion_group!(benches, benchmark_loading);
criterion_main!(benches);
