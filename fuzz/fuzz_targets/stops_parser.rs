#![no_main]
use libfuzzer_sys::fuzz_target;
use busmap_core::{parsers, TransitNetwork};

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = std::str::from_utf8(data) else {
        return;
    };
    let mut network = TransitNetwork::new();
    match parsers::parse_stops(&mut network, payload) {
        Ok(committed) => assert!(network.stops.len() <= committed),
        Err(err) if err.is_malformed() => {
            assert!(network.stops.is_empty());
            assert!(network.routes.is_empty());
        }
        Err(err) => assert!(!err.skipped().is_empty()),
    }
    for stop in network.stops.iter() {
        for route in stop.routes() {
            assert!(network.routes.get(route).is_some_and(|r| r.has_stop(stop.number())));
        }
    }
});
