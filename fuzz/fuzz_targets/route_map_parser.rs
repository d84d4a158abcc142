#![no_main]
use libfuzzer_sys::fuzz_target;
use busmap_core::{parsers, TransitNetwork};
use busmap_model::RouteMapLine;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = std::str::from_utf8(data) else {
        return;
    };
    for line in payload.lines() {
        if let Ok(parsed) = RouteMapLine::parse(line) {
            assert!(!parsed.route.is_empty());
        }
    }

    let mut network = TransitNetwork::new();
    if parsers::parse_route_maps(&mut network, payload).is_err() {
        assert!(network.routes.is_empty());
    }
});
