use busmap_core::notice::{
    NOTICE_CODE_INCOMPLETE_BUS_RECORD, NOTICE_CODE_INCOMPLETE_PATTERN,
    NOTICE_CODE_INCOMPLETE_SCHEDULE, NOTICE_CODE_MISSING_REQUIRED_FIELD,
    NOTICE_CODE_UNROUTED_VEHICLE,
};
use busmap_core::{
    ingest, load_static_feeds, parsers, ArrivalStatus, FeedKind, FeedRequest, FeedStatus,
    FileSource, LatLon, Rectangle, SharedNetwork, StaticFeedDir, TransitNetwork,
};
use std::fs;
use std::path::{Path, PathBuf};

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent() // crates/
        .unwrap()
        .parent() // root
        .unwrap()
        .to_path_buf()
}

fn test_feeds_root() -> PathBuf {
    project_root().join("test-feeds")
}

fn static_dir() -> StaticFeedDir {
    StaticFeedDir::new(test_feeds_root().join("static"))
}

fn realtime(name: &str) -> FileSource {
    FileSource::new(test_feeds_root().join("realtime").join(name))
}

fn loaded_network() -> SharedNetwork {
    let network = SharedNetwork::default();
    load_static_feeds(&network, &static_dir());
    network
}

#[test]
fn static_feeds_load_in_order_with_partial_failures() {
    let network = SharedNetwork::default();
    let outcomes = load_static_feeds(&network, &static_dir());

    let summary: Vec<(FeedKind, FeedStatus, usize)> = outcomes
        .iter()
        .map(|outcome| (outcome.feed, outcome.status, outcome.committed))
        .collect();
    assert_eq!(
        summary,
        vec![
            (FeedKind::Stops, FeedStatus::Incomplete, 3),
            (FeedKind::Routes, FeedStatus::Incomplete, 3),
            (FeedKind::RouteMaps, FeedStatus::Ok, 3),
        ]
    );
    assert_eq!(outcomes[0].skipped(), &["50001".to_string()]);
    assert_eq!(outcomes[1].skipped(), &["N9".to_string()]);
    assert_eq!(
        outcomes[1]
            .notices
            .count_with_code(NOTICE_CODE_INCOMPLETE_PATTERN),
        1
    );

    let network = network.read();
    assert_eq!(network.stops.len(), 3);
    assert!(!network.stops.contains(50001));
    assert_eq!(network.routes.len(), 4);
    assert_eq!(network.routes.pattern_count(), 4);
}

#[test]
fn stops_feed_names_the_skipped_stop() {
    let payload = fs::read_to_string(static_dir().stops).expect("read stops fixture");
    let mut network = TransitNetwork::new();
    let mut notices = busmap_core::NoticeContainer::new();

    let err = parsers::parse_stops_with_notices(&mut network, &payload, &mut notices)
        .expect_err("one stop lacks a latitude");

    assert!(err.is_incomplete());
    assert_eq!(err.skipped(), &["50001".to_string()]);
    assert_eq!(network.stops.len(), 3);
    assert_eq!(notices.count_with_code(NOTICE_CODE_MISSING_REQUIRED_FIELD), 1);
    let notice = notices.iter().next().unwrap();
    assert_eq!(notice.context["fieldName"], "Latitude");
    assert_eq!(notice.context["stopNo"], "50001");
}

#[test]
fn links_are_bidirectional_after_loading() {
    let network = loaded_network();
    let network = network.read();

    let broadway = network.stops.get(50913).unwrap();
    let routes: Vec<&str> = broadway.routes().iter().map(|route| route.as_str()).collect();
    assert_eq!(routes, vec!["009", "099", "N9"]);

    for stop in network.stops.iter() {
        for route in stop.routes() {
            assert!(network.routes.get(route).unwrap().has_stop(stop.number()));
        }
    }
    for route in network.routes.iter() {
        for stop in route.stops() {
            assert!(network.stops.get(*stop).unwrap().serves(route.number()));
        }
    }
}

#[test]
fn route_maps_refine_patterns_from_routes_feed() {
    let network = loaded_network();
    let network = network.read();

    let oak = network.routes.get("017").unwrap();
    assert_eq!(oak.name(), "OAK/DOWNTOWN");
    let northbound = oak.find_pattern("NB1").unwrap();
    assert_eq!(northbound.destination(), "DOWNTOWN");
    assert_eq!(northbound.direction(), "NORTH");
    assert_eq!(northbound.path().len(), 3);
    assert_eq!(northbound.path()[2], LatLon::new(49.2827, -123.1207));

    let westbound = network.routes.get("099").unwrap().find_pattern("WB1").unwrap();
    assert_eq!(westbound.destination(), "UBC");
    assert_eq!(westbound.path().len(), 3);
}

#[test]
fn route_map_line_builds_single_pattern() {
    let mut network = TransitNetwork::new();
    let payload = "N43-A;49.2;-123.1;49.3;-123.2;\nN43-A;49.2;-123.1;49.3;-123.2;\n";
    parsers::parse_route_maps(&mut network, payload).unwrap();

    let route = network.routes.get("43").unwrap();
    assert_eq!(route.patterns().len(), 1);
    assert_eq!(route.patterns()[0].name(), "A");
    assert_eq!(
        route.patterns()[0].path(),
        &[LatLon::new(49.2, -123.1), LatLon::new(49.3, -123.2)]
    );
}

#[test]
fn arrivals_refresh_selected_stop() {
    let network = loaded_network();
    network.write().stops.select(51479).unwrap();

    let outcome = ingest(
        &network,
        &realtime("estimates_51479.json"),
        FeedRequest::Arrivals(51479),
    );
    assert_eq!(outcome.status, FeedStatus::Ok);
    assert_eq!(outcome.committed, 3);
    assert_eq!(outcome.notices.count_with_code(NOTICE_CODE_INCOMPLETE_SCHEDULE), 1);

    let network = network.read();
    let stop = network.stops.selected().unwrap();
    let arrivals: Vec<(i32, &str, ArrivalStatus)> = stop
        .arrivals()
        .iter()
        .map(|arrival| (arrival.minutes_to_arrival, arrival.route.as_str(), arrival.status))
        .collect();
    assert_eq!(
        arrivals,
        vec![
            (4, "099", ArrivalStatus::OnTime),
            (12, "099", ArrivalStatus::Late),
            (7, "017", ArrivalStatus::Scheduled),
        ]
    );
}

#[test]
fn arrivals_without_destinations_are_incomplete() {
    let network = loaded_network();
    let outcome = ingest(
        &network,
        &realtime("estimates_no_destination.json"),
        FeedRequest::Arrivals(51479),
    );

    assert_eq!(outcome.status, FeedStatus::Incomplete);
    assert_eq!(outcome.committed, 0);
    assert!(outcome.skipped().is_empty());
    assert_eq!(outcome.notices.count_with_code(NOTICE_CODE_INCOMPLETE_SCHEDULE), 3);
    assert!(network.read().stops.get(51479).unwrap().arrivals().is_empty());
}

#[test]
fn buses_on_unlisted_routes_are_dropped() {
    let network = loaded_network();
    let outcome = ingest(
        &network,
        &realtime("buses_51479.json"),
        FeedRequest::Buses(51479),
    );

    assert_eq!(outcome.status, FeedStatus::Ok);
    assert_eq!(outcome.committed, 2);
    assert_eq!(outcome.notices.count_with_code(NOTICE_CODE_UNROUTED_VEHICLE), 1);
    assert_eq!(outcome.notices.count_with_code(NOTICE_CODE_INCOMPLETE_BUS_RECORD), 1);

    let network = network.read();
    let routes: Vec<&str> = network
        .stops
        .get(51479)
        .unwrap()
        .buses()
        .iter()
        .map(|bus| bus.route.as_str())
        .collect();
    assert_eq!(routes, vec!["099", "017"]);
    assert!(network.routes.contains("014"));
}

#[test]
fn api_error_body_is_malformed() {
    let network = loaded_network();
    let outcome = ingest(
        &network,
        &realtime("error_response.json"),
        FeedRequest::Buses(51479),
    );
    assert_eq!(outcome.status, FeedStatus::Malformed);
    assert!(network.read().stops.get(51479).unwrap().buses().is_empty());
}

#[test]
fn realtime_feed_for_unknown_stop_creates_placeholder() {
    let network = SharedNetwork::default();
    ingest(
        &network,
        &realtime("estimates_51479.json"),
        FeedRequest::Arrivals(51479),
    );
    assert_eq!(network.read().stops.get(51479).unwrap().name(), "");

    load_static_feeds(&network, &static_dir());
    let network = network.read();
    let stop = network.stops.get(51479).unwrap();
    assert_eq!(stop.name(), "WB W 12 AVE FS HEMLOCK ST");
    assert_eq!(stop.location(), LatLon::new(49.260876, -123.137471));
    assert_eq!(stop.arrivals().len(), 3);
}

#[test]
fn nearest_stop_queries_loaded_network() {
    let network = loaded_network();
    let network = network.read();

    let near_hemlock = LatLon::new(49.2610, -123.1374);
    assert_eq!(
        network.stops.nearest_to_default(near_hemlock).map(|stop| stop.number()),
        Some(51479)
    );

    let ubc = LatLon::new(49.2660, -123.2455);
    assert_eq!(
        network.stops.nearest_to(ubc, 500.0).map(|stop| stop.number()),
        Some(61935)
    );
    assert!(network
        .stops
        .nearest_to_default(LatLon::new(49.0, -122.0))
        .is_none());
}

#[test]
fn viewport_clips_pattern_segments() {
    let network = loaded_network();
    let network = network.read();
    let path = network
        .routes
        .get("099")
        .unwrap()
        .find_pattern("EB1")
        .unwrap()
        .path()
        .to_vec();

    // Kitsilano to UBC: only the first leg of the eastbound B-Line is on screen.
    let viewport = Rectangle::new(LatLon::new(49.30, -123.26), LatLon::new(49.25, -123.20));
    assert_eq!(viewport.visible_segments(&path).count(), 1);
}

#[test]
fn missing_fixture_is_unavailable() {
    let network = SharedNetwork::default();
    let dir = static_dir().with_route_maps(test_feeds_root().join("static/missing.txt"));
    let outcomes = load_static_feeds(&network, &dir);
    assert_eq!(outcomes[2].status, FeedStatus::Unavailable);
    assert_eq!(network.read().stops.len(), 3);
}
