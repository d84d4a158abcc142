use busmap_model::{Bus, BusRecord, LatLon, RouteNo, StopNo};
use tracing::{debug, info};

use super::{decode, record_array, Commit};
use crate::notice::{
    FeedNotice, NoticeContainer, NoticeSeverity, NOTICE_CODE_INCOMPLETE_BUS_RECORD,
    NOTICE_CODE_UNROUTED_VEHICLE,
};
use crate::{FeedError, FeedKind, TransitNetwork};

/// Parses a bus positions feed for `stop` and appends the buses to the stop:
/// `[{RouteNo, Destination, Latitude, Longitude, RecordedTime}, ...]`.
///
/// Incomplete records are skipped and buses on routes that do not serve the stop are
/// dropped; neither fails the feed. Returns the number of buses added.
pub fn parse_buses(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
) -> Result<usize, FeedError> {
    let mut notices = NoticeContainer::new();
    parse_buses_with_notices(network, stop, payload, &mut notices)
}

pub fn parse_buses_with_notices(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
    notices: &mut NoticeContainer,
) -> Result<usize, FeedError> {
    ingest_buses(network, stop, payload, notices, Commit::Append)
}

/// Like [`parse_buses`], but the stop's bus list is replaced as a whole.
pub fn refresh_buses(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
) -> Result<usize, FeedError> {
    let mut notices = NoticeContainer::new();
    refresh_buses_with_notices(network, stop, payload, &mut notices)
}

pub fn refresh_buses_with_notices(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
    notices: &mut NoticeContainer,
) -> Result<usize, FeedError> {
    ingest_buses(network, stop, payload, notices, Commit::Replace)
}

fn ingest_buses(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
    notices: &mut NoticeContainer,
    commit: Commit,
) -> Result<usize, FeedError> {
    let records = record_array(FeedKind::Buses, payload)?;

    let mut buses = Vec::new();
    for (index, value) in records.into_iter().enumerate() {
        let record: BusRecord = decode(value);
        let Some(bus) = bus_from(record) else {
            debug!("skipping bus record {} for stop {}", index, stop);
            notices.push(
                FeedNotice::new(
                    NOTICE_CODE_INCOMPLETE_BUS_RECORD,
                    NoticeSeverity::Info,
                    FeedKind::Buses,
                    "bus record is missing a required field",
                )
                .at_record(index)
                .with_context_field("stopNo", stop),
            );
            continue;
        };
        network.routes.get_or_create(&bus.route);
        buses.push((index, bus));
    }

    let target = network.stops.get_or_create(stop);
    let mut served = Vec::with_capacity(buses.len());
    for (index, bus) in buses {
        if target.serves(&bus.route) {
            served.push(bus);
        } else {
            debug!("dropping bus on route {} not serving stop {}", bus.route, stop);
            notices.push(
                FeedNotice::new(
                    NOTICE_CODE_UNROUTED_VEHICLE,
                    NoticeSeverity::Info,
                    FeedKind::Buses,
                    "bus route does not serve the stop",
                )
                .at_record(index)
                .with_context_field("stopNo", stop)
                .with_context_field("routeNo", bus.route.as_str()),
            );
        }
    }

    let added = served.len();
    match commit {
        Commit::Append => {
            for bus in served {
                target.add_bus(bus);
            }
        }
        Commit::Replace => {
            target.replace_buses(served);
        }
    }

    info!("bus feed: {} buses for stop {}", added, stop);
    Ok(added)
}

fn bus_from(record: BusRecord) -> Option<Bus> {
    let route = RouteNo::from(record.route_no?);
    let destination = record.destination?;
    let location = LatLon::new(record.latitude?, record.longitude?);
    let recorded_time = record.recorded_time?;
    Some(Bus::new(route, location, destination, recorded_time))
}
