use busmap_model::{LatLon, StopNo, StopRecord};
use tracing::{debug, info};

use super::{decode, finish, record_array, required};
use crate::feed::UNNUMBERED_STOP;
use crate::notice::{FeedNotice, NoticeContainer};
use crate::{FeedError, FeedKind, TransitNetwork};

/// Parses the static stops feed: `[{StopNo, Name, Latitude, Longitude, Routes}, ...]`.
///
/// Returns the number of stops committed. Stops already in the network (including
/// placeholders created by real-time feeds) get their name and location overwritten.
pub fn parse_stops(network: &mut TransitNetwork, payload: &str) -> Result<usize, FeedError> {
    let mut notices = NoticeContainer::new();
    parse_stops_with_notices(network, payload, &mut notices)
}

pub fn parse_stops_with_notices(
    network: &mut TransitNetwork,
    payload: &str,
    notices: &mut NoticeContainer,
) -> Result<usize, FeedError> {
    let records = record_array(FeedKind::Stops, payload)?;

    let mut committed = 0;
    let mut skipped = Vec::new();
    for (index, value) in records.into_iter().enumerate() {
        let record: StopRecord = decode(value);
        let number = record
            .stop_no
            .and_then(|number| StopNo::try_from(number).ok());

        let (number, name, location) = match stop_fields(number, &record) {
            Ok(fields) => fields,
            Err(field) => {
                let id = number
                    .map(|number| number.to_string())
                    .unwrap_or_else(|| UNNUMBERED_STOP.to_string());
                debug!("skipping stop record {} ({}): missing {}", index, id, field);
                notices.push(FeedNotice::missing_required_field(
                    FeedKind::Stops,
                    index,
                    field,
                    number.map(|number| ("stopNo", number.to_string())),
                ));
                skipped.push(id);
                continue;
            }
        };

        if !location.is_within_bounds() {
            debug!("stop {} has out-of-range coordinates {}", number, location);
            notices.push(FeedNotice::coordinates_out_of_range(
                FeedKind::Stops,
                index,
                number,
                location,
            ));
        }

        let stop = network.stops.get_or_create_with(number, name, location);
        stop.set_name(name);
        stop.set_location(location);
        for route in record.route_numbers() {
            network.link(number, route);
        }
        committed += 1;
    }

    info!(
        "stops feed: {} committed, {} skipped",
        committed,
        skipped.len()
    );
    finish(FeedKind::Stops, committed, skipped)
}

fn stop_fields(
    number: Option<StopNo>,
    record: &StopRecord,
) -> Result<(StopNo, &str, LatLon), &'static str> {
    let number = required(number, "StopNo")?;
    let name = required(record.name.as_deref(), "Name")?;
    let latitude = required(record.latitude, "Latitude")?;
    let longitude = required(record.longitude, "Longitude")?;
    required(record.routes.as_deref(), "Routes")?;
    Ok((number, name, LatLon::new(latitude, longitude)))
}
