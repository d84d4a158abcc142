use busmap_model::{Arrival, ArrivalStatus, ArrivalsRecord, RouteNo, ScheduleRecord, StopNo};
use tracing::{debug, info};

use super::{decode, record_array, Commit};
use crate::notice::{
    FeedNotice, NoticeContainer, NoticeSeverity, NOTICE_CODE_INCOMPLETE_ROUTE_ARRIVALS,
    NOTICE_CODE_INCOMPLETE_SCHEDULE,
};
use crate::{FeedError, FeedKind, TransitNetwork};

const NO_ARRIVALS: &str = "no arrivals could be parsed";

/// Parses an arrival estimates feed for `stop` and appends the arrivals to the stop:
/// `[{RouteNo, Schedules: [{ExpectedCountdown, Destination, ScheduleStatus}, ...]}, ...]`.
///
/// Incomplete entries are skipped quietly. The feed fails as incomplete only when no
/// arrival at all could be parsed. Returns the number of arrivals added.
pub fn parse_arrivals(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
) -> Result<usize, FeedError> {
    let mut notices = NoticeContainer::new();
    parse_arrivals_with_notices(network, stop, payload, &mut notices)
}

pub fn parse_arrivals_with_notices(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
    notices: &mut NoticeContainer,
) -> Result<usize, FeedError> {
    ingest_arrivals(network, stop, payload, notices, Commit::Append)
}

/// Like [`parse_arrivals`], but the stop's arrival list is replaced as a whole by the
/// arrivals of this payload.
pub fn refresh_arrivals(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
) -> Result<usize, FeedError> {
    let mut notices = NoticeContainer::new();
    refresh_arrivals_with_notices(network, stop, payload, &mut notices)
}

pub fn refresh_arrivals_with_notices(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
    notices: &mut NoticeContainer,
) -> Result<usize, FeedError> {
    ingest_arrivals(network, stop, payload, notices, Commit::Replace)
}

fn ingest_arrivals(
    network: &mut TransitNetwork,
    stop: StopNo,
    payload: &str,
    notices: &mut NoticeContainer,
    commit: Commit,
) -> Result<usize, FeedError> {
    let records = record_array(FeedKind::Arrivals, payload)?;

    let mut arrivals = Vec::new();
    for (index, value) in records.into_iter().enumerate() {
        let record: ArrivalsRecord = decode(value);
        let (Some(route), Some(schedules)) = (record.route_no, record.schedules) else {
            debug!("skipping arrivals record {} for stop {}", index, stop);
            notices.push(
                FeedNotice::new(
                    NOTICE_CODE_INCOMPLETE_ROUTE_ARRIVALS,
                    NoticeSeverity::Info,
                    FeedKind::Arrivals,
                    "arrivals record is missing RouteNo or Schedules",
                )
                .at_record(index)
                .with_context_field("stopNo", stop),
            );
            continue;
        };

        network.routes.get_or_create(&route);
        let route = RouteNo::from(route);
        for (schedule_index, schedule) in schedules.into_iter().enumerate() {
            let schedule: ScheduleRecord = decode(schedule);
            match arrival_from(&route, schedule) {
                Some(arrival) => arrivals.push(arrival),
                None => {
                    debug!(
                        "skipping schedule {} of route {} at stop {}",
                        schedule_index, route, stop
                    );
                    notices.push(
                        FeedNotice::new(
                            NOTICE_CODE_INCOMPLETE_SCHEDULE,
                            NoticeSeverity::Info,
                            FeedKind::Arrivals,
                            "schedule is missing ExpectedCountdown, Destination or ScheduleStatus",
                        )
                        .at_record(index)
                        .with_context_field("routeNo", route.as_str())
                        .with_context_field("scheduleIndex", schedule_index),
                    );
                }
            }
        }
    }

    let added = arrivals.len();
    let target = network.stops.get_or_create(stop);
    match commit {
        Commit::Append => arrivals.into_iter().for_each(|arrival| target.add_arrival(arrival)),
        Commit::Replace => {
            target.replace_arrivals(arrivals);
        }
    }

    if added == 0 {
        return Err(FeedError::Incomplete {
            feed: FeedKind::Arrivals,
            skipped: Vec::new(),
            reason: NO_ARRIVALS.to_string(),
            committed: 0,
        });
    }
    info!("arrivals feed: {} arrivals for stop {}", added, stop);
    Ok(added)
}

fn arrival_from(route: &RouteNo, schedule: ScheduleRecord) -> Option<Arrival> {
    let minutes = i32::try_from(schedule.expected_countdown?).ok()?;
    let destination = schedule.destination?;
    let status = ArrivalStatus::from_code(&schedule.schedule_status?);
    Some(Arrival::new(minutes, destination, route.clone(), status))
}
