use busmap_model::{PatternRecord, RouteRecord};
use serde_json::Value;
use tracing::{debug, info};

use super::{decode, finish, record_array, required};
use crate::feed::UNNUMBERED_ROUTE;
use crate::network::Route;
use crate::notice::{FeedNotice, NoticeContainer, NoticeSeverity, NOTICE_CODE_INCOMPLETE_PATTERN};
use crate::{FeedError, FeedKind, TransitNetwork};

/// Parses the static routes feed:
/// `[{RouteNo, Name, Patterns: [{PatternNo, Destination, Direction}, ...]}, ...]`.
///
/// Returns the number of routes committed. This feed is authoritative for route names and
/// for pattern destination and direction.
pub fn parse_routes(network: &mut TransitNetwork, payload: &str) -> Result<usize, FeedError> {
    let mut notices = NoticeContainer::new();
    parse_routes_with_notices(network, payload, &mut notices)
}

pub fn parse_routes_with_notices(
    network: &mut TransitNetwork,
    payload: &str,
    notices: &mut NoticeContainer,
) -> Result<usize, FeedError> {
    let records = record_array(FeedKind::Routes, payload)?;

    let mut committed = 0;
    let mut skipped = Vec::new();
    for (index, value) in records.into_iter().enumerate() {
        let record: RouteRecord = decode(value);
        let (number, name, patterns) = match route_fields(&record) {
            Ok(fields) => fields,
            Err(field) => {
                let id = record
                    .route_no
                    .clone()
                    .unwrap_or_else(|| UNNUMBERED_ROUTE.to_string());
                debug!("skipping route record {} ({}): missing {}", index, id, field);
                notices.push(FeedNotice::missing_required_field(
                    FeedKind::Routes,
                    index,
                    field,
                    record.route_no.clone().map(|number| ("routeNo", number)),
                ));
                skipped.push(id);
                continue;
            }
        };

        let route = network.routes.get_or_create_with_name(number, name);
        route.set_name(name);
        for (pattern_index, pattern) in patterns.iter().enumerate() {
            apply_pattern(route, index, pattern_index, pattern, notices);
        }
        committed += 1;
    }

    info!(
        "routes feed: {} committed, {} skipped",
        committed,
        skipped.len()
    );
    finish(FeedKind::Routes, committed, skipped)
}

fn route_fields(record: &RouteRecord) -> Result<(&str, &str, &[Value]), &'static str> {
    let number = required(record.route_no.as_deref(), "RouteNo")?;
    let name = required(record.name.as_deref(), "Name")?;
    let patterns = required(record.patterns.as_deref(), "Patterns")?;
    Ok((number, name, patterns))
}

/// Pattern sub-records lacking a field are skipped without failing the route.
fn apply_pattern(
    route: &mut Route,
    record_index: usize,
    pattern_index: usize,
    value: &Value,
    notices: &mut NoticeContainer,
) {
    let pattern: PatternRecord = decode(value.clone());
    match (
        pattern.pattern_no.as_deref(),
        pattern.destination.as_deref(),
        pattern.direction.as_deref(),
    ) {
        (Some(name), Some(destination), Some(direction)) => {
            route.pattern_with(name, destination, direction);
        }
        _ => {
            debug!(
                "skipping incomplete pattern {} of route {}",
                pattern_index,
                route.number()
            );
            notices.push(
                FeedNotice::new(
                    NOTICE_CODE_INCOMPLETE_PATTERN,
                    NoticeSeverity::Info,
                    FeedKind::Routes,
                    "route pattern is missing PatternNo, Destination or Direction",
                )
                .at_record(record_index)
                .with_context_field("routeNo", route.number())
                .with_context_field("patternIndex", pattern_index),
            );
        }
    }
}
