use busmap_model::RouteMapLine;
use tracing::info;

use crate::notice::NoticeContainer;
use crate::{FeedError, FeedKind, TransitNetwork};

/// Parses the compact route map feed, one pattern per line:
/// `N<routeNo>-<patternName>;<lat>;<lon>;...;`
///
/// Every line is parsed before anything is committed, so a bad line leaves the network
/// untouched. Each pattern's path is replaced; its destination and direction are not.
/// Returns the number of pattern lines committed.
pub fn parse_route_maps(network: &mut TransitNetwork, payload: &str) -> Result<usize, FeedError> {
    let mut notices = NoticeContainer::new();
    parse_route_maps_with_notices(network, payload, &mut notices)
}

/// The route map feed has no per-line recovery, so `notices` is never written to. The
/// signature matches the other parsers so the ingestion engine can treat them alike.
pub fn parse_route_maps_with_notices(
    network: &mut TransitNetwork,
    payload: &str,
    _notices: &mut NoticeContainer,
) -> Result<usize, FeedError> {
    let lines = payload
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_number, line)| {
            RouteMapLine::parse(line).map_err(|err| {
                FeedError::malformed(FeedKind::RouteMaps, format!("line {}: {}", line_number, err))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let committed = lines.len();
    for line in lines {
        network
            .routes
            .get_or_create(&line.route)
            .pattern(&line.pattern)
            .set_path(line.path);
    }

    info!("route map feed: {} patterns committed", committed);
    Ok(committed)
}
