use busmap_model::StopNo;
use tracing::{info, warn};

use crate::feed::StaticFeedDir;
use crate::notice::{FeedNotice, NoticeContainer};
use crate::parsers;
use crate::source::{FeedSource, SourceError};
use crate::status::FeedStatus;
use crate::{FeedError, FeedKind, SharedNetwork, TransitNetwork};

/// Which feed a payload is, and for real-time feeds which stop it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedRequest {
    Stops,
    Routes,
    RouteMaps,
    /// Replaces the stop's arrival list.
    Arrivals(StopNo),
    /// Replaces the stop's bus list.
    Buses(StopNo),
}

impl FeedRequest {
    pub fn kind(self) -> FeedKind {
        match self {
            FeedRequest::Stops => FeedKind::Stops,
            FeedRequest::Routes => FeedKind::Routes,
            FeedRequest::RouteMaps => FeedKind::RouteMaps,
            FeedRequest::Arrivals(_) => FeedKind::Arrivals,
            FeedRequest::Buses(_) => FeedKind::Buses,
        }
    }

    pub fn stop(self) -> Option<StopNo> {
        match self {
            FeedRequest::Arrivals(stop) | FeedRequest::Buses(stop) => Some(stop),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Feed(#[from] FeedError),
}

#[derive(Debug)]
pub struct IngestOutcome {
    pub feed: FeedKind,
    /// Name of the source the payload came from.
    pub source: String,
    pub status: FeedStatus,
    pub committed: usize,
    pub notices: NoticeContainer,
    pub error: Option<IngestError>,
}

impl IngestOutcome {
    /// Identifiers of skipped stop or route records.
    pub fn skipped(&self) -> &[String] {
        match &self.error {
            Some(IngestError::Feed(error)) => error.skipped(),
            _ => &[],
        }
    }
}

/// Fetches one payload and commits it to the network.
///
/// The fetch happens before the write lock is taken; the parse runs under a single
/// write guard, so readers observe the whole feed or none of it.
pub fn ingest(
    network: &SharedNetwork,
    source: &dyn FeedSource,
    request: FeedRequest,
) -> IngestOutcome {
    let feed = request.kind();
    let source_name = source.name();
    let mut notices = NoticeContainer::new();

    let payload = match source.fetch() {
        Ok(payload) => payload,
        Err(err) => {
            warn!("{} feed unavailable from {}: {}", feed, source_name, err);
            notices.push(FeedNotice::feed_unavailable(
                feed,
                source_name.clone(),
                err.to_string(),
            ));
            return IngestOutcome {
                feed,
                source: source_name,
                status: FeedStatus::Unavailable,
                committed: 0,
                notices,
                error: Some(err.into()),
            };
        }
    };

    let result = {
        let mut guard = network.write();
        apply(&mut guard, request, &payload, &mut notices)
    };

    match result {
        Ok(committed) => {
            info!("{} feed from {}: {} committed", feed, source_name, committed);
            IngestOutcome {
                feed,
                source: source_name,
                status: FeedStatus::Ok,
                committed,
                notices,
                error: None,
            }
        }
        Err(err) => {
            warn!("{} (source {})", err, source_name);
            if let FeedError::Malformed { message, .. } = &err {
                notices.push(FeedNotice::malformed_feed(feed, message.clone()));
            }
            IngestOutcome {
                feed,
                source: source_name,
                status: FeedStatus::from_error(&err),
                committed: err.committed(),
                notices,
                error: Some(err.into()),
            }
        }
    }
}

/// Runs the parser for `request` against an already-fetched payload.
pub fn apply(
    network: &mut TransitNetwork,
    request: FeedRequest,
    payload: &str,
    notices: &mut NoticeContainer,
) -> Result<usize, FeedError> {
    match request {
        FeedRequest::Stops => parsers::parse_stops_with_notices(network, payload, notices),
        FeedRequest::Routes => parsers::parse_routes_with_notices(network, payload, notices),
        FeedRequest::RouteMaps => {
            parsers::parse_route_maps_with_notices(network, payload, notices)
        }
        FeedRequest::Arrivals(stop) => {
            parsers::refresh_arrivals_with_notices(network, stop, payload, notices)
        }
        FeedRequest::Buses(stop) => {
            parsers::refresh_buses_with_notices(network, stop, payload, notices)
        }
    }
}

/// Ingests the static feeds of `dir` in dependency order: stops, routes, then route maps.
///
/// A failing feed does not stop the ones after it. One outcome per feed, in order.
pub fn load_static_feeds(network: &SharedNetwork, dir: &StaticFeedDir) -> Vec<IngestOutcome> {
    dir.sources()
        .iter()
        .map(|(request, source)| ingest(network, source, *request))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{NOTICE_CODE_FEED_UNAVAILABLE, NOTICE_CODE_MALFORMED_FEED};
    use crate::source::{FileSource, StringSource};

    #[test]
    fn committed_feed_is_ok() {
        let network = SharedNetwork::default();
        let source = StringSource::new("inline", "N43-A;49.2;-123.1;49.3;-123.2;");
        let outcome = ingest(&network, &source, FeedRequest::RouteMaps);

        assert_eq!(outcome.status, FeedStatus::Ok);
        assert_eq!(outcome.source, "inline");
        assert_eq!(outcome.committed, 1);
        assert!(outcome.error.is_none());
        assert!(network.read().routes.contains("43"));
    }

    #[test]
    fn unavailable_source_is_reported() {
        let network = SharedNetwork::default();
        let source = FileSource::new("/nonexistent/busmap/stops.json");
        let outcome = ingest(&network, &source, FeedRequest::Stops);

        assert_eq!(outcome.status, FeedStatus::Unavailable);
        assert!(matches!(outcome.error, Some(IngestError::Source(_))));
        assert_eq!(outcome.notices.count_with_code(NOTICE_CODE_FEED_UNAVAILABLE), 1);
    }

    #[test]
    fn malformed_feed_pushes_notice() {
        let network = SharedNetwork::default();
        let source = StringSource::new("inline", "{\"Code\": \"3005\"}");
        let outcome = ingest(&network, &source, FeedRequest::Arrivals(51479));

        assert_eq!(outcome.status, FeedStatus::Malformed);
        assert_eq!(outcome.committed, 0);
        assert_eq!(outcome.notices.count_with_code(NOTICE_CODE_MALFORMED_FEED), 1);
        assert!(network.read().stops.is_empty());
    }

    #[test]
    fn incomplete_feed_keeps_committed_records() {
        let network = SharedNetwork::default();
        let source = StringSource::new(
            "inline",
            r#"[{"RouteNo": "004", "Name": "POWELL", "Patterns": []}, {"RouteNo": "014"}]"#,
        );
        let outcome = ingest(&network, &source, FeedRequest::Routes);

        assert_eq!(outcome.status, FeedStatus::Incomplete);
        assert_eq!(outcome.committed, 1);
        assert_eq!(outcome.skipped(), &["014".to_string()]);
        assert!(network.read().routes.contains("004"));
    }

    #[test]
    fn realtime_requests_replace_stop_lists() {
        let network = SharedNetwork::default();
        network.write().link(1, "099");
        let payload = r#"[{"RouteNo": "099", "Destination": "UBC", "Latitude": 49.26,
            "Longitude": -123.16, "RecordedTime": "10:32:07 am"}]"#;
        let source = StringSource::new("inline", payload);

        ingest(&network, &source, FeedRequest::Buses(1));
        ingest(&network, &source, FeedRequest::Buses(1));
        assert_eq!(network.read().stops.get(1).unwrap().buses().len(), 1);
        assert_eq!(FeedRequest::Buses(1).stop(), Some(1));
    }
}
