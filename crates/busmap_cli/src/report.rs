use std::path::Path;

use anyhow::Context;
use busmap_core::geo::distance;
use busmap_core::{
    Arrival, Bus, FeedKind, FeedNotice, FeedStatus, IngestOutcome, LatLon, Rectangle, RouteNo,
    Stop, StopNo, TransitNetwork,
};
use chrono::{Local, SecondsFormat};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub version: &'static str,
    pub summary: NetworkSummary,
    pub feeds: Vec<FeedReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest: Option<NearestStopReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_stop: Option<SelectedStopReport>,
}

#[derive(Debug, Serialize)]
pub struct NetworkSummary {
    pub stops: usize,
    pub routes: usize,
    pub patterns: usize,
}

#[derive(Debug, Serialize)]
pub struct FeedReport {
    pub feed: FeedKind,
    pub source: String,
    pub status: FeedStatus,
    pub committed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<FeedNotice>,
}

impl From<IngestOutcome> for FeedReport {
    fn from(outcome: IngestOutcome) -> Self {
        Self {
            feed: outcome.feed,
            skipped: outcome.skipped().to_vec(),
            error: outcome.error.as_ref().map(ToString::to_string),
            source: outcome.source,
            status: outcome.status,
            committed: outcome.committed,
            notices: outcome.notices.into_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StopSummary {
    pub number: StopNo,
    pub name: String,
    pub location: LatLon,
}

impl From<&Stop> for StopSummary {
    fn from(stop: &Stop) -> Self {
        Self {
            number: stop.number(),
            name: stop.name().to_string(),
            location: stop.location(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearestStopReport {
    pub query: LatLon,
    pub radius_meters: f64,
    pub stop: Option<StopSummary>,
    pub distance_meters: Option<f64>,
}

impl NearestStopReport {
    pub fn build(network: &TransitNetwork, query: LatLon, radius_meters: f64) -> Self {
        let nearest = network.stops.nearest_to(query, radius_meters);
        Self {
            query,
            radius_meters,
            distance_meters: nearest.map(|stop| distance(query, stop.location())),
            stop: nearest.map(StopSummary::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectedStopReport {
    pub stop: StopSummary,
    pub routes: Vec<RouteNo>,
    pub arrivals: Vec<Arrival>,
    pub buses: Vec<Bus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Rectangle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<PatternReport>,
}

#[derive(Debug, Serialize)]
pub struct PatternReport {
    pub route: RouteNo,
    pub pattern: String,
    pub destination: String,
    pub direction: String,
    pub points: usize,
    pub visible_segments: usize,
}

impl SelectedStopReport {
    /// Describes `stop` with arrivals soonest first. With a viewport, every pattern of
    /// every route serving the stop is clipped against it.
    pub fn build(network: &TransitNetwork, stop: &Stop, viewport: Option<Rectangle>) -> Self {
        let mut arrivals = stop.arrivals().to_vec();
        arrivals.sort_by_key(|arrival| arrival.minutes_to_arrival);

        let patterns: Vec<PatternReport> = viewport
            .map(|viewport| {
                stop.routes()
                    .iter()
                    .filter_map(|route| network.routes.get(route))
                    .flat_map(|route| route.patterns())
                    .map(|pattern| PatternReport {
                        route: RouteNo::from(pattern.route()),
                        pattern: pattern.name().to_string(),
                        destination: pattern.destination().to_string(),
                        direction: pattern.direction().to_string(),
                        points: pattern.path().len(),
                        visible_segments: viewport.visible_segments(pattern.path()).count(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            stop: StopSummary::from(stop),
            routes: stop.routes().iter().cloned().collect(),
            arrivals,
            buses: stop.buses().to_vec(),
            viewport,
            patterns,
        }
    }
}

impl Report {
    pub fn new(network: &TransitNetwork, feeds: Vec<FeedReport>) -> Self {
        Self {
            generated_at: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            version: env!("CARGO_PKG_VERSION"),
            summary: NetworkSummary {
                stops: network.stops.len(),
                routes: network.routes.len(),
                patterns: network.routes.pattern_count(),
            },
            feeds,
            nearest: None,
            selected_stop: None,
        }
    }

    /// Writes to `path`, or to stdout when no path is given.
    pub fn write_json_with_format(&self, path: Option<&Path>, pretty: bool) -> anyhow::Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
        .context("serialize report")?;
        match path {
            Some(path) => std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("write {}", path.display())),
            None => {
                println!("{}", json);
                Ok(())
            }
        }
    }
}
