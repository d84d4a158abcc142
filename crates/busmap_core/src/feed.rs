use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ingest::FeedRequest;
use crate::source::FileSource;

pub const STOPS_FILE: &str = "stops.json";
pub const ROUTES_FILE: &str = "routes.json";
pub const ROUTE_MAPS_FILE: &str = "allroutemaps.txt";

/// Placeholder reported in place of a stop number when the record had none.
pub const UNNUMBERED_STOP: &str = "unnumbered stop";
/// Placeholder reported in place of a route number when the record had none.
pub const UNNUMBERED_ROUTE: &str = "unnumbered route";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Stops,
    Routes,
    RouteMaps,
    Arrivals,
    Buses,
}

impl FeedKind {
    pub fn label(self) -> &'static str {
        match self {
            FeedKind::Stops => "stops",
            FeedKind::Routes => "routes",
            FeedKind::RouteMaps => "route map",
            FeedKind::Arrivals => "arrivals",
            FeedKind::Buses => "bus locations",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    /// The payload is not a well-formed record array (or line list). Nothing was committed.
    #[error("{feed} feed is malformed: {message}")]
    Malformed { feed: FeedKind, message: String },
    /// Some records were skipped, or none were usable. Everything parseable was committed.
    #[error("{feed} feed data incomplete: {reason}{}", skipped_suffix(.skipped))]
    Incomplete {
        feed: FeedKind,
        skipped: Vec<String>,
        reason: String,
        committed: usize,
    },
}

fn skipped_suffix(skipped: &[String]) -> String {
    if skipped.is_empty() {
        String::new()
    } else {
        format!(": {}", skipped.join(" "))
    }
}

impl FeedError {
    pub fn malformed(feed: FeedKind, message: impl Into<String>) -> Self {
        FeedError::Malformed {
            feed,
            message: message.into(),
        }
    }

    pub fn feed(&self) -> FeedKind {
        match self {
            FeedError::Malformed { feed, .. } | FeedError::Incomplete { feed, .. } => *feed,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, FeedError::Malformed { .. })
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, FeedError::Incomplete { .. })
    }

    /// Identifiers of the skipped records; empty for malformed feeds and count-based failures.
    pub fn skipped(&self) -> &[String] {
        match self {
            FeedError::Incomplete { skipped, .. } => skipped,
            FeedError::Malformed { .. } => &[],
        }
    }

    pub fn committed(&self) -> usize {
        match self {
            FeedError::Incomplete { committed, .. } => *committed,
            FeedError::Malformed { .. } => 0,
        }
    }
}

/// The static feed files of one data directory.
#[derive(Debug, Clone)]
pub struct StaticFeedDir {
    pub stops: PathBuf,
    pub routes: PathBuf,
    pub route_maps: PathBuf,
}

impl StaticFeedDir {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            stops: dir.join(STOPS_FILE),
            routes: dir.join(ROUTES_FILE),
            route_maps: dir.join(ROUTE_MAPS_FILE),
        }
    }

    pub fn with_stops(mut self, path: impl Into<PathBuf>) -> Self {
        self.stops = path.into();
        self
    }

    pub fn with_routes(mut self, path: impl Into<PathBuf>) -> Self {
        self.routes = path.into();
        self
    }

    pub fn with_route_maps(mut self, path: impl Into<PathBuf>) -> Self {
        self.route_maps = path.into();
        self
    }

    /// Sources in ingestion order: stops, routes, then route maps.
    pub fn sources(&self) -> [(FeedRequest, FileSource); 3] {
        [
            (FeedRequest::Stops, FileSource::new(&self.stops)),
            (FeedRequest::Routes, FileSource::new(&self.routes)),
            (FeedRequest::RouteMaps, FileSource::new(&self.route_maps)),
        ]
    }
}
