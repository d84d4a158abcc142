//! Feed parsers. Each parser consumes one complete payload and mutates a
//! [`TransitNetwork`](crate::TransitNetwork) in place.
//!
//! Static topology feeds (stops, routes) skip incomplete records, commit everything else,
//! and then report the skipped identifiers. The route map feed is all-or-nothing. The
//! real-time feeds skip incomplete records quietly; arrivals fail only when nothing at all
//! could be parsed.

mod arrivals;
mod buses;
mod route_map;
mod routes;
mod stops;

pub use arrivals::{
    parse_arrivals, parse_arrivals_with_notices, refresh_arrivals, refresh_arrivals_with_notices,
};
pub use buses::{parse_buses, parse_buses_with_notices, refresh_buses, refresh_buses_with_notices};
pub use route_map::{parse_route_maps, parse_route_maps_with_notices};
pub use routes::{parse_routes, parse_routes_with_notices};
pub use stops::{parse_stops, parse_stops_with_notices};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{FeedError, FeedKind};

pub(crate) const MISSING_REQUIRED_DATA: &str = "missing required data";

/// How a real-time parser hands its results to the target stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Commit {
    /// Add to whatever the stop already holds.
    Append,
    /// Build the complete list first, then swap it in.
    Replace,
}

/// Splits a JSON payload into its top-level record objects.
///
/// Anything other than an array of objects is malformed.
pub(crate) fn record_array(feed: FeedKind, payload: &str) -> Result<Vec<Value>, FeedError> {
    let document: Value = serde_json::from_str(payload)
        .map_err(|err| FeedError::malformed(feed, format!("invalid JSON: {}", err)))?;
    let Value::Array(records) = document else {
        return Err(FeedError::malformed(
            feed,
            "expected a top-level array of records",
        ));
    };
    if let Some(index) = records.iter().position(|record| !record.is_object()) {
        return Err(FeedError::malformed(
            feed,
            format!("record {} is not an object", index),
        ));
    }
    Ok(records)
}

/// Decodes one record. Record fields decode leniently, so a value that still fails to
/// decode (a nested entry that is not an object) is treated as having no fields at all.
pub(crate) fn decode<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_default()
}

pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, &'static str> {
    value.ok_or(field)
}

/// Turns the skipped identifiers of a static feed into the feed's result.
pub(crate) fn finish(
    feed: FeedKind,
    committed: usize,
    skipped: Vec<String>,
) -> Result<usize, FeedError> {
    if skipped.is_empty() {
        Ok(committed)
    } else {
        Err(FeedError::Incomplete {
            feed,
            skipped,
            reason: MISSING_REQUIRED_DATA.to_string(),
            committed,
        })
    }
}
