use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

pub mod records;

pub use records::{
    ArrivalsRecord, BusRecord, PatternRecord, RouteRecord, ScheduleRecord, StopRecord,
};

/// Key of a stop in the stop registry.
pub type StopNo = u32;

/// Key of a route in the route registry. Route numbers are short but not numeric ("099", "N19").
pub type RouteNo = CompactString;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelParseError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("route map line does not start with 'N': {0}")]
    MissingMarker(String),
    #[error("route map line has no '-' after the route number: {0}")]
    MissingRouteSeparator(String),
    #[error("route map line has no ';' after the pattern name: {0}")]
    MissingPatternSeparator(String),
    #[error("route map line has an empty route number: {0}")]
    EmptyRouteNumber(String),
    #[error("route map line has an unpaired coordinate: {0}")]
    UnpairedCoordinate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when latitude is in [-90, 90] and longitude in [-180, 180].
    ///
    /// Out-of-range coordinates are never rejected. The stops feed flags them with a
    /// warning notice and stores them as given.
    pub fn is_within_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    fn parse_component(value: &str) -> Result<f64, ModelParseError> {
        let trimmed = value.trim();
        let parsed: f64 = trimmed
            .parse()
            .map_err(|_| ModelParseError::InvalidCoordinate(value.to_string()))?;
        if !parsed.is_finite() {
            return Err(ModelParseError::InvalidCoordinate(value.to_string()));
        }
        Ok(parsed)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for LatLon {
    type Err = ModelParseError;

    /// Parses `"lat,lon"`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = value
            .split_once(',')
            .ok_or_else(|| ModelParseError::InvalidCoordinate(value.to_string()))?;
        Ok(Self::new(
            Self::parse_component(lat)?,
            Self::parse_component(lon)?,
        ))
    }
}

/// Real-time status of an expected arrival, decoded from the feed's `ScheduleStatus` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrivalStatus {
    #[serde(rename = "*")]
    Scheduled,
    #[serde(rename = " ")]
    OnTime,
    #[serde(rename = "+")]
    Early,
    #[serde(rename = "-")]
    Late,
    #[serde(other)]
    Other,
}

impl ArrivalStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "*" => ArrivalStatus::Scheduled,
            " " => ArrivalStatus::OnTime,
            "+" => ArrivalStatus::Early,
            "-" => ArrivalStatus::Late,
            _ => ArrivalStatus::Other,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ArrivalStatus::Scheduled => "*",
            ArrivalStatus::OnTime => " ",
            ArrivalStatus::Early => "+",
            ArrivalStatus::Late => "-",
            ArrivalStatus::Other => "?",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArrivalStatus::Scheduled => "scheduled",
            ArrivalStatus::OnTime => "on-time",
            ArrivalStatus::Early => "early",
            ArrivalStatus::Late => "late",
            ArrivalStatus::Other => "unknown",
        }
    }
}

impl fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One expected arrival at a stop, valid for a single refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrival {
    pub minutes_to_arrival: i32,
    pub destination: String,
    pub route: RouteNo,
    pub status: ArrivalStatus,
}

impl Arrival {
    pub fn new(
        minutes_to_arrival: i32,
        destination: impl Into<String>,
        route: RouteNo,
        status: ArrivalStatus,
    ) -> Self {
        Self {
            minutes_to_arrival,
            destination: destination.into(),
            route,
            status,
        }
    }
}

/// A vehicle position snapshot. `recorded_time` is kept exactly as the feed sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bus {
    pub route: RouteNo,
    pub location: LatLon,
    pub destination: String,
    pub recorded_time: String,
}

impl Bus {
    pub fn new(
        route: RouteNo,
        location: LatLon,
        destination: impl Into<String>,
        recorded_time: impl Into<String>,
    ) -> Self {
        Self {
            route,
            location,
            destination: destination.into(),
            recorded_time: recorded_time.into(),
        }
    }
}

/// One line of the compact route map feed:
/// `N<routeNo>-<patternName>;<lat>;<lon>;<lat>;<lon>;...;`
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMapLine {
    pub route: RouteNo,
    pub pattern: String,
    pub path: Vec<LatLon>,
}

impl RouteMapLine {
    pub const MARKER: char = 'N';

    pub fn parse(line: &str) -> Result<Self, ModelParseError> {
        let body = line
            .strip_prefix(Self::MARKER)
            .ok_or_else(|| ModelParseError::MissingMarker(line.to_string()))?;
        // Coordinates carry minus signs, so the header ends at the first ';'.
        let (header, coordinates) = body
            .split_once(';')
            .ok_or_else(|| ModelParseError::MissingPatternSeparator(line.to_string()))?;
        let (route, pattern) = header
            .split_once('-')
            .ok_or_else(|| ModelParseError::MissingRouteSeparator(line.to_string()))?;
        if route.trim().is_empty() {
            return Err(ModelParseError::EmptyRouteNumber(line.to_string()));
        }

        let values = coordinates
            .split(';')
            .filter(|token| !token.trim().is_empty())
            .map(LatLon::parse_component)
            .collect::<Result<Vec<f64>, _>>()?;
        if values.len() % 2 != 0 {
            return Err(ModelParseError::UnpairedCoordinate(line.to_string()));
        }
        let path = values
            .chunks_exact(2)
            .map(|pair| LatLon::new(pair[0], pair[1]))
            .collect();

        Ok(Self {
            route: CompactString::from(route.trim()),
            pattern: pattern.to_string(),
            path,
        })
    }
}
