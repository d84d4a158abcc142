//! Wire records for the JSON feeds.
//!
//! Every field decodes leniently: a value of the wrong shape decodes as `None`, the same
//! as a missing key, so one bad field never fails the whole payload. Deciding what a
//! missing field means is left to the parsers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopRecord {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub stop_no: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub routes: Option<String>,
}

impl StopRecord {
    /// Route numbers listed in `Routes`, e.g. `"004, 014,N19"`.
    pub fn route_numbers(&self) -> Vec<&str> {
        self.routes
            .as_deref()
            .map(|routes| {
                routes
                    .split(',')
                    .map(str::trim)
                    .filter(|route| !route.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub route_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::array")]
    pub patterns: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatternRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub pattern_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArrivalsRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub route_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::array")]
    pub schedules: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduleRecord {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub expected_countdown: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub schedule_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub route_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub recorded_time: Option<String>,
}

mod lenient {
    use super::*;

    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|value| match value {
            Value::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && float.is_finite())
                    .map(|float| float as i64)
            }),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }))
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .and_then(|value| match value {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => text.trim().parse().ok(),
                _ => None,
            })
            .filter(|float| float.is_finite()))
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|value| match value {
            Value::String(text) => Some(text),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }))
    }

    pub fn array<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Value>>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|value| match value {
            Value::Array(items) => Some(items),
            _ => None,
        }))
    }
}
