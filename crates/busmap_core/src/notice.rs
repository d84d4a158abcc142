use std::collections::BTreeMap;

use busmap_model::{LatLon, StopNo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::FeedKind;

pub const NOTICE_CODE_MISSING_REQUIRED_FIELD: &str = "missing_required_field";
pub const NOTICE_CODE_INCOMPLETE_PATTERN: &str = "incomplete_pattern";
pub const NOTICE_CODE_INCOMPLETE_SCHEDULE: &str = "incomplete_schedule";
pub const NOTICE_CODE_INCOMPLETE_ROUTE_ARRIVALS: &str = "incomplete_route_arrivals";
pub const NOTICE_CODE_INCOMPLETE_BUS_RECORD: &str = "incomplete_bus_record";
pub const NOTICE_CODE_UNROUTED_VEHICLE: &str = "unrouted_vehicle";
pub const NOTICE_CODE_COORDINATES_OUT_OF_RANGE: &str = "coordinates_out_of_range";
pub const NOTICE_CODE_MALFORMED_FEED: &str = "malformed_feed";
pub const NOTICE_CODE_FEED_UNAVAILABLE: &str = "feed_unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedNotice {
    pub code: String,
    pub severity: NoticeSeverity,
    pub message: String,
    pub feed: FeedKind,
    pub record_index: Option<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
}

impl FeedNotice {
    pub fn new(
        code: impl Into<String>,
        severity: NoticeSeverity,
        feed: FeedKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            feed,
            record_index: None,
            context: BTreeMap::new(),
        }
    }

    /// A stop or route record that was skipped because `field` was missing or unusable.
    pub fn missing_required_field(
        feed: FeedKind,
        record_index: usize,
        field: &str,
        subject: Option<(&str, String)>,
    ) -> Self {
        let mut notice = FeedNotice::new(
            NOTICE_CODE_MISSING_REQUIRED_FIELD,
            NoticeSeverity::Error,
            feed,
            format!("record is missing required field {}", field),
        )
        .at_record(record_index);
        notice.insert_context_field("fieldName", field);
        if let Some((key, value)) = subject {
            notice.insert_context_field(key, value);
        }
        notice
    }

    /// A stop whose location lies outside [-90, 90] x [-180, 180]. The stop is still stored.
    pub fn coordinates_out_of_range(
        feed: FeedKind,
        record_index: usize,
        stop: StopNo,
        location: LatLon,
    ) -> Self {
        FeedNotice::new(
            NOTICE_CODE_COORDINATES_OUT_OF_RANGE,
            NoticeSeverity::Warning,
            feed,
            format!("stop {} has out-of-range coordinates {}", stop, location),
        )
        .at_record(record_index)
        .with_context_field("stopNo", stop)
        .with_context_field("latitude", location.latitude)
        .with_context_field("longitude", location.longitude)
    }

    pub fn malformed_feed(feed: FeedKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut notice = FeedNotice::new(
            NOTICE_CODE_MALFORMED_FEED,
            NoticeSeverity::Error,
            feed,
            format!("{} feed is malformed", feed),
        );
        notice.insert_context_field("message", message);
        notice
    }

    pub fn feed_unavailable(
        feed: FeedKind,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut notice = FeedNotice::new(
            NOTICE_CODE_FEED_UNAVAILABLE,
            NoticeSeverity::Error,
            feed,
            format!("{} feed could not be fetched", feed),
        );
        notice.insert_context_field("source", source.into());
        notice.insert_context_field("message", message.into());
        notice
    }

    pub fn insert_context_field<V: Serialize>(&mut self, name: impl Into<String>, value: V) {
        let serialized = serde_json::to_value(value).unwrap_or(Value::Null);
        self.context.insert(name.into(), serialized);
    }

    pub fn with_context_field<V: Serialize>(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert_context_field(name, value);
        self
    }

    pub fn at_record(mut self, record_index: usize) -> Self {
        self.record_index = Some(record_index);
        self
    }
}

#[derive(Debug, Default, Clone)]
pub struct NoticeContainer {
    notices: Vec<FeedNotice>,
}

impl NoticeContainer {
    pub fn new() -> Self {
        Self {
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, notice: FeedNotice) {
        self.notices.push(notice);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedNotice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn count_with_code(&self, code: &str) -> usize {
        self.notices.iter().filter(|notice| notice.code == code).count()
    }

    pub fn into_vec(self) -> Vec<FeedNotice> {
        self.notices
    }
}
