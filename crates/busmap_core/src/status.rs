use serde::Serialize;

use crate::FeedError;

/// Summary state of one feed ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Ok,
    /// Parsed with skipped records, or nothing usable; whatever parsed is committed.
    Incomplete,
    /// Rejected as a whole; nothing committed.
    Malformed,
    /// The source produced no payload.
    Unavailable,
}

impl FeedStatus {
    pub fn from_error(error: &FeedError) -> Self {
        match error {
            FeedError::Malformed { .. } => FeedStatus::Malformed,
            FeedError::Incomplete { .. } => FeedStatus::Incomplete,
        }
    }

    pub fn is_parsed_successfully(self) -> bool {
        matches!(self, FeedStatus::Ok)
    }

    /// True when at least part of the feed may have reached the network.
    pub fn has_committed_data(self) -> bool {
        matches!(self, FeedStatus::Ok | FeedStatus::Incomplete)
    }
}
