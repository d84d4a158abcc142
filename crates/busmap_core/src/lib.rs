pub mod feed;
pub mod geo;
pub mod geometry;
pub mod ingest;
pub mod network;
pub mod notice;
pub mod parsers;
pub mod source;
pub mod status;

pub use feed::{FeedError, FeedKind, StaticFeedDir};
pub use geometry::Rectangle;
pub use ingest::{ingest, load_static_feeds, FeedRequest, IngestError, IngestOutcome};
pub use network::{
    Route, RoutePattern, RouteRegistry, SelectionError, SharedNetwork, Stop, StopRegistry,
    TransitNetwork, DEFAULT_SEARCH_RADIUS_METERS, PLACEHOLDER_STOP_LOCATION,
};
pub use notice::{FeedNotice, NoticeContainer, NoticeSeverity};
pub use source::{FeedSource, FileSource, SourceError, StringSource};
pub use status::FeedStatus;

pub use busmap_model::{Arrival, ArrivalStatus, Bus, LatLon, RouteNo, StopNo};
