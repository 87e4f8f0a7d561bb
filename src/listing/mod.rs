pub mod aggregate;
pub mod grouping;
pub mod search;
pub mod timing;

pub use aggregate::{aggregate, partition, upcoming_counts, NameIndex, ShowBreakdown, ShowSummary};
pub use grouping::{group_by_location, Area, VenueSummary};
pub use search::{search, Named, SearchHit, SearchResults};
pub use timing::{classify, format_datetime, normalize_timestamp, DisplayStyle, Timing};
