//! Read-side segment analytics — paginated search over segments and
//! on-demand statistics computed from their member users.

pub mod enrich;
pub mod finder;
pub mod stats;

pub use enrich::SegmentEnrichment;
pub use finder::SegmentFinder;
pub use stats::SegmentStatsAggregator;
