//! Data model: facet trees, records, coverage ranges, exchange records

pub mod coverage;
pub mod exchange;
pub mod facet;
pub mod record;
pub mod search;

pub use coverage::CoverageRange;
pub use exchange::{ExchangeRecord, MonographMetadata, COVERAGE_DEPTH};
pub use facet::{Aggregations, BucketKey, Facet, FacetBucket};
pub use record::{InputRecord, RawRecord, RecordType};
pub use search::{Hit, HitHost, QuerySpec, SearchResponse};

/// The three facet trees consumed by the coverage engine for one serial
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationTriple {
    /// Volume buckets with nested issue buckets (counts only)
    pub issue_by_volume: Aggregations,
    /// Volume and issue buckets with nested host publication dates
    pub host_dates: Aggregations,
    /// Same shape over the record's own publication date
    pub fallback_dates: Aggregations,
}
