//! Exchange records handed to the serializers

use super::coverage::CoverageRange;
use super::record::RecordType;
use serde::{Deserialize, Serialize};

/// Coverage depth reported for every title
pub const COVERAGE_DEPTH: &str = "fulltext";

/// Monograph-only metadata derived from the primary search response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonographMetadata {
    pub monograph_volume: Option<i64>,
    pub date_published_print: Option<String>,
    pub date_published_online: Option<String>,
}

/// Bibliographic projection of one surviving record plus its coverage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub coverages: Vec<CoverageRange>,
    pub publication_title: Option<String>,
    pub publication_type: RecordType,
    pub coverage_depth: String,
    pub print_identifier: Option<String>,
    pub online_identifier: Option<String>,
    pub title_url: String,
    pub first_author: Option<String>,
    pub title_id: Option<String>,
    pub notes: String,
    pub parent_publication_title_id: Option<String>,
    pub preceding_publication_title_id: Option<String>,
    pub access_type: Option<String>,
    pub publisher_name: Option<String>,
    pub monograph: MonographMetadata,
    /// Print ISSN (serial) used by XML holdings
    pub issn: Option<String>,
    /// Print ISBN (monograph) used by XML holdings
    pub isbn: Option<String>,
}
