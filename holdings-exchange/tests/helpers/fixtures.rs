//! Record and facet fixtures

use holdings_exchange::model::facet::{
    Facet, FacetBucket, HOST_DATE_FACET, ISSUE_FACET, VOLUME_FACET,
};
use holdings_exchange::model::{Aggregations, InputRecord, RecordType, SearchResponse};

pub fn serial_record(id: &str) -> InputRecord {
    let mut record = InputRecord::new(id, RecordType::Serial, &format!("id:{}", id));
    record.uri = Some(format!("ark:/67375/{}", id));
    record.title = Some(format!("Journal {}", id));
    record.issn = Some("0000-0000".to_string());
    record
}

pub fn monograph_record(id: &str) -> InputRecord {
    let mut record = InputRecord::new(id, RecordType::Monograph, &format!("id:{}", id));
    record.uri = Some(format!("ark:/67375/{}", id));
    record.title = Some(format!("Book {}", id));
    record.isbn = Some("978-0-00-000000-0".to_string());
    record
}

/// Volume buckets: (volume, count, [(issue, count)])
pub fn issue_by_volume(volumes: &[(i64, u64, &[(i64, u64)])]) -> Aggregations {
    let buckets = volumes
        .iter()
        .map(|(key, count, issues)| {
            FacetBucket::new(*key, *count).with_child(
                ISSUE_FACET,
                issues.iter().map(|(k, c)| FacetBucket::new(*k, *c)).collect(),
            )
        })
        .collect();
    let mut aggs = Aggregations::new();
    aggs.insert(VOLUME_FACET.to_string(), Facet::new(buckets));
    aggs
}

/// Host date buckets per volume: (volume, [dates])
pub fn host_dates(volumes: &[(i64, &[&str])]) -> Aggregations {
    let buckets = volumes
        .iter()
        .map(|(key, dates)| {
            FacetBucket::new(*key, dates.len() as u64).with_child(
                HOST_DATE_FACET,
                dates.iter().map(|d| FacetBucket::date(d, 1)).collect(),
            )
        })
        .collect();
    let mut aggs = Aggregations::new();
    aggs.insert(VOLUME_FACET.to_string(), Facet::new(buckets));
    aggs
}

pub fn response(total: u64, aggregations: Aggregations) -> SearchResponse {
    SearchResponse {
        total,
        hits: Vec::new(),
        aggregations,
    }
}

pub fn with_total(total: u64) -> SearchResponse {
    response(total, Aggregations::new())
}
