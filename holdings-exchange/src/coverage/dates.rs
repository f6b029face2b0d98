//! Date resolution for coverage endpoints
//!
//! Dates live in two parallel trees: the host tree (first-party publication
//! date) and the fallback tree (the document's own publication date). Both
//! are correlated with the volume/issue scan by position. Sources are
//! consulted in priority order and the first present value wins.

use crate::model::facet::{
    facet_buckets, Aggregations, FacetBucket, DATE_FACET, HOST_DATE_FACET, ISSUE_FACET,
    VOLUME_FACET,
};

/// Which end of a chronological date facet to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePosition {
    Earliest,
    Latest,
}

/// One tree of per-volume (or per-issue) date buckets
#[derive(Debug, Clone, Copy)]
struct DateSource<'a> {
    buckets: &'a [FacetBucket],
    date_facet: &'static str,
}

impl<'a> DateSource<'a> {
    fn date_of(&self, bucket: &FacetBucket, position: DatePosition) -> Option<String> {
        let dates = bucket.child_buckets(self.date_facet);
        let date = match position {
            DatePosition::Earliest => dates.first(),
            DatePosition::Latest => dates.last(),
        }?;
        Some(date.key_text())
    }

    fn at(&self, index: usize, position: DatePosition) -> Option<String> {
        self.date_of(self.buckets.get(index)?, position)
    }

    fn first(&self, position: DatePosition) -> Option<String> {
        self.date_of(self.buckets.first()?, position)
    }

    fn last(&self, position: DatePosition) -> Option<String> {
        self.date_of(self.buckets.last()?, position)
    }
}

/// Ordered lookup over the host tree, then the fallback tree
#[derive(Debug, Clone)]
pub struct DateLookup<'a> {
    sources: [DateSource<'a>; 2],
}

impl<'a> DateLookup<'a> {
    /// Per-volume dates
    pub fn volumes(host: &'a Aggregations, fallback: &'a Aggregations) -> Self {
        Self::over(VOLUME_FACET, host, fallback)
    }

    /// Per-issue dates
    pub fn issues(host: &'a Aggregations, fallback: &'a Aggregations) -> Self {
        Self::over(ISSUE_FACET, host, fallback)
    }

    fn over(facet: &str, host: &'a Aggregations, fallback: &'a Aggregations) -> Self {
        Self {
            sources: [
                DateSource {
                    buckets: facet_buckets(host, facet),
                    date_facet: HOST_DATE_FACET,
                },
                DateSource {
                    buckets: facet_buckets(fallback, facet),
                    date_facet: DATE_FACET,
                },
            ],
        }
    }

    /// Date of the bucket at `index`
    pub fn at(&self, index: usize, position: DatePosition) -> Option<String> {
        self.sources.iter().find_map(|s| s.at(index, position))
    }

    /// Date of each source's first bucket
    pub fn first(&self, position: DatePosition) -> Option<String> {
        self.sources.iter().find_map(|s| s.first(position))
    }

    /// Date of each source's last bucket
    pub fn last(&self, position: DatePosition) -> Option<String> {
        self.sources.iter().find_map(|s| s.last(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::facet::Facet;

    fn dates_by_volume(date_facet: &str, per_volume: &[&[&str]]) -> Aggregations {
        let buckets = per_volume
            .iter()
            .enumerate()
            .map(|(i, dates)| {
                FacetBucket::new(i as i64 + 1, 1).with_child(
                    date_facet,
                    dates.iter().map(|d| FacetBucket::date(d, 1)).collect(),
                )
            })
            .collect();
        let mut aggs = Aggregations::new();
        aggs.insert(VOLUME_FACET.to_string(), Facet::new(buckets));
        aggs
    }

    #[test]
    fn test_host_date_preferred() {
        let host = dates_by_volume(HOST_DATE_FACET, &[&["1990", "1991"]]);
        let fallback = dates_by_volume(DATE_FACET, &[&["1980", "1981"]]);
        let lookup = DateLookup::volumes(&host, &fallback);

        assert_eq!(lookup.at(0, DatePosition::Earliest).as_deref(), Some("1990"));
        assert_eq!(lookup.at(0, DatePosition::Latest).as_deref(), Some("1991"));
    }

    #[test]
    fn test_fallback_used_when_host_bucket_has_no_dates() {
        let host = dates_by_volume(HOST_DATE_FACET, &[&[], &["2001"]]);
        let fallback = dates_by_volume(DATE_FACET, &[&["1999"], &["2000"]]);
        let lookup = DateLookup::volumes(&host, &fallback);

        assert_eq!(lookup.at(0, DatePosition::Earliest).as_deref(), Some("1999"));
        assert_eq!(lookup.at(1, DatePosition::Earliest).as_deref(), Some("2001"));
    }

    #[test]
    fn test_absent_everywhere_is_none() {
        let empty = Aggregations::new();
        let lookup = DateLookup::volumes(&empty, &empty);
        assert!(lookup.at(0, DatePosition::Latest).is_none());
        assert!(lookup.first(DatePosition::Earliest).is_none());
    }
}
