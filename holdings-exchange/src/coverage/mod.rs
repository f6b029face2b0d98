//! Coverage Inference Engine
//!
//! Reconstructs ordered, non-overlapping coverage ranges from sparse nested
//! count buckets (volume → issue → date). Pure and total: absent trees are
//! empty, and no input shape makes it fail.
//!
//! **Algorithm:** a two-state scan over the ascending volume buckets
//! (`SeekingStart` / `SeekingEnd`) with a nested ascending issue scan for
//! every *consistent* volume, i.e. one with at least one issue bucket whose
//! issue counts add up to the volume count. Inconsistent volumes only ever
//! contribute volume-granularity endpoints.
//!
//! | Condition | Policy |
//! |---|---|
//! | volume count > 0, no issue buckets | volume-granularity endpoint |
//! | Σ issue counts ≠ volume count | volume-granularity endpoint |
//! | first issue ≠ 1 while seeking an end | close at previous volume, restart on current |
//! | no volume facet, issue facet present | single range from first/last issue |
//! | no facet data at all | no range |

mod dates;

pub use dates::{DateLookup, DatePosition};

use crate::model::facet::{facet_buckets, Aggregations, FacetBucket, ISSUE_FACET, VOLUME_FACET};
use crate::model::{AggregationTriple, CoverageRange};

/// Facet selector producing volume → issue counts
pub const ISSUE_BY_VOLUME: &str = "host.volume[*-*:1]>host.issue[*-*:1]";

/// Facet selector producing volume/issue → host publication date
pub const HOST_PUBLICATION_DATE_BY_VOLUME_AND_ISSUE: &str =
    "host.volume[*-*:1]>host.publicationDate[*-*:1],host.issue[*-*:1]>host.publicationDate[*-*:1]";

/// Facet selector producing volume/issue → own publication date
pub const PUBLICATION_DATE_BY_VOLUME_AND_ISSUE: &str =
    "host.volume[*-*:1]>publicationDate[*-*:1],host.issue[*-*:1]>publicationDate[*-*:1]";

/// Infer coverage ranges for one serial
pub fn infer_coverage(
    issue_by_volume: &Aggregations,
    host_dates: &Aggregations,
    fallback_dates: &Aggregations,
) -> Vec<CoverageRange> {
    let volumes = facet_buckets(issue_by_volume, VOLUME_FACET);

    let host_issues = facet_buckets(host_dates, ISSUE_FACET);
    let issues = if host_issues.is_empty() {
        facet_buckets(fallback_dates, ISSUE_FACET)
    } else {
        host_issues
    };

    if volumes.is_empty() && issues.is_empty() {
        return Vec::new();
    }

    // Some corpora only report issue granularity
    if volumes.is_empty() {
        let dates = DateLookup::issues(host_dates, fallback_dates);
        return vec![issue_only_range(issues, &dates)];
    }

    VolumeScan::new(volumes, DateLookup::volumes(host_dates, fallback_dates)).run()
}

/// [`infer_coverage`] over the three trees of one serial
pub fn infer_from_triple(triple: &AggregationTriple) -> Vec<CoverageRange> {
    infer_coverage(
        &triple.issue_by_volume,
        &triple.host_dates,
        &triple.fallback_dates,
    )
}

fn issue_only_range(issues: &[FacetBucket], dates: &DateLookup<'_>) -> CoverageRange {
    CoverageRange {
        first_volume: None,
        first_issue: issues.first().map(|b| b.key.to_string()),
        first_date: dates.first(DatePosition::Earliest),
        last_volume: None,
        last_issue: issues.last().map(|b| b.key.to_string()),
        last_date: dates.last(DatePosition::Latest),
    }
}

/// Issue buckets add up to the volume count
fn is_consistent(volume: &FacetBucket) -> bool {
    let issues = volume.child_buckets(ISSUE_FACET);
    !issues.is_empty() && issues.iter().map(|i| i.doc_count).sum::<u64>() == volume.doc_count
}

fn starts_at_issue_one(volume: &FacetBucket) -> bool {
    volume
        .child_buckets(ISSUE_FACET)
        .first()
        .map(|issue| issue.key.is_one())
        .unwrap_or(false)
}

/// Latest valid point of an open range
#[derive(Debug, Clone)]
struct Endpoint {
    volume: String,
    issue: Option<String>,
    date: Option<String>,
}

#[derive(Debug)]
enum ScanState {
    SeekingStart,
    SeekingEnd {
        range: CoverageRange,
        last: Endpoint,
    },
}

struct VolumeScan<'a> {
    volumes: &'a [FacetBucket],
    dates: DateLookup<'a>,
    state: ScanState,
    ranges: Vec<CoverageRange>,
}

impl<'a> VolumeScan<'a> {
    fn new(volumes: &'a [FacetBucket], dates: DateLookup<'a>) -> Self {
        Self {
            volumes,
            dates,
            state: ScanState::SeekingStart,
            ranges: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<CoverageRange> {
        let mut index = 0;

        while index < self.volumes.len() {
            let volume = &self.volumes[index];

            match self.state {
                ScanState::SeekingStart => {
                    if volume.doc_count == 0 {
                        index += 1;
                        continue;
                    }
                    if is_consistent(volume) {
                        self.scan_issues(index);
                    } else {
                        self.open_at_volume(index);
                    }
                    index += 1;
                }
                ScanState::SeekingEnd { .. } => {
                    if volume.doc_count == 0 {
                        self.close();
                        index += 1;
                        continue;
                    }
                    if !is_consistent(volume) {
                        // Deferred: the next volume decides; the final close
                        // covers the last-volume case.
                        self.extend_to_volume(index);
                        index += 1;
                        continue;
                    }
                    if !starts_at_issue_one(volume) {
                        // Gap at the head of the volume: re-scan it as a start
                        self.close();
                        continue;
                    }
                    self.scan_issues(index);
                    index += 1;
                }
            }
        }

        if matches!(self.state, ScanState::SeekingEnd { .. }) {
            self.close();
        }

        self.ranges
    }

    /// Open a volume-granularity range (inconsistent volume)
    fn open_at_volume(&mut self, index: usize) {
        let volume = self.volumes[index].key.to_string();
        let range = CoverageRange {
            first_volume: Some(volume.clone()),
            first_issue: None,
            first_date: self.dates.at(index, DatePosition::Earliest),
            ..CoverageRange::default()
        };
        let last = Endpoint {
            volume,
            issue: None,
            date: self.dates.at(index, DatePosition::Latest),
        };
        self.state = ScanState::SeekingEnd { range, last };
    }

    fn extend_to_volume(&mut self, index: usize) {
        let endpoint = Endpoint {
            volume: self.volumes[index].key.to_string(),
            issue: None,
            date: self.dates.at(index, DatePosition::Latest),
        };
        self.extend(endpoint);
    }

    /// Ascending scan over the issues of a consistent volume
    fn scan_issues(&mut self, index: usize) {
        let volumes = self.volumes;
        let volume = &volumes[index];
        let issues = volume.child_buckets(ISSUE_FACET);

        for (issue_index, issue) in issues.iter().enumerate() {
            let at_volume_end = issue_index + 1 == issues.len();

            match self.state {
                ScanState::SeekingStart => {
                    if issue.doc_count > 0 {
                        let range = CoverageRange {
                            first_volume: Some(volume.key.to_string()),
                            first_issue: Some(issue.key.to_string()),
                            first_date: self.dates.at(index, DatePosition::Earliest),
                            ..CoverageRange::default()
                        };
                        let last = self.issue_endpoint(index, issue, at_volume_end);
                        self.state = ScanState::SeekingEnd { range, last };
                    }
                }
                ScanState::SeekingEnd { .. } => {
                    if issue.doc_count > 0 {
                        let endpoint = self.issue_endpoint(index, issue, at_volume_end);
                        self.extend(endpoint);
                    } else {
                        self.close();
                    }
                }
            }
        }
    }

    /// Inner issues carry the volume's earliest date, the final issue its latest
    fn issue_endpoint(&self, index: usize, issue: &FacetBucket, at_volume_end: bool) -> Endpoint {
        let position = if at_volume_end {
            DatePosition::Latest
        } else {
            DatePosition::Earliest
        };
        Endpoint {
            volume: self.volumes[index].key.to_string(),
            issue: Some(issue.key.to_string()),
            date: self.dates.at(index, position),
        }
    }

    fn extend(&mut self, endpoint: Endpoint) {
        match &mut self.state {
            ScanState::SeekingEnd { last, .. } => *last = endpoint,
            ScanState::SeekingStart => debug_assert!(false, "extending a range that is not open"),
        }
    }

    /// Close the open range at its latest valid endpoint
    fn close(&mut self) {
        match std::mem::replace(&mut self.state, ScanState::SeekingStart) {
            ScanState::SeekingEnd { mut range, last } => {
                range.last_volume = Some(last.volume);
                range.last_issue = last.issue;
                range.last_date = last.date;
                self.ranges.push(range);
            }
            ScanState::SeekingStart => debug_assert!(false, "closing a range that is not open"),
        }
    }
}
