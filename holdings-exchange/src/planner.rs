//! Query planning: which search requests one record needs
//!
//! A serial needs three requests whose totals must agree (one per facet
//! tree); a monograph needs only the primary one.

use crate::coverage::{
    HOST_PUBLICATION_DATE_BY_VOLUME_AND_ISSUE, ISSUE_BY_VOLUME, PUBLICATION_DATE_BY_VOLUME_AND_ISSUE,
};
use crate::model::{InputRecord, QuerySpec, RecordType};

/// Hit fields needed by the assembler and the monograph resolver
pub const PRIMARY_OUTPUT_FIELDS: &str = "host,publicationDate,author";

const DATE_CLAUSE: &str = "publicationDate:";

/// Planned requests of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    Serial {
        primary: QuerySpec,
        host_dates: QuerySpec,
        fallback_dates: QuerySpec,
    },
    Monograph {
        primary: QuerySpec,
    },
}

impl QueryPlan {
    /// Number of requests in the plan
    pub fn request_count(&self) -> usize {
        match self {
            QueryPlan::Serial { .. } => 3,
            QueryPlan::Monograph { .. } => 1,
        }
    }

    pub fn primary(&self) -> &QuerySpec {
        match self {
            QueryPlan::Serial { primary, .. } | QueryPlan::Monograph { primary } => primary,
        }
    }
}

/// Record query restricted to its publication date window
///
/// Left untouched when the stored query already filters on the document's
/// own date; a `host.publicationDate:` clause does not count.
pub fn derive_query(record: &InputRecord) -> String {
    if filters_on_date(&record.query) {
        return record.query.clone();
    }

    format!(
        "{} AND {}[{} TO {}]",
        record.query,
        DATE_CLAUSE,
        record.start_date.as_deref().unwrap_or("*"),
        record.end_date.as_deref().unwrap_or("*"),
    )
}

/// `publicationDate:` as a whole field name, not the tail of a dotted path
fn filters_on_date(query: &str) -> bool {
    query.match_indices(DATE_CLAUSE).any(|(at, _)| {
        query[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '.' || c == '_'))
    })
}

pub fn plan(record: &InputRecord) -> QueryPlan {
    let query = derive_query(record);
    let primary = QuerySpec {
        query: query.clone(),
        size: 1,
        output_fields: Some(PRIMARY_OUTPUT_FIELDS.to_string()),
        facet: ISSUE_BY_VOLUME.to_string(),
    };

    match record.record_type {
        RecordType::Monograph => QueryPlan::Monograph { primary },
        RecordType::Serial => QueryPlan::Serial {
            primary,
            host_dates: aggregation_only(&query, HOST_PUBLICATION_DATE_BY_VOLUME_AND_ISSUE),
            fallback_dates: aggregation_only(&query, PUBLICATION_DATE_BY_VOLUME_AND_ISSUE),
        },
    }
}

fn aggregation_only(query: &str, facet: &str) -> QuerySpec {
    QuerySpec {
        query: query.to_string(),
        size: 0,
        output_fields: None,
        facet: facet.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_filter_appended() {
        let mut record = InputRecord::new("1", RecordType::Serial, "host.issn:\"0001-0001\"");
        record.start_date = Some("1990".to_string());
        assert_eq!(
            derive_query(&record),
            "host.issn:\"0001-0001\" AND publicationDate:[1990 TO *]"
        );
    }

    #[test]
    fn test_open_window_uses_wildcards() {
        let record = InputRecord::new("1", RecordType::Serial, "q");
        assert_eq!(derive_query(&record), "q AND publicationDate:[* TO *]");
    }

    #[test]
    fn test_existing_date_clause_kept() {
        let mut record = InputRecord::new("1", RecordType::Serial, "q AND publicationDate:[2000 TO 2001]");
        record.start_date = Some("1990".to_string());
        assert_eq!(derive_query(&record), "q AND publicationDate:[2000 TO 2001]");
    }

    #[test]
    fn test_host_date_clause_does_not_suppress_window() {
        let mut record = InputRecord::new(
            "1",
            RecordType::Serial,
            "host.issn:\"0001-0001\" AND host.publicationDate:[1990 TO 2000]",
        );
        record.end_date = Some("1995".to_string());
        assert_eq!(
            derive_query(&record),
            "host.issn:\"0001-0001\" AND host.publicationDate:[1990 TO 2000] AND publicationDate:[* TO 1995]"
        );
    }

    #[test]
    fn test_date_clause_recognised_after_delimiters() {
        assert!(filters_on_date("publicationDate:[1990 TO *]"));
        assert!(filters_on_date("(publicationDate:[1990 TO *])"));
        assert!(filters_on_date("q AND -publicationDate:1990"));
        assert!(!filters_on_date("host.publicationDate:1990"));
        assert!(!filters_on_date("firstpublicationDate:1990"));
        assert!(!filters_on_date("host_publicationDate:1990"));
    }

    #[test]
    fn test_serial_plan_has_three_requests() {
        let record = InputRecord::new("1", RecordType::Serial, "q");
        let plan = plan(&record);
        assert_eq!(plan.request_count(), 3);

        match plan {
            QueryPlan::Serial {
                primary,
                host_dates,
                fallback_dates,
            } => {
                assert_eq!(primary.size, 1);
                assert_eq!(primary.facet, ISSUE_BY_VOLUME);
                assert_eq!(host_dates.size, 0);
                assert!(host_dates.output_fields.is_none());
                assert_eq!(host_dates.facet, HOST_PUBLICATION_DATE_BY_VOLUME_AND_ISSUE);
                assert_eq!(fallback_dates.facet, PUBLICATION_DATE_BY_VOLUME_AND_ISSUE);
                assert_eq!(primary.query, fallback_dates.query);
            }
            QueryPlan::Monograph { .. } => panic!("expected a serial plan"),
        }
    }

    #[test]
    fn test_monograph_plan_is_primary_only() {
        let record = InputRecord::new("1", RecordType::Monograph, "q");
        let plan = plan(&record);
        assert_eq!(plan.request_count(), 1);
        assert_eq!(plan.primary().output_fields.as_deref(), Some(PRIMARY_OUTPUT_FIELDS));
    }
}
