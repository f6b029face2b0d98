//! Record assembler: one exchange record per surviving input record

use crate::model::{
    CoverageRange, ExchangeRecord, InputRecord, MonographMetadata, RecordType, COVERAGE_DEPTH,
};

/// Prefix of review values that link to another title
pub const SYNDICATION_PREFIX: &str = "/api/run/syndication-from/nC6e";

/// Length of an ISSN-shaped title identifier (`nnnn-nnnn`)
const TITLE_ID_LEN: usize = 9;

/// Builds exchange records against the public data URL
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    data_url: String,
}

impl RecordAssembler {
    pub fn new(data_url: &str) -> Self {
        Self {
            data_url: data_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn assemble(
        &self,
        record: &InputRecord,
        coverages: Vec<CoverageRange>,
        monograph: MonographMetadata,
    ) -> ExchangeRecord {
        let is_serial = record.record_type == RecordType::Serial;

        let title_url = match &record.uri {
            Some(uri) => format!("{}/{}", self.data_url, uri.trim_start_matches('/')),
            None => {
                tracing::warn!(record_id = %record.id, "Record has no uri, title_url left empty");
                String::new()
            }
        };

        ExchangeRecord {
            coverages,
            publication_title: record.title.clone(),
            publication_type: record.record_type,
            coverage_depth: COVERAGE_DEPTH.to_string(),
            print_identifier: if is_serial {
                record.issn.clone()
            } else {
                record.isbn.clone()
            },
            online_identifier: if is_serial {
                record.e_issn.clone()
            } else {
                record.e_isbn.clone()
            },
            title_url,
            first_author: if is_serial {
                None
            } else {
                record.contributor.clone()
            },
            title_id: record.title_id.clone(),
            notes: followed_by_note(record.followed_by.as_deref()),
            parent_publication_title_id: find_title_id(
                record.parent_publication_title_id.as_deref(),
            ),
            preceding_publication_title_id: find_title_id(record.preceded_by.as_deref()),
            access_type: record.rights.clone(),
            publisher_name: record.publisher.clone(),
            monograph,
            issn: record.issn.clone(),
            isbn: record.isbn.clone(),
        }
    }
}

/// Linked title identifier, only for syndication values
pub fn find_title_id(value: Option<&str>) -> Option<String> {
    let value = value?;
    if !value.starts_with(SYNDICATION_PREFIX) {
        return None;
    }

    let start = value.char_indices().rev().nth(TITLE_ID_LEN - 1)?.0;
    Some(value[start..].to_string())
}

pub fn followed_by_note(value: Option<&str>) -> String {
    find_title_id(value)
        .map(|id| format!("followed by: {}", id))
        .unwrap_or_default()
}
