//! Input records decoded from review service documents

use crate::error::MalformedRecord;
use holdings_common::config::FieldCodes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Raw review service document: a flat key/value map
pub type RawRecord = Map<String, Value>;

/// Literal key of the record identifier
pub const ID_KEY: &str = "_id";
/// Literal key of the record URI (ark)
pub const URI_KEY: &str = "uri";

/// Publication type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Periodical with volumes and issues
    Serial,
    /// Single work (book-like)
    Monograph,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Serial => "serial",
            RecordType::Monograph => "monograph",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "serial" => Some(RecordType::Serial),
            "monograph" => Some(RecordType::Monograph),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bibliographic summary record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub id: String,
    pub uri: Option<String>,
    pub record_type: RecordType,
    /// Stored search-query fragment
    pub query: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub title: Option<String>,
    pub contributor: Option<String>,
    pub corpus: Option<String>,
    pub issn: Option<String>,
    pub e_issn: Option<String>,
    pub isbn: Option<String>,
    pub e_isbn: Option<String>,
    pub publisher: Option<String>,
    pub title_id: Option<String>,
    pub preceded_by: Option<String>,
    pub followed_by: Option<String>,
    pub rights: Option<String>,
    pub parent_publication_title_id: Option<String>,
}

impl InputRecord {
    /// Minimal record, mostly for tests and fixtures
    pub fn new(id: &str, record_type: RecordType, query: &str) -> Self {
        Self {
            id: id.to_string(),
            uri: None,
            record_type,
            query: query.to_string(),
            start_date: None,
            end_date: None,
            title: None,
            contributor: None,
            corpus: None,
            issn: None,
            e_issn: None,
            isbn: None,
            e_isbn: None,
            publisher: None,
            title_id: None,
            preceded_by: None,
            followed_by: None,
            rights: None,
            parent_publication_title_id: None,
        }
    }

    pub fn is_serial(&self) -> bool {
        self.record_type == RecordType::Serial
    }

    pub fn is_monograph(&self) -> bool {
        self.record_type == RecordType::Monograph
    }

    /// Decode a review service document
    ///
    /// The identifier and the search query are mandatory, and the type must
    /// be `serial` or `monograph`. Every other field is optional.
    pub fn from_raw(raw: &RawRecord, codes: &FieldCodes) -> Result<Self, MalformedRecord> {
        let id = text(raw, ID_KEY).ok_or(MalformedRecord::MissingId)?;

        let query = text(raw, &codes.query).ok_or_else(|| MalformedRecord::MissingQuery {
            id: id.clone(),
        })?;

        let type_value = text(raw, &codes.record_type).unwrap_or_default();
        let record_type =
            RecordType::parse(&type_value).ok_or_else(|| MalformedRecord::UnknownType {
                id: id.clone(),
                value: type_value.clone(),
            })?;

        Ok(Self {
            id,
            uri: text(raw, URI_KEY),
            record_type,
            query,
            start_date: text(raw, &codes.start_date),
            end_date: text(raw, &codes.end_date),
            title: text(raw, &codes.title),
            contributor: text(raw, &codes.contributor),
            corpus: text(raw, &codes.corpus),
            issn: text(raw, &codes.issn),
            e_issn: text(raw, &codes.e_issn),
            isbn: text(raw, &codes.isbn),
            e_isbn: text(raw, &codes.e_isbn),
            publisher: text(raw, &codes.publisher),
            title_id: text(raw, &codes.title_id),
            preceded_by: text(raw, &codes.preceded_by),
            followed_by: text(raw, &codes.followed_by),
            rights: text(raw, &codes.rights),
            parent_publication_title_id: text(raw, &codes.parent_publication_title_id),
        })
    }
}

/// Check the document shape once, listing every missing expected field
///
/// Returns the missing fields as `name (code)` labels.
pub fn missing_schema_fields(raw: &RawRecord, codes: &FieldCodes) -> Vec<String> {
    let expected = [
        ("_id", ID_KEY),
        ("uri", URI_KEY),
        ("type", codes.record_type.as_str()),
        ("title", codes.title.as_str()),
    ];

    expected
        .iter()
        .filter(|(_, key)| !raw.contains_key(*key))
        .map(|(name, key)| {
            if name == key {
                name.to_string()
            } else {
                format!("{} ({})", name, key)
            }
        })
        .collect()
}

/// Non-empty textual value of a field; numbers are rendered as text
fn text(raw: &RawRecord, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
