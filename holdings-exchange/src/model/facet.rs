//! Facet bucket model
//!
//! Typed view of the nested aggregation trees returned by the search API.
//! A bucket carries its own count and any number of nested facets, which the
//! API serialises as sibling JSON keys next to `key`/`docCount`:
//!
//! ```json
//! { "host.volume": { "keyCount": 1, "buckets": [
//!     { "key": "2", "docCount": 5,
//!       "host.issue": { "keyCount": 1, "buckets": [ { "key": "1", "docCount": 5 } ] } }
//! ] } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Volume facet name
pub const VOLUME_FACET: &str = "host.volume";
/// Issue facet name
pub const ISSUE_FACET: &str = "host.issue";
/// First-party (host) publication date facet name
pub const HOST_DATE_FACET: &str = "host.publicationDate";
/// Fallback publication date facet name
pub const DATE_FACET: &str = "publicationDate";

/// Top-level aggregations of one search response, keyed by facet name
pub type Aggregations = BTreeMap<String, Facet>;

/// Bucket key: volume number, issue number or date bucket key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketKey {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl BucketKey {
    /// Whether this key denotes the number one (`1`, `1.0` or `"1"`)
    pub fn is_one(&self) -> bool {
        match self {
            BucketKey::Integer(n) => *n == 1,
            BucketKey::Float(f) => *f == 1.0,
            BucketKey::Text(s) => s.trim().parse::<f64>().map(|f| f == 1.0).unwrap_or(false),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Integer(n) => write!(f, "{}", n),
            BucketKey::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{}", *x as i64),
            BucketKey::Float(x) => write!(f, "{}", x),
            BucketKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for BucketKey {
    fn from(value: i64) -> Self {
        BucketKey::Integer(value)
    }
}

impl From<&str> for BucketKey {
    fn from(value: &str) -> Self {
        BucketKey::Text(value.to_string())
    }
}

/// One named facet: an ordered list of sibling buckets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facet {
    #[serde(default)]
    pub buckets: Vec<FacetBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_count: Option<u64>,
}

impl Facet {
    pub fn new(buckets: Vec<FacetBucket>) -> Self {
        Self {
            key_count: Some(buckets.len() as u64),
            buckets,
        }
    }
}

/// A nested child value of a bucket: a facet, or any other scalar the API
/// attaches to range buckets (`from`, `to`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketChild {
    Facet(Facet),
    Other(serde_json::Value),
}

/// Recursive count node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetBucket {
    pub key: BucketKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_as_string: Option<String>,
    #[serde(default)]
    pub doc_count: u64,
    #[serde(flatten)]
    pub children: BTreeMap<String, BucketChild>,
}

impl FacetBucket {
    pub fn new(key: impl Into<BucketKey>, doc_count: u64) -> Self {
        Self {
            key: key.into(),
            key_as_string: None,
            doc_count,
            children: BTreeMap::new(),
        }
    }

    /// Date bucket, keyed by its textual representation
    pub fn date(key_as_string: &str, doc_count: u64) -> Self {
        Self {
            key: BucketKey::Text(key_as_string.to_string()),
            key_as_string: Some(key_as_string.to_string()),
            doc_count,
            children: BTreeMap::new(),
        }
    }

    /// Attach a nested facet
    pub fn with_child(mut self, name: &str, buckets: Vec<FacetBucket>) -> Self {
        self.children
            .insert(name.to_string(), BucketChild::Facet(Facet::new(buckets)));
        self
    }

    /// Nested facet by name
    pub fn child(&self, name: &str) -> Option<&Facet> {
        match self.children.get(name) {
            Some(BucketChild::Facet(facet)) => Some(facet),
            _ => None,
        }
    }

    /// Nested buckets by name, empty when the facet is absent
    pub fn child_buckets(&self, name: &str) -> &[FacetBucket] {
        self.child(name).map(|f| f.buckets.as_slice()).unwrap_or(&[])
    }

    /// Textual key: `keyAsString` when present, else the key itself
    pub fn key_text(&self) -> String {
        self.key_as_string
            .clone()
            .unwrap_or_else(|| self.key.to_string())
    }
}

/// Buckets of a top-level facet, empty when the facet is absent
pub fn facet_buckets<'a>(aggregations: &'a Aggregations, name: &str) -> &'a [FacetBucket] {
    aggregations
        .get(name)
        .map(|f| f.buckets.as_slice())
        .unwrap_or(&[])
}
