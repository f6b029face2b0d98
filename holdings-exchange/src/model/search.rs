//! Search API request and response shapes

use super::facet::Aggregations;
use serde::{Deserialize, Serialize};

/// One planned search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Search expression (`q`)
    pub query: String,
    /// Number of hits to return
    pub size: u32,
    /// Comma separated hit fields, `None` when no hit is needed
    pub output_fields: Option<String>,
    /// Facet selector expression
    pub facet: String,
}

/// Search API response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub hits: Vec<Hit>,
    #[serde(default)]
    pub aggregations: Aggregations,
}

impl SearchResponse {
    pub fn first_hit(&self) -> Option<&Hit> {
        self.hits.first()
    }
}

/// One document hit (only the fields requested by the planner)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit {
    #[serde(default)]
    pub host: Option<HitHost>,
    #[serde(default)]
    pub publication_date: Option<String>,
}

/// Host (serial or book) block of a hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitHost {
    /// Volume, reported either as text or as a number
    #[serde(default)]
    pub volume: Option<serde_json::Value>,
    #[serde(default)]
    pub publication_date: Option<String>,
}
