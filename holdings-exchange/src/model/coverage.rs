//! Coverage ranges

use serde::{Deserialize, Serialize};

/// A contiguous span of volumes/issues/dates with known full text
///
/// Ranges produced for one title are in ascending volume order and never
/// overlap. `first_date` is required by XML holdings consumers only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRange {
    pub first_volume: Option<String>,
    pub first_issue: Option<String>,
    pub first_date: Option<String>,
    pub last_volume: Option<String>,
    pub last_issue: Option<String>,
    pub last_date: Option<String>,
}

impl CoverageRange {
    /// Whether any closing field is set
    pub fn has_end(&self) -> bool {
        self.last_volume.is_some() || self.last_issue.is_some() || self.last_date.is_some()
    }
}
