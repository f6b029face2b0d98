//! Joined per-record search results

use crate::error::DropReason;
use crate::model::{InputRecord, SearchResponse};

/// Responses of one record, in named positions
#[derive(Debug, Clone, PartialEq)]
pub enum JoinedResponses {
    Serial {
        /// Issue-by-volume aggregation plus the first hit
        primary: SearchResponse,
        host_dates: SearchResponse,
        fallback_dates: SearchResponse,
    },
    Monograph {
        primary: SearchResponse,
    },
}

impl JoinedResponses {
    pub fn primary(&self) -> &SearchResponse {
        match self {
            JoinedResponses::Serial { primary, .. } | JoinedResponses::Monograph { primary } => {
                primary
            }
        }
    }

    /// Reason to drop the record, if any
    pub fn validate(&self) -> Result<(), DropReason> {
        if self.primary().total == 0 {
            return Err(DropReason::NoResults);
        }

        match self {
            JoinedResponses::Serial {
                primary,
                host_dates,
                fallback_dates,
            } => {
                if primary.total != host_dates.total || primary.total != fallback_dates.total {
                    return Err(DropReason::TotalMismatch {
                        issue_by_volume: primary.total,
                        host_dates: host_dates.total,
                        fallback_dates: fallback_dates.total,
                    });
                }
            }
            JoinedResponses::Monograph { primary } => {
                if primary.total > 1 {
                    return Err(DropReason::AmbiguousMonograph {
                        total: primary.total,
                    });
                }
            }
        }

        Ok(())
    }
}

/// A record whose queries all succeeded and agree
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub record: InputRecord,
    pub responses: JoinedResponses,
}
