//! Fan-out/join executor
//!
//! Issues the planned queries of each record concurrently, joins them into
//! named fields and drops records whose responses are unusable. At most
//! `parallel` records are in flight; records are pulled from the source only
//! as the output is polled. No retries.

mod joined;

pub use joined::{JoinedRecord, JoinedResponses};

use futures::{Stream, StreamExt};
use std::sync::Arc;

use crate::clients::{SearchApi, SearchError};
use crate::error::{DropReason, ExchangeError, ExchangeResult};
use crate::model::InputRecord;
use crate::planner::{self, QueryPlan};
use crate::report::ExchangeReport;

/// Default number of records in flight
pub const DEFAULT_PARALLEL: usize = 5;

/// Default number of consecutive transport failures before giving up
pub const DEFAULT_MAX_CONSECUTIVE_TRANSPORT_FAILURES: u32 = 10;

/// Result of one record's fan-out
enum Outcome {
    Joined(JoinedRecord),
    Dropped {
        id: String,
        reason: DropReason,
        transport: bool,
    },
    Fatal(ExchangeError),
}

#[derive(Clone)]
pub struct FanOutExecutor {
    search: Arc<dyn SearchApi>,
    report: Arc<ExchangeReport>,
    parallel: usize,
    max_consecutive_transport_failures: u32,
}

impl FanOutExecutor {
    pub fn new(
        search: Arc<dyn SearchApi>,
        report: Arc<ExchangeReport>,
        parallel: usize,
    ) -> ExchangeResult<Self> {
        if parallel == 0 {
            return Err(ExchangeError::InvalidConfig(
                "parallel must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            search,
            report,
            parallel,
            max_consecutive_transport_failures: DEFAULT_MAX_CONSECUTIVE_TRANSPORT_FAILURES,
        })
    }

    /// 0 disables the check
    pub fn with_max_consecutive_transport_failures(mut self, max: u32) -> Self {
        self.max_consecutive_transport_failures = max;
        self
    }

    pub fn parallel(&self) -> usize {
        self.parallel
    }

    /// Fan out every record of `records`
    ///
    /// Dropped records are logged once and counted in the report. The stream
    /// yields one error and ends on a source error, or once the search API
    /// has failed at transport level for too many consecutive records.
    pub fn process<S>(
        &self,
        records: S,
    ) -> impl Stream<Item = ExchangeResult<JoinedRecord>> + Send + 'static
    where
        S: Stream<Item = ExchangeResult<InputRecord>> + Send + 'static,
    {
        let executor = self.clone();
        let report = self.report.clone();
        let max_failures = self.max_consecutive_transport_failures;

        let outcomes = records
            .map(move |record| {
                let executor = executor.clone();
                async move {
                    match record {
                        Ok(record) => executor.fan_out(record).await,
                        Err(e) => Outcome::Fatal(e),
                    }
                }
            })
            .buffer_unordered(self.parallel);

        async_stream::stream! {
            futures::pin_mut!(outcomes);
            let mut consecutive_failures: u32 = 0;

            while let Some(outcome) = outcomes.next().await {
                match outcome {
                    Outcome::Joined(joined) => {
                        consecutive_failures = 0;
                        yield Ok(joined);
                    }
                    Outcome::Dropped { id, reason, transport } => {
                        tracing::warn!(record_id = %id, reason = %reason, "Dropping record");
                        report.record_dropped(&reason);

                        if !transport {
                            consecutive_failures = 0;
                            continue;
                        }

                        consecutive_failures += 1;
                        if max_failures > 0 && consecutive_failures >= max_failures {
                            let error = ExchangeError::BackendUnavailable {
                                failures: consecutive_failures,
                                last: reason.to_string(),
                            };
                            tracing::error!(error = %error, "Giving up on the search API");
                            yield Err(error);
                            return;
                        }
                    }
                    Outcome::Fatal(error) => {
                        yield Err(error);
                        return;
                    }
                }
            }
        }
    }

    async fn fan_out(&self, record: InputRecord) -> Outcome {
        let plan = planner::plan(&record);

        tracing::debug!(
            record_id = %record.id,
            record_type = %record.record_type,
            requests = plan.request_count(),
            "Fanning out record queries"
        );

        let responses = match self.scatter(plan).await {
            Ok(responses) => responses,
            Err(e) => {
                return Outcome::Dropped {
                    transport: e.is_transport(),
                    reason: DropReason::QueryFailed(e.to_string()),
                    id: record.id,
                }
            }
        };

        if let Err(reason) = responses.validate() {
            return Outcome::Dropped {
                id: record.id,
                reason,
                transport: false,
            };
        }

        Outcome::Joined(JoinedRecord { record, responses })
    }

    /// Run the planned queries together; the first failure cancels the rest
    async fn scatter(&self, plan: QueryPlan) -> Result<JoinedResponses, SearchError> {
        match plan {
            QueryPlan::Serial {
                primary,
                host_dates,
                fallback_dates,
            } => {
                let (primary, host_dates, fallback_dates) = futures::try_join!(
                    self.search.search(&primary),
                    self.search.search(&host_dates),
                    self.search.search(&fallback_dates),
                )?;
                Ok(JoinedResponses::Serial {
                    primary,
                    host_dates,
                    fallback_dates,
                })
            }
            QueryPlan::Monograph { primary } => {
                let primary = self.search.search(&primary).await?;
                Ok(JoinedResponses::Monograph { primary })
            }
        }
    }
}
