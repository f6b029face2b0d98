//! Exchange pipeline: joined search results to exchange records

use futures::{Stream, StreamExt};
use holdings_common::config::TomlConfig;
use std::sync::Arc;
use std::time::Instant;

use crate::assembler::RecordAssembler;
use crate::clients::SearchApi;
use crate::coverage::infer_from_triple;
use crate::error::ExchangeResult;
use crate::executor::{FanOutExecutor, JoinedRecord, JoinedResponses};
use crate::model::{AggregationTriple, ExchangeRecord, InputRecord, MonographMetadata};
use crate::monograph;
use crate::report::ExchangeReport;

/// Runs executor, coverage engine / monograph resolver and assembler as one stream
#[derive(Clone)]
pub struct Exchanger {
    executor: FanOutExecutor,
    assembler: RecordAssembler,
    report: Arc<ExchangeReport>,
}

impl Exchanger {
    pub fn new(
        executor: FanOutExecutor,
        assembler: RecordAssembler,
        report: Arc<ExchangeReport>,
    ) -> Self {
        Self {
            executor,
            assembler,
            report,
        }
    }

    pub fn from_config(
        config: &TomlConfig,
        search: Arc<dyn SearchApi>,
        report: Arc<ExchangeReport>,
    ) -> ExchangeResult<Self> {
        let executor = FanOutExecutor::new(search, report.clone(), config.app.parallel)?
            .with_max_consecutive_transport_failures(config.app.max_consecutive_transport_failures);
        let assembler = RecordAssembler::new(&config.review.url);
        Ok(Self::new(executor, assembler, report))
    }

    pub fn report(&self) -> &Arc<ExchangeReport> {
        &self.report
    }

    /// Exchange records for every usable input record
    ///
    /// The report's end date is set once the stream is exhausted.
    pub fn exchange<S>(
        &self,
        records: S,
    ) -> impl Stream<Item = ExchangeResult<ExchangeRecord>> + Send + 'static
    where
        S: Stream<Item = ExchangeResult<InputRecord>> + Send + 'static,
    {
        let joined = self.executor.process(records);
        let assembler = self.assembler.clone();
        let report = self.report.clone();

        async_stream::stream! {
            futures::pin_mut!(joined);

            while let Some(item) = joined.next().await {
                match item {
                    Ok(joined) => {
                        let exchange = build(joined, &assembler, &report);
                        report.record_emitted();
                        yield Ok(exchange);
                    }
                    Err(e) => {
                        report.finish();
                        yield Err(e);
                        return;
                    }
                }
            }

            report.finish();
            tracing::info!(summary = %report.snapshot(), "Exchange completed");
        }
    }
}

fn build(joined: JoinedRecord, assembler: &RecordAssembler, report: &ExchangeReport) -> ExchangeRecord {
    let JoinedRecord { record, responses } = joined;

    match responses {
        JoinedResponses::Serial {
            primary,
            host_dates,
            fallback_dates,
        } => {
            let triple = AggregationTriple {
                issue_by_volume: primary.aggregations,
                host_dates: host_dates.aggregations,
                fallback_dates: fallback_dates.aggregations,
            };

            let started = Instant::now();
            let coverages = infer_from_triple(&triple);
            report.record_coverage_run(started.elapsed());

            tracing::debug!(record_id = %record.id, ranges = coverages.len(), "Coverage inferred");
            assembler.assemble(&record, coverages, MonographMetadata::default())
        }
        JoinedResponses::Monograph { primary } => {
            let metadata = monograph::resolve(&record, &primary);
            assembler.assemble(&record, Vec::new(), metadata)
        }
    }
}
