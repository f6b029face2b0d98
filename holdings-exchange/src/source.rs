//! Record source: raw review documents to typed input records
//!
//! The document shape is checked once, on the first document. After that,
//! documents that cannot be planned are warned about and skipped.

use futures::{Stream, StreamExt};
use holdings_common::config::FieldCodes;
use std::sync::Arc;

use crate::error::{ExchangeError, ExchangeResult, SourceError};
use crate::model::record::missing_schema_fields;
use crate::model::{InputRecord, RawRecord};
use crate::report::ExchangeReport;

/// Decode a stream of raw review documents
///
/// Ends with a single error on a source failure or when the first document
/// lacks expected fields.
pub fn decode_records<S>(
    documents: S,
    fields: FieldCodes,
    report: Arc<ExchangeReport>,
) -> impl Stream<Item = ExchangeResult<InputRecord>> + Send
where
    S: Stream<Item = Result<RawRecord, SourceError>> + Send + 'static,
{
    async_stream::stream! {
        futures::pin_mut!(documents);
        let mut schema_checked = false;

        while let Some(document) = documents.next().await {
            let document = match document {
                Ok(document) => document,
                Err(e) => {
                    tracing::error!(error = %e, "Review service request failed");
                    yield Err(ExchangeError::from(e));
                    return;
                }
            };

            if !schema_checked {
                schema_checked = true;
                let missing = missing_schema_fields(&document, &fields);
                if !missing.is_empty() {
                    tracing::error!(missing = ?missing, "Unexpected review document shape");
                    yield Err(ExchangeError::Schema { missing });
                    return;
                }
            }

            report.record_seen();

            match InputRecord::from_raw(&document, &fields) {
                Ok(record) => yield Ok(record),
                Err(reason) => {
                    tracing::warn!(reason = %reason, "Skipping malformed review document");
                    report.record_malformed();
                }
            }
        }
    }
}
