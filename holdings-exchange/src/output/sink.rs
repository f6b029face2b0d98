//! Drive the blocking writers from the exchange stream
//!
//! Files are written on tokio's blocking pool; the async side only forwards
//! records (or finished holdings documents) through a bounded channel.

use futures::{Stream, StreamExt};
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio::task::JoinError;

use super::{holdings_item, HoldingsChunker, HoldingsFileWriter, KbartWriter};
use crate::error::ExchangeResult;
use crate::model::ExchangeRecord;

/// Records or documents buffered between the exchange stream and the writer
pub const WRITE_QUEUE: usize = 64;

/// Write every exchanged record as KBART rows, returning the row count
///
/// `open` creates the sink on the blocking pool. An exchange error stops the
/// run after the rows written so far have been flushed.
pub async fn write_kbart<S, W, F>(records: S, open: F) -> ExchangeResult<usize>
where
    S: Stream<Item = ExchangeResult<ExchangeRecord>>,
    W: Write,
    F: FnOnce() -> io::Result<W> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<ExchangeRecord>(WRITE_QUEUE);

    let writer_task = tokio::task::spawn_blocking(move || -> io::Result<usize> {
        let mut writer = KbartWriter::new(open()?)?;
        while let Some(record) = rx.blocking_recv() {
            writer.write_record(&record)?;
        }
        let rows = writer.rows();
        writer.finish()?;
        Ok(rows)
    });

    let forwarded = forward(records, &tx, Some).await;
    drop(tx);

    let rows = joined(writer_task.await)??;
    forwarded?;
    Ok(rows)
}

/// Write the exchanged records as chunked XML holdings files, returning the file count
pub async fn write_xml_holdings<S>(
    records: S,
    mut chunker: HoldingsChunker,
    mut writer: HoldingsFileWriter,
) -> ExchangeResult<usize>
where
    S: Stream<Item = ExchangeResult<ExchangeRecord>>,
{
    let (tx, mut rx) = mpsc::channel::<String>(WRITE_QUEUE);

    let writer_task = tokio::task::spawn_blocking(move || -> io::Result<usize> {
        while let Some(document) = rx.blocking_recv() {
            writer.write_document(&document)?;
        }
        Ok(writer.written().len())
    });

    let forwarded = forward(records, &tx, |record| {
        chunker.push(&holdings_item(&record))
    })
    .await;
    if forwarded.is_ok() {
        if let Some(document) = chunker.finish() {
            // A closed channel means the writer failed; its error is returned below
            let _ = tx.send(document).await;
        }
    }
    drop(tx);

    let files = joined(writer_task.await)??;
    forwarded?;
    Ok(files)
}

/// Send what `convert` makes of each record; stops early once the writer is gone
async fn forward<S, T>(
    records: S,
    tx: &mpsc::Sender<T>,
    mut convert: impl FnMut(ExchangeRecord) -> Option<T>,
) -> ExchangeResult<()>
where
    S: Stream<Item = ExchangeResult<ExchangeRecord>>,
{
    futures::pin_mut!(records);
    while let Some(record) = records.next().await {
        if let Some(item) = convert(record?) {
            if tx.send(item).await.is_err() {
                break;
            }
        }
    }
    Ok(())
}

fn joined<T>(result: Result<io::Result<T>, JoinError>) -> io::Result<io::Result<T>> {
    result.map_err(|e| io::Error::new(io::ErrorKind::Other, format!("writer task failed: {}", e)))
}
