//! Exchange records through the KBART and XML holdings writers

mod helpers;

use futures::StreamExt;
use std::sync::Arc;

use helpers::*;
use holdings_common::config::XmlLinksConfig;
use holdings_exchange::assembler::RecordAssembler;
use holdings_exchange::executor::FanOutExecutor;
use holdings_exchange::model::{Aggregations, ExchangeRecord};
use holdings_exchange::output::{
    build_institutional_links, holdings_item, list_holdings_files, write_links_file,
    HoldingsChunker, HoldingsFileWriter, KbartWriter, KBART_COLUMNS,
};
use holdings_exchange::{ExchangeReport, Exchanger};

/// Two serials (one with two coverage ranges) and one monograph
async fn exchanged_records() -> Vec<ExchangeRecord> {
    let search = Arc::new(MockSearch::new());

    let mut split = serial_record("J1");
    split.title = Some("Revue \"Tab\"\tTest".to_string());
    search.serial(
        &split.query,
        response(
            8,
            issue_by_volume(&[(1, 4, &[(1, 4)]), (2, 0, &[]), (3, 4, &[(1, 4)])]),
        ),
        response(8, host_dates(&[(1, &["1990"]), (2, &[]), (3, &["1992"])])),
        response(8, Aggregations::new()),
    );

    let single = serial_record("J2");
    search.serial(
        &single.query,
        response(2, issue_by_volume(&[(1, 2, &[(1, 2)])])),
        response(2, host_dates(&[(1, &["2005"])])),
        response(2, Aggregations::new()),
    );

    let book = monograph_record("B1");
    search.monograph(&book.query, with_total(1));

    let report = Arc::new(ExchangeReport::default());
    let executor = FanOutExecutor::new(search, report.clone(), 1).unwrap();
    let exchanger = Exchanger::new(executor, RecordAssembler::new("https://view.istex.fr"), report);

    exchanger
        .exchange(futures::stream::iter(vec![Ok(split), Ok(single), Ok(book)]))
        .map(|record| record.unwrap())
        .collect()
        .await
}

#[tokio::test]
async fn test_kbart_rows_per_coverage_range() {
    let records = exchanged_records().await;
    assert_eq!(records.len(), 3);

    let mut writer = KbartWriter::new(Vec::new()).unwrap();
    for record in &records {
        writer.write_record(record).unwrap();
    }
    assert_eq!(writer.rows(), 4);
    let text = String::from_utf8(writer.finish().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], KBART_COLUMNS.join("\t"));
    assert!(lines[1].starts_with("\"Revue \"\"Tab\"\"\tTest\""));
    assert!(lines[1].contains("\t1990\t1\t1\t1990\t1\t1\t"));
    assert!(lines[2].contains("\t1992\t3\t1\t1992\t3\t1\t"));
    assert!(lines[3].starts_with("Journal J2\t"));
    assert!(lines[4].starts_with("Book B1\t"));
    assert!(lines
        .iter()
        .skip(1)
        .all(|line| line.split('\t').count() >= KBART_COLUMNS.len()));
}

#[tokio::test]
async fn test_xml_holdings_chunks_and_links() {
    let records = exchanged_records().await;
    let dir = tempfile::tempdir().unwrap();
    let holdings_dir = dir.path().join("google-scholar");

    let mut writer = HoldingsFileWriter::new(&holdings_dir, "istex", "RSL_FRANCE", "journals").unwrap();
    // Smallest limit: one item per document
    let mut chunker = HoldingsChunker::new(1, "http://example.org/institutional_holdings.dtd");
    for record in &records {
        if let Some(document) = chunker.push(&holdings_item(record)) {
            writer.write_document(&document).unwrap();
        }
    }
    if let Some(document) = chunker.finish() {
        writer.write_document(&document).unwrap();
    }
    assert_eq!(writer.written().len(), 3);

    let first = std::fs::read_to_string(&writer.written()[0]).unwrap();
    assert_eq!(first.matches("<item type=\"electronic\">").count(), 1);
    assert_eq!(first.matches("<coverage>").count(), 2);
    assert!(first.ends_with("</institutional_holdings>"));

    let book = std::fs::read_to_string(&writer.written()[2]).unwrap();
    assert!(book.contains("<title>Book B1</title>"));
    assert!(!book.contains("<coverage>"));

    let files = list_holdings_files(&holdings_dir).unwrap();
    assert_eq!(
        files,
        vec![
            "google-scholar/institutional_holdings_ISTEX_RSL_FRANCEJOURNALS-0.xml",
            "google-scholar/institutional_holdings_ISTEX_RSL_FRANCEJOURNALS-1.xml",
            "google-scholar/institutional_holdings_ISTEX_RSL_FRANCEJOURNALS-2.xml",
        ]
    );

    let links = build_institutional_links(&XmlLinksConfig::default(), &files).unwrap();
    let path = write_links_file(&holdings_dir, &links).unwrap();
    let written = std::fs::read_to_string(path).unwrap();
    assert_eq!(written.matches("<url>").count(), 3);

    // The links document itself is not a holdings file
    assert_eq!(list_holdings_files(&holdings_dir).unwrap().len(), 3);
}
