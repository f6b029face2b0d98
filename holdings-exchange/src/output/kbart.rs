//! KBART (tab separated) serialization
//!
//! One row per coverage range, or a single row with empty coverage columns
//! when a record has none. `None` renders as an empty field.

use std::io::{self, Write};

use crate::model::{CoverageRange, ExchangeRecord};

pub const KBART_COLUMNS: [&str; 25] = [
    "publication_title",
    "print_identifier",
    "online_identifier",
    "date_first_issue_online",
    "num_first_vol_online",
    "num_first_issue_online",
    "date_last_issue_online",
    "num_last_vol_online",
    "num_last_issue_online",
    "title_url",
    "first_author",
    "title_id",
    "embargo_info",
    "coverage_depth",
    "notes",
    "publisher_name",
    "publication_type",
    "date_monograph_published_print",
    "date_monograph_published_online",
    "monograph_volume",
    "monograph_edition",
    "first_editor",
    "parent_publication_title_id",
    "preceding_publication_title_id",
    "access_type",
];

const DELIMITER: char = '\t';

pub fn header_line() -> String {
    let mut line = KBART_COLUMNS.join("\t");
    line.push('\n');
    line
}

/// Rows of one record, each terminated by a newline
pub fn record_lines(record: &ExchangeRecord) -> Vec<String> {
    if record.coverages.is_empty() {
        return vec![line(record, &CoverageRange::default())];
    }

    record
        .coverages
        .iter()
        .map(|coverage| line(record, coverage))
        .collect()
}

fn line(record: &ExchangeRecord, coverage: &CoverageRange) -> String {
    let monograph_volume = record.monograph.monograph_volume.map(|v| v.to_string());

    let fields: [Option<&str>; 25] = [
        record.publication_title.as_deref(),
        record.print_identifier.as_deref(),
        record.online_identifier.as_deref(),
        coverage.first_date.as_deref(),
        coverage.first_volume.as_deref(),
        coverage.first_issue.as_deref(),
        coverage.last_date.as_deref(),
        coverage.last_volume.as_deref(),
        coverage.last_issue.as_deref(),
        Some(record.title_url.as_str()),
        record.first_author.as_deref(),
        record.title_id.as_deref(),
        None,
        Some(record.coverage_depth.as_str()),
        Some(record.notes.as_str()),
        record.publisher_name.as_deref(),
        Some(record.publication_type.as_str()),
        record.monograph.date_published_print.as_deref(),
        record.monograph.date_published_online.as_deref(),
        monograph_volume.as_deref(),
        None,
        None,
        record.parent_publication_title_id.as_deref(),
        record.preceding_publication_title_id.as_deref(),
        record.access_type.as_deref(),
    ];

    let mut line = fields
        .iter()
        .map(|field| quote(field.unwrap_or("")))
        .collect::<Vec<_>>()
        .join("\t");
    line.push('\n');
    line
}

/// Quote fields holding the delimiter, a quote or a line break
fn quote(field: &str) -> String {
    if field.contains(&[DELIMITER, '"', '\r', '\n'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Streams KBART rows to any writer, header first
pub struct KbartWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> KbartWriter<W> {
    pub fn new(mut inner: W) -> io::Result<Self> {
        inner.write_all(header_line().as_bytes())?;
        Ok(Self { inner, rows: 0 })
    }

    /// Write the rows of one record, returning how many were written
    pub fn write_record(&mut self, record: &ExchangeRecord) -> io::Result<usize> {
        let lines = record_lines(record);
        for line in &lines {
            self.inner.write_all(line.as_bytes())?;
        }
        self.rows += lines.len();
        Ok(lines.len())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::RecordAssembler;
    use crate::model::{InputRecord, MonographMetadata, RecordType};

    fn serial(coverages: Vec<CoverageRange>) -> ExchangeRecord {
        let mut record = InputRecord::new("s1", RecordType::Serial, "q");
        record.title = Some("Journal".to_string());
        record.uri = Some("ark:/1".to_string());
        RecordAssembler::new("https://data.example.org").assemble(
            &record,
            coverages,
            MonographMetadata::default(),
        )
    }

    fn coverage(first: &str, last: &str) -> CoverageRange {
        CoverageRange {
            first_volume: Some(first.to_string()),
            first_issue: Some("1".to_string()),
            first_date: Some("1990".to_string()),
            last_volume: Some(last.to_string()),
            last_issue: Some("4".to_string()),
            last_date: Some("1995".to_string()),
        }
    }

    fn columns(line: &str) -> Vec<&str> {
        line.trim_end_matches('\n').split('\t').collect()
    }

    #[test]
    fn test_header_has_all_columns() {
        let header = header_line();
        assert_eq!(columns(&header).len(), 25);
        assert!(header.starts_with("publication_title\tprint_identifier"));
        assert!(header.contains("date_monograph_published_online"));
    }

    #[test]
    fn test_one_row_per_range() {
        let record = serial(vec![coverage("1", "3"), coverage("5", "9")]);
        let lines = record_lines(&record);
        assert_eq!(lines.len(), 2);

        let first = columns(&lines[0]);
        assert_eq!(first[0], "Journal");
        assert_eq!(first[3], "1990");
        assert_eq!(first[4], "1");
        assert_eq!(first[7], "3");
        assert_eq!(columns(&lines[1])[4], "5");
        assert_eq!(first[9], "https://data.example.org/ark:/1");
        assert_eq!(first[13], "fulltext");
        assert_eq!(first[16], "serial");
    }

    #[test]
    fn test_single_row_without_coverage() {
        let lines = record_lines(&serial(vec![]));
        assert_eq!(lines.len(), 1);
        let fields = columns(&lines[0]);
        assert_eq!(fields.len(), 25);
        assert!(fields[3..9].iter().all(|f| f.is_empty()));
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a\tb"), "\"a\tb\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_writer_counts_rows() {
        let mut writer = KbartWriter::new(Vec::new()).unwrap();
        writer.write_record(&serial(vec![coverage("1", "2")])).unwrap();
        writer.write_record(&serial(vec![])).unwrap();
        assert_eq!(writer.rows(), 2);

        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(output.lines().count(), 3);
    }
}
