//! Institutional holdings XML
//!
//! Items are serialized one by one, then wrapped into documents that stay
//! under a byte size limit so that each document fits one holdings file.

use super::{escape_xml, text_element};
use crate::model::{CoverageRange, ExchangeRecord, RecordType};

const EPILOGUE: &str = "</institutional_holdings>";

/// Document prolog and root start tag
pub fn prolog(dtd: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <!DOCTYPE institutional_holdings PUBLIC \"-//GOOGLE//Institutional Holdings 1.0//EN\" \"{}\">\
         <institutional_holdings>",
        escape_xml(dtd)
    )
}

pub fn epilogue() -> &'static str {
    EPILOGUE
}

/// One `<item>` per exchange record
///
/// Serial ranges without a first date are left out, as `<from><year>` is
/// mandatory.
pub fn holdings_item(record: &ExchangeRecord) -> String {
    let mut item = String::from("<item type=\"electronic\">");
    item.push_str(&text_element(
        "title",
        record.publication_title.as_deref().unwrap_or(""),
    ));

    if let Some(issn) = record.issn.as_deref() {
        item.push_str(&text_element("issn", issn));
    }
    if let Some(isbn) = record.isbn.as_deref() {
        item.push_str(&text_element("isbn", isbn));
    }

    if record.publication_type == RecordType::Serial {
        for coverage in &record.coverages {
            if let Some(element) = coverage_element(coverage) {
                item.push_str(&element);
            }
        }
    }

    item.push_str("</item>");
    item
}

fn coverage_element(coverage: &CoverageRange) -> Option<String> {
    let year = coverage.first_date.as_deref()?;

    let mut element = String::from("<coverage><from>");
    element.push_str(&text_element("year", year));
    if let Some(volume) = coverage.first_volume.as_deref() {
        element.push_str(&text_element("volume", volume));
    }
    if let Some(issue) = coverage.first_issue.as_deref() {
        element.push_str(&text_element("issue", issue));
    }
    element.push_str("</from>");

    if coverage.has_end() {
        element.push_str("<to>");
        if let Some(year) = coverage.last_date.as_deref() {
            element.push_str(&text_element("year", year));
        }
        if let Some(volume) = coverage.last_volume.as_deref() {
            element.push_str(&text_element("volume", volume));
        }
        if let Some(issue) = coverage.last_issue.as_deref() {
            element.push_str(&text_element("issue", issue));
        }
        element.push_str("</to>");
    }

    element.push_str("</coverage>");
    Some(element)
}

/// Wraps items into size-limited holdings documents
///
/// A limit of 0 puts every item in one document. Nothing is produced when
/// no item was pushed.
pub struct HoldingsChunker {
    prolog: String,
    item_limit: Option<usize>,
    current: Option<String>,
    current_items_len: usize,
}

impl HoldingsChunker {
    pub fn new(max_size: usize, dtd: &str) -> Self {
        let prolog = prolog(dtd);
        let item_limit = (max_size > 0).then(|| {
            max_size
                .saturating_sub(prolog.len() + EPILOGUE.len())
                .max(1)
        });

        Self {
            prolog,
            item_limit,
            current: None,
            current_items_len: 0,
        }
    }

    /// Add an item; returns the previous document when it is full
    pub fn push(&mut self, item: &str) -> Option<String> {
        let mut completed = None;

        if let Some(limit) = self.item_limit {
            if self.current.is_some() && self.current_items_len + item.len() >= limit {
                completed = self.close();
            }
        }

        let document = self
            .current
            .get_or_insert_with(|| self.prolog.clone());
        document.push_str(item);
        self.current_items_len += item.len();

        completed
    }

    /// Close the last document, if any
    pub fn finish(mut self) -> Option<String> {
        self.close()
    }

    fn close(&mut self) -> Option<String> {
        self.current_items_len = 0;
        self.current.take().map(|mut document| {
            document.push_str(EPILOGUE);
            document
        })
    }
}
