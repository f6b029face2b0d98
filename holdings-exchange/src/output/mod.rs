//! Serializers and file writers for exchange records

pub mod institutional_links;
pub mod kbart;
pub mod sink;
pub mod writer;
pub mod xml_holdings;

pub use institutional_links::build_institutional_links;
pub use kbart::{KbartWriter, KBART_COLUMNS};
pub use sink::{write_kbart, write_xml_holdings};
pub use writer::{list_holdings_files, write_links_file, HoldingsFileWriter};
pub use xml_holdings::{holdings_item, HoldingsChunker};

/// Escape text for element content and attribute values
pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// `<name>text</name>` with escaped text
pub(crate) fn text_element(name: &str, text: &str) -> String {
    format!("<{name}>{}</{name}>", escape_xml(text), name = name)
}
