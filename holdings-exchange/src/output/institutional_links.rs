//! Institutional links XML: the entry document pointing at every holdings file

use holdings_common::config::XmlLinksConfig;
use reqwest::Url;

use super::{escape_xml, text_element};
use crate::error::{ExchangeError, ExchangeResult};

fn prolog(dtd: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <!DOCTYPE institutional_links PUBLIC \"-//GOOGLE//Institutional Links 1.0//EN\" \"{}\">",
        escape_xml(dtd)
    )
}

fn lang_element(name: &str, text: &str) -> String {
    format!("<{name} lang=\"en\">{}</{name}>", escape_xml(text), name = name)
}

/// Build the links document for `holdings_files`, resolved against `base_url`
pub fn build_institutional_links(
    config: &XmlLinksConfig,
    holdings_files: &[String],
) -> ExchangeResult<String> {
    let base = Url::parse(&config.base_url).map_err(|e| {
        ExchangeError::InvalidConfig(format!("invalid links base_url '{}': {}", config.base_url, e))
    })?;

    let mut xml = prolog(&config.dtd);
    xml.push_str("<institutional_links>");
    xml.push_str(&lang_element("institution", &config.institution));
    xml.push_str(&text_element("keywords", &config.keywords));
    for contact in &config.contacts {
        xml.push_str(&text_element("contact", contact));
    }
    xml.push_str(&lang_element("electronic_link_label", &config.link_label));
    xml.push_str(&lang_element("other_link_label", &config.link_label));
    xml.push_str(&text_element("openurl_base", &config.openurl_base));
    for option in &config.openurl_options {
        xml.push_str(&text_element("openurl_option", option));
    }
    xml.push_str(&text_element("patron_ip_required", "no"));

    xml.push_str("<electronic_holdings>");
    for file in holdings_files {
        let url = base.join(file).map_err(|e| {
            ExchangeError::InvalidConfig(format!("cannot resolve '{}' against base_url: {}", file, e))
        })?;
        xml.push_str(&text_element("url", url.as_str()));
    }
    xml.push_str("</electronic_holdings>");

    xml.push_str("</institutional_links>");
    Ok(xml)
}
