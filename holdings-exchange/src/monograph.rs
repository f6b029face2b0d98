//! Monograph metadata resolution from the first hit of the primary response

use serde_json::Value;

use crate::model::{Hit, InputRecord, MonographMetadata, SearchResponse};

/// Resolve all monograph fields; every field is `None` for serials
pub fn resolve(record: &InputRecord, primary: &SearchResponse) -> MonographMetadata {
    MonographMetadata {
        monograph_volume: monograph_volume(record, primary),
        date_published_print: date_published_print(record, primary),
        date_published_online: date_published_online(record, primary),
    }
}

/// Leading integer of the host volume (`"12a"` gives 12)
pub fn monograph_volume(record: &InputRecord, primary: &SearchResponse) -> Option<i64> {
    if !record.is_monograph() {
        return None;
    }

    match primary.first_hit()?.host.as_ref()?.volume.as_ref()? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

/// Own publication date, else the host date when there is no electronic ISBN
pub fn date_published_print(record: &InputRecord, primary: &SearchResponse) -> Option<String> {
    if !record.is_monograph() {
        return None;
    }

    let hit = primary.first_hit()?;
    own_date(hit).or_else(|| {
        if record.e_isbn.is_none() {
            host_date(hit)
        } else {
            None
        }
    })
}

/// Host date, else own date; only 21st/22nd century dates count as online
pub fn date_published_online(record: &InputRecord, primary: &SearchResponse) -> Option<String> {
    if !record.is_monograph() {
        return None;
    }

    let hit = primary.first_hit()?;
    let sources: [fn(&Hit) -> Option<String>; 2] = [host_date, own_date];

    sources
        .iter()
        .find_map(|source| source(hit))
        .filter(|date| date.starts_with("20") || date.starts_with("21"))
}

fn host_date(hit: &Hit) -> Option<String> {
    hit.host
        .as_ref()
        .and_then(|h| h.publication_date.clone())
        .filter(|d| !d.is_empty())
}

fn own_date(hit: &Hit) -> Option<String> {
    hit.publication_date.clone().filter(|d| !d.is_empty())
}

/// Optional sign followed by digits, ignoring leading whitespace
fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}
