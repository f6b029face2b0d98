//! Review service client
//!
//! Fetches the bibliographic summary documents that drive an exchange run.

use futures::{Stream, StreamExt};
use holdings_common::config::{FieldCodes, ReviewConfig};
use std::time::Duration;

use super::document_stream::decode_documents;
use crate::error::SourceError;
use crate::model::RawRecord;

const ALL_DOCUMENTS_PATH: &str = "api/run/all-documents";

/// Selection of review documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub uri: Option<String>,
    pub record_type: Option<String>,
    pub corpus: Option<String>,
    pub title: Option<String>,
    pub max_size: Option<u32>,
}

pub struct ReviewClient {
    client: reqwest::Client,
    documents_url: String,
    fields: FieldCodes,
    default_max_size: u32,
    sid: String,
}

impl ReviewClient {
    pub fn new(config: &ReviewConfig, sid: &str) -> Result<Self, SourceError> {
        let documents_url = format!("{}/{}", config.url.trim_end_matches('/'), ALL_DOCUMENTS_PATH);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SourceError::Request {
                url: documents_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            documents_url,
            fields: config.fields.clone(),
            default_max_size: config.max_size,
            sid: sid.to_string(),
        })
    }

    pub fn documents_url(&self) -> &str {
        &self.documents_url
    }

    /// Query parameters; string filters shorter than two characters are omitted
    pub fn query_params(&self, filter: &ReviewFilter) -> Vec<(String, String)> {
        let string_filters = [
            ("uri", &filter.uri),
            (self.fields.record_type.as_str(), &filter.record_type),
            (self.fields.corpus.as_str(), &filter.corpus),
            (self.fields.title.as_str(), &filter.title),
        ];

        let mut params: Vec<(String, String)> = string_filters
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .filter(|v| v.chars().count() > 1)
                    .map(|v| (key.to_string(), v.clone()))
            })
            .collect();

        let max_size = filter.max_size.unwrap_or(self.default_max_size);
        params.push(("maxSize".to_string(), max_size.to_string()));
        params.push(("sid".to_string(), self.sid.clone()));
        params
    }

    /// Stream the matching documents
    ///
    /// The request is only sent once the stream is first polled. Documents
    /// are decoded from the body as it arrives. A failed request yields a
    /// single error and ends the stream.
    pub fn find_documents(
        &self,
        filter: &ReviewFilter,
    ) -> impl Stream<Item = Result<RawRecord, SourceError>> + Send + 'static {
        let client = self.client.clone();
        let url = self.documents_url.clone();
        let params = self.query_params(filter);

        async_stream::stream! {
            tracing::info!(url = %url, "Requesting review documents");

            let body = match send(&client, &url, &params).await {
                Ok(response) => response.bytes_stream(),
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let documents = decode_documents(url.clone(), body);
            futures::pin_mut!(documents);
            let mut count: usize = 0;
            while let Some(document) = documents.next().await {
                count += 1;
                yield document;
            }
            tracing::debug!(count, "Review documents received");
        }
    }
}

async fn send(
    client: &reqwest::Client,
    url: &str,
    params: &[(String, String)],
) -> Result<reqwest::Response, SourceError> {
    let response = client
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|e| SourceError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}
