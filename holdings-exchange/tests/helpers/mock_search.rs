//! In-memory search API
//!
//! Replies are registered per record query (the part before the derived
//! ` AND publicationDate:` filter) and per facet selector.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use holdings_exchange::clients::{SearchApi, SearchError};
use holdings_exchange::coverage::{
    HOST_PUBLICATION_DATE_BY_VOLUME_AND_ISSUE, ISSUE_BY_VOLUME, PUBLICATION_DATE_BY_VOLUME_AND_ISSUE,
};
use holdings_exchange::model::{QuerySpec, SearchResponse};

#[derive(Debug, Clone)]
pub enum Reply {
    Ok(SearchResponse),
    Transport,
    Status(u16),
}

#[derive(Default)]
pub struct MockSearch {
    replies: Mutex<HashMap<(String, String), Reply>>,
    latency: Option<Duration>,
    facet_latency: HashMap<String, Duration>,
    calls: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Latency of one facet's requests, overriding the default latency
    pub fn with_facet_latency(mut self, facet: &str, latency: Duration) -> Self {
        self.facet_latency.insert(facet.to_string(), latency);
        self
    }

    pub fn reply(&self, record_query: &str, facet: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert((record_query.to_string(), facet.to_string()), reply);
    }

    /// Register the three responses of a serial record
    pub fn serial(
        &self,
        record_query: &str,
        primary: SearchResponse,
        host_dates: SearchResponse,
        fallback_dates: SearchResponse,
    ) {
        self.reply(record_query, ISSUE_BY_VOLUME, Reply::Ok(primary));
        self.reply(
            record_query,
            HOST_PUBLICATION_DATE_BY_VOLUME_AND_ISSUE,
            Reply::Ok(host_dates),
        );
        self.reply(
            record_query,
            PUBLICATION_DATE_BY_VOLUME_AND_ISSUE,
            Reply::Ok(fallback_dates),
        );
    }

    /// Register the primary response of a monograph record
    pub fn monograph(&self, record_query: &str, primary: SearchResponse) {
        self.reply(record_query, ISSUE_BY_VOLUME, Reply::Ok(primary));
    }

    /// Same reply for every facet of a record
    pub fn all(&self, record_query: &str, reply: Reply) {
        for facet in [
            ISSUE_BY_VOLUME,
            HOST_PUBLICATION_DATE_BY_VOLUME_AND_ISSUE,
            PUBLICATION_DATE_BY_VOLUME_AND_ISSUE,
        ] {
            self.reply(record_query, facet, reply.clone());
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests that ran to completion (cancelled ones never do)
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchApi for MockSearch {
    async fn search(&self, spec: &QuerySpec) -> Result<SearchResponse, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = self.facet_latency.get(&spec.facet).copied().or(self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let record_query = spec
            .query
            .split(" AND publicationDate:")
            .next()
            .unwrap_or_default()
            .to_string();
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&(record_query, spec.facet.clone()))
            .cloned();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        match reply {
            Some(Reply::Ok(response)) => Ok(response),
            Some(Reply::Transport) => Err(SearchError::Transport("connection refused".to_string())),
            Some(Reply::Status(status)) => Err(SearchError::Status {
                status,
                message: "mock".to_string(),
            }),
            None => Err(SearchError::Status {
                status: 404,
                message: format!("no reply for '{}'", spec.query),
            }),
        }
    }
}
