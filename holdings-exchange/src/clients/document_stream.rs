//! Incremental decoding of the review service's `{"data": [..]}` body
//!
//! The body is scanned byte by byte as chunks arrive; every complete element
//! of the top-level `data` array is cut out and decoded on its own, so only
//! the element being read is ever buffered.

use futures::{Stream, StreamExt};
use std::fmt;

use crate::error::SourceError;
use crate::model::RawRecord;

const DATA_KEY: &[u8] = b"data";

/// Cuts the elements of the top-level `data` array out of a JSON byte stream
///
/// Only structural bytes (quotes, escapes, brackets, commas, colons) are
/// interpreted; they are all ASCII and never occur inside a multi-byte UTF-8
/// sequence. Everything else is left to `serde_json`.
#[derive(Debug, Default)]
pub struct DataArraySplitter {
    depth: usize,
    in_string: bool,
    escaped: bool,
    /// Top-level string being read (candidate key)
    key: Vec<u8>,
    last_string: Option<Vec<u8>>,
    pending_key: Option<Vec<u8>>,
    in_data: bool,
    data_closed: bool,
    element: Option<Vec<u8>>,
}

impl DataArraySplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk; returns the elements completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut completed = Vec::new();

        for &byte in chunk {
            if self.data_closed {
                break;
            }

            if self.in_string {
                self.push(byte);
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                    if self.depth == 1 {
                        self.last_string = Some(std::mem::take(&mut self.key));
                    }
                    continue;
                }
                if self.depth == 1 {
                    self.key.push(byte);
                }
                continue;
            }

            match byte {
                b'"' => {
                    self.start_scalar();
                    self.push(byte);
                    self.in_string = true;
                    self.key.clear();
                }
                b'{' | b'[' => {
                    if self.in_data && self.depth == 2 && self.element.is_none() {
                        self.element = Some(Vec::new());
                    }
                    self.push(byte);
                    self.depth += 1;

                    if byte == b'[' && self.depth == 2 && self.pending_key.as_deref() == Some(DATA_KEY)
                    {
                        self.in_data = true;
                    }
                }
                b'}' | b']' => {
                    self.push(byte);
                    self.depth = self.depth.saturating_sub(1);

                    if self.in_data {
                        if self.depth == 2 {
                            completed.extend(self.element.take());
                        } else if self.depth == 1 {
                            // End of the data array; drop the `]` from a pending scalar
                            completed.extend(self.element.take().map(|mut e| {
                                e.pop();
                                e
                            }));
                            self.in_data = false;
                            self.data_closed = true;
                        }
                    }
                }
                b',' => {
                    if self.in_data && self.depth == 2 {
                        completed.extend(self.element.take());
                    } else {
                        self.push(byte);
                    }
                    if self.depth == 1 {
                        self.pending_key = None;
                    }
                }
                b':' => {
                    self.push(byte);
                    if self.depth == 1 {
                        self.pending_key = self.last_string.take();
                    }
                }
                b' ' | b'\t' | b'\r' | b'\n' => self.push(byte),
                _ => {
                    self.start_scalar();
                    self.push(byte);
                }
            }
        }

        completed
    }

    /// Whether the body ended inside the `data` array
    pub fn is_truncated(&self) -> bool {
        self.in_data
    }

    fn start_scalar(&mut self) {
        if self.in_data && self.depth == 2 && self.element.is_none() {
            self.element = Some(Vec::new());
        }
    }

    fn push(&mut self, byte: u8) {
        if let Some(element) = &mut self.element {
            element.push(byte);
        }
    }
}

/// Decode the documents of a chunked review response body
///
/// Yields each document as soon as its closing bracket has been read. A
/// transport error, an undecodable element or a truncated array yields one
/// error and ends the stream. A body without a `data` array has no documents.
pub fn decode_documents<S, B, E>(
    url: String,
    body: S,
) -> impl Stream<Item = Result<RawRecord, SourceError>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    async_stream::stream! {
        futures::pin_mut!(body);
        let mut splitter = DataArraySplitter::new();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(SourceError::Request { url: url.clone(), message: e.to_string() });
                    return;
                }
            };

            for element in splitter.feed(chunk.as_ref()) {
                match serde_json::from_slice::<RawRecord>(&element) {
                    Ok(document) => yield Ok(document),
                    Err(e) => {
                        yield Err(SourceError::Decode { url: url.clone(), message: e.to_string() });
                        return;
                    }
                }
            }
        }

        if splitter.is_truncated() {
            yield Err(SourceError::Decode {
                url,
                message: "response body ended inside the data array".to_string(),
            });
        }
    }
}
