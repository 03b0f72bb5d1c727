//! The question-answering backend as seen by the client.
//!
//! The controllers talk to the service only through the [`Backend`] trait.
//! [`HttpBackend`] is the production implementation over reqwest; tests
//! swap in scripted fakes that return success, HTTP errors or transport
//! errors on demand, without a global HTTP mock.
//!
//! ## Wire format
//!
//! ```text
//! POST {base}/upload_pdf   multipart, field "pdf" = file bytes + filename
//! POST {base}/ask          {"query": "..."}  →  {"answer": "..."}
//! ```

use crate::config::ClientConfig;
use crate::error::{ChatError, RequestError};
use crate::upload::StagedFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Multipart field name the upload endpoint reads the document from.
pub const UPLOAD_FIELD: &str = "pdf";

/// The two operations the client needs from the service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Upload a document. Any 2xx response is success; its body is ignored.
    async fn upload_pdf(&self, file: &StagedFile) -> Result<(), RequestError>;

    /// Ask a question about the uploaded document and return the answer text.
    async fn ask(&self, query: &str) -> Result<String, RequestError>;
}

/// Body of `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub query: String,
}

/// Successful response of `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    pub answer: String,
}

/// reqwest-backed [`Backend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    upload_url: String,
    ask_url: String,
    upload_timeout_secs: u64,
    request_timeout_secs: u64,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ChatError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing reqwest client (connection pool, proxies, TLS roots).
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            upload_url: config.upload_url(),
            ask_url: config.ask_url(),
            upload_timeout_secs: config.upload_timeout_secs,
            request_timeout_secs: config.request_timeout_secs,
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload_pdf(&self, file: &StagedFile) -> Result<(), RequestError> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.media_type())
            // Staged files always carry `application/pdf`, which parses.
            .map_err(|e| RequestError::Transport {
                detail: e.to_string(),
            })?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        debug!(
            "POST {} ({} bytes, {})",
            self.upload_url,
            file.len(),
            file.media_type()
        );
        let response = self
            .client
            .post(&self.upload_url)
            .timeout(Duration::from_secs(self.upload_timeout_secs))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(e, self.upload_timeout_secs))?;

        let status = response.status();
        debug!("upload_pdf → HTTP {}", status);
        if !status.is_success() {
            return Err(RequestError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn ask(&self, query: &str) -> Result<String, RequestError> {
        debug!("POST {} ({} chars)", self.ask_url, query.len());
        let response = self
            .client
            .post(&self.ask_url)
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .json(&AskRequest {
                query: query.to_string(),
            })
            .send()
            .await
            .map_err(|e| transport_error(e, self.request_timeout_secs))?;

        let status = response.status();
        debug!("ask → HTTP {}", status);
        if !status.is_success() {
            return Err(RequestError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: AskResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                RequestError::InvalidResponse {
                    detail: e.to_string(),
                }
            } else {
                transport_error(e, self.request_timeout_secs)
            }
        })?;
        Ok(body.answer)
    }
}

fn transport_error(e: reqwest::Error, timeout_secs: u64) -> RequestError {
    if e.is_timeout() {
        RequestError::Timeout { secs: timeout_secs }
    } else {
        RequestError::Transport {
            detail: e.to_string(),
        }
    }
}
