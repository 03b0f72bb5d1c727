//! Client configuration.
//!
//! Everything the client needs to talk to the backend lives in
//! [`ClientConfig`], built via its [`ClientConfigBuilder`]. The backend
//! address has no default: a missing address is a configuration error that
//! surfaces before the first request, never a runtime failure mid-session.

use crate::error::ChatError;
use crate::progress::ProgressCallback;
use reqwest::Url;
use std::fmt;

/// Environment variable holding the backend base address.
pub const API_URL_ENV: &str = "PDFCHAT_API_URL";

/// Configuration for a chat client.
///
/// # Example
/// ```rust
/// use pdf_chat::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_url("http://localhost:8000")
///     .request_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.ask_url(), "http://localhost:8000/ask");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Base address of the question-answering service, without trailing slash.
    pub api_url: String,

    /// Timeout for a single `/ask` call in seconds. Default: 120.
    ///
    /// Answers are produced by a language model on the backend and can take
    /// tens of seconds on a cold start.
    pub request_timeout_secs: u64,

    /// Timeout for a single `/upload_pdf` call in seconds. Default: 300.
    ///
    /// Uploading includes server-side chunking and embedding of the document.
    pub upload_timeout_secs: u64,

    /// Optional observer for upload/question lifecycle events.
    pub progress: Option<ProgressCallback>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            request_timeout_secs: 120,
            upload_timeout_secs: 300,
            progress: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .field(
                "progress",
                &self.progress.as_ref().map(|_| "<dyn SessionProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a configuration from `PDFCHAT_API_URL`, keeping other defaults.
    pub fn from_env() -> Result<Self, ChatError> {
        let url = std::env::var(API_URL_ENV).unwrap_or_default();
        if url.trim().is_empty() {
            return Err(ChatError::MissingApiUrl);
        }
        Self::builder().api_url(url).build()
    }

    /// Full address of the upload endpoint.
    pub fn upload_url(&self) -> String {
        format!("{}/upload_pdf", self.api_url)
    }

    /// Full address of the question endpoint.
    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.api_url)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn upload_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ChatError> {
        let c = &self.config;
        if c.api_url.is_empty() {
            return Err(ChatError::MissingApiUrl);
        }
        let parsed = Url::parse(&c.api_url)
            .map_err(|e| ChatError::InvalidConfig(format!("api_url '{}': {e}", c.api_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ChatError::InvalidConfig(format!(
                "api_url must be http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if c.request_timeout_secs == 0 || c.upload_timeout_secs == 0 {
            return Err(ChatError::InvalidConfig("Timeouts must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}
