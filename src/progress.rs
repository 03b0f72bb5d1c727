//! Progress-callback trait for upload and question lifecycle events.
//!
//! Inject an [`Arc<dyn SessionProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to be told when
//! a request starts and how it ended. Front ends use it to drive a pending
//! indicator ("Uploading…", a typing spinner) without polling controller
//! state.
//!
//! # Example
//!
//! ```rust
//! use pdf_chat::{ClientConfig, Message, SessionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     answers: AtomicUsize,
//! }
//!
//! impl SessionProgressCallback for CountingCallback {
//!     fn on_answer(&self, message: &Message) {
//!         self.answers.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} chars", message.content.len());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { answers: AtomicUsize::new(0) });
//!
//! let config = ClientConfig::builder()
//!     .api_url("http://localhost:8000")
//!     .progress_callback(counter as Arc<dyn SessionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::RequestError;
use crate::message::Message;
use std::sync::Arc;

/// Called by [`crate::app::ChatApp`] around every request it issues.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait SessionProgressCallback: Send + Sync {
    /// An upload request is about to be sent.
    fn on_upload_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// The backend accepted the upload.
    fn on_upload_complete(&self, file_name: &str) {
        let _ = file_name;
    }

    /// The upload failed; `notice` is the text to show the user.
    fn on_upload_error(&self, file_name: &str, error: &RequestError, notice: &str) {
        let _ = (file_name, error, notice);
    }

    /// A question was accepted and is about to be sent.
    fn on_question_start(&self, query: &str) {
        let _ = query;
    }

    /// The assistant message closing a question was appended (answer or
    /// failure notice).
    fn on_answer(&self, message: &Message) {
        let _ = message;
    }

    /// The session was discarded.
    fn on_reset(&self) {}
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl SessionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn SessionProgressCallback>;
