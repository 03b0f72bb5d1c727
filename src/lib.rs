//! # pdf-chat
//!
//! Chat with a PDF through a document question-answering backend.
//!
//! Upload a document once, then ask natural-language questions about it. The
//! backend does the retrieval and answering; this crate owns the client side:
//! file staging, the upload request, the transcript, and what happens when a
//! request fails.
//!
//! ## Lifecycle
//!
//! ```text
//!  no document ──select──▶ staged ──confirm──▶ uploading ──2xx──▶ ready
//!                            ▲                     │               │ ▲
//!                            └──── error ──────────┘          ask  │ │ answer / notice
//!                                                                  ▼ │
//!  ◀─────────────────────────────── reset ──────────────────────  asking
//! ```
//!
//! * [`upload::UploadController`] — `Idle | Staged | Uploading`
//! * [`session::SessionController`] — `Ready | Asking`
//! * [`app::ChatApp`] — owns the [`DocumentRef`] and switches between them
//!
//! Every failure is local to one request: the controller returns to an
//! interactive state and the user decides whether to try again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_chat::{ChatApp, ClientConfig, StagedFile, UploadOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backend address from PDFCHAT_API_URL
//!     let config = ClientConfig::from_env()?;
//!     let mut app = ChatApp::new(&config)?;
//!
//!     app.select_file(StagedFile::from_path("report.pdf").await?);
//!     if let UploadOutcome::Failed { notice, .. } = app.confirm_upload().await {
//!         eprintln!("{notice}");
//!         return Ok(());
//!     }
//!
//!     app.set_input("What is the total revenue?");
//!     if let Some(answer) = app.submit_question().await {
//!         println!("{}", answer.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfchat` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod app;
pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod message;
pub mod notices;
pub mod progress;
pub mod session;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use app::{ChatApp, Screen};
pub use backend::{AskRequest, AskResponse, Backend, HttpBackend};
pub use clock::{Clock, SharedClock, SystemClock};
pub use config::{ClientConfig, ClientConfigBuilder, API_URL_ENV};
pub use error::{ChatError, RequestError};
pub use message::{Message, MessageId, Role, Transcript};
pub use progress::{NoopProgressCallback, ProgressCallback, SessionProgressCallback};
pub use session::{
    Key, KeyAction, KeyPress, PendingQuestion, SessionController, SessionState,
};
pub use upload::{
    DocumentRef, Selection, StagedFile, UploadController, UploadOutcome, UploadRequest,
    UploadState, PDF_MEDIA_TYPE, RECOMMENDED_MAX_BYTES,
};
