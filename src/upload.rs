//! Upload controller: file staging and the single upload request.
//!
//! ```text
//!            select_file(pdf)          begin_upload()
//!   Idle ───────────────────▶ Staged ───────────────▶ Uploading
//!                               ▲  │ select_file(pdf)     │
//!                               │  └──────▶ Staged        │
//!                               └──── finish_upload(Err) ─┤
//!                                                         │ finish_upload(Ok)
//!                                                         ▼
//!                                                  hand-off (Idle)
//! ```
//!
//! The file lives inside the state, so "confirm only when staged" and "at
//! most one upload in flight" are properties of the enum rather than of
//! separate flags that could disagree.

use crate::backend::Backend;
use crate::error::{ChatError, RequestError};
use crate::notices;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The only media type the upload endpoint accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Files above this size still upload, but the user is told to expect trouble.
pub const RECOMMENDED_MAX_BYTES: usize = 10 * 1024 * 1024;

/// A user-selected file awaiting upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ChatError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ChatError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ChatError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!("Read {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::new(name, media_type_for(path), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }

    pub fn exceeds_recommended_size(&self) -> bool {
        self.bytes.len() > RECOMMENDED_MAX_BYTES
    }
}

/// Declared media type for a path, judged by extension only, the way a file
/// picker reports it. Content is never sniffed.
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MEDIA_TYPE,
        "txt" | "text" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// The document loaded on the backend, identified by its display name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DocumentRef {
    pub name: String,
}

/// Upload controller state.
#[derive(Debug, Clone, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Staged(Arc<StagedFile>),
    Uploading(Arc<StagedFile>),
}

/// Result of [`UploadController::select_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The file is now staged.
    Staged,
    /// Not a PDF; state unchanged.
    Rejected { media_type: String },
    /// An upload is in flight; state unchanged.
    Busy,
}

/// Result of a finished (or refused) upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The backend accepted the document; control passes to a session.
    Handoff(DocumentRef),
    /// The request failed; the file is still staged for another try.
    Failed {
        error: RequestError,
        notice: &'static str,
    },
    /// Nothing staged, or an upload is already in flight; no request made.
    Ignored,
}

/// An accepted upload awaiting its network round-trip.
///
/// Produced by [`UploadController::begin_upload`]; hand its result back to
/// [`UploadController::finish_upload`].
#[derive(Debug, Clone)]
pub struct UploadRequest {
    file: Arc<StagedFile>,
}

impl UploadRequest {
    pub fn file(&self) -> &StagedFile {
        &self.file
    }

    pub async fn send(&self, backend: &dyn Backend) -> Result<(), RequestError> {
        backend.upload_pdf(&self.file).await
    }
}

/// Owns the "no document → document ready" transition.
pub struct UploadController {
    backend: Arc<dyn Backend>,
    state: UploadState,
}

impl UploadController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: UploadState::Idle,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// The staged file, also while it is being uploaded.
    pub fn staged_file(&self) -> Option<&StagedFile> {
        match &self.state {
            UploadState::Idle => None,
            UploadState::Staged(f) | UploadState::Uploading(f) => Some(f),
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, UploadState::Uploading(_))
    }

    /// Whether the "start chatting" action should be offered.
    pub fn can_upload(&self) -> bool {
        matches!(self.state, UploadState::Staged(_))
    }

    /// Stage a file, replacing any earlier selection. Non-PDF files are
    /// refused and leave the state untouched.
    pub fn select_file(&mut self, file: StagedFile) -> Selection {
        if self.is_uploading() {
            debug!("Ignoring selection of '{}' during upload", file.name());
            return Selection::Busy;
        }
        if !file.is_pdf() {
            warn!(
                "Rejected '{}': media type {} is not {}",
                file.name(),
                file.media_type(),
                PDF_MEDIA_TYPE
            );
            return Selection::Rejected {
                media_type: file.media_type().to_string(),
            };
        }
        info!("Staged '{}' ({} bytes)", file.name(), file.len());
        self.state = UploadState::Staged(Arc::new(file));
        Selection::Staged
    }

    /// Move `Staged → Uploading` and return the request to send, or `None`
    /// when nothing is staged or an upload is already in flight.
    pub fn begin_upload(&mut self) -> Option<UploadRequest> {
        let UploadState::Staged(file) = &self.state else {
            return None;
        };
        let file = Arc::clone(file);
        info!("Uploading PDF '{}'", file.name());
        self.state = UploadState::Uploading(Arc::clone(&file));
        Some(UploadRequest { file })
    }

    /// Leave `Uploading` with the request's result.
    pub fn finish_upload(&mut self, result: Result<(), RequestError>) -> UploadOutcome {
        let file = match std::mem::take(&mut self.state) {
            UploadState::Uploading(f) => f,
            other => {
                self.state = other;
                return UploadOutcome::Ignored;
            }
        };

        match result {
            Ok(()) => {
                info!("Upload of '{}' accepted", file.name());
                UploadOutcome::Handoff(DocumentRef {
                    name: file.name().to_string(),
                })
            }
            Err(error) => {
                warn!("Upload of '{}' failed: {}", file.name(), error);
                self.state = UploadState::Staged(file);
                UploadOutcome::Failed {
                    notice: notices::upload_failure(&error),
                    error,
                }
            }
        }
    }

    /// Upload the staged file: `begin_upload`, one request, `finish_upload`.
    pub async fn confirm_upload(&mut self) -> UploadOutcome {
        let Some(request) = self.begin_upload() else {
            return UploadOutcome::Ignored;
        };
        let backend = Arc::clone(&self.backend);
        let result = request.send(backend.as_ref()).await;
        self.finish_upload(result)
    }
}
