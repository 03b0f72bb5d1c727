//! Top-level coordinator: owns the document reference and switches between
//! the upload and chat screens.
//!
//! Control only ever flows one way at a time: a successful upload hands the
//! document name to a fresh [`SessionController`]; [`ChatApp::reset`] drops
//! the session and returns to an idle [`UploadController`].

use crate::backend::{Backend, HttpBackend};
use crate::clock::{SharedClock, SystemClock};
use crate::config::ClientConfig;
use crate::error::ChatError;
use crate::message::{Message, Transcript};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use crate::session::{KeyAction, KeyPress, SessionController};
use crate::upload::{DocumentRef, Selection, StagedFile, UploadController, UploadOutcome};
use std::sync::Arc;
use tracing::info;

/// Which controller currently has control.
pub enum Screen {
    Upload(UploadController),
    Chat(SessionController),
}

/// The whole client: one document at a time.
pub struct ChatApp {
    backend: Arc<dyn Backend>,
    clock: SharedClock,
    progress: ProgressCallback,
    document: Option<DocumentRef>,
    screen: Screen,
}

impl ChatApp {
    /// Build a client talking HTTP to the configured backend.
    pub fn new(config: &ClientConfig) -> Result<Self, ChatError> {
        let backend = Arc::new(HttpBackend::new(config)?);
        let progress = config
            .progress
            .clone()
            .unwrap_or_else(|| Arc::new(NoopProgressCallback));
        Ok(Self::with_parts(backend, Arc::new(SystemClock), progress))
    }

    /// Build a client from injected capabilities.
    pub fn with_parts(
        backend: Arc<dyn Backend>,
        clock: SharedClock,
        progress: ProgressCallback,
    ) -> Self {
        let screen = Screen::Upload(UploadController::new(Arc::clone(&backend)));
        Self {
            backend,
            clock,
            progress,
            document: None,
            screen,
        }
    }

    pub fn document(&self) -> Option<&DocumentRef> {
        self.document.as_ref()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn uploader(&self) -> Option<&UploadController> {
        match &self.screen {
            Screen::Upload(u) => Some(u),
            Screen::Chat(_) => None,
        }
    }

    pub fn session(&self) -> Option<&SessionController> {
        match &self.screen {
            Screen::Chat(s) => Some(s),
            Screen::Upload(_) => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut SessionController> {
        match &mut self.screen {
            Screen::Chat(s) => Some(s),
            Screen::Upload(_) => None,
        }
    }

    /// The current transcript; empty while no document is loaded.
    pub fn messages(&self) -> &[Message] {
        self.session()
            .map(|s| s.transcript().messages())
            .unwrap_or(&[])
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.session().map(SessionController::transcript)
    }

    /// True while an upload or a question is in flight.
    pub fn is_pending(&self) -> bool {
        match &self.screen {
            Screen::Upload(u) => u.is_uploading(),
            Screen::Chat(s) => s.is_asking(),
        }
    }

    /// Stage a file. Only meaningful on the upload screen.
    pub fn select_file(&mut self, file: StagedFile) -> Selection {
        match &mut self.screen {
            Screen::Upload(u) => u.select_file(file),
            Screen::Chat(_) => Selection::Busy,
        }
    }

    /// Upload the staged file and, on success, open a chat session for it.
    pub async fn confirm_upload(&mut self) -> UploadOutcome {
        let Screen::Upload(uploader) = &mut self.screen else {
            return UploadOutcome::Ignored;
        };
        let Some(request) = uploader.begin_upload() else {
            return UploadOutcome::Ignored;
        };

        let name = request.file().name().to_string();
        self.progress.on_upload_start(&name);
        let result = request.send(self.backend.as_ref()).await;

        let Screen::Upload(uploader) = &mut self.screen else {
            return UploadOutcome::Ignored;
        };
        let outcome = uploader.finish_upload(result);
        match &outcome {
            UploadOutcome::Handoff(doc) => {
                self.progress.on_upload_complete(&name);
                self.handoff(doc.clone());
            }
            UploadOutcome::Failed { error, notice } => {
                self.progress.on_upload_error(&name, error, notice);
            }
            UploadOutcome::Ignored => {}
        }
        outcome
    }

    fn handoff(&mut self, document: DocumentRef) {
        let session =
            SessionController::new(&document, Arc::clone(&self.backend), Arc::clone(&self.clock));
        self.document = Some(document);
        self.screen = Screen::Chat(session);
    }

    /// Route a key press to the chat input; submits on plain Enter.
    ///
    /// Returns the appended assistant message when the key press caused a
    /// question to be answered.
    pub async fn handle_key(&mut self, press: KeyPress) -> Option<&Message> {
        let session = self.session_mut()?;
        match session.handle_key(press) {
            KeyAction::Submit => self.submit_question().await,
            KeyAction::Edited | KeyAction::Ignored => None,
        }
    }

    /// Replace the chat input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if let Some(session) = self.session_mut() {
            session.set_input(text);
        }
    }

    /// Ask the question in the input buffer and wait for the answer.
    pub async fn submit_question(&mut self) -> Option<&Message> {
        let Screen::Chat(session) = &mut self.screen else {
            return None;
        };
        let pending = session.begin_question()?;

        self.progress.on_question_start(pending.query());
        let result = pending.send(self.backend.as_ref()).await;

        let Screen::Chat(session) = &mut self.screen else {
            return None;
        };
        let message = session.complete_question(result)?;
        self.progress.on_answer(message);
        Some(message)
    }

    /// Discard the document and transcript and go back to the upload screen.
    pub fn reset(&mut self) {
        if let Some(doc) = self.document.take() {
            info!("Reset: discarding session for '{}'", doc.name);
        }
        self.screen = Screen::Upload(UploadController::new(Arc::clone(&self.backend)));
        self.progress.on_reset();
    }
}
