//! Session controller: the transcript and the question/answer cycle.
//!
//! ```text
//!          begin_question()            complete_question(_)
//!   Ready ──────────────────▶ Asking ──────────────────────▶ Ready
//! ```
//!
//! A question goes through three steps so the ordering guarantees are
//! observable: [`SessionController::begin_question`] appends the user turn
//! and clears the input before any network activity,
//! [`PendingQuestion::send`] is the only suspension point, and
//! [`SessionController::complete_question`] leaves `Asking` first and then
//! appends exactly one assistant turn, whatever the outcome.

use crate::backend::Backend;
use crate::clock::SharedClock;
use crate::error::RequestError;
use crate::message::{Message, Role, Transcript};
use crate::notices;
use crate::upload::DocumentRef;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Session controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Ready,
    Asking,
}

/// A key press delivered to the input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Multi-line modifier (Shift) held during the press.
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
}

/// What the caller should do after [`SessionController::handle_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// The input buffer changed.
    Edited,
    /// Plain Enter: submit the buffer.
    Submit,
    /// Input is disabled while a question is pending.
    Ignored,
}

/// An accepted question awaiting its answer.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    query: String,
}

impl PendingQuestion {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub async fn send(&self, backend: &dyn Backend) -> Result<String, RequestError> {
        backend.ask(&self.query).await
    }
}

/// Owns the transcript for one loaded document.
pub struct SessionController {
    backend: Arc<dyn Backend>,
    clock: SharedClock,
    document_name: String,
    transcript: Transcript,
    input: String,
    state: SessionState,
}

impl SessionController {
    /// Start a session for `document`, greeting the user locally.
    pub fn new(document: &DocumentRef, backend: Arc<dyn Backend>, clock: SharedClock) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(
            Role::Assistant,
            notices::greeting(&document.name),
            clock.now(),
        );
        info!("Session started for '{}'", document.name);
        Self {
            backend,
            clock,
            document_name: document.name.clone(),
            transcript,
            input: String::new(),
            state: SessionState::Ready,
        }
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_asking(&self) -> bool {
        self.state == SessionState::Asking
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input buffer. Ignored while a question is pending.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if !self.is_asking() {
            self.input = text.into();
        }
    }

    /// Whether the send action is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_asking() && !self.input.trim().is_empty()
    }

    /// Apply a key press to the input box.
    ///
    /// Enter submits unless Shift is held, in which case it inserts a line
    /// break. Nothing is submitted here: on [`KeyAction::Submit`] the caller
    /// runs [`SessionController::submit_question`].
    pub fn handle_key(&mut self, press: KeyPress) -> KeyAction {
        if self.is_asking() {
            return KeyAction::Ignored;
        }
        match press.key {
            Key::Enter if press.shift => {
                self.input.push('\n');
                KeyAction::Edited
            }
            Key::Enter => KeyAction::Submit,
            Key::Char(c) => {
                self.input.push(c);
                KeyAction::Edited
            }
            Key::Backspace => {
                self.input.pop();
                KeyAction::Edited
            }
        }
    }

    /// Accept the input as a question: append the user turn with the raw
    /// text, clear the input and move to `Asking`.
    ///
    /// Returns `None` (and changes nothing) while a question is pending or
    /// when the input is blank.
    pub fn begin_question(&mut self) -> Option<PendingQuestion> {
        if self.is_asking() {
            debug!("Question ignored: another one is pending");
            return None;
        }
        if self.input.trim().is_empty() {
            return None;
        }

        let query = std::mem::take(&mut self.input);
        let now = self.clock.now();
        self.transcript.push(Role::User, query.as_str(), now);
        self.state = SessionState::Asking;
        info!("Asking question ({} chars)", query.len());
        Some(PendingQuestion { query })
    }

    /// Leave `Asking` and append the assistant turn for `result`.
    ///
    /// Returns `None` when no question was pending.
    pub fn complete_question(&mut self, result: Result<String, RequestError>) -> Option<&Message> {
        if !self.is_asking() {
            return None;
        }
        self.state = SessionState::Ready;

        let content = match result {
            Ok(answer) => {
                debug!("Answer received ({} chars)", answer.len());
                answer
            }
            Err(e) => {
                warn!("Question failed: {}", e);
                notices::question_failure(&e).to_string()
            }
        };
        let now = self.clock.now();
        Some(self.transcript.push(Role::Assistant, content, now))
    }

    /// Submit the input buffer and wait for the answer.
    ///
    /// Returns the appended assistant message, or `None` when the submission
    /// was refused (blank input or a question already pending).
    pub async fn submit_question(&mut self) -> Option<&Message> {
        let pending = self.begin_question()?;
        let backend = Arc::clone(&self.backend);
        let result = pending.send(backend.as_ref()).await;
        self.complete_question(result)
    }
}
