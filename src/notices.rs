//! User-visible texts produced locally by the client.
//!
//! The greeting and every failure notice live here so the controllers stay
//! free of copy, and tests can compare against the same constants the UI
//! shows.

use crate::error::RequestError;

/// Shown when the backend rejected a question.
pub const QUESTION_REJECTED: &str =
    "Sorry, I encountered an error while processing your request.";

/// Shown when a question never reached the backend.
pub const QUESTION_UNREACHABLE: &str =
    "Sorry, I couldn't connect to the server. Please check if the backend is running.";

/// Shown when the backend rejected an upload.
pub const UPLOAD_REJECTED: &str = "Failed to upload PDF. Please try again.";

/// Shown when an upload never reached the backend.
pub const UPLOAD_UNREACHABLE: &str =
    "Error uploading file. Please check if the backend is running.";

/// Shown when a selected file is not a PDF.
pub const NOT_A_PDF: &str = "Only PDF files can be uploaded.";

/// First assistant message of every session.
pub fn greeting(document_name: &str) -> String {
    format!("I've loaded your PDF \"{document_name}\". Ask me anything about its contents!")
}

/// Assistant notice for a failed question.
pub fn question_failure(err: &RequestError) -> &'static str {
    if err.is_transport() {
        QUESTION_UNREACHABLE
    } else {
        QUESTION_REJECTED
    }
}

/// Alert text for a failed upload.
pub fn upload_failure(err: &RequestError) -> &'static str {
    if err.is_transport() {
        UPLOAD_UNREACHABLE
    } else {
        UPLOAD_REJECTED
    }
}
