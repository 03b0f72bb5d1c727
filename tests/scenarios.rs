//! Session lifecycle scenarios against a scripted backend.
//!
//! No network: every request is answered from a per-test script, so each
//! outcome (success, HTTP error, transport error) can be forced and the
//! number of requests counted exactly.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pdf_chat::notices;
use pdf_chat::{
    Backend, ChatApp, Clock, Key, KeyPress, NoopProgressCallback, RequestError, Role, Screen,
    Selection, SessionProgressCallback, StagedFile, UploadController, UploadOutcome,
    PDF_MEDIA_TYPE,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedBackend {
    uploads: Mutex<VecDeque<Result<(), RequestError>>>,
    answers: Mutex<VecDeque<Result<String, RequestError>>>,
    uploaded: Mutex<Vec<String>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn upload_returns(self: &Arc<Self>, r: Result<(), RequestError>) -> Arc<Self> {
        self.uploads.lock().unwrap().push_back(r);
        Arc::clone(self)
    }

    fn ask_returns(self: &Arc<Self>, r: Result<String, RequestError>) -> Arc<Self> {
        self.answers.lock().unwrap().push_back(r);
        Arc::clone(self)
    }

    fn upload_count(&self) -> usize {
        self.uploaded.lock().unwrap().len()
    }

    fn ask_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn upload_pdf(&self, file: &StagedFile) -> Result<(), RequestError> {
        self.uploaded.lock().unwrap().push(file.name().to_string());
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted upload")
    }

    async fn ask(&self, query: &str) -> Result<String, RequestError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted question")
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }
}

fn refused() -> RequestError {
    RequestError::Transport {
        detail: "error sending request: Connection refused (os error 111)".into(),
    }
}

fn pdf(name: &str) -> StagedFile {
    StagedFile::new(name, PDF_MEDIA_TYPE, b"%PDF-1.7\n%%EOF".to_vec())
}

fn app_with(backend: &Arc<ScriptedBackend>) -> ChatApp {
    ChatApp::with_parts(
        Arc::clone(backend) as Arc<dyn Backend>,
        Arc::new(FixedClock),
        Arc::new(NoopProgressCallback),
    )
}

async fn ready_app(backend: &Arc<ScriptedBackend>) -> ChatApp {
    backend.upload_returns(Ok(()));
    let mut app = app_with(backend);
    app.select_file(pdf("report.pdf"));
    let outcome = app.confirm_upload().await;
    assert!(matches!(outcome, UploadOutcome::Handoff(_)), "got {outcome:?}");
    app
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_upload_then_greeting() {
    let backend = ScriptedBackend::new().upload_returns(Ok(()));
    let mut app = app_with(&backend);

    assert_eq!(app.select_file(pdf("report.pdf")), Selection::Staged);
    let outcome = app.confirm_upload().await;

    match outcome {
        UploadOutcome::Handoff(doc) => assert_eq!(doc.name, "report.pdf"),
        other => panic!("expected hand-off, got {other:?}"),
    }
    assert_eq!(app.document().map(|d| d.name.as_str()), Some("report.pdf"));
    let messages = app.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::Assistant);
    assert!(messages[0].content.contains("report.pdf"));
    assert_eq!(backend.uploaded.lock().unwrap().as_slice(), ["report.pdf"]);
    assert_eq!(backend.ask_count(), 0);
}

#[tokio::test]
async fn scenario_b_text_file_never_staged() {
    let backend = ScriptedBackend::new();
    let mut app = app_with(&backend);

    let txt = StagedFile::new("notes.txt", "text/plain", b"just notes".to_vec());
    assert_eq!(
        app.select_file(txt),
        Selection::Rejected {
            media_type: "text/plain".into()
        }
    );

    let uploader = app.uploader().expect("still on the upload screen");
    assert!(uploader.staged_file().is_none());
    assert!(!uploader.can_upload());
    assert_eq!(app.confirm_upload().await, UploadOutcome::Ignored);
    assert_eq!(backend.upload_count(), 0);
}

#[tokio::test]
async fn scenario_c_server_error_adds_notice() {
    let backend = ScriptedBackend::new();
    let mut app = ready_app(&backend).await;
    backend.ask_returns(Err(RequestError::Rejected { status: 500 }));

    app.set_input("What is the total revenue?");
    let notice = app.submit_question().await.expect("assistant turn").clone();

    assert_eq!(notice.role, Role::Assistant);
    assert_eq!(notice.content, notices::QUESTION_REJECTED);
    let messages = app.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "What is the total revenue?");
    assert!(!app.is_pending());
    assert_eq!(
        backend.queries.lock().unwrap().as_slice(),
        ["What is the total revenue?"]
    );
}

#[tokio::test]
async fn scenario_d_whitespace_question_is_ignored() {
    let backend = ScriptedBackend::new();
    let mut app = ready_app(&backend).await;

    app.set_input("  ");
    assert!(app.submit_question().await.is_none());
    assert_eq!(app.messages().len(), 1);
    assert_eq!(backend.ask_count(), 0);
}

#[tokio::test]
async fn scenario_e_refused_upload_keeps_file() {
    let backend = ScriptedBackend::new().upload_returns(Err(refused()));
    let mut app = app_with(&backend);
    app.select_file(pdf("report.pdf"));

    let (notice, error) = match app.confirm_upload().await {
        UploadOutcome::Failed { notice, error } => (notice, error),
        other => panic!("expected failure, got {other:?}"),
    };
    assert!(error.is_transport());
    assert_eq!(notice, notices::UPLOAD_UNREACHABLE);
    assert_ne!(notice, notices::UPLOAD_REJECTED);
    assert_ne!(notice, notices::QUESTION_REJECTED);

    let uploader = app.uploader().expect("still uploading screen");
    assert_eq!(uploader.staged_file(), Some(&pdf("report.pdf")));
    assert!(uploader.can_upload());
    assert!(app.document().is_none());
}

// ── Properties ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn retry_after_failed_upload_succeeds() {
    let backend = ScriptedBackend::new()
        .upload_returns(Err(RequestError::Rejected { status: 502 }))
        .upload_returns(Ok(()));
    let mut app = app_with(&backend);
    app.select_file(pdf("report.pdf"));

    let first = app.confirm_upload().await;
    assert!(matches!(
        first,
        UploadOutcome::Failed {
            notice: notices::UPLOAD_REJECTED,
            ..
        }
    ));
    assert!(matches!(app.confirm_upload().await, UploadOutcome::Handoff(_)));
    assert_eq!(backend.upload_count(), 2);
    assert!(matches!(app.screen(), Screen::Chat(_)));
}

#[tokio::test]
async fn one_request_per_confirmed_upload() {
    let backend = ScriptedBackend::new().upload_returns(Ok(()));
    let mut uploader = UploadController::new(Arc::clone(&backend) as Arc<dyn Backend>);
    uploader.select_file(pdf("report.pdf"));

    let request = uploader.begin_upload().expect("staged");
    // Triggers while the request is outstanding are refused.
    assert!(uploader.begin_upload().is_none());
    assert_eq!(uploader.confirm_upload().await, UploadOutcome::Ignored);
    assert_eq!(backend.upload_count(), 0);

    let result = request.send(&*backend).await;
    assert!(matches!(
        uploader.finish_upload(result),
        UploadOutcome::Handoff(_)
    ));
    assert_eq!(backend.upload_count(), 1);
}

#[tokio::test]
async fn every_outcome_adds_exactly_one_assistant_turn() {
    let backend = ScriptedBackend::new();
    let mut app = ready_app(&backend).await;
    backend
        .ask_returns(Ok("Revenue was $4.2M.".into()))
        .ask_returns(Err(RequestError::Rejected { status: 503 }))
        .ask_returns(Err(refused()))
        .ask_returns(Err(RequestError::Timeout { secs: 120 }));

    let expected = [
        "Revenue was $4.2M.",
        notices::QUESTION_REJECTED,
        notices::QUESTION_UNREACHABLE,
        notices::QUESTION_UNREACHABLE,
    ];
    for (i, want) in expected.iter().enumerate() {
        let before = app.messages().len();
        app.set_input(format!("question {i}"));
        let got = app.submit_question().await.expect("answered").content.clone();
        assert_eq!(&got, want);
        assert_eq!(app.messages().len(), before + 2);
        assert!(!app.is_pending());
    }

    let roles: Vec<Role> = app.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles.iter().filter(|r| **r == Role::User).count(), 4);
    assert_eq!(backend.ask_count(), 4);
}

#[tokio::test]
async fn user_turn_lands_before_request_is_sent() {
    let backend = ScriptedBackend::new();
    let mut app = ready_app(&backend).await;
    backend.ask_returns(Ok("ok".into()));

    let session = app.session_mut().expect("chat screen");
    session.set_input("What changed in Q3?");
    let pending = session.begin_question().expect("accepted");

    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.input(), "");
    assert!(session.begin_question().is_none());
    assert_eq!(backend.ask_count(), 0);

    let result = pending.send(&*backend).await;
    session.complete_question(result);
    assert_eq!(session.transcript().len(), 3);
    assert_eq!(backend.ask_count(), 1);
}

#[tokio::test]
async fn enter_submits_and_shift_enter_does_not() {
    let backend = ScriptedBackend::new();
    let mut app = ready_app(&backend).await;
    backend.ask_returns(Ok("two lines received".into()));

    for c in "first".chars() {
        assert!(app.handle_key(KeyPress::plain(Key::Char(c))).await.is_none());
    }
    assert!(app.handle_key(KeyPress::shifted(Key::Enter)).await.is_none());
    assert_eq!(backend.ask_count(), 0);
    for c in "second".chars() {
        app.handle_key(KeyPress::plain(Key::Char(c))).await;
    }

    let answer = app
        .handle_key(KeyPress::plain(Key::Enter))
        .await
        .expect("submitted")
        .content
        .clone();
    assert_eq!(answer, "two lines received");
    assert_eq!(
        backend.queries.lock().unwrap().as_slice(),
        ["first\nsecond"]
    );
}

#[tokio::test]
async fn reset_clears_everything() {
    let backend = ScriptedBackend::new();
    let mut app = ready_app(&backend).await;
    backend.ask_returns(Ok("42".into()));
    app.set_input("q");
    app.submit_question().await;
    assert_eq!(app.messages().len(), 3);

    app.reset();
    assert!(app.document().is_none());
    assert!(app.messages().is_empty());
    assert!(app.transcript().is_none());
    let uploader = app.uploader().expect("back on the upload screen");
    assert!(uploader.staged_file().is_none());

    // Reset from the upload screen is harmless too.
    app.reset();
    assert!(app.document().is_none());
    assert_eq!(backend.upload_count(), 1);
}

#[tokio::test]
async fn new_document_after_reset_gets_fresh_transcript() {
    let backend = ScriptedBackend::new();
    let mut app = ready_app(&backend).await;
    app.reset();

    backend.upload_returns(Ok(()));
    app.select_file(pdf("second.pdf"));
    app.confirm_upload().await;

    let messages = app.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id.0, 1);
    assert!(messages[0].content.contains("second.pdf"));
}

#[tokio::test]
async fn progress_events_fire_around_requests() {
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
        resets: AtomicUsize,
    }

    impl SessionProgressCallback for Recorder {
        fn on_upload_start(&self, file_name: &str) {
            self.events.lock().unwrap().push(format!("upload:{file_name}"));
        }
        fn on_upload_complete(&self, file_name: &str) {
            self.events.lock().unwrap().push(format!("uploaded:{file_name}"));
        }
        fn on_question_start(&self, query: &str) {
            self.events.lock().unwrap().push(format!("ask:{query}"));
        }
        fn on_answer(&self, message: &pdf_chat::Message) {
            self.events
                .lock()
                .unwrap()
                .push(format!("answer:{}", message.content));
        }
        fn on_reset(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    let backend = ScriptedBackend::new()
        .upload_returns(Ok(()))
        .ask_returns(Ok("42".into()));
    let recorder = Arc::new(Recorder::default());
    let mut app = ChatApp::with_parts(
        Arc::clone(&backend) as Arc<dyn Backend>,
        Arc::new(FixedClock),
        Arc::clone(&recorder) as Arc<dyn SessionProgressCallback>,
    );

    app.select_file(pdf("report.pdf"));
    app.confirm_upload().await;
    app.set_input("meaning?");
    app.submit_question().await;
    app.reset();

    assert_eq!(
        recorder.events.lock().unwrap().as_slice(),
        [
            "upload:report.pdf",
            "uploaded:report.pdf",
            "ask:meaning?",
            "answer:42"
        ]
    );
    assert_eq!(recorder.resets.load(Ordering::SeqCst), 1);
}
