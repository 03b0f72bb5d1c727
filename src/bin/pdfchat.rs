//! CLI binary for pdf-chat.
//!
//! A thin shim over the library crate: maps flags to `ClientConfig`, feeds
//! stdin lines to `ChatApp` as key presses and prints the transcript.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_chat::{
    ChatApp, ClientConfig, Key, KeyPress, Message, RequestError, Role, Selection,
    SessionProgressCallback, StagedFile, UploadOutcome, RECOMMENDED_MAX_BYTES,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Pending indicator using indicatif ────────────────────────────────────────

/// Shows a spinner while an upload or a question is in flight.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn start(&self, prefix: &str, msg: String) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(prefix.to_string());
        bar.set_message(msg);
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn stop(&self) {
        if let Some(bar) = self.bar.lock().ok().and_then(|mut slot| slot.take()) {
            bar.finish_and_clear();
        }
    }
}

impl SessionProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, file_name: &str) {
        self.start("Uploading", file_name.to_string());
    }

    fn on_upload_complete(&self, _file_name: &str) {
        self.stop();
    }

    fn on_upload_error(&self, _file_name: &str, _error: &RequestError, _notice: &str) {
        self.stop();
    }

    fn on_question_start(&self, _query: &str) {
        self.start("Thinking", String::new());
    }

    fn on_answer(&self, _message: &Message) {
        self.stop();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload a PDF and chat interactively
  pdfchat report.pdf

  # Ask questions non-interactively
  pdfchat report.pdf --ask "What is the total revenue?" --ask "Who audited it?"

  # Dump the transcript as JSON when done
  pdfchat report.pdf --ask "Summarise section 2" --json > transcript.json

CHAT COMMANDS:
  /new        Discard this document and upload another
  /history    Print the transcript so far
  /help       Show commands
  /quit       Exit

  End a line with \ to continue the question on the next line.

ENVIRONMENT VARIABLES:
  PDFCHAT_API_URL   Backend base address (required), e.g. http://localhost:8000
  RUST_LOG          Override log filter (e.g. pdf_chat=debug)
"#;

/// Chat with a PDF through a question-answering backend.
#[derive(Parser, Debug)]
#[command(
    name = "pdfchat",
    version,
    about = "Upload a PDF and ask questions about it",
    long_about = "Upload a PDF to a retrieval-augmented question-answering backend, then ask \
natural-language questions about it. The backend exposes POST /upload_pdf and POST /ask.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF to upload on start. Without it you are prompted for a path.
    pdf: Option<PathBuf>,

    /// Backend base address.
    #[arg(long, env = "PDFCHAT_API_URL")]
    api_url: Option<String>,

    /// Ask this question and exit (repeatable). Requires a PDF.
    #[arg(short, long = "ask", value_name = "QUESTION")]
    ask: Vec<String>,

    /// Per-question timeout in seconds.
    #[arg(long, env = "PDFCHAT_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Upload timeout in seconds.
    #[arg(long, env = "PDFCHAT_UPLOAD_TIMEOUT", default_value_t = 300)]
    upload_timeout: u64,

    /// Print the transcript as JSON on exit.
    #[arg(long, env = "PDFCHAT_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFCHAT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except answers and errors.
    #[arg(short, long, env = "PDFCHAT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would interleave with the conversation, so the
    // default is WARN.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build client ─────────────────────────────────────────────────────
    let mut builder = ClientConfig::builder()
        .api_url(cli.api_url.clone().unwrap_or_default())
        .request_timeout_secs(cli.timeout)
        .upload_timeout_secs(cli.upload_timeout);
    if !cli.quiet {
        builder = builder.progress_callback(CliProgressCallback::new());
    }
    let config = builder.build().context("Invalid configuration")?;
    let mut app = ChatApp::new(&config).context("Failed to start client")?;

    if let Some(ref path) = cli.pdf {
        stage_path(&mut app, path, cli.quiet).await;
        upload(&mut app, cli.quiet).await;
    }

    if !cli.ask.is_empty() {
        if app.document().is_none() {
            anyhow::bail!("--ask needs a PDF that uploaded successfully");
        }
        for question in &cli.ask {
            app.set_input(question.as_str());
            let Some(answer) = app.submit_question().await else {
                continue;
            };
            // With --json the answers are printed once, inside the transcript.
            if cli.json {
                continue;
            }
            if cli.quiet {
                println!("{}", answer.content);
            } else {
                print_message(answer);
            }
        }
    } else {
        run_interactive(&mut app, cli.quiet).await?;
    }

    if cli.json {
        let json = match app.transcript() {
            Some(t) => serde_json::to_string_pretty(t),
            None => serde_json::to_string_pretty(&serde_json::json!({ "messages": [] })),
        }
        .context("Failed to serialise transcript")?;
        println!("{json}");
    }

    Ok(())
}

/// Read stdin until EOF or `/quit`, driving whichever screen is active.
async fn run_interactive(app: &mut ChatApp, quiet: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if app.session().is_none() && !quiet {
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold("Type the path of a PDF, then press Enter on an empty line to upload.")
        );
    }
    if let Some(session) = app.session() {
        if !quiet {
            print_message(&session.transcript().messages()[0]);
        }
    }

    loop {
        prompt(if app.session().is_some() { "you> " } else { "pdf> " });
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/help" => {
                eprintln!("{AFTER_HELP}");
                continue;
            }
            _ => {}
        }

        if app.session().is_some() {
            match line.trim() {
                "/new" => {
                    app.reset();
                    if !quiet {
                        eprintln!(
                            "{} {}",
                            cyan("◆"),
                            bold("Session cleared. Type the path of a new PDF.")
                        );
                    }
                }
                "/history" => {
                    for m in app.messages() {
                        print_message(m);
                    }
                }
                _ => {
                    if let Some(answer) = type_line(app, &line, &mut lines).await? {
                        print_message(answer);
                    }
                }
            }
        } else {
            match line.trim() {
                "" | "/upload" => {
                    upload(app, quiet).await;
                    if let Some(session) = app.session() {
                        print_message(&session.transcript().messages()[0]);
                    }
                }
                path => stage_path(app, Path::new(path), quiet).await,
            }
        }
    }
    Ok(())
}

/// Feed one line to the chat input as key presses. A trailing `\` is
/// Shift+Enter: the question continues on the next stdin line.
async fn type_line<'a, R>(
    app: &'a mut ChatApp,
    first: &str,
    lines: &mut tokio::io::Lines<R>,
) -> Result<Option<&'a Message>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut line = first.to_string();
    loop {
        let (text, continued) = match line.strip_suffix('\\') {
            Some(head) => (head.to_string(), true),
            None => (line.clone(), false),
        };
        if let Some(session) = app.session_mut() {
            for c in text.chars() {
                session.handle_key(KeyPress::plain(Key::Char(c)));
            }
            if continued {
                session.handle_key(KeyPress::shifted(Key::Enter));
            }
        }
        if !continued {
            break;
        }
        prompt("...> ");
        match lines.next_line().await.context("Failed to read stdin")? {
            Some(next) => line = next,
            None => break,
        }
    }
    Ok(app.handle_key(KeyPress::plain(Key::Enter)).await)
}

async fn stage_path(app: &mut ChatApp, path: &Path, quiet: bool) {
    let file = match StagedFile::from_path(path).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{} {}", red("✗"), e);
            return;
        }
    };
    let name = file.name().to_string();
    let oversize = file.exceeds_recommended_size();

    match app.select_file(file) {
        Selection::Staged => {
            if !quiet {
                eprintln!("{} Ready to upload {}", green("✓"), bold(&name));
            }
            if oversize {
                eprintln!(
                    "{} {} is larger than the recommended {} MB; the upload may fail",
                    cyan("⚠"),
                    name,
                    RECOMMENDED_MAX_BYTES / (1024 * 1024)
                );
            }
        }
        Selection::Rejected { media_type } => {
            eprintln!(
                "{} {} {}",
                red("✗"),
                pdf_chat::notices::NOT_A_PDF,
                dim(&format!("({name}: {media_type})"))
            );
        }
        Selection::Busy => {
            eprintln!("{} An upload is already in progress", cyan("⚠"));
        }
    }
}

async fn upload(app: &mut ChatApp, quiet: bool) {
    match app.confirm_upload().await {
        UploadOutcome::Handoff(doc) => {
            if !quiet {
                eprintln!("{} {} loaded and ready", green("✔"), bold(&doc.name));
            }
        }
        UploadOutcome::Failed { notice, error } => {
            eprintln!("{} {}  {}", red("✗"), notice, dim(&error.to_string()));
        }
        UploadOutcome::Ignored => {
            if !quiet {
                eprintln!("{} No PDF selected yet", cyan("⚠"));
            }
        }
    }
}

fn prompt(label: &str) {
    eprint!("{}", bold(label));
    io::stderr().flush().ok();
}

fn print_message(m: &Message) {
    let time = m.timestamp.with_timezone(&chrono::Local).format("%H:%M");
    let who = match m.role {
        Role::User => green("you"),
        Role::Assistant => cyan("assistant"),
    };
    println!("{} {}\n{}\n", who, dim(&time.to_string()), m.content);
}
