//! Terminal event loop.
//!
//! Input lines play the role of the widget's input field and buttons. The
//! widget is owned by the loop. Backend calls run on spawned tasks, so the
//! loop keeps reading input and settling answers while they are outstanding.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinHandle, JoinSet};
use uuid::Uuid;

use crate::backend::{BackendError, DocumentList, SearchBackend};
use crate::widget::{ChatView, ChatWidget, WidgetSettings};

const HELP: &[&str] = &[
    "/toggle, /t      open or close the chat panel",
    "/docs            list the documents the backend answers from",
    "/upload <path>   send a .txt, .pdf or .docx document to the backend",
    "/help            show this list",
    "/quit, /q        leave once pending work has finished",
    "//text           ask a question that starts with '/'",
];

/// The search request of the outstanding submission.
struct InFlight {
    id: Uuid,
    handle: JoinHandle<Result<String, BackendError>>,
}

/// Background `/docs` and `/upload` jobs; each yields notice lines.
type Jobs = JoinSet<Vec<String>>;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Documents,
    Upload(Option<PathBuf>),
    Help,
    Quit,
    Unknown(String),
    /// Anything that is not a command is a question for the widget.
    Say(String),
}

impl Command {
    /// A leading `/` followed by a plain word is a command. `//` escapes the
    /// slash, and lines like `/etc/hosts ...` are questions.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Say(line.to_string());
        };
        if rest.starts_with('/') {
            return Self::Say(rest.to_string());
        }

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "toggle" | "t" => Self::Toggle,
            "docs" | "documents" => Self::Documents,
            "upload" => Self::Upload((!arg.is_empty()).then(|| PathBuf::from(arg))),
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ if !name.is_empty() && name.chars().all(char::is_alphanumeric) => {
                Self::Unknown(name.to_string())
            }
            _ => Self::Say(line.to_string()),
        }
    }
}

/// Drive a widget from `reader` until end of input or `/quit`.
///
/// Before returning, the loop waits for the outstanding request and any
/// background jobs, so every accepted question gets its answer or apology.
/// Lines that are not valid UTF-8 are decoded lossily. A read error stops
/// input and is returned once pending work has settled.
pub async fn run_session<R, V, B>(
    mut reader: R,
    view: V,
    backend: Arc<B>,
    settings: WidgetSettings,
) -> anyhow::Result<ChatWidget<V>>
where
    R: AsyncBufRead + Unpin,
    V: ChatView,
    B: SearchBackend + ?Sized + 'static,
{
    let mut widget = ChatWidget::new(view, settings);
    let mut in_flight: Option<InFlight> = None;
    let mut jobs = Jobs::new();
    let mut buf = Vec::new();
    let mut reading = true;
    let mut read_error = None;

    loop {
        if !reading && in_flight.is_none() && jobs.is_empty() {
            break;
        }

        tokio::select! {
            read = reader.read_until(b'\n', &mut buf), if reading => {
                match read {
                    Ok(0) => reading = false,
                    Ok(_) => {
                        let line = decode_line(&buf);
                        buf.clear();
                        if !handle_line(&mut widget, &line, &backend, &mut in_flight, &mut jobs) {
                            reading = false;
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "Failed to read input");
                        read_error = Some(err);
                        reading = false;
                    }
                }
            }
            Some((id, result)) = join_search(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                widget.settle(id, result);
            }
            Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                let lines = joined.unwrap_or_else(|err| {
                    tracing::error!(error = %err, "Background job failed");
                    vec![format!("Command failed: {err}")]
                });
                for line in &lines {
                    widget.view_mut().notice(line);
                }
            }
            else => break,
        }
    }

    tracing::info!(
        name: "terminal.session.ended",
        messages = widget.messages().len(),
        "Chat session ended"
    );

    match read_error {
        Some(err) => Err(err.into()),
        None => Ok(widget),
    }
}

/// Strip the line terminator and repair invalid UTF-8.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    match String::from_utf8_lossy(raw) {
        Cow::Borrowed(line) => line.to_string(),
        Cow::Owned(line) => {
            tracing::warn!(bytes = raw.len(), "Input line is not valid UTF-8; decoded lossily");
            line
        }
    }
}

/// Wait for the outstanding search. A panicked or cancelled task settles as
/// a failure so the widget never stays busy.
async fn join_search(
    in_flight: &mut Option<InFlight>,
) -> Option<(Uuid, Result<String, BackendError>)> {
    let flight = in_flight.as_mut()?;
    let result = match (&mut flight.handle).await {
        Ok(result) => result,
        Err(err) => Err(BackendError::Aborted(err.to_string())),
    };
    Some((flight.id, result))
}

/// Apply one input line. Returns `false` once the user asked to leave.
fn handle_line<V, B>(
    widget: &mut ChatWidget<V>,
    line: &str,
    backend: &Arc<B>,
    in_flight: &mut Option<InFlight>,
    jobs: &mut Jobs,
) -> bool
where
    V: ChatView,
    B: SearchBackend + ?Sized + 'static,
{
    match Command::parse(line) {
        Command::Toggle => {
            widget.toggle_panel();
        }
        Command::Documents => {
            let backend = Arc::clone(backend);
            jobs.spawn(async move {
                match backend.documents().await {
                    Ok(list) => document_lines(&list),
                    Err(err) => {
                        tracing::warn!(error = %err, "Document listing failed");
                        vec![format!("Could not list documents: {err}")]
                    }
                }
            });
        }
        Command::Upload(None) => widget.view_mut().notice("Usage: /upload <path>"),
        Command::Upload(Some(path)) => {
            let backend = Arc::clone(backend);
            jobs.spawn(async move {
                match backend.upload(&path).await {
                    Ok(message) => vec![message],
                    Err(err) => {
                        tracing::warn!(error = %err, path = %path.display(), "Upload failed");
                        vec![format!("Upload failed: {err}")]
                    }
                }
            });
        }
        Command::Help => {
            for line in HELP {
                widget.view_mut().notice(line);
            }
        }
        Command::Quit => return false,
        Command::Unknown(name) => {
            widget
                .view_mut()
                .notice(&format!("Unknown command /{name}, try /help"));
        }
        Command::Say(text) => submit(widget, &text, backend, in_flight),
    }
    true
}

fn submit<V, B>(
    widget: &mut ChatWidget<V>,
    text: &str,
    backend: &Arc<B>,
    in_flight: &mut Option<InFlight>,
) where
    V: ChatView,
    B: SearchBackend + ?Sized + 'static,
{
    let Some(pending) = widget.begin_submit(text) else {
        if text.trim().is_empty() {
            return;
        }
        if !widget.panel().is_open() {
            widget
                .view_mut()
                .notice("The chat is closed, type /toggle to open it");
        } else if widget.is_busy() {
            widget
                .view_mut()
                .notice("Still waiting for the previous answer");
        }
        return;
    };

    let backend = Arc::clone(backend);
    let question = pending.question;
    let handle = tokio::spawn(async move { backend.search(&question).await });
    *in_flight = Some(InFlight {
        id: pending.id,
        handle,
    });
}

fn document_lines(list: &DocumentList) -> Vec<String> {
    let count = list.count.unwrap_or(list.documents.len());
    let mut lines = vec![format!("{count} document(s) available")];
    for doc in &list.documents {
        let modified = doc
            .modified
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!("{}  {:.2} Ko  {modified}", doc.name, doc.size_kb));
    }
    lines
}
