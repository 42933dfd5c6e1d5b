//! Chat widget controller.

use uuid::Uuid;

use super::state::{
    Message, PanelState, PendingSubmission, SubmissionOutcome, SubmissionState, TypingIndicator,
};
use super::view::ChatView;
use crate::backend::{BackendError, SearchBackend};
use crate::config::{DEFAULT_ERROR_MESSAGE, WidgetConfig};

/// Behavior knobs for a [`ChatWidget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Bot message shown when a request fails.
    pub error_message: String,
    /// Bot message shown the first time the panel opens.
    pub greeting: Option<String>,
    /// Open the panel at construction.
    pub start_open: bool,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            greeting: None,
            start_open: false,
        }
    }
}

impl From<&WidgetConfig> for WidgetSettings {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            error_message: config.error_message.clone(),
            greeting: config
                .greeting
                .clone()
                .filter(|greeting| !greeting.trim().is_empty()),
            start_open: config.start_open,
        }
    }
}

/// Owns the panel state, the display log and the single typing slot, and
/// pushes every change to its view.
///
/// A submission moves `Idle -> Sending -> Idle`. While it is `Sending` the
/// input is disabled, so at most one request and one typing indicator exist.
///
/// # Example
///
/// ```rust
/// use recherche_chat::widget::{ChatWidget, RecordingView, WidgetSettings};
///
/// let mut widget = ChatWidget::new(RecordingView::default(), WidgetSettings::default());
/// widget.toggle_panel();
///
/// let pending = widget.begin_submit("  Bonjour ").unwrap();
/// assert_eq!(pending.question, "Bonjour");
/// assert!(widget.is_typing());
///
/// widget.settle(pending.id, Ok("Salut !".to_string()));
/// assert_eq!(widget.messages().len(), 2);
/// assert!(!widget.is_typing());
/// ```
#[derive(Debug)]
pub struct ChatWidget<V> {
    view: V,
    settings: WidgetSettings,
    panel: PanelState,
    log: Vec<Message>,
    typing: Option<TypingIndicator>,
    submission: SubmissionState,
    greeted: bool,
}

impl<V: ChatView> ChatWidget<V> {
    /// Wire the controller to its view and bring the view to the initial state.
    pub fn new(view: V, settings: WidgetSettings) -> Self {
        let start_open = settings.start_open;
        let mut widget = Self {
            view,
            settings,
            panel: PanelState::Closed,
            log: Vec::new(),
            typing: None,
            submission: SubmissionState::Idle,
            greeted: false,
        };

        widget.view.set_panel_visible(false);
        widget.view.set_input_enabled(true);
        if start_open {
            widget.toggle_panel();
        }
        widget
    }

    /// Flip the panel between open and closed.
    pub fn toggle_panel(&mut self) -> PanelState {
        self.panel = self.panel.toggled();
        self.view.set_panel_visible(self.panel.is_open());

        tracing::debug!(name: "widget.panel.toggled", panel = ?self.panel, "Chat panel toggled");

        if self.panel.is_open() && !self.greeted {
            self.greeted = true;
            if let Some(greeting) = self.settings.greeting.clone() {
                self.push(Message::bot(greeting));
            }
        }
        self.panel
    }

    /// Accept the input field content as a new question.
    ///
    /// Returns `None` without touching the log when the trimmed text is empty,
    /// the panel is closed, or a request is already outstanding. Otherwise the
    /// user message is appended, the input cleared, the typing indicator shown,
    /// and the caller must issue exactly one request and pass its result to
    /// [`settle`](Self::settle).
    pub fn begin_submit(&mut self, input: &str) -> Option<PendingSubmission> {
        let question = input.trim();
        if question.is_empty() {
            return None;
        }
        if !self.panel.is_open() {
            tracing::debug!("Submission ignored: panel closed");
            return None;
        }
        if let SubmissionState::Sending { id } = self.submission {
            tracing::debug!(pending = %id, "Submission ignored: request outstanding");
            return None;
        }

        let id = Uuid::new_v4();
        self.push(Message::user(question));
        self.view.clear_input();
        self.insert_typing(id);
        self.view.set_input_enabled(false);
        self.submission = SubmissionState::Sending { id };

        tracing::info!(
            name: "widget.submit.sent",
            submission_id = %id,
            question_length = question.len(),
            "Question submitted"
        );

        Some(PendingSubmission {
            id,
            question: question.to_string(),
        })
    }

    /// Finish the outstanding submission with the backend's result.
    ///
    /// Results for any other submission id are dropped.
    pub fn settle(
        &mut self,
        id: Uuid,
        result: Result<String, BackendError>,
    ) -> Option<SubmissionOutcome> {
        match self.submission {
            SubmissionState::Sending { id: pending } if pending == id => {}
            state => {
                tracing::warn!(submission_id = %id, state = ?state, "Dropping stale settlement");
                return None;
            }
        }

        self.remove_typing();

        let outcome = match result {
            Ok(answer) => {
                tracing::info!(
                    name: "widget.submit.resolved",
                    submission_id = %id,
                    answer_length = answer.len(),
                    "Answer received"
                );
                self.push(Message::bot(answer));
                SubmissionOutcome::Resolved
            }
            Err(err) => {
                let kind = err.kind();
                tracing::warn!(
                    name: "widget.submit.failed",
                    submission_id = %id,
                    kind = ?kind,
                    error = %err,
                    "Search request failed"
                );
                self.push(Message::bot(self.settings.error_message.clone()));
                SubmissionOutcome::Failed(kind)
            }
        };

        self.submission = SubmissionState::Idle;
        self.view.set_input_enabled(true);
        Some(outcome)
    }

    /// Run one whole submission against `backend`.
    pub async fn submit<B>(&mut self, backend: &B, input: &str) -> Option<SubmissionOutcome>
    where
        B: SearchBackend + ?Sized,
    {
        let pending = self.begin_submit(input)?;
        let result = backend.search(&pending.question).await;
        self.settle(pending.id, result)
    }

    /// Current panel state.
    pub fn panel(&self) -> PanelState {
        self.panel
    }

    /// The display log, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    /// Whether the typing indicator is on screen.
    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    /// Whether a request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self.submission, SubmissionState::Sending { .. })
    }

    /// Id of the outstanding submission, if any.
    pub fn pending_id(&self) -> Option<Uuid> {
        match self.submission {
            SubmissionState::Sending { id } => Some(id),
            SubmissionState::Idle => None,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    fn push(&mut self, message: Message) {
        self.view.append_message(&message);
        self.view.scroll_to_latest();
        self.log.push(message);
    }

    fn insert_typing(&mut self, submission: Uuid) {
        self.remove_typing();
        self.typing = Some(TypingIndicator { submission });
        self.view.show_typing();
        self.view.scroll_to_latest();
    }

    fn remove_typing(&mut self) {
        if self.typing.take().is_some() {
            self.view.hide_typing();
        }
    }
}
