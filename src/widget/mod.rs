//! Chat widget: panel toggle, message log, typing indicator, one request per
//! question.
//!
//! # Architecture
//!
//! - [`ChatWidget`]: controller owning all widget state
//! - [`ChatView`]: display surface the controller renders into
//! - [`RecordingView`]: headless view that records what it was told to show
//!
//! # Example
//!
//! ```rust
//! use recherche_chat::widget::{ChatWidget, PanelState, RecordingView, WidgetSettings};
//!
//! let mut widget = ChatWidget::new(RecordingView::default(), WidgetSettings::default());
//! assert_eq!(widget.toggle_panel(), PanelState::Open);
//! assert_eq!(widget.toggle_panel(), PanelState::Closed);
//! ```

mod controller;
mod state;
mod view;

pub use controller::{ChatWidget, WidgetSettings};
pub use state::{
    Message, Origin, PanelState, PendingSubmission, SubmissionOutcome, SubmissionState,
    TypingIndicator,
};
pub use view::ChatView;

/// Something a [`RecordingView`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    PanelVisible(bool),
    Appended(Message),
    InputCleared,
    TypingShown,
    TypingHidden,
    InputEnabled(bool),
    Scrolled,
    Notice(String),
}

/// Headless [`ChatView`] keeping both the raw call sequence and the
/// resulting display state.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    /// Every call, in order.
    pub events: Vec<ViewEvent>,
    /// Messages rendered so far.
    pub rendered: Vec<Message>,
    /// Notices shown so far.
    pub notices: Vec<String>,
    pub visible: bool,
    pub input_enabled: bool,
    /// Typing placeholders currently on screen.
    pub typing: usize,
    /// Typing placeholders removed so far.
    pub hidden_typing: usize,
}

impl ChatView for RecordingView {
    fn set_panel_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.events.push(ViewEvent::PanelVisible(visible));
    }

    fn append_message(&mut self, message: &Message) {
        self.rendered.push(message.clone());
        self.events.push(ViewEvent::Appended(message.clone()));
    }

    fn clear_input(&mut self) {
        self.events.push(ViewEvent::InputCleared);
    }

    fn show_typing(&mut self) {
        self.typing += 1;
        self.events.push(ViewEvent::TypingShown);
    }

    fn hide_typing(&mut self) {
        self.typing = self.typing.saturating_sub(1);
        self.hidden_typing += 1;
        self.events.push(ViewEvent::TypingHidden);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.events.push(ViewEvent::InputEnabled(enabled));
    }

    fn scroll_to_latest(&mut self) {
        self.events.push(ViewEvent::Scrolled);
    }

    fn notice(&mut self, text: &str) {
        self.notices.push(text.to_string());
        self.events.push(ViewEvent::Notice(text.to_string()));
    }
}
