//! Line-oriented [`ChatView`] over any writer.

use std::fmt;
use std::io::Write;

use crate::widget::{ChatView, Message, Origin};

const USER_PREFIX: &str = "you> ";
const BOT_PREFIX: &str = "bot> ";
const TYPING_LINE: &str = "bot is typing...";

/// Renders the widget as plain text lines.
///
/// A terminal cannot erase what it printed, so hiding the panel holds back
/// new messages until it reopens, and the typing placeholder is printed once
/// per request. Notices are printed regardless of panel visibility.
#[derive(Debug)]
pub struct TerminalView<W> {
    out: W,
    visible: bool,
    typing: bool,
    /// Messages appended while hidden, printed on reopen.
    held: Vec<Message>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            visible: false,
            typing: false,
            held: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Whether a typing placeholder is currently outstanding.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{args}") {
            tracing::warn!(error = %err, "Failed to write to terminal");
        }
    }

    fn print_message(&mut self, message: &Message) {
        let prefix = match message.origin {
            Origin::User => USER_PREFIX,
            Origin::Bot => BOT_PREFIX,
        };
        let indent = " ".repeat(prefix.len());

        let mut lines = message.text.lines();
        let first = lines.next().unwrap_or_default();
        self.line(format_args!("{prefix}{first}"));
        for rest in lines {
            self.line(format_args!("{indent}{rest}"));
        }
    }

    fn flush(&mut self) {
        if let Err(err) = self.out.flush() {
            tracing::warn!(error = %err, "Failed to flush terminal");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn set_panel_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.line(format_args!("--- chat open (/toggle to close, /help for commands) ---"));
            for message in std::mem::take(&mut self.held) {
                self.print_message(&message);
            }
            if self.typing {
                self.line(format_args!("{TYPING_LINE}"));
            }
        } else {
            self.line(format_args!("--- chat closed ---"));
        }
        self.flush();
    }

    fn append_message(&mut self, message: &Message) {
        if self.visible {
            self.print_message(message);
        } else {
            self.held.push(message.clone());
        }
    }

    fn clear_input(&mut self) {}

    fn show_typing(&mut self) {
        self.typing = true;
        if self.visible {
            self.line(format_args!("{TYPING_LINE}"));
        }
    }

    fn hide_typing(&mut self) {
        self.typing = false;
    }

    fn set_input_enabled(&mut self, _enabled: bool) {}

    fn scroll_to_latest(&mut self) {
        self.flush();
    }

    fn notice(&mut self, text: &str) {
        self.line(format_args!("* {text}"));
        self.flush();
    }
}
