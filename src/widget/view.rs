//! Display surface driven by the widget controller.

use super::state::Message;

/// The view elements a [`ChatWidget`](super::ChatWidget) renders into.
///
/// Built once by the frontend and handed to the controller, which is the only
/// caller. Operations cannot fail from the controller's point of view; a view
/// backed by fallible I/O logs its own failures.
pub trait ChatView {
    /// Show or hide the panel.
    fn set_panel_visible(&mut self, visible: bool);

    /// Render a new entry at the end of the message list.
    fn append_message(&mut self, message: &Message);

    /// Empty the input field.
    fn clear_input(&mut self);

    /// Insert the typing placeholder after the last message.
    fn show_typing(&mut self);

    /// Remove the typing placeholder.
    fn hide_typing(&mut self);

    /// Enable or disable the input field and send control.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Bring the newest entry into view.
    fn scroll_to_latest(&mut self);

    /// Out-of-band status line. Never part of the message log.
    fn notice(&mut self, text: &str) {
        let _ = text;
    }
}

impl<V: ChatView + ?Sized> ChatView for &mut V {
    fn set_panel_visible(&mut self, visible: bool) {
        (**self).set_panel_visible(visible);
    }

    fn append_message(&mut self, message: &Message) {
        (**self).append_message(message);
    }

    fn clear_input(&mut self) {
        (**self).clear_input();
    }

    fn show_typing(&mut self) {
        (**self).show_typing();
    }

    fn hide_typing(&mut self) {
        (**self).hide_typing();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        (**self).set_input_enabled(enabled);
    }

    fn scroll_to_latest(&mut self) {
        (**self).scroll_to_latest();
    }

    fn notice(&mut self, text: &str) {
        (**self).notice(text);
    }
}
