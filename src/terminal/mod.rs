//! Terminal frontend for the chat widget.
//!
//! Standard input is the input field, standard output is the panel.

mod app;
mod view;

pub use app::{Command, run_session};
pub use view::TerminalView;
