//! Recherche chat
//!
//! A chat-widget client for a question-answering search backend: a panel that
//! opens and closes, an append-only message log, a typing indicator, and one
//! `POST /recherche` request per question.
//!
//! # Modules
//!
//! - [`widget`]: chat widget controller and its view seam
//! - [`backend`]: search backend trait and HTTP implementation
//! - [`config`]: layered configuration (defaults, YAML, env, CLI)
//! - [`terminal`]: terminal frontend and event loop

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod backend;
pub mod config;
pub mod terminal;
pub mod widget;
