//! Search backend seam.
//!
//! The widget never talks HTTP directly. It hands each question to a
//! [`SearchBackend`], which answers with plain text or a [`BackendError`].
//!
//! # Architecture
//!
//! - [`SearchBackend`]: async trait the widget and the terminal loop depend on
//! - [`HttpSearchBackend`]: reqwest implementation of the `/recherche` contract
//! - [`types`]: wire types shared by the backend endpoints

mod http;
pub mod types;

use std::path::Path;

use thiserror::Error;

pub use http::{API_KEY_HEADER, HttpSearchBackend};
pub use types::{Answer, DocumentInfo, DocumentList, SearchRequest, SearchResponse};

/// File extensions the backend accepts on upload.
pub const UPLOAD_EXTENSIONS: &[&str] = &["txt", "pdf", "docx"];

/// The two failure families the widget distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced an HTTP response.
    Transport,
    /// The backend answered, but not with something usable.
    Server,
}

/// Errors produced while talking to the search backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Network unreachable, timeout, connection reset.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// Success status, but the body did not match the contract.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The backend reported an application-level error (`{"error": ...}`).
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// The configured base URL is not a valid URL.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Upload refused locally because of the file extension.
    #[error("unsupported file format: {0} (expected .txt, .pdf or .docx)")]
    UnsupportedFormat(String),

    /// Reading a local file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The task running the request panicked or was cancelled.
    #[error("request task aborted: {0}")]
    Aborted(String),

    /// The backend implementation does not offer this operation.
    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),
}

impl BackendError {
    /// Classify the error for the widget's failure path.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(err) if err.status().is_none() && !err.is_decode() => {
                FailureKind::Transport
            }
            Self::Io(_) | Self::Aborted(_) => FailureKind::Transport,
            _ => FailureKind::Server,
        }
    }
}

/// A question-answering backend.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Ask one question and return the text to render as the bot's answer.
    async fn search(&self, question: &str) -> Result<String, BackendError>;

    /// Check that the backend is reachable and return its welcome message.
    async fn probe(&self) -> Result<String, BackendError> {
        Err(BackendError::Unsupported("probe"))
    }

    /// List the documents the backend answers from.
    async fn documents(&self) -> Result<DocumentList, BackendError> {
        Err(BackendError::Unsupported("documents"))
    }

    /// Upload a document for the backend to answer from.
    async fn upload(&self, path: &Path) -> Result<String, BackendError> {
        let _ = path;
        Err(BackendError::Unsupported("upload"))
    }
}

/// Reject files the backend would refuse before any bytes are sent.
pub fn check_upload_extension(path: &Path) -> Result<(), BackendError> {
    let accepted = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            UPLOAD_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        });

    if accepted {
        Ok(())
    } else {
        Err(BackendError::UnsupportedFormat(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_extension_filter() {
        assert!(check_upload_extension(Path::new("notes.txt")).is_ok());
        assert!(check_upload_extension(Path::new("report.PDF")).is_ok());
        assert!(check_upload_extension(Path::new("dir/spec.docx")).is_ok());

        let err = check_upload_extension(Path::new("image.png")).unwrap_err();
        assert!(matches!(err, BackendError::UnsupportedFormat(_)));
        assert!(check_upload_extension(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_failure_kinds() {
        let server = BackendError::Server {
            status: 500,
            body: String::new(),
        };
        assert_eq!(server.kind(), FailureKind::Server);
        assert_eq!(
            BackendError::Decode("missing field".into()).kind(),
            FailureKind::Server
        );
        assert_eq!(
            BackendError::Io(std::io::Error::other("gone")).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            BackendError::Aborted("task panicked".into()).kind(),
            FailureKind::Transport
        );
    }

    struct SearchOnly;

    #[async_trait::async_trait]
    impl SearchBackend for SearchOnly {
        async fn search(&self, question: &str) -> Result<String, BackendError> {
            Ok(question.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_default_methods_are_unsupported() {
        let backend = SearchOnly;
        assert_eq!(backend.search("abc").await.unwrap(), "ABC");
        assert!(matches!(
            backend.probe().await,
            Err(BackendError::Unsupported("probe"))
        ));
        assert!(matches!(
            backend.documents().await,
            Err(BackendError::Unsupported("documents"))
        ));
        assert!(matches!(
            backend.upload(Path::new("a.txt")).await,
            Err(BackendError::Unsupported("upload"))
        ));
    }
}
