//! Wire types for the search backend endpoints.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Body of `POST /recherche`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The user's question, already trimmed.
    pub question: String,
}

/// Body of a successful `POST /recherche` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponse {
    /// The answer to render.
    pub recherche: Answer,
}

/// The `recherche` field comes in two shapes depending on the backend build.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Plain-text answer.
    Text(String),
    /// Structured answer record; only `reponse` is rendered.
    Detailed(DetailedAnswer),
}

/// Structured answer record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailedAnswer {
    /// Answer text.
    pub reponse: String,
    /// Question as the backend understood it.
    #[serde(default)]
    pub question: Option<String>,
    /// Match confidence in `[0, 1]`.
    #[serde(default, rename = "score(/1)")]
    pub score: Option<f64>,
    /// ISO-8601 timestamp of the answer.
    #[serde(default)]
    pub horodatage: Option<String>,
}

impl Answer {
    /// The text shown as the bot message.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Detailed(detail) => detail.reponse,
        }
    }
}

/// Body of `GET /documents`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DocumentList {
    /// Documents available to the backend.
    #[serde(default)]
    pub documents: Vec<DocumentInfo>,
    /// Count reported by the backend.
    #[serde(default, rename = "nombre")]
    pub count: Option<usize>,
    /// Listing failure reported in-band.
    #[serde(default)]
    pub error: Option<String>,
}

/// One entry of the document listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentInfo {
    /// File name.
    #[serde(rename = "nom")]
    pub name: String,
    /// Size in kilobytes.
    #[serde(rename = "taille_ko")]
    pub size_kb: f64,
    /// Last modification time (backend local time).
    #[serde(default, rename = "date_modification")]
    pub modified: Option<NaiveDateTime>,
}

/// `{"message": ...}` or `{"error": ...}` replies from `/` and `/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub(crate) struct StatusReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_answer() {
        let resp: SearchResponse = serde_json::from_str(r#"{"recherche":"Hi there"}"#).unwrap();
        assert_eq!(resp.recherche.into_text(), "Hi there");
    }

    #[test]
    fn test_detailed_answer() {
        let body = r#"{
            "recherche": {
                "question": "horaires",
                "reponse": "Ouvert de 8h à 17h.",
                "score(/1)": 0.9,
                "horodatage": "2024-05-01T10:20:30.123456"
            }
        }"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        match &resp.recherche {
            Answer::Detailed(detail) => assert_eq!(detail.score, Some(0.9)),
            Answer::Text(_) => panic!("expected detailed answer"),
        }
        assert_eq!(resp.recherche.into_text(), "Ouvert de 8h à 17h.");
    }

    #[test]
    fn test_missing_answer_is_rejected() {
        assert!(serde_json::from_str::<SearchResponse>(r#"{"reponse":"x"}"#).is_err());
        assert!(serde_json::from_str::<SearchResponse>(r#"{"recherche":42}"#).is_err());
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(SearchRequest {
            question: "Hello".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "question": "Hello" }));
    }

    #[test]
    fn test_document_listing() {
        let body = r#"{
            "documents": [
                {"nom": "guide.pdf", "taille_ko": 12.5, "date_modification": "2024-03-02T08:00:00"},
                {"nom": "faq.txt", "taille_ko": 0.4, "date_modification": "2024-03-02T08:00:00.250000"}
            ],
            "nombre": 2
        }"#;
        let list: DocumentList = serde_json::from_str(body).unwrap();
        assert_eq!(list.count, Some(2));
        assert_eq!(list.documents[0].name, "guide.pdf");
        assert!(list.documents[1].modified.is_some());
        assert!(list.error.is_none());

        let failed: DocumentList =
            serde_json::from_str(r#"{"error": "permission denied", "documents": []}"#).unwrap();
        assert_eq!(failed.error.as_deref(), Some("permission denied"));
        assert!(failed.documents.is_empty());
    }
}
