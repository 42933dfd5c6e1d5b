//! In-process mock of the search backend.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use recherche_chat::backend::{API_KEY_HEADER, HttpSearchBackend};
use recherche_chat::config::BackendConfig;

/// What the mock saw.
#[derive(Debug, Default)]
pub struct Recorder {
    pub questions: Mutex<Vec<String>>,
    pub api_keys: Mutex<Vec<Option<String>>>,
    pub uploads: Mutex<Vec<(String, usize)>>,
}

impl Recorder {
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    pub fn api_keys(&self) -> Vec<Option<String>> {
        self.api_keys.lock().unwrap().clone()
    }
}

/// Answers by question:
/// - `Hello` -> `Hi there`
/// - `boom` -> HTTP 500
/// - `garbage` -> 200 with a body lacking `recherche`
/// - `detail` -> object-shaped answer
/// - `slow` -> answers after 300ms
/// - `very slow` -> answers after 3s
/// - anything else -> `echo: <question>`
async fn recherche(
    State(recorder): State<Arc<Recorder>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let question = body["question"].as_str().unwrap_or_default().to_string();
    recorder.questions.lock().unwrap().push(question.clone());
    recorder.api_keys.lock().unwrap().push(
        headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    );

    match question.as_str() {
        "Hello" => Json(json!({ "recherche": "Hi there" })).into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response(),
        "garbage" => Json(json!({ "unexpected": true })).into_response(),
        "detail" => Json(json!({
            "recherche": {
                "question": "detail",
                "reponse": "Réponse détaillée",
                "score(/1)": 0.8,
                "horodatage": "2024-05-01T10:20:30"
            }
        }))
        .into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Json(json!({ "recherche": "finally" })).into_response()
        }
        "very slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "recherche": "too late" })).into_response()
        }
        other => Json(json!({ "recherche": format!("echo: {other}") })).into_response(),
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Bienvenu sur l'API du ColepsBot!" }))
}

async fn documents() -> Json<Value> {
    Json(json!({
        "documents": [
            { "nom": "guide.pdf", "taille_ko": 12.5, "date_modification": "2024-03-02T08:00:00" },
            { "nom": "faq.txt", "taille_ko": 0.4, "date_modification": "2024-03-02T09:30:00.500000" }
        ],
        "nombre": 2
    }))
}

async fn upload(State(recorder): State<Arc<Recorder>>, mut multipart: Multipart) -> Json<Value> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap_or_default();
        recorder
            .uploads
            .lock()
            .unwrap()
            .push((name.clone(), bytes.len()));
        return Json(json!({
            "message": format!("Fichier '{name}' uploadé et chargé dans le bot avec succès.")
        }));
    }
    Json(json!({ "error": "no file" }))
}

/// Start the mock on an ephemeral port; returns its base URL.
pub async fn spawn_mock() -> (String, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let app = Router::new()
        .route("/", get(root))
        .route("/recherche", post(recherche))
        .route("/documents", get(documents))
        .route("/upload", post(upload))
        .with_state(Arc::clone(&recorder));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), recorder)
}

/// A base URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn backend_config(base_url: &str, api_key: Option<&str>) -> BackendConfig {
    BackendConfig {
        base_url: base_url.to_string(),
        api_key: api_key.map(ToString::to_string),
        timeout_secs: 1,
    }
}

pub fn http_backend(base_url: &str) -> HttpSearchBackend {
    HttpSearchBackend::new(&backend_config(base_url, None)).unwrap()
}
