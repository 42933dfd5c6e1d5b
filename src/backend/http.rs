//! HTTP implementation of [`SearchBackend`].

use std::path::Path;
use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use url::Url;

use super::types::StatusReply;
use super::{
    BackendError, DocumentList, SearchBackend, SearchRequest, SearchResponse,
    check_upload_extension,
};
use crate::config::BackendConfig;

/// Header carrying the API key on authenticated deployments.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Backend reached over HTTP at a configured base URL.
///
/// Every request carries the `X-API-Key` header when a key is configured.
/// Requests are never retried.
#[derive(Clone)]
pub struct HttpSearchBackend {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpSearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSearchBackend")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl HttpSearchBackend {
    /// Build a backend client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(config, http)
    }

    /// Build a backend client around an existing reqwest client.
    pub fn with_client(config: &BackendConfig, http: reqwest::Client) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(config.base_url.trim())?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let api_key = config
            .api_key
            .as_ref()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Base URL every endpoint is resolved against (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of an endpoint.
    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => rb.header(API_KEY_HEADER, key),
            None => rb,
        }
    }

    async fn check_status(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Server {
            status: status.as_u16(),
            body,
        })
    }

    fn into_message(reply: StatusReply) -> Result<String, BackendError> {
        match reply {
            StatusReply {
                error: Some(error), ..
            } => Err(BackendError::Rejected(error)),
            StatusReply {
                message: Some(message),
                ..
            } => Ok(message),
            StatusReply { .. } => Err(BackendError::Decode(
                "expected a `message` or `error` field".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, question: &str) -> Result<String, BackendError> {
        let url = self.endpoint("recherche")?;
        let body = SearchRequest {
            question: question.to_string(),
        };

        tracing::debug!(url = %url, question_length = question.len(), "Sending search request");

        let response = self
            .authorize(self.http.post(url).json(&body))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(parsed.recherche.into_text())
    }

    async fn probe(&self) -> Result<String, BackendError> {
        let response = self
            .authorize(self.http.get(self.base_url.clone()))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let reply: StatusReply = response.json().await?;
        Self::into_message(reply)
    }

    async fn documents(&self) -> Result<DocumentList, BackendError> {
        let url = self.endpoint("documents")?;
        let response = self.authorize(self.http.get(url)).send().await?;
        let response = Self::check_status(response).await?;
        let list: DocumentList = response.json().await?;

        match list.error {
            Some(error) => Err(BackendError::Rejected(error)),
            None => Ok(list),
        }
    }

    async fn upload(&self, path: &Path) -> Result<String, BackendError> {
        check_upload_extension(path)?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToString::to_string)
            .ok_or_else(|| BackendError::UnsupportedFormat(path.display().to_string()))?;
        let bytes = tokio::fs::read(path).await?;

        tracing::info!(
            name: "backend.upload.started",
            file = %file_name,
            size = bytes.len(),
            "Uploading document"
        );

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = self.endpoint("upload")?;
        let response = self
            .authorize(self.http.post(url).multipart(form))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let reply: StatusReply = response.json().await?;
        Self::into_message(reply)
    }
}
