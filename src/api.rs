//! HTTP gateway to the Verse Point backend.
//!
//! Pure translation: it attaches the bearer token, serializes bodies (JSON,
//! or multipart for uploads) and normalizes every failure into [`ApiError`].
//! Retry policy belongs to callers; this layer never retries.

use async_trait::async_trait;
use reqwest::{Client, Method, multipart};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::types::{Document, FileUpload, Message, User};

pub const DEFAULT_API_BASE: &str = "http://localhost:5001/api";

// ============================================
// Configuration
// ============================================

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Reads `VERSE_POINT_API` from the environment, loading a `.env` file
    /// first when one is present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var("VERSE_POINT_API").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self { base_url }
    }
}

// ============================================
// Error Types
// ============================================

/// Normalized backend failure. `status` is the HTTP status, or 0 when the
/// backend was unreachable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("api error {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    fn transport(err: reqwest::Error) -> Self {
        Self {
            status: 0,
            message: err.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Backend failures carry `{"error": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "API request failed".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================
// Wire Shapes
// ============================================

#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnswerPayload {
    pub answer: String,
    #[serde(default)]
    pub sources: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Deserialize)]
struct DocumentsEnvelope {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct HistoryEnvelope {
    #[serde(rename = "chatHistory", default)]
    chat_history: Vec<Message>,
}

#[derive(Deserialize)]
struct UploadEnvelope {
    document: Document,
}

// ============================================
// Backend Boundary
// ============================================

/// One method per backend endpoint. The production implementation is
/// [`HttpBackend`]; tests substitute an in-memory fake.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthResponse>;

    async fn register(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> ApiResult<AuthResponse>;

    async fn documents(&self, token: &str) -> ApiResult<Vec<Document>>;

    async fn chat_history(&self, token: &str) -> ApiResult<Vec<Message>>;

    async fn upload(&self, token: &str, file: FileUpload) -> ApiResult<Document>;

    async fn ask(&self, token: &str, message: &str, model: &str) -> ApiResult<AnswerPayload>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url,
        }
    }

    /// Environment-configured backend; rejects an unparseable base URL up
    /// front instead of failing on the first request.
    pub fn from_env() -> anyhow::Result<Self> {
        use anyhow::Context;

        let config = ApiConfig::from_env();
        reqwest::Url::parse(&config.base_url)
            .with_context(|| format!("invalid API base url: {}", config.base_url))?;
        Ok(Self::new(config))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> ApiResult<T> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(ApiError::transport)?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;
        if status.is_success() {
            serde_json::from_str(&body).map_err(|err| ApiError {
                status: status.as_u16(),
                message: format!("malformed response: {err}"),
            })
        } else {
            Err(ApiError {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        self.send_json(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> ApiResult<AuthResponse> {
        self.send_json(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": name,
                "email": email,
                "username": username,
                "password": password,
            })),
        )
        .await
    }

    async fn documents(&self, token: &str) -> ApiResult<Vec<Document>> {
        let envelope: DocumentsEnvelope = self
            .send_json(Method::GET, "/documents", Some(token), None)
            .await?;
        Ok(envelope.documents)
    }

    async fn chat_history(&self, token: &str) -> ApiResult<Vec<Message>> {
        let envelope: HistoryEnvelope = self
            .send_json(Method::GET, "/chat/history", Some(token), None)
            .await?;
        Ok(envelope.chat_history)
    }

    async fn upload(&self, token: &str, file: FileUpload) -> ApiResult<Document> {
        let kind = file.kind();
        let mut part = multipart::Part::bytes(file.bytes).file_name(file.filename);
        if let Some(kind) = kind {
            part = part.mime_str(kind.mime()).map_err(ApiError::transport)?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/documents/upload", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::transport)?;
        let envelope: UploadEnvelope = Self::decode(response).await?;
        Ok(envelope.document)
    }

    async fn ask(&self, token: &str, message: &str, model: &str) -> ApiResult<AnswerPayload> {
        self.send_json(
            Method::POST,
            "/chat",
            Some(token),
            Some(json!({ "message": message, "model": model })),
        )
        .await
    }
}
