use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Document formats the backend can ingest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "MD")]
    Markdown,
    #[serde(rename = "HTML")]
    Html,
}

impl DocumentKind {
    /// Matches on the (case-insensitive) file extension; anything else is unsupported.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "md" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Ready,
    Failed,
}

/// A document record as the backend reports it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    #[serde(default)]
    pub size: u64,
    #[serde(
        rename = "uploadDate",
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub upload_date: Option<OffsetDateTime>,
    pub status: DocumentStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// One transcript entry. Questions and answers are distinct constructors so
/// an answer-only field can never leak into a question (and vice versa);
/// entries are immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Question {
        content: String,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
        #[serde(rename = "model")]
        model_id: String,
    },
    Answer {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f32>,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
        #[serde(rename = "model")]
        model_id: String,
    },
}

impl Message {
    pub fn question(content: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self::Question {
            content: content.into(),
            timestamp: OffsetDateTime::now_utc(),
            model_id: model_id.into(),
        }
    }

    pub fn answer(
        content: impl Into<String>,
        source: Option<String>,
        confidence: Option<f32>,
        model_id: impl Into<String>,
    ) -> Self {
        Self::Answer {
            content: content.into(),
            source,
            confidence,
            timestamp: OffsetDateTime::now_utc(),
            model_id: model_id.into(),
        }
    }

    pub fn is_question(&self) -> bool {
        matches!(self, Self::Question { .. })
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Question { content, .. } | Self::Answer { content, .. } => content,
        }
    }
}

/// A locally selected file, before the backend has seen it.
#[derive(Clone, Debug, PartialEq)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_filename(&self.filename)
    }
}
