//! Verse Point client core
//!
//! Session/state orchestration for a retrieval-augmented Q&A backend: one
//! mutable session (auth, documents, transcript, active model, in-flight
//! guard), a thin HTTP gateway, document upload lifecycle, single-flight
//! question answering, and durable UI preferences. Rendering is left to the
//! embedding application, which receives typed events through a
//! [`notify::Presenter`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use versepoint::{NullPresenter, VersePointClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = VersePointClient::from_env(Arc::new(NullPresenter))?;
//! client.login("demo", "demo123").await?;
//! client.ask("What do my documents say about onboarding?").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod conversation;
pub mod documents;
pub mod error;
pub mod models;
pub mod notify;
pub mod prefs;
pub mod session;
pub mod types;

pub use api::{ApiConfig, ApiError, Backend, HttpBackend};
pub use client::{Command, VersePointClient};
pub use documents::UploadOutcome;
pub use error::ClientError;
pub use notify::{Event, NullPresenter, Presenter, Progress, Severity};
pub use prefs::{PrefValue, PreferenceStore, ThemeMode};
pub use session::{Session, SessionSnapshot};
pub use types::{Document, DocumentKind, DocumentStatus, FileUpload, Message, User};

/// Installs a plain `tracing` subscriber for embedders that have none.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();
}
