//! Outcome reporting towards whatever is rendering the client.
//!
//! The core never touches a screen; it emits typed events into a
//! [`Presenter`] sink and the embedding application decides how to show
//! them (toast, status bar, nothing at all).

use crate::prefs::ThemeMode;
use crate::types::{Document, Message, User};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Upload progress is advisory. Plain HTTP uploads cannot observe transfer
/// progress, so the normal sequence is `Indeterminate` followed by a final
/// `Complete` once the backend has confirmed the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Indeterminate,
    Percent(u8),
    Complete,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Notice { severity: Severity, message: String },
    Thinking { active: bool },

    SessionInstalled { user: User },
    SessionCleared,
    /// The backend rejected a stored token; the session has been cleared.
    SessionExpired,

    ModelSwitched { id: String, name: String },
    PreferenceUpdated { key: String },
    ThemeChanged { theme: ThemeMode },

    UploadStarted { filename: String },
    UploadProgress { filename: String, progress: Progress },
    UploadCompleted { filename: String, document: Document },
    UploadFailed { filename: String, message: String },
    /// Filtered out before any network call (unsupported extension).
    UploadRejected { filename: String },
    /// Finished after the session it was started under went away.
    UploadDiscarded { filename: String },

    AnswerReady { message: Message },
    AnswerDiscarded,
}

impl Event {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Notice {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Notice {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

pub trait Presenter: Send + Sync {
    fn present(&self, event: Event);
}

/// Swallows everything. Useful for embedders that only read snapshots.
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&self, _event: Event) {}
}

/// Forwards events to `tracing`, for headless or diagnostic use.
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn present(&self, event: Event) {
        match &event {
            Event::Notice {
                severity: Severity::Error,
                message,
            } => tracing::warn!(%message, "notice"),
            Event::Notice { message, .. } => tracing::info!(%message, "notice"),
            other => tracing::debug!(event = ?other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_helpers_set_severity() {
        assert_eq!(
            Event::success("done"),
            Event::Notice {
                severity: Severity::Success,
                message: "done".into()
            }
        );
        assert_eq!(
            Event::error("nope"),
            Event::Notice {
                severity: Severity::Error,
                message: "nope".into()
            }
        );
    }
}
