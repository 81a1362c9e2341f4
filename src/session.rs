//! The single source of truth for the client's mutable state.
//!
//! Every other component reads and writes through the operations here; no
//! field is reachable from outside, which keeps the invariants (single-flight
//! answering, atomic logout, known active model) enforceable in one place.
//!
//! Each login or logout bumps an epoch counter. Work that suspends on the
//! network captures the epoch when it starts and merges its result only if
//! the epoch is unchanged, so a response that lands after a logout (or after
//! a different user logged in) is discarded instead of being applied to the
//! wrong session.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ClientError;
use crate::models::{self, ModelInfo};
use crate::types::{Document, Message, User};

struct AuthState {
    token: String,
    user: User,
}

// Keep the raw token out of debug output and logs.
impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug)]
struct State {
    auth: Option<AuthState>,
    documents: Vec<Document>,
    chat_history: Vec<Message>,
    active_model: String,
    answering: bool,
    epoch: u64,
}

#[derive(Debug)]
pub struct Session {
    state: Mutex<State>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only copy for presentation. Deliberately omits the auth token.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub logged_in: bool,
    pub user: Option<User>,
    pub documents: Vec<Document>,
    pub chat_history: Vec<Message>,
    pub active_model: String,
    pub answering: bool,
}

/// An accepted question, ready to be sent. Holds the single-flight guard:
/// dropping it releases the answering flag on every exit path.
#[derive(Debug)]
pub struct PendingQuestion {
    pub content: String,
    pub token: String,
    pub model: String,
    pub epoch: u64,
    _guard: AnsweringGuard,
}

#[derive(Debug)]
struct AnsweringGuard {
    session: Arc<Session>,
    epoch: u64,
}

impl Drop for AnsweringGuard {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        // A newer epoch owns the flag now; leave it alone.
        if state.epoch == self.epoch {
            state.answering = false;
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                auth: None,
                documents: Vec::new(),
                chat_history: Vec::new(),
                active_model: models::DEFAULT_MODEL_ID.to_string(),
                answering: false,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("session state poisoned")
    }

    /// Installs a fresh identity. Collections start empty and are filled by
    /// the mandatory reload that follows login/register.
    pub fn install(&self, token: String, user: User) -> u64 {
        let mut state = self.lock();
        state.auth = Some(AuthState { token, user });
        state.documents.clear();
        state.chat_history.clear();
        state.answering = false;
        state.epoch += 1;
        state.epoch
    }

    /// Clears token, user, documents and transcript in one step. Idempotent;
    /// returns whether a session was actually active.
    pub fn clear(&self) -> bool {
        let mut state = self.lock();
        let was_active = state.auth.is_some();
        state.auth = None;
        state.documents.clear();
        state.chat_history.clear();
        state.answering = false;
        state.epoch += 1;
        was_active
    }

    /// Token plus the epoch it belongs to, or `Unauthenticated`.
    pub fn authorized(&self) -> Result<(String, u64), ClientError> {
        let state = self.lock();
        match &state.auth {
            Some(auth) => Ok((auth.token.clone(), state.epoch)),
            None => Err(ClientError::Unauthenticated),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    pub fn active_model(&self) -> String {
        self.lock().active_model.clone()
    }

    pub fn set_active_model(&self, id: &str) -> Result<&'static ModelInfo, ClientError> {
        let model = models::find(id).ok_or_else(|| ClientError::InvalidModel(id.to_string()))?;
        self.lock().active_model = model.id.to_string();
        Ok(model)
    }

    /// Wholesale replacement from a full sync. No-op when the fetch was
    /// issued under a previous session.
    pub fn replace_collections(
        &self,
        epoch: u64,
        documents: Vec<Document>,
        chat_history: Vec<Message>,
    ) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state.documents = documents;
        state.chat_history = chat_history;
        true
    }

    /// Most-recently-uploaded first. No-op on a stale epoch.
    pub fn prepend_document(&self, epoch: u64, document: Document) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state.documents.insert(0, document);
        true
    }

    /// Appends the answer matching an in-flight question. No-op on a stale
    /// epoch (the question it would pair with is gone).
    pub fn push_answer(&self, epoch: u64, message: Message) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state.chat_history.push(message);
        true
    }

    /// Atomically checks every ask precondition, appends the question to the
    /// transcript and arms the single-flight guard. The transcript gains the
    /// question before the caller reaches its first suspension point.
    pub fn accept_question(
        session: &Arc<Session>,
        raw: &str,
    ) -> Result<PendingQuestion, ClientError> {
        let content = raw.trim();
        let mut state = session.lock();
        let token = match &state.auth {
            Some(auth) => auth.token.clone(),
            None => return Err(ClientError::Unauthenticated),
        };
        if content.is_empty() {
            return Err(ClientError::EmptyQuestion);
        }
        if state.documents.is_empty() {
            return Err(ClientError::NoDocuments);
        }
        if state.answering {
            return Err(ClientError::AlreadyAnswering);
        }

        let model = state.active_model.clone();
        let epoch = state.epoch;
        state.answering = true;
        state.chat_history.push(Message::question(content, &model));
        drop(state);

        Ok(PendingQuestion {
            content: content.to_string(),
            token,
            model,
            epoch,
            _guard: AnsweringGuard {
                session: Arc::clone(session),
                epoch,
            },
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            logged_in: state.auth.is_some(),
            user: state.auth.as_ref().map(|auth| auth.user.clone()),
            documents: state.documents.clone(),
            chat_history: state.chat_history.clone(),
            active_model: state.active_model.clone(),
            answering: state.answering,
        }
    }
}
