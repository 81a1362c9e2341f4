//! The orchestration facade: wires the session, gateway, managers,
//! preference store and presenter together and exposes the operations a
//! front end drives, either directly as methods or through the typed
//! [`Command`] interface.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{Backend, HttpBackend};
use crate::conversation::Conversation;
use crate::documents::{DocumentLifecycle, UploadOutcome};
use crate::error::ClientError;
use crate::notify::{Event, Presenter};
use crate::prefs::{PrefValue, PreferenceStore, ThemeMode};
use crate::session::{Session, SessionSnapshot};
use crate::types::{FileUpload, Message};

/// Client-side floor, checked before the request is built.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Typed commands a front end can hand to [`VersePointClient::execute`]
/// instead of binding UI callbacks to individual methods.
#[derive(Clone, Debug)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        username: String,
        password: String,
    },
    Logout,
    SetModel {
        model_id: String,
    },
    SubmitFiles {
        files: Vec<FileUpload>,
    },
    AskQuestion {
        question: String,
    },
    SetPreference {
        key: String,
        value: PrefValue,
    },
    TogglePreference {
        key: String,
    },
    ToggleTheme,
}

pub struct VersePointClient {
    session: Arc<Session>,
    backend: Arc<dyn Backend>,
    presenter: Arc<dyn Presenter>,
    documents: DocumentLifecycle,
    conversation: Conversation,
    prefs: Mutex<PreferenceStore>,
}

impl VersePointClient {
    pub fn new(
        backend: Arc<dyn Backend>,
        presenter: Arc<dyn Presenter>,
        prefs: PreferenceStore,
    ) -> Self {
        let session = Arc::new(Session::new());
        let documents = DocumentLifecycle::new(
            Arc::clone(&session),
            Arc::clone(&backend),
            Arc::clone(&presenter),
        );
        let conversation = Conversation::new(
            Arc::clone(&session),
            Arc::clone(&backend),
            Arc::clone(&presenter),
        );
        Self {
            session,
            backend,
            presenter,
            documents,
            conversation,
            prefs: Mutex::new(prefs),
        }
    }

    /// Production wiring: HTTP backend from the environment, preferences in
    /// the platform data directory.
    pub fn from_env(presenter: Arc<dyn Presenter>) -> anyhow::Result<Self> {
        let backend = Arc::new(HttpBackend::from_env()?);
        Ok(Self::new(backend, presenter, PreferenceStore::open_default()))
    }

    fn prefs(&self) -> MutexGuard<'_, PreferenceStore> {
        self.prefs.lock().expect("preference store poisoned")
    }

    // ============================================
    // Authentication
    // ============================================

    /// Authenticates and reloads documents and chat history before
    /// returning, so a successful login means the session is ready.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let auth = match self.backend.login(username, password).await {
            Ok(auth) => auth,
            Err(err) => {
                self.presenter
                    .present(Event::error(format!("Login failed: {}", err.message)));
                return Err(err.into());
            }
        };
        self.session.install(auth.token, auth.user.clone());
        self.presenter
            .present(Event::SessionInstalled { user: auth.user });
        self.presenter
            .present(Event::success("Login successful! Welcome to Verse Point."));
        self.documents.load_all().await?;
        Ok(())
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            let err = ClientError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            };
            self.presenter.present(Event::error(err.to_string()));
            return Err(err);
        }
        let auth = match self.backend.register(name, email, username, password).await {
            Ok(auth) => auth,
            Err(err) => {
                self.presenter
                    .present(Event::error(format!("Signup failed: {}", err.message)));
                return Err(err.into());
            }
        };
        self.session.install(auth.token, auth.user.clone());
        self.presenter
            .present(Event::SessionInstalled { user: auth.user });
        self.presenter.present(Event::success(
            "Account created successfully! Welcome to Verse Point.",
        ));
        self.documents.load_all().await?;
        Ok(())
    }

    /// Idempotent. Clears the token, user, documents and transcript in one
    /// atomic step; any still-running request belongs to a dead epoch and
    /// its late result will be discarded.
    pub fn logout(&self) {
        if self.session.clear() {
            self.presenter.present(Event::SessionCleared);
            self.presenter.present(Event::success("Logged out successfully"));
        }
    }

    // ============================================
    // Models & Preferences
    // ============================================

    /// Switches the active model and mirrors its display name into the
    /// `defaultModel` preference.
    pub fn set_model(&self, model_id: &str) -> Result<(), ClientError> {
        let model = match self.session.set_active_model(model_id) {
            Ok(model) => model,
            Err(err) => {
                self.presenter.present(Event::error(err.to_string()));
                return Err(err);
            }
        };
        if let Err(err) = self
            .prefs()
            .set("defaultModel", PrefValue::Choice(model.name.to_string()))
        {
            tracing::warn!(error = %err, "could not persist model preference");
        }
        self.presenter.present(Event::ModelSwitched {
            id: model.id.to_string(),
            name: model.name.to_string(),
        });
        self.presenter
            .present(Event::success(format!("Switched to {}", model.name)));
        Ok(())
    }

    pub fn set_preference(&self, key: &str, value: PrefValue) -> Result<(), ClientError> {
        if let Err(err) = self.prefs().set(key, value) {
            self.presenter.present(Event::error(err.to_string()));
            return Err(err);
        }
        self.presenter.present(Event::PreferenceUpdated {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Flips a toggle preference. `darkMode` additionally drives the theme
    /// flag so the two stay in sync.
    pub fn toggle_preference(&self, key: &str) -> Result<bool, ClientError> {
        let flipped = {
            let mut prefs = self.prefs();
            let flipped = match prefs.toggle(key) {
                Ok(flipped) => flipped,
                Err(err) => {
                    self.presenter.present(Event::error(err.to_string()));
                    return Err(err);
                }
            };
            if key == "darkMode" {
                let theme = if flipped {
                    ThemeMode::Dark
                } else {
                    ThemeMode::Light
                };
                prefs.set_theme(theme);
                self.presenter.present(Event::ThemeChanged { theme });
            }
            flipped
        };
        self.presenter.present(Event::PreferenceUpdated {
            key: key.to_string(),
        });
        Ok(flipped)
    }

    pub fn toggle_theme(&self) -> ThemeMode {
        let theme = {
            let mut prefs = self.prefs();
            let theme = prefs.toggle_theme();
            // Keep the darkMode toggle mirroring the flag.
            let _ = prefs.set("darkMode", PrefValue::Bool(theme == ThemeMode::Dark));
            theme
        };
        self.presenter.present(Event::ThemeChanged { theme });
        self.presenter
            .present(Event::success("Theme updated successfully!"));
        theme
    }

    pub fn preference(&self, key: &str) -> Option<PrefValue> {
        self.prefs().get(key)
    }

    pub fn theme(&self) -> ThemeMode {
        self.prefs().theme()
    }

    // ============================================
    // Documents & Conversation
    // ============================================

    pub async fn submit_files(
        &self,
        files: Vec<FileUpload>,
    ) -> Result<Vec<UploadOutcome>, ClientError> {
        self.documents.submit(files).await
    }

    pub async fn ask(&self, question: &str) -> Result<Message, ClientError> {
        self.conversation.ask(question).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Dispatches a typed command to the matching operation.
    pub async fn execute(&self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::Login { username, password } => self.login(&username, &password).await,
            Command::Register {
                name,
                email,
                username,
                password,
            } => self.register(&name, &email, &username, &password).await,
            Command::Logout => {
                self.logout();
                Ok(())
            }
            Command::SetModel { model_id } => self.set_model(&model_id),
            Command::SubmitFiles { files } => self.submit_files(files).await.map(|_| ()),
            Command::AskQuestion { question } => self.ask(&question).await.map(|_| ()),
            Command::SetPreference { key, value } => self.set_preference(&key, value),
            Command::TogglePreference { key } => self.toggle_preference(&key).map(|_| ()),
            Command::ToggleTheme => {
                self.toggle_theme();
                Ok(())
            }
        }
    }
}
