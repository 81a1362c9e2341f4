//! Upload validation and document/transcript synchronization.

use std::sync::Arc;

use futures::future::join_all;

use crate::api::{ApiResult, Backend};
use crate::error::ClientError;
use crate::notify::{Event, Presenter, Progress};
use crate::session::Session;
use crate::types::{Document, FileUpload, Message};

/// Per-file result of a batch submission, keyed by the original filename so
/// failures can be correlated back to what the user picked.
#[derive(Debug)]
pub struct UploadOutcome {
    pub filename: String,
    pub result: Result<Document, ClientError>,
}

pub struct DocumentLifecycle {
    session: Arc<Session>,
    backend: Arc<dyn Backend>,
    presenter: Arc<dyn Presenter>,
}

impl DocumentLifecycle {
    pub fn new(
        session: Arc<Session>,
        backend: Arc<dyn Backend>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            session,
            backend,
            presenter,
        }
    }

    /// Full sync: fetches the document list and chat history and replaces
    /// the session's sequences wholesale. A 401/403 means the token is no
    /// longer valid; the session is cleared instead of surfacing the error.
    pub async fn load_all(&self) -> Result<(), ClientError> {
        let (token, epoch) = self.session.authorized()?;
        match self.fetch_both(&token).await {
            Ok((documents, chat_history)) => {
                if !self.session.replace_collections(epoch, documents, chat_history) {
                    tracing::debug!("discarding sync results for a superseded session");
                }
                Ok(())
            }
            Err(err) if err.is_auth_rejection() => {
                tracing::warn!(status = err.status, "stored token rejected, clearing session");
                self.session.clear();
                self.presenter.present(Event::SessionExpired);
                Ok(())
            }
            Err(err) => {
                self.presenter
                    .present(Event::error(format!("Failed to load your data: {}", err.message)));
                Err(err.into())
            }
        }
    }

    async fn fetch_both(&self, token: &str) -> ApiResult<(Vec<Document>, Vec<Message>)> {
        let documents = self.backend.documents(token).await?;
        let chat_history = self.backend.chat_history(token).await?;
        Ok((documents, chat_history))
    }

    /// Validates the batch against the supported-extension allow-list, then
    /// uploads every accepted file concurrently. Files that fail the filter
    /// are reported individually and never reach the network; an empty
    /// accepted set is a validation failure with no network call at all.
    pub async fn submit(&self, files: Vec<FileUpload>) -> Result<Vec<UploadOutcome>, ClientError> {
        let (token, epoch) = match self.session.authorized() {
            Ok(authorized) => authorized,
            Err(err) => {
                self.presenter
                    .present(Event::error("Please log in to upload files"));
                return Err(err);
            }
        };

        let mut accepted = Vec::new();
        for file in files {
            if file.kind().is_some() {
                accepted.push(file);
            } else {
                tracing::debug!(filename = %file.filename, "rejecting unsupported file");
                self.presenter.present(Event::UploadRejected {
                    filename: file.filename,
                });
            }
        }
        if accepted.is_empty() {
            self.presenter
                .present(Event::error("Please select valid files (PDF, MD, HTML)"));
            return Err(ClientError::NoValidFiles);
        }

        // Uploads within a batch run concurrently; each one carries its own
        // start/progress/completion sequence and there is no ordering
        // guarantee between files.
        let uploads = accepted
            .into_iter()
            .map(|file| self.upload_one(&token, epoch, file));
        Ok(join_all(uploads).await)
    }

    async fn upload_one(&self, token: &str, epoch: u64, file: FileUpload) -> UploadOutcome {
        let filename = file.filename.clone();
        self.presenter.present(Event::UploadStarted {
            filename: filename.clone(),
        });
        self.presenter.present(Event::UploadProgress {
            filename: filename.clone(),
            progress: Progress::Indeterminate,
        });

        match self.backend.upload(token, file).await {
            Ok(document) => {
                if !self.session.prepend_document(epoch, document.clone()) {
                    tracing::debug!(%filename, "discarding upload for a superseded session");
                    self.presenter.present(Event::UploadDiscarded {
                        filename: filename.clone(),
                    });
                    return UploadOutcome {
                        filename,
                        result: Err(ClientError::SessionChanged),
                    };
                }
                // The only 100% is a confirmed one.
                self.presenter.present(Event::UploadProgress {
                    filename: filename.clone(),
                    progress: Progress::Complete,
                });
                self.presenter.present(Event::UploadCompleted {
                    filename: filename.clone(),
                    document: document.clone(),
                });
                self.presenter.present(Event::success(format!(
                    "{filename} uploaded and processed successfully!"
                )));
                UploadOutcome {
                    filename,
                    result: Ok(document),
                }
            }
            Err(err) => {
                tracing::warn!(%filename, error = %err, "upload failed");
                self.presenter.present(Event::UploadFailed {
                    filename: filename.clone(),
                    message: err.message.clone(),
                });
                self.presenter
                    .present(Event::error(format!("Upload failed: {}", err.message)));
                UploadOutcome {
                    filename,
                    result: Err(err.into()),
                }
            }
        }
    }
}
