//! Single-flight question answering over the session transcript.

use std::sync::Arc;

use crate::api::Backend;
use crate::error::ClientError;
use crate::notify::{Event, Presenter};
use crate::session::Session;
use crate::types::Message;

pub struct Conversation {
    session: Arc<Session>,
    backend: Arc<dyn Backend>,
    presenter: Arc<dyn Presenter>,
}

impl Conversation {
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

    /// Asks the backend one question against the uploaded documents.
    ///
    /// The question is appended to the transcript before the request goes
    /// out; on failure it stays there alone and no answer is appended. The
    /// answering flag is armed inside the precondition check and released
    /// when the pending question drops, whichever way this function exits.
    pub async fn ask(&self, question: &str) -> Result<Message, ClientError> {
        let pending = match Session::accept_question(&self.session, question) {
            Ok(pending) => pending,
            Err(err) => {
                self.presenter.present(Event::error(rejection_notice(&err)));
                return Err(err);
            }
        };

        self.presenter.present(Event::Thinking { active: true });
        let result = self
            .backend
            .ask(&pending.token, &pending.content, &pending.model)
            .await;
        self.presenter.present(Event::Thinking { active: false });

        match result {
            Ok(payload) => {
                let answer = Message::answer(
                    payload.answer,
                    payload.sources,
                    payload.confidence,
                    &pending.model,
                );
                if !self.session.push_answer(pending.epoch, answer.clone()) {
                    tracing::debug!("discarding answer for a superseded session");
                    self.presenter.present(Event::AnswerDiscarded);
                    return Err(ClientError::SessionChanged);
                }
                self.presenter.present(Event::AnswerReady {
                    message: answer.clone(),
                });
                Ok(answer)
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.presenter
                    .present(Event::error(format!("Chat error: {}", err.message)));
                Err(err.into())
            }
        }
    }
}

/// User-facing wording for pre-flight rejections.
fn rejection_notice(err: &ClientError) -> String {
    match err {
        ClientError::Unauthenticated => "Please log in to ask questions".to_string(),
        ClientError::NoDocuments => "Please upload some documents first".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::rejection_notice;
    use crate::error::ClientError;

    #[test]
    fn rejections_have_user_facing_wording() {
        assert_eq!(
            rejection_notice(&ClientError::Unauthenticated),
            "Please log in to ask questions"
        );
        assert_eq!(
            rejection_notice(&ClientError::NoDocuments),
            "Please upload some documents first"
        );
        assert_eq!(
            rejection_notice(&ClientError::EmptyQuestion),
            "question is empty"
        );
    }
}
