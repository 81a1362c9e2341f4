use crate::api::ApiError;

/// Everything a public client operation can fail with.
///
/// Validation and concurrency failures are raised before any network call
/// and never mutate session state; `Api` carries whatever the backend (or
/// the transport) reported.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("not logged in")]
    Unauthenticated,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("no documents uploaded yet")]
    NoDocuments,

    #[error("a question is already being answered")]
    AlreadyAnswering,

    #[error("unknown model: {0}")]
    InvalidModel(String),

    #[error("no supported files selected (PDF, MD, HTML)")]
    NoValidFiles,

    #[error("invalid value {value:?} for setting {key:?}")]
    InvalidPreference { key: String, value: String },

    #[error("password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("the session changed while the request was in flight")]
    SessionChanged,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_the_backend_message() {
        let err = ClientError::from(ApiError {
            status: 500,
            message: "index unavailable".into(),
        });
        assert_eq!(err.to_string(), "api error 500: index unavailable");
    }
}
