use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No active session")]
    Session,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Network error")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response")]
    Decode(#[from] serde_json::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Text shown to the user in alerts and stored in hook `error` fields.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Http(err) => format!("Network error: {err}"),
            _ => self.to_string(),
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self, AppError::Session)
    }
}

pub type AppResult<T> = Result<T, AppError>;
