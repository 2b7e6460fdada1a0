use thiserror::Error;

/// Why an authentication step was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No bearer token was supplied.
    MissingToken,
    /// A token was supplied but is malformed, badly signed or expired.
    InvalidToken,
    /// Login with an unknown email or a wrong password.
    InvalidCredentials,
}

#[derive(Error, Debug)]
pub enum FilmError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("authentication failed: {0:?}")]
    Auth(AuthFailure),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Collection is still loading")]
    NotReady,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FilmError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}

pub type Result<T> = std::result::Result<T, FilmError>;

impl From<serde_json::Error> for FilmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("JSON error: {err}"))
    }
}

impl From<tokio::task::JoinError> for FilmError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {err}"))
    }
}
