use thiserror::Error;

/// Failures surfaced by the record, calc, report and import layers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    /// A foreign value (class name, student id, behavior id) does not resolve.
    #[error("{0}")]
    UnknownReference(String),

    #[error("{0}")]
    InUse(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Wire code carried in the `code` field of a failure response.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_failed",
            AppError::Duplicate(_) => "duplicate",
            AppError::UnknownReference(_) => "unknown_reference",
            AppError::InUse(_) => "in_use",
            AppError::NotFound { .. } => "not_found",
            AppError::InvalidCredentials => "auth_failed",
            AppError::Store(_) => "store_failed",
            AppError::Io(_) => "io_failed",
        }
    }

    /// Expected failures are user-input problems; the rest are logged as errors.
    pub fn is_expected(&self) -> bool {
        !matches!(self, AppError::Store(_) | AppError::Io(_))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
