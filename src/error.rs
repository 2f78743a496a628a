use std::fmt;

use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

/// Failure classes for the external text-generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorCode {
    MissingApiKey,
    Unauthorized,
    HttpTimeout,
    RateLimited,
    InvalidResponse,
    InvalidRequest,
    ServiceUnavailable,
    Unknown,
}

impl GenerationErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationErrorCode::MissingApiKey => "MISSING_API_KEY",
            GenerationErrorCode::Unauthorized => "UNAUTHORIZED",
            GenerationErrorCode::HttpTimeout => "HTTP_TIMEOUT",
            GenerationErrorCode::RateLimited => "RATE_LIMITED",
            GenerationErrorCode::InvalidResponse => "INVALID_RESPONSE",
            GenerationErrorCode::InvalidRequest => "INVALID_REQUEST",
            GenerationErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            GenerationErrorCode::Unknown => "UNKNOWN_GENERATION_ERROR",
        }
    }
}

impl fmt::Display for GenerationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {message}")]
    Input { message: String },

    #[error("server configuration error: {message}")]
    Config { message: String },

    #[error("schedule validation error: {message}")]
    Validation { message: String },

    #[error("{message}")]
    Generation {
        code: GenerationErrorCode,
        message: String,
        correlation_id: Option<String>,
    },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::input", %message, "input rejected");
        AppError::Input { message }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::config", %message, "configuration error");
        AppError::Config { message }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation { message }
    }

    pub fn generation(code: GenerationErrorCode, message: impl Into<String>) -> Self {
        Self::generation_with_correlation(code, message, None)
    }

    pub fn generation_with_correlation(
        code: GenerationErrorCode,
        message: impl Into<String>,
        correlation_id: Option<&str>,
    ) -> Self {
        let message = message.into();
        let correlation = correlation_id.map(|value| value.to_string());
        match &correlation {
            Some(id) => {
                warn!(target: "app::ai::error", code = %code, correlation_id = %id, %message);
            }
            None => {
                warn!(target: "app::ai::error", code = %code, %message);
            }
        }

        AppError::Generation {
            code,
            message,
            correlation_id: correlation,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::cache", %message, "storage error");
        AppError::Storage { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn generation_code(&self) -> Option<GenerationErrorCode> {
        match self {
            AppError::Generation { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            AppError::Generation { correlation_id, .. } => correlation_id.as_deref(),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        error!(target: "app::cache", error = ?error, "sqlite error");
        AppError::storage(error.to_string())
    }
}
