use serde::{Deserialize, Serialize};

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Session errors
/// - E2xxx: Report errors
/// - E3xxx: Backup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    Forbidden,
    StorageError,

    // Session (E1xxx)
    InvalidCredentials,
    NotAuthenticated,
    UsernameTaken,

    // Reports (E2xxx)
    ReportNotFound,
    DescriptionRequired,
    InvalidTransition,
    PhotoTooLarge,
    PhotoUnreadable,

    // Backup (E3xxx)
    InvalidBackup,
}

/// The caller-facing failure classes. Every [`ErrorCode`] belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    Conflict,
    NotFound,
    InvalidBackup,
    Internal,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::Forbidden => "E0003",
            Self::StorageError => "E0004",

            // Session
            Self::InvalidCredentials => "E1001",
            Self::NotAuthenticated => "E1002",
            Self::UsernameTaken => "E1003",

            // Reports
            Self::ReportNotFound => "E2001",
            Self::DescriptionRequired => "E2002",
            Self::InvalidTransition => "E2003",
            Self::PhotoTooLarge => "E2004",
            Self::PhotoUnreadable => "E2005",

            // Backup
            Self::InvalidBackup => "E3001",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InternalError | Self::StorageError => ErrorKind::Internal,
            // An anonymous submit is a missing required field (the reporter).
            Self::ValidationError | Self::NotAuthenticated | Self::DescriptionRequired
            | Self::InvalidTransition | Self::PhotoTooLarge | Self::PhotoUnreadable => ErrorKind::Validation,
            Self::ReportNotFound => ErrorKind::NotFound,
            Self::InvalidCredentials => ErrorKind::Authentication,
            Self::Forbidden => ErrorKind::Authorization,
            Self::UsernameTaken => ErrorKind::Conflict,
            Self::InvalidBackup => ErrorKind::InvalidBackup,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
    },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),

    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }

    /// Emit one tracing event for this failure, severity by kind.
    pub fn log(&self) {
        let code = self.code().code();
        match self {
            AppError::Internal(err) => {
                tracing::error!(code, error = %err, "internal error");
            }
            _ if self.kind() == ErrorKind::Internal => {
                tracing::error!(code, "{self}");
            }
            _ => {
                tracing::warn!(code, kind = ?self.kind(), "{self}");
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
