use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayError {
    #[error("missing {key} in environment")]
    MissingEnvVar { key: &'static str },

    #[error("invalid value for {key}: `{value}` ({reason})")]
    InvalidConfigValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid expiration date format: `{0}`")]
    InvalidExpiration(String),

    #[error("cards file not found: {}", path.display())]
    CardsFileNotFound { path: PathBuf },

    #[error(
        "cards file needs either expMonth/expYear columns or one of expiration, exp, expirationDate"
    )]
    MissingExpirationColumns,

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("portal quoted a {quoted}% transaction fee but applied {applied}%")]
    FeeMismatch { quoted: Decimal, applied: Decimal },

    #[error("expected a total charge of {expected} but the portal shows {actual}")]
    TotalMismatch { expected: Decimal, actual: Decimal },

    #[error("payment submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    #[error("could not read the transaction fee percent from the portal")]
    FeeUndiscoverable,
}

/// Coarse error tag used to pick the recovery branch and the exit code.
/// `CardsLoad` is the only recoverable kind, and only at batch-load time:
/// the caller may switch to manual card entry instead of aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    CardsLoad,
    Session,
    Io,
}

impl PayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PayError::MissingEnvVar { .. } | PayError::InvalidConfigValue { .. } => {
                ErrorCategory::Config
            }
            PayError::InvalidExpiration(_)
            | PayError::CardsFileNotFound { .. }
            | PayError::MissingExpirationColumns
            | PayError::Csv(_) => ErrorCategory::CardsLoad,
            PayError::FeeMismatch { .. }
            | PayError::TotalMismatch { .. }
            | PayError::SubmissionRejected { .. }
            | PayError::FeeUndiscoverable => ErrorCategory::Session,
            PayError::Io(_) => ErrorCategory::Io,
        }
    }

    pub fn is_recoverable_load(&self) -> bool {
        self.category() == ErrorCategory::CardsLoad
    }
}

pub type Result<T> = std::result::Result<T, PayError>;
