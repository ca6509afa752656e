use axum::http::StatusCode;
use std::path::PathBuf;

/// Failure of an aggregation call as a whole. Per-record problems never
/// surface here; they are skipped or counted as zero.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("invalid granularity '{0}': expected daily, weekly, monthly or yearly")]
    InvalidGranularity(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid dataset name '{0}'")]
    InvalidDatasetName(String),

    #[error("dataset '{0}' not found")]
    DatasetNotFound(String),

    #[error("column '{0}' not present in dataset header")]
    MissingColumn(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_BIND must be an IP address, got '{0}'")]
    InvalidBind(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<AggregateError> for AppError {
    fn from(err: AggregateError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidDatasetName(_) | SourceError::MissingColumn(_) => {
                Self::bad_request(err.to_string())
            }
            SourceError::DatasetNotFound(_) => Self::not_found(err.to_string()),
            SourceError::Io { .. } | SourceError::Csv(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
