use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed declarative ui payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("server reported failure {statuscode}: {message}")]
    OcsFailure { statuscode: i64, message: String },
}

impl DocumentError {
    pub fn ocs_failure(statuscode: i64, message: impl Into<String>) -> Self {
        Self::OcsFailure {
            statuscode,
            message: message.into(),
        }
    }
}
