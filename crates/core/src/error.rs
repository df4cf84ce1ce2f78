use crate::store::StoreError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid schema document for {kind}: {source}")]
    Schema {
        kind: &'static str,
        #[source]
        source: questionnaire::QuestionnaireError,
    },

    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    #[error("record store did not respond within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    RetryConfig(#[from] directory_retry::RetryConfigError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
