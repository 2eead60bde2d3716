use thiserror::Error;

/// Failures raised by the table behind [`crate::store::ItemStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Put(String),

    #[error("{0}")]
    Scan(String),

    /// An attribute came back in a shape that has no JSON form.
    #[error("cannot read attribute `{attribute}`: {reason}")]
    Unmarshal { attribute: String, reason: String },
}

/// Everything that turns a request into a 500.
///
/// Malformed bodies and store failures are reported to the caller the same
/// way; the variants only exist so the logs can tell them apart.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
