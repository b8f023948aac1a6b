use thiserror::Error;

/// Errors surfaced by the RPC client. `retry_rpc` retries every variant
/// uniformly, up to its backoff ceiling, rather than branching on kind.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("json-rpc error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("block not found or missing timestamp: {0}")]
    MissingTimestamp(u64),
}

/// Top-level pipeline error. `Validation` and `Store` (non-idempotent)
/// variants abort the current block-range batch without advancing the
/// checkpoint; `Rpc` is only surfaced after the retry budget is exhausted.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("validation error: field '{field}' has invalid value '{value}'")]
    Validation { field: String, value: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IndexError {
    pub fn validation(field: impl Into<String>, value: impl Into<String>) -> Self {
        IndexError::Validation {
            field: field.into(),
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
