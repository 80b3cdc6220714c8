use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from parsing and validating the sealing public key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("certificate parse error: {0}")]
    Parse(String),

    #[error("expected RSA public key but found {found}")]
    UnsupportedKeyType { found: String },

    #[error("cannot encrypt using a certificate that expired on {}", .not_after.format("%B %-d, %Y"))]
    Expired { not_after: DateTime<Utc> },
}

/// Errors from validating a seal request before any cryptography runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid sealing scope {0}, expected 0 (strict), 1 (namespace-wide) or 2 (cluster-wide)")]
    InvalidScope(i32),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Errors from the hybrid encryption step itself.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("session key wrap failed: {0}")]
    WrapFailed(String),

    #[error("payload encryption failed: {0}")]
    EncryptFailed(String),
}

/// Top-level error for a seal call. Multi-value failures carry the key of
/// the item that could not be sealed.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("failed to load sealing key: {0}")]
    Key(#[from] KeyError),

    #[error("invalid seal request: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to seal value: {0}")]
    Crypto(#[from] CryptoError),

    #[error("failed to seal item {key:?}: {source}")]
    Item {
        key: String,
        #[source]
        source: CryptoError,
    },
}
