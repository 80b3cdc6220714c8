//! Sealing engine for cluster secret management
//!
//! Seals plaintext secret values into ciphertext only the holder of the
//! matching private key can unseal, in the wire format the unsealing
//! controller expects. Hybrid scheme: a fresh AES-256-GCM session key
//! protects the payload, RSA-OAEP-SHA256 protects the session key, and a
//! scope-derived label is authenticated into both steps so a sealed value
//! cannot be replayed under another name or namespace.
//!
//! Blob format: `[wrapped_key_len:2 BE][wrapped_key][nonce:12][ciphertext][tag:16]`,
//! base64-encoded.
//!
//! # Example
//!
//! ```rust,ignore
//! use seal_engine::{seal_one, Scope};
//!
//! let sealed = seal_one("example", "default", Scope::Strict, cert_pem, "hunter2")?;
//! println!("{sealed}");
//! ```
//!
//! Sealing is deliberately non-idempotent: every call draws fresh
//! randomness, so resealing unchanged inputs still produces new ciphertext.
//! Callers tracking drift must compare plaintexts, never ciphertexts.

mod error;
pub mod hybrid;
mod key;
mod label;
pub mod orchestrator;

pub use error::{CryptoError, KeyError, SealError, ValidationError};
pub use hybrid::{LEN_PREFIX_LEN, NONCE_LEN, SESSION_KEY_LEN, TAG_LEN};
pub use key::{load_sealing_key, SealingKey};
pub use label::{encryption_label, Scope};
pub use orchestrator::{
    seal, seal_with_rng, SealOutput, SealPayload, SealRequest, SealResult, SealedItem,
};

use std::collections::BTreeMap;

/// Seal a single plaintext value.
///
/// Convenience wrapper over [`orchestrator::seal`] taking plain values, for
/// callers that do not need the completion timestamp.
pub fn seal_one(
    name: &str,
    namespace: &str,
    scope: Scope,
    pubkey_pem: &str,
    plaintext: &str,
) -> Result<SealedItem, SealError> {
    let request = SealRequest {
        name: name.to_string(),
        namespace: namespace.to_string(),
        scope,
        pubkey_pem: pubkey_pem.to_string(),
        payload: SealPayload::Single(plaintext.to_string()),
    };
    match orchestrator::seal(&request)?.sealed {
        SealOutput::Single(item) => Ok(item),
        SealOutput::Map(_) => unreachable!("single payload always yields a single output"),
    }
}

/// Seal every value of a key→plaintext mapping under one shared label.
///
/// The key is parsed once for the whole mapping. Fails on the first item
/// that cannot be sealed, identifying it; no partial mapping is returned.
pub fn seal_many(
    name: &str,
    namespace: &str,
    scope: Scope,
    pubkey_pem: &str,
    values: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, SealedItem>, SealError> {
    let request = SealRequest {
        name: name.to_string(),
        namespace: namespace.to_string(),
        scope,
        pubkey_pem: pubkey_pem.to_string(),
        payload: SealPayload::Map(values.clone()),
    };
    match orchestrator::seal(&request)?.sealed {
        SealOutput::Map(sealed) => Ok(sealed),
        SealOutput::Single(_) => unreachable!("map payload always yields a map output"),
    }
}
