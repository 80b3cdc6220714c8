//! Seal request orchestration
//!
//! Drives one seal call end to end: load the key once, derive the label
//! once, then seal a single value or every value of a mapping. The first
//! failing item aborts the whole call; no partial result ever escapes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::{CryptoError, SealError};
use crate::hybrid;
use crate::key::load_sealing_key;
use crate::label::{encryption_label, Scope};

/// One seal invocation's inputs.
///
/// All items of a map payload share the request's (name, namespace, scope)
/// identity and are sealed under one label.
#[derive(Debug, Clone)]
pub struct SealRequest {
    pub name: String,
    pub namespace: String,
    pub scope: Scope,
    pub pubkey_pem: String,
    pub payload: SealPayload,
}

/// Either a single plaintext or a key→plaintext mapping.
///
/// The map is ordered by key so multi-value requests behave the same on
/// every run.
#[derive(Debug, Clone)]
pub enum SealPayload {
    Single(String),
    Map(BTreeMap<String, String>),
}

/// Base64 ciphertext blob for one sealed plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedItem(pub(crate) String);

impl SealedItem {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SealedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sealed output, shaped like the request payload.
#[derive(Debug, Clone)]
pub enum SealOutput {
    Single(SealedItem),
    Map(BTreeMap<String, SealedItem>),
}

/// The outcome of a successful seal call.
#[derive(Debug, Clone)]
pub struct SealResult {
    pub sealed: SealOutput,
    pub completed_at: DateTime<Utc>,
}

/// Seal a request using the operating system's secure random source.
pub fn seal(request: &SealRequest) -> Result<SealResult, SealError> {
    seal_with_rng(&mut OsRng, request)
}

/// Seal a request with an injected random source.
///
/// The key is parsed exactly once per call no matter how many items the
/// payload holds, and the label is derived once and reused for every item.
pub fn seal_with_rng<R>(rng: &mut R, request: &SealRequest) -> Result<SealResult, SealError>
where
    R: RngCore + CryptoRng,
{
    let sealing_key = load_sealing_key(&request.pubkey_pem)?;
    let label = encryption_label(&request.name, &request.namespace, request.scope)?;

    let sealed = match &request.payload {
        SealPayload::Single(plaintext) => SealOutput::Single(SealedItem(
            hybrid::seal(rng, sealing_key.public_key(), plaintext.as_bytes(), &label)
                .map_err(SealError::Crypto)?,
        )),
        SealPayload::Map(values) => SealOutput::Map(seal_map(values, |_, plaintext| {
            hybrid::seal(rng, sealing_key.public_key(), plaintext, &label)
        })?),
    };

    Ok(SealResult {
        sealed,
        completed_at: Utc::now(),
    })
}

/// Seal every item of a mapping, aborting on the first failure with the
/// offending item key. Items already sealed are dropped on failure.
fn seal_map<F>(
    values: &BTreeMap<String, String>,
    mut seal_item: F,
) -> Result<BTreeMap<String, SealedItem>, SealError>
where
    F: FnMut(&str, &[u8]) -> Result<String, CryptoError>,
{
    let mut sealed = BTreeMap::new();
    for (key, plaintext) in values {
        match seal_item(key, plaintext.as_bytes()) {
            Ok(blob) => {
                sealed.insert(key.clone(), SealedItem(blob));
            }
            Err(cause) => {
                return Err(SealError::Item {
                    key: key.clone(),
                    source: cause,
                })
            }
        }
    }
    Ok(sealed)
}
