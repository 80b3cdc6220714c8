//! Sealing public key loading
//!
//! The sealing key arrives as a PEM-encoded certificate bundle (the format
//! the unsealing controller publishes). Only the first certificate in the
//! bundle is used; its subject key must be RSA and the certificate must not
//! have expired.

use chrono::{DateTime, Utc};
use rsa::{BigUint, RsaPublicKey};
use x509_parser::pem::Pem;
use x509_parser::public_key::PublicKey;

use crate::error::KeyError;

/// An RSA sealing key together with its source certificate's expiry.
///
/// Parsed fresh for every seal call and discarded afterwards; never cached.
#[derive(Debug, Clone)]
pub struct SealingKey {
    public_key: RsaPublicKey,
    not_after: DateTime<Utc>,
}

impl SealingKey {
    /// The RSA public key used to wrap session keys.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Expiry of the certificate the key was extracted from.
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }
}

/// Parse a PEM certificate bundle into a sealing key.
///
/// Non-certificate PEM blocks are skipped; of the certificate blocks only
/// the first is used. Fails if the bundle contains no certificate, the
/// certificate does not carry an RSA key, or the certificate has expired.
pub fn load_sealing_key(pem_text: &str) -> Result<SealingKey, KeyError> {
    let block = first_certificate_block(pem_text.as_bytes())?;
    let cert = block
        .parse_x509()
        .map_err(|e| KeyError::Parse(e.to_string()))?;

    let rsa = match cert.public_key().parsed() {
        Ok(PublicKey::RSA(rsa)) => rsa,
        Ok(other) => {
            return Err(KeyError::UnsupportedKeyType {
                found: key_type_name(&other).to_string(),
            })
        }
        Err(e) => return Err(KeyError::Parse(e.to_string())),
    };

    let public_key = RsaPublicKey::new(
        BigUint::from_bytes_be(rsa.modulus),
        BigUint::from_bytes_be(rsa.exponent),
    )
    .map_err(|e| KeyError::Parse(e.to_string()))?;

    let not_after = DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
        .ok_or_else(|| KeyError::Parse("certificate NotAfter out of range".to_string()))?;

    if Utc::now() > not_after {
        return Err(KeyError::Expired { not_after });
    }

    Ok(SealingKey {
        public_key,
        not_after,
    })
}

fn first_certificate_block(input: &[u8]) -> Result<Pem, KeyError> {
    for block in Pem::iter_from_buffer(input) {
        let block = block.map_err(|e| KeyError::Parse(e.to_string()))?;
        if block.label == "CERTIFICATE" {
            return Ok(block);
        }
    }
    Err(KeyError::Parse(
        "no CERTIFICATE block found in PEM input".to_string(),
    ))
}

fn key_type_name(key: &PublicKey) -> &'static str {
    match key {
        PublicKey::RSA(_) => "RSA",
        PublicKey::EC(_) => "EC",
        PublicKey::DSA(_) => "DSA",
        PublicKey::GostR3410(_) => "GOST R 34.10-94",
        PublicKey::GostR3410_2012(_) => "GOST R 34.10-2012",
        PublicKey::Unknown(_) => "unknown",
    }
}
