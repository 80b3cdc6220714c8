//! Hybrid sealing using RSA-OAEP + AES-256-GCM
//!
//! Implements the sealed-secrets wire format:
//! - A fresh 256-bit session key encrypts the payload with AES-256-GCM,
//!   binding the authentication label as associated data
//! - The session key is wrapped under the recipient's RSA public key with
//!   OAEP-SHA256, binding the same label as the OAEP label
//!
//! Blob format: `[wrapped_key_len:2 BE][wrapped_key][nonce:12][ciphertext][tag:16]`,
//! base64-encoded (standard alphabet, padded).

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::{CryptoRng, RngCore};
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Size of the session key (AES-256)
pub const SESSION_KEY_LEN: usize = 32;
/// Size of the AES-GCM nonce
pub const NONCE_LEN: usize = 12;
/// Size of the AES-GCM authentication tag
pub const TAG_LEN: usize = 16;
/// Size of the big-endian wrapped-key length prefix
pub const LEN_PREFIX_LEN: usize = 2;

/// Seal a plaintext for the holder of the RSA private key.
///
/// Draws a fresh session key and nonce from `rng` on every call, so sealing
/// identical inputs twice produces different blobs; both unseal to the same
/// plaintext. The label is bound into both encryption steps — unsealing
/// under any other label fails authentication.
///
/// Returns the complete base64 blob, or an error and no output at all.
pub fn seal<R>(
    rng: &mut R,
    pubkey: &RsaPublicKey,
    plaintext: &[u8],
    label: &[u8],
) -> Result<String, CryptoError>
where
    R: RngCore + CryptoRng,
{
    let mut session_key = [0u8; SESSION_KEY_LEN];
    rng.fill_bytes(&mut session_key);

    let wrapped = wrap_session_key(rng, pubkey, &session_key, label);
    let cipher = Aes256Gcm::new_from_slice(&session_key)
        .map_err(|e| CryptoError::EncryptFailed(e.to_string()));
    // The cipher holds its own key schedule; the raw key bytes are done.
    session_key.zeroize();
    let wrapped = wrapped?;
    let cipher = cipher?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: label,
            },
        )
        .map_err(|_| CryptoError::EncryptFailed("AEAD encryption failed".to_string()))?;

    // wrapped key length equals the RSA modulus size, far below u16::MAX
    let mut blob =
        Vec::with_capacity(LEN_PREFIX_LEN + wrapped.len() + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&(wrapped.len() as u16).to_be_bytes());
    blob.extend_from_slice(&wrapped);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(&blob))
}

fn wrap_session_key<R>(
    rng: &mut R,
    pubkey: &RsaPublicKey,
    session_key: &[u8],
    label: &[u8],
) -> Result<Vec<u8>, CryptoError>
where
    R: RngCore + CryptoRng,
{
    // Labels are built from namespace/name strings and are always UTF-8.
    let label = std::str::from_utf8(label)
        .map_err(|_| CryptoError::WrapFailed("label is not valid UTF-8".to_string()))?;
    let padding = Oaep::new_with_label::<Sha256, _>(label);
    pubkey
        .encrypt(rng, padding, session_key)
        .map_err(|e| CryptoError::WrapFailed(e.to_string()))
}

/// Unseal a blob produced by [`seal`]. Test support only: the engine's
/// public surface never decrypts, but round-trip tests must.
#[cfg(test)]
pub(crate) fn open(
    privkey: &rsa::RsaPrivateKey,
    sealed_b64: &str,
    label: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let blob = STANDARD
        .decode(sealed_b64)
        .map_err(|e| CryptoError::EncryptFailed(e.to_string()))?;
    if blob.len() < LEN_PREFIX_LEN {
        return Err(CryptoError::EncryptFailed("blob too short".to_string()));
    }

    let wrapped_len = u16::from_be_bytes([blob[0], blob[1]]) as usize;
    let nonce_start = LEN_PREFIX_LEN + wrapped_len;
    if blob.len() < nonce_start + NONCE_LEN + TAG_LEN {
        return Err(CryptoError::EncryptFailed("blob too short".to_string()));
    }
    let wrapped = &blob[LEN_PREFIX_LEN..nonce_start];
    let nonce = &blob[nonce_start..nonce_start + NONCE_LEN];
    let ciphertext = &blob[nonce_start + NONCE_LEN..];

    let label_str = std::str::from_utf8(label)
        .map_err(|_| CryptoError::WrapFailed("label is not valid UTF-8".to_string()))?;
    let session_key = privkey
        .decrypt(Oaep::new_with_label::<Sha256, _>(label_str), wrapped)
        .map_err(|e| CryptoError::WrapFailed(e.to_string()))?;

    let cipher = Aes256Gcm::new_from_slice(&session_key)
        .map_err(|e| CryptoError::EncryptFailed(e.to_string()))?;
    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: label,
            },
        )
        .map_err(|_| CryptoError::EncryptFailed("AEAD authentication failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::{OsRng, StdRng};
    use rand::SeedableRng;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::RsaPrivateKey;

    const RSA_KEY: &str = include_str!("../testdata/rsa2048-key.pem");

    fn test_keypair() -> (RsaPrivateKey, RsaPublicKey) {
        let privkey = RsaPrivateKey::from_pkcs8_pem(RSA_KEY).expect("fixture key parses");
        let pubkey = privkey.to_public_key();
        (privkey, pubkey)
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let (privkey, pubkey) = test_keypair();
        let plaintext = b"very_secret_secret";
        let label = b"default/example";

        let sealed = seal(&mut OsRng, &pubkey, plaintext, label).unwrap();
        let opened = open(&privkey, &sealed, label).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_blob_framing() {
        let (_, pubkey) = test_keypair();
        let plaintext = b"payload";

        let sealed = seal(&mut OsRng, &pubkey, plaintext, b"ns/name").unwrap();
        let blob = STANDARD.decode(&sealed).unwrap();

        // 2048-bit key wraps to a 256-byte ciphertext
        let wrapped_len = u16::from_be_bytes([blob[0], blob[1]]) as usize;
        assert_eq!(wrapped_len, 256);
        assert_eq!(
            blob.len(),
            LEN_PREFIX_LEN + wrapped_len + NONCE_LEN + plaintext.len() + TAG_LEN
        );
    }

    #[test]
    fn test_seal_is_randomized() {
        let (privkey, pubkey) = test_keypair();
        let plaintext = b"same plaintext";
        let label = b"default/example";

        let a = seal(&mut OsRng, &pubkey, plaintext, label).unwrap();
        let b = seal(&mut OsRng, &pubkey, plaintext, label).unwrap();
        assert_ne!(a, b);

        assert_eq!(open(&privkey, &a, label).unwrap(), plaintext);
        assert_eq!(open(&privkey, &b, label).unwrap(), plaintext);
    }

    #[test]
    fn test_injected_rng_is_reproducible() {
        let (_, pubkey) = test_keypair();

        let a = seal(&mut StdRng::seed_from_u64(7), &pubkey, b"fixture", b"ns").unwrap();
        let b = seal(&mut StdRng::seed_from_u64(7), &pubkey, b"fixture", b"ns").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wrong_label_fails_to_open() {
        let (privkey, pubkey) = test_keypair();

        let sealed = seal(&mut OsRng, &pubkey, b"secret", b"default/example").unwrap();
        assert!(open(&privkey, &sealed, b"default/other").is_err());
        assert!(open(&privkey, &sealed, b"").is_err());
    }

    #[test]
    fn test_tampered_blob_fails_to_open() {
        let (privkey, pubkey) = test_keypair();
        let label = b"default/example";

        let sealed = seal(&mut OsRng, &pubkey, b"secret", label).unwrap();
        let mut blob = STANDARD.decode(&sealed).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;

        let result = open(&privkey, &STANDARD.encode(&blob), label);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_plaintext() {
        let (privkey, pubkey) = test_keypair();
        let label = b"default/example";

        let sealed = seal(&mut OsRng, &pubkey, b"", label).unwrap();
        assert_eq!(open(&privkey, &sealed, label).unwrap(), b"");
    }

    #[test]
    fn test_empty_label_roundtrip() {
        // Cluster-wide sealing binds nothing
        let (privkey, pubkey) = test_keypair();

        let sealed = seal(&mut OsRng, &pubkey, b"secret", b"").unwrap();
        assert_eq!(open(&privkey, &sealed, b"").unwrap(), b"secret");
    }

    #[test]
    fn test_undersized_key_fails_wrap() {
        // A 512-bit modulus cannot hold a 32-byte message under OAEP-SHA256
        let privkey = RsaPrivateKey::new(&mut OsRng, 512).unwrap();
        let pubkey = privkey.to_public_key();

        let err = seal(&mut OsRng, &pubkey, b"secret", b"ns/name").unwrap_err();
        assert!(matches!(err, CryptoError::WrapFailed(_)));
    }
}
