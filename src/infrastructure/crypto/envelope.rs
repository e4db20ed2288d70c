//! Envelope encryption for stored credentials
//!
//! Each secret is encrypted under a fresh random data key with AES-256-GCM,
//! and the data key is wrapped under the master key. Compromise of the master
//! key alone does not expose a secret without its wrapped data key, and a
//! future master-key rotation only has to re-wrap the small data keys.
//!
//! Wire format: `base64( b64url(wrapped_data_key) "." b64url(payload) )`,
//! where each half is `nonce || ciphertext+tag` from AES-GCM.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::RngCore;
use zeroize::Zeroizing;

use super::master_key::{MasterKey, MASTER_KEY_LEN};
use crate::domain::DomainError;

/// AES-GCM nonce length in bytes (96-bit)
const NONCE_LEN: usize = 12;

/// Separator between the wrapped data key and the payload
const SEPARATOR: char = '.';

/// Envelope cipher bound to a master key
///
/// Immutable after construction and safe to share across concurrent calls.
pub struct EnvelopeCipher {
    master_key: MasterKey,
}

impl EnvelopeCipher {
    pub fn new(master_key: MasterKey) -> Self {
        Self { master_key }
    }

    /// Encrypt a plaintext secret into an opaque text blob
    ///
    /// A fresh data key and fresh nonces are drawn for every call, so two
    /// encryptions of the same plaintext never produce the same blob.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, DomainError> {
        let mut data_key = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        rand::thread_rng().fill_bytes(data_key.as_mut());

        let payload = seal(data_key.as_ref(), plaintext.as_bytes())?;
        let wrapped_key = seal(self.master_key.as_bytes(), data_key.as_ref())?;

        let combined = format!(
            "{}{}{}",
            URL_SAFE_NO_PAD.encode(wrapped_key),
            SEPARATOR,
            URL_SAFE_NO_PAD.encode(payload)
        );

        Ok(STANDARD.encode(combined))
    }

    /// Decrypt a blob produced by [`encrypt`](Self::encrypt)
    ///
    /// Fails with a crypto error for anything malformed, truncated or
    /// tampered, or when the master key does not match; never returns wrong
    /// plaintext.
    pub fn decrypt(&self, blob: &str) -> Result<String, DomainError> {
        let combined = STANDARD
            .decode(blob)
            .map_err(|_| DomainError::crypto("ciphertext blob is not valid base64"))?;
        let combined = String::from_utf8(combined)
            .map_err(|_| DomainError::crypto("ciphertext blob is malformed"))?;

        let (wrapped_b64, payload_b64) = combined
            .split_once(SEPARATOR)
            .ok_or_else(|| DomainError::crypto("ciphertext blob is missing its separator"))?;

        let wrapped_key = URL_SAFE_NO_PAD
            .decode(wrapped_b64)
            .map_err(|_| DomainError::crypto("wrapped data key is malformed"))?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| DomainError::crypto("encrypted payload is malformed"))?;

        let data_key = Zeroizing::new(open(self.master_key.as_bytes(), &wrapped_key)?);

        if data_key.len() != MASTER_KEY_LEN {
            return Err(DomainError::crypto("unwrapped data key has wrong length"));
        }

        let plaintext = open(&data_key, &payload)?;

        String::from_utf8(plaintext)
            .map_err(|_| DomainError::crypto("decrypted payload is not valid UTF-8"))
    }
}

impl std::fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCipher").finish_non_exhaustive()
    }
}

/// AES-256-GCM encrypt with a fresh nonce, returning `nonce || ciphertext+tag`
fn seal(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, DomainError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| DomainError::crypto("invalid cipher key length"))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| DomainError::crypto("encryption failed"))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Reverse of [`seal`]; authenticates before returning anything
fn open(key: &[u8], blob: &[u8]) -> Result<Vec<u8>, DomainError> {
    if blob.len() <= NONCE_LEN {
        return Err(DomainError::crypto("ciphertext is truncated"));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| DomainError::crypto("invalid cipher key length"))?;

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| DomainError::crypto("decryption failed"))
}
