//! Master key derivation
//!
//! Derives the key-wrapping key from an operator secret with
//! PBKDF2-HMAC-SHA256. Derivation is intentionally slow and happens exactly
//! once, at construction; the derived key is cached for the life of the
//! process and zeroized on drop.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::DomainError;

/// PBKDF2 iteration count for master key derivation
const PBKDF2_ITERATIONS: u32 = 200_000;

/// Fixed derivation salt
///
/// The salt is fixed so the same operator secret always derives the same
/// master key across restarts; the per-value data keys carry the randomness.
const MASTER_KEY_SALT: &[u8] = b"byok-vault-master-key-v1";

/// Length of the derived symmetric key in bytes (AES-256)
pub const MASTER_KEY_LEN: usize = 32;

/// Derived master key, held in memory for the life of the process
pub struct MasterKey {
    key: Zeroizing<[u8; MASTER_KEY_LEN]>,
}

impl MasterKey {
    /// Derive the master key from an operator secret
    ///
    /// Deterministic: the same secret always yields the same key. An empty
    /// secret is rejected at construction time.
    pub fn derive(secret: &str) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::crypto(
                "master secret must not be empty",
            ));
        }

        let mut key = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        pbkdf2_hmac::<Sha256>(
            secret.as_bytes(),
            MASTER_KEY_SALT,
            PBKDF2_ITERATIONS,
            key.as_mut(),
        );

        Ok(Self { key })
    }

    /// Raw key bytes, for use by the envelope cipher only
    pub(crate) fn as_bytes(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.debug_struct("MasterKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let a = MasterKey::derive("operator-secret").unwrap();
        let b = MasterKey::derive("operator-secret").unwrap();

        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_different_secrets_differ() {
        let a = MasterKey::derive("operator-secret").unwrap();
        let b = MasterKey::derive("other-secret").unwrap();

        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = MasterKey::derive("");
        assert!(matches!(result, Err(DomainError::Crypto { .. })));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = MasterKey::derive("operator-secret").unwrap();
        let printed = format!("{:?}", key);

        assert!(!printed.contains("key:"));
    }
}
