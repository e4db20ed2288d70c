//! At-rest cryptography: master key derivation and envelope encryption

mod envelope;
mod master_key;

pub use envelope::EnvelopeCipher;
pub use master_key::{MasterKey, MASTER_KEY_LEN};
