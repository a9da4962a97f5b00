//! Payload cryptography
//!
//! The book payload is AES-256-CBC: a 16-byte IV followed by PKCS#7-padded
//! ciphertext. There is no authentication tag, so this layer cannot verify
//! plaintext integrity; a wrong key or tampered ciphertext may decrypt to
//! garbage instead of failing, and shows up as a downstream parse failure.

pub mod cbc;

// Re-export commonly used items
pub use cbc::{decrypt, split_payload, IV_LEN};
