//! Key-service API client
//!
//! This module talks to the remote license service that issues per-license
//! decryption secrets. The transport is a single JSON POST; the unpacker
//! consumes it through the [`KeyExchange`] capability so alternative
//! backends (and test doubles) can stand in for the HTTP client.

pub mod client;
pub mod key_exchange;

// Re-export commonly used types
pub use client::{KeyServiceClient, KeyServiceConfig};
pub use key_exchange::{KeyExchange, KeyMaterial, KeyRequest, SecretKey, SECRET_KEY_LEN};
