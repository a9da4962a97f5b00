// debook-core - DRM e-book container unpacking and viewing
// Copyright (C) 2025 debook contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Secret-key request and response types
//!
//! # Key Exchange Flow
//! 1. The outer container's manifest names the license public key (an
//!    identifier, not a cryptographic key).
//! 2. One POST to the configured endpoint asks the service for the
//!    matching decryption secret, bound to the caller's account.
//! 3. The service answers with the secret in one of two shapes, depending
//!    on deployment: a printable string, or a numeric byte array.
//! 4. Whichever shape arrives is normalized to exactly 32 raw bytes
//!    (AES-256) before any decryption is attempted.
//!
//! ## Request body
//! ```json
//! { "licensePublicKey": "...", "wallet": "..." }
//! ```
//!
//! ## Success response
//! ```json
//! { "secretKey": "0123456789abcdef0123456789abcdef" }
//! ```
//! or
//! ```json
//! { "secretKey": [12, 240, 3, ...] }
//! ```
//!
//! Error responses carry a human-readable `error` field or raw text; both
//! are preserved verbatim in [`DebookError::KeyServiceError`].

use crate::error::{DebookError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Required secret-key length in bytes (AES-256)
pub const SECRET_KEY_LEN: usize = 32;

/// Capability consumed by the unpacker to resolve a decryption secret
///
/// The production implementation is [`crate::api::KeyServiceClient`].
/// Implementations perform exactly one request per call; retry policy,
/// if any, belongs to the caller.
#[async_trait]
pub trait KeyExchange: Send + Sync {
    /// Request the secret key for `license_public_key`, bound to
    /// `account_id`. Returns the key material as served, un-normalized.
    async fn fetch_key(&self, license_public_key: &str, account_id: &str) -> Result<KeyMaterial>;
}

/// Request body sent to the key service
///
/// Field names are pinned to the issuing service's existing contract;
/// `wallet` is what this crate calls the account id.
#[derive(Debug, Clone, Serialize)]
pub struct KeyRequest {
    #[serde(rename = "licensePublicKey")]
    pub license_public_key: String,

    #[serde(rename = "wallet")]
    pub wallet: String,
}

/// Success response body from the key service
#[derive(Debug, Deserialize)]
pub(crate) struct KeyServiceReply {
    #[serde(rename = "secretKey")]
    pub secret_key: Option<KeyMaterial>,
}

/// Error response body from the key service (best effort)
#[derive(Debug, Deserialize)]
pub(crate) struct KeyServiceErrorReply {
    pub error: String,
}

/// Secret-key material as served, before normalization
///
/// Two response shapes exist across service deployments. They are kept as
/// a tagged union at the boundary and normalized immediately via
/// [`KeyMaterial::into_secret_key`]; nothing downstream ever sees an
/// un-normalized key.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KeyMaterial {
    /// Printable string key; its UTF-8 bytes are the key material
    Text(String),

    /// Raw numeric byte array, used as-is
    Bytes(Vec<u8>),
}

impl KeyMaterial {
    /// Length of the material in bytes
    pub fn len(&self) -> usize {
        match self {
            KeyMaterial::Text(s) => s.len(),
            KeyMaterial::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize to a 32-byte secret key
    ///
    /// Oversized or undersized material is rejected with
    /// [`DebookError::InvalidKeyLength`], never truncated or padded:
    /// truncation would silently change key identity.
    pub fn into_secret_key(self) -> Result<SecretKey> {
        let bytes = match self {
            KeyMaterial::Text(s) => s.into_bytes(),
            KeyMaterial::Bytes(b) => b,
        };
        let actual = bytes.len();
        let key: [u8; SECRET_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| DebookError::InvalidKeyLength { actual })?;
        Ok(SecretKey(key))
    }
}

/// A validated 32-byte symmetric key
///
/// Held only for the duration of one decrypt call; never cached or
/// persisted. Construction goes through [`KeyMaterial::into_secret_key`],
/// the single validation point for key length.
#[derive(Clone)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }
}

// Key material stays out of logs and error output.
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([redacted; {SECRET_KEY_LEN}])")
    }
}
