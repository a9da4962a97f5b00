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


//! Error taxonomy for the unpack pipeline
//!
//! Every failure is terminal for that unpack attempt: no partial page list
//! is ever published, and the previously loaded pages (if any) stay usable.
//! Nothing in the core retries; retry policy belongs to the caller.
//!
//! Variants map one-to-one onto pipeline stages so a caller can tell which
//! stage failed and render a message from the carried context.

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, DebookError>;

/// Failure kinds of the container-decryption-and-extraction pipeline
#[derive(Debug, Error)]
pub enum DebookError {
    /// The user-supplied file cannot be opened as a book container
    #[error("book container is not a readable archive: {0}")]
    ContainerCorrupt(String),

    /// The outer container has no `manifest.json` entry
    #[error("manifest.json not found in book container")]
    ManifestMissing,

    /// `manifest.json` is unreadable, not valid JSON, or lacks a usable
    /// `publicKey` field
    #[error("manifest.json is malformed: {0}")]
    ManifestMalformed(String),

    /// No account id has been supplied before unpacking
    #[error("account id is not set")]
    AccountNotSet,

    /// The key service could not be reached at the transport level
    #[error("key service unreachable: {0}")]
    KeyServiceUnreachable(String),

    /// The key service answered with a non-success HTTP status
    ///
    /// The response body is preserved verbatim for diagnostics; the
    /// service returns either a JSON error field or raw text.
    #[error("key service returned HTTP {status}: {body}")]
    KeyServiceError { status: u16, body: String },

    /// The key service answered success but the body did not match the
    /// expected response shape
    #[error("key service response is malformed: {0}")]
    KeyServiceMalformedResponse(String),

    /// The key service answered success with empty key material
    #[error("key service returned no secret key")]
    SecretKeyMissing,

    /// Key material did not normalize to exactly 32 bytes
    #[error("secret key must be 32 bytes, got {actual}")]
    InvalidKeyLength { actual: usize },

    /// No entry in the outer container matches the payload suffix or the
    /// legacy payload name
    #[error("no encrypted payload entry in book container")]
    PayloadMissing,

    /// The payload entry exists but could not be read
    #[error("failed to read encrypted payload: {0}")]
    PayloadReadError(String),

    /// The payload is shorter than one IV block
    #[error("encrypted payload is {actual} bytes, shorter than the 16-byte IV")]
    PayloadTooShort { actual: usize },

    /// Block-cipher decryption failed (wrong key, corrupted ciphertext,
    /// padding mismatch)
    #[error("payload decryption failed")]
    DecryptionFailed,

    /// The decrypted payload cannot be opened as a book archive
    ///
    /// CBC carries no integrity tag, so a wrong key or tampered
    /// ciphertext usually surfaces here rather than as `DecryptionFailed`.
    #[error("decrypted payload is not a readable archive: {0}")]
    InnerContainerCorrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_stage_context() {
        let err = DebookError::KeyServiceError {
            status: 404,
            body: "license not found".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("license not found"));

        let err = DebookError::InvalidKeyLength { actual: 31 };
        assert!(err.to_string().contains("31"));

        let err = DebookError::PayloadTooShort { actual: 7 };
        assert!(err.to_string().contains("7"));
    }
}
