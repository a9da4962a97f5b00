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


//! Container unpacking pipeline
//!
//! # Pipeline
//! 1. Open the supplied bytes as the outer container.
//! 2. Read and parse `manifest.json`, extract the license public key.
//! 3. Resolve the secret key through the [`KeyExchange`] capability and
//!    normalize it to 32 bytes.
//! 4. Locate the encrypted payload: first entry ending in
//!    `.ebookcontent`, falling back to the legacy exact name
//!    `data.encrypted`.
//! 5. Split off the 16-byte IV, decrypt the remainder (AES-256-CBC).
//! 6. Open the plaintext as the inner container and pair each
//!    `pages/*.xhtml` entry with its referenced `images/<name>` entry.
//!
//! Each step short-circuits to its own [`DebookError`] kind. Page units
//! that cannot be paired (no image reference, missing image entry,
//! unreadable text) are skipped silently; an empty page list is a valid
//! outcome and the caller decides whether to surface it.

use crate::api::{KeyExchange, SecretKey};
use crate::book::markup;
use crate::container::ContainerReader;
use crate::crypto;
use crate::error::{DebookError, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Outer-container entry naming the license
pub const MANIFEST_NAME: &str = "manifest.json";

/// Suffix marking the encrypted payload entry
pub const PAYLOAD_SUFFIX: &str = ".ebookcontent";

/// Exact payload name used by older containers
pub const LEGACY_PAYLOAD_NAME: &str = "data.encrypted";

const PAGE_DIR: &str = "pages/";
const PAGE_SUFFIX: &str = ".xhtml";
const IMAGE_DIR: &str = "images/";

/// License descriptor embedded in the outer container
///
/// Only `publicKey` is consumed; unknown fields are ignored so the
/// manifest shape can grow without breaking older readers.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// One renderable page: its markup and the associated image as a data URI
///
/// The data URI is always labelled `image/png` regardless of the actual
/// encoding; callers needing another format must sniff the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub content: String,
    pub image: String,
}

/// Orchestrates one unpack operation end to end
///
/// Owns nothing across calls: the manifest, key, and payload live only
/// for the duration of one [`unpack`](BookUnpacker::unpack).
pub struct BookUnpacker<K: KeyExchange> {
    key_exchange: K,
}

impl<K: KeyExchange> BookUnpacker<K> {
    pub fn new(key_exchange: K) -> Self {
        Self { key_exchange }
    }

    /// Unpack a licensed container into its page list
    ///
    /// # Arguments
    /// * `file_bytes` - the user-supplied outer container
    /// * `account_id` - the caller's account/wallet identifier
    ///
    /// # Returns
    /// Pages in inner-archive directory order. May be empty; an empty
    /// list is not an error.
    ///
    /// # Errors
    /// One kind per failed stage; see [`DebookError`]. No partial page
    /// list is returned on failure.
    pub async fn unpack(&self, file_bytes: &[u8], account_id: &str) -> Result<Vec<Page>> {
        let mut outer = ContainerReader::open(file_bytes.to_vec())
            .map_err(|e| DebookError::ContainerCorrupt(e.to_string()))?;

        if !outer.has_entry(MANIFEST_NAME) {
            return Err(DebookError::ManifestMissing);
        }
        let manifest_text = outer
            .read_text(MANIFEST_NAME)
            .map_err(|e| DebookError::ManifestMalformed(e.to_string()))?;
        let manifest: Manifest = serde_json::from_str(&manifest_text)
            .map_err(|e| DebookError::ManifestMalformed(e.to_string()))?;
        if manifest.public_key.is_empty() {
            return Err(DebookError::ManifestMalformed(
                "publicKey is empty".to_string(),
            ));
        }

        // The account check gates the network call: an unset account must
        // fail before the key service is ever contacted.
        if account_id.is_empty() {
            return Err(DebookError::AccountNotSet);
        }

        info!(license = %manifest.public_key, "requesting decryption key");
        let material = self
            .key_exchange
            .fetch_key(&manifest.public_key, account_id)
            .await?;
        if material.is_empty() {
            return Err(DebookError::SecretKeyMissing);
        }
        let key = material.into_secret_key()?;

        let payload = self.read_payload(&mut outer)?;
        let plaintext = self.decrypt_payload(&payload, &key)?;

        let inner = ContainerReader::open(plaintext)
            .map_err(|e| DebookError::InnerContainerCorrupt(e.to_string()))?;
        let pages = self.collect_pages(inner);
        info!(pages = pages.len(), "book unpacked");
        Ok(pages)
    }

    /// Locate and read the encrypted payload entry
    ///
    /// Resolution order is fixed: suffix match first, legacy exact name
    /// as the fallback.
    fn read_payload(&self, outer: &mut ContainerReader) -> Result<Vec<u8>> {
        let name = outer
            .find_by_suffix(PAYLOAD_SUFFIX)
            .or_else(|| {
                outer
                    .has_entry(LEGACY_PAYLOAD_NAME)
                    .then(|| LEGACY_PAYLOAD_NAME.to_string())
            })
            .ok_or(DebookError::PayloadMissing)?;

        debug!(entry = %name, "reading encrypted payload");
        outer
            .read_bytes(&name)
            .map_err(|e| DebookError::PayloadReadError(e.to_string()))
    }

    /// Split the IV off the blob and decrypt the ciphertext
    fn decrypt_payload(&self, payload: &[u8], key: &SecretKey) -> Result<Vec<u8>> {
        if payload.len() < crypto::IV_LEN {
            return Err(DebookError::PayloadTooShort {
                actual: payload.len(),
            });
        }
        let (iv, ciphertext) = crypto::split_payload(payload);
        crypto::decrypt(iv, ciphertext, key)
    }

    /// Pair page markup with image entries, in directory order
    fn collect_pages(&self, mut inner: ContainerReader) -> Vec<Page> {
        let names: Vec<String> = inner.entry_names().to_vec();
        let mut pages = Vec::new();

        for name in names {
            if !(name.starts_with(PAGE_DIR) && name.ends_with(PAGE_SUFFIX)) {
                continue;
            }

            let content = match inner.read_text(&name) {
                Ok(content) => content,
                Err(e) => {
                    warn!(page = %name, error = %e, "skipping unreadable page entry");
                    continue;
                }
            };

            let Some(image_name) = markup::first_image_ref(&content) else {
                debug!(page = %name, "skipping page without image reference");
                continue;
            };
            let image_path = format!("{IMAGE_DIR}{image_name}");

            let image_bytes = match inner.read_bytes(&image_path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(page = %name, image = %image_path, error = %e, "skipping page with unresolvable image");
                    continue;
                }
            };

            let image = format!(
                "data:image/png;base64,{}",
                general_purpose::STANDARD.encode(&image_bytes)
            );
            pages.push(Page { content, image });
        }

        pages
    }
}
