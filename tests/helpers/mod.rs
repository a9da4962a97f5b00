//! Test helpers for pipeline integration tests
//!
//! Builds real container fixtures (zip archives, CBC-encrypted payloads)
//! and provides a scriptable key-exchange double with call accounting.

use async_trait::async_trait;
use debook_core::api::{KeyExchange, KeyMaterial, SecretKey};
use debook_core::crypto;
use debook_core::{DebookError, Result};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zip::write::FileOptions;

/// Key material every happy-path fixture is encrypted under: 32 zero bytes
pub fn zero_key_material() -> KeyMaterial {
    KeyMaterial::Bytes(vec![0u8; 32])
}

pub fn zero_key() -> SecretKey {
    zero_key_material().into_secret_key().unwrap()
}

/// What the mock key service should answer
pub enum MockReply {
    Key(KeyMaterial),
    HttpError { status: u16, body: String },
}

/// Scriptable [`KeyExchange`] double
///
/// Counts calls and records the last request so tests can assert that the
/// account gate runs before any key request is made. The reply handle
/// stays usable after the service has been moved into a viewer, so a
/// test can make later requests fail.
pub struct MockKeyService {
    reply: Arc<Mutex<MockReply>>,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<(String, String)>>>,
}

impl MockKeyService {
    pub fn returning(reply: MockReply) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply)),
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_key(material: KeyMaterial) -> Self {
        Self::returning(MockReply::Key(material))
    }

    pub fn reply_handle(&self) -> Arc<Mutex<MockReply>> {
        Arc::clone(&self.reply)
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn request_log(&self) -> Arc<Mutex<Option<(String, String)>>> {
        Arc::clone(&self.last_request)
    }
}

#[async_trait]
impl KeyExchange for MockKeyService {
    async fn fetch_key(&self, license_public_key: &str, account_id: &str) -> Result<KeyMaterial> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() =
            Some((license_public_key.to_string(), account_id.to_string()));

        match &*self.reply.lock().unwrap() {
            MockReply::Key(material) => Ok(material.clone()),
            MockReply::HttpError { status, body } => Err(DebookError::KeyServiceError {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// Build a zip archive in memory, entries in the given order
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }
    buffer
}

/// IV-prefixed AES-256-CBC payload for an inner archive
pub fn encrypt_payload(inner_zip: &[u8], key: &SecretKey) -> Vec<u8> {
    let iv = [0u8; crypto::IV_LEN];
    let mut payload = iv.to_vec();
    payload.extend(crypto::cbc::encrypt_for_fixture(&iv, inner_zip, key));
    payload
}

/// Outer container with the standard manifest and one suffix-named payload
pub fn outer_container(payload: &[u8]) -> Vec<u8> {
    zip_bytes(&[
        ("manifest.json", br#"{"publicKey":"PUB1"}"# as &[u8]),
        ("book.ebookcontent", payload),
    ])
}

/// Complete licensed book: one page referencing one present image
pub fn one_page_book() -> Vec<u8> {
    let inner = zip_bytes(&[
        (
            "pages/1.xhtml",
            br#"<html><body><img src="../images/a.png"/></body></html>"# as &[u8],
        ),
        ("images/a.png", b"\x89PNG\r\n\x1a\nfake image bytes" as &[u8]),
    ]);
    outer_container(&encrypt_payload(&inner, &zero_key()))
}
