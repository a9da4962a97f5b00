//! Archive capability for book containers
//!
//! Both the outer container (the user-supplied file) and the inner
//! container (the decrypted payload) are zip archives. [`ContainerReader`]
//! wraps them behind the narrow contract the pipeline needs: list entries,
//! read an entry's bytes or text by path. Entry order is snapshotted from
//! the central directory at open, so traversal is deterministic.

use std::io::{Cursor, Read};
use thiserror::Error;
use zip::ZipArchive;

/// Errors surfaced by the archive capability
///
/// The unpacker maps these onto its own stage-specific failure kinds
/// (outer vs inner container, payload read).
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("invalid archive: {0}")]
    Invalid(#[from] zip::result::ZipError),

    #[error("entry not found: {0}")]
    EntryMissing(String),

    #[error("failed to read entry {name}: {source}")]
    Read {
        name: String,
        source: std::io::Error,
    },

    #[error("entry {0} is not valid UTF-8")]
    NotText(String),
}

/// Read-only view over one in-memory zip archive
pub struct ContainerReader {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entry_names: Vec<String>,
}

impl ContainerReader {
    /// Open an archive from raw bytes
    pub fn open(bytes: Vec<u8>) -> Result<Self, ContainerError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        // Snapshot names in central-directory order; the map-backed
        // name iterator of the zip crate has no stable order.
        let mut entry_names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            entry_names.push(archive.by_index(i)?.name().to_string());
        }

        Ok(Self {
            archive,
            entry_names,
        })
    }

    /// Entry paths in central-directory order
    pub fn entry_names(&self) -> &[String] {
        &self.entry_names
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entry_names.iter().any(|n| n == name)
    }

    /// First entry whose path ends with `suffix`, in directory order
    pub fn find_by_suffix(&self, suffix: &str) -> Option<String> {
        self.entry_names
            .iter()
            .find(|n| n.ends_with(suffix))
            .cloned()
    }

    /// Read an entry's raw bytes
    pub fn read_bytes(&mut self, name: &str) -> Result<Vec<u8>, ContainerError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(ContainerError::EntryMissing(name.to_string()))
            }
            Err(e) => return Err(ContainerError::Invalid(e)),
        };

        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes).map_err(|e| ContainerError::Read {
            name: name.to_string(),
            source: e,
        })?;
        Ok(bytes)
    }

    /// Read an entry as UTF-8 text
    pub fn read_text(&mut self, name: &str) -> Result<String, ContainerError> {
        let bytes = self.read_bytes(name)?;
        String::from_utf8(bytes).map_err(|_| ContainerError::NotText(name.to_string()))
    }
}
