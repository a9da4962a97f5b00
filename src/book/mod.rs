//! Book unpacking
//!
//! This module turns a licensed container file into renderable pages:
//! outer archive → manifest → remote key exchange → payload decryption →
//! inner archive → page/image association.

pub mod markup;
pub mod unpacker;

// Re-export commonly used types
pub use unpacker::{BookUnpacker, Manifest, Page};
