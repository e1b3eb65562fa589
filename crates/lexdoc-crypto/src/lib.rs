//! # lexdoc-crypto
//!
//! - **Ed25519** signing and verification over `CanonicalBytes`. Signature
//!   payloads cannot be signed as raw bytes.
//! - **Content store**: the `ContentStore` trait plus an in-memory and a
//!   filesystem implementation. Both address blobs by SHA-256 and verify
//!   the digest again on every read.
//!
//! Depends only on `lexdoc-core` internally. Tests use real SHA-256 and
//! real Ed25519.

pub mod cas;
pub mod ed25519;
mod hex;

pub use cas::{ContentLocator, ContentStore, FsContentStore, MemoryContentStore, StoreError};
pub use ed25519::{
    verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
};
