//! # lexdoc-core: Foundational Types
//!
//! Leaf crate of the lexdoc workspace. Every other crate depends on it; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `DocumentId`, `VersionId`, `WorkflowId` and
//!    `ActorId` are distinct types. A workflow id cannot be passed where a
//!    document id is expected.
//!
//! 2. **`CanonicalBytes` for signed payloads.** Anything that is signed or
//!    digested as structured data goes through `CanonicalBytes::new()`
//!    (RFC 8785 JCS). Document content itself is opaque bytes and is hashed
//!    with [`sha256_content`].
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision so
//!    that signed payloads serialize identically everywhere.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lexdoc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_content, sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CryptoError, LexdocError};
pub use identity::{ActorId, DocumentId, VersionId, WorkflowId};
pub use temporal::Timestamp;
