//! # Error Types
//!
//! Shared error enums for the foundational layer. Domain crates define
//! their own error types and wrap these via `#[from]`.

use thiserror::Error;

/// Top-level error for core-layer operations.
#[derive(Error, Debug)]
pub enum LexdocError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Input could not be parsed into a core type.
    #[error("parse error: {0}")]
    Parse(String),

    /// Content integrity violation.
    #[error("integrity error: {0}")]
    Integrity(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest parsing failed.
    #[error("digest error: {0}")]
    DigestError(String),
}
