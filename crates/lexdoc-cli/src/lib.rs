//! # lexdoc-cli: Operator CLI
//!
//! Provides the `lexdoc` command-line interface.
//!
//! ## Subcommands
//!
//! - `lexdoc keygen`: generate an Ed25519 signer key pair.
//! - `lexdoc digest`: `sha256:` digest of a file, optionally checked.
//! - `lexdoc verify-signature`: verify an exported signature record
//!   offline, optionally against the signed content.
//! - `lexdoc check-config`: parse and sanity-check a service config file.
//!
//! Every command returns its process exit code: `0` on success, `1` when
//! a check fails. Errors that prevent the check from running at all are
//! returned as `anyhow::Error`.

pub mod config;
pub mod digest;
pub mod keys;
