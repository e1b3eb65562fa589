//! # Digest Subcommand
//!
//! Prints the `sha256:<hex>` digest the content store would assign to a
//! file, or checks it against an expected value.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lexdoc_core::{sha256_content, ContentDigest};

#[derive(Args, Debug)]
pub struct DigestArgs {
    /// File to hash.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Expected digest (`sha256:<hex>` or bare hex). Exit 1 on mismatch.
    #[arg(long)]
    pub expect: Option<String>,
}

pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let digest = sha256_content(&bytes);

    let Some(expected) = &args.expect else {
        println!("{digest}");
        return Ok(0);
    };
    let expected = ContentDigest::parse(expected.trim())
        .map_err(|e| anyhow::anyhow!("invalid expected digest: {e}"))?;
    if expected == digest {
        println!("OK: {digest}");
        Ok(0)
    } else {
        println!("MISMATCH: expected {expected}, got {digest}");
        Ok(1)
    }
}
