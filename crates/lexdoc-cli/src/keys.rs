//! # Key and Signature Subcommands
//!
//! `keygen` writes a hex seed (`{prefix}.key`) and public key
//! (`{prefix}.pub`). `verify-signature` checks a signature record as
//! returned by `GET /v1/documents/{id}/signatures`. Without `--public-key`
//! only the record's own key is used, which proves integrity but not who
//! signed; pass the signer's published key to check that too.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use lexdoc_core::sha256_content;
use lexdoc_crypto::{Ed25519KeyPair, Ed25519PublicKey};
use lexdoc_lifecycle::SignatureRecord;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    /// Prefix for the key filenames.
    #[arg(long, default_value = "lexdoc")]
    pub prefix: String,
    /// Overwrite existing key files.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// JSON file holding one signature record.
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,
    /// Content the signature should cover; its digest must match the
    /// record's `content_hash`.
    #[arg(long)]
    pub content: Option<PathBuf>,
    /// Expected signer key (hex), e.g. from `GET /v1/signers/{id}/public-key`.
    #[arg(long, value_name = "HEX")]
    pub public_key: Option<String>,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    std::fs::create_dir_all(&args.output).with_context(|| {
        format!(
            "failed to create output directory: {}",
            args.output.display()
        )
    })?;

    let key_path = args.output.join(format!("{}.key", args.prefix));
    let pub_path = args.output.join(format!("{}.pub", args.prefix));
    if !args.force {
        for path in [&key_path, &pub_path] {
            if path.exists() {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
        }
    }

    let kp = Ed25519KeyPair::generate();
    let public_hex = kp.public_key().to_hex();
    write_secret(&key_path, &kp.seed_hex())?;
    std::fs::write(&pub_path, &public_hex)
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    println!("OK: generated Ed25519 key pair");
    println!("  Private seed: {}", key_path.display());
    println!("  Public key:   {}", pub_path.display());
    println!("  Public key (hex): {public_hex}");
    Ok(0)
}

#[cfg(unix)]
fn write_secret(path: &Path, contents: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("failed to write private key: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write private key: {}", path.display()))
}

#[cfg(not(unix))]
fn write_secret(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write private key: {}", path.display()))
}

pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let text = std::fs::read_to_string(&args.record)
        .with_context(|| format!("failed to read {}", args.record.display()))?;
    let record: SignatureRecord = serde_json::from_str(&text)
        .with_context(|| format!("not a signature record: {}", args.record.display()))?;

    let mut ok = true;
    if let Some(expected) = &args.public_key {
        let expected = Ed25519PublicKey::from_hex(expected.trim())
            .with_context(|| format!("invalid public key: {expected}"))?;
        if expected == record.public_key {
            println!("OK: record key matches the expected signer key");
        } else {
            println!("FAIL: record was signed with a different key");
            ok = false;
        }
    }
    match record.verify_detached() {
        Ok(()) => println!("OK: signature by {} is valid", record.signer_id),
        Err(e) => {
            println!("FAIL: signature by {} is invalid: {e}", record.signer_id);
            ok = false;
        }
    }

    if let Some(content) = &args.content {
        let bytes = std::fs::read(content)
            .with_context(|| format!("failed to read {}", content.display()))?;
        let digest = sha256_content(&bytes);
        if digest == record.content_hash {
            println!("OK: content matches {digest}");
        } else {
            println!(
                "FAIL: content digest {digest} differs from signed {}",
                record.content_hash
            );
            ok = false;
        }
    }

    Ok(if ok { 0 } else { 1 })
}
