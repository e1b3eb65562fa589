//! # Config Check Subcommand
//!
//! Parses a service config file exactly as `lexdoc-api` would, prints the
//! resolved values (defaults filled in) and flags settings that are legal
//! but probably unintended.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lexdoc_api::state::{load_file, FileConfig};
use lexdoc_lifecycle::JobKind;

#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// YAML config file (the file named by `LEXDOC_CONFIG`).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Exit 1 when any warning is reported.
    #[arg(long)]
    pub strict: bool,
}

pub fn run_check_config(args: &CheckConfigArgs) -> Result<u8> {
    let config = load_file(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    let resolved =
        serde_json::to_string_pretty(&config).context("failed to render resolved config")?;
    println!("{resolved}");

    let warnings = warnings(&config);
    for w in &warnings {
        println!("WARN: {w}");
    }
    if warnings.is_empty() {
        println!("OK: {}", args.file.display());
    }
    Ok(if args.strict && !warnings.is_empty() { 1 } else { 0 })
}

/// Settings that parse but likely do not do what the operator meant.
pub fn warnings(config: &FileConfig) -> Vec<String> {
    let mut out = Vec::new();
    let lc = &config.lifecycle;

    if lc.retention.max_versions == 0 && lc.retention.max_age_days == 0 {
        out.push("retention has no count or age limit; history grows without bound".into());
    }
    if lc.lock_ttl_secs == Some(0) {
        out.push("lock_ttl_secs is 0; every lock expires immediately".into());
    }
    if lc.escalation_lookahead_hours == 0 {
        out.push("escalation_lookahead_hours is 0; only overdue workflows escalate".into());
    }
    for kind in JobKind::ALL {
        if config.jobs.interval(kind).is_none() {
            out.push(format!("{} job is disabled", kind.as_str()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("lexdoc.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn defaults_have_no_warnings() {
        assert!(warnings(&FileConfig::default()).is_empty());
    }

    #[test]
    fn suspicious_settings_warn() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            &dir,
            "lifecycle:\n  retention:\n    max_versions: 0\n    max_age_days: 0\n  lock_ttl_secs: 0\njobs:\n  stall_interval_secs: 0\n",
        );
        let config = load_file(&file).unwrap();
        let w = warnings(&config);
        assert_eq!(w.len(), 3, "{w:?}");

        let lenient = CheckConfigArgs {
            file: file.clone(),
            strict: false,
        };
        assert_eq!(run_check_config(&lenient).unwrap(), 0);
        let strict = CheckConfigArgs { file, strict: true };
        assert_eq!(run_check_config(&strict).unwrap(), 1);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "lifecycle:\n  retention: [1, 2\n");
        let args = CheckConfigArgs {
            file,
            strict: false,
        };
        assert!(run_check_config(&args).is_err());
    }
}
