// src/commands/status.rs
//! Consistency check

use anyhow::{Context, Result, bail};
use packset::{Error, Packset};
use std::path::Path;

/// Resolve every feature and report inconsistencies
///
/// Fails (non-zero exit) when the pack is inconsistent.
pub fn cmd_status(pack: &Path) -> Result<()> {
    let packset = Packset::open(pack)
        .with_context(|| format!("Failed to open pack {}", pack.display()))?;

    match packset.state() {
        Ok(state) => {
            println!("{}: consistent ({} features)", pack.display(), state.len());
            for (feature, value) in state.iter() {
                println!("  {:30} {}", feature, value);
            }
            Ok(())
        }
        Err(Error::InconsistentState(e)) => {
            println!("{}: {} issue(s)", pack.display(), e.issues.len());
            for issue in &e.issues {
                println!("  {}: {}", issue.feature, issue.reason);
                for path in &issue.paths {
                    println!("      {}", path);
                }
            }
            bail!("pack is inconsistent");
        }
        Err(e) => Err(e).context("Failed to read pack state"),
    }
}
