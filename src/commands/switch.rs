// src/commands/switch.rs
//! Planning and applying feature changes

use anyhow::{Context, Result};
use packset::{LogProgress, Packset};
use std::path::Path;
use tracing::info;

/// Print the renames a change would perform
pub fn cmd_plan(pack: &Path, feature: &str, value: &str) -> Result<()> {
    let packset = Packset::open(pack)
        .with_context(|| format!("Failed to open pack {}", pack.display()))?;
    let plan = packset.plan(feature, value)?;
    println!("{}", plan);
    Ok(())
}

/// Change a feature, or preview the change with `dry_run`
pub fn cmd_set(pack: &Path, feature: &str, value: &str, dry_run: bool) -> Result<()> {
    let mut packset = Packset::open(pack)
        .with_context(|| format!("Failed to open pack {}", pack.display()))?;
    let plan = packset.plan(feature, value)?;

    if dry_run {
        println!("[DRY RUN] Would apply:");
        println!("{}", plan);
        return Ok(());
    }

    if plan.is_noop() {
        println!("{} is already {}", plan.feature, plan.to);
        return Ok(());
    }

    info!("Applying {} renames for '{}'", plan.len(), plan.feature);
    let progress = LogProgress::new(plan.feature.clone(), plan.len() as u64);
    let (report, state) = packset
        .apply(&plan, &progress)
        .with_context(|| format!("Failed to apply change to '{}'", plan.feature))?;

    let now = state
        .get(&plan.feature)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!(
        "{} set to {} ({} renames in {} ms)",
        plan.feature, now, report.steps_applied, report.duration_ms
    );
    Ok(())
}
