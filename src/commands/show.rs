// src/commands/show.rs
//! Feature listing

use anyhow::{Context, Result};
use packset::{CurrentState, Error, Feature, FeatureKind, Localizer, Packset};
use std::path::Path;
use tracing::warn;

/// Show categories, features and current values
pub fn cmd_show(pack: &Path, lang: &str) -> Result<()> {
    let packset = Packset::open(pack)
        .with_context(|| format!("Failed to open pack {}", pack.display()))?;

    let state = match packset.state() {
        Ok(state) => Some(state),
        Err(Error::InconsistentState(e)) => {
            warn!("{}", e);
            println!("Warning: pack is inconsistent, run `packset status` for details\n");
            None
        }
        Err(e) => return Err(e).context("Failed to read pack state"),
    };

    let localizer = packset.localizer(lang);
    println!("Pack: {}", pack.display());
    println!();

    for (category, features) in packset.schema().display_groups() {
        match category {
            Some(category) => {
                println!("[{}]", localizer.category_name(&category.id));
                let description = localizer.category_description(&category.id);
                if !description.is_empty() {
                    println!("  {}", description);
                }
            }
            None if packset.schema().categories().is_some() => println!("[other]"),
            None => {}
        }

        for feature in features {
            print_feature(feature, state.as_ref(), &localizer);
        }
        println!();
    }

    Ok(())
}

fn print_feature(feature: &Feature, state: Option<&CurrentState>, localizer: &Localizer<'_>) {
    let value = state
        .and_then(|s| s.get(&feature.id))
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string());

    let label = localizer.feature(&feature.id);
    let name = if label == feature.id {
        feature.id.clone()
    } else {
        format!("{} ({})", label, feature.id)
    };

    match feature.kind {
        FeatureKind::Bool => {
            println!("  {:40} bool    {:10} default {}", name, value, feature.default);
        }
        FeatureKind::Toggle => {
            println!(
                "  {:40} toggle  {:10} default {}  [{}]",
                name,
                value,
                feature.default,
                feature.scope.join(", ")
            );
        }
    }
}
