// src/schema/state.rs

//! Current feature values, read back from the pack
//!
//! Nothing is persisted between runs: the value of every feature is derived
//! from which files carry the `.packset.old` marker. Resolution is a pure
//! function of the schema and the container contents, so it is safe to call
//! again after every change.

use crate::container::{Container, marked};
use crate::error::Result;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use super::{ExclusiveGroup, Feature, FeatureKind, FeatureValue, Polarity, Schema, VariantGroup};

/// Resolved value of every feature, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentState {
    values: Vec<(String, FeatureValue)>,
}

impl CurrentState {
    /// Value of a feature
    pub fn get(&self, feature: &str) -> Option<&FeatureValue> {
        self.values
            .iter()
            .find(|(id, _)| id == feature)
            .map(|(_, value)| value)
    }

    /// Iterate `(feature id, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values.iter().map(|(id, value)| (id.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One exclusivity violation found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    pub feature: String,
    /// Paths involved, in the order they were probed
    pub paths: Vec<String>,
    pub reason: String,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.feature, self.reason, self.paths.join(", "))
    }
}

/// The pack does not match any legal state of its schema
#[derive(Debug, Clone, Error)]
#[error("Pack is in an inconsistent state ({} issue(s)): {}", .issues.len(), summarize(.issues))]
pub struct InconsistentStateError {
    pub issues: Vec<Inconsistency>,
}

fn summarize(issues: &[Inconsistency]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolve the value of every feature
///
/// All inconsistencies across all features are reported together.
pub fn resolve_state(schema: &Schema, container: &dyn Container) -> Result<CurrentState> {
    let mut values = Vec::with_capacity(schema.features().len());
    let mut issues = Vec::new();

    for feature in schema.features() {
        if let Some(value) = probe_feature(feature, container, &mut issues)? {
            values.push((feature.id.clone(), value));
        }
    }

    if !issues.is_empty() {
        warn!(
            "{} inconsistencies found in {}",
            issues.len(),
            container.describe()
        );
        return Err(InconsistentStateError { issues }.into());
    }

    debug!("Resolved {} features in {}", values.len(), container.describe());
    Ok(CurrentState { values })
}

/// Resolve a single feature
pub fn resolve_feature(feature: &Feature, container: &dyn Container) -> Result<FeatureValue> {
    let mut issues = Vec::new();
    match probe_feature(feature, container, &mut issues)? {
        Some(value) if issues.is_empty() => Ok(value),
        _ => Err(InconsistentStateError { issues }.into()),
    }
}

/// What one exclusive group shows on disk
enum Reading {
    /// Asset visible / pair's toggle side active
    Switch(bool),
    /// Name of the variant occupying the slot
    Occupant(String),
}

fn probe_feature(
    feature: &Feature,
    container: &dyn Container,
    issues: &mut Vec<Inconsistency>,
) -> Result<Option<FeatureValue>> {
    let before = issues.len();
    let mut readings = Vec::with_capacity(feature.groups.len());

    for group in &feature.groups {
        match probe_group(group, container)? {
            Ok(reading) => readings.push((group, reading)),
            Err((paths, reason)) => issues.push(Inconsistency {
                feature: feature.id.clone(),
                paths,
                reason,
            }),
        }
    }

    if issues.len() > before {
        return Ok(None);
    }

    let value = match feature.kind {
        FeatureKind::Bool => bool_value(feature, &readings),
        FeatureKind::Toggle => toggle_value(feature, &readings),
    };

    match value {
        Ok(value) => Ok(Some(value)),
        Err(issue) => {
            issues.push(issue);
            Ok(None)
        }
    }
}

type Probe = std::result::Result<Reading, (Vec<String>, String)>;

fn probe_group(group: &ExclusiveGroup, container: &dyn Container) -> Result<Probe> {
    match group {
        ExclusiveGroup::Asset(asset) => {
            let hidden_path = marked(&asset.path);
            let visible = container.exists(&asset.path)?;
            let hidden = container.exists(&hidden_path)?;
            Ok(match (visible, hidden) {
                (true, false) => Ok(Reading::Switch(true)),
                (false, true) => Ok(Reading::Switch(false)),
                (true, true) => Err((
                    vec![asset.path.clone(), hidden_path],
                    "asset is both visible and hidden".to_string(),
                )),
                (false, false) => Err((
                    vec![asset.path.clone(), hidden_path],
                    "asset is missing".to_string(),
                )),
            })
        }
        ExclusiveGroup::Pair(pair) => {
            let path_old = marked(&pair.path);
            let toggle_old = marked(&pair.toggle_path);
            let layout = (
                container.exists(&pair.path)?,
                container.exists(&path_old)?,
                container.exists(&pair.toggle_path)?,
                container.exists(&toggle_old)?,
            );
            Ok(match layout {
                (true, false, false, true) => Ok(Reading::Switch(false)),
                (false, true, true, false) => Ok(Reading::Switch(true)),
                _ => Err((
                    vec![pair.path.clone(), path_old, pair.toggle_path.clone(), toggle_old],
                    "pair does not have exactly one active side".to_string(),
                )),
            })
        }
        ExclusiveGroup::VariantGroup(group) => probe_variants(group, container),
    }
}

fn probe_variants(group: &VariantGroup, container: &dyn Container) -> Result<Probe> {
    let slot = group.slot();
    let slot_old = marked(slot);
    let slot_filled = container.exists(slot)?;
    let primary_parked = container.exists(&slot_old)?;

    let mut vacant = Vec::new();
    for variant in group.alternates() {
        let parked = marked(&variant.path);
        if container.exists(&parked)? {
            return Ok(Err((
                vec![variant.path.clone(), parked],
                format!("variant '{}' carries the marker suffix", variant.name),
            )));
        }
        if !container.exists(&variant.path)? {
            vacant.push(variant);
        }
    }

    let all_paths = || {
        let mut paths = vec![slot.to_string(), slot_old.clone()];
        paths.extend(group.alternates().iter().map(|v| v.path.clone()));
        paths
    };

    if !slot_filled {
        return Ok(Err((all_paths(), "slot is empty".to_string())));
    }

    if !primary_parked {
        return Ok(if vacant.is_empty() {
            Ok(Reading::Occupant(group.primary().name.clone()))
        } else {
            Err((
                all_paths(),
                format!("variant '{}' is missing", vacant[0].name),
            ))
        });
    }

    Ok(match vacant.as_slice() {
        [occupant] => Ok(Reading::Occupant(occupant.name.clone())),
        [] => Err((all_paths(), "primary is parked but no variant occupies the slot".to_string())),
        _ => Err((
            all_paths(),
            format!("{} variants are missing from their paths", vacant.len()),
        )),
    })
}

fn bool_value(
    feature: &Feature,
    readings: &[(&ExclusiveGroup, Reading)],
) -> std::result::Result<FeatureValue, Inconsistency> {
    let FeatureValue::Bool(default) = feature.default else {
        return Err(mismatch(feature, readings, "bool feature has a non-bool default"));
    };

    let mut engaged = None;
    for (group, reading) in readings {
        let (Reading::Switch(on), Some(polarity)) = (reading, group_polarity(group)) else {
            continue;
        };
        let contribution = *on != (polarity == Polarity::On);
        match engaged {
            None => engaged = Some(contribution),
            Some(previous) if previous != contribution => {
                return Err(mismatch(feature, readings, "switches disagree on the feature value"));
            }
            Some(_) => {}
        }
    }

    let engaged = engaged.unwrap_or(false);
    Ok(FeatureValue::Bool(default != engaged))
}

fn toggle_value(
    feature: &Feature,
    readings: &[(&ExclusiveGroup, Reading)],
) -> std::result::Result<FeatureValue, Inconsistency> {
    let FeatureValue::Toggle(default) = &feature.default else {
        return Err(mismatch(feature, readings, "toggle feature has a non-toggle default"));
    };

    let mut value: Option<&str> = None;
    for (_, reading) in readings {
        let Reading::Occupant(name) = reading else {
            continue;
        };
        if name == default {
            continue;
        }
        match value {
            None => value = Some(name.as_str()),
            Some(previous) if previous != name.as_str() => {
                return Err(mismatch(
                    feature,
                    readings,
                    &format!("slots hold different states '{}' and '{}'", previous, name),
                ));
            }
            Some(_) => {}
        }
    }

    let value = value.unwrap_or(default.as_str());
    for (group, reading) in readings {
        if let (ExclusiveGroup::VariantGroup(variants), Reading::Occupant(name)) = (group, reading)
            && variants.occupant_for(value).name != *name
        {
            return Err(mismatch(
                feature,
                readings,
                &format!("slot '{}' holds '{}' instead of '{}'", variants.slot(), name, value),
            ));
        }
    }

    Ok(FeatureValue::Toggle(value.to_string()))
}

fn group_polarity(group: &ExclusiveGroup) -> Option<Polarity> {
    match group {
        ExclusiveGroup::Asset(asset) => Some(asset.default),
        ExclusiveGroup::Pair(pair) => Some(pair.default),
        ExclusiveGroup::VariantGroup(_) => None,
    }
}

fn mismatch(
    feature: &Feature,
    readings: &[(&ExclusiveGroup, Reading)],
    reason: &str,
) -> Inconsistency {
    Inconsistency {
        feature: feature.id.clone(),
        paths: readings
            .iter()
            .flat_map(|(group, _)| group.paths())
            .map(String::from)
            .collect(),
        reason: reason.to_string(),
    }
}
