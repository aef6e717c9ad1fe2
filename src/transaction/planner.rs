// src/transaction/planner.rs

//! Transition planning
//!
//! Turns a feature change request into an ordered list of renames. Planning
//! never touches the pack: it works from the schema and an already resolved
//! [`CurrentState`], so a rejected request leaves the pack untouched.
//!
//! Variant groups move in two phases per group. The current occupant is
//! vacated first (the primary is parked under the marker suffix, any other
//! variant goes back to its own path), then the target occupies the slot.
//! No step ever needs a destination that an earlier step has not freed.

use crate::container::marked;
use crate::error::Result;
use crate::schema::{
    Asset, CurrentState, ExclusiveGroup, Feature, FeatureKind, FeatureValue, Pair, Schema,
    SchemaError, VariantGroup,
};
use std::fmt;
use tracing::debug;

/// A single rename within a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameStep {
    pub src: String,
    pub dst: String,
}

impl RenameStep {
    fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

impl fmt::Display for RenameStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

/// Ordered renames moving one feature from its current value to a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub feature: String,
    pub from: FeatureValue,
    pub to: FeatureValue,
    pub steps: Vec<RenameStep>,
}

impl Plan {
    /// True when the target equals the current value
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of renames
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} -> {}", self.feature, self.from, self.to)?;
        if self.steps.is_empty() {
            return write!(f, "  (no changes)");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}. {}", i + 1, step)?;
        }
        Ok(())
    }
}

/// Plan moving `feature_id` to `target`
///
/// `target` is parsed against the feature: `true`/`false` for bool
/// features, a scope member for toggle features.
pub fn plan_transition(
    schema: &Schema,
    state: &CurrentState,
    feature_id: &str,
    target: &str,
) -> Result<Plan> {
    let feature = schema.require_feature(feature_id)?;
    let to = feature.parse_value(target)?;
    let from = state
        .get(feature_id)
        .cloned()
        .ok_or_else(|| SchemaError::UnknownFeature(feature_id.to_string()))?;

    let steps = if from == to {
        Vec::new()
    } else {
        match feature.kind {
            FeatureKind::Bool => bool_steps(feature, &from, &to),
            FeatureKind::Toggle => toggle_steps(feature, &from, &to),
        }
    };

    debug!(
        "Planned {} -> {} for '{}': {} steps",
        from,
        to,
        feature.id,
        steps.len()
    );

    Ok(Plan {
        feature: feature.id.clone(),
        from,
        to,
        steps,
    })
}

fn bool_steps(feature: &Feature, from: &FeatureValue, to: &FeatureValue) -> Vec<RenameStep> {
    let was_engaged = feature.is_engaged(from);
    let engaged = feature.is_engaged(to);
    let mut steps = Vec::new();

    for group in &feature.groups {
        match group {
            ExclusiveGroup::Asset(asset) => {
                asset_steps(asset, was_engaged, engaged, &mut steps);
            }
            ExclusiveGroup::Pair(pair) => {
                pair_steps(pair, was_engaged, engaged, &mut steps);
            }
            ExclusiveGroup::VariantGroup(_) => {}
        }
    }

    steps
}

fn asset_steps(asset: &Asset, was_engaged: bool, engaged: bool, steps: &mut Vec<RenameStep>) {
    let visible = asset.default.when(engaged);
    if asset.default.when(was_engaged) == visible {
        return;
    }

    let hidden = marked(&asset.path);
    if visible {
        steps.push(RenameStep::new(hidden, asset.path.as_str()));
    } else {
        steps.push(RenameStep::new(asset.path.as_str(), hidden));
    }
}

fn pair_steps(pair: &Pair, was_engaged: bool, engaged: bool, steps: &mut Vec<RenameStep>) {
    let on = pair.default.when(engaged);
    if pair.default.when(was_engaged) == on {
        return;
    }

    let (vacate, occupy) = if on {
        (&pair.path, &pair.toggle_path)
    } else {
        (&pair.toggle_path, &pair.path)
    };
    steps.push(RenameStep::new(vacate.as_str(), marked(vacate)));
    steps.push(RenameStep::new(marked(occupy), occupy.as_str()));
}

fn toggle_steps(feature: &Feature, from: &FeatureValue, to: &FeatureValue) -> Vec<RenameStep> {
    let (FeatureValue::Toggle(from), FeatureValue::Toggle(to)) = (from, to) else {
        return Vec::new();
    };

    let mut steps = Vec::new();
    for group in &feature.groups {
        if let ExclusiveGroup::VariantGroup(variants) = group {
            variant_steps(variants, from, to, &mut steps);
        }
    }
    steps
}

fn variant_steps(group: &VariantGroup, from: &str, to: &str, steps: &mut Vec<RenameStep>) {
    let occupant = group.occupant_for(from);
    let target = group.occupant_for(to);
    if occupant.name == target.name {
        return;
    }

    let slot = group.slot();
    let primary = &group.primary().name;

    if occupant.name == *primary {
        steps.push(RenameStep::new(slot, marked(slot)));
    } else {
        steps.push(RenameStep::new(slot, occupant.path.as_str()));
    }

    if target.name == *primary {
        steps.push(RenameStep::new(marked(slot), slot));
    } else {
        steps.push(RenameStep::new(target.path.as_str(), slot));
    }
}
