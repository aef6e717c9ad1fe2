// src/pack.rs

//! High-level session over one resource pack
//!
//! [`Packset`] bundles the container, its schema and its language overlay,
//! and threads them through resolve, plan and execute. The pack on disk
//! stays the only record of feature values; every mutating call resolves
//! again afterwards.

use crate::container::PackContainer;
use crate::error::Result;
use crate::lang::{LangOverlay, Localizer};
use crate::progress::ProgressTracker;
use crate::schema::{CurrentState, Schema, load_schema, resolve_state};
use crate::transaction::{ApplyReport, Plan, execute_plan, plan_transition};
use std::path::Path;
use tracing::info;

/// Result of [`Packset::set`]
#[derive(Debug, Clone)]
pub struct SetOutcome {
    pub plan: Plan,
    pub report: ApplyReport,
    /// State resolved after the plan was applied
    pub state: CurrentState,
}

/// An opened pack with its schema loaded
#[derive(Debug)]
pub struct Packset {
    container: PackContainer,
    schema: Schema,
    overlay: LangOverlay,
}

impl Packset {
    /// Open a pack directory or `.zip` and load its schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let container = PackContainer::open(path)?;
        let schema = load_schema(&container)?;
        let overlay = LangOverlay::load(&container)?;

        info!(
            "Opened {} ({} features, {} languages)",
            path.display(),
            schema.features().len(),
            overlay.languages().count()
        );

        Ok(Self {
            container,
            schema,
            overlay,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn container(&self) -> &PackContainer {
        &self.container
    }

    pub fn overlay(&self) -> &LangOverlay {
        &self.overlay
    }

    /// Resolve current feature values from disk
    pub fn state(&self) -> Result<CurrentState> {
        resolve_state(&self.schema, &self.container)
    }

    /// Plan a change without touching the pack
    pub fn plan(&self, feature: &str, value: &str) -> Result<Plan> {
        let state = self.state()?;
        plan_transition(&self.schema, &state, feature, value)
    }

    /// Apply a plan and resolve again
    pub fn apply(
        &mut self,
        plan: &Plan,
        progress: &dyn ProgressTracker,
    ) -> Result<(ApplyReport, CurrentState)> {
        let report = execute_plan(plan, &mut self.container, progress)?;
        let state = self.state()?;
        Ok((report, state))
    }

    /// Plan and apply in one call
    pub fn set(
        &mut self,
        feature: &str,
        value: &str,
        progress: &dyn ProgressTracker,
    ) -> Result<SetOutcome> {
        let plan = self.plan(feature, value)?;
        let (report, state) = self.apply(&plan, progress)?;
        Ok(SetOutcome {
            plan,
            report,
            state,
        })
    }

    /// Label lookup for `lang`
    pub fn localizer(&self, lang: &str) -> Localizer<'_> {
        Localizer::new(&self.schema, &self.overlay, lang)
    }
}
