// src/lib.rs

//! Packset
//!
//! Declarative feature switching for Minecraft resource packs. A pack ships
//! a `packset.json` manifest describing user-facing features; switching a
//! feature renames files inside the pack so that exactly the assets of the
//! selected state are visible to the game.
//!
//! # Architecture
//!
//! - Filesystem as the only state: inactive files carry a `.packset.old`
//!   suffix, and feature values are resolved from that layout on demand
//! - Containers: directory trees and zip archives behind one trait
//! - Plans: every change is an ordered list of renames, previewable before
//!   it runs, and content is never deleted

pub mod container;
mod error;
pub mod filesystem;
pub mod lang;
pub mod pack;
pub mod progress;
pub mod schema;
pub mod transaction;

pub use container::{Container, DirContainer, MARKER_SUFFIX, PackContainer, ZipContainer};
pub use error::{Error, Result};
pub use lang::{DEFAULT_LANG, LabelKey, LangOverlay, Localizer};
pub use pack::{Packset, SetOutcome};
pub use progress::{CallbackProgress, LogProgress, ProgressEvent, ProgressTracker, SilentProgress};
pub use schema::{
    CurrentState, ExclusiveGroup, Feature, FeatureKind, FeatureValue, InconsistentStateError,
    Inconsistency, Schema, SchemaError, load_schema, resolve_feature, resolve_state,
};
pub use transaction::{ApplyReport, Plan, RenameStep, execute_plan, plan_transition};
