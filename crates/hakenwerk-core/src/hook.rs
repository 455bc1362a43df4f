//! Hooks, their trust statistics and the in-memory store shape.

use crate::condition::Condition;
use crate::context::Context;
use crate::op::{Action, Op};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Trust signal for a hook. `uses` and `corrections` only ever grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Success score in [0, 1].
    pub success: f64,
    pub uses: u64,
    pub corrections: u64,
}

/// Provenance of a hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified: OffsetDateTime,
    /// Origin tag, e.g. "learned" or "composed".
    pub source: String,
    pub tags: Vec<String>,
}

/// A rule: "when `condition` holds, run `action`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    /// Unique within a store.
    pub id: String,
    pub condition: Condition,
    pub action: Action,
    pub stats: Stats,
    pub meta: Metadata,
    /// Narrowness measure of the condition, non-negative.
    pub specificity: f64,
}

/// One true evaluation found by activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookMatch {
    pub hook: Hook,
    pub context: Context,
    /// The matched hook's plan cost.
    pub cost: f64,
}

/// Selection configuration for prioritization and cascading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub minimize_input: bool,
    pub success_weight: f64,
    pub max_cascade_depth: u32,
}

/// In-memory hook collection: a primary map from id to hook plus a
/// secondary index from canonical condition key to hook ids.
///
/// The index is bookkeeping only: activation scans the primary map, and
/// deleting a hook leaves its index entries in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookStore {
    pub hooks: BTreeMap<String, Hook>,
    pub index: BTreeMap<String, Vec<String>>,
}

/// A recorded observation of the environment, input to delta learning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub context: Context,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub id: String,
}

/// What the user actually did between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    pub ops: Vec<Op>,
    pub corrections: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}

/// Verdict of the hook equivalence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equivalence {
    Equivalent,
    NotEquivalent,
}
