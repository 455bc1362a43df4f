//! Symbolic ops and the plans built from them.
//!
//! Ops are purely symbolic: applying one transforms a context value and
//! never touches a real input device. The interpreter and the rollback
//! synthesis live in `hakenwerk-engine`; this module only defines shape.

use crate::context::Context;
use serde::{Deserialize, Serialize};

/// Symbolic environment mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    TypeText(String),
    ClickElement(String),
    OpenApp(String),
    SendKeys(String),
    /// Advance the context clock by the given number of seconds.
    Wait(f64),
    Sequence(Vec<Op>),
}

/// Undo instructions: an inverse op sequence plus the context snapshot to
/// restore. Combination is non-commutative; see
/// `hakenwerk_engine::interp::compose_rollbacks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackPlan {
    pub ops: Vec<Op>,
    /// Pre-action snapshot. Starts as [`Context::empty`] and is overwritten
    /// with the real snapshot when the owning plan is interpreted.
    pub context: Context,
}

impl RollbackPlan {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ops: Vec::new(),
            context: Context::empty(),
        }
    }
}

/// Forward plan: an op sequence, its precomputed rollback and a cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomePlan {
    pub ops: Vec<Op>,
    pub rollback: RollbackPlan,
    /// Non-negative.
    pub cost: f64,
}

impl OutcomePlan {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ops: Vec::new(),
            rollback: RollbackPlan::empty(),
            cost: 0.0,
        }
    }
}

/// A named forward plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub plan: OutcomePlan,
    pub description: String,
}

/// Result of executing a hook's action over a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// The context after applying the plan.
    pub post: Context,
    /// Always false at execution time; corrections are reported later via
    /// the stats update.
    pub correction: bool,
    pub plan: OutcomePlan,
}
