#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Core value types for the hakenwerk rule engine.
//!
//! A [`Hook`] is a condition-triggered automation rule: "when [`Condition`]
//! holds in a [`Context`], run this [`Action`]". Everything in this crate is
//! an immutable value with structural equality; behavior (evaluation,
//! normalization, the op interpreter, the store operations) lives in the
//! `hakenwerk-engine` and `hakenwerk-store` crates.

pub mod condition;
pub mod context;
pub mod hook;
pub mod op;

pub use condition::Condition;
pub use context::{Context, Feature, FeatureValue};
pub use hook::{
    Equivalence, Hook, HookMatch, HookStore, Metadata, SelectionPolicy, Snapshot, Stats, UserInput,
};
pub use op::{Action, Op, Outcome, OutcomePlan, RollbackPlan};
