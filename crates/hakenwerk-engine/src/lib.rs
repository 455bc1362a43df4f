#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Condition semantics and the hook engine.
//!
//! This crate gives the value types of `hakenwerk-core` their meaning:
//!
//! - [`cond`] evaluates conditions against contexts, offers
//!   algebra-preserving smart constructors and implements the four-pass
//!   canonicalization used for equivalence checks and store index keys.
//! - [`interp`] is the symbolic op interpreter: applying ops to contexts,
//!   synthesizing rollback plans from derived inverses and composing plans.
//! - [`hooks`] matches and prioritizes hooks, composes and refines them,
//!   cascades over post-execution contexts, learns hooks from context
//!   deltas and applies the negative-reinforcement stats update.
//!
//! Every operation is a pure, total function over finite trees; inputs are
//! never mutated, so the engine is safe to call concurrently without locks.

pub mod cond;
pub mod error;
pub mod hooks;
pub mod interp;

pub use error::{EngineError, Result};
