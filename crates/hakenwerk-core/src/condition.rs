//! The boolean predicate AST evaluated against a [`Context`](crate::Context).
//!
//! Conditions are finite trees; evaluation, smart constructors and the
//! canonicalization passes live in `hakenwerk-engine`.

use crate::context::{Feature, FeatureValue};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Boolean predicate over a context. The variant set is closed; every
/// consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Always true.
    True,
    /// Always false.
    False,
    /// True if the text is a substring of any text-valued feature.
    HasText(String),
    /// True iff the context's current app equals the given app. A context
    /// without an app never matches.
    InApp(String),
    /// Strictly after the given instant.
    TimeAfter(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
    /// Strictly before the given instant.
    TimeBefore(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
    /// Exact typed equality for one feature slot.
    FeatureEq {
        feature: Feature,
        value: FeatureValue,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}
