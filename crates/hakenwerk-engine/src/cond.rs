//! Condition semantics: evaluation, smart constructors and the
//! canonicalization rewrite system.
//!
//! [`normalize`] runs four passes in fixed order: push negations inward,
//! eliminate `True`/`False` identities, flatten And/Or chains, then sort
//! each chain's terms canonically. The result is idempotent and identical
//! for conditions differing only in associativity or term order of one
//! And/Or level. It deliberately does not distribute or absorb:
//! `(A ∧ B) ∨ (A ∧ C)` stays as written.

use hakenwerk_core::{Condition, Context, Feature, FeatureValue};
use time::OffsetDateTime;

use crate::error::Result;

/// True if `text` is a substring of any text-valued feature in `ctx`.
/// The search is not scoped to a particular feature slot.
#[must_use]
pub fn context_has_text(text: &str, ctx: &Context) -> bool {
    ctx.features.values().any(|value| match value {
        FeatureValue::Text(t) => t.contains(text),
        _ => false,
    })
}

/// True iff the context's current app equals `app`. An absent app never
/// matches.
#[must_use]
pub fn context_in_app(app: &str, ctx: &Context) -> bool {
    ctx.app.as_deref() == Some(app)
}

/// Evaluate a condition against a context. Total and side-effect free;
/// branch order is unobservable since conditions are pure.
#[must_use]
pub fn eval(condition: &Condition, ctx: &Context) -> bool {
    match condition {
        Condition::True => true,
        Condition::False => false,
        Condition::HasText(text) => context_has_text(text, ctx),
        Condition::InApp(app) => context_in_app(app, ctx),
        Condition::TimeAfter(t) => ctx.time > *t,
        Condition::TimeBefore(t) => ctx.time < *t,
        Condition::FeatureEq { feature, value } => ctx.features.get(feature) == Some(value),
        Condition::And(l, r) => eval(l, ctx) && eval(r, ctx),
        Condition::Or(l, r) => eval(l, ctx) || eval(r, ctx),
        Condition::Not(inner) => !eval(inner, ctx),
    }
}

/// Conjunction with one-step identity/annihilator elimination.
#[must_use]
pub fn and(a: Condition, b: Condition) -> Condition {
    match (a, b) {
        (Condition::True, b) => b,
        (a, Condition::True) => a,
        (Condition::False, _) | (_, Condition::False) => Condition::False,
        (a, b) => Condition::And(Box::new(a), Box::new(b)),
    }
}

/// Disjunction with one-step identity/annihilator elimination.
#[must_use]
pub fn or(a: Condition, b: Condition) -> Condition {
    match (a, b) {
        (Condition::True, _) | (_, Condition::True) => Condition::True,
        (Condition::False, b) => b,
        (a, Condition::False) => a,
        (a, b) => Condition::Or(Box::new(a), Box::new(b)),
    }
}

/// Negation with constant folding and double-negation elimination.
#[must_use]
pub fn not(c: Condition) -> Condition {
    match c {
        Condition::True => Condition::False,
        Condition::False => Condition::True,
        Condition::Not(inner) => *inner,
        c => Condition::Not(Box::new(c)),
    }
}

pub fn has_text(text: impl Into<String>) -> Condition {
    Condition::HasText(text.into())
}

pub fn in_app(app: impl Into<String>) -> Condition {
    Condition::InApp(app.into())
}

#[must_use]
pub fn time_after(t: OffsetDateTime) -> Condition {
    Condition::TimeAfter(t)
}

#[must_use]
pub fn time_before(t: OffsetDateTime) -> Condition {
    Condition::TimeBefore(t)
}

#[must_use]
pub fn feature_eq(feature: Feature, value: FeatureValue) -> Condition {
    Condition::FeatureEq { feature, value }
}

/// Pass 1: De Morgan negations inward, double negations out. Negations
/// only move; nothing is flattened here.
fn push_negations(c: Condition) -> Condition {
    match c {
        Condition::Not(inner) => match *inner {
            Condition::Not(x) => push_negations(*x),
            Condition::And(l, r) => Condition::Or(
                Box::new(push_negations(Condition::Not(l))),
                Box::new(push_negations(Condition::Not(r))),
            ),
            Condition::Or(l, r) => Condition::And(
                Box::new(push_negations(Condition::Not(l))),
                Box::new(push_negations(Condition::Not(r))),
            ),
            Condition::True => Condition::False,
            Condition::False => Condition::True,
            atom => Condition::Not(Box::new(atom)),
        },
        Condition::And(l, r) => {
            Condition::And(Box::new(push_negations(*l)), Box::new(push_negations(*r)))
        }
        Condition::Or(l, r) => {
            Condition::Or(Box::new(push_negations(*l)), Box::new(push_negations(*r)))
        }
        atom => atom,
    }
}

/// Pass 2: bottom-up removal of `True`/`False` per the And/Or identity and
/// annihilator laws. Only And/Or nodes are rewritten.
fn eliminate_identities(c: Condition) -> Condition {
    match c {
        Condition::And(l, r) => {
            let left = eliminate_identities(*l);
            let right = eliminate_identities(*r);
            match (left, right) {
                (Condition::True, right) => right,
                (left, Condition::True) => left,
                (Condition::False, _) | (_, Condition::False) => Condition::False,
                (left, right) => Condition::And(Box::new(left), Box::new(right)),
            }
        }
        Condition::Or(l, r) => {
            let left = eliminate_identities(*l);
            let right = eliminate_identities(*r);
            match (left, right) {
                (Condition::False, right) => right,
                (left, Condition::False) => left,
                (Condition::True, _) | (_, Condition::True) => Condition::True,
                (left, right) => Condition::Or(Box::new(left), Box::new(right)),
            }
        }
        other => other,
    }
}

fn flatten_ands(c: Condition) -> Vec<Condition> {
    match c {
        Condition::And(l, r) => {
            let mut terms = flatten_ands(*l);
            terms.extend(flatten_ands(*r));
            terms
        }
        other => vec![other],
    }
}

fn flatten_ors(c: Condition) -> Vec<Condition> {
    match c {
        Condition::Or(l, r) => {
            let mut terms = flatten_ors(*l);
            terms.extend(flatten_ors(*r));
            terms
        }
        other => vec![other],
    }
}

/// Rebuild a term list as a left-associated And chain. Empty input yields
/// the And identity.
fn build_and(terms: Vec<Condition>) -> Condition {
    terms
        .into_iter()
        .reduce(|acc, t| Condition::And(Box::new(acc), Box::new(t)))
        .unwrap_or(Condition::True)
}

/// Rebuild a term list as a left-associated Or chain. Empty input yields
/// the Or identity.
fn build_or(terms: Vec<Condition>) -> Condition {
    terms
        .into_iter()
        .reduce(|acc, t| Condition::Or(Box::new(acc), Box::new(t)))
        .unwrap_or(Condition::False)
}

/// Pass 3: collapse nested And chains (and Or chains) into flat term
/// lists, then rebuild left-associated.
fn flatten_condition(c: Condition) -> Condition {
    match c {
        Condition::And(l, r) => {
            let mut terms = flatten_ands(flatten_condition(*l));
            terms.extend(flatten_ands(flatten_condition(*r)));
            build_and(terms.into_iter().map(flatten_condition).collect())
        }
        Condition::Or(l, r) => {
            let mut terms = flatten_ors(flatten_condition(*l));
            terms.extend(flatten_ors(flatten_condition(*r)));
            build_or(terms.into_iter().map(flatten_condition).collect())
        }
        Condition::Not(inner) => Condition::Not(Box::new(flatten_condition(*inner))),
        atom => atom,
    }
}

/// Fixed variant priority for the canonical term order:
/// True < False < HasText < InApp < TimeAfter < TimeBefore < FeatureEq
/// < Not < And < Or.
fn priority(c: &Condition) -> u8 {
    match c {
        Condition::True => 0,
        Condition::False => 1,
        Condition::HasText(_) => 2,
        Condition::InApp(_) => 3,
        Condition::TimeAfter(_) => 4,
        Condition::TimeBefore(_) => 5,
        Condition::FeatureEq { .. } => 6,
        Condition::Not(_) => 7,
        Condition::And(_, _) => 8,
        Condition::Or(_, _) => 9,
    }
}

/// Stable structural key for a term: variant priority first, serialized
/// form second. Serialization of a condition cannot fail in practice; an
/// empty string fallback keeps the sort total regardless.
fn sort_key(c: &Condition) -> (u8, String) {
    (priority(c), serde_json::to_string(c).unwrap_or_default())
}

/// Pass 4: order each flattened And/Or term list canonically and rebuild.
fn sort_condition(c: Condition) -> Condition {
    match c {
        Condition::And(l, r) => {
            let mut terms = flatten_ands(Condition::And(
                Box::new(sort_condition(*l)),
                Box::new(sort_condition(*r)),
            ));
            terms.sort_by_cached_key(sort_key);
            build_and(terms)
        }
        Condition::Or(l, r) => {
            let mut terms = flatten_ors(Condition::Or(
                Box::new(sort_condition(*l)),
                Box::new(sort_condition(*r)),
            ));
            terms.sort_by_cached_key(sort_key);
            build_or(terms)
        }
        Condition::Not(inner) => Condition::Not(Box::new(sort_condition(*inner))),
        atom => atom,
    }
}

/// Four-pass canonicalization. Idempotent; equal up to associativity and
/// term order of a single And/Or level. Does not distribute or absorb.
#[must_use]
pub fn normalize(condition: Condition) -> Condition {
    sort_condition(flatten_condition(eliminate_identities(push_negations(
        condition,
    ))))
}

/// Stable, injective textual key for a condition: the serialized form of
/// its normalization. Structurally-equal normalized conditions always
/// produce identical keys. Used by the store's secondary index.
pub fn key(condition: &Condition) -> Result<String> {
    Ok(serde_json::to_string(&normalize(condition.clone()))?)
}

/// Scalar narrowness measure of a condition. And sums its children (it
/// narrows the match), Or takes the minimum (the conservative bound), Not
/// passes through.
#[must_use]
pub fn specificity(condition: &Condition) -> f64 {
    match condition {
        Condition::True => 0.0,
        Condition::False => 1.0,
        Condition::HasText(_) => 0.3,
        Condition::InApp(_) => 0.4,
        Condition::TimeAfter(_) | Condition::TimeBefore(_) => 0.2,
        Condition::FeatureEq { .. } => 0.5,
        Condition::And(l, r) => specificity(l) + specificity(r),
        Condition::Or(l, r) => specificity(l).min(specificity(r)),
        Condition::Not(inner) => specificity(inner),
    }
}
