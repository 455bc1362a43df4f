//! The hook engine: activation, prioritization, composition, refinement,
//! equivalence, cascading, delta learning and the trust-stats update.

use hakenwerk_core::{
    Action, Condition, Context, Equivalence, Hook, HookMatch, HookStore, Metadata, Outcome,
    OutcomePlan, SelectionPolicy, Snapshot, Stats, UserInput,
};

use crate::cond;
use crate::error::Result;
use crate::interp::{compose_plans, make_rollback_plan};

/// A hook's action cost: the cost of its forward plan.
#[must_use]
pub fn estimate_cost(action: &Action) -> f64 {
    action.plan.cost
}

/// An action's plan. Trivial today; kept as the seam a cost model or a
/// context-dependent planner would slot into.
#[must_use]
pub fn eval_action(action: &Action, _ctx: &Context) -> OutcomePlan {
    action.plan.clone()
}

/// The hook's plan when its condition holds in the context, else nothing.
#[must_use]
pub fn eval_hook(hook: &Hook, ctx: &Context) -> Option<OutcomePlan> {
    cond::eval(&hook.condition, ctx).then(|| eval_action(&hook.action, ctx))
}

/// Scan every hook in the store's primary map and emit one match per true
/// condition evaluation. The secondary index is bookkeeping and is not
/// consulted here.
#[must_use]
pub fn activate(store: &HookStore, ctx: &Context) -> Vec<HookMatch> {
    store
        .hooks
        .values()
        .filter(|hook| cond::eval(&hook.condition, ctx))
        .map(|hook| HookMatch {
            hook: hook.clone(),
            context: ctx.clone(),
            cost: estimate_cost(&hook.action),
        })
        .collect()
}

/// Select the match minimizing `(cost ascending, success descending)`.
/// Remaining ties go to the first-encountered match; none on empty input.
#[must_use]
pub fn prioritize(_policy: &SelectionPolicy, matches: &[HookMatch]) -> Option<HookMatch> {
    let mut best: Option<&HookMatch> = None;
    for candidate in matches {
        best = match best {
            None => Some(candidate),
            Some(current)
                if candidate.cost < current.cost
                    || (candidate.cost == current.cost
                        && candidate.hook.stats.success > current.hook.stats.success) =>
            {
                Some(candidate)
            }
            Some(current) => Some(current),
        };
    }
    best.cloned()
}

/// Condition inferred from a context delta. Only the app-change heuristic
/// is implemented: a switch to a present app yields `InApp(after.app)`,
/// everything else yields the always-true condition. No other feature
/// delta is inferred.
#[must_use]
pub fn infer_condition(before: &Context, after: &Context) -> Condition {
    if before.app != after.app {
        if let Some(app) = &after.app {
            return Condition::InApp(app.clone());
        }
    }
    Condition::True
}

/// Action inferred from recorded user input: a verbatim replay of the ops
/// with a synthesized rollback and cost equal to the op count.
#[must_use]
pub fn infer_action(user_input: &UserInput) -> Action {
    #[allow(clippy::cast_precision_loss)]
    let cost = user_input.ops.len() as f64;
    Action {
        plan: OutcomePlan {
            ops: user_input.ops.clone(),
            rollback: make_rollback_plan(&user_input.ops),
            cost,
        },
        description: "Learned from user input".to_string(),
    }
}

/// Learn a hook from the delta between two snapshots and the user input
/// recorded between them, and insert it into the store. The new hook gets
/// id `learned_{after.id}`, a neutral prior (success 0.5, no uses) and
/// source "learned". `_alpha` is accepted for interface stability but not
/// consumed by the current heuristic.
pub fn learn_delta(
    _alpha: f64,
    before: &Snapshot,
    after: &Snapshot,
    user_input: &UserInput,
    store: &HookStore,
) -> Result<HookStore> {
    let condition = infer_condition(&before.context, &after.context);
    let specificity = cond::specificity(&condition);
    let hook = Hook {
        id: format!("learned_{}", after.id),
        condition,
        action: infer_action(user_input),
        stats: Stats {
            success: 0.5,
            uses: 0,
            corrections: 0,
        },
        meta: Metadata {
            created: user_input.time,
            modified: user_input.time,
            source: "learned".to_string(),
            tags: vec!["delta".to_string()],
        },
        specificity,
    };

    #[cfg(feature = "telemetry")]
    tracing::debug!(hook_id = %hook.id, specificity, "learned hook from context delta");

    let key = cond::key(&hook.condition)?;
    let mut next = store.clone();
    next.index.entry(key).or_default().push(hook.id.clone());
    next.hooks.insert(hook.id.clone(), hook);
    Ok(next)
}

/// Average success, summed uses and corrections.
#[must_use]
pub fn combine_stats(s1: &Stats, s2: &Stats) -> Stats {
    Stats {
        success: (s1.success + s2.success) / 2.0,
        uses: s1.uses + s2.uses,
        corrections: s1.corrections + s2.corrections,
    }
}

/// Earliest created, latest modified, source "composed", tags
/// concatenated.
#[must_use]
pub fn combine_metadata(m1: &Metadata, m2: &Metadata) -> Metadata {
    let mut tags = m1.tags.clone();
    tags.extend(m2.tags.iter().cloned());
    Metadata {
        created: m1.created.min(m2.created),
        modified: m1.modified.max(m2.modified),
        source: "composed".to_string(),
        tags,
    }
}

/// Sequential composition: the conjunction of both conditions gates both
/// plans run back to back. Specificity sums since the AND narrows the
/// match.
#[must_use]
pub fn compose_nested(h1: &Hook, h2: &Hook) -> Hook {
    Hook {
        id: format!("{}_then_{}", h1.id, h2.id),
        condition: cond::and(h1.condition.clone(), h2.condition.clone()),
        action: Action {
            plan: compose_plans(&h1.action.plan, &h2.action.plan),
            description: format!(
                "{} then {}",
                h1.action.description, h2.action.description
            ),
        },
        stats: combine_stats(&h1.stats, &h2.stats),
        meta: combine_metadata(&h1.meta, &h2.meta),
        specificity: h1.specificity + h2.specificity,
    }
}

/// Alternative composition: either condition fires the combined plan.
/// Specificity takes the minimum, the conservative bound, since the OR
/// widens the match.
#[must_use]
pub fn compose_flat(h1: &Hook, h2: &Hook) -> Hook {
    Hook {
        id: format!("{}_and_{}", h1.id, h2.id),
        condition: cond::or(h1.condition.clone(), h2.condition.clone()),
        action: Action {
            plan: compose_plans(&h1.action.plan, &h2.action.plan),
            description: format!("{} and {}", h1.action.description, h2.action.description),
        },
        stats: combine_stats(&h1.stats, &h2.stats),
        meta: combine_metadata(&h1.meta, &h2.meta),
        specificity: h1.specificity.min(h2.specificity),
    }
}

/// Alias for [`compose_flat`].
#[must_use]
pub fn combine_hooks(h1: &Hook, h2: &Hook) -> Hook {
    compose_flat(h1, h2)
}

/// Narrow `specific` with `general`'s condition. Action, stats and
/// metadata stay those of `specific`.
#[must_use]
pub fn refine(general: &Hook, specific: &Hook) -> Hook {
    let mut refined = specific.clone();
    refined.condition = cond::and(general.condition.clone(), specific.condition.clone());
    refined.specificity = general.specificity + specific.specificity;
    refined
}

/// Hooks are equivalent iff their normalized conditions are structurally
/// equal and their plans match exactly. Id, stats, metadata and
/// specificity are ignored.
#[must_use]
pub fn equivalent(h1: &Hook, h2: &Hook) -> Equivalence {
    let same_condition =
        cond::normalize(h1.condition.clone()) == cond::normalize(h2.condition.clone());
    let same_action = h1.action.plan == h2.action.plan;
    if same_condition && same_action {
        Equivalence::Equivalent
    } else {
        Equivalence::NotEquivalent
    }
}

/// Re-activate the store against an outcome's post context. A positive
/// cascade depth admits the single top-prioritized match; any other depth
/// admits nothing. The depth is a boolean gate only: at most one hook
/// ever comes back and no recursive multi-hop cascading occurs.
#[must_use]
pub fn cascade(policy: &SelectionPolicy, store: &HookStore, outcome: &Outcome) -> Vec<Hook> {
    if policy.max_cascade_depth == 0 {
        return Vec::new();
    }
    let matches = activate(store, &outcome.post);
    match prioritize(policy, &matches) {
        Some(top) => {
            #[cfg(feature = "telemetry")]
            tracing::debug!(hook_id = %top.hook.id, cost = top.cost, "cascade selected hook");
            vec![top.hook]
        }
        None => Vec::new(),
    }
}

/// Exponential-moving-average update penalizing corrections: a reported
/// correction pulls the score toward 0, its absence toward 1. `alpha`
/// must lie in the open interval (0, 1); see `hakenwerk-store`'s
/// `mk_alpha`.
#[must_use]
pub fn negative_rl_update(alpha: f64, old_score: f64, correction: bool) -> f64 {
    let c = if correction { 1.0 } else { 0.0 };
    (1.0 - alpha) * old_score + alpha * (1.0 - c)
}

/// New hook with the negative-RL score, one more use and the correction
/// counted. Uses and corrections never decrease.
#[must_use]
pub fn update_stats(alpha: f64, hook: &Hook, correction: bool) -> Hook {
    let old = &hook.stats;
    let mut updated = hook.clone();
    updated.stats = Stats {
        success: negative_rl_update(alpha, old.success, correction),
        uses: old.uses + 1,
        corrections: old.corrections + u64::from(correction),
    };
    updated
}

/// Scale each hook's success by its share of the combined use count
/// (an even split when neither has been used). The results are
/// independent weighted scores, not renormalized against each other.
/// Standalone utility; nothing else in the engine calls it.
#[must_use]
pub fn normalize_weights(h1: &Hook, h2: &Hook) -> (Hook, Hook) {
    let total_uses = h1.stats.uses + h2.stats.uses;
    #[allow(clippy::cast_precision_loss)]
    let weight1 = if total_uses > 0 {
        h1.stats.uses as f64 / total_uses as f64
    } else {
        0.5
    };
    let weight2 = 1.0 - weight1;

    let mut n1 = h1.clone();
    n1.stats.success = weight1 * h1.stats.success;
    let mut n2 = h2.clone();
    n2.stats.success = weight2 * h2.stats.success;
    (n1, n2)
}
