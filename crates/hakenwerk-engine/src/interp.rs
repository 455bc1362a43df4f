//! The symbolic op interpreter: applying ops to contexts, inverse
//! synthesis, rollback and plan composition.
//!
//! Ops never touch a real device. The text-producing ops write their
//! payload under a fixed per-kind feature slot, so repeated ops of one
//! kind overwrite each other and only the last value survives an
//! application.

use hakenwerk_core::{
    Action, Context, Feature, FeatureValue, Hook, Op, Outcome, OutcomePlan, RollbackPlan,
};
use time::Duration;

/// Fixed feature slots written by the interpreter.
fn typed_text_slot() -> Feature {
    Feature::new("typed_text", "text")
}

fn clicked_element_slot() -> Feature {
    Feature::new("clicked_element", "ui")
}

fn sent_keys_slot() -> Feature {
    Feature::new("sent_keys", "input")
}

/// Apply one op to a context, producing the successor context.
#[must_use]
pub fn apply(op: &Op, ctx: &Context) -> Context {
    match op {
        Op::TypeText(text) => {
            ctx.with_feature(typed_text_slot(), FeatureValue::Text(text.clone()))
        }
        Op::ClickElement(element) => {
            ctx.with_feature(clicked_element_slot(), FeatureValue::Text(element.clone()))
        }
        Op::OpenApp(app) => {
            let mut next = ctx.clone();
            next.app = Some(app.clone());
            next
        }
        Op::SendKeys(keys) => ctx.with_feature(sent_keys_slot(), FeatureValue::Text(keys.clone())),
        Op::Wait(seconds) => {
            let mut next = ctx.clone();
            next.time = ctx.time + Duration::seconds_f64(*seconds);
            next
        }
        Op::Sequence(ops) => apply_sequence(ops, ctx),
    }
}

/// Fold [`apply`] over a flat op list, left to right.
#[must_use]
pub fn apply_sequence(ops: &[Op], ctx: &Context) -> Context {
    ops.iter().fold(ctx.clone(), |out, op| apply(op, &out))
}

/// Derived inverse of an op, used to synthesize rollback plans. This is
/// an approximation, not a semantic inverse: typed text becomes that many
/// backspaces, clicks are assumed toggle-safe, app switches and waits
/// degrade to `Wait(0)` since the prior app is unknown and time cannot be
/// un-spent.
#[must_use]
pub fn invert(op: &Op) -> Op {
    match op {
        Op::TypeText(text) => Op::SendKeys("\u{8}".repeat(text.chars().count())),
        Op::ClickElement(element) => Op::ClickElement(element.clone()),
        Op::OpenApp(_) => Op::Wait(0.0),
        Op::SendKeys(keys) => Op::SendKeys("\u{8}".repeat(keys.chars().count())),
        Op::Wait(_) => Op::Wait(0.0),
        Op::Sequence(ops) => Op::Sequence(ops.iter().rev().map(invert).collect()),
    }
}

/// Synthesize a rollback plan for an op list: the inverse of each op, in
/// reverse (LIFO) order. The captured context starts as the placeholder
/// [`Context::empty`] and is overwritten with the true pre-action snapshot
/// when the owning plan is interpreted.
#[must_use]
pub fn make_rollback_plan(ops: &[Op]) -> RollbackPlan {
    RollbackPlan {
        ops: ops.iter().rev().map(invert).collect(),
        context: Context::empty(),
    }
}

/// Apply a plan's ops to a context. Returns the successor context and the
/// plan's rollback with its captured context replaced by the pre-action
/// snapshot.
#[must_use]
pub fn interpret_plan(plan: &OutcomePlan, ctx: &Context) -> (Context, RollbackPlan) {
    let post = apply_sequence(&plan.ops, ctx);
    let rollback = RollbackPlan {
        ops: plan.rollback.ops.clone(),
        context: ctx.clone(),
    };
    (post, rollback)
}

/// Interpret an action's plan. See [`interpret_plan`].
#[must_use]
pub fn interpret_action(action: &Action, ctx: &Context) -> (Context, RollbackPlan) {
    interpret_plan(&action.plan, ctx)
}

/// Restore the captured pre-action snapshot, except for time: the
/// rollback ops are applied to the current context purely to obtain the
/// elapsed timestamp, and that timestamp replaces the snapshot's. Every
/// other field comes back exactly as captured. This asymmetry is
/// deliberate: rolling back cannot un-spend time.
#[must_use]
pub fn interpret_rollback(rollback_plan: &RollbackPlan, current_ctx: &Context) -> Context {
    let after_rollback = apply_sequence(&rollback_plan.ops, current_ctx);
    let mut restored = rollback_plan.context.clone();
    restored.time = after_rollback.time;
    restored
}

/// Run a hook's action ops over a context. `correction` is always false
/// here; corrections are reported later through the stats update.
#[must_use]
pub fn execute(hook: &Hook, ctx: &Context) -> Outcome {
    let (post, _rollback) = interpret_action(&hook.action, ctx);
    Outcome {
        post,
        correction: false,
        plan: hook.action.plan.clone(),
    }
}

/// Undo an executed outcome against the current context.
#[must_use]
pub fn rollback(outcome: &Outcome, ctx: &Context) -> Context {
    interpret_rollback(&outcome.plan.rollback, ctx)
}

/// Combine the rollbacks of two plans run `first` then `second`: the
/// second plan's effect is undone before the first's, so the op order is
/// `second.ops ++ first.ops`. The captured context is the first plan's,
/// the earliest snapshot. Non-commutative by construction.
#[must_use]
pub fn compose_rollbacks(first: &RollbackPlan, second: &RollbackPlan) -> RollbackPlan {
    let mut ops = second.ops.clone();
    ops.extend(first.ops.iter().cloned());
    RollbackPlan {
        ops,
        context: first.context.clone(),
    }
}

/// Sequential plan composition: forward ops concatenate in order, costs
/// sum, rollbacks combine in reverse via [`compose_rollbacks`].
/// Non-commutative.
#[must_use]
pub fn compose_plans(first: &OutcomePlan, second: &OutcomePlan) -> OutcomePlan {
    let mut ops = first.ops.clone();
    ops.extend(second.ops.iter().cloned());
    OutcomePlan {
        ops,
        rollback: compose_rollbacks(&first.rollback, &second.rollback),
        cost: first.cost + second.cost,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn ops_write_fixed_slots_and_overwrite() {
        let ctx = Context::empty();
        let once = apply(&Op::TypeText("first".into()), &ctx);
        let twice = apply(&Op::TypeText("second".into()), &once);
        assert_eq!(
            twice.features.get(&typed_text_slot()),
            Some(&FeatureValue::Text("second".into()))
        );
        assert_eq!(twice.features.len(), 1);
    }

    #[test]
    fn open_app_and_wait() {
        let ctx = Context::empty();
        let in_app = apply(&Op::OpenApp("notepad".into()), &ctx);
        assert_eq!(in_app.app.as_deref(), Some("notepad"));

        let later = apply(&Op::Wait(2.5), &in_app);
        assert_eq!(later.time - ctx.time, Duration::seconds_f64(2.5));
    }

    #[test]
    fn sequence_folds_left_to_right() {
        let seq = Op::Sequence(vec![
            Op::OpenApp("email".into()),
            Op::TypeText("hello".into()),
            Op::OpenApp("calendar".into()),
        ]);
        let post = apply(&seq, &Context::empty());
        assert_eq!(post.app.as_deref(), Some("calendar"));
        assert_eq!(
            post.features.get(&typed_text_slot()),
            Some(&FeatureValue::Text("hello".into()))
        );
    }

    #[test]
    fn invert_table() {
        assert_eq!(
            invert(&Op::TypeText("abc".into())),
            Op::SendKeys("\u{8}\u{8}\u{8}".into())
        );
        assert_eq!(
            invert(&Op::ClickElement("save".into())),
            Op::ClickElement("save".into())
        );
        assert_eq!(invert(&Op::OpenApp("email".into())), Op::Wait(0.0));
        assert_eq!(invert(&Op::Wait(3.0)), Op::Wait(0.0));
        assert_eq!(
            invert(&Op::Sequence(vec![
                Op::TypeText("ab".into()),
                Op::ClickElement("ok".into()),
            ])),
            Op::Sequence(vec![
                Op::ClickElement("ok".into()),
                Op::SendKeys("\u{8}\u{8}".into()),
            ])
        );
    }

    #[test]
    fn rollback_plan_reverses_and_inverts() {
        let plan = make_rollback_plan(&[
            Op::OpenApp("notepad".into()),
            Op::TypeText("hi".into()),
        ]);
        assert_eq!(
            plan.ops,
            vec![Op::SendKeys("\u{8}\u{8}".into()), Op::Wait(0.0)]
        );
        assert_eq!(plan.context, Context::empty());
    }

    #[test]
    fn interpret_plan_captures_pre_action_snapshot() {
        let mut pre = Context::empty();
        pre.app = Some("notepad_prev".into());

        let ops = vec![Op::OpenApp("notepad".into())];
        let plan = OutcomePlan {
            rollback: make_rollback_plan(&ops),
            ops,
            cost: 1.0,
        };

        let (post, rollback) = interpret_plan(&plan, &pre);
        assert_eq!(post.app.as_deref(), Some("notepad"));
        assert_eq!(rollback.context, pre);
    }

    #[test]
    fn rollback_restores_everything_but_time() {
        let mut pre = Context::empty();
        pre.app = Some("notepad_prev".into());

        let ops = vec![Op::OpenApp("notepad".into()), Op::Wait(5.0)];
        let plan = OutcomePlan {
            rollback: make_rollback_plan(&ops),
            ops,
            cost: 2.0,
        };

        let (post, rollback) = interpret_plan(&plan, &pre);
        assert_eq!(post.time - pre.time, Duration::seconds(5));

        let restored = interpret_rollback(&rollback, &post);
        assert_eq!(restored.app.as_deref(), Some("notepad_prev"));
        // The synthesized inverses are all Wait(0), so time stays at the
        // post-action instant rather than reverting to the snapshot's.
        assert_eq!(restored.time, post.time);
    }

    #[test]
    fn compose_plans_concatenates_forward_and_reverses_rollback() {
        let mut earliest = Context::empty();
        earliest.app = Some("editor".into());
        let mut later = Context::empty();
        later.app = Some("browser".into());

        let a_ops = vec![Op::TypeText("a".into())];
        let mut a = OutcomePlan {
            rollback: make_rollback_plan(&a_ops),
            ops: a_ops,
            cost: 1.0,
        };
        a.rollback.context = earliest.clone();
        let b_ops = vec![Op::ClickElement("ok".into())];
        let mut b = OutcomePlan {
            rollback: make_rollback_plan(&b_ops),
            ops: b_ops,
            cost: 2.0,
        };
        b.rollback.context = later;

        let combined = compose_plans(&a, &b);
        assert_eq!(
            combined.ops,
            vec![Op::TypeText("a".into()), Op::ClickElement("ok".into())]
        );
        // Undo b before a.
        assert_eq!(
            combined.rollback.ops,
            vec![Op::ClickElement("ok".into()), Op::SendKeys("\u{8}".into())]
        );
        // The combined rollback targets the earliest snapshot.
        assert_eq!(combined.rollback.context, earliest);
        assert_eq!(combined.cost, 3.0);
    }
}
