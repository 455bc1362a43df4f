//! End-to-end interpreter scenarios: execute a realistic hook, roll it
//! back, and check what the rollback does and does not restore.

use hakenwerk_core::{
    Action, Context, Feature, FeatureValue, Hook, Metadata, Op, OutcomePlan, Stats,
};
use hakenwerk_engine::cond::{self, in_app};
use hakenwerk_engine::hooks::eval_hook;
use hakenwerk_engine::interp::{interpret_plan, interpret_rollback, make_rollback_plan};
use time::OffsetDateTime;

fn note_taking_hook() -> Hook {
    let ops = vec![
        Op::OpenApp("notepad".to_string()),
        Op::TypeText("This is a test note".to_string()),
        Op::ClickElement("save_as".to_string()),
    ];
    let condition = in_app("notepad_prev");
    let specificity = cond::specificity(&condition);
    Hook {
        id: "note_taking".to_string(),
        condition,
        action: Action {
            plan: OutcomePlan {
                rollback: make_rollback_plan(&ops),
                ops,
                cost: 3.0,
            },
            description: "Open notepad and save a note".to_string(),
        },
        stats: Stats {
            success: 0.8,
            uses: 12,
            corrections: 1,
        },
        meta: Metadata {
            created: OffsetDateTime::UNIX_EPOCH,
            modified: OffsetDateTime::UNIX_EPOCH,
            source: "fixture".to_string(),
            tags: vec!["notes".to_string()],
        },
        specificity,
    }
}

#[test]
fn execute_then_rollback_restores_app_but_not_time() {
    let hook = note_taking_hook();
    let mut pre = Context::empty();
    pre.app = Some("notepad_prev".to_string());
    let t0 = pre.time;

    let plan = eval_hook(&hook, &pre).expect("condition should hold");
    let (post, rollback) = interpret_plan(&plan, &pre);

    assert_eq!(post.app.as_deref(), Some("notepad"));
    assert_eq!(
        post.features.get(&Feature::new("typed_text", "text")),
        Some(&FeatureValue::Text("This is a test note".to_string()))
    );
    assert_eq!(rollback.context, pre);

    let restored = interpret_rollback(&rollback, &post);
    assert_eq!(restored.app.as_deref(), Some("notepad_prev"));
    assert!(restored.features.is_empty());
    // None of the synthesized inverses wait for a nonzero duration, so the
    // restored clock is exactly t0.
    assert_eq!(restored.time, t0);
}

#[test]
fn hook_does_not_fire_outside_its_app() {
    let hook = note_taking_hook();
    let mut elsewhere = Context::empty();
    elsewhere.app = Some("email".to_string());
    assert!(eval_hook(&hook, &elsewhere).is_none());
    assert!(eval_hook(&hook, &Context::empty()).is_none());
}
