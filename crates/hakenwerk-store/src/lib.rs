#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Hook store operations and validated domain values.
//!
//! The store is a pure in-memory value: every operation takes a store by
//! reference and returns a new one, so two callers holding the "same"
//! store can never observe each other's writes. Next to the primary map
//! from hook id to hook, a secondary index maps the canonical condition
//! key (the serialized normalized condition) to hook ids. The index is
//! maintained on insert but deliberately not pruned on delete; activation
//! never consults it, so a stale entry is harmless bookkeeping.

use hakenwerk_core::{Condition, Hook, HookStore, SelectionPolicy};
use hakenwerk_engine::cond;

pub mod error;

pub use error::{DomainError, Result, StoreError};

/// The default selection policy: minimize input, full success weight,
/// cascading enabled.
#[must_use]
pub fn default_policy() -> SelectionPolicy {
    SelectionPolicy {
        minimize_input: true,
        success_weight: 1.0,
        max_cascade_depth: 3,
    }
}

/// A store with no hooks and no index entries.
#[must_use]
pub fn empty_store() -> HookStore {
    HookStore::default()
}

/// Canonical index key for a condition. Structurally-equal normalized
/// conditions always produce identical keys.
pub fn condition_key(condition: &Condition) -> Result<String> {
    Ok(cond::key(condition)?)
}

/// New store with the hook inserted into the primary map and its id
/// appended under its condition key.
pub fn insert_hook(hook: Hook, store: &HookStore) -> Result<HookStore> {
    let key = condition_key(&hook.condition)?;
    let mut next = store.clone();
    next.index.entry(key).or_default().push(hook.id.clone());
    next.hooks.insert(hook.id.clone(), hook);
    Ok(next)
}

#[must_use]
pub fn lookup_hook<'a>(hook_id: &str, store: &'a HookStore) -> Option<&'a Hook> {
    store.hooks.get(hook_id)
}

/// New store without the hook. Removes the primary-map entry only; index
/// entries pointing at the id stay behind.
#[must_use]
pub fn delete_hook(hook_id: &str, store: &HookStore) -> HookStore {
    let mut next = store.clone();
    next.hooks.remove(hook_id);
    next
}

/// Replace a hook under its own id: delete then insert. The index picks
/// up the new condition key while keeping the old one.
pub fn update_hook(hook: Hook, store: &HookStore) -> Result<HookStore> {
    insert_hook(hook.clone(), &delete_hook(&hook.id, store))
}

/// Learning rate, valid iff `0 < x < 1`.
pub fn mk_alpha(x: f64) -> std::result::Result<f64, DomainError> {
    if x > 0.0 && x < 1.0 {
        Ok(x)
    } else {
        Err(DomainError::Alpha(x))
    }
}

/// Success score, valid iff `0 <= x <= 1`.
pub fn mk_score(x: f64) -> std::result::Result<f64, DomainError> {
    if (0.0..=1.0).contains(&x) {
        Ok(x)
    } else {
        Err(DomainError::Score(x))
    }
}

/// Plan cost, valid iff `x >= 0`.
pub fn mk_cost(x: f64) -> std::result::Result<f64, DomainError> {
    if x >= 0.0 {
        Ok(x)
    } else {
        Err(DomainError::Cost(x))
    }
}

/// Condition narrowness, valid iff `x >= 0`.
pub fn mk_specificity(x: f64) -> std::result::Result<f64, DomainError> {
    if x >= 0.0 {
        Ok(x)
    } else {
        Err(DomainError::Specificity(x))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use hakenwerk_core::{Action, Metadata, Op, OutcomePlan, Stats};
    use hakenwerk_engine::cond::has_text;
    use time::OffsetDateTime;

    fn hook(id: &str, condition: Condition) -> Hook {
        let specificity = cond::specificity(&condition);
        Hook {
            id: id.to_string(),
            condition,
            action: Action {
                plan: OutcomePlan {
                    ops: vec![Op::ClickElement("ok".into())],
                    rollback: hakenwerk_core::RollbackPlan::empty(),
                    cost: 1.0,
                },
                description: "test action".to_string(),
            },
            stats: Stats {
                success: 0.5,
                uses: 0,
                corrections: 0,
            },
            meta: Metadata {
                created: OffsetDateTime::UNIX_EPOCH,
                modified: OffsetDateTime::UNIX_EPOCH,
                source: "test".to_string(),
                tags: vec![],
            },
            specificity,
        }
    }

    #[test]
    fn insert_lookup_delete() {
        let store = insert_hook(hook("h1", has_text("copy")), &empty_store()).expect("insert");
        assert!(lookup_hook("h1", &store).is_some());
        assert!(lookup_hook("h2", &store).is_none());

        let emptied = delete_hook("h1", &store);
        assert!(lookup_hook("h1", &emptied).is_none());
        // The original value is untouched.
        assert!(lookup_hook("h1", &store).is_some());
    }

    #[test]
    fn delete_leaves_index_entries() {
        let h = hook("h1", has_text("copy"));
        let key = condition_key(&h.condition).expect("key");
        let store = insert_hook(h, &empty_store()).expect("insert");
        let emptied = delete_hook("h1", &store);

        assert!(emptied.hooks.is_empty());
        assert_eq!(
            emptied.index.get(&key),
            Some(&vec!["h1".to_string()]),
            "index entries survive deletion"
        );
    }

    #[test]
    fn update_keeps_stale_index_entry_alongside_fresh_one() {
        let original = hook("h", has_text("old"));
        let key_old = condition_key(&original.condition).expect("key");
        let store = insert_hook(original, &empty_store()).expect("insert");

        let replacement = hook("h", has_text("new"));
        let key_new = condition_key(&replacement.condition).expect("key");
        let updated = update_hook(replacement, &store).expect("update");

        let current = lookup_hook("h", &updated).expect("hook present");
        assert_eq!(current.condition, has_text("new"));
        // Both the stale and the fresh key point at the id.
        assert_eq!(updated.index.get(&key_old), Some(&vec!["h".to_string()]));
        assert_eq!(updated.index.get(&key_new), Some(&vec!["h".to_string()]));
    }

    #[test]
    fn condition_key_ignores_term_order() {
        use hakenwerk_engine::cond::{and, in_app};
        let k1 = condition_key(&and(has_text("a"), in_app("email"))).expect("key");
        let k2 = condition_key(&and(in_app("email"), has_text("a"))).expect("key");
        assert_eq!(k1, k2);
        // The key is the serialized normalized condition.
        assert!(serde_json::from_str::<serde_json::Value>(&k1).is_ok());
    }

    #[test]
    fn bounded_constructors_reject_out_of_range() {
        assert_eq!(mk_alpha(0.5), Ok(0.5));
        assert_eq!(mk_alpha(0.0), Err(DomainError::Alpha(0.0)));
        assert_eq!(mk_alpha(1.0), Err(DomainError::Alpha(1.0)));
        assert!(mk_alpha(f64::NAN).is_err());

        assert_eq!(mk_score(0.0), Ok(0.0));
        assert_eq!(mk_score(1.0), Ok(1.0));
        assert_eq!(mk_score(1.1), Err(DomainError::Score(1.1)));

        assert_eq!(mk_cost(0.0), Ok(0.0));
        assert_eq!(mk_cost(-0.1), Err(DomainError::Cost(-0.1)));

        assert_eq!(mk_specificity(2.5), Ok(2.5));
        assert_eq!(mk_specificity(-1.0), Err(DomainError::Specificity(-1.0)));
    }

    #[test]
    fn default_policy_values() {
        let policy = default_policy();
        assert!(policy.minimize_input);
        assert_eq!(policy.success_weight, 1.0);
        assert_eq!(policy.max_cascade_depth, 3);
    }
}
