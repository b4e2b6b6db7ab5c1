//! Queries used by the redisplay scheduler.
//!
//! After a property changes, a previously shown message is only worth
//! re-checking if its trigger tree refers to that property.

use crate::message::TriggerTree;

/// True if any changed key names a trigger in `tree` by property or by id.
#[must_use]
pub fn is_trigger_on_message<S: AsRef<str>>(tree: &TriggerTree, changed_keys: &[S]) -> bool {
    if changed_keys.is_empty() {
        return false;
    }
    tree.triggers().any(|trigger| {
        changed_keys.iter().any(|key| {
            let key = key.as_ref();
            // An empty property names nothing, so it never matches a changed key.
            (!trigger.property.is_empty() && key == trigger.property) || key == trigger.trigger_id
        })
    })
}

/// True if `tree` is non-empty and every trigger is decided dynamically.
#[must_use]
pub fn message_has_only_dynamic_triggers(tree: &TriggerTree) -> bool {
    let mut triggers = tree.triggers().peekable();
    if triggers.peek().is_none() {
        return false;
    }
    triggers.all(|trigger| trigger.kind.is_dynamic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{Trigger, TriggerKind, TriggerOperator};

    fn session(id: &str) -> Trigger {
        Trigger::dynamic(TriggerKind::SessionTime, id, TriggerOperator::GreaterThan, Some(5.into()))
    }

    #[test]
    fn trigger_on_message_by_property() {
        let tree = TriggerTree::all_of(vec![Trigger::custom("p1", TriggerOperator::Exists, None).with_id("t1")]);
        assert!(is_trigger_on_message(&tree, &["p1"]));
        assert!(!is_trigger_on_message(&tree, &["p2"]));
    }

    #[test]
    fn trigger_on_message_by_id() {
        let tree = TriggerTree::all_of(vec![session("s-9")])
            .or(vec![Trigger::custom("p1", TriggerOperator::Exists, None).with_id("t1")]);
        assert!(is_trigger_on_message(&tree, &["t1".to_string()]));
        assert!(is_trigger_on_message(&tree, &["x", "s-9"]));
    }

    #[test]
    fn empty_key_never_matches_a_missing_property() {
        let tree = TriggerTree::all_of(vec![session("s-1")]);
        assert!(!is_trigger_on_message(&tree, &[""]));
        assert!(is_trigger_on_message(&tree, &["", "s-1"]));
    }

    #[test]
    fn no_changed_keys_or_empty_tree() {
        let tree = TriggerTree::all_of(vec![session("s")]);
        let none: [&str; 0] = [];
        assert!(!is_trigger_on_message(&tree, &none));
        assert!(!is_trigger_on_message(&TriggerTree::empty(), &["s"]));
    }

    #[test]
    fn only_dynamic_triggers() {
        assert!(message_has_only_dynamic_triggers(&TriggerTree::all_of(vec![session("s")])));

        let mixed = TriggerTree::all_of(vec![session("s")])
            .or(vec![Trigger::custom("p", TriggerOperator::Exists, None)]);
        assert!(!message_has_only_dynamic_triggers(&mixed));

        let mut unknown = session("u");
        unknown.kind = TriggerKind::Unknown;
        assert!(!message_has_only_dynamic_triggers(&TriggerTree::all_of(vec![unknown])));

        assert!(!message_has_only_dynamic_triggers(&TriggerTree::empty()));
        assert!(!message_has_only_dynamic_triggers(&TriggerTree::new(vec![vec![]])));
    }
}
