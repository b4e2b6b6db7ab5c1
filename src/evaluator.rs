//! Trigger and trigger-tree evaluation.
//!
//! Custom triggers are resolved against the value store; every other known
//! kind is delegated to the dynamic evaluator; unknown kinds never fire. A
//! tree holds when any AND-group holds, and an empty tree always holds.
//!
//! Each property is read with its own short lock, so a value may change
//! between two reads of the same evaluation.

use tracing::trace;

use crate::dynamic::DynamicTriggerEvaluator;
use crate::matcher::operator_matches;
use crate::message::TriggerTree;
use crate::store::TriggerValueStore;
use crate::trigger::{Trigger, TriggerKind, TriggerOperator};

/// Evaluates triggers against a value store and a dynamic evaluator.
#[derive(Clone, Copy)]
pub struct TriggerEvaluator<'a> {
    store: &'a TriggerValueStore,
    dynamic: &'a dyn DynamicTriggerEvaluator,
}

impl<'a> TriggerEvaluator<'a> {
    #[must_use]
    pub fn new(store: &'a TriggerValueStore, dynamic: &'a dyn DynamicTriggerEvaluator) -> Self {
        Self { store, dynamic }
    }

    /// Whether a single trigger holds right now.
    #[must_use]
    pub fn evaluate_trigger(&self, trigger: &Trigger) -> bool {
        match trigger.kind {
            TriggerKind::Unknown => false,
            TriggerKind::Custom => self.evaluate_custom(trigger),
            _ => self.dynamic.should_fire(trigger),
        }
    }

    fn evaluate_custom(&self, trigger: &Trigger) -> bool {
        let Some(stored) = self.store.get(&trigger.property) else {
            // An absent value differs from any concrete expected value.
            return match trigger.operator {
                TriggerOperator::NotExists => true,
                TriggerOperator::NotEqualTo => trigger.value.is_some(),
                _ => false,
            };
        };

        let matched = operator_matches(trigger.operator, trigger.value.as_ref(), &stored);
        trace!(property = %trigger.property, operator = %trigger.operator, matched, "custom trigger evaluated");
        matched
    }

    /// AND of every trigger in `group`. Stops at the first miss.
    #[must_use]
    pub fn evaluate_group(&self, group: &[Trigger]) -> bool {
        group.iter().all(|t| self.evaluate_trigger(t))
    }

    /// OR of every AND-group. An empty tree holds.
    #[must_use]
    pub fn evaluate_tree(&self, tree: &TriggerTree) -> bool {
        if tree.is_empty() {
            return true;
        }
        tree.groups().iter().any(|group| self.evaluate_group(group))
    }

    /// Per-trigger results for every group, without short-circuiting.
    #[must_use]
    pub fn explain(&self, tree: &TriggerTree) -> Vec<Vec<bool>> {
        tree.groups()
            .iter()
            .map(|group| group.iter().map(|t| self.evaluate_trigger(t)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::StaticDynamicTriggers;
    use crate::value::TriggerValue;

    fn custom(property: &str, op: TriggerOperator, value: Option<TriggerValue>) -> Trigger {
        Trigger::custom(property, op, value)
    }

    #[test]
    fn unknown_kind_never_fires() {
        let store = TriggerValueStore::new();
        let dynamic = StaticDynamicTriggers::new();
        dynamic.set_firing("u", true);
        store.set("p", 1.into());
        let eval = TriggerEvaluator::new(&store, &dynamic);

        let mut t = custom("p", TriggerOperator::Exists, None).with_id("u");
        t.kind = TriggerKind::Unknown;
        assert!(!eval.evaluate_trigger(&t));
    }

    #[test]
    fn dynamic_kinds_are_delegated() {
        let store = TriggerValueStore::new();
        let dynamic = StaticDynamicTriggers::new();
        let eval = TriggerEvaluator::new(&store, &dynamic);
        let t = Trigger::dynamic(TriggerKind::SessionTime, "s", TriggerOperator::GreaterThan, Some(30.into()));

        assert!(!eval.evaluate_trigger(&t));
        dynamic.set_firing("s", true);
        assert!(eval.evaluate_trigger(&t));
    }

    #[test]
    fn absent_property_rules() {
        let store = TriggerValueStore::new();
        let dynamic = StaticDynamicTriggers::new();
        let eval = TriggerEvaluator::new(&store, &dynamic);

        assert!(eval.evaluate_trigger(&custom("p", TriggerOperator::NotExists, None)));
        assert!(!eval.evaluate_trigger(&custom("p", TriggerOperator::Exists, None)));
        assert!(eval.evaluate_trigger(&custom("p", TriggerOperator::NotEqualTo, Some("x".into()))));
        assert!(!eval.evaluate_trigger(&custom("p", TriggerOperator::NotEqualTo, None)));
        assert!(!eval.evaluate_trigger(&custom("p", TriggerOperator::EqualTo, Some("x".into()))));
        assert!(!eval.evaluate_trigger(&custom("p", TriggerOperator::LessThan, Some(1.into()))));
        assert!(!eval.evaluate_trigger(&custom("p", TriggerOperator::Contains, Some("x".into()))));
    }

    #[test]
    fn present_property_uses_matcher() {
        let store = TriggerValueStore::new();
        let dynamic = StaticDynamicTriggers::new();
        store.set("p", "5.0".into());
        let eval = TriggerEvaluator::new(&store, &dynamic);

        assert!(!eval.evaluate_trigger(&custom("p", TriggerOperator::NotExists, None)));
        assert!(eval.evaluate_trigger(&custom("p", TriggerOperator::EqualTo, Some(5.into()))));
        assert!(eval.evaluate_trigger(&custom("p", TriggerOperator::GreaterThan, Some(4.5.into()))));
    }

    #[test]
    fn empty_tree_holds() {
        let store = TriggerValueStore::new();
        let dynamic = StaticDynamicTriggers::new();
        let eval = TriggerEvaluator::new(&store, &dynamic);
        assert!(eval.evaluate_tree(&TriggerTree::empty()));
        assert!(eval.explain(&TriggerTree::empty()).is_empty());
    }

    #[test]
    fn empty_group_holds() {
        let store = TriggerValueStore::new();
        let dynamic = StaticDynamicTriggers::new();
        let eval = TriggerEvaluator::new(&store, &dynamic);
        assert!(eval.evaluate_tree(&TriggerTree::new(vec![vec![]])));
    }

    #[test]
    fn and_within_group_or_across_groups() {
        let store = TriggerValueStore::new();
        let dynamic = StaticDynamicTriggers::new();
        store.set("a", 1.into());
        let eval = TriggerEvaluator::new(&store, &dynamic);

        let a = custom("a", TriggerOperator::Exists, None);
        let b = custom("b", TriggerOperator::Exists, None);

        let and_tree = TriggerTree::all_of(vec![a.clone(), b.clone()]);
        assert!(!eval.evaluate_tree(&and_tree));
        assert_eq!(eval.explain(&and_tree), vec![vec![true, false]]);

        let or_tree = TriggerTree::all_of(vec![b.clone()]).or(vec![a.clone()]);
        assert!(eval.evaluate_tree(&or_tree));
        assert_eq!(eval.explain(&or_tree), vec![vec![false], vec![true]]);

        store.set("b", 2.into());
        assert!(eval.evaluate_tree(&and_tree));
    }

    #[test]
    fn short_circuit_agrees_with_full_evaluation() {
        let store = TriggerValueStore::new();
        let dynamic = StaticDynamicTriggers::new();
        store.set("x", 3.into());
        store.set("tags", ["a", "b"].into_iter().collect());
        let eval = TriggerEvaluator::new(&store, &dynamic);

        let pool = [
            custom("x", TriggerOperator::GreaterThan, Some(2.into())),
            custom("x", TriggerOperator::LessThan, Some(2.into())),
            custom("tags", TriggerOperator::Contains, Some("b".into())),
            custom("missing", TriggerOperator::Exists, None),
            custom("missing", TriggerOperator::NotExists, None),
        ];

        for i in 0..pool.len() {
            for j in 0..pool.len() {
                for k in 0..pool.len() {
                    let tree = TriggerTree::all_of(vec![pool[i].clone(), pool[j].clone()])
                        .or(vec![pool[k].clone()]);
                    let full = eval
                        .explain(&tree)
                        .iter()
                        .any(|group| group.iter().all(|r| *r));
                    assert_eq!(eval.evaluate_tree(&tree), full);
                }
            }
        }
    }
}
