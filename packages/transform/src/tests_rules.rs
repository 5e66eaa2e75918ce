use crate::rules::{Rule, RuleOutcome, Rules};
use crate::transform::Transform;
use async_trait::async_trait;
use markweave_parser::{Node, NodeRef};
use std::rc::Rc;

struct TestRule {
    name: &'static str,
    priority: i32,
}

#[async_trait(?Send)]
impl Rule for TestRule {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn test(&self, node: &Node) -> bool {
        node.tag == self.name
    }

    async fn postprocessing(&self, _node: NodeRef, _tr: &Transform) -> RuleOutcome {
        Ok(true)
    }
}

fn rule(name: &'static str, priority: i32) -> Rc<dyn Rule> {
    Rc::new(TestRule { name, priority })
}

fn names(rules: &[Rc<dyn Rule>]) -> Vec<&str> {
    rules.iter().map(|r| r.name()).collect()
}

#[test]
fn add_rules_sorts_ascending_by_priority() {
    let rules = Rules::new();
    rules.add_rules(vec![rule("late", 10), rule("early", -5), rule("mid", 0)]);
    assert_eq!(names(&rules.rules()), ["early", "mid", "late"]);
}

#[test]
fn equal_priorities_keep_insertion_order() {
    let rules = Rules::new();
    rules.add_rules(vec![rule("b", 1), rule("a", 0), rule("c", 1)]);
    assert_eq!(names(&rules.rules()), ["a", "b", "c"]);
}

#[test]
fn later_additions_are_merged_into_the_order() {
    let rules = Rules::new();
    rules.add_rules(vec![rule("z", 5)]);
    rules.add_rules(vec![rule("y", 0)]);
    assert_eq!(names(&rules.rules()), ["y", "z"]);
}

#[test]
fn name_map_reflects_exactly_the_current_collection() {
    let rules = Rules::new();
    rules.add_rules(vec![rule("a", 0), rule("b", 1)]);
    assert!(rules.get("a").is_some());
    assert!(rules.get("b").is_some());
    assert!(rules.get("c").is_none());

    rules.remove_rule(|r| r.name() != "a");
    assert!(rules.get("a").is_none());
    assert!(rules.get("b").is_some());
    assert_eq!(names(&rules.rules()), ["b"]);
}

#[test]
fn remove_rule_is_a_keep_filter() {
    let rules = Rules::new();
    rules.add_rules(vec![rule("a", 0), rule("b", 0), rule("c", 0)]);

    // The predicate names what survives, not what goes.
    rules.remove_rule(|r| r.name() == "b");
    assert_eq!(names(&rules.rules()), ["b"]);
}

#[test]
fn unable_rules_are_a_separate_collection() {
    let rules = Rules::new();
    rules.add_rules(vec![rule("active", 0)]);
    rules.add_unable_rules(vec![rule("blocked", 3), rule("veto", 0)]);

    assert_eq!(names(&rules.rules()), ["active"]);
    assert_eq!(names(&rules.unable_rules()), ["veto", "blocked"]);
    assert!(rules.get("blocked").is_none());
    assert!(rules.get_unable("blocked").is_some());

    rules.remove_unable_rule(|r| r.name() == "veto");
    assert_eq!(names(&rules.unable_rules()), ["veto"]);
    assert!(rules.get_unable("blocked").is_none());
}
