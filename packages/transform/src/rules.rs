use crate::transform::Transform;
use async_trait::async_trait;
use markweave_parser::{Node, NodeRef};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

pub type RuleOutcome = Result<bool, RuleError>;

/// Failure reported by a rule handler. Handler failures never abort
/// sibling handlers; they are collected into the run's settled-task list.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RuleError {
    message: String,
}

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A transformation rule: a synchronous membership predicate plus an
/// asynchronous handler for each matched node.
#[async_trait(?Send)]
pub trait Rule {
    /// Unique name, used as the key in the registry's name map.
    fn name(&self) -> &str;

    /// Lower values run earlier; ties keep insertion order.
    fn priority(&self) -> i32 {
        0
    }

    /// Decide whether `node` belongs to this rule.
    fn test(&self, node: &Node) -> bool;

    /// Post-process one matched node. Resolving to `Ok(false)` marks the
    /// task failed, the same as returning an error.
    async fn postprocessing(&self, node: NodeRef, tr: &Transform) -> RuleOutcome;
}

/// Ordered rule collections.
///
/// Active rules drive document mutation; blocking ("unable") rules gate
/// whether a transformation proceeds at all. Each collection keeps a
/// derived name→rule map that is rebuilt in the same operation as every
/// re-sort, so list and map cannot drift.
pub struct Rules {
    rules: RefCell<Vec<Rc<dyn Rule>>>,
    rules_map: RefCell<HashMap<String, Rc<dyn Rule>>>,
    unable_rules: RefCell<Vec<Rc<dyn Rule>>>,
    unable_rules_map: RefCell<HashMap<String, Rc<dyn Rule>>>,
}

impl Rules {
    pub fn new() -> Self {
        Self {
            rules: RefCell::new(Vec::new()),
            rules_map: RefCell::new(HashMap::new()),
            unable_rules: RefCell::new(Vec::new()),
            unable_rules_map: RefCell::new(HashMap::new()),
        }
    }

    pub fn add_rules(&self, more: impl IntoIterator<Item = Rc<dyn Rule>>) {
        let mut rules = self.rules.borrow_mut();
        rules.extend(more);
        Self::reindex(&mut rules, &mut self.rules_map.borrow_mut());
    }

    pub fn add_unable_rules(&self, more: impl IntoIterator<Item = Rc<dyn Rule>>) {
        let mut rules = self.unable_rules.borrow_mut();
        rules.extend(more);
        Self::reindex(&mut rules, &mut self.unable_rules_map.borrow_mut());
    }

    /// Retain exactly the active rules for which `keep` returns true.
    /// Note the keep polarity: this is a keep-filter, not a remove-filter.
    pub fn remove_rule(&self, keep: impl Fn(&dyn Rule) -> bool) {
        let mut rules = self.rules.borrow_mut();
        rules.retain(|rule| keep(rule.as_ref()));
        Self::reindex(&mut rules, &mut self.rules_map.borrow_mut());
    }

    /// Retain exactly the blocking rules for which `keep` returns true.
    pub fn remove_unable_rule(&self, keep: impl Fn(&dyn Rule) -> bool) {
        let mut rules = self.unable_rules.borrow_mut();
        rules.retain(|rule| keep(rule.as_ref()));
        Self::reindex(&mut rules, &mut self.unable_rules_map.borrow_mut());
    }

    /// Active rules in priority order.
    pub fn rules(&self) -> Vec<Rc<dyn Rule>> {
        self.rules.borrow().clone()
    }

    /// Blocking rules in priority order.
    pub fn unable_rules(&self) -> Vec<Rc<dyn Rule>> {
        self.unable_rules.borrow().clone()
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Rule>> {
        self.rules_map.borrow().get(name).cloned()
    }

    pub fn get_unable(&self, name: &str) -> Option<Rc<dyn Rule>> {
        self.unable_rules_map.borrow().get(name).cloned()
    }

    /// Stable sort ascending by priority, then rebuild the name map from
    /// the sorted list. One atomic update keeps the two in sync.
    fn reindex(rules: &mut Vec<Rc<dyn Rule>>, map: &mut HashMap<String, Rc<dyn Rule>>) {
        rules.sort_by_key(|rule| rule.priority());
        map.clear();
        for rule in rules.iter() {
            map.insert(rule.name().to_string(), rule.clone());
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
