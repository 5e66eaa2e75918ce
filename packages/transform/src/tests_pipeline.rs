use crate::error::TransformError;
use crate::pipeline::{RunConfig, RunOutcome, SettledTask, TaskStatus};
use crate::rules::{Rule, RuleError, RuleOutcome, Rules};
use crate::transform::Transform;
use async_trait::async_trait;
use markweave_parser::{Node, NodeRef, ParseError, ParseOptions, SerializeOptions};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Matches a tag, records its invocation, settles with a fixed outcome.
struct TagRule {
    name: &'static str,
    tag: &'static str,
    priority: i32,
    outcome: RuleOutcome,
    invoked: Rc<RefCell<Vec<String>>>,
}

impl TagRule {
    fn new(name: &'static str, tag: &'static str) -> Self {
        Self {
            name,
            tag,
            priority: 0,
            outcome: Ok(true),
            invoked: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn with_outcome(mut self, outcome: RuleOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    fn with_log(mut self, log: &Rc<RefCell<Vec<String>>>) -> Self {
        self.invoked = log.clone();
        self
    }
}

#[async_trait(?Send)]
impl Rule for TagRule {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn test(&self, node: &Node) -> bool {
        node.tag == self.tag
    }

    async fn postprocessing(&self, _node: NodeRef, _tr: &Transform) -> RuleOutcome {
        self.invoked.borrow_mut().push(self.name.to_string());
        self.outcome.clone()
    }
}

/// Adds rel="noopener" to every matched anchor.
struct RelRule;

#[async_trait(?Send)]
impl Rule for RelRule {
    fn name(&self) -> &str {
        "rel"
    }

    fn test(&self, node: &Node) -> bool {
        node.tag == "a"
    }

    async fn postprocessing(&self, node: NodeRef, _tr: &Transform) -> RuleOutcome {
        node.borrow_mut().set_attribute("rel", "noopener");
        Ok(true)
    }
}

/// Records what the run-scoped cache held while the handler ran.
struct CacheProbe {
    seen: Rc<RefCell<Option<Value>>>,
}

#[async_trait(?Send)]
impl Rule for CacheProbe {
    fn name(&self) -> &str {
        "cache-probe"
    }

    fn test(&self, node: &Node) -> bool {
        node.tag == "div"
    }

    async fn postprocessing(&self, _node: NodeRef, tr: &Transform) -> RuleOutcome {
        let pipeline = tr.pipeline().map_err(|e| RuleError::new(e.to_string()))?;
        *self.seen.borrow_mut() = pipeline.cache_get("token");
        Ok(true)
    }
}

fn active(tr: &Transform, rules: Vec<Rc<dyn Rule>>) {
    tr.rules().unwrap().add_rules(rules);
}

fn blocking(tr: &Transform, rules: Vec<Rc<dyn Rule>>) {
    tr.rules().unwrap().add_unable_rules(rules);
}

async fn run(tr: &Transform, markup: &str) -> RunOutcome {
    tr.transform(markup, RunConfig::default(), SerializeOptions::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn run_with_no_rules_is_fulfilled() {
    let tr = Transform::new();
    let outcome = run(&tr, "<div><span>hi</span></div>").await;
    assert_eq!(
        outcome,
        RunOutcome::Fulfilled {
            content: "<div><span>hi</span></div>".into(),
        }
    );
}

#[tokio::test]
async fn blocking_rule_makes_document_unsupported() {
    let tr = Transform::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    blocking(&tr, vec![Rc::new(TagRule::new("no-script", "script"))]);
    active(&tr, vec![Rc::new(TagRule::new("divs", "div").with_log(&log))]);

    let outcome = run(&tr, "<div><script>evil()</script></div>").await;
    assert_eq!(outcome, RunOutcome::Unsupported);
    // No active handler ran.
    assert!(log.borrow().is_empty());
}

#[tokio::test]
async fn blocking_rule_matches_anywhere_in_the_tree() {
    let tr = Transform::new();
    blocking(&tr, vec![Rc::new(TagRule::new("no-script", "script"))]);

    let outcome = run(&tr, "<div><p><em><script>x</script></em></p></div>").await;
    assert_eq!(outcome, RunOutcome::Unsupported);
}

#[tokio::test]
async fn handler_resolving_false_fails_the_run() {
    let tr = Transform::new();
    active(
        &tr,
        vec![Rc::new(TagRule::new("span-check", "span").with_outcome(Ok(false)))],
    );

    let outcome = run(&tr, "<div><span>x</span></div>").await;
    assert_eq!(
        outcome,
        RunOutcome::Failed {
            tasks: vec![SettledTask {
                rule: "span-check".into(),
                status: TaskStatus::Fulfilled(false),
            }],
        }
    );
}

#[tokio::test]
async fn one_rejection_among_five_keeps_all_settled_results() {
    let tr = Transform::new();
    active(
        &tr,
        vec![
            Rc::new(TagRule::new("items", "li")),
            Rc::new(
                TagRule::new("emphasis", "em")
                    .with_outcome(Err(RuleError::new("handler exploded"))),
            ),
        ],
    );

    let outcome = run(
        &tr,
        "<ul><li>1</li><li>2</li><li>3</li><li>4</li><em>x</em></ul>",
    )
    .await;

    let RunOutcome::Failed { tasks } = outcome else {
        panic!("expected a failed run");
    };
    assert_eq!(tasks.len(), 5);
    assert_eq!(tasks.iter().filter(|t| t.failed()).count(), 1);
    assert_eq!(
        tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Fulfilled(true))
            .count(),
        4
    );
}

#[tokio::test]
async fn dispatch_follows_priority_then_preorder() {
    let tr = Transform::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    active(
        &tr,
        vec![
            Rc::new(TagRule::new("bold", "b").with_log(&log)),
            Rc::new(TagRule::new("italic", "i").with_priority(-1).with_log(&log)),
        ],
    );

    let outcome = run(&tr, "<div><b>1</b><i>2</i><b>3</b></div>").await;
    assert!(matches!(outcome, RunOutcome::Fulfilled { .. }));
    // italic has the lower priority value, so both of bold's matches come
    // after it even though bold was inserted first.
    assert_eq!(*log.borrow(), ["italic", "bold", "bold"]);
}

#[tokio::test]
async fn successful_mutations_appear_in_the_output() {
    let tr = Transform::new();
    active(&tr, vec![Rc::new(RelRule)]);

    let outcome = run(&tr, r#"<div><a href="/x">x</a></div>"#).await;
    assert_eq!(
        outcome,
        RunOutcome::Fulfilled {
            content: r#"<div><a href="/x" rel="noopener">x</a></div>"#.into(),
        }
    );
}

#[tokio::test]
async fn mutations_are_not_rolled_back_on_failure() {
    let tr = Transform::new();
    active(
        &tr,
        vec![
            Rc::new(RelRule),
            Rc::new(TagRule::new("fail", "div").with_outcome(Ok(false))),
        ],
    );

    let outcome = run(&tr, r#"<div><a href="/x">x</a></div>"#).await;
    let RunOutcome::Failed { tasks } = outcome else {
        panic!("expected a failed run");
    };
    assert_eq!(tasks.len(), 2);
    // The anchor rule succeeded and its settled entry says so, even though
    // the run as a whole failed.
    assert!(tasks
        .iter()
        .any(|t| t.rule == "rel" && t.status == TaskStatus::Fulfilled(true)));
}

#[tokio::test]
async fn cache_is_seeded_for_handlers_and_cleared_after() {
    let tr = Transform::new();
    let seen = Rc::new(RefCell::new(None));
    active(&tr, vec![Rc::new(CacheProbe { seen: seen.clone() })]);

    let mut seed = HashMap::new();
    seed.insert("token".to_string(), json!("secret"));
    let config = RunConfig {
        cache: Some(seed),
        ..Default::default()
    };

    let outcome = tr
        .transform("<div>x</div>", config, SerializeOptions::default())
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Fulfilled { .. }));

    assert_eq!(*seen.borrow(), Some(json!("secret")));
    assert_eq!(tr.pipeline().unwrap().cache_get("token"), None);
}

#[tokio::test]
async fn before_serialize_hook_sees_the_mutated_tree() {
    let tr = Transform::new();
    active(&tr, vec![Rc::new(RelRule)]);

    let config = RunConfig {
        before_serialize: Some(Box::new(|_tr, root| {
            root.borrow_mut().set_attribute("data-processed", "1");
        })),
        ..Default::default()
    };

    let outcome = tr
        .transform(
            r#"<div><a href="/x">x</a></div>"#,
            config,
            SerializeOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Fulfilled {
            content: r#"<div data-processed="1"><a href="/x" rel="noopener">x</a></div>"#.into(),
        }
    );
}

#[tokio::test]
async fn parse_failure_aborts_the_run() {
    let tr = Transform::new();
    let err = tr
        .transform(
            "<div><span></div>",
            RunConfig::default(),
            SerializeOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransformError::Parse(ParseError::TagMismatch {
            expected: "span".into(),
            found: "div".into(),
        })
    );
}

#[tokio::test]
async fn strict_parse_option_is_honored() {
    let tr = Transform::new();
    let config = RunConfig {
        parse_options: ParseOptions { strict: true },
        ..Default::default()
    };
    let err = tr
        .transform("<div><span>hi", config, SerializeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransformError::Parse(ParseError::UnclosedTags { .. })
    ));
}

#[tokio::test]
async fn missing_rules_module_is_fatal() {
    let tr = Transform::new();
    tr.restore::<Rules>();

    let err = tr
        .transform(
            "<div>x</div>",
            RunConfig::default(),
            SerializeOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, TransformError::MissingRules);
}
