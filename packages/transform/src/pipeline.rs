use crate::error::{TransformError, TransformResult};
use crate::rules::Rules;
use crate::transform::Transform;
use futures::future::join_all;
use markweave_common::find_all;
use markweave_parser::{parse_with, NodeRef, ParseOptions, SerializeOptions, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Finishing hook, invoked synchronously with the container and the
/// (possibly mutated) tree just before serialization.
pub type BeforeSerialize = Box<dyn Fn(&Transform, &NodeRef)>;

/// Per-run configuration.
#[derive(Default)]
pub struct RunConfig {
    /// Initial contents for the run-scoped cache, replacing whatever a
    /// previous run left behind.
    pub cache: Option<HashMap<String, Value>>,
    pub before_serialize: Option<BeforeSerialize>,
    pub parse_options: ParseOptions,
}

/// Settled result of one handler invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TaskStatus {
    Fulfilled(bool),
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettledTask {
    pub rule: String,
    pub status: TaskStatus,
}

impl SettledTask {
    /// A task failed if its handler returned an error or resolved to the
    /// literal `false`.
    pub fn failed(&self) -> bool {
        matches!(
            self.status,
            TaskStatus::Rejected(_) | TaskStatus::Fulfilled(false)
        )
    }
}

/// Result of one transformation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RunOutcome {
    /// Every handler settled successfully; `content` is the serialized
    /// (possibly mutated) tree.
    Fulfilled { content: String },
    /// A blocking rule matched somewhere in the tree; nothing ran.
    Unsupported,
    /// At least one handler failed. The full settled list is kept, the
    /// successes included, and mutations already applied are not rolled
    /// back.
    Failed { tasks: Vec<SettledTask> },
}

/// The transformation pipeline: parse, gate-check, concurrent rule
/// dispatch, serialize.
pub struct Pipeline {
    cache: RefCell<HashMap<String, Value>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Replace the run-scoped cache wholesale.
    pub fn set_cache(&self, values: HashMap<String, Value>) {
        *self.cache.borrow_mut() = values;
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn cache_insert(&self, key: impl Into<String>, value: Value) {
        self.cache.borrow_mut().insert(key.into(), value);
    }

    pub fn cache_get(&self, key: &str) -> Option<Value> {
        self.cache.borrow().get(key).cloned()
    }

    /// Run one transformation.
    ///
    /// Handlers are dispatched as cooperative tasks on the current thread
    /// and joined with an all-settle barrier: every invocation finishes,
    /// success or failure, before the run is classified. Completion order
    /// among handlers is unspecified and the classification does not
    /// depend on it.
    #[instrument(skip_all, fields(input_len = markup.len()))]
    pub async fn transform(
        &self,
        tr: &Transform,
        markup: &str,
        config: RunConfig,
        options: SerializeOptions,
    ) -> TransformResult<RunOutcome> {
        let RunConfig {
            cache,
            before_serialize,
            parse_options,
        } = config;

        if let Some(seed) = cache {
            self.set_cache(seed);
        }

        let root = parse_with(markup, parse_options)?;

        let rules = tr
            .use_module::<Rules>()
            .map_err(|_| TransformError::MissingRules)?;

        for rule in rules.unable_rules() {
            let blocked = find_all(|node| rule.test(node), &root);
            if !blocked.is_empty() {
                info!(
                    rule = rule.name(),
                    matches = blocked.len(),
                    "blocking rule matched; document unsupported"
                );
                return Ok(RunOutcome::Unsupported);
            }
        }

        // Matching completes for every rule before any handler runs; the
        // dispatch set is fixed by priority order and, within a rule, tree
        // pre-order.
        let mut scheduled = Vec::new();
        for rule in rules.rules() {
            for node in find_all(|node| rule.test(node), &root) {
                scheduled.push((rule.clone(), node));
            }
        }
        debug!(tasks = scheduled.len(), "dispatching rule handlers");

        let handlers = scheduled
            .iter()
            .map(|(rule, node)| rule.postprocessing(node.clone(), tr));
        let settled = join_all(handlers).await;

        self.clear_cache();

        let tasks: Vec<SettledTask> = scheduled
            .iter()
            .zip(settled)
            .map(|((rule, _), outcome)| SettledTask {
                rule: rule.name().to_string(),
                status: match outcome {
                    Ok(value) => TaskStatus::Fulfilled(value),
                    Err(err) => TaskStatus::Rejected(err.to_string()),
                },
            })
            .collect();

        if tasks.iter().any(SettledTask::failed) {
            debug!(
                failed = tasks.iter().filter(|task| task.failed()).count(),
                total = tasks.len(),
                "run classified as failed"
            );
            return Ok(RunOutcome::Failed { tasks });
        }

        if let Some(hook) = &before_serialize {
            hook(tr, &root);
        }

        let content = Serializer::with_options(options).serialize(&root);
        info!(output_len = content.len(), "transformation fulfilled");
        Ok(RunOutcome::Fulfilled { content })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
