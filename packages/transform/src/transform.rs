use crate::error::TransformResult;
use crate::pipeline::{Pipeline, RunConfig, RunOutcome};
use crate::registry::Registry;
use crate::rules::Rules;
use markweave_parser::SerializeOptions;
use std::any::Any;
use std::rc::Rc;

/// The transformation container.
///
/// Owns the module registry, presets the built-in `Rules` and `Pipeline`
/// modules, and hands itself to rule handlers as their service-locator
/// context. Modules reach each other through typed lookup on the
/// container; nothing is mounted onto ambient global state.
pub struct Transform {
    registry: Registry,
}

impl Transform {
    pub fn new() -> Self {
        let tr = Self {
            registry: Registry::new(),
        };
        tr.presets();
        tr
    }

    fn presets(&self) {
        self.register(|_| Rules::new());
        self.register(|_| Pipeline::new());
        self.init();
    }

    /// Register a module factory. Duplicate registrations keep the first
    /// entry and log a warning.
    pub fn register<M, F>(&self, factory: F)
    where
        M: Any,
        F: Fn(&Transform) -> M + 'static,
    {
        self.registry.register(factory);
    }

    /// Construct every registered module that does not have an instance
    /// yet, in registration order.
    pub fn init(&self) {
        self.registry.init(self);
    }

    pub fn use_module<M: Any>(&self) -> TransformResult<Rc<M>> {
        self.registry.use_module::<M>()
    }

    pub fn override_module<M, F>(&self, factory: F)
    where
        M: Any,
        F: Fn(&Transform) -> M + 'static,
    {
        self.registry.override_module(factory);
    }

    pub fn restore<M: Any>(&self) {
        self.registry.restore::<M>();
    }

    pub fn rules(&self) -> TransformResult<Rc<Rules>> {
        self.use_module::<Rules>()
    }

    pub fn pipeline(&self) -> TransformResult<Rc<Pipeline>> {
        self.use_module::<Pipeline>()
    }

    /// Run the transformation pipeline on `markup`.
    pub async fn transform(
        &self,
        markup: &str,
        config: RunConfig,
        options: SerializeOptions,
    ) -> TransformResult<RunOutcome> {
        self.pipeline()?
            .transform(self, markup, config, options)
            .await
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
