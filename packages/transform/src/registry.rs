use crate::error::{TransformError, TransformResult};
use crate::transform::Transform;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

type Factory = Rc<dyn Fn(&Transform) -> Rc<dyn Any>>;

/// One registered module: a lazily-invoked factory, the singleton flag and
/// the cached instance once `init` has run.
struct ModuleEntry {
    key: TypeId,
    name: &'static str,
    factory: Factory,
    singleton: bool,
    instance: Option<Rc<dyn Any>>,
}

/// Lazy singleton service locator keyed by `TypeId`.
///
/// The type itself is the identity token, so independently authored modules
/// cannot collide the way string keys can. Entries are kept in registration
/// order; `init` constructs them in that order, and a factory may only
/// assume that strictly earlier registrations are already initialized.
pub struct Registry {
    entries: RefCell<Vec<ModuleEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Store a construction closure for `M`. Registering the same module
    /// twice keeps the existing entry; use [`Registry::override_module`]
    /// for replacement.
    pub fn register<M, F>(&self, factory: F)
    where
        M: Any,
        F: Fn(&Transform) -> M + 'static,
    {
        let key = TypeId::of::<M>();
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|entry| entry.key == key) {
            warn!(
                module = type_name::<M>(),
                "module already registered; keeping the existing entry (use override_module to replace)"
            );
            return;
        }
        entries.push(ModuleEntry {
            key,
            name: type_name::<M>(),
            factory: Rc::new(move |tr| Rc::new(factory(tr)) as Rc<dyn Any>),
            singleton: true,
            instance: None,
        });
    }

    /// Invoke every uncached factory with the container, in registration
    /// order. A module is constructed at most once per registry lifetime.
    /// Entries registered while init is running are reached in the same
    /// pass.
    pub fn init(&self, tr: &Transform) {
        let mut index = 0;
        loop {
            let pending = {
                let entries = self.entries.borrow();
                match entries.get(index) {
                    None => break,
                    Some(entry) if entry.instance.is_none() => {
                        Some((entry.key, entry.factory.clone()))
                    }
                    Some(_) => None,
                }
            };

            if let Some((key, factory)) = pending {
                // The factory may call back into the registry, so no borrow
                // is held while it runs.
                let instance = factory(tr);
                let mut entries = self.entries.borrow_mut();
                if let Some(entry) = entries.iter_mut().find(|entry| entry.key == key) {
                    if entry.instance.is_none() {
                        entry.instance = Some(instance);
                    }
                }
            }

            index += 1;
        }
    }

    /// Return the cached singleton for `M`. Fails with `ModuleMissing` for
    /// an unregistered key and `ModuleUninitialized` for a registered but
    /// not yet initialized one.
    pub fn use_module<M: Any>(&self) -> TransformResult<Rc<M>> {
        let entries = self.entries.borrow();
        let entry = entries
            .iter()
            .find(|entry| entry.key == TypeId::of::<M>())
            .ok_or(TransformError::ModuleMissing {
                module: type_name::<M>(),
            })?;

        let instance = match (&entry.instance, entry.singleton) {
            (Some(instance), true) => instance.clone(),
            _ => {
                return Err(TransformError::ModuleUninitialized { module: entry.name });
            }
        };
        drop(entries);

        instance
            .downcast::<M>()
            .map_err(|_| TransformError::ModuleMissing {
                module: type_name::<M>(),
            })
    }

    /// Remove the entry for `M` entirely; a later `use_module` fails until
    /// the module is re-registered and initialized again.
    pub fn restore<M: Any>(&self) {
        self.entries
            .borrow_mut()
            .retain(|entry| entry.key != TypeId::of::<M>());
    }

    /// `restore` followed by `register`.
    pub fn override_module<M, F>(&self, factory: F)
    where
        M: Any,
        F: Fn(&Transform) -> M + 'static,
    {
        self.restore::<M>();
        self.register(factory);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
