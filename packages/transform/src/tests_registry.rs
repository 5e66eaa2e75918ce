use crate::error::TransformError;
use crate::pipeline::Pipeline;
use crate::rules::Rules;
use crate::transform::Transform;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct Greeter {
    greeting: String,
}

struct Audit {
    label: &'static str,
}

#[test]
fn presets_are_usable_after_new() {
    let tr = Transform::new();
    assert!(tr.use_module::<Rules>().is_ok());
    assert!(tr.use_module::<Pipeline>().is_ok());
}

#[test]
fn use_before_init_fails() {
    let tr = Transform::new();
    tr.register(|_| Greeter {
        greeting: "hello".into(),
    });

    let err = tr.use_module::<Greeter>().unwrap_err();
    assert!(matches!(err, TransformError::ModuleUninitialized { .. }));

    tr.init();
    assert_eq!(tr.use_module::<Greeter>().unwrap().greeting, "hello");
}

#[test]
fn use_of_unregistered_module_fails() {
    let tr = Transform::new();
    let err = tr.use_module::<Greeter>().unwrap_err();
    assert!(matches!(err, TransformError::ModuleMissing { .. }));
}

#[test]
fn duplicate_registration_keeps_first_factory() {
    let tr = Transform::new();
    tr.register(|_| Greeter {
        greeting: "first".into(),
    });
    tr.register(|_| Greeter {
        greeting: "second".into(),
    });
    tr.init();

    assert_eq!(tr.use_module::<Greeter>().unwrap().greeting, "first");
}

#[test]
fn module_is_constructed_at_most_once() {
    let tr = Transform::new();
    let constructions = Rc::new(RefCell::new(0));
    let counter = constructions.clone();
    tr.register(move |_| {
        *counter.borrow_mut() += 1;
        Greeter {
            greeting: "hi".into(),
        }
    });

    tr.init();
    tr.init();
    assert_eq!(*constructions.borrow(), 1);
}

#[test]
fn construction_order_equals_registration_order() {
    let tr = Transform::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = order.clone();
    tr.register(move |_| {
        log.borrow_mut().push("greeter");
        Greeter {
            greeting: "hi".into(),
        }
    });
    let log = order.clone();
    tr.register(move |_| {
        log.borrow_mut().push("audit");
        Audit { label: "a" }
    });

    tr.init();
    assert_eq!(*order.borrow(), ["greeter", "audit"]);
}

#[test]
fn factory_may_use_strictly_earlier_modules() {
    let tr = Transform::new();
    tr.register(|_| Greeter {
        greeting: "bonjour".into(),
    });
    tr.init();

    tr.register(|tr: &Transform| {
        let greeter = tr.use_module::<Greeter>().unwrap();
        Audit {
            label: if greeter.greeting == "bonjour" { "fr" } else { "en" },
        }
    });
    tr.init();

    assert_eq!(tr.use_module::<Audit>().unwrap().label, "fr");
}

#[test]
fn restore_removes_the_entry() {
    let tr = Transform::new();
    tr.register(|_| Greeter {
        greeting: "hi".into(),
    });
    tr.init();

    tr.restore::<Greeter>();
    let err = tr.use_module::<Greeter>().unwrap_err();
    assert!(matches!(err, TransformError::ModuleMissing { .. }));
}

#[test]
fn override_replaces_after_reinit() {
    let tr = Transform::new();
    tr.register(|_| Greeter {
        greeting: "old".into(),
    });
    tr.init();

    tr.override_module(|_| Greeter {
        greeting: "new".into(),
    });

    // Overriding drops the cached instance; the module must be
    // initialized again before use.
    let err = tr.use_module::<Greeter>().unwrap_err();
    assert!(matches!(err, TransformError::ModuleUninitialized { .. }));

    tr.init();
    assert_eq!(tr.use_module::<Greeter>().unwrap().greeting, "new");
}
