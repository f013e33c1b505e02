//! Scenario tests for standalone computed values: dependency precision,
//! memoization, batching, and disposal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use reflow::{Model, ModelError, Shape, Value};

fn abc_model() -> Model {
    Model::new(
        Shape::builder("Abc")
            .field_default("a", 1)
            .field_default("b", 2)
            .field_default("c", 3)
            .build(),
    )
}

#[test]
fn dependencies_are_exactly_the_properties_read() {
    let model = abc_model();
    let root = model.root();
    let runs = Arc::new(AtomicUsize::new(0));

    let counted = runs.clone();
    let handle = root.clone();
    let sum = model.computed(move || {
        counted.fetch_add(1, Ordering::SeqCst);
        let a = handle.get("a").unwrap().as_int().unwrap_or(0);
        let b = handle.get("b").unwrap().as_int().unwrap_or(0);
        a + b
    });

    assert_eq!(sum.get().unwrap(), 3);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // a write to an unread property never dirties the computed
    root.set("c", 100).unwrap();
    model.tick();
    assert_eq!(sum.get().unwrap(), 3);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // a write to a read property always does
    root.set("a", 10).unwrap();
    model.tick();
    assert_eq!(sum.get().unwrap(), 12);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test]
fn get_twice_computes_once() {
    let model = abc_model();
    let runs = Arc::new(AtomicUsize::new(0));

    let counted = runs.clone();
    let handle = model.root();
    let value = model.computed(move || {
        counted.fetch_add(1, Ordering::SeqCst);
        handle.get("a").unwrap().as_int().unwrap_or(0)
    });

    assert_eq!(value.get().unwrap(), 1);
    assert_eq!(value.get().unwrap(), 1);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn observers_fire_once_per_batch_with_the_final_value() {
    let model = abc_model();
    let root = model.root();

    let handle = root.clone();
    let sum = model.computed(move || {
        let a = handle.get("a").unwrap().as_int().unwrap_or(0);
        let b = handle.get("b").unwrap().as_int().unwrap_or(0);
        a + b
    });
    let _ = sum.get().unwrap();

    let seen: Arc<Mutex<Vec<i64>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = sum.observe(move |value| sink.lock().push(*value)).unwrap();

    // both dependencies change within one turn
    root.set("a", 10).unwrap();
    root.set("b", 20).unwrap();
    model.tick();

    assert_eq!(seen.lock().as_slice(), [30]);
}

#[test]
fn unchanged_recomputation_notifies_nobody() {
    let model = abc_model();
    let root = model.root();

    let handle = root.clone();
    let positive = model.computed(move || handle.get("a").unwrap().as_int().unwrap_or(0) > 0);
    assert!(positive.get().unwrap());

    let seen = Arc::new(AtomicUsize::new(0));
    let sink = seen.clone();
    let _sub = positive
        .observe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    root.set("a", 2).unwrap();
    model.tick();
    assert_eq!(seen.load(Ordering::SeqCst), 0);

    root.set("a", -1).unwrap();
    model.tick();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn conditional_branches_reshape_the_dependency_set() {
    let model = Model::new(
        Shape::builder("Branchy")
            .field_default("flag", true)
            .field_default("a", 10)
            .field_default("b", 20)
            .build(),
    );
    let root = model.root();
    let runs = Arc::new(AtomicUsize::new(0));

    let counted = runs.clone();
    let handle = root.clone();
    let picked = model.computed(move || {
        counted.fetch_add(1, Ordering::SeqCst);
        if handle.get("flag").unwrap().as_bool().unwrap_or(false) {
            handle.get("a").unwrap().as_int().unwrap_or(0)
        } else {
            handle.get("b").unwrap().as_int().unwrap_or(0)
        }
    });
    assert_eq!(picked.get().unwrap(), 10);

    // the untaken branch is not a dependency
    root.set("b", 99).unwrap();
    model.tick();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // flipping the flag rebuilds the set; the old branch stops mattering
    root.set("flag", false).unwrap();
    model.tick();
    assert_eq!(picked.get().unwrap(), 99);

    let runs_after_flip = runs.load(Ordering::SeqCst);
    root.set("a", 1234).unwrap();
    model.tick();
    let _ = picked.get().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), runs_after_flip);
}

#[test]
fn revoke_is_idempotent_and_stops_notifications() {
    let model = abc_model();
    let root = model.root();

    let handle = root.clone();
    let value = model.computed(move || handle.get("a").unwrap().as_int().unwrap_or(0));
    let _ = value.get().unwrap();

    let seen = Arc::new(AtomicUsize::new(0));
    let sink = seen.clone();
    let sub = value
        .observe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    sub.revoke();
    sub.revoke();

    root.set("a", 5).unwrap();
    model.tick();
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[test]
fn revoking_before_the_flush_suppresses_the_pending_delivery() {
    let model = abc_model();
    let root = model.root();

    let handle = root.clone();
    let value = model.computed(move || handle.get("a").unwrap().as_int().unwrap_or(0));
    let _ = value.get().unwrap();

    let seen = Arc::new(AtomicUsize::new(0));
    let sink = seen.clone();
    let sub = value
        .observe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    root.set("a", 5).unwrap();
    // the batch is pending; revoking now must still win
    sub.revoke();
    model.tick();
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[test]
fn disposed_computed_rejects_use() {
    let model = abc_model();
    let handle = model.root();
    let value = model.computed(move || handle.get("a").unwrap().as_int().unwrap_or(0));
    let _ = value.get().unwrap();

    value.dispose().unwrap();
    assert_eq!(value.get(), Err(ModelError::Disposed));
    assert!(matches!(
        value.observe(|_| {}),
        Err(ModelError::Disposed)
    ));
    assert_eq!(value.dispose(), Err(ModelError::Disposed));
}

#[test]
fn disposal_unsubscribes_from_dependencies() {
    let model = abc_model();
    let root = model.root();
    let runs = Arc::new(AtomicUsize::new(0));

    let counted = runs.clone();
    let handle = root.clone();
    let value = model.computed(move || {
        counted.fetch_add(1, Ordering::SeqCst);
        handle.get("a").unwrap().as_int().unwrap_or(0)
    });
    let _ = value.get().unwrap();
    value.dispose().unwrap();

    root.set("a", 7).unwrap();
    model.tick();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn computed_over_a_getter_property_recomputes_through_it() {
    let shape = Shape::builder("Layered")
        .field_default("x", 2)
        .getter("double", |this| {
            Value::Int(this.get("x").unwrap().as_int().unwrap_or(0) * 2)
        })
        .build();
    let model = Model::new(shape);
    let root = model.root();

    let handle = root.clone();
    let quadruple =
        model.computed(move || handle.get("double").unwrap().as_int().unwrap_or(0) * 2);
    assert_eq!(quadruple.get().unwrap(), 8);

    root.set("x", 5).unwrap();
    model.tick();
    assert_eq!(quadruple.get().unwrap(), 20);
}
