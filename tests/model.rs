//! Scenario tests for the reactive model: reads, writes, batching, and the
//! embedded computed (getter) pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use reflow::{
    Event, EventFilter, EventKind, Init, Model, ModelError, Shape, Value,
};

fn point_shape() -> Arc<Shape> {
    Shape::builder("Point")
        .field_default("a", 1)
        .field_default("b", 2)
        .getter("sum", |this| {
            let a = this.get("a").unwrap().as_int().unwrap_or(0);
            let b = this.get("b").unwrap().as_int().unwrap_or(0);
            Value::Int(a + b)
        })
        .build()
}

fn collect_modifies(model: &Model, chain: &reflow::Chain) -> Arc<Mutex<Vec<Event>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    // dropping a subscription does not revoke it; the listener stays registered
    let _ = model
        .observe(chain, move |event| sink.lock().push(event.clone()))
        .unwrap();
    seen
}

#[test]
fn end_to_end_sum_scenario() {
    let model = Model::new(point_shape());
    let root = model.root();

    assert_eq!(root.get("sum").unwrap(), Value::Int(3));

    let seen = collect_modifies(&model, &root.chain_to("sum"));

    root.set("a", 5).unwrap();
    model.tick();
    {
        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].new_value, Some(Value::Int(7)));
        assert_eq!(events[0].old_value, Some(Value::Int(3)));
    }

    // writing an unchanged dependency re-delivers its own Modify, but the
    // recomputed sum is equal, so the sum observer stays quiet
    root.set("b", 2).unwrap();
    model.tick();
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn writes_are_synchronously_visible_and_notifications_deferred() {
    let model = Model::new(point_shape());
    let root = model.root();
    let seen = collect_modifies(&model, &root.chain_to("a"));

    root.set("a", 10).unwrap();
    assert_eq!(root.get("a").unwrap(), Value::Int(10));
    assert!(seen.lock().is_empty());

    model.tick();
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn batched_writes_deliver_once_with_last_value() {
    let model = Model::new(point_shape());
    let root = model.root();
    let seen = collect_modifies(&model, &root.chain_to("a"));

    root.set("a", 10).unwrap();
    root.set("a", 20).unwrap();
    root.set("a", 30).unwrap();
    model.tick();

    let events = seen.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].old_value, Some(Value::Int(1)));
    assert_eq!(events[0].new_value, Some(Value::Int(30)));
}

#[test]
fn distinct_links_deliver_in_first_write_order() {
    let model = Model::new(point_shape());
    let root = model.root();

    let order = Arc::new(Mutex::new(Vec::new()));
    let sink = order.clone();
    let sub = model.bus().on(
        move |event: &Event| {
            if event.kind == EventKind::Modify {
                sink.lock().push(event.link().key.as_str().to_string());
            }
        },
        None,
    );

    root.set("b", 7).unwrap();
    root.set("a", 8).unwrap();
    root.set("b", 9).unwrap();
    model.tick();

    assert_eq!(order.lock().as_slice(), ["b", "a"]);
    sub.revoke();
}

#[test]
fn readonly_write_fails_before_mutation() {
    let shape = Shape::builder("Locked")
        .field_default("x", 1)
        .readonly("x")
        .unwrap()
        .build();
    let model = Model::new(shape);
    let root = model.root();

    let result = root.set("x", 2);
    assert_eq!(
        result,
        Err(ModelError::Readonly { key: "x".into() })
    );
    assert_eq!(root.get("x").unwrap(), Value::Int(1));
}

#[test]
fn assigning_a_getter_backed_property_fails() {
    let model = Model::new(point_shape());
    assert_eq!(
        model.root().set("sum", 9),
        Err(ModelError::ComputedProperty { key: "sum".into() })
    );
}

#[test]
fn silent_access_bypasses_events() {
    let model = Model::new(point_shape());
    let root = model.root();

    let gets = Arc::new(AtomicUsize::new(0));
    let sink = gets.clone();
    let sub = model.bus().on(
        move |_: &Event| {
            sink.fetch_add(1, Ordering::SeqCst);
        },
        Some(EventFilter::of_kind(EventKind::Get)),
    );
    let _ = root.get_silent("a").unwrap();
    assert_eq!(gets.load(Ordering::SeqCst), 0);
    sub.revoke();

    let seen = collect_modifies(&model, &root.chain_to("a"));
    root.set_silent("a", 42).unwrap();
    model.tick();
    assert!(seen.lock().is_empty());
    assert_eq!(root.get("a").unwrap(), Value::Int(42));
}

#[test]
fn ignored_properties_never_emit() {
    let shape = Shape::builder("Quiet")
        .field_default("x", 1)
        .ignore("x")
        .unwrap()
        .build();
    let model = Model::new(shape);
    let root = model.root();

    let hits = Arc::new(AtomicUsize::new(0));
    let sink = hits.clone();
    let sub = model.bus().on(
        move |_: &Event| {
            sink.fetch_add(1, Ordering::SeqCst);
        },
        None,
    );

    let _ = root.get("x").unwrap();
    root.set("x", 2).unwrap();
    model.tick();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(root.get_silent("x").unwrap(), Value::Int(2));
    sub.revoke();
}

#[test]
fn nested_reads_carry_full_chains() {
    let model = Model::new(Shape::builder("Holder").field("pos").build());
    let root = model.root();
    let pos = model.insert(Init::object([("x", Init::from(3)), ("y", Init::from(4))]));
    root.set_silent("pos", pos).unwrap();

    let chains = Arc::new(Mutex::new(Vec::new()));
    let sink = chains.clone();
    let sub = model.bus().on(
        move |event: &Event| {
            if event.kind == EventKind::Get {
                sink.lock().push(event.chain.clone());
            }
        },
        None,
    );

    let x = root.object("pos").unwrap().get("x").unwrap();
    assert_eq!(x, Value::Int(3));

    let chains = chains.lock();
    // one Get for `pos`, one for `pos.x`
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].len(), 1);
    assert_eq!(chains[0].last().unwrap().key.as_str(), "pos");
    assert_eq!(chains[1].len(), 2);
    assert_eq!(chains[1].links()[0].key.as_str(), "pos");
    assert_eq!(chains[1].last().unwrap().key.as_str(), "x");
    sub.revoke();
}

#[test]
fn cyclic_graphs_terminate_with_stable_identity() {
    let model = Model::new(Shape::builder("Cycle").build());
    let root = model.root();
    root.set_silent("self", root.as_value()).unwrap();

    let once = root.object("self").unwrap();
    let twice = once.object("self").unwrap();
    assert_eq!(once.id(), root.id());
    assert_eq!(twice.id(), root.id());
}

#[test]
fn manual_notify_delivers_live_value() {
    let model = Model::new(point_shape());
    let root = model.root();
    let seen = collect_modifies(&model, &root.chain_to("a"));

    // mutate without events, then notify by hand
    root.set_silent("a", 99).unwrap();
    model.notify(root.chain_to("a")).unwrap();
    model.tick();

    let events = seen.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].old_value, None);
    assert_eq!(events[0].new_value, Some(Value::Int(99)));
}

#[test]
fn object_replacement_carries_structured_changes() {
    let model = Model::new(Shape::builder("Attrs").field("attrs").build());
    let root = model.root();

    let first = model.insert(Init::object([
        ("kept", Init::from("same")),
        ("changed", Init::from(1)),
        ("dropped", Init::from(true)),
    ]));
    root.set_silent("attrs", first).unwrap();

    let seen = collect_modifies(&model, &root.chain_to("attrs"));

    let second = model.insert(Init::object([
        ("kept", Init::from("same")),
        ("changed", Init::from(2)),
        ("added", Init::from(false)),
    ]));
    root.set("attrs", second).unwrap();
    model.tick();

    let events = seen.lock();
    assert_eq!(events.len(), 1);
    let changes = events[0].changes.as_ref().expect("structured changes");
    let keys = |diffs: &[reflow::Diff]| -> Vec<String> {
        diffs.iter().map(|d| d.key.as_str().to_string()).collect()
    };
    assert_eq!(keys(&changes.additions), ["added"]);
    assert_eq!(keys(&changes.modifications), ["changed"]);
    assert_eq!(keys(&changes.deletions), ["dropped"]);
}

#[test]
fn plain_value_replacement_has_no_changes() {
    let model = Model::new(point_shape());
    let root = model.root();
    let seen = collect_modifies(&model, &root.chain_to("a"));

    root.set("a", 5).unwrap();
    model.tick();
    assert!(seen.lock()[0].changes.is_none());
}

#[test]
fn effect_getter_evaluates_at_instantiation() {
    static RUNS: AtomicUsize = AtomicUsize::new(0);

    let shape = Shape::builder("Eager")
        .field_default("x", 1)
        .getter("loud", |this| {
            RUNS.fetch_add(1, Ordering::SeqCst);
            this.get("x").unwrap()
        })
        .effect("loud")
        .unwrap()
        .build();

    let model = Model::new(shape);
    assert_eq!(RUNS.load(Ordering::SeqCst), 1);

    // the eager evaluation already established the dependency subscription,
    // so a write notifies without any external read in between
    let root = model.root();
    let seen = collect_modifies(&model, &root.chain_to("loud"));
    root.set("x", 2).unwrap();
    model.tick();
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(seen.lock()[0].new_value, Some(Value::Int(2)));
}

#[test]
fn unknown_property_read_errors() {
    let model = Model::new(point_shape());
    assert_eq!(
        model.root().get("missing"),
        Err(ModelError::UnknownProperty {
            key: "missing".into()
        })
    );
}

#[test]
fn getter_memoizes_between_invalidations() {
    static RUNS: AtomicUsize = AtomicUsize::new(0);

    let shape = Shape::builder("Memo")
        .field_default("x", 1)
        .getter("double", |this| {
            RUNS.fetch_add(1, Ordering::SeqCst);
            Value::Int(this.get("x").unwrap().as_int().unwrap_or(0) * 2)
        })
        .build();
    let model = Model::new(shape);
    let root = model.root();

    assert_eq!(root.get("double").unwrap(), Value::Int(2));
    assert_eq!(root.get("double").unwrap(), Value::Int(2));
    assert_eq!(RUNS.load(Ordering::SeqCst), 1);

    root.set("x", 3).unwrap();
    model.tick();
    assert_eq!(root.get("double").unwrap(), Value::Int(6));
    assert!(RUNS.load(Ordering::SeqCst) >= 2);
}
