//! End-to-end selector behavior against a live machine.

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use runic_select::{
    ClassBinding, EvalError, GlobalAccess, Machine, ObjectBinding, Shared, TableRef, Value,
};

#[test]
fn deep_write_creates_intermediates_and_reads_back() {
    let machine = Machine::new_ref();
    machine.global("a").at("b").set(5_i64).unwrap();

    assert_eq!(machine.global("a").at("b").as_int(), Ok(5));
    // The intermediate became a container
    assert!(machine.global("a").get::<TableRef>().is_ok());
}

#[test]
fn scalar_round_trips() {
    let machine = Machine::new_ref();
    let root = machine.global("v");

    root.set(true).unwrap();
    assert_eq!(root.as_bool(), Ok(true));
    assert!(root == true);

    root.set(42_i64).unwrap();
    assert_eq!(root.as_int(), Ok(42));
    assert!(root == 42_i64);

    root.set(2.5_f64).unwrap();
    assert_eq!(root.as_float(), Ok(2.5));
    assert!(root == 2.5_f64);

    root.set("hello").unwrap();
    assert_eq!(root.as_string(), Ok("hello".to_string()));
    assert!(root == "hello");
}

#[test]
fn equality_mismatch_is_false_not_an_error() {
    let machine = Machine::new_ref();
    machine.global("n").set(5_i64).unwrap();

    assert!(machine.global("n") != "foo");
    assert!(machine.global("n") != true);
    // Numbers coerce to their canonical string
    assert!(machine.global("n") == "5");
    // Missing locations compare unequal to everything
    assert!(machine.global("missing") != "foo");
    assert!(machine.global("missing") != 0_i64);
}

#[test]
fn selector_to_selector_equality_uses_string_canonical() {
    let machine = Machine::new_ref();
    machine.global("a").set("same").unwrap();
    machine.global("b").set("same").unwrap();
    machine.global("c").set("other").unwrap();

    assert!(machine.global("a") == machine.global("b"));
    assert!(machine.global("a") != machine.global("c"));
    // Unconvertible targets compare unequal
    machine.global("t").at("k").set(1_i64).unwrap();
    assert!(machine.global("t") != machine.global("t"));
}

#[test]
fn native_add_scenario() {
    let machine = Machine::new_ref();
    machine.global("f").set_fn(|a: i64, b: i64| a + b).unwrap();

    // Bare-statement call: runs without consuming results
    machine.global("f").call((2_i64, 3_i64));

    assert_eq!(machine.global("f").invoke::<i64, _>((2_i64, 3_i64)), Ok(5));
    assert_eq!(machine.borrow().stack_len(), 0);
}

#[test]
fn invoke_returns_results_in_call_order() {
    let machine = Machine::new_ref();
    machine
        .global("divmod")
        .set_fn(|a: i64, b: i64| (a / b, a % b))
        .unwrap();

    let (quot, rem): (i64, i64) = machine
        .global("divmod")
        .invoke((7_i64, 2_i64))
        .unwrap();
    assert_eq!((quot, rem), (3, 1));

    // Requesting fewer results than produced truncates
    let quot: i64 = machine.global("divmod").invoke((7_i64, 2_i64)).unwrap();
    assert_eq!(quot, 3);

    // Requesting none discards them
    machine
        .global("divmod")
        .invoke::<(), _>((7_i64, 2_i64))
        .unwrap();
}

#[test]
fn invoke_on_non_callable_fails() {
    let machine = Machine::new_ref();
    machine.global("n").set(1_i64).unwrap();
    assert!(machine.global("n").invoke::<i64, _>(()).is_err());
    assert!(machine.global("missing").invoke::<i64, _>(()).is_err());
    assert_eq!(machine.borrow().stack_len(), 0);
}

#[test]
fn native_may_reenter_the_machine() {
    let machine = Machine::new_ref();
    machine.global("base").set(10_i64).unwrap();

    // The native reads a global through its own handle mid-call.
    let handle = machine.clone();
    machine
        .global("boost")
        .set_fn(move |extra: i64| {
            let base = handle.global("base").as_int()?;
            Ok::<i64, EvalError>(base + extra)
        })
        .unwrap();

    assert_eq!(machine.global("boost").invoke::<i64, _>((5_i64,)), Ok(15));
}

#[test]
fn independent_chains_from_a_persistent_selector() {
    let machine = Machine::new_ref();
    let base = machine.global("cfg");

    let left = base.at("left").at("x");
    let right = base.at("right").at("y");
    left.set(1_i64).unwrap();
    right.set(2_i64).unwrap();

    assert_eq!(left.as_int(), Ok(1));
    assert_eq!(right.as_int(), Ok(2));
    // The base still addresses the root entry
    assert_eq!(base.name(), "cfg");
    assert!(base.get::<TableRef>().is_ok());
}

#[test]
fn dropped_call_intent_runs_exactly_once() {
    let machine = Machine::new_ref();
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    machine
        .global("tick")
        .set_fn(move || seen.set(seen.get() + 1))
        .unwrap();

    {
        let _pending = machine.global("tick").call(());
        assert_eq!(count.get(), 0);
    }
    assert_eq!(count.get(), 1);
}

#[test]
fn pending_call_typed_extraction() {
    let machine = Machine::new_ref();
    machine
        .global("pair")
        .set_fn(|| (1_i64, "two".to_string()))
        .unwrap();

    let (a, b): (i64, String) = machine.global("pair").call(()).returning().unwrap();
    assert_eq!(a, 1);
    assert_eq!(b, "two");
    assert_eq!(machine.borrow().stack_len(), 0);
}

#[test]
fn callable_handle_is_reusable() {
    let machine = Machine::new_ref();
    machine.global("add").set_fn(|a: i64, b: i64| a + b).unwrap();

    let add = machine.global("add").as_callable().unwrap();
    assert_eq!(add.invoke::<i64, _>((1_i64, 2_i64)), Ok(3));
    assert_eq!(add.invoke::<i64, _>((10_i64, 20_i64)), Ok(30));
    assert_eq!(add.name(), "add");

    machine.global("n").set(0_i64).unwrap();
    assert!(machine.global("n").as_callable().is_err());
}

#[test]
fn object_registration_through_selector() {
    struct Counter {
        count: i64,
    }

    let machine = Machine::new_ref();
    let binding = ObjectBinding::new()
        .method("bump", |c: &mut Counter, by: i64| {
            c.count += by;
            c.count
        })
        .method("value", |c: &mut Counter| c.count);

    let instance = Shared::new(Counter { count: 0 });
    machine.global("counter").set_object(&binding, &instance).unwrap();

    assert_eq!(
        machine.global("counter").at("bump").invoke::<i64, _>((3_i64,)),
        Ok(3)
    );
    assert_eq!(
        machine.global("counter").at("bump").invoke::<i64, _>((4_i64,)),
        Ok(7)
    );
    // Mutations are visible through the native-side handle too
    assert_eq!(instance.borrow().count, 7);
    assert_eq!(machine.global("counter").at("value").invoke::<i64, _>(()), Ok(7));
}

#[test]
fn class_registration_and_runtime_instantiation() {
    struct Counter {
        count: i64,
    }

    let machine = Machine::new_ref();
    let binding = ClassBinding::new("Counter", |start: i64| Counter { count: start })
        .method("bump", |c: &mut Counter, by: i64| {
            c.count += by;
            c.count
        });
    machine.global("Counter").set_class(&binding).unwrap();

    // Instantiate from the runtime side and store the instances as globals
    let a: TableRef = machine
        .global("Counter")
        .at("new")
        .invoke((10_i64,))
        .unwrap();
    let b: TableRef = machine
        .global("Counter")
        .at("new")
        .invoke((100_i64,))
        .unwrap();
    machine.global("a").set(a).unwrap();
    machine.global("b").set(b).unwrap();

    assert_eq!(
        machine.global("a").at("bump").invoke::<i64, _>((1_i64,)),
        Ok(11)
    );
    assert_eq!(
        machine.global("b").at("bump").invoke::<i64, _>((1_i64,)),
        Ok(101)
    );
}

#[test]
fn string_assignment_marshals_literals() {
    let machine = Machine::new_ref();
    machine.global("s").set("literal").unwrap();
    assert_eq!(machine.global("s").get::<Value>(), Ok(Value::string("literal")));
}

#[test]
fn integer_subscripts() {
    let machine = Machine::new_ref();
    machine.global("list").at(1_i64).set("one").unwrap();
    machine.global("list").at(2_i64).set("two").unwrap();

    assert_eq!(machine.global("list").at(1_i64).as_string(), Ok("one".to_string()));
    assert_eq!(machine.global("list").at(2_i64).as_string(), Ok("two".to_string()));
}

#[test]
fn exists_reflects_non_nil() {
    let machine = Machine::new_ref();
    assert!(!machine.global("x").exists());
    machine.global("x").set(0_i64).unwrap();
    assert!(machine.global("x").exists());
    machine.global("x").set(Value::Nil).unwrap();
    assert!(!machine.global("x").exists());
}
