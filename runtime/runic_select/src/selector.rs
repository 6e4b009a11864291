//! The lazy path selector.
//!
//! A `Selector` denotes one location inside the machine's global namespace
//! without touching it: chaining keys only grows the traversal plan. The
//! plan is replayed when a terminal operation commits — read, write, call,
//! or registration — and every terminal operation resets the working stack
//! on return so no operation observes another's residuals.
//!
//! Chaining is an explicit builder: `at` returns a fresh selector with a
//! cloned plan (the original stays independently reusable), `into_at`
//! extends a disposable selector in place. The two are observably
//! equivalent.

use runic_machine::{ClassBinding, IntoNativeFn, Machine, MachineRef, ObjectBinding};
use runic_value::errors::{cannot_index, not_callable};
use runic_value::{
    EvalError, EvalResult, FromValue, FromValues, NativeFunction, Shared, Table, TableKey,
    TableRef, ToValue, ToValues, Value,
};

use crate::pending::PendingCall;

/// A lazy accessor for one location in the global namespace.
///
/// Cloning duplicates the path; it never duplicates a pending call — calls
/// live in the [`PendingCall`] guard, so a copy cannot re-trigger a call the
/// original owed.
#[derive(Clone)]
pub struct Selector {
    /// Dotted path from the root, for diagnostics and registration labels.
    name: String,
    /// The shared machine context this selector navigates.
    machine: MachineRef,
    /// Traversal plan; the last key addresses the leaf. Non-empty by
    /// construction and only grown by chaining.
    plan: Vec<TableKey>,
}

impl Selector {
    /// Root selector addressing the named global.
    pub fn root(machine: &MachineRef, name: impl Into<String>) -> Selector {
        let name = name.into();
        Selector {
            plan: vec![TableKey::Str(name.clone())],
            name,
            machine: machine.clone(),
        }
    }

    /// Chain a key, returning a fresh selector. The receiver's plan is
    /// untouched, so two chains built from one selector never interfere.
    pub fn at(&self, key: impl Into<TableKey>) -> Selector {
        self.clone().into_at(key)
    }

    /// Chain a key in place, consuming the receiver. An explicit opt-in for
    /// disposable selectors; semantics are identical to [`Selector::at`].
    #[must_use]
    pub fn into_at(mut self, key: impl Into<TableKey>) -> Selector {
        let key = key.into();
        self.name = format!("{}.{key}", self.name);
        self.plan.push(key);
        self
    }

    /// The dotted path this selector addresses.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Split the plan into the trunk (containers to traverse) and the leaf
    /// key. The plan is non-empty by construction; an empty one is an
    /// internal invariant violation surfaced as an error, not a panic.
    fn split_plan(&self) -> EvalResult<(&[TableKey], &TableKey)> {
        match self.plan.split_last() {
            Some((leaf, trunk)) => Ok((trunk, leaf)),
            None => Err(EvalError::new("selector with empty traversal plan")),
        }
    }

    /// Replay the plan for a write: descend from the root, autovivifying
    /// missing intermediates, and return the leaf's container plus the leaf
    /// key. Autovivification is idempotent — an existing table is reused,
    /// and only an existing non-container value fails.
    fn resolve_for_write(&self) -> EvalResult<(TableRef, TableKey)> {
        let (trunk, leaf) = self.split_plan()?;
        let mut current = self.machine.borrow().globals();
        for key in trunk {
            current = descend_or_create(&current, key)?;
        }
        Ok((current, leaf.clone()))
    }

    /// Replay the plan for a read: descend without creating anything. A
    /// missing intermediate or leaf reads as `Nil`; an existing
    /// non-container intermediate fails.
    fn resolve_for_read(&self) -> EvalResult<Value> {
        let (trunk, leaf) = self.split_plan()?;
        let mut current = self.machine.borrow().globals();
        for key in trunk {
            let existing = current.borrow().get(key);
            current = match existing {
                Some(Value::Table(table)) => table,
                None | Some(Value::Nil) => return Ok(Value::Nil),
                Some(other) => return Err(cannot_index(other.type_name(), &key.to_string())),
            };
        }
        let value = current.borrow().get(leaf).unwrap_or(Value::Nil);
        Ok(value)
    }

    // Terminal operations. Exactly one commits per selector use; each one
    // replays the plan and leaves the working stack empty.

    /// Write a value at this location, creating missing intermediate
    /// containers.
    pub fn set<T: ToValue>(&self, value: T) -> EvalResult<()> {
        let (container, key) = self.resolve_for_write()?;
        let mut machine = self.machine.borrow_mut();
        machine.push_value(value);
        let produced = machine.pop()?;
        drop(machine);
        container.borrow_mut().set(key, produced);
        self.machine.borrow_mut().reset_stack();
        Ok(())
    }

    /// Install a Rust closure as a native function at this location.
    pub fn set_fn<Args, F>(&self, func: F) -> EvalResult<()>
    where
        F: IntoNativeFn<Args>,
    {
        tracing::debug!(path = %self.name, "registering native function");
        self.set(Value::Native(func.into_native_fn(&self.name)))
    }

    /// Install an object's bound method table at this location.
    pub fn set_object<T: 'static>(
        &self,
        binding: &ObjectBinding<T>,
        instance: &Shared<T>,
    ) -> EvalResult<()> {
        tracing::debug!(path = %self.name, "registering object");
        self.set(Value::Table(binding.bind(instance)))
    }

    /// Install a class table at this location; the runtime side constructs
    /// instances through its `new` entry.
    pub fn set_class<T: 'static>(&self, binding: &ClassBinding<T>) -> EvalResult<()> {
        tracing::debug!(path = %self.name, class = binding.name(), "registering class");
        self.set(Value::Table(binding.class_table()))
    }

    /// Read the value at this location and marshal it to a native type.
    ///
    /// Fails with a type mismatch when the runtime kind does not fit —
    /// including when the location is missing and reads as `Nil`.
    pub fn get<T: FromValue>(&self) -> EvalResult<T> {
        let target = self.resolve_for_read()?;
        let mut machine = self.machine.borrow_mut();
        machine.push(target);
        let outcome = machine.pop_value::<T>();
        machine.reset_stack();
        outcome
    }

    /// Read as a boolean.
    pub fn as_bool(&self) -> EvalResult<bool> {
        self.get()
    }

    /// Read as an integer.
    pub fn as_int(&self) -> EvalResult<i64> {
        self.get()
    }

    /// Read as a float.
    pub fn as_float(&self) -> EvalResult<f64> {
        self.get()
    }

    /// Read as a string (canonical rendering; numbers coerce).
    pub fn as_string(&self) -> EvalResult<String> {
        self.get()
    }

    /// Returns `true` if the location resolves to a non-`Nil` value.
    pub fn exists(&self) -> bool {
        self.resolve_for_read().is_ok_and(|v| !v.is_nil())
    }

    /// Replay the plan, push the target and `argv`, and invoke requesting
    /// exactly `nres` results. Shared by the eager and deferred call paths.
    pub(crate) fn call_with(&self, argv: &[Value], nres: usize) -> EvalResult<Vec<Value>> {
        let target = self.resolve_for_read()?;
        {
            let mut machine = self.machine.borrow_mut();
            machine.push(target);
            for value in argv {
                machine.push(value.clone());
            }
        }
        // The borrow is released while the native runs, so a native may
        // re-enter the machine through its own shared handle.
        let outcome = Machine::call_shared(&self.machine, argv.len(), nres)
            .and_then(|()| self.machine.borrow_mut().pop_results(nres));
        self.machine.borrow_mut().reset_stack();
        outcome
    }

    /// Call the target eagerly, requesting exactly the results `R` names.
    ///
    /// Results come back in call order. Fails if the target is not callable
    /// or a result does not marshal to its requested type.
    pub fn invoke<R: FromValues, A: ToValues>(&self, args: A) -> EvalResult<R> {
        let results = self.call_with(&args.to_values(), R::ARITY)?;
        R::from_values(results)
    }

    /// Capture a call intent. The returned guard commits the call when
    /// results are requested, or with zero requested results when it goes
    /// out of scope unconsumed — a discarded call still runs exactly once.
    pub fn call<A: ToValues>(&self, args: A) -> PendingCall {
        PendingCall::new(self.clone(), args.to_values())
    }

    /// Wrap the target as a reusable native-side callable handle.
    ///
    /// Fails immediately if the location does not hold a callable value.
    pub fn as_callable(&self) -> EvalResult<Callable> {
        match self.resolve_for_read()? {
            Value::Native(func) => Ok(Callable {
                machine: self.machine.clone(),
                func,
            }),
            other => Err(not_callable(other.type_name())),
        }
    }
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector").field("name", &self.name).finish()
    }
}

/// Descend one key on the write path, creating the child table if the slot
/// is empty. Repeated descent through the same path reuses the container.
fn descend_or_create(table: &TableRef, key: &TableKey) -> EvalResult<TableRef> {
    let existing = table.borrow().get(key);
    match existing {
        Some(Value::Table(child)) => Ok(child),
        None | Some(Value::Nil) => {
            let child = Shared::new(Table::new());
            table
                .borrow_mut()
                .set(key.clone(), Value::Table(child.clone()));
            Ok(child)
        }
        Some(other) => Err(cannot_index(other.type_name(), &key.to_string())),
    }
}

/// A native-side handle to a runtime callable.
///
/// Invocation goes through the machine's calling convention, so result
/// adjustment matches a direct selector call.
pub struct Callable {
    machine: MachineRef,
    func: NativeFunction,
}

impl Callable {
    /// The name the function was registered under.
    pub fn name(&self) -> &str {
        self.func.name()
    }

    /// Invoke the callable, requesting exactly the results `R` names.
    pub fn invoke<R: FromValues, A: ToValues>(&self, args: A) -> EvalResult<R> {
        let argv = args.to_values();
        {
            let mut machine = self.machine.borrow_mut();
            machine.push(Value::Native(self.func.clone()));
            for value in &argv {
                machine.push(value.clone());
            }
        }
        let outcome = Machine::call_shared(&self.machine, argv.len(), R::ARITY)
            .and_then(|()| self.machine.borrow_mut().pop_results(R::ARITY));
        self.machine.borrow_mut().reset_stack();
        R::from_values(outcome?)
    }
}

/// Selector-to-value equality converts the target to the value's native
/// type first; a conversion failure compares unequal rather than erroring.
impl PartialEq<&str> for Selector {
    fn eq(&self, other: &&str) -> bool {
        self.as_string().is_ok_and(|s| s == *other)
    }
}

impl PartialEq<Selector> for &str {
    fn eq(&self, other: &Selector) -> bool {
        other == self
    }
}

impl PartialEq<String> for Selector {
    fn eq(&self, other: &String) -> bool {
        self.as_string().is_ok_and(|s| s == *other)
    }
}

impl PartialEq<Selector> for String {
    fn eq(&self, other: &Selector) -> bool {
        other == self
    }
}

impl PartialEq<i64> for Selector {
    fn eq(&self, other: &i64) -> bool {
        self.as_int().is_ok_and(|v| v == *other)
    }
}

impl PartialEq<Selector> for i64 {
    fn eq(&self, other: &Selector) -> bool {
        other == self
    }
}

impl PartialEq<f64> for Selector {
    fn eq(&self, other: &f64) -> bool {
        self.as_float().is_ok_and(|v| v == *other)
    }
}

impl PartialEq<Selector> for f64 {
    fn eq(&self, other: &Selector) -> bool {
        other == self
    }
}

impl PartialEq<bool> for Selector {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool().is_ok_and(|v| v == *other)
    }
}

impl PartialEq<Selector> for bool {
    fn eq(&self, other: &Selector) -> bool {
        other == self
    }
}

/// Selector-to-selector equality compares both sides through the canonical
/// string conversion. Target identity is intentionally not exposed.
impl PartialEq for Selector {
    fn eq(&self, other: &Selector) -> bool {
        match (self.as_string(), other.as_string()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Entry point for selecting globals off a shared machine handle.
pub trait GlobalAccess {
    /// Selector addressing the named global.
    fn global(&self, name: &str) -> Selector;
}

impl GlobalAccess for MachineRef {
    fn global(&self, name: &str) -> Selector {
        Selector::root(self, name)
    }
}
