//! The stack machine context.
//!
//! A `Machine` owns the root namespace (a shared table of globals) and the
//! working stack — the single shared value-passing area every get/put/call
//! operation runs against. Operations execute strictly in composed order;
//! the machine is single-threaded by contract and does no locking.

use runic_value::errors::{not_callable, stack_underflow};
use runic_value::{EvalResult, FromValue, NativeFunction, Shared, Table, TableRef, ToValue, Value};

/// The stack machine context: root namespace plus working stack.
pub struct Machine {
    globals: TableRef,
    stack: Vec<Value>,
}

/// Shared handle to a machine; every selector holds one.
pub type MachineRef = Shared<Machine>;

impl Machine {
    /// Create a machine with an empty global namespace and empty stack.
    pub fn new() -> Self {
        Machine {
            globals: Shared::new(Table::new()),
            stack: Vec::new(),
        }
    }

    /// Create a machine and wrap it in a shared handle.
    pub fn new_ref() -> MachineRef {
        Shared::new(Machine::new())
    }

    /// Handle to the root namespace table.
    pub fn globals(&self) -> TableRef {
        self.globals.clone()
    }

    /// Push a runtime value onto the working stack.
    #[inline]
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Marshal a native value and push it onto the working stack.
    #[inline]
    pub fn push_value<T: ToValue>(&mut self, value: T) {
        self.stack.push(value.to_value());
    }

    /// Pop the top of the working stack.
    pub fn pop(&mut self) -> EvalResult<Value> {
        let depth = self.stack.len();
        self.stack.pop().ok_or_else(|| stack_underflow(1, depth))
    }

    /// Pop the top of the working stack and marshal it to a native type.
    pub fn pop_value<T: FromValue>(&mut self) -> EvalResult<T> {
        let value = self.pop()?;
        T::from_value(value)
    }

    /// Pop the top `count` values, preserving push order.
    pub fn pop_results(&mut self, count: usize) -> EvalResult<Vec<Value>> {
        let depth = self.stack.len();
        if depth < count {
            return Err(stack_underflow(count, depth));
        }
        Ok(self.stack.split_off(depth - count))
    }

    /// The value at the top of the working stack, if any.
    pub fn top(&self) -> Option<&Value> {
        self.stack.last()
    }

    /// Current working stack depth.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Clear the working stack.
    ///
    /// Every terminal operation that leaves residuals calls this on return,
    /// so no operation observes another's leftovers.
    pub fn reset_stack(&mut self) {
        self.stack.clear();
    }

    /// Pop the call frame `[callee, arg1, .., argN]` off the top of the
    /// stack, checking depth and callability.
    fn take_call_frame(&mut self, argc: usize) -> EvalResult<(NativeFunction, Vec<Value>)> {
        let depth = self.stack.len();
        let needed = argc.saturating_add(1);
        if depth < needed {
            return Err(stack_underflow(needed, depth));
        }

        let args = self.stack.split_off(depth - argc);
        let callee = self.pop()?;
        match callee {
            Value::Native(f) => Ok((f, args)),
            other => Err(not_callable(other.type_name())),
        }
    }

    /// Push `results` adjusted to exactly `nres` — extra results are
    /// truncated, missing ones padded with `Nil`.
    fn push_results(&mut self, mut results: Vec<Value>, nres: usize) {
        results.resize(nres, Value::Nil);
        self.stack.append(&mut results);
    }

    /// Invoke the call target at the bottom of the top `argc + 1` stack
    /// values: the stack must hold `[callee, arg1, .., argN]` at its top.
    ///
    /// Pops callee and arguments, invokes, and pushes the results adjusted
    /// to exactly `nres`.
    ///
    /// The caller holds the machine exclusively for the whole invocation, so
    /// a native run through this path must not re-enter the machine via a
    /// shared handle. Callers going through a `MachineRef` should use
    /// [`Machine::call_shared`] instead.
    pub fn call(&mut self, argc: usize, nres: usize) -> EvalResult<()> {
        let (func, args) = self.take_call_frame(argc)?;
        tracing::debug!(name = func.name(), argc, nres, "invoking call target");
        let results = func.invoke(&args)?;
        self.push_results(results, nres);
        Ok(())
    }

    /// Like [`Machine::call`], but through a shared handle: the machine
    /// borrow is released while the native runs, so the native may re-enter
    /// the machine through its own handle (reads, writes, nested calls).
    pub fn call_shared(machine: &MachineRef, argc: usize, nres: usize) -> EvalResult<()> {
        let (func, args) = machine.borrow_mut().take_call_frame(argc)?;
        tracing::debug!(name = func.name(), argc, nres, "invoking call target");
        let results = func.invoke(&args)?;
        machine.borrow_mut().push_results(results, nres);
        Ok(())
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
