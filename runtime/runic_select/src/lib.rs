//! runic select - Lazy path selector over the runic stack machine.
//!
//! A [`Selector`] navigates the machine's global namespace with chained
//! subscripts without executing anything; every subscript is recorded in a
//! traversal plan. Exactly one terminal operation then commits against the
//! location the chain identifies:
//!
//! - write: [`Selector::set`], [`Selector::set_fn`], [`Selector::set_object`],
//!   [`Selector::set_class`]
//! - read: [`Selector::get`] and the `as_*` shorthands
//! - call: [`Selector::invoke`] (eager, typed results) or [`Selector::call`]
//!   (deferred, committed through the [`PendingCall`] guard)
//!
//! Writes autovivify missing intermediate containers; reads never create
//! anything. Every terminal operation resets the machine's working stack on
//! return.
//!
//! ```
//! use runic_machine::Machine;
//! use runic_select::GlobalAccess;
//!
//! let machine = Machine::new_ref();
//! machine.global("config").at("answer").set(42_i64)?;
//! assert_eq!(machine.global("config").at("answer").as_int()?, 42);
//!
//! machine.global("add").set_fn(|a: i64, b: i64| a + b)?;
//! assert_eq!(machine.global("add").invoke::<i64, _>((2, 3))?, 5);
//! # Ok::<(), runic_value::EvalError>(())
//! ```

mod pending;
mod selector;

pub use pending::PendingCall;
pub use selector::{Callable, GlobalAccess, Selector};

// Re-export the machine and value surface callers need alongside selectors
pub use runic_machine::{
    ClassBinding, IntoNativeFn, IntoResults, Machine, MachineRef, ObjectBinding,
};
pub use runic_value::{
    EvalError, EvalErrorKind, EvalResult, FromValue, FromValues, NativeFunction, Shared, Table,
    TableKey, TableRef, ToValue, ToValues, Value,
};
