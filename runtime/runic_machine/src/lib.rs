//! runic machine - Stack machine context for the runic runtime.
//!
//! This crate provides:
//! - `Machine`/`MachineRef`: the shared context owning the root namespace
//!   and the working stack, with the push/pop/call/reset primitives
//! - `IntoNativeFn`: typed wrapping of Rust closures as slice-convention
//!   native functions (result marshaling comes from `runic_value`'s
//!   `IntoResults`)
//! - `ObjectBinding`/`ClassBinding`: registration builders producing method
//!   tables and runtime-instantiable classes
//!
//! The machine is single-threaded and cooperative: every operation runs
//! synchronously against one shared context, in composed order. Concurrent
//! use requires per-thread exclusive contexts.

mod bind;
mod machine;
mod native;

pub use bind::{
    ClassBinding, IntoConstructor, IntoInstance, IntoMethodFn, MethodFnImpl, ObjectBinding,
};
pub use machine::{Machine, MachineRef};
pub use native::IntoNativeFn;
pub use runic_value::IntoResults;
