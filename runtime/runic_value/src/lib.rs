//! runic value - Dynamic value model for the runic runtime.
//!
//! This crate provides:
//! - `Value`: the runtime's dynamically typed value (`errors` carries the
//!   structured failure taxonomy that goes with it)
//! - `Table`/`TableRef`/`TableKey`: identity-shared containers and their
//!   string/integer subscript keys
//! - `Shared<T>`: the single-threaded shared-mutability wrapper everything
//!   above is built on
//! - `ToValue`/`FromValue`, `ToValues`/`FromValues`, and `IntoResults`: the
//!   marshaling conversion table between native Rust values and runtime
//!   values

pub mod errors;
mod convert;
mod table;
mod value;

pub use convert::{FromValue, FromValues, IntoResults, ToValue, ToValues};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use table::{Shared, Table, TableKey, TableRef};
pub use value::{NativeFnImpl, NativeFunction, Value};
