//! Runtime values.
//!
//! # Factory Methods
//!
//! Construct values through the factory methods (`Value::int`,
//! `Value::string`, `Value::table`, ...) rather than the enum variants
//! directly — the factories take care of wrapping (`Value::table` allocates
//! the shared handle) and keep call sites uniform.

use std::fmt;
use std::rc::Rc;

use crate::errors::EvalResult;
use crate::table::{Shared, Table, TableRef};

/// Implementation signature for native functions.
///
/// Natives receive their arguments as a uniform value list and may return
/// any number of results; the machine adjusts the result count to what the
/// caller requested.
pub type NativeFnImpl = dyn Fn(&[Value]) -> EvalResult<Vec<Value>>;

/// A named native function installed into the runtime.
///
/// Equality is identity: two handles are equal iff they wrap the same
/// underlying closure.
#[derive(Clone)]
pub struct NativeFunction {
    name: Rc<str>,
    func: Rc<NativeFnImpl>,
}

impl NativeFunction {
    /// Wrap a closure as a native function.
    pub fn new<F>(name: impl AsRef<str>, func: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult<Vec<Value>> + 'static,
    {
        NativeFunction {
            name: Rc::from(name.as_ref()),
            func: Rc::new(func),
        }
    }

    /// The name the function was registered under (diagnostics).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the underlying closure.
    #[inline]
    pub fn invoke(&self, args: &[Value]) -> EvalResult<Vec<Value>> {
        (self.func)(args)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

/// A runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absence of a value.
    Nil,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    Str(String),
    /// Container value (identity-shared).
    Table(TableRef),
    /// Native function value.
    Native(NativeFunction),
}

impl Value {
    /// Create an integer value.
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    /// Create a float value.
    #[inline]
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    /// Create a boolean value.
    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Create a new empty table value with its own shared handle.
    #[inline]
    pub fn table() -> Self {
        Value::Table(Shared::new(Table::new()))
    }

    /// Create a native function value.
    #[inline]
    pub fn native(func: NativeFunction) -> Self {
        Value::Native(func)
    }

    /// Returns `true` if this is `Nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Extract a boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract an integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a float, if this is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract a string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract a table handle, if this is a table.
    pub fn as_table(&self) -> Option<TableRef> {
        match self {
            Value::Table(t) => Some(t.clone()),
            _ => None,
        }
    }

    /// The value's type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
            Value::Native(_) => "function",
        }
    }

    /// Canonical string rendering, where one exists.
    ///
    /// Strings render as themselves, numbers as their decimal form. Other
    /// kinds have no canonical string — conversion-based equality treats
    /// them as unequal rather than failing.
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(f) => Some(render_float(*f)),
            _ => None,
        }
    }
}

/// Render a float, keeping a trailing `.0` for integral values so the
/// rendering never collides with integer renderings.
fn render_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{}", render_float(*x)),
            Value::Str(s) => write!(f, "{s}"),
            Value::Table(_) => write!(f, "table"),
            Value::Native(func) => write!(f, "<native fn {}>", func.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn type_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::int(1).type_name(), "int");
        assert_eq!(Value::table().type_name(), "table");
    }

    #[test]
    fn coerce_string_covers_scalars() {
        assert_eq!(Value::string("hi").coerce_string(), Some("hi".to_string()));
        assert_eq!(Value::int(42).coerce_string(), Some("42".to_string()));
        assert_eq!(Value::float(1.5).coerce_string(), Some("1.5".to_string()));
        assert_eq!(Value::float(2.0).coerce_string(), Some("2.0".to_string()));
        assert_eq!(Value::Nil.coerce_string(), None);
        assert_eq!(Value::bool(true).coerce_string(), None);
    }

    #[test]
    fn native_equality_is_identity() {
        let a = NativeFunction::new("f", |_| Ok(vec![]));
        let b = NativeFunction::new("f", |_| Ok(vec![]));
        assert!(Value::native(a.clone()) == Value::native(a.clone()));
        assert!(Value::native(a) != Value::native(b));
    }

    #[test]
    fn table_values_share_identity_through_clone() {
        let t = Value::table();
        let u = t.clone();
        // Cloning the value clones the handle, not the storage
        assert_eq!(t, u);
    }
}
