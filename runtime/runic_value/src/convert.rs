//! Marshaling between native Rust values and runtime values.
//!
//! `ToValue`/`FromValue` convert single values; `ToValues`/`FromValues`
//! convert uniform value lists (call arguments and multi-result sets).
//! Every supported conversion lives here, so marshaling is one explicit
//! conversion table rather than specialization scattered across call sites.

use crate::errors::{type_mismatch, EvalResult};
use crate::table::TableRef;
use crate::value::{NativeFunction, Value};

/// Conversion from a native Rust value into a runtime value.
pub trait ToValue {
    /// Convert into a runtime value. Infallible: every native type in the
    /// marshaling set has a runtime representation.
    fn to_value(self) -> Value;
}

/// Conversion from a runtime value into a native Rust value.
pub trait FromValue: Sized {
    /// Convert from a runtime value, failing with `type_mismatch` when the
    /// runtime kind does not fit the requested native type.
    fn from_value(value: Value) -> EvalResult<Self>;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> EvalResult<Self> {
        Ok(value)
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> EvalResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(type_mismatch("bool", other.type_name())),
        }
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> EvalResult<Self> {
        match value {
            Value::Int(n) => Ok(n),
            // Fraction-free floats convert exactly, mirroring the usual
            // number/integer coercion of embedded scripting runtimes.
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                // Convert via string parsing to avoid cast truncation; the
                // parse fails exactly when the float is out of i64 range.
                format!("{f:.0}")
                    .parse::<i64>()
                    .map_err(|_| type_mismatch("int", "float"))
            }
            other => Err(type_mismatch("int", other.type_name())),
        }
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> EvalResult<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| type_mismatch("i32", "int"))
    }
}

impl ToValue for u32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> EvalResult<Self> {
        let wide = i64::from_value(value)?;
        u32::try_from(wide).map_err(|_| type_mismatch("u32", "int"))
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> EvalResult<Self> {
        match value {
            Value::Float(f) => Ok(f),
            // Integers widen; use i32 for lossless conversion when possible,
            // string parsing otherwise (matches `as f64` within f64 precision).
            Value::Int(n) => {
                if let Ok(narrow) = i32::try_from(n) {
                    Ok(f64::from(narrow))
                } else {
                    Ok(format!("{n}").parse().unwrap_or(f64::NAN))
                }
            }
            other => Err(type_mismatch("float", other.type_name())),
        }
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Str(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> EvalResult<Self> {
        value
            .coerce_string()
            .ok_or_else(|| type_mismatch("string", value.type_name()))
    }
}

impl ToValue for TableRef {
    fn to_value(self) -> Value {
        Value::Table(self)
    }
}

impl FromValue for TableRef {
    fn from_value(value: Value) -> EvalResult<Self> {
        match value {
            Value::Table(t) => Ok(t),
            other => Err(type_mismatch("table", other.type_name())),
        }
    }
}

impl ToValue for NativeFunction {
    fn to_value(self) -> Value {
        Value::Native(self)
    }
}

impl FromValue for NativeFunction {
    fn from_value(value: Value) -> EvalResult<Self> {
        match value {
            Value::Native(f) => Ok(f),
            other => Err(type_mismatch("function", other.type_name())),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Nil,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> EvalResult<Self> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// Uniform value lists

/// Conversion of an argument pack into a uniform value list.
///
/// Implemented for single `ToValue` types, tuples up to arity 6, `()` (no
/// arguments), and `Vec<Value>` (an already-built list).
pub trait ToValues {
    /// Convert into a value list, in argument order.
    fn to_values(self) -> Vec<Value>;
}

/// Conversion of a uniform value list into typed results.
///
/// `ARITY` is the number of runtime results the conversion consumes; callers
/// request exactly that many from the machine.
pub trait FromValues: Sized {
    /// Number of runtime values this conversion consumes.
    const ARITY: usize;

    /// Convert from a value list, in result order. The list is expected to
    /// hold exactly `ARITY` values; missing positions read as `Nil`.
    fn from_values(values: Vec<Value>) -> EvalResult<Self>;
}

impl<T: ToValue> ToValues for T {
    fn to_values(self) -> Vec<Value> {
        vec![self.to_value()]
    }
}

impl ToValues for () {
    fn to_values(self) -> Vec<Value> {
        Vec::new()
    }
}

impl ToValues for Vec<Value> {
    fn to_values(self) -> Vec<Value> {
        self
    }
}

impl<T: FromValue> FromValues for T {
    const ARITY: usize = 1;

    fn from_values(values: Vec<Value>) -> EvalResult<Self> {
        let mut iter = values.into_iter();
        T::from_value(iter.next().unwrap_or(Value::Nil))
    }
}

impl FromValues for () {
    const ARITY: usize = 0;

    fn from_values(_values: Vec<Value>) -> EvalResult<Self> {
        Ok(())
    }
}

/// Conversion of a native return value into a runtime result list.
///
/// Implemented for `()` (no results), any `ToValue` type (one result),
/// tuples up to arity 4 (multiple results), and `EvalResult<T>` of any of
/// those (fallible natives). Lives beside `ToValue` so the blanket impl
/// stays coherent with the unit, tuple, and `EvalResult` impls.
pub trait IntoResults {
    /// Convert into a result list, in result order.
    fn into_results(self) -> EvalResult<Vec<Value>>;
}

impl<T: ToValue> IntoResults for T {
    fn into_results(self) -> EvalResult<Vec<Value>> {
        Ok(vec![self.to_value()])
    }
}

impl IntoResults for () {
    fn into_results(self) -> EvalResult<Vec<Value>> {
        Ok(Vec::new())
    }
}

impl<T: IntoResults> IntoResults for EvalResult<T> {
    fn into_results(self) -> EvalResult<Vec<Value>> {
        self.and_then(IntoResults::into_results)
    }
}

macro_rules! impl_tuple_results {
    ($($ty:ident),+) => {
        impl<$($ty: ToValue),+> IntoResults for ($($ty,)+) {
            fn into_results(self) -> EvalResult<Vec<Value>> {
                #[allow(non_snake_case)]
                let ($($ty,)+) = self;
                Ok(vec![$($ty.to_value()),+])
            }
        }
    };
}

impl_tuple_results!(A, B);
impl_tuple_results!(A, B, C);
impl_tuple_results!(A, B, C, D);

macro_rules! impl_tuple_values {
    ($count:expr => $($ty:ident),+) => {
        impl<$($ty: ToValue),+> ToValues for ($($ty,)+) {
            fn to_values(self) -> Vec<Value> {
                #[allow(non_snake_case)]
                let ($($ty,)+) = self;
                vec![$($ty.to_value()),+]
            }
        }

        impl<$($ty: FromValue),+> FromValues for ($($ty,)+) {
            const ARITY: usize = $count;

            fn from_values(values: Vec<Value>) -> EvalResult<Self> {
                let mut iter = values.into_iter();
                Ok(($($ty::from_value(iter.next().unwrap_or(Value::Nil))?,)+))
            }
        }
    };
}

impl_tuple_values!(1 => A);
impl_tuple_values!(2 => A, B);
impl_tuple_values!(3 => A, B, C);
impl_tuple_values!(4 => A, B, C, D);
impl_tuple_values!(5 => A, B, C, D, E);
impl_tuple_values!(6 => A, B, C, D, E, F);
