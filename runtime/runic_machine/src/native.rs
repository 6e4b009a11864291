//! Typed wrapping of Rust closures as native functions.
//!
//! `IntoNativeFn` turns a plain Rust closure (`Fn(A1..An) -> R`) into a
//! slice-convention `NativeFunction`: runtime arguments are marshaled to the
//! closure's parameter types, the closure runs, and its return value is
//! marshaled back into a result list. Arity mismatches and unmarshalable
//! arguments surface as errors at call time.

use runic_value::errors::arity_mismatch;
use runic_value::{FromValue, IntoResults, NativeFunction, Value};

/// Conversion of a Rust closure into a `NativeFunction`.
///
/// The `Args` parameter pins down which `Fn` impl is meant; callers never
/// name it (`machine`/selector APIs take `impl IntoNativeFn<A>` and let
/// inference pick).
pub trait IntoNativeFn<Args> {
    /// Wrap the closure, registering it under `name` for diagnostics.
    fn into_native_fn(self, name: &str) -> NativeFunction;
}

impl<Func, R> IntoNativeFn<()> for Func
where
    Func: Fn() -> R + 'static,
    R: IntoResults,
{
    fn into_native_fn(self, name: &str) -> NativeFunction {
        let label = name.to_string();
        NativeFunction::new(name, move |args: &[Value]| {
            if !args.is_empty() {
                return Err(arity_mismatch(&label, 0, args.len()));
            }
            self().into_results()
        })
    }
}

macro_rules! impl_native_fn {
    ($count:expr => $($ty:ident),+) => {
        impl<Func, R, $($ty),+> IntoNativeFn<($($ty,)+)> for Func
        where
            Func: Fn($($ty),+) -> R + 'static,
            R: IntoResults,
            $($ty: FromValue,)+
        {
            fn into_native_fn(self, name: &str) -> NativeFunction {
                let label = name.to_string();
                NativeFunction::new(name, move |args: &[Value]| {
                    if args.len() != $count {
                        return Err(arity_mismatch(&label, $count, args.len()));
                    }
                    let mut iter = args.iter().cloned();
                    $(
                        #[allow(non_snake_case)]
                        let $ty = $ty::from_value(iter.next().unwrap_or(Value::Nil))?;
                    )+
                    self($($ty),+).into_results()
                })
            }
        }
    };
}

impl_native_fn!(1 => A);
impl_native_fn!(2 => A, B);
impl_native_fn!(3 => A, B, C);
impl_native_fn!(4 => A, B, C, D);
impl_native_fn!(5 => A, B, C, D, E);
impl_native_fn!(6 => A, B, C, D, E, F);
