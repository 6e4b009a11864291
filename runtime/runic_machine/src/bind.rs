//! Object and class registration.
//!
//! An `ObjectBinding<T>` collects named methods over a native type; binding
//! it to a `Shared<T>` instance produces a table whose entries are native
//! functions closing over that instance. A `ClassBinding<T>` additionally
//! records a constructor, producing a class table with a `"new"` entry that
//! instantiates fresh instances from runtime-side arguments.

use std::rc::Rc;

use runic_value::errors::arity_mismatch;
use runic_value::{
    EvalResult, FromValue, IntoResults, NativeFunction, Shared, Table, TableKey, TableRef, Value,
};

/// Implementation signature for bound methods: shared instance plus the
/// uniform argument list.
pub type MethodFnImpl<T> = dyn Fn(&Shared<T>, &[Value]) -> EvalResult<Vec<Value>>;

/// Conversion of a Rust closure taking `&mut T` into a bound method.
pub trait IntoMethodFn<T, Args> {
    /// Wrap the closure, labeled `name` for diagnostics.
    fn into_method_fn(self, name: &str) -> Rc<MethodFnImpl<T>>;
}

impl<T, F, R> IntoMethodFn<T, ()> for F
where
    T: 'static,
    F: Fn(&mut T) -> R + 'static,
    R: IntoResults,
{
    fn into_method_fn(self, name: &str) -> Rc<MethodFnImpl<T>> {
        let label = name.to_string();
        Rc::new(move |instance: &Shared<T>, args: &[Value]| {
            if !args.is_empty() {
                return Err(arity_mismatch(&label, 0, args.len()));
            }
            let mut guard = instance.borrow_mut();
            self(&mut guard).into_results()
        })
    }
}

macro_rules! impl_method_fn {
    ($count:expr => $($ty:ident),+) => {
        impl<T, F, R, $($ty),+> IntoMethodFn<T, ($($ty,)+)> for F
        where
            T: 'static,
            F: Fn(&mut T, $($ty),+) -> R + 'static,
            R: IntoResults,
            $($ty: FromValue,)+
        {
            fn into_method_fn(self, name: &str) -> Rc<MethodFnImpl<T>> {
                let label = name.to_string();
                Rc::new(move |instance: &Shared<T>, args: &[Value]| {
                    if args.len() != $count {
                        return Err(arity_mismatch(&label, $count, args.len()));
                    }
                    let mut iter = args.iter().cloned();
                    $(
                        #[allow(non_snake_case)]
                        let $ty = $ty::from_value(iter.next().unwrap_or(Value::Nil))?;
                    )+
                    let mut guard = instance.borrow_mut();
                    self(&mut guard, $($ty),+).into_results()
                })
            }
        }
    };
}

impl_method_fn!(1 => A);
impl_method_fn!(2 => A, B);
impl_method_fn!(3 => A, B, C);
impl_method_fn!(4 => A, B, C, D);

/// Conversion of a native instance (or a fallible construction of one) into
/// a constructed value.
pub trait IntoInstance<T> {
    /// Unwrap into the constructed instance.
    fn into_instance(self) -> EvalResult<T>;
}

impl<T> IntoInstance<T> for T {
    fn into_instance(self) -> EvalResult<T> {
        Ok(self)
    }
}

impl<T> IntoInstance<T> for EvalResult<T> {
    fn into_instance(self) -> EvalResult<T> {
        self
    }
}

/// Conversion of a Rust closure into a class constructor consuming the
/// uniform argument list.
pub trait IntoConstructor<T, Args> {
    /// Wrap the closure, labeled `name` for diagnostics.
    #[allow(clippy::type_complexity)]
    fn into_constructor(self, name: &str) -> Rc<dyn Fn(&[Value]) -> EvalResult<T>>;
}

impl<T, F, R> IntoConstructor<T, ()> for F
where
    T: 'static,
    F: Fn() -> R + 'static,
    R: IntoInstance<T>,
{
    fn into_constructor(self, name: &str) -> Rc<dyn Fn(&[Value]) -> EvalResult<T>> {
        let label = name.to_string();
        Rc::new(move |args: &[Value]| {
            if !args.is_empty() {
                return Err(arity_mismatch(&label, 0, args.len()));
            }
            self().into_instance()
        })
    }
}

macro_rules! impl_constructor {
    ($count:expr => $($ty:ident),+) => {
        impl<T, F, R, $($ty),+> IntoConstructor<T, ($($ty,)+)> for F
        where
            T: 'static,
            F: Fn($($ty),+) -> R + 'static,
            R: IntoInstance<T>,
            $($ty: FromValue,)+
        {
            fn into_constructor(self, name: &str) -> Rc<dyn Fn(&[Value]) -> EvalResult<T>> {
                let label = name.to_string();
                Rc::new(move |args: &[Value]| {
                    if args.len() != $count {
                        return Err(arity_mismatch(&label, $count, args.len()));
                    }
                    let mut iter = args.iter().cloned();
                    $(
                        #[allow(non_snake_case)]
                        let $ty = $ty::from_value(iter.next().unwrap_or(Value::Nil))?;
                    )+
                    self($($ty),+).into_instance()
                })
            }
        }
    };
}

impl_constructor!(1 => A);
impl_constructor!(2 => A, B);
impl_constructor!(3 => A, B, C);
impl_constructor!(4 => A, B, C, D);

/// Build a method table over a shared instance.
fn bind_methods<T: 'static>(
    methods: &[(String, Rc<MethodFnImpl<T>>)],
    instance: &Shared<T>,
) -> TableRef {
    let table = Shared::new(Table::new());
    for (name, method) in methods {
        let method = Rc::clone(method);
        let inst = instance.clone();
        let native = NativeFunction::new(name, move |args: &[Value]| method(&inst, args));
        table
            .borrow_mut()
            .set(TableKey::Str(name.clone()), Value::Native(native));
    }
    table
}

/// Named methods over a native type, bindable to one instance at a time.
pub struct ObjectBinding<T> {
    methods: Vec<(String, Rc<MethodFnImpl<T>>)>,
}

impl<T: 'static> ObjectBinding<T> {
    /// Create an empty binding.
    pub fn new() -> Self {
        ObjectBinding {
            methods: Vec::new(),
        }
    }

    /// Add a named method.
    #[must_use]
    pub fn method<Args, F>(mut self, name: &str, method: F) -> Self
    where
        F: IntoMethodFn<T, Args>,
    {
        self.methods
            .push((name.to_string(), method.into_method_fn(name)));
        self
    }

    /// Produce the method table for one shared instance. Every entry closes
    /// over the same handle, so mutations are visible across methods and to
    /// native-side holders of the handle.
    pub fn bind(&self, instance: &Shared<T>) -> TableRef {
        tracing::debug!(methods = self.methods.len(), "binding object method table");
        bind_methods(&self.methods, instance)
    }
}

impl<T: 'static> Default for ObjectBinding<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A constructor plus named methods; produces a class table whose `"new"`
/// entry instantiates independent instances from runtime arguments.
pub struct ClassBinding<T> {
    name: String,
    constructor: Rc<dyn Fn(&[Value]) -> EvalResult<T>>,
    methods: Vec<(String, Rc<MethodFnImpl<T>>)>,
}

impl<T: 'static> ClassBinding<T> {
    /// Create a class binding with the given constructor. The constructor's
    /// parameter types record the construction signature; runtime-side
    /// `new(...)` calls marshal against it.
    pub fn new<Args, F>(name: &str, constructor: F) -> Self
    where
        F: IntoConstructor<T, Args>,
    {
        let label = format!("{name}.new");
        ClassBinding {
            name: name.to_string(),
            constructor: constructor.into_constructor(&label),
            methods: Vec::new(),
        }
    }

    /// Add a named method, present on every constructed instance.
    #[must_use]
    pub fn method<Args, F>(mut self, name: &str, method: F) -> Self
    where
        F: IntoMethodFn<T, Args>,
    {
        self.methods
            .push((name.to_string(), method.into_method_fn(name)));
        self
    }

    /// The class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce the class table: a container holding the `"new"` constructor
    /// native. Each `new(...)` call constructs a fresh `Shared<T>` instance
    /// and returns its bound method table.
    pub fn class_table(&self) -> TableRef {
        let constructor = Rc::clone(&self.constructor);
        let methods = self.methods.clone();
        let label = format!("{}.new", self.name);
        let new_native = NativeFunction::new(&label, move |args: &[Value]| {
            let instance = Shared::new(constructor(args)?);
            Ok(vec![Value::Table(bind_methods(&methods, &instance))])
        });

        tracing::debug!(class = %self.name, methods = self.methods.len(), "built class table");
        let table = Shared::new(Table::new());
        table
            .borrow_mut()
            .set(TableKey::from("new"), Value::Native(new_native));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Counter {
        count: i64,
    }

    fn counter_binding() -> ObjectBinding<Counter> {
        ObjectBinding::new()
            .method("bump", |c: &mut Counter, by: i64| {
                c.count += by;
                c.count
            })
            .method("value", |c: &mut Counter| c.count)
    }

    fn invoke(table: &TableRef, name: &str, args: &[Value]) -> EvalResult<Vec<Value>> {
        let entry = table.borrow().get(&TableKey::from(name));
        match entry {
            Some(Value::Native(f)) => f.invoke(args),
            other => panic!("expected native method, got {other:?}"),
        }
    }

    #[test]
    fn object_methods_share_the_instance() {
        let instance = Shared::new(Counter { count: 0 });
        let table = counter_binding().bind(&instance);

        invoke(&table, "bump", &[Value::int(3)]).unwrap();
        invoke(&table, "bump", &[Value::int(4)]).unwrap();
        assert_eq!(
            invoke(&table, "value", &[]).unwrap(),
            vec![Value::int(7)]
        );
        // The native-side handle observes the same state
        assert_eq!(instance.borrow().count, 7);
    }

    #[test]
    fn class_new_constructs_independent_instances() {
        let class = ClassBinding::new("Counter", |start: i64| Counter { count: start })
            .method("bump", |c: &mut Counter, by: i64| {
                c.count += by;
                c.count
            });
        let class_table = class.class_table();

        let a = invoke(&class_table, "new", &[Value::int(10)]).unwrap();
        let b = invoke(&class_table, "new", &[Value::int(100)]).unwrap();
        let (Some(Value::Table(a)), Some(Value::Table(b))) = (a.first(), b.first()) else {
            panic!("new did not return instance tables");
        };

        assert_eq!(invoke(a, "bump", &[Value::int(1)]).unwrap(), vec![Value::int(11)]);
        assert_eq!(invoke(b, "bump", &[Value::int(1)]).unwrap(), vec![Value::int(101)]);
    }

    #[test]
    fn constructor_arity_is_checked() {
        let class = ClassBinding::new("Counter", |start: i64| Counter { count: start });
        let class_table = class.class_table();
        let err = invoke(&class_table, "new", &[]);
        assert!(err.is_err());
    }

    #[test]
    fn fallible_constructor_surfaces_errors() {
        let class = ClassBinding::<Counter>::new("Counter", |start: i64| -> EvalResult<Counter> {
            if start < 0 {
                return Err(runic_value::EvalError::new("negative start"));
            }
            Ok(Counter { count: start })
        });
        let class_table = class.class_table();
        assert!(invoke(&class_table, "new", &[Value::int(-1)]).is_err());
        assert!(invoke(&class_table, "new", &[Value::int(1)]).is_ok());
    }
}
