//! Tables and shared handles.
//!
//! Containers in the runtime are identity-shared: a `TableRef` reached
//! through two different paths aliases the same storage, which is what makes
//! autovivification idempotent from the selector's point of view.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// A single-threaded shared-mutability wrapper.
///
/// Wraps `Rc<RefCell<T>>` and enforces that all shared allocations go through
/// the `Shared::new()` factory method. The runtime is single-threaded by
/// contract, so `Rc` (not `Arc`) is intentional.
#[repr(transparent)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    /// Create a new `Shared` wrapping the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        Shared(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Returns `true` if the two handles alias the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.0).finish()
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Shared::new(T::default())
    }
}

/// Handles compare by identity, not structure.
impl<T> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Subscript key: the runtime supports string and integer subscripts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TableKey {
    /// String subscript (`root["config"]`).
    Str(String),
    /// Integer subscript (`root[3]`).
    Int(i64),
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKey::Str(s) => write!(f, "{s}"),
            TableKey::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for TableKey {
    fn from(s: &str) -> Self {
        TableKey::Str(s.to_string())
    }
}

impl From<String> for TableKey {
    fn from(s: String) -> Self {
        TableKey::Str(s)
    }
}

impl From<i64> for TableKey {
    fn from(i: i64) -> Self {
        TableKey::Int(i)
    }
}

impl From<i32> for TableKey {
    fn from(i: i32) -> Self {
        TableKey::Int(i64::from(i))
    }
}

/// A dynamic container mapping subscript keys to values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    entries: FxHashMap<TableKey, Value>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Table {
            entries: FxHashMap::default(),
        }
    }

    /// Look up a key, cloning the value out.
    #[inline]
    pub fn get(&self, key: &TableKey) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    /// Insert or replace the value at a key.
    #[inline]
    pub fn set(&mut self, key: TableKey, value: Value) {
        self.entries.insert(key, value);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &TableKey) -> bool {
        self.entries.contains_key(key)
    }
}

/// Identity-shared handle to a table.
pub type TableRef = Shared<Table>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shared_handles_alias() {
        let a = TableRef::new(Table::new());
        let b = a.clone();
        b.borrow_mut().set(TableKey::from("x"), Value::int(1));
        assert_eq!(a.borrow().get(&TableKey::from("x")), Some(Value::int(1)));
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn shared_equality_is_identity() {
        let a = TableRef::new(Table::new());
        let b = TableRef::new(Table::new());
        // Structurally equal, but distinct allocations
        assert!(a != b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn key_conversions() {
        assert_eq!(TableKey::from("a"), TableKey::Str("a".to_string()));
        assert_eq!(TableKey::from(3_i64), TableKey::Int(3));
        assert_eq!(TableKey::from(3_i32), TableKey::Int(3));
        assert_eq!(TableKey::from(7_i64).to_string(), "7");
    }

    #[test]
    fn table_set_get() {
        let mut t = Table::new();
        assert!(t.is_empty());
        t.set(TableKey::from("k"), Value::string("v"));
        assert_eq!(t.len(), 1);
        assert!(t.contains_key(&TableKey::from("k")));
        assert_eq!(t.get(&TableKey::from("missing")), None);
    }
}
