//! Host object graph observed by the engine.
//!
//! A [`Value`] is a dynamic, JS-like value. Containers ([`ObjectRef`],
//! [`ArrayRef`]) are shared handles: cloning a container value clones the
//! handle, not the contents, so the graph can be mutated in place from
//! anywhere that holds a handle. The engine never intercepts these mutations;
//! it only reads the graph while polling.

mod equality;
mod path;

#[cfg(test)]
mod path_test;

pub use equality::*;
pub use path::*;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

pub type ObjectMap = IndexMap<String, Value>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Object(ObjectRef),
    Array(ArrayRef),
}

/// Shared handle to a mutable, insertion-ordered map
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<ObjectMap>>);

/// Shared handle to a mutable array
#[derive(Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: ObjectMap) -> Self {
        Self(Arc::new(RwLock::new(map)))
    }

    /// Returns `Undefined` for missing keys
    pub fn get(
        &self,
        key: &str,
    ) -> Value {
        self.0.read().get(key).cloned().unwrap_or_default()
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.0.write().insert(key.into(), value.into());
    }

    pub fn remove(
        &self,
        key: &str,
    ) -> Option<Value> {
        self.0.write().shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    /// Point-in-time copy of the entries
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn ptr_eq(
        &self,
        other: &ObjectRef,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl ArrayRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    /// Returns `Undefined` for out of range indexes
    pub fn get(
        &self,
        index: usize,
    ) -> Value {
        self.0.read().get(index).cloned().unwrap_or_default()
    }

    /// Writes past the end pad the gap with `Undefined`
    pub fn set(
        &self,
        index: usize,
        value: impl Into<Value>,
    ) {
        let mut items = self.0.write();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value.into();
    }

    pub fn push(
        &self,
        value: impl Into<Value>,
    ) {
        self.0.write().push(value.into());
    }

    pub fn pop(&self) -> Option<Value> {
        self.0.write().pop()
    }

    pub fn truncate(
        &self,
        len: usize,
    ) {
        self.0.write().truncate(len);
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Point-in-time copy of the items
    pub fn items(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(
        &self,
        other: &ArrayRef,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl Value {
    /// New empty object
    pub fn object() -> Self {
        Value::Object(ObjectRef::new())
    }

    /// New empty array
    pub fn array() -> Self {
        Value::Array(ArrayRef::new())
    }

    pub fn object_from<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<ObjectMap>();
        Value::Object(ObjectRef::from_map(map))
    }

    pub fn array_from<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::Array(ArrayRef::from_vec(items.into_iter().map(Into::into).collect()))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Objects and arrays are the only containers the engine descends into
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Identity of the underlying container, if any
    pub(crate) fn container_identity(&self) -> Option<usize> {
        match self {
            Value::Object(o) => Some(o.identity()),
            Value::Array(a) => Some(a.identity()),
            _ => None,
        }
    }

    /// Read one segment below this value; anything unreachable is `Undefined`
    pub fn get_segment(
        &self,
        segment: &PathSegment,
    ) -> Value {
        match (self, segment) {
            (Value::Object(o), PathSegment::Key(key)) => o.get(key),
            (Value::Object(o), PathSegment::Index(index)) => o.get(&index.to_string()),
            (Value::Array(a), PathSegment::Index(index)) => a.get(*index),
            (Value::Array(a), PathSegment::Key(key)) => {
                if key == "length" {
                    Value::Number(a.len() as f64)
                } else {
                    match key.parse::<usize>() {
                        Ok(index) => a.get(index),
                        Err(_) => Value::Undefined,
                    }
                }
            }
            (Value::String(s), PathSegment::Key(key)) if key == "length" => {
                Value::Number(s.chars().count() as f64)
            }
            _ => Value::Undefined,
        }
    }

    /// Read `path` below this value; the empty path yields the value itself
    pub fn get_path(
        &self,
        path: &Path,
    ) -> Value {
        let mut current = self.clone();
        for segment in path.segments() {
            current = current.get_segment(segment);
            if current.is_undefined() {
                break;
            }
        }
        current
    }

    /// Enumerable entries of a container, keyed by segment
    pub(crate) fn container_entries(&self) -> Vec<(PathSegment, Value)> {
        match self {
            Value::Object(o) => o
                .entries()
                .into_iter()
                .map(|(k, v)| (PathSegment::Key(k), v))
                .collect(),
            Value::Array(a) => a
                .items()
                .into_iter()
                .enumerate()
                .map(|(i, v)| (PathSegment::Index(i), v))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Same-value comparison, see [`same_value`]
impl PartialEq for Value {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        same_value(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Object(o) => fmt::Debug::fmt(o, f),
            Value::Array(a) => fmt::Debug::fmt(a, f),
        }
    }
}

// Not cycle-safe: a self-referencing container recurses until the stack is exhausted.
impl fmt::Debug for ObjectRef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_map().entries(self.0.read().iter()).finish()
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_list().entries(self.0.read().iter()).finish()
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Value::Array(a)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
