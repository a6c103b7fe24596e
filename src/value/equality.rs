//! Identity, structural equality and copy utilities for [`Value`].

use std::collections::HashMap;
use std::collections::HashSet;

use super::ArrayRef;
use super::ObjectMap;
use super::ObjectRef;
use super::Value;

/// Identity comparison used by reference watches.
///
/// Primitives compare by value with `NaN` equal to `NaN` (and `+0` equal to
/// `-0`); containers compare by handle identity.
pub fn same_value(
    a: &Value,
    b: &Value,
) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(*x, *y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => x.ptr_eq(y),
        (Value::Array(x), Value::Array(y)) => x.ptr_eq(y),
        _ => false,
    }
}

fn numbers_equal(
    x: f64,
    y: f64,
) -> bool {
    x == y || (x.is_nan() && y.is_nan())
}

/// Structural equality.
///
/// Cycle tolerant: a pair of containers already under comparison is assumed
/// equal when met again.
pub fn deep_equals(
    a: &Value,
    b: &Value,
) -> bool {
    let mut visiting = HashSet::new();
    deep_equals_inner(a, b, &mut visiting)
}

fn deep_equals_inner(
    a: &Value,
    b: &Value,
    visiting: &mut HashSet<(usize, usize)>,
) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            if !visiting.insert((x.identity(), y.identity())) {
                return true;
            }
            let left = x.entries();
            if left.len() != y.len() {
                return false;
            }
            left.iter().all(|(key, value)| {
                y.contains_key(key) && deep_equals_inner(value, &y.get(key), visiting)
            })
        }
        (Value::Array(x), Value::Array(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            if !visiting.insert((x.identity(), y.identity())) {
                return true;
            }
            let left = x.items();
            let right = y.items();
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(l, r)| deep_equals_inner(l, r, visiting))
        }
        _ => same_value(a, b),
    }
}

/// Structural copy; shared and cyclic containers keep their shape in the copy.
pub fn deep_copy(value: &Value) -> Value {
    let mut copies = HashMap::new();
    deep_copy_inner(value, &mut copies)
}

fn deep_copy_inner(
    value: &Value,
    copies: &mut HashMap<usize, Value>,
) -> Value {
    match value {
        Value::Object(source) => {
            if let Some(copy) = copies.get(&source.identity()) {
                return copy.clone();
            }
            let target = ObjectRef::new();
            copies.insert(source.identity(), Value::Object(target.clone()));
            for (key, child) in source.entries() {
                target.set(key, deep_copy_inner(&child, copies));
            }
            Value::Object(target)
        }
        Value::Array(source) => {
            if let Some(copy) = copies.get(&source.identity()) {
                return copy.clone();
            }
            let target = ArrayRef::new();
            copies.insert(source.identity(), Value::Array(target.clone()));
            for child in source.items() {
                target.push(deep_copy_inner(&child, copies));
            }
            Value::Array(target)
        }
        primitive => primitive.clone(),
    }
}

/// New top-level container sharing the original's children.
pub fn shallow_copy(value: &Value) -> Value {
    match value {
        Value::Object(source) => {
            let map = source.entries().into_iter().collect::<ObjectMap>();
            Value::Object(ObjectRef::from_map(map))
        }
        Value::Array(source) => Value::Array(ArrayRef::from_vec(source.items())),
        primitive => primitive.clone(),
    }
}
