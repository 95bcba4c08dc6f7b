//! Object-safety helpers.
//!
//! Small, dependency-free functions for treating loosely typed values safely:
//! coalescing absent values, checking existence, rendering anything as text and
//! locking a value tree against further writes.

use crate::error::{Error, Result};
use crate::object::Object;
use crate::value::Value;
use tracing::debug;

/// Replace an absent value with an empty ownerless object.
///
/// Only `Undefined` and `Null` count as absent; `false`, `0`, `NaN`, `""` and
/// functions are returned unchanged.
pub fn ensure(value: Value) -> Value {
    if value.is_nullish() {
        Value::Object(Object::ownerless())
    } else {
        value
    }
}

/// `false` for `Undefined`, `Null` and NaN, `true` for everything else.
pub fn exists(value: &Value) -> bool {
    !(value.is_nullish() || value.is_nan())
}

/// Render any value as text.
///
/// - absent values and NaN: `""`
/// - functions: `"[object Function]"`
/// - objects: their `toString` method if one is reachable, else `"[object Object]"`
/// - everything else: its display form
pub fn stringify(value: &Value) -> String {
    match value {
        v if !exists(v) => String::new(),
        Value::Function(_) => "[object Function]".to_string(),
        Value::Object(object) => stringify_object(object),
        other => other.to_string(),
    }
}

fn stringify_object(object: &Object) -> String {
    if object.get("toString").and_then(Value::as_function).is_none() {
        return "[object Object]".to_string();
    }
    match object.call("toString", &[]) {
        Ok(Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(err) => {
            debug!(%err, "toString failed, using generic form");
            "[object Object]".to_string()
        }
    }
}

/// Freeze `value` and everything reachable from it.
///
/// Objects are frozen along with every nested object and array. Functions are
/// opaque and returned as-is. Primitives cannot be frozen and fail with
/// [`Error::NotFreezable`].
pub fn deep_freeze(mut value: Value) -> Result<Value> {
    if !matches!(value, Value::Object(_) | Value::Array(_) | Value::Function(_)) {
        return Err(Error::NotFreezable(value.kind()));
    }
    freeze_tree(&mut value);
    Ok(value)
}

fn freeze_tree(value: &mut Value) {
    match value {
        Value::Object(object) => {
            object.freeze();
            object.values_mut().for_each(freeze_tree);
        }
        Value::Array(items) => items.iter_mut().for_each(freeze_tree),
        _ => {}
    }
}
