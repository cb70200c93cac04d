//! Structured parameters and their equivalence rules.
//!
//! Conflict detection hinges on deciding whether two parameter objects are
//! "the same request". Equality here is structural and explicit rather than
//! derived from `serde_json::Value`'s `PartialEq`:
//!
//! - Objects match key-by-key, independent of key order.
//! - Arrays match element-by-element, in order.
//! - Numbers match by numeric value, so `1` and `1.0` are equivalent.
//!   Two integers always compare exactly.

use serde_json::{Map, Value};

/// Instance, binding and update parameters.
pub type Parameters = Map<String, Value>;

/// Check whether two parameter objects are structurally equivalent.
pub fn params_equivalent(a: &Parameters, b: &Parameters) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| values_equivalent(value, other)))
}

/// Check whether two JSON values are structurally equivalent.
pub fn values_equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if x.is_f64() || y.is_f64() {
                return matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y);
            }
            // Integers compare exactly; f64 loses precision above 2^53.
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x == y,
                _ => matches!((x.as_u64(), y.as_u64()), (Some(x), Some(y)) if x == y),
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equivalent(x, y))
        }
        (Value::Object(x), Value::Object(y)) => params_equivalent(x, y),
        _ => false,
    }
}
