//! Dynamic Values
//!
//! Components exchange `props` and `state` as dynamically-typed values,
//! and the binding layer decides whether a write is "a change" by looking
//! at value *identity*, not deep contents. This module defines that value
//! type and the two equality notions everything else agrees on:
//!
//! - [`Value::same`]: identity equality. Primitives compare by content,
//!   composites (lists, maps) compare by pointer. Two freshly-built maps
//!   with the same entries are *not* the same value.
//!
//! - [`shallow_equal`]: one level deeper. Two maps are shallow-equal when
//!   their key sets match and every entry is pairwise [`Value::same`].
//!   Lists compare element-wise the same way.
//!
//! The property wrapper and the update decision policy share
//! [`shallow_equal`]; if they ever disagreed, a prop write could be
//! silently absorbed by one and still re-render through the other.
//!
//! # Float identity
//!
//! Floats follow the identity rules of the value model, not `PartialEq`:
//! `NaN` is the same as `NaN`, and `+0.0` is *not* the same as `-0.0`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// An ordered string-keyed map of values. Key order is the insertion
/// order, so prop maps iterate the way the author wrote them.
pub type PropMap = IndexMap<String, Value>;

/// A dynamically-typed value with identity semantics.
///
/// Lists and maps are shared behind `Arc`; cloning a `Value` is cheap and
/// preserves identity. Building a new list/map always mints a new
/// identity, even if the contents are equal.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double-precision float.
    Float(f64),
    /// An immutable string. Strings are primitives: identity is content.
    Str(Arc<str>),
    /// A list. Identity is the allocation.
    List(Arc<Vec<Value>>),
    /// A map. Identity is the allocation.
    Map(Arc<PropMap>),
}

impl Value {
    /// Build a map value from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Build a list value.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(Arc::new(items.into_iter().collect()))
    }

    /// Identity equality.
    ///
    /// Primitives by content (floats: bit-for-bit, except that any `NaN`
    /// is the same as any other `NaN`), composites by pointer.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The map contents, if this value is a map.
    pub fn as_map(&self) -> Option<&PropMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a key on a map value. Returns `Null` for missing keys and
    /// for non-map values.
    pub fn get(&self, key: &str) -> Value {
        self.as_map()
            .and_then(|m| m.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

/// Shallow structural equality.
///
/// `true` when the values are [`Value::same`], or when both are maps with
/// identical key sets whose entries are pairwise `same`, or when both are
/// lists of equal length whose elements are pairwise `same`. Anything
/// deeper than one level is compared by identity only.
pub fn shallow_equal(a: &Value, b: &Value) -> bool {
    if a.same(b) {
        return true;
    }
    match (a, b) {
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, va)| y.get(k).is_some_and(|vb| va.same(vb)))
        }
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(va, vb)| va.same(vb))
        }
        _ => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v.as_str()))
    }
}

impl From<PropMap> for Value {
    fn from(v: PropMap) -> Self {
        Value::Map(Arc::new(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(Arc::new(v))
    }
}

/// Conversion from JSON. Every conversion mints fresh identities for
/// lists and maps, so converting the same JSON twice yields values that
/// are shallow-equal (for flat primitive maps) but never `same`.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(Arc::from(s.as_str())),
            serde_json::Value::Array(items) => {
                Value::List(Arc::new(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(entries) => Value::Map(Arc::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            )),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitives_are_same_by_content() {
        assert!(Value::Int(1).same(&Value::Int(1)));
        assert!(Value::Bool(true).same(&Value::Bool(true)));
        assert!(Value::from("abc").same(&Value::from("abc")));
        assert!(Value::Null.same(&Value::Null));
        assert!(!Value::Int(1).same(&Value::Int(2)));
        assert!(!Value::Int(1).same(&Value::Float(1.0)));
    }

    #[test]
    fn float_identity_follows_nan_and_signed_zero() {
        assert!(Value::Float(f64::NAN).same(&Value::Float(f64::NAN)));
        assert!(!Value::Float(0.0).same(&Value::Float(-0.0)));
        assert!(Value::Float(1.5).same(&Value::Float(1.5)));
    }

    #[test]
    fn composites_are_same_by_pointer() {
        let a = Value::map([("x", Value::Int(1))]);
        let b = a.clone();
        let c = Value::map([("x", Value::Int(1))]);

        assert!(a.same(&b));
        assert!(!a.same(&c));
    }

    #[test]
    fn shallow_equal_compares_one_level() {
        let a = Value::map([("x", Value::Int(1)), ("y", Value::from("s"))]);
        let b = Value::map([("x", Value::Int(1)), ("y", Value::from("s"))]);
        assert!(shallow_equal(&a, &b));

        let extra = Value::map([("x", Value::Int(1))]);
        assert!(!shallow_equal(&a, &extra));

        let differs = Value::map([("x", Value::Int(2)), ("y", Value::from("s"))]);
        assert!(!shallow_equal(&a, &differs));
    }

    #[test]
    fn shallow_equal_is_identity_for_nested_composites() {
        // Nested maps are fresh allocations on each side, so the maps are
        // not shallow-equal even though the contents match.
        let a = Value::from(json!({"inner": {"x": 1}}));
        let b = Value::from(json!({"inner": {"x": 1}}));
        assert!(!shallow_equal(&a, &b));

        // Sharing the inner value restores shallow equality.
        let inner = Value::map([("x", Value::Int(1))]);
        let c = Value::map([("inner", inner.clone())]);
        let d = Value::map([("inner", inner)]);
        assert!(shallow_equal(&c, &d));
    }

    #[test]
    fn shallow_equal_lists_compare_elementwise() {
        let a = Value::list([Value::Int(1), Value::from("x")]);
        let b = Value::list([Value::Int(1), Value::from("x")]);
        assert!(shallow_equal(&a, &b));

        let c = Value::list([Value::Int(1)]);
        assert!(!shallow_equal(&a, &c));
    }

    #[test]
    fn json_conversion_preserves_shapes() {
        let v = Value::from(json!({"count": 3, "label": "hits", "on": true}));
        assert_eq!(v.as_map().map(|m| m.len()), Some(3));
        assert!(v.get("count").same(&Value::Int(3)));
        assert!(v.get("label").same(&Value::from("hits")));
        assert!(v.get("missing").same(&Value::Null));
    }

    #[test]
    fn get_on_non_map_is_null() {
        assert!(Value::Int(1).get("x").same(&Value::Null));
    }
}
