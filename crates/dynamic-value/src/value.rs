//! The dynamic value tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitive::PrimitiveValue;

/// Case name used by the `Option`-like encoding for a present value.
pub const SOME_CASE: &str = "Some";
/// Case name used by the `Option`-like encoding for an absent value.
pub const NONE_CASE: &str = "None";

/// A structurally typed, immutable value tree.
///
/// Each node exclusively owns its children, so the tree is acyclic. Equality
/// is deep structural equality; record field order and map entry order are
/// part of the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DynamicValue {
    /// Ordered `(name, value)` pairs; names are unique within a record.
    Record(Vec<(String, DynamicValue)>),
    /// A tagged one-of: `(case name, payload)`.
    Variant(String, Box<DynamicValue>),
    Sequence(Vec<DynamicValue>),
    /// Ordered `(key, value)` pairs; keys are compared structurally.
    Map(Vec<(DynamicValue, DynamicValue)>),
    Primitive(PrimitiveValue),
    Null,
}

impl DynamicValue {
    // ── Constructors ──────────────────────────────────────────────────────

    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, DynamicValue)>,
        K: Into<String>,
    {
        DynamicValue::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn variant(case: impl Into<String>, payload: DynamicValue) -> Self {
        DynamicValue::Variant(case.into(), Box::new(payload))
    }

    pub fn sequence(items: impl IntoIterator<Item = DynamicValue>) -> Self {
        DynamicValue::Sequence(items.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (DynamicValue, DynamicValue)>) -> Self {
        DynamicValue::Map(entries.into_iter().collect())
    }

    /// `Some(value)` in the `Option`-like variant encoding.
    pub fn some(value: DynamicValue) -> Self {
        DynamicValue::variant(SOME_CASE, value)
    }

    /// `None` in the `Option`-like variant encoding (empty record payload).
    pub fn none() -> Self {
        DynamicValue::variant(NONE_CASE, DynamicValue::Record(Vec::new()))
    }

    #[inline]
    pub fn primitive(p: impl Into<PrimitiveValue>) -> Self {
        DynamicValue::Primitive(p.into())
    }

    #[inline]
    pub fn int(n: i32) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Int(n))
    }

    #[inline]
    pub fn long(n: i64) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Long(n))
    }

    #[inline]
    pub fn double(n: f64) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Double(n))
    }

    #[inline]
    pub fn boolean(b: bool) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Boolean(b))
    }

    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        DynamicValue::Primitive(PrimitiveValue::String(s.into()))
    }

    #[inline]
    pub fn unit() -> Self {
        DynamicValue::Primitive(PrimitiveValue::Unit)
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Stable kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::Record(_) => "record",
            DynamicValue::Variant(..) => "variant",
            DynamicValue::Sequence(_) => "sequence",
            DynamicValue::Map(_) => "map",
            DynamicValue::Primitive(p) => p.type_name(),
            DynamicValue::Null => "null",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    pub fn as_record(&self) -> Option<&[(String, DynamicValue)]> {
        match self {
            DynamicValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(DynamicValue, DynamicValue)]> {
        match self {
            DynamicValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            DynamicValue::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_primitive().and_then(PrimitiveValue::as_str)
    }

    /// Case name of a variant.
    pub fn case_name(&self) -> Option<&str> {
        match self {
            DynamicValue::Variant(case, _) => Some(case),
            _ => None,
        }
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&DynamicValue> {
        self.as_record()?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Look up a map entry by structurally equal key.
    pub fn map_get(&self, key: &DynamicValue) -> Option<&DynamicValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl From<PrimitiveValue> for DynamicValue {
    fn from(p: PrimitiveValue) -> Self {
        DynamicValue::Primitive(p)
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            DynamicValue::Variant(case, payload) => write!(f, "{case}({payload})"),
            DynamicValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            DynamicValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key} => {value}")?;
                }
                f.write_str("}")
            }
            DynamicValue::Primitive(p) => write!(f, "{p}"),
            DynamicValue::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_field_lookup() {
        let v = DynamicValue::record([("name", DynamicValue::string("Bob"))]);
        assert_eq!(v.field("name"), Some(&DynamicValue::string("Bob")));
        assert_eq!(v.field("age"), None);
    }

    #[test]
    fn record_order_is_significant() {
        let a = DynamicValue::record([("a", DynamicValue::int(1)), ("b", DynamicValue::int(2))]);
        let b = DynamicValue::record([("b", DynamicValue::int(2)), ("a", DynamicValue::int(1))]);
        assert_ne!(a, b);
    }

    #[test]
    fn map_keys_are_structural() {
        let key = DynamicValue::record([("id", DynamicValue::int(1))]);
        let m = DynamicValue::map([(key.clone(), DynamicValue::string("x"))]);
        assert_eq!(m.map_get(&key), Some(&DynamicValue::string("x")));
    }

    #[test]
    fn display_is_compact() {
        let v = DynamicValue::record([
            ("tags", DynamicValue::sequence([DynamicValue::string("a")])),
            ("opt", DynamicValue::some(DynamicValue::int(1))),
        ]);
        assert_eq!(v.to_string(), "{tags: [\"a\"], opt: Some(1)}");
    }

    #[test]
    fn option_encoding() {
        assert_eq!(DynamicValue::some(DynamicValue::Null).case_name(), Some(SOME_CASE));
        assert_eq!(DynamicValue::none().case_name(), Some(NONE_CASE));
    }
}
