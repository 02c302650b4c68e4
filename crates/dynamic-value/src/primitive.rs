//! Scalar leaves of the value tree.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A closed set of scalar kinds.
///
/// Equality is exact per kind: `Int(1)` and `Long(1)` are different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    Unit,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    BigInt(i128),
    BigDecimal(Decimal),
    Uuid(Uuid),
    /// ISO 4217 currency code.
    Currency(String),
    DayOfWeek(Weekday),
    Instant(DateTime<Utc>),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    LocalDateTime(NaiveDateTime),
    OffsetDateTime(DateTime<FixedOffset>),
    Duration(#[serde(with = "duration_serde")] TimeDelta),
}

impl PrimitiveValue {
    /// Stable kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveValue::Unit => "unit",
            PrimitiveValue::Boolean(_) => "boolean",
            PrimitiveValue::Byte(_) => "byte",
            PrimitiveValue::Short(_) => "short",
            PrimitiveValue::Int(_) => "int",
            PrimitiveValue::Long(_) => "long",
            PrimitiveValue::Float(_) => "float",
            PrimitiveValue::Double(_) => "double",
            PrimitiveValue::Char(_) => "char",
            PrimitiveValue::String(_) => "string",
            PrimitiveValue::BigInt(_) => "big_int",
            PrimitiveValue::BigDecimal(_) => "big_decimal",
            PrimitiveValue::Uuid(_) => "uuid",
            PrimitiveValue::Currency(_) => "currency",
            PrimitiveValue::DayOfWeek(_) => "day_of_week",
            PrimitiveValue::Instant(_) => "instant",
            PrimitiveValue::LocalDate(_) => "local_date",
            PrimitiveValue::LocalTime(_) => "local_time",
            PrimitiveValue::LocalDateTime(_) => "local_date_time",
            PrimitiveValue::OffsetDateTime(_) => "offset_date_time",
            PrimitiveValue::Duration(_) => "duration",
        }
    }

    /// Returns true if both values are of the same kind.
    pub fn same_kind(&self, other: &PrimitiveValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrimitiveValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Unit => f.write_str("()"),
            PrimitiveValue::Boolean(b) => write!(f, "{b}"),
            PrimitiveValue::Byte(n) => write!(f, "{n}"),
            PrimitiveValue::Short(n) => write!(f, "{n}"),
            PrimitiveValue::Int(n) => write!(f, "{n}"),
            PrimitiveValue::Long(n) => write!(f, "{n}L"),
            PrimitiveValue::Float(n) => write!(f, "{n}f"),
            PrimitiveValue::Double(n) => write!(f, "{n}"),
            PrimitiveValue::Char(c) => write!(f, "{c:?}"),
            PrimitiveValue::String(s) => write!(f, "{s:?}"),
            PrimitiveValue::BigInt(n) => write!(f, "{n}n"),
            PrimitiveValue::BigDecimal(d) => write!(f, "{d}m"),
            PrimitiveValue::Uuid(u) => write!(f, "{u}"),
            PrimitiveValue::Currency(c) => f.write_str(c),
            PrimitiveValue::DayOfWeek(d) => write!(f, "{d}"),
            PrimitiveValue::Instant(t) => f.write_str(&t.to_rfc3339()),
            PrimitiveValue::LocalDate(d) => write!(f, "{d}"),
            PrimitiveValue::LocalTime(t) => write!(f, "{t}"),
            PrimitiveValue::LocalDateTime(t) => write!(f, "{t}"),
            PrimitiveValue::OffsetDateTime(t) => f.write_str(&t.to_rfc3339()),
            PrimitiveValue::Duration(d) => write!(f, "{d}"),
        }
    }
}

impl From<bool> for PrimitiveValue {
    fn from(b: bool) -> Self {
        PrimitiveValue::Boolean(b)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(n: i32) -> Self {
        PrimitiveValue::Int(n)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(n: i64) -> Self {
        PrimitiveValue::Long(n)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(n: f64) -> Self {
        PrimitiveValue::Double(n)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(s: &str) -> Self {
        PrimitiveValue::String(s.to_owned())
    }
}

impl From<String> for PrimitiveValue {
    fn from(s: String) -> Self {
        PrimitiveValue::String(s)
    }
}

/// `serde(with)` adapter for [`TimeDelta`], which has no serde support of its
/// own. A duration travels as `(seconds, nanos)` where both parts carry the
/// sign of the duration.
pub mod duration_serde {
    use chrono::TimeDelta;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
        (d.num_seconds(), d.subsec_nanos()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TimeDelta, D::Error> {
        let (secs, nanos) = <(i64, i32)>::deserialize(d)?;
        TimeDelta::try_seconds(secs)
            .and_then(|t| t.checked_add(&TimeDelta::nanoseconds(i64::from(nanos))))
            .ok_or_else(|| D::Error::custom("duration out of range"))
    }
}
