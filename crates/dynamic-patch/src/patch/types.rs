//! Core types for the patch module: operations, leaf edit ops, modes.

use chrono::TimeDelta;
use dynamic_value::primitive::duration_serde;
use dynamic_value::{DynamicOptic, DynamicValue, PrimitiveValue};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ── Mode ──────────────────────────────────────────────────────────────────

/// How the apply engine treats a path or edit that does not fit the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchMode {
    /// Every inapplicable path or edit is an error.
    #[default]
    Strict,
    /// Never fails; a location that cannot be patched is left unchanged.
    Lenient,
    /// Creates a missing final field for `Set`, clamps out-of-range string
    /// and sequence edits, overwrites on map add, and leaves unreachable
    /// indices and keys unchanged.
    Clobber,
}

// ── Operation ─────────────────────────────────────────────────────────────

/// The action executed at the location addressed by a [`PatchOp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Identity,
    Set(DynamicValue),
    PrimitiveDelta(PrimitiveOp),
    StringEdit(Vec<StringOp>),
    SequenceEdit(Vec<SeqOp>),
    MapEdit(Vec<MapOp>),
}

impl Operation {
    #[inline]
    pub fn is_identity(&self) -> bool {
        matches!(self, Operation::Identity)
    }
}

/// A numeric or temporal increment for exactly one primitive kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveOp {
    ByteDelta(i8),
    ShortDelta(i16),
    IntDelta(i32),
    LongDelta(i64),
    FloatDelta(f32),
    DoubleDelta(f64),
    BigIntDelta(i128),
    BigDecimalDelta(Decimal),
    InstantDelta(#[serde(with = "duration_serde")] TimeDelta),
    DurationDelta(#[serde(with = "duration_serde")] TimeDelta),
    /// Whole days.
    LocalDateDelta(i64),
    LocalDateTimeDelta(#[serde(with = "duration_serde")] TimeDelta),
    LocalTimeDelta(#[serde(with = "duration_serde")] TimeDelta),
}

/// Why a delta could not be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeltaFailure {
    KindMismatch,
    Overflow,
}

impl PrimitiveOp {
    /// The `type_name` of the primitive kind this delta applies to.
    pub fn target_kind(&self) -> &'static str {
        match self {
            PrimitiveOp::ByteDelta(_) => "byte",
            PrimitiveOp::ShortDelta(_) => "short",
            PrimitiveOp::IntDelta(_) => "int",
            PrimitiveOp::LongDelta(_) => "long",
            PrimitiveOp::FloatDelta(_) => "float",
            PrimitiveOp::DoubleDelta(_) => "double",
            PrimitiveOp::BigIntDelta(_) => "big_int",
            PrimitiveOp::BigDecimalDelta(_) => "big_decimal",
            PrimitiveOp::InstantDelta(_) => "instant",
            PrimitiveOp::DurationDelta(_) => "duration",
            PrimitiveOp::LocalDateDelta(_) => "local_date",
            PrimitiveOp::LocalDateTimeDelta(_) => "local_date_time",
            PrimitiveOp::LocalTimeDelta(_) => "local_time",
        }
    }

    /// Add this delta to `value`.
    ///
    /// Fixed-width integers wrap; `BigInt`, `BigDecimal` and the date-based
    /// kinds are checked. `LocalTime` is clock arithmetic and wraps around
    /// midnight.
    pub(crate) fn add_to(&self, value: &PrimitiveValue) -> Result<PrimitiveValue, DeltaFailure> {
        use PrimitiveOp as D;
        use PrimitiveValue as P;

        let added = match (value, self) {
            (P::Byte(n), D::ByteDelta(d)) => Some(P::Byte(n.wrapping_add(*d))),
            (P::Short(n), D::ShortDelta(d)) => Some(P::Short(n.wrapping_add(*d))),
            (P::Int(n), D::IntDelta(d)) => Some(P::Int(n.wrapping_add(*d))),
            (P::Long(n), D::LongDelta(d)) => Some(P::Long(n.wrapping_add(*d))),
            (P::Float(n), D::FloatDelta(d)) => Some(P::Float(n + d)),
            (P::Double(n), D::DoubleDelta(d)) => Some(P::Double(n + d)),
            (P::BigInt(n), D::BigIntDelta(d)) => n.checked_add(*d).map(P::BigInt),
            (P::BigDecimal(n), D::BigDecimalDelta(d)) => n.checked_add(*d).map(P::BigDecimal),
            (P::Instant(t), D::InstantDelta(d)) => t.checked_add_signed(*d).map(P::Instant),
            (P::Duration(t), D::DurationDelta(d)) => t.checked_add(d).map(P::Duration),
            (P::LocalDate(t), D::LocalDateDelta(days)) => TimeDelta::try_days(*days)
                .and_then(|d| t.checked_add_signed(d))
                .map(P::LocalDate),
            (P::LocalDateTime(t), D::LocalDateTimeDelta(d)) => {
                t.checked_add_signed(*d).map(P::LocalDateTime)
            }
            (P::LocalTime(t), D::LocalTimeDelta(d)) => {
                Some(P::LocalTime(t.overflowing_add_signed(*d).0))
            }
            _ => return Err(DeltaFailure::KindMismatch),
        };
        added.ok_or(DeltaFailure::Overflow)
    }

    /// The delta that turns `from` into `to`, if both are the same exact
    /// numeric kind and adding it reproduces `to` exactly.
    pub(crate) fn between(from: &PrimitiveValue, to: &PrimitiveValue) -> Option<PrimitiveOp> {
        use PrimitiveValue as P;

        let delta = match (from, to) {
            (P::Byte(a), P::Byte(b)) => PrimitiveOp::ByteDelta(b.wrapping_sub(*a)),
            (P::Short(a), P::Short(b)) => PrimitiveOp::ShortDelta(b.wrapping_sub(*a)),
            (P::Int(a), P::Int(b)) => PrimitiveOp::IntDelta(b.wrapping_sub(*a)),
            (P::Long(a), P::Long(b)) => PrimitiveOp::LongDelta(b.wrapping_sub(*a)),
            (P::BigInt(a), P::BigInt(b)) => PrimitiveOp::BigIntDelta(b.checked_sub(*a)?),
            (P::BigDecimal(a), P::BigDecimal(b)) => {
                PrimitiveOp::BigDecimalDelta(b.checked_sub(*a)?)
            }
            _ => return None,
        };
        match delta.add_to(from) {
            Ok(ref reached) if reached == to => Some(delta),
            _ => None,
        }
    }
}

// ── Leaf edit ops ─────────────────────────────────────────────────────────

/// One step of a `StringEdit`. Indices count chars and refer to the string
/// as left by the previous step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringOp {
    Insert { index: usize, text: String },
    Delete { index: usize, length: usize },
}

/// One step of a `SequenceEdit`. Indices refer to the sequence as left by
/// the previous step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SeqOp {
    Insert { index: usize, values: Vec<DynamicValue> },
    Append { values: Vec<DynamicValue> },
    Delete { index: usize, count: usize },
    Modify { index: usize, op: Operation },
}

/// One step of a `MapEdit`. Keys are compared structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapOp {
    Add { key: DynamicValue, value: DynamicValue },
    Remove { key: DynamicValue },
    Modify { key: DynamicValue, op: Operation },
}

// ── Patch op ──────────────────────────────────────────────────────────────

/// An [`Operation`] bound to the location it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    pub path: DynamicOptic,
    pub operation: Operation,
}

impl PatchOp {
    #[inline]
    pub fn new(path: DynamicOptic, operation: Operation) -> Self {
        Self { path, operation }
    }
}
