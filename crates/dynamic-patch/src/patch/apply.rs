//! Patch application.
//!
//! A pure recursive interpreter over `(value, remaining path nodes)`. Each
//! node is matched against the kind of the current value; at the end of the
//! path the [`Operation`] is executed. [`PatchMode`] decides whether a path or
//! edit that does not fit the value is an error, a skipped location, or (in
//! `Clobber` mode) something to create or clamp.

use dynamic_value::{DynamicOptic, DynamicValue, Node, SchemaError, SchemaResult};
use tracing::{debug, trace};

use super::types::{
    DeltaFailure, MapOp, Operation, PatchMode, PatchOp, PrimitiveOp, SeqOp, StringOp,
};

/// Apply each op in order, threading the value through.
///
/// The first failing op aborts the whole patch (never in `Lenient` mode).
pub fn apply_ops(
    value: &DynamicValue,
    ops: &[PatchOp],
    mode: PatchMode,
) -> SchemaResult<DynamicValue> {
    let mut current = value.clone();
    for op in ops {
        trace!(path = %op.path, ?mode, "applying patch op");
        current = apply_op(&current, op, mode)?;
    }
    Ok(current)
}

pub fn apply_op(value: &DynamicValue, op: &PatchOp, mode: PatchMode) -> SchemaResult<DynamicValue> {
    navigate(value, op.path.nodes(), &DynamicOptic::root(), &op.operation, mode)
}

/// Execute `operation` directly on `value`, as if addressed by the root path.
pub fn apply_operation(
    value: &DynamicValue,
    operation: &Operation,
    mode: PatchMode,
) -> SchemaResult<DynamicValue> {
    navigate(value, &[], &DynamicOptic::root(), operation, mode)
}

// ── Navigation ────────────────────────────────────────────────────────────

fn navigate(
    value: &DynamicValue,
    nodes: &[Node],
    at: &DynamicOptic,
    operation: &Operation,
    mode: PatchMode,
) -> SchemaResult<DynamicValue> {
    match step(value, nodes, at, operation, mode) {
        Err(err) if mode == PatchMode::Lenient => {
            debug!(path = %at, error = %err, "patch location skipped");
            Ok(value.clone())
        }
        other => other,
    }
}

fn step(
    value: &DynamicValue,
    nodes: &[Node],
    at: &DynamicOptic,
    operation: &Operation,
    mode: PatchMode,
) -> SchemaResult<DynamicValue> {
    let Some((node, rest)) = nodes.split_first() else {
        return execute(value, operation, at, mode);
    };
    match node {
        Node::Field(name) => {
            let mut fields = record(value, at)?.to_vec();
            match fields.iter().position(|(n, _)| n == name) {
                Some(pos) => {
                    let child = at.child(node.clone());
                    let updated = navigate(&fields[pos].1, rest, &child, operation, mode)?;
                    fields[pos].1 = updated;
                }
                None => match (mode, rest.is_empty(), operation) {
                    (PatchMode::Clobber, true, Operation::Set(v)) => {
                        fields.push((name.clone(), v.clone()))
                    }
                    _ => return Err(SchemaError::missing_field(at.clone(), name.clone())),
                },
            }
            Ok(DynamicValue::Record(fields))
        }
        Node::Case(name) => match value {
            DynamicValue::Variant(case, payload) if case == name => {
                let updated = navigate(payload, rest, &at.child(node.clone()), operation, mode)?;
                Ok(DynamicValue::Variant(case.clone(), Box::new(updated)))
            }
            DynamicValue::Variant(case, _) => {
                debug!(
                    path = %at,
                    expected = %name,
                    found = %case,
                    "case mismatch, patch op skipped"
                );
                Ok(value.clone())
            }
            other => Err(SchemaError::type_mismatch(at.clone(), "variant", other)),
        },
        Node::AtIndex(i) => at_indices(value, std::slice::from_ref(i), rest, at, operation, mode),
        Node::AtIndices(indices) => at_indices(value, indices, rest, at, operation, mode),
        Node::AtMapKey(key) => at_keys(value, std::slice::from_ref(key), rest, at, operation, mode),
        Node::AtMapKeys(keys) => at_keys(value, keys, rest, at, operation, mode),
        Node::Elements => {
            let mut items = sequence(value, at)?.to_vec();
            for (i, item) in items.iter_mut().enumerate() {
                *item = navigate(item, rest, &at.child(Node::AtIndex(i)), operation, mode)?;
            }
            Ok(DynamicValue::Sequence(items))
        }
        Node::MapKeys => {
            let mut entries = map(value, at)?.to_vec();
            for (key, _) in entries.iter_mut() {
                *key = navigate(key, rest, &at.child(Node::MapKeys), operation, mode)?;
            }
            Ok(DynamicValue::Map(entries))
        }
        Node::MapValues => {
            let mut entries = map(value, at)?.to_vec();
            for (key, v) in entries.iter_mut() {
                *v = navigate(v, rest, &at.child(Node::AtMapKey(key.clone())), operation, mode)?;
            }
            Ok(DynamicValue::Map(entries))
        }
        Node::Wrapped => navigate(value, rest, &at.child(Node::Wrapped), operation, mode),
    }
}

fn at_indices(
    value: &DynamicValue,
    indices: &[usize],
    rest: &[Node],
    at: &DynamicOptic,
    operation: &Operation,
    mode: PatchMode,
) -> SchemaResult<DynamicValue> {
    let mut items = sequence(value, at)?.to_vec();
    for &i in indices {
        let Some(item) = items.get(i) else {
            let err = SchemaError::index_out_of_range(at.clone(), i, items.len());
            if mode == PatchMode::Strict {
                return Err(err);
            }
            debug!(path = %at, error = %err, "index out of range, location left unchanged");
            continue;
        };
        let updated = navigate(item, rest, &at.child(Node::AtIndex(i)), operation, mode)?;
        items[i] = updated;
    }
    Ok(DynamicValue::Sequence(items))
}

fn at_keys(
    value: &DynamicValue,
    keys: &[DynamicValue],
    rest: &[Node],
    at: &DynamicOptic,
    operation: &Operation,
    mode: PatchMode,
) -> SchemaResult<DynamicValue> {
    let mut entries = map(value, at)?.to_vec();
    for key in keys {
        let Some(pos) = entries.iter().position(|(k, _)| k == key) else {
            let err = SchemaError::key_not_found(at.clone(), key);
            if mode == PatchMode::Strict {
                return Err(err);
            }
            debug!(path = %at, error = %err, "map key absent, location left unchanged");
            continue;
        };
        let child = at.child(Node::AtMapKey(key.clone()));
        let updated = navigate(&entries[pos].1, rest, &child, operation, mode)?;
        entries[pos].1 = updated;
    }
    Ok(DynamicValue::Map(entries))
}

// ── Operation execution ───────────────────────────────────────────────────

fn execute(
    value: &DynamicValue,
    operation: &Operation,
    at: &DynamicOptic,
    mode: PatchMode,
) -> SchemaResult<DynamicValue> {
    match operation {
        Operation::Identity => Ok(value.clone()),
        Operation::Set(v) => Ok(v.clone()),
        Operation::PrimitiveDelta(delta) => apply_delta(value, delta, at),
        Operation::StringEdit(ops) => {
            let s = value
                .as_str()
                .ok_or_else(|| SchemaError::type_mismatch(at.clone(), "string", value))?;
            let mut chars: Vec<char> = s.chars().collect();
            for op in ops {
                apply_string_op(&mut chars, op, at, mode)?;
            }
            Ok(DynamicValue::string(chars.into_iter().collect::<String>()))
        }
        Operation::SequenceEdit(ops) => {
            let mut items = sequence(value, at)?.to_vec();
            for op in ops {
                apply_seq_op(&mut items, op, at, mode)?;
            }
            Ok(DynamicValue::Sequence(items))
        }
        Operation::MapEdit(ops) => {
            let mut entries = map(value, at)?.to_vec();
            for op in ops {
                apply_map_op(&mut entries, op, at, mode)?;
            }
            Ok(DynamicValue::Map(entries))
        }
    }
}

fn apply_delta(
    value: &DynamicValue,
    delta: &PrimitiveOp,
    at: &DynamicOptic,
) -> SchemaResult<DynamicValue> {
    let primitive = value
        .as_primitive()
        .ok_or_else(|| SchemaError::type_mismatch(at.clone(), delta.target_kind(), value))?;
    match delta.add_to(primitive) {
        Ok(p) => Ok(DynamicValue::Primitive(p)),
        Err(DeltaFailure::KindMismatch) => Err(SchemaError::type_mismatch(
            at.clone(),
            delta.target_kind(),
            value,
        )),
        Err(DeltaFailure::Overflow) => Err(SchemaError::transformation_failed(
            at.clone(),
            format!("{} delta out of range", delta.target_kind()),
        )),
    }
}

/// Validate or clamp `[index, index + len)` against a container of `size`.
fn span(
    index: usize,
    len: usize,
    size: usize,
    at: &DynamicOptic,
    mode: PatchMode,
) -> SchemaResult<(usize, usize)> {
    let end = index.saturating_add(len);
    if end <= size {
        return Ok((index, end));
    }
    if mode == PatchMode::Clobber {
        return Ok((index.min(size), end.min(size)));
    }
    Err(SchemaError::index_out_of_range(at.clone(), end, size))
}

fn apply_string_op(
    chars: &mut Vec<char>,
    op: &StringOp,
    at: &DynamicOptic,
    mode: PatchMode,
) -> SchemaResult<()> {
    match op {
        StringOp::Insert { index, text } => {
            let (index, _) = span(*index, 0, chars.len(), at, mode)?;
            chars.splice(index..index, text.chars());
        }
        StringOp::Delete { index, length } => {
            let (start, end) = span(*index, *length, chars.len(), at, mode)?;
            chars.drain(start..end);
        }
    }
    Ok(())
}

fn apply_seq_op(
    items: &mut Vec<DynamicValue>,
    op: &SeqOp,
    at: &DynamicOptic,
    mode: PatchMode,
) -> SchemaResult<()> {
    match op {
        SeqOp::Insert { index, values } => {
            let (index, _) = span(*index, 0, items.len(), at, mode)?;
            items.splice(index..index, values.iter().cloned());
        }
        SeqOp::Append { values } => items.extend(values.iter().cloned()),
        SeqOp::Delete { index, count } => {
            let (start, end) = span(*index, *count, items.len(), at, mode)?;
            items.drain(start..end);
        }
        SeqOp::Modify { index, op } => {
            let len = items.len();
            let Some(item) = items.get(*index) else {
                let err = SchemaError::index_out_of_range(at.clone(), *index, len);
                if mode == PatchMode::Strict {
                    return Err(err);
                }
                debug!(path = %at, error = %err, "sequence modify skipped");
                return Ok(());
            };
            let updated = execute(item, op, &at.child(Node::AtIndex(*index)), mode)?;
            items[*index] = updated;
        }
    }
    Ok(())
}

fn apply_map_op(
    entries: &mut Vec<(DynamicValue, DynamicValue)>,
    op: &MapOp,
    at: &DynamicOptic,
    mode: PatchMode,
) -> SchemaResult<()> {
    match op {
        MapOp::Add { key, value } => match entries.iter().position(|(k, _)| k == key) {
            Some(pos) if mode == PatchMode::Clobber => entries[pos].1 = value.clone(),
            Some(_) => return Err(SchemaError::field_already_exists(at.clone(), key.to_string())),
            None => entries.push((key.clone(), value.clone())),
        },
        MapOp::Remove { key } => match entries.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                entries.remove(pos);
            }
            None if mode == PatchMode::Clobber => {}
            None => return Err(SchemaError::key_not_found(at.clone(), key)),
        },
        MapOp::Modify { key, op } => match entries.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                let child = at.child(Node::AtMapKey(key.clone()));
                let updated = execute(&entries[pos].1, op, &child, mode)?;
                entries[pos].1 = updated;
            }
            None => match (mode, op) {
                (PatchMode::Clobber, Operation::Set(v)) => entries.push((key.clone(), v.clone())),
                (PatchMode::Clobber, _) => {
                    debug!(path = %at, key = %key, "map modify of absent key skipped");
                }
                _ => return Err(SchemaError::key_not_found(at.clone(), key)),
            },
        },
    }
    Ok(())
}

// ── Container access ──────────────────────────────────────────────────────

fn record<'a>(
    value: &'a DynamicValue,
    at: &DynamicOptic,
) -> SchemaResult<&'a [(String, DynamicValue)]> {
    value
        .as_record()
        .ok_or_else(|| SchemaError::type_mismatch(at.clone(), "record", value))
}

fn sequence<'a>(value: &'a DynamicValue, at: &DynamicOptic) -> SchemaResult<&'a [DynamicValue]> {
    value
        .as_sequence()
        .ok_or_else(|| SchemaError::type_mismatch(at.clone(), "sequence", value))
}

fn map<'a>(
    value: &'a DynamicValue,
    at: &DynamicOptic,
) -> SchemaResult<&'a [(DynamicValue, DynamicValue)]> {
    value
        .as_map()
        .ok_or_else(|| SchemaError::type_mismatch(at.clone(), "map", value))
}
