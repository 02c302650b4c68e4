//! Navigation through a [`DynamicOptic`]: select, update, insert, delete.
//!
//! Every operation comes in two flavours. The plain form is best-effort: an
//! unreachable path selects nothing or leaves the value unchanged. The
//! `_or_fail` form reports the reason as a [`SchemaError`].
//!
//! `Case` nodes follow prism semantics in both flavours: navigating into a
//! variant whose tag differs from the requested case succeeds without
//! touching the value (and selects nothing).
//!
//! Updates rebuild the containers along the path; the input is never mutated.

use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::optic::{DynamicOptic, Node};
use crate::selection::Selection;
use crate::value::DynamicValue;

impl DynamicValue {
    /// Select every value addressed by `optic`; empty if navigation fails.
    pub fn get(&self, optic: &DynamicOptic) -> Selection {
        self.get_or_fail(optic).unwrap_or_else(|err| {
            debug!(path = %optic, error = %err, "selection failed, nothing selected");
            Selection::empty()
        })
    }

    pub fn get_or_fail(&self, optic: &DynamicOptic) -> SchemaResult<Selection> {
        let mut out = Vec::new();
        select_into(self, optic.nodes(), &DynamicOptic::root(), &mut out)?;
        Ok(Selection::new(out))
    }

    /// Replace every value addressed by `optic` with `value`.
    pub fn set(&self, optic: &DynamicOptic, value: DynamicValue) -> DynamicValue {
        best_effort(self, optic, "set", self.set_or_fail(optic, value))
    }

    pub fn set_or_fail(
        &self,
        optic: &DynamicOptic,
        value: DynamicValue,
    ) -> SchemaResult<DynamicValue> {
        self.modify_or_fail(optic, |_, _| Ok(value.clone()))
    }

    /// Rewrite every value addressed by `optic` with `f`.
    pub fn modify<F>(&self, optic: &DynamicOptic, mut f: F) -> DynamicValue
    where
        F: FnMut(&DynamicValue) -> DynamicValue,
    {
        best_effort(self, optic, "modify", self.modify_or_fail(optic, |_, v| Ok(f(v))))
    }

    /// Rewrite every value addressed by `optic` with a fallible `f`.
    ///
    /// `f` receives the concrete path of each visited location and its
    /// current value. `Elements`, `AtIndices`, `MapValues` and `AtMapKeys`
    /// resolve to the index or key actually visited; `MapKeys` stays `{*:}`,
    /// since no node addresses a key itself. The first error aborts the whole
    /// update.
    pub fn modify_or_fail<F>(&self, optic: &DynamicOptic, mut f: F) -> SchemaResult<DynamicValue>
    where
        F: FnMut(&DynamicOptic, &DynamicValue) -> SchemaResult<DynamicValue>,
    {
        modify_at(self, optic.nodes(), &DynamicOptic::root(), &mut f)
    }

    /// Insert `value` at `optic`, whose last node must be `Field`, `AtIndex`
    /// or `AtMapKey`.
    pub fn insert(&self, optic: &DynamicOptic, value: DynamicValue) -> DynamicValue {
        best_effort(self, optic, "insert", self.insert_or_fail(optic, value))
    }

    /// Insert, failing with `FieldAlreadyExists` if the field or key is
    /// present, or `InvalidPath` if the index is beyond the end.
    pub fn insert_or_fail(
        &self,
        optic: &DynamicOptic,
        value: DynamicValue,
    ) -> SchemaResult<DynamicValue> {
        let (parent, last) = optic
            .split_last()
            .ok_or_else(|| {
                SchemaError::invalid_path(DynamicOptic::root(), "cannot insert at the root")
            })?;
        self.modify_or_fail(&parent, |at, container| {
            insert_into(at, container, last, value.clone())
        })
    }

    /// Remove the value(s) addressed by `optic` from their container.
    pub fn delete(&self, optic: &DynamicOptic) -> DynamicValue {
        best_effort(self, optic, "delete", self.delete_or_fail(optic))
    }

    pub fn delete_or_fail(&self, optic: &DynamicOptic) -> SchemaResult<DynamicValue> {
        let (parent, last) = optic
            .split_last()
            .ok_or_else(|| {
                SchemaError::invalid_path(DynamicOptic::root(), "cannot delete the root")
            })?;
        self.modify_or_fail(&parent, |at, container| delete_from(at, container, last))
    }
}

fn best_effort(
    original: &DynamicValue,
    optic: &DynamicOptic,
    action: &str,
    result: SchemaResult<DynamicValue>,
) -> DynamicValue {
    result.unwrap_or_else(|err| {
        debug!(path = %optic, error = %err, "{action} skipped, value left unchanged");
        original.clone()
    })
}

// ── Container access ──────────────────────────────────────────────────────

pub(crate) fn expect_record<'a>(
    value: &'a DynamicValue,
    at: &DynamicOptic,
) -> SchemaResult<&'a [(String, DynamicValue)]> {
    value
        .as_record()
        .ok_or_else(|| SchemaError::type_mismatch(at.clone(), "record", value))
}

pub(crate) fn expect_sequence<'a>(
    value: &'a DynamicValue,
    at: &DynamicOptic,
) -> SchemaResult<&'a [DynamicValue]> {
    value
        .as_sequence()
        .ok_or_else(|| SchemaError::type_mismatch(at.clone(), "sequence", value))
}

pub(crate) fn expect_map<'a>(
    value: &'a DynamicValue,
    at: &DynamicOptic,
) -> SchemaResult<&'a [(DynamicValue, DynamicValue)]> {
    value
        .as_map()
        .ok_or_else(|| SchemaError::type_mismatch(at.clone(), "map", value))
}

// ── Selection ─────────────────────────────────────────────────────────────

fn select_into(
    value: &DynamicValue,
    nodes: &[Node],
    at: &DynamicOptic,
    out: &mut Vec<DynamicValue>,
) -> SchemaResult<()> {
    let Some((node, rest)) = nodes.split_first() else {
        out.push(value.clone());
        return Ok(());
    };
    match node {
        Node::Field(name) => {
            let child = expect_record(value, at)?
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v)
                .ok_or_else(|| SchemaError::missing_field(at.clone(), name.clone()))?;
            select_into(child, rest, &at.child(node.clone()), out)
        }
        Node::Case(name) => match value {
            DynamicValue::Variant(case, payload) if case == name => {
                select_into(payload, rest, &at.child(node.clone()), out)
            }
            DynamicValue::Variant(..) => Ok(()),
            other => Err(SchemaError::type_mismatch(at.clone(), "variant", other)),
        },
        Node::AtIndex(i) => select_indices(value, std::slice::from_ref(i), rest, at, out),
        Node::AtIndices(indices) => select_indices(value, indices, rest, at, out),
        Node::AtMapKey(key) => select_keys(value, std::slice::from_ref(key), rest, at, out),
        Node::AtMapKeys(keys) => select_keys(value, keys, rest, at, out),
        Node::Elements => {
            for (i, item) in expect_sequence(value, at)?.iter().enumerate() {
                select_into(item, rest, &at.child(Node::AtIndex(i)), out)?;
            }
            Ok(())
        }
        Node::MapKeys => {
            for (key, _) in expect_map(value, at)? {
                select_into(key, rest, &at.child(Node::MapKeys), out)?;
            }
            Ok(())
        }
        Node::MapValues => {
            for (key, v) in expect_map(value, at)? {
                select_into(v, rest, &at.child(Node::AtMapKey(key.clone())), out)?;
            }
            Ok(())
        }
        Node::Wrapped => select_into(value, rest, &at.child(Node::Wrapped), out),
    }
}

fn select_indices(
    value: &DynamicValue,
    indices: &[usize],
    rest: &[Node],
    at: &DynamicOptic,
    out: &mut Vec<DynamicValue>,
) -> SchemaResult<()> {
    let items = expect_sequence(value, at)?;
    for &i in indices {
        let item = items
            .get(i)
            .ok_or_else(|| SchemaError::index_out_of_range(at.clone(), i, items.len()))?;
        select_into(item, rest, &at.child(Node::AtIndex(i)), out)?;
    }
    Ok(())
}

fn select_keys(
    value: &DynamicValue,
    keys: &[DynamicValue],
    rest: &[Node],
    at: &DynamicOptic,
    out: &mut Vec<DynamicValue>,
) -> SchemaResult<()> {
    let entries = expect_map(value, at)?;
    for key in keys {
        let v = entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| SchemaError::key_not_found(at.clone(), key))?;
        select_into(v, rest, &at.child(Node::AtMapKey(key.clone())), out)?;
    }
    Ok(())
}

// ── Structural update ─────────────────────────────────────────────────────

fn modify_at<F>(
    value: &DynamicValue,
    nodes: &[Node],
    at: &DynamicOptic,
    f: &mut F,
) -> SchemaResult<DynamicValue>
where
    F: FnMut(&DynamicOptic, &DynamicValue) -> SchemaResult<DynamicValue>,
{
    let Some((node, rest)) = nodes.split_first() else {
        return f(at, value);
    };
    match node {
        Node::Field(name) => {
            let mut fields = expect_record(value, at)?.to_vec();
            let pos = fields
                .iter()
                .position(|(n, _)| n == name)
                .ok_or_else(|| SchemaError::missing_field(at.clone(), name.clone()))?;
            let updated = modify_at(&fields[pos].1, rest, &at.child(node.clone()), f)?;
            fields[pos].1 = updated;
            Ok(DynamicValue::Record(fields))
        }
        Node::Case(name) => match value {
            DynamicValue::Variant(case, payload) if case == name => {
                let updated = modify_at(payload, rest, &at.child(node.clone()), f)?;
                Ok(DynamicValue::Variant(case.clone(), Box::new(updated)))
            }
            DynamicValue::Variant(case, _) => {
                debug!(
                    path = %at,
                    expected = %name,
                    found = %case,
                    "case mismatch, value left unchanged"
                );
                Ok(value.clone())
            }
            other => Err(SchemaError::type_mismatch(at.clone(), "variant", other)),
        },
        Node::AtIndex(i) => modify_indices(value, std::slice::from_ref(i), rest, at, f),
        Node::AtIndices(indices) => modify_indices(value, indices, rest, at, f),
        Node::AtMapKey(key) => modify_keys(value, std::slice::from_ref(key), rest, at, f),
        Node::AtMapKeys(keys) => modify_keys(value, keys, rest, at, f),
        Node::Elements => {
            let mut items = expect_sequence(value, at)?.to_vec();
            for (i, item) in items.iter_mut().enumerate() {
                *item = modify_at(item, rest, &at.child(Node::AtIndex(i)), f)?;
            }
            Ok(DynamicValue::Sequence(items))
        }
        Node::MapKeys => {
            let mut entries = expect_map(value, at)?.to_vec();
            for (key, _) in entries.iter_mut() {
                *key = modify_at(key, rest, &at.child(Node::MapKeys), f)?;
            }
            Ok(DynamicValue::Map(entries))
        }
        Node::MapValues => {
            let mut entries = expect_map(value, at)?.to_vec();
            for (key, v) in entries.iter_mut() {
                *v = modify_at(v, rest, &at.child(Node::AtMapKey(key.clone())), f)?;
            }
            Ok(DynamicValue::Map(entries))
        }
        Node::Wrapped => modify_at(value, rest, &at.child(Node::Wrapped), f),
    }
}

fn modify_indices<F>(
    value: &DynamicValue,
    indices: &[usize],
    rest: &[Node],
    at: &DynamicOptic,
    f: &mut F,
) -> SchemaResult<DynamicValue>
where
    F: FnMut(&DynamicOptic, &DynamicValue) -> SchemaResult<DynamicValue>,
{
    let mut items = expect_sequence(value, at)?.to_vec();
    for &i in indices {
        let len = items.len();
        let item = items
            .get(i)
            .ok_or_else(|| SchemaError::index_out_of_range(at.clone(), i, len))?;
        let updated = modify_at(item, rest, &at.child(Node::AtIndex(i)), f)?;
        items[i] = updated;
    }
    Ok(DynamicValue::Sequence(items))
}

fn modify_keys<F>(
    value: &DynamicValue,
    keys: &[DynamicValue],
    rest: &[Node],
    at: &DynamicOptic,
    f: &mut F,
) -> SchemaResult<DynamicValue>
where
    F: FnMut(&DynamicOptic, &DynamicValue) -> SchemaResult<DynamicValue>,
{
    let mut entries = expect_map(value, at)?.to_vec();
    for key in keys {
        let pos = entries
            .iter()
            .position(|(k, _)| k == key)
            .ok_or_else(|| SchemaError::key_not_found(at.clone(), key))?;
        let updated = modify_at(&entries[pos].1, rest, &at.child(Node::AtMapKey(key.clone())), f)?;
        entries[pos].1 = updated;
    }
    Ok(DynamicValue::Map(entries))
}

// ── Insert / delete at the last node ──────────────────────────────────────

fn insert_into(
    at: &DynamicOptic,
    container: &DynamicValue,
    node: &Node,
    value: DynamicValue,
) -> SchemaResult<DynamicValue> {
    match node {
        Node::Field(name) => {
            let mut fields = expect_record(container, at)?.to_vec();
            if fields.iter().any(|(n, _)| n == name) {
                return Err(SchemaError::field_already_exists(at.clone(), name.clone()));
            }
            fields.push((name.clone(), value));
            Ok(DynamicValue::Record(fields))
        }
        Node::AtIndex(i) => {
            let mut items = expect_sequence(container, at)?.to_vec();
            if *i > items.len() {
                return Err(SchemaError::index_out_of_range(at.clone(), *i, items.len()));
            }
            items.insert(*i, value);
            Ok(DynamicValue::Sequence(items))
        }
        Node::AtMapKey(key) => {
            let mut entries = expect_map(container, at)?.to_vec();
            if entries.iter().any(|(k, _)| k == key) {
                return Err(SchemaError::field_already_exists(at.clone(), key.to_string()));
            }
            entries.push((key.clone(), value));
            Ok(DynamicValue::Map(entries))
        }
        other => Err(SchemaError::unsupported_node(at.clone(), other, "insert")),
    }
}

fn delete_from(
    at: &DynamicOptic,
    container: &DynamicValue,
    node: &Node,
) -> SchemaResult<DynamicValue> {
    match node {
        Node::Field(name) => {
            let mut fields = expect_record(container, at)?.to_vec();
            let pos = fields
                .iter()
                .position(|(n, _)| n == name)
                .ok_or_else(|| SchemaError::missing_field(at.clone(), name.clone()))?;
            fields.remove(pos);
            Ok(DynamicValue::Record(fields))
        }
        Node::AtIndex(i) => delete_indices(at, container, std::slice::from_ref(i)),
        Node::AtIndices(indices) => delete_indices(at, container, indices),
        Node::AtMapKey(key) => delete_keys(at, container, std::slice::from_ref(key)),
        Node::AtMapKeys(keys) => delete_keys(at, container, keys),
        Node::Elements => {
            expect_sequence(container, at)?;
            Ok(DynamicValue::Sequence(Vec::new()))
        }
        other => Err(SchemaError::unsupported_node(at.clone(), other, "delete")),
    }
}

fn delete_indices(
    at: &DynamicOptic,
    container: &DynamicValue,
    indices: &[usize],
) -> SchemaResult<DynamicValue> {
    let items = expect_sequence(container, at)?;
    if let Some(&bad) = indices.iter().find(|&&i| i >= items.len()) {
        return Err(SchemaError::index_out_of_range(at.clone(), bad, items.len()));
    }
    let kept = items
        .iter()
        .enumerate()
        .filter(|(i, _)| !indices.contains(i))
        .map(|(_, v)| v.clone())
        .collect();
    Ok(DynamicValue::Sequence(kept))
}

fn delete_keys(
    at: &DynamicOptic,
    container: &DynamicValue,
    keys: &[DynamicValue],
) -> SchemaResult<DynamicValue> {
    let entries = expect_map(container, at)?;
    if let Some(missing) = keys.iter().find(|key| !entries.iter().any(|(k, _)| k == *key)) {
        return Err(SchemaError::key_not_found(at.clone(), missing));
    }
    let kept = entries
        .iter()
        .filter(|(k, _)| !keys.contains(k))
        .cloned()
        .collect();
    Ok(DynamicValue::Map(kept))
}
