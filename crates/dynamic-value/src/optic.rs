//! Path representation for addressing into a [`DynamicValue`].
//!
//! A [`DynamicOptic`] is an ordered list of [`Node`]s. Single-target nodes
//! (`Field`, `Case`, `AtIndex`, `AtMapKey`) descend into one child; the
//! multi-target nodes (`AtIndices`, `AtMapKeys`, `Elements`, `MapKeys`,
//! `MapValues`) fan out. `Wrapped` is a transparent step over single-field
//! wrapper values and does not consume a container level.
//!
//! `Display` renders the textual path syntax (`.users[*].email`, `<Some>`,
//! `{"key"}`, `.~`), which is what error messages show.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::DynamicValue;

/// A single addressing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Field(String),
    Case(String),
    AtIndex(usize),
    AtIndices(Vec<usize>),
    AtMapKey(DynamicValue),
    AtMapKeys(Vec<DynamicValue>),
    Elements,
    MapKeys,
    MapValues,
    Wrapped,
}

impl Node {
    /// Returns true if this node can select more than one value.
    pub fn is_fan_out(&self) -> bool {
        matches!(
            self,
            Node::AtIndices(_)
                | Node::AtMapKeys(_)
                | Node::Elements
                | Node::MapKeys
                | Node::MapValues
        )
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Field(name) => write!(f, ".{name}"),
            Node::Case(name) => write!(f, "<{name}>"),
            Node::AtIndex(i) => write!(f, "[{i}]"),
            Node::AtIndices(indices) => {
                f.write_str("[")?;
                for (n, i) in indices.iter().enumerate() {
                    if n > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{i}")?;
                }
                f.write_str("]")
            }
            Node::AtMapKey(key) => write!(f, "{{{key}}}"),
            Node::AtMapKeys(keys) => {
                f.write_str("{")?;
                for (n, key) in keys.iter().enumerate() {
                    if n > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}")?;
                }
                f.write_str("}")
            }
            Node::Elements => f.write_str("[*]"),
            Node::MapKeys => f.write_str("{*:}"),
            Node::MapValues => f.write_str("{*}"),
            Node::Wrapped => f.write_str(".~"),
        }
    }
}

/// An ordered list of [`Node`]s. The empty optic addresses the root.
///
/// Optics are immutable data; builder methods consume and return `self`.
///
/// ```
/// use dynamic_value::DynamicOptic;
///
/// let path = DynamicOptic::root().field("users").elements().field("email");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), ".users[*].email");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicOptic(Vec<Node>);

impl DynamicOptic {
    /// Create an empty optic (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    #[inline]
    pub fn into_nodes(self) -> Vec<Node> {
        self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<&Node> {
        self.0.last()
    }

    /// The optic without its last node, or `None` at the root.
    pub fn parent(&self) -> Option<DynamicOptic> {
        self.0
            .split_last()
            .map(|(_, init)| DynamicOptic(init.to_vec()))
    }

    /// Split into `(parent, last node)`.
    pub fn split_last(&self) -> Option<(DynamicOptic, &Node)> {
        self.0
            .split_last()
            .map(|(last, init)| (DynamicOptic(init.to_vec()), last))
    }

    /// Push a node (mutating).
    #[inline]
    pub fn push(&mut self, node: Node) {
        self.0.push(node);
    }

    /// A copy of this optic extended by `node`.
    pub fn child(&self, node: Node) -> Self {
        let mut nodes = Vec::with_capacity(self.0.len() + 1);
        nodes.extend_from_slice(&self.0);
        nodes.push(node);
        Self(nodes)
    }

    /// Compose two optics: `self` followed by `other`.
    pub fn append(&self, other: &DynamicOptic) -> Self {
        let mut nodes = Vec::with_capacity(self.0.len() + other.0.len());
        nodes.extend_from_slice(&self.0);
        nodes.extend_from_slice(&other.0);
        Self(nodes)
    }

    /// Returns true if `self` is a prefix of (or equal to) `other`.
    pub fn is_prefix_of(&self, other: &DynamicOptic) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    // ── Builder ───────────────────────────────────────────────────────────

    #[inline]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(Node::Field(name.into()));
        self
    }

    #[inline]
    pub fn case(mut self, name: impl Into<String>) -> Self {
        self.0.push(Node::Case(name.into()));
        self
    }

    #[inline]
    pub fn at(mut self, index: usize) -> Self {
        self.0.push(Node::AtIndex(index));
        self
    }

    #[inline]
    pub fn at_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.0.push(Node::AtIndices(indices.into_iter().collect()));
        self
    }

    #[inline]
    pub fn at_key(mut self, key: DynamicValue) -> Self {
        self.0.push(Node::AtMapKey(key));
        self
    }

    #[inline]
    pub fn at_keys(mut self, keys: impl IntoIterator<Item = DynamicValue>) -> Self {
        self.0.push(Node::AtMapKeys(keys.into_iter().collect()));
        self
    }

    #[inline]
    pub fn elements(mut self) -> Self {
        self.0.push(Node::Elements);
        self
    }

    #[inline]
    pub fn map_keys(mut self) -> Self {
        self.0.push(Node::MapKeys);
        self
    }

    #[inline]
    pub fn map_values(mut self) -> Self {
        self.0.push(Node::MapValues);
        self
    }

    #[inline]
    pub fn wrapped(mut self) -> Self {
        self.0.push(Node::Wrapped);
        self
    }
}

impl fmt::Display for DynamicOptic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        for node in &self.0 {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl From<Vec<Node>> for DynamicOptic {
    fn from(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }
}

impl FromIterator<Node> for DynamicOptic {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_as_dot() {
        assert_eq!(DynamicOptic::root().to_string(), ".");
        assert!(DynamicOptic::root().is_root());
    }

    #[test]
    fn renders_every_node_kind() {
        let path = DynamicOptic::root()
            .field("a")
            .case("Some")
            .at(2)
            .at_indices([0, 3])
            .at_key(DynamicValue::string("k"))
            .map_values()
            .map_keys()
            .elements()
            .wrapped();
        assert_eq!(path.to_string(), ".a<Some>[2][0,3]{\"k\"}{*}{*:}[*].~");
    }

    #[test]
    fn split_last_and_parent() {
        let path = DynamicOptic::root().field("a").field("b");
        let (parent, last) = path.split_last().unwrap();
        assert_eq!(parent, DynamicOptic::root().field("a"));
        assert_eq!(last, &Node::Field("b".to_string()));
        assert_eq!(path.parent(), Some(parent));
        assert_eq!(DynamicOptic::root().parent(), None);
    }

    #[test]
    fn append_and_prefix() {
        let a = DynamicOptic::root().field("a");
        let b = DynamicOptic::root().elements();
        let ab = a.append(&b);
        assert_eq!(ab.nodes(), &[Node::Field("a".to_string()), Node::Elements]);
        assert!(a.is_prefix_of(&ab));
        assert!(!b.is_prefix_of(&ab));
    }

    #[test]
    fn fan_out_nodes() {
        assert!(Node::Elements.is_fan_out());
        assert!(!Node::Wrapped.is_fan_out());
        assert!(!Node::AtIndex(0).is_fan_out());
    }
}
