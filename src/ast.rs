use serde::{Deserialize, Serialize};

/// A node supplied by the host rendering system.
///
/// Open markers attach their content through [`HostNode::with_children`].
/// Nodes that cannot hold children return an unchanged clone and ignore the
/// children; self-closing markers always use the node as-is.
pub trait HostNode: Clone {
    fn with_children(&self, children: Fragment<Self>) -> Self;
}

/// Root container of an interpolation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment<N> {
    pub children: Vec<Child<N>>,
}

/// One element of a fragment: literal text or a host node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child<N> {
    Text(String),
    Node(N),
}

impl<N> Fragment<N> {
    pub fn new(children: Vec<Child<N>>) -> Self {
        Self { children }
    }

    /// A fragment holding a single text child
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Child::Text(text.into())])
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Child<N>> {
        self.children.iter()
    }

    pub fn into_children(self) -> Vec<Child<N>> {
        self.children
    }
}

impl<N> Default for Fragment<N> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<N> IntoIterator for Fragment<N> {
    type Item = Child<N>;
    type IntoIter = std::vec::IntoIter<Child<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}

impl<N> Child<N> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Child::Text(text) => Some(text),
            Child::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            Child::Text(_) => None,
            Child::Node(node) => Some(node),
        }
    }
}
