//! Interpolate named markers in a string with caller-supplied nodes.
//!
//! A mixed string such as `"Read the {{link}}docs{{/link}}{{icon/}}"` is split
//! into text and markers, and each marker is replaced by the node the caller
//! mapped to its name. Open/close pairs wrap their content: the node is copied
//! with that content as its children. Self-closing markers insert the node
//! unchanged.
//!
//! ```
//! use node_interpolate::{Components, Interpolation, Options, interpolate};
//! use node_interpolate::node::JsonNode;
//!
//! let components = Components::from_iter([("b", JsonNode::element("strong"))]);
//! let result = interpolate(
//!     Options::new("Hello {{b}}world{{/b}}").with_components(components),
//! )
//! .unwrap();
//!
//! let Interpolation::Tree(tree) = result else { unreachable!() };
//! assert_eq!(tree.len(), 3);
//! ```
//!
//! By default errors are lenient: any failure returns the original string as
//! [`Interpolation::Original`]. Set [`Options::throw_errors`] to get them.

pub mod ast;
pub mod error;
pub mod node;
pub mod parser;
pub mod tags;

pub use ast::{Child, Fragment, HostNode};
pub use error::{ErrorKind, InterpolateError};
pub use tags::{DEFAULT_TAGS, TagPair, Tags};

use std::collections::HashMap;

/// Marker name to node. `None` marks a name that is present but undefined.
pub type NodeMap<N> = HashMap<String, Option<N>>;

/// The node mapping handed to [`interpolate`]
#[derive(Debug, Clone, PartialEq)]
pub enum Components<N> {
    Mapping(NodeMap<N>),
    /// Something that is not a mapping, described by its type name
    Invalid(String),
}

impl<N> Components<N> {
    pub fn new() -> Self {
        Components::Mapping(NodeMap::new())
    }

    /// Map `name` to `node`. Has no effect on [`Components::Invalid`].
    pub fn insert(&mut self, name: impl Into<String>, node: Option<N>) {
        if let Components::Mapping(map) = self {
            map.insert(name.into(), node);
        }
    }

    pub fn with(mut self, name: impl Into<String>, node: N) -> Self {
        self.insert(name, Some(node));
        self
    }
}

impl<N> Default for Components<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, N> FromIterator<(K, N)> for Components<N> {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        Components::Mapping(
            iter.into_iter()
                .map(|(name, node)| (name.into(), Some(node)))
                .collect(),
        )
    }
}

impl<N> From<NodeMap<N>> for Components<N> {
    fn from(map: NodeMap<N>) -> Self {
        Components::Mapping(map)
    }
}

/// Configuration for one interpolation call.
#[derive(Debug, Clone)]
pub struct Options<N> {
    /// The string containing markers
    pub mixed_string: String,
    /// Nodes to splice in; `None` makes the call a no-op
    pub components: Option<Components<N>>,
    /// Delimiters; `None` uses [`DEFAULT_TAGS`]
    pub tags: Option<Tags>,
    /// Return errors instead of falling back to the original string
    pub throw_errors: bool,
}

impl<N> Options<N> {
    pub fn new(mixed_string: impl Into<String>) -> Self {
        Self {
            mixed_string: mixed_string.into(),
            components: None,
            tags: None,
            throw_errors: false,
        }
    }

    pub fn with_components(mut self, components: impl Into<Components<N>>) -> Self {
        self.components = Some(components.into());
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn strict(mut self) -> Self {
        self.throw_errors = true;
        self
    }
}

/// Result of a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation<N> {
    Tree(Fragment<N>),
    /// The input, returned unchanged
    Original(String),
}

impl<N> Interpolation<N> {
    pub fn tree(&self) -> Option<&Fragment<N>> {
        match self {
            Interpolation::Tree(tree) => Some(tree),
            Interpolation::Original(_) => None,
        }
    }

    pub fn into_tree(self) -> Option<Fragment<N>> {
        match self {
            Interpolation::Tree(tree) => Some(tree),
            Interpolation::Original(_) => None,
        }
    }

    pub fn original(&self) -> Option<&str> {
        match self {
            Interpolation::Tree(_) => None,
            Interpolation::Original(original) => Some(original),
        }
    }
}

/// Everything the pipeline can end in, before the strictness policy applies
enum Outcome<N> {
    Tree(Fragment<N>),
    NoOp,
    Failed(InterpolateError),
}

impl<N> Outcome<N> {
    fn resolve(self, mixed_string: String, throw_errors: bool) -> Result<Interpolation<N>, InterpolateError> {
        match self {
            Outcome::Tree(tree) => Ok(Interpolation::Tree(tree)),
            Outcome::NoOp => Ok(Interpolation::Original(mixed_string)),
            Outcome::Failed(err) if throw_errors => Err(err),
            Outcome::Failed(err) => {
                tracing::debug!(kind = err.kind.as_str(), error = %err, "interpolation failed, returning original string");
                Ok(Interpolation::Original(mixed_string))
            }
        }
    }
}

/// Interpolate `options.mixed_string` with `options.components`.
///
/// Returns [`Interpolation::Original`] when there are no components, or when
/// anything fails in lenient mode. In strict mode failures are returned as
/// [`InterpolateError`]; there is never a partial tree.
pub fn interpolate<N: HostNode>(options: Options<N>) -> Result<Interpolation<N>, InterpolateError> {
    let Options {
        mixed_string,
        components,
        tags,
        throw_errors,
    } = options;

    let outcome = run(&mixed_string, components.as_ref(), tags.as_ref());
    outcome.resolve(mixed_string, throw_errors)
}

fn run<N: HostNode>(mixed_string: &str, components: Option<&Components<N>>, tags: Option<&Tags>) -> Outcome<N> {
    let nodes = match components {
        None => return Outcome::NoOp,
        Some(Components::Mapping(nodes)) => nodes,
        Some(Components::Invalid(what)) => {
            return Outcome::Failed(
                InterpolateError::new(
                    ErrorKind::InvalidComponents,
                    format!(
                        "Interpolation Error: unable to process `{}` because components is not an object",
                        mixed_string
                    ),
                )
                .with_help(format!("components must be a mapping of marker names to nodes, got {}", what)),
            );
        }
    };

    let tags = tags.unwrap_or(&*DEFAULT_TAGS);
    if let Err(err) = tags.validate() {
        return Outcome::Failed(
            InterpolateError::new(
                ErrorKind::InvalidTags,
                format!("Interpolation Error: unable to process `{}` because tags is invalid", mixed_string),
            )
            .with_help(err.message),
        );
    }

    match parser::parse(mixed_string, tags, nodes) {
        Ok(tree) => Outcome::Tree(tree),
        Err(err) => Outcome::Failed(err.in_context(mixed_string)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::JsonNode;
    use tracing_test::traced_test;

    fn components() -> Components<JsonNode> {
        Components::new().with("b", JsonNode::element("strong"))
    }

    #[test]
    fn test_no_components_is_noop() {
        let result = interpolate::<JsonNode>(Options::new("{{b}}x{{/b}}").strict()).unwrap();
        assert_eq!(result, Interpolation::Original("{{b}}x{{/b}}".to_string()));
    }

    #[test]
    fn test_lenient_failure_returns_original() {
        let result = interpolate(Options::new("{{b}}x").with_components(components())).unwrap();
        assert_eq!(result.original(), Some("{{b}}x"));
    }

    #[test]
    fn test_strict_failure_is_wrapped() {
        let err = interpolate(Options::new("{{b}}x").with_components(components()).strict()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingClose);
        assert_eq!(
            err.message,
            "Interpolation Error: unable to process `{{b}}x` because of error `Missing closing component token `b``"
        );
    }

    #[test]
    fn test_invalid_components() {
        let options = Options::<JsonNode> {
            components: Some(Components::Invalid("string".to_string())),
            ..Options::new("hi {{b/}}")
        };
        let lenient = interpolate(options.clone()).unwrap();
        assert_eq!(lenient.original(), Some("hi {{b/}}"));

        let err = interpolate(options.strict()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidComponents);
        assert!(err.message.ends_with("because components is not an object"));
    }

    #[test]
    fn test_invalid_tags() {
        let tags = Tags {
            open: None,
            ..Tags::default()
        };
        let options = Options::new("x").with_components(components()).with_tags(tags);
        assert_eq!(interpolate(options.clone()).unwrap().original(), Some("x"));

        let err = interpolate(options.strict()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTags);
        assert_eq!(err.help.as_deref(), Some("`open` tag pair is missing"));
    }

    #[test]
    fn test_tree() {
        let result = interpolate(Options::new("a{{b}}c{{/b}}").with_components(components())).unwrap();
        let tree = result.into_tree().unwrap();
        assert_eq!(
            tree.children,
            vec![
                Child::Text("a".to_string()),
                Child::Node(JsonNode::element("strong").with_children(Fragment::text("c"))),
                Child::Text(String::new()),
            ]
        );
    }

    #[test]
    #[traced_test]
    fn test_lenient_failure_is_logged() {
        let result = interpolate(Options::new("{{/b}}").with_components(components())).unwrap();
        assert_eq!(result.original(), Some("{{/b}}"));
        assert!(logs_contain("returning original string"));
        assert!(logs_contain("Unmatched close marker"));
    }
}
