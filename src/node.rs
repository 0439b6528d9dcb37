//! JSON-backed host nodes.
//!
//! Lets the crate be used without a host rendering system: node mappings
//! are read from JSON and the interpolated tree serializes back to JSON.
//!
//! An object made only of `type`, `props` and `children` keys is an element
//! and takes children from open markers. Any other value is a leaf and is
//! reused as-is. `null` in a mapping means the name is present but undefined.

use crate::ast::{Child, Fragment, HostNode};
use crate::{Components, NodeMap};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonNode {
    Element(Element),
    Leaf(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Element {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child<JsonNode>>,
}

impl JsonNode {
    pub fn element(tag: impl Into<String>) -> Self {
        JsonNode::Element(Element {
            tag: Some(tag.into()),
            ..Element::default()
        })
    }

    pub fn leaf(value: impl Into<Value>) -> Self {
        JsonNode::Leaf(value.into())
    }

    /// Set a prop on an element. Leaves are returned unchanged.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let JsonNode::Element(element) = &mut self {
            element.props.insert(key.into(), value.into());
        }
        self
    }

    pub fn children(&self) -> &[Child<JsonNode>] {
        match self {
            JsonNode::Element(element) => &element.children,
            JsonNode::Leaf(_) => &[],
        }
    }
}

impl HostNode for JsonNode {
    fn with_children(&self, children: Fragment<Self>) -> Self {
        match self {
            JsonNode::Element(element) => JsonNode::Element(Element {
                tag: element.tag.clone(),
                props: element.props.clone(),
                children: children.into_children(),
            }),
            JsonNode::Leaf(_) => self.clone(),
        }
    }
}

impl Components<JsonNode> {
    /// Read a node mapping from JSON.
    ///
    /// `null` means no mapping was supplied and yields `None`; any other
    /// non-object yields [`Components::Invalid`].
    pub fn from_json(value: Value) -> Result<Option<Self>, serde_json::Error> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(None),
            other => return Ok(Some(Components::Invalid(json_type(&other).to_string()))),
        };

        map.into_iter()
            .map(|(name, value)| match value {
                Value::Null => Ok((name, None)),
                value => serde_json::from_value(value).map(|node| (name, Some(node))),
            })
            .collect::<Result<NodeMap<JsonNode>, _>>()
            .map(|map| Some(Components::Mapping(map)))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Null | Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Interpolation, Options, interpolate};
    use serde_json::json;

    #[test]
    fn test_object_is_element() {
        let node: JsonNode = serde_json::from_value(json!({"type": "a", "props": {"href": "/x"}})).unwrap();
        assert_eq!(node, JsonNode::element("a").with_prop("href", "/x"));
    }

    #[test]
    fn test_scalars_and_foreign_objects_are_leaves() {
        let node: JsonNode = serde_json::from_value(json!("★")).unwrap();
        assert_eq!(node, JsonNode::leaf("★"));

        let node: JsonNode = serde_json::from_value(json!({"src": "a.png"})).unwrap();
        assert!(matches!(node, JsonNode::Leaf(Value::Object(_))));
    }

    #[test]
    fn test_with_children() {
        let node = JsonNode::element("b").with_children(Fragment::text("hi"));
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"type": "b", "children": ["hi"]}));

        let leaf = JsonNode::leaf(7);
        assert_eq!(leaf.with_children(Fragment::text("dropped")), leaf);
    }

    #[test]
    fn test_components_from_json() {
        let components = Components::from_json(json!({"b": {"type": "strong"}, "gone": null})).unwrap();
        let Some(Components::Mapping(map)) = components else {
            panic!("expected a mapping");
        };
        assert_eq!(map["b"], Some(JsonNode::element("strong")));
        assert_eq!(map["gone"], None);
    }

    #[test]
    fn test_components_from_non_object() {
        let components = Components::from_json(json!("not a map")).unwrap();
        assert!(matches!(components, Some(Components::Invalid(ref what)) if what == "string"));
    }

    #[test]
    fn test_null_is_no_components() {
        assert_eq!(Components::from_json(json!(null)).unwrap(), None);

        let options = Options::<JsonNode> {
            components: Components::from_json(json!(null)).unwrap(),
            ..Options::new("{{/b}} x").strict()
        };
        assert_eq!(
            interpolate(options).unwrap(),
            Interpolation::Original("{{/b}} x".to_string())
        );
    }

    #[test]
    fn test_element_children_after_interpolation() {
        let components = Components::from_json(json!({"b": {"type": "strong"}, "star": "★"}))
            .unwrap()
            .unwrap();
        let tree = interpolate(Options::new("{{b}}hi {{star/}}{{/b}}").with_components(components))
            .unwrap()
            .into_tree()
            .unwrap();

        let bold = tree.iter().find_map(Child::as_node).unwrap();
        let inner: Vec<_> = bold.children().iter().map(|child| child.as_text()).collect();
        assert_eq!(inner, vec![Some("hi "), None, Some("")]);
        assert!(bold.children()[1].as_node().unwrap().children().is_empty());
    }
}
