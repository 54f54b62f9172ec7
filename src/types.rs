//! Graph data model shared by the geometry, reconciliation and shell layers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Plain 2D coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Linear interpolation towards `other`, `t = 0` is `self`.
	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point {
			x: self.x + (other.x - self.x) * t,
			y: self.y + (other.y - self.y) * t,
		}
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point {
			x: (self.x + other.x) / 2.0,
			y: (self.y + other.y) / 2.0,
		}
	}

	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

/// Width/height pair, used for glyph bounds and the arrowhead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub const fn square(side: f64) -> Self {
		Self {
			width: side,
			height: side,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.width <= 0.0 || self.height <= 0.0
	}
}

/// Caller-chosen node identity: a string or an integer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
	Int(i64),
	Str(String),
}

impl NodeKey {
	/// Reads a key out of an arbitrary JSON value. Floats and non-scalars are rejected.
	pub fn from_value(value: &Value) -> Option<NodeKey> {
		match value {
			Value::String(s) => Some(NodeKey::Str(s.clone())),
			Value::Number(n) => n.as_i64().map(NodeKey::Int),
			_ => None,
		}
	}
}

fn lenient_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NodeKey>, D::Error> {
	let value = Value::deserialize(deserializer)?;
	Ok(NodeKey::from_value(&value))
}

impl fmt::Display for NodeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeKey::Int(i) => write!(f, "{i}"),
			NodeKey::Str(s) => f.write_str(s),
		}
	}
}

impl From<&str> for NodeKey {
	fn from(value: &str) -> Self {
		NodeKey::Str(value.to_owned())
	}
}

impl From<String> for NodeKey {
	fn from(value: String) -> Self {
		NodeKey::Str(value)
	}
}

impl From<i64> for NodeKey {
	fn from(value: i64) -> Self {
		NodeKey::Int(value)
	}
}

/// A caller-owned node. Only `x`, `y`, `type`, `subtype` and the key field are read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Unusable ids (floats, objects) read as `None` so the node is skipped, not rejected.
	#[serde(default, deserialize_with = "lenient_key", skip_serializing_if = "Option::is_none")]
	pub id: Option<NodeKey>,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub x: f64,
	#[serde(default)]
	pub y: f64,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub node_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtype: Option<String>,
	/// Everything else the caller attached, including custom key fields.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Node {
	pub fn new(id: impl Into<NodeKey>, title: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			title: title.into(),
			..Default::default()
		}
	}

	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = x;
		self.y = y;
		self
	}

	pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
		self.node_type = Some(node_type.into());
		self
	}

	/// Resolves the node's identity through the configured key field.
	pub fn key(&self, key_field: &str) -> Option<NodeKey> {
		if key_field == "id" {
			return self.id.clone();
		}
		self.extra.get(key_field).and_then(NodeKey::from_value)
	}

	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

/// Identity of a committed edge: the ordered `(source, target)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	pub source: NodeKey,
	pub target: NodeKey,
}

impl EdgeKey {
	pub fn new(source: impl Into<NodeKey>, target: impl Into<NodeKey>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

impl fmt::Display for EdgeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}_{}", self.source, self.target)
	}
}

/// A caller-owned edge. Committed edges carry `target`; an edge being drawn
/// carries `target_position` instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	pub source: NodeKey,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target: Option<NodeKey>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_position: Option<Point>,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub edge_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub handle_text: Option<String>,
}

impl Edge {
	pub fn new(source: impl Into<NodeKey>, target: impl Into<NodeKey>) -> Self {
		Self {
			source: source.into(),
			target: Some(target.into()),
			target_position: None,
			edge_type: None,
			handle_text: None,
		}
	}

	/// An uncommitted edge following the pointer.
	pub fn floating(source: impl Into<NodeKey>, position: Point) -> Self {
		Self {
			source: source.into(),
			target: None,
			target_position: Some(position),
			edge_type: None,
			handle_text: None,
		}
	}

	pub fn key(&self) -> Option<EdgeKey> {
		self.target.as_ref().map(|target| EdgeKey {
			source: self.source.clone(),
			target: target.clone(),
		})
	}
}

/// The node/edge arrays the widget consumes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn key_uses_configured_field() {
		let node: Node = serde_json::from_value(json!({
			"id": "a",
			"name": 7,
			"title": "A",
			"x": 1.5
		}))
		.unwrap();

		assert_eq!(node.key("id"), Some(NodeKey::from("a")));
		assert_eq!(node.key("name"), Some(NodeKey::Int(7)));
		assert_eq!(node.key("missing"), None);
		assert_eq!(node.position(), Point::new(1.5, 0.0));
	}

	#[test]
	fn float_id_leaves_node_without_key() {
		let nodes: Vec<Node> = serde_json::from_value(json!([
			{ "id": 1.5, "title": "float" },
			{ "id": 2, "title": "int" }
		]))
		.unwrap();

		assert_eq!(nodes[0].id, None);
		assert_eq!(nodes[0].title, "float");
		assert_eq!(nodes[1].key("id"), Some(NodeKey::Int(2)));
	}

	#[test]
	fn floating_edge_has_no_key() {
		let edge = Edge::floating("a", Point::new(3.0, 4.0));
		assert!(edge.key().is_none());
		assert_eq!(Edge::new("a", "b").key().unwrap().to_string(), "a_b");
	}
}
