use std::fmt;

use crate::types::{EdgeKey, NodeKey};

/// Typed identity of anything the scene renders.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityId {
	Node(NodeKey),
	Edge(EdgeKey),
	/// The edge currently following the pointer. `target` is set when an
	/// existing edge is being re-targeted.
	DraggedEdge {
		source: NodeKey,
		target: Option<NodeKey>,
	},
}

impl EntityId {
	pub fn element_id(&self) -> String {
		match self {
			EntityId::Node(key) => format!("node-{key}"),
			EntityId::Edge(key) => format!("edge-{}-{}", key.source, key.target),
			EntityId::DraggedEdge {
				source,
				target: Some(target),
			} => format!("edge-{source}-{target}"),
			EntityId::DraggedEdge { source, target: None } => format!("edge-{source}"),
		}
	}

	/// Id of the container element the renderer keys on.
	pub fn container_id(&self) -> String {
		match self {
			EntityId::DraggedEdge { .. } => format!("{}-custom-container", self.element_id()),
			_ => format!("{}-container", self.element_id()),
		}
	}
}

/// The pending-render key, e.g. `nodes-a` or `edges-a-b`.
impl fmt::Display for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntityId::Node(key) => write!(f, "nodes-{key}"),
			EntityId::Edge(key) => write!(f, "edges-{}-{}", key.source, key.target),
			EntityId::DraggedEdge { .. } => write!(f, "edges-{}-custom", self.element_id().trim_start_matches("edge-")),
		}
	}
}
