//! The retained scene the engine writes into.

use indexmap::IndexMap;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub element_id: String,
	/// `translate(x, y)` of the node centre.
	pub transform: String,
	pub shape_href: Option<String>,
	pub subtype_href: Option<String>,
	pub title: String,
	pub size: f64,
	pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
	pub element_id: String,
	pub path: String,
	pub handle_transform: String,
	pub handle_href: Option<String>,
	pub handle_text: Option<String>,
	/// Handle text was flipped to stay upright.
	pub text_rotated: bool,
	pub handle_size: f64,
	pub selected: bool,
	pub dragging: bool,
}

/// Contents of one container.
#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
	Node(NodeVisual),
	Edge(EdgeVisual),
}

/// Imperative side of reconciliation. Implementations must tolerate ids they
/// do not know about.
pub trait SceneRenderer {
	fn contains(&self, container_id: &str) -> bool;

	/// Creates the container and appends it to the entities root.
	fn append(&mut self, container_id: &str, visual: &Visual);

	/// Replaces the contents of an existing container in place.
	fn replace(&mut self, container_id: &str, visual: &Visual);

	/// `false` when there was nothing to remove.
	fn remove(&mut self, container_id: &str) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOp {
	Append(String),
	Replace(String),
	Remove(String),
}

/// Headless renderer keeping containers in memory and logging every write.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
	containers: IndexMap<String, Visual>,
	ops: Vec<RenderOp>,
}

impl MemoryRenderer {
	pub fn visual(&self, container_id: &str) -> Option<&Visual> {
		self.containers.get(container_id)
	}

	pub fn container_ids(&self) -> impl Iterator<Item = &str> {
		self.containers.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.containers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.containers.is_empty()
	}

	pub fn ops(&self) -> &[RenderOp] {
		&self.ops
	}

	pub fn take_ops(&mut self) -> Vec<RenderOp> {
		std::mem::take(&mut self.ops)
	}
}

impl SceneRenderer for MemoryRenderer {
	fn contains(&self, container_id: &str) -> bool {
		self.containers.contains_key(container_id)
	}

	fn append(&mut self, container_id: &str, visual: &Visual) {
		self.containers.insert(container_id.to_owned(), visual.clone());
		self.ops.push(RenderOp::Append(container_id.to_owned()));
	}

	fn replace(&mut self, container_id: &str, visual: &Visual) {
		self.containers.insert(container_id.to_owned(), visual.clone());
		self.ops.push(RenderOp::Replace(container_id.to_owned()));
	}

	fn remove(&mut self, container_id: &str) -> bool {
		let removed = self.containers.shift_remove(container_id).is_some();
		if removed {
			self.ops.push(RenderOp::Remove(container_id.to_owned()));
		}
		removed
	}
}
