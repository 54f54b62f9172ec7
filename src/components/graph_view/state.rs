use crate::config::GraphConfig;
use crate::scene::{SceneEngine, Selection};
use crate::types::{Edge, Node, NodeKey, Point};

use super::render::SvgRenderer;

#[derive(Clone, Debug, Default)]
pub struct NodeDrag {
	pub active: bool,
	pub key: Option<NodeKey>,
	pub start: Point,
	pub node_start: Point,
}

#[derive(Clone, Debug, Default)]
pub struct EdgeDraw {
	pub active: bool,
	pub source: Option<NodeKey>,
}

/// Position a drag stopped at, to be committed into the caller's nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct MovedNode {
	pub key: NodeKey,
	pub position: Point,
}

pub struct DiagramState {
	pub engine: SceneEngine<SvgRenderer>,
	pub drag: NodeDrag,
	pub draw: EdgeDraw,
	pub selection: Selection,
}

impl DiagramState {
	pub fn new(config: GraphConfig, renderer: SvgRenderer) -> Self {
		Self {
			engine: SceneEngine::new(config, renderer),
			drag: NodeDrag::default(),
			draw: EdgeDraw::default(),
			selection: Selection::default(),
		}
	}

	pub fn update(&mut self, nodes: &[Node], edges: &[Edge]) {
		let selection = self.selection.clone();
		self.engine.update(nodes, edges, &selection);
	}

	/// Topmost node whose square footprint contains `p`.
	pub fn node_at_position(&self, p: Point) -> Option<NodeKey> {
		let half = self.engine.config().node_size / 2.0;
		let key_field = self.engine.config().node_key.clone();
		let mut found = None;
		for node in self.engine.nodes() {
			let d = Point::new(node.x - p.x, node.y - p.y);
			if d.x.abs() <= half && d.y.abs() <= half {
				found = node.key(&key_field);
			}
		}
		found
	}

	pub fn begin_node_drag(&mut self, key: NodeKey, p: Point) {
		let node_start = self.engine.node(&key).map_or(p, Node::position);
		self.selection = Selection::node(key.clone());
		self.drag = NodeDrag {
			active: true,
			key: Some(key),
			start: p,
			node_start,
		};
	}

	pub fn drag_node_to(&mut self, p: Point) {
		let Some(key) = self.drag.key.clone().filter(|_| self.drag.active) else {
			return;
		};
		let position = Point::new(
			self.drag.node_start.x + (p.x - self.drag.start.x),
			self.drag.node_start.y + (p.y - self.drag.start.y),
		);
		self.engine.move_node(&key, position);
	}

	pub fn end_node_drag(&mut self) -> Option<MovedNode> {
		let drag = std::mem::take(&mut self.drag);
		let key = drag.key.filter(|_| drag.active)?;
		let position = self.engine.node(&key)?.position();
		(position != drag.node_start).then_some(MovedNode { key, position })
	}

	pub fn begin_edge_draw(&mut self, source: NodeKey, p: Point) {
		if self.engine.begin_edge_drag(&source, p) {
			self.draw = EdgeDraw {
				active: true,
				source: Some(source),
			};
		}
	}

	pub fn draw_edge_to(&mut self, p: Point) {
		if self.draw.active {
			self.engine.drag_edge_to(p);
		}
	}

	/// Ends the drawing gesture. Returns the edge to commit when it was
	/// released over another node; `None` for `release` cancels.
	pub fn end_edge_draw(&mut self, release: Option<Point>) -> Option<Edge> {
		let draw = std::mem::take(&mut self.draw);
		if !draw.active {
			return None;
		}
		self.engine.end_edge_drag();
		let source = draw.source?;
		let target = release.and_then(|p| self.node_at_position(p)).filter(|target| *target != source)?;
		let edge = Edge::new(source, target);
		let exists = edge.key().is_some_and(|key| self.engine.maps().edges.contains_key(&key));
		(!exists).then_some(edge)
	}
}
