//! The scene reconciliation engine: identity maps, frame-batched renders and
//! container lifecycle against a [`SceneRenderer`].

use std::collections::HashMap;

use indexmap::IndexSet;
use log::{debug, trace};

use crate::config::GraphConfig;
use crate::edge_path;
use crate::geometry;
use crate::glyph::{GlyphDef, GlyphRegistry, NodeElement, SceneLookup};
use crate::layout::{self, LayoutEngine};
use crate::types::{Edge, EdgeKey, Node, NodeKey, Point, Size};

use super::diff::{self, ReconcilePlan, Selection};
use super::entity::EntityId;
use super::frames::{FrameQueue, PendingRenders};
use super::maps::IdentityMaps;
use super::renderer::{EdgeVisual, NodeVisual, SceneRenderer, Visual};

/// Data captured when a render is scheduled.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderJob {
	Node(Node),
	Edge(Edge),
	DraggedEdge(Edge),
}

/// The edge following the pointer; `swapping` names the committed edge being re-targeted.
#[derive(Clone, Debug, PartialEq)]
pub struct DraggedEdge {
	pub edge: Edge,
	pub swapping: Option<EdgeKey>,
}

impl DraggedEdge {
	pub fn id(&self) -> EntityId {
		EntityId::DraggedEdge {
			source: self.edge.source.clone(),
			target: self.swapping.as_ref().map(|key| key.target.clone()),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
	pub scheduled: usize,
	pub superseded: usize,
	pub applied: usize,
	/// Renders whose data disappeared before their frame fired.
	pub skipped: usize,
	/// Renders held back while an edge was being dragged.
	pub suppressed: usize,
	pub removed: usize,
}

/// Geometry view over what is currently on screen.
struct LiveScene<'a> {
	glyphs: &'a GlyphRegistry,
	rendered: &'a HashMap<NodeKey, Option<String>>,
}

impl SceneLookup for LiveScene<'_> {
	fn node_element(&self, key: &NodeKey) -> Option<NodeElement> {
		self.rendered.get(key).map(|href| NodeElement { href: href.clone() })
	}

	fn glyph(&self, href: &str) -> Option<&GlyphDef> {
		self.glyphs.get(href)
	}

	fn arrow_size(&self) -> Size {
		self.glyphs.arrow()
	}
}

pub struct SceneEngine<R> {
	config: GraphConfig,
	glyphs: GlyphRegistry,
	layout: Box<dyn LayoutEngine>,
	renderer: R,
	maps: IdentityMaps,
	selection: Selection,
	/// Nodes with a container, and the glyph their primary shape references.
	rendered_nodes: HashMap<NodeKey, Option<String>>,
	frames: FrameQueue,
	pending: PendingRenders<RenderJob>,
	dragging: Option<DraggedEdge>,
	deferred: IndexSet<EntityId>,
	force_full: bool,
	stats: RenderStats,
}

impl<R: SceneRenderer> SceneEngine<R> {
	pub fn new(config: GraphConfig, renderer: R) -> Self {
		let glyphs = config.glyph_registry();
		let layout = layout::from_config(&config);
		Self {
			config,
			glyphs,
			layout,
			renderer,
			maps: IdentityMaps::default(),
			selection: Selection::default(),
			rendered_nodes: HashMap::new(),
			frames: FrameQueue::default(),
			pending: PendingRenders::default(),
			dragging: None,
			deferred: IndexSet::new(),
			force_full: false,
			stats: RenderStats::default(),
		}
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	pub fn glyphs(&self) -> &GlyphRegistry {
		&self.glyphs
	}

	pub fn renderer(&self) -> &R {
		&self.renderer
	}

	pub fn renderer_mut(&mut self) -> &mut R {
		&mut self.renderer
	}

	pub fn maps(&self) -> &IdentityMaps {
		&self.maps
	}

	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn stats(&self) -> RenderStats {
		self.stats
	}

	/// Renders scheduled but not yet run.
	pub fn pending_len(&self) -> usize {
		self.pending.len()
	}

	pub fn node(&self, key: &NodeKey) -> Option<&Node> {
		self.maps.nodes.get(key).map(|entry| &entry.node)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.maps.nodes.iter().map(|(_, entry)| &entry.node)
	}

	pub fn dragged_edge(&self) -> Option<&DraggedEdge> {
		self.dragging.as_ref()
	}

	/// Swaps the layout engine; the next diff pass re-renders everything.
	pub fn set_layout_engine(&mut self, layout: Box<dyn LayoutEngine>) {
		debug!("layout engine {} -> {}", self.layout.name(), layout.name());
		self.layout = layout;
		self.force_full = true;
	}

	/// Forces a full re-render on the next diff pass.
	pub fn invalidate(&mut self) {
		self.force_full = true;
	}

	/// The diff pass. Rebuilds the identity maps, tears down stale containers
	/// and schedules renders for new or changed entities.
	pub fn update(&mut self, nodes: &[Node], edges: &[Edge], selection: &Selection) -> ReconcilePlan {
		let nodes = self.layout.adjust_nodes(nodes.to_vec(), edges, &self.config.node_key);
		let next = IdentityMaps::build(&nodes, edges, &self.config.node_key);
		let plan = diff::diff(&self.maps, &next, &self.selection, selection, self.force_full);
		self.maps = next;
		self.selection = selection.clone();
		self.force_full = false;

		for key in &plan.stale_edges {
			self.remove_edge(key);
		}
		for stale in &plan.stale_nodes {
			for key in &stale.edges {
				self.remove_edge(key);
			}
			self.remove_node(&stale.key);
		}
		for (key, _) in &plan.nodes {
			self.schedule_node(key);
		}
		for (key, _) in &plan.edges {
			self.schedule_edge_key(key);
		}

		debug!(
			"diff pass: -{} edges, -{} nodes, {} nodes and {} edges scheduled",
			plan.stale_edges.len(),
			plan.stale_nodes.len(),
			plan.nodes.len(),
			plan.edges.len()
		);
		plan
	}

	/// Schedules a render of the node's current data for the next frame.
	pub fn schedule_node(&mut self, key: &NodeKey) -> bool {
		let Some(node) = self.node(key).cloned() else {
			return false;
		};
		self.schedule(EntityId::Node(key.clone()), RenderJob::Node(node));
		true
	}

	/// Schedules a render of `edge` as given. Earlier requests for the same
	/// edge that have not fired yet are dropped.
	pub fn schedule_edge(&mut self, edge: Edge) -> bool {
		let Some(key) = edge.key() else {
			return false;
		};
		self.schedule(EntityId::Edge(key), RenderJob::Edge(edge));
		true
	}

	fn schedule_edge_key(&mut self, key: &EdgeKey) -> bool {
		match self.maps.edges.get(key).map(|entry| entry.edge.clone()) {
			Some(edge) => self.schedule_edge(edge),
			None => false,
		}
	}

	fn schedule(&mut self, id: EntityId, job: RenderJob) {
		if self.dragging.as_ref().is_some_and(|dragged| dragged.id() != id) {
			trace!("{id}: deferred until the edge drag ends");
			self.deferred.insert(id);
			self.stats.suppressed += 1;
			return;
		}
		if self.pending.schedule(&mut self.frames, id, job) {
			self.stats.superseded += 1;
		}
		self.stats.scheduled += 1;
	}

	/// Runs every render due this frame. Returns how many were applied.
	pub fn flush_frame(&mut self) -> usize {
		let mut applied = 0;
		for (handle, id) in self.frames.take_due() {
			let Some(job) = self.pending.take(&id, handle) else {
				continue;
			};
			if self.apply(&id, job) {
				applied += 1;
			}
		}
		applied
	}

	/// Renders a node immediately instead of waiting for a frame.
	pub fn render_node(&mut self, key: &NodeKey) -> bool {
		let Some(node) = self.node(key).cloned() else {
			return false;
		};
		let id = EntityId::Node(key.clone());
		self.pending.cancel(&mut self.frames, &id);
		self.apply(&id, RenderJob::Node(node))
	}

	/// Renders an edge immediately instead of waiting for a frame.
	pub fn render_edge(&mut self, edge: &Edge) -> bool {
		let Some(key) = edge.key() else {
			return false;
		};
		let id = EntityId::Edge(key);
		self.pending.cancel(&mut self.frames, &id);
		self.apply(&id, RenderJob::Edge(edge.clone()))
	}

	fn apply(&mut self, id: &EntityId, job: RenderJob) -> bool {
		let visual = match (id, job) {
			(EntityId::Node(key), RenderJob::Node(node)) if self.maps.nodes.contains(key) => {
				let href = self.config.node_href(node.node_type.as_deref());
				self.rendered_nodes.insert(key.clone(), href.clone());
				Visual::Node(self.node_visual(id, key, &node, href))
			}
			(EntityId::Edge(key), RenderJob::Edge(edge)) if self.maps.is_live_edge(key) => {
				Visual::Edge(self.edge_visual(id, &edge, false))
			}
			(EntityId::DraggedEdge { .. }, RenderJob::DraggedEdge(edge)) if self.dragging.is_some() => {
				Visual::Edge(self.edge_visual(id, &edge, true))
			}
			_ => {
				trace!("{id}: no data counterpart, skipping render");
				self.stats.skipped += 1;
				return false;
			}
		};

		let container_id = id.container_id();
		if self.renderer.contains(&container_id) {
			self.renderer.replace(&container_id, &visual);
		} else {
			self.renderer.append(&container_id, &visual);
		}
		self.stats.applied += 1;
		true
	}

	fn node_visual(&self, id: &EntityId, key: &NodeKey, node: &Node, href: Option<String>) -> NodeVisual {
		NodeVisual {
			element_id: id.element_id(),
			transform: geometry::translate(node.position()),
			shape_href: href,
			subtype_href: self.config.subtype_href(node.subtype.as_deref()),
			title: node.title.clone(),
			size: self.config.node_size,
			selected: self.selection.nodes.contains(key),
		}
	}

	fn edge_visual(&self, id: &EntityId, edge: &Edge, dragging: bool) -> EdgeVisual {
		let source = self.node(&edge.source);
		let target = edge.target.as_ref().and_then(|key| self.node(key));
		let (source, target) = edge_path::endpoints(edge, source, target, &self.config.node_key);
		let scene = LiveScene {
			glyphs: &self.glyphs,
			rendered: &self.rendered_nodes,
		};
		let geometry = edge_path::edge_geometry(source.as_ref(), target.as_ref(), &self.config.edge_options(), &scene);

		EdgeVisual {
			element_id: id.element_id(),
			path: geometry.path,
			handle_transform: geometry.handle_transform,
			handle_href: self.config.edge_href(edge.edge_type.as_deref()),
			handle_text: edge.handle_text.clone(),
			text_rotated: geometry.rotation.rotated,
			handle_size: self.config.edge_handle_size,
			selected: edge.key().is_some_and(|key| self.selection.edges.contains(&key)),
			dragging,
		}
	}

	fn remove_edge(&mut self, key: &EdgeKey) {
		let id = EntityId::Edge(key.clone());
		self.pending.cancel(&mut self.frames, &id);
		self.deferred.shift_remove(&id);
		if self.renderer.remove(&id.container_id()) {
			self.stats.removed += 1;
		}
	}

	fn remove_node(&mut self, key: &NodeKey) {
		let id = EntityId::Node(key.clone());
		self.pending.cancel(&mut self.frames, &id);
		self.deferred.shift_remove(&id);
		self.rendered_nodes.remove(key);
		if self.renderer.remove(&id.container_id()) {
			self.stats.removed += 1;
		}
	}

	/// Moves a node in place and schedules it together with every edge touching it.
	/// The caller is expected to commit the position into its own array.
	pub fn move_node(&mut self, key: &NodeKey, position: Point) -> bool {
		let Some(entry) = self.maps.nodes.get_mut(key) else {
			return false;
		};
		entry.node.x = position.x;
		entry.node.y = position.y;
		let node = entry.node.clone();
		let edges = entry.incident_edge_keys();

		self.schedule(EntityId::Node(key.clone()), RenderJob::Node(node));
		for edge in &edges {
			self.schedule_edge_key(edge);
		}
		true
	}

	/// Starts drawing a new edge out of `source`.
	pub fn begin_edge_drag(&mut self, source: &NodeKey, position: Point) -> bool {
		if self.dragging.is_some() || !self.maps.nodes.contains(source) {
			return false;
		}
		self.start_drag(DraggedEdge {
			edge: Edge::floating(source.clone(), position),
			swapping: None,
		});
		true
	}

	/// Starts re-targeting an existing edge.
	pub fn begin_edge_swap(&mut self, key: &EdgeKey, position: Point) -> bool {
		if self.dragging.is_some() {
			return false;
		}
		let Some(mut edge) = self.maps.edges.get(key).map(|entry| entry.edge.clone()) else {
			return false;
		};
		edge.target = None;
		edge.target_position = Some(position);
		self.start_drag(DraggedEdge {
			edge,
			swapping: Some(key.clone()),
		});
		true
	}

	fn start_drag(&mut self, dragged: DraggedEdge) {
		let id = dragged.id();
		let job = RenderJob::DraggedEdge(dragged.edge.clone());
		self.dragging = Some(dragged);
		self.schedule(id, job);
	}

	pub fn drag_edge_to(&mut self, position: Point) -> bool {
		let Some(dragged) = self.dragging.as_mut() else {
			return false;
		};
		dragged.edge.target_position = Some(position);
		let (id, job) = (dragged.id(), RenderJob::DraggedEdge(dragged.edge.clone()));
		self.schedule(id, job);
		true
	}

	/// Tears down the dragged edge and replays renders held back during the drag.
	/// Committing the result into the caller's edges is up to the caller.
	pub fn end_edge_drag(&mut self) -> Option<DraggedEdge> {
		let dragged = self.dragging.take()?;
		let id = dragged.id();
		self.pending.cancel(&mut self.frames, &id);
		self.renderer.remove(&id.container_id());

		for id in std::mem::take(&mut self.deferred) {
			match &id {
				EntityId::Node(key) => {
					self.schedule_node(key);
				}
				EntityId::Edge(key) => {
					self.schedule_edge_key(key);
				}
				EntityId::DraggedEdge { .. } => {}
			}
		}
		Some(dragged)
	}
}
