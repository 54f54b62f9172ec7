//! Layout engines: batch position rewrites applied before each diff pass.

use std::collections::HashMap;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::config::{GraphConfig, LayoutEngineType};
use crate::types::{Edge, Node};

pub trait LayoutEngine {
	fn name(&self) -> &'static str;

	/// Returns the nodes with updated positions. Order and identity are preserved.
	fn adjust_nodes(&self, nodes: Vec<Node>, edges: &[Edge], key_field: &str) -> Vec<Node>;
}

/// Leaves positions untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLayout;

impl LayoutEngine for NoLayout {
	fn name(&self) -> &'static str {
		"none"
	}

	fn adjust_nodes(&self, nodes: Vec<Node>, _edges: &[Edge], _key_field: &str) -> Vec<Node> {
		nodes
	}
}

/// Moves every node to the centre of its grid cell.
#[derive(Clone, Copy, Debug)]
pub struct SnapToGrid {
	pub spacing: f64,
}

impl SnapToGrid {
	pub fn snap(&self, v: f64) -> f64 {
		let spacing = if self.spacing > 0.0 { self.spacing } else { 10.0 };
		let offset = spacing / 2.0;
		spacing * ((v - offset) / spacing).round() + offset
	}
}

impl LayoutEngine for SnapToGrid {
	fn name(&self) -> &'static str {
		"snapToGrid"
	}

	fn adjust_nodes(&self, mut nodes: Vec<Node>, _edges: &[Edge], _key_field: &str) -> Vec<Node> {
		for node in &mut nodes {
			node.x = self.snap(node.x);
			node.y = self.snap(node.y);
		}
		nodes
	}
}

/// Relaxes current positions with a force-directed simulation.
#[derive(Clone, Debug)]
pub struct ForceLayout {
	pub iterations: usize,
	pub tick: f32,
}

impl Default for ForceLayout {
	fn default() -> Self {
		Self {
			iterations: 120,
			tick: 0.016,
		}
	}
}

impl LayoutEngine for ForceLayout {
	fn name(&self) -> &'static str {
		"force"
	}

	fn adjust_nodes(&self, mut nodes: Vec<Node>, edges: &[Edge], key_field: &str) -> Vec<Node> {
		if nodes.len() < 2 {
			return nodes;
		}
		let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut key_to_idx = HashMap::new();

		for (i, node) in nodes.iter().enumerate() {
			let idx = graph.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: i,
			});
			if let Some(key) = node.key(key_field) {
				key_to_idx.insert(key, idx);
			}
		}

		for edge in edges {
			let Some(target) = edge.target.as_ref() else {
				continue;
			};
			if let (Some(&src), Some(&tgt)) = (key_to_idx.get(&edge.source), key_to_idx.get(target)) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		for _ in 0..self.iterations {
			graph.update(self.tick);
		}

		graph.visit_nodes(|node| {
			let i = node.data.user_data;
			nodes[i].x = node.x() as f64;
			nodes[i].y = node.y() as f64;
		});
		nodes
	}
}

/// Engine selected by configuration.
pub fn from_config(config: &GraphConfig) -> Box<dyn LayoutEngine> {
	match config.layout_engine_type {
		LayoutEngineType::None => Box::new(NoLayout),
		LayoutEngineType::SnapToGrid => Box::new(SnapToGrid {
			spacing: config.grid_spacing,
		}),
		LayoutEngineType::Force => Box::new(ForceLayout::default()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snaps_to_cell_centres() {
		let grid = SnapToGrid { spacing: 10.0 };
		assert_eq!(grid.snap(14.0), 15.0);
		assert_eq!(grid.snap(21.0), 25.0);
		assert_eq!(grid.snap(-3.0), -5.0);

		let nodes = grid.adjust_nodes(vec![Node::new("a", "A").at(1.0, 9.0)], &[], "id");
		assert_eq!((nodes[0].x, nodes[0].y), (5.0, 5.0));
	}

	#[test]
	fn force_layout_keeps_order_and_moves_nodes() {
		let nodes = vec![
			Node::new("a", "A").at(0.0, 0.0),
			Node::new("b", "B").at(1.0, 0.0),
			Node::new("c", "C").at(0.0, 1.0),
		];
		let edges = vec![Edge::new("a", "b")];
		let out = ForceLayout::default().adjust_nodes(nodes.clone(), &edges, "id");

		assert_eq!(out.len(), 3);
		assert_eq!(out[1].id, nodes[1].id);
		assert!(out.iter().zip(&nodes).any(|(a, b)| a.position() != b.position()));
	}

	#[test]
	fn from_config_selects_engine() {
		let mut config = GraphConfig::default();
		assert_eq!(from_config(&config).name(), "none");
		config.layout_engine_type = LayoutEngineType::SnapToGrid;
		assert_eq!(from_config(&config).name(), "snapToGrid");
	}
}
