//! Pure reconciliation: which containers to tear down and which entities to (re)render.

use std::collections::HashSet;

use crate::types::{EdgeKey, NodeKey};

use super::maps::IdentityMaps;

/// Currently selected entities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	pub nodes: HashSet<NodeKey>,
	pub edges: HashSet<EdgeKey>,
}

impl Selection {
	pub fn node(key: impl Into<NodeKey>) -> Self {
		let mut selection = Self::default();
		selection.nodes.insert(key.into());
		selection
	}

	pub fn edge(key: EdgeKey) -> Self {
		let mut selection = Self::default();
		selection.edges.insert(key);
		selection
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

/// A node whose data disappeared, with every edge container hanging off it.
#[derive(Clone, Debug, PartialEq)]
pub struct StaleNode {
	pub key: NodeKey,
	pub edges: Vec<EdgeKey>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
	Added,
	Changed,
}

/// Work for one diff pass, in the order it must be carried out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcilePlan {
	pub stale_edges: Vec<EdgeKey>,
	pub stale_nodes: Vec<StaleNode>,
	pub nodes: Vec<(NodeKey, Change)>,
	pub edges: Vec<(EdgeKey, Change)>,
}

impl ReconcilePlan {
	pub fn is_empty(&self) -> bool {
		self.stale_edges.is_empty() && self.stale_nodes.is_empty() && self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Entities that will be scheduled for rendering.
	pub fn render_count(&self) -> usize {
		self.nodes.len() + self.edges.len()
	}
}

/// Compares two versions of the identity maps. `force` re-renders everything
/// that still exists.
pub fn diff(
	old: &IdentityMaps,
	new: &IdentityMaps,
	old_selection: &Selection,
	new_selection: &Selection,
	force: bool,
) -> ReconcilePlan {
	let mut plan = ReconcilePlan::default();

	// orphans never keep a container, so an edge losing an endpoint is stale too
	plan.stale_edges = old
		.live_edges()
		.map(|(key, _)| key)
		.filter(|key| !new.is_live_edge(key))
		.cloned()
		.collect();

	plan.stale_nodes = old
		.nodes
		.iter()
		.filter(|(key, _)| !new.nodes.contains(key))
		.map(|(key, entry)| StaleNode {
			key: key.clone(),
			edges: entry.incident_edge_keys(),
		})
		.collect();

	let mut moved = HashSet::new();
	for (key, entry) in new.nodes.iter() {
		let selection_flipped = old_selection.nodes.contains(key) != new_selection.nodes.contains(key);
		match old.nodes.get(key) {
			None => {
				plan.nodes.push((key.clone(), Change::Added));
				moved.insert(key.clone());
			}
			Some(previous) if previous.node != entry.node => {
				plan.nodes.push((key.clone(), Change::Changed));
				moved.insert(key.clone());
			}
			Some(_) if force || selection_flipped => plan.nodes.push((key.clone(), Change::Changed)),
			Some(_) => {}
		}
	}

	for (key, entry) in new.live_edges() {
		let selection_flipped = old_selection.edges.contains(key) != new_selection.edges.contains(key);
		let endpoint_moved = moved.contains(&key.source) || moved.contains(&key.target);
		match old.edges.get(key).filter(|_| old.is_live_edge(key)) {
			None => plan.edges.push((key.clone(), Change::Added)),
			Some(previous) if previous.edge != entry.edge || endpoint_moved || force || selection_flipped => {
				plan.edges.push((key.clone(), Change::Changed))
			}
			Some(_) => {}
		}
	}

	plan
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{Edge, Node};

	fn maps(nodes: &[Node], edges: &[Edge]) -> IdentityMaps {
		IdentityMaps::build(nodes, edges, "id")
	}

	#[test]
	fn unchanged_data_yields_empty_plan() {
		let nodes = vec![Node::new("a", "A"), Node::new("b", "B")];
		let edges = vec![Edge::new("a", "b")];
		let m = maps(&nodes, &edges);
		let none = Selection::default();
		assert!(diff(&m, &m.clone(), &none, &none, false).is_empty());
	}

	#[test]
	fn first_pass_adds_everything_in_array_order() {
		let nodes = vec![Node::new("b", "B"), Node::new("a", "A")];
		let edges = vec![Edge::new("a", "b")];
		let none = Selection::default();
		let plan = diff(&IdentityMaps::default(), &maps(&nodes, &edges), &none, &none, false);

		assert_eq!(
			plan.nodes,
			vec![("b".into(), Change::Added), ("a".into(), Change::Added)]
		);
		assert_eq!(plan.edges, vec![(EdgeKey::new("a", "b"), Change::Added)]);
	}

	#[test]
	fn removed_node_carries_its_edges() {
		let nodes = vec![Node::new("a", "A"), Node::new("b", "B"), Node::new("c", "C")];
		let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];
		let before = maps(&nodes, &edges);
		let after = maps(&[Node::new("a", "A"), Node::new("c", "C")], &[]);
		let none = Selection::default();
		let plan = diff(&before, &after, &none, &none, false);

		assert_eq!(plan.stale_edges, vec![EdgeKey::new("a", "b"), EdgeKey::new("b", "c")]);
		assert_eq!(
			plan.stale_nodes,
			vec![StaleNode {
				key: "b".into(),
				edges: vec![EdgeKey::new("a", "b"), EdgeKey::new("b", "c")],
			}]
		);
		assert!(plan.nodes.is_empty());
	}

	#[test]
	fn orphaned_edges_are_torn_down_and_stay_down() {
		let nodes = vec![Node::new("a", "A"), Node::new("b", "B"), Node::new("c", "C")];
		let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];
		let before = maps(&nodes, &edges);
		let after = maps(&[Node::new("a", "A"), Node::new("c", "C")], &edges);
		let none = Selection::default();

		let plan = diff(&before, &after, &none, &none, false);
		assert_eq!(plan.stale_edges, vec![EdgeKey::new("a", "b"), EdgeKey::new("b", "c")]);
		assert!(plan.edges.is_empty());

		let moved = maps(&[Node::new("a", "A").at(5.0, 0.0), Node::new("c", "C")], &edges);
		let plan = diff(&after, &moved, &none, &none, true);
		assert_eq!(plan.nodes.len(), 2);
		assert!(plan.edges.is_empty(), "orphans must not come back: {plan:?}");
		assert!(plan.stale_edges.is_empty());
	}

	#[test]
	fn moving_a_node_rerenders_its_edges() {
		let edges = vec![Edge::new("a", "b"), Edge::new("c", "d")];
		let before = maps(
			&[Node::new("a", "A"), Node::new("b", "B"), Node::new("c", "C"), Node::new("d", "D")],
			&edges,
		);
		let after = maps(
			&[Node::new("a", "A").at(5.0, 0.0), Node::new("b", "B"), Node::new("c", "C"), Node::new("d", "D")],
			&edges,
		);
		let none = Selection::default();
		let plan = diff(&before, &after, &none, &none, false);

		assert_eq!(plan.nodes, vec![("a".into(), Change::Changed)]);
		assert_eq!(plan.edges, vec![(EdgeKey::new("a", "b"), Change::Changed)]);
	}

	#[test]
	fn selection_and_force_schedule_unchanged_entities() {
		let nodes = vec![Node::new("a", "A"), Node::new("b", "B")];
		let edges = vec![Edge::new("a", "b")];
		let m = maps(&nodes, &edges);
		let none = Selection::default();

		let plan = diff(&m, &m, &none, &Selection::node("b"), false);
		assert_eq!(plan.nodes, vec![("b".into(), Change::Changed)]);
		assert!(plan.edges.is_empty());

		let plan = diff(&m, &m, &Selection::edge(EdgeKey::new("a", "b")), &none, false);
		assert_eq!(plan.edges.len(), 1);

		assert_eq!(diff(&m, &m, &none, &none, true).render_count(), 3);
	}
}
