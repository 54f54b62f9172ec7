//! Identity maps rebuilt on every data change.

use indexmap::IndexMap;
use log::warn;

use crate::types::{Edge, EdgeKey, Node, NodeKey};

/// A node plus its resolved neighbourhood. `parents`/`children` index into the owning [`NodeMap`].
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMapEntry {
	pub node: Node,
	pub original_arr_index: usize,
	pub incoming_edges: Vec<Edge>,
	pub outgoing_edges: Vec<Edge>,
	pub parents: Vec<usize>,
	pub children: Vec<usize>,
}

impl NodeMapEntry {
	fn new(node: Node, original_arr_index: usize) -> Self {
		Self {
			node,
			original_arr_index,
			incoming_edges: Vec::new(),
			outgoing_edges: Vec::new(),
			parents: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Keys of every committed edge touching this node, each once.
	pub fn incident_edge_keys(&self) -> Vec<EdgeKey> {
		let mut keys: Vec<EdgeKey> = Vec::new();
		for edge in self.incoming_edges.iter().chain(&self.outgoing_edges) {
			if let Some(key) = edge.key() {
				if !keys.contains(&key) {
					keys.push(key);
				}
			}
		}
		keys
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeMap {
	entries: IndexMap<NodeKey, NodeMapEntry>,
}

impl NodeMap {
	pub fn get(&self, key: &NodeKey) -> Option<&NodeMapEntry> {
		self.entries.get(key)
	}

	pub fn get_mut(&mut self, key: &NodeKey) -> Option<&mut NodeMapEntry> {
		self.entries.get_mut(key)
	}

	pub fn contains(&self, key: &NodeKey) -> bool {
		self.entries.contains_key(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&NodeKey, &NodeMapEntry)> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn parents(&self, key: &NodeKey) -> impl Iterator<Item = &NodeMapEntry> {
		self.related(key, |entry| &entry.parents)
	}

	pub fn children(&self, key: &NodeKey) -> impl Iterator<Item = &NodeMapEntry> {
		self.related(key, |entry| &entry.children)
	}

	fn related<'a>(
		&'a self,
		key: &NodeKey,
		pick: fn(&NodeMapEntry) -> &Vec<usize>,
	) -> impl Iterator<Item = &'a NodeMapEntry> + 'a {
		let indices = self.entries.get(key).map(pick).cloned().unwrap_or_default();
		indices
			.into_iter()
			.filter_map(move |i| self.entries.get_index(i).map(|(_, entry)| entry))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMapEntry {
	pub edge: Edge,
	pub original_arr_index: usize,
}

/// Both identity maps for one version of the caller's arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdentityMaps {
	pub nodes: NodeMap,
	pub edges: IndexMap<EdgeKey, EdgeMapEntry>,
	/// Committed edges with an endpoint missing from `nodes`.
	pub orphans: Vec<EdgeKey>,
}

impl IdentityMaps {
	/// Committed edge whose endpoints both resolve. Only these get a container.
	pub fn is_live_edge(&self, key: &EdgeKey) -> bool {
		self.edges.contains_key(key) && !self.orphans.contains(key)
	}

	pub fn live_edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeMapEntry)> {
		self.edges.iter().filter(|(key, _)| !self.orphans.contains(key))
	}

	/// Nodes without a resolvable key and edges without a target are left out.
	pub fn build(nodes: &[Node], edges: &[Edge], key_field: &str) -> Self {
		let mut node_map = NodeMap::default();
		for (i, node) in nodes.iter().enumerate() {
			let Some(key) = node.key(key_field) else {
				warn!("node at index {i} has no {key_field:?} field, skipping");
				continue;
			};
			if node_map.entries.insert(key.clone(), NodeMapEntry::new(node.clone(), i)).is_some() {
				warn!("duplicate node key {key}, keeping the last occurrence");
			}
		}

		let mut edge_map = IndexMap::new();
		let mut orphans = Vec::new();
		for (i, edge) in edges.iter().enumerate() {
			let Some(key) = edge.key() else {
				continue;
			};
			edge_map.insert(
				key.clone(),
				EdgeMapEntry {
					edge: edge.clone(),
					original_arr_index: i,
				},
			);

			let (Some(src), Some(trg)) = (
				node_map.entries.get_index_of(&key.source),
				node_map.entries.get_index_of(&key.target),
			) else {
				warn!("orphaned edge {key}: endpoint not present in nodes");
				orphans.push(key);
				continue;
			};
			node_map.entries[src].outgoing_edges.push(edge.clone());
			node_map.entries[src].children.push(trg);
			node_map.entries[trg].incoming_edges.push(edge.clone());
			node_map.entries[trg].parents.push(src);
		}

		Self {
			nodes: node_map,
			edges: edge_map,
			orphans,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn links_parents_and_children() {
		let nodes = vec![Node::new("a", "A"), Node::new("b", "B"), Node::new("c", "C")];
		let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];
		let maps = IdentityMaps::build(&nodes, &edges, "id");

		let b = maps.nodes.get(&"b".into()).unwrap();
		assert_eq!(b.original_arr_index, 1);
		assert_eq!(b.incoming_edges, vec![Edge::new("a", "b")]);
		assert_eq!(b.outgoing_edges, vec![Edge::new("b", "c")]);
		assert_eq!(
			maps.nodes.parents(&"b".into()).map(|e| e.node.title.as_str()).collect::<Vec<_>>(),
			vec!["A"]
		);
		assert_eq!(
			maps.nodes.children(&"b".into()).map(|e| e.node.title.as_str()).collect::<Vec<_>>(),
			vec!["C"]
		);
		assert_eq!(b.incident_edge_keys(), vec![EdgeKey::new("a", "b"), EdgeKey::new("b", "c")]);
	}

	#[test]
	fn orphans_stay_in_edge_map_only() {
		let nodes = vec![Node::new("a", "A")];
		let edges = vec![Edge::new("a", "ghost"), Edge::floating("a", Default::default())];
		let maps = IdentityMaps::build(&nodes, &edges, "id");

		assert_eq!(maps.orphans, vec![EdgeKey::new("a", "ghost")]);
		assert_eq!(maps.edges.len(), 1);
		assert!(!maps.is_live_edge(&EdgeKey::new("a", "ghost")));
		assert_eq!(maps.live_edges().count(), 0);
		let a = maps.nodes.get(&"a".into()).unwrap();
		assert!(a.outgoing_edges.is_empty());
		assert!(a.children.is_empty());
	}

	#[test]
	fn self_loop_is_listed_once_per_direction() {
		let nodes = vec![Node::new("a", "A")];
		let edges = vec![Edge::new("a", "a")];
		let maps = IdentityMaps::build(&nodes, &edges, "id");

		let a = maps.nodes.get(&"a".into()).unwrap();
		assert_eq!(a.incoming_edges.len(), 1);
		assert_eq!(a.outgoing_edges.len(), 1);
		assert_eq!(a.incident_edge_keys().len(), 1);
	}
}
