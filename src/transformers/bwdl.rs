//! Workflow documents of the form `{ "StartAt": .., "States": { name: state } }`.

use indexmap::{IndexMap, IndexSet};
use log::warn;
use serde_json::{Map, Value, json};

use super::Transformer;
use crate::error::{Error, Result};
use crate::types::{Edge, EdgeKey, GraphInput, Node, NodeKey};

const CHOICE: &str = "Choice";

/// One node per state; edges follow `Next`, or `Choices[].Next` and `Default`
/// for choice states.
#[derive(Clone, Copy, Debug, Default)]
pub struct BwdlTransformer;

impl BwdlTransformer {
	fn successors(state: &Map<String, Value>) -> Vec<&str> {
		let is_choice = state.get("Type").and_then(Value::as_str) == Some(CHOICE);
		let mut out = Vec::new();
		if is_choice {
			let choices = state.get("Choices").and_then(Value::as_array);
			out.extend(
				choices
					.into_iter()
					.flatten()
					.filter_map(|choice| choice.get("Next").and_then(Value::as_str)),
			);
			out.extend(state.get("Default").and_then(Value::as_str));
		} else {
			out.extend(state.get("Next").and_then(Value::as_str));
		}
		out
	}
}

impl Transformer for BwdlTransformer {
	fn transform(&self, input: &Value) -> Result<GraphInput> {
		let doc = input
			.as_object()
			.ok_or_else(|| Error::InvalidWorkflow("document is not an object".into()))?;
		let Some(states) = doc.get("States") else {
			return Ok(GraphInput::default());
		};
		let states = states
			.as_object()
			.ok_or_else(|| Error::InvalidWorkflow("States is not an object".into()))?;

		let mut nodes = Vec::with_capacity(states.len());
		for (name, state) in states {
			let state = state
				.as_object()
				.ok_or_else(|| Error::InvalidWorkflow(format!("state {name:?} is not an object")))?;
			let coord = |axis: &str| state.get(axis).and_then(Value::as_f64).unwrap_or(0.0);
			let mut node = Node::new(name.as_str(), name.as_str()).at(coord("x"), coord("y"));
			node.node_type = state.get("Type").and_then(Value::as_str).map(str::to_owned);
			nodes.push(node);
		}

		let mut seen = IndexSet::new();
		let mut edges = Vec::new();
		for (name, state) in states {
			let Some(state) = state.as_object() else {
				continue;
			};
			for next in Self::successors(state) {
				if !states.contains_key(next) {
					warn!("state {name:?} points at unknown state {next:?}");
					continue;
				}
				if seen.insert(EdgeKey::new(name.as_str(), next)) {
					edges.push(Edge::new(name.as_str(), next));
				}
			}
		}

		Ok(GraphInput { nodes, edges })
	}

	fn revert(&self, graph: &GraphInput) -> Result<Value> {
		let mut outgoing: IndexMap<&NodeKey, Vec<String>> = IndexMap::new();
		let mut has_incoming = IndexSet::new();
		for edge in &graph.edges {
			let Some(target) = &edge.target else {
				continue;
			};
			outgoing.entry(&edge.source).or_default().push(target.to_string());
			has_incoming.insert(target.to_string());
		}

		let mut states = Map::new();
		let mut start_at = None;
		for node in &graph.nodes {
			let Some(key) = &node.id else {
				warn!("node {:?} has no id, dropped from workflow", node.title);
				continue;
			};
			let name = key.to_string();
			if start_at.is_none() && !has_incoming.contains(&name) {
				start_at = Some(name.clone());
			}

			let node_type = node.node_type.as_deref().unwrap_or("Task");
			let mut state = Map::new();
			state.insert("Type".into(), json!(node_type));
			state.insert("x".into(), json!(node.x));
			state.insert("y".into(), json!(node.y));

			let targets = outgoing.get(key).map(Vec::as_slice).unwrap_or_default();
			if node_type == CHOICE {
				let choices: Vec<Value> = targets.iter().map(|next| json!({ "Next": next })).collect();
				state.insert("Choices".into(), Value::Array(choices));
			} else if let Some((next, rest)) = targets.split_first() {
				if !rest.is_empty() {
					warn!("state {name:?} has {} successors, keeping {next:?}", targets.len());
				}
				state.insert("Next".into(), json!(next));
			} else {
				state.insert("End".into(), json!(true));
			}
			states.insert(name, Value::Object(state));
		}

		let start_at = start_at.or_else(|| states.keys().next().cloned());
		Ok(json!({ "StartAt": start_at, "States": states }))
	}
}
