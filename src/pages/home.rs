use leptos::prelude::*;
use serde_json::json;

use crate::components::graph_view::GraphView;
use crate::config::{GraphConfig, TypeConfig};
use crate::error::Result;
use crate::glyph::{GlyphDef, GlyphPrimitive};
use crate::transformers::{BwdlTransformer, Transformer};
use crate::types::GraphInput;

/// A small order-processing workflow used as demo data.
fn sample_workflow() -> Result<GraphInput> {
	let doc = json!({
		"StartAt": "Receive",
		"States": {
			"Receive": { "Type": "Task", "Next": "Validate", "x": 120, "y": 120 },
			"Validate": {
				"Type": "Choice",
				"Choices": [{ "Next": "Charge" }, { "Next": "Reject" }],
				"Default": "Reject",
				"x": 420, "y": 120
			},
			"Charge": { "Type": "Task", "Next": "Ship", "x": 720, "y": 40 },
			"Reject": { "Type": "Fail", "x": 720, "y": 280 },
			"Ship": { "Type": "Succeed", "x": 1020, "y": 40 }
		}
	});
	BwdlTransformer.transform(&doc)
}

fn demo_config() -> GraphConfig {
	let mut config = GraphConfig::default();
	config.node_size = 120.0;
	for (name, shape) in [("Task", "#task"), ("Fail", "#terminal"), ("Succeed", "#terminal")] {
		config.node_types.insert(name.into(), TypeConfig::new(name, shape));
	}
	config.node_types.insert("Choice".into(), TypeConfig::new("Choice", "#choice"));
	config.glyphs = vec![
		GlyphDef::new("task")
			.with_size(120.0, 120.0)
			.with_primitive(GlyphPrimitive::rect(120.0, 60.0).with_transform("translate(0, 30)")),
		GlyphDef::new("choice")
			.with_size(120.0, 120.0)
			.with_primitive(GlyphPrimitive::path("M60,10L110,60L60,110L10,60Z")),
		GlyphDef::new("terminal")
			.with_size(120.0, 120.0)
			.with_primitive(GlyphPrimitive::circle(45.0)),
	];
	config
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph = sample_workflow().unwrap_or_else(|err| {
		log::warn!("demo workflow rejected: {err}");
		GraphInput::default()
	});
	let nodes = RwSignal::new(graph.nodes);
	let edges = RwSignal::new(graph.edges);

	view! {
		<div class="fullscreen-graph">
			<GraphView nodes=nodes edges=edges config=demo_config() />
			<div class="graph-overlay">
				<h1>"Workflow Graph"</h1>
				<p class="subtitle">"Drag nodes to reposition. Shift-drag from a node to draw an edge."</p>
			</div>
		</div>
	}
}
