use digraph_canvas::config::{GraphConfig, TypeConfig};
use digraph_canvas::glyph::{GlyphDef, GlyphPrimitive};
use digraph_canvas::scene::{
	Change, EntityId, MemoryRenderer, RenderOp, SceneEngine, SceneRenderer, Selection, Visual,
};
use digraph_canvas::types::{Edge, EdgeKey, Node, NodeKey, Point};

fn boxed_config() -> GraphConfig {
	let mut config = GraphConfig::default();
	config.edge_arrow_size = 10.0;
	config.empty_node_type = "box".into();
	config.node_types.insert("box".into(), TypeConfig::new("Box", "#box"));
	config.glyphs = vec![GlyphDef::new("box").with_primitive(GlyphPrimitive::rect(20.0, 20.0))];
	config
}

fn engine() -> SceneEngine<MemoryRenderer> {
	SceneEngine::new(boxed_config(), MemoryRenderer::default())
}

fn pair() -> (Vec<Node>, Vec<Edge>) {
	let nodes = vec![Node::new("a", "A").at(0.0, 0.0), Node::new("b", "B").at(100.0, 0.0)];
	(nodes, vec![Edge::new("a", "b")])
}

fn edge_path(engine: &SceneEngine<MemoryRenderer>, container_id: &str) -> Option<String> {
	match engine.renderer().visual(container_id) {
		Some(Visual::Edge(edge)) => Some(edge.path.clone()),
		_ => None,
	}
}

#[test]
fn first_pass_renders_everything_and_routes_edges() {
	let mut engine = engine();
	let (nodes, edges) = pair();
	let plan = engine.update(&nodes, &edges, &Selection::default());

	assert_eq!(plan.render_count(), 3, "two nodes and one edge are new");
	assert_eq!(engine.flush_frame(), 3);
	assert_eq!(
		engine.renderer().container_ids().collect::<Vec<_>>(),
		vec!["node-a-container", "node-b-container", "edge-a-b-container"]
	);
	assert_eq!(
		edge_path(&engine, "edge-a-b-container").as_deref(),
		Some("M10,0L82,0"),
		"edge must stop at both glyph boundaries"
	);
}

#[test]
fn unchanged_input_schedules_nothing() {
	let mut engine = engine();
	let (nodes, edges) = pair();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();

	let plan = engine.update(&nodes, &edges, &Selection::default());
	assert!(plan.is_empty(), "second pass over identical data must be a no-op: {plan:?}");
	assert_eq!(engine.flush_frame(), 0);
}

#[test]
fn stale_node_edges_are_removed_before_the_node() {
	let mut engine = engine();
	let (nodes, edges) = pair();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();
	engine.renderer_mut().take_ops();

	engine.update(&nodes[1..], &[], &Selection::default());
	assert_eq!(
		engine.renderer().ops(),
		&[
			RenderOp::Remove("edge-a-b-container".into()),
			RenderOp::Remove("node-a-container".into())
		]
	);
	assert!(engine.renderer().contains("node-b-container"));
}

fn chain() -> (Vec<Node>, Vec<Edge>) {
	let nodes = vec![
		Node::new("a", "A").at(0.0, 0.0),
		Node::new("b", "B").at(100.0, 0.0),
		Node::new("c", "C").at(200.0, 0.0),
	];
	(nodes, vec![Edge::new("a", "b"), Edge::new("b", "c")])
}

#[test]
fn middle_node_removal_tears_down_both_edges_first() {
	let mut engine = engine();
	let (nodes, edges) = chain();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();
	engine.renderer_mut().take_ops();

	let survivors = vec![nodes[0].clone(), nodes[2].clone()];
	engine.update(&survivors, &edges, &Selection::default());
	assert_eq!(
		engine.renderer().ops(),
		&[
			RenderOp::Remove("edge-a-b-container".into()),
			RenderOp::Remove("edge-b-c-container".into()),
			RenderOp::Remove("node-b-container".into())
		],
		"incoming and outgoing edge containers go before the node"
	);
	assert_eq!(engine.maps().orphans.len(), 2, "edges stay in the caller's array as orphans");
}

#[test]
fn orphaned_edge_stays_removed_when_its_other_endpoint_moves() {
	let mut engine = engine();
	let (nodes, edges) = chain();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();

	let mut survivors = vec![nodes[0].clone(), nodes[2].clone()];
	engine.update(&survivors, &edges, &Selection::default());
	engine.flush_frame();

	survivors[0].y = 50.0;
	let plan = engine.update(&survivors, &edges, &Selection::default());
	assert!(plan.edges.is_empty(), "orphans must not be rescheduled: {plan:?}");
	assert!(engine.move_node(&"c".into(), Point::new(200.0, 80.0)));
	assert!(!engine.schedule_edge(Edge::floating("a", Point::ORIGIN)));
	engine.schedule_edge(Edge::new("a", "b"));
	engine.flush_frame();

	assert_eq!(
		engine.renderer().container_ids().collect::<Vec<_>>(),
		vec!["node-a-container", "node-c-container"]
	);
}

#[test]
fn moved_endpoint_rerenders_its_edge() {
	let mut engine = engine();
	let (mut nodes, edges) = pair();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();

	nodes[1].y = 100.0;
	let plan = engine.update(&nodes, &edges, &Selection::default());
	assert_eq!(plan.nodes, vec![(NodeKey::from("b"), Change::Changed)]);
	assert_eq!(plan.edges, vec![(EdgeKey::new("a", "b"), Change::Changed)]);
}

#[test]
fn repeated_schedules_coalesce_to_latest_data() {
	let mut engine = engine();
	let (nodes, edges) = pair();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();
	engine.renderer_mut().take_ops();

	for label in ["1", "2", "3"] {
		let mut edge = Edge::new("a", "b");
		edge.handle_text = Some(label.into());
		assert!(engine.schedule_edge(edge));
	}
	assert_eq!(engine.pending_len(), 1);
	assert_eq!(engine.flush_frame(), 1, "only one render may run per frame and entity");
	assert_eq!(engine.renderer().ops(), &[RenderOp::Replace("edge-a-b-container".into())]);

	let Some(Visual::Edge(visual)) = engine.renderer().visual("edge-a-b-container") else {
		panic!("edge container missing");
	};
	assert_eq!(visual.handle_text.as_deref(), Some("3"));
	assert_eq!(engine.stats().superseded, 2);
}

#[test]
fn render_for_unknown_edge_is_skipped() {
	let mut engine = engine();
	let (nodes, _) = pair();
	engine.update(&nodes, &[], &Selection::default());
	engine.flush_frame();

	assert!(engine.schedule_edge(Edge::new("a", "missing")));
	assert_eq!(engine.flush_frame(), 0);
	assert_eq!(engine.stats().skipped, 1);
	assert!(!engine.renderer().contains("edge-a-missing-container"));
}

#[test]
fn removal_before_frame_cancels_render() {
	let mut engine = engine();
	let (nodes, _) = pair();
	engine.update(&nodes, &[], &Selection::default());
	engine.update(&[], &[], &Selection::default());

	assert_eq!(engine.pending_len(), 0);
	assert_eq!(engine.flush_frame(), 0);
	assert!(engine.renderer().is_empty());
}

#[test]
fn move_node_schedules_incident_edges() {
	let mut engine = engine();
	let (nodes, edges) = pair();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();

	assert!(engine.move_node(&"b".into(), Point::new(0.0, 100.0)));
	assert!(!engine.move_node(&"zzz".into(), Point::ORIGIN));
	assert_eq!(engine.flush_frame(), 2);
	assert_eq!(edge_path(&engine, "edge-a-b-container").as_deref(), Some("M0,10L0,82"));
}

#[test]
fn drag_defers_other_renders_until_it_ends() {
	let mut engine = engine();
	let (nodes, edges) = pair();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();

	assert!(engine.begin_edge_drag(&"a".into(), Point::new(0.0, 50.0)));
	assert!(!engine.begin_edge_drag(&"b".into(), Point::ORIGIN), "one drag at a time");
	engine.move_node(&"b".into(), Point::new(100.0, 40.0));
	assert_eq!(engine.stats().suppressed, 2);
	assert_eq!(engine.flush_frame(), 1, "only the dragged edge renders mid-drag");
	assert!(engine.renderer().contains("edge-a-custom-container"));

	assert!(engine.drag_edge_to(Point::new(0.0, 60.0)));
	engine.flush_frame();
	assert_eq!(edge_path(&engine, "edge-a-custom-container").as_deref(), Some("M0,10L0,60"));

	let dragged = engine.end_edge_drag().expect("a drag was active");
	assert_eq!(dragged.edge.target_position, Some(Point::new(0.0, 60.0)));
	assert!(!engine.renderer().contains("edge-a-custom-container"));
	assert_eq!(engine.flush_frame(), 2, "deferred node and edge replay");

	let Some(Visual::Node(b)) = engine.renderer().visual("node-b-container") else {
		panic!("node b missing");
	};
	assert_eq!(b.transform, "translate(100, 40)");
}

#[test]
fn swap_drag_uses_its_own_container() {
	let mut engine = engine();
	let (nodes, edges) = pair();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();

	let key = EdgeKey::new("a", "b");
	assert!(engine.begin_edge_swap(&key, Point::new(50.0, 50.0)));
	engine.flush_frame();
	assert!(engine.renderer().contains("edge-a-b-custom-container"));
	assert!(engine.renderer().contains("edge-a-b-container"));

	let dragged = engine.end_edge_drag().expect("swap was active");
	assert_eq!(dragged.swapping, Some(key));
	assert_eq!(
		dragged.id(),
		EntityId::DraggedEdge {
			source: "a".into(),
			target: Some("b".into())
		}
	);
}

#[test]
fn selection_change_rerenders_only_the_selected() {
	let mut engine = engine();
	let (nodes, edges) = pair();
	engine.update(&nodes, &edges, &Selection::default());
	engine.flush_frame();

	let plan = engine.update(&nodes, &edges, &Selection::node("a"));
	assert_eq!(plan.nodes, vec![(NodeKey::from("a"), Change::Changed)]);
	assert!(plan.edges.is_empty());
	engine.flush_frame();

	let Some(Visual::Node(a)) = engine.renderer().visual("node-a-container") else {
		panic!("node a missing");
	};
	assert!(a.selected);
}
