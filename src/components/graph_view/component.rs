use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlDivElement, MouseEvent};

use super::render::SvgRenderer;
use super::state::DiagramState;
use crate::config::GraphConfig;
use crate::types::{Edge, Node, Point};

#[component]
pub fn GraphView(
	nodes: RwSignal<Vec<Node>>,
	edges: RwSignal<Vec<Edge>>,
	#[prop(optional)] config: GraphConfig,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let state: Rc<RefCell<Option<DiagramState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init) = (state.clone(), animate.clone());
	let key_field = config.node_key.clone();

	Effect::new(move |_| {
		let Some(container) = container_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(document) = window.document() else {
			return;
		};

		let glyphs = config.glyph_registry();
		let renderer = match SvgRenderer::mount(document, &container, &glyphs, config.node_size) {
			Ok(renderer) => renderer,
			Err(err) => {
				warn!("failed to mount graph view: {err:?}");
				return;
			}
		};
		let mut diagram = DiagramState::new(config.clone(), renderer);
		diagram.update(&nodes.get_untracked(), &edges.get_untracked());
		*state_init.borrow_mut() = Some(diagram);

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.engine.flush_frame();
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Diff pass whenever the caller's arrays change.
	let state_data = state.clone();
	Effect::new(move |_| {
		let (nodes, edges) = (nodes.get(), edges.get());
		if let Some(ref mut s) = *state_data.borrow_mut() {
			s.update(&nodes, &edges);
		}
	});

	let local_point = move |ev: &MouseEvent| -> Option<Point> {
		let container: HtmlDivElement = container_ref.get()?;
		let rect = container.get_bounding_client_rect();
		Some(Point::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = local_point(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			match s.node_at_position(p) {
				Some(key) if ev.shift_key() => s.begin_edge_draw(key, p),
				Some(key) => {
					s.begin_node_drag(key, p);
					s.update(&nodes.get_untracked(), &edges.get_untracked());
				}
				None => {
					s.selection = Default::default();
					s.update(&nodes.get_untracked(), &edges.get_untracked());
				}
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = local_point(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_node_to(p);
			} else if s.draw.active {
				s.draw_edge_to(p);
			}
		}
	};

	// Commits finished gestures into the signals once the state borrow is released.
	let finish = {
		let state = state.clone();
		move |p: Option<Point>| {
			let (moved, drawn) = match *state.borrow_mut() {
				Some(ref mut s) => {
					let moved = s.end_node_drag();
					(moved, s.end_edge_draw(p))
				}
				None => (None, None),
			};
			if let Some(moved) = moved {
				nodes.update(|nodes| {
					if let Some(node) = nodes.iter_mut().find(|n| n.key(&key_field).as_ref() == Some(&moved.key)) {
						node.x = moved.position.x;
						node.y = moved.position.y;
					}
				});
			}
			if let Some(edge) = drawn {
				edges.update(|edges| edges.push(edge));
			}
		}
	};

	let finish_mu = finish.clone();
	let on_mouseup = move |ev: MouseEvent| finish_mu(local_point(&ev));
	let on_mouseleave = move |_: MouseEvent| finish(None);

	view! {
		<div
			node_ref=container_ref
			class="graph-view"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			style="width: 100%; height: 100%; user-select: none;"
		/>
	}
}
