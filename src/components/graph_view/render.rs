use std::collections::HashMap;

use log::warn;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::geometry::fmt_number;
use crate::glyph::{GlyphDef, GlyphPrimitive, GlyphRegistry, PrimitiveShape};
use crate::scene::{EdgeVisual, NodeVisual, SceneRenderer, Visual};
use crate::types::Size;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const ARROW_MARKER_ID: &str = "end-arrow";

fn num(v: f64) -> String {
	let mut buf = ryu_js::Buffer::new();
	fmt_number(v, &mut buf).to_owned()
}

fn absorb(context: &str, result: Result<(), JsValue>) {
	if let Err(err) = result {
		warn!("{context}: {err:?}");
	}
}

/// Writes scene containers into an `<svg>` through web-sys.
pub struct SvgRenderer {
	document: Document,
	entities: Element,
	containers: HashMap<String, Element>,
}

impl SvgRenderer {
	/// Creates the `<svg>` with its `<defs>` and entities group inside `parent`,
	/// replacing whatever was there.
	pub fn mount(document: Document, parent: &Element, glyphs: &GlyphRegistry, node_size: f64) -> Result<Self, JsValue> {
		parent.set_inner_html("");
		let svg = create(&document, "svg", &[("class", "graph"), ("width", "100%"), ("height", "100%")])?;
		let defs = create(&document, "defs", &[])?;
		for glyph in glyphs.iter() {
			defs.append_child(&*symbol(&document, glyph, node_size)?)?;
		}
		defs.append_child(&*arrow_marker(&document, glyphs.arrow())?)?;
		svg.append_child(&defs)?;

		let view = create(&document, "g", &[("class", "view")])?;
		let entities = create(&document, "g", &[("class", "entities")])?;
		view.append_child(&entities)?;
		svg.append_child(&view)?;
		parent.append_child(&svg)?;

		Ok(Self {
			document,
			entities,
			containers: HashMap::new(),
		})
	}

	fn fill(&self, container: &Element, visual: &Visual) -> Result<(), JsValue> {
		container.set_inner_html("");
		let inner = match visual {
			Visual::Node(node) => node_element(&self.document, node)?,
			Visual::Edge(edge) => edge_element(&self.document, edge)?,
		};
		container.append_child(&inner)?;
		Ok(())
	}

	fn try_append(&mut self, container_id: &str, visual: &Visual) -> Result<(), JsValue> {
		let class = match visual {
			Visual::Node(_) => "node-container",
			Visual::Edge(_) => "edge-container",
		};
		let container = create(&self.document, "g", &[("id", container_id), ("class", class)])?;
		self.fill(&container, visual)?;
		// edges stay underneath nodes
		match (visual, self.entities.first_element_child()) {
			(Visual::Edge(_), Some(first)) => {
				self.entities.insert_before(&container, Some(&*first))?;
			}
			_ => {
				self.entities.append_child(&container)?;
			}
		}
		self.containers.insert(container_id.to_owned(), container);
		Ok(())
	}
}

impl SceneRenderer for SvgRenderer {
	fn contains(&self, container_id: &str) -> bool {
		self.containers.contains_key(container_id)
	}

	fn append(&mut self, container_id: &str, visual: &Visual) {
		let result = self.try_append(container_id, visual);
		absorb(container_id, result);
	}

	fn replace(&mut self, container_id: &str, visual: &Visual) {
		let Some(container) = self.containers.get(container_id) else {
			return;
		};
		absorb(container_id, self.fill(container, visual));
	}

	fn remove(&mut self, container_id: &str) -> bool {
		match self.containers.remove(container_id) {
			Some(container) => {
				container.remove();
				true
			}
			None => false,
		}
	}
}

fn create(document: &Document, tag: &str, attrs: &[(&str, &str)]) -> Result<Element, JsValue> {
	let el = document.create_element_ns(Some(SVG_NS), tag)?;
	for (name, value) in attrs {
		el.set_attribute(name, value)?;
	}
	Ok(el)
}

fn sized_use(document: &Document, class: &str, href: &str, size: f64) -> Result<Element, JsValue> {
	let half = num(-size / 2.0);
	let size = num(size);
	create(
		document,
		"use",
		&[
			("class", class),
			("href", href),
			("x", &*half),
			("y", &*half),
			("width", &*size),
			("height", &*size),
		],
	)
}

fn node_element(document: &Document, node: &NodeVisual) -> Result<Element, JsValue> {
	let class = if node.selected { "node selected" } else { "node" };
	let g = create(
		document,
		"g",
		&[("id", &*node.element_id), ("class", class), ("transform", &*node.transform)],
	)?;
	if let Some(href) = &node.subtype_href {
		g.append_child(&*sized_use(document, "subtype-shape", href, node.size)?)?;
	}
	if let Some(href) = &node.shape_href {
		g.append_child(&*sized_use(document, "shape", href, node.size)?)?;
	}
	let text = create(document, "text", &[("class", "node-text"), ("text-anchor", "middle")])?;
	text.set_text_content(Some(&node.title));
	g.append_child(&text)?;
	Ok(g)
}

fn edge_element(document: &Document, edge: &EdgeVisual) -> Result<Element, JsValue> {
	let mut class = String::from("edge");
	if edge.selected {
		class.push_str(" selected");
	}
	if edge.dragging {
		class.push_str(" dragging");
	}
	let g = create(document, "g", &[("id", &*edge.element_id), ("class", &*class)])?;
	let marker = format!("url(#{ARROW_MARKER_ID})");
	g.append_child(&*create(
		document,
		"path",
		&[("class", "edge-path"), ("d", &*edge.path), ("marker-end", &*marker)],
	)?)?;

	if let Some(href) = &edge.handle_href {
		let size = num(edge.handle_size);
		g.append_child(&*create(
			document,
			"use",
			&[
				("class", "edge-handle"),
				("href", href.as_str()),
				("width", &*size),
				("height", &*size),
				("transform", &*edge.handle_transform),
			],
		)?)?;
	}
	if let Some(label) = &edge.handle_text {
		let mid = num(edge.handle_size / 2.0);
		let class = if edge.text_rotated { "edge-text rotated" } else { "edge-text" };
		let text = create(
			document,
			"text",
			&[
				("class", class),
				("text-anchor", "middle"),
				("x", &*mid),
				("y", &*mid),
				("transform", &*edge.handle_transform),
			],
		)?;
		text.set_text_content(Some(label));
		g.append_child(&text)?;
	}
	Ok(g)
}

fn symbol(document: &Document, glyph: &GlyphDef, node_size: f64) -> Result<Element, JsValue> {
	let (width, height) = (glyph.width.unwrap_or(node_size), glyph.height.unwrap_or(node_size));
	let view_box = format!("0 0 {} {}", num(width), num(height));
	let symbol = create(document, "symbol", &[("id", &*glyph.id), ("viewBox", &*view_box)])?;
	for primitive in &glyph.primitives {
		symbol.append_child(&*primitive_element(document, primitive, width, height)?)?;
	}
	Ok(symbol)
}

fn primitive_element(document: &Document, primitive: &GlyphPrimitive, width: f64, height: f64) -> Result<Element, JsValue> {
	let el = match &primitive.shape {
		PrimitiveShape::Rect { width: w, height: h } => create(
			document,
			"rect",
			&[("width", &*num(w.unwrap_or(width))), ("height", &*num(h.unwrap_or(height)))],
		)?,
		PrimitiveShape::Path { d } => create(document, "path", &[("d", d.as_str())])?,
		PrimitiveShape::Circle { r } => create(
			document,
			"circle",
			&[("cx", &*num(width / 2.0)), ("cy", &*num(height / 2.0)), ("r", &*num(*r))],
		)?,
		PrimitiveShape::Ellipse { rx, ry } => create(
			document,
			"ellipse",
			&[
				("cx", &*num(width / 2.0)),
				("cy", &*num(height / 2.0)),
				("rx", &*num(*rx)),
				("ry", &*num(*ry)),
			],
		)?,
		PrimitiveShape::Polygon { points } => {
			let points: Vec<String> = points.iter().map(|p| format!("{},{}", num(p.x), num(p.y))).collect();
			create(document, "polygon", &[("points", &*points.join(" "))])?
		}
	};
	if let Some(transform) = &primitive.transform {
		el.set_attribute("transform", transform)?;
	}
	if let Some(class) = &primitive.class {
		el.set_attribute("class", class)?;
	}
	if primitive.intersect_ignore {
		el.set_attribute("data-intersect-ignore", "true")?;
	}
	Ok(el)
}

fn arrow_marker(document: &Document, arrow: Size) -> Result<Element, JsValue> {
	let (w, h) = (num(arrow.width), num(arrow.height));
	let marker = create(
		document,
		"marker",
		&[
			("id", ARROW_MARKER_ID),
			("viewBox", &*format!("0 -{} {} {}", num(arrow.height / 2.0), w, h)),
			("refX", &*num(arrow.width / 2.0)),
			("markerWidth", &*w),
			("markerHeight", &*h),
			("orient", "auto"),
		],
	)?;
	let tip = format!(
		"M0,-{half}L{w},0L0,{half}",
		half = num(arrow.height / 2.0),
		w = w
	);
	marker.append_child(&*create(document, "path", &[("class", "arrow"), ("d", &*tip)])?)?;
	Ok(marker)
}
