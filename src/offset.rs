//! Pull-back offsets: how far an edge endpoint retreats from a node centre so
//! the line stops on the glyph boundary, optionally behind the arrowhead.

use log::debug;

use crate::geometry::{self, Bounds, PathOutline};
use crate::glyph::{GlyphBoundary, PrimitiveShape, SceneLookup};
use crate::types::{Node, NodeKey, Point, Size};

/// Arrow dimensions are divided by this before being reserved.
pub const ARROW_DAMPING: f64 = 1.25;

/// Boundary crossing, or the sentinel used when nothing was hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersect {
	Hit(Point),
	None { point: Point },
}

impl Intersect {
	pub fn point(&self) -> Point {
		match self {
			Intersect::Hit(point) | Intersect::None { point } => *point,
		}
	}

	pub fn is_hit(&self) -> bool {
		matches!(self, Intersect::Hit(_))
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectResult {
	pub x_off: f64,
	pub y_off: f64,
	pub intersect: Intersect,
}

impl IntersectResult {
	/// Zero offsets, no intersection.
	pub fn none() -> Self {
		Self {
			x_off: 0.0,
			y_off: 0.0,
			intersect: Intersect::None { point: Point::ORIGIN },
		}
	}
}

impl Default for IntersectResult {
	fn default() -> Self {
		Self::none()
	}
}

/// A line endpoint: a node's centre, or a free-floating pointer position.
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
	pub key: Option<NodeKey>,
	pub position: Point,
}

impl Endpoint {
	pub fn from_node(node: &Node, key_field: &str) -> Self {
		Self {
			key: node.key(key_field),
			position: node.position(),
		}
	}

	pub fn free(position: Point) -> Self {
		Self { key: None, position }
	}
}

/// Offset of `trg`'s endpoint along the line `src -> trg`, resolved through
/// `trg`'s glyph. Any unresolvable input yields [`IntersectResult::none`].
pub fn calculate_offset(
	node_size: f64,
	src: Option<&Node>,
	trg: Option<&Node>,
	key_field: &str,
	includes_arrow: bool,
	scene: &dyn SceneLookup,
) -> IntersectResult {
	let src = src.map(|node| Endpoint::from_node(node, key_field));
	let trg = trg.map(|node| Endpoint::from_node(node, key_field));
	endpoint_offset(node_size, src.as_ref(), trg.as_ref(), includes_arrow, scene)
}

/// [`calculate_offset`] over already-resolved endpoints.
pub fn endpoint_offset(
	node_size: f64,
	src: Option<&Endpoint>,
	trg: Option<&Endpoint>,
	includes_arrow: bool,
	scene: &dyn SceneLookup,
) -> IntersectResult {
	let Some(trg) = trg else {
		return IntersectResult::none();
	};
	let Some(key) = trg.key.as_ref() else {
		return IntersectResult::none();
	};
	let Some(element) = scene.node_element(key) else {
		return IntersectResult::none();
	};
	let Some(href) = element.href.as_deref() else {
		return IntersectResult::none();
	};
	let Some(glyph) = scene.glyph(href) else {
		return IntersectResult::none();
	};
	let Some(boundary) = glyph.boundary() else {
		return IntersectResult::none();
	};

	let src_point = src.map_or(Point::ORIGIN, |src| src.position);
	let trg_point = trg.position;
	let arrow = includes_arrow.then(|| scene.arrow_size());

	match boundary {
		GlyphBoundary::Rect(rect) => {
			let client = rect.client_size(node_size);
			let size = match rect.shape {
				PrimitiveShape::Rect { width, height } => {
					Size::new(width.unwrap_or(client.width), height.unwrap_or(client.height))
				}
				_ => client,
			};
			let rotation = rect.transform.as_deref().map_or(0.0, geometry::rotation_degrees);
			let hit = geometry::intersect_line_with_rotated_rect(size, src_point, trg_point, rotation);
			resolve(hit, Bounds::centered(trg_point, size), trg_point, arrow)
		}
		GlyphBoundary::Path(path) => {
			let PrimitiveShape::Path { d } = &path.shape else {
				return IntersectResult::none();
			};
			let outline = match PathOutline::parse(d) {
				Ok(outline) => outline,
				Err(err) => {
					debug!("skipping intersection for glyph {}: {err}", glyph.id);
					return IntersectResult::none();
				}
			};
			let client = path.client_size(node_size);
			let hit = geometry::intersect_line_with_path(&outline, client, src_point, trg_point);
			resolve(hit, Bounds::centered(trg_point, client), trg_point, arrow)
		}
		GlyphBoundary::Round(round) => {
			let client = round.client_size(node_size);
			let size = Size::new(
				glyph.width.unwrap_or(client.width),
				glyph.height.unwrap_or(client.height),
			);
			let hit = geometry::intersect_line_with_ellipse(
				size.width / 2.0,
				size.height / 2.0,
				trg_point,
				src_point,
				trg_point,
			);
			resolve(hit, Bounds::centered(trg_point, size), trg_point, arrow)
		}
	}
}

/// Turns a boundary hit into offsets, reserving arrow room along the axis the
/// edge arrives on.
fn resolve(hit: Option<Point>, bounds: Bounds, trg: Point, arrow: Option<Size>) -> IntersectResult {
	let Some(hit) = hit else {
		return IntersectResult::none();
	};

	let (mut arrow_width, mut arrow_height) = (0.0, 0.0);
	if let Some(arrow) = arrow {
		if bounds.spans_x(hit.x) && hit.y > trg.y {
			// arrives at the bottom edge
			arrow_height = arrow.height;
		} else if bounds.spans_x(hit.x) && hit.y < trg.y {
			arrow_height = -arrow.height;
		} else if bounds.spans_y(hit.y) && hit.x < trg.x {
			arrow_width = -arrow.width;
		} else {
			arrow_width = arrow.width;
		}
	}

	IntersectResult {
		x_off: trg.x - hit.x - arrow_width / ARROW_DAMPING,
		y_off: trg.y - hit.y - arrow_height / ARROW_DAMPING,
		intersect: Intersect::Hit(hit),
	}
}
