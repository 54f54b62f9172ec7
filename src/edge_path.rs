//! Composes the two endpoint offsets into an edge's path and handle transform.

use crate::geometry::{self, fmt_number};
use crate::glyph::SceneLookup;
use crate::offset::{Endpoint, IntersectResult, endpoint_offset};
use crate::types::{Edge, Node, Point};

/// Rendering knobs for edges, lifted from [`crate::config::GraphConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeOptions {
	pub node_size: f64,
	pub handle_size: f64,
	pub rotate_handle: bool,
	pub negate_rotation: bool,
}

impl Default for EdgeOptions {
	fn default() -> Self {
		Self {
			node_size: 154.0,
			handle_size: 50.0,
			rotate_handle: true,
			negate_rotation: false,
		}
	}
}

/// Handle angle in degrees; `rotated` is set when it was flipped to keep text upright.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleRotation {
	pub degrees: f64,
	pub rotated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeGeometry {
	/// `M{x},{y}L{x},{y}` between the pulled-back endpoints.
	pub path: String,
	pub start: Point,
	pub end: Point,
	/// Mean of the raw, un-offset endpoints.
	pub midpoint: Point,
	pub rotation: HandleRotation,
	pub handle_transform: String,
}

/// Retreat of the source end: the source glyph intersected with the line
/// arriving from the target. No arrow is reserved.
pub fn pull_back_from_own_glyph(
	node_size: f64,
	source: Option<&Endpoint>,
	target: Option<&Endpoint>,
	scene: &dyn SceneLookup,
) -> IntersectResult {
	endpoint_offset(node_size, target, source, false, scene)
}

/// Retreat of the target end, leaving room for the arrowhead.
pub fn pull_back_from_other_glyph(
	node_size: f64,
	source: Option<&Endpoint>,
	target: Option<&Endpoint>,
	scene: &dyn SceneLookup,
) -> IntersectResult {
	endpoint_offset(node_size, source, target, true, scene)
}

/// Path description for `edge` between its (possibly missing) nodes.
pub fn build_edge_path(
	edge: &Edge,
	source: Option<&Node>,
	target: Option<&Node>,
	key_field: &str,
	node_size: f64,
	scene: &dyn SceneLookup,
) -> String {
	let (source, target) = endpoints(edge, source, target, key_field);
	let options = EdgeOptions {
		node_size,
		..Default::default()
	};
	edge_geometry(source.as_ref(), target.as_ref(), &options, scene).path
}

/// Resolves both ends of `edge`. A missing target node falls back to the
/// free-floating `target_position` of an edge being drawn.
pub fn endpoints(
	edge: &Edge,
	source: Option<&Node>,
	target: Option<&Node>,
	key_field: &str,
) -> (Option<Endpoint>, Option<Endpoint>) {
	let source = source.map(|node| Endpoint::from_node(node, key_field));
	let target = target
		.map(|node| Endpoint::from_node(node, key_field))
		.or_else(|| edge.target_position.map(Endpoint::free));
	(source, target)
}

pub fn edge_geometry(
	source: Option<&Endpoint>,
	target: Option<&Endpoint>,
	options: &EdgeOptions,
	scene: &dyn SceneLookup,
) -> EdgeGeometry {
	let src = source.map_or(Point::ORIGIN, |e| e.position);
	let trg = target.map_or(Point::ORIGIN, |e| e.position);

	let src_off = pull_back_from_own_glyph(options.node_size, source, target, scene);
	let trg_off = pull_back_from_other_glyph(options.node_size, source, target, scene);

	let start = Point::new(src.x - src_off.x_off, src.y - src_off.y_off);
	let end = Point::new(trg.x - trg_off.x_off, trg.y - trg_off.y_off);
	let midpoint = src.midpoint(trg);
	let rotation = handle_rotation(src, trg, options.negate_rotation);
	let handle_transform = handle_transform(
		midpoint,
		options.rotate_handle.then_some(rotation.degrees),
		options.handle_size,
	);

	EdgeGeometry {
		path: geometry::line_string(&[start, end]),
		start,
		end,
		midpoint,
		rotation,
		handle_transform,
	}
}

/// Angle of `src -> trg`, flipped by 180° outside `(-90°, 90°]`.
pub fn handle_rotation(src: Point, trg: Point, negate: bool) -> HandleRotation {
	let mut degrees = geometry::degrees(geometry::theta(Some(src), Some(trg)));
	if negate {
		degrees = -degrees;
	}
	let rotated = degrees <= -90.0 || degrees > 90.0;
	if rotated {
		degrees += 180.0;
	}
	HandleRotation { degrees, rotated }
}

pub fn handle_translation(midpoint: Point) -> String {
	geometry::translate(midpoint)
}

/// `translate(mid) rotate(angle) translate(-size/2, -size/2)`; the rotation is
/// omitted when `rotation` is `None`.
pub fn handle_transform(midpoint: Point, rotation: Option<f64>, handle_size: f64) -> String {
	let mut buf = ryu_js::Buffer::new();
	let mut out = handle_translation(midpoint);
	if let Some(degrees) = rotation {
		out.push_str(" rotate(");
		out.push_str(fmt_number(degrees, &mut buf));
		out.push(')');
	}
	let offset = fmt_number(-handle_size / 2.0, &mut buf).to_owned();
	out.push_str(&format!(" translate({offset}, {offset})"));
	out
}
