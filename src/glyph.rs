//! Glyph definitions and the registry the offset calculator resolves them through.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{NodeKey, Point, Size};

/// A named, reusable shape referenced by node and edge types.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphDef {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<f64>,
	#[serde(default)]
	pub primitives: Vec<GlyphPrimitive>,
}

/// One child element of a glyph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphPrimitive {
	pub shape: PrimitiveShape,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transform: Option<String>,
	/// Rendered size, when it differs from what the attributes imply.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bounds: Option<Size>,
	/// Decorative children that edges should not stop at.
	#[serde(default)]
	pub intersect_ignore: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PrimitiveShape {
	Rect {
		#[serde(default)]
		width: Option<f64>,
		#[serde(default)]
		height: Option<f64>,
	},
	Path {
		d: String,
	},
	Circle {
		r: f64,
	},
	Ellipse {
		rx: f64,
		ry: f64,
	},
	Polygon {
		points: Vec<Point>,
	},
}

impl GlyphPrimitive {
	pub fn new(shape: PrimitiveShape) -> Self {
		Self {
			shape,
			transform: None,
			bounds: None,
			intersect_ignore: false,
			class: None,
		}
	}

	pub fn rect(width: f64, height: f64) -> Self {
		Self::new(PrimitiveShape::Rect {
			width: Some(width),
			height: Some(height),
		})
	}

	pub fn path(d: impl Into<String>) -> Self {
		Self::new(PrimitiveShape::Path { d: d.into() })
	}

	pub fn circle(r: f64) -> Self {
		Self::new(PrimitiveShape::Circle { r })
	}

	pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
		self.transform = Some(transform.into());
		self
	}

	pub fn with_bounds(mut self, bounds: Size) -> Self {
		self.bounds = Some(bounds);
		self
	}

	/// Size the primitive renders at when no explicit bounds were measured.
	pub fn natural_size(&self) -> Option<Size> {
		match &self.shape {
			PrimitiveShape::Rect { width, height } => match (width, height) {
				(Some(w), Some(h)) => Some(Size::new(*w, *h)),
				_ => None,
			},
			PrimitiveShape::Path { d } => crate::geometry::PathOutline::parse(d)
				.ok()
				.map(|outline| outline.bounding_size()),
			PrimitiveShape::Circle { r } => Some(Size::square(r * 2.0)),
			PrimitiveShape::Ellipse { rx, ry } => Some(Size::new(rx * 2.0, ry * 2.0)),
			PrimitiveShape::Polygon { points } => polygon_size(points),
		}
	}

	/// Measured bounds, else natural size, else `fallback`.
	pub fn client_size(&self, fallback: f64) -> Size {
		self.bounds
			.or_else(|| self.natural_size())
			.filter(|size| !size.is_empty())
			.unwrap_or(Size::square(fallback))
	}
}

fn polygon_size(points: &[Point]) -> Option<Size> {
	let first = points.first()?;
	let (mut min, mut max) = (*first, *first);
	for p in &points[1..] {
		min = Point::new(min.x.min(p.x), min.y.min(p.y));
		max = Point::new(max.x.max(p.x), max.y.max(p.y));
	}
	Some(Size::new(max.x - min.x, max.y - min.y))
}

/// Which intersection routine a glyph is resolved to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlyphBoundary<'a> {
	Rect(&'a GlyphPrimitive),
	Path(&'a GlyphPrimitive),
	Round(&'a GlyphPrimitive),
}

impl GlyphDef {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Default::default()
		}
	}

	pub fn with_size(mut self, width: f64, height: f64) -> Self {
		self.width = Some(width);
		self.height = Some(height);
		self
	}

	pub fn with_primitive(mut self, primitive: GlyphPrimitive) -> Self {
		self.primitives.push(primitive);
		self
	}

	/// Rectangles take precedence over paths, paths over the circle family.
	pub fn boundary(&self) -> Option<GlyphBoundary<'_>> {
		let usable = || self.primitives.iter().filter(|p| !p.intersect_ignore);
		if let Some(rect) = usable().find(|p| matches!(p.shape, PrimitiveShape::Rect { .. })) {
			return Some(GlyphBoundary::Rect(rect));
		}
		if let Some(path) = usable().find(|p| matches!(p.shape, PrimitiveShape::Path { .. })) {
			return Some(GlyphBoundary::Path(path));
		}
		usable()
			.find(|p| {
				matches!(
					p.shape,
					PrimitiveShape::Circle { .. } | PrimitiveShape::Ellipse { .. } | PrimitiveShape::Polygon { .. }
				)
			})
			.map(GlyphBoundary::Round)
	}
}

/// Normalises `#id` and `id` references to the bare id.
pub fn href_id(href: &str) -> &str {
	href.strip_prefix('#').unwrap_or(href)
}

/// Glyphs by id plus the arrowhead size. Built once from configuration.
#[derive(Clone, Debug, Default)]
pub struct GlyphRegistry {
	glyphs: IndexMap<String, GlyphDef>,
	arrow: Size,
}

impl GlyphRegistry {
	pub fn new(arrow: Size) -> Self {
		Self {
			glyphs: IndexMap::new(),
			arrow,
		}
	}

	pub fn insert(&mut self, glyph: GlyphDef) {
		self.glyphs.insert(glyph.id.clone(), glyph);
	}

	pub fn with_glyph(mut self, glyph: GlyphDef) -> Self {
		self.insert(glyph);
		self
	}

	pub fn get(&self, href: &str) -> Option<&GlyphDef> {
		self.glyphs.get(href_id(href))
	}

	pub fn arrow(&self) -> Size {
		self.arrow
	}

	pub fn set_arrow(&mut self, arrow: Size) {
		self.arrow = arrow;
	}

	pub fn iter(&self) -> impl Iterator<Item = &GlyphDef> {
		self.glyphs.values()
	}
}

/// The on-screen element currently representing a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeElement {
	/// Reference to the node's primary shape glyph.
	pub href: Option<String>,
}

/// Read access to the rendered scene, supplied per offset computation.
pub trait SceneLookup {
	/// `None` when the node has no on-screen element.
	fn node_element(&self, key: &NodeKey) -> Option<NodeElement>;
	fn glyph(&self, href: &str) -> Option<&GlyphDef>;
	fn arrow_size(&self) -> Size;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn boundary_prefers_rect_then_path() {
		let glyph = GlyphDef::new("shape")
			.with_primitive(GlyphPrimitive::circle(4.0))
			.with_primitive(GlyphPrimitive::path("M 0 0 1 1"))
			.with_primitive(GlyphPrimitive::rect(2.0, 2.0));
		assert!(matches!(glyph.boundary(), Some(GlyphBoundary::Rect(_))));

		let glyph = GlyphDef::new("shape")
			.with_primitive(GlyphPrimitive::circle(4.0))
			.with_primitive(GlyphPrimitive::path("M 0 0 1 1"));
		assert!(matches!(glyph.boundary(), Some(GlyphBoundary::Path(_))));
	}

	#[test]
	fn ignored_primitives_are_skipped() {
		let mut decoration = GlyphPrimitive::rect(2.0, 2.0);
		decoration.intersect_ignore = true;
		let glyph = GlyphDef::new("shape")
			.with_primitive(decoration)
			.with_primitive(GlyphPrimitive::circle(4.0));
		assert!(matches!(glyph.boundary(), Some(GlyphBoundary::Round(_))));
		assert!(GlyphDef::new("empty").boundary().is_none());
	}

	#[test]
	fn client_size_falls_back_through_attributes() {
		let rect = GlyphPrimitive::rect(10.0, 10.0).with_bounds(Size::square(15.0));
		assert_eq!(rect.client_size(100.0), Size::square(15.0));
		assert_eq!(GlyphPrimitive::circle(4.0).client_size(100.0), Size::square(8.0));

		let unsized_rect = GlyphPrimitive::new(PrimitiveShape::Rect {
			width: None,
			height: None,
		});
		assert_eq!(unsized_rect.client_size(100.0), Size::square(100.0));
	}

	#[test]
	fn registry_resolves_hash_references() {
		let registry = GlyphRegistry::new(Size::square(8.0)).with_glyph(GlyphDef::new("empty"));
		assert!(registry.get("#empty").is_some());
		assert!(registry.get("empty").is_some());
		assert!(registry.get("#other").is_none());
	}
}
