//! Geometry kernel: angles, path strings and line/shape intersections.
//!
//! Every intersection routine works on the segment `src -> trg` where `trg` is
//! the centre of the glyph being intersected. When a primitive reports several
//! crossings the first one in enumeration order wins.

use std::f64::consts::PI;

use svgtypes::{PathParser, PathSegment, TransformListParser, TransformListToken};

use crate::error::{Error, Result};
use crate::types::{Point, Size};

/// Angle of the vector `p1 -> p2` in radians. Absent points yield `0`.
pub fn theta(p1: Option<Point>, p2: Option<Point>) -> f64 {
	match (p1, p2) {
		(Some(p1), Some(p2)) => (p2.y - p1.y).atan2(p2.x - p1.x),
		_ => 0.0,
	}
}

pub fn degrees(radians: f64) -> f64 {
	radians * 180.0 / PI
}

pub fn radians(degrees: f64) -> f64 {
	degrees * PI / 180.0
}

/// Formats a number the way an ECMAScript `Number#toString` would.
pub fn fmt_number(mut v: f64, buf: &mut ryu_js::Buffer) -> &str {
	if !v.is_finite() {
		return "0";
	}
	if v == -0.0 {
		v = 0.0;
	}
	buf.format_finite(v)
}

/// `M{x0},{y0}L{x1},{y1}...` for a polyline.
pub fn line_string(points: &[Point]) -> String {
	let mut out = String::new();
	let mut buf = ryu_js::Buffer::new();
	for (i, p) in points.iter().enumerate() {
		out.push(if i == 0 { 'M' } else { 'L' });
		out.push_str(fmt_number(p.x, &mut buf));
		out.push(',');
		out.push_str(fmt_number(p.y, &mut buf));
	}
	out
}

/// `translate(x, y)` transform for a position.
pub fn translate(p: Point) -> String {
	let mut buf = ryu_js::Buffer::new();
	let x = fmt_number(p.x, &mut buf).to_owned();
	format!("translate({x}, {})", fmt_number(p.y, &mut buf))
}

/// Axis-aligned extent of a glyph of `size` centred on `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub left: f64,
	pub right: f64,
	pub top: f64,
	pub bottom: f64,
}

impl Bounds {
	pub fn centered(center: Point, size: Size) -> Self {
		Self {
			left: center.x - size.width / 2.0,
			right: center.x + size.width / 2.0,
			top: center.y - size.height / 2.0,
			bottom: center.y + size.height / 2.0,
		}
	}

	/// Strictly between left and right.
	pub fn spans_x(&self, x: f64) -> bool {
		x > self.left && x < self.right
	}

	/// Strictly between top and bottom.
	pub fn spans_y(&self, y: f64) -> bool {
		y > self.top && y < self.bottom
	}

	pub fn center(&self) -> Point {
		Point::new(self.left, self.top).lerp(Point::new(self.right, self.bottom), 0.5)
	}
}

/// Rotates `p` about `center` (SVG orientation, y axis pointing down).
pub fn rotate_about(p: Point, center: Point, angle: f64) -> Point {
	let (s, c) = angle.sin_cos();
	let e = center.x - center.x * c + center.y * s;
	let f = center.y - center.x * s - center.y * c;
	Point {
		x: c * p.x - s * p.y + e,
		y: s * p.x + c * p.y + f,
	}
}

/// Degrees of the first `rotate(..)` in an SVG transform list, `0` when there is none.
pub fn rotation_degrees(transform: &str) -> f64 {
	for token in TransformListParser::from(transform) {
		match token {
			Ok(TransformListToken::Rotate { angle }) => return angle,
			Ok(_) => continue,
			Err(_) => break,
		}
	}
	0.0
}

/// Crossing point of segments `a1-a2` and `b1-b2`. Parallel segments never cross.
pub fn intersect_line_line(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
	let ua_t = (b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x);
	let ub_t = (a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x);
	let u_b = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
	if u_b == 0.0 {
		return None;
	}
	let ua = ua_t / u_b;
	let ub = ub_t / u_b;
	if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
		Some(Point {
			x: a1.x + ua * (a2.x - a1.x),
			y: a1.y + ua * (a2.y - a1.y),
		})
	} else {
		None
	}
}

/// All crossings of `a1-a2` with a closed polygon, in edge order.
pub fn intersect_line_polygon(a1: Point, a2: Point, polygon: &[Point]) -> Vec<Point> {
	let n = polygon.len();
	if n < 2 {
		return Vec::new();
	}
	(0..n)
		.filter_map(|i| intersect_line_line(a1, a2, polygon[i], polygon[(i + 1) % n]))
		.collect()
}

/// All crossings of `a1-a2` with an axis-aligned ellipse, nearest to `a1` first.
pub fn intersect_line_ellipse(center: Point, rx: f64, ry: f64, a1: Point, a2: Point) -> Vec<Point> {
	let mut points = Vec::new();
	if rx <= 0.0 || ry <= 0.0 {
		return points;
	}
	let (dir_x, dir_y) = (a2.x - a1.x, a2.y - a1.y);
	let (diff_x, diff_y) = (a1.x - center.x, a1.y - center.y);
	let (m_dir_x, m_dir_y) = (dir_x / (rx * rx), dir_y / (ry * ry));
	let (m_diff_x, m_diff_y) = (diff_x / (rx * rx), diff_y / (ry * ry));

	let a = dir_x * m_dir_x + dir_y * m_dir_y;
	let b = dir_x * m_diff_x + dir_y * m_diff_y;
	let c = diff_x * m_diff_x + diff_y * m_diff_y - 1.0;
	if a == 0.0 {
		return points;
	}
	let d = b * b - a * c;
	let on_segment = |t: f64| (0.0..=1.0).contains(&t);

	if d > 0.0 {
		let root = d.sqrt();
		let t_a = (-b - root) / a;
		let t_b = (-b + root) / a;
		if on_segment(t_a) {
			points.push(a1.lerp(a2, t_a));
		}
		if on_segment(t_b) {
			points.push(a1.lerp(a2, t_b));
		}
	} else if d == 0.0 {
		let t = -b / a;
		if on_segment(t) {
			points.push(a1.lerp(a2, t));
		}
	}
	points
}

/// Rectangle of `size` centred on `trg`, rotated about its centre by
/// `rotation` degrees, intersected with `src -> trg`.
pub fn intersect_line_with_rotated_rect(size: Size, src: Point, trg: Point, rotation: f64) -> Option<Point> {
	let bounds = Bounds::centered(trg, size);
	let corners = [
		Point::new(bounds.left, bounds.top),
		Point::new(bounds.right, bounds.top),
		Point::new(bounds.right, bounds.bottom),
		Point::new(bounds.left, bounds.bottom),
	];
	let center = bounds.center();
	let angle = radians(rotation);
	let rotated: Vec<Point> = corners.iter().map(|&p| rotate_about(p, center, angle)).collect();

	intersect_line_polygon(src, trg, &rotated).into_iter().next()
}

/// A path outline reduced to straight segments, in the path's own coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathOutline {
	pub segments: Vec<(Point, Point)>,
}

impl PathOutline {
	/// Accepts move/line/horizontal/vertical/close commands, absolute or relative.
	pub fn parse(d: &str) -> Result<PathOutline> {
		let mut outline = PathOutline::default();
		let mut current = Point::ORIGIN;
		let mut subpath_start = Point::ORIGIN;

		for (i, segment) in PathParser::from(d).enumerate() {
			let segment = segment.map_err(|_| Error::PathData(d.to_owned()))?;
			if i == 0 && !matches!(segment, PathSegment::MoveTo { .. }) {
				return Err(Error::PathData(d.to_owned()));
			}
			let next = match segment {
				PathSegment::MoveTo { abs, x, y } => {
					current = relative_to(current, abs, x, y);
					subpath_start = current;
					continue;
				}
				PathSegment::LineTo { abs, x, y } => relative_to(current, abs, x, y),
				PathSegment::HorizontalLineTo { abs, x } => {
					Point::new(if abs { x } else { current.x + x }, current.y)
				}
				PathSegment::VerticalLineTo { abs, y } => {
					Point::new(current.x, if abs { y } else { current.y + y })
				}
				PathSegment::ClosePath { .. } => subpath_start,
				_ => return Err(Error::UnsupportedPathSegment(d.to_owned())),
			};
			if next != current {
				outline.segments.push((current, next));
			}
			current = next;
		}

		if outline.segments.is_empty() && !d.trim_start().starts_with(['M', 'm']) {
			return Err(Error::PathData(d.to_owned()));
		}
		Ok(outline)
	}

	/// Bounding size of all segment endpoints.
	pub fn bounding_size(&self) -> Size {
		let mut iter = self.segments.iter().flat_map(|(a, b)| [*a, *b]);
		let Some(first) = iter.next() else {
			return Size::default();
		};
		let (mut min, mut max) = (first, first);
		for p in iter {
			min = Point::new(min.x.min(p.x), min.y.min(p.y));
			max = Point::new(max.x.max(p.x), max.y.max(p.y));
		}
		Size::new(max.x - min.x, max.y - min.y)
	}

	pub fn translated(&self, dx: f64, dy: f64) -> PathOutline {
		let shift = |p: Point| Point::new(p.x + dx, p.y + dy);
		PathOutline {
			segments: self.segments.iter().map(|&(a, b)| (shift(a), shift(b))).collect(),
		}
	}
}

fn relative_to(current: Point, abs: bool, x: f64, y: f64) -> Point {
	if abs {
		Point::new(x, y)
	} else {
		Point::new(current.x + x, current.y + y)
	}
}

/// Path outline laid out in a box of `client` size centred on `trg`,
/// intersected with `src -> trg`.
pub fn intersect_line_with_path(outline: &PathOutline, client: Size, src: Point, trg: Point) -> Option<Point> {
	let bounds = Bounds::centered(trg, client);
	outline
		.translated(bounds.left, bounds.top)
		.segments
		.iter()
		.find_map(|&(b1, b2)| intersect_line_line(src, trg, b1, b2))
}

/// Ellipse with radii `rx`/`ry` centred on `center`, intersected with `src -> trg`.
pub fn intersect_line_with_ellipse(rx: f64, ry: f64, center: Point, src: Point, trg: Point) -> Option<Point> {
	intersect_line_ellipse(center, rx, ry, src, trg).into_iter().next()
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
	assert!(
		(actual - expected).abs() < 1e-9,
		"expected {expected}, got {actual}"
	);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn theta_of_coincident_points_is_zero() {
		let p = Point::new(3.0, 4.0);
		assert_eq!(theta(Some(p), Some(p)), 0.0);
		assert_eq!(theta(None, Some(p)), 0.0);
		assert_close(theta(Some(Point::ORIGIN), Some(Point::new(0.0, 5.0))), PI / 2.0);
	}

	#[test]
	fn line_string_matches_js_formatting() {
		let d = line_string(&[Point::new(10.0, 20.0), Point::new(100.0, 200.0)]);
		assert_eq!(d, "M10,20L100,200");

		let d = line_string(&[Point::new(-0.0, 1.5), Point::new(2.25, 3.0), Point::new(4.0, 5.0)]);
		assert_eq!(d, "M0,1.5L2.25,3L4,5");
	}

	#[test]
	fn rotation_reads_first_rotate_token() {
		assert_eq!(rotation_degrees("rotate(45)"), 45.0);
		assert_eq!(rotation_degrees("translate(2, 3) rotate(-30)"), -30.0);
		assert_eq!(rotation_degrees("scale(2)"), 0.0);
		assert_eq!(rotation_degrees(""), 0.0);
	}

	#[test]
	fn unrotated_rect_corner_hit() {
		let hit = intersect_line_with_rotated_rect(
			Size::square(10.0),
			Point::new(5.0, 10.0),
			Point::new(15.0, 20.0),
			0.0,
		)
		.unwrap();
		assert_eq!(hit, Point::new(10.0, 15.0));
	}

	#[test]
	fn rect_rotated_45_degrees() {
		let hit = intersect_line_with_rotated_rect(
			Size::square(10.0),
			Point::new(5.0, 10.0),
			Point::new(15.0, 20.0),
			45.0,
		)
		.unwrap();
		assert_close(hit.x, 11.464466094067264);
		assert_close(hit.y, 16.464466094067262);
	}

	#[test]
	fn degenerate_segment_has_no_hit() {
		let hit = intersect_line_with_rotated_rect(Size::square(10.0), Point::ORIGIN, Point::ORIGIN, 0.0);
		assert!(hit.is_none());
		assert!(intersect_line_with_ellipse(5.0, 5.0, Point::ORIGIN, Point::ORIGIN, Point::ORIGIN).is_none());
	}

	#[test]
	fn parses_implicit_line_to_after_move() {
		let outline = PathOutline::parse("M 0 0 10 0 10 10 0 10 Z").unwrap();
		assert_eq!(outline.segments.len(), 4);
		assert_eq!(outline.bounding_size(), Size::square(10.0));

		let relative = PathOutline::parse("m0,0 h10 v10 h-10 z").unwrap();
		assert_eq!(relative, outline);
	}

	#[test]
	fn rejects_paths_without_leading_move() {
		assert!(matches!(PathOutline::parse("L 0 0 10 10"), Err(Error::PathData(_))));
		assert!(matches!(PathOutline::parse(""), Err(Error::PathData(_))));
		assert!(matches!(
			PathOutline::parse("M0,0 C1,1 2,2 3,3"),
			Err(Error::UnsupportedPathSegment(_))
		));
	}

	#[test]
	fn path_hit_is_offset_into_target_space() {
		let outline = PathOutline::parse("M 0 0 10 0 10 10 0 10 Z").unwrap();
		let hit = intersect_line_with_path(&outline, Size::square(10.0), Point::new(5.0, 20.0), Point::new(15.0, 20.0));
		assert_eq!(hit, Some(Point::new(10.0, 20.0)));
	}

	#[test]
	fn ellipse_hit_nearest_source() {
		let hit = intersect_line_with_ellipse(5.0, 5.0, Point::new(15.0, 20.0), Point::new(5.0, 20.0), Point::new(15.0, 20.0))
			.unwrap();
		assert_close(hit.x, 10.0);
		assert_close(hit.y, 20.0);

		let through = intersect_line_ellipse(Point::ORIGIN, 2.0, 1.0, Point::new(-4.0, 0.0), Point::new(4.0, 0.0));
		assert_eq!(through.len(), 2);
		assert_close(through[0].x, -2.0);
		assert_close(through[1].x, 2.0);
	}
}
