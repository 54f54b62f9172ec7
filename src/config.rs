//! Widget configuration: sizes, type-to-glyph mapping and layout choice.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::edge_path::EdgeOptions;
use crate::error::Result;
use crate::glyph::{GlyphDef, GlyphRegistry};
use crate::types::Size;

/// Maps a node/edge `type` string to the glyph drawn for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConfig {
	#[serde(default)]
	pub type_text: String,
	pub shape_id: String,
}

impl TypeConfig {
	pub fn new(type_text: impl Into<String>, shape_id: impl Into<String>) -> Self {
		Self {
			type_text: type_text.into(),
			shape_id: shape_id.into(),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutEngineType {
	#[default]
	None,
	SnapToGrid,
	Force,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphConfig {
	/// Field of a node holding its identity.
	pub node_key: String,
	pub node_size: f64,
	pub edge_handle_size: f64,
	pub edge_arrow_size: f64,
	/// Explicit rendered arrowhead size; defaults to a square of `edge_arrow_size`.
	pub arrow: Option<Size>,
	pub rotate_edge_handle: bool,
	/// Mirrors the handle angle, for hosts whose y axis points up.
	pub negate_edge_handle_rotation: bool,
	pub grid_spacing: f64,
	pub layout_engine_type: LayoutEngineType,
	pub node_types: IndexMap<String, TypeConfig>,
	pub node_subtypes: IndexMap<String, TypeConfig>,
	pub edge_types: IndexMap<String, TypeConfig>,
	/// Type used for nodes whose own type is unknown.
	pub empty_node_type: String,
	pub glyphs: Vec<GlyphDef>,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			node_key: "id".to_owned(),
			node_size: 154.0,
			edge_handle_size: 50.0,
			edge_arrow_size: 8.0,
			arrow: None,
			rotate_edge_handle: true,
			negate_edge_handle_rotation: false,
			grid_spacing: 36.0,
			layout_engine_type: LayoutEngineType::None,
			node_types: IndexMap::new(),
			node_subtypes: IndexMap::new(),
			edge_types: IndexMap::new(),
			empty_node_type: "emptyNode".to_owned(),
			glyphs: Vec::new(),
		}
	}
}

impl GraphConfig {
	pub fn from_json(json: &str) -> Result<GraphConfig> {
		Ok(serde_json::from_str(json)?)
	}

	/// Primary glyph reference for a node type, falling back to the empty node type.
	pub fn node_href(&self, node_type: Option<&str>) -> Option<String> {
		node_type
			.and_then(|t| self.node_types.get(t))
			.or_else(|| self.node_types.get(&self.empty_node_type))
			.map(|t| t.shape_id.clone())
	}

	pub fn subtype_href(&self, subtype: Option<&str>) -> Option<String> {
		subtype
			.and_then(|t| self.node_subtypes.get(t))
			.map(|t| t.shape_id.clone())
	}

	pub fn edge_href(&self, edge_type: Option<&str>) -> Option<String> {
		edge_type
			.and_then(|t| self.edge_types.get(t))
			.map(|t| t.shape_id.clone())
	}

	pub fn arrow_size(&self) -> Size {
		self.arrow.unwrap_or(Size::square(self.edge_arrow_size))
	}

	pub fn edge_options(&self) -> EdgeOptions {
		EdgeOptions {
			node_size: self.node_size,
			handle_size: self.edge_handle_size,
			rotate_handle: self.rotate_edge_handle,
			negate_rotation: self.negate_edge_handle_rotation,
		}
	}

	pub fn glyph_registry(&self) -> GlyphRegistry {
		let mut registry = GlyphRegistry::new(self.arrow_size());
		for glyph in &self.glyphs {
			registry.insert(glyph.clone());
		}
		registry
	}
}
