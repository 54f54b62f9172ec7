//! Conversions between foreign graph documents and the widget's node/edge arrays.

mod bwdl;

use serde_json::Value;

use crate::error::Result;
use crate::types::GraphInput;

pub use bwdl::BwdlTransformer;

/// A two-way mapping between some JSON document and [`GraphInput`].
pub trait Transformer {
	fn transform(&self, input: &Value) -> Result<GraphInput>;

	fn revert(&self, graph: &GraphInput) -> Result<Value>;
}
