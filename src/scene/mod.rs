//! Scene reconciliation: keyed identity maps, a pure diff pass and the
//! engine that turns plans into container writes.

pub mod diff;
pub mod engine;
pub mod entity;
pub mod frames;
pub mod maps;
pub mod renderer;

pub use diff::{Change, ReconcilePlan, Selection, StaleNode};
pub use engine::{DraggedEdge, RenderJob, RenderStats, SceneEngine};
pub use entity::EntityId;
pub use maps::{EdgeMapEntry, IdentityMaps, NodeMap, NodeMapEntry};
pub use renderer::{EdgeVisual, MemoryRenderer, NodeVisual, RenderOp, SceneRenderer, Visual};
