//! # Mapsmith Editor
//!
//! Autotiling and undo/redo core for a grid-based tile-map editor.
//!
//! This crate provides:
//! - **Edge Resolution**: Border decorations where higher priority terrain meets lower
//! - **Wall Resolution**: Quadrant decorations for walls on shared cell corners
//! - **Stroke Orientation**: Post, corner and straight wall variants for box and path strokes
//! - **Stroke Accumulation**: Stable per-gesture cell sets with per-cell tile variants
//! - **Change Batches**: Undo/redo of whole gestures with neighborhood recompute
//! - **Bevy Plugin**: Hosts the session as a resource driven by [`EditRequest`] messages
//!
//! ## Example
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use mapsmith_editor::{EditorConfig, MapEditorPlugin, TileCatalog};
//!
//! fn main() {
//!     let config = EditorConfig::load_or_default(std::path::Path::new("editor.toml"));
//!     App::new()
//!         .add_plugins(MapEditorPlugin::new(config).with_catalog(TileCatalog::new()))
//!         .run();
//! }
//! ```

pub mod assets;
pub mod config;
pub mod context;
pub mod edge;
pub mod error;
pub mod grid;
pub mod history;
pub mod orientation;
pub mod path;
pub mod plugin;
pub mod stroke;
pub mod wall;

// Re-export commonly used types
pub use assets::{EdgeSet, TextureHandle, TileCatalog, TileKey, TileType, WallKey, WallType};
pub use config::EditorConfig;
pub use context::{CommitOutcome, DrawMode, DrawType, DrawingState, EditorContext, PreviewFrame};
pub use edge::{
    recompute_all_edges, recompute_edges, resolve_edge_slots, resolve_edges, EdgeDecoration,
    EdgeSlot,
};
pub use error::{EditorError, EditorResult};
pub use grid::{visited_neighborhood, Cell, Grid, GridPos, GridSnapshot, Map};
pub use history::{CellChange, ChangeBatch, EditKind, UndoHistory};
pub use orientation::{
    resolve_stroke_orientations, OrientationRule, OrientationRules, StrokeShape, WallOrientation,
};
pub use path::{
    box_cells, box_outline_cells, path_cells, DiagonalPriority, GridRect, PathMode, PathQuadrant,
    PathShape, PathTracker,
};
pub use plugin::{apply_edit_requests, DecorationsChanged, EditRequest, MapEditorPlugin};
pub use stroke::{StrokeAccumulator, StrokeBounds, StrokeCell};
pub use wall::{recompute_all_walls, recompute_walls, resolve_walls, WallDecoration, WallQuadrant};
