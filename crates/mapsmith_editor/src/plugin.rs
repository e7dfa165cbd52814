//! Bevy integration: hosts the [`EditorContext`] and feeds it input requests

use bevy::prelude::*;

use crate::assets::{TileCatalog, TileKey, WallKey};
use crate::config::EditorConfig;
use crate::context::{DrawMode, EditorContext};
use crate::grid::GridPos;
use crate::orientation::OrientationRules;

/// Requests from the input side, applied in order each frame
#[derive(Event, Message, Debug, Clone, PartialEq, Eq)]
pub enum EditRequest {
    SelectTile(TileKey),
    SelectWall(WallKey),
    /// Pointer pressed over `pos`
    BeginStroke { pos: GridPos, mode: DrawMode },
    /// Pointer dragged over `pos`
    MoveStroke { pos: GridPos },
    /// Pointer released; commit the stroke
    ReleaseStroke,
    /// Focus lost or escape pressed
    CancelStroke,
    Undo,
    Redo,
}

/// Emitted when the map's decoration caches changed for `cells`
#[derive(Event, Message, Debug, Clone, PartialEq, Eq)]
pub struct DecorationsChanged {
    pub cells: Vec<GridPos>,
}

/// Plugin that owns the editing session
#[derive(Default)]
pub struct MapEditorPlugin {
    pub config: EditorConfig,
    pub catalog: TileCatalog,
    pub rules: OrientationRules,
}

impl MapEditorPlugin {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_catalog(mut self, catalog: TileCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_rules(mut self, rules: OrientationRules) -> Self {
        self.rules = rules;
        self
    }
}

impl Plugin for MapEditorPlugin {
    fn build(&self, app: &mut App) {
        let context = EditorContext::new(&self.config, self.catalog.clone(), self.rules.clone());
        app.insert_resource(self.config.clone())
            .insert_resource(context)
            .add_message::<EditRequest>()
            .add_message::<DecorationsChanged>()
            .add_systems(Update, apply_edit_requests);
    }
}

/// Apply queued edit requests to the session
pub fn apply_edit_requests(
    mut requests: MessageReader<EditRequest>,
    mut context: ResMut<EditorContext>,
    mut changed: MessageWriter<DecorationsChanged>,
) {
    for request in requests.read() {
        let grid_changed = match *request {
            EditRequest::SelectTile(key) => {
                // Rejections are already logged by the context
                let _ = context.select_tile(key);
                false
            }
            EditRequest::SelectWall(key) => {
                let _ = context.select_wall(key);
                false
            }
            EditRequest::BeginStroke { pos, mode } => {
                context.begin_stroke(pos, mode);
                false
            }
            EditRequest::MoveStroke { pos } => {
                context.update_stroke(pos);
                false
            }
            EditRequest::ReleaseStroke => context.commit_stroke().changed_grid(),
            EditRequest::CancelStroke => {
                context.cancel_stroke();
                false
            }
            EditRequest::Undo => context.undo(),
            EditRequest::Redo => context.redo(),
        };

        if grid_changed {
            changed.write(DecorationsChanged {
                cells: context.touched().to_vec(),
            });
        }
    }
}
