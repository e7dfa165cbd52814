//! The editing session: map, assets, history and the gesture in progress

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::TryReserveError;
use std::ops::Range;

use crate::assets::{TileCatalog, TileKey, WallKey};
use crate::config::{EditorConfig, MAX_GRID_SIZE};
use crate::edge::{recompute_all_edges, recompute_edges, resolve_edges_into, EdgeDecoration};
use crate::error::{EditorError, EditorResult};
use crate::grid::{visited_neighborhood, Grid, GridPos, GridSnapshot, Map};
use crate::history::{ChangeBatch, EditKind, UndoHistory};
use crate::orientation::{resolve_stroke_orientations, OrientationRules, StrokeShape};
use crate::path::{box_cells, box_outline_cells, path_cells, GridRect, PathShape, PathTracker};
use crate::stroke::StrokeAccumulator;
use crate::wall::{recompute_all_walls, recompute_walls, resolve_walls_into, WallDecoration};

/// What the active gesture paints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawType {
    #[default]
    Tile,
    Wall,
}

impl DrawType {
    pub fn edit_kind(self) -> EditKind {
        match self {
            DrawType::Tile => EditKind::Tile,
            DrawType::Wall => EditKind::Wall,
        }
    }
}

/// How the gesture turns pointer positions into cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Every cell the pointer passes over
    #[default]
    Painter,
    /// A single-bend path from the press position to the pointer
    Path,
    /// Area fill for tiles, outline for walls
    Box,
}

#[derive(Debug, Clone, Default)]
pub struct DrawingState {
    pub draw_type: DrawType,
    pub mode: DrawMode,
    pub active_tile: TileKey,
    pub active_wall: WallKey,
    /// Cell where the gesture was pressed
    pub start: Option<GridPos>,
    /// Cell under the pointer
    pub cursor: Option<GridPos>,
    pub is_drawing: bool,
    pub path: PathTracker,
}

/// Result of releasing a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Grid updated and undoable through the batch with this id
    Recorded(u64),
    /// Grid updated, but the history entry could not be stored
    Untracked,
    /// Nothing to commit
    Empty,
}

impl CommitOutcome {
    pub fn changed_grid(&self) -> bool {
        !matches!(self, CommitOutcome::Empty)
    }
}

/// Decorations of one cell in the preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewCell {
    pub pos: GridPos,
    edges: Range<usize>,
    walls: Range<usize>,
}

/// What the map would look like if the stroke were committed now.
///
/// Built on an overlay copy of the grid. Buffers are reused between frames.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    overlay: Grid,
    cells: Vec<PreviewCell>,
    edges: Vec<EdgeDecoration>,
    walls: Vec<WallDecoration>,
    edge_scratch: Vec<EdgeDecoration>,
    wall_scratch: Vec<WallDecoration>,
}

impl PreviewFrame {
    fn new(size: u32) -> Self {
        Self {
            overlay: Grid::new(size),
            cells: Vec::new(),
            edges: Vec::new(),
            walls: Vec::new(),
            edge_scratch: Vec::new(),
            wall_scratch: Vec::new(),
        }
    }

    /// The grid with the stroke written in
    pub fn grid(&self) -> &Grid {
        &self.overlay
    }

    /// The stroke cells and their neighbors, with resolved decorations
    pub fn cells(&self) -> &[PreviewCell] {
        &self.cells
    }

    pub fn edges_of(&self, cell: &PreviewCell) -> &[EdgeDecoration] {
        &self.edges[cell.edges.clone()]
    }

    pub fn walls_of(&self, cell: &PreviewCell) -> &[WallDecoration] {
        &self.walls[cell.walls.clone()]
    }

    pub fn edge_decorations(&self, pos: GridPos) -> &[EdgeDecoration] {
        self.cells
            .iter()
            .find(|c| c.pos == pos)
            .map(|c| self.edges_of(c))
            .unwrap_or(&[])
    }

    pub fn wall_decorations(&self, pos: GridPos) -> &[WallDecoration] {
        self.cells
            .iter()
            .find(|c| c.pos == pos)
            .map(|c| self.walls_of(c))
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Everything one editing session owns. Engines receive pieces of it by
/// reference; nothing here is global.
#[derive(Resource)]
pub struct EditorContext {
    map: Map,
    catalog: TileCatalog,
    rules: OrientationRules,
    history: UndoHistory,
    drawing: DrawingState,
    stroke: StrokeAccumulator,
    preview: PreviewFrame,
    rng: StdRng,
    scratch: Vec<GridPos>,
    touched: Vec<GridPos>,
}

impl EditorContext {
    pub fn new(config: &EditorConfig, catalog: TileCatalog, rules: OrientationRules) -> Self {
        let size = config.grid.size.clamp(1, MAX_GRID_SIZE);
        if size != config.grid.size {
            warn!(
                "grid.size {} is outside 1..={}, using {}",
                config.grid.size, MAX_GRID_SIZE, size
            );
        }
        let rng = match config.drawing.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let drawing = DrawingState {
            active_tile: config.drawing.default_tile,
            active_wall: config.drawing.default_wall,
            ..Default::default()
        };

        let mut ctx = Self {
            map: Map::new("untitled", size),
            catalog,
            rules,
            history: UndoHistory::new(config.history.max_batches),
            drawing,
            stroke: StrokeAccumulator::new(),
            preview: PreviewFrame::new(size),
            rng,
            scratch: Vec::new(),
            touched: Vec::new(),
        };
        ctx.recompute_all();
        info!("Editor session started on a {}x{} grid", size, size);
        ctx
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &OrientationRules {
        &self.rules
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn stroke(&self) -> &StrokeAccumulator {
        &self.stroke
    }

    /// Cells whose decorations changed in the last commit, undo or redo
    pub fn touched(&self) -> &[GridPos] {
        &self.touched
    }

    /// Swap in new asset metadata and rebuild every decoration
    pub fn set_catalog(&mut self, catalog: TileCatalog) {
        self.catalog = catalog;
        self.recompute_all();
    }

    pub fn set_rules(&mut self, rules: OrientationRules) {
        self.rules = rules;
    }

    /// Make `key` the active tile; 0 erases ground.
    ///
    /// A gesture in progress is cancelled, since its cells were built for
    /// the previous selection.
    pub fn select_tile(&mut self, key: TileKey) -> EditorResult<()> {
        if key != 0 && !self.catalog.has_tile(key) {
            warn!("Ignoring selection of unknown tile {}", key);
            return Err(EditorError::UnknownKey { kind: "tile", key });
        }
        self.cancel_stroke();
        self.drawing.active_tile = key;
        self.drawing.draw_type = DrawType::Tile;
        Ok(())
    }

    /// Make `key` the active wall; 0 erases walls. Cancels any gesture in progress.
    pub fn select_wall(&mut self, key: WallKey) -> EditorResult<()> {
        if key != 0 && !self.catalog.has_wall(key) {
            warn!("Ignoring selection of unknown wall {}", key);
            return Err(EditorError::UnknownKey { kind: "wall", key });
        }
        self.cancel_stroke();
        self.drawing.active_wall = key;
        self.drawing.draw_type = DrawType::Wall;
        Ok(())
    }

    /// Press: start a gesture at `pos`, clamped onto the grid
    pub fn begin_stroke(&mut self, pos: GridPos, mode: DrawMode) {
        if self.drawing.is_drawing {
            self.cancel_stroke();
        }
        let start = self.map.grid().clamp(pos);
        self.drawing.mode = mode;
        self.drawing.start = Some(start);
        self.drawing.cursor = Some(start);
        self.drawing.is_drawing = true;
        self.drawing.path.reset();
        self.stroke.clear();
        debug!("Stroke started at {:?} in {:?} mode", start, mode);
        self.update_stroke(pos);
    }

    /// Drag: move the gesture end to `pos` and refresh the stroke cells
    pub fn update_stroke(&mut self, pos: GridPos) {
        if !self.drawing.is_drawing {
            return;
        }
        let Some(start) = self.drawing.start else {
            return;
        };
        let end = self.map.grid().clamp(pos);
        self.drawing.cursor = Some(end);
        let rect = GridRect::new(start, end);

        let Self {
            catalog,
            drawing,
            stroke,
            rng,
            scratch,
            rules,
            ..
        } = self;

        let draw_type = drawing.draw_type;
        let active_tile = drawing.active_tile;
        let active_wall = drawing.active_wall;
        let variants = catalog.variant_count(active_tile);
        let mut aux_gen = |_: GridPos| -> u32 {
            match draw_type {
                DrawType::Tile if variants > 0 => rng.gen_range(0..variants) as u32,
                DrawType::Tile => 0,
                DrawType::Wall => active_wall,
            }
        };

        let shape = match drawing.mode {
            DrawMode::Painter => {
                stroke.push(end, &mut aux_gen);
                StrokeShape::Painter
            }
            DrawMode::Box => {
                match draw_type {
                    DrawType::Tile => box_cells(rect, scratch),
                    DrawType::Wall => box_outline_cells(rect, scratch),
                }
                stroke.update(scratch, &mut aux_gen);
                StrokeShape::Box
            }
            DrawMode::Path => {
                let path: PathShape = drawing.path.track(rect);
                path_cells(rect, path.diagonal_priority, scratch);
                stroke.update(scratch, &mut aux_gen);
                StrokeShape::Path(path)
            }
        };

        if draw_type == DrawType::Wall {
            resolve_stroke_orientations(stroke.cells_mut(), shape, rules, active_wall);
        }
    }

    /// Rebuild the preview of the stroke in progress
    pub fn preview(&mut self) -> &PreviewFrame {
        let preview = &mut self.preview;
        preview.overlay.copy_from(self.map.grid());
        preview.cells.clear();
        preview.edges.clear();
        preview.walls.clear();

        if !self.drawing.is_drawing || self.stroke.is_empty() {
            return &self.preview;
        }

        write_stroke(
            &mut preview.overlay,
            &self.stroke,
            self.drawing.draw_type,
            self.drawing.active_tile,
        );

        for pos in visited_neighborhood(&preview.overlay, self.stroke.positions()) {
            resolve_edges_into(&preview.overlay, pos, &self.catalog, &mut preview.edge_scratch);
            resolve_walls_into(&preview.overlay, pos, &self.catalog, &mut preview.wall_scratch);

            let edges = preview.edges.len()..preview.edges.len() + preview.edge_scratch.len();
            let walls = preview.walls.len()..preview.walls.len() + preview.wall_scratch.len();
            preview.edges.extend_from_slice(&preview.edge_scratch);
            preview.walls.extend_from_slice(&preview.wall_scratch);
            preview.cells.push(PreviewCell { pos, edges, walls });
        }

        &self.preview
    }

    /// Release: write the stroke into the map and record it for undo
    pub fn commit_stroke(&mut self) -> CommitOutcome {
        self.commit_stroke_with(|batches| batches.try_reserve(1))
    }

    fn commit_stroke_with(
        &mut self,
        reserve: impl FnOnce(&mut Vec<ChangeBatch>) -> Result<(), TryReserveError>,
    ) -> CommitOutcome {
        if !self.drawing.is_drawing {
            return CommitOutcome::Empty;
        }
        self.drawing.is_drawing = false;
        self.drawing.start = None;
        self.drawing.path.reset();

        if self.stroke.is_empty() {
            return CommitOutcome::Empty;
        }

        let draw_type = self.drawing.draw_type;
        let kind = draw_type.edit_kind();
        let batch = ChangeBatch::capture(
            self.history.next_id(),
            kind,
            self.map.grid(),
            self.stroke.cells(),
            self.drawing.active_tile,
        );

        write_stroke(
            self.map.grid_mut(),
            &self.stroke,
            draw_type,
            self.drawing.active_tile,
        );

        self.touched = match &batch {
            Ok(batch) => batch.neighborhood.clone(),
            Err(_) => visited_neighborhood(self.map.grid(), self.stroke.positions()),
        };
        match kind {
            EditKind::Tile => recompute_edges(&mut self.map, &self.touched, &self.catalog),
            EditKind::Wall => recompute_walls(&mut self.map, &self.touched, &self.catalog),
        }
        self.stroke.clear();

        match batch.and_then(|batch| self.history.record_with(batch, reserve)) {
            Ok(id) => CommitOutcome::Recorded(id),
            Err(e) => {
                warn!("{}; edit applied without undo history", e);
                CommitOutcome::Untracked
            }
        }
    }

    /// Drop the gesture in progress; the map is left untouched
    pub fn cancel_stroke(&mut self) {
        if self.drawing.is_drawing {
            debug!("Stroke cancelled with {} cell(s)", self.stroke.len());
        }
        self.drawing.is_drawing = false;
        self.drawing.start = None;
        self.drawing.path.reset();
        self.stroke.clear();
    }

    /// Returns true if an edit was undone
    pub fn undo(&mut self) -> bool {
        self.cancel_stroke();
        let Some(batch) = self.history.current() else {
            return false;
        };
        self.touched.clone_from(&batch.neighborhood);
        self.history.undo(&mut self.map, &self.catalog)
    }

    /// Returns true if an edit was redone
    pub fn redo(&mut self) -> bool {
        self.cancel_stroke();
        let Some(batch) = self.history.peek_redo() else {
            return false;
        };
        self.touched.clone_from(&batch.neighborhood);
        self.history.redo(&mut self.map, &self.catalog)
    }

    /// Replace the grid contents. History is cleared since its batches no
    /// longer describe this grid.
    pub fn load_snapshot(&mut self, snapshot: &GridSnapshot) -> EditorResult<()> {
        let mut map = Map::from_snapshot(self.map.name.clone(), snapshot)?;
        map.id = self.map.id;
        self.cancel_stroke();
        self.map = map;
        self.history.clear();
        self.touched.clear();
        self.recompute_all();
        info!("Loaded {}x{} grid snapshot", snapshot.size, snapshot.size);
        Ok(())
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.map.snapshot()
    }

    /// Rebuild every edge and wall cache from the grid
    pub fn recompute_all(&mut self) {
        recompute_all_edges(&mut self.map, &self.catalog);
        recompute_all_walls(&mut self.map, &self.catalog);
    }
}

/// Apply stroke cells to a grid: tile key plus style, or the resolved wall key
fn write_stroke(grid: &mut Grid, stroke: &StrokeAccumulator, draw_type: DrawType, tile: TileKey) {
    for cell in stroke.cells() {
        let Some(target) = grid.get_mut(cell.pos) else {
            continue;
        };
        match draw_type {
            DrawType::Tile => {
                target.tile_key = tile;
                target.tile_style = cell.aux;
            }
            DrawType::Wall => target.wall_key = cell.aux,
        }
    }
}
