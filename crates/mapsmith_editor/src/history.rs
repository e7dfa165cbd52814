//! Change-batch undo/redo
//!
//! History is an arena of immutable batches with a cursor. The cursor points
//! at the batch the next undo reverts; `None` means everything has been
//! undone (or nothing was ever recorded). Recording a new batch after an
//! undo discards every batch ahead of the cursor.

use bevy::log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;

use crate::assets::TileCatalog;
use crate::edge::recompute_edges;
use crate::error::{EditorError, EditorResult};
use crate::grid::{visited_neighborhood, Grid, GridPos, Map};
use crate::stroke::StrokeCell;
use crate::wall::recompute_walls;

/// Which layer of the grid a batch touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKind {
    Tile,
    Wall,
}

/// Before/after values of one cell. Wall changes leave the styles at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub pos: GridPos,
    pub old_key: u32,
    pub old_style: u32,
    pub new_key: u32,
    pub new_style: u32,
}

/// One committed gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub id: u64,
    pub kind: EditKind,
    pub changes: Vec<CellChange>,
    /// Cells whose decorations are recomputed when this batch is applied or reverted
    pub neighborhood: Vec<GridPos>,
}

impl ChangeBatch {
    /// Capture a batch for writing `stroke` into `grid`, before the write happens.
    ///
    /// For tile strokes the aux value is the new style; for wall strokes it
    /// is the new wall key and `key` is ignored.
    pub fn capture(
        id: u64,
        kind: EditKind,
        grid: &Grid,
        stroke: &[StrokeCell],
        key: u32,
    ) -> EditorResult<Self> {
        let mut changes = Vec::new();
        changes
            .try_reserve_exact(stroke.len())
            .map_err(|_| EditorError::HistoryAllocation { cells: stroke.len() })?;

        for cell in stroke {
            let Some(current) = grid.get(cell.pos) else {
                warn!("Stroke cell {:?} is outside the grid", cell.pos);
                continue;
            };
            let change = match kind {
                EditKind::Tile => CellChange {
                    pos: cell.pos,
                    old_key: current.tile_key,
                    old_style: current.tile_style,
                    new_key: key,
                    new_style: cell.aux,
                },
                EditKind::Wall => CellChange {
                    pos: cell.pos,
                    old_key: current.wall_key,
                    old_style: 0,
                    new_key: cell.aux,
                    new_style: 0,
                },
            };
            changes.push(change);
        }

        let neighborhood = visited_neighborhood(grid, changes.iter().map(|c| c.pos));
        Ok(Self {
            id,
            kind,
            changes,
            neighborhood,
        })
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Short label for menus and logs
    pub fn description(&self) -> String {
        let layer = match self.kind {
            EditKind::Tile => "tile",
            EditKind::Wall => "wall",
        };
        format!("Paint {} {}(s)", self.changes.len(), layer)
    }

    /// Write the old (`revert`) or new values into the map and refresh decorations
    fn write(&self, map: &mut Map, catalog: &TileCatalog, revert: bool) {
        let grid = map.grid_mut();
        for change in &self.changes {
            let Some(cell) = grid.get_mut(change.pos) else {
                continue;
            };
            let (key, style) = if revert {
                (change.old_key, change.old_style)
            } else {
                (change.new_key, change.new_style)
            };
            match self.kind {
                EditKind::Tile => {
                    cell.tile_key = key;
                    cell.tile_style = style;
                }
                EditKind::Wall => cell.wall_key = key,
            }
        }

        match self.kind {
            EditKind::Tile => recompute_edges(map, &self.neighborhood, catalog),
            EditKind::Wall => recompute_walls(map, &self.neighborhood, catalog),
        }
    }
}

/// Undo/redo history of committed gestures
#[derive(Debug, Clone)]
pub struct UndoHistory {
    batches: Vec<ChangeBatch>,
    cursor: Option<usize>,
    /// Oldest batches are dropped beyond this count; 0 keeps everything
    max_batches: usize,
    next_id: u64,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl UndoHistory {
    pub fn new(max_batches: usize) -> Self {
        Self {
            batches: Vec::new(),
            cursor: None,
            max_batches,
            next_id: 1,
        }
    }

    /// Id the next recorded batch should carry
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Append a batch after the cursor, discarding any redo tail.
    /// Returns the batch id.
    pub fn record(&mut self, batch: ChangeBatch) -> EditorResult<u64> {
        self.record_with(batch, |batches| batches.try_reserve(1))
    }

    /// [`record`](Self::record) with a caller-supplied reservation step.
    ///
    /// When `reserve` fails the history is left exactly as it was, redo
    /// tail included.
    pub fn record_with(
        &mut self,
        batch: ChangeBatch,
        reserve: impl FnOnce(&mut Vec<ChangeBatch>) -> Result<(), TryReserveError>,
    ) -> EditorResult<u64> {
        reserve(&mut self.batches)
            .map_err(|_| EditorError::HistoryAllocation { cells: batch.len() })?;

        let keep = self.cursor.map_or(0, |c| c + 1);
        if self.batches.len() > keep {
            debug!(
                "Discarding {} redo batch(es) after new edit",
                self.batches.len() - keep
            );
            self.batches.truncate(keep);
        }

        let id = batch.id;
        debug!("Recorded batch {}: {}", id, batch.description());
        self.batches.push(batch);
        self.cursor = Some(self.batches.len() - 1);
        self.next_id = self.next_id.max(id + 1);

        if self.max_batches > 0 && self.batches.len() > self.max_batches {
            let excess = self.batches.len() - self.max_batches;
            self.batches.drain(..excess);
            self.cursor = self.cursor.map(|c| c - excess);
            debug!("History full, dropped {} oldest batch(es)", excess);
        }

        Ok(id)
    }

    /// Revert the batch under the cursor.
    /// Returns true if a batch was undone.
    pub fn undo(&mut self, map: &mut Map, catalog: &TileCatalog) -> bool {
        let Some(index) = self.cursor else {
            return false;
        };
        let batch = &self.batches[index];
        batch.write(map, catalog, true);
        info!("Undo: {}", batch.description());
        self.cursor = index.checked_sub(1);
        true
    }

    /// Re-apply the batch after the cursor.
    /// Returns true if a batch was redone.
    pub fn redo(&mut self, map: &mut Map, catalog: &TileCatalog) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        let Some(batch) = self.batches.get(next) else {
            return false;
        };
        batch.write(map, catalog, false);
        info!("Redo: {}", batch.description());
        self.cursor = Some(next);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.batches.len()
    }

    /// The batch the next undo would revert
    pub fn current(&self) -> Option<&ChangeBatch> {
        self.cursor.and_then(|c| self.batches.get(c))
    }

    pub fn undo_description(&self) -> Option<String> {
        self.current().map(ChangeBatch::description)
    }

    /// The batch the next redo would re-apply
    pub fn peek_redo(&self) -> Option<&ChangeBatch> {
        self.batches.get(self.cursor.map_or(0, |c| c + 1))
    }

    pub fn redo_description(&self) -> Option<String> {
        self.peek_redo().map(ChangeBatch::description)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn max_batches(&self) -> usize {
        self.max_batches
    }

    pub fn clear(&mut self) {
        self.batches.clear();
        self.cursor = None;
    }
}
