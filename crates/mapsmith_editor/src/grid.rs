//! Grid store: authoritative cell contents plus derived decoration caches

use bevy::log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

use crate::assets::{TileKey, WallKey};
use crate::config::MAX_GRID_SIZE;
use crate::edge::EdgeDecoration;
use crate::error::{EditorError, EditorResult};
use crate::wall::WallDecoration;

/// Offsets of the 8 surrounding cells: N, E, S, W, NW, NE, SW, SE
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Cell coordinate. Signed so neighbor arithmetic can step off the grid and
/// be rejected by [`Grid::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Content of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// 0 = empty ground
    pub tile_key: TileKey,
    pub tile_style: u32,
    /// 0 = no wall
    pub wall_key: WallKey,
}

/// The square array of cell triples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(size: u32) -> Self {
        let len = (size as usize) * (size as usize);
        Self {
            size,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.size && (pos.y as u32) < self.size
    }

    /// Flat index of an in-bounds position
    pub fn index(&self, pos: GridPos) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.size as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: GridPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        let i = self.index(pos)?;
        Some(&mut self.cells[i])
    }

    pub fn tile_key(&self, pos: GridPos) -> Option<TileKey> {
        self.get(pos).map(|c| c.tile_key)
    }

    pub fn wall_key(&self, pos: GridPos) -> Option<WallKey> {
        self.get(pos).map(|c| c.wall_key)
    }

    /// Write a cell, rejecting out-of-range coordinates
    pub fn set(&mut self, pos: GridPos, cell: Cell) -> EditorResult<()> {
        let size = self.size;
        let slot = self.get_mut(pos).ok_or(EditorError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            size,
        })?;
        *slot = cell;
        Ok(())
    }

    /// Clamp a raw pointer-derived position onto the grid
    pub fn clamp(&self, pos: GridPos) -> GridPos {
        let max = (self.size as i32 - 1).max(0);
        GridPos::new(pos.x.clamp(0, max), pos.y.clamp(0, max))
    }

    /// In-bounds neighbors in [`NEIGHBOR_OFFSETS`] order
    pub fn neighbors8(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| pos.offset(dx, dy))
            .filter(move |p| self.contains(*p))
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let size = self.size as i32;
        (0..size).flat_map(move |y| (0..size).map(move |x| GridPos::new(x, y)))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Overwrite this grid with `other`, reusing the cell buffer
    pub fn copy_from(&mut self, other: &Grid) {
        self.size = other.size;
        self.cells.clone_from(&other.cells);
    }
}

/// Stroke cells followed by every in-bounds 8-neighbor, deduplicated.
///
/// This is the set whose decorations must be recomputed after an edit.
pub fn visited_neighborhood(grid: &Grid, cells: impl IntoIterator<Item = GridPos>) -> Vec<GridPos> {
    let cells: Vec<GridPos> = cells.into_iter().filter(|p| grid.contains(*p)).collect();
    let mut seen: HashSet<GridPos> = HashSet::with_capacity(cells.len() * 3);
    let mut visited = Vec::with_capacity(cells.len() * 3);

    for &pos in &cells {
        if seen.insert(pos) {
            visited.push(pos);
        }
    }
    for &pos in &cells {
        for neighbor in grid.neighbors8(pos) {
            if seen.insert(neighbor) {
                visited.push(neighbor);
            }
        }
    }

    visited
}

/// A map: the grid plus the decoration caches consumed by the renderer
#[derive(Debug, Clone)]
pub struct Map {
    pub id: Uuid,
    pub name: String,
    grid: Grid,
    edges: Vec<Vec<EdgeDecoration>>,
    walls: Vec<Vec<WallDecoration>>,
}

impl Map {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        let grid = Grid::new(size);
        let len = grid.cells.len();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            grid,
            edges: vec![Vec::new(); len],
            walls: vec![Vec::new(); len],
        }
    }

    pub fn size(&self) -> u32 {
        self.grid.size
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access. Callers must recompute decorations for whatever
    /// they change; the edit paths in this crate do so already.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn edge_decorations(&self, pos: GridPos) -> &[EdgeDecoration] {
        self.grid
            .index(pos)
            .map(|i| self.edges[i].as_slice())
            .unwrap_or(&[])
    }

    pub fn edge_count(&self, pos: GridPos) -> usize {
        self.edge_decorations(pos).len()
    }

    pub fn wall_decorations(&self, pos: GridPos) -> &[WallDecoration] {
        self.grid
            .index(pos)
            .map(|i| self.walls[i].as_slice())
            .unwrap_or(&[])
    }

    pub fn wall_count(&self, pos: GridPos) -> usize {
        self.wall_decorations(pos).len()
    }

    /// Replace a cell's edge cache, reusing its buffer
    pub fn set_edge_decorations(&mut self, pos: GridPos, decorations: &[EdgeDecoration]) {
        if let Some(i) = self.grid.index(pos) {
            let slot = &mut self.edges[i];
            slot.clear();
            slot.extend_from_slice(decorations);
        }
    }

    pub fn set_wall_decorations(&mut self, pos: GridPos, decorations: &[WallDecoration]) {
        if let Some(i) = self.grid.index(pos) {
            let slot = &mut self.walls[i];
            slot.clear();
            slot.extend_from_slice(decorations);
        }
    }

    pub fn clear_decorations(&mut self) {
        self.edges.iter_mut().for_each(Vec::clear);
        self.walls.iter_mut().for_each(Vec::clear);
    }

    /// Build a map from a snapshot. Decoration caches start empty; run
    /// a full recompute before rendering.
    pub fn from_snapshot(name: impl Into<String>, snapshot: &GridSnapshot) -> EditorResult<Self> {
        snapshot.validate()?;
        let mut map = Map::new(name, snapshot.size);
        map.grid.cells.copy_from_slice(&snapshot.cells);
        Ok(map)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            size: self.grid.size,
            cells: self.grid.cells.clone(),
        }
    }

    /// Overwrite grid contents in place from a snapshot of the same size
    pub fn restore(&mut self, snapshot: &GridSnapshot) -> EditorResult<()> {
        snapshot.validate()?;
        if snapshot.size != self.grid.size {
            return Err(EditorError::SnapshotSize {
                expected: self.grid.cells.len(),
                actual: snapshot.cells.len(),
            });
        }
        self.grid.cells.copy_from_slice(&snapshot.cells);
        self.clear_decorations();
        Ok(())
    }
}

/// Raw grid contents handed to and from the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub size: u32,
    /// Row-major cell triples, `y * size + x`
    pub cells: Vec<Cell>,
}

impl GridSnapshot {
    pub fn validate(&self) -> EditorResult<()> {
        if !(1..=MAX_GRID_SIZE).contains(&self.size) {
            return Err(EditorError::GridSize { size: self.size });
        }
        let expected = (self.size as usize) * (self.size as usize);
        if self.cells.len() != expected {
            return Err(EditorError::SnapshotSize {
                expected,
                actual: self.cells.len(),
            });
        }
        Ok(())
    }

    pub fn load_json(path: &Path) -> EditorResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EditorError::IoError(e.to_string()))?;
        let snapshot: GridSnapshot =
            serde_json::from_str(&content).map_err(|e| EditorError::ParseError(e.to_string()))?;
        if let Err(e) = snapshot.validate() {
            warn!("Rejecting snapshot {}: {}", path.display(), e);
            return Err(e);
        }
        Ok(snapshot)
    }

    pub fn save_json(&self, path: &Path) -> EditorResult<()> {
        let content = serde_json::to_string(self)
            .map_err(|e| EditorError::SerializeError(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| EditorError::IoError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_rejects_out_of_range() {
        let grid = Grid::new(4);
        assert_eq!(grid.index(GridPos::new(3, 3)), Some(15));
        assert_eq!(grid.index(GridPos::new(4, 0)), None);
        assert_eq!(grid.index(GridPos::new(0, -1)), None);
    }

    #[test]
    fn test_set_out_of_bounds_is_error() {
        let mut grid = Grid::new(4);
        let err = grid.set(GridPos::new(-1, 2), Cell::default()).unwrap_err();
        assert_eq!(err, EditorError::OutOfBounds { x: -1, y: 2, size: 4 });
    }

    #[test]
    fn test_clamp() {
        let grid = Grid::new(16);
        assert_eq!(grid.clamp(GridPos::new(-3, 20)), GridPos::new(0, 15));
        assert_eq!(grid.clamp(GridPos::new(5, 6)), GridPos::new(5, 6));
    }

    #[test]
    fn test_neighbors_skip_boundary() {
        let grid = Grid::new(4);
        assert_eq!(grid.neighbors8(GridPos::new(0, 0)).count(), 3);
        assert_eq!(grid.neighbors8(GridPos::new(1, 1)).count(), 8);
    }

    #[test]
    fn test_visited_neighborhood_dedups() {
        let grid = Grid::new(8);
        let visited = visited_neighborhood(&grid, [GridPos::new(2, 2), GridPos::new(3, 2)]);

        // Two adjacent cells cover a 4x3 block
        assert_eq!(visited.len(), 12);
        assert_eq!(visited[0], GridPos::new(2, 2));
        assert_eq!(visited[1], GridPos::new(3, 2));
        let unique: HashSet<_> = visited.iter().collect();
        assert_eq!(unique.len(), visited.len());
    }

    #[test]
    fn test_visited_neighborhood_corner() {
        let grid = Grid::new(8);
        let visited = visited_neighborhood(&grid, [GridPos::new(0, 0)]);
        assert_eq!(visited.len(), 4);
    }

    #[test]
    fn test_snapshot_size_mismatch() {
        let snapshot = GridSnapshot { size: 4, cells: vec![Cell::default(); 3] };
        assert!(matches!(
            Map::from_snapshot("bad", &snapshot),
            Err(EditorError::SnapshotSize { expected: 16, actual: 3 })
        ));
    }

    #[test]
    fn test_snapshot_rejects_empty_and_oversized_grids() {
        let empty = GridSnapshot { size: 0, cells: Vec::new() };
        assert_eq!(empty.validate(), Err(EditorError::GridSize { size: 0 }));
        assert!(Map::from_snapshot("empty", &empty).is_err());

        let huge = GridSnapshot { size: MAX_GRID_SIZE + 1, cells: Vec::new() };
        assert_eq!(huge.validate(), Err(EditorError::GridSize { size: MAX_GRID_SIZE + 1 }));
    }

    #[test]
    fn test_clamp_on_empty_grid() {
        let grid = Grid::new(0);
        assert_eq!(grid.clamp(GridPos::new(5, -3)), GridPos::new(0, 0));
        assert!(!grid.contains(GridPos::new(0, 0)));
    }

    #[test]
    fn test_snapshot_json_roundtrip_through_file() {
        let mut map = Map::new("test", 4);
        map.grid_mut()
            .set(GridPos::new(1, 2), Cell { tile_key: 5, tile_style: 1, wall_key: 2 })
            .unwrap();

        let path = std::env::temp_dir().join(format!("mapsmith_snapshot_{}.json", map.id));
        map.snapshot().save_json(&path).unwrap();
        let loaded = GridSnapshot::load_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let restored = Map::from_snapshot("restored", &loaded).unwrap();
        assert_eq!(restored.grid(), map.grid());
    }
}
