//! Edge resolution: border decorations blended from higher-priority neighbors
//!
//! Each cell has 12 border slots. A neighbor only contributes when its tile
//! type has the edge indicator set and its edge priority is strictly higher
//! than the cell's own, so borders always flow from high to low priority
//! terrain.
//!
//! ## Slot Layout
//!
//! ```text
//! Neighbors / plain slots:      Corner slots:
//!   4 ─ 0 ─ 5                     8 ─── 9
//!   3   X   1                     │  X  │
//!   6 ─ 2 ─ 7                    10 ── 11
//! ```
//!
//! Slots 0-3 are cardinal borders, 4-7 diagonal borders and 8-11 inner
//! corners, produced when both cardinals adjacent to a corner carry the same
//! terrain. A corner consumes its two cardinals.

use bevy::log::warn;
use serde::{Deserialize, Serialize};

use crate::assets::{TextureHandle, TileCatalog, TileKey, EDGE_SLOTS};
use crate::grid::{Grid, GridPos, Map, NEIGHBOR_OFFSETS};

/// One of the 12 border slots of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EdgeSlot {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
    NorthWest = 4,
    NorthEast = 5,
    SouthWest = 6,
    SouthEast = 7,
    CornerNorthWest = 8,
    CornerNorthEast = 9,
    CornerSouthWest = 10,
    CornerSouthEast = 11,
}

impl EdgeSlot {
    pub const ALL: [EdgeSlot; EDGE_SLOTS] = [
        EdgeSlot::North,
        EdgeSlot::East,
        EdgeSlot::South,
        EdgeSlot::West,
        EdgeSlot::NorthWest,
        EdgeSlot::NorthEast,
        EdgeSlot::SouthWest,
        EdgeSlot::SouthEast,
        EdgeSlot::CornerNorthWest,
        EdgeSlot::CornerNorthEast,
        EdgeSlot::CornerSouthWest,
        EdgeSlot::CornerSouthEast,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_cardinal(self) -> bool {
        self.index() < 4
    }

    pub fn is_diagonal(self) -> bool {
        (4..8).contains(&self.index())
    }

    pub fn is_corner(self) -> bool {
        self.index() >= 8
    }
}

/// Corner/diagonal slot, neighbor index, and the two adjacent cardinals
/// (diagonal slots share the neighbor index with their own position)
const CORNERS: [(usize, usize, usize); 4] = [(8, 0, 3), (9, 0, 1), (10, 2, 3), (11, 2, 1)];
const DIAGONALS: [(usize, usize, usize); 4] = [(4, 0, 3), (5, 0, 1), (6, 2, 3), (7, 2, 1)];

/// A neighbor eligible to paint a border onto the current cell.
/// `tile_key == 0` marks "no candidate".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborInfo {
    pub tile_key: TileKey,
    pub priority: i32,
}

impl NeighborInfo {
    pub fn is_some(&self) -> bool {
        self.tile_key != 0
    }
}

/// A resolved border decoration for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDecoration {
    /// Tile type painting the border
    pub tile_key: TileKey,
    pub slot: EdgeSlot,
    pub priority: i32,
    pub texture: TextureHandle,
}

/// Collect the 8 neighbor candidates of `pos` in [`NEIGHBOR_OFFSETS`] order
fn neighbor_candidates(grid: &Grid, pos: GridPos, catalog: &TileCatalog) -> [NeighborInfo; 8] {
    let mut neighbors = [NeighborInfo::default(); 8];
    let Some(current_key) = grid.tile_key(pos) else {
        return neighbors;
    };
    let current_priority = catalog.edge_priority(current_key);

    for (i, &(dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
        let Some(neighbor_key) = grid.tile_key(pos.offset(dx, dy)) else {
            continue;
        };
        if neighbor_key == 0 || !catalog.edge_indicator(neighbor_key) {
            continue;
        }
        let priority = catalog.edge_priority(neighbor_key);
        if priority > current_priority {
            neighbors[i] = NeighborInfo {
                tile_key: neighbor_key,
                priority,
            };
        }
    }

    neighbors
}

/// Decide which of the 12 slots of `pos` carry a border and from which tile.
///
/// `pos` must lie on the grid. Debug builds assert this; release builds
/// return no slots for an off-grid position.
pub fn resolve_edge_slots(
    grid: &Grid,
    pos: GridPos,
    catalog: &TileCatalog,
) -> [Option<NeighborInfo>; EDGE_SLOTS] {
    debug_assert!(grid.contains(pos), "edge resolution outside grid: {:?}", pos);
    let mut slots = [None; EDGE_SLOTS];
    if !grid.contains(pos) {
        return slots;
    }

    let neighbors = neighbor_candidates(grid, pos, catalog);
    let mut consumed = [false; 4];

    // Corners: both adjacent cardinals share a terrain that does not also
    // run along the opposite sides
    for &(slot, adjacent1, adjacent2) in &CORNERS {
        let opposite1 = (adjacent1 + 2) % 4;
        let opposite2 = (adjacent2 + 2) % 4;
        let key = neighbors[adjacent1].tile_key;

        if key != 0
            && key == neighbors[adjacent2].tile_key
            && key != neighbors[opposite1].tile_key
            && key != neighbors[opposite2].tile_key
        {
            slots[slot] = Some(neighbors[adjacent1]);
            consumed[adjacent1] = true;
            consumed[adjacent2] = true;
        }
    }

    for i in 0..4 {
        if neighbors[i].is_some() && !consumed[i] {
            slots[i] = Some(neighbors[i]);
            consumed[i] = true;
        }
    }

    // Diagonals only show when they outrank every occupied adjacent cardinal
    for &(slot, adjacent1, adjacent2) in &DIAGONALS {
        let diagonal = neighbors[slot];
        if diagonal.is_some()
            && (!consumed[adjacent1] || diagonal.priority > neighbors[adjacent1].priority)
            && (!consumed[adjacent2] || diagonal.priority > neighbors[adjacent2].priority)
        {
            slots[slot] = Some(diagonal);
        }
    }

    slots
}

/// Resolve the ordered border list of `pos` into `out`, lowest priority
/// first so higher priority borders layer on top. Slots without a texture
/// in the catalog are dropped.
pub fn resolve_edges_into(
    grid: &Grid,
    pos: GridPos,
    catalog: &TileCatalog,
    out: &mut Vec<EdgeDecoration>,
) {
    out.clear();
    let slots = resolve_edge_slots(grid, pos, catalog);

    for (index, info) in slots.iter().enumerate() {
        let Some(info) = info else { continue };
        let texture = catalog.edge_texture(info.tile_key, index);
        if texture.is_none() {
            continue;
        }
        out.push(EdgeDecoration {
            tile_key: info.tile_key,
            slot: EdgeSlot::ALL[index],
            priority: info.priority,
            texture,
        });
    }

    // Stable, so equal priorities keep slot order
    out.sort_by_key(|d| d.priority);
}

pub fn resolve_edges(grid: &Grid, pos: GridPos, catalog: &TileCatalog) -> Vec<EdgeDecoration> {
    let mut out = Vec::with_capacity(EDGE_SLOTS);
    resolve_edges_into(grid, pos, catalog, &mut out);
    out
}

/// Recompute and store the edge caches of `cells`
pub fn recompute_edges(map: &mut Map, cells: &[GridPos], catalog: &TileCatalog) {
    let mut scratch = Vec::with_capacity(EDGE_SLOTS);
    for &pos in cells {
        if !map.grid().contains(pos) {
            warn!("Skipping edge recompute outside grid: {:?}", pos);
            continue;
        }
        resolve_edges_into(map.grid(), pos, catalog, &mut scratch);
        map.set_edge_decorations(pos, &scratch);
    }
}

pub fn recompute_all_edges(map: &mut Map, catalog: &TileCatalog) {
    let cells: Vec<GridPos> = map.grid().positions().collect();
    recompute_edges(map, &cells, catalog);
}
