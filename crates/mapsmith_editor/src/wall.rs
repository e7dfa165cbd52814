//! Wall resolution: quadrant decorations for walls drawn over a cell
//!
//! A wall key stored at `(x, y)` occupies the corner it shares with the
//! cells to its north-west, so it is rendered into the caches of
//! `(x - 1, y - 1)`, `(x, y - 1)` and `(x - 1, y)`. Resolution therefore
//! looks the other way: a cell collects the walls of its South-East, South
//! and East neighbors.

use bevy::log::warn;
use serde::{Deserialize, Serialize};

use crate::assets::{TextureHandle, TileCatalog, WallKey};
use crate::grid::{Grid, GridPos, Map};

/// Maximum number of wall quadrants drawn on one cell
pub const MAX_WALL_DECORATIONS: usize = 3;

/// Neighbor a wall quadrant comes from; the value is the wall texture slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WallQuadrant {
    SouthEast = 0,
    South = 1,
    East = 2,
}

impl WallQuadrant {
    /// Slot order; resolution walks it back to front
    pub const ALL: [WallQuadrant; MAX_WALL_DECORATIONS] =
        [WallQuadrant::SouthEast, WallQuadrant::South, WallQuadrant::East];

    pub fn offset(self) -> (i32, i32) {
        match self {
            WallQuadrant::SouthEast => (1, 1),
            WallQuadrant::South => (0, 1),
            WallQuadrant::East => (1, 0),
        }
    }

    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallDecoration {
    pub wall_key: WallKey,
    pub quadrant: WallQuadrant,
    pub texture: TextureHandle,
}

/// Resolve the wall quadrants of `pos` into `out`.
///
/// The draw order (East, South, South-East) is load-bearing for layering.
/// Walls whose type has no texture for the slot are skipped.
pub fn resolve_walls_into(
    grid: &Grid,
    pos: GridPos,
    catalog: &TileCatalog,
    out: &mut Vec<WallDecoration>,
) {
    out.clear();
    debug_assert!(grid.contains(pos), "wall resolution outside grid: {:?}", pos);
    if !grid.contains(pos) {
        return;
    }

    for quadrant in WallQuadrant::ALL.iter().rev().copied() {
        let (dx, dy) = quadrant.offset();
        let Some(wall_key) = grid.wall_key(pos.offset(dx, dy)) else {
            continue;
        };
        if wall_key == 0 {
            continue;
        }
        let texture = catalog.wall_texture(wall_key, quadrant.slot());
        if texture.is_none() {
            continue;
        }
        out.push(WallDecoration {
            wall_key,
            quadrant,
            texture,
        });
    }
}

pub fn resolve_walls(grid: &Grid, pos: GridPos, catalog: &TileCatalog) -> Vec<WallDecoration> {
    let mut out = Vec::with_capacity(MAX_WALL_DECORATIONS);
    resolve_walls_into(grid, pos, catalog, &mut out);
    out
}

/// Recompute and store the wall caches of `cells`
pub fn recompute_walls(map: &mut Map, cells: &[GridPos], catalog: &TileCatalog) {
    let mut scratch = Vec::with_capacity(MAX_WALL_DECORATIONS);
    for &pos in cells {
        if !map.grid().contains(pos) {
            warn!("Skipping wall recompute outside grid: {:?}", pos);
            continue;
        }
        resolve_walls_into(map.grid(), pos, catalog, &mut scratch);
        map.set_wall_decorations(pos, &scratch);
    }
}

pub fn recompute_all_walls(map: &mut Map, catalog: &TileCatalog) {
    let cells: Vec<GridPos> = map.grid().positions().collect();
    recompute_walls(map, &cells, catalog);
}
