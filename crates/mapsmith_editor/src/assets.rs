//! Tile, wall and edge metadata supplied by the asset collaborator
//!
//! The core never decodes textures. It only passes opaque [`TextureHandle`]s
//! through to the per-cell render lists.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TileKey = u32;
pub type WallKey = u32;

/// Number of border slots an edge set provides per tile type
pub const EDGE_SLOTS: usize = 12;
/// Number of quadrant textures a wall type provides
pub const WALL_QUADRANTS: usize = 4;

/// Opaque reference to a decoded texture owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// The no-op texture; never drawn
    pub const NONE: TextureHandle = TextureHandle(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

/// A ground tile type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileType {
    pub key: TileKey,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_walkable")]
    pub walkable: bool,
    /// Higher priority terrain paints borders onto lower priority terrain
    #[serde(default)]
    pub edge_priority: i32,
    /// Whether this tile type paints borders at all
    #[serde(default)]
    pub edge_indicator: bool,
    #[serde(default)]
    pub variants: Vec<TextureHandle>,
}

fn default_walkable() -> bool {
    true
}

impl Default for TileType {
    fn default() -> Self {
        Self::new(0, 0, false)
    }
}

impl TileType {
    pub fn new(key: TileKey, edge_priority: i32, edge_indicator: bool) -> Self {
        Self {
            key,
            name: String::new(),
            walkable: true,
            edge_priority,
            edge_indicator,
            variants: Vec::new(),
        }
    }

    pub fn with_variants(mut self, variants: Vec<TextureHandle>) -> Self {
        self.variants = variants;
        self
    }
}

/// A wall type with one texture per quadrant slot
///
/// Slot 0 is drawn for a South-East neighbor, 1 for South, 2 for East.
/// Slot 3 is carried for asset sets that ship a fourth quadrant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallType {
    pub key: WallKey,
    #[serde(default)]
    pub name: String,
    pub quadrants: [TextureHandle; WALL_QUADRANTS],
}

impl WallType {
    pub fn new(key: WallKey, quadrants: [TextureHandle; WALL_QUADRANTS]) -> Self {
        Self {
            key,
            name: String::new(),
            quadrants,
        }
    }
}

/// Precomputed border textures for one tile type, indexed by edge slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSet {
    pub tile_key: TileKey,
    pub edges: [TextureHandle; EDGE_SLOTS],
}

/// All metadata the resolution engines read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileCatalog {
    #[serde(default)]
    pub tiles: HashMap<TileKey, TileType>,
    #[serde(default)]
    pub walls: HashMap<WallKey, WallType>,
    #[serde(default)]
    pub edges: Vec<EdgeSet>,
}

impl TileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tile(&mut self, tile: TileType) {
        self.tiles.insert(tile.key, tile);
    }

    pub fn add_wall(&mut self, wall: WallType) {
        self.walls.insert(wall.key, wall);
    }

    pub fn add_edge_set(&mut self, edge_set: EdgeSet) {
        self.edges.push(edge_set);
    }

    pub fn tile(&self, key: TileKey) -> Option<&TileType> {
        self.tiles.get(&key)
    }

    pub fn wall(&self, key: WallKey) -> Option<&WallType> {
        self.walls.get(&key)
    }

    pub fn has_tile(&self, key: TileKey) -> bool {
        self.tiles.contains_key(&key)
    }

    pub fn has_wall(&self, key: WallKey) -> bool {
        self.walls.contains_key(&key)
    }

    /// Edge priority of a tile type; unknown keys rank lowest
    pub fn edge_priority(&self, key: TileKey) -> i32 {
        self.tiles.get(&key).map(|t| t.edge_priority).unwrap_or(0)
    }

    pub fn edge_indicator(&self, key: TileKey) -> bool {
        self.tiles.get(&key).map(|t| t.edge_indicator).unwrap_or(false)
    }

    pub fn variant_count(&self, key: TileKey) -> usize {
        self.tiles.get(&key).map(|t| t.variants.len()).unwrap_or(0)
    }

    pub fn tile_texture(&self, key: TileKey, style: u32) -> TextureHandle {
        self.tiles
            .get(&key)
            .and_then(|t| t.variants.get(style as usize))
            .copied()
            .unwrap_or(TextureHandle::NONE)
    }

    /// Border texture for `(tile_key, slot)`; first matching edge set wins
    pub fn edge_texture(&self, tile_key: TileKey, slot: usize) -> TextureHandle {
        self.edges
            .iter()
            .find(|set| set.tile_key == tile_key)
            .and_then(|set| set.edges.get(slot))
            .copied()
            .unwrap_or(TextureHandle::NONE)
    }

    pub fn wall_texture(&self, wall_key: WallKey, quadrant: usize) -> TextureHandle {
        self.walls
            .get(&wall_key)
            .and_then(|w| w.quadrants.get(quadrant))
            .copied()
            .unwrap_or(TextureHandle::NONE)
    }

    pub fn from_json(json: &str) -> Result<Self, crate::EditorError> {
        serde_json::from_str(json).map_err(|e| crate::EditorError::ParseError(e.to_string()))
    }
}
