//! Wall orientation for strokes
//!
//! After a wall stroke is laid out, every cell is classified by where it
//! sits on the stroke's bounding box (or, for diagonal paths, by which
//! neighbors it joins). The classification then picks the concrete wall
//! key through [`OrientationRules`], so one selected wall type can expand
//! into straight, post and corner variants.
//!
//! ```text
//!   Box (min)            (max, min)
//!      P - - - - - - - - H
//!      |                 |
//!      V                 V
//!      |                 |
//!      V - - - - - - - - C
//!   (min, max)           Box (max)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::assets::WallKey;
use crate::grid::GridPos;
use crate::path::{PathMode, PathQuadrant, PathShape};
use crate::stroke::{StrokeBounds, StrokeCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum WallOrientation {
    #[default]
    None = 0,
    Vertical = 1,
    Horizontal = 2,
    Post = 3,
    Corner = 4,
}

impl WallOrientation {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WallOrientation::None),
            1 => Some(WallOrientation::Vertical),
            2 => Some(WallOrientation::Horizontal),
            3 => Some(WallOrientation::Post),
            4 => Some(WallOrientation::Corner),
            _ => None,
        }
    }
}

/// One `(source, orientation) -> target` entry, as handed over by the asset side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationRule {
    pub source: WallKey,
    pub orientation: WallOrientation,
    pub target: WallKey,
}

/// Maps a selected wall key plus an orientation to the wall key to place
#[derive(Debug, Clone, Default)]
pub struct OrientationRules {
    rules: HashMap<(WallKey, WallOrientation), WallKey>,
}

impl OrientationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: impl IntoIterator<Item = OrientationRule>) -> Self {
        let mut table = Self::new();
        for rule in rules {
            table.insert(rule.source, rule.orientation, rule.target);
        }
        table
    }

    pub fn from_json(json: &str) -> Result<Self, crate::EditorError> {
        let rules: Vec<OrientationRule> = serde_json::from_str(json)
            .map_err(|e| crate::EditorError::ParseError(e.to_string()))?;
        Ok(Self::from_rules(rules))
    }

    /// Insert a rule, returning the target it replaced
    pub fn insert(
        &mut self,
        source: WallKey,
        orientation: WallOrientation,
        target: WallKey,
    ) -> Option<WallKey> {
        self.rules.insert((source, orientation), target)
    }

    /// Target key for `(source, orientation)`; `source` itself on a miss
    pub fn resolve(&self, source: WallKey, orientation: WallOrientation) -> WallKey {
        self.rules
            .get(&(source, orientation))
            .copied()
            .unwrap_or(source)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// How the stroke was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeShape {
    /// Freehand; the raw wall key is placed everywhere
    Painter,
    Box,
    Path(PathShape),
}

/// Classify every stroke cell and write the resolved wall key into its aux value
pub fn resolve_stroke_orientations(
    cells: &mut [StrokeCell],
    shape: StrokeShape,
    rules: &OrientationRules,
    source_key: WallKey,
) {
    let Some(bounds) = StrokeBounds::of(cells) else {
        return;
    };

    match shape {
        StrokeShape::Painter => {
            for cell in cells.iter_mut() {
                cell.aux = source_key;
            }
        }
        StrokeShape::Box => {
            for cell in cells.iter_mut() {
                let orientation = box_orientation(cell.pos, &bounds);
                cell.aux = rules.resolve(source_key, orientation);
            }
        }
        StrokeShape::Path(path) if path.mode == PathMode::Diagonal => {
            let members: HashSet<GridPos> = cells.iter().map(|c| c.pos).collect();
            for cell in cells.iter_mut() {
                let orientation = join_orientation(cell.pos, &members);
                cell.aux = rules.resolve(source_key, orientation);
            }
        }
        StrokeShape::Path(path) => {
            for cell in cells.iter_mut() {
                let orientation = path_orientation(cell.pos, &bounds, path);
                cell.aux = rules.resolve(source_key, orientation);
            }
        }
    }
}

/// Orientation of a cell on the border of a box stroke
pub fn box_orientation(pos: GridPos, bounds: &StrokeBounds) -> WallOrientation {
    let (min, max) = (bounds.min, bounds.max);
    if pos.x == max.x && pos.y == max.y {
        WallOrientation::Corner
    } else if pos.x == min.x && pos.y == min.y {
        WallOrientation::Post
    } else if pos.x == min.x && pos.y == max.y {
        WallOrientation::Vertical
    } else if pos.x == max.x && pos.y == min.y {
        WallOrientation::Horizontal
    } else if pos.y == min.y || pos.y == max.y {
        WallOrientation::Horizontal
    } else if pos.x == min.x || pos.x == max.x {
        WallOrientation::Vertical
    } else {
        WallOrientation::None
    }
}

/// Orientation of a cell on a shallow or steep path
pub fn path_orientation(pos: GridPos, bounds: &StrokeBounds, path: PathShape) -> WallOrientation {
    use PathMode::{Shallow, Steep};
    use PathQuadrant::*;

    let (min, max) = (bounds.min, bounds.max);
    let quadrant = path.quadrant;
    let mode = path.mode;

    if pos.x == max.x && pos.y == max.y {
        match (quadrant, mode) {
            (Some(SouthEast), Steep) => WallOrientation::Horizontal,
            (Some(SouthEast), Shallow) => WallOrientation::Vertical,
            (Some(NorthWest), Shallow) => WallOrientation::Horizontal,
            (Some(NorthWest), Steep) => WallOrientation::Vertical,
            (Some(North | South), _) => WallOrientation::Vertical,
            (Some(East | West), _) => WallOrientation::Horizontal,
            _ => WallOrientation::Corner,
        }
    } else if pos.x == min.x && pos.y == min.y {
        match (quadrant, mode) {
            (Some(NorthWest), Steep) => WallOrientation::Horizontal,
            (Some(NorthWest), Shallow) => WallOrientation::Vertical,
            _ => WallOrientation::Post,
        }
    } else if pos.x == min.x && pos.y == max.y {
        match (quadrant, mode) {
            (Some(SouthWest), Steep) => WallOrientation::Horizontal,
            (Some(SouthWest), Shallow) => WallOrientation::Vertical,
            (Some(NorthEast), Shallow) => WallOrientation::Post,
            _ => WallOrientation::Vertical,
        }
    } else if pos.x == max.x && pos.y == min.y {
        match (quadrant, mode) {
            (Some(NorthEast), Steep) => WallOrientation::Horizontal,
            (Some(NorthEast), Shallow) => WallOrientation::Vertical,
            (Some(SouthWest), Steep) => WallOrientation::Post,
            _ => WallOrientation::Horizontal,
        }
    } else if pos.y == min.y || pos.y == max.y {
        WallOrientation::Horizontal
    } else if pos.x == min.x || pos.x == max.x {
        WallOrientation::Vertical
    } else {
        WallOrientation::None
    }
}

/// Orientation of a staircase cell from the stroke cells it touches.
///
/// Joins follow the box corners: west+north closes like the (max, max)
/// corner, east+south like the (min, min) post, and so on.
pub fn join_orientation(pos: GridPos, members: &HashSet<GridPos>) -> WallOrientation {
    let north = members.contains(&pos.offset(0, -1));
    let east = members.contains(&pos.offset(1, 0));
    let south = members.contains(&pos.offset(0, 1));
    let west = members.contains(&pos.offset(-1, 0));

    match (north, east, south, west) {
        (true, false, false, true) => WallOrientation::Corner,
        (false, true, true, false) => WallOrientation::Post,
        (true, true, false, false) => WallOrientation::Vertical,
        (false, false, true, true) => WallOrientation::Horizontal,
        (false, _, false, _) if east || west => WallOrientation::Horizontal,
        (_, false, _, false) if north || south => WallOrientation::Vertical,
        _ => WallOrientation::None,
    }
}
