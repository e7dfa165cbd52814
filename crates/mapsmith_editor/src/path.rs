//! Gesture geometry: box and path cell sets between two grid positions
//!
//! Paths bend once. Which way they bend depends on the dominant axis:
//!
//! ```text
//!   Shallow        Steep      Diagonal (x first)
//!
//!   S # # #        S          S #
//!         E        #            # #
//!                  #              E
//!                  # E
//! ```
//!
//! Shallow paths run along X from the start then along Y on the end column.
//! Steep paths run along Y on the start column then along X on the end row.
//! Diagonal paths are a staircase; [`DiagonalPriority`] picks which axis
//! each step takes first.

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;

/// Raw gesture endpoints, already clamped to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    pub start: GridPos,
    pub end: GridPos,
}

impl GridRect {
    pub fn new(start: GridPos, end: GridPos) -> Self {
        Self { start, end }
    }

    pub fn min(&self) -> GridPos {
        GridPos::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y))
    }

    pub fn max(&self) -> GridPos {
        GridPos::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y))
    }

    pub fn delta(&self) -> (i32, i32) {
        (self.end.x - self.start.x, self.end.y - self.start.y)
    }

    pub fn width(&self) -> u32 {
        self.start.x.abs_diff(self.end.x) + 1
    }

    pub fn height(&self) -> u32 {
        self.start.y.abs_diff(self.end.y) + 1
    }
}

/// Every cell of the rectangle, row-major. Used for area fills of tiles.
pub fn box_cells(rect: GridRect, out: &mut Vec<GridPos>) {
    out.clear();
    let (min, max) = (rect.min(), rect.max());
    out.reserve((rect.width() * rect.height()) as usize);
    for y in min.y..=max.y {
        for x in min.x..=max.x {
            out.push(GridPos::new(x, y));
        }
    }
}

/// Only the perimeter of the rectangle, row-major. Used for wall boxes.
pub fn box_outline_cells(rect: GridRect, out: &mut Vec<GridPos>) {
    out.clear();
    let (min, max) = (rect.min(), rect.max());
    for y in min.y..=max.y {
        for x in min.x..=max.x {
            if x == min.x || x == max.x || y == min.y || y == max.y {
                out.push(GridPos::new(x, y));
            }
        }
    }
}

/// Compass direction of the gesture end relative to its start.
/// Y grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathQuadrant {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl PathQuadrant {
    /// Classify a delta; `None` when the end sits on the start
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        use std::cmp::Ordering::*;
        let quadrant = match (dx.cmp(&0), dy.cmp(&0)) {
            (Equal, Equal) => return None,
            (Equal, Less) => PathQuadrant::North,
            (Greater, Less) => PathQuadrant::NorthEast,
            (Greater, Equal) => PathQuadrant::East,
            (Greater, Greater) => PathQuadrant::SouthEast,
            (Equal, Greater) => PathQuadrant::South,
            (Less, Greater) => PathQuadrant::SouthWest,
            (Less, Equal) => PathQuadrant::West,
            (Less, Less) => PathQuadrant::NorthWest,
        };
        Some(quadrant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PathMode {
    /// X is the dominant axis
    #[default]
    Shallow,
    /// Y is the dominant axis
    Steep,
    Diagonal,
}

impl PathMode {
    pub fn from_delta(dx: i32, dy: i32) -> Self {
        let (ax, ay) = (dx.abs(), dy.abs());
        if ax > ay {
            PathMode::Shallow
        } else if ay > ax {
            PathMode::Steep
        } else {
            PathMode::Diagonal
        }
    }
}

/// Axis a diagonal staircase steps along first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiagonalPriority {
    #[default]
    XFirst,
    YFirst,
}

/// Cells of a single-bend path from `rect.start` to `rect.end`, in walking order
pub fn path_cells(rect: GridRect, priority: DiagonalPriority, out: &mut Vec<GridPos>) {
    out.clear();
    let (dx, dy) = rect.delta();
    let (sx, sy) = (dx.signum(), dy.signum());
    let start = rect.start;
    out.reserve((dx.unsigned_abs() + dy.unsigned_abs() + 1) as usize);
    out.push(start);

    match PathMode::from_delta(dx, dy) {
        PathMode::Shallow => {
            for i in 1..=dx.abs() {
                out.push(GridPos::new(start.x + i * sx, start.y));
            }
            for i in 1..=dy.abs() {
                out.push(GridPos::new(rect.end.x, start.y + i * sy));
            }
        }
        PathMode::Steep => {
            for i in 1..=dy.abs() {
                out.push(GridPos::new(start.x, start.y + i * sy));
            }
            for i in 1..=dx.abs() {
                out.push(GridPos::new(start.x + i * sx, rect.end.y));
            }
        }
        PathMode::Diagonal => {
            let mut pos = start;
            for _ in 0..dx.abs() {
                let (first, second) = match priority {
                    DiagonalPriority::XFirst => ((sx, 0), (0, sy)),
                    DiagonalPriority::YFirst => ((0, sy), (sx, 0)),
                };
                pos = pos.offset(first.0, first.1);
                out.push(pos);
                pos = pos.offset(second.0, second.1);
                out.push(pos);
            }
        }
    }
}

/// Shape parameters a path stroke carries into orientation resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathShape {
    pub quadrant: Option<PathQuadrant>,
    pub mode: PathMode,
    pub diagonal_priority: DiagonalPriority,
}

/// Keeps path classification steady while the cursor moves.
///
/// The quadrant only changes while the cursor is off the start tile, so
/// passing back over the start does not flip it. The diagonal priority is
/// taken from the first move off the start tile and kept until the cursor
/// comes back.
#[derive(Debug, Clone, Default)]
pub struct PathTracker {
    shape: PathShape,
    away_from_start: bool,
}

impl PathTracker {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn shape(&self) -> PathShape {
        self.shape
    }

    /// Feed the current gesture rectangle; returns the shape to draw with
    pub fn track(&mut self, rect: GridRect) -> PathShape {
        let (dx, dy) = rect.delta();
        let Some(quadrant) = PathQuadrant::from_delta(dx, dy) else {
            self.away_from_start = false;
            return self.shape;
        };

        if !self.away_from_start {
            self.away_from_start = true;
            self.shape.diagonal_priority = if dx.abs() >= dy.abs() {
                DiagonalPriority::XFirst
            } else {
                DiagonalPriority::YFirst
            };
        }
        self.shape.quadrant = Some(quadrant);
        self.shape.mode = PathMode::from_delta(dx, dy);
        self.shape
    }
}
