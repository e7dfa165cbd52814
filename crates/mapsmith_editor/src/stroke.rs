//! Stroke accumulation for the gesture in progress

use std::collections::HashSet;

use crate::grid::GridPos;

/// A cell touched by the current stroke.
///
/// `aux` is the tile style for tile strokes and the resolved wall key for
/// wall strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeCell {
    pub pos: GridPos,
    pub aux: u32,
}

/// Inclusive bounding box of a set of stroke cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeBounds {
    pub min: GridPos,
    pub max: GridPos,
}

impl StrokeBounds {
    pub fn of(cells: &[StrokeCell]) -> Option<Self> {
        let first = cells.first()?.pos;
        let mut bounds = StrokeBounds { min: first, max: first };
        for cell in &cells[1..] {
            bounds.min.x = bounds.min.x.min(cell.pos.x);
            bounds.min.y = bounds.min.y.min(cell.pos.y);
            bounds.max.x = bounds.max.x.max(cell.pos.x);
            bounds.max.y = bounds.max.y.max(cell.pos.y);
        }
        Some(bounds)
    }
}

/// Deduplicated set of cells implicated by the active gesture.
///
/// Buffers are kept across frames and strokes; `clear` empties them without
/// giving the memory back.
#[derive(Debug, Default)]
pub struct StrokeAccumulator {
    cells: Vec<StrokeCell>,
    members: HashSet<GridPos>,
    candidates: HashSet<GridPos>,
}

impl StrokeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the stroke equal to `candidates`.
    ///
    /// New cells are appended with an aux value from `aux_gen`. Cells that
    /// are no longer candidates are dropped. Survivors keep their aux value
    /// and their position in the list.
    pub fn update(&mut self, candidates: &[GridPos], mut aux_gen: impl FnMut(GridPos) -> u32) {
        self.candidates.clear();
        self.candidates.extend(candidates.iter().copied());

        for &pos in candidates {
            if self.members.insert(pos) {
                self.cells.push(StrokeCell { pos, aux: aux_gen(pos) });
            }
        }

        if self.cells.len() > self.candidates.len() {
            let candidates = &self.candidates;
            let members = &mut self.members;
            self.cells.retain(|cell| {
                let keep = candidates.contains(&cell.pos);
                if !keep {
                    members.remove(&cell.pos);
                }
                keep
            });
        }
    }

    /// Add a single cell without pruning; returns false if it was already present
    pub fn push(&mut self, pos: GridPos, aux_gen: impl FnOnce(GridPos) -> u32) -> bool {
        if !self.members.insert(pos) {
            return false;
        }
        self.cells.push(StrokeCell { pos, aux: aux_gen(pos) });
        true
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.members.clear();
        self.candidates.clear();
    }

    pub fn cells(&self) -> &[StrokeCell] {
        &self.cells
    }

    /// Mutable access to aux values; positions must not be changed
    pub fn cells_mut(&mut self) -> &mut [StrokeCell] {
        &mut self.cells
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.cells.iter().map(|c| c.pos)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.members.contains(&pos)
    }

    pub fn bounds(&self) -> Option<StrokeBounds> {
        StrokeBounds::of(&self.cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn row(y: i32, xs: std::ops::RangeInclusive<i32>) -> Vec<GridPos> {
        xs.map(|x| GridPos::new(x, y)).collect()
    }

    #[test]
    fn test_update_adds_then_prunes() {
        let mut stroke = StrokeAccumulator::new();
        stroke.update(&row(0, 0..=4), |_| 0);
        assert_eq!(stroke.len(), 5);

        stroke.update(&row(0, 2..=6), |_| 1);
        assert_eq!(stroke.len(), 5);
        assert!(!stroke.contains(GridPos::new(1, 0)));
        assert!(stroke.contains(GridPos::new(6, 0)));
        // Survivors keep their place ahead of new cells
        assert_eq!(stroke.cells()[0].pos, GridPos::new(2, 0));
        assert_eq!(stroke.cells()[4].pos, GridPos::new(6, 0));
    }

    #[test]
    fn test_duplicate_candidates_collapse() {
        let mut stroke = StrokeAccumulator::new();
        let p = GridPos::new(3, 3);
        stroke.update(&[p, p, p], |_| 0);
        assert_eq!(stroke.len(), 1);
    }

    #[test]
    fn test_variant_stability_while_dragging() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut stroke = StrokeAccumulator::new();
        stroke.update(&row(1, 0..=3), |_| rng.gen_range(0..1000));
        let first: Vec<StrokeCell> = stroke.cells().to_vec();

        for end in 4..12 {
            stroke.update(&row(1, 0..=end), |_| rng.gen_range(0..1000));
            for cell in &first {
                let now = stroke.cells().iter().find(|c| c.pos == cell.pos).unwrap();
                assert_eq!(now.aux, cell.aux);
            }
        }
    }

    #[test]
    fn test_cell_rerolled_after_leaving() {
        let mut stroke = StrokeAccumulator::new();
        let mut next = 0;
        let mut roll = |_: GridPos| -> u32 {
            next += 1;
            next
        };
        stroke.update(&row(0, 0..=1), &mut roll);
        stroke.update(&row(0, 0..=0), &mut roll);
        stroke.update(&row(0, 0..=1), &mut roll);
        assert_eq!(stroke.cells()[1].aux, 3);
    }

    #[test]
    fn test_push_does_not_prune() {
        let mut stroke = StrokeAccumulator::new();
        assert!(stroke.push(GridPos::new(0, 0), |_| 0));
        assert!(stroke.push(GridPos::new(5, 5), |_| 0));
        assert!(!stroke.push(GridPos::new(0, 0), |_| 9));
        assert_eq!(stroke.len(), 2);
        assert_eq!(
            stroke.bounds(),
            Some(StrokeBounds { min: GridPos::new(0, 0), max: GridPos::new(5, 5) })
        );
    }

    #[test]
    fn test_clear_keeps_nothing() {
        let mut stroke = StrokeAccumulator::new();
        stroke.update(&row(0, 0..=3), |_| 0);
        stroke.clear();
        assert!(stroke.is_empty());
        assert!(!stroke.contains(GridPos::new(0, 0)));
        assert_eq!(stroke.bounds(), None);
    }
}
