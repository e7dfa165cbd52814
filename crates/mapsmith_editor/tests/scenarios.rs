//! End-to-end editing scenarios driven through `EditorContext`

use mapsmith_editor::{
    recompute_all_edges, recompute_all_walls, CommitOutcome, DrawMode, EdgeSet, EditorConfig,
    EditorContext, GridPos, GridSnapshot, Map, OrientationRules, TextureHandle, TileCatalog,
    TileType, WallOrientation, WallType,
};
use mapsmith_editor::assets::EDGE_SLOTS;
use mapsmith_editor::grid::Cell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GRASS: u32 = 1;
const SAND: u32 = 5;
const WATER: u32 = 7;
const STONE: u32 = 20;
const STONE_V: u32 = 21;
const STONE_H: u32 = 22;
const STONE_POST: u32 = 23;
const STONE_CORNER: u32 = 24;

fn catalog() -> TileCatalog {
    let mut catalog = TileCatalog::new();
    catalog.add_tile(TileType::new(GRASS, 0, false));
    catalog.add_tile(
        TileType::new(SAND, 10, true).with_variants(vec![TextureHandle(51), TextureHandle(52)]),
    );
    catalog.add_tile(TileType::new(WATER, 20, true));
    for key in [SAND, WATER] {
        let mut edges = [TextureHandle::NONE; EDGE_SLOTS];
        for (slot, edge) in edges.iter_mut().enumerate() {
            *edge = TextureHandle(key * 100 + slot as u32 + 1);
        }
        catalog.add_edge_set(EdgeSet { tile_key: key, edges });
    }
    for key in [STONE, STONE_V, STONE_H, STONE_POST, STONE_CORNER] {
        catalog.add_wall(WallType::new(key, [TextureHandle(key * 10); 4]));
    }
    catalog
}

fn rules() -> OrientationRules {
    let mut rules = OrientationRules::new();
    rules.insert(STONE, WallOrientation::Vertical, STONE_V);
    rules.insert(STONE, WallOrientation::Horizontal, STONE_H);
    rules.insert(STONE, WallOrientation::Post, STONE_POST);
    rules.insert(STONE, WallOrientation::Corner, STONE_CORNER);
    rules
}

/// A 16x16 session whose ground is all grass
fn grass_session() -> EditorContext {
    let mut config = EditorConfig::default();
    config.drawing.seed = Some(11);
    let mut ctx = EditorContext::new(&config, catalog(), rules());
    let snapshot = GridSnapshot {
        size: 16,
        cells: vec![Cell { tile_key: GRASS, tile_style: 0, wall_key: 0 }; 256],
    };
    ctx.load_snapshot(&snapshot).unwrap();
    ctx
}

fn stroke(ctx: &mut EditorContext, from: (i32, i32), to: (i32, i32), mode: DrawMode) -> CommitOutcome {
    ctx.begin_stroke(from.into(), mode);
    ctx.update_stroke(to.into());
    ctx.commit_stroke()
}

/// Decoration caches must equal a from-scratch rebuild of the same grid
fn assert_caches_fresh(ctx: &EditorContext) {
    let mut fresh: Map = ctx.map().clone();
    recompute_all_edges(&mut fresh, ctx.catalog());
    recompute_all_walls(&mut fresh, ctx.catalog());
    for pos in ctx.map().grid().positions() {
        assert_eq!(ctx.map().edge_decorations(pos), fresh.edge_decorations(pos), "edges at {:?}", pos);
        assert_eq!(ctx.map().wall_decorations(pos), fresh.wall_decorations(pos), "walls at {:?}", pos);
    }
}

#[test]
fn test_sand_block_borders_and_undo() {
    let mut ctx = grass_session();
    ctx.select_tile(SAND).unwrap();
    assert!(matches!(stroke(&mut ctx, (4, 4), (6, 6), DrawMode::Box), CommitOutcome::Recorded(_)));

    for y in 3..=7 {
        for x in 3..=7 {
            let pos = GridPos::new(x, y);
            let edges = ctx.map().edge_decorations(pos);
            let on_ring = x == 3 || x == 7 || y == 3 || y == 7;
            if on_ring {
                assert_eq!(edges.len(), 1, "ring cell {:?}", pos);
                assert_eq!(edges[0].tile_key, SAND);
                let is_ring_corner = (x == 3 || x == 7) && (y == 3 || y == 7);
                assert_eq!(edges[0].slot.is_diagonal(), is_ring_corner);
            } else {
                assert!(edges.is_empty(), "block cell {:?}", pos);
            }
        }
    }

    assert!(ctx.undo());
    for y in 3..=7 {
        for x in 3..=7 {
            let pos = GridPos::new(x, y);
            assert_eq!(ctx.map().grid().tile_key(pos), Some(GRASS));
            assert_eq!(ctx.map().edge_count(pos), 0);
        }
    }
}

#[test]
fn test_notch_between_two_arms_gets_corner() {
    let mut ctx = grass_session();
    ctx.select_tile(SAND).unwrap();
    // An L of sand: row y=2 for x=2..=5, then column x=5 down to y=4
    stroke(&mut ctx, (2, 2), (5, 4), DrawMode::Path);

    // (4,3) has sand to the north and east but not to the south or west
    let edges = ctx.map().edge_decorations(GridPos::new(4, 3));
    assert_eq!(edges.len(), 1);
    assert!(edges[0].slot.is_corner());
}

#[test]
fn test_higher_priority_layers_last() {
    let mut ctx = grass_session();
    ctx.select_tile(SAND).unwrap();
    stroke(&mut ctx, (5, 4), (5, 4), DrawMode::Painter);
    ctx.select_tile(WATER).unwrap();
    stroke(&mut ctx, (5, 6), (5, 6), DrawMode::Painter);

    let edges = ctx.map().edge_decorations(GridPos::new(5, 5));
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].tile_key, SAND);
    assert_eq!(edges[1].tile_key, WATER);
    assert!(edges[0].priority < edges[1].priority);
}

#[test]
fn test_box_wall_orientations() {
    let mut ctx = grass_session();
    ctx.select_wall(STONE).unwrap();
    stroke(&mut ctx, (2, 2), (5, 5), DrawMode::Box);

    let wall = |x, y| ctx.map().grid().wall_key(GridPos::new(x, y)).unwrap();
    assert_eq!(wall(5, 5), STONE_CORNER);
    assert_eq!(wall(2, 2), STONE_POST);
    assert_eq!(wall(2, 5), STONE_V);
    assert_eq!(wall(5, 2), STONE_H);
    for i in 3..=4 {
        assert_eq!(wall(i, 2), STONE_H);
        assert_eq!(wall(i, 5), STONE_H);
        assert_eq!(wall(2, i), STONE_V);
        assert_eq!(wall(5, i), STONE_V);
    }
    assert_eq!(wall(3, 3), 0);
    assert_caches_fresh(&ctx);
}

#[test]
fn test_dragging_box_back_and_forth_keeps_styles() {
    let mut ctx = grass_session();
    ctx.select_tile(SAND).unwrap();
    ctx.begin_stroke(GridPos::new(1, 1), DrawMode::Box);
    ctx.update_stroke(GridPos::new(3, 3));
    let before: Vec<_> = ctx.stroke().cells().to_vec();
    ctx.update_stroke(GridPos::new(8, 8));
    ctx.update_stroke(GridPos::new(3, 3));

    for cell in &before {
        let now = ctx.stroke().cells().iter().find(|c| c.pos == cell.pos).unwrap();
        assert_eq!(now.aux, cell.aux);
    }
    assert_eq!(ctx.stroke().len(), 9);
}

#[test]
fn test_preview_matches_commit() {
    let mut ctx = grass_session();
    ctx.select_tile(SAND).unwrap();
    ctx.begin_stroke(GridPos::new(2, 2), DrawMode::Path);
    ctx.update_stroke(GridPos::new(6, 4));

    let expected: Vec<_> = {
        let preview = ctx.preview();
        preview
            .cells()
            .iter()
            .map(|cell| (cell.pos, preview.edges_of(cell).to_vec()))
            .collect()
    };
    ctx.commit_stroke();

    for (pos, edges) in expected {
        assert_eq!(ctx.map().edge_decorations(pos), edges.as_slice());
    }
}

#[test]
fn test_random_commits_round_trip_through_undo() {
    let mut ctx = grass_session();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut snapshots = vec![ctx.snapshot()];

    for _ in 0..20 {
        let from = (rng.gen_range(0..16), rng.gen_range(0..16));
        let to = (rng.gen_range(0..16), rng.gen_range(0..16));
        let mode = match rng.gen_range(0..3) {
            0 => DrawMode::Painter,
            1 => DrawMode::Path,
            _ => DrawMode::Box,
        };
        if rng.gen_bool(0.3) {
            ctx.select_wall(STONE).unwrap();
        } else {
            let key = [GRASS, SAND, WATER][rng.gen_range(0..3)];
            ctx.select_tile(key).unwrap();
        }
        stroke(&mut ctx, from, to, mode);
        snapshots.push(ctx.snapshot());
    }

    for expected in snapshots.iter().rev().skip(1) {
        assert!(ctx.undo());
        assert_eq!(&ctx.snapshot(), expected);
        assert_caches_fresh(&ctx);
    }
    assert!(!ctx.undo());

    for expected in snapshots.iter().skip(1) {
        assert!(ctx.redo());
        assert_eq!(&ctx.snapshot(), expected);
    }
    assert_caches_fresh(&ctx);
}

#[test]
fn test_new_edit_after_undo_discards_redo() {
    let mut ctx = grass_session();
    ctx.select_tile(SAND).unwrap();
    stroke(&mut ctx, (1, 1), (1, 1), DrawMode::Painter);
    stroke(&mut ctx, (2, 2), (2, 2), DrawMode::Painter);
    stroke(&mut ctx, (3, 3), (3, 3), DrawMode::Painter);

    assert!(ctx.undo());
    assert!(ctx.undo());
    stroke(&mut ctx, (9, 9), (9, 9), DrawMode::Painter);

    assert!(!ctx.redo());
    assert_eq!(ctx.history().len(), 2);
    assert_eq!(ctx.map().grid().tile_key(GridPos::new(2, 2)), Some(GRASS));
    assert_eq!(ctx.map().grid().tile_key(GridPos::new(9, 9)), Some(SAND));
}

#[test]
fn test_straight_wall_path_starts_with_post() {
    let mut ctx = grass_session();
    ctx.select_wall(STONE).unwrap();
    stroke(&mut ctx, (3, 6), (3, 1), DrawMode::Path);

    let wall = |x, y| ctx.map().grid().wall_key(GridPos::new(x, y)).unwrap();
    assert_eq!(wall(3, 1), STONE_POST);
    for y in 2..=6 {
        assert_eq!(wall(3, y), STONE_V);
    }
    assert_caches_fresh(&ctx);
}

#[test]
fn test_diagonal_wall_path_uses_staircase() {
    let mut ctx = grass_session();
    ctx.select_wall(STONE).unwrap();
    ctx.begin_stroke(GridPos::new(4, 4), DrawMode::Path);
    // Leave the start tile along X first
    ctx.update_stroke(GridPos::new(5, 4));
    ctx.update_stroke(GridPos::new(6, 6));
    ctx.commit_stroke();

    let wall = |x, y| ctx.map().grid().wall_key(GridPos::new(x, y)).unwrap();
    assert_eq!(wall(4, 4), STONE_H);
    assert_eq!(wall(5, 4), STONE_H);
    assert_eq!(wall(5, 5), STONE_V);
    assert_eq!(wall(6, 5), STONE_H);
    assert_eq!(wall(6, 6), STONE_V);
    assert_eq!(wall(4, 5), 0);
}
