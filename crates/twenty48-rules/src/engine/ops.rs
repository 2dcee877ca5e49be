use log::{debug, trace};

use super::source::SpawnSource;
use super::state::{Board, Cell, Direction, MoveOutcome, Movement, Position, SpawnResult, Tile};
use crate::error::EngineError;

/// Level of a freshly spawned tile (displayed as 2).
pub const SPAWN_TILE: Tile = 1;

/// Outcome of settling a board after an accepted move has been presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub spawn: SpawnResult,
    /// False means the game is over.
    pub has_legal_move: bool,
}

/// Slide/merge tiles in `direction`, leaving `board` untouched.
///
/// Returns the movements in application order together with the new board.
///
/// ```
/// use twenty48_rules::engine::{self as GameEngine, Board, Direction, Position};
/// let b = Board::from_rows(vec![vec![1, 1, 1, 0]]).unwrap();
/// let out = GameEngine::compute_move(&b, Direction::Left);
/// assert_eq!(out.board.to_rows(), vec![vec![2, 1, 0, 0]]);
/// assert_eq!(out.movements.len(), 2);
/// assert!(out.movements[0].merged);
/// assert_eq!(out.movements[0].to, Position::new(0, 0));
/// ```
pub fn compute_move(board: &Board, direction: Direction) -> MoveOutcome {
    let mut board = board.clone();
    let movements = apply_move(&mut board, direction);
    MoveOutcome { movements, board }
}

pub(crate) fn apply_move(board: &mut Board, direction: Direction) -> Vec<Movement> {
    board.reset_merge_flags();
    let mut movements = Vec::new();
    for from in scan_order(board, direction) {
        let value = board.cell(from).value;
        if value == 0 {
            continue;
        }
        let to = slide_target(board, from, value, direction);
        if to == from {
            continue;
        }
        let merged = board.cell(to).value == value;
        let landed = if merged { value + 1 } else { value };
        *board.cell_mut(to) = Cell {
            value: landed,
            merged_this_move: merged,
        };
        *board.cell_mut(from) = Cell::default();
        movements.push(Movement {
            from,
            to,
            value: landed,
            merged,
        });
    }
    debug!(
        "move {direction}: {} movement(s), {} merge(s)",
        movements.len(),
        movements.iter().filter(|m| m.merged).count()
    );
    movements
}

/// Cells ordered so those nearest the destination wall come first.
///
/// An axis the direction moves along positively is walked high to low,
/// otherwise low to high.
fn scan_order(board: &Board, direction: Direction) -> Vec<Position> {
    let (d_row, d_col) = direction.delta();
    let rows = axis_order(board.rows(), d_row);
    let cols = axis_order(board.columns(), d_col);
    rows.iter()
        .flat_map(|&row| cols.iter().map(move |&col| Position::new(row, col)))
        .collect()
}

fn axis_order(len: usize, delta: isize) -> Vec<usize> {
    if delta > 0 {
        (0..len).rev().collect()
    } else {
        (0..len).collect()
    }
}

/// Furthest legal destination for a tile of `value` at `from`.
///
/// Passes over empty cells; stops on the first equal, unmerged tile. Tiles
/// already at `Tile::MAX` have no next level and never merge.
fn slide_target(board: &Board, from: Position, value: Tile, direction: Direction) -> Position {
    let mut to = from;
    while let Some(next) = board.neighbor(to, direction) {
        let cell = board.cell(next);
        if cell.is_empty() {
            to = next;
        } else if cell.value == value && !cell.merged_this_move && value < Tile::MAX {
            return next;
        } else {
            break;
        }
    }
    to
}

/// True iff an empty cell or an axis-adjacent pair of equal tiles exists.
///
/// This is the single source of truth for game over.
pub fn has_legal_move(board: &Board) -> bool {
    board.positions().any(|pos| {
        let cell = board.cell(pos);
        cell.is_empty()
            || [Direction::Right, Direction::Down].into_iter().any(|d| {
                board
                    .neighbor(pos, d)
                    .is_some_and(|n| board.cell(n).value == cell.value)
            })
    })
}

/// Place a level-1 tile in an empty cell picked uniformly by `source`.
///
/// ```
/// use twenty48_rules::engine::{self as GameEngine, Board, Position, ScriptedSource, SpawnResult};
/// let mut b = Board::from_rows(vec![vec![1, 0], vec![2, 3]]).unwrap();
/// let mut src = ScriptedSource::new([0]);
/// assert_eq!(GameEngine::spawn_tile(&mut b, &mut src), SpawnResult::Spawned(Position::new(0, 1)));
/// assert_eq!(GameEngine::spawn_tile(&mut b, &mut src), SpawnResult::NoSpawn);
/// ```
pub fn spawn_tile<S: SpawnSource + ?Sized>(board: &mut Board, source: &mut S) -> SpawnResult {
    let empty: Vec<Position> = board.empty_cells().collect();
    if empty.is_empty() {
        trace!("spawn skipped: board is full");
        return SpawnResult::NoSpawn;
    }
    let pick = source.choose(empty.len());
    debug_assert!(pick < empty.len(), "spawn source returned {pick} for {} cells", empty.len());
    let pos = empty[pick % empty.len()];
    *board.cell_mut(pos) = Cell {
        value: SPAWN_TILE,
        merged_this_move: false,
    };
    trace!("spawned tile at {pos} ({} empty before)", empty.len());
    SpawnResult::Spawned(pos)
}

/// Spawn the post-move tile and re-derive whether any move remains.
pub fn settle<S: SpawnSource + ?Sized>(board: &mut Board, source: &mut S) -> Settlement {
    let spawn = spawn_tile(board, source);
    Settlement {
        spawn,
        has_legal_move: has_legal_move(board),
    }
}

/// Create an empty board and spawn `initial_tiles` tiles into it.
pub fn new_game<S: SpawnSource + ?Sized>(
    rows: usize,
    columns: usize,
    initial_tiles: usize,
    source: &mut S,
) -> Result<Board, EngineError> {
    let mut board = Board::new(rows, columns)?;
    for _ in 0..initial_tiles {
        if spawn_tile(&mut board, source) == SpawnResult::NoSpawn {
            break;
        }
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::source::{RngSource, ScriptedSource};

    fn board(rows: &[&[Tile]]) -> Board {
        Board::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    fn shift_row(row: &[Tile], direction: Direction) -> Vec<Tile> {
        compute_move(&board(&[row]), direction).board.to_rows().remove(0)
    }

    /// Decode `index` as base-`levels` digits into a `rows x columns` board.
    fn enumerate_board(index: usize, rows: usize, columns: usize, levels: usize) -> Board {
        let mut b = Board::new(rows, columns).unwrap();
        let mut rest = index;
        for pos in b.positions().collect::<Vec<_>>() {
            b.set(pos.row, pos.col, (rest % levels) as Tile, false).unwrap();
            rest /= levels;
        }
        b
    }

    fn brute_force_legal(b: &Board) -> bool {
        let grid = b.to_rows();
        for r in 0..b.rows() {
            for c in 0..b.columns() {
                if grid[r][c] == 0 {
                    return true;
                }
                if c + 1 < b.columns() && grid[r][c] == grid[r][c + 1] {
                    return true;
                }
                if r + 1 < b.rows() && grid[r][c] == grid[r + 1][c] {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn it_merges_a_pair_left() {
        let b = board(&[&[1, 1, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]);
        let out = compute_move(&b, Direction::Left);
        assert_eq!(out.board.to_rows()[0], vec![2, 0, 0, 0]);
        assert_eq!(
            out.movements,
            vec![Movement {
                from: Position::new(0, 1),
                to: Position::new(0, 0),
                value: 2,
                merged: true,
            }]
        );
        // input board is untouched
        assert_eq!(b.to_rows()[0], vec![1, 1, 0, 0]);
    }

    #[test]
    fn it_merges_only_the_leading_pair_of_three() {
        let b = board(&[&[1, 1, 1, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]);
        let out = compute_move(&b, Direction::Left);
        assert_eq!(out.board.to_rows()[0], vec![2, 1, 0, 0]);
        assert_eq!(out.movements.len(), 2);
        assert_eq!(out.merges(), 1);
        assert_eq!(out.movements[0].from, Position::new(0, 1));
        assert!(out.movements[0].merged);
        assert_eq!(out.movements[1].from, Position::new(0, 2));
        assert_eq!(out.movements[1].to, Position::new(0, 1));
        assert!(!out.movements[1].merged);
    }

    #[test]
    fn it_shift_row_left() {
        assert_eq!(shift_row(&[0, 0, 0, 0], Direction::Left), vec![0, 0, 0, 0]);
        assert_eq!(shift_row(&[1, 2, 1, 2], Direction::Left), vec![1, 2, 1, 2]);
        assert_eq!(shift_row(&[1, 1, 2, 2], Direction::Left), vec![2, 3, 0, 0]);
        assert_eq!(shift_row(&[1, 0, 0, 1], Direction::Left), vec![2, 0, 0, 0]);
        assert_eq!(shift_row(&[1, 1, 1, 1], Direction::Left), vec![2, 2, 0, 0]);
        assert_eq!(shift_row(&[2, 1, 1, 0], Direction::Left), vec![2, 2, 0, 0]);
    }

    #[test]
    fn it_shift_row_right() {
        assert_eq!(shift_row(&[0, 0, 0, 0], Direction::Right), vec![0, 0, 0, 0]);
        assert_eq!(shift_row(&[1, 2, 1, 2], Direction::Right), vec![1, 2, 1, 2]);
        assert_eq!(shift_row(&[1, 1, 2, 2], Direction::Right), vec![0, 0, 2, 3]);
        assert_eq!(shift_row(&[5, 0, 0, 5], Direction::Right), vec![0, 0, 0, 6]);
        assert_eq!(shift_row(&[0, 2, 2, 2], Direction::Right), vec![0, 0, 2, 3]);
    }

    #[test]
    fn test_move_left() {
        let b = board(&[&[1, 2, 3, 4], &[1, 3, 3, 2], &[2, 0, 0, 2], &[1, 0, 0, 2]]);
        let out = compute_move(&b, Direction::Left);
        assert_eq!(
            out.board.to_rows(),
            vec![vec![1, 2, 3, 4], vec![1, 4, 2, 0], vec![3, 0, 0, 0], vec![1, 2, 0, 0]]
        );
    }

    #[test]
    fn test_move_right() {
        let b = board(&[&[1, 2, 3, 4], &[1, 3, 3, 2], &[2, 0, 0, 2], &[1, 0, 0, 2]]);
        let out = compute_move(&b, Direction::Right);
        assert_eq!(
            out.board.to_rows(),
            vec![vec![1, 2, 3, 4], vec![0, 1, 4, 2], vec![0, 0, 0, 3], vec![0, 0, 1, 2]]
        );
    }

    #[test]
    fn test_move_up() {
        let b = board(&[&[1, 1, 2, 1], &[2, 3, 0, 0], &[3, 3, 0, 0], &[4, 2, 2, 2]]);
        let out = compute_move(&b, Direction::Up);
        assert_eq!(
            out.board.to_rows(),
            vec![vec![1, 1, 3, 1], vec![2, 4, 0, 2], vec![3, 2, 0, 0], vec![4, 0, 0, 0]]
        );
    }

    #[test]
    fn test_move_down() {
        let b = board(&[&[1, 1, 2, 1], &[2, 3, 0, 0], &[3, 3, 0, 0], &[4, 2, 2, 2]]);
        let out = compute_move(&b, Direction::Down);
        assert_eq!(
            out.board.to_rows(),
            vec![vec![1, 0, 0, 0], vec![2, 1, 0, 0], vec![3, 4, 0, 1], vec![4, 2, 3, 2]]
        );
    }

    #[test]
    fn it_orders_movements_from_the_far_wall() {
        let b = board(&[&[1, 0, 0], &[0, 0, 0], &[1, 0, 0]]);
        let out = compute_move(&b, Direction::Down);
        // bottom tile is blocked, top tile merges into it
        assert_eq!(out.movements.len(), 1);
        assert_eq!(out.movements[0].from, Position::new(0, 0));
        assert_eq!(out.movements[0].to, Position::new(2, 0));

        let b = board(&[&[1, 2, 0, 3]]);
        let out = compute_move(&b, Direction::Right);
        let sources: Vec<_> = out.movements.iter().map(|m| m.from.col).collect();
        assert_eq!(sources, vec![1, 0]);
        assert_eq!(out.board.to_rows(), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn it_leaves_blocked_board_alone() {
        let b = board(&[&[1, 2, 1, 2], &[2, 1, 2, 1], &[1, 2, 1, 2], &[2, 1, 2, 1]]);
        assert!(!has_legal_move(&b));
        for d in Direction::ALL {
            let out = compute_move(&b, d);
            assert!(out.is_noop());
            assert_eq!(out.board, b);
        }
    }

    #[test]
    fn it_returns_single_tile_with_opposite_move() {
        for d in Direction::ALL {
            for row in 0..4 {
                for col in 0..4 {
                    let mut b = Board::new(4, 4).unwrap();
                    b.set(row, col, 3, false).unwrap();
                    let there = compute_move(&b, d);
                    let back = compute_move(&there.board, d.opposite());
                    assert_eq!(there.merges() + back.merges(), 0);
                    assert_eq!(back.board, compute_move(&b, d.opposite()).board);
                    if b.neighbor(Position::new(row, col), d.opposite()).is_none() {
                        assert_eq!(back.board.to_rows(), b.to_rows(), "{d} from ({row}, {col})");
                    }
                }
            }
        }
    }

    #[test]
    fn it_works_on_degenerate_shapes() {
        let b = board(&[&[1]]);
        assert!(compute_move(&b, Direction::Up).is_noop());
        let b = board(&[&[1], &[0], &[1]]);
        let out = compute_move(&b, Direction::Up);
        assert_eq!(out.board.to_rows(), vec![vec![2], vec![0], vec![0]]);
        assert!(compute_move(&b, Direction::Left).is_noop());
    }

    #[test]
    fn it_never_merges_past_the_top_level() {
        let b = board(&[&[Tile::MAX, Tile::MAX, 0]]);
        let out = compute_move(&b, Direction::Left);
        assert!(out.is_noop());
        assert_eq!(out.board.to_rows(), vec![vec![Tile::MAX, Tile::MAX, 0]]);

        let out = compute_move(&b, Direction::Right);
        assert_eq!(out.merges(), 0);
        assert_eq!(out.board.to_rows(), vec![vec![0, Tile::MAX, Tile::MAX]]);
        assert_eq!(out.board.occupied_count(), b.occupied_count());

        let b = board(&[&[Tile::MAX - 1, Tile::MAX - 1]]);
        let out = compute_move(&b, Direction::Left);
        assert_eq!(out.board.to_rows(), vec![vec![Tile::MAX, 0]]);
    }

    #[test]
    fn it_checks_legal_moves_exhaustively_2x2() {
        for i in 0..4usize.pow(4) {
            let b = enumerate_board(i, 2, 2, 4);
            let legal = has_legal_move(&b);
            assert_eq!(legal, brute_force_legal(&b), "{b:?}");
            if !legal {
                assert!(Direction::ALL.iter().all(|&d| compute_move(&b, d).is_noop()));
            }
        }
    }

    #[test]
    fn it_conserves_tiles_exhaustively_3x3() {
        for i in 0..3usize.pow(9) {
            let b = enumerate_board(i, 3, 3, 3);
            assert_eq!(has_legal_move(&b), brute_force_legal(&b), "{b:?}");
            for d in Direction::ALL {
                let out = compute_move(&b, d);
                assert_eq!(
                    out.board.occupied_count(),
                    b.occupied_count() - out.merges(),
                    "{d} on {b:?}"
                );
                let mut merge_targets: Vec<_> = out
                    .movements
                    .iter()
                    .filter(|m| m.merged)
                    .map(|m| m.to)
                    .collect();
                let merges = merge_targets.len();
                merge_targets.sort();
                merge_targets.dedup();
                assert_eq!(merge_targets.len(), merges, "double merge: {d} on {b:?}");
                let level_sum = |board: &Board| {
                    board
                        .tiles()
                        .map(|t| if t == 0 { 0 } else { 1u64 << t })
                        .sum::<u64>()
                };
                assert_eq!(level_sum(&out.board), level_sum(&b));
            }
        }
    }

    #[test]
    fn it_spawns_into_the_only_empty_cell() {
        for pick in 0..5 {
            let mut b = board(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
            let mut src = ScriptedSource::new([pick]);
            assert_eq!(
                spawn_tile(&mut b, &mut src),
                SpawnResult::Spawned(Position::new(1, 1))
            );
            assert_eq!(b.get(1, 1).unwrap().value, SPAWN_TILE);
        }
        let mut full = board(&[&[1, 2], &[3, 4]]);
        let mut rng = RngSource::seeded(7);
        assert_eq!(spawn_tile(&mut full, &mut rng), SpawnResult::NoSpawn);
        assert_eq!(full.to_rows(), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn it_spawns_where_the_source_points() {
        let mut b = Board::new(2, 2).unwrap();
        let mut src = ScriptedSource::new([3, 0]);
        assert_eq!(spawn_tile(&mut b, &mut src).position(), Some(Position::new(1, 1)));
        assert_eq!(spawn_tile(&mut b, &mut src).position(), Some(Position::new(0, 0)));
        assert_eq!(b.to_rows(), vec![vec![1, 0], vec![0, 1]]);
    }

    #[test]
    fn it_starts_a_new_game() {
        let mut src = RngSource::seeded(42);
        let b = new_game(4, 4, 2, &mut src).unwrap();
        assert_eq!(b.occupied_count(), 2);
        assert!(b.tiles().all(|t| t == 0 || t == SPAWN_TILE));
        assert!(new_game(0, 4, 2, &mut src).is_err());
        let tiny = new_game(1, 1, 2, &mut src).unwrap();
        assert_eq!(tiny.occupied_count(), 1);
    }

    #[test]
    fn it_settles_and_detects_game_over() {
        let mut b = board(&[&[1, 2], &[0, 3]]);
        let mut src = ScriptedSource::new([0]);
        let s = settle(&mut b, &mut src);
        assert_eq!(s.spawn, SpawnResult::Spawned(Position::new(1, 0)));
        // [[1, 2], [1, 3]] still has the vertical pair
        assert!(s.has_legal_move);

        let mut b = board(&[&[1, 2], &[0, 1]]);
        let s = settle(&mut b, &mut src);
        assert_eq!(b.to_rows(), vec![vec![1, 2], vec![1, 1]]);
        assert!(s.has_legal_move);

        let mut b = board(&[&[1, 2], &[2, 1]]);
        let s = settle(&mut b, &mut src);
        assert_eq!(s.spawn, SpawnResult::NoSpawn);
        assert!(!s.has_legal_move);
    }
}
