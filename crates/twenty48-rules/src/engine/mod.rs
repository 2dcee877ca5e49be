//! Engine module: board model, move transitions and tile spawning.
//!
//! - `Board` is the `rows x columns` grid with bounds-checked accessors.
//! - Free functions (`compute_move`, `spawn_tile`, ...) are the engine API;
//!   `Board` methods mirror them where an in-place form is handy.
//! - Randomness enters only through `SpawnSource`.

mod ops;
pub mod source;
pub mod state;

pub use state::{Board, Cell, Direction, MoveOutcome, Movement, Position, SpawnResult, Tile};

pub use source::{RngSource, ScriptedSource, SpawnSource};

pub use ops::{SPAWN_TILE, Settlement, compute_move, has_legal_move, new_game, settle, spawn_tile};
