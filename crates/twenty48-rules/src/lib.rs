//! twenty48-rules: the rule engine of a 2048-style tile-merging puzzle.
//!
//! This crate computes board-state transitions only: which tiles slide, which
//! merge, where new tiles spawn, and whether any move remains. Drawing and
//! animation belong to the caller.
//!
//! Quick start:
//! ```
//! use twenty48_rules::engine::{self as GameEngine, Direction, RngSource};
//!
//! // Deterministic game start with a seeded source
//! let mut source = RngSource::seeded(42);
//! let board = GameEngine::new_game(4, 4, 2, &mut source).unwrap();
//!
//! let outcome = GameEngine::compute_move(&board, Direction::Left);
//! let mut next = outcome.board;
//! if !outcome.movements.is_empty() {
//!     // present the movements, then settle
//!     let settled = GameEngine::settle(&mut next, &mut source);
//!     assert!(settled.spawn.position().is_some());
//! }
//! assert!(next.occupied_count() >= 2);
//! ```
//!
//! Values are tile levels: 1 is displayed as 2, 2 as 4, and so on. A merge
//! increments the level by one.

pub mod engine;
pub mod error;

pub use error::EngineError;
