//! Boot → Play → GameOver state machine and the caller-owned idle gate.
//!
//! The engine never serialises moves itself; the session does. A move is
//! submitted, handed to the presenter as a [`PendingMove`], and only after the
//! presenter is done does [`Session::acknowledge`] settle the board (spawn a
//! tile, re-check for game over) and reopen the gate.

use log::{debug, info};
use thiserror::Error;
use twenty48_rules::EngineError;
use twenty48_rules::engine::{
    self as GameEngine, Board, Direction, Movement, Settlement, SpawnResult, SpawnSource, Tile,
};

use crate::config::BoardConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Boot,
    Play,
    GameOver,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("a move is still being presented")]
    MoveInFlight,
    #[error("no game in progress (screen: {0:?})")]
    NotPlaying(Screen),
    #[error("acknowledged move #{got} but move #{expected:?} is in flight")]
    StaleAcknowledgement { got: u64, expected: Option<u64> },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Idle/in-flight flag guarding against overlapping moves.
#[derive(Debug, Default)]
pub struct MoveGate {
    in_flight: bool,
}

impl MoveGate {
    pub fn is_idle(&self) -> bool {
        !self.in_flight
    }

    /// Close the gate, failing if a move is already in flight.
    pub fn try_begin(&mut self) -> Result<(), SessionError> {
        if self.in_flight {
            return Err(SessionError::MoveInFlight);
        }
        self.in_flight = true;
        Ok(())
    }

    pub fn acknowledge(&mut self) {
        self.in_flight = false;
    }
}

/// A computed move awaiting presentation.
///
/// `board` is the post-move board before the settling spawn; treat it as
/// read-only until the move is acknowledged.
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub seq: u64,
    pub direction: Direction,
    pub movements: Vec<Movement>,
    pub board: Board,
}

#[derive(Debug)]
pub enum Submitted {
    Pending(PendingMove),
    /// Nothing moved; the gate is already reopened and no tile spawns.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub moves: u64,
    pub highest_tile: Tile,
}

pub struct Session<S> {
    shape: BoardConfig,
    source: S,
    screen: Screen,
    board: Board,
    gate: MoveGate,
    moves: u64,
    in_flight: Option<u64>,
}

impl<S: SpawnSource> Session<S> {
    pub fn new(shape: BoardConfig, source: S) -> Result<Self, SessionError> {
        let board = Board::new(shape.rows, shape.columns)?;
        Ok(Self {
            shape,
            source,
            screen: Screen::Boot,
            board,
            gate: MoveGate::default(),
            moves: 0,
            in_flight: None,
        })
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// The authoritative board (post-spawn once a move is acknowledged).
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_idle(&self) -> bool {
        self.gate.is_idle()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            moves: self.moves,
            highest_tile: self.board.highest_tile(),
        }
    }

    /// Run the Boot screen: fresh board with the initial tiles, then Play.
    pub fn boot(&mut self) -> Result<(), SessionError> {
        self.board = GameEngine::new_game(
            self.shape.rows,
            self.shape.columns,
            self.shape.initial_tiles,
            &mut self.source,
        )?;
        self.gate = MoveGate::default();
        self.in_flight = None;
        self.moves = 0;
        self.screen = if GameEngine::has_legal_move(&self.board) {
            Screen::Play
        } else {
            Screen::GameOver
        };
        info!(
            "new {}x{} game started ({:?})",
            self.shape.rows, self.shape.columns, self.screen
        );
        Ok(())
    }

    /// Compute a move. Fails while another move is in flight.
    pub fn submit(&mut self, direction: Direction) -> Result<Submitted, SessionError> {
        if self.screen != Screen::Play {
            return Err(SessionError::NotPlaying(self.screen));
        }
        self.gate.try_begin()?;
        let outcome = GameEngine::compute_move(&self.board, direction);
        if outcome.is_noop() {
            debug!("{direction}: nothing moved");
            self.gate.acknowledge();
            return Ok(Submitted::Blocked);
        }
        let seq = self.moves + 1;
        self.in_flight = Some(seq);
        Ok(Submitted::Pending(PendingMove {
            seq,
            direction,
            movements: outcome.movements,
            board: outcome.board,
        }))
    }

    /// Accept a presented move: adopt its board, spawn, and reopen the gate.
    pub fn acknowledge(&mut self, pending: PendingMove) -> Result<Settlement, SessionError> {
        if self.in_flight != Some(pending.seq) {
            return Err(SessionError::StaleAcknowledgement {
                got: pending.seq,
                expected: self.in_flight,
            });
        }
        self.board = pending.board;
        let settlement = GameEngine::settle(&mut self.board, &mut self.source);
        self.moves += 1;
        self.in_flight = None;
        self.gate.acknowledge();
        if let SpawnResult::Spawned(pos) = settlement.spawn {
            debug!("move #{} settled, spawned at {pos}", pending.seq);
        }
        if !settlement.has_legal_move {
            self.screen = Screen::GameOver;
            info!(
                "game over after {} moves, highest tile {}",
                self.moves,
                1u64 << self.board.highest_tile().min(63)
            );
        }
        Ok(settlement)
    }

    /// Abandon the current game; the next loop tick boots a new one.
    pub fn reset(&mut self) {
        info!("game reset after {} moves", self.moves);
        self.screen = Screen::Boot;
        self.gate = MoveGate::default();
        self.in_flight = None;
    }
}
