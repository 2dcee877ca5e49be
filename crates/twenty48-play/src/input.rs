//! Decoding of keys, swipes and terminal lines into game commands.

use thiserror::Error;
use twenty48_rules::engine::Direction;

use crate::config::InputConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Reset,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum InputError {
    #[error("empty input")]
    Empty,
    #[error("unrecognised command '{0}'")]
    Unknown(String),
    #[error("malformed swipe: {0} (expected `swipe <dx> <dy> <ms>`)")]
    MalformedSwipe(String),
    #[error("swipe ignored: too slow, too short or diagonal")]
    GestureRejected,
}

/// Map a DOM-style key code to a direction.
pub fn direction_for_key(code: &str) -> Option<Direction> {
    match code {
        "KeyA" | "ArrowLeft" => Some(Direction::Left),
        "KeyD" | "ArrowRight" => Some(Direction::Right),
        "KeyW" | "ArrowUp" => Some(Direction::Up),
        "KeyS" | "ArrowDown" => Some(Direction::Down),
        _ => None,
    }
}

fn direction_for_word(word: &str) -> Option<Direction> {
    match word.to_ascii_lowercase().as_str() {
        "a" | "h" | "left" => Some(Direction::Left),
        "d" | "l" | "right" => Some(Direction::Right),
        "w" | "k" | "up" => Some(Direction::Up),
        "s" | "j" | "down" => Some(Direction::Down),
        _ => None,
    }
}

/// A pointer gesture from press to release. Screen y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub dx: f64,
    pub dy: f64,
    pub duration_ms: u64,
}

impl Swipe {
    /// Classify the gesture, or `None` if it is too slow, too short or diagonal.
    ///
    /// When a low `swipe_min_normal` lets both axes qualify, the horizontal
    /// axis wins.
    pub fn classify(&self, cfg: &InputConfig) -> Option<Direction> {
        let fast_enough = self.duration_ms < cfg.swipe_max_time_ms;
        let magnitude = self.dx.hypot(self.dy);
        let long_enough = magnitude > cfg.swipe_min_distance;
        if !(fast_enough && long_enough) {
            return None;
        }
        let (nx, ny) = (self.dx / magnitude, self.dy / magnitude);
        let threshold = cfg.swipe_min_normal;
        if nx > threshold {
            Some(Direction::Right)
        } else if nx < -threshold {
            Some(Direction::Left)
        } else if ny > threshold {
            Some(Direction::Down)
        } else if ny < -threshold {
            Some(Direction::Up)
        } else {
            None
        }
    }
}

/// Parse one terminal line.
///
/// Accepts key codes (`ArrowLeft`, `KeyW`), words and vi/wasd letters,
/// `swipe <dx> <dy> <ms>`, `new`/`r` and `q`/`quit`.
pub fn parse_command(line: &str, cfg: &InputConfig) -> Result<Command, InputError> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err(InputError::Empty);
    };
    if let Some(d) = direction_for_key(head).or_else(|| direction_for_word(head)) {
        return Ok(Command::Move(d));
    }
    match head.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "r" | "new" | "reset" => Ok(Command::Reset),
        "swipe" => {
            let args: Vec<&str> = parts.collect();
            let swipe = parse_swipe(&args)?;
            swipe
                .classify(cfg)
                .map(Command::Move)
                .ok_or(InputError::GestureRejected)
        }
        _ => Err(InputError::Unknown(head.to_string())),
    }
}

fn parse_swipe(args: &[&str]) -> Result<Swipe, InputError> {
    let &[dx, dy, ms] = args else {
        return Err(InputError::MalformedSwipe(format!("{} argument(s)", args.len())));
    };
    let number = |s: &str| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| InputError::MalformedSwipe(format!("'{s}' is not a number")))
    };
    let duration_ms = ms
        .parse::<u64>()
        .map_err(|_| InputError::MalformedSwipe(format!("'{ms}' is not a duration")))?;
    Ok(Swipe {
        dx: number(dx)?,
        dy: number(dy)?,
        duration_ms,
    })
}
