use std::io::{self, Write};

use twenty48_rules::engine::Board;

use crate::session::{PendingMove, Summary};

/// Presentation side of the move handshake. `play` must have finished with a
/// move before the session is asked to acknowledge it.
pub trait Presenter {
    fn show(&mut self, board: &Board) -> io::Result<()>;
    fn play(&mut self, pending: &PendingMove) -> io::Result<()>;
    fn game_over(&mut self, summary: Summary) -> io::Result<()>;
}

/// Prints movements and boards as plain text. Playback is instantaneous.
pub struct TextPresenter<W> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn show(&mut self, board: &Board) -> io::Result<()> {
        writeln!(self.out, "{board}")?;
        self.out.flush()
    }

    fn play(&mut self, pending: &PendingMove) -> io::Result<()> {
        writeln!(self.out, "move #{} ({}):", pending.seq, pending.direction)?;
        for m in &pending.movements {
            let verb = if m.merged { "merge" } else { "slide" };
            writeln!(
                self.out,
                "  {verb} {} -> {} = {}",
                m.from,
                m.to,
                1u64 << m.value.min(63)
            )?;
        }
        Ok(())
    }

    fn game_over(&mut self, summary: Summary) -> io::Result<()> {
        writeln!(
            self.out,
            "game over after {} moves; highest tile {}. `new` to restart, `q` to quit.",
            summary.moves,
            1u64 << summary.highest_tile.min(63)
        )?;
        self.out.flush()
    }
}
