mod config;
mod input;
mod presenter;
mod session;

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use twenty48_rules::engine::{Direction, RngSource, SpawnSource};

use config::{Config, InputConfig};
use input::{Command, InputError};
use presenter::{Presenter, TextPresenter};
use session::{Screen, Session, SessionError, Submitted, Summary};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Play a 2048-style tile-merging puzzle in the terminal"
)]
struct Cli {
    /// Path to a TOML configuration file (defaults are used without one)
    #[arg(long, value_name = "FILE", value_parser = clap::value_parser!(PathBuf))]
    config: Option<PathBuf>,

    /// Seed for tile spawning (overrides the config file)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Board rows (overrides the config file)
    #[arg(long, value_name = "N")]
    rows: Option<usize>,

    /// Board columns (overrides the config file)
    #[arg(long, value_name = "N")]
    columns: Option<usize>,

    /// Log filter, e.g. "info", "debug", "twenty48_rules=trace"
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log.as_str())).init();

    let config = load_config(&cli)?;
    let source = match config.seed {
        Some(seed) => {
            info!("spawn seed {seed}");
            RngSource::seeded(seed)
        }
        None => RngSource::from_entropy(),
    };
    let mut session = Session::new(config.board.clone(), source)?;
    let mut presenter = TextPresenter::new(io::stdout().lock());
    let summary = run(&mut session, &mut presenter, io::stdin().lock(), &config.input)?;
    info!(
        "session finished: {} moves, highest tile {}",
        summary.moves,
        1u64 << summary.highest_tile.min(63)
    );
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Using configuration file: {}", path.display());
            Config::from_toml(path)?
        }
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(rows) = cli.rows {
        config.board.rows = rows;
    }
    if let Some(columns) = cli.columns {
        config.board.columns = columns;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Top-level loop: boot when needed, then read one command per line until
/// `quit` or end of input.
fn run<S, P, R>(
    session: &mut Session<S>,
    presenter: &mut P,
    input: R,
    input_cfg: &InputConfig,
) -> Result<Summary>
where
    S: SpawnSource,
    P: Presenter,
    R: BufRead,
{
    let mut lines = input.lines();
    loop {
        if session.screen() == Screen::Boot {
            session.boot()?;
            presenter.show(session.board())?;
            if session.screen() == Screen::GameOver {
                presenter.game_over(session.summary())?;
            }
            continue;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        let command = match input::parse_command(&line, input_cfg) {
            Ok(command) => command,
            Err(InputError::Empty) => continue,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Reset => session.reset(),
            Command::Move(direction) => step(session, presenter, direction)?,
        }
        debug_assert!(session.is_idle(), "move left in flight after presentation");
    }
    Ok(session.summary())
}

fn step<S, P>(session: &mut Session<S>, presenter: &mut P, direction: Direction) -> Result<()>
where
    S: SpawnSource,
    P: Presenter,
{
    match session.submit(direction) {
        Ok(Submitted::Pending(pending)) => {
            presenter.play(&pending)?;
            session.acknowledge(pending)?;
            presenter.show(session.board())?;
            if session.screen() == Screen::GameOver {
                presenter.game_over(session.summary())?;
            }
        }
        Ok(Submitted::Blocked) => {}
        Err(SessionError::NotPlaying(screen)) => {
            warn!("move ignored on {screen:?} screen; `new` starts another game");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
