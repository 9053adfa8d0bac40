use std::time::Duration;

use clap::{Parser, ValueEnum};
use knightfall::chess::core::Player;
use knightfall::evaluation::Profile;
use knightfall::search::{Limit, Searcher};
use knightfall::Engine;
use tracing::Level;

/// Seconds per move when `--exhaustive` is given without `--movetime`.
const DEFAULT_EXHAUSTIVE_MOVETIME: u64 = 10;

/// Which side the engine plays in the console.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    White,
    Black,
    /// The engine only moves when asked to with `go`.
    None,
}

impl Side {
    const fn player(self) -> Option<Player> {
        match self {
            Self::White => Some(Player::White),
            Self::Black => Some(Player::Black),
            Self::None => None,
        }
    }
}

/// Play chess against an Alpha-Beta search engine in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Config {
    /// Search depth in plies.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..))]
    depth: u8,
    /// Deepen the search until every line ends in checkmate or stalemate or
    /// the move time runs out, instead of stopping at the depth.
    #[arg(long, conflicts_with = "depth")]
    exhaustive: bool,
    /// Time budget per engine move in seconds. Defaults to 10 seconds with
    /// `--exhaustive`.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    movetime: Option<u64>,
    /// Side played by the engine.
    #[arg(long, value_enum, default_value_t = Side::Black)]
    engine_plays: Side,
    /// Use the extended evaluator with pawn structure and piece activity.
    #[arg(long)]
    extended: bool,
    /// Log search details.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_max_level(if config.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    knightfall::print_engine_info();

    let limit = if config.exhaustive {
        Limit::Exhaustive
    } else {
        Limit::depth(config.depth)?
    };
    let profile = if config.extended {
        Profile::Extended
    } else {
        Profile::Basic
    };
    let mut searcher = Searcher::with_profile(limit, profile);
    let movetime = config
        .movetime
        .or(config.exhaustive.then_some(DEFAULT_EXHAUSTIVE_MOVETIME));
    if let Some(seconds) = movetime {
        searcher = searcher.with_movetime(Duration::from_secs(seconds));
    }
    tracing::info!(?limit, ?profile, ?movetime, engine_plays = ?config.engine_plays, "starting");

    let mut input = std::io::stdin().lock();
    let mut output = std::io::stdout().lock();
    let mut engine = Engine::new(
        &mut input,
        &mut output,
        searcher,
        config.engine_plays.player(),
    );
    engine.run()
}
