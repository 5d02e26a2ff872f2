//! # play
//!
//! Runs one game of Gomoku or Othello between any two of the MCTS, random,
//! greedy and human players and prints a transcript.
//!
//! ## Usage
//! ```text
//! play --game othello --black mcts --white greedy --think-ms 500
//! play --game gomoku --puzzle 2 --white mcts --iterations 20000 --verbosity 3
//! ```
//! Run with `--release` for meaningful thinking times.

use std::error::Error;
use std::fmt::Display;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use flexi_logger::Logger;
use log::{error, info};

use mcts::display::ConsoleDisplay;
use mcts::game_controller::play_game;
use mcts::games::gomoku::{self, puzzles::PUZZLES, GomokuState};
use mcts::games::othello::{self, OthelloState};
use mcts::players::{Agent, GreedyPlayer, HumanPlayer, MctsPlayer, RandomPlayer};
use mcts::{GameState, MctsConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GameKind {
    Gomoku,
    Othello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    Mcts,
    Random,
    /// Othello only
    Greedy,
    Human,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = GameKind::Gomoku)]
    game: GameKind,

    /// Board size (default: 9 for Gomoku, 8 for Othello)
    #[arg(short, long)]
    size: Option<usize>,

    /// Start Gomoku from one of the built-in 9x9 puzzles (1-4)
    #[arg(long, conflicts_with = "size", value_parser = clap::value_parser!(u8).range(1..=4))]
    puzzle: Option<u8>,

    /// Player moving first (Black / Dark)
    #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
    black: AgentKind,

    /// Player moving second (White / Light)
    #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
    white: AgentKind,

    /// MCTS thinking time per move in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    think_ms: u64,

    /// Fixed MCTS iteration count per move; overrides --think-ms
    #[arg(short, long)]
    iterations: Option<u64>,

    /// UCB1 exploration bias
    #[arg(short = 'e', long, default_value_t = 1.4)]
    bias: f64,

    /// Seed for every random player; each seat derives its own stream
    #[arg(long)]
    seed: Option<u64>,

    /// Node ceiling per MCTS decision
    #[arg(short = 'm', long)]
    max_nodes: Option<usize>,

    /// 0: result only, 1: moves, 2: boards, 3: final move list
    #[arg(short, long, default_value_t = 2)]
    verbosity: u8,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn mcts_config(&self, seat: u64) -> MctsConfig {
        let mut config = MctsConfig::default().with_exploration_bias(self.bias);
        config = match self.iterations {
            Some(n) => config.with_iterations(n),
            None => config.with_thinking_time(Duration::from_millis(self.think_ms)),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed.wrapping_add(seat));
        }
        if let Some(max_nodes) = self.max_nodes {
            config = config.with_max_nodes(max_nodes);
        }
        config
    }

    fn seat_seed(&self, seat: u64) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(seat))
    }
}

type DynAgent<S> = Box<dyn Agent<S>>;

fn build_agent<S>(
    kind: AgentKind,
    args: &Args,
    seat: u64,
    greedy: impl FnOnce() -> Option<DynAgent<S>>,
) -> Result<DynAgent<S>, Box<dyn Error>>
where
    S: GameState + 'static,
    S::Move: FromStr,
    <S::Move as FromStr>::Err: Display,
{
    let agent: DynAgent<S> = match kind {
        AgentKind::Mcts => Box::new(MctsPlayer::new(args.mcts_config(seat))?),
        AgentKind::Random => Box::new(RandomPlayer::new(args.seat_seed(seat))),
        AgentKind::Human => Box::new(HumanPlayer::stdio()),
        AgentKind::Greedy => greedy().ok_or("the greedy player needs a scored game such as Othello")?,
    };
    Ok(agent)
}

fn run_game<S>(state: S, args: &Args, greedy: fn() -> Option<DynAgent<S>>) -> Result<(), Box<dyn Error>>
where
    S: GameState + Display + 'static,
    S::Move: FromStr,
    <S::Move as FromStr>::Err: Display,
{
    let mut first = build_agent(args.black, args, 1, greedy)?;
    let mut second = build_agent(args.white, args, 2, greedy)?;
    let mut display = ConsoleDisplay::stdout(args.verbosity);

    let result = play_game(state, &mut first, &mut second, &mut display);
    if let Some(forfeit) = &result.forfeit {
        info!("{} forfeited: {}", S::player_label(forfeit.player), forfeit.reason);
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    match args.game {
        GameKind::Gomoku => {
            let state = match args.puzzle {
                Some(n) => {
                    let puzzle = &PUZZLES[usize::from(n) - 1];
                    info!(
                        "puzzle {} ({}): {} to move",
                        n,
                        puzzle.name,
                        GomokuState::player_label(puzzle.to_move)
                    );
                    puzzle.position()?
                }
                None => {
                    let size = args.size.unwrap_or(9);
                    if size < gomoku::WIN_LENGTH {
                        return Err(format!("gomoku needs a board of at least {}", gomoku::WIN_LENGTH).into());
                    }
                    GomokuState::new(size)
                }
            };
            run_game(state, args, || None)
        }
        GameKind::Othello => {
            let size = args.size.unwrap_or(8);
            if size % 2 != 0 || !(othello::MIN_SIZE..=othello::MAX_SIZE).contains(&size) {
                return Err(format!(
                    "othello needs an even board size between {} and {}",
                    othello::MIN_SIZE,
                    othello::MAX_SIZE
                )
                .into());
            }
            run_game(OthelloState::new(size), args, || {
                Some(Box::new(GreedyPlayer) as DynAgent<OthelloState>)
            })
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _logger = match Logger::try_with_env_or_str(&args.log_level).and_then(|logger| logger.start()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("failed to start logger: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
