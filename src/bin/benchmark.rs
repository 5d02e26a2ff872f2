//! Othello thinking-time tournament.
//!
//! Plays MCTS against MCTS for every pair of thinking times in `--times`
//! (Dark's time × Light's time), `--reps` games per pair, and prints the
//! win/tie/loss grid. Games are independent and run in parallel on a rayon
//! pool; each game owns its two engines.

use std::error::Error;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use flexi_logger::Logger;
use log::{debug, error, info};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use mcts::display::NullDisplay;
use mcts::game_controller::play_game;
use mcts::games::othello::{self, OthelloState, DARK, LIGHT};
use mcts::players::MctsPlayer;
use mcts::{GameState, MctsConfig, Player};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Thinking times in milliseconds, comma separated
    #[arg(short, long, value_delimiter = ',', default_value = "100,200,400,1000,2000,3000")]
    times: Vec<u64>,

    /// Games per (dark time, light time) pair
    #[arg(short, long, default_value_t = 10)]
    reps: usize,

    /// UCB1 exploration bias for both sides
    #[arg(short, long, default_value_t = 0.4)]
    bias: f64,

    /// Othello board size
    #[arg(short, long, default_value_t = 8)]
    size: usize,

    /// Worker threads (default: number of logical CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Base seed; every engine derives its own stream from it
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Tally for one cell of the grid.
#[derive(Debug, Clone, Copy, Default)]
struct CellResult {
    dark_ms: u64,
    light_ms: u64,
    dark_wins: usize,
    ties: usize,
    light_wins: usize,
}

impl CellResult {
    fn record(&mut self, winner: Option<Player>) {
        match winner {
            Some(DARK) => self.dark_wins += 1,
            Some(LIGHT) => self.light_wins += 1,
            _ => self.ties += 1,
        }
    }
}

struct Game {
    cell: usize,
    dark_ms: u64,
    light_ms: u64,
    index: u64,
}

fn engine_config(args: &Args, think_ms: u64, seed: Option<u64>) -> MctsConfig {
    let config = MctsConfig::default()
        .with_exploration_bias(args.bias)
        .with_thinking_time(Duration::from_millis(think_ms));
    match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}

fn play_one(args: &Args, game: &Game) -> Result<Option<Player>, Box<dyn Error + Send + Sync>> {
    let seed = |seat: u64| args.seed.map(|s| s.wrapping_add(game.index * 2 + seat));
    let mut dark = MctsPlayer::new(engine_config(args, game.dark_ms, seed(0)))?;
    let mut light = MctsPlayer::new(engine_config(args, game.light_ms, seed(1)))?;

    let result = play_game(OthelloState::new(args.size), &mut dark, &mut light, &mut NullDisplay);
    if let Some(forfeit) = &result.forfeit {
        error!(
            "game {} ({} ms vs {} ms): {} forfeited: {}",
            game.index,
            game.dark_ms,
            game.light_ms,
            OthelloState::player_label(forfeit.player),
            forfeit.reason
        );
    }
    debug!(
        "game {} ({} ms vs {} ms) finished after {} moves, winner {:?}",
        game.index,
        game.dark_ms,
        game.light_ms,
        result.history.len(),
        result.winner
    );
    Ok(result.winner)
}

fn print_grid(cells: &[CellResult]) {
    println!("{:>8} {:>8} {:>6} {:>6} {:>6}", "dark_ms", "light_ms", "dark", "ties", "light");
    for c in cells {
        println!(
            "{:>8} {:>8} {:>6} {:>6} {:>6}",
            c.dark_ms, c.light_ms, c.dark_wins, c.ties, c.light_wins
        );
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    if args.size % 2 != 0 || !(othello::MIN_SIZE..=othello::MAX_SIZE).contains(&args.size) {
        return Err(format!(
            "othello needs an even board size between {} and {}",
            othello::MIN_SIZE,
            othello::MAX_SIZE
        )
        .into());
    }
    if args.times.is_empty() {
        return Err("at least one thinking time is required".into());
    }

    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;

    let mut cells = Vec::new();
    let mut games = Vec::new();
    for &dark_ms in &args.times {
        for &light_ms in &args.times {
            let cell = cells.len();
            cells.push(CellResult {
                dark_ms,
                light_ms,
                ..CellResult::default()
            });
            for _ in 0..args.reps {
                let index = games.len() as u64;
                games.push(Game {
                    cell,
                    dark_ms,
                    light_ms,
                    index,
                });
            }
        }
    }

    println!("Othello MCTS Tournament");
    println!("=======================");
    println!("Board: {}x{}", args.size, args.size);
    println!("Bias: {}", args.bias);
    println!("Games: {} ({} per pairing)", games.len(), args.reps);
    println!("Threads: {}", threads);
    println!("-----------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Thinking times buy far fewer iterations.\nUse --release for meaningful results.\n");

    let start = Instant::now();
    let outcomes: Vec<(usize, Option<Player>)> = pool.install(|| {
        games
            .par_iter()
            .map(|game| play_one(args, game).map(|winner| (game.cell, winner)))
            .collect::<Result<Vec<_>, _>>()
    })?;

    for (cell, winner) in outcomes {
        cells[cell].record(winner);
    }
    info!("tournament finished in {:.1}s", start.elapsed().as_secs_f64());

    print_grid(&cells);
    let dark: usize = cells.iter().map(|c| c.dark_wins).sum();
    let light: usize = cells.iter().map(|c| c.light_wins).sum();
    let ties: usize = cells.iter().map(|c| c.ties).sum();
    println!("-----------------------");
    println!("Total: Dark {} / Tie {} / Light {}", dark, ties, light);
    debug_assert_eq!(dark + light + ties, games.len());
    Ok(())
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
