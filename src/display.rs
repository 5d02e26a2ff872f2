//! Observers of a game in progress.
//!
//! The controller reports every step of a game to a [`GameDisplay`]. All
//! callbacks default to doing nothing, so an observer only implements the
//! events it cares about.

use std::fmt;
use std::io::Write;

use colored::Colorize;
use log::warn;

use crate::game_controller::GameResult;
use crate::{GameState, Player};

pub trait GameDisplay<S: GameState> {
    fn on_game_start(&mut self, _state: &S, _first: &str, _second: &str) {}

    /// Called before the agent to move is asked. `turn` counts from 1.
    fn on_before_move(&mut self, _state: &S, _turn: usize) {}

    fn on_after_move(&mut self, _state: &S, _player: Player, _mv: &S::Move) {}

    fn on_illegal_move(&mut self, _state: &S, _player: Player, _mv: &S::Move) {}

    fn on_game_finish(&mut self, _state: &S, _result: &GameResult<S::Move>) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl<S: GameState> GameDisplay<S> for NullDisplay {}

/// Text transcript of a game.
///
/// Verbosity 0 prints only the start and the result, 1 adds every move, 2
/// adds the board before each move and 3 ends with the full move list.
#[derive(Debug)]
pub struct ConsoleDisplay<W> {
    out: W,
    verbosity: u8,
    write_failed: bool,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, verbosity: u8) -> Self {
        Self {
            out,
            verbosity,
            write_failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args) {
            // Keep playing; report the broken sink once
            if !self.write_failed {
                warn!("game display output failed: {}", e);
                self.write_failed = true;
            }
        }
    }
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout(verbosity: u8) -> Self {
        Self::new(std::io::stdout(), verbosity)
    }
}

impl<S, W> GameDisplay<S> for ConsoleDisplay<W>
where
    S: GameState + fmt::Display,
    W: Write,
{
    fn on_game_start(&mut self, _state: &S, first: &str, second: &str) {
        self.emit(format_args!(
            "A new game has started.\nPlayer 1 ({}): {}\nPlayer 2 ({}): {}\n",
            S::player_label(1),
            first,
            S::player_label(-1),
            second
        ));
    }

    fn on_before_move(&mut self, state: &S, turn: usize) {
        if self.verbosity < 2 {
            return;
        }
        let Some(player) = state.get_current_player() else {
            return;
        };
        self.emit(format_args!(
            "\n{}\n{}'s move\nBoard before move:\n{}\n",
            format!("Turn #{}", turn).bold(),
            S::player_label(player),
            state
        ));
    }

    fn on_after_move(&mut self, _state: &S, player: Player, mv: &S::Move) {
        if self.verbosity < 1 {
            return;
        }
        self.emit(format_args!("{} at {}\n", S::player_label(player), mv));
    }

    fn on_illegal_move(&mut self, _state: &S, player: Player, mv: &S::Move) {
        self.emit(format_args!(
            "{} {} by {}\n",
            "Illegal move:".red(),
            mv,
            S::player_label(player)
        ));
    }

    fn on_game_finish(&mut self, state: &S, result: &GameResult<S::Move>) {
        self.emit(format_args!(
            "The game has finished after {} moves.\n{}\n",
            result.history.len(),
            state
        ));
        if let Some(forfeit) = &result.forfeit {
            self.emit(format_args!(
                "{} forfeited: {}\n",
                S::player_label(forfeit.player),
                forfeit.reason
            ));
        }
        match result.winner {
            Some(winner) => self.emit(format_args!(
                "{}\n",
                format!("{} has won the game.", S::player_label(winner)).bold()
            )),
            None => self.emit(format_args!("The game was a tie.\n")),
        }
        if self.verbosity >= 3 {
            self.emit(format_args!("Moves:\n"));
            for (i, (player, mv)) in result.history.iter().enumerate() {
                self.emit(format_args!("#{}: {} at {}\n", i + 1, S::player_label(*player), mv));
            }
        }
    }
}
