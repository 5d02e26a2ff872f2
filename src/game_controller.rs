//! # Game Controller
//!
//! The `GameController` owns the authoritative position of one game. Every
//! move goes through it and is validated against the game rules before it is
//! applied; agents and displays only ever see the state by reference.
//!
//! [`GameController::play`] runs a whole game between two agents. The agent
//! passed first moves whenever player `1` is to move. An agent that fails to
//! produce a move, or produces an illegal one, forfeits to its opponent.

use log::{info, warn};

use crate::display::GameDisplay;
use crate::error::MoveError;
use crate::players::Agent;
use crate::{GameState, Player};

/// Result of attempting to apply a move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult<M> {
    /// Move was successfully applied
    Success {
        move_made: M,
        player: Player,
        game_over: bool,
        /// Winner if game is over (None for draw)
        winner: Option<Player>,
    },
    /// Move was rejected by the rules
    Invalid { reason: MoveError },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Win(Player),
    Draw,
}

impl GameStatus {
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Why a game ended early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forfeit {
    pub player: Player,
    pub reason: String,
}

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResult<M> {
    /// `None` for a draw
    pub winner: Option<Player>,
    /// Every move attempted, including a final illegal one
    pub history: Vec<(Player, M)>,
    pub forfeit: Option<Forfeit>,
}

impl<M> GameResult<M> {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// The central game controller that owns the authoritative game state
#[derive(Debug, Clone)]
pub struct GameController<S: GameState> {
    game_state: S,
    history: Vec<(Player, S::Move)>,
    status: GameStatus,
}

impl<S: GameState> GameController<S> {
    pub fn new(initial_state: S) -> Self {
        let status = Self::status_of(&initial_state);
        Self {
            game_state: initial_state,
            history: Vec::new(),
            status,
        }
    }

    fn status_of(state: &S) -> GameStatus {
        if !state.is_terminal() {
            GameStatus::InProgress
        } else {
            match state.get_winner() {
                Some(w) => GameStatus::Win(w),
                None => GameStatus::Draw,
            }
        }
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &S::Move) -> Result<(), MoveError> {
        if self.status.is_game_over() {
            return Err(MoveError::GameOver);
        }
        if !self.game_state.is_legal(mv) {
            return Err(MoveError::Illegal(mv.to_string()));
        }
        Ok(())
    }

    /// Validate `mv` and apply it if the rules allow it.
    pub fn try_make_move(&mut self, mv: S::Move) -> MoveResult<S::Move> {
        let Some(player) = self.game_state.get_current_player() else {
            return MoveResult::GameOver;
        };
        if let Err(reason) = self.validate_move(&mv) {
            return MoveResult::Invalid { reason };
        }
        if let Err(reason) = self.game_state.make_move(&mv) {
            return MoveResult::Invalid { reason };
        }

        self.history.push((player, mv.clone()));
        self.status = Self::status_of(&self.game_state);

        let game_over = self.status.is_game_over();
        MoveResult::Success {
            move_made: mv,
            player,
            game_over,
            winner: if game_over { self.game_state.get_winner() } else { None },
        }
    }

    pub fn state(&self) -> &S {
        &self.game_state
    }

    pub fn get_current_player(&self) -> Option<Player> {
        self.game_state.get_current_player()
    }

    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn get_winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    /// Moves applied so far, as `(mover, move)` pairs.
    pub fn history(&self) -> &[(Player, S::Move)] {
        &self.history
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    /// Start over from `new_state`.
    pub fn reset(&mut self, new_state: S) {
        self.status = Self::status_of(&new_state);
        self.game_state = new_state;
        self.history.clear();
    }

    /// Numbered move list followed by the result, one entry per line.
    pub fn format_history(&self) -> String {
        if self.history.is_empty() {
            return String::from("No moves made yet.");
        }
        let mut output = String::new();
        for (i, (player, mv)) in self.history.iter().enumerate() {
            output.push_str(&format!("{}. {} - {}\n", i + 1, S::player_label(*player), mv));
        }
        match self.status {
            GameStatus::Win(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", S::player_label(winner)));
            }
            GameStatus::Draw => output.push_str("\nResult: Draw\n"),
            GameStatus::InProgress => {
                if let Some(player) = self.get_current_player() {
                    output.push_str(&format!("\n(Game in progress - {} to move)\n", S::player_label(player)));
                }
            }
        }
        output
    }

    /// Alternate `first` (player `1`) and `second` (player `-1`) until the
    /// game ends, reporting progress to `display`.
    pub fn play<A, B, D>(&mut self, first: &mut A, second: &mut B, display: &mut D) -> GameResult<S::Move>
    where
        A: Agent<S> + ?Sized,
        B: Agent<S> + ?Sized,
        D: GameDisplay<S> + ?Sized,
    {
        display.on_game_start(&self.game_state, first.name(), second.name());

        let mut forfeit = None;
        while let Some(player) = self.game_state.get_current_player() {
            display.on_before_move(&self.game_state, self.history.len() + 1);

            let choice = if player == 1 {
                first.choose_move(&self.game_state, &self.history)
            } else {
                second.choose_move(&self.game_state, &self.history)
            };
            let mv = match choice {
                Ok(mv) => mv,
                Err(e) => {
                    warn!("{} could not move and forfeits: {}", S::player_label(player), e);
                    forfeit = Some(Forfeit {
                        player,
                        reason: e.to_string(),
                    });
                    break;
                }
            };

            match self.try_make_move(mv.clone()) {
                MoveResult::Success { .. } => display.on_after_move(&self.game_state, player, &mv),
                MoveResult::Invalid { reason } => {
                    self.history.push((player, mv.clone()));
                    display.on_illegal_move(&self.game_state, player, &mv);
                    warn!("{} played {} and forfeits: {}", S::player_label(player), mv, reason);
                    forfeit = Some(Forfeit {
                        player,
                        reason: reason.to_string(),
                    });
                    break;
                }
                MoveResult::GameOver => break,
            }
        }

        let winner = match &forfeit {
            Some(f) => {
                self.status = GameStatus::Win(-f.player);
                Some(-f.player)
            }
            None => self.game_state.get_winner(),
        };
        let result = GameResult {
            winner,
            history: self.history.clone(),
            forfeit,
        };
        info!(
            "game finished after {} moves: {}",
            result.history.len(),
            match result.winner {
                Some(w) => format!("{} wins", S::player_label(w)),
                None => "draw".to_string(),
            }
        );
        display.on_game_finish(&self.game_state, &result);
        result
    }
}

/// Play `state` out between two agents with a fresh controller.
pub fn play_game<S, A, B, D>(state: S, first: &mut A, second: &mut B, display: &mut D) -> GameResult<S::Move>
where
    S: GameState,
    A: Agent<S> + ?Sized,
    B: Agent<S> + ?Sized,
    D: GameDisplay<S> + ?Sized,
{
    GameController::new(state).play(first, second, display)
}
