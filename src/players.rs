//! Move pickers that can take a seat in a game.
//!
//! An [`Agent`] is anything that turns a position into a move: the search
//! engine, a uniformly random mover, a one-ply greedy mover for games with a
//! running score, or a person typing coordinates.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::MctsConfig;
use crate::error::{PlayerError, SearchError};
use crate::rollout::pick_uniform;
use crate::search::MCTS;
use crate::{GameState, Player};

/// Moves already played, as `(mover, move)` pairs in order.
pub type History<M> = [(Player, M)];

/// A participant in a game.
pub trait Agent<S: GameState> {
    fn name(&self) -> &str;

    /// Pick a move for the player to move in `state`.
    fn choose_move(&mut self, state: &S, history: &History<S::Move>) -> Result<S::Move, PlayerError>;
}

impl<S: GameState, A: Agent<S> + ?Sized> Agent<S> for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn choose_move(&mut self, state: &S, history: &History<S::Move>) -> Result<S::Move, PlayerError> {
        (**self).choose_move(state, history)
    }
}

/// Games whose positions carry a score that a greedy player can maximise.
pub trait ScoredGame: GameState {
    /// Score of `player` minus the score of the opponent.
    fn score_difference(&self, player: Player) -> i32;
}

/// Plays whatever the search engine picks.
#[derive(Debug)]
pub struct MctsPlayer<S: GameState> {
    engine: MCTS<S>,
}

impl<S: GameState> MctsPlayer<S> {
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        Ok(Self {
            engine: MCTS::new(config)?,
        })
    }

    pub fn from_engine(engine: MCTS<S>) -> Self {
        Self { engine }
    }

    pub fn engine_mut(&mut self) -> &mut MCTS<S> {
        &mut self.engine
    }
}

impl<S: GameState> Agent<S> for MctsPlayer<S> {
    fn name(&self) -> &str {
        "MCTS"
    }

    fn choose_move(&mut self, state: &S, _history: &History<S::Move>) -> Result<S::Move, PlayerError> {
        Ok(self.engine.choose_move(state)?)
    }
}

/// Picks a legal move uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: Xoshiro256PlusPlus,
}

impl RandomPlayer {
    /// `None` seeds from system entropy.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed.unwrap_or_else(rand::random)),
        }
    }
}

impl<S: GameState> Agent<S> for RandomPlayer {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose_move(&mut self, state: &S, _history: &History<S::Move>) -> Result<S::Move, PlayerError> {
        let moves = state.get_possible_moves();
        pick_uniform(&mut self.rng, &moves)
            .cloned()
            .map_err(|_| PlayerError::NoLegalMoves)
    }
}

/// Plays the move that leaves the best score difference one ply ahead.
/// Ties go to the first move in enumeration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPlayer;

impl<S: ScoredGame> Agent<S> for GreedyPlayer {
    fn name(&self) -> &str {
        "Greedy"
    }

    fn choose_move(&mut self, state: &S, _history: &History<S::Move>) -> Result<S::Move, PlayerError> {
        let me = state.get_current_player().ok_or(PlayerError::NoLegalMoves)?;
        let mut best: Option<(S::Move, i32)> = None;
        for mv in state.get_possible_moves() {
            let mut next = state.clone();
            next.make_move(&mv)?;
            let diff = next.score_difference(me);
            match best {
                Some((_, best_diff)) if diff <= best_diff => {}
                _ => best = Some((mv, diff)),
            }
        }
        best.map(|(mv, _)| mv).ok_or(PlayerError::NoLegalMoves)
    }
}

/// Where a [`HumanPlayer`] reads its lines from.
pub trait LineSource {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl<R: BufRead> LineSource for R {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Process stdin, locked only while a line is read so that several players
/// can share it.
#[derive(Debug)]
pub struct StdinLines(io::Stdin);

impl LineSource for StdinLines {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(&mut self.0.lock(), buf)
    }
}

/// Reads moves as text, re-prompting until a legal one is entered.
#[derive(Debug)]
pub struct HumanPlayer<R, W> {
    input: R,
    output: W,
}

impl<R: LineSource, W: Write> HumanPlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl HumanPlayer<StdinLines, io::Stdout> {
    /// Prompt on stdout and read from stdin.
    pub fn stdio() -> Self {
        Self::new(StdinLines(io::stdin()), io::stdout())
    }
}

impl<S, R, W> Agent<S> for HumanPlayer<R, W>
where
    S: GameState,
    S::Move: FromStr,
    <S::Move as FromStr>::Err: Display,
    R: LineSource,
    W: Write,
{
    fn name(&self) -> &str {
        "Human"
    }

    fn choose_move(&mut self, state: &S, _history: &History<S::Move>) -> Result<S::Move, PlayerError> {
        let me = state.get_current_player().ok_or(PlayerError::NoLegalMoves)?;
        let mut line = String::new();
        loop {
            write!(self.output, "{} to move (row col): ", S::player_label(me))?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(PlayerError::InputClosed);
            }
            match line.parse::<S::Move>() {
                Ok(mv) if state.is_legal(&mv) => return Ok(mv),
                Ok(mv) => writeln!(self.output, "{} is not a legal move.", mv)?,
                Err(e) => writeln!(self.output, "Could not read a move: {}", e)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoveError;
    use crate::games::gomoku::{GomokuMove, GomokuState};
    use crate::games::othello::{OthelloMove, OthelloState, DARK};
    use assert_matches::assert_matches;
    use std::io::Cursor;

    #[test]
    fn test_random_player_is_legal_and_seeded() {
        let state = GomokuState::new(7);
        let mut a = RandomPlayer::new(Some(3));
        let mut b = RandomPlayer::new(Some(3));
        for _ in 0..20 {
            let mv = Agent::<GomokuState>::choose_move(&mut a, &state, &[]).unwrap();
            assert!(state.is_legal(&mv));
            assert_eq!(Agent::<GomokuState>::choose_move(&mut b, &state, &[]).unwrap(), mv);
        }
    }

    #[test]
    fn test_greedy_maximises_difference() {
        // (1, 2) flips one disc and comes first; (3, 3) flips two
        let state = OthelloState::from_rows(&["....", "@O..", "....", "@OO."], DARK).unwrap();
        assert_eq!(state.get_possible_moves(), vec![OthelloMove(1, 2), OthelloMove(3, 3)]);
        let mv = GreedyPlayer.choose_move(&state, &[]).unwrap();
        assert_eq!(mv, OthelloMove(3, 3));
    }

    #[test]
    fn test_greedy_takes_first_on_ties() {
        let state = OthelloState::new(8);
        assert_eq!(GreedyPlayer.choose_move(&state, &[]).unwrap(), OthelloMove(2, 3));
    }

    #[test]
    fn test_human_reprompts_until_legal() {
        let input = Cursor::new("hello\n9 9\n1 1\n3 4\n");
        let mut output = Vec::new();
        let mut human = HumanPlayer::new(input, &mut output);

        let state = OthelloState::new(8);
        let mv = human.choose_move(&state, &[]).unwrap();
        assert_eq!(mv, OthelloMove(2, 3));

        let transcript = String::from_utf8(output).unwrap();
        assert_eq!(transcript.matches("Dark to move").count(), 4);
        assert!(transcript.contains("Could not read a move"));
        assert!(transcript.contains("(9, 9) is not a legal move."));
        assert!(transcript.contains("(1, 1) is not a legal move."));
    }

    #[test]
    fn test_human_input_closed() {
        let mut human = HumanPlayer::new(Cursor::new(""), Vec::new());
        let state = GomokuState::new(5);
        assert_matches!(
            Agent::<GomokuState>::choose_move(&mut human, &state, &[]),
            Err(PlayerError::InputClosed)
        );
    }

    #[test]
    fn test_mcts_player_returns_legal_move() {
        let mut player = MctsPlayer::new(MctsConfig::for_testing()).unwrap();
        let mut state = GomokuState::new(5);
        state.make_move(&GomokuMove(2, 2)).unwrap();
        assert_eq!(Agent::<GomokuState>::name(&player), "MCTS");
        let mv = player.choose_move(&state, &[(1, GomokuMove(2, 2))]).unwrap();
        assert!(state.is_legal(&mv));
    }

    #[test]
    fn test_stdio_players_share_stdin() {
        let first = HumanPlayer::stdio();
        let second = HumanPlayer::stdio();
        assert_eq!(Agent::<GomokuState>::name(&first), "Human");
        assert_eq!(Agent::<GomokuState>::name(&second), "Human");
    }

    #[test]
    fn test_mcts_player_exposes_engine() {
        let engine: MCTS<GomokuState> = MCTS::new(MctsConfig::for_testing()).unwrap();
        let mut player = MctsPlayer::from_engine(engine);
        let state = GomokuState::new(5);

        player.engine_mut().reseed(9);
        let first = player.choose_move(&state, &[]).unwrap();
        player.engine_mut().reseed(9);
        assert_eq!(player.choose_move(&state, &[]).unwrap(), first);
        assert_eq!(player.engine_mut().config().seed, Some(42));
    }

    /// Offers one move and then refuses to play it.
    #[derive(Debug, Clone)]
    struct Refusing;

    impl GameState for Refusing {
        type Move = GomokuMove;

        fn get_current_player(&self) -> Option<Player> {
            Some(1)
        }
        fn is_terminal(&self) -> bool {
            false
        }
        fn is_draw(&self) -> bool {
            false
        }
        fn get_winner(&self) -> Option<Player> {
            None
        }
        fn get_possible_moves(&self) -> Vec<GomokuMove> {
            vec![GomokuMove(0, 0)]
        }
        fn make_move(&mut self, mv: &GomokuMove) -> Result<(), MoveError> {
            Err(MoveError::Illegal(mv.to_string()))
        }
    }

    impl ScoredGame for Refusing {
        fn score_difference(&self, _player: Player) -> i32 {
            0
        }
    }

    #[test]
    fn test_greedy_reports_rule_rejection() {
        let err = GreedyPlayer.choose_move(&Refusing, &[]).unwrap_err();
        assert_eq!(err.to_string(), "rules rejected a move: illegal move (1, 1)");
        assert_matches!(err, PlayerError::IllegalMove(MoveError::Illegal(_)));
    }

    #[test]
    fn test_finished_game_has_no_move() {
        let state = OthelloState::from_rows(&["@...", "....", "....", "...O"], DARK).unwrap();
        assert_matches!(GreedyPlayer.choose_move(&state, &[]), Err(PlayerError::NoLegalMoves));
        let mut random = RandomPlayer::new(Some(1));
        assert_matches!(
            Agent::<OthelloState>::choose_move(&mut random, &state, &[]),
            Err(PlayerError::NoLegalMoves)
        );
    }
}
