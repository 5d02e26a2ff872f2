//! End-to-end behaviour of the search engine on the shipped games.

use mcts::games::gomoku::puzzles::PUZZLES;
use mcts::games::gomoku::{GomokuMove, GomokuState, BLACK, WHITE};
use mcts::games::othello::{OthelloMove, OthelloState};
use mcts::players::{Agent, GreedyPlayer};
use mcts::{GameState, MctsConfig, SearchError, MCTS};

use assert_matches::assert_matches;

fn engine<S: GameState>(iterations: u64, seed: u64) -> MCTS<S> {
    MCTS::new(MctsConfig::default().with_iterations(iterations).with_seed(seed)).unwrap()
}

/// 9x9 board where Black has an open four on row 5 and is to move.
fn open_four() -> GomokuState {
    let moves = [(4, 1), (0, 0), (4, 2), (0, 8), (4, 3), (8, 0), (4, 4), (8, 8)];
    let moves: Vec<GomokuMove> = moves.iter().map(|&(r, c)| GomokuMove(r, c)).collect();
    GomokuState::from_moves(9, &moves).unwrap()
}

#[test]
fn greedy_opens_othello_with_first_symmetric_move() {
    let state = OthelloState::new(8);
    let mv = GreedyPlayer.choose_move(&state, &[]).unwrap();
    assert_eq!(mv, OthelloMove(2, 3));
}

#[test]
fn completing_five_outscores_quiet_moves() {
    let state = open_four();
    assert_eq!(state.get_current_player(), Some(BLACK));

    let mut mcts = engine::<GomokuState>(20_000, 2024);
    let (chosen, stats) = mcts.search(&state).unwrap();

    let winning = [GomokuMove(4, 0), GomokuMove(4, 5)];
    assert!(winning.contains(&chosen), "chose {}", chosen);

    let value_of = |mv: GomokuMove| {
        stats
            .children
            .iter()
            .find(|c| c.mv == mv)
            .map(|c| c.value)
            .unwrap()
    };
    let best_win = winning.iter().map(|&mv| value_of(mv)).fold(0.0, f64::max);
    assert!(best_win > value_of(GomokuMove(0, 4)));
    assert!(best_win > value_of(GomokuMove(8, 4)));
    assert_eq!(stats.root_visits, 20_000);
}

#[test]
fn search_statistics_cover_every_legal_move() {
    let state = OthelloState::new(6);
    let mut mcts = engine::<OthelloState>(1_050, 3);
    let (chosen, stats) = mcts.search(&state).unwrap();

    assert!(state.is_legal(&chosen));
    assert_eq!(stats.iterations, 1_100);
    assert_eq!(u64::from(stats.root_visits), stats.iterations);

    let mut seen: Vec<OthelloMove> = stats.children.iter().map(|c| c.mv).collect();
    seen.sort();
    assert_eq!(seen, state.get_possible_moves());

    let best = stats
        .children
        .iter()
        .map(|c| c.value)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(stats.chosen_child().unwrap().value, best);
}

#[test]
fn equal_seeds_play_equal_games() {
    let play = |seed: u64| {
        let mut mcts = engine::<OthelloState>(200, seed);
        let mut state = OthelloState::new(6);
        let mut moves = Vec::new();
        while !state.is_terminal() {
            let mv = mcts.choose_move(&state).unwrap();
            assert!(state.is_legal(&mv));
            state.make_move(&mv).unwrap();
            moves.push(mv);
        }
        (moves, state.get_winner())
    };
    assert_eq!(play(99), play(99));
}

#[test]
fn forced_block_is_found() {
    let puzzle = &PUZZLES[1];
    let state = puzzle.position().unwrap();
    assert_eq!(state.get_current_player(), Some(WHITE));

    let mut mcts = engine::<GomokuState>(40_000, 7);
    let mv = mcts.choose_move(&state).unwrap();
    assert!(puzzle.is_solution(&mv), "{} missed the block, played {}", puzzle.name, mv);
}

#[test]
fn finished_games_are_refused() {
    let mut state = open_four();
    state.make_move(&GomokuMove(4, 0)).unwrap();
    assert!(state.is_terminal());

    let mut mcts = engine::<GomokuState>(100, 1);
    assert_matches!(mcts.choose_move(&state), Err(SearchError::GameFinished));
}
