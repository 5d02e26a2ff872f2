//! MCTS search implementation.
//!
//! Implements the core MCTS algorithm:
//! 1. Selection: Traverse the tree using UCB1 to find a leaf
//! 2. Expansion: Add one child per legal move and pick one at random
//! 3. Simulation: Play uniformly random moves to the end of the game
//! 4. Backpropagation: Update statistics along the path to the root
//!
//! Every node's value is the win rate of the player who moved into it, so a
//! parent always maximises over its children's own values.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, trace};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::arena::NodeId;
use crate::config::{MctsConfig, ITERATION_BATCH};
use crate::error::SearchError;
use crate::node::SearchNode;
use crate::rollout;
use crate::tree::SearchTree;
use crate::GameState;

/// Statistics of one root child after a search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStatistics<M> {
    pub mv: M,
    pub value: f64,
    pub visits: u32,
}

/// Summary of a finished search, handed to observers and callers.
#[derive(Debug, Clone)]
pub struct SearchStatistics<M> {
    /// Every root child, in sibling-list order
    pub children: Vec<ChildStatistics<M>>,
    /// The move the search settled on
    pub chosen: M,
    /// Iterations run (a positive multiple of the batch size)
    pub iterations: u64,
    pub elapsed: Duration,
    /// Nodes allocated for this decision
    pub total_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
}

impl<M> SearchStatistics<M> {
    pub fn iterations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.iterations as f64 / secs
        } else {
            0.0
        }
    }

    /// Statistics of the chosen move.
    pub fn chosen_child(&self) -> Option<&ChildStatistics<M>>
    where
        M: PartialEq,
    {
        self.children.iter().find(|c| c.mv == self.chosen)
    }
}

/// Receives a summary after every completed search. Purely informational.
pub trait SearchObserver<M> {
    fn on_search_complete(&mut self, stats: &SearchStatistics<M>);
}

impl<M, F> SearchObserver<M> for F
where
    F: FnMut(&SearchStatistics<M>),
{
    fn on_search_complete(&mut self, stats: &SearchStatistics<M>) {
        self(stats)
    }
}

/// The main MCTS engine.
///
/// The engine keeps its generator across calls; the tree is rebuilt from
/// scratch for every decision and cleared before the call returns.
pub struct MCTS<S: GameState> {
    config: MctsConfig,
    rng: Xoshiro256PlusPlus,
    tree: SearchTree<S>,
    observer: Option<Box<dyn SearchObserver<S::Move>>>,
}

impl<S: GameState> fmt::Debug for MCTS<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MCTS")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl<S: GameState> MCTS<S> {
    /// Creates a new MCTS engine.
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            tree: SearchTree::new(config.chunk_size, config.max_nodes),
            config,
            observer: None,
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Restart the generator from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    }

    pub fn set_observer(&mut self, observer: impl SearchObserver<S::Move> + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn with_observer(mut self, observer: impl SearchObserver<S::Move> + 'static) -> Self {
        self.set_observer(observer);
        self
    }

    /// Search from `state` and return the move with the best observed win rate.
    pub fn choose_move(&mut self, state: &S) -> Result<S::Move, SearchError> {
        self.search(state).map(|(mv, _)| mv)
    }

    /// Search from `state` and return the chosen move with its statistics.
    pub fn search(&mut self, state: &S) -> Result<(S::Move, SearchStatistics<S::Move>), SearchError> {
        self.search_with(state, |_| ()).map(|(mv, stats, ())| (mv, stats))
    }

    /// Like [`MCTS::search`], but lets `inspect` look at the finished tree
    /// before it is discarded.
    pub fn search_with<R, F>(
        &mut self,
        state: &S,
        inspect: F,
    ) -> Result<(S::Move, SearchStatistics<S::Move>, R), SearchError>
    where
        F: FnOnce(&SearchTree<S>) -> R,
    {
        let result = self
            .run(state)
            .map(|(mv, stats)| (mv, stats, inspect(&self.tree)));
        self.tree.clear();

        let (mv, stats, inspected) = result?;
        if let Some(observer) = self.observer.as_mut() {
            observer.on_search_complete(&stats);
        }
        Ok((mv, stats, inspected))
    }

    fn run(&mut self, state: &S) -> Result<(S::Move, SearchStatistics<S::Move>), SearchError> {
        if state.is_terminal() {
            return Err(SearchError::GameFinished);
        }

        let start = Instant::now();
        self.tree.reset(state.clone())?;

        let mut iterations = 0u64;
        loop {
            for _ in 0..ITERATION_BATCH {
                self.iterate()?;
            }
            iterations += ITERATION_BATCH;
            if self.config.budget.is_exhausted(start.elapsed(), iterations) {
                break;
            }
        }

        let best = self.tree.best_root_child().ok_or(SearchError::NoLegalMoves)?;
        let chosen = self
            .tree
            .get(best)
            .mv
            .clone()
            .ok_or(SearchError::NoLegalMoves)?;

        let root = self.tree.root();
        let stats = SearchStatistics {
            children: self
                .tree
                .children(root)
                .filter_map(|(_, child)| {
                    child.mv.clone().map(|mv| ChildStatistics {
                        mv,
                        value: child.value,
                        visits: child.visits,
                    })
                })
                .collect(),
            chosen,
            iterations,
            elapsed: start.elapsed(),
            total_nodes: self.tree.len(),
            root_visits: self.tree.get(root).visits,
            max_depth: self.tree.max_depth(),
        };
        self.log_summary(&stats);

        Ok((stats.chosen.clone(), stats))
    }

    /// Run a single iteration (select -> expand -> simulate -> backpropagate).
    fn iterate(&mut self) -> Result<(), SearchError> {
        let leaf = self.tree.select(self.config.exploration_bias);

        // Finished positions are simulated directly and never expanded
        let node = if self.tree.get(leaf).state.is_terminal() {
            leaf
        } else {
            self.expand(leaf)?
        };

        let outcome = rollout::playout(&self.tree.get(node).state, &mut self.rng)?;
        self.tree.backpropagate(node, outcome.winner);
        Ok(())
    }

    /// Add one child per legal move of `leaf` and return one of them, chosen
    /// uniformly among the children created by this call.
    fn expand(&mut self, leaf: NodeId) -> Result<NodeId, SearchError> {
        let parent = &self.tree.get(leaf).state;
        let mover = parent.get_current_player();
        let moves = parent.get_possible_moves();
        if moves.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        let successors = moves
            .into_iter()
            .map(|mv| -> Result<(S::Move, S), SearchError> {
                let mut next = parent.clone();
                next.make_move(&mv)?;
                Ok((mv, next))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut created = Vec::with_capacity(successors.len());
        for (mv, next) in successors {
            created.push(self.tree.add_child(leaf, mover, mv, next)?);
        }

        rollout::pick_uniform(&mut self.rng, &created).copied()
    }

    fn log_summary(&self, stats: &SearchStatistics<S::Move>) {
        if log::log_enabled!(log::Level::Trace) {
            for child in &stats.children {
                trace!(
                    "[MCTS] Move: {}, v_i = {:.4}, n_i = {}",
                    child.mv,
                    child.value,
                    child.visits
                );
            }
        }
        if let Some(best) = stats.children.iter().find(|c| c.mv == stats.chosen) {
            debug!(
                "[MCTS] Chosen move: {}, v_i = {:.4}, n_i = {}",
                best.mv, best.value, best.visits
            );
        }
        let node_bytes = std::mem::size_of::<SearchNode<S>>();
        debug!(
            "[MCTS] Iterated {} times in {:.3} sec ({:.0} iter/s), {} nodes created ({} bytes/node, ~{} bytes), depth {}",
            stats.iterations,
            stats.elapsed.as_secs_f64(),
            stats.iterations_per_second(),
            stats.total_nodes,
            node_bytes,
            stats.total_nodes * node_bytes,
            stats.max_depth
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchBudget;
    use crate::error::MoveError;
    use crate::games::gomoku::{GomokuMove, GomokuState};
    use crate::Player;
    use assert_matches::assert_matches;
    use rand::Rng;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Take one or two from a pile; whoever takes the last item wins.
    #[derive(Debug, Clone)]
    struct Countdown {
        pile: u32,
        to_move: Player,
        winner: Option<Player>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Take(u32);

    impl fmt::Display for Take {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "take {}", self.0)
        }
    }

    impl Countdown {
        fn new(pile: u32) -> Self {
            Self { pile, to_move: 1, winner: None }
        }
    }

    impl GameState for Countdown {
        type Move = Take;

        fn get_current_player(&self) -> Option<Player> {
            (self.pile > 0).then_some(self.to_move)
        }

        fn is_terminal(&self) -> bool {
            self.pile == 0
        }

        fn is_draw(&self) -> bool {
            false
        }

        fn get_winner(&self) -> Option<Player> {
            self.winner
        }

        fn get_possible_moves(&self) -> Vec<Take> {
            (1..=self.pile.min(2)).map(Take).collect()
        }

        fn make_move(&mut self, mv: &Take) -> Result<(), MoveError> {
            if self.pile == 0 {
                return Err(MoveError::GameOver);
            }
            if mv.0 == 0 || mv.0 > 2 || mv.0 > self.pile {
                return Err(MoveError::Illegal(mv.to_string()));
            }
            self.pile -= mv.0;
            if self.pile == 0 {
                self.winner = Some(self.to_move);
            }
            self.to_move = -self.to_move;
            Ok(())
        }
    }

    /// A broken game that never ends and never offers a move.
    #[derive(Debug, Clone)]
    struct Stuck;

    impl GameState for Stuck {
        type Move = Take;

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
        fn get_possible_moves(&self) -> Vec<Take> {
            Vec::new()
        }
        fn make_move(&mut self, mv: &Take) -> Result<(), MoveError> {
            Err(MoveError::Illegal(mv.to_string()))
        }
    }

    fn engine<S: GameState>(iterations: u64, seed: u64) -> MCTS<S> {
        MCTS::new(MctsConfig::for_testing().with_iterations(iterations).with_seed(seed)).unwrap()
    }

    #[test]
    fn test_takes_immediate_win() {
        let mut mcts = engine::<Countdown>(1_000, 1);
        assert_eq!(mcts.choose_move(&Countdown::new(2)).unwrap(), Take(2));
    }

    #[test]
    fn test_finds_winning_reply() {
        // Leaving a multiple of three is the only winning plan
        let mut mcts = engine::<Countdown>(3_000, 5);
        assert_eq!(mcts.choose_move(&Countdown::new(4)).unwrap(), Take(1));
        assert_eq!(mcts.choose_move(&Countdown::new(5)).unwrap(), Take(2));
    }

    #[test]
    fn test_root_visits_match_iterations() {
        let mut mcts = engine::<Countdown>(250, 3);
        let (_, stats, root_visits) = mcts
            .search_with(&Countdown::new(7), |tree| tree.get(tree.root()).visits)
            .unwrap();

        assert_eq!(stats.iterations, 300);
        assert_eq!(u64::from(root_visits), stats.iterations);
        assert_eq!(stats.root_visits, 300);
        let child_visits: u32 = stats.children.iter().map(|c| c.visits).sum();
        assert_eq!(child_visits, 300);
    }

    #[test]
    fn test_zero_time_budget_runs_one_batch() {
        let config = MctsConfig::for_testing().with_budget(SearchBudget::Time(Duration::ZERO));
        let mut mcts: MCTS<Countdown> = MCTS::new(config).unwrap();
        let (_, stats) = mcts.search(&Countdown::new(10)).unwrap();
        assert_eq!(stats.iterations, ITERATION_BATCH);
    }

    #[test]
    fn test_values_bounded_and_terminals_unexpanded() {
        let mut mcts = engine::<Countdown>(2_000, 9);
        let (_, _, checked) = mcts
            .search_with(&Countdown::new(6), |tree| {
                let mut terminals = 0;
                for id in tree.walk() {
                    let node = tree.get(id);
                    assert!((0.0..=1.0).contains(&node.value));
                    assert!(node.wins <= f64::from(node.visits));
                    if node.state.is_terminal() {
                        assert!(node.first_child.is_none());
                        terminals += 1;
                    }
                }
                terminals
            })
            .unwrap();
        assert!(checked > 0);
    }

    #[test]
    fn test_tree_is_discarded_after_search() {
        let mut mcts = engine::<Countdown>(100, 2);
        mcts.choose_move(&Countdown::new(8)).unwrap();
        assert!(mcts.tree.is_empty());
    }

    #[test]
    fn test_finished_position_is_rejected() {
        let mut mcts = engine::<Countdown>(100, 2);
        let mut state = Countdown::new(1);
        state.make_move(&Take(1)).unwrap();
        assert_matches!(mcts.choose_move(&state), Err(SearchError::GameFinished));
    }

    #[test]
    fn test_inconsistent_game_is_reported() {
        let mut mcts = engine::<Stuck>(100, 2);
        assert_matches!(mcts.choose_move(&Stuck), Err(SearchError::NoLegalMoves));
        assert!(mcts.tree.is_empty());
    }

    #[test]
    fn test_node_ceiling_is_reported() {
        let config = MctsConfig::for_testing().with_iterations(1_000).with_max_nodes(20);
        let mut mcts: MCTS<GomokuState> = MCTS::new(config).unwrap();
        assert_matches!(
            mcts.choose_move(&GomokuState::new(5)),
            Err(SearchError::NodeBudgetExhausted(_))
        );
    }

    #[test]
    fn test_invalid_bias_is_rejected() {
        let config = MctsConfig::for_testing().with_exploration_bias(0.0);
        assert_matches!(MCTS::<Countdown>::new(config), Err(SearchError::InvalidConfig(_)));
    }

    #[test]
    fn test_seeded_searches_are_identical() {
        let mut state = GomokuState::new(5);
        state.make_move(&GomokuMove(2, 2)).unwrap();

        let snapshot = |tree: &SearchTree<GomokuState>| {
            tree.walk()
                .into_iter()
                .map(|id| {
                    let n = tree.get(id);
                    (n.mv.clone(), n.visits, n.value)
                })
                .collect::<Vec<_>>()
        };

        let mut a = engine::<GomokuState>(400, 77);
        let mut b = engine::<GomokuState>(400, 77);
        let (move_a, _, tree_a) = a.search_with(&state, snapshot).unwrap();
        let (move_b, _, tree_b) = b.search_with(&state, snapshot).unwrap();

        assert_eq!(move_a, move_b);
        assert_eq!(tree_a, tree_b);
    }

    #[test]
    fn test_reseed_restarts_the_stream() {
        let state = Countdown::new(12);
        let mut used = engine::<Countdown>(300, 1);
        used.choose_move(&state).unwrap();
        used.choose_move(&Countdown::new(7)).unwrap();
        used.reseed(31);

        let mut fresh = engine::<Countdown>(300, 31);
        let (move_a, stats_a) = used.search(&state).unwrap();
        let (move_b, stats_b) = fresh.search(&state).unwrap();

        assert_eq!(move_a, move_b);
        assert_eq!(stats_a.children, stats_b.children);
        assert_eq!(stats_a.total_nodes, stats_b.total_nodes);
    }

    #[test]
    fn test_expansion_pick_precedes_rollout_draws() {
        let root = Countdown::new(10);
        for seed in 0..20 {
            let mut mcts = engine::<Countdown>(100, seed);
            mcts.tree.reset(root.clone()).unwrap();
            mcts.iterate().unwrap();

            // Replay: one draw for the expansion, then one per rollout move
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let moves = root.get_possible_moves();
            let picked = moves[rng.random_range(0..moves.len())];
            let mut state = root.clone();
            state.make_move(&picked).unwrap();
            while !state.is_terminal() {
                let moves = state.get_possible_moves();
                state.make_move(&moves[rng.random_range(0..moves.len())]).unwrap();
            }
            let expected_wins = if state.get_winner() == Some(1) { 1.0 } else { 0.0 };

            let tree = &mcts.tree;
            let visited: Vec<(Option<Take>, f64)> = tree
                .children(tree.root())
                .filter(|(_, child)| child.visits == 1)
                .map(|(_, child)| (child.mv, child.wins))
                .collect();
            assert_eq!(visited, vec![(Some(picked), expected_wins)], "seed {}", seed);
            assert_eq!(tree.get(tree.root()).visits, 1);
        }
    }

    #[test]
    fn test_observer_receives_statistics() {
        let seen: Rc<RefCell<Vec<(u64, usize, u32)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut mcts = engine::<Countdown>(200, 4).with_observer(move |stats: &SearchStatistics<Take>| {
            sink.borrow_mut()
                .push((stats.iterations, stats.children.len(), stats.root_visits));
        });

        mcts.choose_move(&Countdown::new(9)).unwrap();
        mcts.choose_move(&Countdown::new(1)).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (200, 2, 200));
        assert_eq!(seen[1], (200, 1, 200));
    }
}
