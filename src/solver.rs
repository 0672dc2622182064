use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::config::Config;
use crate::model::{Color, PuzzleState};

/// How a search ended, with the number of states it expanded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A goal state was dequeued.
    Solved { expansions: usize },
    /// Every reachable state was expanded without reaching a goal.
    Exhausted { expansions: usize },
    /// The expansion cap ran out first. Treated as unsolvable, although a
    /// goal may lie beyond the cap.
    CapReached { expansions: usize },
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved { .. })
    }

    pub fn get_expansions(&self) -> usize {
        match *self {
            SearchOutcome::Solved { expansions }
            | SearchOutcome::Exhausted { expansions }
            | SearchOutcome::CapReached { expansions } => expansions,
        }
    }
}

/// Breadth-first search over pour moves.
///
/// Queued states are owned clones and are never modified after they are
/// keyed into `visited_states`.
pub struct Solver {
    considering_states: VecDeque<PuzzleState>,
    visited_states: HashSet<Vec<Vec<Color>>>,
    cap: usize,
    expansions: usize,
}

impl Solver {
    pub fn new(starting_state: PuzzleState, cap: usize) -> Solver {
        let mut solver = Solver {
            considering_states: VecDeque::new(),
            visited_states: HashSet::new(),
            cap,
            expansions: 0,
        };
        solver.consider_state(starting_state);
        solver
    }

    fn consider_state(&mut self, state: PuzzleState) {
        if self.visited_states.insert(state.canonical_key()) {
            self.considering_states.push_back(state);
        }
    }

    /// Number of distinct states seen so far, queued or expanded.
    pub fn get_visited_count(&self) -> usize {
        self.visited_states.len()
    }

    pub fn run(&mut self) -> SearchOutcome {
        if let Some(start) = self.considering_states.front()
            && start.fast_is_definitely_unsolvable()
        {
            debug!("Fast unsolvability check failed, skipping search.");
            self.considering_states.clear();
            return SearchOutcome::Exhausted { expansions: 0 };
        }

        let outcome = loop {
            let Some(state) = self.considering_states.pop_front() else {
                break SearchOutcome::Exhausted {
                    expansions: self.expansions,
                };
            };
            if self.expansions >= self.cap {
                break SearchOutcome::CapReached {
                    expansions: self.expansions,
                };
            }
            self.expansions += 1;

            if state.is_solved() {
                break SearchOutcome::Solved {
                    expansions: self.expansions,
                };
            }
            for action in state.get_legal_moves() {
                if let Some(next) = state.with_move(&action) {
                    self.consider_state(next);
                }
            }
        };
        debug!(
            "Search finished: {:?}, {} states visited.",
            outcome,
            self.get_visited_count()
        );
        outcome
    }
}

impl PuzzleState {
    /// Checks whether the goal is out of reach no matter which moves are made.
    /// In a goal state every bottle holding a color is full of it, so each
    /// color's count, and the total free space, must be a sum of some
    /// bottles' capacities. Does not consider that a bottle used for one
    /// color can't be used for another, so `false` proves nothing.
    pub fn fast_is_definitely_unsolvable(&self) -> bool {
        let mut reachable_sizes: HashSet<usize> = HashSet::new();
        reachable_sizes.insert(0);
        for capacity in self.get_container_sizes() {
            let current_sizes: Vec<usize> = reachable_sizes.iter().copied().collect();
            for r in current_sizes {
                reachable_sizes.insert(r + capacity);
            }
        }
        if self
            .get_available_colors_with_count()
            .values()
            .any(|count| !reachable_sizes.contains(count))
        {
            return true;
        }
        // All the empty space must be in whole empty bottles too
        !reachable_sizes.contains(&self.get_empty_spaces_count())
    }
}

/// Decide whether `arrangement` can reach a goal state within the config's
/// search cap.
pub fn is_solvable(arrangement: &PuzzleState, config: &Config) -> bool {
    Solver::new(arrangement.clone(), config.get_search_cap())
        .run()
        .is_solved()
}
