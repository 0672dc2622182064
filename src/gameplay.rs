use tracing::debug;

use crate::config::{Config, GameMode};
use crate::error::GenerationError;
use crate::generator::generate_verified;
use crate::model::*;

/// Live play on top of a generated arrangement.
///
/// The starting state is kept untouched as the restart baseline; only
/// `state` changes as moves are applied.
#[derive(Clone, Debug)]
pub struct GameEngine {
    state: PuzzleState,
    starting_state: PuzzleState,
    history: Vec<MoveAction>,
    mode: GameMode,
}

impl GameEngine {
    pub fn new(starting_state: PuzzleState, mode: GameMode) -> Self {
        Self {
            state: starting_state.clone(),
            starting_state,
            history: Vec::new(),
            mode,
        }
    }

    /// Generate a puzzle under the config's policies and start playing it.
    pub fn from_config(config: &Config, seed: Option<u64>) -> Result<Self, GenerationError> {
        let state = generate_verified(config, seed)?;
        Ok(Self::new(state, config.get_mode()))
    }

    /// Pour from one bottle into another. Illegal moves leave the game
    /// untouched and return false.
    pub fn try_move(&mut self, from: usize, to: usize) -> bool {
        let action = MoveAction::new(from, to);
        if !self.state.apply_move(&action) {
            debug!("Rejected move {}.", action);
            return false;
        }
        self.history.push(action);
        true
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    /// Go back to the starting state. The previous history is dropped and a
    /// new one begins.
    pub fn restart(&mut self) {
        self.state = self.starting_state.clone();
        self.history.clear();
    }

    pub fn get_state(&self) -> &PuzzleState {
        &self.state
    }

    pub fn get_starting_state(&self) -> &PuzzleState {
        &self.starting_state
    }

    pub fn get_history(&self) -> &[MoveAction] {
        &self.history
    }

    pub fn get_mode(&self) -> GameMode {
        self.mode
    }
}
