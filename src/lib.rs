//! Water-sort puzzle generation and solvability checking.
//!
//! [`generate_puzzle`] builds a random arrangement of colored cells into
//! bottles, [`is_solvable`] searches every reachable arrangement for one
//! where each bottle is empty or full of a single color.

pub mod config;
pub mod console;
pub mod error;
pub mod gameplay;
pub mod generator;
pub mod model;
pub mod record;
pub mod solver;

pub use config::{AcceptancePolicy, CarvePolicy, ColorPolicy, Config, ConfigBuilder, GameMode};
pub use error::{ConfigError, GenerationError, RecordError};
pub use gameplay::GameEngine;
pub use generator::{ColorCounts, Generated, generate_batch, generate_puzzle, generate_verified};
pub use model::{Bottle, Color, MoveAction, PuzzleState};
pub use record::GameRecord;
pub use solver::{SearchOutcome, Solver, is_solvable};
