use thiserror::Error;

/// A puzzle configuration that can never produce a valid arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("number of bottles must be at least 1, got {0}")]
    NoBottles(usize),

    #[error("bottle capacity must be at least 1, got {0}")]
    NoCapacity(usize),

    #[error("number of colors must be at least 1, got {0}")]
    NoColors(usize),

    #[error("there must be at least one empty cell to allow movement, got {0}")]
    NoEmptyCells(usize),

    #[error("{empty} empty cells leave no colored cells in {total} total cells")]
    NoColoredCells { total: usize, empty: usize },

    #[error("{colored} colored cells cannot be split into bottles of capacity {capacity}")]
    IndivisibleCells { colored: usize, capacity: usize },

    #[error("{bottles} bottles cannot hold {colors} colors")]
    TooFewBottles { bottles: usize, colors: usize },

    #[error("{bottles} bottles leave no spare bottle for {colors} colors")]
    NoSpareBottle { bottles: usize, colors: usize },

    #[error("{colors} whole bottles of capacity {capacity} need {needed} colored cells, got {colored}")]
    WholeBottleMismatch {
        colors: usize,
        capacity: usize,
        needed: usize,
        colored: usize,
    },

    #[error("{colored} colored cells cannot give each of {colors} colors a cell")]
    TooFewCells { colored: usize, colors: usize },

    #[error("regeneration needs at least one attempt")]
    NoAttempts,

    #[error("search cap must be at least 1")]
    NoSearchCap,

    #[error("invalid game mode {0:?}, expected NORMAL, HIDDEN, 0 or 1")]
    InvalidMode(String),
}

/// Failure to produce an accepted arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The color distribution does not add up to the colored cell count.
    #[error("color distribution holds {actual} cells, expected {expected}")]
    Inconsistent { expected: usize, actual: usize },

    #[error("no solvable puzzle found in {attempts} attempts")]
    Unsolvable { attempts: usize },
}

/// Failure to read or replay a game record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is missing the {0:?} section")]
    MissingSection(&'static str),

    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: expected \"source,destination\", got {content:?}")]
    InvalidMove { line: usize, content: String },

    #[error("line {line}: invalid solved flag {content:?}")]
    InvalidSolvedFlag { line: usize, content: String },

    #[error("bottle {bottle} holds {len} cells, more than capacity {capacity}")]
    OverfullBottle {
        bottle: usize,
        len: usize,
        capacity: usize,
    },

    #[error("bottle {bottle} holds color 0")]
    InvalidColor { bottle: usize },

    #[error("move {index} from bottle {from} to bottle {to} is illegal")]
    IllegalMove { index: usize, from: usize, to: usize },
}
