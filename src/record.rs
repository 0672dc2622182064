//! Line-oriented record of a played game: the starting arrangement, every
//! accepted move and whether the game ended solved.
//!
//! ```text
//! Initial Puzzle State
//! 1,2
//! 2,1
//! -
//!
//! Moves History
//! source,destination
//! 0,2
//!
//! Game Solved,true
//! ```
//!
//! An empty bottle is written as `-`.

use std::fmt;

use crate::config::GameMode;
use crate::error::RecordError;
use crate::gameplay::GameEngine;
use crate::model::{Bottle, Color, MoveAction, PuzzleState};

const INITIAL_HEADER: &str = "Initial Puzzle State";
const MOVES_HEADER: &str = "Moves History";
const MOVES_COLUMNS: &str = "source,destination";
const SOLVED_LABEL: &str = "Game Solved";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub initial: Vec<Vec<Color>>,
    pub moves: Vec<MoveAction>,
    pub solved: bool,
}

impl GameRecord {
    pub fn from_game(game: &GameEngine) -> Self {
        Self {
            initial: game.get_starting_state().canonical_key(),
            moves: game.get_history().to_vec(),
            solved: game.is_solved(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let initial_at = lines
            .iter()
            .position(|l| *l == INITIAL_HEADER)
            .ok_or(RecordError::MissingSection(INITIAL_HEADER))?;
        let moves_at = lines
            .iter()
            .position(|l| *l == MOVES_HEADER)
            .ok_or(RecordError::MissingSection(MOVES_HEADER))?;

        let mut initial = Vec::new();
        for (index, line) in lines.iter().enumerate().take(moves_at).skip(initial_at + 1) {
            if line.is_empty() {
                continue;
            }
            if *line == "-" {
                initial.push(Vec::new());
                continue;
            }
            let bottle = line
                .split(',')
                .map(|token| parse_color(token, index + 1))
                .collect::<Result<Vec<_>, _>>()?;
            initial.push(bottle);
        }

        let mut moves = Vec::new();
        let mut solved = false;
        for (index, line) in lines.iter().enumerate().skip(moves_at + 1) {
            if line.is_empty() || *line == MOVES_COLUMNS {
                continue;
            }
            if let Some(flag) = line.strip_prefix(SOLVED_LABEL) {
                solved = match flag.trim_start_matches(',').trim().to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(RecordError::InvalidSolvedFlag {
                            line: index + 1,
                            content: line.to_string(),
                        });
                    }
                };
                break;
            }
            moves.push(parse_move(line, index + 1)?);
        }

        Ok(Self {
            initial,
            moves,
            solved,
        })
    }

    /// Rebuild the game by replaying every recorded move from the initial
    /// arrangement.
    pub fn replay(&self, capacity: usize, mode: GameMode) -> Result<GameEngine, RecordError> {
        let mut bottles = Vec::with_capacity(self.initial.len());
        for (bottle, colors) in self.initial.iter().enumerate() {
            let parsed = Bottle::with_colors(colors.clone(), capacity).ok_or_else(|| {
                if colors.len() > capacity {
                    RecordError::OverfullBottle {
                        bottle,
                        len: colors.len(),
                        capacity,
                    }
                } else {
                    RecordError::InvalidColor { bottle }
                }
            })?;
            bottles.push(parsed);
        }
        let state = PuzzleState::new(bottles);
        let mut game = GameEngine::new(state, mode);
        for (index, action) in self.moves.iter().enumerate() {
            if !game.try_move(action.from_container, action.to_container) {
                return Err(RecordError::IllegalMove {
                    index,
                    from: action.from_container,
                    to: action.to_container,
                });
            }
        }
        Ok(game)
    }
}

fn parse_number(token: &str, line: usize) -> Result<usize, RecordError> {
    token.trim().parse().map_err(|_| RecordError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

fn parse_color(token: &str, line: usize) -> Result<Color, RecordError> {
    match parse_number(token, line)? {
        0 => Err(RecordError::InvalidNumber {
            line,
            token: token.to_string(),
        }),
        color => Ok(color),
    }
}

fn parse_move(content: &str, line: usize) -> Result<MoveAction, RecordError> {
    let mut fields = content.split(',');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(from), Some(to), None) => Ok(MoveAction::new(
            parse_number(from, line)?,
            parse_number(to, line)?,
        )),
        _ => Err(RecordError::InvalidMove {
            line,
            content: content.to_string(),
        }),
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", INITIAL_HEADER)?;
        for bottle in &self.initial {
            if bottle.is_empty() {
                writeln!(f, "-")?;
            } else {
                let cells: Vec<String> = bottle.iter().map(|c| c.to_string()).collect();
                writeln!(f, "{}", cells.join(","))?;
            }
        }
        writeln!(f)?;
        writeln!(f, "{}", MOVES_HEADER)?;
        writeln!(f, "{}", MOVES_COLUMNS)?;
        for action in &self.moves {
            writeln!(f, "{},{}", action.from_container, action.to_container)?;
        }
        writeln!(f)?;
        writeln!(f, "{},{}", SOLVED_LABEL, self.solved)
    }
}
