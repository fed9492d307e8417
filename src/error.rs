use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid move: position {position} is occupied or off the board")]
    InvalidMove { position: usize },

    #[error("no legal move: the position is already decided")]
    NoLegalMove,

    #[error("invalid iteration count {0}: at least one iteration is required")]
    InvalidIterationCount(usize),

    #[error("invalid board: {0}")]
    InvalidBoard(String),
}

pub type Result<T> = std::result::Result<T, Error>;
