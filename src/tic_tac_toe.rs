use std::{fmt, str::FromStr};

use crate::error::{Error, Result};
use crate::game::Game;

/// Rows, columns and diagonals, as cell indices in row-major order.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spot {
    Empty,
    Filled(Player),
}

/// A Tic-Tac-Toe position. X always opens, so the side to move is read off
/// the mark counts instead of being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    spots: [Spot; 9],
}

impl Board {
    pub const CELLS: usize = 9;

    pub fn new() -> Self {
        Self {
            spots: [Spot::Empty; Self::CELLS],
        }
    }

    pub fn spot(&self, position: usize) -> Option<Spot> {
        self.spots.get(position).copied()
    }

    fn count(&self, player: Player) -> usize {
        self.spots
            .iter()
            .filter(|&&spot| spot == Spot::Filled(player))
            .count()
    }

    fn has_line(&self, player: Player) -> bool {
        LINES
            .iter()
            .any(|line| line.iter().all(|&cell| self.spots[cell] == Spot::Filled(player)))
    }

    pub fn winner(&self) -> Option<Player> {
        [Player::X, Player::O]
            .into_iter()
            .find(|&player| self.has_line(player))
    }

    pub fn is_full(&self) -> bool {
        self.spots.iter().all(|&spot| spot != Spot::Empty)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Board {
    type Move = usize;
    type Player = Player;

    fn legal_moves(&self) -> Vec<usize> {
        self.spots
            .iter()
            .enumerate()
            .filter(|(_, spot)| **spot == Spot::Empty)
            .map(|(position, _)| position)
            .collect()
    }

    fn apply_move(&self, position: usize) -> Result<Self> {
        match self.spot(position) {
            Some(Spot::Empty) => {
                let mut next = *self;
                next.spots[position] = Spot::Filled(self.current_player());
                Ok(next)
            }
            _ => Err(Error::InvalidMove { position }),
        }
    }

    fn current_player(&self) -> Player {
        if self.count(Player::X) <= self.count(Player::O) {
            Player::X
        } else {
            Player::O
        }
    }

    fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    fn result(&self) -> Option<f64> {
        match self.winner() {
            Some(Player::X) => Some(1.0),
            Some(Player::O) => Some(-1.0),
            None if self.is_full() => Some(0.0),
            None => None,
        }
    }

    fn perspective(&self) -> f64 {
        match self.current_player() {
            Player::X => 1.0,
            Player::O => -1.0,
        }
    }
}

/// Parses nine cells written as `X`, `O` (either case) and `.`/`_`/`-` for
/// empty. Whitespace, `|`, `/` and `,` may be used to lay the rows out.
/// Mark counts must be reachable from the empty board and at most one
/// player may hold a line.
impl FromStr for Board {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut spots = Vec::with_capacity(Self::CELLS);
        for c in s.chars() {
            let spot = match c {
                'X' | 'x' => Spot::Filled(Player::X),
                'O' | 'o' => Spot::Filled(Player::O),
                '.' | '_' | '-' => Spot::Empty,
                '|' | '/' | ',' => continue,
                c if c.is_whitespace() => continue,
                other => {
                    return Err(Error::InvalidBoard(format!(
                        "unexpected character {other:?} in {s:?}"
                    )))
                }
            };
            spots.push(spot);
        }

        let spots: [Spot; 9] = spots.try_into().map_err(|cells: Vec<Spot>| {
            Error::InvalidBoard(format!("expected 9 cells, got {} in {s:?}", cells.len()))
        })?;
        let board = Self { spots };

        let (x, o) = (board.count(Player::X), board.count(Player::O));
        if x != o && x != o + 1 {
            return Err(Error::InvalidBoard(format!(
                "unreachable mark counts X={x}, O={o}"
            )));
        }
        if board.has_line(Player::X) && board.has_line(Player::O) {
            return Err(Error::InvalidBoard(format!("both players hold a line in {s:?}")));
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.spots.chunks(3) {
            for spot in row {
                let symbol = match spot {
                    Spot::Empty => ".",
                    Spot::Filled(Player::X) => "X",
                    Spot::Filled(Player::O) => "O",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
