//! Monte Carlo Tree Search for Tic-Tac-Toe.
//!
//! The engine in [`mcts`] only sees positions through the [`Game`] trait;
//! [`Board`] is the Tic-Tac-Toe implementation it ships with.
//!
//! ```
//! use mcts_tic_tac_toe::{search, Board};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let board: Board = "XX. OO. ...".parse().unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! assert_eq!(search(&board, 500, &mut rng), Ok(2));
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod mcts;
pub mod tic_tac_toe;

pub use config::{MctsConfig, Perspective};
pub use error::{Error, Result};
pub use game::Game;
pub use mcts::{rollout, search, Mcts, Node, NodeId, Tree};
pub use tic_tac_toe::{Board, Player, Spot};
