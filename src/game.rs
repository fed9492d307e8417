use std::fmt;

use crate::error::Result;

/// Rules of a two-player, perfect-information game, as seen by the search.
///
/// Implementors are immutable positions: `apply_move` hands back a new
/// position and leaves `self` untouched.
pub trait Game: Clone + PartialEq + fmt::Display {
    type Move: Copy + PartialEq + fmt::Debug;
    type Player: Copy + PartialEq + fmt::Debug;

    /// Moves available from this position, in a fixed order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    fn apply_move(&self, mv: Self::Move) -> Result<Self>;

    fn current_player(&self) -> Self::Player;

    fn is_terminal(&self) -> bool;

    /// Outcome of a finished game from the first player's point of view:
    /// `1.0` win, `0.0` draw, `-1.0` loss. `None` while the game is running.
    fn result(&self) -> Option<f64>;

    /// `1.0` when the first player is to move, `-1.0` otherwise.
    fn perspective(&self) -> f64;
}
