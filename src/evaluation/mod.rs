//! This module implements "static" [evaluation], i.e. predicting the relative
//! value of the given position without [`crate::search`].
//!
//! The score is returned in centipawn units from the perspective of the given
//! player: terms favoring the player add to the score, the mirrored terms
//! favoring the opponent subtract from it. Every term is deterministic integer
//! arithmetic over the pieces or the squares of the board.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

use crate::chess::core::Player;
use crate::chess::position::Position;

pub mod material;
pub mod positional;

/// Relative value of a position in centipawns (100 CP = 1 "pawn").
pub type Value = i32;

/// Set of terms the evaluator sums up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    /// Material, center control and king safety.
    #[default]
    Basic,
    /// [`Profile::Basic`] extended with pawn structure and piece activity
    /// terms from [`positional`].
    Extended,
}

/// Evaluates the position with the [`Profile::Basic`] terms.
///
/// ```
/// use knightfall::chess::core::Player;
/// use knightfall::chess::position::Position;
/// use knightfall::evaluation::evaluate;
///
/// assert_eq!(evaluate(&Position::starting(), Player::White), 0);
/// ```
#[must_use]
pub fn evaluate(position: &Position, perspective: Player) -> Value {
    evaluate_with(position, perspective, Profile::Basic)
}

/// Evaluates the position with the terms of the given profile.
#[must_use]
pub fn evaluate_with(position: &Position, perspective: Player, profile: Profile) -> Value {
    let basic = material::material(position, perspective)
        + material::center_control(position, perspective)
        + material::king_safety(position, perspective);
    match profile {
        Profile::Basic => basic,
        Profile::Extended => {
            basic
                + positional::pawn_advancement(position, perspective)
                + positional::isolated_pawns(position, perspective)
                + positional::knight_placement(position, perspective)
                + positional::rook_activity(position, perspective)
                + positional::bishop_pair(position, perspective)
        },
    }
}

/// +1 for the pieces of the perspective player, -1 for the opponent's.
pub(crate) fn sign(owner: Player, perspective: Player) -> Value {
    if owner == perspective {
        1
    } else {
        -1
    }
}
