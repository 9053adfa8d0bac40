//! Provides the basic evaluation terms: material advantage using "[standard
//! piece valuations]", occupation of the center and king safety.
//!
//! While not very strong, these terms are great for testing search and other
//! infrastructure, because they are stable, easy to understand and
//! deterministic.
//!
//! [standard piece valuations]: https://en.wikipedia.org/wiki/Chess_piece_relative_value

use crate::chess::core::{PieceKind, Player};
use crate::chess::position::Position;
use crate::evaluation::{sign, Value};

const PAWN_VALUE: Value = 100;
const KNIGHT_VALUE: Value = 320;
const BISHOP_VALUE: Value = 330;
const ROOK_VALUE: Value = 500;
const QUEEN_VALUE: Value = 900;
const KING_VALUE: Value = 20_000;

/// Bonus for each piece standing on one of the four central squares.
pub const CENTER_BONUS: Value = 10;
/// Penalty for the perspective player's king being attacked.
pub const KING_IN_CHECK_PENALTY: Value = 50;

const CENTER: [(i8, i8); 4] = [(3, 3), (3, 4), (4, 3), (4, 4)];

/// Standard value of the piece kind in centipawns.
#[must_use]
pub const fn piece_value(kind: PieceKind) -> Value {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => KING_VALUE,
    }
}

/// Material balance.
#[must_use]
pub fn material(position: &Position, perspective: Player) -> Value {
    position
        .pieces()
        .map(|piece| sign(piece.owner(), perspective) * piece_value(piece.kind()))
        .sum()
}

/// Occupation of d4, e4, d5 and e5.
#[must_use]
pub fn center_control(position: &Position, perspective: Player) -> Value {
    CENTER
        .iter()
        .filter_map(|&(row, col)| position.piece_at(row, col))
        .map(|piece| sign(piece.owner(), perspective) * CENTER_BONUS)
        .sum()
}

/// Penalizes the perspective player's king being in check. Only one side is
/// looked at, so this term is not mirrored for the opponent.
#[must_use]
pub fn king_safety(position: &Position, perspective: Player) -> Value {
    let attacked = position.king(perspective).is_some_and(|king| {
        position.is_attacked(king.square(), perspective.opponent())
    });
    if attacked {
        -KING_IN_CHECK_PENALTY
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(placement: &str) -> Position {
        Position::from_placement(placement, Player::White).unwrap()
    }

    #[test]
    fn starting_position() {
        assert_eq!(material(&Position::starting(), Player::White), 0);
    }

    #[test]
    fn white_advantage() {
        // White is up a knight and a pawn.
        let position = setup("rnbqkb1r/ppppppp1/8/8/8/8/PPPPPPPP/RNBQKBNR");
        assert_eq!(material(&position, Player::White), 420);
        assert_eq!(material(&position, Player::Black), -420);
    }

    #[test]
    fn center_occupation() {
        let position = setup("4k3/8/8/3pP3/3P4/8/8/4K3");
        assert_eq!(center_control(&position, Player::White), 10);
        assert_eq!(center_control(&position, Player::Black), -10);
    }

    #[test]
    fn king_in_check_is_penalized() {
        let position = setup("4k3/8/8/8/8/8/8/r3K3");
        assert_eq!(king_safety(&position, Player::White), -KING_IN_CHECK_PENALTY);
        assert_eq!(king_safety(&position, Player::Black), 0);
    }
}
