//! Terms of the [`crate::evaluation::Profile::Extended`] evaluator: pawn
//! structure, knight placement, rook activity and the bishop pair.
//!
//! All terms are mirrored: the value for the opponent's pieces is subtracted
//! from the value of the perspective player's pieces.

use crate::chess::core::{Piece, PieceKind, Player, BOARD_WIDTH};
use crate::chess::position::Position;
use crate::evaluation::{sign, Value};

/// Bonus per row a pawn has advanced from its starting row.
pub const PAWN_ADVANCEMENT_BONUS: Value = 5;
/// Penalty for a pawn without friendly pawns on the adjacent files.
pub const ISOLATED_PAWN_PENALTY: Value = 15;
/// Bonus for a rook on a file without friendly pawns.
pub const OPEN_FILE_BONUS: Value = 15;
/// Bonus for a rook on the opponent's second rank.
pub const SEVENTH_RANK_BONUS: Value = 20;
/// Bonus for holding both bishops.
pub const BISHOP_PAIR_BONUS: Value = 30;

/// Piece-square table for knights from White's point of view, indexed by
/// `[row][col]`. Black's squares are mirrored vertically.
#[rustfmt::skip]
const KNIGHT_TABLE: [[Value; 8]; 8] = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20,   0,   0,   0,   0, -20, -40],
    [-30,   0,  10,  15,  15,  10,   0, -30],
    [-30,   5,  15,  20,  20,  15,   5, -30],
    [-30,   0,  15,  20,  20,  15,   0, -30],
    [-30,   5,  10,  15,  15,  10,   5, -30],
    [-40, -20,   0,   5,   5,   0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

fn signed_sum(
    position: &Position,
    perspective: Player,
    kind: PieceKind,
    term: impl Fn(&Piece) -> Value,
) -> Value {
    position
        .pieces()
        .filter(|piece| piece.kind() == kind)
        .map(|piece| sign(piece.owner(), perspective) * term(&piece))
        .sum()
}

fn has_pawn_on_file(position: &Position, player: Player, col: i8) -> bool {
    position
        .pieces_of(player)
        .any(|piece| piece.kind() == PieceKind::Pawn && piece.square().col() == col)
}

/// Rewards pawns for the distance travelled towards promotion.
#[must_use]
pub fn pawn_advancement(position: &Position, perspective: Player) -> Value {
    signed_sum(position, perspective, PieceKind::Pawn, |pawn| {
        let travelled = (pawn.square().row() - pawn.owner().pawn_row()).abs();
        Value::from(travelled) * PAWN_ADVANCEMENT_BONUS
    })
}

/// Penalizes pawns with no friendly pawn on either adjacent file.
#[must_use]
pub fn isolated_pawns(position: &Position, perspective: Player) -> Value {
    signed_sum(position, perspective, PieceKind::Pawn, |pawn| {
        let col = pawn.square().col();
        let supported = [col - 1, col + 1]
            .into_iter()
            .filter(|neighbour| (0..BOARD_WIDTH).contains(neighbour))
            .any(|neighbour| has_pawn_on_file(position, pawn.owner(), neighbour));
        if supported {
            0
        } else {
            -ISOLATED_PAWN_PENALTY
        }
    })
}

/// Knights are worth more in the center than on the rim.
#[must_use]
pub fn knight_placement(position: &Position, perspective: Player) -> Value {
    signed_sum(position, perspective, PieceKind::Knight, |knight| {
        let square = knight.square();
        let row = match knight.owner() {
            Player::White => square.row(),
            Player::Black => BOARD_WIDTH - 1 - square.row(),
        };
        KNIGHT_TABLE[row as usize][square.col() as usize]
    })
}

/// Rewards rooks on files without friendly pawns and rooks that reached the
/// opponent's second rank.
#[must_use]
pub fn rook_activity(position: &Position, perspective: Player) -> Value {
    signed_sum(position, perspective, PieceKind::Rook, |rook| {
        let square = rook.square();
        let mut bonus = 0;
        if !has_pawn_on_file(position, rook.owner(), square.col()) {
            bonus += OPEN_FILE_BONUS;
        }
        if square.row() == rook.owner().opponent().pawn_row() {
            bonus += SEVENTH_RANK_BONUS;
        }
        bonus
    })
}

/// Flat bonus for a side that still has at least two bishops.
#[must_use]
pub fn bishop_pair(position: &Position, perspective: Player) -> Value {
    [perspective, perspective.opponent()]
        .into_iter()
        .filter(|&player| {
            position
                .pieces_of(player)
                .filter(|piece| piece.kind() == PieceKind::Bishop)
                .count()
                >= 2
        })
        .map(|player| sign(player, perspective) * BISHOP_PAIR_BONUS)
        .sum()
}
