//! Movement patterns of the pieces and the attack detection built on top of
//! them. The same predicate answers "is the king in check" and "can the king
//! castle through this square".

use crate::chess::core::{PieceKind, Player, Square};
use crate::chess::position::Position;

/// (row, column) deltas of a knight jump.
pub(super) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// (row, column) deltas of a single king step.
pub(super) const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Rook rays: up, down, left, right.
pub(super) const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
/// Bishop rays.
pub(super) const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Returns the sliding directions of the piece kind, empty for non-sliders.
pub(super) fn sliding_directions(kind: PieceKind) -> &'static [(i8, i8)] {
    const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (-1, 1),
        (1, -1),
        (1, 1),
    ];
    match kind {
        PieceKind::Rook => &ORTHOGONAL_DIRECTIONS,
        PieceKind::Bishop => &DIAGONAL_DIRECTIONS,
        PieceKind::Queen => &QUEEN_DIRECTIONS,
        _ => &[],
    }
}

/// Squares along the direction starting next to `from` up to the edge of the
/// board. The caller decides where the ray is blocked.
pub(super) fn ray(from: Square, (rows, cols): (i8, i8)) -> impl Iterator<Item = Square> {
    std::iter::successors(from.offset(rows, cols), move |square| {
        square.offset(rows, cols)
    })
}

impl Position {
    /// Returns `true` if any piece of `by` could capture on `square` this turn.
    ///
    /// Pawns only attack diagonally forward (towards the opponent), sliding
    /// pieces are stopped by the first occupied square on the ray regardless
    /// of its owner.
    #[must_use]
    pub fn is_attacked(&self, square: Square, by: Player) -> bool {
        let attacker_at = |target: Option<Square>, kinds: &[PieceKind]| {
            target
                .and_then(|target| self.at(target))
                .is_some_and(|piece| piece.owner() == by && kinds.contains(&piece.kind()))
        };

        // A pawn of `by` standing one row "behind" the square (from its own
        // point of view) attacks it diagonally.
        let behind = -by.pawn_direction();
        if attacker_at(square.offset(behind, -1), &[PieceKind::Pawn])
            || attacker_at(square.offset(behind, 1), &[PieceKind::Pawn])
        {
            return true;
        }
        if KNIGHT_OFFSETS
            .iter()
            .any(|&(rows, cols)| attacker_at(square.offset(rows, cols), &[PieceKind::Knight]))
        {
            return true;
        }
        if KING_OFFSETS
            .iter()
            .any(|&(rows, cols)| attacker_at(square.offset(rows, cols), &[PieceKind::King]))
        {
            return true;
        }
        let slider_hits = |directions: &[(i8, i8)], kinds: &[PieceKind]| {
            directions.iter().any(|&direction| {
                ray(square, direction)
                    .find_map(|target| self.at(target))
                    .is_some_and(|blocker| {
                        blocker.owner() == by && kinds.contains(&blocker.kind())
                    })
            })
        };
        slider_hits(&ORTHOGONAL_DIRECTIONS, &[PieceKind::Rook, PieceKind::Queen])
            || slider_hits(&DIAGONAL_DIRECTIONS, &[PieceKind::Bishop, PieceKind::Queen])
    }

    /// Returns `true` if the king of the `player` is attacked by the opponent.
    /// A position without that king is never in check.
    #[must_use]
    pub fn king_in_check(&self, player: Player) -> bool {
        self.king(player)
            .is_some_and(|king| self.is_attacked(king.square(), player.opponent()))
    }
}
