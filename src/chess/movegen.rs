//! Legal move generation.
//!
//! Generation is two-phase: first the pseudo-legal destinations are produced
//! from the movement pattern of the piece, then every candidate is made on a
//! throwaway copy of the position and kept only if the mover's own king is not
//! in check afterwards. The second phase dominates the cost: one position copy
//! per candidate.

use arrayvec::ArrayVec;

use crate::chess::attacks::{self, KING_OFFSETS, KNIGHT_OFFSETS};
use crate::chess::core::{Move, Piece, PieceKind, Player, Square, BOARD_WIDTH};
use crate::chess::position::{Position, KING_COL};

/// A queen in the middle of an empty board reaches 27 squares, which is the
/// most any single piece can have.
pub const MAX_DESTINATIONS: usize = 32;

/// Destinations of a single piece.
pub type Destinations = ArrayVec<Square, MAX_DESTINATIONS>;

/// Which rook participates in castling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    const fn rook_col(self) -> i8 {
        match self {
            Self::King => BOARD_WIDTH - 1,
            Self::Queen => 0,
        }
    }

    /// Column delta of the king walking towards the rook.
    const fn step(self) -> i8 {
        match self {
            Self::King => 1,
            Self::Queen => -1,
        }
    }
}

impl Position {
    /// Calculates the legal destinations of the piece, i.e. the moves that do
    /// not leave the owner's king in check. It is not required for the piece
    /// to belong to the side to move. A piece that is not on the board has no
    /// moves.
    #[must_use]
    pub fn legal_moves(&self, piece: &Piece) -> Destinations {
        if self.at(piece.square()).as_ref() != Some(piece) {
            return Destinations::new();
        }
        let mut destinations = self.pseudo_legal_moves(piece);
        destinations.retain(|to| {
            !self
                .make_move(piece, *to, true)
                .king_in_check(piece.owner())
        });
        destinations
    }

    /// All legal moves of the side to move.
    #[must_use]
    pub fn generate_moves(&self) -> Vec<Move> {
        self.moves_for(self.side_to_move())
    }

    /// All legal moves of the player's pieces, in row-major order of the
    /// pieces. The order is stable for the same position.
    #[must_use]
    pub fn moves_for(&self, player: Player) -> Vec<Move> {
        // The average branching factor is around 35.
        let mut moves = Vec::with_capacity(48);
        for piece in self.pieces_of(player) {
            moves.extend(
                self.legal_moves(&piece)
                    .into_iter()
                    .map(|to| Move::new(piece, to)),
            );
        }
        moves
    }

    /// Returns `true` as soon as any piece of the player has a legal move.
    #[must_use]
    pub fn has_any_legal_move(&self, player: Player) -> bool {
        self.pieces_of(player)
            .any(|piece| !self.legal_moves(&piece).is_empty())
    }

    /// The player is in check and has no way out of it.
    #[must_use]
    pub fn is_checkmate(&self, player: Player) -> bool {
        self.king_in_check(player) && !self.has_any_legal_move(player)
    }

    /// The player is not in check but has no legal moves.
    ///
    /// Both players need at least one piece on the board. Under legal play the
    /// kings are never captured, so this guard only matters for positions
    /// built by hand.
    #[must_use]
    pub fn is_stalemate(&self, player: Player) -> bool {
        self.both_sides_present()
            && !self.king_in_check(player)
            && !self.has_any_legal_move(player)
    }

    /// Short castling (O-O) is available.
    #[must_use]
    pub fn can_castle_kingside(&self, player: Player) -> bool {
        self.can_castle(player, CastleSide::King)
    }

    /// Long castling (O-O-O) is available.
    #[must_use]
    pub fn can_castle_queenside(&self, player: Player) -> bool {
        self.can_castle(player, CastleSide::Queen)
    }

    /// The king and the rook have never moved, the squares between them are
    /// empty, and the king neither starts on, walks through nor lands on an
    /// attacked square.
    fn can_castle(&self, player: Player, side: CastleSide) -> bool {
        let row = player.back_row();
        let unmoved = |col: i8, kind: PieceKind| {
            self.piece_at(row, col).is_some_and(|piece| {
                piece.owner() == player && piece.kind() == kind && !piece.has_moved()
            })
        };
        if !unmoved(KING_COL, PieceKind::King) || !unmoved(side.rook_col(), PieceKind::Rook) {
            return false;
        }
        let mut between = (KING_COL.min(side.rook_col()) + 1)..KING_COL.max(side.rook_col());
        if between.any(|col| self.piece_at(row, col).is_some()) {
            return false;
        }
        (0..=2)
            .filter_map(|distance| Square::new(row, KING_COL + side.step() * distance))
            .all(|square| !self.is_attacked(square, player.opponent()))
    }

    fn pseudo_legal_moves(&self, piece: &Piece) -> Destinations {
        let mut destinations = Destinations::new();
        match piece.kind() {
            PieceKind::Pawn => self.pawn_moves(piece, &mut destinations),
            PieceKind::Knight => self.step_moves(piece, &KNIGHT_OFFSETS, &mut destinations),
            PieceKind::King => {
                self.step_moves(piece, &KING_OFFSETS, &mut destinations);
                let square = piece.square();
                if self.can_castle_kingside(piece.owner()) {
                    destinations.extend(square.offset(0, 2));
                }
                if self.can_castle_queenside(piece.owner()) {
                    destinations.extend(square.offset(0, -2));
                }
            },
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                self.sliding_moves(piece, &mut destinations);
            },
        }
        destinations
    }

    fn pawn_moves(&self, piece: &Piece, destinations: &mut Destinations) {
        let from = piece.square();
        let owner = piece.owner();
        let direction = owner.pawn_direction();
        if let Some(single) = from.offset(direction, 0).filter(|to| self.is_empty(*to)) {
            destinations.push(single);
            if from.row() == owner.pawn_row() {
                destinations.extend(from.offset(2 * direction, 0).filter(|to| self.is_empty(*to)));
            }
        }
        for side in [-1, 1] {
            let Some(target) = from.offset(direction, side) else {
                continue;
            };
            if self.is_occupied_by(target, owner.opponent()) {
                destinations.push(target);
            } else if self.en_passant_target() == Some(target)
                && from.row() == owner.en_passant_row()
            {
                destinations.push(target);
            }
        }
    }

    fn step_moves(&self, piece: &Piece, offsets: &[(i8, i8)], destinations: &mut Destinations) {
        destinations.extend(
            offsets
                .iter()
                .filter_map(|&(rows, cols)| piece.square().offset(rows, cols))
                .filter(|to| !self.is_occupied_by(*to, piece.owner())),
        );
    }

    fn sliding_moves(&self, piece: &Piece, destinations: &mut Destinations) {
        for &direction in attacks::sliding_directions(piece.kind()) {
            for to in attacks::ray(piece.square(), direction) {
                match self.at(to) {
                    None => destinations.push(to),
                    Some(blocker) => {
                        if blocker.owner() != piece.owner() {
                            destinations.push(to);
                        }
                        break;
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;

    fn setup(placement: &str, side_to_move: Player) -> Position {
        Position::from_placement(placement, side_to_move).unwrap()
    }

    fn get_moves(position: &Position) -> Vec<String> {
        position
            .generate_moves()
            .iter()
            .map(Move::to_string)
            .sorted()
            .collect::<Vec<_>>()
    }

    fn sorted_moves(moves: &[&str]) -> Vec<String> {
        moves
            .iter()
            .map(|m| (*m).to_string())
            .sorted()
            .collect::<Vec<_>>()
    }

    #[test]
    fn starting_moves() {
        assert_eq!(
            get_moves(&Position::starting()),
            sorted_moves(&[
                "a2a3", "a2a4", "b1a3", "b1c3", "b2b3", "b2b4", "c2c3", "c2c4", "d2d3", "d2d4",
                "e2e3", "e2e4", "f2f3", "f2f4", "g1f3", "g1h3", "g2g3", "g2g4", "h2h3", "h2h4"
            ])
        );
    }

    #[test]
    fn basic_moves() {
        assert_eq!(
            get_moves(&setup("2n4k/1PP5/6K1/3P2Q1/3N4/3P4/P3R3/8", Player::White)),
            sorted_moves(&[
                "a2a3", "a2a4", "d5d6", "b7b8q", "b7c8q", "e2e1", "e2e3", "e2e4", "e2e5", "e2e6",
                "e2e7", "e2e8", "e2b2", "e2c2", "e2d2", "e2f2", "e2g2", "e2h2", "d4b3", "d4c2",
                "d4f3", "d4b5", "d4c6", "d4e6", "d4f5", "g5c1", "g5d2", "g5e3", "g5f4", "g5g4",
                "g5g3", "g5g2", "g5g1", "g5h4", "g5e5", "g5f5", "g5h5", "g5h6", "g5f6", "g5e7",
                "g5d8", "g6f5", "g6h5", "g6f6", "g6h6", "g6f7",
            ])
        );
    }

    #[test]
    fn double_check_evasions() {
        assert_eq!(
            get_moves(&setup("3kn3/R2p1N2/8/8/7B/6K1/3R4/8", Player::Black)),
            sorted_moves(&["d8c8"])
        );
        assert_eq!(
            get_moves(&setup("8/5Nk1/7p/4Bp2/3q4/8/8/5KR1", Player::Black)),
            sorted_moves(&["g7f8", "g7f7", "g7h7"])
        );
    }

    #[test]
    fn check_evasions() {
        assert_eq!(
            get_moves(&setup("3kn3/R2p4/8/6B1/8/6K1/3R4/8", Player::Black)),
            sorted_moves(&["e8f6", "d8c8"])
        );
        assert_eq!(
            get_moves(&setup("2R5/8/6k1/8/8/8/PPn5/KR6", Player::White)),
            sorted_moves(&["c8c2"])
        );
    }

    #[test]
    fn pins() {
        // The pawn is pinned and can't move.
        assert_eq!(
            get_moves(&setup("k7/1p6/8/8/8/8/8/4K2B", Player::Black)),
            sorted_moves(&["a8a7", "a8b8"])
        );
        // The pinned rook can only slide along the pin.
        assert_eq!(
            get_moves(&setup("4r2k/8/8/8/8/8/4R3/4K3", Player::White))
                .into_iter()
                .filter(|m| m.starts_with("e2"))
                .collect::<Vec<_>>(),
            sorted_moves(&["e2e3", "e2e4", "e2e5", "e2e6", "e2e7", "e2e8"])
        );
    }

    #[test]
    fn pinned_pawn_captures_en_passant_along_the_pin() {
        let position = Position::from_pieces(
            [
                Piece::new(PieceKind::Queen, Player::Black, Square::try_from("g8").unwrap()),
                Piece::new(PieceKind::King, Player::Black, Square::try_from("h8").unwrap()),
                Piece::new(PieceKind::Pawn, Player::White, Square::try_from("d5").unwrap()).moved(),
                Piece::new(PieceKind::Pawn, Player::Black, Square::try_from("e5").unwrap()).moved(),
                Piece::new(PieceKind::King, Player::White, Square::try_from("a2").unwrap()).moved(),
            ],
            Player::White,
            Square::try_from("e6").ok(),
        )
        .unwrap();
        assert_eq!(
            get_moves(&position),
            sorted_moves(&["a2a1", "a2a3", "a2b1", "a2b2", "a2b3", "d5e6"])
        );
    }

    #[test]
    fn castle() {
        // Can castle both sides.
        assert_eq!(
            get_moves(&setup("r3k2r/8/8/8/8/8/6N1/4K3", Player::Black)),
            sorted_moves(&[
                "a8a7", "a8a6", "a8a5", "a8a4", "a8a3", "a8a2", "a8a1", "a8b8", "a8c8", "a8d8",
                "h8f8", "h8g8", "h8h7", "h8h6", "h8h5", "h8h4", "h8h3", "h8h2", "h8h1", "e8e7",
                "e8d8", "e8d7", "e8f8", "e8f7", "e8c8", "e8g8"
            ])
        );
        // Castling short blocked by a check.
        assert_eq!(
            get_moves(&setup("r3k2r/8/8/8/8/8/6R1/4K3", Player::Black)),
            sorted_moves(&[
                "a8a7", "a8a6", "a8a5", "a8a4", "a8a3", "a8a2", "a8a1", "a8b8", "a8c8", "a8d8",
                "h8f8", "h8g8", "h8h7", "h8h6", "h8h5", "h8h4", "h8h3", "h8h2", "h8h1", "e8e7",
                "e8d8", "e8d7", "e8f8", "e8f7", "e8c8"
            ])
        );
        // Castling long is not blocked: the attacked square is not the one king will
        // walk through.
        assert!(
            setup("r3k2r/8/8/8/8/8/1R6/4K3", Player::Black).can_castle_queenside(Player::Black)
        );
        // Castling long is blocked by an attack and the king is cut off.
        assert_eq!(
            get_moves(&setup("r3k2r/8/8/8/8/8/3R4/4K3", Player::Black)),
            sorted_moves(&[
                "a8a7", "a8a6", "a8a5", "a8a4", "a8a3", "a8a2", "a8a1", "a8b8", "a8c8", "a8d8",
                "h8f8", "h8g8", "h8h7", "h8h6", "h8h5", "h8h4", "h8h3", "h8h2", "h8h1", "e8e7",
                "e8f8", "e8f7", "e8g8"
            ])
        );
    }

    #[test]
    fn perft_positions() {
        // Positions from https://www.chessprogramming.org/Perft_Results that
        // do not involve under-promotions at the tested depth.
        let kiwipete = setup(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R",
            Player::White,
        );
        assert_eq!(get_moves(&kiwipete).len(), 48);
        let position3 = setup("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8", Player::White);
        assert_eq!(get_moves(&position3).len(), 14);
        let position4 = setup(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1",
            Player::White,
        );
        assert_eq!(get_moves(&position4).len(), 6);
    }

    #[test]
    fn foreign_piece_has_no_moves() {
        let position = Position::starting();
        let ghost = Piece::new(
            PieceKind::Queen,
            Player::White,
            Square::try_from("d4").unwrap(),
        );
        assert!(position.legal_moves(&ghost).is_empty());
    }

    #[test]
    fn terminal_states() {
        // Fool's mate.
        let mated = setup(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR",
            Player::White,
        );
        assert!(mated.is_checkmate(Player::White));
        assert!(!mated.is_stalemate(Player::White));
        assert!(!mated.has_any_legal_move(Player::White));

        let stalemate = setup("7k/5Q2/6K1/8/8/8/8/8", Player::Black);
        assert!(stalemate.is_stalemate(Player::Black));
        assert!(!stalemate.is_checkmate(Player::Black));

        // A lone king without an opponent is never stalemated.
        let lonely = setup("8/8/8/8/8/8/8/K7", Player::Black);
        assert!(!lonely.is_stalemate(Player::Black));
        assert!(!lonely.is_checkmate(Player::Black));
    }
}
