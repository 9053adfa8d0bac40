//! Provides the authoritative [Chess Position]: pieces on the board, the side
//! to move and the en passant target.
//!
//! A [`Position`] is a persistent value: making a move never mutates the
//! source position, it produces a successor. Search explores sibling branches
//! from the same parent without any undo bookkeeping.
//!
//! [Chess Position]: https://www.chessprogramming.org/Chess_Position

use std::fmt::{self, Write};

use anyhow::{bail, Context};

use crate::chess::core::{Move, Piece, PieceKind, Player, Square, BOARD_SIZE, BOARD_WIDTH};

/// Order of the pieces on the back rank, from the a-file to the h-file.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Column of both kings in the starting position.
pub(super) const KING_COL: i8 = 4;

/// State of the chess game: pieces, side to move and the en passant target.
///
/// Pieces are stored in a mailbox indexed by [`Square`]: "re-finding" a piece
/// in a successor position is a single lookup by its square, and the mailbox
/// itself guarantees that no two pieces share a square.
#[derive(Clone)]
pub struct Position {
    squares: [Option<Piece>; BOARD_SIZE],
    side_to_move: Player,
    /// Square skipped by a pawn that has just advanced two rows. Valid for
    /// exactly one subsequent move.
    en_passant_target: Option<Square>,
}

impl Position {
    /// Creates the starting position of the standard chess variant.
    ///
    /// ```
    /// use knightfall::chess::position::Position;
    ///
    /// let starting_position = Position::starting();
    /// assert_eq!(
    ///     &starting_position.to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
    /// );
    /// assert_eq!(starting_position.pieces().count(), 32);
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut position = Self::empty();
        for player in [Player::White, Player::Black] {
            for (col, kind) in (0..BOARD_WIDTH).zip(BACK_RANK) {
                position.put(kind, player, player.back_row(), col);
                position.put(PieceKind::Pawn, player, player.pawn_row(), col);
            }
        }
        position
    }

    /// Creates an empty board with White to move.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            squares: [None; BOARD_SIZE],
            side_to_move: Player::White,
            en_passant_target: None,
        }
    }

    fn put(&mut self, kind: PieceKind, owner: Player, row: i8, col: i8) {
        if let Some(square) = Square::new(row, col) {
            self.squares[square.index()] = Some(Piece::new(kind, owner, square));
        }
    }

    /// Builds a position from an arbitrary set of pieces.
    ///
    /// # Errors
    ///
    /// The position is rejected if two pieces share a square, a pawn stands on
    /// a back rank or a player has more than one king. An en passant target
    /// must be an empty square that the last double pawn push skipped, with
    /// the pushed pawn just past it.
    pub fn from_pieces(
        pieces: impl IntoIterator<Item = Piece>,
        side_to_move: Player,
        en_passant_target: Option<Square>,
    ) -> anyhow::Result<Self> {
        let mut position = Self {
            side_to_move,
            en_passant_target,
            ..Self::empty()
        };
        for piece in pieces {
            let slot = &mut position.squares[piece.square().index()];
            if let Some(occupant) = slot {
                bail!(
                    "{piece} and {occupant} can not share {}",
                    piece.square()
                );
            }
            if piece.kind() == PieceKind::Pawn
                && (piece.square().row() == 0 || piece.square().row() == BOARD_WIDTH - 1)
            {
                bail!("pawns can not be placed on backranks, got {piece}");
            }
            *slot = Some(piece);
        }
        for player in [Player::White, Player::Black] {
            let kings = position
                .pieces_of(player)
                .filter(|piece| piece.kind() == PieceKind::King)
                .count();
            if kings > 1 {
                bail!("expected at most 1 {player} king, got {kings}");
            }
        }
        if let Some(target) = en_passant_target {
            // The target is behind the pawn that has just been pushed by the
            // opponent of the side to move.
            let pusher = side_to_move.opponent();
            let expected_row = pusher.pawn_row() + pusher.pawn_direction();
            if target.row() != expected_row {
                bail!(
                    "expected en passant target to be on row {expected_row}, got {}",
                    target.row()
                );
            }
            if !position.is_empty(target) {
                bail!("en passant target {target} should be empty");
            }
            let pushed = target
                .offset(pusher.pawn_direction(), 0)
                .and_then(|square| position.at(square))
                .is_some_and(|piece| piece.kind() == PieceKind::Pawn && piece.owner() == pusher);
            if !pushed {
                bail!("expected a {pusher} pawn just past en passant target {target}");
            }
            let origin = target.offset(-pusher.pawn_direction(), 0);
            if origin.is_some_and(|square| !position.is_empty(square)) {
                bail!("the square the {pusher} pawn was pushed from should be empty");
            }
        }
        Ok(position)
    }

    /// Reads the piece placement field of [FEN] (rank 8 first, digits for
    /// runs of empty squares).
    ///
    /// A piece standing on its original square is considered unmoved: pawns
    /// off their starting row as well as kings and rooks off their starting
    /// squares are marked as moved and can not castle.
    ///
    /// ```
    /// use knightfall::chess::core::Player;
    /// use knightfall::chess::position::Position;
    ///
    /// let position = Position::from_placement("4k3/8/8/8/8/8/8/4K2R", Player::White).unwrap();
    /// assert!(position.can_castle_kingside(Player::White));
    /// assert_eq!(position.to_string(), "4k3/8/8/8/8/8/8/4K2R");
    /// ```
    ///
    /// # Errors
    ///
    /// If the placement is malformed or the resulting position is rejected by
    /// [`Position::from_pieces`].
    ///
    /// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
    pub fn from_placement(placement: &str, side_to_move: Player) -> anyhow::Result<Self> {
        let placement = placement.trim();
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != BOARD_WIDTH as usize {
            bail!(
                "placement should have {BOARD_WIDTH} ranks separated by '/', got {}",
                ranks.len()
            );
        }
        let mut pieces = Vec::with_capacity(32);
        for (row, rank) in (0..BOARD_WIDTH).zip(ranks) {
            let mut col = 0;
            for symbol in rank.chars() {
                if let Some(empty) = symbol.to_digit(10) {
                    if !(1..=8).contains(&empty) {
                        bail!("empty square run should be within 1..=8, got {empty}");
                    }
                    #[allow(clippy::cast_possible_truncation)]
                    let empty = empty as i8;
                    col += empty;
                    continue;
                }
                let (owner, kind) = Piece::parse_symbol(symbol)
                    .with_context(|| format!("in rank \"{rank}\""))?;
                let Some(square) = Square::new(row, col) else {
                    bail!("rank \"{rank}\" is longer than {BOARD_WIDTH} squares");
                };
                let piece = Piece::new(kind, owner, square);
                pieces.push(if on_original_square(&piece) {
                    piece
                } else {
                    piece.moved()
                });
                col += 1;
            }
            if col != BOARD_WIDTH {
                bail!("rank \"{rank}\" should span {BOARD_WIDTH} squares, got {col}");
            }
        }
        Self::from_pieces(pieces, side_to_move, None)
    }

    /// The player whose turn it is.
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    /// Square a pawn can capture onto en passant on this move, if any.
    #[must_use]
    pub const fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    /// Returns the piece on the square.
    #[must_use]
    pub const fn at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// Returns the piece at the coordinates. Coordinates outside of the board
    /// are simply empty.
    #[must_use]
    pub fn piece_at(&self, row: i8, col: i8) -> Option<Piece> {
        Square::new(row, col).and_then(|square| self.at(square))
    }

    /// All pieces on the board in row-major order, starting from a8.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.squares.iter().flatten().copied()
    }

    /// Pieces owned by the player in row-major order.
    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |piece| piece.owner() == player)
    }

    /// The king of the player. Positions built by hand may lack one.
    #[must_use]
    pub fn king(&self, player: Player) -> Option<Piece> {
        self.pieces_of(player)
            .find(|piece| piece.kind() == PieceKind::King)
    }

    pub(super) fn is_empty(&self, square: Square) -> bool {
        self.at(square).is_none()
    }

    pub(super) fn is_occupied_by(&self, square: Square, player: Player) -> bool {
        self.at(square).is_some_and(|piece| piece.owner() == player)
    }

    /// Makes a move that was produced by the move generator for this exact
    /// position and returns the successor position with the turn passed to
    /// the opponent.
    ///
    /// ```
    /// use knightfall::chess::core::Square;
    /// use knightfall::chess::position::Position;
    ///
    /// let position = Position::starting();
    /// let pawn = position.at(Square::try_from("e2").unwrap()).unwrap();
    /// let next = position.apply_move(&pawn, Square::try_from("e4").unwrap()).unwrap();
    /// assert_eq!(next.en_passant_target(), Some(Square::try_from("e3").unwrap()));
    /// // The source position is left untouched.
    /// assert!(position.at(Square::try_from("e2").unwrap()).is_some());
    /// ```
    ///
    /// # Errors
    ///
    /// The move is illegal if the piece is not on the board, it is not its
    /// owner's turn or the destination is not one of
    /// [`Position::legal_moves`].
    pub fn apply_move(&self, piece: &Piece, to: Square) -> anyhow::Result<Self> {
        if self.at(piece.square()).as_ref() != Some(piece) {
            bail!("illegal move: {piece} is not on the board");
        }
        if piece.owner() != self.side_to_move {
            bail!(
                "illegal move: {}, it is {}'s turn",
                Move::new(*piece, to),
                self.side_to_move
            );
        }
        if !self.legal_moves(piece).contains(&to) {
            bail!("illegal move: {}", Move::new(*piece, to));
        }
        Ok(self.make_move(piece, to, false))
    }

    /// Same as [`Position::apply_move`] for a [`Move`].
    ///
    /// # Errors
    ///
    /// If the move is illegal in this position.
    pub fn play(&self, next_move: &Move) -> anyhow::Result<Self> {
        self.apply_move(next_move.piece(), next_move.to())
    }

    /// Finds the move of the side to move in coordinate notation, e.g. "e2e4".
    /// A trailing promotion symbol is accepted as long as it is a queen.
    ///
    /// # Errors
    ///
    /// If the notation is malformed or there is no such legal move.
    pub fn parse_move(&self, input: &str) -> anyhow::Result<Move> {
        let input = input.trim();
        if !input.is_ascii() {
            bail!("move should look like \"e2e4\", got \"{input}\"");
        }
        let (squares, promotion) = match input.len() {
            4 => (input, None),
            5 => {
                let (squares, promotion) = input.split_at(4);
                (squares, Some(promotion))
            },
            _ => bail!("move should look like \"e2e4\", got \"{input}\""),
        };
        if promotion.is_some_and(|symbol| symbol != "q") {
            bail!("pawns are always promoted to a queen, got \"{input}\"");
        }
        let from = Square::try_from(&squares[..2])?;
        let to = Square::try_from(&squares[2..])?;
        let Some(piece) = self.at(from) else {
            bail!("illegal move: {from} is empty");
        };
        if piece.owner() != self.side_to_move {
            bail!("illegal move: {piece} belongs to {}", piece.owner());
        }
        if !self.legal_moves(&piece).contains(&to) {
            bail!("illegal move: {input}");
        }
        Ok(Move::new(piece, to))
    }

    /// Moves the piece without checking legality. With `simulate` set, the
    /// side to move is kept: the legality filter uses this to check whether a
    /// move leaves the mover's king in check without advancing the game.
    pub(crate) fn make_move(&self, piece: &Piece, to: Square, simulate: bool) -> Self {
        let mut next = self.clone();
        let from = piece.square();
        let Some(mut moving) = next.squares[from.index()].take() else {
            return next;
        };
        debug_assert_eq!(&moving, piece);

        if moving.kind() == PieceKind::Pawn && to.col() != from.col() && next.is_empty(to) {
            // En passant: the captured pawn stands next to the capturing one.
            if let Some(captured) = Square::new(from.row(), to.col()) {
                let enemy_pawn = next.at(captured).is_some_and(|piece| {
                    piece.kind() == PieceKind::Pawn && piece.owner() != moving.owner()
                });
                if enemy_pawn {
                    next.squares[captured.index()] = None;
                }
            }
        }
        // Ordinary captures are handled by overwriting the destination.
        moving.relocate(to);

        if moving.kind() == PieceKind::King && (to.col() - from.col()).abs() == 2 {
            let (rook_col, rook_destination_col) = if to.col() > from.col() {
                (BOARD_WIDTH - 1, to.col() - 1)
            } else {
                (0, to.col() + 1)
            };
            if let (Some(rook_square), Some(rook_destination)) = (
                Square::new(from.row(), rook_col),
                Square::new(from.row(), rook_destination_col),
            ) {
                if let Some(mut rook) = next.squares[rook_square.index()].take() {
                    rook.relocate(rook_destination);
                    next.squares[rook_destination.index()] = Some(rook);
                }
            }
        }

        if moving.kind() == PieceKind::Pawn && to.row() == moving.owner().promotion_row() {
            moving.promote(PieceKind::Queen);
        }
        next.squares[to.index()] = Some(moving);

        next.en_passant_target =
            if piece.kind() == PieceKind::Pawn && (to.row() - from.row()).abs() == 2 {
                from.offset(piece.owner().pawn_direction(), 0)
            } else {
                None
            };
        if !simulate {
            next.side_to_move = next.side_to_move.opponent();
        }
        next
    }

    /// Returns `true` if both players have at least one piece on the board.
    pub(super) fn both_sides_present(&self) -> bool {
        self.pieces_of(Player::White).next().is_some()
            && self.pieces_of(Player::Black).next().is_some()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

fn on_original_square(piece: &Piece) -> bool {
    let square = piece.square();
    let home = piece.owner().back_row();
    match piece.kind() {
        PieceKind::Pawn => square.row() == piece.owner().pawn_row(),
        PieceKind::King => square.row() == home && square.col() == KING_COL,
        PieceKind::Rook => square.row() == home && (square.col() == 0 || square.col() == 7),
        PieceKind::Knight | PieceKind::Bishop | PieceKind::Queen => true,
    }
}

/// Counts the leaf nodes of the legal move tree of the given depth. A standard
/// way of validating the move generator against [known results].
///
/// [known results]: https://www.chessprogramming.org/Perft_Results
#[must_use]
pub fn perft(position: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = position.generate_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|next_move| {
            perft(
                &position.make_move(next_move.piece(), next_move.to(), false),
                depth - 1,
            )
        })
        .sum()
}

impl fmt::Display for Position {
    /// Prints the piece placement field of FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_WIDTH {
            let mut empty_squares = 0;
            for col in 0..BOARD_WIDTH {
                match self.piece_at(row, col) {
                    Some(piece) => {
                        if empty_squares != 0 {
                            write!(f, "{empty_squares}")?;
                            empty_squares = 0;
                        }
                        f.write_char(piece.symbol())?;
                    },
                    None => empty_squares += 1,
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if row != BOARD_WIDTH - 1 {
                f.write_char('/')?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    /// Dumps the board in a simple format ('.' for empty square, FEN algebraic
    /// symbol for piece) a-la Stockfish "debug" command in UCI mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_WIDTH {
            for col in 0..BOARD_WIDTH {
                f.write_char(self.piece_at(row, col).map_or('.', |piece| piece.symbol()))?;
                if col != BOARD_WIDTH - 1 {
                    f.write_str(SQUARE_SEPARATOR)?;
                }
            }
            if row != BOARD_WIDTH - 1 {
                f.write_str(LINE_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn square(name: &str) -> Square {
        Square::try_from(name).unwrap()
    }

    #[test]
    fn starting_board() {
        let position = Position::starting();
        assert_eq!(
            format!("{position:?}"),
            "r n b q k b n r\n\
             p p p p p p p p\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             P P P P P P P P\n\
             R N B Q K B N R"
        );
        assert_eq!(position.side_to_move(), Player::White);
        assert_eq!(position.en_passant_target(), None);
        assert!(position.pieces().all(|piece| !piece.has_moved()));
    }

    #[test]
    fn out_of_range_queries() {
        let position = Position::starting();
        assert_eq!(position.piece_at(-1, 0), None);
        assert_eq!(position.piece_at(0, 8), None);
        assert_eq!(position.piece_at(4, 4), None);
        assert_eq!(
            position.piece_at(7, 4).map(|piece| piece.kind()),
            Some(PieceKind::King)
        );
    }

    #[test]
    fn placement_roundtrip() {
        for placement in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8",
            "8/8/8/8/8/8/8/8",
        ] {
            assert_eq!(
                Position::from_placement(placement, Player::White)
                    .unwrap()
                    .to_string(),
                placement
            );
        }
    }

    #[test]
    fn placement_marks_displaced_pieces() {
        let position =
            Position::from_placement("r3k3/8/8/8/4P3/8/8/1R2K2R", Player::White).unwrap();
        assert!(!position.at(square("a8")).unwrap().has_moved());
        assert!(!position.at(square("e8")).unwrap().has_moved());
        assert!(position.at(square("b1")).unwrap().has_moved());
        assert!(!position.at(square("h1")).unwrap().has_moved());
        assert!(position.at(square("e4")).unwrap().has_moved());
    }

    #[test]
    fn malformed_placements() {
        assert!(Position::from_placement("8/8/8/8/8/8/8", Player::White).is_err());
        assert!(Position::from_placement("9/8/8/8/8/8/8/8", Player::White).is_err());
        assert!(Position::from_placement("7/8/8/8/8/8/8/8", Player::White).is_err());
        assert!(Position::from_placement("ppppppppp/8/8/8/8/8/8/8", Player::White).is_err());
        assert!(Position::from_placement("x7/8/8/8/8/8/8/8", Player::White).is_err());
    }

    #[test]
    #[should_panic(expected = "pawns can not be placed on backranks")]
    fn pawns_on_backranks() {
        let _ = Position::from_placement("3kr3/8/8/8/8/5Q2/8/1KP5", Player::White).unwrap();
    }

    #[test]
    #[should_panic(expected = "expected at most 1 white king, got 3")]
    fn too_many_kings() {
        let _ = Position::from_placement("1kkk4/8/8/8/8/8/8/1KKK4", Player::White).unwrap();
    }

    #[test]
    fn shared_square_is_rejected() {
        let e4 = square("e4");
        let result = Position::from_pieces(
            [
                Piece::new(PieceKind::Knight, Player::White, e4),
                Piece::new(PieceKind::Bishop, Player::Black, e4),
            ],
            Player::White,
            None,
        );
        assert!(result.unwrap_err().to_string().contains("can not share e4"));
    }

    #[test]
    fn en_passant_target_row() {
        let pawns = [
            Piece::new(PieceKind::Pawn, Player::White, square("e4")).moved(),
            Piece::new(PieceKind::Pawn, Player::Black, square("d4")).moved(),
        ];
        assert!(Position::from_pieces(pawns, Player::Black, Some(square("e3"))).is_ok());
        assert!(Position::from_pieces(pawns, Player::White, Some(square("e3"))).is_err());
        assert!(Position::from_pieces(pawns, Player::Black, Some(square("e4"))).is_err());
    }

    #[test]
    fn en_passant_target_needs_pushed_pawn() {
        let kings = [
            Piece::new(PieceKind::King, Player::White, square("a1")).moved(),
            Piece::new(PieceKind::King, Player::Black, square("h8")).moved(),
        ];
        let pawn = Piece::new(PieceKind::Pawn, Player::White, square("d5")).moved();
        let with = |other: Piece| {
            Position::from_pieces(
                kings.into_iter().chain([pawn, other]),
                Player::White,
                Some(square("e6")),
            )
        };

        assert!(with(Piece::new(PieceKind::Pawn, Player::Black, square("e5")).moved()).is_ok());
        // Not a pawn.
        let error = with(Piece::new(PieceKind::Knight, Player::White, square("e5")).moved())
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "expected a black pawn just past en passant target e6"
        );
        // Not an opponent pawn.
        assert!(with(Piece::new(PieceKind::Pawn, Player::White, square("e5")).moved()).is_err());
        // Nothing was pushed.
        assert!(with(Piece::new(PieceKind::Pawn, Player::Black, square("f5")).moved()).is_err());
        // The target itself is occupied.
        assert!(with(Piece::new(PieceKind::Knight, Player::Black, square("e6")).moved()).is_err());

        // The pushed pawn could not have come from an occupied square.
        let blocked = Position::from_pieces(
            kings.into_iter().chain([
                pawn,
                Piece::new(PieceKind::Pawn, Player::Black, square("e5")).moved(),
                Piece::new(PieceKind::Bishop, Player::Black, square("e7")),
            ]),
            Player::White,
            Some(square("e6")),
        );
        assert!(blocked.is_err());
    }

    #[test]
    fn diagonal_pawn_move_keeps_friendly_pieces() {
        let position = Position::from_pieces(
            [
                Piece::new(PieceKind::King, Player::White, square("a1")).moved(),
                Piece::new(PieceKind::King, Player::Black, square("h8")).moved(),
                Piece::new(PieceKind::Pawn, Player::White, square("d5")).moved(),
                Piece::new(PieceKind::Knight, Player::White, square("e5")).moved(),
            ],
            Player::White,
            None,
        )
        .unwrap();
        let pawn = position.at(square("d5")).unwrap();
        let next = position.make_move(&pawn, square("e6"), true);
        assert_eq!(next.at(square("e5")), position.at(square("e5")));
        assert_eq!(next.at(square("e6")).map(|piece| piece.kind()), Some(PieceKind::Pawn));
        assert_eq!(next.pieces().count(), 4);
    }

    #[test]
    fn en_passant_removes_pushed_pawn() {
        let position = Position::from_pieces(
            [
                Piece::new(PieceKind::King, Player::White, square("a1")).moved(),
                Piece::new(PieceKind::King, Player::Black, square("h8")).moved(),
                Piece::new(PieceKind::Pawn, Player::White, square("d5")).moved(),
                Piece::new(PieceKind::Pawn, Player::Black, square("e5")).moved(),
            ],
            Player::White,
            Some(square("e6")),
        )
        .unwrap();
        let pawn = position.at(square("d5")).unwrap();
        let next = position.apply_move(&pawn, square("e6")).unwrap();
        assert_eq!(next.at(square("e5")), None);
        assert_eq!(next.pieces_of(Player::Black).count(), 1);
    }

    #[test]
    fn make_move_is_persistent() {
        let position = Position::starting();
        let knight = position.at(square("g1")).unwrap();
        let next = position.apply_move(&knight, square("f3")).unwrap();
        assert_eq!(position.at(square("g1")), Some(knight));
        assert_eq!(position.side_to_move(), Player::White);
        assert_eq!(next.at(square("g1")), None);
        let moved = next.at(square("f3")).unwrap();
        assert_eq!(moved.kind(), PieceKind::Knight);
        assert!(moved.has_moved());
        assert_eq!(next.side_to_move(), Player::Black);
        assert_eq!(next.en_passant_target(), None);
    }

    #[test]
    fn simulated_move_keeps_the_turn() {
        let position = Position::starting();
        let pawn = position.at(square("d2")).unwrap();
        let simulated = position.make_move(&pawn, square("d4"), true);
        assert_eq!(simulated.side_to_move(), Player::White);
        assert_eq!(simulated.en_passant_target(), Some(square("d3")));
    }

    #[test]
    fn illegal_moves_are_rejected() {
        let position = Position::starting();
        let pawn = position.at(square("e2")).unwrap();
        let error = position.apply_move(&pawn, square("e5")).unwrap_err();
        assert_eq!(error.to_string(), "illegal move: e2e5");

        let ghost = Piece::new(PieceKind::Queen, Player::White, square("e4"));
        assert!(position.apply_move(&ghost, square("e5")).is_err());

        let black_pawn = position.at(square("e7")).unwrap();
        let error = position.apply_move(&black_pawn, square("e5")).unwrap_err();
        assert_eq!(error.to_string(), "illegal move: e7e5, it is white's turn");
    }

    #[test]
    fn parse_moves() {
        let position = Position::starting();
        let parsed = position.parse_move("g1f3").unwrap();
        assert_eq!(parsed.piece().kind(), PieceKind::Knight);
        assert_eq!(parsed.to(), square("f3"));
        assert!(position.parse_move("e2e5").is_err());
        assert!(position.parse_move("e7e5").is_err());
        assert!(position.parse_move("e3e4").is_err());
        assert!(position.parse_move("e2").is_err());

        let promotion = Position::from_placement("4k3/P7/8/8/8/8/8/4K3", Player::White).unwrap();
        assert!(promotion.parse_move("a7a8q").is_ok());
        assert!(promotion.parse_move("a7a8").is_ok());
        assert!(promotion.parse_move("a7a8n").is_err());
    }

    #[test]
    fn captures_remove_the_target() {
        let position =
            Position::from_placement("4k3/8/8/3p4/4P3/8/8/4K3", Player::White).unwrap();
        let pawn = position.at(square("e4")).unwrap();
        let next = position.apply_move(&pawn, square("d5")).unwrap();
        assert_eq!(next.pieces().count(), 3);
        assert_eq!(next.at(square("d5")).unwrap().owner(), Player::White);
    }

    #[test]
    fn promotion_to_queen() {
        let position =
            Position::from_placement("1r2k3/P7/8/8/8/8/8/4K3", Player::White).unwrap();
        let pawn = position.at(square("a7")).unwrap();
        for destination in ["a8", "b8"] {
            let next = position.apply_move(&pawn, square(destination)).unwrap();
            let promoted = next.at(square(destination)).unwrap();
            assert_eq!(promoted.kind(), PieceKind::Queen);
            assert_eq!(promoted.owner(), Player::White);
        }
    }

    #[test]
    fn castling_moves_the_rook() {
        let position =
            Position::from_placement("r3k2r/8/8/8/8/8/8/R3K2R", Player::White).unwrap();
        let king = position.at(square("e1")).unwrap();
        let short = position.apply_move(&king, square("g1")).unwrap();
        assert_eq!(short.to_string(), "r3k2r/8/8/8/8/8/8/R4RK1");
        assert!(short.at(square("f1")).unwrap().has_moved());
        let long = position.apply_move(&king, square("c1")).unwrap();
        assert_eq!(long.to_string(), "r3k2r/8/8/8/8/8/8/2KR3R");

        let position = Position::from_placement("r3k2r/8/8/8/8/8/8/R3K2R", Player::Black).unwrap();
        let king = position.at(square("e8")).unwrap();
        let long = position.apply_move(&king, square("c8")).unwrap();
        assert_eq!(long.to_string(), "2kr3r/8/8/8/8/8/8/R3K2R");
    }

    #[test]
    fn both_sides_present() {
        assert!(Position::starting().both_sides_present());
        assert!(!Position::from_placement("8/8/8/8/8/8/8/4K3", Player::White)
            .unwrap()
            .both_sides_present());
    }

    #[test]
    fn perft_starting_position() {
        let position = Position::starting();
        assert_eq!(perft(&position, 0), 1);
        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
    }
}
