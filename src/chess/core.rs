//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};
use std::hash::{Hash, Hasher};
use std::ops::Not;
use std::str::FromStr;

use anyhow::bail;
use itertools::Itertools;

#[allow(missing_docs)]
pub const BOARD_WIDTH: i8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: usize = (BOARD_WIDTH * BOARD_WIDTH) as usize;

/// A square of the board addressed by zero-based row and column.
///
/// Row 0 is Black's back rank (rank 8 in the algebraic notation), row 7 is
/// White's back rank (rank 1). Column 0 is the a-file.
///
/// ```
/// use knightfall::chess::core::Square;
///
/// let square = Square::new(7, 4).unwrap();
/// assert_eq!(square.to_string(), "e1");
/// assert_eq!(Square::try_from("e1").unwrap(), square);
/// assert!(Square::new(8, 0).is_none());
/// ```
///
/// Square is a compact representation using only one byte.
///
/// ```
/// use knightfall::chess::core::Square;
///
/// assert_eq!(std::mem::size_of::<Square>(), 1);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    index: u8,
}

impl Square {
    /// Creates a square if both coordinates are within the board.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn new(row: i8, col: i8) -> Option<Self> {
        if row < 0 || row >= BOARD_WIDTH || col < 0 || col >= BOARD_WIDTH {
            return None;
        }
        Some(Self {
            index: (row * BOARD_WIDTH + col) as u8,
        })
    }

    /// Zero-based row, 0 being Black's back rank.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn row(self) -> i8 {
        self.index as i8 / BOARD_WIDTH
    }

    /// Zero-based column, 0 being the a-file.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn col(self) -> i8 {
        self.index as i8 % BOARD_WIDTH
    }

    /// Position of the square in the row-major mailbox.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the square shifted by the given number of rows and columns or
    /// `None` if it falls off the board.
    #[must_use]
    pub const fn offset(self, rows: i8, cols: i8) -> Option<Self> {
        Self::new(self.row() + rows, self.col() + cols)
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    /// Parses algebraic notation, e.g. "e4".
    #[allow(clippy::cast_possible_wrap)]
    fn try_from(square: &str) -> anyhow::Result<Self> {
        let Some((file, rank)) = square.chars().collect_tuple() else {
            bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            );
        };
        let col = match file {
            'a'..='h' => (file as u8 - b'a') as i8,
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        };
        let row = match rank {
            '1'..='8' => (b'8' - rank as u8) as i8,
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        };
        match Self::new(row, col) {
            Some(square) => Ok(square),
            None => unreachable!("file and rank are validated above"),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[allow(clippy::cast_sign_loss)]
        let file = (b'a' + self.col() as u8) as char;
        write!(f, "{file}{}", BOARD_WIDTH - self.row())
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row delta of a single pawn push: White moves towards row 0.
    #[must_use]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// Row where the king and rooks start.
    #[must_use]
    pub const fn back_row(self) -> i8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }

    /// Row where the pawns start and from which they can advance twice.
    #[must_use]
    pub const fn pawn_row(self) -> i8 {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }

    /// Row on which pawns are promoted.
    #[must_use]
    pub const fn promotion_row(self) -> i8 {
        self.opponent().back_row()
    }

    /// The player's fifth rank: en passant captures start from here.
    #[must_use]
    pub const fn en_passant_row(self) -> i8 {
        match self {
            Self::White => 3,
            Self::Black => 4,
        }
    }
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" | "white" => Ok(Self::White),
            "b" | "black" => Ok(Self::Black),
            _ => bail!("player should be 'w' or 'b', got '{player}'"),
        }
    }
}

impl FromStr for Player {
    type Err = anyhow::Error;

    fn from_str(player: &str) -> anyhow::Result<Self> {
        Self::try_from(player)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        })
    }
}

/// A piece standing on a specific square of the board.
///
/// Two pieces are the same piece if their kind, owner and square match: the
/// move history flag does not participate in equality or hashing. Since no two
/// pieces can share a square, this identifies a piece within a position.
#[derive(Clone, Copy, Debug)]
pub struct Piece {
    kind: PieceKind,
    owner: Player,
    square: Square,
    has_moved: bool,
}

impl Piece {
    /// Creates a piece that has never moved.
    #[must_use]
    pub const fn new(kind: PieceKind, owner: Player, square: Square) -> Self {
        Self {
            kind,
            owner,
            square,
            has_moved: false,
        }
    }

    /// Returns the same piece with the move history flag set.
    #[must_use]
    pub const fn moved(self) -> Self {
        Self {
            has_moved: true,
            ..self
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn owner(&self) -> Player {
        self.owner
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn square(&self) -> Square {
        self.square
    }

    /// Whether the piece moved at least once. Kings and rooks lose castling
    /// rights once this is set.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub(super) fn relocate(&mut self, square: Square) {
        self.square = square;
        self.has_moved = true;
    }

    pub(super) fn promote(&mut self, kind: PieceKind) {
        self.kind = kind;
    }

    /// FEN symbol: uppercase for White, lowercase for Black.
    #[must_use]
    pub const fn symbol(&self) -> char {
        let symbol = match self.kind {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match self.owner {
            Player::White => symbol.to_ascii_uppercase(),
            Player::Black => symbol,
        }
    }

    /// Reads a FEN symbol into the owner and kind of the piece.
    ///
    /// # Errors
    ///
    /// If the symbol is not one of "KQRBNPkqrbnp".
    pub fn parse_symbol(symbol: char) -> anyhow::Result<(Player, PieceKind)> {
        let owner = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok((owner, kind))
    }
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.owner == other.owner && self.square == other.square
    }
}

impl Eq for Piece {}

impl Hash for Piece {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.owner.hash(state);
        self.square.hash(state);
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.symbol(), self.square)
    }
}

/// A move of a specific piece to the destination square. Castling is
/// represented as the king move by two columns, en passant as the diagonal
/// pawn move onto the empty target square.
///
/// Moves are only produced by the move generator and are meaningful in the
/// position they were generated in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    piece: Piece,
    to: Square,
}

impl Move {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(piece: Piece, to: Square) -> Self {
        Self { piece, to }
    }

    /// The piece being moved, as it stands before the move.
    #[must_use]
    pub const fn piece(&self) -> &Piece {
        &self.piece
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn from(&self) -> Square {
        self.piece.square
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Pawn reaching the farthest row: always promoted to a queen.
    #[must_use]
    pub fn is_promotion(&self) -> bool {
        self.piece.kind == PieceKind::Pawn && self.to.row() == self.piece.owner.promotion_row()
    }

    /// King moving two columns.
    #[must_use]
    pub fn is_castle(&self) -> bool {
        self.piece.kind == PieceKind::King && (self.to.col() - self.from().col()).abs() == 2
    }
}

impl fmt::Display for Move {
    /// Serializes a move in the coordinate notation, e.g. "e2e4" or "a7a8q".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to)?;
        if self.is_promotion() {
            write!(f, "{}", PieceKind::Queen)?;
        }
        Ok(())
    }
}
