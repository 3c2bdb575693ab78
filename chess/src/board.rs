//! Board and related things

use crate::bitboard::Bitboard;
use crate::geometry;
use crate::movegen::{self, MoveList};
use crate::moves::{self, Make, Move};
use crate::piece::Piece;
use crate::types::{
    self, CastlingFiles, CastlingRights, CastlingSide, Cell, Color, Coord, Dims, DrawKind, Outcome, PieceKind,
    WinKind,
};

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::num::ParseIntError;
use std::slice;
use std::str::FromStr;

use thiserror::Error;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// En passant target is inconsistent with the position
    ///
    /// The target square must be empty, the pawn which has just made the double step must stand
    /// right behind it, and the square the pawn came from must be empty.
    #[error("invalid enpassant position {0}")]
    InvalidEnpassant(Coord),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the first or on the last rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// Opponent's king is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
    /// A piece is stored outside of the board dimensions
    #[error("piece stored outside of the board at index {0}")]
    StrayCell(usize),
}

/// Error parsing the first part of FEN (i.e. the positions of pieces on the board)
///
/// Ranks are reported by their zero-based ordinal, counting from White's side.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    /// Rank is too large
    #[error("too many items in rank {}", .0 + 1)]
    RankOverflow(usize),
    /// Rank is too small
    #[error("not enough items in rank {}", .0 + 1)]
    RankUnderflow(usize),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing [`RawBoard`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawFenParseError {
    /// FEN contains non-ASCII characters
    #[error("non-ASCII data in FEN")]
    NonAscii,
    /// FEN doesn't have board part
    #[error("board not specified")]
    NoBoard,
    /// Error parsing board from FEN
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    /// FEN doesn't have move side part
    #[error("no move side")]
    NoMoveSide,
    /// Error parsing move side from FEN
    #[error("bad move side: {0}")]
    MoveSide(#[from] types::ColorParseError),
    /// FEN doesn't have castling rights part
    #[error("no castling rights")]
    NoCastling,
    /// Error parsing castling rights from FEN
    #[error("bad castling rights: {0}")]
    Castling(#[from] types::CastlingRightsParseError),
    /// FEN doesn't have enpassant part
    #[error("no enpassant")]
    NoEnpassant,
    /// Error parsing enpassant from FEN
    #[error("bad enpassant: {0}")]
    Enpassant(#[from] types::CoordParseError),
    /// Enpassant rank is invalid
    #[error("invalid enpassant rank {}", .0 + 1)]
    InvalidEnpassantRank(usize),
    /// Error parsing move counter
    #[error("bad move counter: {0}")]
    MoveCounter(ParseIntError),
    /// Error parsing move number
    #[error("bad move number: {0}")]
    MoveNumber(ParseIntError),
    /// FEN contains extra data
    #[error("extra data in FEN")]
    ExtraData,
}

/// Error parsing [`Board`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    /// Board cannot be parsed
    #[error("cannot parse fen: {0}")]
    Fen(#[from] RawFenParseError),
    /// Board was parsed, but it's invalid
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Raw chess board
///
/// Raw board contains all the necessary information about the chess position. But, unlike [`Board`],
/// it is not validated and may contain an invalid position.
///
/// Raw board can be used to build or edit the position programmatically. After changing the necessary
/// fields, it must be converted to [`Board`] via [`Board::try_from()`].
///
/// # Example
///
/// ```
/// # use fenix::{RawBoard, Board};
/// # use fenix::types::{Cell, Color, Coord, Dims, PieceKind};
/// #
/// let mut raw = RawBoard::empty(Dims::CLASSICAL);
/// raw.move_counter = 10;
/// raw.move_number = 42;
/// raw.put(Coord::from_parts(1, 1), Cell::from_parts(Color::White, PieceKind::King));
/// raw.put(Coord::from_parts(3, 4), Cell::from_parts(Color::Black, PieceKind::King));
///
/// let board: Board = raw.try_into().unwrap();
/// assert_eq!(board.as_fen(), "8/8/8/3k4/8/8/1K6/8 w - - 10 42");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawBoard {
    /// Board size
    pub dims: Dims,
    /// Contents of the board
    ///
    /// The indices in this array are given by [`Dims::index()`]. Only the first
    /// [`Dims::size()`] entries are used, the rest must stay empty.
    pub cells: [Cell; Dims::MAX_SQUARES],
    /// Side to move
    pub side: Color,
    /// Castling rights
    ///
    /// The rights are kept as given. Whether the king and the rook are in place is checked
    /// when castling is attempted.
    pub castling: CastlingRights,
    /// Home files of the king and of the castling rooks, indexed by [`Color::index()`]
    ///
    /// They are classical unless FEN names the rook files explicitly, as in Fischer-random
    /// positions. Files of a color without castling rights are reset to classical.
    pub castling_files: [CastlingFiles; 2],
    /// En passant target square
    ///
    /// It is the square skipped by the pawn which has just made a double step, or `None`
    /// if the last move was not a double step.
    pub ep_target: Option<Coord>,
    /// Number of half-moves without pawn moves or captures
    ///
    /// It is stored and updated, but no draw rule is enforced on it.
    pub move_counter: u16,
    /// Move number
    ///
    /// Note that this is move number, not half-move number. It is incremented after each
    /// move by Black.
    pub move_number: u16,
}

impl RawBoard {
    /// Returns an empty `RawBoard` of size `dims`
    #[inline]
    pub const fn empty(dims: Dims) -> RawBoard {
        RawBoard {
            dims,
            cells: [Cell::EMPTY; Dims::MAX_SQUARES],
            side: Color::White,
            castling: CastlingRights::EMPTY,
            castling_files: [CastlingFiles::classical(dims); 2],
            ep_target: None,
            move_counter: 0,
            move_number: 1,
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> RawBoard {
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

        let dims = Dims::CLASSICAL;
        let mut res = RawBoard::empty(dims);
        res.castling = CastlingRights::FULL;
        for color in [Color::White, Color::Black] {
            let home = geometry::home_rank(dims, color);
            let pawns = geometry::pawn_home_rank(dims, color);
            for (file, kind) in BACK_RANK.into_iter().enumerate() {
                res.put(Coord::from_parts(file, home), Cell::from_parts(color, kind));
                res.put(
                    Coord::from_parts(file, pawns),
                    Cell::from_parts(color, PieceKind::Pawn),
                );
            }
        }
        res
    }

    /// Parses a classical 8x8 board from FEN
    ///
    /// Does the same as [`RawBoard::from_str`]. It is recommended to use this function instead of
    /// `from_str()` for better readability.
    #[inline]
    pub fn from_fen(fen: &str) -> Result<RawBoard, RawFenParseError> {
        RawBoard::from_str(fen)
    }

    /// Parses a board of size `dims` from FEN
    pub fn from_fen_dims(fen: &str, dims: Dims) -> Result<RawBoard, RawFenParseError> {
        type Error = RawFenParseError;

        if !fen.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut iter = fen.split_ascii_whitespace().fuse();

        let cells = parse_cells(iter.next().ok_or(Error::NoBoard)?, dims)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoMoveSide)?)?;
        let castling = iter.next().ok_or(Error::NoCastling)?;
        let ep_target = parse_ep_target(iter.next().ok_or(Error::NoEnpassant)?, dims, side)?;
        let move_counter = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::MoveCounter)?,
            None => 0,
        };
        let move_number = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::MoveNumber)?,
            None => 1,
        };

        if iter.next().is_some() {
            return Err(Error::ExtraData);
        }

        let mut res = RawBoard {
            dims,
            cells,
            side,
            castling: CastlingRights::EMPTY,
            castling_files: [CastlingFiles::classical(dims); 2],
            ep_target,
            move_counter,
            move_number,
        };
        parse_castling(&mut res, castling)?;
        Ok(res)
    }

    /// Returns the home files of the king and of the castling rooks of color `c`
    #[inline]
    pub fn castling_files(&self, c: Color) -> CastlingFiles {
        self.castling_files[c.index()]
    }

    /// Returns the square the king of color `c` must stand on to castle
    #[inline]
    pub fn king_home(&self, c: Color) -> Coord {
        let file = self.castling_files(c).king;
        Coord::from_parts(file, geometry::home_rank(self.dims, c))
    }

    /// Returns the square the rook of color `c` must stand on to castle to side `s`
    #[inline]
    pub fn castling_rook_home(&self, c: Color, s: CastlingSide) -> Coord {
        let file = self.castling_files(c).rook(s);
        Coord::from_parts(file, geometry::home_rank(self.dims, c))
    }

    /// Brings the rook castling tags and the castling files in line with the castling rights
    ///
    /// A rook is tagged if it stands on its origin and the right exists. Files of a lost right
    /// fall back to classical, so equal positions compare equal whatever their history.
    pub(crate) fn sync_castling(&mut self) {
        let classical = CastlingFiles::classical(self.dims);
        for color in [Color::White, Color::Black] {
            for side in CastlingSide::ALL {
                let origin = self.castling_rook_home(color, side);
                let cell = self.get(origin);
                if self.castling.has(color, side) && cell.is(color, PieceKind::Rook) {
                    self.put(origin, cell.with_castling(Some(side)));
                    continue;
                }
                if cell.castling() == Some(side) {
                    self.put(origin, cell.with_castling(None));
                }
                if !self.castling.has(color, side) {
                    self.castling_files[color.index()].set_rook(side, classical.rook(side));
                }
            }
            if !self.castling.has_color(color) {
                self.castling_files[color.index()] = classical;
            }
        }
    }

    /// Returns the contents of the square with coordinate `c`
    ///
    /// Squares outside of the board are reported as empty.
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        if !self.dims.contains(c) {
            return Cell::EMPTY;
        }
        self.cells[self.dims.index(c)]
    }

    /// Puts `cell` to the square with coordinate `c`
    ///
    /// # Panics
    ///
    /// The function panics if `c` is outside of the board.
    #[inline]
    pub fn put(&mut self, c: Coord, cell: Cell) {
        assert!(self.dims.contains(c), "square {} is out of board", c);
        self.cells[self.dims.index(c)] = cell;
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fenix::{RawBoard, board::PrettyStyle};
    /// #
    /// let r = RawBoard::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    ///
    /// let res = r#"
    /// 8│♜♞♝♛♚♝♞♜
    /// 7│♟♟♟♟♟♟♟♟
    /// 6│........
    /// 5│........
    /// 4│........
    /// 3│........
    /// 2│♙♙♙♙♙♙♙♙
    /// 1│♖♘♗♕♔♗♘♖
    /// ─┼────────
    /// ○│abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Utf8).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { raw: self, style }
    }

    /// Converts the board into a FEN string
    ///
    /// Does the same as `RawBoard::to_string()`. It is recommended to use this function instead of
    /// `to_string()` for better readability.
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for RawBoard {
    #[inline]
    fn default() -> RawBoard {
        RawBoard::empty(Dims::CLASSICAL)
    }
}

/// Board that contains a valid position
///
/// This board always contains a valid chess position. It is used for literally every chess operation:
/// move generation, making and validating moves, verifying for check and checkmate.
///
/// It contains a [`RawBoard`] alongside with the cached king positions, the position the game
/// started from and the list of moves played since then.
///
/// Two boards are equal if their current positions are equal; the history is not compared.
///
/// # Invariants
///
/// Each side has exactly one king, no pawn stands on the first or the last rank, and the side
/// which is not to move is not in check. A move is applied only after it passes
/// [`Move::validate()`], so the invariants hold after every successful call to
/// [`Board::apply_move()`]. With the `selftest` feature enabled, they are rechecked after each
/// applied move.
#[derive(Debug, Clone)]
pub struct Board {
    r: RawBoard,
    kings: [Coord; 2],
    start: RawBoard,
    history: Vec<Move>,
}

impl Board {
    /// Returns a board with the initial position
    pub fn initial() -> Board {
        RawBoard::initial()
            .try_into()
            .expect("initial position must be valid")
    }

    /// Parses a classical 8x8 board from FEN
    ///
    /// Does the same as [`Board::from_str`]. It is recommended to use this function instead of
    /// `from_str()` for better readability.
    pub fn from_fen(fen: &str) -> Result<Board, FenParseError> {
        Board::from_str(fen)
    }

    /// Parses a board of size `dims` from FEN
    ///
    /// # Example
    ///
    /// ```
    /// # use fenix::Board;
    /// # use fenix::types::Dims;
    /// #
    /// let dims = Dims::new(10, 8).unwrap();
    /// let fen = "rnbqkkbnr1/pppppppppp/10/10/10/10/PPPPPPPPPP/RNBQKKBNR1 w - - 0 1";
    /// assert!(Board::from_fen_dims(fen, dims).is_err());
    ///
    /// let fen = "rnbqkqbnrr/pppppppppp/10/10/10/10/PPPPPPPPPP/RNBQKQBNRR w - - 0 1";
    /// let b = Board::from_fen_dims(fen, dims).unwrap();
    /// assert_eq!(b.as_fen(), fen);
    /// ```
    pub fn from_fen_dims(fen: &str, dims: Dims) -> Result<Board, FenParseError> {
        Ok(RawBoard::from_fen_dims(fen, dims)?.try_into()?)
    }

    /// Returns a view over the raw board
    #[inline]
    pub fn raw(&self) -> &RawBoard {
        &self.r
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.r.dims
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.r.get(c)
    }

    /// Returns the piece standing on square `c`, if any
    #[inline]
    pub fn piece_at(&self, c: Coord) -> Option<Piece> {
        Piece::from_cell(self.r.get(c), c)
    }

    /// Iterates over all the pieces of color `color`, in the ascending order of square index
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.r
            .dims
            .iter()
            .filter_map(|c| self.piece_at(c))
            .filter(move |p| p.color() == color)
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.r.side
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.r.castling
    }

    #[inline]
    pub fn ep_target(&self) -> Option<Coord> {
        self.r.ep_target
    }

    #[inline]
    pub fn move_counter(&self) -> u16 {
        self.r.move_counter
    }

    #[inline]
    pub fn move_number(&self) -> u16 {
        self.r.move_number
    }

    /// Returns the position of the king of color `c`
    #[inline]
    pub fn king_pos(&self, c: Color) -> Coord {
        self.kings[c.index()]
    }

    /// Returns the moves applied to this board since it was created
    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the position this board was created from
    #[inline]
    pub fn start(&self) -> &RawBoard {
        &self.start
    }

    /// Returns `true` if square `c` is attacked by any piece of color `by`
    #[inline]
    pub fn is_square_attacked(&self, c: Coord, by: Color) -> bool {
        movegen::is_square_attacked(&self.r, c, by)
    }

    /// Returns all the squares attacked by pieces of color `by`
    #[inline]
    pub fn attacked_squares(&self, by: Color) -> Bitboard {
        movegen::attacked_squares(&self.r, by)
    }

    /// Validates and applies the move `mv`
    ///
    /// If the move is not legal, the board is left unchanged.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), moves::ValidateError> {
        mv.validate(self)?;
        self.commit(mv);
        Ok(())
    }

    /// Applies the move `mv` which is already known to be legal
    pub(crate) fn commit(&mut self, mv: Move) {
        let color = self.r.side;
        moves::make_raw(&mut self.r, mv);
        if mv.piece() == PieceKind::King {
            self.kings[color.index()] = mv.dst();
        }
        self.history.push(mv);

        #[cfg(feature = "selftest")]
        self.selftest();
    }

    #[cfg(feature = "selftest")]
    fn selftest(&self) {
        let fresh = match Board::try_from(self.r) {
            Ok(b) => b,
            Err(e) => panic!("board {} became invalid: {}", self.r, e),
        };
        assert_eq!(fresh.r, self.r, "castling tags are inconsistent");
        assert_eq!(fresh.kings, self.kings, "king cache is inconsistent");
    }

    /// Makes the move `m` on a copy of the board and returns the copy
    ///
    /// Convenience alias for [`moves::Make::make`](crate::moves::Make::make).
    pub fn make_move<M: Make>(&self, m: M) -> Result<Self, M::Err> {
        m.make(self)
    }

    /// Returns `true` if the current side is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        let c = self.r.side;
        self.is_square_attacked(self.king_pos(c), c.inv())
    }

    /// Returns all the pieces that give check currently
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        let c = self.r.side;
        movegen::square_attackers(&self.r, self.king_pos(c), c.inv())
    }

    /// Returns `true` if the current side has at least one legal move
    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        movegen::has_legal_moves(self)
    }

    /// Returns all the legal moves of the current side
    #[inline]
    pub fn legal_moves(&self) -> MoveList {
        movegen::legal_moves_all(self)
    }

    #[inline]
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.has_legal_moves()
    }

    #[inline]
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.has_legal_moves()
    }

    /// Returns `true` if the position is guaranteed to be drawn because of insufficient material,
    /// regardless of the players' moves
    ///
    /// Currently, such positions include:
    ///
    /// - king vs king
    /// - king + knight vs king
    /// - king + bishop vs king
    /// - kings and any number of bishops, all on squares of the same shade
    ///
    /// Note that king + knight vs king + knight is not considered a draw, as one of the sides can
    /// intentionally corner itself, allowing its opponent to win.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = 0;
        let mut shades = [false; 2];
        for c in self.r.dims.iter() {
            match self.r.get(c).kind() {
                None | Some(PieceKind::King) => {}
                Some(PieceKind::Bishop) => {
                    minors += 1;
                    shades[c.shade().index()] = true;
                }
                Some(PieceKind::Knight) => {
                    minors += 1;
                    // Knight on both shades at once, so it never passes the shade test
                    shades = [true; 2];
                }
                Some(_) => return false,
            }
        }
        minors <= 1 || !(shades[0] && shades[1])
    }

    /// Calculates the current outcome on the board
    ///
    /// Checkmate and stalemate are checked first, then the draw by insufficient material.
    /// Draws by repetition and by the move counter are not detected.
    ///
    /// This function can be computationally expensive, as it calls [`movegen::has_legal_moves`].
    pub fn calc_outcome(&self) -> Option<Outcome> {
        if !self.has_legal_moves() {
            return if self.is_check() {
                Some(Outcome::win(self.r.side.inv(), WinKind::Checkmate))
            } else {
                Some(Outcome::Draw(DrawKind::Stalemate))
            };
        }

        if self.is_insufficient_material() {
            return Some(Outcome::Draw(DrawKind::InsufficientMaterial));
        }

        None
    }

    /// Iterates over the played moves together with the positions they were played in
    ///
    /// # Example
    ///
    /// ```
    /// # use fenix::{Board, moves::San};
    /// #
    /// let b = Board::initial()
    ///     .make_move(San("e4"))
    ///     .unwrap()
    ///     .make_move(San("e5"))
    ///     .unwrap();
    /// let sans: Vec<_> = b
    ///     .replay()
    ///     .map(|(before, mv)| mv.san(&before).unwrap().to_string())
    ///     .collect();
    /// assert_eq!(sans, ["e4", "e5"]);
    /// ```
    pub fn replay(&self) -> Replay<'_> {
        Replay {
            board: self
                .start
                .try_into()
                .expect("start position was validated on creation"),
            moves: self.history.iter(),
        }
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// See docs for [`RawBoard::pretty()`] for more usage details.
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        self.r.pretty(style)
    }

    /// Converts the board into a FEN string
    ///
    /// Does the same as `Board::to_string()`. It is recommended to use this function instead of
    /// `to_string()` for better readability.
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Board {
    #[inline]
    fn eq(&self, other: &Board) -> bool {
        self.r == other.r
    }
}

impl Eq for Board {}

impl Hash for Board {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state)
    }
}

/// Iterator returned by [`Board::replay()`]
pub struct Replay<'a> {
    board: Board,
    moves: slice::Iter<'a, Move>,
}

impl<'a> Iterator for Replay<'a> {
    type Item = (Board, Move);

    fn next(&mut self) -> Option<(Board, Move)> {
        let mv = *self.moves.next()?;
        let before = self.board.clone();
        self.board.commit(mv);
        Some((before, mv))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.moves.size_hint()
    }
}

fn check_enpassant(raw: &RawBoard, target: Coord) -> Result<(), ValidateError> {
    let dims = raw.dims;
    let fwd = geometry::pawn_forward_delta(raw.side);
    let victim = dims.shift(target, 0, -fwd);
    let origin = dims.shift(target, 0, fwd);
    let ok = dims.contains(target)
        && raw.get(target).is_empty()
        && victim.is_some_and(|c| raw.get(c).is(raw.side.inv(), PieceKind::Pawn))
        && origin.is_some_and(|c| raw.get(c).is_empty());
    match ok {
        true => Ok(()),
        false => Err(ValidateError::InvalidEnpassant(target)),
    }
}

impl TryFrom<RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(mut raw: RawBoard) -> Result<Board, ValidateError> {
        let dims = raw.dims;

        // Check StrayCell
        if let Some(idx) = raw.cells[dims.size()..]
            .iter()
            .position(|cell| cell.is_occupied())
        {
            return Err(ValidateError::StrayCell(dims.size() + idx));
        }

        // Check NoKing, TooManyKings
        let mut kings = [None; 2];
        for c in dims.iter() {
            let cell = raw.get(c);
            if cell.kind() != Some(PieceKind::King) {
                continue;
            }
            let color = cell.color().expect("occupied cell has a color");
            if kings[color.index()].replace(c).is_some() {
                return Err(ValidateError::TooManyKings(color));
            }
        }
        let white_king = kings[0].ok_or(ValidateError::NoKing(Color::White))?;
        let black_king = kings[1].ok_or(ValidateError::NoKing(Color::Black))?;

        // Check InvalidPawn
        for rank in [0, dims.ranks() - 1] {
            for file in 0..dims.files() {
                let c = Coord::from_parts(file, rank);
                if raw.get(c).kind() == Some(PieceKind::Pawn) {
                    return Err(ValidateError::InvalidPawn(c));
                }
            }
        }

        // Check InvalidEnpassant
        if let Some(target) = raw.ep_target {
            check_enpassant(&raw, target)?;
        }

        // Rook tags mirror the castling rights for the rooks still standing on their origins.
        // Rights without a matching rook are kept and reported when castling is attempted.
        for c in dims.iter() {
            raw.put(c, raw.get(c).with_castling(None));
        }
        raw.sync_castling();

        // Check OpponentKingAttacked
        let their_king = match raw.side {
            Color::White => black_king,
            Color::Black => white_king,
        };
        if movegen::is_square_attacked(&raw, their_king, raw.side) {
            return Err(ValidateError::OpponentKingAttacked);
        }

        Ok(Board {
            r: raw,
            kings: [white_king, black_king],
            start: raw,
            history: Vec::new(),
        })
    }
}

impl TryFrom<&RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: &RawBoard) -> Result<Board, ValidateError> {
        (*raw).try_into()
    }
}

/// Style for [`RawBoard::pretty()`] and [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`RawBoard::pretty()`] for more details.
pub struct Pretty<'a> {
    raw: &'a RawBoard,
    style: PrettyStyle,
}

fn parse_rank(s: &str, rank: usize, dims: Dims, cells: &mut [Cell]) -> Result<(), CellsParseError> {
    type Error = CellsParseError;

    let bytes = s.as_bytes();
    let mut file = 0_usize;
    let mut pos = 0_usize;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_digit() {
            if b == b'0' {
                return Err(Error::UnexpectedChar('0'));
            }
            let mut add = 0_usize;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                add = add * 10 + (bytes[pos] - b'0') as usize;
                if add > dims.files() {
                    return Err(Error::RankOverflow(rank));
                }
                pos += 1;
            }
            if file + add > dims.files() {
                return Err(Error::RankOverflow(rank));
            }
            file += add;
            continue;
        }
        // The dot is an empty cell in the pretty output, but never in FEN
        if b == b'.' {
            return Err(Error::UnexpectedChar('.'));
        }
        let cell = Cell::from_char(b as char).ok_or(Error::UnexpectedChar(b as char))?;
        if file >= dims.files() {
            return Err(Error::RankOverflow(rank));
        }
        cells[dims.index(Coord::from_parts(file, rank))] = cell;
        file += 1;
        pos += 1;
    }
    if file < dims.files() {
        return Err(Error::RankUnderflow(rank));
    }
    Ok(())
}

fn parse_cells(s: &str, dims: Dims) -> Result<[Cell; Dims::MAX_SQUARES], CellsParseError> {
    let mut cells = [Cell::EMPTY; Dims::MAX_SQUARES];
    let mut count = 0;
    for (i, rank_str) in s.split('/').enumerate() {
        if i >= dims.ranks() {
            return Err(CellsParseError::Overflow);
        }
        parse_rank(rank_str, dims.ranks() - 1 - i, dims, &mut cells)?;
        count += 1;
    }
    if count < dims.ranks() {
        return Err(CellsParseError::Underflow);
    }
    Ok(cells)
}

fn parse_ep_target(s: &str, dims: Dims, side: Color) -> Result<Option<Coord>, RawFenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let target = dims.parse_coord(s)?;
    if target.rank() != geometry::enpassant_dst_rank(dims, side) {
        return Err(RawFenParseError::InvalidEnpassantRank(target.rank()));
    }
    Ok(Some(target))
}

fn outermost_rook(r: &RawBoard, color: Color, side: CastlingSide) -> Option<usize> {
    let home = geometry::home_rank(r.dims, color);
    let king = r.castling_files(color).king;
    let is_rook = |&file: &usize| r.get(Coord::from_parts(file, home)).is(color, PieceKind::Rook);
    match side {
        CastlingSide::Queen => (0..king).find(is_rook),
        CastlingSide::King => (king + 1..r.dims.files()).rev().find(is_rook),
    }
}

/// Parses the castling field of FEN into `r`, whose cells must be already filled
///
/// Besides `KQkq`, a rook may be named by its file letter (upper case for White), as in
/// Shredder-FEN. A color that names a file takes its king file from the king on its home rank,
/// and its `K` and `Q` refer to the outermost rooks. A color that uses only `K` and `Q` keeps
/// the classical files.
fn parse_castling(r: &mut RawBoard, s: &str) -> Result<(), types::CastlingRightsParseError> {
    type Error = types::CastlingRightsParseError;

    if s == "-" {
        return Ok(());
    }
    if s.is_empty() {
        return Err(Error::EmptyString);
    }

    let dims = r.dims;
    let color_of = |ch: char| match ch.is_ascii_uppercase() {
        true => Color::White,
        false => Color::Black,
    };
    let names_file = |ch: char| !matches!(ch.to_ascii_lowercase(), 'k' | 'q');
    for color in [Color::White, Color::Black] {
        if !s.chars().any(|ch| color_of(ch) == color && names_file(ch)) {
            continue;
        }
        let home = geometry::home_rank(dims, color);
        let king = (0..dims.files())
            .find(|&file| r.get(Coord::from_parts(file, home)).is(color, PieceKind::King));
        if let Some(king) = king {
            r.castling_files[color.index()].king = king;
        }
    }

    let mut named = [false; 2];
    for ch in s.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(Error::UnexpectedChar(ch));
        }
        let color = color_of(ch);
        let side = match ch.to_ascii_lowercase() {
            'k' => CastlingSide::King,
            'q' => CastlingSide::Queen,
            letter => {
                let file = types::file_from_char(letter)
                    .filter(|&file| file < dims.files())
                    .ok_or(Error::UnexpectedChar(ch))?;
                let side = r
                    .castling_files(color)
                    .side_of(file)
                    .ok_or(Error::UnexpectedChar(ch))?;
                r.castling_files[color.index()].set_rook(side, file);
                named[color.index()] = true;
                side
            }
        };
        if r.castling.has(color, side) {
            return Err(Error::DuplicateChar(ch));
        }
        r.castling.set(color, side);
    }

    // `K` and `Q` of a color which names files stand for its outermost rooks
    for ch in s.chars() {
        let color = color_of(ch);
        if names_file(ch) || !named[color.index()] {
            continue;
        }
        let side = match ch.to_ascii_lowercase() {
            'k' => CastlingSide::King,
            _ => CastlingSide::Queen,
        };
        if let Some(file) = outermost_rook(r, color, side) {
            r.castling_files[color.index()].set_rook(side, file);
        }
    }
    Ok(())
}

fn format_castling(r: &RawBoard, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    if r.castling == CastlingRights::EMPTY {
        return write!(f, "-");
    }
    let classical = CastlingFiles::classical(r.dims);
    for color in [Color::White, Color::Black] {
        let files = r.castling_files(color);
        for side in [CastlingSide::King, CastlingSide::Queen] {
            if !r.castling.has(color, side) {
                continue;
            }
            let ch = match (files == classical, side) {
                (true, CastlingSide::King) => 'k',
                (true, CastlingSide::Queen) => 'q',
                (false, _) => types::file_to_char(files.rook(side)),
            };
            match color {
                Color::White => write!(f, "{}", ch.to_ascii_uppercase())?,
                Color::Black => write!(f, "{}", ch)?,
            }
        }
    }
    Ok(())
}

impl FromStr for RawBoard {
    type Err = RawFenParseError;

    fn from_str(s: &str) -> Result<RawBoard, Self::Err> {
        RawBoard::from_fen_dims(s, Dims::CLASSICAL)
    }
}

impl FromStr for Board {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        Ok(RawBoard::from_str(s)?.try_into()?)
    }
}

fn format_cells(r: &RawBoard, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    let dims = r.dims;
    for rank in (0..dims.ranks()).rev() {
        if rank + 1 != dims.ranks() {
            write!(f, "/")?;
        }
        let mut empty = 0;
        for file in 0..dims.files() {
            let cell = r.get(Coord::from_parts(file, rank));
            if cell.is_empty() {
                empty += 1;
                continue;
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
                empty = 0;
            }
            write!(f, "{}", cell)?;
        }
        if empty != 0 {
            write!(f, "{}", empty)?;
        }
    }
    Ok(())
}

impl Display for RawBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        format_cells(self, f)?;
        write!(f, " {} ", self.side)?;
        format_castling(self, f)?;
        match self.ep_target {
            Some(p) => write!(f, " {}", p)?,
            None => write!(f, " -")?,
        };
        write!(f, " {} {}", self.move_counter, self.move_number)?;
        Ok(())
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.r.fmt(f)
    }
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const WHITE_INDICATOR: char;
    const BLACK_INDICATOR: char;

    fn cell(c: Cell) -> char;

    fn indicator(c: Color) -> char {
        match c {
            Color::White => Self::WHITE_INDICATOR,
            Color::Black => Self::BLACK_INDICATOR,
        }
    }

    fn fmt(r: &RawBoard, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let dims = r.dims;
        let width = dims.ranks().to_string().len();
        for rank in (0..dims.ranks()).rev() {
            write!(f, "{:>width$}{}", rank + 1, Self::VERT_FRAME)?;
            for file in 0..dims.files() {
                write!(f, "{}", Self::cell(r.get(Coord::from_parts(file, rank))))?;
            }
            writeln!(f)?;
        }
        for _ in 0..width {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        write!(f, "{}", Self::ANGLE_FRAME)?;
        for _ in 0..dims.files() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{:>width$}{}", Self::indicator(r.side), Self::VERT_FRAME)?;
        for file in 0..dims.files() {
            write!(f, "{}", types::file_to_char(file))?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const WHITE_INDICATOR: char = 'W';
    const BLACK_INDICATOR: char = 'B';

    fn cell(c: Cell) -> char {
        c.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const WHITE_INDICATOR: char = '○';
    const BLACK_INDICATOR: char = '●';

    fn cell(c: Cell) -> char {
        c.as_utf8_char()
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.raw, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.raw, f),
        }
    }
}
