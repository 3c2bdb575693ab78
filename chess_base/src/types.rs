use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("rank {0} out of range")]
    RankOutOfRange(usize),
    #[error("coordinate {0} does not fit on the board")]
    OutOfBoard(Coord),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellParseError {
    #[error("unexpected cell char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unexpected color char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CastlingRightsParseError {
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
    #[error("duplicate char {0:?}")]
    DuplicateChar(char),
    #[error("unexpected empty string")]
    EmptyString,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DimsError {
    #[error("side length {0} is not between {min} and {max}", min = Dims::MIN_SIDE, max = Dims::MAX_SIDE)]
    BadSide(usize),
    #[error("board {files}x{ranks} has more than {max} squares", max = Dims::MAX_SQUARES)]
    TooManySquares { files: usize, ranks: usize },
}

/// Largest file or rank ordinal that can be expressed in square notation.
pub const MAX_ORDINAL: usize = 16;

pub fn file_to_char(file: usize) -> char {
    assert!(file < MAX_ORDINAL, "file must be less than 16");
    (b'a' + file as u8) as char
}

pub fn file_from_char(c: char) -> Option<usize> {
    match c {
        'a'..='p' => Some((u32::from(c) - u32::from('a')) as usize),
        _ => None,
    }
}

/// Square on the board, given by file and rank ordinals
///
/// Rank zero is White's home rank, file zero is the `a` file. A coordinate by itself
/// knows nothing about board size; use [`Dims::contains`] to check whether it fits.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    rank: u8,
    file: u8,
}

impl Coord {
    pub const fn from_parts(file: usize, rank: usize) -> Coord {
        assert!(
            file < MAX_ORDINAL && rank < MAX_ORDINAL,
            "file and rank must be less than 16"
        );
        Coord {
            file: file as u8,
            rank: rank as u8,
        }
    }

    pub const fn file(&self) -> usize {
        self.file as usize
    }

    pub const fn rank(&self) -> usize {
        self.rank as usize
    }

    /// Color of the square, `a1` is dark
    pub const fn shade(&self) -> Color {
        if (self.file + self.rank) % 2 == 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn file_char(&self) -> char {
        file_to_char(self.file())
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Coord({})", self)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file_char(), self.rank() + 1)
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !(2..=3).contains(&s.len()) || !s.is_ascii() {
            return Err(CoordParseError::BadLength);
        }
        let file_ch = s.as_bytes()[0] as char;
        let file = file_from_char(file_ch).ok_or(CoordParseError::UnexpectedFileChar(file_ch))?;
        let rank_str = &s[1..];
        let mut rank = 0_usize;
        for (i, b) in rank_str.bytes().enumerate() {
            let ch = b as char;
            if !ch.is_ascii_digit() || (i == 0 && ch == '0') {
                return Err(CoordParseError::UnexpectedRankChar(ch));
            }
            rank = rank * 10 + (b - b'0') as usize;
        }
        if rank > MAX_ORDINAL {
            return Err(CoordParseError::RankOutOfRange(rank));
        }
        Ok(Coord::from_parts(file, rank - 1))
    }
}

/// Board size
///
/// Both sides are between [`Dims::MIN_SIDE`] and [`Dims::MAX_SIDE`], and the whole board
/// has at most [`Dims::MAX_SQUARES`] squares, so that any set of squares fits into a
/// [`Bitboard`](crate::bitboard::Bitboard). Squares are indexed rank-major starting from `a1`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Dims {
    files: u8,
    ranks: u8,
}

impl Dims {
    pub const MIN_SIDE: usize = 6;
    pub const MAX_SIDE: usize = MAX_ORDINAL;
    pub const MAX_SQUARES: usize = 128;

    pub const CLASSICAL: Dims = Dims { files: 8, ranks: 8 };

    pub fn new(files: usize, ranks: usize) -> Result<Dims, DimsError> {
        for side in [files, ranks] {
            if !(Self::MIN_SIDE..=Self::MAX_SIDE).contains(&side) {
                return Err(DimsError::BadSide(side));
            }
        }
        if files * ranks > Self::MAX_SQUARES {
            return Err(DimsError::TooManySquares { files, ranks });
        }
        Ok(Dims {
            files: files as u8,
            ranks: ranks as u8,
        })
    }

    pub const fn files(&self) -> usize {
        self.files as usize
    }

    pub const fn ranks(&self) -> usize {
        self.ranks as usize
    }

    pub const fn size(&self) -> usize {
        self.files() * self.ranks()
    }

    pub const fn contains(&self, c: Coord) -> bool {
        c.file() < self.files() && c.rank() < self.ranks()
    }

    pub const fn index(&self, c: Coord) -> usize {
        c.rank() * self.files() + c.file()
    }

    pub const fn coord(&self, index: usize) -> Coord {
        assert!(index < self.size(), "index is out of board");
        Coord::from_parts(index % self.files(), index / self.files())
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> {
        let dims = *self;
        (0..dims.size()).map(move |i| dims.coord(i))
    }

    /// Moves `c` by the given deltas, returning `None` if the result leaves the board
    pub fn shift(&self, c: Coord, delta_file: isize, delta_rank: isize) -> Option<Coord> {
        let file = c.file().checked_add_signed(delta_file)?;
        let rank = c.rank().checked_add_signed(delta_rank)?;
        if file >= self.files() || rank >= self.ranks() {
            return None;
        }
        Some(Coord::from_parts(file, rank))
    }

    /// Parses a square and checks that it fits on this board
    pub fn parse_coord(&self, s: &str) -> Result<Coord, CoordParseError> {
        let c = Coord::from_str(s)?;
        if !self.contains(c) {
            return Err(CoordParseError::OutOfBoard(c));
        }
        Ok(c)
    }
}

impl Default for Dims {
    fn default() -> Self {
        Self::CLASSICAL
    }
}

impl fmt::Debug for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Dims({}x{})", self.files, self.ranks)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn as_long_str(&self) -> &'static str {
        match *self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(ColorParseError::BadLength);
        }
        let ch = s.as_bytes()[0] as char;
        Color::from_char(ch).ok_or(ColorParseError::UnexpectedChar(ch))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    const fn from_index(val: u8) -> PieceKind {
        match val {
            0 => PieceKind::Pawn,
            1 => PieceKind::Knight,
            2 => PieceKind::Bishop,
            3 => PieceKind::Rook,
            4 => PieceKind::Queen,
            _ => PieceKind::King,
        }
    }

    /// Uppercase letter of the piece, as used in SAN and for White in FEN
    pub fn as_char(&self) -> char {
        b"PNBRQK"[*self as usize] as char
    }

    pub fn from_char(c: char) -> Option<PieceKind> {
        match c {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub const fn is_sliding(&self) -> bool {
        matches!(*self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    Queen = 0,
    King = 1,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::Queen, CastlingSide::King];
}

/// Home files of the king and of the castling rooks of one color
///
/// In classical chess the king starts on the middle file and the rooks in the corners. In
/// Fischer-random setups they may stand anywhere on the home rank, as long as the king is
/// between the rooks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CastlingFiles {
    pub king: usize,
    pub queen_rook: usize,
    pub king_rook: usize,
}

impl CastlingFiles {
    /// Classical files: the king on `files / 2` and the rooks in the corners
    pub const fn classical(dims: Dims) -> CastlingFiles {
        CastlingFiles {
            king: dims.files() / 2,
            queen_rook: 0,
            king_rook: dims.files() - 1,
        }
    }

    pub const fn rook(&self, s: CastlingSide) -> usize {
        match s {
            CastlingSide::Queen => self.queen_rook,
            CastlingSide::King => self.king_rook,
        }
    }

    pub fn set_rook(&mut self, s: CastlingSide, file: usize) {
        match s {
            CastlingSide::Queen => self.queen_rook = file,
            CastlingSide::King => self.king_rook = file,
        }
    }

    /// Returns the castling side which a rook on `file` belongs to
    ///
    /// Returns `None` for the king file itself.
    pub const fn side_of(&self, file: usize) -> Option<CastlingSide> {
        if file < self.king {
            Some(CastlingSide::Queen)
        } else if file > self.king {
            Some(CastlingSide::King)
        } else {
            None
        }
    }
}

/// Contents of a single square
///
/// Besides the piece itself, a cell remembers whether a rook is still eligible for castling
/// on the given side. The board keeps this tag only on a rook standing on its castling
/// origin while the matching right is present.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);

    const KIND_MASK: u8 = 0b0000_0111;
    const COLOR_BIT: u8 = 0b0000_1000;
    const TAG_SHIFT: u8 = 4;

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    pub const fn from_parts(c: Color, k: PieceKind) -> Cell {
        let color = match c {
            Color::White => 0,
            Color::Black => Self::COLOR_BIT,
        };
        Cell(color | (k as u8 + 1))
    }

    pub const fn color(&self) -> Option<Color> {
        if self.is_empty() {
            return None;
        }
        if self.0 & Self::COLOR_BIT != 0 {
            Some(Color::Black)
        } else {
            Some(Color::White)
        }
    }

    pub const fn kind(&self) -> Option<PieceKind> {
        if self.is_empty() {
            return None;
        }
        Some(PieceKind::from_index((self.0 & Self::KIND_MASK) - 1))
    }

    /// Returns `true` if the cell holds a piece of the given color and kind, regardless of tags
    pub const fn is(&self, c: Color, k: PieceKind) -> bool {
        self.is_occupied() && self.0 & !(0b11 << Self::TAG_SHIFT) == Self::from_parts(c, k).0
    }

    pub const fn castling(&self) -> Option<CastlingSide> {
        match self.0 >> Self::TAG_SHIFT {
            1 => Some(CastlingSide::Queen),
            2 => Some(CastlingSide::King),
            _ => None,
        }
    }

    /// Returns the same piece with the castling tag replaced
    ///
    /// Tags are meaningful only for rooks; for other cells this function returns the cell
    /// unchanged.
    pub const fn with_castling(self, side: Option<CastlingSide>) -> Cell {
        if !matches!(self.kind(), Some(PieceKind::Rook)) {
            return self;
        }
        let tag = match side {
            None => 0,
            Some(CastlingSide::Queen) => 1,
            Some(CastlingSide::King) => 2,
        };
        Cell((self.0 & !(0b11 << Self::TAG_SHIFT)) | (tag << Self::TAG_SHIFT))
    }

    pub fn as_char(&self) -> char {
        match (self.color(), self.kind()) {
            (Some(Color::White), Some(k)) => k.as_char(),
            (Some(Color::Black), Some(k)) => k.as_char().to_ascii_lowercase(),
            _ => '.',
        }
    }

    pub fn as_utf8_char(&self) -> char {
        let (color, kind) = match (self.color(), self.kind()) {
            (Some(c), Some(k)) => (c, k),
            _ => return '.',
        };
        let chars = match color {
            Color::White => ['♙', '♘', '♗', '♖', '♕', '♔'],
            Color::Black => ['♟', '♞', '♝', '♜', '♛', '♚'],
        };
        chars[kind as usize]
    }

    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::EMPTY);
        }
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = PieceKind::from_char(c.to_ascii_uppercase())?;
        Some(Cell::from_parts(color, kind))
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.castling() {
            Some(side) => write!(f, "Cell({}, {:?})", self.as_char(), side),
            None => write!(f, "Cell({})", self.as_char()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Cell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != 1 {
            return Err(CellParseError::BadLength);
        }
        let ch = s.chars().next().ok_or(CellParseError::BadLength)?;
        Cell::from_char(ch).ok_or(CellParseError::UnexpectedChar(ch))
    }
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    const fn to_index(c: Color, s: CastlingSide) -> u8 {
        ((c as u8) << 1) | s as u8
    }

    pub const EMPTY: CastlingRights = CastlingRights(0);
    pub const FULL: CastlingRights = CastlingRights(15);

    pub const fn has(&self, c: Color, s: CastlingSide) -> bool {
        ((self.0 >> Self::to_index(c, s)) & 1) != 0
    }

    pub const fn has_color(&self, c: Color) -> bool {
        self.has(c, CastlingSide::Queen) || self.has(c, CastlingSide::King)
    }

    pub fn flip(&mut self, c: Color, s: CastlingSide) {
        self.0 ^= 1_u8 << Self::to_index(c, s)
    }

    pub const fn with(self, c: Color, s: CastlingSide) -> CastlingRights {
        CastlingRights(self.0 | (1_u8 << Self::to_index(c, s)))
    }

    pub const fn without(self, c: Color, s: CastlingSide) -> CastlingRights {
        CastlingRights(self.0 & !(1_u8 << Self::to_index(c, s)))
    }

    pub fn set(&mut self, c: Color, s: CastlingSide) {
        *self = self.with(c, s)
    }

    pub fn unset(&mut self, c: Color, s: CastlingSide) {
        *self = self.without(c, s)
    }

    pub fn unset_color(&mut self, c: Color) {
        self.unset(c, CastlingSide::King);
        self.unset(c, CastlingSide::Queen);
    }

    /// Returns `true` if every right in `self` is also present in `other`
    pub const fn is_subset_of(&self, other: CastlingRights) -> bool {
        self.0 & !other.0 == 0
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "CastlingRights({})", self)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if *self == Self::EMPTY {
            return write!(f, "-");
        }
        if self.has(Color::White, CastlingSide::King) {
            write!(f, "K")?;
        }
        if self.has(Color::White, CastlingSide::Queen) {
            write!(f, "Q")?;
        }
        if self.has(Color::Black, CastlingSide::King) {
            write!(f, "k")?;
        }
        if self.has(Color::Black, CastlingSide::Queen) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

impl FromStr for CastlingRights {
    type Err = CastlingRightsParseError;

    fn from_str(s: &str) -> Result<CastlingRights, Self::Err> {
        type Error = CastlingRightsParseError;
        if s == "-" {
            return Ok(CastlingRights::EMPTY);
        }
        if s.is_empty() {
            return Err(Error::EmptyString);
        }
        let mut res = CastlingRights::EMPTY;
        for ch in s.chars() {
            let (color, side) = match ch {
                'K' => (Color::White, CastlingSide::King),
                'Q' => (Color::White, CastlingSide::Queen),
                'k' => (Color::Black, CastlingSide::King),
                'q' => (Color::Black, CastlingSide::Queen),
                _ => return Err(Error::UnexpectedChar(ch)),
            };
            if res.has(color, side) {
                return Err(Error::DuplicateChar(ch));
            }
            res.set(color, side);
        }
        Ok(res)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Stalemate,
    InsufficientMaterial,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WinKind {
    Checkmate,
}

/// Game outcome that follows from the position alone
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    White(WinKind),
    Black(WinKind),
    Draw(DrawKind),
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Self::White(_) => Some(Color::White),
            Self::Black(_) => Some(Color::Black),
            Self::Draw(_) => None,
        }
    }

    pub fn win(color: Color, kind: WinKind) -> Outcome {
        match color {
            Color::White => Self::White(kind),
            Color::Black => Self::Black(kind),
        }
    }

    /// Result token used in PGN, i.e. `1-0`, `0-1` or `1/2-1/2`
    pub fn as_result_str(&self) -> &'static str {
        match self {
            Self::White(_) => "1-0",
            Self::Black(_) => "0-1",
            Self::Draw(_) => "1/2-1/2",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::White(WinKind::Checkmate) => write!(f, "white wins by checkmate"),
            Self::Black(WinKind::Checkmate) => write!(f, "black wins by checkmate"),
            Self::Draw(DrawKind::Stalemate) => write!(f, "draw by stalemate"),
            Self::Draw(DrawKind::InsufficientMaterial) => {
                write!(f, "draw by insufficient material")
            }
        }
    }
}
