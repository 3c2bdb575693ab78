//! Piece handles and their geometric reach

use crate::geometry;
use crate::types::{CastlingSide, Cell, Color, Coord, Dims, PieceKind};

use arrayvec::ArrayVec;

pub(crate) const DIAG_DIRS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub(crate) const LINE_DIRS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub(crate) const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
pub(crate) const KING_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Longest possible ray on the largest supported board
pub const MAX_RAY_LEN: usize = Dims::MAX_SIDE - 1;

/// Which squares of a ray can be destinations
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Both empty squares and squares with enemy pieces
    Any,
    /// Only empty squares (forward pawn steps)
    MoveOnly,
    /// Only squares with enemy pieces, or the en passant target (pawn captures)
    CaptureOnly,
}

/// Ordered list of squares a piece reaches in one direction
///
/// If the ray is blockable, the piece cannot move beyond the first occupied square. Otherwise,
/// each square is checked on its own, as for knight jumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ray {
    squares: ArrayVec<Coord, MAX_RAY_LEN>,
    blockable: bool,
    target: Target,
}

impl Ray {
    fn slide(dims: Dims, from: Coord, dir: (isize, isize), limit: usize, target: Target) -> Ray {
        let mut squares = ArrayVec::new();
        let mut cur = from;
        while squares.len() < limit {
            match dims.shift(cur, dir.0, dir.1) {
                Some(c) => {
                    squares.push(c);
                    cur = c;
                }
                None => break,
            }
        }
        Ray {
            squares,
            blockable: true,
            target,
        }
    }

    fn jump(dims: Dims, from: Coord, offsets: &[(isize, isize)], target: Target) -> Ray {
        Ray {
            squares: offsets
                .iter()
                .filter_map(|&(df, dr)| dims.shift(from, df, dr))
                .collect(),
            blockable: false,
            target,
        }
    }

    #[inline]
    pub fn squares(&self) -> &[Coord] {
        &self.squares
    }

    #[inline]
    pub fn is_blockable(&self) -> bool {
        self.blockable
    }

    #[inline]
    pub fn target(&self) -> Target {
        self.target
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }
}

/// All the rays of a piece
pub type Reach = ArrayVec<Ray, 8>;

/// Piece standing on a board
///
/// This is a read-only handle produced by [`Board::piece_at()`](crate::Board::piece_at) and
/// [`Board::pieces_of()`](crate::Board::pieces_of). It does not borrow the board, so it may
/// become stale after the board changes; functions that accept a handle verify it first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
    coord: Coord,
    castling: Option<CastlingSide>,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind, coord: Coord) -> Piece {
        Piece {
            color,
            kind,
            coord,
            castling: None,
        }
    }

    /// Creates a handle from the contents of square `coord`, or `None` if the square is empty
    pub fn from_cell(cell: Cell, coord: Coord) -> Option<Piece> {
        Some(Piece {
            color: cell.color()?,
            kind: cell.kind()?,
            coord,
            castling: cell.castling(),
        })
    }

    #[inline]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Castling side this rook still corresponds to, if any
    ///
    /// Always `None` for pieces other than rooks.
    #[inline]
    pub const fn castling(&self) -> Option<CastlingSide> {
        self.castling
    }

    #[inline]
    pub fn cell(&self) -> Cell {
        Cell::from_parts(self.color, self.kind).with_castling(self.castling)
    }

    /// Computes the squares this piece reaches on an empty board of size `dims`
    ///
    /// Occupancy is not considered here, see [`movegen`](crate::movegen) for that.
    pub fn reach(&self, dims: Dims) -> Reach {
        let mut res = Reach::new();
        let mut add = |ray: Ray| {
            if !ray.is_empty() {
                res.push(ray);
            }
        };
        match self.kind {
            PieceKind::Pawn => {
                let fwd = geometry::pawn_forward_delta(self.color);
                let len = if self.coord.rank() == geometry::pawn_home_rank(dims, self.color) {
                    2
                } else {
                    1
                };
                add(Ray::slide(dims, self.coord, (0, fwd), len, Target::MoveOnly));
                add(Ray::jump(
                    dims,
                    self.coord,
                    &[(-1, fwd), (1, fwd)],
                    Target::CaptureOnly,
                ));
            }
            PieceKind::Knight => add(Ray::jump(dims, self.coord, &KNIGHT_OFFSETS, Target::Any)),
            PieceKind::King => add(Ray::jump(dims, self.coord, &KING_OFFSETS, Target::Any)),
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                let diag = matches!(self.kind, PieceKind::Bishop | PieceKind::Queen);
                let line = matches!(self.kind, PieceKind::Rook | PieceKind::Queen);
                let dirs = DIAG_DIRS
                    .iter()
                    .filter(|_| diag)
                    .chain(LINE_DIRS.iter().filter(|_| line));
                for &dir in dirs {
                    add(Ray::slide(dims, self.coord, dir, MAX_RAY_LEN, Target::Any));
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::str::FromStr;

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    fn all_squares(reach: &Reach) -> BTreeSet<String> {
        reach
            .iter()
            .flat_map(|r| r.squares().iter().map(ToString::to_string))
            .collect()
    }

    #[test]
    fn test_knight() {
        let dims = Dims::CLASSICAL;
        let reach = Piece::new(Color::White, PieceKind::Knight, sq("a1")).reach(dims);
        assert_eq!(reach.len(), 1);
        assert!(!reach[0].is_blockable());
        assert_eq!(
            all_squares(&reach),
            BTreeSet::from(["b3".to_string(), "c2".to_string()])
        );
        let reach = Piece::new(Color::Black, PieceKind::Knight, sq("e4")).reach(dims);
        assert_eq!(all_squares(&reach).len(), 8);
    }

    #[test]
    fn test_sliders() {
        let dims = Dims::CLASSICAL;
        let rook = Piece::new(Color::White, PieceKind::Rook, sq("d4")).reach(dims);
        assert_eq!(rook.len(), 4);
        assert!(rook.iter().all(Ray::is_blockable));
        assert_eq!(all_squares(&rook).len(), 14);

        let bishop = Piece::new(Color::White, PieceKind::Bishop, sq("a1")).reach(dims);
        assert_eq!(bishop.len(), 1);
        assert_eq!(
            bishop[0].squares(),
            &[
                sq("b2"),
                sq("c3"),
                sq("d4"),
                sq("e5"),
                sq("f6"),
                sq("g7"),
                sq("h8")
            ]
        );

        let queen = Piece::new(Color::Black, PieceKind::Queen, sq("d4")).reach(dims);
        assert_eq!(queen.len(), 8);
        assert_eq!(all_squares(&queen).len(), 27);

        let wide = Dims::new(16, 8).unwrap();
        let rook = Piece::new(Color::White, PieceKind::Rook, sq("a1")).reach(wide);
        assert_eq!(all_squares(&rook).len(), 22);
    }

    #[test]
    fn test_pawn() {
        let dims = Dims::CLASSICAL;
        let reach = Piece::new(Color::White, PieceKind::Pawn, sq("e2")).reach(dims);
        assert_eq!(reach.len(), 2);
        assert_eq!(reach[0].target(), Target::MoveOnly);
        assert_eq!(reach[0].squares(), &[sq("e3"), sq("e4")]);
        assert_eq!(reach[1].target(), Target::CaptureOnly);
        assert_eq!(reach[1].squares(), &[sq("d3"), sq("f3")]);

        let reach = Piece::new(Color::Black, PieceKind::Pawn, sq("a5")).reach(dims);
        assert_eq!(reach[0].squares(), &[sq("a4")]);
        assert_eq!(reach[1].squares(), &[sq("b4")]);
    }

    #[test]
    fn test_cell() {
        let cell = Cell::from_parts(Color::White, PieceKind::Rook).with_castling(Some(CastlingSide::King));
        let piece = Piece::from_cell(cell, sq("h1")).unwrap();
        assert_eq!(piece.castling(), Some(CastlingSide::King));
        assert_eq!(piece.cell(), cell);
        assert_eq!(Piece::from_cell(Cell::EMPTY, sq("h1")), None);
    }
}
