use crate::types::{CastlingSide, Color, Coord, Dims};

pub const fn home_rank(dims: Dims, c: Color) -> usize {
    match c {
        Color::White => 0,
        Color::Black => dims.ranks() - 1,
    }
}

/// Rank from which pawns of color `c` may make a double step
pub const fn pawn_home_rank(dims: Dims, c: Color) -> usize {
    match c {
        Color::White => 1,
        Color::Black => dims.ranks() - 2,
    }
}

pub const fn promote_rank(dims: Dims, c: Color) -> usize {
    home_rank(dims, c.inv())
}

pub const fn pawn_forward_delta(c: Color) -> isize {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Rank on which a pawn of color `c` stands when it can capture en passant
pub const fn enpassant_src_rank(dims: Dims, c: Color) -> usize {
    match c {
        Color::White => pawn_home_rank(dims, Color::Black) - 2,
        Color::Black => pawn_home_rank(dims, Color::White) + 2,
    }
}

/// Rank of the en passant target square when `c` is to move
pub const fn enpassant_dst_rank(dims: Dims, c: Color) -> usize {
    match c {
        Color::White => pawn_home_rank(dims, Color::Black) - 1,
        Color::Black => pawn_home_rank(dims, Color::White) + 1,
    }
}

/// King destination when `c` castles to side `s`
///
/// The destinations don't depend on where the king and the rook start, so they are the same
/// for classical and Fischer-random setups.
pub const fn castling_king_dst(dims: Dims, c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::Queen => 2,
        CastlingSide::King => dims.files() - 2,
    };
    Coord::from_parts(file, home_rank(dims, c))
}

pub const fn castling_rook_dst(dims: Dims, c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::Queen => 3,
        CastlingSide::King => dims.files() - 3,
    };
    Coord::from_parts(file, home_rank(dims, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_classical() {
        let d = Dims::CLASSICAL;
        assert_eq!(enpassant_src_rank(d, Color::White), 4);
        assert_eq!(enpassant_src_rank(d, Color::Black), 3);
        assert_eq!(enpassant_dst_rank(d, Color::White), 5);
        assert_eq!(enpassant_dst_rank(d, Color::Black), 2);
        assert_eq!(castling_king_dst(d, Color::White, CastlingSide::King), sq("g1"));
        assert_eq!(castling_king_dst(d, Color::Black, CastlingSide::Queen), sq("c8"));
        assert_eq!(castling_rook_dst(d, Color::White, CastlingSide::King), sq("f1"));
        assert_eq!(castling_rook_dst(d, Color::Black, CastlingSide::Queen), sq("d8"));
    }

    #[test]
    fn test_wide() {
        let d = Dims::new(10, 10).unwrap();
        assert_eq!(promote_rank(d, Color::White), 9);
        assert_eq!(pawn_home_rank(d, Color::Black), 8);
        assert_eq!(enpassant_src_rank(d, Color::White), 6);
        assert_eq!(castling_king_dst(d, Color::White, CastlingSide::King), sq("i1"));
        assert_eq!(castling_rook_dst(d, Color::White, CastlingSide::King), sq("h1"));
    }
}
