use crate::types::{Coord, Dims};
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;
use std::iter::IntoIterator;

/// Set of squares, indexed by [`Dims::index`]
///
/// A bitboard does not carry the board size, so the same bits mean different squares on
/// boards of different size. Use [`Bitboard::coords`] to turn it back into squares.
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u128);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const fn from_raw(val: u128) -> Bitboard {
        Bitboard(val)
    }

    pub const fn from_index(index: usize) -> Bitboard {
        Bitboard(1_u128 << index)
    }

    /// Bitboard with all the squares of the board set
    pub const fn full(dims: Dims) -> Bitboard {
        let size = dims.size();
        if size == 128 {
            return Bitboard(u128::MAX);
        }
        Bitboard((1_u128 << size) - 1)
    }

    pub const fn with(self, index: usize) -> Bitboard {
        Bitboard(self.0 | (1_u128 << index))
    }

    pub const fn without(self, index: usize) -> Bitboard {
        Bitboard(self.0 & !(1_u128 << index))
    }

    pub fn set(&mut self, index: usize) {
        *self = self.with(index);
    }

    pub fn unset(&mut self, index: usize) {
        *self = self.without(index);
    }

    pub const fn has(&self, index: usize) -> bool {
        ((self.0 >> index) & 1) != 0
    }

    pub fn with_coord(self, dims: Dims, c: Coord) -> Bitboard {
        self.with(dims.index(c))
    }

    pub fn has_coord(&self, dims: Dims, c: Coord) -> bool {
        dims.contains(c) && self.has(dims.index(c))
    }

    pub const fn as_raw(&self) -> u128 {
        self.0
    }

    pub const fn popcount(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    /// Iterates over the squares in index order
    pub fn coords(self, dims: Dims) -> impl Iterator<Item = Coord> {
        self.into_iter().map(move |i| dims.coord(i))
    }

    /// Renders the bitboard as ranks from the top, separated by `/`
    pub fn display(&self, dims: Dims) -> String {
        let mut res = String::with_capacity(dims.size() + dims.ranks());
        for rank in (0..dims.ranks()).rev() {
            for file in 0..dims.files() {
                let c = Coord::from_parts(file, rank);
                res.push(if self.has(dims.index(c)) { '1' } else { '0' });
            }
            if rank != 0 {
                res.push('/');
            }
        }
        res
    }
}

impl From<Bitboard> for u128 {
    fn from(b: Bitboard) -> u128 {
        b.0
    }
}

impl From<u128> for Bitboard {
    fn from(u: u128) -> Bitboard {
        Bitboard(u)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({:#x})", self.0)
    }
}

pub struct Iter(u128);

impl Iterator for Iter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u128);
        Some(bit as usize)
    }
}

impl IntoIterator for Bitboard {
    type Item = usize;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}
