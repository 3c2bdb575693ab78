//! # Chess rules kernel
//!
//! `fenix` keeps a chess position, knows which moves are legal in it, detects check, checkmate
//! and stalemate, and converts positions and moves to and from the usual text formats: FEN, SAN,
//! UCI and PGN movetext.
//!
//! Boards are not limited to 8x8: any size from 6x6 to 16x16 with at most 128 squares can be
//! loaded from FEN via [`Board::from_fen_dims()`].
//!
//! # Example
//!
//! ```
//! use fenix::{Board, moves::{Make, San}, types::{Outcome, WinKind}};
//!
//! let mut b = Board::initial();
//! for san in ["f3", "e5", "g4", "Qh4#"] {
//!     San(san).apply(&mut b).unwrap();
//! }
//! assert!(b.is_checkmate());
//! assert_eq!(b.calc_outcome(), Some(Outcome::Black(WinKind::Checkmate)));
//! assert_eq!(b.as_fen(), "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
//! ```

pub mod board;
pub mod castling;
pub mod legal;
pub mod movegen;
pub mod moves;
pub mod pgn;
pub mod piece;

pub use fenix_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use board::{Board, RawBoard};
pub use movegen::MoveList;
pub use moves::{Make, Move, MoveKind, PromotePiece};
pub use piece::Piece;
pub use types::{
    CastlingFiles, CastlingRights, CastlingSide, Cell, Color, Coord, Dims, Outcome, PieceKind,
};
