//! # Base types for fenix
//!
//! This is an auxiliary crate for `fenix`, which contains the value types that know nothing
//! about a position: squares, board dimensions, colors, pieces and castling rights.
//!
//! Normally you don't want to use this crate directly. Use `fenix` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
