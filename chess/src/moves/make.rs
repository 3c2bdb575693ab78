//! Uniform way to play moves given in different forms
//!
//! A [`Move`], a SAN string wrapped into [`San`] and a UCI string wrapped into [`Uci`] can all
//! be passed to [`Board::make_move()`](crate::Board::make_move).

use super::base::{Move, ValidateError};
use super::{san, uci};
use crate::board::Board;

/// Something that can be played on a board
pub trait Make {
    type Err;

    /// Plays the move on `board` and returns the move actually played
    ///
    /// On error, the board is left unchanged.
    fn apply(&self, board: &mut Board) -> Result<Move, Self::Err>;

    /// Plays the move on a copy of `board` and returns the copy
    fn make(&self, board: &Board) -> Result<Board, Self::Err> {
        let mut cloned = board.clone();
        self.apply(&mut cloned)?;
        Ok(cloned)
    }
}

impl Make for Move {
    type Err = ValidateError;

    #[inline]
    fn apply(&self, board: &mut Board) -> Result<Move, Self::Err> {
        board.apply_move(*self)?;
        Ok(*self)
    }
}

/// Move in UCI format
pub struct Uci<S: AsRef<str>>(pub S);

impl<S: AsRef<str>> Make for Uci<S> {
    type Err = uci::ParseError;

    #[inline]
    fn apply(&self, board: &mut Board) -> Result<Move, Self::Err> {
        let mv = Move::from_uci(self.0.as_ref(), board)?;
        board.commit(mv);
        Ok(mv)
    }
}

/// Move in SAN format
pub struct San<S: AsRef<str>>(pub S);

impl<S: AsRef<str>> Make for San<S> {
    type Err = san::ParseError;

    #[inline]
    fn apply(&self, board: &mut Board) -> Result<Move, Self::Err> {
        let mv = Move::from_san(self.0.as_ref(), board)?;
        board.commit(mv);
        Ok(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveKind;

    #[test]
    fn test_forms() {
        let b = Board::initial();
        let by_uci = b.make_move(Uci("g1f3")).unwrap();
        let by_san = b.make_move(San("Nf3")).unwrap();
        let mv = Move::from_uci("g1f3", &b).unwrap();
        let by_move = b.make_move(mv).unwrap();
        assert_eq!(by_uci, by_san);
        assert_eq!(by_uci, by_move);
        assert_eq!(by_uci.history(), &[mv]);

        let mut b = b;
        let played = San(String::from("e4")).apply(&mut b).unwrap();
        assert_eq!(played.kind(), MoveKind::PawnDouble);
        assert_eq!(b.history().len(), 1);
    }

    #[test]
    fn test_error_keeps_board() {
        let mut b = Board::initial();
        let before = b.clone();
        assert!(San("Nf6").apply(&mut b).is_err());
        assert!(Uci("e2e5").apply(&mut b).is_err());
        assert!(matches!(
            Uci("e2e9").apply(&mut b),
            Err(uci::ParseError::Validate(ValidateError::OutOfBoard(_)))
        ));
        assert_eq!(b, before);
        assert!(b.history().is_empty());
    }
}
