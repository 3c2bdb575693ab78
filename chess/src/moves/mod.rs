mod base;

pub mod make;
pub mod san;
pub mod uci;

pub use base::*;
pub use make::{Make, San, Uci};

pub(crate) use base::make_raw;

pub type SanMove = san::Move;
pub type UciMove = uci::Move;
