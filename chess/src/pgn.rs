//! PGN movetext, tag pairs and move lists
//!
//! The movetext parser accepts the export format and the usual relaxations: move numbers may
//! be glued to the move (`1.e4`) or stand apart (`1. e4`), black moves may carry their own
//! number (`1... e5`), and both `{...}` and `;` comments are skipped.

use crate::board::{Board, FenParseError, RawBoard};
use crate::moves::{san, uci, Make, San, Uci};
use crate::types::{Color, Outcome};

use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use thiserror::Error;

/// Tags which every PGN game must have, in their export order
pub const ROSTER_TAGS: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Game result token
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    /// Game is unfinished or its result is unknown
    Unknown,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
            Self::Unknown => "*",
        }
    }
}

impl From<Option<Outcome>> for GameResult {
    fn from(outcome: Option<Outcome>) -> Self {
        match outcome.map(|o| o.winner()) {
            None => Self::Unknown,
            Some(Some(Color::White)) => Self::WhiteWins,
            Some(Some(Color::Black)) => Self::BlackWins,
            Some(None) => Self::Draw,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("unknown game result {0:?}")]
pub struct GameResultParseError(String);

impl FromStr for GameResult {
    type Err = GameResultParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1-0" => Ok(Self::WhiteWins),
            "0-1" => Ok(Self::BlackWins),
            "1/2-1/2" => Ok(Self::Draw),
            "*" => Ok(Self::Unknown),
            _ => Err(GameResultParseError(s.to_string())),
        }
    }
}

/// Error parsing a tag pair
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum TagParseError {
    #[error("tag name is empty")]
    EmptyName,
    #[error("tag value must start with a quote")]
    NoValue,
    #[error("tag value is not terminated")]
    UnterminatedValue,
    #[error("tag pair is not closed with ']'")]
    Unclosed,
}

/// Error parsing PGN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// `{` comment without the closing `}`
    #[error("unclosed brace comment")]
    UnterminatedComment,
    /// Move number doesn't match the position
    #[error("unexpected move number {found:?}, expected {expected}")]
    MoveNumber { expected: String, found: String },
    /// Move cannot be parsed or is illegal
    #[error("cannot parse move #{} {:?}: {}", .pos + 1, .token, .source)]
    Move {
        pos: usize,
        token: String,
        source: san::ParseError,
    },
    #[error("bad tag pair: {0}")]
    Tag(#[from] TagParseError),
    #[error("bad result tag: {0}")]
    ResultTag(#[from] GameResultParseError),
    #[error("bad FEN tag: {0}")]
    Fen(#[from] FenParseError),
    /// `Result` tag disagrees with the result token of the movetext
    #[error("result tag {tag} doesn't match movetext result {movetext}")]
    ResultMismatch {
        tag: GameResult,
        movetext: GameResult,
    },
}

/// Error parsing a list of UCI moves
#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("cannot parse UCI move #{}: {}", .pos + 1, .source)]
pub struct UciListParseError {
    pub pos: usize,
    pub source: uci::ParseError,
}

struct Lexer<'a> {
    unread: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(s: &'a str) -> Self {
        Lexer {
            unread: s.chars().peekable(),
        }
    }

    fn skip_brace_comment(&mut self) -> Result<(), ParseError> {
        debug_assert_eq!(self.unread.peek(), Some(&'{'));
        self.unread.next();
        for c in self.unread.by_ref() {
            if c == '}' {
                return Ok(());
            }
        }
        Err(ParseError::UnterminatedComment)
    }

    fn skip_line(&mut self) {
        for c in self.unread.by_ref() {
            if c == '\n' {
                return;
            }
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        while let Some(&c) = self.unread.peek() {
            match c {
                '{' => self.skip_brace_comment()?,
                ';' => self.skip_line(),
                _ if c.is_whitespace() => {
                    self.unread.next();
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<Option<String>, ParseError> {
        self.skip_whitespace()?;
        let mut token = String::new();
        while let Some(&c) = self.unread.peek() {
            if c.is_whitespace() || c == '{' || c == ';' {
                break;
            }
            token.push(c);
            self.unread.next();
        }
        Ok(if token.is_empty() { None } else { Some(token) })
    }

    fn parse_tag(&mut self) -> Result<(String, String), TagParseError> {
        debug_assert_eq!(self.unread.peek(), Some(&'['));
        self.unread.next();
        self.skip_spaces();
        let mut name = String::new();
        while let Some(&c) = self.unread.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            name.push(c);
            self.unread.next();
        }
        if name.is_empty() {
            return Err(TagParseError::EmptyName);
        }
        self.skip_spaces();
        if self.unread.next() != Some('"') {
            return Err(TagParseError::NoValue);
        }
        let mut value = String::new();
        loop {
            match self.unread.next() {
                Some('\\') => value.push(self.unread.next().ok_or(TagParseError::UnterminatedValue)?),
                Some('"') => break,
                Some(c) => value.push(c),
                None => return Err(TagParseError::UnterminatedValue),
            }
        }
        self.skip_spaces();
        if self.unread.next() != Some(']') {
            return Err(TagParseError::Unclosed);
        }
        Ok((name, value))
    }

    fn skip_spaces(&mut self) {
        while self.unread.peek().is_some_and(|c| c.is_whitespace()) {
            self.unread.next();
        }
    }
}

// Splits `12.`, `12...` or `12.e4` into the number, the dot count and the rest
fn split_number(token: &str) -> Option<(&str, usize, &str)> {
    let digits = token.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let dots = token[digits..].bytes().take_while(|&b| b == b'.').count();
    if dots == 0 {
        return None;
    }
    Some((&token[..digits], dots, &token[digits + dots..]))
}

/// Result of parsing PGN movetext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movetext {
    /// Board after all the moves are played
    pub board: Board,
    /// Result token, if the movetext ends with it
    pub result: Option<GameResult>,
}

impl Movetext {
    /// Plays the movetext `text` starting from `board`
    ///
    /// Each move number must be equal to the number of the move it precedes, as given by the
    /// position. `N.` precedes a move by White and `N...` a move by Black. Numbers may be left
    /// out entirely, but once the movetext has used one, every move by White must be numbered.
    /// A result token ends the movetext, and anything after it is ignored.
    pub fn parse(board: &Board, text: &str) -> Result<Movetext, ParseError> {
        let mut lexer = Lexer::new(text);
        let mut board = board.clone();
        let mut pos = 0;
        let mut numbered = false;
        let mut has_number = false;
        while let Some(token) = lexer.next_token()? {
            if let Ok(result) = GameResult::from_str(&token) {
                return Ok(Movetext {
                    board,
                    result: Some(result),
                });
            }

            let san_str = match split_number(&token) {
                Some((num, dots, rest)) => {
                    let expected = match board.side() {
                        Color::White => format!("{}.", board.move_number()),
                        Color::Black => format!("{}...", board.move_number()),
                    };
                    let found = format!("{}{}", num, ".".repeat(dots));
                    if found != expected {
                        return Err(ParseError::MoveNumber { expected, found });
                    }
                    numbered = true;
                    has_number = true;
                    if rest.is_empty() {
                        continue;
                    }
                    rest.to_string()
                }
                None => token,
            };

            if numbered && !has_number && board.side() == Color::White {
                return Err(ParseError::MoveNumber {
                    expected: format!("{}.", board.move_number()),
                    found: san_str,
                });
            }
            has_number = false;

            San(san_str.as_str())
                .apply(&mut board)
                .map_err(|source| ParseError::Move {
                    pos,
                    token: san_str.clone(),
                    source,
                })?;
            pos += 1;
        }
        Ok(Movetext {
            board,
            result: None,
        })
    }
}

/// Plays the movetext `text` starting from `board` and returns the resulting board
///
/// See [`Movetext::parse()`] for details.
///
/// # Example
///
/// ```
/// # use fenix::{Board, pgn};
/// #
/// let b = pgn::parse_movetext(&Board::initial(), "1. e4 {best by test} e5 2. Nf3 Nc6 *").unwrap();
/// assert_eq!(b.history().len(), 4);
/// assert_eq!(
///     b.as_fen(),
///     "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3"
/// );
/// ```
pub fn parse_movetext(board: &Board, text: &str) -> Result<Board, ParseError> {
    Ok(Movetext::parse(board, text)?.board)
}

/// Plays the space-separated list of UCI moves `text` starting from `board`
pub fn parse_uci_list(board: &Board, text: &str) -> Result<Board, UciListParseError> {
    let mut board = board.clone();
    for (pos, token) in text.split_ascii_whitespace().enumerate() {
        Uci(token)
            .apply(&mut board)
            .map_err(|source| UciListParseError { pos, source })?;
    }
    Ok(board)
}

/// Numbering style for [`SanList`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NumberPolicy {
    /// No move numbers
    Omit,
    /// Move numbers as given by the starting position
    FromBoard,
    /// Move numbers start from the given one
    Custom(usize),
}

/// Wrapper to format the history of a board as a list of SAN moves
///
/// # Example
///
/// ```
/// # use fenix::{Board, pgn::{self, NumberPolicy, SanList}};
/// #
/// let b = pgn::parse_movetext(&Board::initial(), "1. f3 e5 2. g4 Qh4#").unwrap();
/// assert_eq!(
///     SanList::new(&b, NumberPolicy::FromBoard).to_string(),
///     "1. f3 e5 2. g4 Qh4#"
/// );
/// assert_eq!(SanList::new(&b, NumberPolicy::Omit).to_string(), "f3 e5 g4 Qh4#");
/// ```
pub struct SanList<'a> {
    board: &'a Board,
    policy: NumberPolicy,
    style: san::Style,
}

impl<'a> SanList<'a> {
    pub fn new(board: &'a Board, policy: NumberPolicy) -> Self {
        SanList {
            board,
            policy,
            style: san::Style::Algebraic,
        }
    }

    pub fn with_style(mut self, style: san::Style) -> Self {
        self.style = style;
        self
    }
}

impl<'a> fmt::Display for SanList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let real_start_num = self.board.start().move_number as usize;
        let start_num = match self.policy {
            NumberPolicy::Omit => None,
            NumberPolicy::FromBoard => Some(real_start_num),
            NumberPolicy::Custom(u) => Some(u),
        };

        for (i, (b, mv)) in self.board.replay().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            if let Some(num) = start_num {
                let num = b.move_number() as usize - real_start_num + num;
                match b.side() {
                    Color::White => write!(f, "{}. ", num)?,
                    Color::Black if i == 0 => write!(f, "{}... ", num)?,
                    Color::Black => {}
                }
            }
            let san = mv.san(&b).map_err(|_| fmt::Error)?;
            write!(f, "{}", san.styled(self.style))?;
        }
        Ok(())
    }
}

/// Wrapper to format the history of a board as a list of UCI moves
pub struct UciList<'a>(pub &'a Board);

impl<'a> fmt::Display for UciList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, m) in self.0.history().iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

/// PGN game: tag pairs followed by movetext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Tag pairs in the order they appear
    pub tags: Vec<(String, String)>,
    /// Board after all the moves; its history holds the moves themselves
    pub board: Board,
    pub result: GameResult,
}

impl Game {
    /// Creates a game from the board history, with the result taken from the position
    ///
    /// If the history doesn't start from the initial position, the `SetUp` and `FEN` tags are
    /// filled in.
    pub fn from_board(board: Board) -> Game {
        let result = GameResult::from(board.calc_outcome());
        let mut tags = Vec::new();
        if board.start() != &RawBoard::initial() {
            tags.push(("SetUp".to_string(), "1".to_string()));
            tags.push(("FEN".to_string(), board.start().as_fen()));
        }
        Game {
            tags,
            board,
            result,
        }
    }

    /// Parses a single game
    ///
    /// The game starts from the position in the `FEN` tag if it is present and `SetUp` is not
    /// `"0"`, otherwise from the initial position. The result is taken from the movetext and
    /// falls back to the `Result` tag. If both are present, they must agree.
    ///
    /// # Example
    ///
    /// ```
    /// # use fenix::pgn::{Game, GameResult};
    /// #
    /// let text = r#"[Event "Casual \"blitz\""]
    /// [White "A"]
    /// [Black "B"]
    ///
    /// 1. f3 e5 2. g4 Qh4# 0-1
    /// "#;
    /// let game = Game::parse(text).unwrap();
    /// assert_eq!(game.tag("Event"), Some("Casual \"blitz\""));
    /// assert_eq!(game.result, GameResult::BlackWins);
    /// assert!(game.board.is_checkmate());
    /// assert_eq!(game.missing_roster_tags(), ["Site", "Date", "Round", "Result"]);
    /// ```
    pub fn parse(text: &str) -> Result<Game, ParseError> {
        let mut lexer = Lexer::new(text);
        let mut tags = Vec::new();
        lexer.skip_whitespace()?;
        while lexer.unread.peek() == Some(&'[') {
            tags.push(lexer.parse_tag()?);
            lexer.skip_whitespace()?;
        }
        let rest: String = lexer.unread.collect();

        let find = |name: &str| {
            tags.iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };
        let start = match (find("FEN"), find("SetUp")) {
            (Some(fen), setup) if setup != Some("0") => Board::from_fen(fen.trim())?,
            _ => Board::initial(),
        };
        let tag_result = find("Result").map(|r| GameResult::from_str(r.trim())).transpose()?;

        let movetext = Movetext::parse(&start, &rest)?;
        if let (Some(tag), Some(text)) = (tag_result, movetext.result) {
            if tag != text {
                return Err(ParseError::ResultMismatch {
                    tag,
                    movetext: text,
                });
            }
        }
        let result = movetext
            .result
            .or(tag_result)
            .unwrap_or(GameResult::Unknown);
        Ok(Game {
            tags,
            board: movetext.board,
            result,
        })
    }

    /// Returns the value of tag `name`, if present
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets tag `name` to `value`, replacing the previous value if any
    pub fn set_tag(&mut self, name: &str, value: &str) {
        match self.tags.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.tags.push((name.to_string(), value.to_string())),
        }
    }

    /// Returns the mandatory tags absent from this game
    pub fn missing_roster_tags(&self) -> Vec<&'static str> {
        ROSTER_TAGS
            .into_iter()
            .filter(|name| self.tag(name).is_none())
            .collect()
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> Result<(), fmt::Error> {
    for c in s.chars() {
        if c == '"' || c == '\\' {
            write!(f, "\\")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (name, value) in &self.tags {
            write!(f, "[{} \"", name)?;
            write_escaped(f, value)?;
            writeln!(f, "\"]")?;
        }
        // Without these tags the moves could not be replayed
        let start = self.board.start();
        let mut has_tags = !self.tags.is_empty();
        if start != &RawBoard::initial() && self.tag("FEN").is_none() {
            if self.tag("SetUp").is_none() {
                writeln!(f, "[SetUp \"1\"]")?;
            }
            writeln!(f, "[FEN \"{}\"]", start.as_fen())?;
            has_tags = true;
        }
        if has_tags {
            writeln!(f)?;
        }
        let moves = SanList::new(&self.board, NumberPolicy::FromBoard).to_string();
        if !moves.is_empty() {
            write!(f, "{} ", moves)?;
        }
        writeln!(f, "{}", self.result)
    }
}
