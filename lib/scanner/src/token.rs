use std::fmt::Display;

use cursor::Line;
use strum_macros::{AsRefStr, EnumIter, EnumString};

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub data: TokenData<'a>,
    pub lexeme: &'a str,
    pub line: Line,
}

impl<'a> Token<'a> {
    pub fn new(data: TokenData<'a>, lexeme: &'a str, line: Line) -> Token<'a> {
        Self { data, lexeme, line }
    }

    pub fn eof(line: Line) -> Token<'a> {
        Self::new(TokenData::Eof, "", line)
    }

    pub fn lexeme(&self) -> &'a str {
        self.lexeme
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn is_eof(&self) -> bool {
        self.data == TokenData::Eof
    }

    /// The resolved value of a number or string token.
    pub fn literal(&self) -> Option<Literal<'a>> {
        match self.data {
            TokenData::Number(n) => Some(Literal::Number(n)),
            TokenData::Str(s) => Some(Literal::Str(s)),
            _ => None,
        }
    }

    /// `KIND lexeme literal`, as shown by the token dump.
    pub fn describe(&self) -> String {
        let literal = match self.literal() {
            Some(literal) => literal.to_string(),
            None => "nil".to_string(),
        };
        format!("{} {} {}", self.data.as_ref(), self.lexeme, literal)
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Number(f64),
    Str(&'a str),
}

impl Display for Literal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Str(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenData<'a> {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    #[strum(serialize = "STRING")]
    Str(&'a str),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}

impl TokenData<'_> {
    /// Whether a token of this kind begins a statement or declaration.
    pub fn starts_statement(&self) -> bool {
        matches!(self, Self::Class | Self::Fun | Self::Var | Self::For | Self::If | Self::While | Self::Print | Self::Return)
    }
}

/// Reserved words, parsed from their source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
}

impl From<Keyword> for TokenData<'_> {
    fn from(keyword: Keyword) -> Self {
        match keyword {
            Keyword::And => TokenData::And,
            Keyword::Class => TokenData::Class,
            Keyword::Else => TokenData::Else,
            Keyword::False => TokenData::False,
            Keyword::For => TokenData::For,
            Keyword::Fun => TokenData::Fun,
            Keyword::If => TokenData::If,
            Keyword::Nil => TokenData::Nil,
            Keyword::Or => TokenData::Or,
            Keyword::Print => TokenData::Print,
            Keyword::Return => TokenData::Return,
            Keyword::Super => TokenData::Super,
            Keyword::This => TokenData::This,
            Keyword::True => TokenData::True,
            Keyword::Var => TokenData::Var,
            Keyword::While => TokenData::While,
        }
    }
}
