use std::{
    fmt::{self, Display, Formatter},
    ops::{Deref, DerefMut},
};

use itertools::Itertools;

use cursor::Line;

/// The pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Scan,
    Parse,
    Runtime,
}

/// Where on its line a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Nowhere,
    End,
    Lexeme(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Location::Nowhere => Ok(()),
            Location::End => write!(f, " at end"),
            Location::Lexeme(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct LoxError {
    pub kind: ErrorKind,
    pub line: Line,
    pub location: Location,
    pub message: String,
}

impl LoxError {
    pub fn new(kind: ErrorKind, line: Line, message: impl ToString) -> Self {
        Self { kind, line, location: Location::Nowhere, message: message.to_string() }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

#[derive(thiserror::Error, Debug, Default, PartialEq)]
pub struct LoxErrors(pub Vec<LoxError>);

impl From<LoxError> for LoxErrors {
    fn from(e: LoxError) -> Self {
        Self(vec![e])
    }
}

impl FromIterator<LoxError> for LoxErrors {
    fn from_iter<I: IntoIterator<Item = LoxError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for LoxErrors {
    type Item = LoxError;
    type IntoIter = std::vec::IntoIter<LoxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Deref for LoxErrors {
    type Target = Vec<LoxError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for LoxErrors {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for LoxErrors {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

pub type Result<T> = std::result::Result<T, LoxError>;
