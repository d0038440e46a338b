use std::{fmt, io};

use crate::scalar::ScalarError;

/// Location of a character in the input, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Everything that can go wrong while turning a stream into a populated value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read data")]
    ReadFailure {
        #[from]
        source: io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Grammar errors raised by the parser. The first one aborts the parse.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{at}: leading spaces are not allowed")]
    LeadingSpace { at: Position },
    #[error("{at}: invalid leading char {found:?}")]
    InvalidChar { at: Position, found: char },
    #[error("{at}: expected new line, found {found:?}")]
    ExpectedNewLine { at: Position, found: char },
    #[error("{at}: invalid section name, found {found:?}")]
    InvalidSection { at: Position, found: char },
    #[error("{at}: key outside of any section")]
    RootSectionExpected { at: Position },
    #[error("{at}: invalid key name, found {found:?}")]
    InvalidKey { at: Position, found: char },
    #[error("{at}: expected equal sign, found {found:?}")]
    ExpectedEqual { at: Position, found: char },
    #[error("{at}: expected space, found {found:?}")]
    ExpectedSpace { at: Position, found: char },
    #[error("{at}: unexpected end of file")]
    UnexpectedEof { at: Position },
}

impl ParseError {
    /// Where the offending character (or the end of input) was found.
    #[must_use]
    pub fn position(&self) -> Position {
        match *self {
            Self::LeadingSpace { at }
            | Self::InvalidChar { at, .. }
            | Self::ExpectedNewLine { at, .. }
            | Self::InvalidSection { at, .. }
            | Self::RootSectionExpected { at }
            | Self::InvalidKey { at, .. }
            | Self::ExpectedEqual { at, .. }
            | Self::ExpectedSpace { at, .. }
            | Self::UnexpectedEof { at } => at,
        }
    }
}

/// Binding errors raised while filling a destination from a document.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("field {name}: expected a struct element, found {type_name}")]
    ExpectedStruct {
        name: &'static str,
        type_name: &'static str,
    },
    #[error("field {name}: expected an array, found {count} entries")]
    ExpectedArray { name: &'static str, count: usize },
    #[error("field {name}: section cannot be bound to {type_name}")]
    BadSectionType {
        name: &'static str,
        type_name: &'static str,
    },
    #[error("field {name}: record value cannot be bound to {type_name}")]
    BadRecordType {
        name: &'static str,
        type_name: &'static str,
    },
    #[error("field {name} is required")]
    RequiredField { name: &'static str },
    #[error("field {name}: bad value {value:?}")]
    InvalidValue {
        name: &'static str,
        value: String,
        source: ScalarError,
    },
}

impl DecodeError {
    /// Binding name of the field that failed.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match *self {
            Self::ExpectedStruct { name, .. }
            | Self::ExpectedArray { name, .. }
            | Self::BadSectionType { name, .. }
            | Self::BadRecordType { name, .. }
            | Self::RequiredField { name }
            | Self::InvalidValue { name, .. } => name,
        }
    }
}
