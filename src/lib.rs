//! Reader for `.mini` configuration files.
//!
//! The format is ini-like but strict: lowercase ASCII names, exactly one space
//! on each side of `=`, whole-line `#` comments, and every line terminated by
//! a newline. A section may appear many times and a key may repeat within a
//! section; both are kept in file order.
//!
//! ```text
//! [core]
//! id = avx2024
//! number_id = 2812
//! number_id = 1233
//!
//! [penalty]
//! ban = 72h
//! ```
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

mod decode;
mod document;
mod error;
mod parser;
mod scalar;

use std::io;

pub use decode::{Bind, DEFAULT_SEPARATOR, Decode, Element, Field, Scope, Shape, decode_document};
pub use document::{Document, Record, Section};
pub use error::{DecodeError, Error, ParseError, Position};
pub use scalar::{DurationError, Scalar, ScalarError, ScalarKind, parse_bool, parse_duration};

use crate::parser::Parser;

impl Document {
    /// Parse `text` into sections and records.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Parser::new(text).into_document()
    }

    /// Read the whole stream and parse it.
    pub fn from_reader<R>(mut reader: R) -> Result<Self, Error>
    where
        R: io::Read,
    {
        let mut buffer = Vec::with_capacity(4096);
        reader.read_to_end(&mut buffer)?;

        let text = decode_data(&buffer);
        Ok(Self::parse(&text)?)
    }
}

/// Parse `reader` and bind the result onto `dest`. On error `dest` is left as it was.
pub fn decode<R, T>(reader: R, dest: &mut T) -> Result<(), Error>
where
    R: io::Read,
    T: Decode + Clone,
{
    let document = Document::from_reader(reader)?;
    decode_document(&document, dest)?;
    Ok(())
}

/// Parse `text` into a fresh `T`.
pub fn from_str<T>(text: &str) -> Result<T, Error>
where
    T: Decode + Default,
{
    let document = Document::parse(text)?;
    let mut value = T::default();
    decode::decode_into(&document, &mut value)?;
    Ok(value)
}

// Files are expected to be UTF-8. Invalid sequences become U+FFFD rather than aborting the read,
// the grammar then rejects them anywhere except inside values and comments.
fn decode_data(data: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(data)
}
