use std::fmt;
use std::io;

use crate::utf8::Utf8Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    InvalidCodePoint,
    InvalidUtf8,
    EmptyBuffer,
    OutOfRange,
    Io,
}

/// Position of a token in the command stream. Both fields are 1-based and the
/// column counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
}

impl Error {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn invalid_code_point(code: u32) -> Self {
        Self::new(
            ErrorKind::InvalidCodePoint,
            format!("invalid code point {code} (U+{code:04X})"),
        )
    }

    pub fn invalid_utf8(err: Utf8Error) -> Self {
        Self::new(ErrorKind::InvalidUtf8, format!("invalid UTF-8: {err}"))
    }

    pub fn empty_buffer() -> Self {
        Self::new(
            ErrorKind::EmptyBuffer,
            "cannot remove the last element from an empty string",
        )
    }

    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::new(
            ErrorKind::OutOfRange,
            format!("index {index} is out of range for a string of length {len}"),
        )
    }

    pub fn io(err: &io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Error {}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::invalid_utf8(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(&err)
    }
}
