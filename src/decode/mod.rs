//! Command stream decoding: whitespace tokenisation and grouping of tokens
//! into commands.

pub mod command;
pub mod scanner;

pub use command::{ByteOperands, Command, CommandReader, Located};
pub use scanner::{Scanner, Token};
