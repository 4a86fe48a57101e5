pub mod constants;
pub mod decode;
pub mod engine;
pub mod error;
pub mod options;
pub mod text;
pub mod utf8;

use std::io::{BufRead, Write};

pub use crate::decode::{Command, CommandReader, Located};
pub use crate::engine::{Engine, Flow, StopReason, Summary};
pub use crate::error::{Error, ErrorKind, Location};
pub use crate::options::{ErrorPolicy, RunOptions};
pub use crate::text::UString;
pub use crate::utf8::Utf8Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Runs a command stream with default options.
pub fn run<R: BufRead, W: Write>(reader: R, writer: W) -> Result<Summary> {
    run_with_options(reader, writer, &RunOptions::default())
}

pub fn run_with_options<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    options: &RunOptions,
) -> Result<Summary> {
    let mut engine = Engine::new(options.clone());
    engine.run(reader, &mut writer)
}

/// Runs `input` and returns everything the `show` commands printed.
pub fn run_str(input: &str) -> Result<String> {
    run_str_with_options(input, &RunOptions::default())
}

pub fn run_str_with_options(input: &str, options: &RunOptions) -> Result<String> {
    let mut out = Vec::new();
    run_with_options(input.as_bytes(), &mut out, options)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Parses a command stream without executing it.
pub fn parse_str(input: &str) -> Result<Vec<Command>> {
    CommandReader::new(input.as_bytes())
        .map(|item| item.map(|located| located.value))
        .collect()
}
