use std::fmt;
use std::io::BufRead;

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::constants::{is_keyword, KEYWORDS, MAX_SEQUENCE_LEN};
use crate::decode::scanner::{Scanner, Token};
use crate::error::{Error, ErrorKind, Location};

/// Raw `pushb` operands. Values are kept as parsed so the engine can report
/// out-of-range bytes as a decoding failure.
pub type ByteOperands = SmallVec<[u32; MAX_SEQUENCE_LEN]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PushChar(SmolStr),
    PushCodePoint(u32),
    PushBytes(ByteOperands),
    Pop,
    Show,
    Exit,
}

impl Command {
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::PushChar(_) => "pushc",
            Command::PushCodePoint(_) => "pushp",
            Command::PushBytes(_) => "pushb",
            Command::Pop => "pop",
            Command::Show => "show",
            Command::Exit => "exit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())?;
        match self {
            Command::PushChar(literal) => write!(f, " {literal}"),
            Command::PushCodePoint(code) => write!(f, " {code}"),
            Command::PushBytes(bytes) => {
                write!(f, " {}", bytes.len())?;
                for byte in bytes {
                    write!(f, " {byte}")?;
                }
                Ok(())
            }
            Command::Pop | Command::Show | Command::Exit => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub value: T,
    pub location: Location,
}

/// Groups scanner tokens into commands with their operands.
///
/// After a parse error the reader carries on with the next unread token, so
/// callers that want to skip bad commands can keep iterating. I/O errors end
/// the iteration.
pub struct CommandReader<R> {
    scanner: Scanner<R>,
    finished: bool,
}

impl<R: BufRead> CommandReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            scanner: Scanner::new(reader),
            finished: false,
        }
    }

    pub fn read_command(&mut self) -> Result<Option<Located<Command>>, Error> {
        if self.finished {
            return Ok(None);
        }

        let result = self.parse_next();
        match &result {
            Ok(None) => self.finished = true,
            Err(err) if err.kind == ErrorKind::Io => self.finished = true,
            _ => {}
        }
        result
    }

    fn parse_next(&mut self) -> Result<Option<Located<Command>>, Error> {
        let Some(keyword) = self.scanner.next_token()? else {
            return Ok(None);
        };

        let command = match keyword.text.as_str() {
            "pushc" => Command::PushChar(self.operand(&keyword, "character")?.text),
            "pushp" => Command::PushCodePoint(self.number(&keyword, "code point")?.0),
            "pushb" => Command::PushBytes(self.byte_operands(&keyword)?),
            "pop" => Command::Pop,
            "show" => Command::Show,
            "exit" => Command::Exit,
            other => {
                return Err(Error::parse(format!(
                    "unknown command '{other}', expected one of: {}",
                    KEYWORDS.join(", ")
                ))
                .with_location(keyword.location))
            }
        };

        Ok(Some(Located {
            value: command,
            location: keyword.location,
        }))
    }

    fn operand(&mut self, keyword: &Token, what: &str) -> Result<Token, Error> {
        self.scanner.next_token()?.ok_or_else(|| {
            Error::parse(format!(
                "missing {what} operand for '{}' at end of input",
                keyword.text
            ))
            .with_location(keyword.location)
        })
    }

    fn number(&mut self, keyword: &Token, what: &str) -> Result<(u32, Location), Error> {
        let token = self.operand(keyword, what)?;
        let value = parse_decimal(&token.text).ok_or_else(|| {
            let message = if is_keyword(&token.text) {
                format!(
                    "missing {what} operand for '{}' before '{}'",
                    keyword.text, token.text
                )
            } else {
                format!(
                    "expected a decimal {what} for '{}', found '{}'",
                    keyword.text, token.text
                )
            };
            Error::parse(message).with_location(token.location)
        })?;
        Ok((value, token.location))
    }

    fn byte_operands(&mut self, keyword: &Token) -> Result<ByteOperands, Error> {
        let (count, count_location) = self.number(keyword, "byte count")?;
        let count = usize::try_from(count)
            .ok()
            .filter(|count| (1..=MAX_SEQUENCE_LEN).contains(count))
            .ok_or_else(|| {
                Error::parse(format!(
                    "byte count {count} for '{}' must be between 1 and {MAX_SEQUENCE_LEN}",
                    keyword.text
                ))
                .with_location(count_location)
            })?;

        let mut bytes = ByteOperands::with_capacity(count);
        for _ in 0..count {
            bytes.push(self.number(keyword, "byte")?.0);
        }
        Ok(bytes)
    }
}

impl<R: BufRead> Iterator for CommandReader<R> {
    type Item = Result<Located<Command>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_command().transpose()
    }
}

/// Plain ASCII digits only: no sign, no radix prefix, no surrounding space.
/// Values past `u32::MAX` saturate so range checks downstream still reject
/// them as out of range rather than as malformed.
fn parse_decimal(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(text.parse().unwrap_or(u32::MAX))
}
