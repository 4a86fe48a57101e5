use std::io::BufRead;

use smol_str::SmolStr;

use crate::constants::is_separator;
use crate::error::{Error, Location};
use crate::utf8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: SmolStr,
    pub location: Location,
}

/// Splits a command stream into whitespace-separated tokens.
///
/// Input is pulled one line at a time, so tokens from a line are available
/// before the reader has seen anything after its newline. A caller that stops
/// asking for tokens stops the scanner from reading further.
pub struct Scanner<R> {
    reader: R,
    line: Vec<char>,
    line_no: usize,
    cursor: usize,
    eof: bool,
    raw: Vec<u8>,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_no: 0,
            cursor: 0,
            eof: false,
            raw: Vec::new(),
        }
    }

    /// Location just past the last consumed token.
    pub fn location(&self) -> Location {
        Location {
            line: self.line_no.max(1),
            column: self.cursor + 1,
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        loop {
            while self.cursor < self.line.len() && is_separator(self.line[self.cursor]) {
                self.cursor += 1;
            }

            if self.cursor < self.line.len() {
                let start = self.cursor;
                while self.cursor < self.line.len() && !is_separator(self.line[self.cursor]) {
                    self.cursor += 1;
                }
                let token = Token {
                    text: self.line[start..self.cursor].iter().copied().collect(),
                    location: Location {
                        line: self.line_no,
                        column: start + 1,
                    },
                };
                tracing::trace!(token = %token.text, at = %token.location, "scanned token");
                return Ok(Some(token));
            }

            if !self.fill_line()? {
                return Ok(None);
            }
        }
    }

    fn fill_line(&mut self) -> Result<bool, Error> {
        if self.eof {
            return Ok(false);
        }

        self.raw.clear();
        let read = self.reader.read_until(b'\n', &mut self.raw)?;
        if read == 0 {
            self.eof = true;
            self.line.clear();
            self.cursor = 0;
            return Ok(false);
        }

        self.line_no += 1;
        self.cursor = 0;
        match utf8::decode_all(&self.raw) {
            Ok(line) => {
                self.line = line;
                Ok(true)
            }
            Err(err) => {
                self.line.clear();
                Err(
                    Error::parse(format!("input is not valid UTF-8: {err}")).with_location(
                        Location {
                            line: self.line_no,
                            column: 1,
                        },
                    ),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;
    use crate::error::ErrorKind;

    fn tokens(input: &str) -> Vec<(String, usize, usize)> {
        let mut scanner = Scanner::new(Cursor::new(input.as_bytes().to_vec()));
        let mut out = Vec::new();
        while let Some(token) = scanner.next_token().expect("scan") {
            out.push((
                token.text.to_string(),
                token.location.line,
                token.location.column,
            ));
        }
        out
    }

    #[rstest]
    fn test_splits_on_whitespace() {
        assert_eq!(
            tokens("pushc Ю show exit\n"),
            vec![
                ("pushc".to_string(), 1, 1),
                ("Ю".to_string(), 1, 7),
                ("show".to_string(), 1, 9),
                ("exit".to_string(), 1, 14),
            ]
        );
    }

    #[rstest]
    fn test_mixed_separators_and_lines() {
        assert_eq!(
            tokens("  pushp\t84\r\n\x0bshow\x0c\n\nexit"),
            vec![
                ("pushp".to_string(), 1, 3),
                ("84".to_string(), 1, 9),
                ("show".to_string(), 2, 2),
                ("exit".to_string(), 4, 1),
            ]
        );
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t\n")]
    fn test_blank_input_has_no_tokens(#[case] input: &str) {
        assert!(tokens(input).is_empty());
    }

    #[rstest]
    fn test_non_ascii_whitespace_is_part_of_token() {
        assert_eq!(
            tokens("a\u{3000}b c"),
            vec![("a\u{3000}b".to_string(), 1, 1), ("c".to_string(), 1, 5)]
        );
    }

    #[rstest]
    fn test_rejects_invalid_utf8_line() {
        let mut scanner = Scanner::new(Cursor::new(vec![b'a', b' ', 0xFF, b'\n', b'b']));
        let err = scanner.next_token().expect_err("invalid");
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.location, Some(Location { line: 1, column: 1 }));

        let next = scanner.next_token().expect("next line").expect("token");
        assert_eq!(next.text, "b");
        assert_eq!(next.location.line, 2);
    }

    #[rstest]
    fn test_reads_lazily() {
        let mut scanner = Scanner::new(Cursor::new(b"show\nexit\n".to_vec()));
        let first = scanner.next_token().expect("scan").expect("token");
        assert_eq!(first.text, "show");
        assert_eq!(scanner.location(), Location { line: 1, column: 5 });
    }
}
