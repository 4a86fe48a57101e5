//! Command execution against an owned [`UString`] buffer.

use std::io::{BufRead, Write};

use crate::decode::{Command, CommandReader};
use crate::error::{Error, ErrorKind};
use crate::options::{ErrorPolicy, RunOptions};
use crate::text::UString;
use crate::utf8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exit,
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Commands that ran to completion, `exit` included.
    pub executed: usize,
    /// Commands dropped under [`ErrorPolicy::Skip`].
    pub skipped: usize,
    pub stopped_by: StopReason,
}

#[derive(Debug, Default)]
pub struct Engine {
    buffer: UString,
    options: RunOptions,
}

impl Engine {
    pub fn new(options: RunOptions) -> Self {
        Self {
            buffer: UString::new(),
            options,
        }
    }

    pub fn buffer(&self) -> &UString {
        &self.buffer
    }

    pub fn into_buffer(self) -> UString {
        self.buffer
    }

    /// Runs one command. On error the buffer is exactly as it was before.
    pub fn execute<W: Write + ?Sized>(
        &mut self,
        command: &Command,
        out: &mut W,
    ) -> Result<Flow, Error> {
        match command {
            Command::PushChar(literal) => self.buffer.push_str(literal),
            Command::PushCodePoint(code) => {
                self.buffer.push_code_point(*code)?;
            }
            Command::PushBytes(values) => {
                let bytes = utf8::narrow_bytes(values)?;
                self.buffer.push_utf8(&bytes)?;
            }
            Command::Pop => {
                self.buffer.pop().ok_or_else(Error::empty_buffer)?;
            }
            Command::Show => {
                self.buffer.write_to(out)?;
                out.write_all(b"\n")?;
                out.flush()?;
            }
            Command::Exit => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    /// Reads commands from `reader` until `exit` or end of input.
    ///
    /// I/O failures always end the run. Other failures follow the configured
    /// [`ErrorPolicy`].
    pub fn run<R: BufRead, W: Write + ?Sized>(
        &mut self,
        reader: R,
        out: &mut W,
    ) -> Result<Summary, Error> {
        let mut summary = Summary {
            executed: 0,
            skipped: 0,
            stopped_by: StopReason::EndOfInput,
        };

        for item in CommandReader::new(reader) {
            let outcome = item.and_then(|located| {
                tracing::debug!(command = %located.value, at = %located.location, "executing");
                self.execute(&located.value, out).map_err(|err| match err.location {
                    Some(_) => err,
                    None => err.with_location(located.location),
                })
            });

            match outcome {
                Ok(Flow::Continue) => summary.executed += 1,
                Ok(Flow::Stop) => {
                    summary.executed += 1;
                    summary.stopped_by = StopReason::Exit;
                    break;
                }
                Err(err) if err.kind == ErrorKind::Io => return Err(err),
                Err(err) => match self.options.error_policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::Skip => {
                        tracing::warn!(error = %err, "skipping command");
                        summary.skipped += 1;
                    }
                },
            }
        }

        tracing::info!(
            executed = summary.executed,
            skipped = summary.skipped,
            stopped_by = ?summary.stopped_by,
            length = self.buffer.len(),
            "run finished"
        );
        Ok(summary)
    }
}
