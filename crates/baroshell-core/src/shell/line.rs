//! Line editing for the serial console.
//!
//! Bytes arrive one at a time. Printable bytes are appended and echoed, a
//! backspace removes the last byte and a carriage return completes the line.
//! The buffer is fixed at [`LINE_CAPACITY`] bytes; the editor never writes
//! past it.

use heapless::Vec;

use super::ShellError;

pub const LINE_CAPACITY: usize = 64;
pub const MAX_ARGS: usize = 9;

pub const CR: u8 = b'\r';
pub const BS: u8 = 0x08;

/// What the driver should do after a byte has been fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Byte was appended; echo it.
    Echo(u8),
    /// Last byte was removed; echo `"\b \b"`.
    Erase,
    /// Nothing to do (backspace on an empty line).
    Ignored,
    /// Line is full, byte dropped.
    Rejected,
    /// Carriage return: echo `"\r\n"` then call [`LineEditor::take_command`].
    Complete,
}

#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: Vec<u8, LINE_CAPACITY>,
    overflowed: bool,
    ready: bool,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
            ready: false,
        }
    }

    /// Bytes typed so far on the current line.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn feed(&mut self, byte: u8) -> Feed {
        if self.ready {
            // A completed line that was never taken is discarded.
            self.finish();
        }

        match byte {
            CR => {
                self.ready = true;
                Feed::Complete
            }
            BS => {
                if self.buffer.pop().is_some() {
                    Feed::Erase
                } else {
                    Feed::Ignored
                }
            }
            _ => {
                if self.buffer.push(byte).is_ok() {
                    Feed::Echo(byte)
                } else {
                    self.overflowed = true;
                    Feed::Rejected
                }
            }
        }
    }

    /// Tokenize the completed line.
    ///
    /// Tokens borrow from the editor, so the line stays intact until
    /// [`Self::finish`] is called.
    pub fn take_command(&self) -> Result<CommandLine<'_>, ShellError> {
        if self.overflowed {
            return Err(ShellError::LineTooLong);
        }

        let line = core::str::from_utf8(&self.buffer).map_err(|_| ShellError::InvalidUtf8)?;
        let mut args = Vec::new();
        for token in line.split(' ').filter(|token| !token.is_empty()) {
            args.push(token)
                .map_err(|_| ShellError::TooManyArguments)?;
        }
        Ok(CommandLine { args })
    }

    /// Reset for the next line.
    pub fn finish(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
        self.ready = false;
    }
}

/// A tokenized command line. `args()[0]` is the command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    args: Vec<&'a str, MAX_ARGS>,
}

impl<'a> CommandLine<'a> {
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn name(&self) -> Option<&'a str> {
        self.args.first().copied()
    }

    /// Arguments after the command name.
    pub fn args(&self) -> &[&'a str] {
        self.args.get(1..).unwrap_or(&[])
    }

    pub fn argv(&self) -> &[&'a str] {
        &self.args
    }
}
