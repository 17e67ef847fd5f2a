//! Interactive command shell
//!
//! [`Shell::process`] consumes one received byte at a time and returns the
//! bytes to send back: the echo, and once a line is complete, the command
//! response followed by the prompt.
//!
//! ```text
//! user@baroshell>> GET_T
//! T = 25.08 C
//! user@baroshell>> GO_TO -45
//! Go to -45 deg
//! ```

pub mod command;
pub mod line;

use core::fmt::{self, Write as _};

use embedded_hal_async::i2c::I2c;
use heapless::Vec;
use log::{debug, warn};
use thiserror_no_std::Error;

use crate::app_state::AppState;
use crate::config::ShellConfig;
use crate::motor::{MotorBus, MotorPosition};
use crate::sensors::SensorError;

use command::{COMMANDS, Command};
use line::{Feed, LineEditor};

pub use line::{CommandLine, LINE_CAPACITY, MAX_ARGS};

pub const NEWLINE: &str = "\r\n";
pub const ERASE: &str = "\x08 \x08";

const TRANSCRIPT_CAPACITY: usize = 512;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellError {
    #[error("Line too long")]
    LineTooLong,
    #[error("Too many arguments")]
    TooManyArguments,
    #[error("Invalid input")]
    InvalidUtf8,
    #[error("Command not found")]
    CommandNotFound,
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Bytes to write back to the serial links for one received byte.
///
/// Raw bytes rather than text: the echo repeats whatever arrived, valid
/// UTF-8 or not.
#[derive(Debug, Default)]
pub struct Transcript {
    bytes: Vec<u8, TRANSCRIPT_CAPACITY>,
    truncated: bool,
}

impl Transcript {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        if self.bytes.extend_from_slice(bytes).is_err() {
            if !self.truncated {
                warn!("Shell: response truncated at {} bytes", TRANSCRIPT_CAPACITY);
            }
            self.truncated = true;
        }
    }
}

impl fmt::Write for Transcript {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes());
        Ok(())
    }
}

pub struct Shell<'a> {
    editor: LineEditor,
    prompt: &'a str,
}

impl<'a> Shell<'a> {
    pub fn new(config: &ShellConfig<'a>) -> Self {
        Self {
            editor: LineEditor::new(),
            prompt: config.prompt,
        }
    }

    /// Greeting sent once the links are up.
    pub fn banner(&self) -> Transcript {
        let mut out = Transcript::default();
        let _ = write!(out, "{}baroshell ready, type HELP{}", NEWLINE, NEWLINE);
        let _ = out.write_str(self.prompt);
        out
    }

    pub async fn process<I: I2c, M: MotorBus>(
        &mut self,
        byte: u8,
        state: &mut AppState<I, M>,
    ) -> Transcript {
        let mut out = Transcript::default();

        match self.editor.feed(byte) {
            Feed::Echo(byte) => out.push_bytes(&[byte]),
            Feed::Erase => {
                let _ = out.write_str(ERASE);
            }
            Feed::Ignored | Feed::Rejected => {}
            Feed::Complete => {
                let _ = out.write_str(NEWLINE);
                let parsed = match self.editor.take_command() {
                    Ok(line) if line.is_empty() => None,
                    Ok(line) => Some(Command::parse(&line)),
                    Err(e) => Some(Err(e)),
                };
                self.editor.finish();

                match parsed {
                    None => {}
                    Some(Ok(command)) => {
                        debug!("Shell: running {}", command.name());
                        execute(command, state, &mut out).await;
                    }
                    Some(Err(e)) => {
                        warn!("Shell: {}", e);
                        let _ = write!(out, "{}{}", e, NEWLINE);
                    }
                }
                let _ = out.write_str(self.prompt);
            }
        }

        out
    }
}

async fn execute<I: I2c, M: MotorBus>(
    command: Command,
    state: &mut AppState<I, M>,
    out: &mut Transcript,
) {
    let _ = match command {
        Command::GetTemperature => match state.sensor.read_compensated_temperature().await {
            Ok(celsius) => write!(out, "T = {:.2} C{}", celsius, NEWLINE),
            Err(e) => write!(out, "T = error: {}{}", e, NEWLINE),
        },
        Command::GetPressure => match state.sensor.read_compensated_pressure().await {
            Ok(pascals) => write!(out, "P = {:.0} Pa{}", pascals, NEWLINE),
            Err(SensorError::InvalidReading) => write!(out, "P = invalid reading{}", NEWLINE),
            Err(e) => write!(out, "P = error: {}{}", e, NEWLINE),
        },
        Command::GoTo(degrees) => {
            let moved = match MotorPosition::new(degrees) {
                Ok(position) => state.motor.set_position(position).await,
                Err(e) => Err(e),
            };
            match moved {
                Ok(()) => write!(out, "Go to {} deg{}", degrees, NEWLINE),
                Err(e) => write!(out, "Go to: {}{}", e, NEWLINE),
            }
        }
        Command::TrackTemperature => match state.sensor.measure().await {
            Ok(measurement) => {
                let position =
                    MotorPosition::from_temperature(measurement.temperature.centi_celsius);
                match state.motor.set_position(position).await {
                    Ok(()) => write!(
                        out,
                        "T = {:.2} C, go to {} deg{}",
                        measurement.celsius(),
                        position.degrees(),
                        NEWLINE
                    ),
                    Err(e) => write!(out, "Track: {}{}", e, NEWLINE),
                }
            }
            Err(e) => write!(out, "Track: {}{}", e, NEWLINE),
        },
        Command::GetChipId => match state.sensor.read_chip_id().await {
            Ok(id) => write!(out, "Chip id = {:#04x}{}", id, NEWLINE),
            Err(e) => write!(out, "Chip id: {}{}", e, NEWLINE),
        },
        Command::GetK | Command::SetK | Command::GetA => {
            write!(out, "{}: not implemented{}", command.name(), NEWLINE)
        }
        Command::Help => {
            for info in COMMANDS {
                let _ = write!(out, "  {:<12} {}{}", info.usage, info.summary, NEWLINE);
            }
            Ok(())
        }
    };
}
