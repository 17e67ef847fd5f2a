//! Sensor drivers and their shared error type

pub mod bmp280;

use embedded_hal::i2c::ErrorKind;
use thiserror_no_std::Error;

pub use bmp280::{Bmp280, Measurement};

/// Errors raised by a sensor session.
///
/// Bus failures carry the operation that was in flight so the shell can
/// report something more useful than "I2C error".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("I2C error during {operation}: {kind}")]
    Bus {
        operation: &'static str,
        kind: ErrorKind,
    },
    #[error("I2C timeout during {operation}")]
    Timeout { operation: &'static str },
    #[error("invalid reading (pressure compensation divisor is zero)")]
    InvalidReading,
    #[error("unsupported chip id {0:#04x}")]
    UnsupportedChip(u8),
}
