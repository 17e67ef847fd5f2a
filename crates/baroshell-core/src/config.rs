//! Runtime configuration shared by the firmware and the simulator

use embassy_time::Duration;

use crate::sensors::bmp280::registers::BMP280_ADDRESS;

/// Prompt printed after every command.
pub const DEFAULT_PROMPT: &str = "user@baroshell>> ";

#[derive(Debug, Clone, Copy, Default)]
pub struct Config<'a> {
    pub sensor: SensorConfig,
    pub motor: MotorConfig,
    pub shell: ShellConfig<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct SensorConfig {
    /// 7-bit I²C address of the BMP280
    pub address: u8,
    /// Upper bound for a single I²C transaction
    pub bus_timeout: Duration,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: BMP280_ADDRESS,
            bus_timeout: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MotorConfig {
    /// Upper bound for queueing one frame on the control bus
    pub bus_timeout: Duration,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            bus_timeout: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShellConfig<'a> {
    pub prompt: &'a str,
}

impl Default for ShellConfig<'_> {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT,
        }
    }
}

impl<'a> Config<'a> {
    /// Default configuration with a custom prompt.
    pub fn with_prompt(prompt: &'a str) -> Self {
        Self {
            shell: ShellConfig { prompt },
            ..Self::default()
        }
    }
}
