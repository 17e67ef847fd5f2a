//! Application-wide state and error types for baroshell

use embedded_hal_async::i2c::I2c;
use log::{error, info};
use thiserror_no_std::Error;

use crate::config::Config;
use crate::motor::{Motor, MotorBus, MotorError};
use crate::sensors::{Bmp280, SensorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRunState {
    Uninitialized,
    /// Sensor and motor answered during bring-up.
    Ready,
    /// Bring-up failed. The shell still runs and commands report their own
    /// errors.
    Degraded,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("Motor error: {0}")]
    Motor(#[from] MotorError),
}

pub struct AppState<I, M> {
    pub run_state: AppRunState,
    pub sensor: Bmp280<I>,
    pub motor: Motor<M>,
}

impl<I: I2c, M: MotorBus> AppState<I, M> {
    pub fn new(i2c: I, motor_bus: M, config: &Config<'_>) -> Self {
        Self {
            run_state: AppRunState::Uninitialized,
            sensor: Bmp280::new(i2c, &config.sensor),
            motor: Motor::new(motor_bus, &config.motor),
        }
    }

    /// Bring up the sensor, then the motor. Both are attempted; the first
    /// failure is returned.
    pub async fn init(&mut self) -> Result<(), AppError> {
        let sensor = self.sensor.init().await.map(|_| ());
        let motor = self.motor.init().await;

        match sensor.map_err(AppError::from).and(motor.map_err(AppError::from)) {
            Ok(()) => {
                self.run_state = AppRunState::Ready;
                info!("App state: ready");
                Ok(())
            }
            Err(e) => {
                self.run_state = AppRunState::Degraded;
                error!("App state: degraded ({})", e);
                Err(e)
            }
        }
    }
}
