//! Position control of the CAN-attached motor
//!
//! The motor controller understands two frames:
//!
//! | Id     | DLC | Payload          | Meaning                       |
//! |--------|-----|------------------|-------------------------------|
//! | `0x62` | 3   | zeros            | initialise the controller     |
//! | `0x61` | 2   | `[angle, sign]`  | go to `angle` degrees         |
//!
//! `sign` is 0 for a positive angle and 1 for a negative one.

use embassy_time::{Duration, with_timeout};
use log::{error, info};
use thiserror_no_std::Error;

use crate::config::MotorConfig;

pub const MOTOR_INIT_ID: u16 = 0x62;
pub const MOTOR_POSITION_ID: u16 = 0x61;

const MOTOR_INIT_DLC: u8 = 3;
const MAX_ANGLE: i32 = 180;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorError {
    #[error("control bus error")]
    Bus,
    #[error("control bus timeout")]
    Timeout,
    #[error("angle {0} is outside -180..=180")]
    AngleOutOfRange(i32),
}

/// A classic CAN data frame with a standard identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorFrame {
    pub id: u16,
    pub data: [u8; 8],
    pub len: u8,
}

impl MotorFrame {
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    pub fn init() -> Self {
        Self {
            id: MOTOR_INIT_ID,
            data: [0; 8],
            len: MOTOR_INIT_DLC,
        }
    }

    pub fn position(position: MotorPosition) -> Self {
        let mut data = [0; 8];
        data[0] = position.angle();
        data[1] = position.is_negative() as u8;
        Self {
            id: MOTOR_POSITION_ID,
            data,
            len: 2,
        }
    }
}

/// Transmit side of the motor control bus.
pub trait MotorBus {
    type Error: core::fmt::Debug;

    /// Queue one frame. Completes once the controller has accepted it.
    fn transmit(&mut self, frame: &MotorFrame) -> impl Future<Output = Result<(), Self::Error>>;
}

impl<T: MotorBus + ?Sized> MotorBus for &mut T {
    type Error = T::Error;

    async fn transmit(&mut self, frame: &MotorFrame) -> Result<(), Self::Error> {
        (**self).transmit(frame).await
    }
}

/// A target angle in whole degrees, −180..=180.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorPosition(i32);

impl MotorPosition {
    pub fn new(degrees: i32) -> Result<Self, MotorError> {
        if (-MAX_ANGLE..=MAX_ANGLE).contains(&degrees) {
            Ok(Self(degrees))
        } else {
            Err(MotorError::AngleOutOfRange(degrees))
        }
    }

    /// Map a temperature (0.01 °C) onto the dial: whole degrees Celsius
    /// modulo 180, keeping the sign of the temperature.
    pub fn from_temperature(centi_celsius: i32) -> Self {
        Self((centi_celsius / 100) % MAX_ANGLE)
    }

    pub fn degrees(self) -> i32 {
        self.0
    }

    /// Magnitude as sent on the wire.
    pub fn angle(self) -> u8 {
        self.0.unsigned_abs() as u8
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

pub struct Motor<M> {
    bus: M,
    bus_timeout: Duration,
}

impl<M: MotorBus> Motor<M> {
    pub fn new(bus: M, config: &MotorConfig) -> Self {
        Self {
            bus,
            bus_timeout: config.bus_timeout,
        }
    }

    pub async fn init(&mut self) -> Result<(), MotorError> {
        self.send(&MotorFrame::init()).await?;
        info!("Motor: controller initialised");
        Ok(())
    }

    pub async fn set_position(&mut self, position: MotorPosition) -> Result<(), MotorError> {
        self.send(&MotorFrame::position(position)).await?;
        info!("Motor: go to {} deg", position.degrees());
        Ok(())
    }

    async fn send(&mut self, frame: &MotorFrame) -> Result<(), MotorError> {
        with_timeout(self.bus_timeout, self.bus.transmit(frame))
            .await
            .map_err(|_| {
                error!("Motor: frame {:#x} timed out", frame.id);
                MotorError::Timeout
            })?
            .map_err(|e| {
                error!("Motor: frame {:#x} failed: {:?}", frame.id, e);
                MotorError::Bus
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RecordingMotorBus;

    use embassy_futures::block_on;

    #[test]
    fn test_position_range() {
        assert_eq!(MotorPosition::new(180).map(MotorPosition::degrees), Ok(180));
        assert_eq!(MotorPosition::new(-180).map(MotorPosition::degrees), Ok(-180));
        assert_eq!(MotorPosition::new(181), Err(MotorError::AngleOutOfRange(181)));
        assert_eq!(MotorPosition::new(-200), Err(MotorError::AngleOutOfRange(-200)));
    }

    #[test]
    fn test_position_frame_layout() {
        let frame = MotorFrame::position(MotorPosition::new(-45).unwrap());
        assert_eq!(frame.id, 0x61);
        assert_eq!(frame.payload(), &[45, 1]);

        let frame = MotorFrame::position(MotorPosition::new(90).unwrap());
        assert_eq!(frame.payload(), &[90, 0]);
    }

    #[test]
    fn test_init_frame_layout() {
        let frame = MotorFrame::init();
        assert_eq!(frame.id, 0x62);
        assert_eq!(frame.payload(), &[0, 0, 0]);
    }

    #[test]
    fn test_position_from_temperature() {
        assert_eq!(MotorPosition::from_temperature(2508).degrees(), 25);
        assert_eq!(MotorPosition::from_temperature(-1250).degrees(), -12);
        // 185.55 °C wraps past the end of the dial
        assert_eq!(MotorPosition::from_temperature(18555).degrees(), 5);
    }

    #[test]
    fn test_motor_sends_frames_in_order() {
        let mut bus = RecordingMotorBus::new();
        let mut motor = Motor::new(&mut bus, &MotorConfig::default());

        block_on(motor.init()).unwrap();
        block_on(motor.set_position(MotorPosition::new(30).unwrap())).unwrap();

        let frames = bus.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], MotorFrame::init());
        assert_eq!(frames[1].payload(), &[30, 0]);
    }

    #[test]
    fn test_bus_failure_is_reported() {
        let mut bus = RecordingMotorBus::new();
        bus.set_offline(true);
        let mut motor = Motor::new(&mut bus, &MotorConfig::default());

        assert_eq!(block_on(motor.init()), Err(MotorError::Bus));
        assert!(bus.frames().is_empty());
    }

    struct StalledBus;

    impl MotorBus for StalledBus {
        type Error = ();

        async fn transmit(&mut self, _frame: &MotorFrame) -> Result<(), ()> {
            core::future::pending().await
        }
    }

    #[test]
    fn test_stalled_bus_times_out() {
        let config = MotorConfig {
            bus_timeout: Duration::from_ticks(0),
        };
        let mut motor = Motor::new(StalledBus, &config);

        assert_eq!(
            block_on(motor.set_position(MotorPosition::new(10).unwrap())),
            Err(MotorError::Timeout)
        );
    }
}
