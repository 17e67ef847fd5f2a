//! Motor bus over the on-chip TWAI (CAN) controller

use baroshell_core::motor::{MotorBus, MotorFrame};
use esp_hal::Async;
use esp_hal::twai::{EspTwaiError, EspTwaiFrame, StandardId, Twai};
use thiserror_no_std::Error;

#[derive(Error, Debug)]
pub enum TwaiBusError {
    #[error("identifier {0:#x} is not an 11-bit id")]
    InvalidId(u16),
    #[error("payload of {0} bytes does not fit a frame")]
    InvalidLength(u8),
    #[error("TWAI error: {0:?}")]
    Transmit(EspTwaiError),
}

pub struct TwaiMotorBus {
    twai: Twai<'static, Async>,
}

impl TwaiMotorBus {
    pub fn new(twai: Twai<'static, Async>) -> Self {
        Self { twai }
    }
}

impl MotorBus for TwaiMotorBus {
    type Error = TwaiBusError;

    async fn transmit(&mut self, frame: &MotorFrame) -> Result<(), Self::Error> {
        let id = StandardId::new(frame.id).ok_or(TwaiBusError::InvalidId(frame.id))?;
        let data = frame
            .data
            .get(..frame.len as usize)
            .ok_or(TwaiBusError::InvalidLength(frame.len))?;
        let frame = EspTwaiFrame::new(id, data).ok_or(TwaiBusError::InvalidLength(frame.len))?;

        self.twai
            .transmit_async(&frame)
            .await
            .map_err(TwaiBusError::Transmit)
    }
}
