//! Simulated peripherals
//!
//! [`SimulatedBmp280`] answers I²C traffic like the real sensor, backed by a
//! register file. [`RecordingMotorBus`] accepts motor frames and keeps the
//! most recent ones. Both are used by the desktop simulator and by the unit
//! tests.

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use embedded_hal_async::i2c::I2c;
use heapless::Vec;
use log::{debug, info};

use crate::motor::{MotorBus, MotorFrame};
use crate::sensors::bmp280::calibration::{CalibrationSet, DATASHEET_CALIBRATION};
use crate::sensors::bmp280::registers::{BMP280_ADDRESS, Register, SOFT_RESET_KEY};

/// Raw codes from the datasheet worked example (25.08 °C, 100656 Pa).
pub const DEFAULT_RAW_TEMPERATURE: u32 = 519888;
pub const DEFAULT_RAW_PRESSURE: u32 = 415148;

const DEFAULT_CHIP_ID: u8 = 0x58;

// ---------------------------------------------------------------------------
// BMP280
// ---------------------------------------------------------------------------

pub struct SimulatedBmp280 {
    address: u8,
    online: bool,
    registers: [u8; 256],
    pointer: u8,
}

impl SimulatedBmp280 {
    /// A powered-up sensor with the datasheet calibration and readings.
    pub fn new(address: u8) -> Self {
        let mut sim = Self {
            address,
            online: true,
            registers: [0; 256],
            pointer: 0,
        };
        sim.set_chip_id(DEFAULT_CHIP_ID);
        sim.load_calibration(&DATASHEET_CALIBRATION);
        sim.set_raw_temperature(DEFAULT_RAW_TEMPERATURE);
        sim.set_raw_pressure(DEFAULT_RAW_PRESSURE);
        sim
    }

    /// An offline sensor NACKs its address.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn set_chip_id(&mut self, id: u8) {
        self.registers[Register::ChipId.addr() as usize] = id;
    }

    pub fn load_calibration(&mut self, calibration: &CalibrationSet) {
        let start = Register::CalibStart.addr() as usize;
        let bytes = calibration.to_le_bytes();
        self.registers[start..start + bytes.len()].copy_from_slice(&bytes);
    }

    pub fn set_raw_temperature(&mut self, code: u32) {
        self.set_raw(Register::TempMsb, code);
    }

    pub fn set_raw_pressure(&mut self, code: u32) {
        self.set_raw(Register::PressMsb, code);
    }

    pub fn ctrl_meas(&self) -> u8 {
        self.registers[Register::CtrlMeas.addr() as usize]
    }

    fn set_raw(&mut self, msb: Register, code: u32) {
        let at = msb.addr() as usize;
        self.registers[at] = (code >> 12) as u8;
        self.registers[at + 1] = (code >> 4) as u8;
        self.registers[at + 2] = ((code & 0x0F) << 4) as u8;
    }

    fn write_register(&mut self, register: u8, value: u8) {
        if register == Register::Reset.addr() {
            if value == SOFT_RESET_KEY {
                debug!("Simulated BMP280: soft reset");
                self.registers[Register::CtrlMeas.addr() as usize] = 0;
                self.registers[Register::Config.addr() as usize] = 0;
            }
            return;
        }
        self.registers[register as usize] = value;
    }
}

impl Default for SimulatedBmp280 {
    fn default() -> Self {
        Self::new(BMP280_ADDRESS)
    }
}

impl ErrorType for SimulatedBmp280 {
    type Error = ErrorKind;
}

impl I2c for SimulatedBmp280 {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.online || address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let Some((&register, values)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = register;
                    for &value in values {
                        self.write_register(self.pointer, value);
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
                Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = self.registers[self.pointer as usize];
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Motor bus
// ---------------------------------------------------------------------------

const RECORDED_FRAMES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusOffline;

/// Logs and records every frame it is asked to send.
#[derive(Default)]
pub struct RecordingMotorBus {
    frames: Vec<MotorFrame, RECORDED_FRAMES>,
    offline: bool,
}

impl RecordingMotorBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Frames sent so far, oldest first.
    pub fn frames(&self) -> &[MotorFrame] {
        &self.frames
    }
}

impl MotorBus for RecordingMotorBus {
    type Error = BusOffline;

    async fn transmit(&mut self, frame: &MotorFrame) -> Result<(), Self::Error> {
        if self.offline {
            return Err(BusOffline);
        }
        info!("CAN tx id={:#05x} data={:02x?}", frame.id, frame.payload());
        if self.frames.is_full() {
            self.frames.remove(0);
        }
        // Room was made above
        let _ = self.frames.push(*frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embassy_futures::block_on;

    #[test]
    fn test_reads_auto_increment() {
        let mut sim = SimulatedBmp280::default();
        let mut bytes = [0u8; 3];
        block_on(sim.write_read(BMP280_ADDRESS, &[0xFA], &mut bytes)).unwrap();
        assert_eq!(bytes, [0x7E, 0xED, 0x00]);

        block_on(sim.write_read(BMP280_ADDRESS, &[0xF7], &mut bytes)).unwrap();
        assert_eq!(bytes, [0x65, 0x5A, 0xC0]);
    }

    #[test]
    fn test_wrong_address_nacks() {
        let mut sim = SimulatedBmp280::default();
        let mut id = [0u8; 1];
        assert_eq!(
            block_on(sim.write_read(0x76, &[0xD0], &mut id)),
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
    }

    #[test]
    fn test_soft_reset_clears_ctrl_meas() {
        let mut sim = SimulatedBmp280::default();
        block_on(sim.write(BMP280_ADDRESS, &[0xF4, 0x57])).unwrap();
        assert_eq!(sim.ctrl_meas(), 0x57);

        block_on(sim.write(BMP280_ADDRESS, &[0xE0, 0xB6])).unwrap();
        assert_eq!(sim.ctrl_meas(), 0);
    }

    #[test]
    fn test_recorder_keeps_latest_frames() {
        let mut bus = RecordingMotorBus::new();
        for _ in 0..RECORDED_FRAMES + 1 {
            block_on(bus.transmit(&MotorFrame::init())).unwrap();
        }
        assert_eq!(bus.frames().len(), RECORDED_FRAMES);
    }
}
