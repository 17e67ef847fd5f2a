//! BMP280 register map and fixed measurement policy.
//!
//! Addresses follow the Bosch BMP280 datasheet. Multi-byte registers support
//! sequential reads: the device auto-increments its register pointer, so a
//! single write-read starting at an MSB register returns the whole field.

/// 7-bit I²C address with SDO tied high.
pub const BMP280_ADDRESS: u8 = 0x77;

/// Register offsets used by the driver.
///
/// | Group        | Registers         | Contents                                   |
/// |--------------|-------------------|--------------------------------------------|
/// | Calibration  | 0x88 ..= 0xA1     | 12 little-endian trimming coefficients     |
/// | Identity     | 0xD0              | chip id                                    |
/// | Reset        | 0xE0              | write [`SOFT_RESET_KEY`] to reset          |
/// | Control      | 0xF3 / 0xF4 / 0xF5| status, ctrl_meas, config                  |
/// | Pressure     | 0xF7 / 0xF8 / 0xF9| 20-bit raw code, MSB first                 |
/// | Temperature  | 0xFA / 0xFB / 0xFC| 20-bit raw code, MSB first                 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    CalibStart = 0x88,
    CalibEnd = 0xA1,
    ChipId = 0xD0,
    Reset = 0xE0,
    Status = 0xF3,
    CtrlMeas = 0xF4,
    Config = 0xF5,
    PressMsb = 0xF7,
    PressLsb = 0xF8,
    PressXlsb = 0xF9,
    TempMsb = 0xFA,
    TempLsb = 0xFB,
    TempXlsb = 0xFC,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Chip ids reported by sample and mass-production parts.
pub const BMP280_CHIP_IDS: [u8; 3] = [0x56, 0x57, 0x58];

/// Writing this to [`Register::Reset`] triggers a full power-on reset.
pub const SOFT_RESET_KEY: u8 = 0xB6;

/// Number of 16-bit coefficients in the calibration block.
pub const CALIBRATION_WORDS: usize = 12;

// Register masks
pub const STATUS_MASK: u8 = 0x09;
pub const OSRS_T_MASK: u8 = 0xE0;
pub const OSRS_P_MASK: u8 = 0x1C;
pub const MODE_MASK: u8 = 0x03;
pub const STANDBY_MASK: u8 = 0xE0;
pub const FILTER_MASK: u8 = 0x1C;

/// Oversampling field value shared by `osrs_t` and `osrs_p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Oversampling {
    Skipped = 0b000,
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

/// `mode[1:0]` of `ctrl_meas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMode {
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

/// Packs the three `ctrl_meas` fields into the register value.
pub const fn ctrl_meas(temperature: Oversampling, pressure: Oversampling, mode: PowerMode) -> u8 {
    (((temperature as u8) << 5) & OSRS_T_MASK)
        | (((pressure as u8) << 2) & OSRS_P_MASK)
        | ((mode as u8) & MODE_MASK)
}

/// Measurement policy written by [`super::Bmp280::configure`].
///
/// Temperature ×2, pressure ×16, continuous (normal) mode. Not runtime
/// configurable.
pub const CTRL_MEAS_POLICY: u8 = ctrl_meas(Oversampling::X2, Oversampling::X16, PowerMode::Normal);
