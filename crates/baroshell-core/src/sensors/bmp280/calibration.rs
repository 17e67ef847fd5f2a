//! Factory trimming coefficients.
//!
//! The BMP280 stores twelve 16-bit words in registers 0x88–0x9F. They are read
//! once per power-up and never change while the device is running.

use super::registers::CALIBRATION_WORDS;

/// The 12 calibration words in register order.
///
/// | Index | Name | Interpretation |
/// |-------|------|----------------|
/// | 0     | T1   | unsigned       |
/// | 1–2   | T2–T3| signed 16-bit  |
/// | 3     | P1   | unsigned       |
/// | 4–11  | P2–P9| signed 16-bit  |
///
/// Words are kept as the raw `u16` the device reports; the typed accessors
/// reinterpret the signed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationSet {
    words: [u16; CALIBRATION_WORDS],
}

impl CalibrationSet {
    pub const fn from_words(words: [u16; CALIBRATION_WORDS]) -> Self {
        Self { words }
    }

    /// Assembles the set from the 24-byte little-endian calibration block.
    pub fn from_le_bytes(bytes: &[u8; CALIBRATION_WORDS * 2]) -> Self {
        let mut words = [0u16; CALIBRATION_WORDS];
        for (word, pair) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Self { words }
    }

    pub const fn words(&self) -> &[u16; CALIBRATION_WORDS] {
        &self.words
    }

    pub fn to_le_bytes(&self) -> [u8; CALIBRATION_WORDS * 2] {
        let mut bytes = [0u8; CALIBRATION_WORDS * 2];
        for (pair, word) in bytes.chunks_exact_mut(2).zip(self.words.iter()) {
            pair.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    pub const fn t1(&self) -> u16 {
        self.words[0]
    }

    pub const fn t2(&self) -> i16 {
        self.words[1] as i16
    }

    pub const fn t3(&self) -> i16 {
        self.words[2] as i16
    }

    pub const fn p1(&self) -> u16 {
        self.words[3]
    }

    pub const fn p2(&self) -> i16 {
        self.words[4] as i16
    }

    pub const fn p3(&self) -> i16 {
        self.words[5] as i16
    }

    pub const fn p4(&self) -> i16 {
        self.words[6] as i16
    }

    pub const fn p5(&self) -> i16 {
        self.words[7] as i16
    }

    pub const fn p6(&self) -> i16 {
        self.words[8] as i16
    }

    pub const fn p7(&self) -> i16 {
        self.words[9] as i16
    }

    pub const fn p8(&self) -> i16 {
        self.words[10] as i16
    }

    pub const fn p9(&self) -> i16 {
        self.words[11] as i16
    }
}

/// Coefficients from the Bosch datasheet worked example.
///
/// Used by the simulator as its factory trim and by tests as the golden set.
pub const DATASHEET_CALIBRATION: CalibrationSet = CalibrationSet::from_words([
    27504,
    26435,
    -1000i16 as u16,
    36477,
    -10685i16 as u16,
    3024,
    2855,
    140,
    -7i16 as u16,
    15500,
    -14600i16 as u16,
    6000,
]);
