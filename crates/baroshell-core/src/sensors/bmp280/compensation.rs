//! Fixed-point compensation of raw BMP280 ADC codes.
//!
//! Both formulas are the 32-bit integer variants from the Bosch datasheet.
//! They depend on two's-complement wraparound, arithmetic right shifts on
//! signed intermediates and an unsigned division step in the pressure path, so
//! every step below uses an explicit 32-bit type and `wrapping_*` arithmetic.
//! Widening any intermediate to 64 bits changes the results.

use super::calibration::CalibrationSet;

/// A 20-bit raw ADC code, assembled from a MSB/LSB/XLSB register triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawReading(u32);

impl RawReading {
    /// Unpacks `(msb << 12) | (lsb << 4) | (xlsb >> 4)`.
    pub const fn from_registers(bytes: [u8; 3]) -> Self {
        Self(((bytes[0] as u32) << 12) | ((bytes[1] as u32) << 4) | ((bytes[2] as u32) >> 4))
    }

    pub const fn code(self) -> u32 {
        self.0
    }
}

impl From<u32> for RawReading {
    fn from(code: u32) -> Self {
        Self(code & 0x000F_FFFF)
    }
}

/// Intermediate temperature term carried from the temperature pass into the
/// pressure pass (`t_fine` in the datasheet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FineTemperature(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompensatedTemperature {
    pub fine: FineTemperature,
    /// Temperature in 0.01 °C.
    pub centi_celsius: i32,
}

impl CompensatedTemperature {
    pub fn celsius(&self) -> f64 {
        self.centi_celsius as f64 / 100.0
    }
}

/// Compensates a raw temperature code.
///
/// Returns the fine temperature needed by [`compensate_pressure`] together
/// with the temperature in hundredths of a degree Celsius (2508 = 25.08 °C).
pub fn compensate_temperature(raw_temp: u32, calib: &CalibrationSet) -> CompensatedTemperature {
    let adc = raw_temp as i32;
    let t1 = calib.t1() as i32;
    let t2 = calib.t2() as i32;
    let t3 = calib.t3() as i32;

    let var1 = (adc >> 3).wrapping_sub(t1 << 1).wrapping_mul(t2) >> 11;
    let delta = (adc >> 4).wrapping_sub(t1);
    let var2 = (delta.wrapping_mul(delta) >> 12).wrapping_mul(t3) >> 14;

    let fine = var1.wrapping_add(var2);
    let centi_celsius = fine.wrapping_mul(5).wrapping_add(128) >> 8;

    CompensatedTemperature {
        fine: FineTemperature(fine),
        centi_celsius,
    }
}

/// The divisor of the pressure formula.
///
/// Zero means the calibration (in practice a zero P1) cannot produce a
/// pressure for this temperature.
pub fn pressure_denominator(fine: FineTemperature, calib: &CalibrationSet) -> i32 {
    let p1 = calib.p1() as i32;
    let p2 = calib.p2() as i32;
    let p3 = calib.p3() as i32;

    let v1 = (fine.0 >> 1).wrapping_sub(64000);
    let square = (v1 >> 2).wrapping_mul(v1 >> 2);
    let v1 = (p3.wrapping_mul(square >> 13) >> 3).wrapping_add(p2.wrapping_mul(v1) >> 1) >> 18;
    32768i32.wrapping_add(v1).wrapping_mul(p1) >> 15
}

/// Compensates a raw pressure code, in pascals.
///
/// Returns the sentinel `0` instead of dividing when
/// [`pressure_denominator`] is zero. Callers must treat that as an invalid
/// reading, never as 0 Pa.
pub fn compensate_pressure(raw_press: u32, fine: FineTemperature, calib: &CalibrationSet) -> u32 {
    let p4 = calib.p4() as i32;
    let p5 = calib.p5() as i32;
    let p6 = calib.p6() as i32;
    let p7 = calib.p7() as i32;
    let p8 = calib.p8() as i32;
    let p9 = calib.p9() as i32;

    let v1 = (fine.0 >> 1).wrapping_sub(64000);
    let square = (v1 >> 2).wrapping_mul(v1 >> 2);
    let mut v2 = (square >> 11).wrapping_mul(p6);
    v2 = v2.wrapping_add(v1.wrapping_mul(p5) << 1);
    v2 = (v2 >> 2).wrapping_add(p4 << 16);

    let denominator = pressure_denominator(fine, calib);
    if denominator == 0 {
        return 0;
    }
    let denominator = denominator as u32;

    // From here on the value is unsigned until the final correction.
    let mut p = (1_048_576i32.wrapping_sub(raw_press as i32) as u32)
        .wrapping_sub((v2 >> 12) as u32)
        .wrapping_mul(3125);
    p = if p < 0x8000_0000 {
        (p << 1) / denominator
    } else {
        (p / denominator) << 1
    };

    let v1 = p9.wrapping_mul(((p >> 3).wrapping_mul(p >> 3) >> 13) as i32) >> 12;
    let v2 = ((p >> 2) as i32).wrapping_mul(p8) >> 13;
    (p as i32).wrapping_add(v1.wrapping_add(v2).wrapping_add(p7) >> 4) as u32
}
