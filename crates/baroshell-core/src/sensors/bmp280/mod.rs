//! BMP280 sensor session.
//!
//! Wraps an async I²C device and turns register traffic into compensated
//! readings. The session owns the calibration table for its lifetime and
//! threads the fine temperature from the temperature pass into the pressure
//! pass explicitly, so a pressure can never be computed from a stale or
//! missing temperature.

pub mod calibration;
pub mod compensation;
pub mod registers;

use embassy_time::{Duration, with_timeout};
use embedded_hal_async::i2c::{Error as _, I2c};
use log::{debug, error, info, warn};

use crate::config::SensorConfig;
use crate::sensors::SensorError;

use calibration::CalibrationSet;
use compensation::{
    CompensatedTemperature, RawReading, compensate_pressure, compensate_temperature,
    pressure_denominator,
};
use registers::{BMP280_CHIP_IDS, CALIBRATION_WORDS, CTRL_MEAS_POLICY, Register, SOFT_RESET_KEY};

/// One temperature + pressure measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature: CompensatedTemperature,
    pub pressure_pa: u32,
}

impl Measurement {
    pub fn celsius(&self) -> f64 {
        self.temperature.celsius()
    }

    pub fn pascals(&self) -> f64 {
        self.pressure_pa as f64
    }
}

pub struct Bmp280<I> {
    i2c: I,
    address: u8,
    bus_timeout: Duration,
    calibration: Option<CalibrationSet>,
}

impl<I: I2c> Bmp280<I> {
    pub fn new(i2c: I, config: &SensorConfig) -> Self {
        Self {
            i2c,
            address: config.address,
            bus_timeout: config.bus_timeout,
            calibration: None,
        }
    }

    /// Calibration fetched by the last successful [`Self::read_calibration`].
    pub fn calibration(&self) -> Option<&CalibrationSet> {
        self.calibration.as_ref()
    }

    /// Bring the sensor up: verify the chip id, write the measurement policy
    /// and load the calibration table.
    ///
    /// Returns the chip id.
    pub async fn init(&mut self) -> Result<u8, SensorError> {
        let chip_id = self.read_chip_id().await?;
        if !BMP280_CHIP_IDS.contains(&chip_id) {
            error!("BMP280: unexpected chip id {:#04x}", chip_id);
            return Err(SensorError::UnsupportedChip(chip_id));
        }

        self.configure().await?;
        self.read_calibration().await?;

        info!("BMP280: ready (chip id {:#04x})", chip_id);
        Ok(chip_id)
    }

    pub async fn read_chip_id(&mut self) -> Result<u8, SensorError> {
        let mut id = [0u8; 1];
        self.write_read(Register::ChipId.addr(), &mut id, "read chip id")
            .await?;
        Ok(id[0])
    }

    /// Power-on reset. The device needs ~2 ms before it answers again.
    pub async fn soft_reset(&mut self) -> Result<(), SensorError> {
        self.write(&[Register::Reset.addr(), SOFT_RESET_KEY], "soft reset")
            .await
    }

    /// Write the fixed oversampling and power-mode policy to `ctrl_meas`.
    pub async fn configure(&mut self) -> Result<(), SensorError> {
        self.write(
            &[Register::CtrlMeas.addr(), CTRL_MEAS_POLICY],
            "write ctrl_meas",
        )
        .await?;
        debug!("BMP280: ctrl_meas = {:#010b}", CTRL_MEAS_POLICY);
        Ok(())
    }

    /// Read the 12 trimming coefficients, one register pair per transaction.
    ///
    /// The cached table is only replaced once every pair has been read.
    pub async fn read_calibration(&mut self) -> Result<CalibrationSet, SensorError> {
        let mut words = [0u16; CALIBRATION_WORDS];
        for (index, word) in words.iter_mut().enumerate() {
            let register = Register::CalibStart.addr() + (index as u8) * 2;
            let mut pair = [0u8; 2];
            self.write_read(register, &mut pair, "read calibration")
                .await?;
            *word = u16::from_le_bytes(pair);
        }

        let calibration = CalibrationSet::from_words(words);
        self.calibration = Some(calibration);
        info!(
            "BMP280: calibration loaded (T1={}, P1={})",
            calibration.t1(),
            calibration.p1()
        );
        Ok(calibration)
    }

    /// Temperature in °C.
    pub async fn read_compensated_temperature(&mut self) -> Result<f64, SensorError> {
        let (_, temperature) = self.temperature_pass().await?;
        Ok(temperature.celsius())
    }

    /// Pressure in Pa. Always runs a fresh temperature pass first.
    pub async fn read_compensated_pressure(&mut self) -> Result<f64, SensorError> {
        Ok(self.measure().await?.pascals())
    }

    /// Temperature then pressure, compensated with the same calibration.
    pub async fn measure(&mut self) -> Result<Measurement, SensorError> {
        let (calibration, temperature) = self.temperature_pass().await?;
        let raw = self
            .read_raw(Register::PressMsb, "read raw pressure")
            .await?;

        if pressure_denominator(temperature.fine, &calibration) == 0 {
            warn!(
                "BMP280: pressure divisor is zero (fine temperature {})",
                temperature.fine.0
            );
            return Err(SensorError::InvalidReading);
        }

        let pressure_pa = compensate_pressure(raw.code(), temperature.fine, &calibration);
        Ok(Measurement {
            temperature,
            pressure_pa,
        })
    }

    async fn temperature_pass(
        &mut self,
    ) -> Result<(CalibrationSet, CompensatedTemperature), SensorError> {
        let calibration = match self.calibration {
            Some(calibration) => calibration,
            None => self.read_calibration().await?,
        };
        let raw = self
            .read_raw(Register::TempMsb, "read raw temperature")
            .await?;
        Ok((calibration, compensate_temperature(raw.code(), &calibration)))
    }

    async fn read_raw(
        &mut self,
        msb: Register,
        operation: &'static str,
    ) -> Result<RawReading, SensorError> {
        let mut bytes = [0u8; 3];
        self.write_read(msb.addr(), &mut bytes, operation).await?;
        Ok(RawReading::from_registers(bytes))
    }

    async fn write(&mut self, bytes: &[u8], operation: &'static str) -> Result<(), SensorError> {
        let address = self.address;
        let result = with_timeout(self.bus_timeout, self.i2c.write(address, bytes)).await;
        Self::check(result, operation)
    }

    async fn write_read(
        &mut self,
        register: u8,
        buffer: &mut [u8],
        operation: &'static str,
    ) -> Result<(), SensorError> {
        let address = self.address;
        let result = with_timeout(
            self.bus_timeout,
            self.i2c.write_read(address, &[register], buffer),
        )
        .await;
        Self::check(result, operation)
    }

    fn check(
        result: Result<Result<(), I::Error>, embassy_time::TimeoutError>,
        operation: &'static str,
    ) -> Result<(), SensorError> {
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!("BMP280 {} failed: {:?}", operation, e);
                Err(SensorError::Bus {
                    operation,
                    kind: e.kind(),
                })
            }
            Err(_) => {
                error!("BMP280 {} timed out", operation);
                Err(SensorError::Timeout { operation })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::bmp280::calibration::DATASHEET_CALIBRATION;
    use crate::sim::SimulatedBmp280;

    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec::Vec;

    const ADDR: u8 = registers::BMP280_ADDRESS;

    fn calibration_transactions(calibration: &CalibrationSet) -> Vec<I2cTransaction> {
        calibration
            .to_le_bytes()
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| {
                I2cTransaction::write_read(ADDR, vec![0x88 + 2 * i as u8], pair.to_vec())
            })
            .collect()
    }

    fn temperature_transaction() -> I2cTransaction {
        // 519888
        I2cTransaction::write_read(ADDR, vec![0xFA], vec![0x7E, 0xED, 0x00])
    }

    fn pressure_transaction() -> I2cTransaction {
        // 415148
        I2cTransaction::write_read(ADDR, vec![0xF7], vec![0x65, 0x5A, 0xC0])
    }

    #[test]
    fn test_read_chip_id() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58])]);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(block_on(bmp.read_chip_id()), Ok(0x58));
        i2c.done();
    }

    #[test]
    fn test_read_chip_id_nack() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x00])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))]);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(
            block_on(bmp.read_chip_id()),
            Err(SensorError::Bus {
                operation: "read chip id",
                kind: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            })
        );
        i2c.done();
    }

    #[test]
    fn test_configure_writes_policy() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write(ADDR, vec![0xF4, 0x57])]);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(block_on(bmp.configure()), Ok(()));
        i2c.done();
    }

    #[test]
    fn test_soft_reset() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write(ADDR, vec![0xE0, 0xB6])]);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(block_on(bmp.soft_reset()), Ok(()));
        i2c.done();
    }

    #[test]
    fn test_read_calibration_pairs() {
        let mut i2c = I2cMock::new(&calibration_transactions(&DATASHEET_CALIBRATION));
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(block_on(bmp.read_calibration()), Ok(DATASHEET_CALIBRATION));
        assert_eq!(bmp.calibration(), Some(&DATASHEET_CALIBRATION));
        i2c.done();
    }

    #[test]
    fn test_calibration_round_trip_through_device() {
        // Distinct value in every slot, including both halves of the sign bit
        let mut words = [0u16; CALIBRATION_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = 0x1111u16.wrapping_mul(i as u16 + 1) ^ if i % 2 == 0 { 0x8000 } else { 0 };
        }
        let expected = CalibrationSet::from_words(words);

        let mut device = SimulatedBmp280::new(ADDR);
        device.load_calibration(&expected);
        let mut bmp = Bmp280::new(&mut device, &SensorConfig::default());

        let calibration = block_on(bmp.read_calibration()).unwrap();
        for (i, (read, written)) in calibration.words().iter().zip(words.iter()).enumerate() {
            assert_eq!(read, written, "calibration word {} differs", i);
        }
    }

    #[test]
    fn test_partial_calibration_is_not_committed() {
        let mut transactions = calibration_transactions(&DATASHEET_CALIBRATION);
        transactions.truncate(6);
        transactions[5] = I2cTransaction::write_read(ADDR, vec![0x92], vec![0, 0])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        let mut i2c = I2cMock::new(&transactions);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        let result = block_on(bmp.read_calibration());
        assert!(matches!(
            result,
            Err(SensorError::Bus {
                operation: "read calibration",
                ..
            })
        ));
        assert_eq!(bmp.calibration(), None);
        i2c.done();
    }

    #[test]
    fn test_temperature_fetches_calibration_first() {
        let mut transactions = calibration_transactions(&DATASHEET_CALIBRATION);
        transactions.push(temperature_transaction());
        let mut i2c = I2cMock::new(&transactions);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(block_on(bmp.read_compensated_temperature()), Ok(25.08));
        i2c.done();
    }

    #[test]
    fn test_pressure_runs_temperature_pass_first() {
        let mut transactions = calibration_transactions(&DATASHEET_CALIBRATION);
        transactions.push(temperature_transaction());
        transactions.push(pressure_transaction());
        // Second reading reuses the cached calibration
        transactions.push(temperature_transaction());
        transactions.push(pressure_transaction());
        let mut i2c = I2cMock::new(&transactions);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(block_on(bmp.read_compensated_pressure()), Ok(100656.0));
        assert_eq!(block_on(bmp.read_compensated_pressure()), Ok(100656.0));
        i2c.done();
    }

    #[test]
    fn test_measure_reports_both() {
        let mut transactions = calibration_transactions(&DATASHEET_CALIBRATION);
        transactions.push(temperature_transaction());
        transactions.push(pressure_transaction());
        let mut i2c = I2cMock::new(&transactions);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        let measurement = block_on(bmp.measure()).unwrap();
        assert_eq!(measurement.temperature.centi_celsius, 2508);
        assert_eq!(measurement.temperature.fine.0, 128422);
        assert_eq!(measurement.pressure_pa, 100656);
        i2c.done();
    }

    #[test]
    fn test_zero_divisor_is_invalid_reading() {
        let mut words = *DATASHEET_CALIBRATION.words();
        words[3] = 0;
        let broken = CalibrationSet::from_words(words);

        let mut transactions = calibration_transactions(&broken);
        transactions.push(temperature_transaction());
        transactions.push(pressure_transaction());
        let mut i2c = I2cMock::new(&transactions);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(
            block_on(bmp.read_compensated_pressure()),
            Err(SensorError::InvalidReading)
        );
        i2c.done();
    }

    #[test]
    fn test_raw_read_failure_aborts_reading() {
        let mut transactions = calibration_transactions(&DATASHEET_CALIBRATION);
        transactions.push(temperature_transaction());
        transactions.push(
            I2cTransaction::write_read(ADDR, vec![0xF7], vec![0, 0, 0])
                .with_error(ErrorKind::Bus),
        );
        let mut i2c = I2cMock::new(&transactions);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(
            block_on(bmp.read_compensated_pressure()),
            Err(SensorError::Bus {
                operation: "read raw pressure",
                kind: ErrorKind::Bus,
            })
        );
        i2c.done();
    }

    #[test]
    fn test_init_sequence() {
        let mut transactions = vec![
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
            I2cTransaction::write(ADDR, vec![0xF4, 0x57]),
        ];
        transactions.extend(calibration_transactions(&DATASHEET_CALIBRATION));
        let mut i2c = I2cMock::new(&transactions);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(block_on(bmp.init()), Ok(0x58));
        assert!(bmp.calibration().is_some());
        i2c.done();
    }

    #[test]
    fn test_init_rejects_unknown_chip() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x60])]);
        let mut bmp = Bmp280::new(&mut i2c, &SensorConfig::default());

        assert_eq!(block_on(bmp.init()), Err(SensorError::UnsupportedChip(0x60)));
        i2c.done();
    }

    /// A bus whose transactions never complete.
    struct StalledBus;

    impl ErrorType for StalledBus {
        type Error = ErrorKind;
    }

    impl I2c for StalledBus {
        async fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            core::future::pending().await
        }
    }

    #[test]
    fn test_stalled_bus_times_out() {
        let config = SensorConfig {
            bus_timeout: Duration::from_ticks(0),
            ..SensorConfig::default()
        };
        let mut bmp = Bmp280::new(StalledBus, &config);

        assert_eq!(
            block_on(bmp.read_chip_id()),
            Err(SensorError::Timeout {
                operation: "read chip id"
            })
        );
    }
}
