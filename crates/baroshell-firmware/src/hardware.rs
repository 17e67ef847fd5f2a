//! Hardware initialization for the baroshell board
//!
//! | Peripheral | Use                       | Pins              |
//! |------------|---------------------------|-------------------|
//! | I2C0       | BMP280, 400 kHz           | SDA 12, SCL 11    |
//! | UART0      | debug link to the PC      | TX 43, RX 44      |
//! | UART1      | link to the host computer | TX 17, RX 18      |
//! | TWAI0      | motor controller, 500 kbit| TX 5, RX 6        |

use esp_hal::Async;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal::twai::{BaudRate, Twai, TwaiConfiguration, TwaiMode};
use esp_hal::uart::{Config as UartConfig, Uart};
use log::info;

pub const SERIAL_BAUDRATE: u32 = 115_200;

/// Initialize the I2C bus hardware
pub fn create_i2c_bus(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO12<'static>,
    scl: esp_hal::peripherals::GPIO11<'static>,
) -> I2c<'static, Async> {
    let bus = I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .expect("I2C0 configuration rejected")
    .with_sda(sda)
    .with_scl(scl)
    .into_async();
    info!("I2C0 ready");
    bus
}

/// Debug link on UART0
pub fn create_debug_uart(
    uart0: esp_hal::peripherals::UART0<'static>,
    tx: esp_hal::peripherals::GPIO43<'static>,
    rx: esp_hal::peripherals::GPIO44<'static>,
) -> Uart<'static, Async> {
    Uart::new(uart0, UartConfig::default().with_baudrate(SERIAL_BAUDRATE))
        .expect("UART0 configuration rejected")
        .with_tx(tx)
        .with_rx(rx)
        .into_async()
}

/// Host link on UART1
pub fn create_host_uart(
    uart1: esp_hal::peripherals::UART1<'static>,
    tx: esp_hal::peripherals::GPIO17<'static>,
    rx: esp_hal::peripherals::GPIO18<'static>,
) -> Uart<'static, Async> {
    Uart::new(uart1, UartConfig::default().with_baudrate(SERIAL_BAUDRATE))
        .expect("UART1 configuration rejected")
        .with_tx(tx)
        .with_rx(rx)
        .into_async()
}

/// Motor control bus, started in normal mode
pub fn create_twai(
    twai0: esp_hal::peripherals::TWAI0<'static>,
    rx: esp_hal::peripherals::GPIO6<'static>,
    tx: esp_hal::peripherals::GPIO5<'static>,
) -> Twai<'static, Async> {
    let twai = TwaiConfiguration::new(twai0, rx, tx, BaudRate::B500K, TwaiMode::Normal)
        .into_async()
        .start();
    info!("TWAI0 ready (500 kbit/s)");
    twai
}
