//! Hardware-independent core library for baroshell
//!
//! Everything that does not touch a peripheral lives here: the BMP280 register
//! map and compensation engine, the sensor session, the motor protocol, the
//! command shell and the receive mailbox shared by the serial links.
//!
//! It is `#![no_std]` so it compiles on the ESP32-S3 target and on desktop
//! hosts (for the simulator and tests). Peripherals are reached through the
//! async `embedded-hal` I²C trait and the [`motor::MotorBus`] trait.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod app_state;
pub mod config;
pub mod console;
pub mod motor;
pub mod sensors;
pub mod shell;
pub mod sim;
