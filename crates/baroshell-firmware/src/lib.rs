//! ESP32-S3 firmware support for baroshell
//!
//! Board bring-up and the peripheral adapters that plug the esp-hal drivers
//! into `baroshell-core`: the TWAI motor bus and the serial links.

#![no_std]

pub mod config;
pub mod hardware;
pub mod motor_bus;
pub mod serial;
