//! Emulated slave devices
//!
//! [`RegisterBank`] holds one slave's 256 byte registers, [`SlaveEmulator`] owns a bank per
//! slave address and plays both sides of the request/response conversation against them.
pub mod bank;
pub mod emulator;

pub use bank::{RegisterBank, Registers};
pub use emulator::SlaveEmulator;
