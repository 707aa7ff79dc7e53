//! Peripheral clients
//!
//! Device drivers built on the traits defined in keel-hal. They are
//! generic over the bus, so they run on any chip HAL that implements
//! [`keel_hal::I2cMasterOps`]:
//!
//! - Serial EEPROM with two-byte addressing (24xx32 class)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod eeprom;

pub use eeprom::{Eeprom, EepromConfig, ReadAddressing};
