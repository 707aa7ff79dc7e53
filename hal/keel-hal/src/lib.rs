//! Keel Hardware Abstraction Layer
//!
//! This crate defines the chip-independent pieces of the Keel peripheral
//! drivers: the register interface the drivers are written against, the
//! bounded polling used for every hardware handshake, and the bus and clock
//! traits that peripheral clients consume.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Peripheral clients (keel-drivers)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keel-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keel-hal-stm32f4 (I2C master, RTC)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  RegisterBlock (hardware or simulated)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`regs::RegisterBlock`] - Word-wide register access by name
//! - [`poll::Backoff`] - What to do between two polls of a status flag
//! - [`i2c::I2cMasterOps`] - Composable I2C master primitives
//! - [`i2c::I2cBus`] - Complete I2C transactions
//! - [`rtc::RealTimeClock`] - Calendar time get/set

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod bcd;
pub mod i2c;
pub mod poll;
pub mod regs;
pub mod rtc;

// Re-export key traits at crate root for convenience
pub use i2c::{Address, I2cBus, I2cError, I2cMasterOps};
pub use poll::{Backoff, Poller, Timeout};
pub use regs::RegisterBlock;
pub use rtc::{RealTimeClock, Time, Weekday};
