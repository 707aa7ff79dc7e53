//! STM32F4-specific HAL for the Keel peripheral drivers
//!
//! Register maps and blocking drivers for the STM32F4 (F405/F407/F429/F439)
//! I2C and RTC peripherals, written against [`keel_hal::RegisterBlock`] so
//! they run on hardware or on the simulated banks in [`sim`].
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support and driver logging
//! - `serde` - Serialize/deserialize the configuration types
//! - `cortex-m` - Cycle-delay backoff from `keel-hal`
//! - `sim` - Simulated register banks for host tests (needs `std`)
//!
//! # Usage
//!
//! ```ignore
//! let mut i2c = I2cMaster::new(i2c1_regs, I2cConfig::default());
//! i2c.configure(&mut rcc_regs, &mut gpiob_regs)?;
//!
//! let mut rtc = Rtc::new(rtc_regs, system_regs, RtcConfig::default());
//! rtc.init(None)?;
//! let now = rtc.time()?;
//! ```

#![cfg_attr(not(any(test, feature = "sim")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod gpio;
pub mod i2c;
pub mod regs;
pub mod rtc;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use i2c::{I2cConfig, I2cMaster};
pub use rtc::{Rtc, RtcConfig, RtcError, RtcState};

// Re-export shared types from keel-hal
pub use keel_hal::{Address, I2cError, Time, Timeout, Weekday};
