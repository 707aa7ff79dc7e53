//! Simulated register banks
//!
//! Host-side stand-ins for the STM32F4 peripherals the drivers program.
//! Each simulator implements [`keel_hal::RegisterBlock`] for the matching
//! register enum and reproduces the flag handshakes the drivers wait on,
//! so the drivers run unmodified in unit tests.
//!
//! - [`SimI2c`] - I2C peripheral with one attachable [`SimDevice`] and a
//!   trace of bus events
//! - [`SimEeprom`] - two-byte-addressed memory device for [`SimI2c`]
//! - [`SimRtc`] - RTC with write protection and init mode
//! - [`SimSystem`] - RCC and PWR registers
//! - [`SimGpio`] - one GPIO port

mod eeprom;
mod i2c;
mod rtc;
mod system;

pub use eeprom::SimEeprom;
pub use i2c::{Event, SimDevice, SimI2c};
pub use rtc::SimRtc;
pub use system::{SimGpio, SimSystem};
