//! I2C serial EEPROM
//!
//! Byte-addressable memories of the 24xx32 class: the location is sent as
//! two big-endian address bytes after the device select, then data follows.
//! The device needs several milliseconds after every write before it
//! answers again.
//!
//! A "page" here is one byte cell; `page_write_limit` is the size of the
//! device's write buffer, which a single write must not cross.

use embedded_hal::delay::DelayNs;
use keel_hal::i2c::{check_len, Address, I2cError, I2cMasterOps, ProtocolViolation};

/// Device address with A0..A2 tied low
pub const DEFAULT_ADDRESS: u8 = 0x50;

/// Largest device two address bytes can reach
pub const MAX_PAGE_COUNT: u32 = 1 << 16;

/// How a read selects the location to read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReadAddressing {
    /// Read from the device's internal address pointer, wherever the last
    /// access left it. The requested location is not sent.
    CurrentAddress,
    /// Load the pointer with a write of the two address bytes, then read
    /// after a repeated START
    #[default]
    DummyWrite,
}

/// EEPROM configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EepromConfig {
    /// 7-bit device address
    pub address: u8,
    /// Number of addressable cells
    pub page_count: u32,
    /// Largest write the device buffers in one go
    pub page_write_limit: usize,
    /// Internal write cycle time in microseconds
    pub write_cycle_us: u32,
    /// Read addressing policy
    pub read_addressing: ReadAddressing,
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            page_count: 4096,
            page_write_limit: 32,
            write_cycle_us: 5_000,
            read_addressing: ReadAddressing::default(),
        }
    }
}

/// I2C EEPROM client
pub struct Eeprom<B> {
    bus: B,
    address: Address,
    config: EepromConfig,
}

impl<B: I2cMasterOps> Eeprom<B> {
    /// Create a client. Fails if the configured address is not 7-bit or
    /// the device is larger than two address bytes can reach.
    pub fn new(bus: B, config: EepromConfig) -> Result<Self, I2cError> {
        if config.page_count > MAX_PAGE_COUNT {
            return Err(ProtocolViolation::OutOfRange.into());
        }
        Ok(Self {
            bus,
            address: Address::new(config.address)?,
            config,
        })
    }

    pub fn config(&self) -> &EepromConfig {
        &self.config
    }

    /// The underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    fn check_range(&self, page: u16, len: usize) -> Result<(), I2cError> {
        if page as u64 + len as u64 > self.config.page_count as u64 {
            return Err(ProtocolViolation::OutOfRange.into());
        }
        Ok(())
    }

    /// Write `data` starting at `page`.
    ///
    /// One bus transaction: the address bytes and the data share a single
    /// address phase. `data` must not cross a `page_write_limit` boundary;
    /// use [`Eeprom::write_all`] for longer buffers.
    pub fn write(&mut self, page: u16, data: &[u8]) -> Result<(), I2cError> {
        check_len(data.len())?;
        self.check_range(page, data.len())?;

        self.bus.write(self.address, &page.to_be_bytes())?;
        self.bus.transmit(data)?;
        self.bus.stop()?;

        debug!("eeprom: wrote {=usize} bytes at {=u16}", data.len(), page);
        Ok(())
    }

    /// Fill `buf` starting at `page`
    pub fn read(&mut self, page: u16, buf: &mut [u8]) -> Result<(), I2cError> {
        check_len(buf.len())?;
        self.check_range(page, buf.len())?;

        let location = page.to_be_bytes();
        match self.config.read_addressing {
            ReadAddressing::DummyWrite => self.bus.write(self.address, &location)?,
            ReadAddressing::CurrentAddress => {
                trace!("eeprom: reading at the current address, not {=u16}", page);
            }
        }

        self.bus.read(self.address, buf)?;
        self.bus.stop()?;

        debug!("eeprom: read {=usize} bytes at {=u16}", buf.len(), page);
        Ok(())
    }

    /// Write a buffer of any length starting at `page`.
    ///
    /// The data is split at `page_write_limit` boundaries, one write per
    /// chunk, and `delay` waits out the write cycle after each one.
    pub fn write_all<D: DelayNs>(
        &mut self,
        page: u16,
        data: &[u8],
        delay: &mut D,
    ) -> Result<(), I2cError> {
        if data.is_empty() {
            return Err(ProtocolViolation::InvalidLength.into());
        }
        self.check_range(page, data.len())?;

        let limit = self.config.page_write_limit.max(1);
        let mut at = page as usize;
        let mut rest = data;

        while !rest.is_empty() {
            let room = limit - at % limit;
            let (chunk, tail) = rest.split_at(room.min(rest.len()));

            self.write(at as u16, chunk)?;
            delay.delay_us(self.config.write_cycle_us);

            at += chunk.len();
            rest = tail;
        }
        Ok(())
    }
}
