//! I2C bus abstractions
//!
//! Provides traits for blocking I2C master operations that can be
//! implemented by chip-specific HALs.
//!
//! Two levels are offered:
//!
//! - [`I2cMasterOps`] exposes the composable protocol steps (START, address
//!   phase, data phase, STOP) so a client can chain several data phases
//!   inside one bus transaction.
//! - [`I2cBus`] offers complete transactions and is implemented for every
//!   [`I2cMasterOps`].

/// Largest number of bytes moved by one data phase
pub const MAX_TRANSFER: usize = 255;

/// 7-bit I2C device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(u8);

impl Address {
    /// Create an address, rejecting values that do not fit in 7 bits
    pub const fn new(addr: u8) -> Result<Self, I2cError> {
        if addr > 0x7F {
            return Err(I2cError::ProtocolViolation(
                ProtocolViolation::InvalidAddress,
            ));
        }
        Ok(Self(addr))
    }

    /// The raw 7-bit address
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Select byte for a write transfer (R/W bit cleared)
    pub const fn write_select(self) -> u8 {
        self.0 << 1
    }

    /// Select byte for a read transfer (R/W bit set)
    pub const fn read_select(self) -> u8 {
        (self.0 << 1) | 1
    }
}

/// Status flags a master waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cFlag {
    /// START condition generated
    StartBit,
    /// Address sent and acknowledged
    AddressSent,
    /// Transmit data register empty
    TxEmpty,
    /// Byte transfer finished
    ByteTransferred,
    /// Receive data register not empty
    RxNotEmpty,
}

/// Invalid requests rejected before touching the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolViolation {
    /// Transfer length outside 1..=255
    InvalidLength,
    /// Address does not fit in 7 bits
    InvalidAddress,
    /// Memory range outside the target device
    OutOfRange,
    /// Peripheral input clock or bus speed outside the supported range
    ClockOutOfRange,
    /// Operation sequence the master cannot perform in one transaction
    UnsupportedSequence,
}

/// Errors from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// The hardware never raised the expected flag
    Timeout(I2cFlag),
    /// The addressed device did not acknowledge
    Nack,
    /// Invalid request
    ProtocolViolation(ProtocolViolation),
    /// Transfer attempted before the bus was configured
    NotInitialized,
}

impl From<ProtocolViolation> for I2cError {
    fn from(v: ProtocolViolation) -> Self {
        I2cError::ProtocolViolation(v)
    }
}

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

        match self {
            I2cError::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            I2cError::Timeout(I2cFlag::AddressSent) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            I2cError::Timeout(_) => ErrorKind::Bus,
            I2cError::ProtocolViolation(_) | I2cError::NotInitialized => ErrorKind::Other,
        }
    }
}

/// Check a data-phase length
pub fn check_len(len: usize) -> Result<(), I2cError> {
    if len == 0 || len > MAX_TRANSFER {
        return Err(ProtocolViolation::InvalidLength.into());
    }
    Ok(())
}

/// Composable I2C master protocol steps
///
/// All operations block until the hardware handshake completes or the
/// implementation's poll budget runs out.
pub trait I2cMasterOps {
    /// Generate a START (or repeated START) condition
    fn start(&mut self) -> Result<(), I2cError>;

    /// Send a select byte (address with the R/W bit already in bit 0) and
    /// complete the address phase
    fn send_address(&mut self, select: u8) -> Result<(), I2cError>;

    /// Data phase of a write: send `data` on an addressed bus
    fn transmit(&mut self, data: &[u8]) -> Result<(), I2cError>;

    /// START, address phase in write direction, then `data`.
    ///
    /// The bus is left open; finish with [`I2cMasterOps::stop`] or
    /// continue with [`I2cMasterOps::transmit`] or a repeated START.
    fn write(&mut self, address: Address, data: &[u8]) -> Result<(), I2cError> {
        self.start()?;
        self.send_address(address.write_select())?;
        self.transmit(data)
    }

    /// START, address phase in read direction, then fill `buf`.
    ///
    /// The STOP condition is generated during the transfer, before the
    /// last byte is clocked in.
    fn read(&mut self, address: Address, buf: &mut [u8]) -> Result<(), I2cError>;

    /// Generate a STOP condition. Does not wait for the bus to go idle.
    fn stop(&mut self) -> Result<(), I2cError>;
}

/// I2C bus master
///
/// Provides complete I2C transactions for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: Address, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: Address, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: Address,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<T: I2cMasterOps> I2cBus for T {
    type Error = I2cError;

    fn write(&mut self, address: Address, data: &[u8]) -> Result<(), I2cError> {
        I2cMasterOps::write(self, address, data)?;
        self.stop()
    }

    fn read(&mut self, address: Address, buf: &mut [u8]) -> Result<(), I2cError> {
        I2cMasterOps::read(self, address, buf)
    }

    fn write_read(
        &mut self,
        address: Address,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), I2cError> {
        I2cMasterOps::write(self, address, write_data)?;
        I2cMasterOps::read(self, address, read_buf)
    }
}

/// Bus speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusSpeed {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for BusSpeed {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
        }
    }
}

impl BusSpeed {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Whether this speed needs fast-mode timing
    pub fn is_fast(&self) -> bool {
        self.frequency > Self::STANDARD.frequency
    }
}
