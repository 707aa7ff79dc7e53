//! I2C master driver for STM32F4
//!
//! Blocking, polled master transfers on the I2C1..I2C3 peripherals. Every
//! handshake polls SR1 through the driver's [`Poller`], so a silent bus
//! ends in [`I2cError::Timeout`] rather than a hang. An acknowledge
//! failure seen while waiting is cleared, a STOP is generated to release
//! the bus, and [`I2cError::Nack`] is returned.

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use keel_hal::i2c::{
    check_len, Address, BusSpeed, I2cError, I2cFlag, I2cMasterOps, ProtocolViolation,
};
use keel_hal::poll::{Backoff, Poller, Spin, TimedOut, Timeout};
use keel_hal::RegisterBlock;

use crate::gpio::{self, parse_pin, Pin, Port};
use crate::regs::{i2c::*, rcc, GpioReg, I2cReg, RccReg};

/// Slowest supported peripheral input clock
pub const PCLK1_MIN_HZ: u32 = 2_000_000;
/// Fastest supported peripheral input clock
pub const PCLK1_MAX_HZ: u32 = 50_000_000;

/// I2C peripheral instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Instance {
    I2c1,
    I2c2,
    I2c3,
}

impl Instance {
    /// Clock enable bit in RCC_APB1ENR
    pub const fn clock_enable_bit(self) -> u32 {
        match self {
            Instance::I2c1 => rcc::APB1ENR_I2C1EN,
            Instance::I2c2 => rcc::APB1ENR_I2C2EN,
            Instance::I2c3 => rcc::APB1ENR_I2C3EN,
        }
    }
}

/// SCL/SDA pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cPins {
    /// Clock line
    pub scl: Pin,
    /// Data line
    pub sda: Pin,
    /// Alternate function number
    pub af: u8,
}

impl Default for I2cPins {
    fn default() -> Self {
        // I2C1 on PB8/PB9
        Self {
            scl: Pin::new(Port::B, 8),
            sda: Pin::new(Port::B, 9),
            af: 4,
        }
    }
}

impl I2cPins {
    /// Build from pin names such as "PB8". Both pins must sit on the same
    /// port.
    pub fn from_names(scl: &str, sda: &str, af: u8) -> Option<Self> {
        let scl = parse_pin(scl)?;
        let sda = parse_pin(sda)?;
        if scl.port != sda.port || scl.number == sda.number {
            return None;
        }
        Some(Self { scl, sda, af })
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cConfig {
    /// SCL frequency
    pub speed: BusSpeed,
    /// APB1 clock feeding the peripheral, in Hz
    pub pclk1_hz: u32,
    /// Peripheral instance
    pub instance: Instance,
    /// Pin assignment
    pub pins: I2cPins,
    /// Poll budget for every status-flag wait
    pub timeout: Timeout,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            speed: BusSpeed::STANDARD,
            pclk1_hz: 42_000_000,
            instance: Instance::I2c1,
            pins: I2cPins::default(),
            timeout: Timeout::default(),
        }
    }
}

impl I2cConfig {
    /// Same configuration with another bus speed
    pub fn with_speed(self, speed: BusSpeed) -> Self {
        Self { speed, ..self }
    }

    /// Same configuration with another poll budget
    pub fn with_timeout(self, timeout: Timeout) -> Self {
        Self { timeout, ..self }
    }
}

/// CR2/CCR/TRISE values for one bus speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// CR2.FREQ: input clock in MHz
    pub freq_mhz: u32,
    /// Full CCR register value
    pub ccr: u32,
    /// TRISE register value
    pub trise: u32,
}

/// Compute the clock registers for `speed` with a `pclk1_hz` input clock.
///
/// Standard mode: `CCR = pclk / (2 f)`, at least 4, and a 1000 ns rise
/// time. Fast mode (duty 2:1): `CCR = pclk / (3 f)`, at least 1, with F/S
/// set and a 300 ns rise time.
pub fn bus_timing(speed: BusSpeed, pclk1_hz: u32) -> Result<BusTiming, I2cError> {
    if !(PCLK1_MIN_HZ..=PCLK1_MAX_HZ).contains(&pclk1_hz)
        || speed.frequency == 0
        || speed.frequency > BusSpeed::FAST.frequency
    {
        return Err(ProtocolViolation::ClockOutOfRange.into());
    }

    let freq_mhz = pclk1_hz / 1_000_000;

    let (ccr, fs, trise) = if speed.is_fast() {
        let ccr = (pclk1_hz / (3 * speed.frequency)).max(1);
        (ccr, CCR_FS, freq_mhz * 300 / 1000 + 1)
    } else {
        let ccr = (pclk1_hz / (2 * speed.frequency)).max(4);
        (ccr, 0, freq_mhz + 1)
    };

    // Divider must fit the 12-bit CCR field
    if ccr > CCR_CCR {
        return Err(ProtocolViolation::ClockOutOfRange.into());
    }

    Ok(BusTiming {
        freq_mhz,
        ccr: fs | ccr,
        trise,
    })
}

const fn flag_mask(flag: I2cFlag) -> u32 {
    match flag {
        I2cFlag::StartBit => SR1_SB,
        I2cFlag::AddressSent => SR1_ADDR,
        I2cFlag::TxEmpty => SR1_TXE,
        I2cFlag::ByteTransferred => SR1_BTF,
        I2cFlag::RxNotEmpty => SR1_RXNE,
    }
}

enum WaitError {
    TimedOut,
    Nack,
}

impl From<TimedOut> for WaitError {
    fn from(_: TimedOut) -> Self {
        WaitError::TimedOut
    }
}

/// Blocking I2C master
///
/// Owns the peripheral's register bank `R` and polls with backoff `B`.
/// Every transfer fails with [`I2cError::NotInitialized`] until
/// [`I2cMaster::configure`] has run.
pub struct I2cMaster<R, B = Spin> {
    regs: R,
    config: I2cConfig,
    poller: Poller<B>,
    configured: bool,
}

impl<R: RegisterBlock<I2cReg>> I2cMaster<R> {
    /// Create a busy-spinning master
    pub fn new(regs: R, config: I2cConfig) -> Self {
        Self::with_backoff(regs, config, Spin)
    }
}

impl<R: RegisterBlock<I2cReg>, B: Backoff> I2cMaster<R, B> {
    /// Create a master that applies `backoff` between polls
    pub fn with_backoff(regs: R, config: I2cConfig, backoff: B) -> Self {
        Self {
            regs,
            poller: Poller::new(config.timeout, backoff),
            config,
            configured: false,
        }
    }

    /// Bring the peripheral up.
    ///
    /// Enables the peripheral and GPIO port clocks in `rcc`, switches the
    /// pins to open-drain alternate function in `gpio` (the bank of the
    /// pins' port), pulses a software reset, programs the clock registers
    /// and enables the peripheral.
    pub fn configure<C, G>(&mut self, rcc: &mut C, gpio: &mut G) -> Result<(), I2cError>
    where
        C: RegisterBlock<RccReg>,
        G: RegisterBlock<GpioReg>,
    {
        let timing = bus_timing(self.config.speed, self.config.pclk1_hz)?;
        let pins = self.config.pins;

        rcc.set_bits(RccReg::Apb1enr, self.config.instance.clock_enable_bit());
        rcc.set_bits(
            RccReg::Ahb1enr,
            (1 << pins.scl.port.index()) | (1 << pins.sda.port.index()),
        );

        gpio::configure_open_drain_af(gpio, pins.scl.number, pins.af);
        gpio::configure_open_drain_af(gpio, pins.sda.number, pins.af);

        self.regs.set_bits(I2cReg::Cr1, CR1_SWRST);
        self.regs.clear_bits(I2cReg::Cr1, CR1_SWRST);

        self.regs.write_field(I2cReg::Cr2, CR2_FREQ, 0, timing.freq_mhz);
        self.regs.write(I2cReg::Ccr, timing.ccr);
        self.regs.write(I2cReg::Trise, timing.trise);
        self.regs.set_bits(I2cReg::Cr1, CR1_PE);

        self.configured = true;
        info!(
            "i2c: {} configured at {} Hz (CCR {}, TRISE {})",
            self.config.instance,
            self.config.speed.frequency,
            timing.ccr,
            timing.trise
        );
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    /// Change the poll budget
    pub fn set_timeout(&mut self, timeout: Timeout) {
        self.config.timeout = timeout;
        self.poller.set_timeout(timeout);
    }

    /// The register bank
    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Give the register bank back
    pub fn release(self) -> R {
        self.regs
    }

    fn ensure_configured(&self) -> Result<(), I2cError> {
        if self.configured {
            Ok(())
        } else {
            Err(I2cError::NotInitialized)
        }
    }

    fn wait_for(&mut self, flag: I2cFlag) -> Result<(), I2cError> {
        let mask = flag_mask(flag);
        let regs = &mut self.regs;

        let result = self.poller.until(|| {
            let sr1 = regs.read(I2cReg::Sr1);
            if sr1 & SR1_AF != 0 {
                // rc_w0
                regs.write(I2cReg::Sr1, !SR1_AF);
                return Err(WaitError::Nack);
            }
            Ok(sr1 & mask != 0)
        });

        match result {
            Ok(()) => Ok(()),
            Err(WaitError::Nack) => {
                warn!("i2c: NACK while waiting for {}", flag);
                self.regs.set_bits(I2cReg::Cr1, CR1_STOP);
                Err(I2cError::Nack)
            }
            Err(WaitError::TimedOut) => {
                warn!("i2c: timed out waiting for {}", flag);
                Err(I2cError::Timeout(flag))
            }
        }
    }

    /// Read SR1 then SR2, which clears ADDR
    fn clear_addr(&mut self) {
        let _ = self.regs.read(I2cReg::Sr1);
        let _ = self.regs.read(I2cReg::Sr2);
    }

    fn receive_byte(&mut self) -> Result<u8, I2cError> {
        self.wait_for(I2cFlag::RxNotEmpty)?;
        let byte = self.regs.read(I2cReg::Dr) as u8;
        trace!("i2c: rx {=u8}", byte);
        Ok(byte)
    }
}

impl<R: RegisterBlock<I2cReg>, B: Backoff> I2cMasterOps for I2cMaster<R, B> {
    fn start(&mut self) -> Result<(), I2cError> {
        self.ensure_configured()?;

        self.regs.set_bits(I2cReg::Cr1, CR1_ACK);
        self.regs.set_bits(I2cReg::Cr1, CR1_START);
        self.wait_for(I2cFlag::StartBit)
    }

    fn send_address(&mut self, select: u8) -> Result<(), I2cError> {
        self.ensure_configured()?;

        self.regs.write(I2cReg::Dr, select as u32);
        self.wait_for(I2cFlag::AddressSent)?;
        self.clear_addr();
        Ok(())
    }

    fn transmit(&mut self, data: &[u8]) -> Result<(), I2cError> {
        self.ensure_configured()?;
        check_len(data.len())?;

        for &byte in data {
            self.wait_for(I2cFlag::TxEmpty)?;
            self.regs.write(I2cReg::Dr, byte as u32);
            trace!("i2c: tx {=u8}", byte);
        }
        self.wait_for(I2cFlag::ByteTransferred)
    }

    fn read(&mut self, address: Address, buf: &mut [u8]) -> Result<(), I2cError> {
        self.ensure_configured()?;
        check_len(buf.len())?;

        self.start()?;
        self.regs.write(I2cReg::Dr, address.read_select() as u32);
        self.wait_for(I2cFlag::AddressSent)?;

        let n = buf.len();

        if n == 1 {
            // NACK and STOP have to be armed before ADDR is cleared, the
            // byte is clocked in right after
            self.regs.clear_bits(I2cReg::Cr1, CR1_ACK);
            self.regs.set_bits(I2cReg::Cr1, CR1_POS);
            self.clear_addr();
            self.regs.set_bits(I2cReg::Cr1, CR1_STOP);

            let byte = self.receive_byte();
            self.regs.clear_bits(I2cReg::Cr1, CR1_POS);
            buf[0] = byte?;
            return Ok(());
        }

        self.clear_addr();

        let mut remaining = n;
        while remaining > 2 {
            buf[n - remaining] = self.receive_byte()?;
            self.regs.set_bits(I2cReg::Cr1, CR1_ACK);
            remaining -= 1;
        }

        // Second-last byte, then NACK and STOP before the last one arrives
        buf[n - 2] = self.receive_byte()?;
        self.regs.clear_bits(I2cReg::Cr1, CR1_ACK);
        self.regs.set_bits(I2cReg::Cr1, CR1_STOP);

        buf[n - 1] = self.receive_byte()?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), I2cError> {
        self.ensure_configured()?;

        self.regs.set_bits(I2cReg::Cr1, CR1_STOP);
        Ok(())
    }
}

impl<R: RegisterBlock<I2cReg>, B: Backoff> ErrorType for I2cMaster<R, B> {
    type Error = I2cError;
}

impl<R: RegisterBlock<I2cReg>, B: Backoff> I2c<SevenBitAddress> for I2cMaster<R, B> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), I2cError> {
        let address = Address::new(address)?;

        // A read always ends the transfer with NACK + STOP
        let read_not_last = operations
            .iter()
            .rev()
            .skip(1)
            .any(|op| matches!(op, Operation::Read(_)));
        if read_not_last {
            return Err(ProtocolViolation::UnsupportedSequence.into());
        }

        let mut addressed = false;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(data) => {
                    if !addressed {
                        self.start()?;
                        self.send_address(address.write_select())?;
                        addressed = true;
                    }
                    if !data.is_empty() {
                        self.transmit(data)?;
                    }
                }
                Operation::Read(buf) => {
                    return I2cMasterOps::read(self, address, buf);
                }
            }
        }

        if addressed {
            self.stop()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Event, SimEeprom, SimGpio, SimI2c, SimSystem};
    use keel_hal::I2cBus;
    use proptest::prelude::*;

    const EEPROM: u8 = 0x50;

    type SimMaster = I2cMaster<SimI2c<SimEeprom>>;

    fn eeprom_with(contents: &[u8]) -> SimEeprom {
        let mut eeprom = SimEeprom::new(EEPROM, 4096);
        eeprom.memory_mut()[..contents.len()].copy_from_slice(contents);
        eeprom
    }

    fn configured(bus: SimI2c<SimEeprom>, config: I2cConfig) -> SimMaster {
        let mut master = I2cMaster::new(bus, config);
        master
            .configure(&mut SimSystem::new(), &mut SimGpio::new())
            .unwrap();
        master.registers_mut().clear_trace();
        master
    }

    fn addr() -> Address {
        Address::new(EEPROM).unwrap()
    }

    /// Everything recorded after the last address phase
    fn after_address(trace: &[Event]) -> &[Event] {
        let idx = trace
            .iter()
            .rposition(|e| matches!(e, Event::Address(_)))
            .unwrap();
        &trace[idx + 1..]
    }

    const ADDR_SEEN: Event = Event::Status(SR1_ADDR);
    const TX_READY: Event = Event::Status(SR1_TXE | SR1_BTF);
    const RX_READY: Event = Event::Status(SR1_RXNE);

    #[test]
    fn test_bus_timing_standard() {
        let timing = bus_timing(BusSpeed::STANDARD, 42_000_000).unwrap();
        assert_eq!(
            timing,
            BusTiming {
                freq_mhz: 42,
                ccr: 210,
                trise: 43
            }
        );

        let timing = bus_timing(BusSpeed::STANDARD, 16_000_000).unwrap();
        assert_eq!((timing.freq_mhz, timing.ccr, timing.trise), (16, 80, 17));
    }

    #[test]
    fn test_bus_timing_fast() {
        let timing = bus_timing(BusSpeed::FAST, 42_000_000).unwrap();
        assert_eq!(timing.freq_mhz, 42);
        assert_eq!(timing.ccr, CCR_FS | 35);
        assert_eq!(timing.trise, 13);

        // Clamped to the minimum divider
        let timing = bus_timing(BusSpeed::FAST, 2_000_000).unwrap();
        assert_eq!(timing.ccr, CCR_FS | 1);
    }

    #[test]
    fn test_bus_timing_out_of_range() {
        let out = Err(I2cError::ProtocolViolation(ProtocolViolation::ClockOutOfRange));
        assert_eq!(bus_timing(BusSpeed::STANDARD, 1_000_000), out);
        assert_eq!(bus_timing(BusSpeed::STANDARD, 51_000_000), out);
        assert_eq!(bus_timing(BusSpeed { frequency: 0 }, 42_000_000), out);
        assert_eq!(bus_timing(BusSpeed { frequency: 1_000_000 }, 42_000_000), out);

        // 42 MHz / (2 * 5 kHz) = 4200 does not fit in CCR
        assert_eq!(bus_timing(BusSpeed { frequency: 5_000 }, 42_000_000), out);
        let timing = bus_timing(BusSpeed { frequency: 6_000 }, 42_000_000).unwrap();
        assert_eq!(timing.ccr, 3500);
    }

    #[test]
    fn test_configure_programs_registers() {
        let mut sys = SimSystem::new();
        let mut gpio = SimGpio::new();
        let mut master = I2cMaster::new(SimI2c::new(eeprom_with(&[])), I2cConfig::default());

        assert!(!master.is_configured());
        master.configure(&mut sys, &mut gpio).unwrap();
        assert!(master.is_configured());

        assert_ne!(sys.peek_rcc(RccReg::Apb1enr) & rcc::APB1ENR_I2C1EN, 0);
        assert_eq!(sys.peek_rcc(RccReg::Ahb1enr), 1 << Port::B.index());

        // PB8 and PB9: AF4, open-drain, very high speed, pull-up
        assert_eq!(gpio.peek(GpioReg::Moder), 0b1010 << 16);
        assert_eq!(gpio.peek(GpioReg::Otyper), 0b11 << 8);
        assert_eq!(gpio.peek(GpioReg::Ospeedr), 0b1111 << 16);
        assert_eq!(gpio.peek(GpioReg::Pupdr), 0b0101 << 16);
        assert_eq!(gpio.peek(GpioReg::Afrh), 0x44);

        let regs = master.registers();
        assert_eq!(regs.trace().first(), Some(&Event::Reset));
        assert_eq!(regs.peek(I2cReg::Cr1), CR1_PE);
        assert_eq!(regs.peek(I2cReg::Cr2), 42);
        assert_eq!(regs.peek(I2cReg::Ccr), 210);
        assert_eq!(regs.peek(I2cReg::Trise), 43);
    }

    #[test]
    fn test_configure_rejects_clock() {
        let config = I2cConfig {
            pclk1_hz: 60_000_000,
            ..Default::default()
        };
        let mut master = I2cMaster::new(SimI2c::new(eeprom_with(&[])), config);

        let result = master.configure(&mut SimSystem::new(), &mut SimGpio::new());

        assert_eq!(
            result,
            Err(I2cError::ProtocolViolation(ProtocolViolation::ClockOutOfRange))
        );
        assert!(!master.is_configured());
        assert!(master.registers().trace().is_empty());
    }

    #[test]
    fn test_transfers_need_configure() {
        let mut master = I2cMaster::new(SimI2c::new(eeprom_with(&[])), I2cConfig::default());
        let mut buf = [0u8; 2];

        assert_eq!(master.start(), Err(I2cError::NotInitialized));
        assert_eq!(
            I2cBus::write(&mut master, addr(), &[1]),
            Err(I2cError::NotInitialized)
        );
        assert_eq!(
            I2cMasterOps::read(&mut master, addr(), &mut buf),
            Err(I2cError::NotInitialized)
        );
        assert_eq!(master.stop(), Err(I2cError::NotInitialized));
        assert!(master.registers().trace().is_empty());
    }

    #[test]
    fn test_write_sequence() {
        let mut master = configured(SimI2c::new(eeprom_with(&[])), I2cConfig::default());

        I2cMasterOps::write(&mut master, addr(), &[0x00, 0x07, 0x5A]).unwrap();
        master.stop().unwrap();

        assert_eq!(
            master.registers().trace(),
            [
                Event::Ack(true),
                Event::Start,
                Event::Status(SR1_SB),
                Event::Address(0xA0),
                ADDR_SEEN,
                ADDR_SEEN,
                TX_READY,
                Event::Tx(0x00),
                TX_READY,
                Event::Tx(0x07),
                TX_READY,
                Event::Tx(0x5A),
                TX_READY,
                Event::Stop,
            ]
        );
        assert_eq!(master.registers().device().unwrap().memory()[7], 0x5A);
    }

    #[test]
    fn test_write_leaves_bus_open() {
        let mut master = configured(SimI2c::new(eeprom_with(&[])), I2cConfig::default());

        I2cMasterOps::write(&mut master, addr(), &[0x01]).unwrap();

        assert!(!master.registers().trace().contains(&Event::Stop));
    }

    #[test]
    fn test_invalid_lengths_touch_nothing() {
        let mut master = configured(SimI2c::new(eeprom_with(&[])), I2cConfig::default());
        let mut big = [0u8; 256];
        let mut empty = [0u8; 0];
        let invalid = Err(I2cError::ProtocolViolation(ProtocolViolation::InvalidLength));

        assert_eq!(master.transmit(&[]), invalid);
        assert_eq!(master.transmit(&big), invalid);
        assert_eq!(I2cMasterOps::read(&mut master, addr(), &mut big), invalid);
        assert_eq!(I2cMasterOps::read(&mut master, addr(), &mut empty), invalid);
        assert!(master.registers().trace().is_empty());
    }

    #[test]
    fn test_single_byte_read_nacks_before_wait() {
        let mut master = configured(SimI2c::new(eeprom_with(&[0x3C])), I2cConfig::default());
        let mut buf = [0u8; 1];

        I2cMasterOps::read(&mut master, addr(), &mut buf).unwrap();

        assert_eq!(buf, [0x3C]);
        let trace = master.registers().trace();
        assert!(trace.contains(&Event::Address(0xA1)));
        assert_eq!(
            after_address(trace),
            [
                ADDR_SEEN,
                Event::Ack(false),
                Event::Pos(true),
                ADDR_SEEN,
                Event::Stop,
                RX_READY,
                Event::Rx(0x3C),
                Event::Pos(false),
            ]
        );
        // Exactly one byte was clocked out of the device
        assert_eq!(master.registers().device().unwrap().pointer(), 1);
    }

    /// Bank that completes START and the address phase but never
    /// receives a byte
    #[derive(Default)]
    struct StalledRx {
        cr1: u32,
    }

    impl RegisterBlock<I2cReg> for StalledRx {
        fn read(&mut self, reg: I2cReg) -> u32 {
            match reg {
                I2cReg::Cr1 => self.cr1,
                I2cReg::Sr1 => SR1_SB | SR1_ADDR,
                _ => 0,
            }
        }

        fn write(&mut self, reg: I2cReg, value: u32) {
            if reg == I2cReg::Cr1 {
                self.cr1 = value & !(CR1_START | CR1_STOP);
            }
        }
    }

    #[test]
    fn test_single_byte_read_timeout_clears_pos() {
        let config = I2cConfig::default().with_timeout(Timeout::Polls(5));
        let mut master = I2cMaster::new(StalledRx::default(), config);
        master
            .configure(&mut SimSystem::new(), &mut SimGpio::new())
            .unwrap();
        let mut buf = [0u8; 1];

        let result = I2cMasterOps::read(&mut master, addr(), &mut buf);

        assert_eq!(result, Err(I2cError::Timeout(I2cFlag::RxNotEmpty)));
        assert_eq!(master.registers().cr1 & CR1_POS, 0);

        // The next transfer starts with POS clear
        master.start().unwrap();
        assert_eq!(master.registers().cr1 & CR1_POS, 0);
        assert_ne!(master.registers().cr1 & CR1_ACK, 0);
    }

    #[test]
    fn test_two_byte_read() {
        let mut master =
            configured(SimI2c::new(eeprom_with(&[0x11, 0x22])), I2cConfig::default());
        let mut buf = [0u8; 2];

        I2cMasterOps::read(&mut master, addr(), &mut buf).unwrap();

        assert_eq!(buf, [0x11, 0x22]);
        assert_eq!(
            after_address(master.registers().trace()),
            [
                ADDR_SEEN,
                ADDR_SEEN,
                RX_READY,
                Event::Rx(0x11),
                Event::Ack(false),
                Event::Stop,
                RX_READY,
                Event::Rx(0x22),
            ]
        );
        assert_eq!(master.registers().device().unwrap().pointer(), 2);
    }

    #[test]
    fn test_missing_device_is_nack() {
        let mut master = configured(SimI2c::without_device(), I2cConfig::default());

        let result = I2cBus::write(&mut master, addr(), &[0x00]);

        assert_eq!(result, Err(I2cError::Nack));
        let events = master.registers().bus_events();
        assert_eq!(
            events,
            [
                Event::Ack(true),
                Event::Start,
                Event::Address(0xA0),
                Event::Nack,
                Event::Stop
            ]
        );
        // AF was cleared again
        assert_eq!(master.registers().peek(I2cReg::Sr1) & SR1_AF, 0);
    }

    #[test]
    fn test_unresponsive_bus_times_out() {
        let mut bus = SimI2c::new(eeprom_with(&[]));
        bus.set_unresponsive(true);
        let config = I2cConfig::default().with_timeout(Timeout::Polls(50));
        let mut master = configured(bus, config);
        let mut buf = [0u8; 4];

        let result = I2cMasterOps::read(&mut master, addr(), &mut buf);

        assert_eq!(result, Err(I2cError::Timeout(I2cFlag::AddressSent)));
        let polls = after_address(master.registers().trace())
            .iter()
            .filter(|e| matches!(e, Event::Status(_)))
            .count();
        assert_eq!(polls, 50);
    }

    #[test]
    fn test_embedded_hal_write_read() {
        let mut contents = [0u8; 0x20];
        contents[0x10..0x14].copy_from_slice(&[9, 8, 7, 6]);
        let mut master = configured(SimI2c::new(eeprom_with(&contents)), I2cConfig::default());
        let mut buf = [0u8; 4];

        I2c::write_read(&mut master, EEPROM, &[0x00, 0x10], &mut buf).unwrap();

        assert_eq!(buf, [9, 8, 7, 6]);
        let events = master.registers().bus_events();
        assert_eq!(
            &events[..7],
            [
                Event::Ack(true),
                Event::Start,
                Event::Address(0xA0),
                Event::Tx(0x00),
                Event::Tx(0x10),
                Event::Start,
                Event::Address(0xA1),
            ]
        );
        assert_eq!(events.last(), Some(&Event::Rx(6)));
    }

    #[test]
    fn test_embedded_hal_merges_writes() {
        let mut master = configured(SimI2c::new(eeprom_with(&[])), I2cConfig::default());

        master
            .transaction(
                EEPROM,
                &mut [Operation::Write(&[0x00, 0x02]), Operation::Write(&[0xEE])],
            )
            .unwrap();

        let events = master.registers().bus_events();
        assert_eq!(
            events.iter().filter(|e| **e == Event::Start).count(),
            1,
            "one START for the whole transaction"
        );
        assert_eq!(events.last(), Some(&Event::Stop));
        assert_eq!(master.registers().device().unwrap().memory()[2], 0xEE);
    }

    #[test]
    fn test_embedded_hal_rejects_read_before_write() {
        let mut master = configured(SimI2c::new(eeprom_with(&[])), I2cConfig::default());
        let mut buf = [0u8; 2];

        let result = master.transaction(
            EEPROM,
            &mut [Operation::Read(&mut buf), Operation::Write(&[0x00])],
        );

        assert_eq!(
            result,
            Err(I2cError::ProtocolViolation(
                ProtocolViolation::UnsupportedSequence
            ))
        );
        assert!(master.registers().trace().is_empty());

        assert_eq!(
            I2c::write(&mut master, 0x80, &[0x00]),
            Err(I2cError::ProtocolViolation(ProtocolViolation::InvalidAddress))
        );
    }

    #[test]
    fn test_pins_from_names() {
        assert_eq!(I2cPins::from_names("PB8", "PB9", 4), Some(I2cPins::default()));
        assert_eq!(I2cPins::from_names("PB6", "PC9", 4), None);
        assert_eq!(I2cPins::from_names("PB6", "PB6", 4), None);
        assert_eq!(I2cPins::from_names("PB6", "XB7", 4), None);
    }

    proptest! {
        #[test]
        fn prop_write_waits_once_per_byte(data in proptest::collection::vec(any::<u8>(), 1..=255)) {
            let mut master = configured(SimI2c::new(eeprom_with(&[])), I2cConfig::default());

            I2cMasterOps::write(&mut master, addr(), &data).unwrap();

            // ADDR wait, ADDR clear, then one TXE wait before every byte
            // and one BTF wait at the end
            let mut expected = vec![ADDR_SEEN, ADDR_SEEN];
            for &byte in &data {
                expected.push(TX_READY);
                expected.push(Event::Tx(byte));
            }
            expected.push(TX_READY);

            prop_assert_eq!(after_address(master.registers().trace()), &expected[..]);
        }

        #[test]
        fn prop_read_maps_bytes_in_order(
            contents in proptest::collection::vec(any::<u8>(), 3..=255)
        ) {
            let n = contents.len();
            let mut master = configured(SimI2c::new(eeprom_with(&contents)), I2cConfig::default());
            let mut buf = vec![0u8; n];

            I2cMasterOps::read(&mut master, addr(), &mut buf).unwrap();

            prop_assert_eq!(&buf, &contents);

            let trace = master.registers().trace();
            let rx: Vec<usize> = trace
                .iter()
                .enumerate()
                .filter(|(_, e)| matches!(e, Event::Rx(_)))
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(rx.len(), n);

            // k-th captured byte lands at index k-1
            for (k, &pos) in rx.iter().enumerate() {
                prop_assert_eq!(trace[pos], Event::Rx(buf[k]));
            }

            let ack_off: Vec<usize> = trace
                .iter()
                .enumerate()
                .filter(|(_, e)| **e == Event::Ack(false))
                .map(|(i, _)| i)
                .collect();
            let stop = trace.iter().position(|e| *e == Event::Stop).unwrap();

            // ACK held until the (N-1)-th byte is captured, then NACK and
            // STOP before the N-th byte is polled
            prop_assert_eq!(ack_off.len(), 1);
            prop_assert!(ack_off[0] > rx[n - 2]);
            prop_assert!(stop > ack_off[0]);
            prop_assert_eq!(&trace[stop + 1..rx[n - 1]], &[RX_READY][..]);

            // No byte clocked out past the last one
            prop_assert_eq!(master.registers().device().unwrap().pointer(), n);
        }
    }
}
