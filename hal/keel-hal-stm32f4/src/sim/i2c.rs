use std::vec::Vec;

use keel_hal::RegisterBlock;

use crate::regs::{i2c::*, I2cReg};

/// Bus activity recorded by [`SimI2c`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// START (or repeated START) condition
    Start,
    /// STOP requested
    Stop,
    /// Select byte sent in the address phase
    Address(u8),
    /// Data byte written by the master
    Tx(u8),
    /// Data byte taken out of DR by the master
    Rx(u8),
    /// SR1 read, with the value returned
    Status(u32),
    /// CR1.ACK changed
    Ack(bool),
    /// CR1.POS changed
    Pos(bool),
    /// Address or data byte not acknowledged
    Nack,
    /// Software reset asserted
    Reset,
}

/// A target device on the simulated bus
pub trait SimDevice {
    /// 7-bit address the device answers to
    fn address(&self) -> u8;

    /// The device was selected; `read` is the R/W bit of the select byte
    fn start(&mut self, read: bool) {
        let _ = read;
    }

    /// Receive a byte from the master. Returns whether it is acknowledged.
    fn write(&mut self, byte: u8) -> bool;

    /// Produce the next byte for the master
    fn read(&mut self) -> u8;

    /// STOP condition seen
    fn stop(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Addressing,
    Transmit,
    Receive,
}

const SR1_CLEAR_ON_ZERO: u32 = SR1_AF | SR1_BERR | SR1_ARLO | SR1_OVR;

/// Simulated I2C peripheral
///
/// Reproduces the master-mode handshakes of the STM32F4 I2C block:
///
/// - CR1.START with PE set raises SB; a DR write while SB is set is the
///   address phase
/// - ADDR is raised when the attached device matches the select byte,
///   otherwise AF is raised
/// - ADDR clears on an SR1 read followed by an SR2 read
/// - in transmit mode TXE and BTF stay set
/// - in receive mode a byte is clocked in when SR1 is polled with DR empty,
///   acknowledged according to CR1.ACK at that moment; the transfer ends
///   after the first non-acknowledged byte is taken out of DR
#[derive(Debug)]
pub struct SimI2c<D> {
    cr1: u32,
    cr2: u32,
    ccr: u32,
    trise: u32,
    sr1: u32,
    dr: u8,
    phase: Phase,
    reading: bool,
    addr_armed: bool,
    last_byte_nacked: bool,
    rx_finished: bool,
    stop_pending: bool,
    unresponsive: bool,
    device: Option<D>,
    trace: Vec<Event>,
}

impl<D: SimDevice> SimI2c<D> {
    /// Bus with `device` attached
    pub fn new(device: D) -> Self {
        Self::with(Some(device))
    }

    /// Bus with nothing attached: every address phase is refused
    pub fn without_device() -> Self {
        Self::with(None)
    }

    fn with(device: Option<D>) -> Self {
        Self {
            cr1: 0,
            cr2: 0,
            ccr: 0,
            trise: 0,
            sr1: 0,
            dr: 0,
            phase: Phase::Idle,
            reading: false,
            addr_armed: false,
            last_byte_nacked: false,
            rx_finished: false,
            stop_pending: false,
            unresponsive: false,
            device,
            trace: Vec::new(),
        }
    }

    /// When set, an address phase never completes: neither ADDR nor AF is
    /// raised, as with SDA stuck high and no acknowledge detection.
    pub fn set_unresponsive(&mut self, unresponsive: bool) {
        self.unresponsive = unresponsive;
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }

    /// Recorded bus activity
    pub fn trace(&self) -> &[Event] {
        &self.trace
    }

    /// Recorded bus activity without the SR1 polls
    pub fn bus_events(&self) -> Vec<Event> {
        self.trace
            .iter()
            .copied()
            .filter(|e| !matches!(e, Event::Status(_)))
            .collect()
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// Register value without read side effects
    pub fn peek(&self, reg: I2cReg) -> u32 {
        match reg {
            I2cReg::Cr1 => self.cr1,
            I2cReg::Cr2 => self.cr2,
            I2cReg::Dr => self.dr as u32,
            I2cReg::Sr1 => self.sr1,
            I2cReg::Sr2 => self.sr2(),
            I2cReg::Ccr => self.ccr,
            I2cReg::Trise => self.trise,
        }
    }

    fn sr2(&self) -> u32 {
        let mut sr2 = 0;
        if self.phase != Phase::Idle {
            sr2 |= SR2_MSL | SR2_BUSY;
        }
        if self.phase == Phase::Transmit {
            sr2 |= SR2_TRA;
        }
        sr2
    }

    fn reset(&mut self) {
        self.cr2 = 0;
        self.ccr = 0;
        self.trise = 0;
        self.sr1 = 0;
        self.dr = 0;
        self.phase = Phase::Idle;
        self.addr_armed = false;
        self.stop_pending = false;
    }

    fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.stop_pending = false;
        self.sr1 &= !(SR1_TXE | SR1_BTF | SR1_RXNE | SR1_ADDR);
        if let Some(dev) = self.device.as_mut() {
            dev.stop();
        }
    }

    fn write_cr1(&mut self, value: u32) {
        let old = self.cr1;

        if value & CR1_SWRST != 0 {
            if old & CR1_SWRST == 0 {
                self.trace.push(Event::Reset);
                self.reset();
            }
            self.cr1 = CR1_SWRST;
            return;
        }

        if (old ^ value) & CR1_ACK != 0 {
            self.trace.push(Event::Ack(value & CR1_ACK != 0));
        }
        if (old ^ value) & CR1_POS != 0 {
            self.trace.push(Event::Pos(value & CR1_POS != 0));
        }

        // START and STOP are cleared by hardware
        self.cr1 = value & !(CR1_START | CR1_STOP);

        if value & CR1_START != 0 && value & CR1_PE != 0 {
            self.trace.push(Event::Start);
            self.sr1 = (self.sr1 | SR1_SB) & !(SR1_TXE | SR1_BTF | SR1_ADDR);
            self.phase = Phase::Addressing;
            self.addr_armed = false;
        }

        if value & CR1_STOP != 0 && value & CR1_PE != 0 {
            self.trace.push(Event::Stop);
            if self.phase == Phase::Receive && !self.rx_finished {
                self.stop_pending = true;
            } else {
                self.finish();
            }
        }
    }

    fn write_dr(&mut self, value: u8) {
        if self.sr1 & SR1_SB != 0 {
            self.sr1 &= !SR1_SB;
            self.trace.push(Event::Address(value));

            if self.unresponsive {
                return;
            }

            let read = value & 1 != 0;
            match self.device.as_mut() {
                Some(dev) if dev.address() == value >> 1 => {
                    dev.start(read);
                    self.reading = read;
                    self.sr1 |= SR1_ADDR;
                }
                _ => {
                    self.trace.push(Event::Nack);
                    self.sr1 |= SR1_AF;
                }
            }
            return;
        }

        if self.phase == Phase::Transmit {
            self.trace.push(Event::Tx(value));
            let acked = self.device.as_mut().map_or(false, |dev| dev.write(value));
            if !acked {
                self.trace.push(Event::Nack);
                self.sr1 |= SR1_AF;
            }
        }
    }

    fn read_sr1(&mut self) -> u32 {
        if self.phase == Phase::Receive && self.sr1 & SR1_RXNE == 0 && !self.rx_finished {
            if let Some(dev) = self.device.as_mut() {
                self.dr = dev.read();
                self.last_byte_nacked = self.cr1 & CR1_ACK == 0;
                self.sr1 |= SR1_RXNE;
            }
        }

        let value = self.sr1;
        if value & SR1_ADDR != 0 {
            self.addr_armed = true;
        }
        self.trace.push(Event::Status(value));
        value
    }

    fn read_sr2(&mut self) -> u32 {
        if self.addr_armed && self.sr1 & SR1_ADDR != 0 {
            self.sr1 &= !SR1_ADDR;
            self.addr_armed = false;

            if self.reading {
                self.phase = Phase::Receive;
                self.rx_finished = false;
            } else {
                self.phase = Phase::Transmit;
                self.sr1 |= SR1_TXE | SR1_BTF;
            }
        }
        self.sr2()
    }

    fn read_dr(&mut self) -> u32 {
        if self.sr1 & SR1_RXNE != 0 {
            self.sr1 &= !SR1_RXNE;
            self.trace.push(Event::Rx(self.dr));

            if self.last_byte_nacked {
                self.rx_finished = true;
                if self.stop_pending {
                    self.finish();
                }
            }
        }
        self.dr as u32
    }
}

impl<D: SimDevice> RegisterBlock<I2cReg> for SimI2c<D> {
    fn read(&mut self, reg: I2cReg) -> u32 {
        match reg {
            I2cReg::Sr1 => self.read_sr1(),
            I2cReg::Sr2 => self.read_sr2(),
            I2cReg::Dr => self.read_dr(),
            other => self.peek(other),
        }
    }

    fn write(&mut self, reg: I2cReg, value: u32) {
        match reg {
            I2cReg::Cr1 => self.write_cr1(value),
            I2cReg::Cr2 => self.cr2 = value,
            I2cReg::Dr => self.write_dr(value as u8),
            I2cReg::Sr1 => self.sr1 &= value | !SR1_CLEAR_ON_ZERO,
            I2cReg::Sr2 => {}
            I2cReg::Ccr => self.ccr = value,
            I2cReg::Trise => self.trise = value,
        }
    }
}
