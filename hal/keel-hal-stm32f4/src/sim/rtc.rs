use std::vec::Vec;

use keel_hal::RegisterBlock;

use crate::regs::{rtc::*, RtcReg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lock {
    Locked,
    FirstKey,
    Unlocked,
}

/// Simulated RTC
///
/// - WPR must see 0xCA then 0x53 before CR, ISR.INIT, TR, DR and PRER
///   accept writes; any other WPR value relocks
/// - TR, DR and PRER are only writable while INITF is set
/// - setting ISR.INIT raises INITF; clearing it drops INITF
/// - RSF reads as set outside init mode
///
/// Every write is logged in order. Writes refused by the protection rules
/// are counted, not applied.
#[derive(Debug)]
pub struct SimRtc {
    tr: u32,
    dr: u32,
    cr: u32,
    isr: u32,
    prer: u32,
    lock: Lock,
    stuck: bool,
    rejected_writes: u32,
    writes: Vec<(RtcReg, u32)>,
}

impl Default for SimRtc {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRtc {
    /// RTC in its backup-domain reset state
    pub fn new() -> Self {
        Self {
            tr: 0,
            dr: DR_RESET,
            cr: 0,
            isr: 0,
            prer: PRER_RESET,
            lock: Lock::Locked,
            stuck: false,
            rejected_writes: 0,
            writes: Vec::new(),
        }
    }

    /// Never raise INITF
    pub fn set_stuck(&mut self, stuck: bool) {
        self.stuck = stuck;
    }

    /// Writes dropped by write protection or outside init mode
    pub fn rejected_writes(&self) -> u32 {
        self.rejected_writes
    }

    /// Every write attempt, in order
    pub fn writes(&self) -> &[(RtcReg, u32)] {
        &self.writes
    }

    pub fn is_locked(&self) -> bool {
        self.lock != Lock::Unlocked
    }

    /// Register value without protection or side effects
    pub fn peek(&self, reg: RtcReg) -> u32 {
        match reg {
            RtcReg::Tr => self.tr,
            RtcReg::Dr => self.dr,
            RtcReg::Cr => self.cr,
            RtcReg::Isr => self.isr_value(),
            RtcReg::Prer => self.prer,
            RtcReg::Wpr => 0,
        }
    }

    /// Overwrite a calendar register behind the driver's back
    pub fn poke(&mut self, reg: RtcReg, value: u32) {
        match reg {
            RtcReg::Tr => self.tr = value,
            RtcReg::Dr => self.dr = value,
            RtcReg::Cr => self.cr = value,
            RtcReg::Prer => self.prer = value,
            RtcReg::Isr | RtcReg::Wpr => {}
        }
    }

    fn isr_value(&self) -> u32 {
        let mut isr = self.isr & ISR_INIT;
        if isr & ISR_INIT != 0 && !self.stuck {
            isr |= ISR_INITF;
        }
        if isr & ISR_INIT == 0 {
            isr |= ISR_RSF;
        }
        isr
    }

    fn in_init_mode(&self) -> bool {
        self.isr_value() & ISR_INITF != 0
    }

    fn write_wpr(&mut self, value: u32) {
        self.lock = match (self.lock, value & 0xFF) {
            (Lock::Locked, WPR_KEY1) => Lock::FirstKey,
            (Lock::FirstKey, WPR_KEY2) => Lock::Unlocked,
            (Lock::Unlocked, WPR_KEY1) => Lock::FirstKey,
            _ => Lock::Locked,
        };
    }
}

impl RegisterBlock<RtcReg> for SimRtc {
    fn read(&mut self, reg: RtcReg) -> u32 {
        self.peek(reg)
    }

    fn write(&mut self, reg: RtcReg, value: u32) {
        self.writes.push((reg, value));

        if reg == RtcReg::Wpr {
            self.write_wpr(value);
            return;
        }

        if self.is_locked() {
            self.rejected_writes += 1;
            return;
        }

        match reg {
            RtcReg::Cr => self.cr = value,
            RtcReg::Isr => self.isr = value & ISR_INIT,
            RtcReg::Tr | RtcReg::Dr | RtcReg::Prer if !self.in_init_mode() => {
                self.rejected_writes += 1;
            }
            RtcReg::Tr => self.tr = value & TR_MASK,
            RtcReg::Dr => self.dr = value & DR_MASK,
            RtcReg::Prer => self.prer = value & (PRER_PREDIV_S | PRER_PREDIV_A),
            RtcReg::Wpr => {}
        }
    }
}
