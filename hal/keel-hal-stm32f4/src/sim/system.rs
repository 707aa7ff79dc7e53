use keel_hal::RegisterBlock;

use crate::regs::{pwr, rcc, GpioReg, PwrReg, RccReg};

/// Simulated RCC and PWR registers
///
/// BDCR is in the backup domain: writes are dropped while PWR_CR.DBP is
/// clear, as on hardware. LSERDY follows LSEON unless the oscillator is
/// marked as failed.
#[derive(Debug, Default)]
pub struct SimSystem {
    ahb1enr: u32,
    apb1enr: u32,
    bdcr: u32,
    pwr_cr: u32,
    lse_failed: bool,
    rejected_writes: u32,
}

impl SimSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep LSERDY low whatever LSEON says
    pub fn fail_lse(&mut self) {
        self.lse_failed = true;
    }

    /// Backup-domain writes dropped because DBP was clear
    pub fn rejected_writes(&self) -> u32 {
        self.rejected_writes
    }

    pub fn peek_rcc(&self, reg: RccReg) -> u32 {
        match reg {
            RccReg::Ahb1enr => self.ahb1enr,
            RccReg::Apb1enr => self.apb1enr,
            RccReg::Bdcr => self.bdcr,
        }
    }

    pub fn peek_pwr(&self, reg: PwrReg) -> u32 {
        match reg {
            PwrReg::Cr => self.pwr_cr,
        }
    }

    /// Set or clear PWR_CR.DBP directly
    pub fn set_backup_access(&mut self, enabled: bool) {
        if enabled {
            self.pwr_cr |= pwr::CR_DBP;
        } else {
            self.pwr_cr &= !pwr::CR_DBP;
        }
    }
}

impl RegisterBlock<RccReg> for SimSystem {
    fn read(&mut self, reg: RccReg) -> u32 {
        self.peek_rcc(reg)
    }

    fn write(&mut self, reg: RccReg, value: u32) {
        match reg {
            RccReg::Ahb1enr => self.ahb1enr = value,
            RccReg::Apb1enr => self.apb1enr = value,
            RccReg::Bdcr => {
                if self.pwr_cr & pwr::CR_DBP == 0 {
                    self.rejected_writes += 1;
                    return;
                }
                let mut bdcr = value & !rcc::BDCR_LSERDY;
                if bdcr & rcc::BDCR_LSEON != 0 && !self.lse_failed {
                    bdcr |= rcc::BDCR_LSERDY;
                }
                self.bdcr = bdcr;
            }
        }
    }
}

impl RegisterBlock<PwrReg> for SimSystem {
    fn read(&mut self, reg: PwrReg) -> u32 {
        self.peek_pwr(reg)
    }

    fn write(&mut self, reg: PwrReg, value: u32) {
        match reg {
            PwrReg::Cr => self.pwr_cr = value,
        }
    }
}

/// Simulated GPIO port
#[derive(Debug, Default)]
pub struct SimGpio {
    regs: [u32; 6],
}

impl SimGpio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self, reg: GpioReg) -> u32 {
        self.regs[Self::slot(reg)]
    }

    fn slot(reg: GpioReg) -> usize {
        match reg {
            GpioReg::Moder => 0,
            GpioReg::Otyper => 1,
            GpioReg::Ospeedr => 2,
            GpioReg::Pupdr => 3,
            GpioReg::Afrl => 4,
            GpioReg::Afrh => 5,
        }
    }
}

impl RegisterBlock<GpioReg> for SimGpio {
    fn read(&mut self, reg: GpioReg) -> u32 {
        self.peek(reg)
    }

    fn write(&mut self, reg: GpioReg, value: u32) {
        self.regs[Self::slot(reg)] = value;
    }
}
