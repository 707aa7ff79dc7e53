//! STM32F4 register maps
//!
//! Register names and bit positions for the peripherals the drivers touch,
//! after RM0090. Each peripheral gets a register-name enum (used with
//! [`keel_hal::RegisterBlock`]) and a module of bit masks.

/// I2C registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cReg {
    /// Control register 1
    Cr1,
    /// Control register 2
    Cr2,
    /// Data register
    Dr,
    /// Status register 1
    Sr1,
    /// Status register 2
    Sr2,
    /// Clock control register
    Ccr,
    /// Rise time register
    Trise,
}

/// I2C bit definitions
pub mod i2c {
    /// CR1: peripheral enable
    pub const CR1_PE: u32 = 1 << 0;
    /// CR1: generate START
    pub const CR1_START: u32 = 1 << 8;
    /// CR1: generate STOP
    pub const CR1_STOP: u32 = 1 << 9;
    /// CR1: acknowledge enable
    pub const CR1_ACK: u32 = 1 << 10;
    /// CR1: ACK/PEC position (ACK applies to the next byte)
    pub const CR1_POS: u32 = 1 << 11;
    /// CR1: software reset
    pub const CR1_SWRST: u32 = 1 << 15;

    /// CR2: peripheral input clock in MHz
    pub const CR2_FREQ: u32 = 0x3F;

    /// SR1: start bit generated
    pub const SR1_SB: u32 = 1 << 0;
    /// SR1: address sent and matched
    pub const SR1_ADDR: u32 = 1 << 1;
    /// SR1: byte transfer finished
    pub const SR1_BTF: u32 = 1 << 2;
    /// SR1: data register not empty (receiver)
    pub const SR1_RXNE: u32 = 1 << 6;
    /// SR1: data register empty (transmitter)
    pub const SR1_TXE: u32 = 1 << 7;
    /// SR1: bus error
    pub const SR1_BERR: u32 = 1 << 8;
    /// SR1: arbitration lost
    pub const SR1_ARLO: u32 = 1 << 9;
    /// SR1: acknowledge failure
    pub const SR1_AF: u32 = 1 << 10;
    /// SR1: overrun
    pub const SR1_OVR: u32 = 1 << 11;

    /// SR2: master mode
    pub const SR2_MSL: u32 = 1 << 0;
    /// SR2: bus busy
    pub const SR2_BUSY: u32 = 1 << 1;
    /// SR2: transmitter
    pub const SR2_TRA: u32 = 1 << 2;

    /// CCR: clock control value
    pub const CCR_CCR: u32 = 0x0FFF;
    /// CCR: fast-mode duty cycle (16/9 when set)
    pub const CCR_DUTY: u32 = 1 << 14;
    /// CCR: fast mode
    pub const CCR_FS: u32 = 1 << 15;

    /// TRISE: maximum rise time in input clock cycles plus one
    pub const TRISE_TRISE: u32 = 0x3F;
}

/// RCC registers used by the drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RccReg {
    /// AHB1 peripheral clock enable
    Ahb1enr,
    /// APB1 peripheral clock enable
    Apb1enr,
    /// Backup domain control
    Bdcr,
}

/// RCC bit definitions
pub mod rcc {
    /// APB1ENR: I2C1 clock enable
    pub const APB1ENR_I2C1EN: u32 = 1 << 21;
    /// APB1ENR: I2C2 clock enable
    pub const APB1ENR_I2C2EN: u32 = 1 << 22;
    /// APB1ENR: I2C3 clock enable
    pub const APB1ENR_I2C3EN: u32 = 1 << 23;
    /// APB1ENR: power interface clock enable
    pub const APB1ENR_PWREN: u32 = 1 << 28;

    /// BDCR: LSE oscillator enable
    pub const BDCR_LSEON: u32 = 1 << 0;
    /// BDCR: LSE oscillator ready
    pub const BDCR_LSERDY: u32 = 1 << 1;
    /// BDCR: RTC clock source selection
    pub const BDCR_RTCSEL: u32 = 0b11 << 8;
    /// BDCR: RTC clock source = LSE
    pub const BDCR_RTCSEL_LSE: u32 = 0b01 << 8;
    /// BDCR: RTC clock enable
    pub const BDCR_RTCEN: u32 = 1 << 15;
}

/// PWR registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwrReg {
    /// Power control register
    Cr,
}

/// PWR bit definitions
pub mod pwr {
    /// CR: disable backup domain write protection
    pub const CR_DBP: u32 = 1 << 8;
}

/// GPIO port registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioReg {
    /// Mode register, 2 bits per pin
    Moder,
    /// Output type register, 1 bit per pin
    Otyper,
    /// Output speed register, 2 bits per pin
    Ospeedr,
    /// Pull-up/pull-down register, 2 bits per pin
    Pupdr,
    /// Alternate function low register (pins 0-7), 4 bits per pin
    Afrl,
    /// Alternate function high register (pins 8-15), 4 bits per pin
    Afrh,
}

/// GPIO field values
pub mod gpio {
    /// MODER: alternate function
    pub const MODE_ALTERNATE: u32 = 0b10;
    /// OTYPER: open-drain
    pub const OTYPE_OPEN_DRAIN: u32 = 0b1;
    /// OSPEEDR: very high speed
    pub const SPEED_VERY_HIGH: u32 = 0b11;
    /// PUPDR: pull-up
    pub const PULL_UP: u32 = 0b01;
}

/// RTC registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcReg {
    /// Time register
    Tr,
    /// Date register
    Dr,
    /// Control register
    Cr,
    /// Initialization and status register
    Isr,
    /// Prescaler register
    Prer,
    /// Write protection register
    Wpr,
}

/// RTC bit definitions
pub mod rtc {
    /// TR: second units
    pub const TR_SU_SHIFT: u32 = 0;
    /// TR: second tens
    pub const TR_ST_SHIFT: u32 = 4;
    /// TR: minute units
    pub const TR_MNU_SHIFT: u32 = 8;
    /// TR: minute tens
    pub const TR_MNT_SHIFT: u32 = 12;
    /// TR: hour units
    pub const TR_HU_SHIFT: u32 = 16;
    /// TR: hour tens
    pub const TR_HT_SHIFT: u32 = 20;
    /// TR: PM flag (12-hour format only)
    pub const TR_PM: u32 = 1 << 22;
    /// TR: every writable bit
    pub const TR_MASK: u32 = 0x007F_7F7F;

    /// DR: date units
    pub const DR_DU_SHIFT: u32 = 0;
    /// DR: date tens
    pub const DR_DT_SHIFT: u32 = 4;
    /// DR: month units
    pub const DR_MU_SHIFT: u32 = 8;
    /// DR: month tens
    pub const DR_MT_SHIFT: u32 = 12;
    /// DR: week day units (1 = Monday .. 7 = Sunday)
    pub const DR_WDU_SHIFT: u32 = 13;
    /// DR: year units
    pub const DR_YU_SHIFT: u32 = 16;
    /// DR: year tens
    pub const DR_YT_SHIFT: u32 = 20;
    /// DR: every writable bit
    pub const DR_MASK: u32 = 0x00FF_FF3F;
    /// DR: value after backup domain reset (Monday 2000-01-01)
    pub const DR_RESET: u32 = 0x0000_2101;

    /// CR: hour format (set = AM/PM)
    pub const CR_FMT: u32 = 1 << 6;
    /// CR: backup bit, used to remember daylight saving time
    pub const CR_BKP: u32 = 1 << 18;

    /// ISR: registers synchronized
    pub const ISR_RSF: u32 = 1 << 5;
    /// ISR: initialization mode entered
    pub const ISR_INITF: u32 = 1 << 6;
    /// ISR: request initialization mode
    pub const ISR_INIT: u32 = 1 << 7;

    /// PRER: synchronous prescaler
    pub const PRER_PREDIV_S: u32 = 0x7FFF;
    /// PRER: synchronous prescaler shift
    pub const PRER_PREDIV_S_SHIFT: u32 = 0;
    /// PRER: asynchronous prescaler
    pub const PRER_PREDIV_A: u32 = 0x7F << 16;
    /// PRER: asynchronous prescaler shift
    pub const PRER_PREDIV_A_SHIFT: u32 = 16;
    /// PRER: value after backup domain reset
    pub const PRER_RESET: u32 = 0x007F_00FF;

    /// WPR: first unlock key
    pub const WPR_KEY1: u32 = 0xCA;
    /// WPR: second unlock key
    pub const WPR_KEY2: u32 = 0x53;
    /// WPR: any other value relocks the registers
    pub const WPR_LOCK: u32 = 0xFF;
}
