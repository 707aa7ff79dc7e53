//! GPIO setup for STM32F4
//!
//! Only what the bus drivers need: naming a pin and switching it to an
//! open-drain alternate function.

use keel_hal::RegisterBlock;

use crate::regs::{gpio, GpioReg};

/// GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
}

impl Port {
    /// Port index, which is also its clock-enable bit in RCC_AHB1ENR
    pub const fn index(self) -> u32 {
        self as u32
    }

    fn from_letter(c: char) -> Option<Self> {
        Some(match c {
            'A' => Port::A,
            'B' => Port::B,
            'C' => Port::C,
            'D' => Port::D,
            'E' => Port::E,
            'F' => Port::F,
            'G' => Port::G,
            'H' => Port::H,
            'I' => Port::I,
            _ => return None,
        })
    }
}

/// A pin on a GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pin {
    pub port: Port,
    pub number: u8,
}

impl Pin {
    pub const fn new(port: Port, number: u8) -> Self {
        Self { port, number }
    }
}

/// Parse a pin name such as "PB8"
pub fn parse_pin(s: &str) -> Option<Pin> {
    let s = s.trim();
    let rest = s.strip_prefix('P')?;

    let mut chars = rest.chars();
    let port = Port::from_letter(chars.next()?)?;

    let number: u8 = chars.as_str().parse().ok()?;
    if number > 15 {
        return None;
    }

    Some(Pin::new(port, number))
}

/// Switch `pin` to alternate function `af`: open-drain, very high speed,
/// pull-up. `gpio` must be the register bank of the pin's port.
pub fn configure_open_drain_af<G: RegisterBlock<GpioReg>>(gpio: &mut G, pin: u8, af: u8) {
    let n = pin as u32 & 0xF;

    gpio.write_field(GpioReg::Moder, 0b11 << (n * 2), n * 2, gpio::MODE_ALTERNATE);
    gpio.set_bits(GpioReg::Otyper, gpio::OTYPE_OPEN_DRAIN << n);
    gpio.write_field(GpioReg::Ospeedr, 0b11 << (n * 2), n * 2, gpio::SPEED_VERY_HIGH);
    gpio.write_field(GpioReg::Pupdr, 0b11 << (n * 2), n * 2, gpio::PULL_UP);

    let (afr, slot) = if n < 8 {
        (GpioReg::Afrl, n)
    } else {
        (GpioReg::Afrh, n - 8)
    };
    gpio.write_field(afr, 0xF << (slot * 4), slot * 4, af as u32 & 0xF);
}
