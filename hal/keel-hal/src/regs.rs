//! Register interface abstraction
//!
//! Drivers never touch memory-mapped registers directly. They are written
//! against [`RegisterBlock`], which names each register of a peripheral
//! with a small `Copy` enum and moves whole 32-bit words in and out. The
//! chip crate supplies the register enums and bit definitions; the
//! implementation behind the trait can be real hardware or a simulated
//! register bank.

/// Word-wide access to a peripheral's registers.
///
/// `R` is the register-name type for one peripheral (for example an enum
/// with one variant per register). A type may implement `RegisterBlock`
/// for several register-name types when it models more than one
/// peripheral.
///
/// Reads take `&mut self`: on real hardware some reads have side effects
/// (reading a status register can clear flags, reading a data register
/// pops a received byte).
pub trait RegisterBlock<R: Copy> {
    /// Read the full register
    fn read(&mut self, reg: R) -> u32;

    /// Write the full register
    fn write(&mut self, reg: R, value: u32);

    /// Read-modify-write
    fn modify(&mut self, reg: R, f: impl FnOnce(u32) -> u32) {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Set every bit of `mask`
    fn set_bits(&mut self, reg: R, mask: u32) {
        self.modify(reg, |v| v | mask);
    }

    /// Clear every bit of `mask`
    fn clear_bits(&mut self, reg: R, mask: u32) {
        self.modify(reg, |v| v & !mask);
    }

    /// Replace the field selected by `mask` (already shifted) with `value`
    /// shifted left by `shift`.
    fn write_field(&mut self, reg: R, mask: u32, shift: u32, value: u32) {
        self.modify(reg, |v| (v & !mask) | ((value << shift) & mask));
    }

    /// Check whether every bit of `mask` is set
    fn is_set(&mut self, reg: R, mask: u32) -> bool {
        self.read(reg) & mask == mask
    }
}

impl<R: Copy, T: RegisterBlock<R> + ?Sized> RegisterBlock<R> for &mut T {
    fn read(&mut self, reg: R) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: R, value: u32) {
        (**self).write(reg, value)
    }
}

/// Extract the field selected by `mask` and shift it down to bit 0.
#[inline]
pub const fn field(value: u32, mask: u32, shift: u32) -> u32 {
    (value & mask) >> shift
}
