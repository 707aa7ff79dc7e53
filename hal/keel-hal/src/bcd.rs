//! Binary-coded decimal
//!
//! Each decimal digit occupies its own nibble: 47 is stored as `0x47`.
//! Calendar hardware keeps the tens and units digits in separate register
//! fields, so the codec works on digit pairs as well as on packed bytes.

/// Split a value in `0..=99` into its (tens, units) digits
#[inline]
pub const fn to_digits(value: u8) -> Option<(u8, u8)> {
    if value > 99 {
        return None;
    }
    Some((value / 10, value % 10))
}

/// Join (tens, units) digits back into a value.
///
/// Returns `None` when either digit is not a decimal digit.
#[inline]
pub const fn from_digits(tens: u8, units: u8) -> Option<u8> {
    if tens > 9 || units > 9 {
        return None;
    }
    Some(tens * 10 + units)
}

/// Pack a value in `0..=99` into one BCD byte
#[inline]
pub const fn encode(value: u8) -> Option<u8> {
    match to_digits(value) {
        Some((tens, units)) => Some((tens << 4) | units),
        None => None,
    }
}

/// Unpack one BCD byte
#[inline]
pub const fn decode(bcd: u8) -> Option<u8> {
    from_digits(bcd >> 4, bcd & 0x0F)
}
