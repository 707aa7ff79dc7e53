//! Real-time clock abstractions
//!
//! Provides the calendar time record and the trait implemented by
//! chip-specific RTC drivers.

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Weekday {
    #[default]
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl Weekday {
    /// ISO 8601 day number (Monday = 1 .. Sunday = 7)
    pub fn number_from_monday(self) -> u8 {
        self as u8 + 1
    }

    /// Inverse of [`Weekday::number_from_monday`]
    pub fn from_number_from_monday(n: u8) -> Option<Self> {
        match n {
            1 => Some(Weekday::Monday),
            2 => Some(Weekday::Tuesday),
            3 => Some(Weekday::Wednesday),
            4 => Some(Weekday::Thursday),
            5 => Some(Weekday::Friday),
            6 => Some(Weekday::Saturday),
            7 => Some(Weekday::Sunday),
            _ => None,
        }
    }
}

/// Calendar time as kept by the RTC
///
/// The year is stored as an offset from 2000 (`0..=99`), matching the two
/// BCD digits the hardware keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    /// Seconds (0-59)
    pub seconds: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Hours, 24-hour notation (0-23)
    pub hours: u8,
    /// Day of month (1-31)
    pub date: u8,
    /// Month (1-12)
    pub month: u8,
    /// Years since 2000 (0-99)
    pub year: u8,
    /// Day of the week
    pub weekday: Weekday,
    /// Daylight saving time in effect
    pub dst: bool,
}

impl Default for Time {
    /// Midnight, Monday 2000-01-01: the value of freshly reset hardware
    fn default() -> Self {
        Self {
            seconds: 0,
            minutes: 0,
            hours: 0,
            date: 1,
            month: 1,
            year: 0,
            weekday: Weekday::Monday,
            dst: false,
        }
    }
}

impl Time {
    /// Time of day on the reset date
    pub fn hms(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            ..Self::default()
        }
    }

    /// Check that every field is within its calendar range
    pub fn is_valid(&self) -> bool {
        self.seconds <= 59
            && self.minutes <= 59
            && self.hours <= 23
            && (1..=31).contains(&self.date)
            && (1..=12).contains(&self.month)
            && self.year <= 99
    }
}

/// Real-time clock
pub trait RealTimeClock {
    /// Error type for clock operations
    type Error;

    /// Read the current time
    fn time(&mut self) -> Result<Time, Self::Error>;

    /// Set the current time
    fn set_time(&mut self, time: &Time) -> Result<(), Self::Error>;
}
