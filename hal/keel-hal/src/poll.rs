//! Bounded polling of hardware status flags
//!
//! Every handshake with the hardware is "wait until a status flag says
//! so". A [`Poller`] performs that wait with a budget ([`Timeout`]) and a
//! [`Backoff`] policy that decides what happens between two checks:
//!
//! - [`Spin`] - busy-spin, for bare-metal targets
//! - [`DelayBackoff`] - sleep a fixed interval via an
//!   [`embedded_hal::delay::DelayNs`], which turns a poll budget into a
//!   wall-clock deadline
//! - `Yield` - yield the thread (hosted targets, `std` feature)
//! - `CycleDelay` - burn a fixed number of core cycles (`cortex-m` feature)
//!
//! `Timeout::Never` keeps the unbounded behaviour of a plain spin loop.

use embedded_hal::delay::DelayNs;

/// Default poll budget used by driver configs
pub const DEFAULT_POLLS: u32 = 100_000;

/// How long a wait may last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timeout {
    /// Give up after this many unsuccessful checks
    Polls(u32),
    /// Wait forever
    Never,
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::Polls(DEFAULT_POLLS)
    }
}

impl Timeout {
    /// Budget for a wall-clock deadline when every poll is followed by a
    /// pause of `interval_us`.
    pub const fn from_micros(deadline_us: u32, interval_us: u32) -> Self {
        let interval = if interval_us == 0 { 1 } else { interval_us };
        let polls = deadline_us / interval;
        Timeout::Polls(if polls == 0 { 1 } else { polls })
    }
}

/// The flag never showed up within the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimedOut;

/// Policy applied between two polls
pub trait Backoff {
    /// Called after every unsuccessful poll
    fn pause(&mut self);
}

/// Busy-spin between polls
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin;

impl Backoff for Spin {
    #[inline]
    fn pause(&mut self) {
        core::hint::spin_loop();
    }
}

/// Sleep a fixed interval between polls
pub struct DelayBackoff<D> {
    delay: D,
    interval_us: u32,
}

impl<D: DelayNs> DelayBackoff<D> {
    /// Create a delay backoff pausing `interval_us` microseconds per poll
    pub fn new(delay: D, interval_us: u32) -> Self {
        Self { delay, interval_us }
    }

    /// Release the delay provider
    pub fn free(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> Backoff for DelayBackoff<D> {
    fn pause(&mut self) {
        self.delay.delay_us(self.interval_us);
    }
}

/// Yield the current thread between polls
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Yield;

#[cfg(feature = "std")]
impl Backoff for Yield {
    fn pause(&mut self) {
        std::thread::yield_now();
    }
}

/// Burn a fixed number of core cycles between polls
#[cfg(feature = "cortex-m")]
#[derive(Debug, Clone, Copy)]
pub struct CycleDelay(pub u32);

#[cfg(feature = "cortex-m")]
impl Backoff for CycleDelay {
    fn pause(&mut self) {
        cortex_m::asm::delay(self.0);
    }
}

impl<B: Backoff + ?Sized> Backoff for &mut B {
    fn pause(&mut self) {
        (**self).pause();
    }
}

/// Waits for hardware conditions with a budget and a backoff policy
#[derive(Debug, Clone)]
pub struct Poller<B = Spin> {
    timeout: Timeout,
    backoff: B,
}

impl Poller<Spin> {
    /// Busy-spinning poller with the given budget
    pub const fn spin(timeout: Timeout) -> Self {
        Self {
            timeout,
            backoff: Spin,
        }
    }
}

impl Default for Poller<Spin> {
    fn default() -> Self {
        Self::spin(Timeout::default())
    }
}

impl<B: Backoff> Poller<B> {
    /// Create a poller from a budget and a backoff policy
    pub fn new(timeout: Timeout, backoff: B) -> Self {
        Self { timeout, backoff }
    }

    /// The configured budget
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// Replace the budget
    pub fn set_timeout(&mut self, timeout: Timeout) {
        self.timeout = timeout;
    }

    /// Wait until `ready` returns true
    pub fn wait(&mut self, mut ready: impl FnMut() -> bool) -> Result<(), TimedOut> {
        self.until(|| Ok::<bool, TimedOut>(ready()))
    }

    /// Wait until `ready` returns `Ok(true)`.
    ///
    /// An `Err` from `ready` aborts the wait immediately and is returned
    /// as-is. Running out of budget returns `E::from(TimedOut)`.
    pub fn until<E: From<TimedOut>>(
        &mut self,
        mut ready: impl FnMut() -> Result<bool, E>,
    ) -> Result<(), E> {
        let mut remaining = match self.timeout {
            Timeout::Polls(n) => Some(n),
            Timeout::Never => None,
        };

        loop {
            if ready()? {
                return Ok(());
            }

            if let Some(left) = remaining.as_mut() {
                if *left <= 1 {
                    return Err(TimedOut.into());
                }
                *left -= 1;
            }

            self.backoff.pause();
        }
    }
}
