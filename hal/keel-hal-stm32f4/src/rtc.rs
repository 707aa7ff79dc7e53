//! RTC driver for STM32F4
//!
//! The calendar runs from the 32.768 kHz LSE in the backup domain. Its
//! registers are write protected twice over: PWR_CR.DBP gates the whole
//! backup domain, and the RTC's own WPR key sequence gates the RTC
//! registers. The calendar registers only accept writes in initialisation
//! mode, while the counters are frozen.
//!
//! ```text
//! Uninitialized ─init→ ClockEnabling → WriteUnlocked → InitMode → WriteLocked → Running
//!                                                                                 │
//!                                           set_time: WriteUnlocked → InitMode ←──┘
//! ```
//!
//! Time is kept in 24-hour notation. The daylight saving flag lives in the
//! CR.BKP bit, which survives resets like the calendar itself.

use keel_hal::bcd;
use keel_hal::poll::{Backoff, Poller, Spin, TimedOut, Timeout};
use keel_hal::regs::field;
use keel_hal::rtc::{RealTimeClock, Time, Weekday};
use keel_hal::RegisterBlock;

use crate::regs::{pwr, rcc, rtc::*, PwrReg, RccReg, RtcReg};

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcState {
    /// `init` has not completed
    Uninitialized,
    /// Turning on the backup domain and the LSE
    ClockEnabling,
    /// Write protection lifted
    WriteUnlocked,
    /// Counters frozen, calendar writable
    InitMode,
    /// Calendar running and readable
    Running,
    /// Write protection restored; a sequence stopped here did not finish
    WriteLocked,
}

/// Status flags the RTC driver waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcFlag {
    /// BDCR.LSERDY
    LseReady,
    /// ISR.INITF raised
    InitEntered,
    /// ISR.INITF dropped
    InitExited,
    /// ISR.RSF
    Synchronized,
}

/// Errors from RTC operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// The hardware never raised the expected flag
    Timeout(RtcFlag),
    /// A field of the time record is out of range
    InvalidTime,
    /// The calendar registers hold something that is not a valid date
    Corrupted,
    /// Operation attempted before `init`
    NotInitialized,
}

/// RTC configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RtcConfig {
    /// Synchronous prescaler (15 bits)
    pub prediv_s: u16,
    /// Asynchronous prescaler (7 bits)
    pub prediv_a: u8,
    /// Poll budget for every status-flag wait
    pub timeout: Timeout,
}

impl Default for RtcConfig {
    fn default() -> Self {
        // 32768 Hz / (127 + 1) / (255 + 1) = 1 Hz
        Self {
            prediv_s: 255,
            prediv_a: 127,
            timeout: Timeout::default(),
        }
    }
}

/// Pack the time of day into a TR value
pub fn encode_tr(time: &Time) -> Option<u32> {
    let (ht, hu) = bcd::to_digits(time.hours)?;
    let (mnt, mnu) = bcd::to_digits(time.minutes)?;
    let (st, su) = bcd::to_digits(time.seconds)?;

    Some(
        (ht as u32) << TR_HT_SHIFT
            | (hu as u32) << TR_HU_SHIFT
            | (mnt as u32) << TR_MNT_SHIFT
            | (mnu as u32) << TR_MNU_SHIFT
            | (st as u32) << TR_ST_SHIFT
            | (su as u32) << TR_SU_SHIFT,
    )
}

/// Pack the date into a DR value
pub fn encode_dr(time: &Time) -> Option<u32> {
    let (yt, yu) = bcd::to_digits(time.year)?;
    let (mt, mu) = bcd::to_digits(time.month)?;
    let (dt, du) = bcd::to_digits(time.date)?;
    let wdu = time.weekday.number_from_monday();

    Some(
        (yt as u32) << DR_YT_SHIFT
            | (yu as u32) << DR_YU_SHIFT
            | (wdu as u32) << DR_WDU_SHIFT
            | (mt as u32) << DR_MT_SHIFT
            | (mu as u32) << DR_MU_SHIFT
            | (dt as u32) << DR_DT_SHIFT
            | (du as u32) << DR_DU_SHIFT,
    )
}

fn digits(reg: u32, tens_shift: u32, tens_width: u32, units_shift: u32) -> Option<u8> {
    let tens = field(reg, ((1 << tens_width) - 1) << tens_shift, tens_shift);
    let units = field(reg, 0xF << units_shift, units_shift);
    bcd::from_digits(tens as u8, units as u8)
}

/// Unpack TR, DR and the CR backup bit
pub fn decode(tr: u32, dr: u32, cr: u32) -> Option<Time> {
    let wdu = field(dr, 0x7 << DR_WDU_SHIFT, DR_WDU_SHIFT) as u8;

    let time = Time {
        hours: digits(tr, TR_HT_SHIFT, 2, TR_HU_SHIFT)?,
        minutes: digits(tr, TR_MNT_SHIFT, 3, TR_MNU_SHIFT)?,
        seconds: digits(tr, TR_ST_SHIFT, 3, TR_SU_SHIFT)?,
        date: digits(dr, DR_DT_SHIFT, 2, DR_DU_SHIFT)?,
        month: digits(dr, DR_MT_SHIFT, 1, DR_MU_SHIFT)?,
        year: digits(dr, DR_YT_SHIFT, 4, DR_YU_SHIFT)?,
        weekday: Weekday::from_number_from_monday(wdu)?,
        dst: cr & CR_BKP != 0,
    };

    time.is_valid().then_some(time)
}

/// Backup-domain real-time clock
///
/// `R` is the RTC register bank, `S` the RCC and PWR registers.
pub struct Rtc<R, S, B = Spin> {
    regs: R,
    sys: S,
    config: RtcConfig,
    poller: Poller<B>,
    state: RtcState,
}

impl<R, S> Rtc<R, S>
where
    R: RegisterBlock<RtcReg>,
    S: RegisterBlock<RccReg> + RegisterBlock<PwrReg>,
{
    /// Create a busy-spinning driver
    pub fn new(regs: R, sys: S, config: RtcConfig) -> Self {
        Self::with_backoff(regs, sys, config, Spin)
    }
}

impl<R, S, B> Rtc<R, S, B>
where
    R: RegisterBlock<RtcReg>,
    S: RegisterBlock<RccReg> + RegisterBlock<PwrReg>,
    B: Backoff,
{
    /// Create a driver that applies `backoff` between polls
    pub fn with_backoff(regs: R, sys: S, config: RtcConfig, backoff: B) -> Self {
        Self {
            regs,
            sys,
            poller: Poller::new(config.timeout, backoff),
            config,
            state: RtcState::Uninitialized,
        }
    }

    pub fn state(&self) -> RtcState {
        self.state
    }

    pub fn config(&self) -> &RtcConfig {
        &self.config
    }

    /// The RTC register bank
    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// The RCC/PWR register bank
    pub fn system(&self) -> &S {
        &self.sys
    }

    pub fn system_mut(&mut self) -> &mut S {
        &mut self.sys
    }

    /// Give both register banks back
    pub fn release(self) -> (R, S) {
        (self.regs, self.sys)
    }

    fn set_state(&mut self, state: RtcState) {
        debug!("rtc: {} -> {}", self.state, state);
        self.state = state;
    }

    fn ensure_running(&self) -> Result<(), RtcError> {
        if self.state == RtcState::Running {
            Ok(())
        } else {
            Err(RtcError::NotInitialized)
        }
    }

    fn wait_isr(&mut self, mask: u32, set: bool, flag: RtcFlag) -> Result<(), RtcError> {
        let regs = &mut self.regs;
        self.poller
            .wait(|| (regs.read(RtcReg::Isr) & mask != 0) == set)
            .map_err(|TimedOut| {
                warn!("rtc: timed out waiting for {}", flag);
                RtcError::Timeout(flag)
            })
    }

    /// Start the LSE, select it as the RTC clock and program the
    /// prescalers. With `initial`, the calendar is loaded as well.
    ///
    /// Backup-domain write access is turned off again at the end.
    pub fn init(&mut self, initial: Option<&Time>) -> Result<(), RtcError> {
        let calendar = match initial {
            Some(time) => Some(Self::encode(time)?),
            None => None,
        };

        self.set_state(RtcState::ClockEnabling);

        self.sys.set_bits(RccReg::Apb1enr, rcc::APB1ENR_PWREN);
        self.sys.set_bits(PwrReg::Cr, pwr::CR_DBP);

        self.sys.set_bits(RccReg::Bdcr, rcc::BDCR_LSEON);
        let sys = &mut self.sys;
        self.poller
            .wait(|| sys.is_set(RccReg::Bdcr, rcc::BDCR_LSERDY))
            .map_err(|TimedOut| {
                warn!("rtc: LSE did not start");
                RtcError::Timeout(RtcFlag::LseReady)
            })?;

        self.sys.write_field(RccReg::Bdcr, rcc::BDCR_RTCSEL, 8, 0b01);
        self.sys.set_bits(RccReg::Bdcr, rcc::BDCR_RTCEN);

        let (prediv_s, prediv_a) = (self.config.prediv_s as u32, self.config.prediv_a as u32);
        self.in_init_mode(|regs| {
            // Synchronous first, then asynchronous, as two writes
            regs.write_field(RtcReg::Prer, PRER_PREDIV_S, PRER_PREDIV_S_SHIFT, prediv_s);
            regs.write_field(RtcReg::Prer, PRER_PREDIV_A, PRER_PREDIV_A_SHIFT, prediv_a);
            regs.clear_bits(RtcReg::Cr, CR_FMT);

            if let Some(calendar) = calendar {
                Self::load(regs, calendar);
            }
        })?;

        self.sys.clear_bits(PwrReg::Cr, pwr::CR_DBP);
        self.set_state(RtcState::Running);
        info!(
            "rtc: running, PREDIV_A {=u8} PREDIV_S {=u16}",
            self.config.prediv_a,
            self.config.prediv_s
        );
        Ok(())
    }

    /// Write a new date and time.
    ///
    /// Backup-domain write access is left the way it was found.
    pub fn set_time(&mut self, time: &Time) -> Result<(), RtcError> {
        self.ensure_running()?;
        let calendar = Self::encode(time)?;

        let had_access = self.sys.is_set(PwrReg::Cr, pwr::CR_DBP);
        self.sys.set_bits(PwrReg::Cr, pwr::CR_DBP);

        let result = self.in_init_mode(|regs| Self::load(regs, calendar));

        if !had_access {
            self.sys.clear_bits(PwrReg::Cr, pwr::CR_DBP);
        }
        result?;

        self.set_state(RtcState::Running);
        debug!(
            "rtc: time set to {=u8}:{=u8}:{=u8}",
            time.hours,
            time.minutes,
            time.seconds
        );
        Ok(())
    }

    /// Read the current date and time
    pub fn time(&mut self) -> Result<Time, RtcError> {
        self.ensure_running()?;
        self.wait_isr(ISR_RSF, true, RtcFlag::Synchronized)?;

        // TR first: reading it freezes DR until DR is read
        let tr = self.regs.read(RtcReg::Tr);
        let dr = self.regs.read(RtcReg::Dr);
        let cr = self.regs.read(RtcReg::Cr);

        decode(tr, dr, cr).ok_or_else(|| {
            warn!("rtc: calendar registers corrupted (TR {=u32}, DR {=u32})", tr, dr);
            RtcError::Corrupted
        })
    }

    fn encode(time: &Time) -> Result<Calendar, RtcError> {
        if !time.is_valid() {
            return Err(RtcError::InvalidTime);
        }
        match (encode_tr(time), encode_dr(time)) {
            (Some(tr), Some(dr)) => Ok(Calendar {
                tr,
                dr,
                dst: time.dst,
            }),
            _ => Err(RtcError::InvalidTime),
        }
    }

    fn load(regs: &mut R, calendar: Calendar) {
        regs.write(RtcReg::Tr, calendar.tr);
        regs.write(RtcReg::Dr, calendar.dr);
        if calendar.dst {
            regs.set_bits(RtcReg::Cr, CR_BKP);
        } else {
            regs.clear_bits(RtcReg::Cr, CR_BKP);
        }
    }

    /// Unlock, run `f` with the counters frozen, then resume and relock.
    ///
    /// On a timeout, init mode is left and the registers relocked before
    /// the error is returned.
    fn in_init_mode(&mut self, f: impl FnOnce(&mut R)) -> Result<(), RtcError> {
        self.regs.write(RtcReg::Wpr, WPR_KEY1);
        self.regs.write(RtcReg::Wpr, WPR_KEY2);
        self.set_state(RtcState::WriteUnlocked);

        self.regs.set_bits(RtcReg::Isr, ISR_INIT);
        let entered = self.wait_isr(ISR_INITF, true, RtcFlag::InitEntered);

        let result = entered.and_then(|()| {
            self.set_state(RtcState::InitMode);
            f(&mut self.regs);

            self.regs.clear_bits(RtcReg::Isr, ISR_INIT);
            self.wait_isr(ISR_INITF, false, RtcFlag::InitExited)
        });

        if result.is_err() {
            self.regs.clear_bits(RtcReg::Isr, ISR_INIT);
        }

        self.regs.write(RtcReg::Wpr, WPR_LOCK);
        self.set_state(RtcState::WriteLocked);
        result
    }
}

/// Encoded calendar registers
#[derive(Clone, Copy)]
struct Calendar {
    tr: u32,
    dr: u32,
    dst: bool,
}

impl<R, S, B> RealTimeClock for Rtc<R, S, B>
where
    R: RegisterBlock<RtcReg>,
    S: RegisterBlock<RccReg> + RegisterBlock<PwrReg>,
    B: Backoff,
{
    type Error = RtcError;

    fn time(&mut self) -> Result<Time, RtcError> {
        Rtc::time(self)
    }

    fn set_time(&mut self, time: &Time) -> Result<(), RtcError> {
        Rtc::set_time(self, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimRtc, SimSystem};
    use proptest::prelude::*;

    type SimClock = Rtc<SimRtc, SimSystem>;

    fn clock() -> SimClock {
        Rtc::new(SimRtc::new(), SimSystem::new(), RtcConfig::default())
    }

    fn running() -> SimClock {
        let mut rtc = clock();
        rtc.init(None).unwrap();
        rtc
    }

    fn sample() -> Time {
        Time {
            seconds: 58,
            minutes: 59,
            hours: 23,
            date: 31,
            month: 12,
            year: 99,
            weekday: Weekday::Sunday,
            dst: true,
        }
    }

    #[test]
    fn test_encoding() {
        let t = sample();
        assert_eq!(encode_tr(&t), Some(0x0023_5958));
        assert_eq!(encode_dr(&t), Some(0x0099_F231));
        assert_eq!(decode(0x0023_5958, 0x0099_F231, CR_BKP), Some(t));

        assert_eq!(encode_dr(&Time::default()), Some(DR_RESET));
        assert_eq!(decode(0, DR_RESET, 0), Some(Time::default()));
    }

    #[test]
    fn test_decode_rejects_bad_registers() {
        // Units digit 0xA
        assert_eq!(decode(0x0000_000A, DR_RESET, 0), None);
        // Week day 0 is forbidden
        assert_eq!(decode(0, DR_RESET & !(0x7 << DR_WDU_SHIFT), 0), None);
        // Hour 24
        assert_eq!(decode(0x0024_0000, DR_RESET, 0), None);
        // Month 0
        assert_eq!(decode(0, 0x0000_2001, 0), None);
    }

    #[test]
    fn test_init_then_time_reads_reset_value() {
        let mut rtc = clock();
        assert_eq!(rtc.state(), RtcState::Uninitialized);

        rtc.init(None).unwrap();

        assert_eq!(rtc.state(), RtcState::Running);
        let now = rtc.time().unwrap();
        assert_eq!((now.hours, now.minutes, now.seconds), (0, 0, 0));
        assert_eq!(now, Time::default());
    }

    #[test]
    fn test_init_programs_clock_and_relocks() {
        let rtc = running();
        let (regs, sys) = rtc.release();

        assert_ne!(sys.peek_rcc(RccReg::Apb1enr) & rcc::APB1ENR_PWREN, 0);
        assert_eq!(
            sys.peek_rcc(RccReg::Bdcr),
            rcc::BDCR_LSEON | rcc::BDCR_LSERDY | rcc::BDCR_RTCSEL_LSE | rcc::BDCR_RTCEN
        );
        // Backup domain write access dropped again
        assert_eq!(sys.peek_pwr(PwrReg::Cr) & pwr::CR_DBP, 0);
        assert_eq!(sys.rejected_writes(), 0);

        assert_eq!(regs.peek(RtcReg::Prer), 127 << 16 | 255);
        assert_eq!(regs.peek(RtcReg::Cr) & CR_FMT, 0);
        assert!(regs.is_locked());
        assert_eq!(regs.rejected_writes(), 0);

        // Unlock keys in order, relock with a non-key value
        let wpr: Vec<u32> = regs
            .writes()
            .iter()
            .filter(|(reg, _)| *reg == RtcReg::Wpr)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(wpr, [WPR_KEY1, WPR_KEY2, WPR_LOCK]);
    }

    #[test]
    fn test_prescalers_written_sync_first() {
        let config = RtcConfig {
            prediv_s: 0x100,
            prediv_a: 0x20,
            ..Default::default()
        };
        let mut rtc = Rtc::new(SimRtc::new(), SimSystem::new(), config);

        rtc.init(None).unwrap();

        let prer: Vec<u32> = rtc
            .registers()
            .writes()
            .iter()
            .filter(|(reg, _)| *reg == RtcReg::Prer)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(prer, [0x007F_0100, 0x0020_0100]);
    }

    #[test]
    fn test_init_with_initial_time() {
        let mut rtc = clock();

        rtc.init(Some(&sample())).unwrap();

        assert_eq!(rtc.time(), Ok(sample()));
    }

    #[test]
    fn test_init_rejects_invalid_time_untouched() {
        let mut rtc = clock();
        let bad = Time::hms(24, 0, 0);

        assert_eq!(rtc.init(Some(&bad)), Err(RtcError::InvalidTime));
        assert_eq!(rtc.state(), RtcState::Uninitialized);
        assert!(rtc.registers().writes().is_empty());
    }

    #[test]
    fn test_needs_init() {
        let mut rtc = clock();

        assert_eq!(rtc.time(), Err(RtcError::NotInitialized));
        assert_eq!(rtc.set_time(&sample()), Err(RtcError::NotInitialized));
        assert!(rtc.registers().writes().is_empty());
    }

    #[test]
    fn test_set_time_rejects_invalid() {
        let mut rtc = running();
        let before = rtc.registers().writes().len();

        let mut bad = sample();
        bad.month = 13;

        assert_eq!(rtc.set_time(&bad), Err(RtcError::InvalidTime));
        assert_eq!(rtc.registers().writes().len(), before);
        assert_eq!(rtc.state(), RtcState::Running);
    }

    #[test]
    fn test_set_time_stores_dst_in_backup_bit() {
        let mut rtc = running();

        rtc.set_time(&sample()).unwrap();
        assert_ne!(rtc.registers().peek(RtcReg::Cr) & CR_BKP, 0);

        let mut winter = sample();
        winter.dst = false;
        rtc.set_time(&winter).unwrap();
        assert_eq!(rtc.registers().peek(RtcReg::Cr) & CR_BKP, 0);
        assert!(!rtc.time().unwrap().dst);
    }

    #[test]
    fn test_set_time_restores_backup_access() {
        // Off before, off after
        let mut rtc = running();
        rtc.set_time(&sample()).unwrap();
        assert_eq!(rtc.system().peek_pwr(PwrReg::Cr) & pwr::CR_DBP, 0);

        // On before, on after
        rtc.system_mut().set_backup_access(true);
        rtc.set_time(&Time::hms(12, 0, 0)).unwrap();
        assert_ne!(rtc.system().peek_pwr(PwrReg::Cr) & pwr::CR_DBP, 0);

        assert_eq!(rtc.system().rejected_writes(), 0);
        assert_eq!(rtc.time().unwrap(), Time::hms(12, 0, 0));
    }

    #[test]
    fn test_lse_failure_times_out() {
        let mut sys = SimSystem::new();
        sys.fail_lse();
        let config = RtcConfig {
            timeout: Timeout::Polls(10),
            ..Default::default()
        };
        let mut rtc = Rtc::new(SimRtc::new(), sys, config);

        assert_eq!(rtc.init(None), Err(RtcError::Timeout(RtcFlag::LseReady)));
        assert_eq!(rtc.state(), RtcState::ClockEnabling);
        assert_eq!(rtc.time(), Err(RtcError::NotInitialized));
    }

    #[test]
    fn test_init_mode_timeout_relocks() {
        let mut regs = SimRtc::new();
        regs.set_stuck(true);
        let config = RtcConfig {
            timeout: Timeout::Polls(10),
            ..Default::default()
        };
        let mut rtc = Rtc::new(regs, SimSystem::new(), config);

        assert_eq!(rtc.init(None), Err(RtcError::Timeout(RtcFlag::InitEntered)));
        assert_eq!(rtc.state(), RtcState::WriteLocked);
        assert!(rtc.registers().is_locked());
        assert_eq!(rtc.registers().peek(RtcReg::Isr) & ISR_INIT, 0);
    }

    #[test]
    fn test_set_time_timeout_relocks_and_restores_access() {
        let config = RtcConfig {
            timeout: Timeout::Polls(10),
            ..Default::default()
        };
        let mut rtc = Rtc::new(SimRtc::new(), SimSystem::new(), config);
        rtc.init(None).unwrap();
        rtc.registers_mut().set_stuck(true);

        // Access off before the call
        assert_eq!(
            rtc.set_time(&sample()),
            Err(RtcError::Timeout(RtcFlag::InitEntered))
        );
        assert_eq!(rtc.state(), RtcState::WriteLocked);
        assert_eq!(rtc.system().peek_pwr(PwrReg::Cr) & pwr::CR_DBP, 0);
        assert!(rtc.registers().is_locked());
        assert_eq!(rtc.registers().peek(RtcReg::Isr) & ISR_INIT, 0);
        assert_eq!(rtc.time(), Err(RtcError::NotInitialized));

        // Access on before the call
        let mut rtc = Rtc::new(SimRtc::new(), SimSystem::new(), config);
        rtc.init(None).unwrap();
        rtc.registers_mut().set_stuck(true);
        rtc.system_mut().set_backup_access(true);

        assert_eq!(
            rtc.set_time(&sample()),
            Err(RtcError::Timeout(RtcFlag::InitEntered))
        );
        assert_ne!(rtc.system().peek_pwr(PwrReg::Cr) & pwr::CR_DBP, 0);
        assert!(rtc.registers().is_locked());
        assert_eq!(rtc.registers().peek(RtcReg::Isr) & ISR_INIT, 0);
    }

    #[test]
    fn test_corrupted_calendar() {
        let mut rtc = running();

        rtc.registers_mut().poke(RtcReg::Tr, 0x0000_00AA);

        assert_eq!(rtc.time(), Err(RtcError::Corrupted));
    }

    #[test]
    fn test_real_time_clock_trait() {
        fn stamp<C: RealTimeClock>(clock: &mut C, t: &Time) -> Result<Time, C::Error> {
            clock.set_time(t)?;
            clock.time()
        }

        let mut rtc = running();
        assert_eq!(stamp(&mut rtc, &sample()), Ok(sample()));
    }

    fn weekday() -> impl Strategy<Value = Weekday> {
        prop_oneof![
            Just(Weekday::Monday),
            Just(Weekday::Tuesday),
            Just(Weekday::Wednesday),
            Just(Weekday::Thursday),
            Just(Weekday::Friday),
            Just(Weekday::Saturday),
            Just(Weekday::Sunday),
        ]
    }

    proptest! {
        #[test]
        fn prop_set_then_get_round_trips(
            hours in 0u8..=23,
            minutes in 0u8..=59,
            seconds in 0u8..=59,
            date in 1u8..=31,
            month in 1u8..=12,
            year in 0u8..=99,
            weekday in weekday(),
            dst in any::<bool>(),
        ) {
            let t = Time { seconds, minutes, hours, date, month, year, weekday, dst };
            let mut rtc = running();

            rtc.set_time(&t).unwrap();

            prop_assert_eq!(rtc.time(), Ok(t));
            prop_assert_eq!(rtc.state(), RtcState::Running);
            prop_assert!(rtc.registers().is_locked());
            prop_assert_eq!(rtc.registers().rejected_writes(), 0);
        }
    }
}
