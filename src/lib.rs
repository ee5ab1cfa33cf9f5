//! A `no_std` driver for the MC146818-compatible CMOS real-time clock.
//!
//! The driver reads and sets the battery-backed clock behind the PC's
//! index/data port pair and exchanges time with callers as seconds since
//! 1970-01-01T00:00:00Z.
//!
//! # Features
//!
//! - Reads never observe a clock update half-way through: the driver waits
//!   for the update-in-progress flag to clear (bounded) and holds an
//!   interrupt-masking lock for the whole register sequence
//! - Writes freeze the clock with the SET bit and restore the control
//!   register exactly as found
//! - BCD and binary register formats, 12-hour and 24-hour modes
//! - Exact integer calendar arithmetic with a 64-bit timestamp
//! - Optional `log` or `defmt` logging
//! - `x86_64` feature: port backend for the legacy 0x70/0x71 ports
//!
//! # Example
//!
//! ```rust,ignore
//! use cmos_rtc::{ClockDriver, CmosPort, Config, X86Interrupts};
//!
//! let port = CmosPort::acquire()?;
//! let rtc = ClockDriver::new(port, X86Interrupts, delay, Config::default());
//!
//! let now = rtc.get_time()?;
//! rtc.set_time(now + 3600)?;
//! ```
//!
//! # Errors
//!
//! Every operation reports failures through [`ClockError`]; no partial value
//! is ever returned.

#![no_std]

#[macro_use]
mod fmt;

pub mod calendar;
pub mod codec;
pub mod lock;
pub mod port;
pub mod registers;
mod transaction;

#[cfg(test)]
mod fake;

use core::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use embedded_hal::delay::DelayNs;

pub use calendar::{CalendarRecord, EpochSeconds};
pub use lock::{InterruptMask, NoInterrupts};
#[cfg(all(feature = "x86_64", target_arch = "x86_64"))]
pub use port::{CmosPort, X86Interrupts};
pub use port::{PortAddr, RegisterPort};
pub use registers::{DataMode, HourMode, StatusB, CMOS_YEARS_OFFSET};

use calendar::{from_epoch_seconds, to_epoch_seconds};
use lock::IrqSpinLock;
use transaction::CmosAccess;

/// Name under which the driver is published as the system's time source.
pub const RESOURCE_NAME: &str = "IORTC";

/// The calendar field a validation error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
    /// An epoch timestamp outside the supported range
    Timestamp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The RTC ports could not be claimed for the driver's lock
    AllocationError,
    /// The update-in-progress flag never cleared
    HardwareTimeout,
    /// A calendar field is out of range
    ValidationError(Field),
}

impl Display for ClockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ClockError::AllocationError => f.write_str("RTC ports already in use"),
            ClockError::HardwareTimeout => f.write_str("RTC update did not complete"),
            ClockError::ValidationError(field) => write!(f, "{:?} out of range", field),
        }
    }
}

impl core::error::Error for ClockError {}

/// Driver configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Added to the chip's two-digit year
    pub century_offset: i32,
    /// Status A polls before giving up on an update in progress; status A
    /// is always polled at least once
    pub uip_poll_limit: u32,
    /// Pause between polls; 0 spins without the delay provider
    pub uip_poll_interval_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            century_offset: CMOS_YEARS_OFFSET,
            uip_poll_limit: 1_000,
            uip_poll_interval_us: 10,
        }
    }
}

/// A wall-clock source the rest of the system can read and set.
pub trait TimeSource {
    /// Current time in seconds since the epoch.
    fn get_time(&self) -> Result<EpochSeconds, ClockError>;

    /// Sets the clock to `ts` seconds since the epoch.
    fn set_time(&self, ts: EpochSeconds) -> Result<(), ClockError>;
}

/// CMOS RTC driver.
///
/// The driver owns the port, the interrupt mask and the delay provider
/// behind a single lock, so it can be shared between execution contexts; all
/// methods take `&self`.
pub struct ClockDriver<P, I: InterruptMask, D> {
    access: IrqSpinLock<CmosAccess<P, D>, I>,
    config: Config,
}

impl<P: RegisterPort, I: InterruptMask, D: DelayNs> ClockDriver<P, I, D> {
    /// Creates a driver instance.
    ///
    /// # Arguments
    /// * `port` - Access to the index and data ports
    /// * `irq` - Interrupt mask held for the duration of every transaction
    /// * `delay` - Paces polling of the update-in-progress flag
    /// * `config` - Century and polling parameters
    pub fn new(port: P, irq: I, delay: D, config: Config) -> Self {
        let driver = Self {
            access: IrqSpinLock::new(CmosAccess::new(port, delay), irq),
            config,
        };
        #[cfg(any(feature = "log", feature = "defmt"))]
        {
            let status = driver.status_b();
            info!(
                "CMOS RTC: {:?}, {:?}",
                status.data_mode(),
                status.hour_mode()
            );
        }
        driver
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads the control register.
    pub fn status_b(&self) -> StatusB {
        self.access.lock().status_b()
    }

    /// Reads the clock as a calendar record.
    pub fn calendar(&self) -> Result<CalendarRecord, ClockError> {
        let raw = self.access.lock().read_snapshot(&self.config)?;
        raw.decode(self.config.century_offset).inspect_err(|e| {
            debug!("RTC holds an invalid time: {:?}", e);
        })
    }

    /// Sets the clock from a calendar record.
    pub fn set_calendar(&self, record: &CalendarRecord) -> Result<(), ClockError> {
        debug!(
            "set time {}-{}-{} {}:{}:{}",
            record.year(),
            record.month(),
            record.day(),
            record.hour(),
            record.minute(),
            record.second()
        );
        self.access
            .lock()
            .write_record(record, self.config.century_offset)
    }

    /// Current time in seconds since the epoch.
    pub fn get_time(&self) -> Result<EpochSeconds, ClockError> {
        let record = self.calendar()?;
        Ok(to_epoch_seconds(&record))
    }

    /// Sets the clock to `ts` seconds since the epoch.
    ///
    /// # Errors
    /// [`ClockError::ValidationError`] if `ts` is negative or its year is
    /// outside the chip's century.
    pub fn set_time(&self, ts: EpochSeconds) -> Result<(), ClockError> {
        let record = from_epoch_seconds(ts)?;
        self.set_calendar(&record)
    }

    pub fn datetime(&self) -> Result<DateTime<Utc>, ClockError> {
        DateTime::from_timestamp(self.get_time()?, 0)
            .ok_or(ClockError::ValidationError(Field::Timestamp))
    }

    /// Sets the clock; sub-second precision is dropped.
    pub fn set_datetime(&self, datetime: &DateTime<Utc>) -> Result<(), ClockError> {
        self.set_time(datetime.timestamp())
    }

    /// Stops the driver and hands back its resources.
    pub fn release(self) -> (P, I, D) {
        let (access, irq) = self.access.into_inner();
        let (port, delay) = access.into_parts();
        (port, irq, delay)
    }
}

impl<P: RegisterPort, I: InterruptMask, D: DelayNs> TimeSource for ClockDriver<P, I, D> {
    fn get_time(&self) -> Result<EpochSeconds, ClockError> {
        ClockDriver::get_time(self)
    }

    fn set_time(&self, ts: EpochSeconds) -> Result<(), ClockError> {
        ClockDriver::set_time(self, ts)
    }
}
