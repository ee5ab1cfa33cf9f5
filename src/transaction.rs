//! Register-level read and write sequences.
//!
//! [`CmosAccess`] owns the port and the delay provider and is only ever
//! reached through the driver's [`IrqSpinLock`](crate::lock::IrqSpinLock), so
//! each method below runs with the lock held and interrupts masked.
//!
//! # Read
//!
//! Poll status A until the update-in-progress flag is clear (the chip then
//! guarantees at least 244 µs of stable registers), read seconds, minutes,
//! hours, day of month, month and year, and read status B last so the mode
//! matches the data.
//!
//! # Write
//!
//! Read status B, encode the fields for that mode, set the SET bit to freeze
//! updates, write the seven time registers, and write back the exact status B
//! byte that was read.

use embedded_hal::delay::DelayNs;

use crate::calendar::CalendarRecord;
use crate::codec::{decode, decode_hour, encode, encode_hour};
use crate::port::{PortAddr, RegisterPort};
use crate::registers::{Register, StatusA, StatusB};
use crate::{ClockError, Config, Field};

/// Time registers as sampled by a read, with the mode they were read under.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct RawSnapshot {
    seconds: u8,
    minutes: u8,
    hours: u8,
    day_of_month: u8,
    month: u8,
    year: u8,
    status: StatusB,
}

impl RawSnapshot {
    /// Decodes the registers, anchoring the two-digit year at `century_offset`.
    pub(crate) fn decode(&self, century_offset: i32) -> Result<CalendarRecord, ClockError> {
        let bcd = self.status.is_bcd();
        let year = century_offset + i32::from(decode(self.year, bcd));
        CalendarRecord::new(
            year,
            decode(self.month, bcd),
            decode(self.day_of_month, bcd),
            decode_hour(self.hours, self.status),
            decode(self.minutes, bcd),
            decode(self.seconds, bcd),
        )
    }
}

/// Register bytes ready to be written, in register order.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct ChipFields {
    seconds: u8,
    minutes: u8,
    hours: u8,
    day_of_week: u8,
    day_of_month: u8,
    month: u8,
    year: u8,
}

impl ChipFields {
    /// Encodes `record` for a chip whose status B reads `status`.
    ///
    /// # Errors
    /// [`ClockError::ValidationError`] with [`Field::Year`] if the year falls
    /// outside the hundred years starting at `century_offset`.
    pub(crate) fn encode(
        record: &CalendarRecord,
        status: StatusB,
        century_offset: i32,
    ) -> Result<Self, ClockError> {
        let year = u8::try_from(record.year() - century_offset)
            .ok()
            .filter(|year| *year <= 99)
            .ok_or(ClockError::ValidationError(Field::Year))?;
        let bcd = status.is_bcd();

        Ok(ChipFields {
            seconds: encode(record.second(), bcd),
            minutes: encode(record.minute(), bcd),
            hours: encode_hour(record.hour(), status),
            day_of_week: encode(record.day_of_week(), bcd),
            day_of_month: encode(record.day(), bcd),
            month: encode(record.month(), bcd),
            year: encode(year, bcd),
        })
    }
}

// Generates a raw getter and setter per time register
macro_rules! register_access {
    ($(($name:ident, $reg:expr)),+ $(,)?) => {
        $(
            paste::paste! {
                #[doc = concat!("Reads the raw ", stringify!($name), " register.")]
                #[allow(unused)]
                fn $name(&mut self) -> u8 {
                    self.read_register($reg)
                }

                #[doc = concat!("Writes the raw ", stringify!($name), " register.")]
                fn [<set_ $name>](&mut self, value: u8) {
                    self.write_register($reg, value)
                }
            }
        )+
    };
}

pub(crate) struct CmosAccess<P, D> {
    port: P,
    delay: D,
}

impl<P: RegisterPort, D: DelayNs> CmosAccess<P, D> {
    pub(crate) fn new(port: P, delay: D) -> Self {
        Self { port, delay }
    }

    pub(crate) fn into_parts(self) -> (P, D) {
        (self.port, self.delay)
    }

    fn read_register(&mut self, reg: Register) -> u8 {
        self.port.write(PortAddr::Index, reg.into());
        self.port.read(PortAddr::Data)
    }

    fn write_register(&mut self, reg: Register, value: u8) {
        self.port.write(PortAddr::Index, reg.into());
        self.port.write(PortAddr::Data, value);
    }

    register_access!(
        (seconds, Register::Seconds),
        (minutes, Register::Minutes),
        (hours, Register::Hours),
        (day_of_week, Register::DayOfWeek),
        (day_of_month, Register::DayOfMonth),
        (month, Register::Month),
        (year, Register::Year),
    );

    pub(crate) fn status_a(&mut self) -> StatusA {
        StatusA::from(self.read_register(Register::StatusA))
    }

    pub(crate) fn status_b(&mut self) -> StatusB {
        StatusB::from(self.read_register(Register::StatusB))
    }

    fn set_status_b(&mut self, value: StatusB) {
        self.write_register(Register::StatusB, value.into())
    }

    /// Spins until the update-in-progress flag is clear.
    ///
    /// # Errors
    /// [`ClockError::HardwareTimeout`] if the flag is still set after
    /// `config.uip_poll_limit` polls. A limit of 0 still polls once.
    pub(crate) fn wait_not_updating(&mut self, config: &Config) -> Result<(), ClockError> {
        let polls = config.uip_poll_limit.max(1);
        for _ in 0..polls {
            if !self.status_a().update_in_progress() {
                return Ok(());
            }
            if config.uip_poll_interval_us == 0 {
                core::hint::spin_loop();
            } else {
                self.delay.delay_us(config.uip_poll_interval_us);
            }
        }
        warn!("RTC update in progress after {} polls", polls);
        Err(ClockError::HardwareTimeout)
    }

    pub(crate) fn read_snapshot(&mut self, config: &Config) -> Result<RawSnapshot, ClockError> {
        self.wait_not_updating(config)?;

        let snapshot = RawSnapshot {
            seconds: self.seconds(),
            minutes: self.minutes(),
            hours: self.hours(),
            day_of_month: self.day_of_month(),
            month: self.month(),
            year: self.year(),
            status: self.status_b(),
        };
        trace!("raw={:?}", snapshot);
        Ok(snapshot)
    }

    pub(crate) fn write_record(
        &mut self,
        record: &CalendarRecord,
        century_offset: i32,
    ) -> Result<(), ClockError> {
        let saved = self.status_b();
        let fields = ChipFields::encode(record, saved, century_offset)?;
        trace!("fields={:?} status={:?}", fields, saved);

        let mut inhibit = saved;
        inhibit.set_set(true);
        self.set_status_b(inhibit);

        self.set_seconds(fields.seconds);
        self.set_minutes(fields.minutes);
        self.set_hours(fields.hours);
        self.set_day_of_month(fields.day_of_month);
        self.set_day_of_week(fields.day_of_week);
        self.set_month(fields.month);
        self.set_year(fields.year);

        self.set_status_b(saved);
        Ok(())
    }
}
