//! Register definitions and bitfield structures for the CMOS RTC.
//!
//! Register indices and status bits follow the MC146818 layout used by the
//! PC-compatible CMOS clock. Only the time-of-day registers and the two
//! status registers that govern reading and writing them are modelled.

use bitfield::bitfield;

/// Two-digit chip years are assumed to fall in this century.
pub const CMOS_YEARS_OFFSET: i32 = 2000;

/// Register indices written to the index port before a data access.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x02,
    /// Hours register (0-23, or 1-12 with bit 7 as PM)
    Hours = 0x04,
    /// Day of week register
    DayOfWeek = 0x06,
    /// Day of month register (1-31)
    DayOfMonth = 0x07,
    /// Month register (1-12)
    Month = 0x08,
    /// Year register (0-99)
    Year = 0x09,
    /// Status register A (update in progress, divider, rate)
    StatusA = 0x0A,
    /// Status register B (control)
    StatusB = 0x0B,
}

impl From<Register> for u8 {
    fn from(v: Register) -> Self {
        v as u8
    }
}

/// Data encoding of the time and calendar registers.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataMode {
    /// Packed decimal, one digit per nibble
    Bcd = 0,
    /// Plain binary
    Binary = 1,
}
impl From<u8> for DataMode {
    /// Creates a `DataMode` from the DM bit of status register B.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => DataMode::Bcd,
            1 => DataMode::Binary,
            _ => panic!("Invalid value for DataMode: {}", v),
        }
    }
}
impl From<DataMode> for u8 {
    fn from(v: DataMode) -> Self {
        v as u8
    }
}

/// Hour format of the hours register.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourMode {
    /// 12-hour format, bit 7 of the hours register flags PM
    TwelveHour = 0,
    /// 24-hour format (0-23)
    TwentyFourHour = 1,
}
impl From<u8> for HourMode {
    /// Creates an `HourMode` from the 24/12 bit of status register B.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => HourMode::TwelveHour,
            1 => HourMode::TwentyFourHour,
            _ => panic!("Invalid value for HourMode: {}", v),
        }
    }
}
impl From<HourMode> for u8 {
    fn from(v: HourMode) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Status register A.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct StatusA(u8);
    impl Debug;
    /// Update in progress: time registers are about to change and must not be read
    pub update_in_progress, set_update_in_progress: 7;
    /// Oscillator divider chain select
    pub divider, set_divider: 6, 4;
    /// Periodic interrupt rate select
    pub rate, set_rate: 3, 0;
}
from_register_u8!(StatusA);

#[cfg(feature = "defmt")]
impl defmt::Format for StatusA {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StatusA(uip={})", self.update_in_progress());
    }
}

bitfield! {
    /// Status register B (control).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct StatusB(u8);
    impl Debug;
    /// Inhibit automatic updates while the time registers are written
    pub set, set_set: 7;
    /// Periodic interrupt enable
    pub periodic_interrupt_enable, set_periodic_interrupt_enable: 6;
    /// Alarm interrupt enable
    pub alarm_interrupt_enable, set_alarm_interrupt_enable: 5;
    /// Update-ended interrupt enable
    pub update_interrupt_enable, set_update_interrupt_enable: 4;
    /// Square wave output enable
    pub square_wave_enable, set_square_wave_enable: 3;
    /// Data mode: binary when set, BCD when clear
    pub from into DataMode, data_mode, set_data_mode: 2, 2;
    /// Hour mode: 24-hour when set, 12-hour when clear
    pub from into HourMode, hour_mode, set_hour_mode: 1, 1;
    /// Daylight saving enable
    pub daylight_saving_enable, set_daylight_saving_enable: 0;
}
from_register_u8!(StatusB);

impl StatusB {
    /// Returns `true` when the time registers hold packed decimal values.
    pub fn is_bcd(&self) -> bool {
        self.data_mode() == DataMode::Bcd
    }

    /// Returns `true` when the hours register counts 0-23.
    pub fn is_24_hour(&self) -> bool {
        self.hour_mode() == HourMode::TwentyFourHour
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusB {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "StatusB(set={} {} {})",
            self.set(),
            self.data_mode(),
            self.hour_mode()
        );
    }
}
