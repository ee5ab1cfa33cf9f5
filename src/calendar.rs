//! Calendar arithmetic between broken-down dates and epoch seconds.
//!
//! All conversions use exact integer arithmetic over the proleptic Gregorian
//! calendar. Dates before the Gregorian reform (1582) are rejected, since the
//! leap rules below do not describe the calendar that was in use then.
//!
//! # Conversions
//!
//! - [`to_epoch_seconds`] uses Gauss's closed form with March as the first
//!   month of the year, so the leap day lands at the end of the cycle.
//! - [`from_epoch_seconds`] walks forward from 1970 one year, then one month,
//!   at a time.
//! - [`day_of_week`] counts days since 0001-01-01 and reduces modulo 7.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::{ClockError, Field};

/// Signed seconds since 1970-01-01T00:00:00Z.
pub type EpochSeconds = i64;

/// Year of the epoch and starting point of [`from_epoch_seconds`].
pub const EPOCH_YEAR: i32 = 1970;
/// First full year of the Gregorian calendar.
pub const MIN_YEAR: i32 = 1583;
/// Last representable year.
pub const MAX_YEAR: i32 = 9999;
/// 9999-12-31T23:59:59Z
pub const MAX_EPOCH_SECONDS: EpochSeconds = 253_402_300_799;

const SECONDS_PER_DAY: i64 = 86_400;
// Days from the Gauss origin to 1970-01-01
const GAUSS_EPOCH_DAYS: i64 = 719_499;
const MONTH_DAYS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
// Days before the first of each month in a common year
const MONTH_OFFSET: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Gregorian leap-year rule.
///
/// 1904 was a leap year, 1900 was not, 1996 is, and 2000 was.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_year(year: i32) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Month lengths for a year, January first.
pub const fn month_days(leap: bool) -> [u8; 12] {
    let mut days = MONTH_DAYS;
    if leap {
        days[1] = 29;
    }
    days
}

/// Length of `month` (1-12) in `year`, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u8) -> Option<u8> {
    let index = usize::from(month).checked_sub(1)?;
    month_days(is_leap_year(year)).get(index).copied()
}

/// Day of the week, 0 being Sunday.
///
/// Only meaningful for Gregorian dates.
///
/// # Errors
/// [`ClockError::ValidationError`] if the year is outside
/// `MIN_YEAR..=MAX_YEAR` or the month or day does not exist.
pub fn day_of_week(year: i32, month: u8, day: u8) -> Result<u8, ClockError> {
    check_date(year, month, day)?;
    Ok(weekday(year, month, day))
}

fn check_date(year: i32, month: u8, day: u8) -> Result<(), ClockError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ClockError::ValidationError(Field::Year));
    }
    let month_len =
        days_in_month(year, month).ok_or(ClockError::ValidationError(Field::Month))?;
    if day == 0 || day > month_len {
        return Err(ClockError::ValidationError(Field::Day));
    }
    Ok(())
}

// Caller guarantees a valid date
fn weekday(year: i32, month: u8, day: u8) -> u8 {
    let last_year = i64::from(year) - 1;
    let leaps_to_date = last_year / 4 - last_year / 100 + last_year / 400;

    let mut days = last_year * 365
        + leaps_to_date
        + i64::from(MONTH_OFFSET[usize::from(month - 1)])
        + i64::from(day);
    if month > 2 && is_leap_year(year) {
        days += 1;
    }

    days.rem_euclid(7) as u8
}

/// A validated calendar date and time of day, in 24-hour form.
///
/// The day of the week is derived from the date whenever a record is built
/// and cannot be set independently.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarRecord {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    day_of_week: u8,
}

impl CalendarRecord {
    /// Builds a record, rejecting any field outside its range.
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, ClockError> {
        check_date(year, month, day)?;
        if hour > 23 {
            return Err(ClockError::ValidationError(Field::Hour));
        }
        if minute > 59 {
            return Err(ClockError::ValidationError(Field::Minute));
        }
        if second > 59 {
            return Err(ClockError::ValidationError(Field::Second));
        }

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            day_of_week: weekday(year, month, day),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Day of the week, 0 being Sunday.
    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    /// The same instant as a chrono value.
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), u32::from(self.day))?
            .and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
    }
}

impl TryFrom<&NaiveDateTime> for CalendarRecord {
    type Error = ClockError;

    fn try_from(datetime: &NaiveDateTime) -> Result<Self, Self::Error> {
        // chrono keeps leap seconds in the nanosecond field, so second() is
        // always 0-59 here.
        CalendarRecord::new(
            datetime.year(),
            datetime.month() as u8,
            datetime.day() as u8,
            datetime.hour() as u8,
            datetime.minute() as u8,
            datetime.second() as u8,
        )
    }
}

/// Converts a record to seconds since the epoch.
///
/// Assumes input in normal date format, i.e. 1980-12-31 23:59:59 is
/// year=1980, month=12, day=31, hour=23, minute=59, second=59.
pub fn to_epoch_seconds(record: &CalendarRecord) -> EpochSeconds {
    let mut year = i64::from(record.year);
    // 1..12 -> 11,12,1..10
    let mut month = i64::from(record.month) - 2;
    if month <= 0 {
        // Puts Feb last since it has leap day
        month += 12;
        year -= 1;
    }

    let days = year / 4 - year / 100 + year / 400 + 367 * month / 12 + i64::from(record.day)
        + year * 365
        - GAUSS_EPOCH_DAYS;

    ((days * 24 + i64::from(record.hour)) * 60 + i64::from(record.minute)) * 60
        + i64::from(record.second)
}

/// Breaks seconds since the epoch down into a calendar record.
///
/// Accepts `0..=MAX_EPOCH_SECONDS`.
pub fn from_epoch_seconds(ts: EpochSeconds) -> Result<CalendarRecord, ClockError> {
    if !(0..=MAX_EPOCH_SECONDS).contains(&ts) {
        return Err(ClockError::ValidationError(Field::Timestamp));
    }

    let mut days = ts / SECONDS_PER_DAY;
    let hms = ts % SECONDS_PER_DAY;

    let hour = (hms / 3600) as u8;
    let minute = ((hms % 3600) / 60) as u8;
    let second = (hms % 60) as u8;

    let mut year = EPOCH_YEAR;
    while days >= days_in_year(year) {
        days -= days_in_year(year);
        year += 1;
    }

    // days < days_in_year(year), so this stops within the table
    let mut month = 1u8;
    for len in month_days(is_leap_year(year)) {
        let len = i64::from(len);
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }

    let day = (days + 1) as u8;

    Ok(CalendarRecord {
        year,
        month,
        day,
        hour,
        minute,
        second,
        day_of_week: weekday(year, month, day),
    })
}
