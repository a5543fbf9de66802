// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Calendar field access on [`Moment`] values.
//!
//! Every queryable field is a variant of the closed [`Field`] enum, and
//! every operation is one exhaustive `match` — adding a field without
//! deciding all five operations does not compile.
//!
//! All access happens in the timezone UTC. The interesting cases are the
//! leap-second ones:
//!
//! - `get(SecondOfMinute)` yields **60** while the instant denotes an
//!   inserted leap second;
//! - `maximum(SecondOfMinute)` yields `59 + shift` — but only when the
//!   queried instant sits in the 23:59 minute of a day with a registered
//!   event;
//! - `with` on a fine-grained field (seconds and below) of an instant in
//!   the UTC era is re-expressed as SI arithmetic, so the mutation steps
//!   *through* leap seconds instead of jumping over them;
//! - `with` on a date or coarse time field of a leap instant re-applies
//!   the leap-second position afterwards where the target day has one.

use crate::civil::{self, CivilDate, CivilDateTime};
use crate::error::TimeError;
use crate::instant::Moment;
use crate::leap::LeapSecondTable;
use crate::merge::Leniency;
use crate::units::SiUnit;

/// A queryable calendar or clock field of a [`Moment`], in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    MonthOfYear,
    DayOfMonth,
    DayOfYear,
    AmPmOfDay,
    HourOfDay,
    MinuteOfHour,
    MinuteOfDay,
    SecondOfMinute,
    SecondOfDay,
    MilliOfSecond,
    MilliOfDay,
    MicroOfSecond,
    MicroOfDay,
    NanoOfSecond,
    NanoOfDay,
}

/// Native step size of a fine-grained time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FineStep {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl Field {
    const fn is_date(self) -> bool {
        matches!(
            self,
            Self::Year | Self::MonthOfYear | Self::DayOfMonth | Self::DayOfYear
        )
    }

    /// Coarse time fields: mutations stay on the civil clock face and can
    /// never land inside a leap second by themselves.
    const fn is_high_time(self) -> bool {
        matches!(
            self,
            Self::AmPmOfDay | Self::HourOfDay | Self::MinuteOfHour | Self::MinuteOfDay
        )
    }

    /// Fine-grained fields and their step size, `None` for everything else.
    const fn fine_step(self) -> Option<FineStep> {
        match self {
            Self::SecondOfMinute | Self::SecondOfDay => Some(FineStep::Seconds),
            Self::MilliOfSecond | Self::MilliOfDay => Some(FineStep::Millis),
            Self::MicroOfSecond | Self::MicroOfDay => Some(FineStep::Micros),
            Self::NanoOfSecond | Self::NanoOfDay => Some(FineStep::Nanos),
            _ => None,
        }
    }

    // ── read access ───────────────────────────────────────────────────

    /// Current value of this field.
    pub fn get(&self, moment: &Moment, ls: &LeapSecondTable) -> i64 {
        let tod = moment.posix_time().rem_euclid(civil::SECONDS_PER_DAY);
        let nano = moment.nano() as i64;
        match self {
            Self::Year => moment.date_utc().year as i64,
            Self::MonthOfYear => moment.date_utc().month as i64,
            Self::DayOfMonth => moment.date_utc().day as i64,
            Self::DayOfYear => {
                let d = moment.date_utc();
                civil::day_of_year(d.year, d.month, d.day) as i64
            }
            Self::AmPmOfDay => (tod >= 43_200) as i64,
            Self::HourOfDay => tod / 3_600,
            Self::MinuteOfHour => (tod / 60) % 60,
            Self::MinuteOfDay => tod / 60,
            Self::SecondOfMinute => {
                if moment.is_leap_second(ls) {
                    60
                } else {
                    tod % 60
                }
            }
            Self::SecondOfDay => tod,
            Self::MilliOfSecond => nano / 1_000_000,
            Self::MilliOfDay => tod * 1_000 + nano / 1_000_000,
            Self::MicroOfSecond => nano / 1_000,
            Self::MicroOfDay => tod * 1_000_000 + nano / 1_000,
            Self::NanoOfSecond => nano,
            Self::NanoOfDay => tod * 1_000_000_000 + nano,
        }
    }

    /// Smallest valid value of this field at the given instant.
    pub fn minimum(&self, _moment: &Moment) -> i64 {
        match self {
            Self::Year => civil::MIN_YEAR as i64,
            Self::MonthOfYear | Self::DayOfMonth | Self::DayOfYear => 1,
            _ => 0,
        }
    }

    /// Largest valid value of this field at the given instant.
    ///
    /// For `SecondOfMinute` the maximum is `59 + shift` exactly when the
    /// instant's time of day lies in the minute 23:59 of a day carrying a
    /// registered leap event, and 59 everywhere else.
    pub fn maximum(&self, moment: &Moment, ls: &LeapSecondTable) -> i64 {
        match self {
            Self::Year => civil::MAX_YEAR as i64,
            Self::MonthOfYear => 12,
            Self::DayOfMonth => {
                let d = moment.date_utc();
                civil::days_in_month(d.year, d.month) as i64
            }
            Self::DayOfYear => civil::days_in_year(moment.date_utc().year) as i64,
            Self::AmPmOfDay => 1,
            Self::HourOfDay => 23,
            Self::MinuteOfHour => 59,
            Self::MinuteOfDay => 1_439,
            Self::SecondOfMinute => {
                let minute_of_day = moment.posix_time().rem_euclid(civil::SECONDS_PER_DAY) / 60;
                if minute_of_day == 1_439 {
                    59 + ls.shift_on(moment.date_utc()) as i64
                } else {
                    59
                }
            }
            Self::SecondOfDay => 86_399,
            Self::MilliOfSecond => 999,
            Self::MilliOfDay => 86_399_999,
            Self::MicroOfSecond => 999_999,
            Self::MicroOfDay => 86_399_999_999,
            Self::NanoOfSecond => 999_999_999,
            Self::NanoOfDay => 86_399_999_999_999,
        }
    }

    /// Whether `value` is acceptable for this field at the given instant.
    pub fn is_valid(&self, moment: &Moment, value: i64, ls: &LeapSecondTable) -> bool {
        self.minimum(moment) <= value && value <= self.maximum(moment, ls)
    }

    // ── write access ──────────────────────────────────────────────────

    /// Returns a copy of `moment` with this field set to `value`.
    ///
    /// Fine-grained fields in the UTC era travel as SI durations (leap
    /// seconds are traversed); everything else is a civil replacement with
    /// the leap-second corrections described in the module docs.  A result
    /// landing on a skipped (negative) leap second fails with
    /// [`TimeError::Chrono`] unless `leniency` is [`Leniency::Lax`].
    pub fn with(
        &self,
        moment: &Moment,
        value: i64,
        leniency: Leniency,
        ls: &LeapSecondTable,
    ) -> Result<Moment, TimeError> {
        if !self.is_valid(moment, value, ls) {
            return Err(TimeError::InvalidArgument(format!(
                "{value} invalid for {self:?}"
            )));
        }

        if let Some(step) = self.fine_step() {
            if moment.after_leap_threshold(ls) {
                let delta = value
                    .checked_sub(self.get(moment, ls))
                    .ok_or(TimeError::Overflow)?;
                return match step {
                    FineStep::Seconds => moment.plus(delta, SiUnit::Seconds, ls),
                    FineStep::Millis => moment.plus(
                        delta.checked_mul(1_000_000).ok_or(TimeError::Overflow)?,
                        SiUnit::Nanoseconds,
                        ls,
                    ),
                    FineStep::Micros => moment.plus(
                        delta.checked_mul(1_000).ok_or(TimeError::Overflow)?,
                        SiUnit::Nanoseconds,
                        ls,
                    ),
                    FineStep::Nanos => moment.plus(delta, SiUnit::Nanoseconds, ls),
                };
            }
        }

        let replaced = self.replace_in_civil(moment.to_civil(), value)?;
        let result = Moment::of_posix(replaced.to_posix()?, replaced.nano)?;

        if result.is_negative_leap(ls) && leniency != Leniency::Lax {
            return Err(TimeError::Chrono(format!(
                "{}-{:02}-{:02}T{:02}:{:02}:{:02} falls on a skipped leap second",
                replaced.date.year,
                replaced.date.month,
                replaced.date.day,
                replaced.hour,
                replaced.minute,
                replaced.second
            )));
        }

        if (self.is_date() || self.is_high_time()) && moment.is_leap_second(ls) {
            return result.move_to_leap_second(ls);
        }

        Ok(result)
    }

    /// Replaces this field inside a civil decomposition.  Values were
    /// already range-checked; date plausibility (e.g. Feb 29) is enforced
    /// by the civil constructors.
    fn replace_in_civil(
        &self,
        civil: CivilDateTime,
        value: i64,
    ) -> Result<CivilDateTime, TimeError> {
        let date = civil.date;
        match self {
            Self::Year => rebuild_date(civil, CivilDate::new(value as i32, date.month, date.day)?),
            Self::MonthOfYear => {
                rebuild_date(civil, CivilDate::new(date.year, value as u8, date.day)?)
            }
            Self::DayOfMonth => {
                rebuild_date(civil, CivilDate::new(date.year, date.month, value as u8)?)
            }
            Self::DayOfYear => {
                rebuild_date(civil, CivilDate::of_year_day(date.year, value as u16)?)
            }
            Self::AmPmOfDay => CivilDateTime::new(
                date,
                (civil.hour % 12) + 12 * value as u8,
                civil.minute,
                civil.second,
                civil.nano,
            ),
            Self::HourOfDay => {
                CivilDateTime::new(date, value as u8, civil.minute, civil.second, civil.nano)
            }
            Self::MinuteOfHour => {
                CivilDateTime::new(date, civil.hour, value as u8, civil.second, civil.nano)
            }
            Self::MinuteOfDay => CivilDateTime::new(
                date,
                (value / 60) as u8,
                (value % 60) as u8,
                civil.second,
                civil.nano,
            ),
            Self::SecondOfMinute => {
                CivilDateTime::new(date, civil.hour, civil.minute, value as u8, civil.nano)
            }
            Self::SecondOfDay => CivilDateTime::new(
                date,
                (value / 3_600) as u8,
                ((value / 60) % 60) as u8,
                (value % 60) as u8,
                civil.nano,
            ),
            Self::MilliOfSecond => CivilDateTime::new(
                date,
                civil.hour,
                civil.minute,
                civil.second,
                value as u32 * 1_000_000 + civil.nano % 1_000_000,
            ),
            Self::MilliOfDay => {
                let tod = value / 1_000;
                CivilDateTime::new(
                    date,
                    (tod / 3_600) as u8,
                    ((tod / 60) % 60) as u8,
                    (tod % 60) as u8,
                    (value % 1_000) as u32 * 1_000_000 + civil.nano % 1_000_000,
                )
            }
            Self::MicroOfSecond => CivilDateTime::new(
                date,
                civil.hour,
                civil.minute,
                civil.second,
                value as u32 * 1_000 + civil.nano % 1_000,
            ),
            Self::MicroOfDay => {
                let tod = value / 1_000_000;
                CivilDateTime::new(
                    date,
                    (tod / 3_600) as u8,
                    ((tod / 60) % 60) as u8,
                    (tod % 60) as u8,
                    (value % 1_000_000) as u32 * 1_000 + civil.nano % 1_000,
                )
            }
            Self::NanoOfSecond => {
                CivilDateTime::new(date, civil.hour, civil.minute, civil.second, value as u32)
            }
            Self::NanoOfDay => {
                let tod = value / 1_000_000_000;
                CivilDateTime::new(
                    date,
                    (tod / 3_600) as u8,
                    ((tod / 60) % 60) as u8,
                    (tod % 60) as u8,
                    (value % 1_000_000_000) as u32,
                )
            }
        }
    }
}

fn rebuild_date(civil: CivilDateTime, date: CivilDate) -> Result<CivilDateTime, TimeError> {
    CivilDateTime::new(date, civil.hour, civil.minute, civil.second, civil.nano)
}
