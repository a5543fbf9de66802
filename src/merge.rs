// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Building [`Moment`] values from civil fields or the system clock.
//!
//! The merger is the only place where the leap-second *marker* — a parsed
//! or user-supplied `second == 60` — acquires meaning: it is temporarily
//! substituted by 59 so the ordinary civil composition applies, and the
//! result is then advanced by one SI second onto the inserted second,
//! subject to the caller's [`Leniency`] policy.

use crate::civil::{CivilDate, CivilDateTime};
use crate::error::TimeError;
use crate::instant::Moment;
use crate::leap::LeapSecondTable;
use crate::units::SiUnit;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Conflict-resolution policy for ambiguous or invalid civil input.
///
/// `Strict` and `Smart` turn an unverifiable leap-second marker into a hard
/// error; `Lax` always resolves to a definite instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Leniency {
    Strict,
    #[default]
    Smart,
    Lax,
}

impl Leniency {
    #[inline]
    pub fn is_lax(&self) -> bool {
        matches!(self, Self::Lax)
    }
}

/// A fixed shift of civil time relative to UTC, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZonalOffset {
    total_seconds: i32,
}

/// Offsets are bounded like real-world zone data, ±18 hours.
const MAX_OFFSET: i32 = 18 * 3_600;

impl ZonalOffset {
    /// The zero offset (Greenwich).
    pub const UTC: ZonalOffset = ZonalOffset { total_seconds: 0 };

    /// Creates an offset from a total shift in seconds east of Greenwich.
    pub fn of_total_seconds(total_seconds: i32) -> Result<Self, TimeError> {
        if total_seconds.abs() > MAX_OFFSET {
            return Err(TimeError::InvalidArgument(format!(
                "zonal offset out of range: {total_seconds}s"
            )));
        }
        Ok(Self { total_seconds })
    }

    /// Creates a whole-hour offset.
    pub fn of_hours(hours: i32) -> Result<Self, TimeError> {
        Self::of_total_seconds(hours * 3_600)
    }

    /// Creates an offset from hours and minutes carrying the same sign.
    pub fn of_hours_minutes(hours: i32, minutes: i32) -> Result<Self, TimeError> {
        if hours.signum() * minutes.signum() < 0 {
            return Err(TimeError::InvalidArgument(
                "offset hours and minutes must share their sign".into(),
            ));
        }
        Self::of_total_seconds(hours * 3_600 + minutes * 60)
    }

    /// Total shift in seconds east of Greenwich.
    #[inline]
    pub const fn total_seconds(&self) -> i32 {
        self.total_seconds
    }

    /// Leap seconds are only defined for whole-minute offsets.
    #[inline]
    pub(crate) const fn is_whole_minute(&self) -> bool {
        self.total_seconds % 60 == 0
    }
}

impl fmt::Display for ZonalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total_seconds == 0 {
            return f.write_str("Z");
        }
        let sign = if self.total_seconds < 0 { '-' } else { '+' };
        let abs = self.total_seconds.unsigned_abs();
        write!(f, "{sign}{:02}:{:02}", abs / 3_600, (abs / 60) % 60)?;
        if abs % 60 != 0 {
            write!(f, ":{:02}", abs % 60)?;
        }
        Ok(())
    }
}

/// Merges a civil timestamp and a zonal offset into a [`Moment`].
///
/// `second == 60` in the input marks an inserted leap second. The marker
/// requires a whole-minute offset; for dates in the UTC era the computed
/// instant is advanced by one SI second, before 1972 by one raw POSIX
/// second. Under [`Leniency::Lax`] the advance is unconditional; under
/// `Strict`/`Smart` it must hit a registered positive leap event, else the
/// merge fails with [`TimeError::InvalidArgument`]. With leap-second
/// support disabled (and not lax) the marker is dropped and the instant of
/// second 59 is returned.
pub fn from_fields(
    civil: &CivilDateTime,
    offset: ZonalOffset,
    leniency: Leniency,
    ls: &LeapSecondTable,
) -> Result<Moment, TimeError> {
    // Re-validate: the civil struct has public fields.
    let civil = CivilDateTime::new(
        CivilDate::new(civil.date.year, civil.date.month, civil.date.day)?,
        civil.hour,
        civil.minute,
        civil.second,
        civil.nano,
    )?;

    let leap_marker = civil.second == 60;
    if leap_marker && !offset.is_whole_minute() {
        return Err(TimeError::InvalidArgument(format!(
            "leap second is only allowed with a timezone offset in full minutes: {offset}"
        )));
    }

    let base = if leap_marker {
        CivilDateTime { second: 59, ..civil }
    } else {
        civil
    };

    let local = base.to_posix()?;
    let posix = local
        .checked_sub(offset.total_seconds() as i64)
        .ok_or(TimeError::Overflow)?;
    let result = Moment::of_posix(posix, base.nano)?;

    if !leap_marker {
        return Ok(result);
    }

    let advanced = if base.date.year >= 1972 {
        result.plus(1, SiUnit::Seconds, ls)?
    } else {
        // No SI duration exists before 1972; shift the raw counter.
        Moment::from_raw(
            result.posix_time().checked_add(1).ok_or(TimeError::Overflow)?,
            result.nano(),
            false,
        )?
    };

    if leniency.is_lax() {
        Ok(advanced)
    } else if ls.is_enabled() {
        if advanced.is_leap_second(ls) {
            Ok(advanced)
        } else {
            Err(TimeError::InvalidArgument(format!(
                "second-of-minute 60 is not a registered leap second on \
                 {}-{:02}-{:02}",
                base.date.year, base.date.month, base.date.day
            )))
        }
    } else {
        Ok(result)
    }
}

/// Reads the current instant from the system clock.
pub fn now() -> Result<Moment, TimeError> {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => Moment::of_posix(elapsed.as_secs() as i64, elapsed.subsec_nanos()),
        Err(err) => {
            // Clock before 1970: mirror the duration onto negative seconds
            // with a non-negative fraction.
            let before = err.duration();
            let mut secs = -(before.as_secs() as i64);
            let mut nano = before.subsec_nanos();
            if nano > 0 {
                secs -= 1;
                nano = 1_000_000_000 - nano;
            }
            Moment::of_posix(secs, nano)
        }
    }
}
