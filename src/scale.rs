// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time-scale identifiers and their fixed epoch relations.
//!
//! Every supported scale counts elapsed seconds from its own epoch:
//!
//! | Scale | Epoch | Leap seconds |
//! |-------|-------|--------------|
//! | [`TimeScale::Posix`] | 1970-01-01T00:00:00Z | ignored (86,400 s days) |
//! | [`TimeScale::Utc`]   | 1972-01-01T00:00:00Z | counted |
//! | [`TimeScale::Tai`]   | 1972-01-01 (UTC − 10 s alignment) | counted |
//! | [`TimeScale::Gps`]   | 1980-01-06T00:00:00Z | counted |
//!
//! TAI and GPS are pure constant offsets from UTC epoch time:
//! `TAI = UTC + 10` and `GPS = UTC − UTC_GPS_DELTA`. Neither is defined
//! before its own epoch, which gates the conversions below.

use crate::error::TimeError;
use std::fmt;

/// Seconds between the POSIX epoch (1970-01-01) and the UTC era start
/// (1972-01-01), on the leap-free POSIX clock.
pub const POSIX_UTC_DELTA: i64 = 2 * 365 * 86_400;

/// Seconds of UTC epoch time between 1972-01-01 and the GPS epoch
/// (1980-01-06), including the nine leap seconds accrued in between.
pub const UTC_GPS_DELTA: i64 = ((1980 - 1972) * 365 + 2 + 5) * 86_400 + 9;

/// Seconds between the POSIX epoch and the GPS epoch on the POSIX clock
/// (leap seconds excluded).
pub const POSIX_GPS_DELTA: i64 = POSIX_UTC_DELTA + UTC_GPS_DELTA - 9;

/// How elapsed time maps onto the universal timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeScale {
    /// POSIX time: seconds since 1970-01-01, every day exactly 86,400 s.
    Posix,
    /// UTC epoch time: seconds since 1972-01-01 including inserted leap
    /// seconds.
    Utc,
    /// International Atomic Time, `TAI = UTC + 10`.
    Tai,
    /// GPS time, `GPS = UTC − UTC_GPS_DELTA`; ticks with TAI.
    Gps,
}

impl TimeScale {
    /// Canonical upper-case label, as used by the scale-tagged text form.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Posix => "POSIX",
            Self::Utc => "UTC",
            Self::Tai => "TAI",
            Self::Gps => "GPS",
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Translates elapsed seconds on a time scale into UTC epoch time.
///
/// The POSIX mapping applies only the fixed 1972 alignment — leap
/// accounting lives in the table, not at this layer.  TAI is undefined
/// before 1972 (negative UTC), GPS before 1980-01-06.
pub(crate) fn to_utc_time(elapsed: i64, scale: TimeScale) -> Result<i64, TimeError> {
    match scale {
        TimeScale::Utc => Ok(elapsed),
        TimeScale::Tai => {
            let utc = elapsed.checked_sub(10).ok_or(TimeError::Overflow)?;
            if utc < 0 {
                Err(TimeError::ScaleRange { scale, elapsed })
            } else {
                Ok(utc)
            }
        }
        TimeScale::Gps => {
            let utc = elapsed
                .checked_add(UTC_GPS_DELTA)
                .ok_or(TimeError::Overflow)?;
            if utc < UTC_GPS_DELTA {
                Err(TimeError::ScaleRange { scale, elapsed })
            } else {
                Ok(utc)
            }
        }
        TimeScale::Posix => Ok(elapsed - POSIX_UTC_DELTA),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_deltas() {
        assert_eq!(POSIX_UTC_DELTA, 63_072_000);
        assert_eq!(UTC_GPS_DELTA, 252_892_809);
        assert_eq!(POSIX_GPS_DELTA, 315_964_800);
    }

    #[test]
    fn tai_gated_at_1972() {
        assert_eq!(to_utc_time(10, TimeScale::Tai).unwrap(), 0);
        assert!(matches!(
            to_utc_time(9, TimeScale::Tai),
            Err(TimeError::ScaleRange { .. })
        ));
    }

    #[test]
    fn gps_gated_at_its_epoch() {
        assert_eq!(to_utc_time(0, TimeScale::Gps).unwrap(), UTC_GPS_DELTA);
        assert!(matches!(
            to_utc_time(-1, TimeScale::Gps),
            Err(TimeError::ScaleRange { .. })
        ));
    }

    #[test]
    fn labels() {
        assert_eq!(TimeScale::Posix.label(), "POSIX");
        assert_eq!(format!("{}", TimeScale::Gps), "GPS");
    }
}
