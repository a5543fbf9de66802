// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time units for instant arithmetic.
//!
//! Two unit families exist on purpose and must not be mixed up:
//!
//! - [`SiUnit`] — physical SI seconds/nanoseconds on the UTC timeline.
//!   Arithmetic with these units steps *through* inserted leap seconds and
//!   is therefore only defined from 1972 on.
//! - [`ClockUnit`] — fixed POSIX units (a day is always exactly 86,400 s).
//!   Arithmetic with these units is leap-oblivious, matching what external
//!   APIs without leap-second awareness expect.

/// Physical SI units counted on the UTC timeline (leap-second aware).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiUnit {
    /// One atomic second.
    Seconds,
    /// One billionth of an atomic second.
    Nanoseconds,
}

/// Fixed POSIX time units (leap-second oblivious).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockUnit {
    /// Exactly 86,400 POSIX seconds.
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl ClockUnit {
    /// Length in whole POSIX seconds, or `None` for sub-second units.
    pub(crate) const fn in_seconds(self) -> Option<i64> {
        match self {
            Self::Days => Some(86_400),
            Self::Hours => Some(3_600),
            Self::Minutes => Some(60),
            Self::Seconds => Some(1),
            Self::Milliseconds | Self::Microseconds | Self::Nanoseconds => None,
        }
    }

    /// Length in nanoseconds for sub-second units.
    pub(crate) const fn in_nanos(self) -> i64 {
        match self {
            Self::Milliseconds => 1_000_000,
            Self::Microseconds => 1_000,
            Self::Nanoseconds => 1,
            // Coarse units take the seconds path; this keeps the
            // conversion total for the divide step of `until_posix`.
            Self::Days => 86_400_000_000_000,
            Self::Hours => 3_600_000_000_000,
            Self::Minutes => 60_000_000_000,
            Self::Seconds => 1_000_000_000,
        }
    }
}
