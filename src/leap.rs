// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! UTC leap-second table.
//!
//! A [`LeapSecondTable`] answers four questions about the UTC timeline:
//!
//! 1. `enhance` — how many seconds of UTC epoch time (counted from
//!    1972-01-01, *including* inserted leap seconds) correspond to a POSIX
//!    reading;
//! 2. `strip` — the inverse, mapping UTC epoch time back onto the POSIX
//!    clock (an inserted second maps onto the last POSIX second of its day);
//! 3. `shift_at` / `shift_on` — whether a UTC second or a civil date carries
//!    a registered leap event, and with which shift;
//! 4. `is_positive_leap` — whether a UTC second *is* an inserted second.
//!
//! The table is an explicit value passed by reference into every operation
//! that needs it; there is no process-global registry. This keeps arithmetic
//! deterministic and lets tests run against synthetic tables
//! ([`LeapSecondTable::from_events`]).

use crate::civil::CivilDate;
use crate::error::TimeError;
use crate::scale::POSIX_UTC_DELTA;

/// Leap seconds announced by IERS Bulletin C, as `(year, month, day)` of the
/// day at whose end one second is inserted.
const IERS_EVENTS: [(i32, u8, u8); 27] = [
    (1972, 6, 30),
    (1972, 12, 31),
    (1973, 12, 31),
    (1974, 12, 31),
    (1975, 12, 31),
    (1976, 12, 31),
    (1977, 12, 31),
    (1978, 12, 31),
    (1979, 12, 31),
    (1981, 6, 30),
    (1982, 6, 30),
    (1983, 6, 30),
    (1985, 6, 30),
    (1987, 12, 31),
    (1989, 12, 31),
    (1990, 12, 31),
    (1992, 6, 30),
    (1993, 6, 30),
    (1994, 6, 30),
    (1995, 12, 31),
    (1997, 6, 30),
    (1998, 12, 31),
    (2005, 12, 31),
    (2008, 12, 31),
    (2012, 6, 30),
    (2015, 6, 30),
    (2016, 12, 31),
];

/// One registered leap-second event.
///
/// `date` is the day in whose final minute the shift happens; the event
/// takes effect at the start of the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeapSecondEvent {
    /// Day whose last minute is stretched (or shortened).
    pub date: CivilDate,
    /// Shift of this single event, `+1` or (hypothetically) `-1`.
    pub shift: i32,
    /// POSIX time at the start of the following day.
    posix: i64,
    /// UTC epoch time at the start of the following day.
    utc: i64,
    /// Accumulated shift including this event.
    total: i64,
}

/// An immutable, chronologically sorted leap-second table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeapSecondTable {
    events: Vec<LeapSecondEvent>,
    supports_negative: bool,
    enabled: bool,
}

impl LeapSecondTable {
    /// The built-in IERS table (27 inserted seconds, 1972-06-30 through
    /// 2016-12-31).
    pub fn standard() -> Self {
        let events: Vec<(CivilDate, i32)> = IERS_EVENTS
            .iter()
            .map(|&(y, m, d)| (CivilDate { year: y, month: m, day: d }, 1))
            .collect();
        // The built-in list is well-formed, so this cannot fail.
        match Self::from_events(&events) {
            Ok(table) => table,
            Err(_) => unreachable!("built-in leap second table is valid"),
        }
    }

    /// An empty table with leap-second support switched off.
    ///
    /// All scale conversions then degrade to fixed POSIX-relative offsets;
    /// see the scale module for the exact degraded semantics.
    pub fn disabled() -> Self {
        Self {
            events: Vec::new(),
            supports_negative: false,
            enabled: false,
        }
    }

    /// Builds a table from explicit `(date, shift)` events.
    ///
    /// Events must be strictly ascending by date, carry a non-zero shift and
    /// lie in the UTC era (year ≥ 1972). An accumulated shift may never
    /// drop below zero (UTC cannot run behind its own epoch alignment by
    /// more than the inserted seconds).
    pub fn from_events(events: &[(CivilDate, i32)]) -> Result<Self, TimeError> {
        let mut table = Vec::with_capacity(events.len());
        let mut total: i64 = 0;
        let mut supports_negative = false;
        let mut last_day = i64::MIN;

        for &(date, shift) in events {
            if date.year < 1972 {
                return Err(TimeError::InvalidArgument(format!(
                    "leap second event before 1972: {}-{:02}-{:02}",
                    date.year, date.month, date.day
                )));
            }
            if shift == 0 {
                return Err(TimeError::InvalidArgument(
                    "leap second event with zero shift".into(),
                ));
            }
            let day = date.epoch_day();
            if day <= last_day {
                return Err(TimeError::InvalidArgument(
                    "leap second events out of order".into(),
                ));
            }
            last_day = day;
            total += shift as i64;
            if total < 0 {
                return Err(TimeError::InvalidArgument(
                    "accumulated leap shift below zero".into(),
                ));
            }
            if shift < 0 {
                supports_negative = true;
            }
            let posix = (day + 1) * crate::civil::SECONDS_PER_DAY;
            table.push(LeapSecondEvent {
                date,
                shift,
                posix,
                utc: posix - POSIX_UTC_DELTA + total,
                total,
            });
        }

        Ok(Self {
            enabled: !table.is_empty(),
            events: table,
            supports_negative,
        })
    }

    /// Whether leap-second support is active.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the table registers any negative (skipped) leap second.
    ///
    /// No negative leap second has ever been announced; the hook exists
    /// because the UTC standard permits one.
    #[inline]
    pub fn supports_negative_leap(&self) -> bool {
        self.supports_negative
    }

    /// Registered events in chronological order.
    #[inline]
    pub fn events(&self) -> &[LeapSecondEvent] {
        &self.events
    }

    /// POSIX reading → UTC epoch time (seconds since 1972-01-01 including
    /// inserted leap seconds; negative before 1972).
    pub fn enhance(&self, posix: i64) -> i64 {
        let idx = self.events.partition_point(|ev| ev.posix <= posix);
        let total = if idx == 0 { 0 } else { self.events[idx - 1].total };
        posix - POSIX_UTC_DELTA + total
    }

    /// UTC epoch time → POSIX reading.
    ///
    /// An inserted leap second has no POSIX identity of its own and maps
    /// onto the last POSIX second of its day, so
    /// `enhance(strip(u)) == u - 1` exactly inside an inserted second and
    /// `strip(enhance(x)) == x` everywhere else.
    pub fn strip(&self, utc: i64) -> i64 {
        let idx = self.events.partition_point(|ev| ev.utc <= utc);
        let total = if idx == 0 { 0 } else { self.events[idx - 1].total };
        let posix = utc - total + POSIX_UTC_DELTA;
        match self.events.get(idx) {
            // Inside the inserted second(s) of the next event.
            Some(next) if next.shift > 0 && posix >= next.posix => next.posix - 1,
            _ => posix,
        }
    }

    /// Whether the given UTC epoch second is an inserted (61st) second.
    pub fn is_positive_leap(&self, utc: i64) -> bool {
        self.shift_at(utc) > 0
    }

    /// Shift of the event covering the given UTC epoch second, or `0`.
    ///
    /// For a positive event the covered window is the inserted second(s)
    /// just before the event boundary.
    pub fn shift_at(&self, utc: i64) -> i32 {
        let idx = self.events.partition_point(|ev| ev.utc <= utc);
        match self.events.get(idx) {
            Some(next) if next.shift > 0 && utc >= next.utc - next.shift as i64 => {
                next.shift
            }
            _ => 0,
        }
    }

    /// Shift registered for the event at the end of `date`, or `0`.
    pub fn shift_on(&self, date: CivilDate) -> i32 {
        self.events
            .binary_search_by(|ev| ev.date.cmp(&date))
            .map(|idx| self.events[idx].shift)
            .unwrap_or(0)
    }
}
