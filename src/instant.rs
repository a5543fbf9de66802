// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The [`Moment`] instant type.
//!
//! A `Moment` is an immutable point on the universal timeline with
//! nanosecond precision and leap-second awareness.  It offers a dual view:
//! a machine counter (elapsed seconds on a [`TimeScale`]) and a tuple of
//! civil date/time values in UTC (via [`Moment::to_civil`] and the
//! [`Field`](crate::Field) rules).
//!
//! # Representation
//!
//! Internally a `Moment` stores `(posix_time, nano, leap)`: a POSIX clock
//! reading, a sub-second fraction in `[0, 999_999_999]`, and a flag marking
//! the instant as the inserted leap second *following* `posix_time`'s
//! second.  The flag is an explicit field — it can only be set by code
//! paths that verified the event against a [`LeapSecondTable`].
//!
//! # Time arithmetic
//!
//! Two unit families exist: [`SiUnit`] arithmetic
//! runs on UTC epoch time and steps through inserted leap seconds, while
//! [`ClockUnit`] arithmetic runs on the raw POSIX counter and ignores them.
//! The divergence is observable:
//!
//! ```
//! use leapoch::{LeapSecondTable, Moment, SiUnit, ClockUnit, TimeScale};
//!
//! let ls = LeapSecondTable::standard();
//! let m = Moment::of(1_278_028_823, 0, TimeScale::Utc, &ls).unwrap();
//!
//! // One SI second lands on the inserted leap second 2012-06-30T23:59:60Z,
//! let si = m.plus(1, SiUnit::Seconds, &ls).unwrap();
//! assert!(si.is_leap_second(&ls));
//!
//! // while one POSIX second skips over it to 2012-07-01T00:00:00Z.
//! let posix = m.plus_posix(1, ClockUnit::Seconds).unwrap();
//! assert!(!posix.is_leap_second(&ls));
//! ```

use crate::civil::{self, CivilDate, CivilDateTime};
use crate::error::TimeError;
use crate::leap::LeapSecondTable;
use crate::scale::{self, TimeScale, POSIX_GPS_DELTA, POSIX_UTC_DELTA, UTC_GPS_DELTA};
use crate::units::{ClockUnit, SiUnit};
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub(crate) const MAX_NANO: u32 = 999_999_999;

/// Smallest representable POSIX reading (year −999,999,999).
pub(crate) const MIN_LIMIT: i64 =
    civil::to_epoch_day(civil::MIN_YEAR, 1, 1) * civil::SECONDS_PER_DAY;

/// Largest representable POSIX reading (end of year +999,999,999).
pub(crate) const MAX_LIMIT: i64 =
    civil::to_epoch_day(civil::MAX_YEAR, 12, 31) * civil::SECONDS_PER_DAY + 86_399;

/// An instant on the universal timeline, nanosecond precision, UTC-anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Moment {
    posix_time: i64,
    nano: u32,
    leap: bool,
}

impl Moment {
    /// Start of the UNIX era, 1970-01-01T00:00:00,000000000Z.
    pub const UNIX_EPOCH: Moment = Moment {
        posix_time: 0,
        nano: 0,
        leap: false,
    };

    /// Earliest representable instant.
    pub const MIN: Moment = Moment {
        posix_time: MIN_LIMIT,
        nano: 0,
        leap: false,
    };

    /// Latest representable instant.
    pub const MAX: Moment = Moment {
        posix_time: MAX_LIMIT,
        nano: MAX_NANO,
        leap: false,
    };

    // ── constructors ──────────────────────────────────────────────────

    /// Creates an instant from elapsed seconds and a nanosecond fraction on
    /// the given time scale.
    ///
    /// Elapsed time on a non-POSIX scale is translated into UTC epoch time
    /// first; TAI is only defined from 1972-01-01 on, GPS from 1980-01-06.
    ///
    /// # Errors
    ///
    /// - [`TimeError::InvalidArgument`] — nanosecond above 999,999,999, or a
    ///   UTC reading that falls into no representable second;
    /// - [`TimeError::Range`] — beyond year ±999,999,999;
    /// - [`TimeError::ScaleRange`] — TAI/GPS before their epochs;
    /// - [`TimeError::Config`] — non-POSIX scale while `ls` is disabled.
    pub fn of(
        elapsed: i64,
        nano: u32,
        scale: TimeScale,
        ls: &LeapSecondTable,
    ) -> Result<Self, TimeError> {
        check_nano(nano)?;
        match scale {
            TimeScale::Posix => {
                check_range(elapsed)?;
                Ok(Self {
                    posix_time: elapsed,
                    nano,
                    leap: false,
                })
            }
            _ if !ls.is_enabled() => Err(TimeError::Config),
            _ => {
                let utc = scale::to_utc_time(elapsed, scale)?;
                Self::from_utc_time(utc, nano, ls)
            }
        }
    }

    /// Creates an instant from a plain POSIX reading.
    pub fn of_posix(posix_time: i64, nano: u32) -> Result<Self, TimeError> {
        check_nano(nano)?;
        check_range(posix_time)?;
        Ok(Self {
            posix_time,
            nano,
            leap: false,
        })
    }

    /// UTC epoch time → instant, detecting the inserted-second window.
    pub(crate) fn from_utc_time(
        utc: i64,
        nano: u32,
        ls: &LeapSecondTable,
    ) -> Result<Self, TimeError> {
        // Pre-bound so the table math below cannot overflow; the precise
        // range check runs on the stripped POSIX reading.
        if utc > MAX_LIMIT || utc < MIN_LIMIT - POSIX_UTC_DELTA {
            return Err(TimeError::Range(utc));
        }
        let posix_time = ls.strip(utc);
        check_range(posix_time)?;
        let diff = utc - ls.enhance(posix_time);
        if diff == 0 || posix_time == MAX_LIMIT {
            Ok(Self {
                posix_time,
                nano,
                leap: false,
            })
        } else if diff == 1 {
            Ok(Self {
                posix_time,
                nano,
                leap: true,
            })
        } else {
            Err(TimeError::InvalidArgument(format!(
                "cannot handle leap shift of {utc}"
            )))
        }
    }

    /// Rebuilds an instant from raw parts.  The caller vouches for the leap
    /// flag; only the codec's validating decode and the merger use this.
    pub(crate) fn from_raw(
        posix_time: i64,
        nano: u32,
        leap: bool,
    ) -> Result<Self, TimeError> {
        check_nano(nano)?;
        check_range(posix_time)?;
        Ok(Self {
            posix_time,
            nano,
            leap,
        })
    }

    // ── accessors ─────────────────────────────────────────────────────

    /// The POSIX clock reading (leap seconds excluded).
    #[inline]
    pub const fn posix_time(&self) -> i64 {
        self.posix_time
    }

    /// Nanosecond fraction of the current second.
    #[inline]
    pub const fn nano(&self) -> u32 {
        self.nano
    }

    /// Whether this instant denotes an inserted leap second.
    ///
    /// Always `false` while leap-second support is disabled.
    #[inline]
    pub fn is_leap_second(&self, ls: &LeapSecondTable) -> bool {
        self.leap && ls.is_enabled()
    }

    #[inline]
    pub(crate) const fn leap_flag(&self) -> bool {
        self.leap
    }

    /// Elapsed seconds of this instant on the given time scale.
    ///
    /// With leap-second support disabled, UTC/TAI/GPS readings degrade to
    /// fixed POSIX-relative offsets without leap accounting.
    pub fn elapsed_time(
        &self,
        scale: TimeScale,
        ls: &LeapSecondTable,
    ) -> Result<i64, TimeError> {
        match scale {
            TimeScale::Posix => Ok(self.posix_time),
            TimeScale::Utc => Ok(self.epoch_time(ls)),
            TimeScale::Tai => {
                let utc = self.epoch_time(ls);
                if utc < 0 {
                    Err(TimeError::ScaleRange {
                        scale,
                        elapsed: utc,
                    })
                } else {
                    utc.checked_add(10).ok_or(TimeError::Overflow)
                }
            }
            TimeScale::Gps => {
                let utc = self.epoch_time(ls);
                if ls.strip(utc) < POSIX_GPS_DELTA {
                    Err(TimeError::ScaleRange {
                        scale,
                        elapsed: utc,
                    })
                } else {
                    let gps = if ls.is_enabled() { utc } else { utc + 9 };
                    Ok(gps - UTC_GPS_DELTA)
                }
            }
        }
    }

    /// Nanosecond fraction of this instant on the given time scale.
    ///
    /// The fraction itself is scale-independent; the call fails where the
    /// scale is undefined for this instant.
    pub fn nano_in(&self, scale: TimeScale, ls: &LeapSecondTable) -> Result<u32, TimeError> {
        match scale {
            TimeScale::Posix | TimeScale::Utc => Ok(self.nano),
            TimeScale::Tai => {
                if self.posix_time < POSIX_UTC_DELTA {
                    Err(TimeError::ScaleRange {
                        scale,
                        elapsed: self.epoch_time(ls),
                    })
                } else {
                    Ok(self.nano)
                }
            }
            TimeScale::Gps => {
                let utc = self.epoch_time(ls);
                if ls.strip(utc) < POSIX_GPS_DELTA {
                    Err(TimeError::ScaleRange {
                        scale,
                        elapsed: utc,
                    })
                } else {
                    Ok(self.nano)
                }
            }
        }
    }

    /// Decimal rendering `seconds.fffffffff` on the given scale.
    pub fn transform(
        &self,
        scale: TimeScale,
        ls: &LeapSecondTable,
    ) -> Result<String, TimeError> {
        let elapsed = self.elapsed_time(scale, ls)?;
        let nano = self.nano_in(scale, ls)?;
        let total = elapsed as i128 * NANOS_PER_SECOND as i128 + nano as i128;
        let sign = if total < 0 { "-" } else { "" };
        let abs = total.unsigned_abs();
        Ok(format!(
            "{sign}{}.{:09}",
            abs / NANOS_PER_SECOND as u128,
            abs % NANOS_PER_SECOND as u128
        ))
    }

    /// Leap-enhanced UTC epoch time (the ordering axis).
    pub(crate) fn epoch_time(&self, ls: &LeapSecondTable) -> i64 {
        if ls.is_enabled() {
            let time = ls.enhance(self.posix_time);
            if self.leap {
                time + 1
            } else {
                time
            }
        } else {
            self.posix_time - POSIX_UTC_DELTA
        }
    }

    // ── civil view (always timezone UTC) ──────────────────────────────

    /// Civil date of this instant in UTC.
    #[inline]
    pub fn date_utc(&self) -> CivilDate {
        CivilDate::from_epoch_day_unchecked(
            self.posix_time.div_euclid(civil::SECONDS_PER_DAY),
        )
    }

    /// POSIX seconds elapsed within the current UTC day, `[0, 86399]`.
    #[inline]
    pub(crate) fn time_of_day(&self) -> i64 {
        self.posix_time.rem_euclid(civil::SECONDS_PER_DAY)
    }

    /// Leap-stripped civil decomposition in UTC.
    ///
    /// A leap instant decomposes to second 59 here; only the canonical
    /// renderer and the field rules re-apply the 60 marker.
    pub fn to_civil(&self) -> CivilDateTime {
        let tod = self.time_of_day();
        CivilDateTime {
            date: self.date_utc(),
            hour: (tod / 3_600) as u8,
            minute: ((tod / 60) % 60) as u8,
            second: (tod % 60) as u8,
            nano: self.nano,
        }
    }

    // ── comparison ────────────────────────────────────────────────────

    /// Strictly later than `other` on the leap-enhanced timeline.
    #[inline]
    pub fn is_after(&self, other: &Moment) -> bool {
        self.cmp(other) == Ordering::Greater
    }

    /// Strictly earlier than `other` on the leap-enhanced timeline.
    #[inline]
    pub fn is_before(&self, other: &Moment) -> bool {
        self.cmp(other) == Ordering::Less
    }

    /// Configuration-sensitive simultaneity test.
    ///
    /// With leap-second support enabled this is plain equality; with it
    /// disabled the leap flag is masked out and only the effective POSIX
    /// reading and fraction are compared.
    pub fn simultaneous(&self, other: &Moment, ls: &LeapSecondTable) -> bool {
        if ls.is_enabled() {
            self == other
        } else {
            self.posix_time == other.posix_time && self.nano == other.nano
        }
    }

    // ── SI arithmetic (leap-second aware, UTC era only) ───────────────

    /// Adds an amount of the given SI unit on the UTC time scale.
    ///
    /// Fails with [`TimeError::Unsupported`] before 1972 and with
    /// [`TimeError::Overflow`] on 64-bit overflow.  Nanosecond carry uses
    /// floor semantics, so the fraction stays non-negative.
    pub fn plus(
        &self,
        amount: i64,
        unit: SiUnit,
        ls: &LeapSecondTable,
    ) -> Result<Self, TimeError> {
        self.check_si_era()?;
        match unit {
            SiUnit::Seconds => self.shift_seconds(amount, self.nano, ls),
            SiUnit::Nanoseconds => {
                let sum = (self.nano as i64)
                    .checked_add(amount)
                    .ok_or(TimeError::Overflow)?;
                let nano = sum.rem_euclid(NANOS_PER_SECOND) as u32;
                let carry = sum.div_euclid(NANOS_PER_SECOND);
                self.shift_seconds(carry, nano, ls)
            }
        }
    }

    /// Subtracts an amount of the given SI unit on the UTC time scale.
    pub fn minus(
        &self,
        amount: i64,
        unit: SiUnit,
        ls: &LeapSecondTable,
    ) -> Result<Self, TimeError> {
        self.plus(amount.checked_neg().ok_or(TimeError::Overflow)?, unit, ls)
    }

    /// Signed distance from `self` to `end` in the given SI unit.
    ///
    /// In seconds the result counts only fully elapsed seconds (truncated
    /// toward `self`); in nanoseconds it is exact and overflow-checked.
    pub fn until(
        &self,
        end: &Moment,
        unit: SiUnit,
        ls: &LeapSecondTable,
    ) -> Result<i64, TimeError> {
        self.check_si_era()?;
        end.check_si_era()?;
        let delta = end
            .epoch_time(ls)
            .checked_sub(self.epoch_time(ls))
            .ok_or(TimeError::Overflow)?;
        match unit {
            SiUnit::Seconds => {
                let mut delta = delta;
                if delta < 0 && end.nano > self.nano {
                    delta += 1;
                } else if delta > 0 && end.nano < self.nano {
                    delta -= 1;
                }
                Ok(delta)
            }
            SiUnit::Nanoseconds => delta
                .checked_mul(NANOS_PER_SECOND)
                .and_then(|n| n.checked_add(end.nano as i64 - self.nano as i64))
                .ok_or(TimeError::Overflow),
        }
    }

    // ── POSIX arithmetic (leap-second oblivious) ──────────────────────

    /// Adds an amount of a fixed POSIX unit, ignoring leap seconds.
    ///
    /// A day is always exactly 86,400 seconds here; there is no 1972
    /// restriction.  The result never carries a leap flag.
    pub fn plus_posix(&self, amount: i64, unit: ClockUnit) -> Result<Self, TimeError> {
        match unit.in_seconds() {
            Some(secs) => {
                let shift = amount.checked_mul(secs).ok_or(TimeError::Overflow)?;
                Self::of_posix(
                    self.posix_time
                        .checked_add(shift)
                        .ok_or(TimeError::Overflow)?,
                    self.nano,
                )
            }
            None => {
                let nanos = amount
                    .checked_mul(unit.in_nanos())
                    .ok_or(TimeError::Overflow)?;
                let sum = (self.nano as i64)
                    .checked_add(nanos)
                    .ok_or(TimeError::Overflow)?;
                let nano = sum.rem_euclid(NANOS_PER_SECOND) as u32;
                let carry = sum.div_euclid(NANOS_PER_SECOND);
                Self::of_posix(
                    self.posix_time
                        .checked_add(carry)
                        .ok_or(TimeError::Overflow)?,
                    nano,
                )
            }
        }
    }

    /// Subtracts an amount of a fixed POSIX unit, ignoring leap seconds.
    pub fn minus_posix(&self, amount: i64, unit: ClockUnit) -> Result<Self, TimeError> {
        self.plus_posix(amount.checked_neg().ok_or(TimeError::Overflow)?, unit)
    }

    /// Signed distance from `self` to `end` in a fixed POSIX unit,
    /// truncated toward zero (only full units count).
    pub fn until_posix(&self, end: &Moment, unit: ClockUnit) -> Result<i64, TimeError> {
        match unit.in_seconds() {
            Some(secs) => {
                let mut delta = end
                    .posix_time
                    .checked_sub(self.posix_time)
                    .ok_or(TimeError::Overflow)?;
                if delta < 0 && end.nano > self.nano {
                    delta += 1;
                } else if delta > 0 && end.nano < self.nano {
                    delta -= 1;
                }
                Ok(delta / secs)
            }
            None => {
                let delta = end
                    .posix_time
                    .checked_sub(self.posix_time)
                    .and_then(|s| s.checked_mul(NANOS_PER_SECOND))
                    .and_then(|n| n.checked_add(end.nano as i64 - self.nano as i64))
                    .ok_or(TimeError::Overflow)?;
                Ok(delta / unit.in_nanos())
            }
        }
    }

    // ── internal helpers ──────────────────────────────────────────────

    /// Seconds shift on the era-appropriate axis with a replaced fraction.
    fn shift_seconds(
        &self,
        seconds: i64,
        nano: u32,
        ls: &LeapSecondTable,
    ) -> Result<Self, TimeError> {
        if ls.is_enabled() {
            let utc = self
                .epoch_time(ls)
                .checked_add(seconds)
                .ok_or(TimeError::Overflow)?;
            Self::from_utc_time(utc, nano, ls)
        } else {
            Self::of_posix(
                self.posix_time
                    .checked_add(seconds)
                    .ok_or(TimeError::Overflow)?,
                nano,
            )
        }
    }

    pub(crate) fn check_si_era(&self) -> Result<(), TimeError> {
        if self.posix_time < POSIX_UTC_DELTA {
            Err(TimeError::Unsupported(
                "cannot compute SI duration before 1972-01-01",
            ))
        } else {
            Ok(())
        }
    }

    /// Whether the instant lies past the first full day of the UTC era —
    /// the threshold from which fine-grained field mutations must run
    /// through SI arithmetic to traverse leap seconds correctly.
    pub(crate) fn after_leap_threshold(&self, ls: &LeapSecondTable) -> bool {
        let epoch = self.epoch_time(ls);
        epoch > civil::SECONDS_PER_DAY
            || (epoch == civil::SECONDS_PER_DAY && self.nano > 0)
    }

    /// Re-applies the leap-second position after a local-time transform:
    /// a result sitting on 23:59:59 of a day with a registered positive
    /// shift is advanced onto the inserted second itself.
    pub(crate) fn move_to_leap_second(
        self,
        ls: &LeapSecondTable,
    ) -> Result<Self, TimeError> {
        if !self.leap && self.time_of_day() == 86_399 && ls.shift_on(self.date_utc()) == 1 {
            self.plus(1, SiUnit::Seconds, ls)
        } else {
            Ok(self)
        }
    }

    /// Whether the POSIX reading denotes a second skipped by a negative
    /// leap event.
    pub(crate) fn is_negative_leap(&self, ls: &LeapSecondTable) -> bool {
        ls.supports_negative_leap()
            && ls.strip(ls.enhance(self.posix_time)) > self.posix_time
    }
}

/// Total order over (leap-enhanced epoch time, nanosecond).
///
/// For any fixed leap-second table this is exactly the lexicographic order
/// of `(posix_time, leap, nano)`: the inserted second sorts after every
/// fraction of the second it follows and before the next POSIX second.
impl Ord for Moment {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.posix_time, self.leap, self.nano).cmp(&(
            other.posix_time,
            other.leap,
            other.nano,
        ))
    }
}

impl PartialOrd for Moment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn check_range(posix_time: i64) -> Result<(), TimeError> {
    if posix_time < MIN_LIMIT || posix_time > MAX_LIMIT {
        Err(TimeError::Range(posix_time))
    } else {
        Ok(())
    }
}

fn check_nano(nano: u32) -> Result<(), TimeError> {
    if nano > MAX_NANO {
        Err(TimeError::InvalidArgument(format!(
            "nanosecond out of range: {nano}"
        )))
    } else {
        Ok(())
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────
//
// The struct form `{posix, nano, leap}` is the convenience transport; the
// binary codec in `crate::codec` is the validating one (it re-checks the
// leap flag against a table on decode).

#[cfg(feature = "serde")]
impl Serialize for Moment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Moment", 3)?;
        s.serialize_field("posix", &self.posix_time)?;
        s.serialize_field("nano", &self.nano)?;
        s.serialize_field("leap", &self.leap)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Moment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            posix: i64,
            nano: u32,
            #[serde(default)]
            leap: bool,
        }

        let raw = Raw::deserialize(deserializer)?;
        Moment::from_raw(raw.posix, raw.nano, raw.leap).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leap::LeapSecondTable;

    fn utc(elapsed: i64, nano: u32, ls: &LeapSecondTable) -> Moment {
        Moment::of(elapsed, nano, TimeScale::Utc, ls).unwrap()
    }

    #[test]
    fn posix_epoch_constants() {
        let ls = LeapSecondTable::standard();
        assert_eq!(
            Moment::of(0, 0, TimeScale::Posix, &ls).unwrap(),
            Moment::UNIX_EPOCH
        );
        assert_eq!(Moment::UNIX_EPOCH.date_utc().year, 1970);
    }

    #[test]
    fn scale_epochs() {
        let ls = LeapSecondTable::standard();
        // 1972-01-01 on UTC and TAI, 1980-01-06 on GPS.
        assert_eq!(utc(0, 0, &ls).posix_time(), POSIX_UTC_DELTA);
        assert_eq!(
            Moment::of(10, 0, TimeScale::Tai, &ls).unwrap().posix_time(),
            POSIX_UTC_DELTA
        );
        assert_eq!(
            Moment::of(0, 0, TimeScale::Gps, &ls).unwrap().posix_time(),
            POSIX_GPS_DELTA
        );
    }

    #[test]
    fn leap_second_construction() {
        let ls = LeapSecondTable::standard();
        let leap = utc(1_278_028_824, 0, &ls);
        assert!(leap.is_leap_second(&ls));
        assert_eq!(leap.posix_time(), 1_341_100_799);
        assert_eq!(
            leap.elapsed_time(TimeScale::Utc, &ls).unwrap(),
            1_278_028_824
        );

        let before = utc(1_278_028_823, 0, &ls);
        assert!(!before.is_leap_second(&ls));
        assert_eq!(before.posix_time(), 1_341_100_799);
    }

    #[test]
    fn midnight_after_leap() {
        let ls = LeapSecondTable::standard();
        let midnight = utc(1_278_028_825, 0, &ls);
        assert!(!midnight.is_leap_second(&ls));
        assert_eq!(midnight.posix_time(), 1_341_100_800);
        assert_eq!(midnight.date_utc().day, 1);
    }

    #[test]
    fn plus_si_seconds_traverses_leap() {
        let ls = LeapSecondTable::standard();
        let start = utc(1_278_028_823, 0, &ls);
        let end = start.plus(3, SiUnit::Seconds, &ls).unwrap();
        assert_eq!(end, utc(1_278_028_826, 0, &ls));
        assert_eq!(end.minus(3, SiUnit::Seconds, &ls).unwrap(), start);
    }

    #[test]
    fn plus_si_nanos_lands_on_leap() {
        let ls = LeapSecondTable::standard();
        let result = utc(1_278_028_823, 999_999_999, &ls)
            .plus(3, SiUnit::Nanoseconds, &ls)
            .unwrap();
        assert_eq!(result, utc(1_278_028_824, 2, &ls));
        assert!(result.is_leap_second(&ls));
        assert_eq!(
            result.minus(3, SiUnit::Nanoseconds, &ls).unwrap(),
            utc(1_278_028_823, 999_999_999, &ls)
        );
    }

    #[test]
    fn posix_nanos_skip_leap() {
        let ls = LeapSecondTable::standard();
        let result = utc(1_278_028_823, 999_999_999, &ls)
            .plus_posix(3, ClockUnit::Nanoseconds)
            .unwrap();
        assert_eq!(result, utc(1_278_028_825, 2, &ls));
        assert!(!result.is_leap_second(&ls));
        assert_eq!(result, Moment::of_posix(1_341_100_800, 2).unwrap());
        assert_eq!(
            result.minus_posix(3, ClockUnit::Nanoseconds).unwrap(),
            utc(1_278_028_823, 999_999_999, &ls)
        );
    }

    #[test]
    fn until_si_vs_posix_diverge_across_leap() {
        let ls = LeapSecondTable::standard();
        let a = utc(1_278_028_823, 0, &ls);
        let b = utc(1_278_028_826, 0, &ls);
        assert_eq!(a.until(&b, SiUnit::Seconds, &ls).unwrap(), 3);
        assert_eq!(a.until_posix(&b, ClockUnit::Seconds).unwrap(), 2);
        assert_eq!(b.until(&a, SiUnit::Seconds, &ls).unwrap(), -3);
    }

    #[test]
    fn until_counts_only_full_seconds() {
        let ls = LeapSecondTable::standard();
        let a = utc(1_278_028_800, 500_000_000, &ls);
        let b = utc(1_278_028_803, 0, &ls);
        assert_eq!(a.until(&b, SiUnit::Seconds, &ls).unwrap(), 2);
        assert_eq!(b.until(&a, SiUnit::Seconds, &ls).unwrap(), -2);
        assert_eq!(
            a.until(&b, SiUnit::Nanoseconds, &ls).unwrap(),
            2_500_000_000
        );
    }

    #[test]
    fn si_arithmetic_rejected_before_1972() {
        let ls = LeapSecondTable::standard();
        let pre = Moment::of_posix(0, 0).unwrap();
        assert!(matches!(
            pre.plus(1, SiUnit::Seconds, &ls),
            Err(TimeError::Unsupported(_))
        ));
        let post = utc(0, 0, &ls);
        assert!(matches!(
            pre.until(&post, SiUnit::Seconds, &ls),
            Err(TimeError::Unsupported(_))
        ));
        // POSIX units carry no such restriction.
        assert!(pre.plus_posix(1, ClockUnit::Days).is_ok());
    }

    #[test]
    fn ordering_is_total_across_leap() {
        let ls = LeapSecondTable::standard();
        let before = utc(1_278_028_823, 999_999_999, &ls);
        let leap = utc(1_278_028_824, 0, &ls);
        let after = utc(1_278_028_825, 0, &ls);
        assert!(before < leap);
        assert!(leap < after);
        assert!(leap.is_after(&before));
        assert!(leap.is_before(&after));
        assert_eq!(before.posix_time(), leap.posix_time());
    }

    #[test]
    fn simultaneous_masks_leap_when_disabled() {
        let ls = LeapSecondTable::standard();
        let off = LeapSecondTable::disabled();
        let leap = utc(1_278_028_824, 5, &ls);
        let plain = utc(1_278_028_823, 5, &ls);
        assert!(!leap.simultaneous(&plain, &ls));
        assert!(leap.simultaneous(&plain, &off));
    }

    #[test]
    fn construction_errors() {
        let ls = LeapSecondTable::standard();
        assert!(matches!(
            Moment::of(0, 1_000_000_000, TimeScale::Posix, &ls),
            Err(TimeError::InvalidArgument(_))
        ));
        assert!(matches!(
            Moment::of(9, 0, TimeScale::Tai, &ls),
            Err(TimeError::ScaleRange { .. })
        ));
        assert!(matches!(
            Moment::of(-1, 0, TimeScale::Gps, &ls),
            Err(TimeError::ScaleRange { .. })
        ));
        assert!(matches!(
            Moment::of_posix(MAX_LIMIT + 1, 0),
            Err(TimeError::Range(_))
        ));

        let off = LeapSecondTable::disabled();
        assert!(matches!(
            Moment::of(0, 0, TimeScale::Utc, &off),
            Err(TimeError::Config)
        ));
        assert!(Moment::of(0, 0, TimeScale::Posix, &off).is_ok());
    }

    #[test]
    fn degraded_mode_uses_fixed_offsets() {
        let off = LeapSecondTable::disabled();
        let m = Moment::of_posix(POSIX_UTC_DELTA, 0).unwrap();
        assert_eq!(m.elapsed_time(TimeScale::Utc, &off).unwrap(), 0);
        assert_eq!(m.elapsed_time(TimeScale::Tai, &off).unwrap(), 10);
        let gps_epoch = Moment::of_posix(POSIX_GPS_DELTA, 0).unwrap();
        assert_eq!(gps_epoch.elapsed_time(TimeScale::Gps, &off).unwrap(), 0);
    }

    #[test]
    fn transform_decimal_rendering() {
        let ls = LeapSecondTable::standard();
        let m = utc(1_278_028_824, 210, &ls);
        assert_eq!(
            m.transform(TimeScale::Utc, &ls).unwrap(),
            "1278028824.000000210"
        );
        let pre = Moment::of_posix(-1, 500_000_000).unwrap();
        assert_eq!(
            pre.transform(TimeScale::Posix, &ls).unwrap(),
            "-0.500000000"
        );
    }

    #[test]
    fn move_to_leap_second_correction() {
        let ls = LeapSecondTable::standard();
        let edge = Moment::of_posix(1_341_100_799, 0).unwrap();
        let moved = edge.move_to_leap_second(&ls).unwrap();
        assert!(moved.is_leap_second(&ls));
        // A second with no registered event stays put.
        let plain = Moment::of_posix(1_341_100_700, 0).unwrap();
        assert_eq!(plain.move_to_leap_second(&ls).unwrap(), plain);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_struct_roundtrip() {
        let ls = LeapSecondTable::standard();
        let m = utc(1_278_028_824, 123, &ls);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"leap\":true"));
        let back: Moment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        assert!(
            serde_json::from_str::<Moment>("{\"posix\":0,\"nano\":2000000000}").is_err()
        );
    }
}
