// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Text and binary codecs for [`Moment`].
//!
//! # Canonical text form
//!
//! `yyyy-MM-ddTHH:mm:ss,fffffffffZ` — civil fields in UTC, comma as the
//! decimal separator, always exactly nine fraction digits, trailing `Z`.
//! An inserted leap second renders with second **60**:
//!
//! ```
//! use leapoch::{LeapSecondTable, Moment, TimeScale, format_utc};
//!
//! let ls = LeapSecondTable::standard();
//! let m = Moment::of(1_278_028_824, 210, TimeScale::Utc, &ls).unwrap();
//! assert_eq!(format_utc(&m, &ls), "2012-06-30T23:59:60,000000210Z");
//! ```
//!
//! # Scale-tagged text form
//!
//! `"<SCALE>-" + rendering` with SCALE ∈ {POSIX, UTC, TAI, GPS}. The
//! POSIX/TAI/GPS renderings show the scale-shifted civil timestamp; a
//! second digit 60 can only appear in the UTC rendering.
//!
//! # Binary form
//!
//! One header byte `(type tag << 4) | leap-bit | fraction-bit`, eight
//! big-endian bytes of POSIX seconds, and four big-endian fraction bytes
//! when the fraction bit is set. [`decode`] validates the leap bit against
//! the supplied table — a set bit on a second that the table does not
//! recognize as a registered positive leap event is rejected.

use crate::civil::{self, CivilDate, CivilDateTime};
use crate::error::TimeError;
use crate::instant::{Moment, MAX_LIMIT, MAX_NANO, MIN_LIMIT};
use crate::leap::LeapSecondTable;
use crate::merge::{from_fields, Leniency, ZonalOffset};
use crate::scale::{TimeScale, POSIX_GPS_DELTA, POSIX_UTC_DELTA};
use std::fmt;

/// Wire tag of the instant payload in the binary header.
const TYPE_TAG: u8 = 4;

const LEAP_BIT: u8 = 1;
const FRACTION_BIT: u8 = 2;

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Renders the canonical ISO form in UTC, leap seconds as second 60.
pub fn format_utc(moment: &Moment, ls: &LeapSecondTable) -> String {
    let date = moment.date_utc();
    let tod = moment.posix_time().rem_euclid(civil::SECONDS_PER_DAY);
    let second = (tod % 60) + ls.shift_at(moment.epoch_time(ls)) as i64;
    render_civil(date, tod / 3_600, (tod / 60) % 60, second, moment.nano())
}

/// Renders the scale-tagged form `"<SCALE>-" + timestamp`.
///
/// Fails where the scale is undefined for this instant (TAI before 1972,
/// GPS before 1980-01-06).
pub fn format_scaled(
    moment: &Moment,
    scale: TimeScale,
    ls: &LeapSecondTable,
) -> Result<String, TimeError> {
    let body = match scale {
        TimeScale::Posix => render_posix_like(moment.posix_time(), moment.nano()),
        TimeScale::Utc => format_utc(moment, ls),
        TimeScale::Tai => {
            let shifted = moment
                .elapsed_time(TimeScale::Tai, ls)?
                .checked_add(POSIX_UTC_DELTA)
                .ok_or(TimeError::Overflow)?;
            render_posix_like(shifted, moment.nano())
        }
        TimeScale::Gps => {
            let shifted = moment
                .elapsed_time(TimeScale::Gps, ls)?
                .checked_add(POSIX_GPS_DELTA)
                .ok_or(TimeError::Overflow)?;
            render_posix_like(shifted, moment.nano())
        }
    };
    Ok(format!("{}-{body}", scale.label()))
}

/// Borrowed display adapter for the canonical form.
///
/// `Moment` itself has no `Display`: the rendering depends on the table.
pub struct Canonical<'a> {
    moment: &'a Moment,
    table: &'a LeapSecondTable,
}

impl fmt::Display for Canonical<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_utc(self.moment, self.table))
    }
}

impl Moment {
    /// Canonical ISO rendering, usable wherever `Display` is expected.
    pub fn canonical<'a>(&'a self, ls: &'a LeapSecondTable) -> Canonical<'a> {
        Canonical {
            moment: self,
            table: ls,
        }
    }
}

/// Civil rendering of a raw POSIX-like second count (never a second 60).
fn render_posix_like(secs: i64, nano: u32) -> String {
    let date =
        CivilDate::from_epoch_day_unchecked(secs.div_euclid(civil::SECONDS_PER_DAY));
    let tod = secs.rem_euclid(civil::SECONDS_PER_DAY);
    render_civil(date, tod / 3_600, (tod / 60) % 60, tod % 60, nano)
}

fn render_civil(date: CivilDate, hour: i64, minute: i64, second: i64, nano: u32) -> String {
    format!(
        "{}-{:02}-{:02}T{hour:02}:{minute:02}:{second:02},{nano:09}Z",
        render_year(date.year),
        date.month,
        date.day
    )
}

/// ISO year rendering: four zero-padded digits, a sign outside 0000–9999.
fn render_year(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", -(year as i64))
    } else if year > 9_999 {
        format!("+{year}")
    } else {
        format!("{year:04}")
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses the canonical UTC form.
///
/// A second digit 60 goes through the merger's smart policy, so it is only
/// accepted where the table registers a positive leap event.
pub fn parse_utc(text: &str, ls: &LeapSecondTable) -> Result<Moment, TimeError> {
    let civil = parse_civil(text)?;
    from_fields(&civil, ZonalOffset::UTC, Leniency::Smart, ls)
}

/// Parses the scale-tagged form produced by [`format_scaled`].
pub fn parse_scaled(text: &str, ls: &LeapSecondTable) -> Result<Moment, TimeError> {
    if let Some(rest) = text.strip_prefix("POSIX-") {
        let civil = parse_civil(rest)?;
        Moment::of_posix(civil.to_posix()?, civil.nano)
    } else if let Some(rest) = text.strip_prefix("UTC-") {
        parse_utc(rest, ls)
    } else if let Some(rest) = text.strip_prefix("TAI-") {
        let civil = parse_civil(rest)?;
        let elapsed = civil
            .to_posix()?
            .checked_sub(POSIX_UTC_DELTA)
            .ok_or(TimeError::Overflow)?;
        Moment::of(elapsed, civil.nano, TimeScale::Tai, ls)
    } else if let Some(rest) = text.strip_prefix("GPS-") {
        let civil = parse_civil(rest)?;
        let elapsed = civil
            .to_posix()?
            .checked_sub(POSIX_GPS_DELTA)
            .ok_or(TimeError::Overflow)?;
        Moment::of(elapsed, civil.nano, TimeScale::Gps, ls)
    } else {
        Err(TimeError::Parse(format!("missing scale prefix: {text}")))
    }
}

/// `[±]yyyy-MM-ddTHH:mm:ss[,fffffffff]Z` → civil fields (second ≤ 60).
fn parse_civil(text: &str) -> Result<CivilDateTime, TimeError> {
    let rest = text
        .strip_suffix('Z')
        .ok_or_else(|| TimeError::Parse(format!("missing trailing 'Z': {text}")))?;
    let (date_part, time_part) = rest
        .split_once('T')
        .ok_or_else(|| TimeError::Parse(format!("missing 'T' separator: {text}")))?;

    let (year, month, day) = parse_date(date_part)?;
    let (hour, minute, second, nano) = parse_time(time_part)?;
    CivilDateTime::new(CivilDate::new(year, month, day)?, hour, minute, second, nano)
}

fn parse_date(text: &str) -> Result<(i32, u8, u8), TimeError> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let mut parts = rest.splitn(3, '-');
    let year_digits = parts.next().unwrap_or_default();
    let month_digits = parts.next().unwrap_or_default();
    let day_digits = parts.next().unwrap_or_default();

    if year_digits.len() < 4 {
        return Err(TimeError::Parse(format!("year too short: {text}")));
    }
    let year: i64 = parse_digits(year_digits)?;
    let year = if negative { -year } else { year };
    let year = i32::try_from(year)
        .map_err(|_| TimeError::Parse(format!("year out of range: {text}")))?;
    Ok((
        year,
        parse_two_digits(month_digits)?,
        parse_two_digits(day_digits)?,
    ))
}

fn parse_time(text: &str) -> Result<(u8, u8, u8, u32), TimeError> {
    let (clock, fraction) = match text.find([',', '.']) {
        Some(idx) => (&text[..idx], Some(&text[idx + 1..])),
        None => (text, None),
    };
    let mut parts = clock.splitn(3, ':');
    let hour = parse_two_digits(parts.next().unwrap_or_default())?;
    let minute = parse_two_digits(parts.next().unwrap_or_default())?;
    let second = parse_two_digits(parts.next().unwrap_or_default())?;

    let nano = match fraction {
        None => 0,
        Some(digits) => {
            if digits.is_empty() || digits.len() > 9 {
                return Err(TimeError::Parse(format!(
                    "fraction must have 1 to 9 digits: {text}"
                )));
            }
            let value: i64 = parse_digits(digits)?;
            // Right-pad to nanosecond resolution.
            (value * 10_i64.pow(9 - digits.len() as u32)) as u32
        }
    };
    Ok((hour, minute, second, nano))
}

fn parse_two_digits(text: &str) -> Result<u8, TimeError> {
    if text.len() != 2 {
        return Err(TimeError::Parse(format!("expected two digits: '{text}'")));
    }
    Ok(parse_digits(text)? as u8)
}

fn parse_digits(text: &str) -> Result<i64, TimeError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::Parse(format!("expected digits: '{text}'")));
    }
    text.parse::<i64>()
        .map_err(|_| TimeError::Parse(format!("number too large: '{text}'")))
}

// ---------------------------------------------------------------------------
// Binary codec
// ---------------------------------------------------------------------------

/// Encodes an instant into the compact binary form (9 or 13 bytes).
pub fn encode(moment: &Moment) -> Vec<u8> {
    let mut header = TYPE_TAG << 4;
    if moment.leap_flag() {
        header |= LEAP_BIT;
    }
    let with_fraction = moment.nano() > 0;
    if with_fraction {
        header |= FRACTION_BIT;
    }

    let mut out = Vec::with_capacity(13);
    out.push(header);
    out.extend_from_slice(&moment.posix_time().to_be_bytes());
    if with_fraction {
        out.extend_from_slice(&moment.nano().to_be_bytes());
    }
    out
}

/// Decodes the binary form, validating it against the leap-second table.
///
/// A set leap bit must refer to a registered positive leap event; with a
/// disabled table the bit is taken on trust so that instants survive a
/// round trip between differently configured hosts.
pub fn decode(bytes: &[u8], ls: &LeapSecondTable) -> Result<Moment, TimeError> {
    let header = *bytes
        .first()
        .ok_or_else(|| TimeError::InvalidEncoding("empty payload".into()))?;
    if header >> 4 != TYPE_TAG {
        return Err(TimeError::InvalidEncoding(format!(
            "unexpected type tag: {}",
            header >> 4
        )));
    }
    let leap = header & LEAP_BIT != 0;
    let with_fraction = header & FRACTION_BIT != 0;
    let expected = if with_fraction { 13 } else { 9 };
    if bytes.len() != expected {
        return Err(TimeError::InvalidEncoding(format!(
            "expected {expected} bytes, got {}",
            bytes.len()
        )));
    }

    let mut secs = [0u8; 8];
    secs.copy_from_slice(&bytes[1..9]);
    let posix_time = i64::from_be_bytes(secs);

    let nano = if with_fraction {
        let mut frac = [0u8; 4];
        frac.copy_from_slice(&bytes[9..13]);
        u32::from_be_bytes(frac)
    } else {
        0
    };
    if nano > MAX_NANO {
        return Err(TimeError::InvalidEncoding(format!(
            "fraction out of range: {nano}"
        )));
    }
    if posix_time < MIN_LIMIT || posix_time > MAX_LIMIT {
        return Err(TimeError::Range(posix_time));
    }

    if leap {
        if posix_time == 0 {
            return Err(TimeError::InvalidEncoding(
                "the epoch is no leap second".into(),
            ));
        }
        if posix_time == MIN_LIMIT || posix_time == MAX_LIMIT {
            return Err(TimeError::InvalidEncoding(
                "the range limits are no leap seconds".into(),
            ));
        }
        if ls.is_enabled() && !ls.is_positive_leap(ls.enhance(posix_time) + 1) {
            let date = CivilDate::from_epoch_day_unchecked(
                posix_time.div_euclid(civil::SECONDS_PER_DAY),
            );
            return Err(TimeError::InvalidEncoding(format!(
                "not registered as leap second event: {}-{:02}-{:02}",
                date.year, date.month, date.day
            )));
        }
    }

    Moment::from_raw(posix_time, nano, leap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(elapsed: i64, nano: u32, ls: &LeapSecondTable) -> Moment {
        Moment::of(elapsed, nano, TimeScale::Utc, ls).unwrap()
    }

    #[test]
    fn canonical_leap_rendering() {
        let ls = LeapSecondTable::standard();
        let m = utc(1_278_028_824, 210, &ls);
        assert_eq!(format_utc(&m, &ls), "2012-06-30T23:59:60,000000210Z");
        assert_eq!(
            m.canonical(&ls).to_string(),
            "2012-06-30T23:59:60,000000210Z"
        );
        // One second earlier shows a plain 59.
        let before = utc(1_278_028_823, 0, &ls);
        assert_eq!(format_utc(&before, &ls), "2012-06-30T23:59:59,000000000Z");
    }

    #[test]
    fn scaled_renderings_of_the_leap_second() {
        let ls = LeapSecondTable::standard();
        let m = utc(1_278_028_824, 999_999_999, &ls);
        assert_eq!(
            format_scaled(&m, TimeScale::Posix, &ls).unwrap(),
            "POSIX-2012-06-30T23:59:59,999999999Z"
        );
        assert_eq!(
            format_scaled(&m, TimeScale::Utc, &ls).unwrap(),
            "UTC-2012-06-30T23:59:60,999999999Z"
        );
        assert_eq!(
            format_scaled(&m, TimeScale::Tai, &ls).unwrap(),
            "TAI-2012-07-01T00:00:34,999999999Z"
        );
        assert_eq!(
            format_scaled(&m, TimeScale::Gps, &ls).unwrap(),
            "GPS-2012-07-01T00:00:15,999999999Z"
        );
    }

    #[test]
    fn parse_canonical_roundtrip() {
        let ls = LeapSecondTable::standard();
        for m in [
            utc(1_278_028_824, 210, &ls),
            utc(1_278_028_823, 999_999_999, &ls),
            utc(1_277_942_424, 0, &ls),
            Moment::of_posix(-1, 1).unwrap(),
        ] {
            let text = format_utc(&m, &ls);
            assert_eq!(parse_utc(&text, &ls).unwrap(), m, "{text}");
        }
    }

    #[test]
    fn parse_scaled_roundtrip() {
        let ls = LeapSecondTable::standard();
        let m = utc(1_278_028_824, 999_999_999, &ls);
        for scale in [
            TimeScale::Posix,
            TimeScale::Utc,
            TimeScale::Tai,
            TimeScale::Gps,
        ] {
            let text = format_scaled(&m, scale, &ls).unwrap();
            let parsed = parse_scaled(&text, &ls).unwrap();
            if scale == TimeScale::Posix {
                // POSIX cannot express the inserted second; the reading
                // collapses onto the second it follows.
                assert_eq!(parsed.posix_time(), m.posix_time());
                assert!(!parsed.is_leap_second(&ls));
            } else {
                assert_eq!(parsed, m, "{text}");
            }
        }
    }

    #[test]
    fn parse_rejects_malformed_text() {
        let ls = LeapSecondTable::standard();
        assert!(parse_utc("2012-06-30T23:59:59,0Z", &ls).is_ok());
        assert!(parse_utc("2012-06-30T23:59:59Z", &ls).is_ok());
        assert!(parse_utc("2012-06-30 23:59:59,0Z", &ls).is_err());
        assert!(parse_utc("2012-06-30T23:59:59", &ls).is_err());
        assert!(parse_utc("2012-6-30T23:59:59,0Z", &ls).is_err());
        assert!(parse_utc("12-06-30T23:59:59,0Z", &ls).is_err());
        assert!(parse_utc("2012-06-30T23:59:59,0123456789Z", &ls).is_err());
        assert!(parse_scaled("LORAN-2012-06-30T23:59:59,0Z", &ls).is_err());
        // An unregistered second 60 dies in the merger.
        assert!(parse_utc("2013-06-30T23:59:60,0Z", &ls).is_err());
    }

    #[test]
    fn parse_signed_years() {
        let ls = LeapSecondTable::standard();
        let ancient = Moment::of_posix(-80_000_000_000, 0).unwrap();
        let text = format_utc(&ancient, &ls);
        assert!(text.starts_with('-'));
        assert_eq!(parse_utc(&text, &ls).unwrap(), ancient);

        let far = Moment::of_posix(400_000_000_000, 0).unwrap();
        let text = format_utc(&far, &ls);
        assert!(text.starts_with('+'));
        assert_eq!(parse_utc(&text, &ls).unwrap(), far);
    }

    #[test]
    fn binary_roundtrip() {
        let ls = LeapSecondTable::standard();
        for m in [
            Moment::UNIX_EPOCH,
            utc(1_278_028_824, 0, &ls),
            utc(1_278_028_824, 123_456_789, &ls),
            Moment::of_posix(-1, 999_999_999).unwrap(),
        ] {
            let bytes = encode(&m);
            assert_eq!(bytes.len(), if m.nano() > 0 { 13 } else { 9 });
            assert_eq!(decode(&bytes, &ls).unwrap(), m);
        }
    }

    #[test]
    fn binary_decode_validates_leap_bit() {
        let ls = LeapSecondTable::standard();
        // A leap bit on an ordinary second is inconsistent with the table.
        let plain = Moment::of_posix(1_341_100_700, 0).unwrap();
        let mut bytes = encode(&plain);
        bytes[0] |= 1;
        assert!(matches!(
            decode(&bytes, &ls),
            Err(TimeError::InvalidEncoding(_))
        ));
        // With the table disabled the bit is preserved on trust.
        let off = LeapSecondTable::disabled();
        let trusted = decode(&bytes, &off).unwrap();
        assert_eq!(trusted.posix_time(), 1_341_100_700);

        // The epoch can never be a leap second, table or not.
        let mut epoch = encode(&Moment::UNIX_EPOCH);
        epoch[0] |= 1;
        assert!(decode(&epoch, &off).is_err());
    }

    #[test]
    fn binary_decode_rejects_garbage() {
        let ls = LeapSecondTable::standard();
        assert!(decode(&[], &ls).is_err());
        assert!(decode(&[0x50, 0, 0, 0, 0, 0, 0, 0, 0], &ls).is_err());
        assert!(decode(&[0x40, 0, 0], &ls).is_err());
        let mut bad_nano = encode(&Moment::of_posix(0, 1).unwrap());
        bad_nano[9..13].copy_from_slice(&2_000_000_000u32.to_be_bytes());
        assert!(matches!(
            decode(&bad_nano, &ls),
            Err(TimeError::InvalidEncoding(_))
        ));
    }
}
