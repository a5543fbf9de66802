// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types for instant construction, scale conversion and arithmetic.

use crate::scale::TimeScale;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from instant construction, conversion, arithmetic or codecs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimeError {
    /// Malformed input value (nanosecond or field value out of range,
    /// invalid civil date, unverifiable leap-second marker, ...).
    InvalidArgument(String),
    /// POSIX seconds outside the supported range beyond year ±999,999,999.
    Range(i64),
    /// Operation undefined in this context (e.g. SI arithmetic before 1972).
    Unsupported(&'static str),
    /// The instant lies before the given scale's first representable epoch.
    ScaleRange { scale: TimeScale, elapsed: i64 },
    /// Leap-second support is disabled but required by the operation.
    Config,
    /// Semantically invalid local time (lands on a skipped leap second).
    Chrono(String),
    /// 64-bit integer arithmetic overflow.
    Overflow,
    /// Binary payload malformed or inconsistent with the leap-second table.
    InvalidEncoding(String),
    /// Text form does not match the expected layout.
    Parse(String),
}

impl Display for TimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Range(secs) => {
                write!(f, "POSIX time out of supported range: {secs}")
            }
            Self::Unsupported(msg) => write!(f, "{msg}"),
            Self::ScaleRange { scale, elapsed } => {
                write!(f, "{scale} not supported at elapsed time {elapsed}")
            }
            Self::Config => {
                write!(f, "leap seconds are not supported by configuration")
            }
            Self::Chrono(msg) => write!(f, "invalid local timestamp: {msg}"),
            Self::Overflow => write!(f, "64-bit arithmetic overflow"),
            Self::InvalidEncoding(msg) => write!(f, "invalid encoding: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl Error for TimeError {}
