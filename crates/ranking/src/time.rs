//! Elapsed-time codec shared by ranking and display.
//!
//! Device readings arrive as `[[HH:]MM:]SS[.fff]` text. Anything that cannot be
//! read as a non-negative duration collapses to [`RaceTime::Unrankable`], which
//! orders after every finished time.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display literal for entries without a usable time.
pub const DNF: &str = "DNF";

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// An elapsed time in milliseconds, or the unrankable sentinel.
///
/// Variant order matters: the derived `Ord` sorts every `Finished` value
/// before `Unrankable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RaceTime {
    Finished(u64),
    Unrankable,
}

impl RaceTime {
    pub fn millis(self) -> Option<u64> {
        match self {
            Self::Finished(ms) => Some(ms),
            Self::Unrankable => None,
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

impl fmt::Display for RaceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(*self))
    }
}

impl FromStr for RaceTime {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse(s))
    }
}

// On the wire the sentinel is `null`.
impl Serialize for RaceTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.millis().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RaceTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map_or(Self::Unrankable, Self::Finished))
    }
}

/// Parses device time text into milliseconds.
///
/// Segments are read right to left as seconds, minutes and hours. Only the
/// seconds segment may carry a fraction; it is rounded to the nearest
/// millisecond. Never fails: bad input yields [`RaceTime::Unrankable`], and so
/// does a zero duration, which has no finish to rank.
pub fn parse(text: &str) -> RaceTime {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(DNF) {
        return RaceTime::Unrankable;
    }

    let segments: Vec<&str> = text.split(':').collect();
    if segments.len() > 3 {
        return RaceTime::Unrankable;
    }

    let units = [MS_PER_SECOND, MS_PER_MINUTE, MS_PER_HOUR];
    let mut total = Decimal::ZERO;

    for (position, (segment, unit)) in segments.iter().rev().zip(units).enumerate() {
        let Some(value) = parse_segment(segment, position == 0) else {
            return RaceTime::Unrankable;
        };
        let Some(next) = value
            .checked_mul(Decimal::from(unit))
            .and_then(|ms| total.checked_add(ms))
        else {
            return RaceTime::Unrankable;
        };
        total = next;
    }

    total
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .filter(|ms| *ms > 0)
        .map_or(RaceTime::Unrankable, RaceTime::Finished)
}

fn parse_segment(segment: &str, allow_fraction: bool) -> Option<Decimal> {
    let segment = segment.trim();
    if segment.is_empty() || segment.starts_with(['-', '+']) {
        return None;
    }

    let value = Decimal::from_str(segment).ok()?;
    if !allow_fraction && !value.fract().is_zero() {
        return None;
    }

    Some(value)
}

/// Formats a time as `MM:SS.mmm`, or `HH:MM:SS.mmm` once hours are non-zero.
/// Zero and the sentinel both render as [`DNF`].
pub fn format(time: RaceTime) -> String {
    let ms = match time {
        RaceTime::Finished(ms) if ms > 0 => ms,
        _ => return DNF.to_string(),
    };

    let hours = ms / MS_PER_HOUR;
    let minutes = ms % MS_PER_HOUR / MS_PER_MINUTE;
    let seconds = ms % MS_PER_MINUTE / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{minutes:02}:{seconds:02}.{millis:03}")
    }
}
