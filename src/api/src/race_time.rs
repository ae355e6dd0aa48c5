//! Race time parsing for leaderboard ordering.
//!
//! Results store finish times as free-form text ("17:12", "1:02:03.5").
//! Sorting those strings lexicographically puts "10:05" ahead of "9:50",
//! so the leaderboard parses them into a duration first.

use std::str::FromStr;
use thiserror::Error;

/// A finish time in hundredths of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RaceTime(u64);

/// Error returned when a time string cannot be read as a duration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized race time: {0:?}")]
pub struct ParseRaceTimeError(String);

#[cfg(test)]
impl RaceTime {
    pub fn hundredths(&self) -> u64 {
        self.0
    }
}

// Nine digits keeps every later multiplication well inside u64.
fn parse_whole(part: &str) -> Option<u64> {
    if part.is_empty() || part.len() > 9 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Parse "ss[.ff]" into hundredths. Extra fractional digits are truncated.
fn parse_seconds(part: &str) -> Option<u64> {
    let (whole, fraction) = match part.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (part, None),
    };

    let mut hundredths = parse_whole(whole)? * 100;

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut digits = fraction.bytes().take(2).map(|b| u64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundreds = digits.next().unwrap_or(0);
        hundredths += tenths * 10 + hundreds;
    }

    Some(hundredths)
}

impl FromStr for RaceTime {
    type Err = ParseRaceTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRaceTimeError(s.to_string());
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();

        let total = match parts.as_slice() {
            [secs] => parse_seconds(secs),
            [mins, secs] => {
                let seconds = parse_seconds(secs).filter(|&v| v < 60 * 100);
                parse_whole(mins).zip(seconds).map(|(m, s)| m * 60 * 100 + s)
            }
            [hours, mins, secs] => {
                let minutes = parse_whole(mins).filter(|&v| v < 60);
                let seconds = parse_seconds(secs).filter(|&v| v < 60 * 100);
                match (parse_whole(hours), minutes, seconds) {
                    (Some(h), Some(m), Some(s)) => Some((h * 3600 + m * 60) * 100 + s),
                    _ => None,
                }
            }
            _ => None,
        };

        total.map(RaceTime).ok_or_else(err)
    }
}

/// Leaderboard sort key, fastest first.
///
/// Parsed times order before unparseable ones; unparseable times fall back
/// to plain string order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeKey {
    Parsed(RaceTime),
    Unparsed(String),
}

impl TimeKey {
    pub fn new(time: &str) -> Self {
        match time.parse::<RaceTime>() {
            Ok(t) => TimeKey::Parsed(t),
            Err(_) => TimeKey::Unparsed(time.to_string()),
        }
    }
}
