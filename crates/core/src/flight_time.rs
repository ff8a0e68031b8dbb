//! Wall-clock parsing and the flight-segment time rules.
//!
//! A segment carries four clock readings: out (chocks off), takeoff,
//! landing and in (chocks on). They must be strictly increasing. Air time
//! and block time are derived from them and always recomputed on write.

use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::CoreError;

/// `HH:MM` or `HH:MM:SS`, two digits per field, nothing else.
static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("'{0}' is not HH:MM or HH:MM:SS")]
    Shape(String),

    #[error("'{0}' is not a valid time of day")]
    Range(String),
}

/// Parse `HH:MM` or `HH:MM:SS`. `H:MM` and fractional seconds are rejected.
pub fn parse_clock(raw: &str) -> Result<NaiveTime, ClockError> {
    if !CLOCK_RE.is_match(raw) {
        return Err(ClockError::Shape(raw.to_string()));
    }
    let format = if raw.len() == 5 { "%H:%M" } else { "%H:%M:%S" };
    NaiveTime::parse_from_str(raw, format).map_err(|_| ClockError::Range(raw.to_string()))
}

/// Render as `HH:MM`, or `HH:MM:SS` when seconds are present.
pub fn format_clock(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

// ---------------------------------------------------------------------------
// Segment times
// ---------------------------------------------------------------------------

/// The four validated clock readings of one flight segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentTimes {
    pub out: NaiveTime,
    pub takeoff: NaiveTime,
    pub landing: NaiveTime,
    pub arrival: NaiveTime,
}

impl SegmentTimes {
    /// Parse and check `out < takeoff < landing < in`.
    ///
    /// Parse failures and ordering failures both surface as
    /// [`CoreError::InvalidTimeSequence`]; which one it was is only logged.
    pub fn parse(
        out: &str,
        takeoff: &str,
        landing: &str,
        arrival: &str,
    ) -> Result<Self, CoreError> {
        let parsed = [
            ("out_time", out),
            ("takeoff_time", takeoff),
            ("landing_time", landing),
            ("in_time", arrival),
        ]
        .map(|(field, raw)| {
            parse_clock(raw).map_err(|err| {
                tracing::debug!(field, error = %err, "Unparseable segment time");
                CoreError::InvalidTimeSequence
            })
        });

        let [out, takeoff, landing, arrival] = parsed;
        let times = Self {
            out: out?,
            takeoff: takeoff?,
            landing: landing?,
            arrival: arrival?,
        };
        times.check_order()?;
        Ok(times)
    }

    fn check_order(&self) -> Result<(), CoreError> {
        if self.out < self.takeoff && self.takeoff < self.landing && self.landing < self.arrival {
            return Ok(());
        }
        tracing::debug!(
            out = %self.out,
            takeoff = %self.takeoff,
            landing = %self.landing,
            arrival = %self.arrival,
            "Segment times out of order"
        );
        Err(CoreError::InvalidTimeSequence)
    }

    /// Landing minus takeoff, as a time-of-day value.
    pub fn air_time(&self) -> NaiveTime {
        elapsed(self.takeoff, self.landing)
    }

    /// In minus out, as a time-of-day value.
    pub fn block_time(&self) -> NaiveTime {
        elapsed(self.out, self.arrival)
    }
}

/// Express `to - from` as a clock value. Callers guarantee `from < to`.
fn elapsed(from: NaiveTime, to: NaiveTime) -> NaiveTime {
    let seconds = (to - from).num_seconds().clamp(0, 86_399) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or(NaiveTime::MIN)
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Serialize a [`NaiveTime`] with [`format_clock`]; accept either clock form.
pub mod clock {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_clock(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_clock(&raw).map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`clock`].
pub mod clock_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&format_clock(*t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_clock(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Always `HH:MM:SS`, used for scheduled durations such as a route's
/// estimated flight time.
pub mod hms_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&t.format("%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }
}
