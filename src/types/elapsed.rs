// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-second elapsed time.
//!
//! Hold durations and remaining times are tracked as whole seconds. The type
//! never goes negative: subtraction saturates at zero.
//!
//! Voice platforms deliver durations in ISO 8601 form (`PT1H30M`), which
//! [`Elapsed`] parses directly.
//!
//! # Examples
//!
//! ```
//! use thermostat_skill::types::Elapsed;
//!
//! let hold: Elapsed = "PT1H30M".parse().unwrap();
//! assert_eq!(hold.as_secs(), 5400);
//!
//! let gone = Elapsed::from_minutes(100);
//! assert_eq!(hold.saturating_sub(gone), Elapsed::ZERO);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValueError;

/// A non-negative span of time with one-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Elapsed(u64);

impl Elapsed {
    /// Zero seconds.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Creates a duration from minutes.
    #[must_use]
    pub const fn from_minutes(minutes: u64) -> Self {
        Self(minutes.saturating_mul(60))
    }

    /// Creates a duration from hours.
    #[must_use]
    pub const fn from_hours(hours: u64) -> Self {
        Self(hours.saturating_mul(3600))
    }

    /// Time between `start` and `now`, truncated to whole seconds.
    ///
    /// Returns [`Elapsed::ZERO`] when `start` lies in the future.
    #[must_use]
    pub fn between<A: TimeZone, B: TimeZone>(start: &DateTime<A>, now: &DateTime<B>) -> Self {
        let secs = now
            .clone()
            .signed_duration_since(start.clone())
            .num_seconds();
        Self(u64::try_from(secs).unwrap_or(0))
    }

    /// Returns the number of whole seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns `true` for a zero-length duration.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts `other`, stopping at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Formats as an ISO 8601 duration (e.g. `PT1H30M`).
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        if self.0 == 0 {
            return "PT0S".to_string();
        }
        let days = self.0 / 86_400;
        let hours = (self.0 % 86_400) / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;

        let mut out = String::from("P");
        if days > 0 {
            out.push_str(&format!("{days}D"));
        }
        if hours > 0 || minutes > 0 || seconds > 0 {
            out.push('T');
            if hours > 0 {
                out.push_str(&format!("{hours}H"));
            }
            if minutes > 0 {
                out.push_str(&format!("{minutes}M"));
            }
            if seconds > 0 {
                out.push_str(&format!("{seconds}S"));
            }
        }
        out
    }
}

impl From<Duration> for Elapsed {
    fn from(value: Duration) -> Self {
        Self(value.as_secs())
    }
}

impl From<Elapsed> for Duration {
    fn from(value: Elapsed) -> Self {
        Duration::from_secs(value.0)
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl FromStr for Elapsed {
    type Err = ValueError;

    /// Parses `P[nW][nD][T[nH][nM][nS]]`. Fractional seconds are truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidDuration(s.to_string());
        let trimmed = s.trim().to_uppercase();
        let body = trimmed.strip_prefix('P').ok_or_else(invalid)?;
        if body.is_empty() {
            return Err(invalid());
        }

        let mut total: u64 = 0;
        let mut in_time = false;
        let mut number = String::new();
        let mut seen_component = false;

        for c in body.chars() {
            match c {
                '0'..='9' | '.' => number.push(c),
                'T' if !in_time && number.is_empty() => in_time = true,
                unit => {
                    if number.is_empty() {
                        return Err(invalid());
                    }
                    let multiplier = match (in_time, unit) {
                        (false, 'W') => 604_800,
                        (false, 'D') => 86_400,
                        (true, 'H') => 3600,
                        (true, 'M') => 60,
                        (true, 'S') => 1,
                        _ => return Err(invalid()),
                    };
                    let value = if unit == 'S' {
                        let whole = number.split('.').next().unwrap_or_default();
                        whole.parse::<u64>().map_err(|_| invalid())?
                    } else {
                        number.parse::<u64>().map_err(|_| invalid())?
                    };
                    total = total.saturating_add(value.saturating_mul(multiplier));
                    number.clear();
                    seen_component = true;
                }
            }
        }

        if !number.is_empty() || !seen_component {
            return Err(invalid());
        }
        Ok(Self(total))
    }
}

impl<'de> Deserialize<'de> for Elapsed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Seconds(u64),
            Iso(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Seconds(secs) => Ok(Self(secs)),
            Repr::Iso(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
