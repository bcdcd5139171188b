// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spoken-language rendering of values.
//!
//! Everything the orchestrator says goes through these functions, so the
//! wording of numbers, durations and times stays consistent.
//!
//! # Examples
//!
//! ```
//! use thermostat_skill::speech::{speak_duration, speak_temperature};
//! use thermostat_skill::types::Elapsed;
//!
//! assert_eq!(speak_temperature(20.0), "20");
//! assert_eq!(speak_temperature(20.5), "20.5");
//! assert_eq!(speak_duration(Elapsed::from_secs(5400)), "1 hour and 30 minutes");
//! ```

use chrono::{DateTime, Datelike, TimeZone};

use crate::types::Elapsed;

/// Renders a temperature with no decimals when whole, otherwise one.
#[must_use]
pub fn speak_temperature(temperature: f64) -> String {
    if (temperature - temperature.round()).abs() < f64::EPSILON {
        format!("{temperature:.0}")
    } else {
        format!("{temperature:.1}")
    }
}

/// Renders a duration in the largest sensible units.
///
/// Seconds below a minute, whole minutes below an hour, then hours with
/// any remaining minutes. Seconds are dropped once a minute has passed.
#[must_use]
pub fn speak_duration(duration: Elapsed) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        return plural(secs, "second");
    }
    if secs < 3600 {
        return plural(secs / 60, "minute");
    }

    let hours = plural(secs / 3600, "hour");
    match (secs % 3600) / 60 {
        0 => hours,
        minutes => format!("{hours} and {}", plural(minutes, "minute")),
    }
}

/// Renders a device timestamp, e.g. `Monday 3rd June, 4 05 PM`.
#[must_use]
pub fn speak_device_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let day = time.day();
    format!(
        "{} {day}{} {}, {}",
        time.format("%A"),
        ordinal_suffix(day),
        time.format("%B"),
        time.format("%-I %M %p")
    )
}

/// Renders clock drift in minutes, e.g. `2.5 minutes slow`.
///
/// Negative drift means the device clock is ahead of ours.
#[must_use]
pub fn speak_drift(minutes: f64) -> String {
    let direction = if minutes < 0.0 { "fast" } else { "slow" };
    format!("{:.1} minutes {direction}", minutes.abs())
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
