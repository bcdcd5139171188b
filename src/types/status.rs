// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heating, away mode and hold state enums.
//!
//! These are the closed sets of values a thermostat and its hold backend
//! report. Each parses case-insensitively and serializes in lowercase.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Whether the heating is currently running.
///
/// # Examples
///
/// ```
/// use thermostat_skill::types::HeatingStatus;
///
/// assert_eq!(HeatingStatus::On.as_str(), "on");
/// assert_eq!("OFF".parse::<HeatingStatus>().unwrap(), HeatingStatus::Off);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatingStatus {
    /// Heating is on.
    On,
    /// Heating is off.
    Off,
}

impl HeatingStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Returns `true` if the heating is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for HeatingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeatingStatus {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" | "1" | "true" => Ok(Self::On),
            "off" | "0" | "false" => Ok(Self::Off),
            _ => Err(ValueError::InvalidHeatingStatus(s.to_string())),
        }
    }
}

impl From<bool> for HeatingStatus {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Away mode of the thermostat.
///
/// While away, the device ignores its normal target temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AwayMode {
    /// Someone is home; the target temperature applies.
    Home,
    /// Nobody is home.
    Away,
}

impl AwayMode {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }

    /// Returns "on" when away mode is active, "off" otherwise.
    #[must_use]
    pub const fn spoken(&self) -> &'static str {
        match self {
            Self::Away => "on",
            Self::Home => "off",
        }
    }
}

impl fmt::Display for AwayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AwayMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "away" => Ok(Self::Away),
            _ => Err(ValueError::InvalidAwayMode(s.to_string())),
        }
    }
}

/// State of a timed heating hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldState {
    /// A hold is in progress.
    Running,
    /// No hold is in progress.
    #[default]
    Idle,
}

impl HoldState {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for HoldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "idle" => Ok(Self::Idle),
            _ => Err(ValueError::InvalidHoldState(s.to_string())),
        }
    }
}
