// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat state as reported by the device.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::types::{AwayMode, HeatingStatus};

/// Snapshot of a thermostat, fetched fresh on every request.
///
/// Temperatures are in device units. `current_temperature` is a reading;
/// only `target_temperature` and `away_mode` are ever written.
///
/// # Examples
///
/// ```
/// use thermostat_skill::state::DeviceState;
/// use thermostat_skill::types::{AwayMode, HeatingStatus};
///
/// let json = r#"{
///     "currentTemperature": 18.5,
///     "targetTemperature": 20,
///     "status": "on",
///     "awayMode": "home",
///     "time": "2024-06-03T16:05:00+01:00"
/// }"#;
/// let device: DeviceState = serde_json::from_str(json).unwrap();
/// assert_eq!(device.status, HeatingStatus::On);
/// assert_eq!(device.away_mode, AwayMode::Home);
/// assert!(device.contactable);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Measured room temperature.
    pub current_temperature: f64,
    /// Temperature the device is heating towards.
    pub target_temperature: f64,
    /// Whether the heating is running.
    pub status: HeatingStatus,
    /// Home or away.
    pub away_mode: AwayMode,
    /// Device clock at the time of the read.
    pub time: DateTime<FixedOffset>,
    /// Whether the gateway could reach the device itself.
    #[serde(default = "contactable_default")]
    pub contactable: bool,
}

fn contactable_default() -> bool {
    true
}

impl DeviceState {
    /// Creates a contactable, at-home device state.
    #[must_use]
    pub fn new(
        current_temperature: f64,
        target_temperature: f64,
        status: HeatingStatus,
        time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            current_temperature,
            target_temperature,
            status,
            away_mode: AwayMode::Home,
            time,
            contactable: true,
        }
    }

    /// Sets the away mode.
    #[must_use]
    pub fn with_away_mode(mut self, away_mode: AwayMode) -> Self {
        self.away_mode = away_mode;
        self
    }

    /// Returns `true` if the device is in away mode.
    #[must_use]
    pub fn is_away(&self) -> bool {
        self.away_mode == AwayMode::Away
    }

    /// Returns `true` if the heating status differs from `other`.
    #[must_use]
    pub fn status_changed(&self, other: &DeviceState) -> bool {
        self.status != other.status
    }
}
