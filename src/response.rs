// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Orchestrator responses.
//!
//! Every operation returns a [`Response`]: the sentences to speak, in order,
//! plus optional telemetry for the voice platform's device card.

use serde::{Deserialize, Serialize};

use crate::error::OFFLINE_MESSAGE;
use crate::state::DeviceState;

/// Temperatures reported alongside the spoken messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    /// Measured room temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_temperature: Option<f64>,
    /// Target temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
}

impl Telemetry {
    /// Current and target temperature of `device`.
    #[must_use]
    pub fn of(device: &DeviceState) -> Self {
        Self {
            current_temperature: Some(device.current_temperature),
            target_temperature: Some(device.target_temperature),
        }
    }

    /// Current temperature of `device` only.
    #[must_use]
    pub fn current_of(device: &DeviceState) -> Self {
        Self {
            current_temperature: Some(device.current_temperature),
            target_temperature: None,
        }
    }
}

/// Endpoint description for the voice platform's discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatDetails {
    /// Name shown to the user.
    pub friendly_name: String,
    /// Maker of the thermostat.
    pub manufacturer_name: String,
    /// Free-form description.
    pub description: String,
    /// Platform display categories.
    pub display_categories: Vec<String>,
    /// Endpoint identifier.
    pub endpoint_id: String,
}

/// Result of one orchestrator operation.
///
/// # Examples
///
/// ```
/// use thermostat_skill::Response;
///
/// let response = Response::new(["The heating is on.", "Away mode is on."]);
/// assert_eq!(response.speech(), "The heating is on. Away mode is on.");
/// assert!(response.telemetry.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Sentences in the order they should be spoken.
    pub messages: Vec<String>,
    /// Temperatures read during the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<Telemetry>,
    /// Endpoint description, for the details operation only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ThermostatDetails>,
}

impl Response {
    /// Creates a response from messages.
    pub fn new<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
            telemetry: None,
            details: None,
        }
    }

    /// The response spoken when the thermostat cannot be reached.
    #[must_use]
    pub fn offline() -> Self {
        Self::new([OFFLINE_MESSAGE])
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Attaches endpoint details.
    #[must_use]
    pub fn with_details(mut self, details: ThermostatDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Joins the messages into one utterance.
    #[must_use]
    pub fn speech(&self) -> String {
        self.messages.join(" ")
    }
}
