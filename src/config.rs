// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-thermostat limits and defaults.

use serde::{Deserialize, Serialize};

use crate::backend::ThermostatRegistry;
use crate::error::{Error, ParseError, Result};
use crate::types::Elapsed;

/// Configuration of the thermostat being controlled.
///
/// Owned by the registry; the orchestrator only reads it.
///
/// # Examples
///
/// ```
/// use thermostat_skill::config::ThermostatConfig;
/// use thermostat_skill::types::Elapsed;
///
/// let config = ThermostatConfig::new("hall-thermostat")
///     .with_max_on_temp(22.0)
///     .with_default_duration(Elapsed::from_minutes(45));
/// assert_eq!(config.max_on_temp, 22.0);
///
/// let config = ThermostatConfig::from_json(r#"{
///     "guid": "hall-thermostat",
///     "maxOnTemp": 21,
///     "defaultOnTemp": 20,
///     "defaultOffTemp": 14,
///     "defaultDuration": "PT1H"
/// }"#).unwrap();
/// assert_eq!(config.default_duration, Elapsed::from_hours(1));
/// assert!(config.execution_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatConfig {
    /// Endpoint identifier reported to the voice platform.
    pub guid: String,
    /// Highest target temperature the skill will set.
    pub max_on_temp: f64,
    /// Target used when the heating is switched on.
    pub default_on_temp: f64,
    /// Target used when the heating is switched off.
    pub default_off_temp: f64,
    /// Hold length used when switching on without an explicit duration.
    pub default_duration: Elapsed,
    /// Scheduled job backing the active hold, if any.
    #[serde(default)]
    pub execution_id: Option<String>,
}

impl ThermostatConfig {
    /// Default upper clamp.
    pub const DEFAULT_MAX_ON_TEMP: f64 = 25.0;
    /// Default switch-on target.
    pub const DEFAULT_ON_TEMP: f64 = 20.0;
    /// Default switch-off target.
    pub const DEFAULT_OFF_TEMP: f64 = 14.0;
    /// Default hold length.
    pub const DEFAULT_DURATION: Elapsed = Elapsed::from_hours(1);

    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            max_on_temp: Self::DEFAULT_MAX_ON_TEMP,
            default_on_temp: Self::DEFAULT_ON_TEMP,
            default_off_temp: Self::DEFAULT_OFF_TEMP,
            default_duration: Self::DEFAULT_DURATION,
            execution_id: None,
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON and
    /// [`Error::Configuration`] when the limits contradict each other.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ParseError::Json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the defaults lie within the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.guid.trim().is_empty() {
            return Err(Error::Configuration("guid must not be empty".to_string()));
        }
        if self.default_on_temp > self.max_on_temp {
            return Err(Error::Configuration(format!(
                "defaultOnTemp {} exceeds maxOnTemp {}",
                self.default_on_temp, self.max_on_temp
            )));
        }
        if self.default_off_temp > self.default_on_temp {
            return Err(Error::Configuration(format!(
                "defaultOffTemp {} exceeds defaultOnTemp {}",
                self.default_off_temp, self.default_on_temp
            )));
        }
        Ok(())
    }

    /// Sets the upper clamp.
    #[must_use]
    pub fn with_max_on_temp(mut self, max_on_temp: f64) -> Self {
        self.max_on_temp = max_on_temp;
        self
    }

    /// Sets the switch-on target.
    #[must_use]
    pub fn with_default_on_temp(mut self, temp: f64) -> Self {
        self.default_on_temp = temp;
        self
    }

    /// Sets the switch-off target.
    #[must_use]
    pub fn with_default_off_temp(mut self, temp: f64) -> Self {
        self.default_off_temp = temp;
        self
    }

    /// Sets the default hold length.
    #[must_use]
    pub fn with_default_duration(mut self, duration: Elapsed) -> Self {
        self.default_duration = duration;
        self
    }

    /// Sets the execution id of the active hold.
    #[must_use]
    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }
}

/// A single configured thermostat is its own registry.
impl ThermostatRegistry for ThermostatConfig {
    async fn obtain_thermostat(&self) -> Result<ThermostatConfig> {
        Ok(self.clone())
    }
}
