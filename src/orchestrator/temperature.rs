// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Target temperature operations.
//!
//! Turning up or down nudges the device's current *target*. Switching on
//! compares against the *current* room temperature instead, so the heating
//! never gets a target colder than the room.

use crate::backend::{Clock, HoldCoordinator, MutationStrategy, SessionProvider, ThermostatRegistry};
use crate::config::ThermostatConfig;
use crate::error::{Error, Result};
use crate::response::{Response, Telemetry};
use crate::session::verify_device;
use crate::speech::speak_temperature;
use crate::state::DeviceState;
use crate::types::{AwayMode, Elapsed};

use super::holding::Qualifier;
use super::{Orchestrator, SwitchMode, log_status};

/// Step applied by turn up / turn down.
const TEMPERATURE_STEP: f64 = 1.0;

impl<P, R, M, H, C> Orchestrator<P, R, M, H, C>
where
    P: SessionProvider,
    R: ThermostatRegistry,
    M: MutationStrategy<P::Session>,
    H: HoldCoordinator,
    C: Clock,
{
    /// Raises the target temperature by one degree.
    ///
    /// # Errors
    ///
    /// Returns error if the device is unreachable or the change fails.
    pub async fn turn_up(&self) -> Result<Response> {
        self.adjust_temperature(TEMPERATURE_STEP).await
    }

    /// Lowers the target temperature by one degree.
    ///
    /// # Errors
    ///
    /// Returns error if the device is unreachable or the change fails.
    pub async fn turn_down(&self) -> Result<Response> {
        self.adjust_temperature(-TEMPERATURE_STEP).await
    }

    /// Switches the heating on at the configured default temperature.
    ///
    /// # Errors
    ///
    /// Returns error if the device is unreachable or the change fails.
    pub async fn turn_on(&self, duration: Option<Elapsed>) -> Result<Response> {
        tracing::debug!("Turning heating on");
        let thermostat = self.registry.obtain_thermostat().await?;
        self.set_temperature(thermostat.default_on_temp, duration, SwitchMode::On)
            .await
    }

    /// Switches the heating off by setting the configured off temperature.
    ///
    /// # Errors
    ///
    /// Returns error if the device is unreachable or the change fails.
    pub async fn turn_off(&self) -> Result<Response> {
        tracing::debug!("Turning heating off");
        let thermostat = self.registry.obtain_thermostat().await?;
        self.set_temperature(thermostat.default_off_temp, None, SwitchMode::Off)
            .await
    }

    /// Sets an absolute target temperature.
    ///
    /// When switching on, a target below the room temperature is raised to
    /// one degree above it and away mode is cancelled first. The target is
    /// always limited to the configured maximum. User requests start or
    /// cancel the hold to match.
    ///
    /// # Errors
    ///
    /// Returns error if the device is unreachable or a mutation fails.
    pub async fn set_temperature(
        &self,
        target: f64,
        duration: Option<Elapsed>,
        mode: SwitchMode,
    ) -> Result<Response> {
        tracing::debug!(requested = target, ?mode, "Setting temperature");
        let session = self.login().await?;
        let result = self.apply_temperature(&session, target, duration, mode).await;
        session.release().await;
        result
    }

    /// Adjusts the target by a signed number of degrees.
    async fn adjust_temperature(&self, delta: f64) -> Result<Response> {
        tracing::debug!(delta, "Adjusting temperature");
        let session = self.login().await?;
        let result = self.apply_delta(&session, delta).await;
        session.release().await;
        result
    }

    async fn apply_delta(&self, session: &P::Session, delta: f64) -> Result<Response> {
        let device = verify_device(session).await?;
        let thermostat = self.registry.obtain_thermostat().await?;
        let mut messages = Vec::new();

        let target = limit_to_max(device.target_temperature + delta, &thermostat, &mut messages);
        let updated = self
            .mutation
            .set_temperature(session, target)
            .await
            .map_err(|e| Error::mutation("set temperature", e))?;
        messages.push(target_message(&updated));

        let qualifier = Qualifier::between(&device, &updated);
        messages.push(self.hold_sentence(&updated, qualifier).await);

        log_status(&device);
        Ok(Response::new(messages).with_telemetry(Telemetry::of(&updated)))
    }

    async fn apply_temperature(
        &self,
        session: &P::Session,
        mut target: f64,
        duration: Option<Elapsed>,
        mode: SwitchMode,
    ) -> Result<Response> {
        let device = verify_device(session).await?;
        let thermostat = self.registry.obtain_thermostat().await?;
        let mut messages = Vec::new();

        if mode == SwitchMode::On && target < device.current_temperature {
            target = device.current_temperature.floor() + 1.0;
            tracing::debug!(adjusted = target, "Raising requested temperature above the room");
        }
        let target = limit_to_max(target, &thermostat, &mut messages);

        let updated = if mode == SwitchMode::On && device.is_away() {
            let home = self
                .mutation
                .set_away_mode(session, AwayMode::Home)
                .await
                .map_err(|e| Error::mutation("cancel away mode", e))?;
            let updated = self
                .mutation
                .set_temperature(session, target)
                .await
                .map_err(|e| Error::mutation("set temperature", e))?;
            messages.push(target_message(&updated));
            messages.push(super::away::away_message(&home));
            updated
        } else {
            let updated = self
                .mutation
                .set_temperature(session, target)
                .await
                .map_err(|e| Error::mutation("set temperature", e))?;
            messages.push(target_message(&updated));
            updated
        };
        log_status(&updated);

        self.update_hold(mode, duration, &thermostat).await;

        let qualifier = Qualifier::between(&device, &updated);
        messages.push(self.hold_sentence(&updated, qualifier).await);

        Ok(Response::new(messages).with_telemetry(Telemetry::of(&updated)))
    }
}

/// Clamps `target` to the configured maximum, noting it in `messages`.
fn limit_to_max(target: f64, thermostat: &ThermostatConfig, messages: &mut Vec<String>) -> f64 {
    if target > thermostat.max_on_temp {
        tracing::debug!(max = thermostat.max_on_temp, "Limiting temperature");
        messages.push(format!(
            "The maximum temperature is limited to {} degrees.",
            speak_temperature(thermostat.max_on_temp)
        ));
        thermostat.max_on_temp
    } else {
        target
    }
}

fn target_message(device: &DeviceState) -> String {
    format!(
        "The target temperature is now {} degrees.",
        speak_temperature(device.target_temperature)
    )
}
