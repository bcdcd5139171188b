// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hold status sentence and hold bookkeeping.

use crate::backend::{Clock, HoldCoordinator};
use crate::config::ThermostatConfig;
use crate::speech::speak_duration;
use crate::state::DeviceState;
use crate::types::Elapsed;

use super::{Orchestrator, SwitchMode};

/// Adverb describing whether the heating status just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Qualifier {
    /// Plain status report.
    None,
    /// The heating status changed during this request.
    Now,
    /// The heating status is unchanged.
    Still,
}

impl Qualifier {
    /// `Now` if the heating status differs between the two states.
    pub(crate) fn between(before: &DeviceState, after: &DeviceState) -> Self {
        if before.status_changed(after) {
            Self::Now
        } else {
            Self::Still
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::None => "The heating is",
            Self::Now => "The heating is now",
            Self::Still => "The heating is still",
        }
    }
}

impl<P, R, M, H, C> Orchestrator<P, R, M, H, C>
where
    H: HoldCoordinator,
    C: Clock,
{
    /// Describes whether the heating is on and, if held, for how long.
    ///
    /// A failing hold backend degrades to the plain "on" sentence.
    pub(crate) async fn hold_sentence(&self, device: &DeviceState, qualifier: Qualifier) -> String {
        let prefix = qualifier.prefix();
        if !device.status.is_on() {
            return format!("{prefix} off.");
        }

        match self.holds.status().await {
            Ok(hold) if hold.is_running() => {
                let time_to_go = hold.time_to_go(&self.clock.now());
                tracing::debug!(remaining = %time_to_go, "Hold is running");
                format!(
                    "{prefix} on and will turn off in {}.",
                    speak_duration(time_to_go)
                )
            }
            Ok(_) => format!("{prefix} on."),
            Err(e) => {
                tracing::warn!(error = %e, "Hold status unavailable");
                format!("{prefix} on.")
            }
        }
    }

    /// Starts or cancels the hold for a user request. Never fails the request.
    pub(crate) async fn update_hold(
        &self,
        mode: SwitchMode,
        duration: Option<Elapsed>,
        thermostat: &ThermostatConfig,
    ) {
        if !self.context.is_user() {
            tracing::debug!(source = %self.context.source, "Leaving hold untouched");
            return;
        }

        if mode == SwitchMode::On {
            let duration = duration.unwrap_or(thermostat.default_duration);
            match self.holds.hold_if_required_for(duration).await {
                Ok(intent) if intent.holding => tracing::debug!(
                    execution_id = ?intent.execution_id,
                    "Holding for {}",
                    speak_duration(intent.duration)
                ),
                Ok(_) => tracing::debug!("Hold not required"),
                Err(e) => tracing::warn!(error = %e, "Failed to start hold"),
            }
        } else if let Err(e) = self
            .holds
            .stop_hold_if_required(thermostat.execution_id.as_deref())
            .await
        {
            tracing::warn!(error = %e, "Failed to stop hold");
        }
    }
}
