// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Away mode operations.

use crate::backend::{Clock, HoldCoordinator, MutationStrategy, SessionProvider, ThermostatRegistry};
use crate::error::{Error, Result};
use crate::response::Response;
use crate::session::verify_device;
use crate::state::DeviceState;
use crate::types::AwayMode;

use super::{Orchestrator, log_status};

impl<P, R, M, H, C> Orchestrator<P, R, M, H, C>
where
    P: SessionProvider,
    R: ThermostatRegistry,
    M: MutationStrategy<P::Session>,
    H: HoldCoordinator,
    C: Clock,
{
    /// Turns away mode on.
    ///
    /// # Errors
    ///
    /// Returns error if the device is unreachable or the change fails.
    pub async fn set_away_mode_on(&self) -> Result<Response> {
        tracing::debug!("Turning away mode on");
        self.set_away_mode(AwayMode::Away).await
    }

    /// Turns away mode off.
    ///
    /// # Errors
    ///
    /// Returns error if the device is unreachable or the change fails.
    pub async fn set_away_mode_off(&self) -> Result<Response> {
        tracing::debug!("Turning away mode off");
        self.set_away_mode(AwayMode::Home).await
    }

    /// Applies `mode` and reports the mode the device ended up in.
    ///
    /// # Errors
    ///
    /// Returns error if the device is unreachable or the change fails.
    pub async fn set_away_mode(&self, mode: AwayMode) -> Result<Response> {
        tracing::debug!(%mode, "Setting away mode");
        let session = self.login().await?;
        let result = self.apply_away_mode(&session, mode).await;
        session.release().await;
        result
    }

    async fn apply_away_mode(&self, session: &P::Session, mode: AwayMode) -> Result<Response> {
        verify_device(session).await?;
        let updated = self
            .mutation
            .set_away_mode(session, mode)
            .await
            .map_err(|e| Error::mutation("set away mode", e))?;

        log_status(&updated);
        Ok(Response::new([away_message(&updated)]))
    }
}

pub(super) fn away_message(device: &DeviceState) -> String {
    format!("Away mode is now {}.", device.away_mode.spoken())
}
