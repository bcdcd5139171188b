// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped session ownership.

use std::ops::Deref;

use crate::backend::Session;
use crate::error::{Error, Result};
use crate::state::DeviceState;

/// Owns a session for the length of one operation.
///
/// Call [`release`](Self::release) when the operation finishes, whatever its
/// outcome. If the guard is dropped first (the operation future was
/// cancelled), the logout is spawned on the current tokio runtime.
pub(crate) struct SessionGuard<S: Session> {
    session: Option<S>,
}

impl<S: Session> SessionGuard<S> {
    pub(crate) fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Logs out. Failures are logged and swallowed.
    pub(crate) async fn release(mut self) {
        if let Some(session) = self.session.take() {
            logout(session).await;
        }
    }
}

impl<S: Session> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.session
            .as_ref()
            .expect("session is present until released")
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("Operation cancelled, logging out in the background");
                handle.spawn(logout(session));
            }
            Err(_) => {
                tracing::warn!("Session dropped outside a runtime, logout skipped");
            }
        }
    }
}

/// Fails with [`Error::DeviceUnreachable`] unless the session is online.
pub(crate) async fn verify_online<S: Session>(session: &S) -> Result<()> {
    if session.online().await {
        Ok(())
    } else {
        tracing::debug!("Thermostat is offline");
        Err(Error::DeviceUnreachable)
    }
}

/// Checks reachability, reads the device and checks it is contactable.
pub(crate) async fn verify_device<S: Session>(session: &S) -> Result<DeviceState> {
    verify_online(session).await?;
    let device = session.device().await?;
    if !device.contactable {
        tracing::debug!("Thermostat is not contactable");
        return Err(Error::DeviceUnresponsive);
    }
    Ok(device)
}

async fn logout<S: Session>(session: S) {
    if let Err(e) = session.logout().await {
        tracing::warn!(error = %e, "Logout failed");
    }
}
