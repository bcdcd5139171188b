// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborators consumed by the orchestrator.
//!
//! The orchestrator never talks to a device directly. It is generic over the
//! traits in this module:
//!
//! - [`SessionProvider`] / [`Session`]: authenticated session bound to one thermostat
//! - [`MutationStrategy`]: applies target temperature and away mode changes
//! - [`HoldCoordinator`]: tracks timed heating holds
//! - [`ThermostatRegistry`]: supplies the thermostat's limits and defaults
//! - [`Clock`]: source of the current time
//!
//! Concrete implementations shipped with the crate:
//!
//! - [`HttpSessionProvider`] and [`HttpMutation`]: a REST thermostat gateway (feature `http`)
//! - [`MemoryHoldCoordinator`]: in-process hold bookkeeping
//!
//! All futures are `Send` so an in-flight request can be cancelled and still
//! have its session logged out from a spawned task.

#[cfg(feature = "http")]
mod http;
mod memory_hold;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpMutation, HttpSession, HttpSessionProvider};
pub use memory_hold::MemoryHoldCoordinator;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::config::ThermostatConfig;
use crate::error::Result;
use crate::state::{DeviceState, HoldIntent, HoldStatus};
use crate::types::{AwayMode, Elapsed};

/// Static description of the device behind a session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Name shown to the user.
    pub friendly_name: String,
    /// Maker of the thermostat.
    pub manufacturer_name: String,
    /// Free-form description.
    pub description: String,
}

impl Default for DeviceDescriptor {
    fn default() -> Self {
        Self {
            friendly_name: "Thermostat".to_string(),
            manufacturer_name: "Unknown".to_string(),
            description: "Networked heating thermostat".to_string(),
        }
    }
}

/// Opens sessions against one thermostat.
pub trait SessionProvider: Send + Sync {
    /// The session type this provider hands out.
    type Session: Session;

    /// Logs in and returns a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the connection fails.
    fn login(&self) -> impl Future<Output = Result<Self::Session>> + Send;

    /// Describes the device behind this provider.
    fn descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor::default()
    }
}

/// An authenticated session bound to one thermostat.
pub trait Session: Send + Sync + 'static {
    /// Returns `true` if the thermostat is reachable.
    fn online(&self) -> impl Future<Output = bool> + Send;

    /// Reads the current device state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be fetched.
    fn device(&self) -> impl Future<Output = Result<DeviceState>> + Send;

    /// Ends the session. Consumes it, so it runs at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote side rejects the logout.
    fn logout(self) -> impl Future<Output = Result<()>> + Send;
}

/// Applies changes to the thermostat through a session.
pub trait MutationStrategy<S: Session>: Send + Sync {
    /// Sets the target temperature and returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the change.
    fn set_temperature(
        &self,
        session: &S,
        target: f64,
    ) -> impl Future<Output = Result<DeviceState>> + Send;

    /// Sets the away mode and returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the change.
    fn set_away_mode(
        &self,
        session: &S,
        mode: AwayMode,
    ) -> impl Future<Output = Result<DeviceState>> + Send;
}

/// Tracks timed heating holds independently of the thermostat.
pub trait HoldCoordinator: Send + Sync {
    /// Reports whether a hold is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the hold backend cannot be queried.
    fn status(&self) -> impl Future<Output = Result<HoldStatus>> + Send;

    /// Starts a hold, or extends the running one, for `duration`.
    ///
    /// # Errors
    ///
    /// Returns an error if the hold cannot be scheduled.
    fn hold_if_required_for(
        &self,
        duration: Elapsed,
    ) -> impl Future<Output = Result<HoldIntent>> + Send;

    /// Cancels the hold tied to `execution_id`, if one is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the hold backend cannot be reached.
    fn stop_hold_if_required(
        &self,
        execution_id: Option<&str>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Supplies the configuration of the thermostat being controlled.
pub trait ThermostatRegistry: Send + Sync {
    /// Returns the thermostat's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if no
    /// thermostat is configured.
    fn obtain_thermostat(&self) -> impl Future<Output = Result<ThermostatConfig>> + Send;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
