// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat orchestration.
//!
//! The [`Orchestrator`] turns a classified [`Intent`] into device mutations
//! and an ordered list of spoken sentences. Every operation follows the same
//! chain: log in, verify the device, decide, mutate, describe the result,
//! log out. The logout runs whatever happens in between.
//!
//! # Examples
//!
//! ```no_run
//! use thermostat_skill::backend::{HttpConfig, HttpMutation, MemoryHoldCoordinator};
//! use thermostat_skill::config::ThermostatConfig;
//! use thermostat_skill::{Intent, Orchestrator};
//!
//! # async fn example() -> thermostat_skill::Result<()> {
//! let sessions = HttpConfig::new("192.168.1.40")
//!     .with_credentials("skill", "secret")
//!     .into_provider()?;
//! let orchestrator = Orchestrator::new(
//!     sessions,
//!     ThermostatConfig::new("hall-thermostat"),
//!     HttpMutation,
//!     MemoryHoldCoordinator::new(),
//! );
//!
//! let response = orchestrator.handle(Intent::TurnUp).await?;
//! println!("{}", response.speech());
//! # Ok(())
//! # }
//! ```

mod away;
mod holding;
mod temperature;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::{
    Clock, HoldCoordinator, MutationStrategy, SessionProvider, SystemClock, ThermostatRegistry,
};
use crate::error::Result;
use crate::response::{Response, Telemetry, ThermostatDetails};
use crate::session::{SessionGuard, verify_device, verify_online};
use crate::speech::{speak_device_time, speak_drift, speak_temperature};
use crate::state::DeviceState;
use crate::types::Elapsed;

/// Allowance subtracted from the measured clock drift, in milliseconds.
const CLOCK_DRIFT_ALLOWANCE_MS: i64 = 120_000;

/// Who asked for the operation.
///
/// Only requests made by a person touch the hold backend; scheduled or
/// automated triggers leave holds alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSource {
    /// A live user.
    #[default]
    User,
    /// Anything else (schedules, routines, other services).
    Automated,
}

impl FromStr for RequestSource {
    type Err = Infallible;

    /// `"user"` (any case) is a user; every other value is automated.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("user") {
            Ok(Self::User)
        } else {
            Ok(Self::Automated)
        }
    }
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Automated => f.write_str("automated"),
        }
    }
}

/// Per-request context supplied by the voice platform adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Origin of the request.
    pub source: RequestSource,
}

impl RequestContext {
    /// Context for a request made by a person.
    #[must_use]
    pub fn user() -> Self {
        Self {
            source: RequestSource::User,
        }
    }

    /// Context for a scheduled or automated request.
    #[must_use]
    pub fn automated() -> Self {
        Self {
            source: RequestSource::Automated,
        }
    }

    /// Returns `true` when a person made the request.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.source == RequestSource::User
    }
}

/// On/off meaning carried by a set-temperature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchMode {
    /// Switching the heating on.
    On,
    /// Switching the heating off.
    Off,
    /// A plain temperature change.
    Keep,
}

/// A fully classified user request.
///
/// # Examples
///
/// ```
/// use thermostat_skill::Intent;
/// use thermostat_skill::types::Elapsed;
///
/// let intent: Intent = serde_json::from_str(r#"{"intent":"turnOn","duration":"PT2H"}"#).unwrap();
/// assert_eq!(intent, Intent::TurnOn { duration: Some(Elapsed::from_hours(2)) });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "camelCase")]
pub enum Intent {
    /// Skill opened; report reachability.
    Launch,
    /// Report temperatures, heating and away mode.
    Status,
    /// Report the device clock and its drift.
    Time,
    /// Describe the endpoint.
    Details,
    /// Raise the target by one degree.
    TurnUp,
    /// Lower the target by one degree.
    TurnDown,
    /// Switch the heating on, optionally for a while.
    TurnOn {
        /// How long to hold the heating on.
        #[serde(default)]
        duration: Option<Elapsed>,
    },
    /// Switch the heating off.
    TurnOff,
    /// Set an explicit target.
    SetTemperature {
        /// Requested target temperature.
        target: f64,
        /// How long to hold the heating on.
        #[serde(default)]
        duration: Option<Elapsed>,
    },
    /// Turn away mode on.
    SetAwayModeOn,
    /// Turn away mode off.
    SetAwayModeOff,
}

/// Orchestrates one thermostat through its collaborators.
///
/// Holds no state between requests. The type parameters are the session
/// provider, registry, mutation strategy, hold coordinator and clock.
#[derive(Debug, Clone)]
pub struct Orchestrator<P, R, M, H, C = SystemClock> {
    sessions: P,
    registry: R,
    mutation: M,
    holds: H,
    clock: C,
    context: RequestContext,
}

impl<P, R, M, H> Orchestrator<P, R, M, H, SystemClock> {
    /// Creates an orchestrator for user requests using the system clock.
    pub fn new(sessions: P, registry: R, mutation: M, holds: H) -> Self {
        Self {
            sessions,
            registry,
            mutation,
            holds,
            clock: SystemClock,
            context: RequestContext::default(),
        }
    }
}

impl<P, R, M, H, C> Orchestrator<P, R, M, H, C> {
    /// Replaces the clock.
    pub fn with_clock<C2>(self, clock: C2) -> Orchestrator<P, R, M, H, C2> {
        Orchestrator {
            sessions: self.sessions,
            registry: self.registry,
            mutation: self.mutation,
            holds: self.holds,
            clock,
            context: self.context,
        }
    }

    /// Sets the request context.
    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Returns the request context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl<P, R, M, H, C> Orchestrator<P, R, M, H, C>
where
    P: SessionProvider,
    R: ThermostatRegistry,
    M: MutationStrategy<P::Session>,
    H: HoldCoordinator,
    C: Clock,
{
    /// Runs the operation named by `intent`.
    ///
    /// # Errors
    ///
    /// See the individual operations.
    pub async fn handle(&self, intent: Intent) -> Result<Response> {
        match intent {
            Intent::Launch => self.launch().await,
            Intent::Status => self.status().await,
            Intent::Time => self.time().await,
            Intent::Details => self.details().await,
            Intent::TurnUp => self.turn_up().await,
            Intent::TurnDown => self.turn_down().await,
            Intent::TurnOn { duration } => self.turn_on(duration).await,
            Intent::TurnOff => self.turn_off().await,
            Intent::SetTemperature { target, duration } => {
                self.set_temperature(target, duration, SwitchMode::Keep)
                    .await
            }
            Intent::SetAwayModeOn => self.set_away_mode_on().await,
            Intent::SetAwayModeOff => self.set_away_mode_off().await,
        }
    }

    /// Reports whether the thermostat is reachable.
    ///
    /// # Errors
    ///
    /// Returns error only if logging in fails.
    pub async fn launch(&self) -> Result<Response> {
        let session = self.login().await?;
        let online = verify_online(&*session).await.is_ok();
        session.release().await;

        Ok(if online {
            Response::new(["Thermostat is online."])
        } else {
            Response::offline()
        })
    }

    /// Describes temperatures, heating, any hold and away mode.
    ///
    /// An unreachable thermostat yields the offline sentence rather than an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns error if logging in or reading the device fails.
    pub async fn status(&self) -> Result<Response> {
        tracing::debug!("Requesting status");
        let session = self.login().await?;
        let result = self.read_status(&session).await;
        session.release().await;
        spoken_if_offline(result)
    }

    async fn read_status(&self, session: &P::Session) -> Result<Response> {
        let device = verify_device(session).await?;

        let mut messages = vec![format!(
            "The current temperature is {} degrees.",
            speak_temperature(device.current_temperature)
        )];
        if !device.is_away() {
            messages.push(format!(
                "The target is {} degrees.",
                speak_temperature(device.target_temperature)
            ));
        }
        messages.push(self.hold_sentence(&device, holding::Qualifier::None).await);
        if device.is_away() {
            messages.push("Away mode is on.".to_string());
        }

        log_status(&device);
        Ok(Response::new(messages).with_telemetry(Telemetry::of(&device)))
    }

    /// Reports the device clock and how far it has drifted.
    ///
    /// # Errors
    ///
    /// Returns error if logging in or reading the device fails.
    pub async fn time(&self) -> Result<Response> {
        tracing::debug!("Requesting time");
        let session = self.login().await?;
        let result = self.read_time(&session).await;
        session.release().await;
        spoken_if_offline(result)
    }

    async fn read_time(&self, session: &P::Session) -> Result<Response> {
        let device = verify_device(session).await?;
        let drift = clock_drift_minutes(&device.time, &self.clock.now());

        let message = format!(
            "The device time is {}, which is {}.",
            speak_device_time(&device.time),
            speak_drift(drift)
        );

        log_status(&device);
        Ok(Response::new([message]).with_telemetry(Telemetry::current_of(&device)))
    }

    /// Describes the endpoint for platform discovery. Opens no session.
    ///
    /// # Errors
    ///
    /// Returns error if the registry cannot supply the thermostat.
    pub async fn details(&self) -> Result<Response> {
        tracing::debug!("Retrieving thermostat details");
        let thermostat = self.registry.obtain_thermostat().await?;
        let descriptor = self.sessions.descriptor();

        Ok(Response::default().with_details(ThermostatDetails {
            friendly_name: descriptor.friendly_name,
            manufacturer_name: descriptor.manufacturer_name,
            description: descriptor.description,
            display_categories: vec!["THERMOSTAT".to_string()],
            endpoint_id: thermostat.guid,
        }))
    }

    async fn login(&self) -> Result<SessionGuard<P::Session>> {
        Ok(SessionGuard::new(self.sessions.login().await?))
    }
}

/// Turns offline failures of a read into the spoken offline response.
fn spoken_if_offline(result: Result<Response>) -> Result<Response> {
    match result {
        Err(e) if e.is_offline() => {
            tracing::debug!(error = %e, "Reporting thermostat as offline");
            Ok(Response::offline())
        }
        other => other,
    }
}

/// Minutes the device clock lags ours, less the fixed allowance.
///
/// Negative when the device clock is ahead.
fn clock_drift_minutes(device_time: &DateTime<FixedOffset>, now: &DateTime<Utc>) -> f64 {
    let lag_ms = now.signed_duration_since(*device_time).num_milliseconds();
    // Safe: clock drift is nowhere near 2^52 milliseconds
    #[allow(clippy::cast_precision_loss)]
    let drift_ms = (lag_ms - CLOCK_DRIFT_ALLOWANCE_MS) as f64;
    drift_ms / 60_000.0
}

fn log_status(device: &DeviceState) {
    tracing::debug!(
        current = device.current_temperature,
        target = device.target_temperature,
        status = %device.status,
        away_mode = %device.away_mode,
        "Thermostat state"
    );
}
