// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat Skill - voice-assistant backend for a networked thermostat.
//!
//! This library turns classified voice intents ("turn up", "set the
//! temperature to 21", "turn away mode on") into thermostat mutations and
//! short spoken status sentences.
//!
//! # Supported Intents
//!
//! - **Status**: current and target temperature, heating, hold and away mode
//! - **Temperature**: turn up/down by a degree, set an absolute target
//! - **Heating**: switch on (optionally for a while) or off
//! - **Away mode**: on/off
//! - **Diagnostics**: reachability, device clock drift, endpoint details
//!
//! # Architecture
//!
//! The [`Orchestrator`] holds no state of its own. It is generic over the
//! collaborators in [`backend`]: a session provider bound to the thermostat,
//! a mutation strategy, a hold coordinator, a registry supplying the
//! thermostat's limits, and a clock. Each operation opens one session and
//! always closes it again, even when the operation fails or is cancelled.
//!
//! # Quick Start
//!
//! ```no_run
//! use thermostat_skill::backend::{HttpConfig, HttpMutation, MemoryHoldCoordinator};
//! use thermostat_skill::config::ThermostatConfig;
//! use thermostat_skill::{Intent, Orchestrator, RequestContext};
//!
//! #[tokio::main]
//! async fn main() -> thermostat_skill::Result<()> {
//!     let sessions = HttpConfig::new("192.168.1.40")
//!         .with_credentials("skill", "secret")
//!         .into_provider()?;
//!
//!     let orchestrator = Orchestrator::new(
//!         sessions,
//!         ThermostatConfig::new("hall-thermostat").with_max_on_temp(22.0),
//!         HttpMutation,
//!         MemoryHoldCoordinator::new(),
//!     )
//!     .with_context(RequestContext::user());
//!
//!     let response = orchestrator.handle(Intent::Status).await?;
//!     println!("{}", response.speech());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
mod orchestrator;
pub mod response;
mod session;
pub mod speech;
pub mod state;
pub mod types;

pub use config::ThermostatConfig;
pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
pub use orchestrator::{Intent, Orchestrator, RequestContext, RequestSource, SwitchMode};
pub use response::{Response, Telemetry, ThermostatDetails};
pub use state::{DeviceState, HoldIntent, HoldStatus};
pub use types::{AwayMode, Elapsed, HeatingStatus, HoldState};
