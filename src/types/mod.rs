// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the orchestrator and its collaborators.
//!
//! # Types
//!
//! - [`HeatingStatus`] - On/Off state of the heating
//! - [`AwayMode`] - Home/Away mode of the thermostat
//! - [`HoldState`] - Running/Idle state of a timed hold
//! - [`Elapsed`] - Whole-second, never-negative duration

mod elapsed;
mod status;

pub use elapsed::Elapsed;
pub use status::{AwayMode, HeatingStatus, HoldState};
