// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device and hold state types.
//!
//! Both are read fresh on every request and discarded afterwards; the
//! thermostat and the hold backend are the only state of record.

mod device_state;
mod hold;

pub use device_state::DeviceState;
pub use hold::{HoldIntent, HoldStatus};
