// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timed heating hold reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Elapsed, HoldState};

/// Status of the hold backend at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldStatus {
    /// Whether a hold is in progress.
    pub status: HoldState,
    /// When the hold started.
    pub start_date: DateTime<Utc>,
    /// Total length of the hold.
    pub duration: Elapsed,
}

impl HoldStatus {
    /// A status reporting no hold.
    #[must_use]
    pub fn idle(now: DateTime<Utc>) -> Self {
        Self {
            status: HoldState::Idle,
            start_date: now,
            duration: Elapsed::ZERO,
        }
    }

    /// A running hold started at `start_date`.
    #[must_use]
    pub fn running(start_date: DateTime<Utc>, duration: Elapsed) -> Self {
        Self {
            status: HoldState::Running,
            start_date,
            duration,
        }
    }

    /// Returns `true` if a hold is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == HoldState::Running
    }

    /// Time left before the hold ends, never negative.
    ///
    /// Elapsed time is truncated to whole seconds before subtracting.
    #[must_use]
    pub fn time_to_go(&self, now: &DateTime<Utc>) -> Elapsed {
        self.duration
            .saturating_sub(Elapsed::between(&self.start_date, now))
    }
}

/// Outcome of asking the hold backend to hold the heating on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldIntent {
    /// Whether a hold is now in place.
    pub holding: bool,
    /// Requested length.
    pub duration: Elapsed,
    /// Identifier of the scheduled job backing the hold.
    pub execution_id: Option<String>,
}

impl HoldIntent {
    /// The backend declined to hold.
    #[must_use]
    pub fn not_holding(duration: Elapsed) -> Self {
        Self {
            holding: false,
            duration,
            execution_id: None,
        }
    }
}
