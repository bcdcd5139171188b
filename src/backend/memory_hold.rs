// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process hold bookkeeping.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::backend::{Clock, HoldCoordinator, SystemClock};
use crate::error::Result;
use crate::state::{HoldIntent, HoldStatus};
use crate::types::Elapsed;

#[derive(Debug, Clone)]
struct ActiveHold {
    execution_id: String,
    start: DateTime<Utc>,
    duration: Elapsed,
}

/// Hold coordinator that keeps at most one hold in memory.
///
/// A hold reports `running` until its duration has passed. Requesting a new
/// hold while one is running restarts it. Clones share the same hold.
///
/// Built [`with_execution_id`](Self::with_execution_id), every hold runs under
/// that job id and only a stop request naming it (or naming nothing) cancels
/// the hold. Without one, each hold gets a fresh uuid and any stop request
/// cancels it.
///
/// # Examples
///
/// ```
/// use thermostat_skill::backend::{HoldCoordinator, MemoryHoldCoordinator};
/// use thermostat_skill::types::Elapsed;
///
/// # async fn example() -> thermostat_skill::Result<()> {
/// let holds = MemoryHoldCoordinator::new();
/// let intent = holds.hold_if_required_for(Elapsed::from_minutes(30)).await?;
/// assert!(intent.holding);
/// assert!(holds.status().await?.is_running());
///
/// holds.stop_hold_if_required(intent.execution_id.as_deref()).await?;
/// assert!(!holds.status().await?.is_running());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryHoldCoordinator<C: Clock = SystemClock> {
    clock: C,
    job_id: Option<String>,
    active: Arc<Mutex<Option<ActiveHold>>>,
}

impl MemoryHoldCoordinator<SystemClock> {
    /// Creates a coordinator using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryHoldCoordinator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryHoldCoordinator<C> {
    /// Creates a coordinator reading time from `clock`.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            job_id: None,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedules every hold under `execution_id`.
    ///
    /// Use the id configured as
    /// [`ThermostatConfig::execution_id`](crate::ThermostatConfig::execution_id)
    /// so that switching off cancels the hold started by switching on.
    #[must_use]
    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.job_id = Some(execution_id.into());
        self
    }

    /// Returns the execution id of the running hold, if any.
    #[must_use]
    pub fn execution_id(&self) -> Option<String> {
        let now = self.clock.now();
        let mut active = self.active.lock();
        Self::expire(&mut active, &now);
        active.as_ref().map(|hold| hold.execution_id.clone())
    }

    fn expire(active: &mut Option<ActiveHold>, now: &DateTime<Utc>) {
        let finished = active.as_ref().is_some_and(|hold| {
            hold.duration
                .saturating_sub(Elapsed::between(&hold.start, now))
                .is_zero()
        });
        if finished {
            tracing::debug!("Hold has run its course");
            *active = None;
        }
    }
}

impl<C: Clock> HoldCoordinator for MemoryHoldCoordinator<C> {
    async fn status(&self) -> Result<HoldStatus> {
        let now = self.clock.now();
        let mut active = self.active.lock();
        Self::expire(&mut active, &now);
        Ok(match active.as_ref() {
            Some(hold) => HoldStatus::running(hold.start, hold.duration),
            None => HoldStatus::idle(now),
        })
    }

    async fn hold_if_required_for(&self, duration: Elapsed) -> Result<HoldIntent> {
        if duration.is_zero() {
            return Ok(HoldIntent::not_holding(duration));
        }

        let execution_id = self
            .job_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let replaced = self.active.lock().replace(ActiveHold {
            execution_id: execution_id.clone(),
            start: self.clock.now(),
            duration,
        });

        tracing::debug!(
            execution_id = %execution_id,
            duration = %duration,
            extended = replaced.is_some(),
            "Hold scheduled"
        );

        Ok(HoldIntent {
            holding: true,
            duration,
            execution_id: Some(execution_id),
        })
    }

    async fn stop_hold_if_required(&self, execution_id: Option<&str>) -> Result<()> {
        let mut active = self.active.lock();
        let matches = match (active.as_ref(), execution_id) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(hold), Some(id)) => self.job_id.is_none() || hold.execution_id == id,
        };
        if matches {
            tracing::debug!(execution_id = ?execution_id, "Hold cancelled");
            *active = None;
        }
        Ok(())
    }
}
