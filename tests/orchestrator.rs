// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Orchestrator behaviour against in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use parking_lot::Mutex;
use thermostat_skill::backend::{
    Clock, DeviceDescriptor, HoldCoordinator, MemoryHoldCoordinator, MutationStrategy, Session,
    SessionProvider,
};
use thermostat_skill::{
    AwayMode, DeviceState, Elapsed, Error, HeatingStatus, HoldIntent, HoldStatus, Intent,
    Orchestrator, ProtocolError, RequestContext, Response, Result, SwitchMode, ThermostatConfig,
};

// ============================================================================
// Fakes
// ============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 15, 10, 0).unwrap()
}

fn device_time(offset_minutes: i64) -> DateTime<FixedOffset> {
    (now() + chrono::Duration::minutes(offset_minutes)).fixed_offset()
}

/// A clock stopped at a fixed instant.
#[derive(Debug, Clone, Copy)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug)]
struct ThermostatState {
    device: DeviceState,
    online: bool,
    fail_login: bool,
    fail_mutation: bool,
    stall_mutation: bool,
    logins: usize,
    logouts: usize,
    mutations: Vec<String>,
}

/// Session provider, session and mutation strategy sharing one device.
#[derive(Debug, Clone)]
struct FakeThermostat(Arc<Mutex<ThermostatState>>);

impl FakeThermostat {
    fn new(current: f64, target: f64, status: HeatingStatus) -> Self {
        Self(Arc::new(Mutex::new(ThermostatState {
            device: DeviceState::new(current, target, status, device_time(0)),
            online: true,
            fail_login: false,
            fail_mutation: false,
            stall_mutation: false,
            logins: 0,
            logouts: 0,
            mutations: Vec::new(),
        })))
    }

    fn away(self) -> Self {
        self.0.lock().device.away_mode = AwayMode::Away;
        self
    }

    fn logins(&self) -> usize {
        self.0.lock().logins
    }

    fn logouts(&self) -> usize {
        self.0.lock().logouts
    }

    fn mutations(&self) -> Vec<String> {
        self.0.lock().mutations.clone()
    }

    fn device(&self) -> DeviceState {
        self.0.lock().device.clone()
    }
}

impl SessionProvider for FakeThermostat {
    type Session = FakeThermostat;

    async fn login(&self) -> Result<FakeThermostat> {
        let mut state = self.0.lock();
        if state.fail_login {
            return Err(ProtocolError::AuthenticationFailed.into());
        }
        state.logins += 1;
        Ok(self.clone())
    }

    fn descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            friendly_name: "Hall".to_string(),
            manufacturer_name: "Acme Heating".to_string(),
            description: "Hall thermostat".to_string(),
        }
    }
}

impl Session for FakeThermostat {
    async fn online(&self) -> bool {
        self.0.lock().online
    }

    async fn device(&self) -> Result<DeviceState> {
        Ok(self.0.lock().device.clone())
    }

    async fn logout(self) -> Result<()> {
        self.0.lock().logouts += 1;
        Ok(())
    }
}

/// Heats whenever the target is above the room temperature.
#[derive(Debug, Clone, Copy)]
struct FakeMutation;

impl FakeMutation {
    async fn stall_if_requested(session: &FakeThermostat) {
        let stall = session.0.lock().stall_mutation;
        if stall {
            std::future::pending::<()>().await;
        }
    }
}

impl MutationStrategy<FakeThermostat> for FakeMutation {
    async fn set_temperature(&self, session: &FakeThermostat, target: f64) -> Result<DeviceState> {
        Self::stall_if_requested(session).await;
        let mut state = session.0.lock();
        if state.fail_mutation {
            return Err(ProtocolError::ConnectionFailed("device rejected change".into()).into());
        }
        state.mutations.push(format!("temperature:{target}"));
        state.device.target_temperature = target;
        state.device.status = HeatingStatus::from(target > state.device.current_temperature);
        Ok(state.device.clone())
    }

    async fn set_away_mode(&self, session: &FakeThermostat, mode: AwayMode) -> Result<DeviceState> {
        let mut state = session.0.lock();
        if state.fail_mutation {
            return Err(ProtocolError::ConnectionFailed("device rejected change".into()).into());
        }
        state.mutations.push(format!("away:{mode}"));
        state.device.away_mode = mode;
        Ok(state.device.clone())
    }
}

#[derive(Debug, Default)]
struct HoldLog {
    running: Option<HoldStatus>,
    broken: bool,
    started: Vec<Elapsed>,
    stopped: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default)]
struct FakeHolds(Arc<Mutex<HoldLog>>);

impl FakeHolds {
    fn running(start: DateTime<Utc>, duration: Elapsed) -> Self {
        let holds = Self::default();
        holds.0.lock().running = Some(HoldStatus::running(start, duration));
        holds
    }

    fn broken() -> Self {
        let holds = Self::default();
        holds.0.lock().broken = true;
        holds
    }

    fn started(&self) -> Vec<Elapsed> {
        self.0.lock().started.clone()
    }

    fn stopped(&self) -> Vec<Option<String>> {
        self.0.lock().stopped.clone()
    }
}

impl HoldCoordinator for FakeHolds {
    async fn status(&self) -> Result<HoldStatus> {
        let log = self.0.lock();
        if log.broken {
            return Err(Error::HoldCoordinatorFailed("scheduler down".into()));
        }
        Ok(log.running.clone().unwrap_or_else(|| HoldStatus::idle(now())))
    }

    async fn hold_if_required_for(&self, duration: Elapsed) -> Result<HoldIntent> {
        let mut log = self.0.lock();
        if log.broken {
            return Err(Error::HoldCoordinatorFailed("scheduler down".into()));
        }
        log.started.push(duration);
        log.running = Some(HoldStatus::running(now(), duration));
        Ok(HoldIntent {
            holding: true,
            duration,
            execution_id: Some("job-2".to_string()),
        })
    }

    async fn stop_hold_if_required(&self, execution_id: Option<&str>) -> Result<()> {
        let mut log = self.0.lock();
        if log.broken {
            return Err(Error::HoldCoordinatorFailed("scheduler down".into()));
        }
        log.stopped.push(execution_id.map(str::to_string));
        log.running = None;
        Ok(())
    }
}

type TestOrchestrator =
    Orchestrator<FakeThermostat, ThermostatConfig, FakeMutation, FakeHolds, FixedClock>;

fn config() -> ThermostatConfig {
    ThermostatConfig::new("hall-thermostat")
        .with_max_on_temp(21.0)
        .with_default_on_temp(20.0)
        .with_default_off_temp(14.0)
        .with_default_duration(Elapsed::from_hours(1))
        .with_execution_id("job-1")
}

fn orchestrator(thermostat: &FakeThermostat, holds: &FakeHolds) -> TestOrchestrator {
    Orchestrator::new(thermostat.clone(), config(), FakeMutation, holds.clone())
        .with_clock(FixedClock(now()))
}

fn messages(response: &Response) -> Vec<&str> {
    response.messages.iter().map(String::as_str).collect()
}

// ============================================================================
// Status, launch, time, details
// ============================================================================

mod reads {
    use super::*;

    #[tokio::test]
    async fn status_at_home_reports_target() {
        let thermostat = FakeThermostat::new(18.5, 20.0, HeatingStatus::On);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).status().await.unwrap();

        assert_eq!(
            messages(&response),
            vec![
                "The current temperature is 18.5 degrees.",
                "The target is 20 degrees.",
                "The heating is on.",
            ]
        );
        let telemetry = response.telemetry.unwrap();
        assert_eq!(telemetry.current_temperature, Some(18.5));
        assert_eq!(telemetry.target_temperature, Some(20.0));
        assert_eq!(thermostat.logouts(), 1);
    }

    #[tokio::test]
    async fn status_while_away_omits_target_and_reports_away_mode() {
        let thermostat = FakeThermostat::new(15.0, 20.0, HeatingStatus::Off).away();
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).status().await.unwrap();

        assert_eq!(
            messages(&response),
            vec![
                "The current temperature is 15 degrees.",
                "The heating is off.",
                "Away mode is on.",
            ]
        );
    }

    #[tokio::test]
    async fn status_reports_time_left_on_running_hold() {
        let thermostat = FakeThermostat::new(18.0, 21.0, HeatingStatus::On);
        let holds = FakeHolds::running(
            now() - chrono::Duration::seconds(20 * 60 + 30),
            Elapsed::from_hours(1),
        );

        let response = orchestrator(&thermostat, &holds).status().await.unwrap();

        assert_eq!(
            response.messages[2],
            "The heating is on and will turn off in 39 minutes."
        );
    }

    #[tokio::test]
    async fn status_survives_hold_coordinator_failure() {
        let thermostat = FakeThermostat::new(18.0, 21.0, HeatingStatus::On);
        let holds = FakeHolds::broken();

        let response = orchestrator(&thermostat, &holds).status().await.unwrap();

        assert_eq!(response.messages[2], "The heating is on.");
    }

    #[tokio::test]
    async fn status_of_offline_device_is_spoken() {
        let thermostat = FakeThermostat::new(18.0, 21.0, HeatingStatus::On);
        thermostat.0.lock().online = false;
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).status().await.unwrap();

        assert_eq!(response, Response::offline());
        assert_eq!(thermostat.logouts(), 1);
    }

    #[tokio::test]
    async fn status_of_uncontactable_device_is_spoken() {
        let thermostat = FakeThermostat::new(18.0, 21.0, HeatingStatus::On);
        thermostat.0.lock().device.contactable = false;
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).status().await.unwrap();

        assert_eq!(response, Response::offline());
        assert_eq!(thermostat.logouts(), 1);
    }

    #[tokio::test]
    async fn launch_reports_reachability() {
        let thermostat = FakeThermostat::new(18.0, 21.0, HeatingStatus::On);
        let holds = FakeHolds::default();
        let orchestrator = orchestrator(&thermostat, &holds);

        let response = orchestrator.launch().await.unwrap();
        assert_eq!(messages(&response), vec!["Thermostat is online."]);

        thermostat.0.lock().online = false;
        let response = orchestrator.launch().await.unwrap();
        assert_eq!(
            messages(&response),
            vec!["Sorry, the thermostat is offline at the moment."]
        );
        assert_eq!(thermostat.logouts(), 2);
        assert!(thermostat.mutations().is_empty());
    }

    #[tokio::test]
    async fn time_reports_drift_beyond_allowance() {
        let thermostat = FakeThermostat::new(18.0, 21.0, HeatingStatus::On);
        thermostat.0.lock().device.time = device_time(-5);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).time().await.unwrap();

        assert_eq!(
            messages(&response),
            vec!["The device time is Monday 3rd June, 3 05 PM, which is 3.0 minutes slow."]
        );
        let telemetry = response.telemetry.unwrap();
        assert_eq!(telemetry.current_temperature, Some(18.0));
        assert_eq!(telemetry.target_temperature, None);
    }

    #[tokio::test]
    async fn time_reports_fast_device_clock() {
        let thermostat = FakeThermostat::new(18.0, 21.0, HeatingStatus::On);
        thermostat.0.lock().device.time = device_time(3);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).time().await.unwrap();

        assert!(response.messages[0].ends_with("which is 5.0 minutes fast."));
    }

    #[tokio::test]
    async fn details_describe_endpoint_without_a_session() {
        let thermostat = FakeThermostat::new(18.0, 21.0, HeatingStatus::On);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).details().await.unwrap();

        let details = response.details.unwrap();
        assert_eq!(details.endpoint_id, "hall-thermostat");
        assert_eq!(details.friendly_name, "Hall");
        assert_eq!(details.manufacturer_name, "Acme Heating");
        assert_eq!(details.display_categories, vec!["THERMOSTAT".to_string()]);
        assert!(response.messages.is_empty());
        assert_eq!(thermostat.logins(), 0);
    }
}

// ============================================================================
// Turn up / turn down
// ============================================================================

mod adjust {
    use super::*;

    #[tokio::test]
    async fn turn_up_raises_target_by_one_degree() {
        let thermostat = FakeThermostat::new(18.0, 18.0, HeatingStatus::On);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).turn_up().await.unwrap();

        assert_eq!(
            messages(&response),
            vec![
                "The target temperature is now 19 degrees.",
                "The heating is still on.",
            ]
        );
        assert_eq!(thermostat.mutations(), vec!["temperature:19"]);
        assert_eq!(response.telemetry.unwrap().target_temperature, Some(19.0));
        assert_eq!(thermostat.logouts(), 1);
    }

    #[tokio::test]
    async fn turn_up_is_limited_to_maximum() {
        let thermostat = FakeThermostat::new(18.0, 20.5, HeatingStatus::On);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).turn_up().await.unwrap();

        assert_eq!(
            messages(&response),
            vec![
                "The maximum temperature is limited to 21 degrees.",
                "The target temperature is now 21 degrees.",
                "The heating is still on.",
            ]
        );
        assert_eq!(thermostat.mutations(), vec!["temperature:21"]);
    }

    #[tokio::test]
    async fn turn_down_can_switch_heating_off() {
        let thermostat = FakeThermostat::new(18.0, 18.5, HeatingStatus::On);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).turn_down().await.unwrap();

        assert_eq!(
            messages(&response),
            vec![
                "The target temperature is now 17.5 degrees.",
                "The heating is now off.",
            ]
        );
    }

    #[tokio::test]
    async fn adjusting_never_touches_holds() {
        let thermostat = FakeThermostat::new(18.0, 18.0, HeatingStatus::On);
        let holds = FakeHolds::default();

        orchestrator(&thermostat, &holds).turn_up().await.unwrap();

        assert!(holds.started().is_empty());
        assert!(holds.stopped().is_empty());
    }
}

// ============================================================================
// Turn on / turn off / set temperature
// ============================================================================

mod set_temperature {
    use super::*;

    #[tokio::test]
    async fn turn_on_sets_default_and_starts_default_hold() {
        let thermostat = FakeThermostat::new(16.0, 14.0, HeatingStatus::Off);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).turn_on(None).await.unwrap();

        assert_eq!(
            messages(&response),
            vec![
                "The target temperature is now 20 degrees.",
                "The heating is now on and will turn off in 1 hour.",
            ]
        );
        assert_eq!(thermostat.mutations(), vec!["temperature:20"]);
        assert_eq!(holds.started(), vec![Elapsed::from_hours(1)]);
        assert!(holds.stopped().is_empty());
    }

    #[tokio::test]
    async fn turn_on_uses_requested_duration() {
        let thermostat = FakeThermostat::new(16.0, 14.0, HeatingStatus::Off);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds)
            .turn_on(Some(Elapsed::from_minutes(90)))
            .await
            .unwrap();

        assert_eq!(holds.started(), vec![Elapsed::from_minutes(90)]);
        assert_eq!(
            response.messages[1],
            "The heating is now on and will turn off in 1 hour and 30 minutes."
        );
    }

    #[tokio::test]
    async fn turn_on_in_warm_room_targets_one_degree_above_it() {
        let thermostat = FakeThermostat::new(20.7, 14.0, HeatingStatus::Off);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).turn_on(None).await.unwrap();

        assert_eq!(thermostat.mutations(), vec!["temperature:21"]);
        assert_eq!(
            response.messages[0],
            "The target temperature is now 21 degrees."
        );
    }

    #[tokio::test]
    async fn room_override_is_still_limited_to_maximum() {
        let thermostat = FakeThermostat::new(21.4, 14.0, HeatingStatus::Off);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).turn_on(None).await.unwrap();

        assert_eq!(
            &response.messages[..2],
            &[
                "The maximum temperature is limited to 21 degrees.".to_string(),
                "The target temperature is now 21 degrees.".to_string(),
            ]
        );
        assert_eq!(thermostat.mutations(), vec!["temperature:21"]);
    }

    #[tokio::test]
    async fn turn_on_while_away_restores_home_first() {
        let thermostat = FakeThermostat::new(16.0, 14.0, HeatingStatus::Off).away();
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds).turn_on(None).await.unwrap();

        assert_eq!(thermostat.mutations(), vec!["away:home", "temperature:20"]);
        assert_eq!(
            messages(&response),
            vec![
                "The target temperature is now 20 degrees.",
                "Away mode is now off.",
                "The heating is now on and will turn off in 1 hour.",
            ]
        );
        assert_eq!(thermostat.device().away_mode, AwayMode::Home);
    }

    #[tokio::test]
    async fn turn_off_cancels_hold_for_configured_execution() {
        let thermostat = FakeThermostat::new(18.0, 20.0, HeatingStatus::On);
        let holds = FakeHolds::running(now(), Elapsed::from_hours(1));

        let response = orchestrator(&thermostat, &holds).turn_off().await.unwrap();

        assert_eq!(
            messages(&response),
            vec![
                "The target temperature is now 14 degrees.",
                "The heating is now off.",
            ]
        );
        assert_eq!(holds.stopped(), vec![Some("job-1".to_string())]);
        assert!(holds.started().is_empty());
    }

    #[tokio::test]
    async fn plain_set_temperature_clamps_and_cancels_hold() {
        let thermostat = FakeThermostat::new(18.0, 19.0, HeatingStatus::On);
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds)
            .set_temperature(30.0, None, SwitchMode::Keep)
            .await
            .unwrap();

        let notices = response
            .messages
            .iter()
            .filter(|m| m.starts_with("The maximum temperature"))
            .count();
        assert_eq!(notices, 1);
        assert_eq!(response.messages[0], "The maximum temperature is limited to 21 degrees.");
        assert_eq!(response.messages[2], "The heating is still on.");
        assert_eq!(holds.stopped(), vec![Some("job-1".to_string())]);
    }

    #[tokio::test]
    async fn plain_set_temperature_below_room_is_not_overridden() {
        let thermostat = FakeThermostat::new(18.0, 19.0, HeatingStatus::On).away();
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds)
            .handle(Intent::SetTemperature {
                target: 16.5,
                duration: None,
            })
            .await
            .unwrap();

        assert_eq!(thermostat.mutations(), vec!["temperature:16.5"]);
        assert_eq!(
            messages(&response),
            vec![
                "The target temperature is now 16.5 degrees.",
                "The heating is now off.",
            ]
        );
    }

    #[tokio::test]
    async fn automated_requests_leave_holds_alone() {
        let thermostat = FakeThermostat::new(16.0, 14.0, HeatingStatus::Off);
        let holds = FakeHolds::default();
        let orchestrator =
            orchestrator(&thermostat, &holds).with_context(RequestContext::automated());

        orchestrator.turn_on(None).await.unwrap();
        orchestrator.turn_off().await.unwrap();

        assert!(holds.started().is_empty());
        assert!(holds.stopped().is_empty());
        assert_eq!(thermostat.mutations(), vec!["temperature:20", "temperature:14"]);
    }

    #[tokio::test]
    async fn hold_failure_does_not_fail_the_request() {
        let thermostat = FakeThermostat::new(16.0, 14.0, HeatingStatus::Off);
        let holds = FakeHolds::broken();

        let response = orchestrator(&thermostat, &holds).turn_on(None).await.unwrap();

        assert_eq!(
            messages(&response),
            vec![
                "The target temperature is now 20 degrees.",
                "The heating is now on.",
            ]
        );
    }
}

// ============================================================================
// Away mode
// ============================================================================

mod away_mode {
    use super::*;

    #[tokio::test]
    async fn away_mode_on_is_idempotent() {
        let thermostat = FakeThermostat::new(18.0, 20.0, HeatingStatus::On).away();
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds)
            .set_away_mode_on()
            .await
            .unwrap();

        assert_eq!(messages(&response), vec!["Away mode is now on."]);
        assert!(response.telemetry.is_none());
    }

    #[tokio::test]
    async fn away_mode_off_reports_home() {
        let thermostat = FakeThermostat::new(18.0, 20.0, HeatingStatus::On).away();
        let holds = FakeHolds::default();

        let response = orchestrator(&thermostat, &holds)
            .handle(Intent::SetAwayModeOff)
            .await
            .unwrap();

        assert_eq!(messages(&response), vec!["Away mode is now off."]);
        assert_eq!(thermostat.mutations(), vec!["away:home"]);
        assert_eq!(thermostat.logouts(), 1);
    }
}

// ============================================================================
// Failures and session handling
// ============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn mutation_on_offline_device_fails_without_mutating() {
        let thermostat = FakeThermostat::new(18.0, 18.0, HeatingStatus::On);
        thermostat.0.lock().online = false;
        let holds = FakeHolds::default();

        let result = orchestrator(&thermostat, &holds).turn_up().await;

        assert!(matches!(result, Err(Error::DeviceUnreachable)));
        assert!(thermostat.mutations().is_empty());
        assert_eq!(thermostat.logouts(), 1);
    }

    #[tokio::test]
    async fn mutation_on_uncontactable_device_fails() {
        let thermostat = FakeThermostat::new(18.0, 18.0, HeatingStatus::On);
        thermostat.0.lock().device.contactable = false;
        let holds = FakeHolds::default();

        let result = orchestrator(&thermostat, &holds).set_away_mode_on().await;

        assert!(matches!(result, Err(Error::DeviceUnresponsive)));
        assert_eq!(thermostat.logouts(), 1);
    }

    #[tokio::test]
    async fn failed_mutation_surfaces_and_still_logs_out() {
        let thermostat = FakeThermostat::new(18.0, 18.0, HeatingStatus::On);
        thermostat.0.lock().fail_mutation = true;
        let holds = FakeHolds::default();

        let result = orchestrator(&thermostat, &holds).turn_on(None).await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::MutationFailed { .. }));
        assert_eq!(err.spoken(), "Sorry, I couldn't change the thermostat settings.");
        assert_eq!(thermostat.logouts(), 1);
        assert!(holds.started().is_empty());
    }

    #[tokio::test]
    async fn failed_login_never_logs_out() {
        let thermostat = FakeThermostat::new(18.0, 18.0, HeatingStatus::On);
        thermostat.0.lock().fail_login = true;
        let holds = FakeHolds::default();

        let result = orchestrator(&thermostat, &holds).status().await;

        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::AuthenticationFailed))
        ));
        assert_eq!(thermostat.logouts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_request_still_logs_out() {
        let thermostat = FakeThermostat::new(18.0, 18.0, HeatingStatus::On);
        thermostat.0.lock().stall_mutation = true;
        let holds = FakeHolds::default();
        let orchestrator = orchestrator(&thermostat, &holds);

        let result = tokio::time::timeout(Duration::from_secs(1), orchestrator.turn_up()).await;
        assert!(result.is_err());

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(thermostat.logins(), 1);
        assert_eq!(thermostat.logouts(), 1);
    }

    #[tokio::test]
    async fn every_operation_logs_out_exactly_once() {
        let thermostat = FakeThermostat::new(18.0, 18.0, HeatingStatus::On);
        let holds = FakeHolds::default();
        let orchestrator = orchestrator(&thermostat, &holds);

        let intents = [
            Intent::Launch,
            Intent::Status,
            Intent::Time,
            Intent::TurnUp,
            Intent::TurnDown,
            Intent::TurnOn { duration: None },
            Intent::TurnOff,
            Intent::SetTemperature {
                target: 19.0,
                duration: None,
            },
            Intent::SetAwayModeOn,
            Intent::SetAwayModeOff,
        ];
        let count = intents.len();
        for intent in intents {
            orchestrator.handle(intent).await.unwrap();
        }

        assert_eq!(thermostat.logins(), count);
        assert_eq!(thermostat.logouts(), count);
    }
}

// ============================================================================
// Shipped hold coordinator
// ============================================================================

mod memory_holds {
    use super::*;

    fn configured() -> ThermostatConfig {
        ThermostatConfig::from_json(
            r#"{
                "guid": "hall-thermostat",
                "maxOnTemp": 21,
                "defaultOnTemp": 20,
                "defaultOffTemp": 14,
                "defaultDuration": "PT1H",
                "executionId": "job-1"
            }"#,
        )
        .unwrap()
    }

    async fn switch_on_then_off(holds: &MemoryHoldCoordinator<FixedClock>) {
        let thermostat = FakeThermostat::new(16.0, 14.0, HeatingStatus::Off);
        let orchestrator =
            Orchestrator::new(thermostat, configured(), FakeMutation, holds.clone())
                .with_clock(FixedClock(now()));

        let on = orchestrator.turn_on(None).await.unwrap();
        assert_eq!(
            on.messages[1],
            "The heating is now on and will turn off in 1 hour."
        );
        assert!(holds.status().await.unwrap().is_running());

        let off = orchestrator.turn_off().await.unwrap();
        assert_eq!(
            messages(&off),
            vec![
                "The target temperature is now 14 degrees.",
                "The heating is now off.",
            ]
        );
    }

    #[tokio::test]
    async fn turn_off_cancels_hold_scheduled_under_configured_job() {
        let holds =
            MemoryHoldCoordinator::with_clock(FixedClock(now())).with_execution_id("job-1");

        switch_on_then_off(&holds).await;

        assert!(!holds.status().await.unwrap().is_running());
        assert!(holds.execution_id().is_none());
    }

    #[tokio::test]
    async fn turn_off_cancels_hold_of_coordinator_without_job() {
        let holds = MemoryHoldCoordinator::with_clock(FixedClock(now()));

        switch_on_then_off(&holds).await;

        assert!(!holds.status().await.unwrap().is_running());
    }

    #[tokio::test]
    async fn hold_scheduled_under_configured_job() {
        let holds =
            MemoryHoldCoordinator::with_clock(FixedClock(now())).with_execution_id("job-1");
        let thermostat = FakeThermostat::new(16.0, 14.0, HeatingStatus::Off);
        let orchestrator = Orchestrator::new(thermostat, configured(), FakeMutation, holds.clone())
            .with_clock(FixedClock(now()));

        orchestrator.turn_on(None).await.unwrap();

        assert_eq!(holds.execution_id().as_deref(), Some("job-1"));
    }
}
