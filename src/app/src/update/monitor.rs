use crux_core::{render::render, Command};

use crate::api::{DeviceCall, Reply};
use crate::commands::timer::TimerOutput;
use crate::events::{Event, MonitorEvent, UiEvent};
use crate::http_helpers::{decode, with_body};
use crate::model::Model;
use crate::reject;
use crate::types::dev::DevPlatformParam;
use crate::types::{Monitor, MonitorState, TransportError, MONITOR_INTERVAL_MS};
use crate::{Effect, TimerCmd};

use super::transport::send;

/// Handle MQTT connection monitor events
pub fn handle(event: MonitorEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        MonitorEvent::Start => start(model),
        MonitorEvent::Stop => stop(model),
        MonitorEvent::TimerElapsed { generation, output } => {
            timer_elapsed(model, generation, output)
        }
    }
}

/// Starts polling unless a monitor is already running
pub fn start(model: &mut Model) -> Command<Effect, Event> {
    if model.monitor.is_running() {
        return Command::done();
    }
    model.monitor.generation += 1;
    let generation = model.monitor.generation;
    log::debug!("mqtt monitor {generation} started");

    Command::all([render(), poll(model, generation)])
}

/// Stops polling and cancels the scheduled poll, if any
pub fn stop(model: &mut Model) -> Command<Effect, Event> {
    let state = std::mem::take(&mut model.monitor.state);
    match state {
        MonitorState::Stopped => Command::done(),
        MonitorState::Polling { generation } => {
            log::debug!("mqtt monitor {generation} stopped while polling");
            render()
        }
        MonitorState::Waiting { generation } => {
            log::debug!("mqtt monitor {generation} stopped");
            Command::all([
                render(),
                TimerCmd::cancel(Monitor::timer_id(generation))
                    .build()
                    .then_send(|_| Event::Ui(UiEvent::Acknowledged)),
            ])
        }
    }
}

fn poll(model: &mut Model, generation: u64) -> Command<Effect, Event> {
    model.monitor.state = MonitorState::Polling { generation };
    send(
        model,
        DeviceCall::GetPlatformParam,
        Reply::MonitorPoll { generation },
    )
}

/// Every poll is followed by the next one, whatever its outcome
pub fn handle_poll_result(
    model: &mut Model,
    generation: u64,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    if model.monitor.state != (MonitorState::Polling { generation }) {
        log::debug!("ignoring poll of stopped monitor {generation}");
        return Command::done();
    }

    match with_body(result, decode::<DevPlatformParam>) {
        Ok(param) => model.mqtt.is_connected = param.mqtt_platform.is_connected,
        Err(e) => log::debug!("mqtt status poll failed: {e}"),
    }

    model.monitor.state = MonitorState::Waiting { generation };
    Command::all([
        render(),
        TimerCmd::start(Monitor::timer_id(generation), MONITOR_INTERVAL_MS)
            .build()
            .then_send(move |output| {
                Event::Monitor(MonitorEvent::TimerElapsed { generation, output })
            }),
    ])
}

fn timer_elapsed(
    model: &mut Model,
    generation: u64,
    output: TimerOutput,
) -> Command<Effect, Event> {
    match output {
        TimerOutput::Cancelled { .. } => Command::done(),
        TimerOutput::Fired { .. }
            if model.monitor.state == (MonitorState::Waiting { generation }) =>
        {
            poll(model, generation)
        }
        TimerOutput::Fired { id } => reject!("timer {id} fired for stopped monitor"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::timer::TimerOperation;
    use crate::update::test_support::{
        effects, fail_effects, in_flight, respond, respond_effects, timers,
    };

    fn fire(model: &mut Model, generation: u64) {
        let _ = handle(
            MonitorEvent::TimerElapsed {
                generation,
                output: TimerOutput::Fired {
                    id: Monitor::timer_id(generation),
                },
            },
            model,
        );
    }

    #[test]
    fn start_is_idempotent() {
        let mut model = Model::default();

        let _ = start(&mut model);
        let _ = start(&mut model);

        assert_eq!(model.monitor.generation, 1);
        assert_eq!(model.transport.issued, 1);
        assert!(model.transport.queue.is_empty());
    }

    #[test]
    fn poll_updates_connection_and_reschedules() {
        let mut model = Model::default();
        let _ = start(&mut model);

        let emitted = respond_effects(
            &mut model,
            r#"{"currentPlatformType":1,"mqttPlatform":{"isConnected":1}}"#,
        );

        assert!(model.mqtt.is_connected);
        assert_eq!(
            model.monitor.state,
            MonitorState::Waiting { generation: 1 }
        );
        assert_eq!(
            timers(&emitted),
            vec![TimerOperation::Start {
                id: Monitor::timer_id(1),
                millis: MONITOR_INTERVAL_MS,
            }]
        );

        fire(&mut model, 1);
        assert_eq!(
            in_flight(&model),
            Some((
                "/network/getPlatformParam",
                Reply::MonitorPoll { generation: 1 }
            ))
        );

        respond(
            &mut model,
            r#"{"currentPlatformType":1,"mqttPlatform":{"isConnected":0}}"#,
        );
        assert!(!model.mqtt.is_connected);
    }

    #[test]
    fn failed_poll_keeps_state_and_reschedules() {
        let mut model = Model::default();
        model.mqtt.is_connected = true;
        let _ = start(&mut model);

        let emitted = fail_effects(&mut model);

        assert_eq!(timers(&emitted).len(), 1);
        assert!(model.mqtt.is_connected);
        assert_eq!(
            model.monitor.state,
            MonitorState::Waiting { generation: 1 }
        );
    }

    #[test]
    fn stop_ignores_late_timer_and_poll() {
        let mut model = Model::default();
        let _ = start(&mut model);
        respond(&mut model, r#"{"mqttPlatform":{"isConnected":1}}"#);

        let _ = handle(MonitorEvent::Stop, &mut model);
        fire(&mut model, 1);

        assert_eq!(model.monitor.state, MonitorState::Stopped);
        assert_eq!(model.transport.issued, 1);
    }

    #[test]
    fn restart_ignores_poll_of_previous_generation() {
        let mut model = Model::default();
        let _ = start(&mut model);
        let _ = stop(&mut model);
        let _ = start(&mut model);

        // the first generation's poll completes while the second one waits behind it
        respond(&mut model, r#"{"mqttPlatform":{"isConnected":1}}"#);
        assert!(!model.mqtt.is_connected);
        assert_eq!(
            model.monitor.state,
            MonitorState::Polling { generation: 2 }
        );

        respond(&mut model, r#"{"mqttPlatform":{"isConnected":1}}"#);
        assert!(model.mqtt.is_connected);
        assert_eq!(
            model.monitor.state,
            MonitorState::Waiting { generation: 2 }
        );
    }

    #[test]
    fn dispose_stops_the_monitor() {
        let mut model = Model::default();
        let _ = start(&mut model);

        let _ = crate::update::update(Event::Dispose, &mut model);

        assert!(!model.monitor.is_running());
    }

    #[test]
    fn dispose_cancels_the_pending_timer() {
        let mut model = Model::default();
        let _ = start(&mut model);
        respond(&mut model, r#"{"mqttPlatform":{"isConnected":1}}"#);

        let emitted = effects(crate::update::update(Event::Dispose, &mut model));

        assert_eq!(
            timers(&emitted),
            vec![TimerOperation::Cancel {
                id: Monitor::timer_id(1)
            }]
        );
        assert_eq!(model.monitor.state, MonitorState::Stopped);
    }
}
