use crux_core::{render::render, Command};

use crate::api::{DeviceCall, Reply};
use crate::events::Event;
use crate::http_helpers::{decode, json_document, result_code};
use crate::messages;
use crate::model::Model;
use crate::reject;
use crate::types::dev::{DevDeviceInfo, DevPlatformParam, DevTime, RESULT_OK};
use crate::types::{BootstrapPhase, BootstrapStep, ClientError, ScanState, TransportError};
use crate::Effect;

use super::transport::send;
use super::{credentials, monitor, wlan};

/// Starts the startup chain. Runs once; later calls are ignored.
pub fn initialize(model: &mut Model, time_zone: String, timestamp: u64) -> Command<Effect, Event> {
    if model.bootstrap.phase != BootstrapPhase::NotStarted {
        return reject!("initialize: bootstrap already {:?}", model.bootstrap.phase);
    }
    model.bootstrap.time_zone = time_zone;
    model.bootstrap.timestamp = timestamp;
    model.start_loading();

    run_step(model, BootstrapStep::FIRST)
}

fn run_step(model: &mut Model, step: BootstrapStep) -> Command<Effect, Event> {
    log::debug!("bootstrap: {step:?}");
    model.bootstrap.phase = BootstrapPhase::Running { step };

    let call = match step {
        BootstrapStep::SyncTime => DeviceCall::SetDevTime(DevTime {
            tz: model.bootstrap.time_zone.clone(),
            ts: model.bootstrap.timestamp,
        }),
        BootstrapStep::DeviceInfo => DeviceCall::GetDevInfo,
        BootstrapStep::LightParam => DeviceCall::GetLightParam,
        BootstrapStep::CamParam => DeviceCall::GetCamParam,
        BootstrapStep::CaptureParam => DeviceCall::GetCapParam,
        BootstrapStep::UploadParam => DeviceCall::GetUploadParam,
        BootstrapStep::DataReport => DeviceCall::GetPlatformParam,
        BootstrapStep::CellularParam => DeviceCall::GetCellularParam,
        BootstrapStep::CellularStatus => DeviceCall::GetCellularStatus,
        BootstrapStep::WifiList => {
            model.wlan.scan = ScanState::Scanning;
            model.wlan.networks.clear();
            DeviceCall::GetWifiList
        }
        BootstrapStep::WifiParam => DeviceCall::GetWifiParam,
    };

    Command::all([render(), send(model, call, Reply::Bootstrap(step))])
}

/// Applies a step's reply and moves on; any failure ends the chain where it is.
pub fn handle_step_result(
    model: &mut Model,
    step: BootstrapStep,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    if model.bootstrap.current_step() != Some(step) {
        log::warn!("bootstrap: reply for {step:?} while {:?}", model.bootstrap.phase);
        return Command::done();
    }

    if let Err(e) = apply_step(model, step, result) {
        log::error!("bootstrap aborted at {step:?}: {e}");
        model.bootstrap.phase = BootstrapPhase::Failed {
            step,
            error: e.to_string(),
        };
        model.wlan.scan = ScanState::Idle;
        return model.set_error_and_render(messages::BOOTSTRAP_FAILED);
    }
    model.bootstrap.completed.push(step);

    match step.next(model.network_mode()) {
        Some(next) => run_step(model, next),
        None => {
            log::info!("bootstrap completed");
            model.bootstrap.phase = BootstrapPhase::Completed;
            model.stop_loading();
            Command::all([render(), monitor::start(model)])
        }
    }
}

fn apply_step(
    model: &mut Model,
    step: BootstrapStep,
    result: Result<Vec<u8>, TransportError>,
) -> Result<(), ClientError> {
    let body = result?;

    match step {
        BootstrapStep::SyncTime => {
            // the clock is best effort; only an unreachable device stops the chain
            let code = result_code(&body)?;
            if code != RESULT_OK {
                log::warn!("device rejected time sync with {code}");
            }
        }
        BootstrapStep::DeviceInfo => {
            let info: DevDeviceInfo = decode(&body)?;
            model.device_info = Some(info.into());
        }
        BootstrapStep::LightParam => model.settings.light = Some(json_document(&body)?),
        BootstrapStep::CamParam => model.settings.cam = Some(json_document(&body)?),
        BootstrapStep::CaptureParam => model.settings.capture = Some(json_document(&body)?),
        BootstrapStep::UploadParam => model.settings.upload = Some(json_document(&body)?),
        BootstrapStep::DataReport => {
            let param: DevPlatformParam = decode(&body)?;
            model.mqtt.is_connected = param.mqtt_platform.is_connected;
            credentials::sync_slot_names(model, &param.mqtt_platform);
            model.mqtt.config = param.mqtt_platform.into();
        }
        BootstrapStep::CellularParam => model.settings.cellular = Some(json_document(&body)?),
        BootstrapStep::CellularStatus => {
            model.settings.cellular_status = Some(json_document(&body)?)
        }
        BootstrapStep::WifiList => wlan::apply_list(model, decode(&body)?),
        BootstrapStep::WifiParam => wlan::apply_last_connection(model, decode(&body)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MonitorState, NetworkMode, WlanPhase};
    use crate::update::test_support::{fail, in_flight, respond};

    fn device_info(netmod: &str) -> String {
        format!(
            r#"{{"name":"cam","mac":"aa:bb","sn":"1","hardVersion":"1","softVersion":"2","model":"X","countryCode":"EU","netmod":"{netmod}","camera":"ov"}}"#
        )
    }

    /// Answers every bootstrap step until the chain stops, returning the endpoints hit
    fn run_chain(model: &mut Model, netmod: &str) -> Vec<&'static str> {
        let _ = initialize(model, "CST-8".to_string(), 1_700_000_000);
        let mut endpoints = Vec::new();

        while let Some((endpoint, Reply::Bootstrap(step))) = in_flight(model) {
            endpoints.push(endpoint);
            let body = match step {
                BootstrapStep::SyncTime => r#"{"result":1000}"#.to_string(),
                BootstrapStep::DeviceInfo => device_info(netmod),
                BootstrapStep::DataReport => {
                    r#"{"currentPlatformType":1,"mqttPlatform":{"host":"broker","mqttPort":1883,"topic":"t","isConnected":1,"caName":"ca.pem"}}"#.to_string()
                }
                BootstrapStep::WifiList => {
                    r#"{"count":1,"nodes":[{"ssid":"Home","rssi":-50,"bAuthenticate":1}]}"#
                        .to_string()
                }
                BootstrapStep::WifiParam => r#"{"ssid":"Home","isConnected":1}"#.to_string(),
                _ => r#"{"value":1}"#.to_string(),
            };
            respond(model, &body);
        }
        endpoints
    }

    #[test]
    fn cellular_device_never_scans_wifi() {
        let mut model = Model::default();

        let endpoints = run_chain(&mut model, "cat1");

        assert!(endpoints.contains(&"/network/getCellularParam"));
        assert!(endpoints.contains(&"/network/getCellularStatus"));
        assert!(!endpoints.contains(&"/network/getWifiList"));
        assert_eq!(model.network_mode(), NetworkMode::Cellular);
        assert_eq!(model.bootstrap.phase, BootstrapPhase::Completed);
    }

    #[test]
    fn wlan_device_never_fetches_cellular() {
        let mut model = Model::default();

        let endpoints = run_chain(&mut model, "wifi");

        assert_eq!(
            endpoints,
            vec![
                "/system/setDevTime",
                "/system/getDevInfo",
                "/image/getLightParam",
                "/image/getCamParam",
                "/capture/getCapParam",
                "/capture/getUploadParam",
                "/network/getPlatformParam",
                "/network/getWifiList",
                "/network/getWifiParam",
            ]
        );
        assert_eq!(
            model.wlan.phase,
            WlanPhase::Connected {
                ssid: "Home".to_string()
            }
        );
        assert_eq!(model.wlan.scan, ScanState::Idle);
    }

    #[test]
    fn completed_chain_loads_state_and_starts_monitor() {
        let mut model = Model::default();

        run_chain(&mut model, "wifi");

        assert!(!model.is_loading);
        assert_eq!(model.bootstrap.completed.len(), 9);
        assert_eq!(model.mqtt.config.host, "broker");
        assert_eq!(model.mqtt.slots.ca.file_name, "ca.pem");
        assert!(model.mqtt.is_connected);
        assert_eq!(model.settings.light.as_deref(), Some(r#"{"value":1}"#));
        assert_eq!(
            model.monitor.state,
            MonitorState::Polling { generation: 1 }
        );
        assert_eq!(
            in_flight(&model),
            Some((
                "/network/getPlatformParam",
                Reply::MonitorPoll { generation: 1 }
            ))
        );
    }

    #[test]
    fn only_one_request_outstanding_during_bootstrap() {
        let mut model = Model::default();
        let _ = initialize(&mut model, "UTC".to_string(), 0);

        assert_eq!(model.transport.issued, 1);
        assert!(model.transport.queue.is_empty());

        respond(&mut model, r#"{"result":1000}"#);
        assert_eq!(model.transport.issued, 2);
        assert!(model.transport.queue.is_empty());
    }

    #[test]
    fn failure_aborts_remaining_steps() {
        let mut model = Model::default();
        let _ = initialize(&mut model, "UTC".to_string(), 0);
        respond(&mut model, r#"{"result":1000}"#);

        fail(&mut model);

        assert!(matches!(
            model.bootstrap.phase,
            BootstrapPhase::Failed {
                step: BootstrapStep::DeviceInfo,
                ..
            }
        ));
        assert_eq!(model.bootstrap.completed, vec![BootstrapStep::SyncTime]);
        assert!(model.transport.is_idle());
        assert!(!model.is_loading);
        assert_eq!(
            model.error_message.as_deref(),
            Some(messages::BOOTSTRAP_FAILED)
        );
    }

    #[test]
    fn malformed_reply_aborts_chain() {
        let mut model = Model::default();
        let _ = initialize(&mut model, "UTC".to_string(), 0);
        respond(&mut model, r#"{"result":1000}"#);

        respond(&mut model, "<html>");

        assert!(matches!(
            model.bootstrap.phase,
            BootstrapPhase::Failed { .. }
        ));
        assert!(model.transport.is_idle());
    }

    #[test]
    fn rejected_time_sync_continues() {
        let mut model = Model::default();
        let _ = initialize(&mut model, "UTC".to_string(), 0);

        respond(&mut model, r#"{"result":-1}"#);

        assert_eq!(
            model.bootstrap.phase,
            BootstrapPhase::Running {
                step: BootstrapStep::DeviceInfo
            }
        );
    }

    #[test]
    fn second_initialize_is_ignored() {
        let mut model = Model::default();
        let _ = initialize(&mut model, "UTC".to_string(), 0);
        let _ = initialize(&mut model, "UTC".to_string(), 0);

        assert_eq!(model.transport.issued, 1);
        assert!(model.transport.queue.is_empty());
    }
}
