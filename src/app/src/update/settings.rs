use crux_core::{render::render, Command};

use crate::api::{DeviceCall, Reply, SettingsReply};
use crate::commands::dialog::DialogOutput;
use crate::events::{Event, SettingsEvent};
use crate::http_helpers::{check_json_document, decode, expect_ok, json_document, with_body};
use crate::messages;
use crate::model::Model;
use crate::{reject, update_field};
use crate::types::dev::{DevCellularCommand, DevCommandReply, DevPlatformParam};
use crate::types::{MqttPlatform, RequestState, SettingsTarget, TransportError};
use crate::{DialogCmd, Effect};

use super::transport::send;
use super::ui::show_tips;

/// Handle settings writes
pub fn handle(event: SettingsEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        SettingsEvent::Save { target, config } => save(model, target, config),
        SettingsEvent::SaveCellular { config } => save_cellular(model, config),
        SettingsEvent::SendCellularCommand { command } => send_command(model, command),
        SettingsEvent::SaveDataReport { config } => save_data_report(model, config),
        SettingsEvent::RequestSleep => DialogCmd::confirm(messages::SLEEP_MODE_TIPS)
            .build()
            .then_send(|output| Event::Settings(SettingsEvent::SleepDialogClosed(output))),
        SettingsEvent::SleepDialogClosed(DialogOutput::Confirmed) => send(
            model,
            DeviceCall::SetDevSleep,
            Reply::Settings(SettingsReply::Sleep),
        ),
        SettingsEvent::SleepDialogClosed(_) => Command::done(),
    }
}

/// Marks a save as in flight; false if another save is still running
fn begin_save(model: &mut Model, what: &str) -> bool {
    if model.save_state.is_in_flight() {
        log::debug!("rejected: save {what}: another save in flight");
        return false;
    }
    model.save_state = RequestState::InFlight;
    true
}

fn invalid_document(what: &str, config: &str) -> Option<Command<Effect, Event>> {
    let err = check_json_document(config).err()?;
    log::warn!("save {what}: {err}");
    Some(show_tips(messages::INVALID_SETTINGS))
}

fn save(model: &mut Model, target: SettingsTarget, config: String) -> Command<Effect, Event> {
    if let Some(cmd) = invalid_document(&format!("{target:?}"), &config) {
        return cmd;
    }
    if !begin_save(model, &format!("{target:?}")) {
        return Command::done();
    }

    let call = DeviceCall::save_settings(target, config.clone());
    Command::all([
        render(),
        send(
            model,
            call,
            Reply::Settings(SettingsReply::Save { target, config }),
        ),
    ])
}

fn save_cellular(model: &mut Model, config: String) -> Command<Effect, Event> {
    if let Some(cmd) = invalid_document("cellular", &config) {
        return cmd;
    }
    if !begin_save(model, "cellular") {
        return Command::done();
    }

    Command::all([
        render(),
        show_tips(messages::CELLULAR_SAVE_TIPS),
        send(
            model,
            DeviceCall::SetCellularParam(config.clone()),
            Reply::Settings(SettingsReply::Cellular { config }),
        ),
    ])
}

fn send_command(model: &mut Model, command: String) -> Command<Effect, Event> {
    if command.is_empty() {
        return reject!("AT command: empty");
    }
    if model.send_state.is_in_flight() || model.save_state.is_in_flight() {
        return reject!("AT command {command}: request in flight");
    }
    model.send_state = RequestState::InFlight;
    model.cellular_reply = None;

    Command::all([
        render(),
        send(
            model,
            DeviceCall::SendCellularCommand(DevCellularCommand { command }),
            Reply::Settings(SettingsReply::CellularCommand),
        ),
    ])
}

fn save_data_report(model: &mut Model, config: MqttPlatform) -> Command<Effect, Event> {
    let config = config.trimmed();
    if let Err(e) = config.check() {
        log::info!("data report config rejected: {e}");
        return show_tips(e.message_key());
    }
    if !begin_save(model, "data report") {
        return Command::done();
    }

    let config = config.with_credential_names(&model.mqtt.slots);
    Command::all([
        render(),
        send(
            model,
            DeviceCall::SetPlatformParam(DevPlatformParam::mqtt(config.clone())),
            Reply::Settings(SettingsReply::DataReport { config }),
        ),
    ])
}

pub fn handle_result(
    model: &mut Model,
    reply: SettingsReply,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    match reply {
        SettingsReply::Save { target, config } => {
            model.save_state = RequestState::Idle;
            match with_body(result, expect_ok) {
                Ok(()) => {
                    *model.settings.slot_mut(target) = Some(config);
                    model.success_message = Some(messages::SAVE_SUCCESS.to_string());
                    render()
                }
                Err(e) => save_failed(&format!("{target:?}"), &e),
            }
        }

        SettingsReply::Cellular { config } => {
            model.save_state = RequestState::Idle;
            match with_body(result, expect_ok) {
                Ok(()) => {
                    model.settings.cellular = Some(config);
                    model.success_message = Some(messages::SAVE_SUCCESS.to_string());
                    Command::all([
                        render(),
                        send(
                            model,
                            DeviceCall::GetCellularParam,
                            Reply::Settings(SettingsReply::CellularParam),
                        ),
                        send(
                            model,
                            DeviceCall::GetCellularStatus,
                            Reply::Settings(SettingsReply::CellularStatus),
                        ),
                    ])
                }
                Err(e) => save_failed("cellular", &e),
            }
        }

        SettingsReply::CellularParam => match with_body(result, json_document) {
            Ok(param) => update_field!(model.settings.cellular, Some(param)),
            Err(e) => {
                log::warn!("cellular param refresh failed: {e}");
                Command::done()
            }
        },

        SettingsReply::CellularStatus => match with_body(result, json_document) {
            Ok(status) => update_field!(model.settings.cellular_status, Some(status)),
            Err(e) => {
                log::warn!("cellular status refresh failed: {e}");
                Command::done()
            }
        },

        SettingsReply::CellularCommand => {
            model.send_state = RequestState::Idle;
            match with_body(result, decode::<DevCommandReply>) {
                Ok(reply) => {
                    log::debug!("AT command answered {}: {}", reply.result, reply.message);
                    model.cellular_reply = Some(reply.message);
                    render()
                }
                Err(e) => {
                    log::warn!("AT command failed: {e}");
                    Command::all([render(), show_tips(messages::NETWORK_ERROR)])
                }
            }
        }

        SettingsReply::DataReport { config } => {
            model.save_state = RequestState::Idle;
            match with_body(result, expect_ok) {
                Ok(()) => {
                    model.mqtt.config = config;
                    model.success_message = Some(messages::SAVE_SUCCESS.to_string());
                    render()
                }
                Err(e) => save_failed("data report", &e),
            }
        }

        SettingsReply::Sleep => {
            if let Err(e) = with_body(result, expect_ok) {
                log::warn!("sleep request failed: {e}");
            }
            Command::done()
        }
    }
}

fn save_failed(what: &str, error: &dyn std::fmt::Display) -> Command<Effect, Event> {
    log::warn!("save {what} failed: {error}");
    Command::all([render(), show_tips(messages::NETWORK_ERROR)])
}
