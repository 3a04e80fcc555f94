use crux_core::{render::render, Command};

use crate::api::{DeviceCall, Reply};
use crate::commands::dialog::DialogOutput;
use crate::commands::file::FileOutput;
use crate::events::{CredentialEvent, Event, UiEvent};
use crate::http_helpers::{decode, expect_ok, with_body};
use crate::messages;
use crate::model::Model;
use crate::reject;
use crate::types::dev::{DevMqttPlatform, DevPlatformParam};
use crate::types::{validate_selection, CredentialSlot, SelectedFile, SlotPhase, TransportError};
use crate::{DialogCmd, Effect, FileCmd};

use super::transport::send;
use super::ui::show_tips;

/// Handle MQTT credential slot events
pub fn handle(event: CredentialEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        CredentialEvent::FileSelected { slot, file } => select_file(model, slot, file),
        CredentialEvent::FileRead {
            slot,
            token,
            output,
        } => file_read(model, slot, token, output),
        CredentialEvent::ClearRequested { slot } => clear(model, slot),
        CredentialEvent::DeleteDialogClosed { slot, output } => {
            delete_dialog_closed(model, slot, output)
        }
    }
}

fn reset_input(slot: CredentialSlot) -> Command<Effect, Event> {
    FileCmd::reset_input(slot)
        .build()
        .then_send(|_| Event::Ui(UiEvent::Acknowledged))
}

fn select_file(
    model: &mut Model,
    slot: CredentialSlot,
    file: Option<SelectedFile>,
) -> Command<Effect, Event> {
    let file = match validate_selection(slot, file.as_ref()) {
        Ok(file) => file.clone(),
        Err(e) => {
            log::info!("{slot:?}: {e}");
            return Command::all([reset_input(slot), show_tips(e.message_key())]);
        }
    };

    let state = model.mqtt.slots.get_mut(slot);
    if matches!(state.phase, SlotPhase::ConfirmingDelete | SlotPhase::Deleting) {
        return Command::all([reset_input(slot), reject!("{slot:?}: delete in progress")]);
    }

    // a newer selection wins over whatever is still being read or uploaded
    let token = state.next_token();
    state.handle = Some(file.handle);
    state.phase = SlotPhase::Reading {
        file_name: file.name.clone(),
    };
    log::debug!("{slot:?}: reading {} ({} bytes)", file.name, file.size);

    // the input is reset once the read has resolved
    Command::all([
        render(),
        FileCmd::read(file.handle)
            .build()
            .then_send(move |output| {
                Event::Credential(CredentialEvent::FileRead {
                    slot,
                    token,
                    output,
                })
            }),
    ])
}

fn file_read(
    model: &mut Model,
    slot: CredentialSlot,
    token: u64,
    output: FileOutput,
) -> Command<Effect, Event> {
    let state = model.mqtt.slots.get_mut(slot);
    if state.upload_token != token {
        return reject!("{slot:?}: read for stale selection {token}");
    }
    let SlotPhase::Reading { file_name } = state.phase.clone() else {
        return reject!("{slot:?}: read while {:?}", state.phase);
    };
    state.handle = None;

    match output {
        FileOutput::Contents { bytes } => {
            state.phase = SlotPhase::Uploading {
                file_name: file_name.clone(),
            };
            let call = DeviceCall::UploadCredential {
                slot,
                file_name: file_name.clone(),
                bytes,
            };
            let reply = Reply::CredentialUpload {
                slot,
                token,
                file_name,
            };
            Command::all([reset_input(slot), render(), send(model, call, reply)])
        }
        FileOutput::Error { message } => {
            log::warn!("{slot:?}: reading {file_name} failed: {message}");
            state.phase = SlotPhase::Idle;
            Command::all([
                reset_input(slot),
                render(),
                show_tips(messages::FILE_READ_FAILED),
            ])
        }
        FileOutput::Reset => {
            state.phase = SlotPhase::Idle;
            reject!("{slot:?}: unexpected reset output for read")
        }
    }
}

pub fn handle_upload_result(
    model: &mut Model,
    slot: CredentialSlot,
    token: u64,
    file_name: String,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    let state = model.mqtt.slots.get_mut(slot);
    if state.upload_token != token {
        // the device may now hold a file the slot no longer names
        return match with_body(result, expect_ok) {
            Ok(()) => {
                log::info!("{slot:?}: stale upload of {file_name} accepted, reconciling");
                send(model, DeviceCall::GetPlatformParam, Reply::CredentialReconcile)
            }
            Err(e) => {
                log::debug!("{slot:?}: ignoring failed upload of stale selection {token}: {e}");
                Command::done()
            }
        };
    }
    state.phase = SlotPhase::Idle;

    match with_body(result, expect_ok) {
        Ok(()) => {
            log::info!("{slot:?}: uploaded {file_name}");
            state.file_name = file_name;
            model.success_message = Some(messages::UPLOAD_SUCCESS.to_string());
            render()
        }
        Err(e) => {
            log::warn!("{slot:?}: upload of {file_name} failed: {e}");
            Command::all([render(), show_tips(messages::UPLOAD_FAILED)])
        }
    }
}

fn clear(model: &mut Model, slot: CredentialSlot) -> Command<Effect, Event> {
    let state = model.mqtt.slots.get_mut(slot);
    if matches!(state.phase, SlotPhase::ConfirmingDelete | SlotPhase::Deleting) {
        return reject!("{slot:?}: delete already in progress");
    }

    // also drops a read or upload that is still outstanding
    state.next_token();
    state.handle = None;

    if state.is_empty() {
        state.phase = SlotPhase::Idle;
        return render();
    }

    state.phase = SlotPhase::ConfirmingDelete;
    Command::all([
        render(),
        DialogCmd::confirm(messages::DELETE_CONFIRM)
            .build()
            .then_send(move |output| {
                Event::Credential(CredentialEvent::DeleteDialogClosed { slot, output })
            }),
    ])
}

fn delete_dialog_closed(
    model: &mut Model,
    slot: CredentialSlot,
    output: DialogOutput,
) -> Command<Effect, Event> {
    let state = model.mqtt.slots.get_mut(slot);
    if state.phase != SlotPhase::ConfirmingDelete {
        return reject!("{slot:?}: delete confirmation while {:?}", state.phase);
    }

    match output {
        DialogOutput::Confirmed => {
            state.phase = SlotPhase::Deleting;
            Command::all([
                render(),
                send(
                    model,
                    DeviceCall::DeleteCredential(slot),
                    Reply::CredentialDelete { slot },
                ),
            ])
        }
        DialogOutput::Dismissed | DialogOutput::Submitted { .. } => {
            state.phase = SlotPhase::Idle;
            render()
        }
    }
}

/// Local name is cleared whatever the device answered. On failure the device's
/// view is fetched again so the slot converges to what is really stored.
pub fn handle_delete_result(
    model: &mut Model,
    slot: CredentialSlot,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    let state = model.mqtt.slots.get_mut(slot);
    state.file_name.clear();
    state.phase = SlotPhase::Idle;

    match with_body(result, expect_ok) {
        Ok(()) => render(),
        Err(e) => {
            log::warn!("{slot:?}: delete failed: {e}");
            model.error_message = Some(messages::DELETE_FAILED.to_string());
            Command::all([
                render(),
                send(model, DeviceCall::GetPlatformParam, Reply::CredentialReconcile),
            ])
        }
    }
}

pub fn handle_reconcile_result(
    model: &mut Model,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    match with_body(result, decode::<DevPlatformParam>) {
        Ok(param) => {
            sync_slot_names(model, &param.mqtt_platform);
            render()
        }
        Err(e) => {
            log::warn!("credential reconcile failed: {e}");
            Command::done()
        }
    }
}

/// Takes the device's file names for every slot with nothing on the wire
pub fn sync_slot_names(model: &mut Model, platform: &DevMqttPlatform) {
    for slot in CredentialSlot::ALL {
        let name = match slot {
            CredentialSlot::Ca => &platform.ca_name,
            CredentialSlot::Cert => &platform.cert_name,
            CredentialSlot::Key => &platform.key_name,
        };
        let state = model.mqtt.slots.get_mut(slot);
        if state.is_settled() {
            state.file_name.clone_from(name);
        }
    }
}
