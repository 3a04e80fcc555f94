use crux_core::{render::render, Command};

use crate::api::{DeviceCall, Reply};
use crate::commands::dialog::DialogOutput;
use crate::events::{Event, WlanEvent};
use crate::http_helpers::{decode, expect_ok, result_code, with_body};
use crate::messages;
use crate::model::Model;
use crate::reject;
use crate::types::dev::{
    DevCountryCode, DevWifiJoin, DevWifiList, DevWifiParam, RESULT_WIFI_CONNECTED,
};
use crate::types::{
    ConnectionState, NetworkEntry, PendingJoinAttempt, RegionState, ScanState, TransportError,
    WlanPhase,
};
use crate::{DialogCmd, Effect};

use super::transport::send;
use super::ui::show_tips;

/// Handle WLAN card events
pub fn handle(event: WlanEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        WlanEvent::Scan => begin_scan(model),
        WlanEvent::SelectNetwork { ssid } => select_network(model, &ssid),
        WlanEvent::ChangeRegion { country_code } => change_region(model, country_code),
        WlanEvent::PasswordDialogClosed { ssid, output } => {
            password_dialog_closed(model, ssid, output)
        }
    }
}

/// Replaces the network list with a fresh scan. Single-flight.
pub fn begin_scan(model: &mut Model) -> Command<Effect, Event> {
    if model.wlan.scan == ScanState::Scanning {
        return reject!("scan: already scanning");
    }
    model.wlan.scan = ScanState::Scanning;
    model.wlan.networks.clear();
    Command::all([render(), send(model, DeviceCall::GetWifiList, Reply::WifiList)])
}

pub fn handle_scan_list(
    model: &mut Model,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    match with_body(result, decode::<DevWifiList>) {
        Ok(list) => {
            apply_list(model, list);
            Command::all([render(), send(model, DeviceCall::GetWifiParam, Reply::WifiParam)])
        }
        Err(e) => abort_scan(model, &e),
    }
}

pub fn handle_scan_param(
    model: &mut Model,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    match with_body(result, decode::<DevWifiParam>) {
        Ok(param) => {
            apply_last_connection(model, param);
            render()
        }
        Err(e) => abort_scan(model, &e),
    }
}

fn abort_scan(model: &mut Model, error: &dyn std::fmt::Display) -> Command<Effect, Event> {
    log::warn!("wifi scan failed: {error}");
    model.wlan.scan = ScanState::Idle;
    Command::all([render(), show_tips(messages::NETWORK_ERROR)])
}

/// Installs a scan snapshot. Duplicate SSIDs keep the strongest signal.
pub fn apply_list(model: &mut Model, list: DevWifiList) {
    let mut networks: Vec<NetworkEntry> = Vec::with_capacity(list.nodes.len());
    for entry in list.nodes.into_iter().map(NetworkEntry::from) {
        match networks.iter_mut().find(|n| n.ssid == entry.ssid) {
            Some(existing) if entry.rssi > existing.rssi => *existing = entry,
            Some(_) => {}
            None => networks.push(entry),
        }
    }

    // a join still on the wire keeps its target marked
    if let WlanPhase::Connecting { ssid } = &model.wlan.phase {
        if let Some(target) = networks.iter_mut().find(|n| &n.ssid == ssid) {
            target.status = ConnectionState::Connecting;
        }
    }

    log::debug!("wifi scan: {} networks", networks.len());
    model.wlan.networks = networks;
}

/// Reconciles the snapshot with the station's last join, ending the scan.
pub fn apply_last_connection(model: &mut Model, param: DevWifiParam) {
    model.wlan.scan = ScanState::Idle;
    if model.wlan.phase.is_connecting() {
        return;
    }

    match model.wlan.entry_mut(&param.ssid) {
        Some(entry) => {
            entry.status = if param.is_connected {
                ConnectionState::Connected
            } else {
                ConnectionState::Disconnected
            };
        }
        None => log::debug!("last network {:?} not in scan", param.ssid),
    }
    if param.is_connected {
        model.wlan.demote_all_except(&param.ssid);
    }

    if model.wlan.pending.is_none() || matches!(model.wlan.phase, WlanPhase::Failed { .. }) {
        model.wlan.phase = model.wlan.settled_phase();
    }
}

fn select_network(model: &mut Model, ssid: &str) -> Command<Effect, Event> {
    if model.wlan.phase.is_connecting() {
        return reject!("select {ssid}: join in progress");
    }
    let Some(entry) = model.wlan.entry(ssid) else {
        return reject!("select {ssid}: not in scan");
    };
    if entry.status == ConnectionState::Connected {
        return Command::done();
    }

    let attempt = PendingJoinAttempt::new(entry);
    let is_encrypted = attempt.is_encrypted;
    model.wlan.pending = Some(attempt);

    if is_encrypted {
        model.wlan.phase = WlanPhase::AwaitingPassword {
            ssid: ssid.to_string(),
            password_rejected: false,
        };
        Command::all([render(), prompt_password(ssid.to_string(), false)])
    } else {
        attempt_join(model, String::new())
    }
}

fn prompt_password(ssid: String, show_error: bool) -> Command<Effect, Event> {
    DialogCmd::password(ssid.clone(), show_error)
        .build()
        .then_send(move |output| Event::Wlan(WlanEvent::PasswordDialogClosed { ssid, output }))
}

fn password_dialog_closed(
    model: &mut Model,
    ssid: String,
    output: DialogOutput,
) -> Command<Effect, Event> {
    match &model.wlan.pending {
        None => return reject!("password for {ssid}: no pending join"),
        Some(pending) if pending.ssid != ssid => {
            return reject!("password for {ssid}: pending join is for {}", pending.ssid)
        }
        Some(_) if model.wlan.phase.is_connecting() => {
            return reject!("password for {ssid}: join in progress")
        }
        Some(_) => {}
    }

    match output {
        DialogOutput::Submitted { password } => attempt_join(model, password),
        DialogOutput::Dismissed | DialogOutput::Confirmed => {
            model.wlan.pending = None;
            model.wlan.phase = model.wlan.settled_phase();
            render()
        }
    }
}

/// Sends the join for the pending attempt, or re-prompts if a password is missing.
fn attempt_join(model: &mut Model, password: String) -> Command<Effect, Event> {
    let Some(pending) = model.wlan.pending.as_mut() else {
        return reject!("join: no pending attempt");
    };
    pending.password = password;
    let ssid = pending.ssid.clone();

    if pending.is_encrypted && pending.password.is_empty() {
        pending.password_rejected = true;
        model.wlan.phase = WlanPhase::AwaitingPassword {
            ssid: ssid.clone(),
            password_rejected: true,
        };
        return Command::all([render(), prompt_password(ssid, true)]);
    }

    let body = DevWifiJoin {
        ssid: ssid.clone(),
        password: pending.password.clone(),
    };
    model.wlan.demote_all_except(&ssid);
    if let Some(entry) = model.wlan.entry_mut(&ssid) {
        entry.status = ConnectionState::Connecting;
    }
    model.wlan.phase = WlanPhase::Connecting { ssid: ssid.clone() };

    Command::all([
        render(),
        send(model, DeviceCall::SetWifiParam(body), Reply::WifiJoin { ssid }),
    ])
}

pub fn handle_join_result(
    model: &mut Model,
    ssid: String,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    if model.wlan.phase != (WlanPhase::Connecting { ssid: ssid.clone() }) {
        log::warn!("join result for {ssid} while {:?}", model.wlan.phase);
        return Command::done();
    }

    let code = with_body(result, result_code);
    if code == Ok(RESULT_WIFI_CONNECTED) {
        log::info!("joined {ssid}");
        if let Some(entry) = model.wlan.entry_mut(&ssid) {
            entry.status = ConnectionState::Connected;
        }
        model.wlan.pending = None;
        model.wlan.phase = WlanPhase::Connected { ssid };
        return render();
    }

    if let Some(entry) = model.wlan.entry_mut(&ssid) {
        entry.status = ConnectionState::Disconnected;
    }
    let is_encrypted = model
        .wlan
        .pending
        .as_ref()
        .is_some_and(|pending| pending.is_encrypted);

    match code {
        // the device answered: a wrong password is the likely cause
        Ok(code) if is_encrypted => {
            log::info!("join {ssid} rejected with {code}, asking for password again");
            if let Some(pending) = model.wlan.pending.as_mut() {
                pending.password_rejected = true;
            }
            model.wlan.phase = WlanPhase::AwaitingPassword {
                ssid: ssid.clone(),
                password_rejected: true,
            };
            Command::all([render(), prompt_password(ssid, true)])
        }
        outcome => {
            log::warn!("join {ssid} failed: {outcome:?}");
            model.wlan.phase = WlanPhase::Failed { ssid };
            Command::all([render(), show_tips(messages::WLAN_CONNECT_FAILED)])
        }
    }
}

fn change_region(model: &mut Model, country_code: String) -> Command<Effect, Event> {
    if let RegionState::Changing { country_code: current } = &model.wlan.region {
        return reject!("region {country_code}: change to {current} in flight");
    }
    model.wlan.region = RegionState::Changing {
        country_code: country_code.clone(),
    };

    let body = DevCountryCode {
        country_code: country_code.clone(),
    };
    Command::all([
        render(),
        send(
            model,
            DeviceCall::SetCountryCode(body),
            Reply::Region { country_code },
        ),
    ])
}

pub fn handle_region_result(
    model: &mut Model,
    country_code: String,
    result: Result<Vec<u8>, TransportError>,
) -> Command<Effect, Event> {
    model.wlan.region = RegionState::Idle;

    match with_body(result, expect_ok) {
        Ok(()) => {
            if let Some(info) = model.device_info.as_mut() {
                info.country_code = country_code;
            }
            Command::all([render(), begin_scan(model)])
        }
        Err(e) => {
            log::warn!("region change to {country_code} failed: {e}");
            Command::all([render(), show_tips(messages::NETWORK_ERROR)])
        }
    }
}
