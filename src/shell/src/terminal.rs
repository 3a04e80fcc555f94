//! Line-oriented terminal front end: operator commands, dialog answers and
//! a compact rendering of the view model.

use anyhow::{Context, Result, bail};
use camcfg_core::{
    CredentialSlot, DialogOperation, DialogOutput, MqttPlatform, SettingsTarget, ViewModel,
};
use std::path::PathBuf;

pub const HELP: &str = "\
commands:
  scan                          rescan WLAN networks
  join <ssid>                   join a network from the list
  region <code>                 change the WLAN country code
  select <ca|cert|key> <path>   upload a credential file
  clear <ca|cert|key>           delete a credential file
  save <cam|light|capture|upload> <json>
  cellular <json>               save cellular settings
  at <command>                  send an AT command to the modem
  mqtt <json>                   save the MQTT data report config
  sleep                         put the camera to sleep
  monitor <start|stop>          MQTT connection monitor
  dismiss                       clear error and success notices
  view                          print the full view model
  quit";

/// A parsed operator command
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Scan,
    Join(String),
    Region(String),
    Select(CredentialSlot, PathBuf),
    Clear(CredentialSlot),
    Save(SettingsTarget, String),
    Cellular(String),
    At(String),
    Mqtt(MqttPlatform),
    Sleep,
    Monitor(bool),
    Dismiss,
    View,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<UserCommand> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "scan" => UserCommand::Scan,
        "join" => UserCommand::Join(required(rest, "ssid")?.to_string()),
        "region" => UserCommand::Region(required(rest, "country code")?.to_string()),
        "select" => {
            let (slot, path) = rest.split_once(' ').context("usage: select <slot> <path>")?;
            UserCommand::Select(parse_slot(slot)?, PathBuf::from(path.trim()))
        }
        "clear" => UserCommand::Clear(parse_slot(rest)?),
        "save" => {
            let (target, config) = rest.split_once(' ').context("usage: save <target> <json>")?;
            UserCommand::Save(parse_target(target)?, config.trim().to_string())
        }
        "cellular" => UserCommand::Cellular(required(rest, "settings")?.to_string()),
        // an empty AT command is the core's call to reject
        "at" => UserCommand::At(rest.to_string()),
        "mqtt" => UserCommand::Mqtt(
            serde_json::from_str(required(rest, "config")?)
                .context("failed to parse MQTT config")?,
        ),
        "sleep" => UserCommand::Sleep,
        "monitor" => match rest {
            "start" => UserCommand::Monitor(true),
            "stop" => UserCommand::Monitor(false),
            _ => bail!("usage: monitor <start|stop>"),
        },
        "dismiss" => UserCommand::Dismiss,
        "view" => UserCommand::View,
        "help" | "?" => UserCommand::Help,
        "quit" | "exit" => UserCommand::Quit,
        _ => bail!("unknown command {word:?}, try help"),
    };
    Ok(command)
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    if value.is_empty() {
        bail!("missing {what}");
    }
    Ok(value)
}

fn parse_slot(value: &str) -> Result<CredentialSlot> {
    match value.trim() {
        "ca" => Ok(CredentialSlot::Ca),
        "cert" => Ok(CredentialSlot::Cert),
        "key" => Ok(CredentialSlot::Key),
        other => bail!("unknown credential slot {other:?}"),
    }
}

fn parse_target(value: &str) -> Result<SettingsTarget> {
    match value {
        "cam" => Ok(SettingsTarget::Cam),
        "light" => Ok(SettingsTarget::Light),
        "capture" => Ok(SettingsTarget::Capture),
        "upload" => Ok(SettingsTarget::Upload),
        other => bail!("unknown settings target {other:?}"),
    }
}

/// Text shown when the core opens a dialog
pub fn dialog_prompt(operation: &DialogOperation) -> String {
    match operation {
        DialogOperation::Tips {
            message,
            show_cancel: true,
        } => format!("[{message}] confirm? (y/n)"),
        DialogOperation::Tips { message, .. } => format!("[{message}] press enter"),
        DialogOperation::Password {
            ssid,
            show_error: true,
        } => format!("wrong password for {ssid}, try again (empty line cancels):"),
        DialogOperation::Password { ssid, .. } => {
            format!("password for {ssid} (empty line cancels):")
        }
    }
}

/// Interprets an input line as the answer to an open dialog
pub fn dialog_answer(operation: &DialogOperation, line: &str) -> DialogOutput {
    let line = line.trim_end_matches(['\r', '\n']);
    match operation {
        DialogOperation::Tips {
            show_cancel: true, ..
        } => match line.trim() {
            "y" | "yes" => DialogOutput::Confirmed,
            _ => DialogOutput::Dismissed,
        },
        DialogOperation::Tips { .. } => DialogOutput::Confirmed,
        DialogOperation::Password { .. } if line.is_empty() => DialogOutput::Dismissed,
        DialogOperation::Password { .. } => DialogOutput::Submitted {
            password: line.to_string(),
        },
    }
}

/// One-screen summary of the view model
pub fn summary(view: &ViewModel) -> String {
    let mut lines = Vec::new();

    if view.is_loading {
        lines.push(format!("loading ({:?})", view.bootstrap));
    }
    if let Some(info) = &view.device_info {
        lines.push(format!(
            "device {} sn {} fw {} region {}",
            info.model, info.sn, info.soft_version, info.country_code
        ));
    }
    lines.push(format!(
        "wlan {:?}{}",
        view.wlan_phase,
        if view.wlan_loading { " (scanning)" } else { "" }
    ));
    for network in &view.networks {
        lines.push(format!(
            "  {:<32} {:>4} dBm {}/4 {}{:?}",
            network.ssid,
            network.rssi,
            network.signal_level(),
            if network.is_encrypted { "locked " } else { "" },
            network.status
        ));
    }
    lines.push(format!(
        "mqtt {} {}",
        view.mqtt_config.host,
        if view.mqtt_connected { "connected" } else { "disconnected" }
    ));
    for credential in &view.credentials {
        lines.push(format!(
            "  {:?}: {} {:?}",
            credential.slot, credential.file_name, credential.phase
        ));
    }
    if let Some(reply) = &view.cellular_reply {
        lines.push(format!("modem: {reply}"));
    }
    if let Some(error) = &view.error_message {
        lines.push(format!("error: {error}"));
    }
    if let Some(success) = &view.success_message {
        lines.push(format!("ok: {success}"));
    }

    lines.join("\n")
}
