use serde::{Deserialize, Serialize};

use crate::api::Reply;
use crate::commands::dialog::DialogOutput;
use crate::commands::file::FileOutput;
use crate::commands::timer::TimerOutput;
use crate::types::*;

/// WLAN card events
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum WlanEvent {
    Scan,
    SelectNetwork {
        ssid: String,
    },
    ChangeRegion {
        country_code: String,
    },

    #[serde(skip)]
    PasswordDialogClosed {
        ssid: String,
        output: DialogOutput,
    },
}

/// MQTT credential slot events
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum CredentialEvent {
    FileSelected {
        slot: CredentialSlot,
        file: Option<SelectedFile>,
    },
    ClearRequested {
        slot: CredentialSlot,
    },

    #[serde(skip)]
    FileRead {
        slot: CredentialSlot,
        token: u64,
        output: FileOutput,
    },
    #[serde(skip)]
    DeleteDialogClosed {
        slot: CredentialSlot,
        output: DialogOutput,
    },
}

/// MQTT connection monitor events
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Start,
    Stop,

    #[serde(skip)]
    TimerElapsed {
        generation: u64,
        output: TimerOutput,
    },
}

/// Settings forms that only need to be written to the device
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    Save {
        target: SettingsTarget,
        config: String,
    },
    SaveCellular {
        config: String,
    },
    SendCellularCommand {
        command: String,
    },
    SaveDataReport {
        config: MqttPlatform,
    },
    RequestSleep,

    #[serde(skip)]
    SleepDialogClosed(DialogOutput),
}

/// UI actions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ClearError,
    ClearSuccess,

    /// Completion of a shell request whose output carries no information
    #[serde(skip)]
    Acknowledged,
}

/// Completions of queued device calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Completed {
        reply: Reply,
        result: Result<Vec<u8>, TransportError>,
    },
}

/// Events that can happen in the app
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Event {
    /// Starts the bootstrap chain; `timestamp` in seconds since the epoch
    Initialize {
        time_zone: String,
        timestamp: u64,
    },
    /// The page is going away
    Dispose,

    Wlan(WlanEvent),
    Credential(CredentialEvent),
    Monitor(MonitorEvent),
    Settings(SettingsEvent),
    Ui(UiEvent),

    #[serde(skip)]
    Transport(TransportEvent),
}
