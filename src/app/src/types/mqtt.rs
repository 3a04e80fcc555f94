use serde::{Deserialize, Serialize};
use serde_valid::Validate;

use crate::types::{ValidationError, ValidationKind};

/// Largest credential file the device accepts (512 MiB)
pub const MAX_CREDENTIAL_SIZE: u64 = 512 * 1024 * 1024;

/// Interval between two connection-state polls
pub const MONITOR_INTERVAL_MS: u64 = 2000;

/// MQTT transport config as the operator edits it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct MqttPlatform {
    #[validate(min_length = 1)]
    pub host: String,
    #[validate(minimum = 1)]
    #[validate(maximum = 65535)]
    pub mqtt_port: u32,
    #[validate(min_length = 1)]
    pub topic: String,
    pub client_id: String,
    #[validate(maximum = 2)]
    pub qos: u8,
    pub username: String,
    pub password: String,
    pub tls_enable: bool,
    pub ca_name: String,
    pub cert_name: String,
    pub key_name: String,
}

impl MqttPlatform {
    /// Copy with surrounding whitespace removed from the free-text fields
    pub fn trimmed(&self) -> Self {
        Self {
            host: self.host.trim().to_string(),
            topic: self.topic.trim().to_string(),
            client_id: self.client_id.trim().to_string(),
            username: self.username.trim().to_string(),
            ..self.clone()
        }
    }

    /// Field checks run before the config is sent
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate()
            .map_err(|e| ValidationError::new(ValidationKind::InvalidField, e.to_string()))
    }

    /// Credential names always come from the slots, never from the form
    pub fn with_credential_names(mut self, slots: &CredentialSlots) -> Self {
        self.ca_name = slots.ca.file_name.clone();
        self.cert_name = slots.cert.file_name.clone();
        self.key_name = slots.key.file_name.clone();
        self
    }
}

/// One of the three TLS credential files on the device
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CredentialSlot {
    Ca,
    Cert,
    Key,
}

impl CredentialSlot {
    pub const ALL: [Self; 3] = [Self::Ca, Self::Cert, Self::Key];

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Ca => &["pem", "crt", "cer"],
            Self::Cert => &["pem", "crt", "cer", "cert"],
            Self::Key => &["key", "pem"],
        }
    }

    pub fn upload_endpoint(&self) -> &'static str {
        match self {
            Self::Ca => "/network/uploadMqttCa",
            Self::Cert => "/network/uploadMqttCert",
            Self::Key => "/network/uploadMqttKey",
        }
    }

    pub fn delete_endpoint(&self) -> &'static str {
        match self {
            Self::Ca => "/network/deleteMqttCa",
            Self::Cert => "/network/deleteMqttCert",
            Self::Key => "/network/deleteMqttKey",
        }
    }
}

/// File the operator picked, before its bytes are read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    /// Shell-side handle used to read the contents later
    pub handle: u32,
}

/// Checks a selection against the slot's size and extension rules.
pub fn validate_selection(
    slot: CredentialSlot,
    file: Option<&SelectedFile>,
) -> Result<&SelectedFile, ValidationError> {
    let file = match file {
        Some(file) if file.size > 0 => file,
        _ => {
            return Err(ValidationError::new(
                ValidationKind::Empty,
                "no file or empty file selected",
            ))
        }
    };

    if file.size > MAX_CREDENTIAL_SIZE {
        return Err(ValidationError::new(
            ValidationKind::TooLarge,
            format!("{} is {} bytes", file.name, file.size),
        ));
    }

    let extension = file
        .name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if !slot.allowed_extensions().contains(&extension.as_str()) {
        return Err(ValidationError::new(
            ValidationKind::BadExtension,
            format!("{} not allowed for {slot:?}", file.name),
        ));
    }

    Ok(file)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SlotPhase {
    #[default]
    Idle,
    Reading {
        file_name: String,
    },
    Uploading {
        file_name: String,
    },
    ConfirmingDelete,
    Deleting,
}

/// State of one credential slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotState {
    /// Name the device reports for the stored file, empty when none
    pub file_name: String,
    pub phase: SlotPhase,
    /// Bumped by every selection and clear; replies carrying an older token are stale
    pub upload_token: u64,
    pub handle: Option<u32>,
}

impl SlotState {
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty()
    }

    /// No read, upload or delete of this slot is outstanding
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, SlotPhase::Idle | SlotPhase::ConfirmingDelete)
    }

    /// Invalidates whatever read or upload is outstanding and returns the new token
    pub fn next_token(&mut self) -> u64 {
        self.upload_token += 1;
        self.upload_token
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSlots {
    pub ca: SlotState,
    pub cert: SlotState,
    pub key: SlotState,
}

impl CredentialSlots {
    pub fn get(&self, slot: CredentialSlot) -> &SlotState {
        match slot {
            CredentialSlot::Ca => &self.ca,
            CredentialSlot::Cert => &self.cert,
            CredentialSlot::Key => &self.key,
        }
    }

    pub fn get_mut(&mut self, slot: CredentialSlot) -> &mut SlotState {
        match slot {
            CredentialSlot::Ca => &mut self.ca,
            CredentialSlot::Cert => &mut self.cert,
            CredentialSlot::Key => &mut self.key,
        }
    }
}

/// View of a slot for the shell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialView {
    pub slot: CredentialSlot,
    pub file_name: String,
    pub phase: SlotPhase,
}

/// MQTT card state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MqttModel {
    pub config: MqttPlatform,
    pub slots: CredentialSlots,
    /// Written only by the connection monitor and the initial data-report fetch
    pub is_connected: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MonitorState {
    #[default]
    Stopped,
    Polling {
        generation: u64,
    },
    Waiting {
        generation: u64,
    },
}

/// Connection monitor lifecycle; `generation` changes on every start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Monitor {
    pub state: MonitorState,
    pub generation: u64,
}

impl Monitor {
    pub fn is_running(&self) -> bool {
        self.state != MonitorState::Stopped
    }

    /// Timer id used for the poll scheduled by `generation`
    pub fn timer_id(generation: u64) -> String {
        format!("mqtt-monitor-{generation}")
    }
}
