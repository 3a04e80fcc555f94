use serde::{Deserialize, Serialize};

/// Network mode string the firmware reports for cellular (Cat-1) modules
pub const NETMOD_CELLULAR: &str = "cat1";

/// Device identity from `getDevInfo`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub name: String,
    pub mac: String,
    pub sn: String,
    pub hard_version: String,
    pub soft_version: String,
    pub model: String,
    pub country_code: String,
    pub netmod: String,
    pub camera: String,
}

impl DeviceInfo {
    pub fn network_mode(&self) -> NetworkMode {
        if self.netmod == NETMOD_CELLULAR {
            NetworkMode::Cellular
        } else {
            NetworkMode::Wlan
        }
    }
}

/// Uplink the device uses, decides which network card the bootstrap loads
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NetworkMode {
    Cellular,
    #[default]
    Wlan,
}

/// Settings the core only transports.
///
/// Their forms and per-field validation live in the shell, so they are kept as the
/// raw JSON documents the device returned (or last accepted).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    pub cam: Option<String>,
    pub light: Option<String>,
    pub capture: Option<String>,
    pub upload: Option<String>,
    pub cellular: Option<String>,
    pub cellular_status: Option<String>,
}

/// Which settings document a save targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SettingsTarget {
    Cam,
    Light,
    Capture,
    Upload,
}

impl DeviceSettings {
    pub fn slot_mut(&mut self, target: SettingsTarget) -> &mut Option<String> {
        match target {
            SettingsTarget::Cam => &mut self.cam,
            SettingsTarget::Light => &mut self.light,
            SettingsTarget::Capture => &mut self.capture,
            SettingsTarget::Upload => &mut self.upload,
        }
    }
}
