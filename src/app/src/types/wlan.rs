use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Connection status of a scanned network, as the device encodes it
#[derive(Debug, Clone, Copy, Default, Serialize_repr, Deserialize_repr, PartialEq, Eq)]
#[repr(i8)]
pub enum ConnectionState {
    #[default]
    Disconnected = -1,
    Connecting = 0,
    Connected = 1,
}

/// One access point from the last scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    pub ssid: String,
    pub rssi: i32,
    pub is_encrypted: bool,
    pub status: ConnectionState,
}

impl NetworkEntry {
    /// Signal strength in bars, 0 (worst) to 4 (best)
    pub fn signal_level(&self) -> u8 {
        match self.rssi {
            r if r < -88 => 0,
            r if r < -77 => 1,
            r if r < -66 => 2,
            r if r < -55 => 3,
            _ => 4,
        }
    }
}

/// The single join the operator is working on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingJoinAttempt {
    pub ssid: String,
    pub is_encrypted: bool,
    pub password: String,
    pub password_rejected: bool,
}

impl PendingJoinAttempt {
    pub fn new(entry: &NetworkEntry) -> Self {
        Self {
            ssid: entry.ssid.clone(),
            is_encrypted: entry.is_encrypted,
            ..Default::default()
        }
    }
}

/// Phase of the WLAN join state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WlanPhase {
    #[default]
    Idle,
    AwaitingPassword {
        ssid: String,
        password_rejected: bool,
    },
    Connecting {
        ssid: String,
    },
    Connected {
        ssid: String,
    },
    Failed {
        ssid: String,
    },
}

impl WlanPhase {
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RegionState {
    #[default]
    Idle,
    Changing { country_code: String },
}

/// Everything the WLAN card owns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WlanModel {
    pub networks: Vec<NetworkEntry>,
    pub pending: Option<PendingJoinAttempt>,
    pub phase: WlanPhase,
    pub scan: ScanState,
    pub region: RegionState,
}

impl WlanModel {
    pub fn entry(&self, ssid: &str) -> Option<&NetworkEntry> {
        self.networks.iter().find(|n| n.ssid == ssid)
    }

    pub fn entry_mut(&mut self, ssid: &str) -> Option<&mut NetworkEntry> {
        self.networks.iter_mut().find(|n| n.ssid == ssid)
    }

    /// Mark every entry but `ssid` as disconnected
    pub fn demote_all_except(&mut self, ssid: &str) {
        self.networks
            .iter_mut()
            .filter(|n| n.ssid != ssid)
            .for_each(|n| n.status = ConnectionState::Disconnected);
    }

    /// Number of entries that are connecting or connected
    pub fn active_count(&self) -> usize {
        self.networks
            .iter()
            .filter(|n| n.status != ConnectionState::Disconnected)
            .count()
    }

    /// Phase implied by the entry list alone, used when no join is pending
    pub fn settled_phase(&self) -> WlanPhase {
        match self
            .networks
            .iter()
            .find(|n| n.status == ConnectionState::Connected)
        {
            Some(entry) => WlanPhase::Connected {
                ssid: entry.ssid.clone(),
            },
            None => WlanPhase::Idle,
        }
    }
}
