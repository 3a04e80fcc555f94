use serde::{Deserialize, Serialize};

use crate::api::Transport;
use crate::types::*;

/// Application Model - the complete state
///
/// Never leaves the core; the Shell sees the [`ViewModel`] projection.
#[derive(Debug, Default)]
pub struct Model {
    // Device state
    pub device_info: Option<DeviceInfo>,
    pub settings: DeviceSettings,

    // Network credentials
    pub wlan: WlanModel,
    pub mqtt: MqttModel,
    pub monitor: Monitor,

    // Startup
    pub bootstrap: BootstrapState,

    // Device request queue
    pub transport: Transport,

    // Operator-initiated writes
    pub save_state: RequestState,
    pub send_state: RequestState,
    pub cellular_reply: Option<String>,

    // UI state
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl Model {
    /// Start a loading operation (sets is_loading=true, clears error)
    pub fn start_loading(&mut self) {
        self.is_loading = true;
        self.error_message = None;
    }

    /// Stop loading and clear error
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.error_message = None;
    }

    /// Set an error message and stop loading
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.is_loading = false;
        self.error_message = Some(error.into());
    }

    /// Set an error message, stop loading, and return a render command
    pub fn set_error_and_render(
        &mut self,
        error: impl Into<String>,
    ) -> crux_core::Command<crate::Effect, crate::events::Event> {
        self.set_error(error);
        crux_core::render::render()
    }

    pub fn network_mode(&self) -> NetworkMode {
        self.device_info
            .as_ref()
            .map(DeviceInfo::network_mode)
            .unwrap_or_default()
    }
}

/// What the Shell renders
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub device_info: Option<DeviceInfo>,
    pub settings: DeviceSettings,

    pub networks: Vec<NetworkEntry>,
    pub wlan_phase: WlanPhase,
    pub wlan_loading: bool,
    pub change_region_loading: bool,

    pub mqtt_config: MqttPlatform,
    pub mqtt_connected: bool,
    pub credentials: Vec<CredentialView>,
    pub monitor_running: bool,

    pub bootstrap: BootstrapPhase,
    pub save_loading: bool,
    pub send_loading: bool,
    pub cellular_reply: Option<String>,

    pub is_loading: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl From<&Model> for ViewModel {
    fn from(model: &Model) -> Self {
        Self {
            device_info: model.device_info.clone(),
            settings: model.settings.clone(),
            networks: model.wlan.networks.clone(),
            wlan_phase: model.wlan.phase.clone(),
            wlan_loading: model.wlan.scan == ScanState::Scanning,
            change_region_loading: matches!(model.wlan.region, RegionState::Changing { .. }),
            mqtt_config: model.mqtt.config.clone(),
            mqtt_connected: model.mqtt.is_connected,
            credentials: CredentialSlot::ALL
                .iter()
                .map(|&slot| {
                    let state = model.mqtt.slots.get(slot);
                    CredentialView {
                        slot,
                        file_name: state.file_name.clone(),
                        phase: state.phase.clone(),
                    }
                })
                .collect(),
            monitor_running: model.monitor.is_running(),
            bootstrap: model.bootstrap.phase.clone(),
            save_loading: model.save_state.is_in_flight(),
            send_loading: model.send_state.is_in_flight(),
            cellular_reply: model.cellular_reply.clone(),
            is_loading: model.is_loading,
            error_message: model.error_message.clone(),
            success_message: model.success_message.clone(),
        }
    }
}
