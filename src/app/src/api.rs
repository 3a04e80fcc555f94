//! Device calls and the single-flight request queue.
//!
//! The camera's HTTP server cannot interleave handlers, so every call goes through
//! one FIFO: a request is only issued once the completion of the previous one has
//! been processed by the core.

use std::collections::VecDeque;

use crate::types::dev::{
    DevCellularCommand, DevCountryCode, DevPlatformParam, DevTime, DevWifiJoin,
};
use crate::types::{BootstrapStep, CredentialSlot, SettingsTarget};

/// One request to the device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    SetDevTime(DevTime),
    GetDevInfo,
    SetCountryCode(DevCountryCode),
    SetDevSleep,
    GetCamParam,
    SetCamParam(String),
    GetLightParam,
    SetLightParam(String),
    GetCapParam,
    SetCapParam(String),
    GetUploadParam,
    SetUploadParam(String),
    GetPlatformParam,
    SetPlatformParam(DevPlatformParam),
    GetCellularParam,
    SetCellularParam(String),
    GetCellularStatus,
    SendCellularCommand(DevCellularCommand),
    GetWifiList,
    GetWifiParam,
    SetWifiParam(DevWifiJoin),
    UploadCredential {
        slot: CredentialSlot,
        file_name: String,
        bytes: Vec<u8>,
    },
    DeleteCredential(CredentialSlot),
}

/// Request body, ready for the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    None,
    Json(String),
    Binary { file_name: String, bytes: Vec<u8> },
}

impl DeviceCall {
    /// Save call for one of the pass-through settings documents
    pub fn save_settings(target: SettingsTarget, config: String) -> Self {
        match target {
            SettingsTarget::Cam => Self::SetCamParam(config),
            SettingsTarget::Light => Self::SetLightParam(config),
            SettingsTarget::Capture => Self::SetCapParam(config),
            SettingsTarget::Upload => Self::SetUploadParam(config),
        }
    }

    /// Path below the API prefix
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::SetDevTime(_) => "/system/setDevTime",
            Self::GetDevInfo => "/system/getDevInfo",
            Self::SetCountryCode(_) => "/system/setDevInfo",
            Self::SetDevSleep => "/system/setDevSleep",
            Self::GetCamParam => "/image/getCamParam",
            Self::SetCamParam(_) => "/image/setCamParam",
            Self::GetLightParam => "/image/getLightParam",
            Self::SetLightParam(_) => "/image/setLightParam",
            Self::GetCapParam => "/capture/getCapParam",
            Self::SetCapParam(_) => "/capture/setCapParam",
            Self::GetUploadParam => "/capture/getUploadParam",
            Self::SetUploadParam(_) => "/capture/setUploadParam",
            Self::GetPlatformParam => "/network/getPlatformParam",
            Self::SetPlatformParam(_) => "/network/setPlatformParam",
            Self::GetCellularParam => "/network/getCellularParam",
            Self::SetCellularParam(_) => "/network/setCellularParam",
            Self::GetCellularStatus => "/network/getCellularStatus",
            Self::SendCellularCommand(_) => "/network/sendCellularCommand",
            Self::GetWifiList => "/network/getWifiList",
            Self::GetWifiParam => "/network/getWifiParam",
            Self::SetWifiParam(_) => "/network/setWifiParam",
            Self::UploadCredential { slot, .. } => slot.upload_endpoint(),
            Self::DeleteCredential(slot) => slot.delete_endpoint(),
        }
    }

    pub fn is_post(&self) -> bool {
        !matches!(
            self,
            Self::GetDevInfo
                | Self::GetCamParam
                | Self::GetLightParam
                | Self::GetCapParam
                | Self::GetUploadParam
                | Self::GetPlatformParam
                | Self::GetCellularParam
                | Self::GetCellularStatus
                | Self::GetWifiList
                | Self::GetWifiParam
        )
    }

    /// Consumes the call and serializes its body.
    ///
    /// Settings documents are forwarded verbatim; they were checked to be JSON when
    /// the operator submitted them.
    pub fn into_payload(self) -> Result<Payload, serde_json::Error> {
        let json = match self {
            Self::SetDevTime(body) => serde_json::to_string(&body)?,
            Self::SetCountryCode(body) => serde_json::to_string(&body)?,
            Self::SetPlatformParam(body) => serde_json::to_string(&body)?,
            Self::SendCellularCommand(body) => serde_json::to_string(&body)?,
            Self::SetWifiParam(body) => serde_json::to_string(&body)?,
            Self::SetCamParam(config)
            | Self::SetLightParam(config)
            | Self::SetCapParam(config)
            | Self::SetUploadParam(config)
            | Self::SetCellularParam(config) => config,
            Self::UploadCredential {
                file_name, bytes, ..
            } => return Ok(Payload::Binary { file_name, bytes }),
            Self::SetDevSleep | Self::DeleteCredential(_) => "{}".to_string(),
            Self::GetDevInfo
            | Self::GetCamParam
            | Self::GetLightParam
            | Self::GetCapParam
            | Self::GetUploadParam
            | Self::GetPlatformParam
            | Self::GetCellularParam
            | Self::GetCellularStatus
            | Self::GetWifiList
            | Self::GetWifiParam => return Ok(Payload::None),
        };
        Ok(Payload::Json(json))
    }
}

/// Continuation that consumes the result of a queued call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Bootstrap(BootstrapStep),
    WifiList,
    WifiParam,
    WifiJoin {
        ssid: String,
    },
    Region {
        country_code: String,
    },
    CredentialUpload {
        slot: CredentialSlot,
        token: u64,
        file_name: String,
    },
    CredentialDelete {
        slot: CredentialSlot,
    },
    CredentialReconcile,
    MonitorPoll {
        generation: u64,
    },
    Settings(SettingsReply),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsReply {
    Save {
        target: SettingsTarget,
        config: String,
    },
    Cellular {
        config: String,
    },
    CellularParam,
    CellularStatus,
    CellularCommand,
    DataReport {
        config: crate::types::MqttPlatform,
    },
    Sleep,
}

/// The request currently on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub endpoint: &'static str,
    pub reply: Reply,
}

/// FIFO of device calls with at most one request outstanding
#[derive(Debug, Default)]
pub struct Transport {
    pub queue: VecDeque<(DeviceCall, Reply)>,
    pub in_flight: Option<InFlight>,
    /// Total number of requests handed to the HTTP layer
    pub issued: u64,
}

impl Transport {
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }

    /// Pops the next call if nothing is outstanding and marks it in flight
    pub fn next_call(&mut self) -> Option<(DeviceCall, Reply)> {
        if self.in_flight.is_some() {
            return None;
        }
        let (call, reply) = self.queue.pop_front()?;
        self.in_flight = Some(InFlight {
            endpoint: call.endpoint(),
            reply: reply.clone(),
        });
        self.issued += 1;
        Some((call, reply))
    }

    pub fn complete(&mut self) -> Option<InFlight> {
        self.in_flight.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_call_waits_for_completion() {
        let mut transport = Transport::default();
        transport
            .queue
            .push_back((DeviceCall::GetDevInfo, Reply::WifiList));
        transport
            .queue
            .push_back((DeviceCall::GetWifiList, Reply::WifiList));

        let first = transport.next_call().map(|(call, _)| call);
        assert_eq!(first, Some(DeviceCall::GetDevInfo));
        assert_eq!(transport.next_call(), None);
        assert_eq!(transport.queue.len(), 1);

        transport.complete();
        let second = transport.next_call().map(|(call, _)| call);
        assert_eq!(second, Some(DeviceCall::GetWifiList));
        assert_eq!(transport.issued, 2);
    }

    #[test]
    fn upload_is_binary_post() {
        let call = DeviceCall::UploadCredential {
            slot: CredentialSlot::Key,
            file_name: "client.key".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(call.is_post());
        assert_eq!(call.endpoint(), "/network/uploadMqttKey");
        assert_eq!(
            call.into_payload().unwrap(),
            Payload::Binary {
                file_name: "client.key".to_string(),
                bytes: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn gets_have_no_body() {
        assert!(!DeviceCall::GetPlatformParam.is_post());
        assert_eq!(
            DeviceCall::GetPlatformParam.into_payload().unwrap(),
            Payload::None
        );
    }

    #[test]
    fn join_body_uses_device_names() {
        let call = DeviceCall::SetWifiParam(DevWifiJoin {
            ssid: "Home".to_string(),
            password: "secret".to_string(),
        });
        assert_eq!(
            call.into_payload().unwrap(),
            Payload::Json(r#"{"ssid":"Home","password":"secret"}"#.to_string())
        );
    }
}
