//! Wire format of the camera's `/api/v1` JSON API.
//!
//! The firmware encodes booleans as integers and uses its own field names
//! (`bAuthenticate`, `isConnected`). These types absorb that and are mapped into the
//! domain types via `From`, so nothing outside `api`/`update` sees the wire shapes.

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionState, DeviceInfo, MqttPlatform, NetworkEntry};

/// Generic success code of every write endpoint
pub const RESULT_OK: i32 = 1000;
/// `setWifiParam`: station associated
pub const RESULT_WIFI_CONNECTED: i32 = 1001;

/// `currentPlatformType` selecting the MQTT platform
pub const PLATFORM_TYPE_MQTT: i32 = 1;

mod int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(i32::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(i64::deserialize(deserializer)? != 0)
    }
}

/// `{ "result": n }` reply of write endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevResult {
    pub result: i32,
}

impl DevResult {
    pub fn is_ok(&self) -> bool {
        self.result == RESULT_OK
    }
}

/// Reply of `sendCellularCommand`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevCommandReply {
    pub result: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DevWifiNode {
    pub ssid: String,
    pub rssi: i32,
    #[serde(rename = "bAuthenticate", with = "int_bool")]
    pub authenticate: bool,
}

impl From<DevWifiNode> for NetworkEntry {
    fn from(dev: DevWifiNode) -> Self {
        Self {
            ssid: dev.ssid,
            rssi: dev.rssi,
            is_encrypted: dev.authenticate,
            status: ConnectionState::Disconnected,
        }
    }
}

/// Reply of `getWifiList`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevWifiList {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub nodes: Vec<DevWifiNode>,
}

/// Reply of `getWifiParam`: the last network the station joined
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DevWifiParam {
    pub ssid: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, with = "int_bool")]
    pub is_connected: bool,
}

/// Body of `setWifiParam`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevWifiJoin {
    pub ssid: String,
    pub password: String,
}

/// Body of `setDevTime`; `ts` in seconds since the epoch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevTime {
    pub tz: String,
    pub ts: u64,
}

/// Body of the region change on `setDevInfo`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DevCountryCode {
    pub country_code: String,
}

/// Body of `sendCellularCommand`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevCellularCommand {
    pub command: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DevDeviceInfo {
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

impl From<DevDeviceInfo> for DeviceInfo {
    fn from(dev: DevDeviceInfo) -> Self {
        Self {
            name: dev.name,
            mac: dev.mac,
            sn: dev.sn,
            hard_version: dev.hard_version,
            soft_version: dev.soft_version,
            model: dev.model,
            country_code: dev.country_code,
            netmod: dev.netmod,
            camera: dev.camera,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DevMqttPlatform {
    pub host: String,
    pub mqtt_port: u32,
    pub topic: String,
    pub client_id: String,
    pub qos: u8,
    pub username: String,
    pub password: String,
    #[serde(with = "int_bool")]
    pub is_connected: bool,
    #[serde(with = "int_bool")]
    pub tls_enable: bool,
    pub ca_name: String,
    pub cert_name: String,
    pub key_name: String,
}

impl From<DevMqttPlatform> for MqttPlatform {
    fn from(dev: DevMqttPlatform) -> Self {
        Self {
            host: dev.host,
            mqtt_port: dev.mqtt_port,
            topic: dev.topic,
            client_id: dev.client_id,
            qos: dev.qos,
            username: dev.username,
            password: dev.password,
            tls_enable: dev.tls_enable,
            ca_name: dev.ca_name,
            cert_name: dev.cert_name,
            key_name: dev.key_name,
        }
    }
}

impl From<MqttPlatform> for DevMqttPlatform {
    fn from(config: MqttPlatform) -> Self {
        Self {
            host: config.host,
            mqtt_port: config.mqtt_port,
            topic: config.topic,
            client_id: config.client_id,
            qos: config.qos,
            username: config.username,
            password: config.password,
            is_connected: false,
            tls_enable: config.tls_enable,
            ca_name: config.ca_name,
            cert_name: config.cert_name,
            key_name: config.key_name,
        }
    }
}

/// `getPlatformParam` reply and `setPlatformParam` body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DevPlatformParam {
    #[serde(default)]
    pub current_platform_type: i32,
    /// Sensing platform block, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensing_platform: Option<serde_json::Value>,
    #[serde(default)]
    pub mqtt_platform: DevMqttPlatform,
}

impl DevPlatformParam {
    pub fn mqtt(config: MqttPlatform) -> Self {
        Self {
            current_platform_type: PLATFORM_TYPE_MQTT,
            sensing_platform: None,
            mqtt_platform: config.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_list_maps_authenticate_flag() {
        let list: DevWifiList = serde_json::from_str(
            r#"{"count":2,"nodes":[{"ssid":"open","rssi":-40,"bAuthenticate":0},{"ssid":"home","rssi":-70,"bAuthenticate":1}]}"#,
        )
        .unwrap();

        let entries: Vec<NetworkEntry> = list.nodes.into_iter().map(Into::into).collect();
        assert!(!entries[0].is_encrypted);
        assert!(entries[1].is_encrypted);
        assert_eq!(entries[1].status, ConnectionState::Disconnected);
    }

    #[test]
    fn platform_param_reads_int_booleans() {
        let param: DevPlatformParam = serde_json::from_str(
            r#"{"currentPlatformType":1,"sensingPlatform":{"host":"s"},"mqttPlatform":{"host":"broker","mqttPort":1883,"topic":"t","isConnected":1,"tlsEnable":0,"caName":"ca.pem"}}"#,
        )
        .unwrap();

        assert!(param.mqtt_platform.is_connected);
        let config = MqttPlatform::from(param.mqtt_platform);
        assert!(!config.tls_enable);
        assert_eq!(config.ca_name, "ca.pem");
        assert_eq!(config.cert_name, "");
    }

    #[test]
    fn platform_body_writes_int_booleans() {
        let body = DevPlatformParam::mqtt(MqttPlatform {
            host: "broker".to_string(),
            tls_enable: true,
            ..Default::default()
        });
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();

        assert_eq!(json["currentPlatformType"], 1);
        assert_eq!(json["mqttPlatform"]["tlsEnable"], 1);
        assert!(json.get("sensingPlatform").is_none());
    }
}
