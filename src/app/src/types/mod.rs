//! Domain-based type organization
//!
//! Types are organized by domain to match the structure in `update/`:
//! - bootstrap: startup sequence steps and progress
//! - common: shared request state
//! - dev: wire format of the camera's HTTP API
//! - device: device identity and settings blobs
//! - error: validation, transport and device rejection errors
//! - mqtt: MQTT transport config, credential slots, connection monitor
//! - wlan: network scan entries and the join state machine

pub mod bootstrap;
pub mod common;
pub mod dev;
pub mod device;
pub mod error;
pub mod mqtt;
pub mod wlan;

pub use bootstrap::*;
pub use common::*;
pub use device::*;
pub use error::*;
pub use mqtt::*;
pub use wlan::*;
