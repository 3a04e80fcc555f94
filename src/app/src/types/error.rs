use serde::{Deserialize, Serialize};
use std::fmt;

use crate::messages;

/// Reason a local, pre-network check failed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    Empty,
    TooLarge,
    BadExtension,
    InvalidField,
}

/// Local, user-correctable error. Never reaches the transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub detail: String,
}

impl ValidationError {
    pub fn new(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Translation key of the message shown to the operator
    pub fn message_key(&self) -> &'static str {
        match self.kind {
            ValidationKind::Empty => messages::FILE_EMPTY,
            ValidationKind::TooLarge => messages::FILE_TOO_LARGE,
            ValidationKind::BadExtension => messages::FILE_BAD_EXTENSION,
            ValidationKind::InvalidField => messages::MQTT_INVALID_CONFIG,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed ({:?}): {}", self.kind, self.detail)
    }
}

/// HTTP or network failure talking to the device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransportError {
    /// HTTP status if the device answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// The device answered but reported a failure result code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainRejection {
    pub code: i32,
}

impl fmt::Display for DomainRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device rejected request with result {}", self.code)
    }
}

/// Any failure of a device call, as seen by the state machines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    Transport(TransportError),
    Rejected(DomainRejection),
    /// The device answered 2xx but the body was not what we expected
    Decode(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => e.fmt(f),
            Self::Rejected(e) => e.fmt(f),
            Self::Decode(e) => write!(f, "unexpected response: {e}"),
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<DomainRejection> for ClientError {
    fn from(e: DomainRejection) -> Self {
        Self::Rejected(e)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
