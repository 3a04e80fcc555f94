//! HTTP helper functions for the Crux Core
//!
//! Turns `crux_http` results into transport errors and decodes the camera's
//! `{result}`-style JSON replies into domain errors.

use crux_http::Response;
use serde::de::DeserializeOwned;

use crate::types::dev::DevResult;
use crate::types::{ClientError, DomainRejection, TransportError};

/// Base URL for device API requests.
///
/// NOTE: This is a dummy prefix required because `crux_http` requires absolute URLs
/// and rejects relative paths (`RelativeUrlWithoutBase` error). The browser shell
/// strips it so requests stay relative to the page origin; the native shell replaces
/// it with the configured device address.
pub const BASE_URL: &str = "https://relative";

/// Version prefix of every device endpoint
pub const API_PREFIX: &str = "/api/v1";

/// Constructs the full address from a given endpoint.
///
/// # Example
/// ```
/// use camcfg_core::http_helpers::build_url;
/// let url = build_url("/network/getWifiList");
/// assert_eq!(url, "https://relative/api/v1/network/getWifiList");
/// ```
pub fn build_url(endpoint: &str) -> String {
    format!("{BASE_URL}{API_PREFIX}{endpoint}")
}

/// Extracts error message from HTTP response.
pub fn extract_error_message(endpoint: &str, response: &mut Response<Vec<u8>>) -> String {
    let status = response.status().to_string();

    match response.take_body() {
        Some(body) if !body.is_empty() => match String::from_utf8(body) {
            Ok(msg) => format!("{endpoint}: {msg}"),
            Err(e) => format!("{endpoint} failed: HTTP {status} (Invalid UTF-8: {e})"),
        },
        _ => format!("{endpoint} failed: HTTP {status} (Empty body)"),
    }
}

/// Reduces a `crux_http` result to the raw body or a transport error.
pub fn process_body_response(
    endpoint: &str,
    result: crux_http::Result<Response<Vec<u8>>>,
) -> Result<Vec<u8>, TransportError> {
    match result {
        Ok(mut response) => {
            if response.status().is_success() {
                Ok(response.take_body().unwrap_or_default())
            } else {
                let status = u16::from(response.status());
                Err(TransportError::http(
                    status,
                    extract_error_message(endpoint, &mut response),
                ))
            }
        }
        Err(e) => Err(TransportError::network(format!("{endpoint}: {e}"))),
    }
}

/// Parse a JSON reply body.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    if body.is_empty() {
        return Err(ClientError::Decode("empty response body".to_string()));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Result code of a `{result}` reply
pub fn result_code(body: &[u8]) -> Result<i32, ClientError> {
    decode::<DevResult>(body).map(|reply| reply.result)
}

/// Accepts only the generic success code
pub fn expect_ok(body: &[u8]) -> Result<(), ClientError> {
    let reply: DevResult = decode(body)?;
    if reply.is_ok() {
        Ok(())
    } else {
        Err(DomainRejection { code: reply.result }.into())
    }
}

/// Validates that a pass-through settings document is a JSON object
pub fn check_json_document(config: &str) -> Result<(), ClientError> {
    match serde_json::from_str::<serde_json::Value>(config)? {
        serde_json::Value::Object(_) => Ok(()),
        other => Err(ClientError::Decode(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Reply body of a pass-through settings fetch, kept as the JSON text
pub fn json_document(body: &[u8]) -> Result<String, ClientError> {
    let text = String::from_utf8(body.to_vec())
        .map_err(|e| ClientError::Decode(format!("invalid UTF-8: {e}")))?;
    check_json_document(&text)?;
    Ok(text)
}

/// Combines a transport result with a body decoder
pub fn with_body<T>(
    result: Result<Vec<u8>, TransportError>,
    decode: impl FnOnce(&[u8]) -> Result<T, ClientError>,
) -> Result<T, ClientError> {
    decode(&result?)
}
