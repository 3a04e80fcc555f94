use anyhow::{Context, Result};
use camcfg_core::BASE_URL;
use crux_http::{
    HttpError,
    protocol::{HttpRequest, HttpResponse, HttpResult},
};
use log::debug;
use reqwest::{Client, Method};

use crate::config::DeviceConfig;

/// Executes the core's HTTP effects against the camera
#[derive(Clone, Debug)]
pub struct DeviceClient {
    client: Client,
    base_url: String,
}

impl DeviceClient {
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to create device HTTP client")?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }

    /// Rewrites the core's placeholder origin to the configured device.
    /// URLs with any other origin pass through untouched.
    pub fn device_url(&self, url: &str) -> String {
        match url.strip_prefix(BASE_URL) {
            Some(path) => format!("{}{path}", self.base_url),
            None => url.to_string(),
        }
    }

    pub async fn execute(&self, request: HttpRequest) -> HttpResult {
        match self.send(request).await {
            Ok(response) => HttpResult::Ok(response),
            Err(e) => HttpResult::Err(e),
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| HttpError::Url(format!("invalid method {}: {e}", request.method)))?;
        let url = self.device_url(&request.url);
        debug!("{method} {url}");

        let mut builder = self.client.request(method, &url).body(request.body);
        for header in request.headers {
            builder = builder.header(header.name, header.value);
        }

        let response = builder.send().await.map_err(into_http_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(into_http_error)?;

        Ok(HttpResponse::status(status).body(body.to_vec()).build())
    }
}

fn into_http_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> DeviceClient {
        DeviceClient::new(&DeviceConfig {
            url: "http://10.0.0.7".to_string(),
            request_timeout: Duration::from_secs(1),
        })
        .expect("client")
    }

    #[test]
    fn placeholder_origin_is_replaced() {
        assert_eq!(
            client().device_url("https://relative/api/v1/network/getWifiList"),
            "http://10.0.0.7/api/v1/network/getWifiList"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            client().device_url("http://other/api/v1/x"),
            "http://other/api/v1/x"
        );
    }
}
