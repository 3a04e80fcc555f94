use anyhow::{Context, Result, ensure};
use std::{env, sync::OnceLock, time::Duration};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Shell configuration, read from the environment once at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Camera the shell talks to
    pub device: DeviceConfig,

    /// Time zone reported to the camera on startup
    pub time_zone: String,
}

#[derive(Clone, Debug)]
pub struct DeviceConfig {
    pub url: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Get or load the configuration
    ///
    /// The first successful call caches the result; later calls return the
    /// cached instance.
    pub fn get() -> Result<&'static Self> {
        if let Some(config) = APP_CONFIG.get() {
            return Ok(config);
        }
        let config = Self::load()?;
        Ok(APP_CONFIG.get_or_init(|| config))
    }

    fn load() -> Result<Self> {
        let device = DeviceConfig::load()?;
        let time_zone = env::var("CAMCFG_TIME_ZONE").unwrap_or_else(|_| "UTC".to_string());

        Ok(Self { device, time_zone })
    }
}

impl DeviceConfig {
    fn load() -> Result<Self> {
        let url = env::var("CAMCFG_DEVICE_URL")
            .unwrap_or_else(|_| "http://192.168.1.1".to_string())
            .trim_end_matches('/')
            .to_string();
        ensure!(
            url.starts_with("http://") || url.starts_with("https://"),
            "failed to parse CAMCFG_DEVICE_URL: expected an http(s) URL, got {url}"
        );

        let request_timeout = env::var("CAMCFG_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("failed to parse CAMCFG_REQUEST_TIMEOUT_SECS: invalid format")?;
        ensure!(
            request_timeout > 0,
            "failed to parse CAMCFG_REQUEST_TIMEOUT_SECS: must be positive"
        );

        Ok(Self {
            url,
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}
