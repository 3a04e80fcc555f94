use camcfg_core::{BootstrapPhase, ConnectionState, SlotPhase, WlanPhase};
use camcfg_shell::{
    config::DeviceConfig,
    http_client::DeviceClient,
    shell::{Message, Shell},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

#[derive(Clone, Debug)]
struct Recorded {
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// Minimal HTTP/1.1 camera: one canned JSON reply per path, every request recorded
struct MockDevice {
    url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockDevice {
    async fn start(routes: &[(&str, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("http://{}", listener.local_addr().expect("addr"));
        let routes: Arc<HashMap<String, String>> = Arc::new(
            routes
                .iter()
                .map(|(path, body)| (format!("/api/v1{path}"), body.to_string()))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move { serve(stream, &routes, &recorded).await });
            }
        });

        Self { url, requests }
    }

    fn client(&self) -> DeviceClient {
        DeviceClient::new(&DeviceConfig {
            url: self.url.clone(),
            request_timeout: Duration::from_secs(5),
        })
        .expect("client")
    }

    fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("lock")
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }

    fn last(&self, path: &str) -> Recorded {
        self.requests
            .lock()
            .expect("lock")
            .iter()
            .rev()
            .find(|r| r.path == format!("/api/v1{path}"))
            .cloned()
            .expect("request recorded")
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: &HashMap<String, String>,
    recorded: &Mutex<Vec<Recorded>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await.expect("read");
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.lines();
    let path = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_lowercase(), value.trim().to_string()))
        .collect();
    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + length {
        let n = stream.read(&mut chunk).await.expect("read body");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = buf[head_end..].to_vec();

    let (status, reply) = match routes.get(&path) {
        Some(reply) => ("200 OK", reply.clone()),
        None => ("404 Not Found", String::new()),
    };
    recorded.lock().expect("lock").push(Recorded {
        path,
        headers,
        body,
    });

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n{reply}",
        reply.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

const WLAN_CAMERA: &[(&str, &str)] = &[
    ("/system/setDevTime", r#"{"result":1000}"#),
    (
        "/system/getDevInfo",
        r#"{"name":"cam","mac":"aa:bb","sn":"SN1","hardVersion":"1","softVersion":"2.0","model":"X1","countryCode":"EU","netmod":"wifi","camera":"ov"}"#,
    ),
    ("/image/getLightParam", r#"{"lightMode":1}"#),
    ("/image/getCamParam", r#"{"brightness":50}"#),
    ("/capture/getCapParam", r#"{"bScheCap":0}"#),
    ("/capture/getUploadParam", r#"{"uploadMode":0}"#),
    (
        "/network/getPlatformParam",
        r#"{"currentPlatformType":1,"mqttPlatform":{"host":"broker","mqttPort":1883,"topic":"t","isConnected":1}}"#,
    ),
    (
        "/network/getWifiList",
        r#"{"count":2,"nodes":[{"ssid":"Office","rssi":-60,"bAuthenticate":1},{"ssid":"Guest","rssi":-80,"bAuthenticate":0}]}"#,
    ),
    ("/network/getWifiParam", r#"{"ssid":"","isConnected":0}"#),
    ("/network/setWifiParam", r#"{"result":1001}"#),
    ("/network/uploadMqttCa", r#"{"result":1000}"#),
];

async fn bootstrapped(device: &MockDevice) -> Shell {
    let mut shell = Shell::new(device.client()).quiet();
    shell.initialize("UTC").await;
    shell.settle().await;
    shell
}

#[tokio::test]
async fn bootstrap_loads_device_state() {
    let device = MockDevice::start(WLAN_CAMERA).await;

    let shell = bootstrapped(&device).await;
    let view = shell.view();

    assert_eq!(view.bootstrap, BootstrapPhase::Completed);
    assert!(!view.is_loading);
    assert_eq!(view.device_info.map(|info| info.sn), Some("SN1".to_string()));
    assert_eq!(view.networks.len(), 2);
    assert!(view.mqtt_connected);
    assert!(view.monitor_running);

    let paths = device.paths();
    assert_eq!(paths.first().map(String::as_str), Some("/api/v1/system/setDevTime"));
    assert!(!paths.iter().any(|p| p.contains("Cellular")));

    let time = device.last("/system/setDevTime");
    let body: serde_json::Value = serde_json::from_slice(&time.body).expect("json");
    assert_eq!(body["tz"], "UTC");
}

#[tokio::test]
async fn joining_encrypted_network_asks_for_password() {
    let device = MockDevice::start(WLAN_CAMERA).await;
    let mut shell = bootstrapped(&device).await;
    shell.take_output();

    shell
        .handle_message(Message::Line("join Office".to_string()))
        .await;
    assert!(
        shell
            .take_output()
            .iter()
            .any(|line| line.contains("password for Office"))
    );
    assert!(matches!(
        shell.view().wlan_phase,
        WlanPhase::AwaitingPassword { .. }
    ));

    shell
        .handle_message(Message::Line("hunter22".to_string()))
        .await;
    shell.settle().await;

    let join = device.last("/network/setWifiParam");
    let body: serde_json::Value = serde_json::from_slice(&join.body).expect("json");
    assert_eq!(body["ssid"], "Office");
    assert_eq!(body["password"], "hunter22");

    let view = shell.view();
    assert_eq!(
        view.wlan_phase,
        WlanPhase::Connected {
            ssid: "Office".to_string()
        }
    );
    let office = view
        .networks
        .iter()
        .find(|n| n.ssid == "Office")
        .expect("office listed");
    assert_eq!(office.status, ConnectionState::Connected);
}

#[tokio::test]
async fn credential_file_is_uploaded_from_disk() {
    let device = MockDevice::start(WLAN_CAMERA).await;
    let mut shell = bootstrapped(&device).await;

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("root-ca.pem");
    std::fs::write(&path, b"-----BEGIN CERTIFICATE-----\n").expect("write");

    shell
        .handle_message(Message::Line(format!("select ca {}", path.display())))
        .await;
    shell.settle().await;

    let upload = device.last("/network/uploadMqttCa");
    assert_eq!(upload.body, b"-----BEGIN CERTIFICATE-----\n");
    assert!(
        upload
            .headers
            .iter()
            .any(|(name, value)| name == "x-file-name" && value == "root-ca.pem")
    );

    let view = shell.view();
    assert_eq!(view.credentials[0].file_name, "root-ca.pem");
    assert_eq!(view.credentials[0].phase, SlotPhase::Idle);
}

#[tokio::test]
async fn unreachable_device_fails_bootstrap() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let client = DeviceClient::new(&DeviceConfig {
        url,
        request_timeout: Duration::from_secs(5),
    })
    .expect("client");
    let mut shell = Shell::new(client).quiet();
    shell.initialize("UTC").await;
    shell.settle().await;

    let view = shell.view();
    assert!(matches!(view.bootstrap, BootstrapPhase::Failed { .. }));
    assert!(view.error_message.is_some());
    assert!(!view.is_loading);
}
