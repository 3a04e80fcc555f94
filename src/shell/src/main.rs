use anyhow::{Context, Result};
use camcfg_shell::{
    config::AppConfig,
    http_client::DeviceClient,
    shell::{Message, Shell},
};
use env_logger::{Builder, Env, Target};
use log::{error, info};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    initialize();

    let config = AppConfig::get().context("failed to load configuration")?;
    info!("configuring device at {}", config.device.url);

    let client = DeviceClient::new(&config.device)?;
    let mut shell = Shell::new(client);

    let input = shell.sender();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let message = match lines.next_line().await {
                Ok(Some(line)) => Message::Line(line),
                Ok(None) => Message::Quit,
                Err(e) => {
                    error!("failed to read stdin: {e}");
                    Message::Quit
                }
            };
            let quit = matches!(message, Message::Quit);
            if input.send(message).is_err() || quit {
                break;
            }
        }
    });

    shell.run(&config.time_zone).await
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    // stdout belongs to the terminal UI
    builder.format(|f, record| writeln!(f, "[{}] {}", record.level(), record.args()));
    builder.target(Target::Stderr).init();

    info!("camcfg version: {}", env!("CARGO_PKG_VERSION"));
}
