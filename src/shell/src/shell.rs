use anyhow::Result;
use camcfg_core::{
    App, CredentialEvent, DialogOperation, Effect, Event, FileOperation, FileOutput,
    MonitorEvent, SettingsEvent, TimerOperation, TimerOutput, UiEvent, ViewModel, WlanEvent,
};
use crux_core::{Core, Request};
use crux_http::protocol::{HttpRequest, HttpResult};
use log::{debug, error, info, warn};
use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::AbortHandle,
};

use crate::{
    files::FileRegistry,
    http_client::DeviceClient,
    terminal::{self, UserCommand},
};

/// Inputs the shell waits on
#[derive(Debug)]
pub enum Message {
    Line(String),
    HttpDone { id: u64, result: HttpResult },
    TimerFired { id: String },
    Quit,
}

struct PendingTimer {
    request: Request<TimerOperation>,
    abort: AbortHandle,
}

/// Hosts the core and executes its effects
pub struct Shell {
    core: Core<App>,
    client: DeviceClient,
    files: FileRegistry,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    next_http_id: u64,
    http: HashMap<u64, Request<HttpRequest>>,
    dialogs: VecDeque<Request<DialogOperation>>,
    timers: HashMap<String, PendingTimer>,
    last_summary: String,
    output: Vec<String>,
    echo: bool,
}

impl Shell {
    pub fn new(client: DeviceClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            core: Core::new(),
            client,
            files: FileRegistry::default(),
            tx,
            rx,
            next_http_id: 0,
            http: HashMap::new(),
            dialogs: VecDeque::new(),
            timers: HashMap::new(),
            last_summary: String::new(),
            output: Vec::new(),
            echo: true,
        }
    }

    /// Collect terminal output instead of printing it
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Sender for feeding input lines from outside
    pub fn sender(&self) -> UnboundedSender<Message> {
        self.tx.clone()
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    /// Output collected while quiet, oldest first
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Starts the core for the device's current time and runs until `Quit`
    pub async fn run(&mut self, time_zone: &str) -> Result<()> {
        self.initialize(time_zone).await;

        while let Some(message) = self.rx.recv().await {
            if matches!(message, Message::Quit) {
                break;
            }
            self.handle_message(message).await;
        }

        info!("shutting down");
        self.dispatch(Event::Dispose).await;
        Ok(())
    }

    pub async fn initialize(&mut self, time_zone: &str) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        self.dispatch(Event::Initialize {
            time_zone: time_zone.to_string(),
            timestamp,
        })
        .await;
    }

    /// Handles messages until no HTTP request is outstanding
    pub async fn settle(&mut self) {
        while !self.http.is_empty() {
            let Some(message) = self.rx.recv().await else {
                break;
            };
            self.handle_message(message).await;
        }
    }

    pub async fn handle_message(&mut self, message: Message) {
        match message {
            Message::Line(line) => self.handle_line(&line).await,
            Message::HttpDone { id, result } => match self.http.remove(&id) {
                Some(mut request) => self.resolve(&mut request, result).await,
                None => warn!("completion for unknown request {id}"),
            },
            Message::TimerFired { id } => match self.timers.remove(&id) {
                Some(mut timer) => {
                    self.resolve(&mut timer.request, TimerOutput::Fired { id })
                        .await
                }
                None => debug!("timer {id} already cancelled"),
            },
            Message::Quit => {}
        }
    }

    async fn handle_line(&mut self, line: &str) {
        if let Some(mut dialog) = self.dialogs.pop_front() {
            let answer = terminal::dialog_answer(&dialog.operation, line);
            self.resolve(&mut dialog, answer).await;
            self.prompt_next_dialog();
            return;
        }

        if line.trim().is_empty() {
            return;
        }

        match terminal::parse_command(line) {
            Ok(command) => self.handle_command(command).await,
            Err(e) => self.print(format!("{e:#}")),
        }
    }

    async fn handle_command(&mut self, command: UserCommand) {
        let event = match command {
            UserCommand::Scan => Event::Wlan(WlanEvent::Scan),
            UserCommand::Join(ssid) => Event::Wlan(WlanEvent::SelectNetwork { ssid }),
            UserCommand::Region(country_code) => {
                Event::Wlan(WlanEvent::ChangeRegion { country_code })
            }
            UserCommand::Select(slot, path) => {
                let file = match self.files.select(slot, &path).await {
                    Ok(file) => Some(file),
                    Err(e) => {
                        self.print(format!("{e:#}"));
                        None
                    }
                };
                Event::Credential(CredentialEvent::FileSelected { slot, file })
            }
            UserCommand::Clear(slot) => {
                Event::Credential(CredentialEvent::ClearRequested { slot })
            }
            UserCommand::Save(target, config) => {
                Event::Settings(SettingsEvent::Save { target, config })
            }
            UserCommand::Cellular(config) => {
                Event::Settings(SettingsEvent::SaveCellular { config })
            }
            UserCommand::At(command) => {
                Event::Settings(SettingsEvent::SendCellularCommand { command })
            }
            UserCommand::Mqtt(config) => {
                Event::Settings(SettingsEvent::SaveDataReport { config })
            }
            UserCommand::Sleep => Event::Settings(SettingsEvent::RequestSleep),
            UserCommand::Monitor(true) => Event::Monitor(MonitorEvent::Start),
            UserCommand::Monitor(false) => Event::Monitor(MonitorEvent::Stop),
            UserCommand::Dismiss => {
                self.dispatch(Event::Ui(UiEvent::ClearError)).await;
                Event::Ui(UiEvent::ClearSuccess)
            }
            UserCommand::View => {
                match serde_json::to_string_pretty(&self.view()) {
                    Ok(json) => self.print(json),
                    Err(e) => error!("failed to serialize view model: {e}"),
                }
                return;
            }
            UserCommand::Help => {
                self.print(terminal::HELP.to_string());
                return;
            }
            UserCommand::Quit => {
                let _ = self.tx.send(Message::Quit);
                return;
            }
        };

        self.dispatch(event).await;
    }

    pub async fn dispatch(&mut self, event: Event) {
        let effects = self.core.process_event(event);
        self.process_effects(effects).await;
    }

    async fn resolve<Op>(&mut self, request: &mut Request<Op>, output: Op::Output)
    where
        Op: crux_core::capability::Operation,
    {
        match self.core.resolve(request, output) {
            Ok(effects) => self.process_effects(effects).await,
            Err(e) => error!("failed to resolve effect: {e}"),
        }
    }

    async fn process_effects(&mut self, effects: Vec<Effect>) {
        let mut queue = VecDeque::from(effects);

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Render(_) => self.render(),
                Effect::Http(request) => self.start_http(request),
                Effect::Dialog(request) => {
                    self.dialogs.push_back(request);
                    if self.dialogs.len() == 1 {
                        self.prompt_next_dialog();
                    }
                }
                Effect::Timer(request) => queue.extend(self.handle_timer(request)),
                Effect::File(mut request) => {
                    let output = match &request.operation {
                        FileOperation::Read { handle } => self.files.read(*handle).await,
                        FileOperation::ResetInput { slot } => {
                            self.files.reset(*slot);
                            FileOutput::Reset
                        }
                    };
                    match self.core.resolve(&mut request, output) {
                        Ok(effects) => queue.extend(effects),
                        Err(e) => error!("failed to resolve file effect: {e}"),
                    }
                }
            }
        }
    }

    fn start_http(&mut self, request: Request<HttpRequest>) {
        self.next_http_id += 1;
        let id = self.next_http_id;
        let operation = request.operation.clone();
        self.http.insert(id, request);

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.execute(operation).await;
            if tx.send(Message::HttpDone { id, result }).is_err() {
                debug!("shell gone before request {id} completed");
            }
        });
    }

    fn handle_timer(&mut self, mut request: Request<TimerOperation>) -> Vec<Effect> {
        match request.operation.clone() {
            TimerOperation::Start { id, millis } => {
                let tx = self.tx.clone();
                let fired = id.clone();
                let abort = tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(millis)).await;
                    let _ = tx.send(Message::TimerFired { id: fired });
                })
                .abort_handle();

                let timer = PendingTimer { request, abort };
                if let Some(previous) = self.timers.insert(id.clone(), timer) {
                    warn!("timer {id} restarted");
                    previous.abort.abort();
                }
                Vec::new()
            }
            TimerOperation::Cancel { id } => {
                let mut effects = Vec::new();
                if let Some(mut timer) = self.timers.remove(&id) {
                    timer.abort.abort();
                    let output = TimerOutput::Cancelled { id: id.clone() };
                    self.resolve_sync(&mut timer.request, output, &mut effects);
                }
                self.resolve_sync(&mut request, TimerOutput::Cancelled { id }, &mut effects);
                effects
            }
        }
    }

    fn resolve_sync(
        &self,
        request: &mut Request<TimerOperation>,
        output: TimerOutput,
        effects: &mut Vec<Effect>,
    ) {
        match self.core.resolve(request, output) {
            Ok(more) => effects.extend(more),
            Err(e) => error!("failed to resolve timer effect: {e}"),
        }
    }

    fn render(&mut self) {
        let summary = terminal::summary(&self.view());
        if summary != self.last_summary {
            self.print(summary.clone());
            self.last_summary = summary;
        }
    }

    fn prompt_next_dialog(&mut self) {
        if let Some(prompt) = self
            .dialogs
            .front()
            .map(|dialog| terminal::dialog_prompt(&dialog.operation))
        {
            self.print(prompt);
        }
    }

    fn print(&mut self, text: String) {
        if self.echo {
            println!("{text}");
        } else {
            self.output.push(text);
        }
    }
}
