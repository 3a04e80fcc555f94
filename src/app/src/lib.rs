pub mod api;
pub mod commands;
pub mod events;
pub mod http_helpers;
pub mod macros;
pub mod messages;
pub mod model;
pub mod types;
pub mod update;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use crux_core::Command;

// Re-export core types
pub use crate::{
    commands::{
        dialog::{DialogOperation, DialogOutput},
        file::{FileOperation, FileOutput},
        timer::{TimerOperation, TimerOutput},
    },
    events::{CredentialEvent, Event, MonitorEvent, SettingsEvent, UiEvent, WlanEvent},
    http_helpers::{build_url, API_PREFIX, BASE_URL},
    model::{Model, ViewModel},
    types::*,
};
pub use crux_http::Result as HttpResult;

#[crux_macros::effect(typegen)]
pub enum Effect {
    Render(crux_core::render::RenderOperation),
    Http(crux_http::protocol::HttpRequest),
    Dialog(DialogOperation),
    Timer(TimerOperation),
    File(FileOperation),
}

pub type HttpCmd = crux_http::command::Http<Effect, Event>;
pub type DialogCmd = crate::commands::dialog::Dialog<Effect, Event>;
pub type TimerCmd = crate::commands::timer::Timer<Effect, Event>;
pub type FileCmd = crate::commands::file::File<Effect, Event>;

/// The Core application
#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Effect = Effect;

    fn update(&self, event: Self::Event, model: &mut Self::Model) -> Command<Effect, Event> {
        update::update(event, model)
    }

    fn view(&self, model: &Self::Model) -> Self::ViewModel {
        ViewModel::from(model)
    }
}
