mod bootstrap;
mod credentials;
mod monitor;
mod settings;
mod transport;
mod ui;
mod wlan;

use crux_core::Command;

use crate::events::Event;
use crate::model::Model;
use crate::Effect;

/// Main update dispatcher - routes events to domain-specific handlers
pub fn update(event: Event, model: &mut Model) -> Command<Effect, Event> {
    match event {
        Event::Initialize {
            time_zone,
            timestamp,
        } => bootstrap::initialize(model, time_zone, timestamp),
        Event::Dispose => monitor::stop(model),

        Event::Wlan(event) => wlan::handle(event, model),
        Event::Credential(event) => credentials::handle(event, model),
        Event::Monitor(event) => monitor::handle(event, model),
        Event::Settings(event) => settings::handle(event, model),
        Event::Ui(event) => ui::handle(event, model),

        Event::Transport(event) => transport::handle(event, model),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crux_core::Command;

    use crate::api::Reply;
    use crate::commands::{dialog::DialogOperation, file::FileOperation, timer::TimerOperation};
    use crate::events::{Event, TransportEvent};
    use crate::model::Model;
    use crate::types::TransportError;
    use crate::Effect;

    /// Runs `command` until it waits on the shell and returns what it asked for
    pub fn effects(mut command: Command<Effect, Event>) -> Vec<Effect> {
        command.effects().collect()
    }

    pub fn dialogs(effects: &[Effect]) -> Vec<DialogOperation> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Dialog(request) => Some(request.operation.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn files(effects: &[Effect]) -> Vec<FileOperation> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::File(request) => Some(request.operation.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn timers(effects: &[Effect]) -> Vec<TimerOperation> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Timer(request) => Some(request.operation.clone()),
                _ => None,
            })
            .collect()
    }

    /// Endpoints of the queued and in-flight calls, oldest first
    pub fn pending_endpoints(model: &Model) -> Vec<&'static str> {
        model
            .transport
            .in_flight
            .iter()
            .map(|f| f.endpoint)
            .chain(model.transport.queue.iter().map(|(call, _)| call.endpoint()))
            .collect()
    }

    /// The call currently on the wire and its continuation
    pub fn in_flight(model: &Model) -> Option<(&'static str, Reply)> {
        model
            .transport
            .in_flight
            .as_ref()
            .map(|f| (f.endpoint, f.reply.clone()))
    }

    /// Completes the in-flight call with `body` and returns the continuation's reply tag
    pub fn respond(model: &mut Model, body: &str) -> Reply {
        complete(model, Ok(body.as_bytes().to_vec())).0
    }

    /// Like [`respond`], returning the effects the continuation emits
    pub fn respond_effects(model: &mut Model, body: &str) -> Vec<Effect> {
        effects(complete(model, Ok(body.as_bytes().to_vec())).1)
    }

    /// Completes the in-flight call with a network failure
    pub fn fail(model: &mut Model) -> Reply {
        complete(model, Err(TransportError::network("connection refused"))).0
    }

    pub fn fail_effects(model: &mut Model) -> Vec<Effect> {
        effects(complete(model, Err(TransportError::network("connection refused"))).1)
    }

    fn complete(
        model: &mut Model,
        result: Result<Vec<u8>, TransportError>,
    ) -> (Reply, Command<Effect, Event>) {
        let reply = model
            .transport
            .in_flight
            .as_ref()
            .map(|f| f.reply.clone())
            .expect("a request in flight");
        let command = super::update(
            Event::Transport(TransportEvent::Completed {
                reply: reply.clone(),
                result,
            }),
            model,
        );
        (reply, command)
    }
}
