//! One-shot timers run by the Shell.

use crux_core::capability::Operation;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::RequestBuilder;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOperation {
    Start { id: String, millis: u64 },
    /// Cancels a started timer; its `Start` request then resolves with `Cancelled`
    Cancel { id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOutput {
    Fired { id: String },
    Cancelled { id: String },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

/// Command-based Timer API
pub struct Timer<Effect, Event> {
    _effect: PhantomData<Effect>,
    _event: PhantomData<Event>,
}

impl<Effect, Event> Timer<Effect, Event>
where
    Effect: Send + From<crux_core::Request<TimerOperation>> + 'static,
    Event: Send + 'static,
{
    pub fn start(
        id: impl Into<String>,
        millis: u64,
    ) -> RequestBuilder<TimerOperation, Effect, Event> {
        RequestBuilder::new(TimerOperation::Start {
            id: id.into(),
            millis,
        })
    }

    pub fn cancel(id: impl Into<String>) -> RequestBuilder<TimerOperation, Effect, Event> {
        RequestBuilder::new(TimerOperation::Cancel { id: id.into() })
    }
}
