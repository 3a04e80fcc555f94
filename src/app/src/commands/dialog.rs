//! Modal dialogs rendered by the Shell.
//!
//! Texts are translation keys; the Shell looks them up before showing the dialog.

use crux_core::capability::Operation;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::RequestBuilder;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DialogOperation {
    /// Message with an OK button and, optionally, a cancel button
    Tips { message: String, show_cancel: bool },
    /// Password form for joining `ssid`; `show_error` marks a rejected password
    Password { ssid: String, show_error: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DialogOutput {
    Confirmed,
    Submitted { password: String },
    Dismissed,
}

impl Operation for DialogOperation {
    type Output = DialogOutput;
}

/// Command-based Dialog API
pub struct Dialog<Effect, Event> {
    _effect: PhantomData<Effect>,
    _event: PhantomData<Event>,
}

impl<Effect, Event> Dialog<Effect, Event>
where
    Effect: Send + From<crux_core::Request<DialogOperation>> + 'static,
    Event: Send + 'static,
{
    /// Informational message, OK only
    pub fn tips(message: &str) -> RequestBuilder<DialogOperation, Effect, Event> {
        RequestBuilder::new(DialogOperation::Tips {
            message: message.to_string(),
            show_cancel: false,
        })
    }

    /// Question the operator confirms or cancels
    pub fn confirm(message: &str) -> RequestBuilder<DialogOperation, Effect, Event> {
        RequestBuilder::new(DialogOperation::Tips {
            message: message.to_string(),
            show_cancel: true,
        })
    }

    pub fn password(
        ssid: impl Into<String>,
        show_error: bool,
    ) -> RequestBuilder<DialogOperation, Effect, Event> {
        RequestBuilder::new(DialogOperation::Password {
            ssid: ssid.into(),
            show_error,
        })
    }
}
