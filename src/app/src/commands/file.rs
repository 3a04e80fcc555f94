//! Access to files the operator picked in the Shell.

use crux_core::capability::Operation;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::RequestBuilder;
use crate::types::CredentialSlot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileOperation {
    /// Read the whole file behind `handle`
    Read { handle: u32 },
    /// Clear the file input of `slot` so the same file can be picked again
    ResetInput { slot: CredentialSlot },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileOutput {
    Contents { bytes: Vec<u8> },
    Error { message: String },
    Reset,
}

impl Operation for FileOperation {
    type Output = FileOutput;
}

/// Command-based File API
pub struct File<Effect, Event> {
    _effect: PhantomData<Effect>,
    _event: PhantomData<Event>,
}

impl<Effect, Event> File<Effect, Event>
where
    Effect: Send + From<crux_core::Request<FileOperation>> + 'static,
    Event: Send + 'static,
{
    pub fn read(handle: u32) -> RequestBuilder<FileOperation, Effect, Event> {
        RequestBuilder::new(FileOperation::Read { handle })
    }

    pub fn reset_input(slot: CredentialSlot) -> RequestBuilder<FileOperation, Effect, Event> {
        RequestBuilder::new(FileOperation::ResetInput { slot })
    }
}
