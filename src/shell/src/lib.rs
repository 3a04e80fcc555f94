//! Terminal shell for the camera configuration core.
//!
//! Executes the core's effects: HTTP against the camera with `reqwest`, dialogs
//! and rendering on the terminal, credential files from disk, timers on `tokio`.

pub mod config;
pub mod files;
pub mod http_client;
pub mod shell;
pub mod terminal;
