//! WebAssembly bindings for the browser shell
//!
//! Events, effects and view models cross the boundary bincode-serialized.

use lazy_static::lazy_static;
use wasm_bindgen::prelude::wasm_bindgen;

use crux_core::{
    bridge::{Bridge, EffectId},
    Core,
};

use crate::App;

lazy_static! {
    static ref CORE: Bridge<App> = Bridge::new(Core::new());
}

/// Set up logging when the module is loaded
#[wasm_bindgen(start)]
pub fn init_wasm() {
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("console logger already installed");
    }
}

/// Process a serialized `Event`, returning the serialized effect requests
#[wasm_bindgen]
pub fn process_event(event_bytes: &[u8]) -> Vec<u8> {
    let mut effects = Vec::new();
    if let Err(e) = CORE.update(event_bytes, &mut effects) {
        log::error!("failed to process event: {e}");
        effects.clear();
    }
    effects
}

/// Current serialized `ViewModel`
#[wasm_bindgen]
pub fn view() -> Vec<u8> {
    let mut view = Vec::new();
    if let Err(e) = CORE.view(&mut view) {
        log::error!("failed to serialize view model: {e}");
        view.clear();
    }
    view
}

/// Resolve effect `id` with the shell's serialized output
#[wasm_bindgen]
pub fn handle_response(id: u32, response_bytes: &[u8]) -> Vec<u8> {
    let mut effects = Vec::new();
    if let Err(e) = CORE.resolve(EffectId(id), response_bytes, &mut effects) {
        log::error!("failed to resolve effect {id}: {e}");
        effects.clear();
    }
    effects
}
