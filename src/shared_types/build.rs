use anyhow::Result;
use camcfg_core::{
    commands::{
        dialog::{DialogOperation, DialogOutput},
        file::{FileOperation, FileOutput},
        timer::{TimerOperation, TimerOutput},
    },
    events::{CredentialEvent, MonitorEvent, SettingsEvent, UiEvent, WlanEvent},
    types::{
        BootstrapPhase, BootstrapStep, CredentialSlot, MonitorState, NetworkMode, RegionState,
        RequestState, ScanState, SettingsTarget, SlotPhase, WlanPhase,
    },
    App,
};
use crux_core::typegen::TypeGen;
use std::path::PathBuf;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=../app");

    let mut gen = TypeGen::new();

    gen.register_app::<App>()?;

    // Domain event enums, so that every variant is traced
    gen.register_type::<WlanEvent>()?;
    gen.register_type::<CredentialEvent>()?;
    gen.register_type::<MonitorEvent>()?;
    gen.register_type::<SettingsEvent>()?;
    gen.register_type::<UiEvent>()?;

    // Shell-side capability protocols
    gen.register_type::<DialogOperation>()?;
    gen.register_type::<DialogOutput>()?;
    gen.register_type::<TimerOperation>()?;
    gen.register_type::<TimerOutput>()?;
    gen.register_type::<FileOperation>()?;
    gen.register_type::<FileOutput>()?;

    // State enums carried by the view model
    gen.register_type::<BootstrapStep>()?;
    gen.register_type::<BootstrapPhase>()?;
    gen.register_type::<CredentialSlot>()?;
    gen.register_type::<MonitorState>()?;
    gen.register_type::<NetworkMode>()?;
    gen.register_type::<RegionState>()?;
    gen.register_type::<RequestState>()?;
    gen.register_type::<ScanState>()?;
    gen.register_type::<SettingsTarget>()?;
    gen.register_type::<SlotPhase>()?;
    gen.register_type::<WlanPhase>()?;

    let output_root = PathBuf::from("./generated");

    gen.typescript("shared_types", output_root.join("typescript"))?;

    Ok(())
}
