use crux_core::Command;

use crate::events::{Event, UiEvent};
use crate::model::Model;
use crate::update_field;
use crate::{DialogCmd, Effect};

/// Handle UI-related events (clear messages, etc.)
pub fn handle(event: UiEvent, model: &mut Model) -> Command<Effect, Event> {
    match event {
        UiEvent::ClearError => update_field!(model.error_message, None),
        UiEvent::ClearSuccess => update_field!(model.success_message, None),
        UiEvent::Acknowledged => Command::done(),
    }
}

/// Shows an informational dialog; closing it has no effect on the model
pub fn show_tips(message: &str) -> Command<Effect, Event> {
    DialogCmd::tips(message)
        .build()
        .then_send(|_| Event::Ui(UiEvent::Acknowledged))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_messages() {
        let mut model = Model {
            error_message: Some("networkError".to_string()),
            success_message: Some("common.saveSuccess".to_string()),
            ..Default::default()
        };

        let _ = handle(UiEvent::ClearError, &mut model);
        let _ = handle(UiEvent::ClearSuccess, &mut model);

        assert_eq!(model.error_message, None);
        assert_eq!(model.success_message, None);
    }
}
