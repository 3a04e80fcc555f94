/// Macro for model field updates with automatic rendering.
/// Supports both single and multiple field updates.
///
/// # Examples
///
/// Single field update:
/// ```ignore
/// update_field!(model.error_message, None)
/// ```
///
/// Multiple field updates:
/// ```ignore
/// update_field!(
///     model.mqtt.is_connected, true;
///     model.error_message, None
/// )
/// ```
#[macro_export]
macro_rules! update_field {
    // Multiple field updates (must come first to match the pattern)
    ($($model_field:expr, $value:expr);+ $(;)?) => {{
        let mut changed = false;
        $(
            let value = $value;
            if $model_field != value {
                $model_field = value;
                changed = true;
            }
        )+
        if changed {
            crux_core::render::render()
        } else {
            crux_core::Command::done()
        }
    }};

    // Single field update
    ($model_field:expr, $value:expr) => {{
        update_field!($model_field, $value;)
    }};
}

/// Macro for commands that are invalid in the current state.
/// Logs the reason at debug level and returns an empty command.
///
/// # Example
///
/// ```ignore
/// if model.wlan.phase.is_connecting() {
///     return reject!("select {ssid}: join in progress");
/// }
/// ```
#[macro_export]
macro_rules! reject {
    ($($arg:tt)+) => {{
        log::debug!("rejected: {}", format_args!($($arg)+));
        crux_core::Command::done()
    }};
}
