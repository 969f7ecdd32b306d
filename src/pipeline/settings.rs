//! Runtime settings.
//!
//! Per-thread knobs read by the frame clock and the patcher. Defaults come
//! from [`Settings::default`]; [`Settings::from_env`] layers environment
//! overrides on top for hosts that want them.

use std::cell::Cell;
use std::env;

/// Environment variable: cap on frame callbacks run per tick.
pub const ENV_MAX_CALLBACKS: &str = "SPARK_VDOM_MAX_CALLBACKS";

/// Environment variable: set to `1`/`true` to trace every applied operation.
pub const ENV_TRACE_OPERATIONS: &str = "SPARK_VDOM_TRACE_OPS";

/// Runtime configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    /// Maximum callbacks one [`crate::tick`] runs; the rest stay queued.
    /// `None` runs everything that was queued before the tick.
    pub max_callbacks_per_tick: Option<usize>,
    /// Emit a `trace` event for every applied operation.
    pub trace_operations: bool,
}

impl Settings {
    /// Defaults overridden by `SPARK_VDOM_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(raw) = env::var(ENV_MAX_CALLBACKS) {
            match raw.trim().parse::<usize>() {
                Ok(0) => settings.max_callbacks_per_tick = None,
                Ok(limit) => settings.max_callbacks_per_tick = Some(limit),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {ENV_MAX_CALLBACKS}"),
            }
        }

        if let Ok(raw) = env::var(ENV_TRACE_OPERATIONS) {
            settings.trace_operations = matches!(raw.trim(), "1" | "true" | "yes");
        }

        settings
    }
}

thread_local! {
    static SETTINGS: Cell<Settings> = const {
        Cell::new(Settings { max_callbacks_per_tick: None, trace_operations: false })
    };
}

/// Current settings for this thread.
pub fn settings() -> Settings {
    SETTINGS.with(|s| s.get())
}

/// Replace the settings for this thread.
pub fn set_settings(settings: Settings) {
    SETTINGS.with(|s| s.set(settings));
}

/// Restore defaults.
pub fn reset_settings() {
    set_settings(Settings::default());
}
