use std::time::Duration;
use crate::domain::{EvaluatorConfig, DEFAULT_HISTORY_LIMIT};

/// How long "Error" stays on the display before the calculator resets.
pub const DEFAULT_ERROR_DISPLAY: Duration = Duration::from_millis(2000);

/// Runtime settings for a calculator session.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tcalc::application::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.history_limit, 50);
/// assert_eq!(settings.error_display, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Maximum number of history entries kept
    pub history_limit: usize,
    /// Time the error state is shown before reverting
    pub error_display: Duration,
    /// Options passed to every evaluation
    pub evaluator: EvaluatorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            error_display: DEFAULT_ERROR_DISPLAY,
            evaluator: EvaluatorConfig::default(),
        }
    }
}
