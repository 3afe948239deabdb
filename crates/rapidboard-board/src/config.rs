//! Board configuration.

use serde::{Deserialize, Serialize};

/// Placeholder in [`BoardConfig::failure_text`] replaced by the raw error.
pub const ERROR_PLACEHOLDER: &str = "{error}";

/// How a [`BoardHandler`](crate::BoardHandler) presents itself.
///
/// Serializable so games can ship it as data next to their UI layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Refresh automatically when the board is enabled.
    pub refresh_on_enable: bool,

    /// Info text while a pipeline is running.
    pub loading_text: String,

    /// Info text after a failure. `{error}` is replaced by the raw error
    /// message.
    pub failure_text: String,

    /// Info text after a successful pipeline.
    pub success_text: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            refresh_on_enable: false,
            loading_text: "Loading...".to_string(),
            failure_text: "Something went wrong \n{error}".to_string(),
            success_text: String::new(),
        }
    }
}

impl BoardConfig {
    /// Turns refresh-on-enable on or off.
    pub fn with_refresh_on_enable(mut self, enabled: bool) -> Self {
        self.refresh_on_enable = enabled;
        self
    }

    /// Sets the loading text.
    pub fn with_loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    /// Sets the failure template.
    pub fn with_failure_text(mut self, text: impl Into<String>) -> Self {
        self.failure_text = text.into();
        self
    }

    /// Sets the success text.
    pub fn with_success_text(mut self, text: impl Into<String>) -> Self {
        self.success_text = text.into();
        self
    }

    /// The failure template with `error` substituted.
    pub fn failure_message(&self, error: &str) -> String {
        self.failure_text.replace(ERROR_PLACEHOLDER, error)
    }
}
