//! Per-request model settings.

use serde::{Deserialize, Serialize};

/// Model name and sampling temperature sent with every extraction request.
///
/// Built from the `[model]` config section; see
/// [`ModelConfig::chat_options`](crate::config::ModelConfig::chat_options).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    pub model: String,
    /// Unset leaves the service default in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
