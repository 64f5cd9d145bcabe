//! Generation settings forwarded to the inference entry point

use serde::{Deserialize, Serialize};

/// Sampling overrides for the chat-completion entry point.
///
/// Every field is optional; unset fields are left out of the worker command
/// line so the entry point keeps its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOverrides {
    /// Temperature for sampling (higher = more random)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum number of generated tokens (None = model's max sequence length)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_gen_len: Option<usize>,
}

impl GenerationOverrides {
    /// Check if nothing is overridden
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.top_p.is_none() && self.max_gen_len.is_none()
    }

    /// Named arguments in the order the entry point documents them.
    pub fn to_args(&self) -> Vec<(&'static str, String)> {
        let mut args = Vec::new();
        if let Some(temperature) = self.temperature {
            args.push(("--temperature", temperature.to_string()));
        }
        if let Some(top_p) = self.top_p {
            args.push(("--top_p", top_p.to_string()));
        }
        if let Some(max_gen_len) = self.max_gen_len {
            args.push(("--max_gen_len", max_gen_len.to_string()));
        }
        args
    }
}
