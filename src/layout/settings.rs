//! Layout settings as supplied by a host configuration
//!
//! Field names follow the host's camelCase convention:
//!
//! ```json
//! {
//!   "includeStacktrace": true,
//!   "nanoTime": false,
//!   "includeContext": true,
//!   "contextKeyPrefix": "ctx_",
//!   "additionalLabels": [
//!     { "name": "service", "value": "billing" },
//!     { "name": "host", "value": "${env:HOSTNAME}" }
//!   ]
//! }
//! ```

use super::label::LabelConfig;
use super::scratch::{DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_CAPACITY};
use crate::core::Result;
use serde::Deserialize;

/// Default prefix put in front of context data keys
pub const DEFAULT_CONTEXT_KEY_PREFIX: &str = "_";

/// Unvalidated layout settings
///
/// Every field is optional. An explicit `null` context key prefix means no
/// prefix at all.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogfmtSettings {
    pub include_stacktrace: bool,
    pub nano_time: bool,
    pub include_context: bool,
    pub context_key_prefix: Option<String>,
    pub additional_labels: Vec<LabelConfig>,
    pub initial_buffer_capacity: usize,
    pub max_buffer_capacity: usize,
}

impl Default for LogfmtSettings {
    fn default() -> Self {
        Self {
            include_stacktrace: false,
            nano_time: false,
            include_context: false,
            context_key_prefix: Some(DEFAULT_CONTEXT_KEY_PREFIX.to_string()),
            additional_labels: Vec::new(),
            initial_buffer_capacity: DEFAULT_INITIAL_CAPACITY,
            max_buffer_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

impl LogfmtSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse settings from an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Effective context key prefix
    pub fn context_key_prefix(&self) -> &str {
        self.context_key_prefix.as_deref().unwrap_or("")
    }
}
