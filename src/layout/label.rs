//! Operator-defined labels appended to every encoded line

use crate::core::{LayoutError, Result};
use serde::Deserialize;
use std::fmt;

/// Marker that opens a variable reference
pub const VARIABLE_PREFIX: &str = "${";

/// A named label value
///
/// A value starting with `${` is resolvable: it is handed to the layout's
/// resolver for each event instead of being written literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    name: String,
    value: String,
    resolvable: bool,
}

impl Label {
    /// Create a label, rejecting an empty name
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(LayoutError::config("Label", "label name cannot be empty"));
        }
        let value = value.into();
        let resolvable = value.starts_with(VARIABLE_PREFIX);
        Ok(Self {
            name,
            value,
            resolvable,
        })
    }

    /// Create a label from possibly absent configuration values
    pub fn create(name: Option<String>, value: Option<String>) -> Result<Self> {
        let name = name.ok_or_else(|| LayoutError::config("Label", "label name cannot be null"))?;
        let value = value.ok_or_else(|| {
            LayoutError::config("Label", format!("value of label '{}' cannot be null", name))
        })?;
        Self::new(name, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured value, unresolved
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_resolvable(&self) -> bool {
        self.resolvable
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// A label as it appears in deserialized settings, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl LabelConfig {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }
}

impl TryFrom<LabelConfig> for Label {
    type Error = LayoutError;

    fn try_from(config: LabelConfig) -> Result<Self> {
        Label::create(config.name, config.value)
    }
}
