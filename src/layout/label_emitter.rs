//! Label compilation
//!
//! Labels are compiled once, when a layout is built, into one of three
//! emission strategies. The per-event path never inspects the label list to
//! decide what to do.

use super::label::Label;
use super::resolver::VariableResolver;
use crate::core::{LayoutError, LogEvent, Result};
use std::fmt;
use std::sync::Arc;

/// Compiled label emission strategy
#[derive(Clone, Default)]
pub enum LabelEmitter {
    /// No labels configured
    #[default]
    Empty,

    /// Every label is literal; the text is rendered once, e.g. `"k1=v1 k2=v2 "`
    Static(String),

    /// At least one label needs per-event resolution
    Dynamic {
        labels: Box<[Label]>,
        resolver: Arc<dyn VariableResolver>,
    },
}

impl LabelEmitter {
    /// Compile labels into an emission strategy
    ///
    /// Fails when a resolvable label is present and no resolver is given.
    pub fn compile(
        labels: Vec<Label>,
        resolver: Option<Arc<dyn VariableResolver>>,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Ok(LabelEmitter::Empty);
        }

        if let Some(label) = labels.iter().find(|label| label.is_resolvable()) {
            let resolver = resolver.ok_or_else(|| {
                LayoutError::config(
                    "LabelEmitter",
                    format!(
                        "label '{}' references a variable but no resolver is configured",
                        label.name()
                    ),
                )
            })?;
            log::debug!(
                "compiled {} labels into a dynamic emitter ({} resolvable)",
                labels.len(),
                labels.iter().filter(|l| l.is_resolvable()).count()
            );
            return Ok(LabelEmitter::Dynamic {
                labels: labels.into_boxed_slice(),
                resolver,
            });
        }

        let mut text = String::new();
        for label in &labels {
            text.push_str(label.name());
            text.push('=');
            text.push_str(label.value());
            text.push(' ');
        }
        log::debug!("compiled {} labels into static text", labels.len());
        Ok(LabelEmitter::Static(text))
    }

    /// Append this event's labels to `out`
    #[inline]
    pub fn emit(&self, event: &LogEvent, out: &mut String) {
        match self {
            LabelEmitter::Empty => {}
            LabelEmitter::Static(text) => out.push_str(text),
            LabelEmitter::Dynamic { labels, resolver } => {
                for label in labels.iter() {
                    out.push_str(label.name());
                    out.push('=');
                    if label.is_resolvable() {
                        resolver.resolve_into(event, label.value(), out);
                    } else {
                        out.push_str(label.value());
                    }
                    out.push(' ');
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LabelEmitter::Empty)
    }

    pub fn is_static(&self) -> bool {
        matches!(self, LabelEmitter::Static(_))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, LabelEmitter::Dynamic { .. })
    }
}

impl fmt::Debug for LabelEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelEmitter::Empty => f.write_str("Empty"),
            LabelEmitter::Static(text) => f.debug_tuple("Static").field(text).finish(),
            LabelEmitter::Dynamic { labels, .. } => {
                f.debug_struct("Dynamic").field("labels", labels).finish_non_exhaustive()
            }
        }
    }
}
