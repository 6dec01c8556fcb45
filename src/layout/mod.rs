//! Logfmt layout implementation

pub mod escape;
pub mod label;
pub mod label_emitter;
pub mod logfmt;
pub mod resolver;
pub mod scratch;
pub mod settings;

pub use escape::EscapingSink;
pub use label::{Label, LabelConfig};
pub use label_emitter::LabelEmitter;
pub use logfmt::{LogfmtLayout, LogfmtLayoutBuilder};
pub use resolver::{
    ContextLookup, EnvLookup, EventLookup, Interpolator, Lookup, Properties, VariableResolver,
};
pub use scratch::ScratchPool;
pub use settings::LogfmtSettings;

// Re-export the trait for convenience
pub use crate::core::Layout;
