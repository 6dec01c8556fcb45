//! # Logfmt Layout
//!
//! Encodes structured log events into single-line `key=value` text.
//!
//! ## Features
//!
//! - **Fixed field order**: timestamp, level, logger, thread, message, context,
//!   exception, labels
//! - **Escaping**: quotes and newlines in messages and stack traces never break
//!   a line
//! - **Labels**: static labels rendered once, `${...}` labels resolved per event
//! - **Thread Safe**: per-thread scratch buffers with a reentrancy fallback
//!
//! ```
//! use logfmt_layout::prelude::*;
//!
//! let layout = LogfmtLayout::builder().build().unwrap();
//! let event = LogEvent::builder()
//!     .level(LogLevel::Info)
//!     .logger_name("app")
//!     .message("started")
//!     .build();
//!
//! assert_eq!(
//!     layout.to_serializable(&event),
//!     "timestamp=0 level=INFO logger=app thread_id=0 thread_name= message=\"started\" \n"
//! );
//! ```

pub mod core;
pub mod layout;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        ContextData, Layout, LayoutError, LayoutMetrics, LogEvent, LogEventBuilder, LogLevel,
        Result, StackTrace, StackTraceSink, Thrown,
    };
    pub use crate::layout::{
        Interpolator, Label, LabelConfig, LabelEmitter, LogfmtLayout, LogfmtLayoutBuilder,
        LogfmtSettings, Lookup, Properties, VariableResolver,
    };
}

pub use crate::core::{
    ContextData, Layout, LayoutError, LayoutMetrics, LogEvent, LogEventBuilder, LogLevel, Result,
    StackTrace, StackTraceSink, Thrown,
};
pub use crate::layout::{
    Interpolator, Label, LabelConfig, LabelEmitter, LogfmtLayout, LogfmtLayoutBuilder,
    LogfmtSettings, Lookup, Properties, VariableResolver,
};
