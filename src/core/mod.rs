//! Core event types and traits

pub mod clock;
pub mod context_data;
pub mod error;
pub mod layout;
pub mod log_event;
pub mod log_level;
pub mod metrics;
pub mod thrown;

pub use clock::NanoClock;
pub use context_data::ContextData;
pub use error::{LayoutError, Result};
pub use layout::Layout;
pub use log_event::{LogEvent, LogEventBuilder};
pub use log_level::LogLevel;
pub use metrics::LayoutMetrics;
pub use thrown::{StackTrace, StackTraceSink, Thrown};
