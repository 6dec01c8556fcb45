//! Errors attached to log events
//!
//! A `Thrown` value knows how to print its own multi-line description into a
//! `StackTraceSink`. The layout hands it an escaping sink, so the description
//! is escaped as it is written and never buffered unescaped.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;

/// Append-only text target for stack trace printing
pub trait StackTraceSink {
    /// Append text without a line break
    fn append(&mut self, text: &str);

    /// Terminate the current line
    fn newline(&mut self);

    /// Append text followed by a line break
    fn append_line(&mut self, text: &str) {
        self.append(text);
        self.newline();
    }
}

impl StackTraceSink for String {
    fn append(&mut self, text: &str) {
        self.push_str(text);
    }

    fn newline(&mut self) {
        self.push('\n');
    }
}

/// An error carried by a log event
pub trait Thrown: fmt::Debug + Send + Sync {
    /// Print the full description, one `append_line` per line
    fn print_stack_trace(&self, sink: &mut dyn StackTraceSink);
}

/// Host-supplied error description: a headline, frames and an optional cause
///
/// Prints like a JVM stack trace:
///
/// ```text
/// io error: connection reset
/// 	at net::read
/// Caused by: os error 104
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTrace {
    headline: String,
    frames: Vec<String>,
    cause: Option<Box<StackTrace>>,
}

impl StackTrace {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Build a description from an error and its `source()` chain
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut trace = StackTrace::new(err.to_string());
        if let Some(source) = err.source() {
            trace.cause = Some(Box::new(StackTrace::from_error(source)));
        }
        trace
    }

    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: StackTrace) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Append the frames of a captured backtrace
    ///
    /// Disabled or unsupported backtraces add nothing.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: &Backtrace) -> Self {
        if backtrace.status() == BacktraceStatus::Captured {
            let rendered = backtrace.to_string();
            self.frames.extend(
                rendered
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from),
            );
        }
        self
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn cause(&self) -> Option<&StackTrace> {
        self.cause.as_deref()
    }

    fn print_frames(&self, sink: &mut dyn StackTraceSink) {
        for frame in &self.frames {
            sink.append("\tat ");
            sink.append_line(frame);
        }
        if let Some(cause) = &self.cause {
            sink.append("Caused by: ");
            sink.append_line(&cause.headline);
            cause.print_frames(sink);
        }
    }
}

impl Thrown for StackTrace {
    fn print_stack_trace(&self, sink: &mut dyn StackTraceSink) {
        sink.append_line(&self.headline);
        self.print_frames(sink);
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.print_stack_trace(&mut out);
        f.write_str(&out)
    }
}
