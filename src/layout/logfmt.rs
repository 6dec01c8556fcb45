//! Logfmt layout
//!
//! Encodes one event per line in a fixed field order:
//!
//! ```text
//! timestamp=1 level=DEBUG logger=a.B thread_id=12 thread_name=th1 message="test \"escape\"" _KEY1=VALUE1 exception= service=api
//! ```
//!
//! Only the message and exception values are escaped. Logger name, thread
//! name and context data are written verbatim, so a context value containing
//! a space or newline is not protected.

use super::escape::{escape_into, EscapingSink};
use super::label::Label;
use super::label_emitter::LabelEmitter;
use super::resolver::VariableResolver;
use super::scratch::{ScratchPool, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_CAPACITY};
use super::settings::{LogfmtSettings, DEFAULT_CONTEXT_KEY_PREFIX};
use crate::core::{Layout, LayoutError, LayoutMetrics, LogEvent, Result};
use std::fmt::Write as _;
use std::io;
use std::sync::Arc;

const TIMESTAMP: &str = "timestamp=";
const LEVEL: &str = "level=";
const LOGGER_NAME: &str = "logger=";
const THREAD_ID: &str = "thread_id=";
const THREAD_NAME: &str = "thread_name=";
const MESSAGE: &str = "message=";
const EXCEPTION: &str = "exception=";

/// Encodes log events as single logfmt lines
///
/// Immutable once built and safe to share across threads.
#[derive(Debug)]
pub struct LogfmtLayout {
    include_stacktrace: bool,
    nano_time: bool,
    include_context: bool,
    context_key_prefix: String,
    labels: LabelEmitter,
    scratch: ScratchPool,
    metrics: Arc<LayoutMetrics>,
}

impl LogfmtLayout {
    #[must_use]
    pub fn builder() -> LogfmtLayoutBuilder {
        LogfmtLayoutBuilder::new()
    }

    /// Validate settings and build a layout
    ///
    /// `resolver` is required when any label value starts with `${`.
    pub fn from_settings(
        settings: LogfmtSettings,
        resolver: Option<Arc<dyn VariableResolver>>,
    ) -> Result<Self> {
        let labels = settings
            .additional_labels
            .iter()
            .cloned()
            .map(Label::try_from)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = LogfmtLayout::builder()
            .include_stacktrace(settings.include_stacktrace)
            .nano_time(settings.nano_time)
            .include_context(settings.include_context)
            .context_key_prefix(settings.context_key_prefix())
            .labels(labels)
            .buffer_capacity(settings.initial_buffer_capacity, settings.max_buffer_capacity);
        if let Some(resolver) = resolver {
            builder = builder.resolver(resolver);
        }
        builder.build()
    }

    /// Append one complete, newline-terminated line for `event` to `out`
    pub fn encode(&self, event: &LogEvent, out: &mut String) {
        self.metrics.record_encoded();

        out.push_str(TIMESTAMP);
        let timestamp = if self.nano_time {
            event.timestamp_nanos
        } else {
            event.timestamp_millis
        };
        // Writing into a String cannot fail
        let _ = write!(out, "{}", timestamp);
        out.push(' ');

        out.push_str(LEVEL);
        out.push_str(event.level.to_str());
        out.push(' ');

        out.push_str(LOGGER_NAME);
        out.push_str(event.logger_name.as_deref().unwrap_or(""));
        out.push(' ');

        out.push_str(THREAD_ID);
        let _ = write!(out, "{}", event.thread_id);
        out.push(' ');

        out.push_str(THREAD_NAME);
        out.push_str(event.thread_name.as_deref().unwrap_or(""));
        out.push(' ');

        out.push_str(MESSAGE);
        out.push('"');
        escape_into(&event.message, out);
        out.push('"');
        out.push(' ');

        if self.include_context {
            for (key, value) in event.context_data.iter() {
                out.push_str(&self.context_key_prefix);
                out.push_str(key);
                out.push('=');
                out.push_str(value);
                out.push(' ');
            }
        }

        if self.include_stacktrace {
            out.push_str(EXCEPTION);
            if let Some(thrown) = &event.thrown {
                out.push('"');
                thrown.print_stack_trace(&mut EscapingSink::new(out));
                out.push('"');
            }
            out.push(' ');
        }

        self.labels.emit(event, out);
        out.push('\n');
    }

    /// Encode `event` into an owned string, assembled in a scratch buffer
    pub fn to_serializable(&self, event: &LogEvent) -> String {
        self.scratch.with_buffer(|buf| {
            self.encode(event, buf);
            buf.clone()
        })
    }

    /// Write the UTF-8 bytes of one encoded line to `dest`
    pub fn encode_to<W: io::Write + ?Sized>(
        &self,
        event: &LogEvent,
        dest: &mut W,
    ) -> io::Result<()> {
        self.scratch.with_buffer(|buf| {
            self.encode(event, buf);
            dest.write_all(buf.as_bytes())
        })
    }

    /// Like [`encode_to`](Self::encode_to), with the failure wrapped in a
    /// [`LayoutError`]
    pub fn write_event<W: io::Write + ?Sized>(&self, event: &LogEvent, dest: &mut W) -> Result<()> {
        self.encode_to(event, dest).map_err(|e| {
            LayoutError::io_operation("writing encoded line", e.to_string(), e)
        })
    }

    pub fn includes_stacktrace(&self) -> bool {
        self.include_stacktrace
    }

    pub fn uses_nano_time(&self) -> bool {
        self.nano_time
    }

    pub fn includes_context(&self) -> bool {
        self.include_context
    }

    pub fn context_key_prefix(&self) -> &str {
        &self.context_key_prefix
    }

    pub fn label_emitter(&self) -> &LabelEmitter {
        &self.labels
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }
}

impl Layout for LogfmtLayout {
    fn encode(&self, event: &LogEvent, out: &mut String) {
        LogfmtLayout::encode(self, event, out);
    }

    fn to_serializable(&self, event: &LogEvent) -> String {
        LogfmtLayout::to_serializable(self, event)
    }

    fn name(&self) -> &str {
        "logfmt"
    }
}

/// Builder for constructing a `LogfmtLayout` with a fluent API
///
/// # Example
/// ```
/// use logfmt_layout::prelude::*;
/// use std::sync::Arc;
///
/// let layout = LogfmtLayout::builder()
///     .include_stacktrace(true)
///     .include_context(true)
///     .context_key_prefix("ctx_")
///     .label(Label::new("service", "billing").unwrap())
///     .label(Label::new("user", "${ctx:user}").unwrap())
///     .resolver(Arc::new(Interpolator::new()))
///     .build()
///     .unwrap();
///
/// let event = LogEvent::builder().message("paid").context_entry("user", "alice").build();
/// let line = layout.to_serializable(&event);
/// assert!(line.contains("ctx_user=alice"));
/// assert!(line.ends_with("service=billing user=alice \n"));
/// ```
pub struct LogfmtLayoutBuilder {
    include_stacktrace: bool,
    nano_time: bool,
    include_context: bool,
    context_key_prefix: String,
    labels: Vec<Label>,
    resolver: Option<Arc<dyn VariableResolver>>,
    initial_capacity: usize,
    max_capacity: usize,
}

impl LogfmtLayoutBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            include_stacktrace: false,
            nano_time: false,
            include_context: false,
            context_key_prefix: DEFAULT_CONTEXT_KEY_PREFIX.to_string(),
            labels: Vec::new(),
            resolver: None,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }

    /// Emit the `exception=` field
    #[must_use = "builder methods return a new value"]
    pub fn include_stacktrace(mut self, include: bool) -> Self {
        self.include_stacktrace = include;
        self
    }

    /// Use the event's nanosecond counter for `timestamp=`
    #[must_use = "builder methods return a new value"]
    pub fn nano_time(mut self, nano_time: bool) -> Self {
        self.nano_time = nano_time;
        self
    }

    /// Emit the event's context data
    #[must_use = "builder methods return a new value"]
    pub fn include_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }

    /// Prefix for context data keys; may be empty
    #[must_use = "builder methods return a new value"]
    pub fn context_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.context_key_prefix = prefix.into();
        self
    }

    /// Append a label
    #[must_use = "builder methods return a new value"]
    pub fn label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Append several labels, keeping their order
    #[must_use = "builder methods return a new value"]
    pub fn labels(mut self, labels: impl IntoIterator<Item = Label>) -> Self {
        self.labels.extend(labels);
        self
    }

    /// Resolver used for labels whose value starts with `${`
    #[must_use = "builder methods return a new value"]
    pub fn resolver(mut self, resolver: Arc<dyn VariableResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Scratch buffer sizing
    ///
    /// Buffers start at `initial` bytes and are trimmed back to `max` after
    /// an unusually large line.
    #[must_use = "builder methods return a new value"]
    pub fn buffer_capacity(mut self, initial: usize, max: usize) -> Self {
        self.initial_capacity = initial;
        self.max_capacity = max;
        self
    }

    /// Compile labels and build the layout
    pub fn build(self) -> Result<LogfmtLayout> {
        let labels = LabelEmitter::compile(self.labels, self.resolver)?;
        let metrics = Arc::new(LayoutMetrics::new());
        let scratch = ScratchPool::new(
            self.initial_capacity,
            self.max_capacity,
            Arc::clone(&metrics),
        );

        log::debug!(
            "built logfmt layout: stacktrace={} nano_time={} context={} labels={:?} buffer={}..{}",
            self.include_stacktrace,
            self.nano_time,
            self.include_context,
            labels,
            scratch.initial_capacity(),
            scratch.max_capacity()
        );

        Ok(LogfmtLayout {
            include_stacktrace: self.include_stacktrace,
            nano_time: self.nano_time,
            include_context: self.include_context,
            context_key_prefix: self.context_key_prefix,
            labels,
            scratch,
            metrics,
        })
    }
}

impl Default for LogfmtLayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, StackTrace};

    fn basic_event() -> LogEvent {
        LogEvent::builder()
            .logger_name("a.B")
            .level(LogLevel::Debug)
            .message("M")
            .thread_id(3)
            .thread_name("threadName")
            .time_millis(1)
            .nano_time(2)
            .build()
    }

    fn default_layout() -> LogfmtLayout {
        LogfmtLayout::builder().build().unwrap()
    }

    #[test]
    fn test_exact_line_with_defaults() {
        let line = default_layout().to_serializable(&basic_event());
        assert_eq!(
            line,
            "timestamp=1 level=DEBUG logger=a.B thread_id=3 thread_name=threadName message=\"M\" \n"
        );
    }

    #[test]
    fn test_basic_scenario() {
        let event = LogEvent::builder()
            .logger_name("a.B")
            .level(LogLevel::Debug)
            .message("test \"escape\"")
            .thread_id(12)
            .thread_name("th1")
            .time_millis(1)
            .context_entry("KEY1", "VALUE1")
            .thrown(StackTrace::new("MSG"))
            .build();

        let line = default_layout().to_serializable(&event);
        assert!(line.contains("logger=a.B"));
        assert!(line.contains("level=DEBUG"));
        assert!(line.contains("thread_name=th1"));
        assert!(line.contains("thread_id=12"));
        assert!(line.contains("message=\"test \\\"escape\\\"\""));
        assert!(!line.contains("exception="));
        assert!(!line.contains("KEY1="));
    }

    #[test]
    fn test_nano_time() {
        let layout = LogfmtLayout::builder().nano_time(true).build().unwrap();
        let line = layout.to_serializable(&basic_event());
        assert!(line.starts_with("timestamp=2 "));
        assert!(layout.uses_nano_time());
    }

    #[test]
    fn test_message_newline_escaped() {
        let event = LogEvent::builder().message("line1\nline2").build();
        let line = default_layout().to_serializable(&event);
        assert!(line.contains("message=\"line1\\nline2\""));
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_context_default_prefix() {
        let layout = LogfmtLayout::builder().include_context(true).build().unwrap();
        let event = LogEvent::builder().context_entry("KEY1", "VALUE1").build();
        assert!(layout.to_serializable(&event).contains(" _KEY1=VALUE1 "));
    }

    #[test]
    fn test_context_custom_and_empty_prefix() {
        let event = LogEvent::builder().context_entry("KEY1", "VALUE1").build();

        let layout = LogfmtLayout::builder()
            .include_context(true)
            .context_key_prefix("ctx_")
            .build()
            .unwrap();
        assert!(layout.to_serializable(&event).contains("ctx_KEY1=VALUE1"));

        let layout = LogfmtLayout::builder()
            .include_context(true)
            .context_key_prefix("")
            .build()
            .unwrap();
        assert!(layout.to_serializable(&event).contains(" KEY1=VALUE1 "));
    }

    #[test]
    fn test_context_values_not_escaped() {
        let layout = LogfmtLayout::builder().include_context(true).build().unwrap();
        let event = LogEvent::builder().context_entry("q", "a \"b\"").build();
        assert!(layout.to_serializable(&event).contains("_q=a \"b\" "));
    }

    #[test]
    fn test_stacktrace_with_error() {
        let layout = LogfmtLayout::builder().include_stacktrace(true).build().unwrap();
        let event = LogEvent::builder()
            .message("M")
            .thrown(StackTrace::new("Exception: Error\"X\"").with_frame("app::run"))
            .build();

        let line = layout.to_serializable(&event);
        assert!(line.contains("exception=\"Exception: Error\\\"X\\\"\\n\tat app::run\\n\" "));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_stacktrace_without_error() {
        let layout = LogfmtLayout::builder().include_stacktrace(true).build().unwrap();
        let line = layout.to_serializable(&basic_event());
        assert!(line.ends_with("exception= \n"));
    }

    #[test]
    fn test_absent_names_render_empty() {
        let line = default_layout().to_serializable(&LogEvent::default());
        assert!(line.contains(" logger= "));
        assert!(line.contains(" thread_name= "));
    }

    #[test]
    fn test_thread_name_not_escaped() {
        let event = LogEvent::builder().thread_name("we\"ird").build();
        assert!(default_layout()
            .to_serializable(&event)
            .contains("thread_name=we\"ird "));
    }

    #[test]
    fn test_field_order() {
        let layout = LogfmtLayout::builder()
            .include_context(true)
            .include_stacktrace(true)
            .label(Label::new("L", "v").unwrap())
            .build()
            .unwrap();
        let event = LogEvent::builder()
            .logger_name("lg")
            .thread_name("tn")
            .message("m")
            .context_entry("c", "1")
            .build();
        let line = layout.to_serializable(&event);

        let keys = [
            "timestamp=",
            "level=",
            "logger=",
            "thread_id=",
            "thread_name=",
            "message=",
            "_c=",
            "exception=",
            "L=",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| line.find(k).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_encode_appends_to_existing_buffer() {
        let layout = default_layout();
        let mut out = String::from("prev\n");
        layout.encode(&basic_event(), &mut out);
        layout.encode(&basic_event(), &mut out);
        assert_eq!(out.lines().count(), 3);
        assert!(out.starts_with("prev\ntimestamp=1 "));
    }

    #[test]
    fn test_encode_to_writer() {
        let layout = default_layout();
        let mut bytes: Vec<u8> = Vec::new();
        layout.encode_to(&basic_event(), &mut bytes).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            layout.to_serializable(&basic_event())
        );
    }

    #[test]
    fn test_write_event_wraps_io_error() {
        struct Closed;
        impl io::Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = default_layout()
            .write_event(&basic_event(), &mut Closed)
            .unwrap_err();
        assert!(matches!(err, LayoutError::IoOperation { .. }));
    }

    #[test]
    fn test_from_settings() {
        let settings = LogfmtSettings::from_json(
            r#"{ "includeContext": true, "contextKeyPrefix": "ctx_",
                 "additionalLabels": [ { "name": "KEY1", "value": "VALUE1" } ] }"#,
        )
        .unwrap();
        let layout = LogfmtLayout::from_settings(settings, None).unwrap();

        assert!(layout.includes_context());
        assert_eq!(layout.context_key_prefix(), "ctx_");
        assert!(layout.label_emitter().is_static());
        assert!(layout
            .to_serializable(&basic_event())
            .ends_with("KEY1=VALUE1 \n"));
    }

    #[test]
    fn test_from_settings_rejects_absent_label_value() {
        let settings =
            LogfmtSettings::from_json(r#"{ "additionalLabels": [ { "name": "k" } ] }"#).unwrap();
        let err = LogfmtLayout::from_settings(settings, None).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_from_settings_requires_resolver() {
        let mut settings = LogfmtSettings::new();
        settings
            .additional_labels
            .push(crate::layout::LabelConfig::new("KEY2", "${expr}"));

        assert!(LogfmtLayout::from_settings(settings.clone(), None).is_err());

        let resolver: Arc<dyn VariableResolver> =
            Arc::new(|_: &LogEvent, _: &str| "R".to_string());
        let layout = LogfmtLayout::from_settings(settings, Some(resolver)).unwrap();
        assert!(layout.to_serializable(&basic_event()).contains("KEY2=R "));
    }

    #[test]
    fn test_layout_trait_object() {
        let layout: Box<dyn Layout> = Box::new(default_layout());
        assert_eq!(layout.name(), "logfmt");
        assert!(layout.content_type().starts_with("text/plain"));
        assert!(layout.to_serializable(&basic_event()).ends_with('\n'));
    }

    #[test]
    fn test_metrics_count_encoded_lines() {
        let layout = default_layout();
        layout.to_serializable(&basic_event());
        layout.encode_to(&basic_event(), &mut Vec::new()).unwrap();
        layout.encode(&basic_event(), &mut String::new());
        assert_eq!(layout.metrics().lines_encoded(), 3);
        assert_eq!(layout.metrics().reentrant_fallbacks(), 0);
    }

    #[derive(Debug)]
    struct Exploding;

    impl crate::core::Thrown for Exploding {
        fn print_stack_trace(&self, sink: &mut dyn crate::core::StackTraceSink) {
            sink.append("partial");
            panic!("description failed");
        }
    }

    #[test]
    fn test_panic_during_encode_does_not_leak_into_next_line() {
        let layout = LogfmtLayout::builder().include_stacktrace(true).build().unwrap();
        let bad = LogEvent::builder().message("bad").thrown(Exploding).build();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            layout.to_serializable(&bad)
        }));
        assert!(result.is_err());

        let line = layout.to_serializable(&LogEvent::builder().message("good").build());
        assert_eq!(
            line,
            "timestamp=0 level=INFO logger= thread_id=0 thread_name= message=\"good\" exception= \n"
        );
    }
}
