//! Log event structure

use super::clock::{current_time_millis, NanoClock};
use super::context_data::ContextData;
use super::log_level::LogLevel;
use super::thrown::Thrown;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Numeric id of the current thread, assigned on first use
pub fn current_thread_id() -> u64 {
    THREAD_ID_CACHE.with(|id| *id)
}

/// Name of the current thread, computed and cached on first access
pub fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// A single log event as handed to a layout
///
/// Absent `logger_name` and `thread_name` are rendered as empty values.
#[derive(Debug, Clone, Default)]
pub struct LogEvent {
    pub timestamp_millis: i64,
    pub timestamp_nanos: i64,
    pub level: LogLevel,
    pub logger_name: Option<String>,
    pub thread_id: u64,
    pub thread_name: Option<String>,
    /// Fully formatted message text
    pub message: String,
    pub thrown: Option<Arc<dyn Thrown>>,
    pub context_data: ContextData,
}

impl LogEvent {
    /// Capture an event on the current thread with both clocks read now
    pub fn capture(
        level: LogLevel,
        logger_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_millis: current_time_millis(),
            timestamp_nanos: NanoClock.nanos(),
            level,
            logger_name: Some(logger_name.into()),
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
            message: message.into(),
            thrown: None,
            context_data: ContextData::new(),
        }
    }

    /// Capture an event from a `log` facade record
    ///
    /// The record target becomes the logger name.
    pub fn from_record(record: &log::Record<'_>) -> Self {
        Self::capture(
            record.level().into(),
            record.target(),
            record.args().to_string(),
        )
    }

    pub fn builder() -> LogEventBuilder {
        LogEventBuilder::default()
    }

    pub fn with_thrown<T: Thrown + 'static>(mut self, thrown: T) -> Self {
        self.thrown = Some(Arc::new(thrown));
        self
    }

    pub fn with_context(mut self, context_data: ContextData) -> Self {
        self.context_data = context_data;
        self
    }
}

/// Builder for events with explicit field values
///
/// Every field starts empty or zero; nothing is captured from the
/// environment.
#[derive(Debug, Default)]
pub struct LogEventBuilder {
    event: LogEvent,
}

impl LogEventBuilder {
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.event.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.event.logger_name = Some(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.event.message = message.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn thread_id(mut self, id: u64) -> Self {
        self.event.thread_id = id;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.event.thread_name = Some(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_millis(mut self, millis: i64) -> Self {
        self.event.timestamp_millis = millis;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn nano_time(mut self, nanos: i64) -> Self {
        self.event.timestamp_nanos = nanos;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn thrown<T: Thrown + 'static>(mut self, thrown: T) -> Self {
        self.event.thrown = Some(Arc::new(thrown));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_thrown(mut self, thrown: Arc<dyn Thrown>) -> Self {
        self.event.thrown = Some(thrown);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn context_data(mut self, context_data: ContextData) -> Self {
        self.event.context_data = context_data;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.event.context_data.insert(key, value);
        self
    }

    pub fn build(self) -> LogEvent {
        self.event
    }
}
