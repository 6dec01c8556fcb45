//! Layout trait for log event formatting

use super::log_event::LogEvent;

pub trait Layout: Send + Sync {
    /// Append one encoded, newline-terminated line to `out`
    fn encode(&self, event: &LogEvent, out: &mut String);

    /// Encode one event into an owned string
    fn to_serializable(&self, event: &LogEvent) -> String {
        let mut out = String::new();
        self.encode(event, &mut out);
        out
    }

    fn content_type(&self) -> &str {
        "text/plain; charset=utf-8"
    }

    fn name(&self) -> &str;
}
