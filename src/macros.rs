//! Macros for building events and label lists.
//!
//! # Examples
//!
//! ```
//! use logfmt_layout::prelude::*;
//! use logfmt_layout::{labels, log_event};
//!
//! let layout = LogfmtLayout::builder()
//!     .labels(labels!["service" => "billing", "zone" => "eu-1"].unwrap())
//!     .build()
//!     .unwrap();
//!
//! let order_id = 42;
//! let event = log_event!(LogLevel::Info, "orders", "Order {} shipped", order_id);
//! let line = layout.to_serializable(&event);
//!
//! assert!(line.contains("message=\"Order 42 shipped\""));
//! assert!(line.ends_with("service=billing zone=eu-1 \n"));
//! ```

/// Capture an event on the current thread with a formatted message.
///
/// # Examples
///
/// ```
/// use logfmt_layout::{log_event, LogLevel};
///
/// let event = log_event!(LogLevel::Warn, "net", "Retry {} of {}", 1, 3);
/// assert_eq!(event.message, "Retry 1 of 3");
/// assert_eq!(event.logger_name.as_deref(), Some("net"));
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:expr, $logger:expr, $($arg:tt)+) => {
        $crate::LogEvent::capture($level, $logger, format!($($arg)+))
    };
}

/// Build an ordered label list, failing on the first invalid label.
///
/// # Examples
///
/// ```
/// use logfmt_layout::labels;
///
/// let labels = labels!["KEY1" => "VALUE1", "KEY2" => "${env:HOME}"].unwrap();
/// assert_eq!(labels.len(), 2);
/// assert!(labels[1].is_resolvable());
///
/// assert!(labels!["" => "value"].is_err());
/// ```
#[macro_export]
macro_rules! labels {
    () => {
        $crate::Result::<::std::vec::Vec<$crate::Label>>::Ok(::std::vec::Vec::new())
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        (|| -> $crate::Result<::std::vec::Vec<$crate::Label>> {
            Ok(vec![$($crate::Label::new($name, $value)?),+])
        })()
    };
}
