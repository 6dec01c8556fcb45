//! Escaping text sink
//!
//! Quotes become `\"` and newlines become the two characters `\n` as text is
//! appended. Used for the message field and as the print target for error
//! descriptions.

use crate::core::StackTraceSink;
use std::fmt;

const ESCAPED_DQUOTE: &str = "\\\"";
const ESCAPED_NL: &str = "\\n";

/// Append-only sink that escapes into a borrowed buffer
pub struct EscapingSink<'a> {
    out: &'a mut String,
}

impl<'a> EscapingSink<'a> {
    pub fn new(out: &'a mut String) -> Self {
        Self { out }
    }
}

impl StackTraceSink for EscapingSink<'_> {
    fn append(&mut self, text: &str) {
        escape_into(text, self.out);
    }

    fn newline(&mut self) {
        self.out.push_str(ESCAPED_NL);
    }
}

impl fmt::Write for EscapingSink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        escape_into(s, self.out);
        Ok(())
    }
}

/// Append `text` to `out`, escaping quotes and newlines
pub fn escape_into(text: &str, out: &mut String) {
    let mut start = 0;
    for (idx, byte) in text.bytes().enumerate() {
        let replacement = match byte {
            b'"' => ESCAPED_DQUOTE,
            b'\n' => ESCAPED_NL,
            _ => continue,
        };
        out.push_str(&text[start..idx]);
        out.push_str(replacement);
        start = idx + 1;
    }
    out.push_str(&text[start..]);
}
