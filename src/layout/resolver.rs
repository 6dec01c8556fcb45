//! Variable resolution for resolvable labels
//!
//! This module provides:
//! - `VariableResolver`: the collaborator a layout calls for `${...}` labels
//! - `Interpolator`: a built-in resolver with prefix-dispatched lookups
//! - `Properties`: a shared, runtime-settable property map
//!
//! Reference syntax understood by `Interpolator`:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `${prefix:key}` | value from the lookup registered under `prefix` |
//! | `${key}` | value from the interpolator's properties |
//! | `${ref:-default}` | `default` (itself interpolated) when `ref` is unresolved |
//! | `$${` | a literal `${` |
//!
//! References nest: `${ctx:${key}}` resolves `key` first and uses the result
//! as the context key.
//!
//! References that cannot be resolved and carry no default are left in the
//! output verbatim.

use crate::core::LogEvent;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const DEFAULT_SEPARATOR: &str = ":-";

/// Resolves a label template against one event
pub trait VariableResolver: Send + Sync {
    /// Append the resolved form of `template` to `out`
    fn resolve_into(&self, event: &LogEvent, template: &str, out: &mut String);

    fn resolve(&self, event: &LogEvent, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        self.resolve_into(event, template, &mut out);
        out
    }
}

impl<F> VariableResolver for F
where
    F: Fn(&LogEvent, &str) -> String + Send + Sync,
{
    fn resolve_into(&self, event: &LogEvent, template: &str, out: &mut String) {
        out.push_str(&self(event, template));
    }
}

/// Source of values for one `${prefix:...}` namespace
pub trait Lookup: Send + Sync {
    fn lookup(&self, event: &LogEvent, key: &str) -> Option<String>;
}

/// Process environment variables (`${env:NAME}`)
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvLookup;

impl Lookup for EnvLookup {
    fn lookup(&self, _event: &LogEvent, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Event context data (`${ctx:key}`)
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextLookup;

impl Lookup for ContextLookup {
    fn lookup(&self, event: &LogEvent, key: &str) -> Option<String> {
        event.context_data.get(key).map(String::from)
    }
}

/// Event fields (`${event:Level}`, `${event:Logger}`, ...)
#[derive(Debug, Clone, Copy, Default)]
pub struct EventLookup;

impl Lookup for EventLookup {
    fn lookup(&self, event: &LogEvent, key: &str) -> Option<String> {
        match key {
            "Level" => Some(event.level.to_str().to_string()),
            "Logger" => event.logger_name.clone(),
            "Message" => Some(event.message.clone()),
            "ThreadName" => event.thread_name.clone(),
            "ThreadId" => Some(event.thread_id.to_string()),
            "Timestamp" => Some(event.timestamp_millis.to_string()),
            _ => None,
        }
    }
}

/// Shared property map
///
/// Thread-safe: clones share the same underlying map, so a value set after
/// the layout is built is visible to the next encoded event.
///
/// # Example
///
/// ```
/// use logfmt_layout::layout::Properties;
///
/// let props = Properties::new();
/// props.set("region", "eu-west-1");
/// assert_eq!(props.get("region").as_deref(), Some("eu-west-1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, overwriting any previous value
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.write().insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    pub fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let props = Properties::new();
        for (k, v) in iter {
            props.set(k, v);
        }
        props
    }
}

impl Lookup for Properties {
    fn lookup(&self, _event: &LogEvent, key: &str) -> Option<String> {
        self.get(key)
    }
}

/// Built-in `${...}` resolver
///
/// Registers `env`, `ctx`, `event` and `prop` lookups by default.
///
/// # Example
///
/// ```
/// use logfmt_layout::layout::{Interpolator, VariableResolver};
/// use logfmt_layout::LogEvent;
///
/// let interpolator = Interpolator::new();
/// interpolator.properties().set("app", "billing");
///
/// let event = LogEvent::builder().context_entry("user", "alice").build();
/// assert_eq!(interpolator.resolve(&event, "${app}/${ctx:user}"), "billing/alice");
/// assert_eq!(interpolator.resolve(&event, "${ctx:missing:-none}"), "none");
/// ```
#[derive(Clone)]
pub struct Interpolator {
    properties: Properties,
    lookups: HashMap<String, Arc<dyn Lookup>>,
}

impl Interpolator {
    pub fn new() -> Self {
        Self::with_properties(Properties::new())
    }

    pub fn with_properties(properties: Properties) -> Self {
        let mut lookups: HashMap<String, Arc<dyn Lookup>> = HashMap::new();
        lookups.insert("env".to_string(), Arc::new(EnvLookup));
        lookups.insert("ctx".to_string(), Arc::new(ContextLookup));
        lookups.insert("event".to_string(), Arc::new(EventLookup));
        lookups.insert("prop".to_string(), Arc::new(properties.clone()));
        Self {
            properties,
            lookups,
        }
    }

    /// Register or replace the lookup for `prefix`
    #[must_use]
    pub fn with_lookup<L: Lookup + 'static>(
        mut self,
        prefix: impl Into<String>,
        lookup: L,
    ) -> Self {
        self.lookups.insert(prefix.into(), Arc::new(lookup));
        self
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    fn substitute(&self, event: &LogEvent, template: &str, out: &mut String) {
        let mut rest = template;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("$${") {
                out.push_str("${");
                rest = &tail[3..];
                continue;
            }
            if !tail.starts_with("${") {
                out.push('$');
                rest = &tail[1..];
                continue;
            }

            match find_closing(&tail[2..]) {
                Some(end) => {
                    let inner = &tail[2..2 + end];
                    self.substitute_reference(event, inner, out);
                    rest = &tail[2 + end + 1..];
                }
                None => {
                    // Unterminated reference: emit as-is
                    out.push_str(tail);
                    return;
                }
            }
        }
        out.push_str(rest);
    }

    fn substitute_reference(&self, event: &LogEvent, inner: &str, out: &mut String) {
        let (reference, default) = match split_default(inner) {
            Some((reference, default)) => (reference, Some(default)),
            None => (inner, None),
        };

        // Variable names may themselves contain references
        let reference: Cow<'_, str> = if reference.contains("${") {
            let mut name = String::with_capacity(reference.len());
            self.substitute(event, reference, &mut name);
            Cow::Owned(name)
        } else {
            Cow::Borrowed(reference)
        };

        if let Some(value) = self.lookup_reference(event, &reference) {
            out.push_str(&value);
            return;
        }
        match default {
            Some(default) => self.substitute(event, default, out),
            None => {
                out.push_str("${");
                out.push_str(inner);
                out.push('}');
            }
        }
    }

    fn lookup_reference(&self, event: &LogEvent, reference: &str) -> Option<String> {
        if let Some((prefix, key)) = reference.split_once(':') {
            if let Some(lookup) = self.lookups.get(prefix) {
                return lookup.lookup(event, key);
            }
        }
        self.properties.get(reference)
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefixes: Vec<&str> = self.lookups.keys().map(String::as_str).collect();
        prefixes.sort_unstable();
        f.debug_struct("Interpolator")
            .field("properties", &self.properties.len())
            .field("lookups", &prefixes)
            .finish()
    }
}

impl VariableResolver for Interpolator {
    fn resolve_into(&self, event: &LogEvent, template: &str, out: &mut String) {
        self.substitute(event, template, out);
    }
}

/// Index of the `}` closing a reference whose `${` has already been consumed
fn find_closing(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
                continue;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split `ref:-default` at the first separator outside nested references
fn split_default(inner: &str) -> Option<(&str, &str)> {
    let bytes = inner.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
                continue;
            }
            b'}' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && inner[i..].starts_with(DEFAULT_SEPARATOR) => {
                return Some((&inner[..i], &inner[i + DEFAULT_SEPARATOR.len()..]));
            }
            _ => {}
        }
        i += 1;
    }
    None
}
