//! Soft-inconsistency collection.
//!
//! Lockfiles routinely carry legitimate partial information (platform-specific
//! or content-only packages), so recoverable inconsistencies are reported to a
//! collector instead of failing the resolution. Each distinct message is
//! forwarded at most once per collector.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Receives deduplicated soft-inconsistency messages.
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Default sink: forwards every message to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Sink that keeps every message in memory, for assertions.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages received so far, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("diagnostics sink poisoned").clone()
    }
}

impl DiagnosticsSink for MemorySink {
    fn report(&self, message: &str) {
        self.messages
            .lock()
            .expect("diagnostics sink poisoned")
            .push(message.to_string());
    }
}

/// Shared handle that dedups messages before they reach the sink.
///
/// Cloning is cheap; clones share the seen-set and the sink, so a resolver
/// service and its caller observe one stream of diagnostics.
#[derive(Clone)]
pub struct Diagnostics {
    inner: Arc<Inner>,
}

struct Inner {
    seen: Mutex<HashSet<String>>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Diagnostics {
    pub fn new(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                seen: Mutex::new(HashSet::new()),
                sink,
            }),
        }
    }

    /// Handle backed by a [`MemorySink`], returned alongside it for
    /// inspection. Used by tests and by frontends that render diagnostics
    /// themselves.
    pub fn collecting() -> (Self, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Self::new(sink.clone()), sink)
    }

    /// Report a soft inconsistency. Repeated identical messages are dropped.
    pub fn warn_once(&self, message: impl Into<String>) {
        let message = message.into();
        let fresh = self
            .inner
            .seen
            .lock()
            .expect("diagnostics state poisoned")
            .insert(message.clone());
        if fresh {
            self.inner.sink.report(&message);
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seen = self.inner.seen.lock().expect("diagnostics state poisoned");
        f.debug_struct("Diagnostics")
            .field("distinct_messages", &seen.len())
            .finish()
    }
}
