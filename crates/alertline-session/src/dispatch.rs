//! Event dispatch: where each inbound event ends up.
//!
//! Built-in routing is fixed:
//!
//! | kind      | destination                          |
//! |-----------|--------------------------------------|
//! | any       | `trace` (only when tracing is on)    |
//! | `DEBUG`   | `debug` sink, full payload           |
//! | `error`   | `error` sink                         |
//! | `message` | `message` sink                       |
//! | `WELCOME` | the handshake, no sink output        |
//! | other     | nothing built in                     |
//!
//! After that, every event is offered to the registered
//! [`EventObserver`]s, which is how hosts react to their own kinds.

use std::sync::{Arc, Mutex, PoisonError};

use alertline_protocol::ChannelEvent;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destinations for diagnostic and informational output.
pub trait DiagnosticSinks: Send + Sync + 'static {
    /// Per-event kind trace, called only when tracing is enabled.
    fn trace(&self, kind: &str);

    /// Full dump of a `DEBUG` payload.
    fn debug(&self, payload: &Value);

    /// Error report (`error` events and local failures).
    fn error(&self, payload: &Value);

    /// General informational output (`message` events).
    fn message(&self, payload: &Value);
}

/// Routes every sink to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSinks;

impl DiagnosticSinks for TracingSinks {
    fn trace(&self, kind: &str) {
        tracing::debug!(kind, "got event");
    }

    // INFO, not DEBUG: the dump must not depend on the trace filter.
    fn debug(&self, payload: &Value) {
        tracing::info!(%payload, "DEBUG event");
    }

    fn error(&self, payload: &Value) {
        tracing::error!(%payload, "channel error");
    }

    fn message(&self, payload: &Value) {
        tracing::info!(%payload, "channel message");
    }
}

impl<S: DiagnosticSinks + ?Sized> DiagnosticSinks for Arc<S> {
    fn trace(&self, kind: &str) {
        (**self).trace(kind);
    }

    fn debug(&self, payload: &Value) {
        (**self).debug(payload);
    }

    fn error(&self, payload: &Value) {
        (**self).error(payload);
    }

    fn message(&self, payload: &Value) {
        (**self).message(payload);
    }
}

/// One write to a [`MemorySinks`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEntry {
    Trace(String),
    Debug(Value),
    Error(Value),
    Message(Value),
}

/// Collects sink writes in memory.
///
/// Clones share the same buffer, so a host can keep one clone to read
/// from while the session writes through another.
#[derive(Debug, Clone, Default)]
pub struct MemorySinks {
    entries: Arc<Mutex<Vec<SinkEntry>>>,
}

impl MemorySinks {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything written so far.
    pub fn entries(&self) -> Vec<SinkEntry> {
        self.lock().clone()
    }

    /// Removes and returns everything written so far.
    pub fn drain(&self) -> Vec<SinkEntry> {
        std::mem::take(&mut *self.lock())
    }

    fn push(&self, entry: SinkEntry) {
        self.lock().push(entry);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSinks for MemorySinks {
    fn trace(&self, kind: &str) {
        self.push(SinkEntry::Trace(kind.to_string()));
    }

    fn debug(&self, payload: &Value) {
        self.push(SinkEntry::Debug(payload.clone()));
    }

    fn error(&self, payload: &Value) {
        self.push(SinkEntry::Error(payload.clone()));
    }

    fn message(&self, payload: &Value) {
        self.push(SinkEntry::Message(payload.clone()));
    }
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

/// A host-supplied handler offered every inbound event.
pub trait EventObserver: Send + Sync + 'static {
    /// Called once per event, after built-in routing.
    fn on_event(&self, event: &ChannelEvent);
}

impl<F> EventObserver for F
where
    F: Fn(&ChannelEvent) + Send + Sync + 'static,
{
    fn on_event(&self, event: &ChannelEvent) {
        self(event)
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Owns the sinks, the trace flag and the observer list.
pub struct Dispatcher {
    trace_events: bool,
    sinks: Box<dyn DiagnosticSinks>,
    observers: Vec<Arc<dyn EventObserver>>,
}

impl Dispatcher {
    /// Creates a dispatcher writing to `sinks`.
    pub fn new(trace_events: bool, sinks: impl DiagnosticSinks) -> Self {
        Self {
            trace_events,
            sinks: Box::new(sinks),
            observers: Vec::new(),
        }
    }

    /// Replaces the sinks.
    pub fn set_sinks(&mut self, sinks: impl DiagnosticSinks) {
        self.sinks = Box::new(sinks);
    }

    /// Appends an observer. Observers run in registration order.
    pub fn add_observer(&mut self, observer: impl EventObserver) {
        self.observers.push(Arc::new(observer));
    }

    /// Appends an observer that other dispatchers may hold too.
    pub fn add_shared_observer(&mut self, observer: Arc<dyn EventObserver>) {
        self.observers.push(observer);
    }

    /// Writes the kind trace if tracing is enabled.
    pub fn trace(&self, event: &ChannelEvent) {
        if self.trace_events {
            self.sinks.trace(event.kind());
        }
    }

    /// Sends `DEBUG`, `error` and `message` payloads to their sinks.
    /// `WELCOME` and unrecognized kinds produce nothing here.
    pub fn route(&self, event: &ChannelEvent) {
        match event {
            ChannelEvent::Debug(payload) => self.sinks.debug(payload),
            ChannelEvent::Error(payload) => self.sinks.error(payload),
            ChannelEvent::Message(payload) => self.sinks.message(payload),
            ChannelEvent::Welcome(_) | ChannelEvent::Other { .. } => {}
        }
    }

    /// Offers `event` to every observer.
    pub fn notify_observers(&self, event: &ChannelEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    /// Reports a local failure to the error sink.
    pub fn report_error(&self, message: &str) {
        self.sinks
            .error(&serde_json::json!({ "message": message }));
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("trace_events", &self.trace_events)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
