//! The registration session: one connection, one handshake, one dispatcher.
//!
//! A [`RegistrationSession`] is built around a connection that is already
//! live. [`run`](RegistrationSession::run) then pulls frames off the
//! transport one at a time and handles each to completion before asking for
//! the next. Nothing in here retries, times out or reconnects; when the
//! transport goes away the session closes and reports what it saw.

use std::sync::Arc;

use alertline_protocol::{
    ChannelEvent, Codec, Frame, JsonCodec, RegistrationRequest,
    RegistrationToken,
};
use alertline_transport::Connection;

use crate::dispatch::{DiagnosticSinks, Dispatcher, EventObserver, TracingSinks};
use crate::handshake::{Handshake, SessionState};
use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Session settings, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Log the kind of every inbound event to the trace sink.
    ///
    /// Default: `false`. `DEBUG`, `error` and `message` payloads reach
    /// their sinks regardless of this flag.
    pub trace_events: bool,
}

// ---------------------------------------------------------------------------
// SessionSummary
// ---------------------------------------------------------------------------

/// What a session did over its lifetime, returned by
/// [`RegistrationSession::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Inbound events handled.
    pub events: u64,
    /// Inbound frames that failed to decode and were skipped.
    pub skipped_frames: u64,
    /// Whether a `REGISTER` was sent on this connection.
    pub registered: bool,
    /// State at the time the summary was taken.
    pub state: SessionState,
}

// ---------------------------------------------------------------------------
// RegistrationSession
// ---------------------------------------------------------------------------

/// Drives one connection: answers `WELCOME` with `REGISTER` (at most once)
/// and routes every inbound event to sinks and observers.
pub struct RegistrationSession<C: Connection, K: Codec = JsonCodec> {
    conn: C,
    codec: K,
    handshake: Handshake,
    dispatcher: Dispatcher,
    events: u64,
    skipped_frames: u64,
}

impl<C: Connection> RegistrationSession<C, JsonCodec> {
    /// Wraps a live connection. Logs go to `tracing` until
    /// [`with_sinks`](Self::with_sinks) says otherwise.
    pub fn new(
        conn: C,
        token: Option<RegistrationToken>,
        config: SessionConfig,
    ) -> Self {
        Self::with_codec(conn, JsonCodec, token, config)
    }
}

impl<C: Connection, K: Codec> RegistrationSession<C, K> {
    /// Like [`new`](RegistrationSession::new) with an explicit codec.
    pub fn with_codec(
        conn: C,
        codec: K,
        token: Option<RegistrationToken>,
        config: SessionConfig,
    ) -> Self {
        let mut handshake = Handshake::new(token);
        handshake.connection_live();
        Self {
            conn,
            codec,
            handshake,
            dispatcher: Dispatcher::new(config.trace_events, TracingSinks),
            events: 0,
            skipped_frames: 0,
        }
    }

    /// Sends sink output to `sinks` instead of `tracing`.
    pub fn with_sinks(mut self, sinks: impl DiagnosticSinks) -> Self {
        self.dispatcher.set_sinks(sinks);
        self
    }

    /// Registers an observer that is offered every inbound event.
    pub fn observe(&mut self, observer: impl EventObserver) {
        self.dispatcher.add_observer(observer);
    }

    /// Like [`observe`](Self::observe), for an observer shared with other
    /// sessions.
    pub fn observe_shared(&mut self, observer: Arc<dyn EventObserver>) {
        self.dispatcher.add_shared_observer(observer);
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.handshake.state()
    }

    /// Returns the token this session registers with, if any.
    pub fn token(&self) -> Option<&RegistrationToken> {
        self.handshake.token()
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Returns counters and state as of now.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            events: self.events,
            skipped_frames: self.skipped_frames,
            registered: self.handshake.has_registered(),
            state: self.handshake.state(),
        }
    }

    /// Runs until the transport closes, then returns the summary.
    ///
    /// A receive failure is reported as an `error` event and ends the loop
    /// the same way a clean close does.
    pub async fn run(mut self) -> SessionSummary {
        let conn_id = self.conn.id();
        tracing::info!(
            %conn_id,
            observer = self.handshake.is_observer(),
            "session started"
        );

        loop {
            match self.conn.recv().await {
                Ok(Some(data)) => self.handle_frame(&data).await,
                Ok(None) => {
                    tracing::info!(%conn_id, "connection closed");
                    break;
                }
                Err(e) => {
                    tracing::warn!(%conn_id, error = %e, "receive failed");
                    let payload =
                        serde_json::json!({ "message": e.to_string() });
                    self.handle_event(ChannelEvent::Error(payload)).await;
                    break;
                }
            }
        }

        self.close().await;
        let summary = self.summary();
        tracing::info!(
            %conn_id,
            events = summary.events,
            registered = summary.registered,
            "session ended"
        );
        summary
    }

    /// Decodes one inbound frame and handles the event inside.
    ///
    /// Frames that don't decode are counted and skipped.
    pub async fn handle_frame(&mut self, data: &[u8]) {
        match self.codec.decode::<Frame>(data) {
            Ok(frame) => self.handle_event(ChannelEvent::from(frame)).await,
            Err(e) => {
                self.skipped_frames += 1;
                tracing::debug!(
                    conn_id = %self.conn.id(),
                    error = %e,
                    "skipping undecodable frame"
                );
            }
        }
    }

    /// Handles one inbound event to completion.
    pub async fn handle_event(&mut self, event: ChannelEvent) {
        if self.handshake.state() == SessionState::Closed {
            tracing::debug!(kind = event.kind(), "session closed, dropping event");
            return;
        }
        self.events += 1;

        self.dispatcher.trace(&event);
        match &event {
            ChannelEvent::Welcome(_) => self.on_welcome().await,
            other => self.dispatcher.route(other),
        }
        self.dispatcher.notify_observers(&event);
    }

    /// Moves to `Closed` and closes the connection. Idempotent.
    pub async fn close(&mut self) {
        if self.handshake.state() == SessionState::Closed {
            return;
        }
        self.handshake.close();
        if let Err(e) = self.conn.close().await {
            tracing::debug!(
                conn_id = %self.conn.id(),
                error = %e,
                "close after disconnect failed"
            );
        }
    }

    async fn on_welcome(&mut self) {
        let Some(request) = self.handshake.on_welcome() else {
            if self.handshake.is_observer() {
                tracing::debug!("WELCOME received without a code, not registering");
            } else {
                tracing::debug!("WELCOME received again, already registered");
            }
            return;
        };

        // One attempt per connection, whether or not the send succeeds.
        match self.send_registration(request).await {
            Ok(()) => {
                tracing::info!(conn_id = %self.conn.id(), "registration sent");
            }
            Err(e) => {
                tracing::warn!(
                    conn_id = %self.conn.id(),
                    error = %e,
                    "registration failed"
                );
                self.dispatcher.report_error(&e.to_string());
            }
        }
    }

    async fn send_registration(
        &self,
        request: RegistrationRequest,
    ) -> Result<(), SessionError> {
        let bytes = self.codec.encode(&request.into_frame())?;
        self.conn
            .send(&bytes)
            .await
            .map_err(|e| SessionError::SendFailed(e.to_string()))
    }
}

impl<C: Connection, K: Codec> std::fmt::Debug for RegistrationSession<C, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationSession")
            .field("conn_id", &self.conn.id())
            .field("state", &self.handshake.state())
            .field("events", &self.events)
            .field("registered", &self.handshake.has_registered())
            .finish_non_exhaustive()
    }
}
