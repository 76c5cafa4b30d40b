//! The WELCOME → REGISTER handshake as a plain state machine.
//!
//! No I/O happens here. [`Handshake::on_welcome`] hands back the request to
//! send (if any) and the caller does the sending.

use alertline_protocol::{RegistrationRequest, RegistrationToken};

/// Where a session is in its lifecycle.
///
/// ```text
///   Connecting ──(live)──→ AwaitingWelcome ──(WELCOME + token)──→ Registered
///                               │    ↺ WELCOME, no token               │
///                               └─────────(disconnect)──→ Closed ←─────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The transport is still opening the connection.
    Connecting,

    /// Connected; waiting for the server greeting. Sessions without a
    /// token stay here for good (observer mode).
    AwaitingWelcome,

    /// `REGISTER` has been sent. No further handshake action.
    Registered,

    /// The transport disconnected. Nothing else is sent.
    Closed,
}

/// Handshake state for one connection.
#[derive(Debug, Clone)]
pub struct Handshake {
    token: Option<RegistrationToken>,
    state: SessionState,
    registered: bool,
}

impl Handshake {
    /// Starts a handshake in [`SessionState::Connecting`].
    pub fn new(token: Option<RegistrationToken>) -> Self {
        Self {
            token,
            state: SessionState::Connecting,
            registered: false,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the token this handshake registers with.
    pub fn token(&self) -> Option<&RegistrationToken> {
        self.token.as_ref()
    }

    /// `true` when there is no token, so registration never happens.
    pub fn is_observer(&self) -> bool {
        self.token.is_none()
    }

    /// `true` once a `REGISTER` has been handed out. Survives `Closed`.
    pub fn has_registered(&self) -> bool {
        self.registered
    }

    /// Marks the connection as live.
    pub fn connection_live(&mut self) {
        if self.state == SessionState::Connecting {
            self.state = SessionState::AwaitingWelcome;
        }
    }

    /// Reacts to a `WELCOME` event.
    ///
    /// Returns the request to send exactly once: the first WELCOME seen in
    /// `AwaitingWelcome` with a token present. Every other call returns
    /// `None` and leaves the state untouched.
    pub fn on_welcome(&mut self) -> Option<RegistrationRequest> {
        if self.state != SessionState::AwaitingWelcome {
            return None;
        }
        let token = self.token.clone()?;
        self.state = SessionState::Registered;
        self.registered = true;
        Some(RegistrationRequest::new(token))
    }

    /// Moves to [`SessionState::Closed`]. Terminal.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}
