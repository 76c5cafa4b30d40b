//! Core protocol types for Alertline's wire format.
//!
//! Every message on the channel is a [`Frame`]: an event name plus an
//! opaque JSON payload. Inbound frames are lifted into [`ChannelEvent`] so
//! the session can match exhaustively on the kinds it understands; the only
//! outbound message is a [`RegistrationRequest`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// Event names as they appear on the wire. Matching is case-sensitive.
pub mod kinds {
    /// Server greeting; answered with [`REGISTER`] when a token is known.
    pub const WELCOME: &str = "WELCOME";
    /// Diagnostic payload pushed by the server.
    pub const DEBUG: &str = "DEBUG";
    /// Transport-level failure report.
    pub const ERROR: &str = "error";
    /// Generic informational message.
    pub const MESSAGE: &str = "message";
    /// Client registration request.
    pub const REGISTER: &str = "REGISTER";
}

// ---------------------------------------------------------------------------
// RegistrationToken
// ---------------------------------------------------------------------------

/// The opaque code a client presents to tie its connection to an
/// out-of-band action.
///
/// The format is never validated; an empty string is a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationToken(String);

impl RegistrationToken {
    /// Wraps a raw code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the raw code.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RegistrationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// The unit of exchange on the channel.
///
/// ```text
/// { "event": "DEBUG", "data": { "x": 1 } }
/// ```
///
/// A missing `data` field decodes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// The event name.
    pub event: String,

    /// The payload, passed through untouched.
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Builds a frame from an event name and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelEvent
// ---------------------------------------------------------------------------

/// An inbound event, classified by kind.
///
/// The recognized kinds get their own variant; anything else lands in
/// [`ChannelEvent::Other`] with its name preserved. Unrecognized kinds are
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// `WELCOME`: the server greeting. The payload is kept but never read.
    Welcome(Value),

    /// `DEBUG`: arbitrary diagnostic payload.
    Debug(Value),

    /// `error`: a transport-level failure report.
    Error(Value),

    /// `message`: a generic informational payload.
    Message(Value),

    /// Any other event kind.
    Other {
        /// The event name exactly as received.
        kind: String,
        /// The payload exactly as received.
        payload: Value,
    },
}

impl ChannelEvent {
    /// Returns the event name as it appears on the wire.
    pub fn kind(&self) -> &str {
        match self {
            Self::Welcome(_) => kinds::WELCOME,
            Self::Debug(_) => kinds::DEBUG,
            Self::Error(_) => kinds::ERROR,
            Self::Message(_) => kinds::MESSAGE,
            Self::Other { kind, .. } => kind,
        }
    }

    /// Returns the payload carried by the event.
    pub fn payload(&self) -> &Value {
        match self {
            Self::Welcome(p)
            | Self::Debug(p)
            | Self::Error(p)
            | Self::Message(p) => p,
            Self::Other { payload, .. } => payload,
        }
    }
}

impl From<Frame> for ChannelEvent {
    fn from(frame: Frame) -> Self {
        let Frame { event, data } = frame;
        match event.as_str() {
            kinds::WELCOME => Self::Welcome(data),
            kinds::DEBUG => Self::Debug(data),
            kinds::ERROR => Self::Error(data),
            kinds::MESSAGE => Self::Message(data),
            _ => Self::Other {
                kind: event,
                payload: data,
            },
        }
    }
}

impl From<ChannelEvent> for Frame {
    fn from(event: ChannelEvent) -> Self {
        match event {
            ChannelEvent::Welcome(p) => Frame::new(kinds::WELCOME, p),
            ChannelEvent::Debug(p) => Frame::new(kinds::DEBUG, p),
            ChannelEvent::Error(p) => Frame::new(kinds::ERROR, p),
            ChannelEvent::Message(p) => Frame::new(kinds::MESSAGE, p),
            ChannelEvent::Other { kind, payload } => Frame::new(kind, payload),
        }
    }
}

// ---------------------------------------------------------------------------
// RegistrationRequest
// ---------------------------------------------------------------------------

/// Client → Server: "this connection belongs to `code`."
///
/// Built only in response to `WELCOME` when a token is known, sent
/// immediately, and not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// The token resolved at startup.
    pub code: RegistrationToken,
}

impl RegistrationRequest {
    /// Creates a request carrying `code`.
    pub fn new(code: RegistrationToken) -> Self {
        Self { code }
    }

    /// Wraps the request in a `REGISTER` frame.
    pub fn into_frame(self) -> Frame {
        Frame::new(
            kinds::REGISTER,
            serde_json::json!({ "code": self.code.into_inner() }),
        )
    }
}

// =========================================================================
// Tests
// =========================================================================
