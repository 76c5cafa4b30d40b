//! Registration session for Alertline clients.
//!
//! This crate is the client's protocol logic:
//!
//! 1. **Identity**: read the registration code from the launch context
//!    once, at startup ([`LaunchContext`], [`resolve`])
//! 2. **Handshake**: answer the server's `WELCOME` with `REGISTER`, at most
//!    once per connection ([`Handshake`], [`SessionState`])
//! 3. **Dispatch**: route `DEBUG`, `error` and `message` events to their
//!    sinks and offer every event to host observers ([`DiagnosticSinks`],
//!    [`EventObserver`])
//!
//! [`RegistrationSession`] ties the three to a live connection.
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (above)  ← resolves identity, opens the connection, runs the session
//!     ↕
//! Session Layer (this crate)  ← handshake state and event routing
//!     ↕
//! Protocol / Transport (below)  ← frames, events, bytes
//! ```

mod dispatch;
mod error;
mod handshake;
mod identity;
mod session;

pub use dispatch::{
    DiagnosticSinks, Dispatcher, EventObserver, MemorySinks, SinkEntry,
    TracingSinks,
};
pub use error::SessionError;
pub use handshake::{Handshake, SessionState};
pub use identity::{resolve, LaunchContext, CODE_PARAM};
pub use session::{RegistrationSession, SessionConfig, SessionSummary};
