//! # Alertline
//!
//! Client for realtime alert channels.
//!
//! A client is launched with a registration code (usually `?code=...` on
//! its launch URL), joins a notification channel, answers the server's
//! `WELCOME` with `REGISTER`, and routes pushed events to sinks and host
//! observers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use alertline::prelude::*;
//!
//! # async fn demo() -> Result<(), AlertlineError> {
//! let client = AlertlineClient::builder()
//!     .url("ws://127.0.0.1:8080/")
//!     .launch_context(LaunchContext::from_url("https://example.com/?code=ABC123")?)
//!     .build();
//!
//! client.connect().await?.run().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{
    AlertlineClient, AlertlineClientBuilder, AlertlineSession, DEFAULT_URL,
};
pub use error::AlertlineError;

pub use alertline_protocol as protocol;
pub use alertline_session as session;
pub use alertline_transport as transport;

/// Everything a typical client needs in one import.
pub mod prelude {
    pub use crate::{
        AlertlineClient, AlertlineClientBuilder, AlertlineError,
        AlertlineSession,
    };
    pub use alertline_protocol::{ChannelEvent, RegistrationToken};
    pub use alertline_session::{
        DiagnosticSinks, EventObserver, LaunchContext, MemorySinks,
        RegistrationSession, SessionConfig, SessionState, SessionSummary,
        SinkEntry, TracingSinks,
    };
}
