//! Error types for the session layer.

use alertline_protocol::ProtocolError;

/// Errors that can occur while setting up or driving a session.
///
/// None of these stop a running session. Construction failures surface to
/// the caller; failures during the event loop are reported to the error
/// sink and the session carries on.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The launch URL could not be parsed.
    #[error("invalid launch url: {0}")]
    InvalidLaunchUrl(#[from] url::ParseError),

    /// Encoding or decoding a frame failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The transport refused an outbound frame.
    #[error("send failed: {0}")]
    SendFailed(String),
}
