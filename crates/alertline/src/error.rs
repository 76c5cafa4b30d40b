//! Unified error type for the Alertline client.

use alertline_protocol::ProtocolError;
use alertline_session::SessionError;
use alertline_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum AlertlineError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (launch URL, registration send).
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let alertline_err: AlertlineError = err.into();
        assert!(matches!(alertline_err, AlertlineError::Transport(_)));
        assert!(alertline_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let decode = serde_json::from_slice::<serde_json::Value>(b"{")
            .unwrap_err();
        let alertline_err: AlertlineError = ProtocolError::Decode(decode).into();
        assert!(matches!(alertline_err, AlertlineError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::SendFailed("nope".into());
        let alertline_err: AlertlineError = err.into();
        assert!(matches!(alertline_err, AlertlineError::Session(_)));
        assert_eq!(alertline_err.to_string(), "send failed: nope");
    }
}
