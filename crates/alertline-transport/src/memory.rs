//! In-process connection pair backed by Tokio channels.
//!
//! Useful for embedding a client next to a server in the same process and
//! for driving sessions in tests without opening sockets.

use tokio::sync::{mpsc, Mutex};

use crate::{Connection, ConnectionId, TransportError};

type Delivery = Result<Vec<u8>, TransportError>;

/// One end of an in-memory connection created by [`MemoryConnection::pair`].
pub struct MemoryConnection {
    id: ConnectionId,
    tx: std::sync::Mutex<Option<mpsc::UnboundedSender<Delivery>>>,
    rx: Mutex<mpsc::UnboundedReceiver<Delivery>>,
}

impl MemoryConnection {
    /// Creates two connected ends. Bytes sent on one are received on the
    /// other, in order.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = Self::new(a_tx, a_rx);
        let b = Self::new(b_tx, b_rx);
        tracing::trace!(a = %a.id, b = %b.id, "created memory connection pair");
        (a, b)
    }

    fn new(
        tx: mpsc::UnboundedSender<Delivery>,
        rx: mpsc::UnboundedReceiver<Delivery>,
    ) -> Self {
        Self {
            id: crate::next_connection_id(),
            tx: std::sync::Mutex::new(Some(tx)),
            rx: Mutex::new(rx),
        }
    }

    /// Makes the peer's next `recv` fail with
    /// [`TransportError::ReceiveFailed`] carrying `reason`.
    pub fn send_failure(&self, reason: &str) -> Result<(), TransportError> {
        let err = TransportError::ReceiveFailed(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            reason.to_string(),
        ));
        self.deliver(Err(err))
    }

    fn deliver(&self, delivery: Delivery) -> Result<(), TransportError> {
        let guard = self.tx.lock().map_err(|_| {
            TransportError::ConnectionClosed("sender lock poisoned".into())
        })?;
        let tx = guard.as_ref().ok_or_else(|| {
            TransportError::ConnectionClosed("closed locally".into())
        })?;
        tx.send(delivery).map_err(|_| {
            TransportError::ConnectionClosed("peer dropped".into())
        })
    }
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.deliver(Ok(data.to_vec()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        match self.rx.lock().await.recv().await {
            Some(Ok(data)) => Ok(Some(data)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        // Dropping our sender ends the peer's stream once it drains.
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_delivers_in_order() {
        let (a, b) = MemoryConnection::pair();
        a.send(b"one").await.unwrap();
        a.send(b"two").await.unwrap();

        assert_eq!(b.recv().await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(b.recv().await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_close_ends_peer_stream_after_drain() {
        let (a, b) = MemoryConnection::pair();
        a.send(b"last").await.unwrap();
        a.close().await.unwrap();

        assert_eq!(b.recv().await.unwrap(), Some(b"last".to_vec()));
        assert_eq!(b.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (a, _b) = MemoryConnection::pair();
        a.close().await.unwrap();
        let err = a.send(b"late").await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed(_)));
    }

    #[tokio::test]
    async fn test_send_failure_surfaces_on_peer_recv() {
        let (a, b) = MemoryConnection::pair();
        a.send_failure("link dropped").unwrap();

        let err = b.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::ReceiveFailed(_)));
        assert!(err.to_string().contains("link dropped"));
    }

    #[test]
    fn test_pair_ends_have_distinct_ids() {
        let (a, b) = MemoryConnection::pair();
        assert_ne!(a.id(), b.id());
    }
}
