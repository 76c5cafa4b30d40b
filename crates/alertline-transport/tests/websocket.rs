//! Integration tests for the WebSocket client transport.
//!
//! These tests spin up a real WebSocket server on a loopback port and
//! connect the client transport to it, so bytes actually cross a socket.

#[cfg(feature = "websocket")]
mod websocket {
    use alertline_transport::{
        Connection, Connector, TransportError, WebSocketConnection,
        WebSocketConnector,
    };
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on an OS-assigned port and returns it with its
    /// `ws://` URL.
    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");
        (listener, format!("ws://{addr}"))
    }

    async fn accept(listener: TcpListener) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("server handshake")
    }

    #[tokio::test]
    async fn test_websocket_connect_and_send_receive() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(accept(listener));

        let client = WebSocketConnection::connect(&url)
            .await
            .expect("client should connect");
        let mut server_ws = server.await.expect("task should complete");

        assert!(client.id().into_inner() > 0);

        // --- Server sends text, client receives bytes ---
        server_ws
            .send(Message::text(r#"{"event":"WELCOME"}"#.to_string()))
            .await
            .unwrap();
        let received = client
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"event":"WELCOME"}"#);

        // --- Client sends JSON, server sees a text frame ---
        client
            .send(br#"{"event":"REGISTER","data":{"code":"A1"}}"#)
            .await
            .expect("send should succeed");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "UTF-8 payloads should go out as text");
        assert_eq!(
            msg.into_text().unwrap().as_str(),
            r#"{"event":"REGISTER","data":{"code":"A1"}}"#
        );

        client.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_binary_frames_are_received() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(accept(listener));

        let client = WebSocketConnection::connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws
            .send(Message::Binary(b"raw".to_vec().into()))
            .await
            .unwrap();
        assert_eq!(client.recv().await.unwrap(), Some(b"raw".to_vec()));
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_server_close() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(accept(listener));

        let client = WebSocketConnection::connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws.send(Message::Close(None)).await.unwrap();

        let result = client.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
    }

    #[tokio::test]
    async fn test_connector_dials_configured_url() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(accept(listener));

        let connector = WebSocketConnector::new(url.clone());
        assert_eq!(connector.url(), url);

        let client = connector.connect().await.expect("should connect");
        let _server_ws = server.await.unwrap();
        assert!(client.id().into_inner() > 0);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        // Bind then drop so the port is known to be free.
        let (listener, url) = listen().await;
        drop(listener);

        let result = WebSocketConnection::connect(&url).await;
        assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
    }
}
