//! `AlertlineClient` builder and connect flow.
//!
//! This is the entry point for joining a notification channel. It ties the
//! layers together: identity is resolved once when the client is built, and
//! every [`connect`](AlertlineClient::connect) opens a transport connection
//! and wraps it in a fresh [`RegistrationSession`].

use std::fmt;
use std::sync::Arc;

use alertline_protocol::RegistrationToken;
use alertline_session::{
    resolve, DiagnosticSinks, EventObserver, LaunchContext,
    RegistrationSession, SessionConfig,
};
use alertline_transport::{
    Connection, Connector, WebSocketConnection, WebSocketConnector,
};

use crate::AlertlineError;

/// Server URL used when the builder is not given one.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/";

/// A session over the default WebSocket transport.
pub type AlertlineSession = RegistrationSession<WebSocketConnection>;

/// Builder for configuring an Alertline client.
///
/// # Example
///
/// ```rust,no_run
/// use alertline::prelude::*;
///
/// # async fn demo() -> Result<(), AlertlineError> {
/// let client = AlertlineClient::builder()
///     .url("ws://127.0.0.1:8080/")
///     .launch_context(LaunchContext::from_query("?code=ABC123"))
///     .build();
///
/// let session = client.connect().await?;
/// let summary = session.run().await;
/// # let _ = summary;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AlertlineClientBuilder {
    url: String,
    context: LaunchContext,
    config: SessionConfig,
    sinks: Option<Arc<dyn DiagnosticSinks>>,
    observers: Vec<Arc<dyn EventObserver>>,
}

impl AlertlineClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            context: LaunchContext::default(),
            config: SessionConfig::default(),
            sinks: None,
            observers: Vec::new(),
        }
    }

    /// Sets the WebSocket URL of the notification server.
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Sets the launch context the registration code is read from.
    pub fn launch_context(mut self, context: LaunchContext) -> Self {
        self.context = context;
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sends every session's sink output to `sinks` instead of `tracing`.
    pub fn sinks(mut self, sinks: impl DiagnosticSinks) -> Self {
        self.sinks = Some(Arc::new(sinks));
        self
    }

    /// Adds an observer offered every inbound event on every connection.
    pub fn observer(mut self, observer: impl EventObserver) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Resolves the registration code and builds the client.
    pub fn build(self) -> AlertlineClient<WebSocketConnector> {
        let mut client = AlertlineClient::with_connector(
            WebSocketConnector::new(self.url),
            &self.context,
            self.config,
        );
        client.sinks = self.sinks;
        client.observers = self.observers;
        client
    }
}

impl fmt::Debug for AlertlineClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertlineClientBuilder")
            .field("url", &self.url)
            .field("context", &self.context)
            .field("config", &self.config)
            .field("custom_sinks", &self.sinks.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for AlertlineClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A client with its identity resolved, ready to open connections.
///
/// Sinks and observers given to the client are shared by every session it
/// opens.
#[derive(Clone)]
pub struct AlertlineClient<T: Connector = WebSocketConnector> {
    connector: T,
    token: Option<RegistrationToken>,
    config: SessionConfig,
    sinks: Option<Arc<dyn DiagnosticSinks>>,
    observers: Vec<Arc<dyn EventObserver>>,
}

impl<T: Connector + fmt::Debug> fmt::Debug for AlertlineClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertlineClient")
            .field("connector", &self.connector)
            .field("token", &self.token)
            .field("config", &self.config)
            .field("custom_sinks", &self.sinks.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl AlertlineClient<WebSocketConnector> {
    /// Creates a new builder.
    pub fn builder() -> AlertlineClientBuilder {
        AlertlineClientBuilder::new()
    }
}

impl<T> AlertlineClient<T>
where
    T: Connector,
    AlertlineError: From<T::Error>,
{
    /// Builds a client over any connector. The launch context is read here
    /// and never again.
    pub fn with_connector(
        connector: T,
        context: &LaunchContext,
        config: SessionConfig,
    ) -> Self {
        let token = resolve(context);
        Self {
            connector,
            token,
            config,
            sinks: None,
            observers: Vec::new(),
        }
    }

    /// Sends every session's sink output to `sinks`.
    pub fn with_sinks(mut self, sinks: impl DiagnosticSinks) -> Self {
        self.sinks = Some(Arc::new(sinks));
        self
    }

    /// Adds an observer offered every inbound event on every connection.
    pub fn with_observer(mut self, observer: impl EventObserver) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Returns the resolved registration token, if any.
    pub fn token(&self) -> Option<&RegistrationToken> {
        self.token.as_ref()
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Opens a connection and returns a session awaiting `WELCOME`.
    ///
    /// Each call starts from scratch: the new session has not registered
    /// and will do so on its first `WELCOME`. The client's sinks and
    /// observers are attached before it is returned.
    pub async fn connect(
        &self,
    ) -> Result<RegistrationSession<T::Connection>, AlertlineError> {
        let conn = self.connector.connect().await?;
        tracing::info!(
            conn_id = %conn.id(),
            observer = self.token.is_none(),
            "connected to notification channel"
        );
        let mut session = RegistrationSession::new(
            conn,
            self.token.clone(),
            self.config.clone(),
        );
        if let Some(sinks) = &self.sinks {
            session = session.with_sinks(Arc::clone(sinks));
        }
        for observer in &self.observers {
            session.observe_shared(Arc::clone(observer));
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use alertline_protocol::{ChannelEvent, Frame};
    use alertline_session::{MemorySinks, SessionState, SinkEntry};
    use alertline_transport::{MemoryConnection, TransportError};
    use serde_json::json;

    /// Hands out pre-built memory connections, one per `connect`.
    struct QueuedConnector(Mutex<Vec<MemoryConnection>>);

    impl Connector for QueuedConnector {
        type Connection = MemoryConnection;
        type Error = TransportError;

        async fn connect(&self) -> Result<MemoryConnection, TransportError> {
            self.0.lock().unwrap().pop().ok_or_else(|| {
                TransportError::ConnectionClosed("no more connections".into())
            })
        }
    }

    #[test]
    fn test_builder_defaults() {
        let client = AlertlineClient::builder().build();
        assert!(client.token().is_none());
        assert!(!client.config().trace_events);
    }

    #[test]
    fn test_builder_resolves_code_at_build() {
        let client = AlertlineClient::builder()
            .launch_context(LaunchContext::from_query("code=ABC123"))
            .session_config(SessionConfig { trace_events: true })
            .build();
        assert_eq!(client.token().map(|t| t.as_str()), Some("ABC123"));
        assert!(client.config().trace_events);
    }

    #[tokio::test]
    async fn test_connect_yields_session_awaiting_welcome() {
        let (client_end, _server_end) = MemoryConnection::pair();
        let client = AlertlineClient::with_connector(
            QueuedConnector(Mutex::new(vec![client_end])),
            &LaunchContext::from_query("code=Z"),
            SessionConfig::default(),
        );

        let session = client.connect().await.unwrap();
        assert_eq!(session.state(), SessionState::AwaitingWelcome);
        assert_eq!(session.token().map(|t| t.as_str()), Some("Z"));
    }

    /// Pushes `WELCOME` and a `message`, closes, and returns the frame the
    /// client sent back.
    async fn serve(server: &MemoryConnection, text: &str) -> Frame {
        let welcome = json!({"event": "WELCOME"}).to_string();
        let message = json!({"event": "message", "data": text}).to_string();
        server.send(welcome.as_bytes()).await.unwrap();
        server.send(message.as_bytes()).await.unwrap();
        server.close().await.unwrap();
        let bytes = server.recv().await.unwrap().expect("REGISTER");
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_every_connection_shares_sinks_and_observers() {
        let (first_client, first_server) = MemoryConnection::pair();
        let (second_client, second_server) = MemoryConnection::pair();
        let sinks = MemorySinks::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        // Popped from the back: `first_client` is handed out first.
        let client = AlertlineClient::with_connector(
            QueuedConnector(Mutex::new(vec![second_client, first_client])),
            &LaunchContext::from_query("code=SHARED"),
            SessionConfig::default(),
        )
        .with_sinks(sinks.clone())
        .with_observer(move |_: &ChannelEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for (server, text) in [(&first_server, "one"), (&second_server, "two")] {
            let session = client.connect().await.unwrap();
            let (summary, register) =
                tokio::join!(session.run(), serve(server, text));
            assert!(summary.registered);
            assert_eq!(register, Frame::new("REGISTER", json!({"code": "SHARED"})));
        }

        assert_eq!(
            sinks.entries(),
            vec![
                SinkEntry::Message(json!("one")),
                SinkEntry::Message(json!("two")),
            ]
        );
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_builder_carries_sinks_and_observers() {
        let client = AlertlineClient::builder()
            .sinks(MemorySinks::new())
            .observer(|_: &ChannelEvent| {})
            .observer(|_: &ChannelEvent| {})
            .build();
        assert!(client.sinks.is_some());
        assert_eq!(client.observers.len(), 2);
    }

    #[tokio::test]
    async fn test_connect_failure_maps_to_transport_error() {
        let client = AlertlineClient::with_connector(
            QueuedConnector(Mutex::new(Vec::new())),
            &LaunchContext::default(),
            SessionConfig::default(),
        );

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, AlertlineError::Transport(_)));
    }
}
