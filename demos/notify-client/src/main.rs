//! Joins a notification channel and logs what arrives.
//!
//! ```text
//! notify-client --url ws://127.0.0.1:8080/ --launch-url 'https://alerts.example.com/?code=ABC123'
//! notify-client --query 'code=ABC123' --debug
//! ```

use alertline::prelude::*;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug, Clone)]
#[command(name = "notify-client")]
#[command(about = "Register with a notification server and log pushed events")]
struct Args {
    /// WebSocket URL of the notification server
    #[arg(long, env = "ALERTLINE_URL", default_value = alertline::DEFAULT_URL)]
    url: String,

    /// Page URL the client was launched from; its `code` parameter is the
    /// registration code
    #[arg(long, env = "ALERTLINE_LAUNCH_URL", conflicts_with = "query")]
    launch_url: Option<String>,

    /// Raw query string to read `code` from, e.g. `code=ABC123`
    #[arg(long)]
    query: Option<String>,

    /// Log the kind of every event received
    #[arg(long, env = "ALERTLINE_DEBUG")]
    debug: bool,
}

impl Args {
    fn launch_context(&self) -> Result<LaunchContext, AlertlineError> {
        match (&self.launch_url, &self.query) {
            (Some(url), _) => Ok(LaunchContext::from_url(url)?),
            (None, Some(query)) => Ok(LaunchContext::from_query(query)),
            (None, None) => Ok(LaunchContext::default()),
        }
    }
}

/// Log directives used when `RUST_LOG` is unset. `alertline` covers every
/// `alertline_*` crate by target prefix.
fn default_directives(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("alertline={level},notify_client={level}")
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), AlertlineError> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(args.debug).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = AlertlineClient::builder()
        .url(&args.url)
        .launch_context(args.launch_context()?)
        .session_config(SessionConfig {
            trace_events: args.debug,
        })
        .build();

    let mut session = client.connect().await?;
    session.observe(|event: &ChannelEvent| {
        if let ChannelEvent::Other { kind, payload } = event {
            tracing::info!(kind = %kind, %payload, "notification");
        }
    });

    let summary = session.run().await;
    tracing::info!(
        events = summary.events,
        skipped = summary.skipped_frames,
        registered = summary.registered,
        "disconnected"
    );
    Ok(())
}
