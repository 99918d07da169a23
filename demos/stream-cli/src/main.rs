//! Console client for an agent event stream.
//!
//! Run with: cargo run -p stream-cli-demo
//!
//! Reads `AGENT_STREAM_BASE_ADDRESS`, `AGENT_STREAM_SESSION_ID` and
//! `AGENT_STREAM_ORIGIN`. Each stdin line is sent as a user message;
//! `/status` prints the connection state, `/reconnect` starts over and
//! `/quit` exits.

use agent_stream_core::{
    ConnectionConfig, ProjectionUpdate, projection::timeline::display,
};
use agent_stream_transport::{ClientOptions, ConnectionManager};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let options = ClientOptions::from_env();
    let config = ConnectionConfig::from_env();
    tracing::info!(origin = %options.origin, base = %config.base_address, "Starting");

    let mut manager = ConnectionManager::websocket(options, config);
    let mut updates = manager.update_stream();
    let printer = tokio::spawn(async move {
        while let Some(update) = updates.next().await {
            print_update(&update);
        }
    });

    manager.connect(None);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "/quit" => break,
            "/reconnect" => manager.connect(None),
            "/status" => {
                let snap = manager.snapshot();
                println!(
                    "state={:?} error={} events={} lines={} file={}",
                    manager.state(),
                    manager.connection_error().as_deref().unwrap_or("-"),
                    snap.timeline.len(),
                    snap.terminal.len(),
                    snap.file.as_ref().map_or("-", |f| f.path.as_str()),
                );
            }
            text => {
                if !manager.is_connected() {
                    tracing::warn!("Not connected; message dropped");
                }
                manager.send_message(text);
            }
        }
    }

    manager.disconnect();
    drop(manager);
    printer.abort();
    Ok(())
}

fn print_update(update: &ProjectionUpdate) {
    match update {
        ProjectionUpdate::Reset => println!("--- new session ---"),
        ProjectionUpdate::Terminal(line) => println!("[{:?}] {}", line.kind, line.content),
        ProjectionUpdate::File(file) => {
            println!("[file] {} ({}, {} bytes)", file.path, file.language, file.content.len());
        }
        ProjectionUpdate::Timeline(event) => {
            let shown = display(event);
            println!("[{}] {}", shown.icon, shown.title);
        }
    }
}
