//! Gateway command: serve rooms over JSON lines on stdin/stdout.
//!
//! A chat front-end process writes one inbound message per line
//! (`{"roomId", "senderId", "content"}`) and reads one outbound message per
//! line (`{"roomId", "content", "kind"}`). Messages go through the
//! [`MessageBus`] and the relay's run loop, so rooms are served concurrently.
//!
//! End of input is a graceful shutdown: turns already accepted still get
//! their replies written before the command exits.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use llmbridge_agent::Relay;
use llmbridge_core::bus::{InboundMessage, MessageBus};
use llmbridge_core::config::load_config;

const BUS_CAPACITY: usize = 100;

/// Run the gateway until stdin closes or Ctrl+C.
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let relay = Relay::from_config(config)
        .await
        .context("failed to start relay")?;
    info!(backends = ?relay.list_backend_keys(), "gateway starting");

    let input = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = serve(Arc::new(relay), input, tokio::io::stdout()) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down");
            Ok(())
        }
    }
}

/// Pump `input` through the relay and write replies to `output`.
pub(crate) async fn serve<R, W>(relay: Arc<Relay>, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let bus = Arc::new(MessageBus::new(BUS_CAPACITY));
    let relay_task = tokio::spawn(Arc::clone(&relay).run(Arc::clone(&bus)));

    let feed = async {
        let result = feed_inbound(&bus, input).await;
        bus.close_inbound();
        if let Err(e) = relay_task.await {
            error!(error = %e, "relay loop failed");
        }
        bus.close_outbound();
        result
    };

    let drain = async {
        let result = write_outbound(&bus, &mut output).await;
        if result.is_err() {
            // Keep the queue moving so relay tasks never block on a full bus.
            while bus.consume_outbound().await.is_some() {}
        }
        result
    };

    let (fed, drained) = tokio::join!(feed, drain);
    fed?;
    drained
}

async fn feed_inbound<R>(bus: &MessageBus, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg: InboundMessage = match serde_json::from_str(line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "skipping malformed inbound line");
                continue;
            }
        };
        if bus.publish_inbound(msg).await.is_err() {
            break;
        }
    }
    Ok(())
}

async fn write_outbound<W>(bus: &MessageBus, output: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(out) = bus.consume_outbound().await {
        let mut line = serde_json::to_string(&out)?;
        line.push('\n');
        output
            .write_all(line.as_bytes())
            .await
            .context("failed to write output")?;
        output.flush().await?;
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
