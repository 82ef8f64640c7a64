//! llmbridge CLI: entry point.
//!
//! # Commands
//!
//! - `llmbridge chat [-m MESSAGE] [-r ROOM] [-s SENDER]`: talk to a room (single-shot or REPL)
//! - `llmbridge gateway`: serve rooms as JSON lines over stdin/stdout
//! - `llmbridge onboard`: write a default config file
//! - `llmbridge status`: show configuration and backend status

mod gateway;
mod helpers;
mod onboard;
mod repl;
mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use llmbridge_agent::{Command, Relay};
use llmbridge_core::bus::{InboundMessage, OutboundMessage};
use llmbridge_core::config::load_config;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// llmbridge: relay chat rooms to LLM backends
#[derive(Parser)]
#[command(name = "llmbridge", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.llmbridge/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat through the relay (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Room the conversation belongs to
        #[arg(short, long, default_value = "cli:default")]
        room: String,

        /// Sender id checked against the allowlist
        #[arg(short, long, default_value = "cli:user")]
        sender: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Serve rooms over stdin/stdout, one JSON message per line
    Gateway {
        /// Enable debug logging (to stderr)
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write a default configuration file
    Onboard,

    /// Show configuration and backend status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat {
            message,
            room,
            sender,
            logs,
        } => {
            init_logging(logs);
            run_chat(config_path, message, room, sender).await
        }
        Commands::Gateway { logs } => {
            init_logging(logs);
            gateway::run(config_path).await
        }
        Commands::Onboard => onboard::run(config_path),
        Commands::Status => status::run(config_path),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(
    config_path: Option<&std::path::Path>,
    message: Option<String>,
    room: String,
    sender: String,
) -> Result<()> {
    let config = load_config(config_path);
    let relay = Relay::from_config(config)
        .await
        .context("failed to start relay")?;

    match message {
        Some(msg) => {
            info!(room = %room, "processing single message");
            let out = respond(&relay, &room, &sender, &msg).await?;
            helpers::print_outbound(out.as_ref());
        }
        None => repl::run(&relay, &room, &sender).await?,
    }

    Ok(())
}

/// Route one line of input the way a room message would be routed.
///
/// Chat turns go straight to the relay so that failures reach the terminal
/// instead of only the log.
pub(crate) async fn respond(
    relay: &Relay,
    room: &str,
    sender: &str,
    text: &str,
) -> Result<Option<OutboundMessage>> {
    let inbound = InboundMessage::new(room, sender, text);
    if inbound.is_command() {
        if Command::parse(text).is_none() {
            anyhow::bail!("only !llm commands are understood here");
        }
        return Ok(relay.handle(&inbound).await);
    }

    let reply = relay
        .handle_inbound_message(room, sender, text)
        .await
        .context("chat turn failed")?;
    Ok(Some(OutboundMessage::reply(room, reply.content)))
}

/// Initialize tracing/logging. Output goes to stderr; stdout belongs to
/// replies.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("llmbridge=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
