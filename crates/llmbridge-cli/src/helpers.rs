//! Shared CLI helpers: path display, output printing, version banner.

use std::path::Path;

use colored::Colorize;

use llmbridge_core::bus::{OutboundKind, OutboundMessage};

/// Show a path with the home directory abbreviated to `~`.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs_next::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

/// Print what the relay would post back to the room.
pub fn print_outbound(out: Option<&OutboundMessage>) {
    println!();
    match out {
        Some(msg) if msg.kind == OutboundKind::Reaction => {
            println!("{} {}", "llmbridge reacted".cyan().bold(), msg.content);
        }
        Some(msg) if !msg.content.is_empty() => {
            println!("{}", "llmbridge".cyan().bold());
            println!("{}", msg.content);
        }
        _ => println!("{}", "(no response)".dimmed()),
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(room: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "llmbridge".cyan().bold(), version.dimmed());
    println!("{}", format!("Room: {room}").dimmed());
    println!(
        "{}",
        "Type a message, a !llm command, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
