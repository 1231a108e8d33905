//! Command-line argument parsing for supportctl.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Support agent CLI
#[derive(Parser)]
#[command(name = "supportctl")]
#[command(about = "Customer support agent - daemon control client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Daemon base URL (overrides $SUPPORTD_ADDR and the default)
    #[arg(long, global = true)]
    pub addr: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a chat message and print the reply
    Ask {
        /// User identifier attributed to the message
        #[arg(long, default_value = "operator")]
        user: String,

        /// The message text
        message: String,

        /// Submit as a background task and print its id
        #[arg(long)]
        detach: bool,
    },

    /// Poll a background chat task
    Task {
        /// Task id returned by `ask --detach`
        id: Uuid,
    },

    /// Relay an operator notification through the daemon
    Notify {
        /// Notification text
        message: String,
    },

    /// Show daemon health
    Health,
}
