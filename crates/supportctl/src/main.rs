//! supportctl entry point.

mod cli;
mod client;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use client::DaemonClient;
use owo_colors::OwoColorize;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let client = DaemonClient::new(DaemonClient::resolve_addr(args.addr));

    match args.command {
        Commands::Ask { user, message, detach } => {
            if detach {
                let submitted = client.submit(&user, &message).await?;
                println!("{} {}", "task".bold(), submitted.task_id);
            } else {
                let reply = client.query(&user, &message).await?;
                println!("{} {}", "category:".dimmed(), reply.category.to_string().cyan());
                println!("{}", reply.response);
            }
        }
        Commands::Task { id } => {
            let task = client.task(id).await?;
            match task.status.as_str() {
                "completed" => {
                    if let Some(category) = task.category {
                        println!("{} {}", "category:".dimmed(), category.to_string().cyan());
                    }
                    println!("{}", task.response.unwrap_or_default());
                }
                "failed" => {
                    eprintln!(
                        "{} {}",
                        "failed:".red().bold(),
                        task.error.unwrap_or_else(|| "unknown error".to_string())
                    );
                    std::process::exit(1);
                }
                _ => println!("{}", "pending".yellow()),
            }
        }
        Commands::Notify { message } => {
            client.notify(&message).await?;
            println!("{}", "notification sent".green());
        }
        Commands::Health => {
            let health = client.health().await?;
            println!(
                "{} v{} (up {}s)",
                health.status.green().bold(),
                health.version,
                health.uptime_seconds
            );
        }
    }

    Ok(())
}
