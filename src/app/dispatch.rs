use crate::chat::{ChatContext, Orchestrator};
use crate::cli::commands::{Cli, Commands, MemoryCommands};
use crate::config::Config;
use crate::exchange::HttpExchangeClient;
use crate::identity::AuthProfile;
use crate::ui;
use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input};
use std::io::IsTerminal;
use tracing::info;

use super::repl;
use super::status::render_status;

fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(value);
    }
    if !std::io::stdin().is_terminal() {
        bail!("{prompt} is required (stdin is not a terminal, pass it as a flag)");
    }
    let value: String = Input::new()
        .with_prompt(format!("  {prompt}"))
        .interact_text()?;
    Ok(value)
}

fn require_session(orchestrator: &Orchestrator) -> Result<String> {
    orchestrator
        .session_id()
        .context("No active session. Run `recallchat login` or `recallchat anonymous` first.")
}

async fn run_chat(orchestrator: &Orchestrator, message: Option<String>) -> Result<()> {
    if orchestrator.session_id().is_none() {
        let identity = orchestrator.start_anonymous()?;
        info!(session = %identity.id(), "no identity yet, continuing anonymously");
    }

    match message {
        Some(message) => repl::run_single(orchestrator, &message).await,
        None => repl::run(orchestrator).await,
    }
}

fn run_login(
    orchestrator: &Orchestrator,
    subject: Option<String>,
    name: Option<String>,
    avatar: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let profile = AuthProfile {
        stable_id: prompt_if_missing(subject, "Subject id")?,
        display_name: prompt_if_missing(name, "Display name")?,
        avatar_url: avatar,
        email,
    };
    let identity = orchestrator.login(profile)?;
    println!(
        "{} Signed in as {}",
        ui::success("✓"),
        ui::value(identity.display_name())
    );
    Ok(())
}

async fn run_memories(
    orchestrator: &Orchestrator,
    client: &HttpExchangeClient,
    command: MemoryCommands,
) -> Result<()> {
    let session_id = require_session(orchestrator)?;

    match command {
        MemoryCommands::List { limit } => {
            let listing = client.list_memories(&session_id, limit).await?;
            if listing.memories.is_empty() {
                println!("{}", ui::dim("The assistant has no memories of you yet."));
                return Ok(());
            }
            println!(
                "{} ({} stored)",
                ui::header("Memories"),
                listing.count.max(listing.memories.len())
            );
            for memory in &listing.memories {
                println!("  • {}", memory.summary());
            }
        }
        MemoryCommands::Clear { yes } => {
            if !yes {
                if !std::io::stdin().is_terminal() {
                    bail!("Refusing to clear memories without --yes on a non-interactive stdin");
                }
                let confirmed = Confirm::new()
                    .with_prompt("  Delete everything the assistant remembers about you?")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("{}", ui::dim("Cancelled."));
                    return Ok(());
                }
            }
            client.clear_memories(&session_id).await?;
            println!("{} Memories cleared", ui::success("✓"));
        }
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let ctx = ChatContext::from_config(&config);
    let orchestrator = Orchestrator::new(ctx);

    match cli.command {
        Commands::Chat { message } => run_chat(&orchestrator, message).await,
        Commands::Login {
            subject,
            name,
            avatar,
            email,
        } => run_login(&orchestrator, subject, name, avatar, email),
        Commands::Anonymous => {
            let identity = orchestrator.start_anonymous()?;
            println!(
                "{} Chatting anonymously as {}",
                ui::success("✓"),
                ui::value(identity.id())
            );
            Ok(())
        }
        Commands::Logout => {
            orchestrator.logout()?;
            println!("{} Signed out", ui::success("✓"));
            Ok(())
        }
        Commands::Whoami => {
            println!("{}", render_status(&config, &orchestrator));
            Ok(())
        }
        Commands::ForgetDevice => {
            orchestrator.forget_device()?;
            println!("{} Device id forgotten", ui::success("✓"));
            Ok(())
        }
        Commands::Health => {
            let client = HttpExchangeClient::new(&config.api);
            let health = client.health().await?;
            let marker = if health.is_healthy() {
                ui::success("✓")
            } else {
                ui::yellow("!")
            };
            println!("{marker} {}: {}", health.status, health.message);
            if let Some(version) = health.version {
                println!("  {}", ui::dim(format!("service version {version}")));
            }
            Ok(())
        }
        Commands::Memories { memory_command } => {
            let client = HttpExchangeClient::new(&config.api);
            run_memories(&orchestrator, &client, memory_command).await
        }
    }
}
