use crate::chat::{IgnoreReason, Orchestrator, SendOutcome};
use crate::cli::commands::{handle_command, parse_command};
use crate::ui;
use anyhow::Result;
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, BufReader};

/// Delay before showing the typing indicator, so fast replies don't flash it.
const TYPING_DELAY: Duration = Duration::from_millis(300);

/// Prints conversation entries not yet shown.
#[derive(Debug, Default)]
struct Renderer {
    shown: usize,
}

impl Renderer {
    fn render_new(&mut self, orchestrator: &Orchestrator) {
        let snapshot = orchestrator.snapshot();
        if snapshot.messages.len() < self.shown {
            self.shown = 0;
        }
        for message in &snapshot.messages[self.shown..] {
            println!("{}", ui::message_line(message));
        }
        self.shown = snapshot.messages.len();
    }
}

async fn send_with_indicator(
    orchestrator: &Orchestrator,
    renderer: &mut Renderer,
    text: &str,
) -> SendOutcome {
    let send = orchestrator.send_message(text);
    tokio::pin!(send);

    tokio::select! {
        outcome = &mut send => outcome,
        () = tokio::time::sleep(TYPING_DELAY) => {
            renderer.render_new(orchestrator);
            if orchestrator.snapshot().composing {
                println!("{}", ui::typing_indicator());
            }
            send.await
        }
    }
}

fn explain_ignored(reason: IgnoreReason) {
    match reason {
        IgnoreReason::EmptyInput => {}
        IgnoreReason::NoActiveSession => println!(
            "{} No active session. Run `recallchat login` or `recallchat anonymous` first.",
            ui::yellow("!")
        ),
        IgnoreReason::Busy => println!(
            "{} Still waiting for the previous answer.",
            ui::yellow("!")
        ),
    }
}

/// Send one message and print the exchange.
pub async fn run_single(orchestrator: &Orchestrator, message: &str) -> Result<()> {
    let mut renderer = Renderer {
        shown: orchestrator.snapshot().messages.len(),
    };
    let outcome = send_with_indicator(orchestrator, &mut renderer, message).await;
    if let SendOutcome::Ignored(reason) = outcome {
        explain_ignored(reason);
    }
    renderer.render_new(orchestrator);
    Ok(())
}

/// Interactive chat on stdin/stdout until `/quit`, `/logout` or EOF.
pub async fn run(orchestrator: &Orchestrator) -> Result<()> {
    println!("{}", ui::header("recallchat"));
    println!("{}", ui::dim("Type a message, or /help for commands."));

    let mut renderer = Renderer::default();
    renderer.render_new(orchestrator);

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(parsed) = parse_command(&line) {
            match parsed {
                Ok(command) => {
                    let result = handle_command(&command, orchestrator);
                    println!("{}", result.text);
                    renderer.render_new(orchestrator);
                    if result.exit {
                        break;
                    }
                }
                Err(message) => println!("{} {message}", ui::yellow("!")),
            }
            continue;
        }

        let outcome = send_with_indicator(orchestrator, &mut renderer, &line).await;
        if let SendOutcome::Ignored(reason) = outcome {
            explain_ignored(reason);
        }
        renderer.render_new(orchestrator);
    }

    Ok(())
}
