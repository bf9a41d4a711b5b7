use super::types::{Command, CommandResult};
use crate::app::status::render_whoami;
use crate::chat::Orchestrator;
use crate::ui;

pub fn handle_command(command: &Command, orchestrator: &Orchestrator) -> CommandResult {
    match command {
        Command::Clear => handle_clear(orchestrator),
        Command::Logout => handle_logout(orchestrator),
        Command::Whoami => CommandResult::visible(render_whoami(orchestrator)),
        Command::Help => handle_help(),
        Command::Quit => CommandResult::exit("Bye."),
    }
}

fn handle_clear(orchestrator: &Orchestrator) -> CommandResult {
    orchestrator.clear_conversation();
    CommandResult::visible("Conversation cleared. The assistant still remembers you.")
}

fn handle_logout(orchestrator: &Orchestrator) -> CommandResult {
    match orchestrator.logout() {
        Ok(()) => CommandResult::exit("Signed out."),
        Err(e) => CommandResult::exit(format!(
            "{} Conversation cleared, but the identity could not be removed: {e}",
            ui::yellow("!")
        )),
    }
}

fn handle_help() -> CommandResult {
    CommandResult::visible(
        "/clear  -- Clear the visible conversation\n\
         /logout -- Sign out and leave the chat\n\
         /whoami -- Show the active identity and session id\n\
         /help   -- Show this help message\n\
         /quit   -- Leave the chat",
    )
}
